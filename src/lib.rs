/// sqlab - a dynamic SQL sandbox evaluator for exercise grading
///
/// This is the root crate that provides workspace-level documentation.
/// Actual implementation is in the subcrates:
/// - `sqlab-core`: data model, result comparison, and configuration
/// - `sqlab-sandbox`: schema registry, provisioner, connection broker, and query engine
/// - `sqlab-server`: HTTP submission service
/// - `sqlab-admin`: out-of-band schema provisioning CLI

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
