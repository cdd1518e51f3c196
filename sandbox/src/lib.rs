//! # sqlab Sandbox
//!
//! Database-facing components of the sqlab SQL sandbox evaluator: the schema
//! registry, the schema provisioner, the connection broker, and the query
//! execution engine. Everything here talks to PostgreSQL; the policy pieces
//! (comparison, orchestration) live in `sqlab-core` and `sqlab-server`.

// Connection plumbing
pub mod connect;
pub use connect::{control_pool, open_connection};

// Schema registry and question store over the control database
pub mod questions;
pub mod registry;
pub use questions::QuestionStore;
pub use registry::SchemaRegistry;

// Connection broker
pub mod broker;
pub use broker::{ConnectionBroker, SandboxLease};

// Query execution engine
pub mod engine;
pub use engine::QueryEngine;

// Schema provisioner
pub mod provision;
pub use provision::SchemaProvisioner;
