//! Seed-script statement splitting
//!
//! Seed scripts arrive as one SQL text and must be executed one statement at
//! a time. The splitter is a small state machine over the script that splits
//! on `;` while honoring single-quoted strings (with `''` escapes),
//! double-quoted identifiers, line comments, and nested block comments.
//!
//! Dollar-quoted bodies (`$$ ... $$`) are not recognized; scripts containing
//! procedural blocks must be provisioned one statement per script.

/// Split a seed script into individual SQL statements.
///
/// Statement terminators inside quotes and comments are ignored. Statements
/// that contain only whitespace and comments are dropped; surviving
/// statements are trimmed and returned without their terminator.
pub fn split_statements(script: &str) -> Vec<String> {
    #[derive(PartialEq)]
    enum State {
        Normal,
        SingleQuote,
        DoubleQuote,
        LineComment,
        BlockComment(usize),
    }

    let mut statements = Vec::new();
    let mut current = String::new();
    let mut has_content = false;
    let mut state = State::Normal;
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Normal => match c {
                ';' => {
                    if has_content {
                        statements.push(current.trim().to_string());
                    }
                    current.clear();
                    has_content = false;
                    continue;
                }
                '\'' => {
                    state = State::SingleQuote;
                    has_content = true;
                }
                '"' => {
                    state = State::DoubleQuote;
                    has_content = true;
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    current.push_str("--");
                    state = State::LineComment;
                    continue;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    current.push_str("/*");
                    state = State::BlockComment(1);
                    continue;
                }
                _ => {
                    if !c.is_whitespace() {
                        has_content = true;
                    }
                }
            },
            State::SingleQuote => {
                if c == '\'' {
                    // A doubled quote is an escaped quote, not a terminator
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        current.push_str("''");
                        continue;
                    }
                    state = State::Normal;
                }
            }
            State::DoubleQuote => {
                if c == '"' {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    current.push_str("*/");
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    continue;
                }
                if c == '/' && chars.peek() == Some(&'*') {
                    chars.next();
                    current.push_str("/*");
                    state = State::BlockComment(depth + 1);
                    continue;
                }
            }
        }
        current.push(c);
    }

    if has_content {
        statements.push(current.trim().to_string());
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic_statements() {
        let script = "CREATE TABLE orders (id INT, amount INT);\n\
                      INSERT INTO orders VALUES (1, 100);\n\
                      INSERT INTO orders VALUES (2, 200);";
        let statements = split_statements(script);
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[0], "CREATE TABLE orders (id INT, amount INT)");
        assert_eq!(statements[2], "INSERT INTO orders VALUES (2, 200)");
    }

    #[test]
    fn test_terminator_inside_single_quotes() {
        let statements = split_statements("INSERT INTO t VALUES ('a;b'); SELECT 1;");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], "INSERT INTO t VALUES ('a;b')");
    }

    #[test]
    fn test_escaped_single_quote() {
        let statements = split_statements("INSERT INTO t VALUES ('it''s; fine'); SELECT 1;");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], "INSERT INTO t VALUES ('it''s; fine')");
    }

    #[test]
    fn test_terminator_inside_double_quoted_identifier() {
        let statements = split_statements("SELECT \"weird;name\" FROM t; SELECT 2;");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], "SELECT \"weird;name\" FROM t");
    }

    #[test]
    fn test_terminator_inside_comments() {
        let script = "SELECT 1; -- trailing; comment\nSELECT 2 /* block; comment */;";
        let statements = split_statements(script);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1], "SELECT 2 /* block; comment */");
    }

    #[test]
    fn test_nested_block_comment() {
        let statements = split_statements("SELECT /* outer /* inner; */ still; */ 3;");
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0], "SELECT /* outer /* inner; */ still; */ 3");
    }

    #[test]
    fn test_empty_and_comment_only_segments_are_dropped() {
        assert!(split_statements("").is_empty());
        assert!(split_statements("   \n\t ").is_empty());
        assert!(split_statements(";;;").is_empty());
        assert!(split_statements("-- nothing here\n").is_empty());

        let statements = split_statements("SELECT 1;\n\n; -- done\n");
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_final_statement_without_terminator() {
        let statements = split_statements("SELECT 1; SELECT 2");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1], "SELECT 2");
    }
}
