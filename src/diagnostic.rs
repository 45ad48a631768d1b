//! Diagnostic records, the rule they belong to, and the sink they are reported to.

use serde::Serialize;

// ─── Rule ────────────────────────────────────────────────────────────

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static description of a check, attached to every diagnostic it produces.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub title: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub enabled_by_default: bool,
    pub description: &'static str,
    pub help_link: &'static str,
}

/// Invalid JSON in a string literal passed to a Newtonsoft.Json parse API.
pub static JSON_SYNTAX_RULE: Rule = Rule {
    id: "CC0054",
    title: "Your Json syntax is wrong",
    category: "Usage",
    severity: Severity::Error,
    enabled_by_default: true,
    description: "This diagnostic checks the json string and triggers if the parsing fails.",
    help_link: "https://code-cracker.github.io/diagnostics/CC0054.html",
};

// ─── Location ────────────────────────────────────────────────────────

/// Source span of a finding. Lines and columns are 1-based; columns count
/// characters, not bytes.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    pub path: String,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Location {
    /// Span of a syntax node within `source`.
    pub fn of_node(path: &str, node: tree_sitter::Node, source: &[u8]) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Location {
            path: path.to_string(),
            line: start.row as u32 + 1,
            column: char_column(source, node.start_byte(), start.column),
            end_line: end.row as u32 + 1,
            end_column: char_column(source, node.end_byte(), end.column),
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        }
    }
}

/// Convert tree-sitter's byte column into a 1-based character column.
fn char_column(source: &[u8], byte: usize, byte_column: usize) -> u32 {
    let line_start = byte.saturating_sub(byte_column);
    let prefix = source.get(line_start..byte).unwrap_or(&[]);
    String::from_utf8_lossy(prefix).chars().count() as u32 + 1
}

// ─── Diagnostic ──────────────────────────────────────────────────────

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule_id: &'static str,
    pub severity: Severity,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn new(rule: &Rule, location: Location, message: impl Into<String>) -> Self {
        Diagnostic {
            rule_id: rule.id,
            severity: rule.severity,
            location,
            message: message.into(),
        }
    }

    /// Compiler-style single line: `path:line:column: error[ID]: message`.
    pub fn render(&self) -> String {
        format!(
            "{}:{}:{}: {}[{}]: {}",
            self.location.path,
            self.location.line,
            self.location.column,
            self.severity,
            self.rule_id,
            self.message
        )
    }
}

/// Stable ordering used for all reported output.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| a.location.cmp(&b.location)
        .then_with(|| a.rule_id.cmp(b.rule_id))
        .then_with(|| a.message.cmp(&b.message)));
}

// ─── Sink ────────────────────────────────────────────────────────────

/// Receiver of findings.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(path: &str, line: u32, column: u32) -> Location {
        Location {
            path: path.to_string(),
            line,
            column,
            end_line: line,
            end_column: column + 5,
            start_byte: 0,
            end_byte: 5,
        }
    }

    #[test]
    fn test_render_format() {
        let d = Diagnostic::new(&JSON_SYNTAX_RULE, location("src/A.cs", 3, 17), "EOF while parsing an object at line 1 column 1");
        assert_eq!(d.render(), "src/A.cs:3:17: error[CC0054]: EOF while parsing an object at line 1 column 1");
    }

    #[test]
    fn test_diagnostic_carries_rule_identity() {
        let d = Diagnostic::new(&JSON_SYNTAX_RULE, location("a.cs", 1, 1), "msg");
        assert_eq!(d.rule_id, "CC0054");
        assert_eq!(d.severity, Severity::Error);
    }

    #[test]
    fn test_sort_diagnostics_by_path_then_position() {
        let mut ds = vec![
            Diagnostic::new(&JSON_SYNTAX_RULE, location("b.cs", 1, 1), "x"),
            Diagnostic::new(&JSON_SYNTAX_RULE, location("a.cs", 9, 1), "x"),
            Diagnostic::new(&JSON_SYNTAX_RULE, location("a.cs", 2, 30), "x"),
            Diagnostic::new(&JSON_SYNTAX_RULE, location("a.cs", 2, 4), "x"),
        ];
        sort_diagnostics(&mut ds);
        let order: Vec<_> = ds.iter().map(|d| (d.location.path.as_str(), d.location.line, d.location.column)).collect();
        assert_eq!(order, vec![("a.cs", 2, 4), ("a.cs", 2, 30), ("a.cs", 9, 1), ("b.cs", 1, 1)]);
    }

    #[test]
    fn test_char_column_counts_characters() {
        let source = "var é = \"x\";".as_bytes();
        // byte offset of the opening quote: "var é = " is 9 bytes, 8 chars
        let quote = source.iter().position(|&b| b == b'"').unwrap();
        assert_eq!(char_column(source, quote, quote), 9);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Error).unwrap();
        assert_eq!(json, "\"error\"");
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        sink.report(Diagnostic::new(&JSON_SYNTAX_RULE, location("a.cs", 1, 1), "m"));
        assert_eq!(sink.len(), 1);
    }
}
