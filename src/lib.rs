//! # jsoncheck — JSON literal validation for C#
//!
//! Finds calls to Newtonsoft.Json parse APIs (`JsonConvert.DeserializeObject<T>`,
//! `JObject.Parse`, `JArray.Parse`) whose single argument is a string literal,
//! parses that literal at analysis time, and reports a diagnostic at the
//! literal when it is not valid JSON.
//!
//! ## Library usage
//!
//! ```
//! use jsoncheck::{analyze_source, new_csharp_parser, CancellationToken};
//!
//! let source = r#"
//! using Newtonsoft.Json.Linq;
//! class C { void M() { var o = JObject.Parse("{a:1}"); } }
//! "#;
//! let mut parser = new_csharp_parser().unwrap();
//! let diagnostics = analyze_source(&mut parser, source, "C.cs", &CancellationToken::new()).unwrap();
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].rule_id, "CC0054");
//! ```

pub mod analyzer;
pub mod cancel;
pub mod catalog;
pub mod diagnostic;
mod error;

pub use analyzer::{
    analyze_source, check_paths, new_csharp_parser, parse_extensions, validate_json,
    CheckOptions, CheckReport,
};
pub use cancel::CancellationToken;
pub use catalog::{SignatureEntry, CATALOG};
pub use diagnostic::{Diagnostic, DiagnosticSink, Location, Rule, Severity, JSON_SYNTAX_RULE};
pub use error::CheckError;

/// Strip the `\\?\` extended-length path prefix that Windows canonicalize adds.
#[must_use]
pub fn clean_path(p: &str) -> String {
    p.strip_prefix(r"\\?\").unwrap_or(p).to_string()
}

/// Read a file as a String, using lossy UTF-8 conversion for non-UTF8 files.
/// Returns `(content, was_lossy)` where `was_lossy` is true if replacement characters
/// were inserted.
pub fn read_file_lossy(path: &std::path::Path) -> std::io::Result<(String, bool)> {
    let raw = std::fs::read(path)?;
    match String::from_utf8(raw) {
        Ok(s) => Ok((s, false)),
        Err(e) => Ok((String::from_utf8_lossy(e.as_bytes()).into_owned(), true)),
    }
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_clean_path_strips_prefix() {
        assert_eq!(clean_path(r"\\?\C:\Projects\App"), r"C:\Projects\App");
    }

    #[test]
    fn test_clean_path_no_prefix() {
        assert_eq!(clean_path("src/Program.cs"), "src/Program.cs");
    }

    #[test]
    fn test_read_file_lossy_valid_utf8() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.cs");
        std::fs::write(&path, "class A {}").unwrap();
        let (content, lossy) = read_file_lossy(&path).unwrap();
        assert_eq!(content, "class A {}");
        assert!(!lossy);
    }

    #[test]
    fn test_read_file_lossy_windows_1252() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("b.cs");
        // 0x93 / 0x94 are Windows-1252 smart quotes
        std::fs::write(&path, b"// \x93quoted\x94\nclass B {}").unwrap();
        let (content, lossy) = read_file_lossy(&path).unwrap();
        assert!(lossy);
        assert!(content.contains("class B {}"));
        assert!(content.contains('\u{FFFD}'));
    }
}

// ─── Property-based tests (proptest) ─────────────────────────────────

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn check(source: &str) -> Vec<Diagnostic> {
        let mut parser = new_csharp_parser().unwrap();
        analyze_source(&mut parser, source, "P.cs", &CancellationToken::new()).unwrap()
    }

    fn program(call: &str) -> String {
        format!(
            "using Newtonsoft.Json.Linq;\nnamespace P {{ class C {{ void M(string input) {{ var x = {}; }} }} }}\n",
            call
        )
    }

    /// Escape arbitrary text as the body of a C# regular string literal.
    fn csharp_literal(text: &str) -> String {
        let mut out = String::from("\"");
        for c in text.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                c => out.push(c),
            }
        }
        out.push('"');
        out
    }

    proptest! {
        /// Re-running the check on the same source yields the same diagnostics.
        #[test]
        fn check_is_idempotent(body in "[ -~]{0,40}") {
            let source = program(&format!("JObject.Parse({})", csharp_literal(&body)));
            let first = check(&source);
            let second = check(&source);
            prop_assert_eq!(first, second);
        }

        /// A literal argument produces a diagnostic exactly when `validate_json` rejects it.
        #[test]
        fn diagnostic_iff_parser_rejects(body in "[ -~]{0,40}") {
            let source = program(&format!("JObject.Parse({})", csharp_literal(&body)));
            let diagnostics = check(&source);
            match validate_json(&body) {
                Ok(()) => prop_assert!(diagnostics.is_empty()),
                Err(message) => {
                    prop_assert_eq!(diagnostics.len(), 1);
                    prop_assert_eq!(&diagnostics[0].message, &message);
                }
            }
        }

        /// Non-literal arguments never produce a diagnostic, whatever they might hold.
        #[test]
        fn non_literal_argument_never_reported(body in "[ -~]{0,40}") {
            let concatenation = format!("JObject.Parse({} + input)", csharp_literal(&body));
            prop_assert!(check(&program(&concatenation)).is_empty());
            prop_assert!(check(&program("JObject.Parse(input)")).is_empty());
        }
    }
}
