//! Rendering of check reports and the rule listing.

use std::io::Write;

use serde_json::json;

use jsoncheck::{CheckError, CheckReport, Rule, SignatureEntry};

use super::args::OutputFormat;

pub fn write_report(out: &mut impl Write, report: &CheckReport, format: OutputFormat) -> Result<(), CheckError> {
    match format {
        OutputFormat::Text => {
            for diagnostic in &report.diagnostics {
                writeln!(out, "{}", diagnostic.render())?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// One-line human summary, printed on stderr after text output.
pub fn summary_line(report: &CheckReport) -> String {
    let mut line = format!(
        "{} diagnostic(s) in {} file(s) checked",
        report.diagnostics.len(),
        report.files_checked
    );
    if report.skipped_files > 0 {
        line.push_str(&format!(", {} skipped", report.skipped_files));
    }
    if report.lossy_files > 0 {
        line.push_str(&format!(", {} decoded lossily", report.lossy_files));
    }
    line
}

pub fn write_rules(out: &mut impl Write, rule: &Rule, catalog: &[SignatureEntry], as_json: bool) -> Result<(), CheckError> {
    if as_json {
        let entries: Vec<_> = catalog.iter()
            .map(|e| json!({ "memberName": e.member_name, "fullSignature": e.full_signature }))
            .collect();
        let value = json!({ "rule": rule, "catalog": entries });
        serde_json::to_writer_pretty(&mut *out, &value)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{} [{}] {}", rule.id, rule.severity, rule.title)?;
    writeln!(out, "  category: {}", rule.category)?;
    writeln!(out, "  {}", rule.description)?;
    writeln!(out, "  help: {}", rule.help_link)?;
    writeln!(out)?;
    writeln!(out, "Checked calls:")?;
    for entry in catalog {
        writeln!(out, "  {:<18} {}", entry.member_name, entry.full_signature)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsoncheck::{Diagnostic, Location, CATALOG, JSON_SYNTAX_RULE};

    fn report_with_one() -> CheckReport {
        CheckReport {
            files_checked: 2,
            skipped_files: 0,
            lossy_files: 0,
            diagnostics: vec![Diagnostic::new(
                &JSON_SYNTAX_RULE,
                Location {
                    path: "src/A.cs".to_string(),
                    line: 4,
                    column: 35,
                    end_line: 4,
                    end_column: 42,
                    start_byte: 80,
                    end_byte: 87,
                },
                "key must be a string at line 1 column 2",
            )],
        }
    }

    #[test]
    fn test_text_report() {
        let mut out = Vec::new();
        write_report(&mut out, &report_with_one(), OutputFormat::Text).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "src/A.cs:4:35: error[CC0054]: key must be a string at line 1 column 2\n"
        );
    }

    #[test]
    fn test_json_report_shape() {
        let mut out = Vec::new();
        write_report(&mut out, &report_with_one(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["files_checked"], 2);
        assert_eq!(value["diagnostics"][0]["rule_id"], "CC0054");
        assert_eq!(value["diagnostics"][0]["severity"], "error");
        assert_eq!(value["diagnostics"][0]["location"]["line"], 4);
    }

    #[test]
    fn test_summary_line() {
        let mut report = report_with_one();
        assert_eq!(summary_line(&report), "1 diagnostic(s) in 2 file(s) checked");
        report.skipped_files = 1;
        assert_eq!(summary_line(&report), "1 diagnostic(s) in 2 file(s) checked, 1 skipped");
    }

    #[test]
    fn test_rules_text_lists_catalog() {
        let mut out = Vec::new();
        write_rules(&mut out, &JSON_SYNTAX_RULE, CATALOG, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("CC0054 [error]"));
        assert!(text.contains("Newtonsoft.Json.Linq.JArray.Parse(string)"));
    }

    #[test]
    fn test_rules_json() {
        let mut out = Vec::new();
        write_rules(&mut out, &JSON_SYNTAX_RULE, CATALOG, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["rule"]["id"], "CC0054");
        assert_eq!(value["catalog"].as_array().unwrap().len(), 3);
    }
}
