//! Constant values of C# string literal tokens.
//!
//! Works on the token text rather than on tree-sitter children so that regular,
//! verbatim and raw literals all go through one entry point.

/// Node kinds that are string literals (interpolated strings are expressions, not literals).
pub(crate) const STRING_LITERAL_KINDS: &[&str] = &[
    "string_literal",
    "verbatim_string_literal",
    "raw_string_literal",
];

pub(crate) fn is_string_literal_kind(kind: &str) -> bool {
    STRING_LITERAL_KINDS.contains(&kind)
}

/// Decode the text of a string literal token into its `string` value.
///
/// Returns `None` for UTF-8 literals (`"..."u8`, which are byte spans, not
/// strings) and for tokens that are not well-formed.
pub fn string_literal_value(token: &str) -> Option<String> {
    let token = token.trim();
    if token.ends_with("u8") || token.ends_with("U8") {
        return None;
    }

    if token.starts_with("\"\"\"") {
        return raw_value(token);
    }
    if let Some(rest) = token.strip_prefix("@\"") {
        return verbatim_value(rest);
    }
    if let Some(rest) = token.strip_prefix('"') {
        return regular_value(rest.strip_suffix('"')?);
    }
    None
}

// ─── Regular literals ────────────────────────────────────────────────

fn regular_value(body: &str) -> Option<String> {
    let mut units: Vec<u16> = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut buf = [0u16; 2];
            units.extend_from_slice(ch.encode_utf16(&mut buf));
            continue;
        }
        let escape = chars.next()?;
        match escape {
            '\'' => units.push('\'' as u16),
            '"' => units.push('"' as u16),
            '\\' => units.push('\\' as u16),
            '0' => units.push(0),
            'a' => units.push(0x07),
            'b' => units.push(0x08),
            'f' => units.push(0x0C),
            'n' => units.push('\n' as u16),
            'r' => units.push('\r' as u16),
            't' => units.push('\t' as u16),
            'v' => units.push(0x0B),
            'x' => {
                // 1 to 4 hex digits, greedy
                let mut value: u32 = 0;
                let mut digits = 0;
                while digits < 4 {
                    match chars.peek().and_then(|c| c.to_digit(16)) {
                        Some(d) => {
                            value = value * 16 + d;
                            digits += 1;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    return None;
                }
                units.push(value as u16);
            }
            'u' => units.push(read_hex(&mut chars, 4)? as u16),
            'U' => {
                let scalar = read_hex(&mut chars, 8)?;
                let c = char::from_u32(scalar)?;
                let mut buf = [0u16; 2];
                units.extend_from_slice(c.encode_utf16(&mut buf));
            }
            _ => return None,
        }
    }

    Some(String::from_utf16_lossy(&units))
}

fn read_hex(chars: &mut std::iter::Peekable<std::str::Chars>, count: usize) -> Option<u32> {
    let mut value: u32 = 0;
    for _ in 0..count {
        value = value.checked_mul(16)? + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

// ─── Verbatim literals ───────────────────────────────────────────────

fn verbatim_value(rest: &str) -> Option<String> {
    let body = rest.strip_suffix('"')?;
    Some(body.replace("\"\"", "\""))
}

// ─── Raw literals ────────────────────────────────────────────────────

fn raw_value(token: &str) -> Option<String> {
    let quotes = token.chars().take_while(|&c| c == '"').count();
    if token.len() < quotes * 2 {
        return None;
    }
    let delimiter = &token[..quotes];
    let body = token[quotes..].strip_suffix(delimiter)?;

    if !body.contains('\n') {
        return Some(body.to_string());
    }

    // Multi-line: the opening line holds only the delimiter, the closing line
    // only whitespace before the delimiter; that whitespace is stripped from
    // every content line.
    let lines: Vec<&str> = body.split('\n').collect();
    if lines.len() < 2 || !lines[0].trim().is_empty() {
        return None;
    }
    let closing = lines[lines.len() - 1];
    if !closing.chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }
    let indent = closing;

    let content = &lines[1..lines.len() - 1];
    let mut out: Vec<&str> = Vec::with_capacity(content.len());
    for line in content {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            out.push("");
        } else {
            out.push(line.strip_prefix(indent)?);
        }
    }
    Some(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plain() {
        assert_eq!(string_literal_value(r#""{}""#).as_deref(), Some("{}"));
        assert_eq!(string_literal_value(r#""""#).as_deref(), Some(""));
    }

    #[test]
    fn test_regular_escapes() {
        assert_eq!(string_literal_value(r#""{\"a\":1}""#).as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(string_literal_value(r#""a\tb\nc\\d""#).as_deref(), Some("a\tb\nc\\d"));
        assert_eq!(string_literal_value(r#""\x41\u0042\U00000043""#).as_deref(), Some("ABC"));
        assert_eq!(string_literal_value(r#""\0""#).as_deref(), Some("\0"));
    }

    #[test]
    fn test_regular_hex_escape_is_greedy_up_to_four_digits() {
        // \x1234 consumes all four digits; a fifth stays literal
        assert_eq!(string_literal_value(r#""\x00415""#).as_deref(), Some("A5"));
    }

    #[test]
    fn test_surrogate_pair_is_combined() {
        assert_eq!(string_literal_value(r#""\uD83D\uDE00""#).as_deref(), Some("😀"));
    }

    #[test]
    fn test_lone_surrogate_replaced() {
        assert_eq!(string_literal_value(r#""\uD83D""#).as_deref(), Some("\u{FFFD}"));
    }

    #[test]
    fn test_invalid_escape() {
        assert_eq!(string_literal_value(r#""\q""#), None);
        assert_eq!(string_literal_value(r#""\u12""#), None);
    }

    #[test]
    fn test_verbatim() {
        assert_eq!(string_literal_value(r#"@"{""a"":1}""#).as_deref(), Some(r#"{"a":1}"#));
        // Backslashes are not escapes in verbatim strings
        assert_eq!(string_literal_value(r#"@"C:\temp""#).as_deref(), Some(r"C:\temp"));
    }

    #[test]
    fn test_utf8_literal_has_no_string_value() {
        assert_eq!(string_literal_value(r#""{}"u8"#), None);
        assert_eq!(string_literal_value(r#""{}"U8"#), None);
    }

    #[test]
    fn test_raw_single_line() {
        assert_eq!(string_literal_value(r#""""{"a": 1}""""#).as_deref(), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn test_raw_multi_line_strips_indentation() {
        let token = "\"\"\"\n        {\n          \"a\": 1\n        }\n        \"\"\"";
        assert_eq!(string_literal_value(token).as_deref(), Some("{\n  \"a\": 1\n}"));
    }

    #[test]
    fn test_raw_multi_line_crlf() {
        let token = "\"\"\"\r\n    [1]\r\n    \"\"\"";
        assert_eq!(string_literal_value(token).as_deref(), Some("[1]"));
    }

    #[test]
    fn test_raw_with_more_quotes() {
        assert_eq!(string_literal_value(r#"""""a"""b"""""#).as_deref(), Some(r#"a"""b"#));
    }

    #[test]
    fn test_raw_bad_indentation() {
        let token = "\"\"\"\n  x\n    \"\"\"";
        assert_eq!(string_literal_value(token), None);
    }

    #[test]
    fn test_not_a_string() {
        assert_eq!(string_literal_value("42"), None);
        assert_eq!(string_literal_value("null"), None);
        assert_eq!(string_literal_value("'c'"), None);
    }

    #[test]
    fn test_literal_kinds() {
        assert!(is_string_literal_kind("string_literal"));
        assert!(is_string_literal_kind("raw_string_literal"));
        assert!(!is_string_literal_kind("interpolated_string_expression"));
        assert!(!is_string_literal_kind("null_literal"));
    }
}
