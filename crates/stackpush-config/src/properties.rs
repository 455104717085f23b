//! `.properties` file reading and writing
//!
//! Supports the subset of the Java properties format that pipeline tools
//! actually emit: `#`/`!` comments, `=`, `:` or whitespace separators,
//! backslash line continuation and `\t \n \r \f \\ \uXXXX` escapes.

use crate::error::{ConfigError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::Chars;

const SEPARATOR_WHITESPACE: [char; 3] = [' ', '\t', '\x0c'];

/// Parse properties text into an ordered map. Later duplicates win.
pub fn parse_properties(content: &str) -> Result<BTreeMap<String, String>> {
    let mut entries = BTreeMap::new();
    let mut lines = content.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let trimmed = line.trim_start_matches(SEPARATOR_WHITESPACE);

        // 空行とコメント行をスキップ
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = String::new();
        let mut current = trimmed;
        loop {
            if ends_with_continuation(current) {
                logical.push_str(&current[..current.len() - 1]);
                match lines.next() {
                    Some((_, next)) => current = next.trim_start_matches(SEPARATOR_WHITESPACE),
                    None => break,
                }
            } else {
                logical.push_str(current);
                break;
            }
        }

        let (key, value) = split_entry(&logical, index + 1)?;
        entries.insert(key, value);
    }

    Ok(entries)
}

/// Load a properties file, returning `None` when it does not exist
pub fn load_properties(path: &Path) -> Result<Option<BTreeMap<String, String>>> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_properties(&content).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::io(path, e)),
    }
}

/// Render entries as properties text with an optional leading comment
pub fn render_properties<'a, I>(entries: I, comment: Option<&str>) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    if let Some(comment) = comment {
        for line in comment.lines() {
            out.push('#');
            out.push_str(line);
            out.push('\n');
        }
    }
    for (key, value) in entries {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

/// Overwrite `path` with the given entries and a timestamp header
pub fn store_properties<'a, I>(path: &Path, entries: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let timestamp = chrono::Local::now().format("%a %b %d %H:%M:%S %Z %Y").to_string();
    let content = render_properties(entries, Some(&timestamp));
    std::fs::write(path, content).map_err(|e| ConfigError::io(path, e))?;
    tracing::debug!(path = %path.display(), "Stored properties file");
    Ok(())
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str, line_no: usize) -> Result<(String, String)> {
    let mut key_end = line.len();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let raw_key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(SEPARATOR_WHITESPACE);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches(SEPARATOR_WHITESPACE);
    }

    Ok((unescape(raw_key, line_no)?, unescape(rest, line_no)?))
}

fn unescape(raw: &str, line_no: usize) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let unit = read_code_unit(&mut chars, line_no)?;
                let code = if (0xD800..0xDC00).contains(&unit) {
                    // High surrogate: pair it with a following \uDC00-\uDFFF escape
                    let mut lookahead = chars.clone();
                    let low = match (lookahead.next(), lookahead.next()) {
                        (Some('\\'), Some('u')) => read_code_unit(&mut lookahead, line_no).ok(),
                        _ => None,
                    };
                    match low {
                        Some(low) if (0xDC00..0xE000).contains(&low) => {
                            chars = lookahead;
                            0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                        }
                        _ => unit,
                    }
                } else {
                    unit
                };
                let decoded =
                    char::from_u32(code).ok_or_else(|| ConfigError::InvalidProperties {
                        line: line_no,
                        message: format!("unpaired surrogate in \\u escape: \\u{:04X}", code),
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

/// Reads the four hex digits of a `\u` escape as one UTF-16 code unit
fn read_code_unit(chars: &mut Chars<'_>, line_no: usize) -> Result<u32> {
    let hex: String = chars.by_ref().take(4).collect();
    let unit = if hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        u32::from_str_radix(&hex, 16).ok()
    } else {
        None
    };
    unit.ok_or_else(|| ConfigError::InvalidProperties {
        line: line_no,
        message: format!("malformed \\u escape: \\u{}", hex),
    })
}

fn escape(raw: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, c) in raw.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_separators_and_comments() {
        let content = "\
# comment
! also a comment

Env=dev
Region : us-east-1
Owner platform team
   Indented=yes
";
        let props = parse_properties(content).unwrap();
        assert_eq!(props.len(), 4);
        assert_eq!(props["Env"], "dev");
        assert_eq!(props["Region"], "us-east-1");
        assert_eq!(props["Owner"], "platform team");
        assert_eq!(props["Indented"], "yes");
    }

    #[test]
    fn test_parse_continuation_and_escapes() {
        let content = "Subnets=subnet-a,\\\n    subnet-b\nPath=C\\:\\\\temp\nTab=a\\tb\nSnow=\\u2603\nkey\\ with\\ space=v\n";
        let props = parse_properties(content).unwrap();
        assert_eq!(props["Subnets"], "subnet-a,subnet-b");
        assert_eq!(props["Path"], "C:\\temp");
        assert_eq!(props["Tab"], "a\tb");
        assert_eq!(props["Snow"], "☃");
        assert_eq!(props["key with space"], "v");
    }

    #[test]
    fn test_parse_later_duplicate_wins() {
        let props = parse_properties("A=1\nA=2\n").unwrap();
        assert_eq!(props["A"], "2");
    }

    #[test]
    fn test_parse_empty_value() {
        let props = parse_properties("Empty=\nBare\n").unwrap();
        assert_eq!(props["Empty"], "");
        assert_eq!(props["Bare"], "");
    }

    #[test]
    fn test_parse_malformed_unicode_escape() {
        let result = parse_properties("ok=1\nbad=\\uZZ\n");
        match result {
            Err(ConfigError::InvalidProperties { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected InvalidProperties, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_surrogate_pair_escape() {
        let entries = parse_properties("Emoji=\\uD83D\\uDE00 ok\nPlain=\\u00e9\n").unwrap();
        assert_eq!(entries["Emoji"], "\u{1F600} ok");
        assert_eq!(entries["Plain"], "\u{e9}");

        let lone = parse_properties("a=1\nEmoji=\\uD83D!\n");
        match lone {
            Err(ConfigError::InvalidProperties { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("D83D"));
            }
            other => panic!("Expected InvalidProperties, got {:?}", other),
        }
    }

    #[test]
    fn test_render_escapes_special_characters() {
        let rendered = render_properties(
            [
                ("aws.stack.Bucket", "my-bucket"),
                ("odd key", " leading=space"),
                ("url", "https://example.com/#x"),
            ],
            Some("header"),
        );
        assert_eq!(
            rendered,
            "#header\naws.stack.Bucket=my-bucket\nodd\\ key=\\ leading\\=space\nurl=https\\://example.com/\\#x\n"
        );

        let reparsed = parse_properties(&rendered).unwrap();
        assert_eq!(reparsed["odd key"], " leading=space");
        assert_eq!(reparsed["url"], "https://example.com/#x");
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let loaded = load_properties(&temp_dir.path().join("missing.properties")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_store_overwrites_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("stackoutput.properties");
        fs::write(&path, "stale=value\n").unwrap();

        store_properties(&path, [("aws.stack.Queue", "https://sqs/queue")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('#'));
        let loaded = load_properties(&path).unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["aws.stack.Queue"], "https://sqs/queue");
    }
}
