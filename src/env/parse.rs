use crate::env::entry::{EnvEntry, EnvIndex};
use anyhow::{Context, bail};
use regex::Regex;
use std::fs;

/// Parse a `.env` file into a key->entry index.
///
/// Accepted line shapes:
/// KEY=value
/// export KEY="quoted value"   # comment
/// KEY='literal $value'
///
/// Blank lines and `#` comments are skipped. A key assigned twice is an error.
pub fn parse_env_file(path: &str) -> anyhow::Result<EnvIndex> {
    let text = fs::read_to_string(path).with_context(|| format!("read env file {}", path))?;
    parse_env_str(&text).with_context(|| format!("parse env file {}", path))
}

pub fn parse_env_str(text: &str) -> anyhow::Result<EnvIndex> {
    // Capture:
    // 1) key: shell identifier, optional `export` prefix
    // 2) raw value: rest of line, trimmed
    let re = Regex::new(r#"^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*?)\s*$"#)?;

    let mut out = EnvIndex::new();
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let caps = match re.captures(line) {
            Some(c) => c,
            None => bail!("line {}: expected KEY=value, got {:?}", lno, line),
        };

        let key = caps[1].to_string();
        let value = parse_value(&caps[2]).with_context(|| format!("line {}: key {}", lno, key))?;

        if let Some(prev) = out.insert(key.clone(), EnvEntry { value, line: lno }) {
            bail!(
                "line {}: duplicate key {} (first set on line {})",
                lno,
                key,
                prev.line
            );
        }
    }

    Ok(out)
}

fn parse_value(raw: &str) -> anyhow::Result<String> {
    if let Some(rest) = raw.strip_prefix('"') {
        let mut out = String::new();
        let mut chars = rest.chars();
        while let Some(c) = chars.next() {
            match c {
                '"' => {
                    let tail = chars.as_str().trim();
                    if !tail.is_empty() && !tail.starts_with('#') {
                        bail!("unexpected text after closing quote: {:?}", tail);
                    }
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => bail!("dangling escape"),
                },
                c => out.push(c),
            }
        }
        bail!("unterminated double quote");
    }

    if let Some(rest) = raw.strip_prefix('\'') {
        return match rest.find('\'') {
            Some(end) => {
                let tail = rest[end + 1..].trim();
                if !tail.is_empty() && !tail.starts_with('#') {
                    bail!("unexpected text after closing quote: {:?}", tail);
                }
                Ok(rest[..end].to_string())
            }
            None => bail!("unterminated single quote"),
        };
    }

    // Unquoted: an inline comment needs whitespace before the '#'.
    let value = match raw.find(" #") {
        Some(i) => raw[..i].trim_end(),
        None => raw,
    };
    Ok(value.to_string())
}
