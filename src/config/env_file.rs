// src/config/env_file.rs

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::errors::Result;

static ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^#=]+)=(.*)$").expect("env entry pattern is valid"));

/// Parse `key=value` lines.
///
/// Lines starting with `#` (or containing no `=`) are skipped. Keys and
/// values are trimmed, and a value wrapped in matching single or double
/// quotes is unwrapped. Later duplicates win.
pub fn parse_env_file(contents: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();

    for line in contents.lines() {
        let Some(caps) = ENTRY.captures(line.trim_end_matches('\r')) else {
            continue;
        };
        let key = caps[1].trim();
        if key.is_empty() {
            continue;
        }
        entries.insert(key.to_string(), unquote(caps[2].trim()).to_string());
    }

    entries
}

/// Load and parse the file at `path`.
///
/// A missing file yields an empty map; the environment alone is then used.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(contents) => {
            let entries = parse_env_file(&contents);
            debug!(path = %path.display(), keys = entries.len(), "loaded env file");
            Ok(entries)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no env file; using process environment only");
            Ok(HashMap::new())
        }
        Err(e) => Err(e.into()),
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_values_and_skips_comments() {
        let entries = parse_env_file(
            "# bot credentials\nTELEGRAM_BOT_TOKEN = abc:123 \n\nnot a pair\nTELEGRAM_CHAT_ID=42\n",
        );
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["TELEGRAM_BOT_TOKEN"], "abc:123");
        assert_eq!(entries["TELEGRAM_CHAT_ID"], "42");
    }

    #[test]
    fn value_may_contain_equals_signs_and_quotes() {
        let entries = parse_env_file("A=x=y\nB=\"quoted value\"\nC='single'\r\n");
        assert_eq!(entries["A"], "x=y");
        assert_eq!(entries["B"], "quoted value");
        assert_eq!(entries["C"], "single");
    }

    #[test]
    fn empty_value_is_kept() {
        let entries = parse_env_file("EMPTY=\n");
        assert_eq!(entries["EMPTY"], "");
    }
}
