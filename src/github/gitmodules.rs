//! `.gitmodules` parsing.

use std::collections::HashMap;

use configparser::ini::Ini;

use crate::error::{AppError, Result};
use crate::models::{Submodule, Submodules};

const SECTION_PREFIX: &str = "submodule";

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// A `;` or `#` after whitespace starts a trailing comment.
fn strip_comment(value: &str) -> &str {
    let bytes = value.as_bytes();
    let end = (1..bytes.len())
        .find(|&i| matches!(bytes[i], b';' | b'#') && bytes[i - 1].is_ascii_whitespace())
        .unwrap_or(bytes.len());
    value[..end].trim_end()
}

/// Keys are matched case-insensitively, as git does.
fn value_of(section: &HashMap<String, Option<String>>, key: &str) -> Option<String> {
    section
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .and_then(|(_, v)| v.as_deref())
        .map(|v| unquote(strip_comment(v.trim())).to_string())
        .filter(|v| !v.is_empty())
}

/// Parse git-config style submodule sections into path -> remote.
///
/// Sections missing `path` or `url` are skipped, as are non-submodule sections.
pub fn parse_gitmodules(data: &str) -> Result<Submodules> {
    // Section names stay case-sensitive; subsection names are in git.
    let mut ini = Ini::new_cs();
    ini.read(data.to_string())
        .map_err(|e| AppError::Decode(format!("invalid .gitmodules: {}", e)))?;

    let mut out = Submodules::new();
    for (header, keys) in ini.get_map_ref() {
        let Some(rest) = header
            .get(..SECTION_PREFIX.len())
            .filter(|p| p.eq_ignore_ascii_case(SECTION_PREFIX))
            .map(|_| &header[SECTION_PREFIX.len()..])
        else {
            continue;
        };
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            continue;
        }

        let (Some(path), Some(url)) = (value_of(keys, "path"), value_of(keys, "url")) else {
            tracing::debug!("Skipping incomplete section [{}]", header);
            continue;
        };
        out.insert(
            path,
            Submodule {
                name: unquote(rest.trim()).to_string(),
                url,
                branch: value_of(keys, "branch"),
            },
        );
    }

    Ok(out)
}
