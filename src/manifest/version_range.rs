// src/manifest/version_range.rs
//! Maven version ranges to Fabric version predicates
//!
//! | Maven        | Fabric         |
//! |--------------|----------------|
//! | `[1.14.4]`   | `1.14.4`       |
//! | `[1,2)`      | `>=1 <2`       |
//! | `(1,2]`      | `>1 <=2`       |
//! | `[28,)`      | `>=28`         |
//! | `(,2)`       | `<2`           |
//! | `1.0`        | `>=1.0`        |
//! | `[1,2),[3,)` | `[">=1 <2", ">=3"]` |

use super::ManifestError;
use serde::Serialize;

/// A Fabric dependency predicate: one string, or any of several
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VersionPredicate {
    One(String),
    Any(Vec<String>),
}

impl VersionPredicate {
    pub fn any_version() -> Self {
        VersionPredicate::One("*".to_string())
    }
}

/// Convert a Maven range (as used by `versionRange`) to a Fabric predicate
pub fn convert(range: &str) -> Result<VersionPredicate, ManifestError> {
    let range = range.trim();
    if range.is_empty() || range == "*" {
        return Ok(VersionPredicate::any_version());
    }

    if !range.starts_with(['[', '(']) {
        // Soft requirement: "this version or anything newer"
        if range.contains([',', ']', ')']) {
            return Err(bad(range, "unexpected range delimiter"));
        }
        return Ok(VersionPredicate::One(format!(">={}", range)));
    }

    let mut predicates = Vec::new();
    let mut rest = range;
    while !rest.is_empty() {
        let end = rest
            .find([']', ')'])
            .ok_or_else(|| bad(range, "unterminated range"))?;
        predicates.push(convert_restriction(&rest[..=end], range)?);

        rest = rest[end + 1..].trim_start();
        if let Some(after) = rest.strip_prefix(',') {
            rest = after.trim_start();
            if rest.is_empty() {
                return Err(bad(range, "trailing comma"));
            }
        } else if !rest.is_empty() {
            return Err(bad(range, "ranges must be separated by commas"));
        }
    }

    Ok(match predicates.len() {
        1 => VersionPredicate::One(predicates.remove(0)),
        _ => VersionPredicate::Any(predicates),
    })
}

/// One bracketed restriction such as `[1,2)`
fn convert_restriction(restriction: &str, whole: &str) -> Result<String, ManifestError> {
    if !restriction.starts_with(['[', '(']) {
        return Err(bad(whole, "expected '[' or '('"));
    }
    let inclusive_low = restriction.starts_with('[');
    let inclusive_high = restriction.ends_with(']');
    let inner = &restriction[1..restriction.len() - 1];
    if inner.contains(['[', '(']) {
        return Err(bad(whole, "nested brackets"));
    }

    match inner.split_once(',') {
        None => {
            let version = inner.trim();
            if !(inclusive_low && inclusive_high) || version.is_empty() {
                return Err(bad(whole, "an exact version must be written as [x]"));
            }
            Ok(version.to_string())
        }
        Some((low, high)) => {
            let (low, high) = (low.trim(), high.trim());
            if high.contains(',') {
                return Err(bad(whole, "too many bounds"));
            }
            let mut parts = Vec::new();
            if !low.is_empty() {
                parts.push(format!("{}{}", if inclusive_low { ">=" } else { ">" }, low));
            }
            if !high.is_empty() {
                parts.push(format!("{}{}", if inclusive_high { "<=" } else { "<" }, high));
            }
            if parts.is_empty() {
                Ok("*".to_string())
            } else {
                Ok(parts.join(" "))
            }
        }
    }
}

fn bad(range: &str, reason: &str) -> ManifestError {
    ManifestError::BadVersionRange {
        range: range.to_string(),
        reason: reason.to_string(),
    }
}
