use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a single DNS label
pub const MAX_LABEL_LEN: usize = 63;

/// Canonical tenant-scoping key: a lower-case, DNS-label-safe subdomain.
///
/// Construct with [`TenantKey::parse`]; any value of this type is already
/// normalized, so two keys compare equal iff they name the same tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantKey(String);

impl TenantKey {
    /// Normalize and validate a candidate label. Returns `None` for anything
    /// that is not a single DNS label.
    pub fn parse(candidate: &str) -> Option<Self> {
        let normalized = candidate.trim().to_ascii_lowercase();
        if is_dns_label(&normalized) {
            Some(Self(normalized))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `[a-z0-9-]{1,63}`, no leading or trailing hyphen. Expects lower-case input.
pub fn is_dns_label(label: &str) -> bool {
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return false;
    }
    if label.starts_with('-') || label.ends_with('-') {
        return false;
    }
    label
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TenantKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TenantKey::parse(&value).ok_or_else(|| format!("'{}' is not a valid subdomain", value))
    }
}

impl From<TenantKey> for String {
    fn from(key: TenantKey) -> Self {
        key.0
    }
}
