//! Permission scopes — validated `category:action:resource` strings.
//!
//! Scopes are compared by exact string match. There is no wildcard or
//! hierarchy matching; a grant either contains the required scope or the
//! request is rejected.

use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Scope category used by the workplace search tool.
pub const WORKPLACE_CATEGORY: &str = "workplace";

/// Scope action used by the workplace search tool.
pub const READ_ACTION: &str = "read";

/// A single permission scope of the form `category:action:resource`.
///
/// Validated at construction: exactly three colon-separated, non-empty
/// segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scope(String);

impl Scope {
    /// Parse and validate a scope string.
    pub fn parse(raw: &str) -> Result<Self> {
        let segments: Vec<&str> = raw.split(':').collect();
        if segments.len() != 3 {
            return Err(Error::validation(format!(
                "scope '{}' must have exactly three colon-separated segments",
                raw
            )));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::validation(format!(
                "scope '{}' has an empty segment",
                raw
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// The scope required to search a workplace source.
    ///
    /// `source` must be a registered connector name; connector names are
    /// non-empty and contain no ':' (enforced at registration), so the
    /// resulting scope is always well-formed.
    pub fn for_source_read(source: &str) -> Self {
        Self(format!("{}:{}:{}", WORKPLACE_CATEGORY, READ_ACTION, source))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn category(&self) -> &str {
        self.segment(0)
    }

    pub fn action(&self) -> &str {
        self.segment(1)
    }

    pub fn resource(&self) -> &str {
        self.segment(2)
    }

    fn segment(&self, index: usize) -> &str {
        // Construction guarantees three segments.
        self.0.split(':').nth(index).unwrap_or("")
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Scope {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.0
    }
}

/// An ordered set of granted scopes, checked by exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSet(BTreeSet<Scope>);

impl ScopeSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Build a scope set from raw strings, dropping malformed entries.
    ///
    /// Returns the valid set plus the rejected raw strings so the caller can
    /// log them. A malformed granted scope is treated as absent (fail-closed)
    /// rather than aborting verification.
    pub fn from_strings(raw: &[String]) -> (Self, Vec<String>) {
        let mut scopes = BTreeSet::new();
        let mut rejected = Vec::new();
        for entry in raw {
            match Scope::parse(entry) {
                Ok(scope) => {
                    scopes.insert(scope);
                }
                Err(_) => rejected.push(entry.clone()),
            }
        }
        (Self(scopes), rejected)
    }

    pub fn insert(&mut self, scope: Scope) -> bool {
        self.0.insert(scope)
    }

    pub fn contains(&self, scope: &Scope) -> bool {
        self.0.contains(scope)
    }

    /// True if any granted scope has the given category and action,
    /// regardless of resource. Used for tool-listing visibility, never for
    /// the authorization decision itself.
    pub fn has_grant_for(&self, category: &str, action: &str) -> bool {
        self.0
            .iter()
            .any(|s| s.category() == category && s.action() == action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Scope> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = Scope>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_valid_scope() {
        let scope = Scope::parse("workplace:read:google_drive").unwrap();
        assert_eq!(scope.category(), "workplace");
        assert_eq!(scope.action(), "read");
        assert_eq!(scope.resource(), "google_drive");
    }

    #[test]
    fn test_parse_rejects_wrong_segment_count() {
        assert!(Scope::parse("workplace:read").is_err());
        assert!(Scope::parse("workplace:read:google_drive:extra").is_err());
        assert!(Scope::parse("workplace").is_err());
        assert!(Scope::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        assert!(Scope::parse("workplace::google_drive").is_err());
        assert!(Scope::parse(":read:google_drive").is_err());
        assert!(Scope::parse("workplace:read:").is_err());
    }

    #[test]
    fn test_exact_match_no_hierarchy() {
        let (granted, _) = ScopeSet::from_strings(&["workplace:read:google_drive".to_string()]);
        assert!(granted.contains(&Scope::for_source_read("google_drive")));
        assert!(!granted.contains(&Scope::for_source_read("notion")));
        // A broader-looking grant does not imply narrower ones.
        let (granted, _) = ScopeSet::from_strings(&["workplace:read:all".to_string()]);
        assert!(!granted.contains(&Scope::for_source_read("notion")));
    }

    #[test]
    fn test_from_strings_drops_malformed() {
        let raw = vec![
            "workplace:read:notion".to_string(),
            "not-a-scope".to_string(),
            "workplace:read:".to_string(),
        ];
        let (granted, rejected) = ScopeSet::from_strings(&raw);
        assert_eq!(granted.len(), 1);
        assert_eq!(rejected, vec!["not-a-scope", "workplace:read:"]);
    }

    #[test]
    fn test_has_grant_for() {
        let (granted, _) = ScopeSet::from_strings(&[
            "workplace:read:notion".to_string(),
            "calendar:write:primary".to_string(),
        ]);
        assert!(granted.has_grant_for("workplace", "read"));
        assert!(granted.has_grant_for("calendar", "write"));
        assert!(!granted.has_grant_for("workplace", "write"));
        assert!(!granted.has_grant_for("mail", "read"));
    }

    proptest! {
        #[test]
        fn prop_valid_triples_round_trip(
            category in "[a-z]{1,12}",
            action in "[a-z]{1,12}",
            resource in "[a-z_]{1,16}",
        ) {
            let raw = format!("{}:{}:{}", category, action, resource);
            let scope = Scope::parse(&raw).unwrap();
            prop_assert_eq!(scope.to_string(), raw);
            prop_assert_eq!(scope.category(), category.as_str());
            prop_assert_eq!(scope.resource(), resource.as_str());
        }

        #[test]
        fn prop_wrong_segment_count_rejected(s in "[a-z_]+(:[a-z_]+)?") {
            // One or two segments, never three.
            prop_assert!(Scope::parse(&s).is_err());
        }
    }
}
