//! Identifier of an object stored on the appliance.
//!
//! OPNsense hands out UUIDs, but the core treats them as opaque strings: they
//! are only ever echoed back in request paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier returned by a successful create.
///
/// Update endpoints answer `saved` without echoing an identifier, so an empty
/// value is legal and means "no identifier was returned".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Wraps an identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts into the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// True when the appliance did not return an identifier.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Some(self)` unless empty.
    #[must_use]
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ResourceId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ResourceId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_compare() {
        let id = ResourceId::from("5e4a1c7b-0d6e-4c4f-9a51-2f1f8a6f0b11");
        assert_eq!(id.to_string(), "5e4a1c7b-0d6e-4c4f-9a51-2f1f8a6f0b11");
        assert_eq!(id, "5e4a1c7b-0d6e-4c4f-9a51-2f1f8a6f0b11");
    }

    #[test]
    fn test_empty_identifier() {
        let id = ResourceId::default();
        assert!(id.is_empty());
        assert!(id.non_empty().is_none());
        assert_eq!(ResourceId::new("abc").non_empty(), Some(ResourceId::new("abc")));
    }

    #[test]
    fn test_serde_transparent() {
        let id: ResourceId = serde_json::from_str("\"abc-1\"").unwrap();
        assert_eq!(id.as_str(), "abc-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-1\"");
    }
}
