//! Decoding of the appliance's "selected option" enumerations.
//!
//! Option fields come back from `get*` endpoints as every candidate the
//! appliance knows about, each flagged with whether it is the current choice:
//!
//! ```json
//! "gateway": {
//!     "WAN_DHCP": { "value": "WAN_DHCP - 10.0.0.1", "selected": 0 },
//!     "Null4":    { "value": "Null4 - 127.0.0.1",   "selected": 1 }
//! }
//! ```
//!
//! [`SelectedMap`] collapses that into the selected key (`"Null4"`). When the
//! same type is sent back in a request it serializes as the bare key, which is
//! what the `add*`/`set*` endpoints expect.

use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Value of the `selected` flag marking the chosen entry.
const SELECTED: i64 = 1;

#[derive(Debug, Deserialize)]
struct OptionEntry {
    #[serde(default)]
    #[allow(dead_code)]
    value: String,
    #[serde(default)]
    selected: i64,
}

impl OptionEntry {
    const fn is_selected(&self) -> bool {
        self.selected == SELECTED
    }
}

/// Candidate map as sent by the appliance; `null` entries and a `null` map
/// carry no selection.
type OptionEntries = Option<BTreeMap<String, Option<OptionEntry>>>;

/// Key of the selected entry of an appliance enumeration.
///
/// The decode is lossy: only the selection survives, not the candidate list.
/// An empty string means no entry was selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectedMap(String);

impl SelectedMap {
    /// Wraps an already-selected key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Decodes an enumeration from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns the parser error when `data` is not a map of
    /// `{ "value": string, "selected": integer }` records.
    pub fn decode(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// Encodes the selection as the bare JSON string.
    ///
    /// # Errors
    ///
    /// Only fails if the serializer itself fails.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// The selected key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts into the selected key.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// True when nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Picks the selected key out of a decoded enumeration.
    ///
    /// Several entries claiming `selected: 1` violate the appliance's own
    /// invariant; the lexicographically smallest such key wins so the result
    /// does not depend on map order.
    fn from_entries(entries: &BTreeMap<String, Option<OptionEntry>>) -> Self {
        entries
            .iter()
            .find(|(_, entry)| entry.as_ref().is_some_and(OptionEntry::is_selected))
            .map(|(key, _)| Self(key.clone()))
            .unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for SelectedMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(entries) = OptionEntries::deserialize(deserializer).map_err(|err| {
            D::Error::custom(format!("expected a selected-option map: {err}"))
        })?
        else {
            return Ok(Self::default());
        };

        let selected_count = entries
            .values()
            .flatten()
            .filter(|entry| entry.is_selected())
            .count();
        if selected_count > 1 {
            tracing::debug!(
                selected_count,
                "enumeration has more than one selected entry; using the smallest key"
            );
        }

        Ok(Self::from_entries(&entries))
    }
}

impl Serialize for SelectedMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl From<String> for SelectedMap {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for SelectedMap {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<SelectedMap> for String {
    fn from(selected: SelectedMap) -> Self {
        selected.0
    }
}

impl AsRef<str> for SelectedMap {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for SelectedMap {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for SelectedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
