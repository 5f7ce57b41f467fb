//! Access control types
//!
//! Core types used by the access control system: entries, lists, scopes
//! and merge modes.

use crate::error::PolicyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether an entry grants or refuses an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclEffect {
    Allow,
    Deny,
}

impl AclEffect {
    pub const fn is_allow(&self) -> bool {
        matches!(self, AclEffect::Allow)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            AclEffect::Allow => "allow",
            AclEffect::Deny => "deny",
        }
    }

    /// Try to parse an effect from a string (case-insensitive)
    pub fn try_parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "allow" | "permit" => Some(AclEffect::Allow),
            "deny" => Some(AclEffect::Deny),
            _ => None,
        }
    }
}

impl fmt::Display for AclEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single `(role, action, effect)` rule
///
/// Entries have no identity and compare by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessControlEntry {
    pub role: String,
    pub action: String,
    pub effect: AclEffect,
}

impl AccessControlEntry {
    pub fn new(role: impl Into<String>, action: impl Into<String>, effect: AclEffect) -> Self {
        Self {
            role: role.into(),
            action: action.into(),
            effect,
        }
    }

    pub fn allow(role: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(role, action, AclEffect::Allow)
    }

    pub fn deny(role: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(role, action, AclEffect::Deny)
    }

    pub fn is_allow(&self) -> bool {
        self.effect.is_allow()
    }

    /// Reject entries with an empty role or action
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.role.is_empty() {
            return Err(PolicyError::invalid_entry(self.to_string(), "role is empty"));
        }
        if self.action.is_empty() {
            return Err(PolicyError::invalid_entry(
                self.to_string(),
                "action is empty",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for AccessControlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.role, self.action, self.effect)
    }
}

/// Parses `role:action:effect`.
///
/// Splits from the right so that roles containing `:` survive.
impl FromStr for AccessControlEntry {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let (Some(effect), Some(action), Some(role)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(PolicyError::invalid_entry(
                s,
                "expected the form role:action:allow|deny",
            ));
        };

        let effect = AclEffect::try_parse(effect).ok_or_else(|| {
            PolicyError::invalid_entry(s, format!("unknown effect '{}'", effect))
        })?;

        let entry = AccessControlEntry::new(role, action, effect);
        entry.validate().map_err(|_| {
            PolicyError::invalid_entry(s, "role and action must not be empty")
        })?;
        Ok(entry)
    }
}

/// An ordered list of access control entries
///
/// Order is kept for round-trip fidelity with the XACML codec; it has no
/// effect on evaluation. Duplicates are legal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessControlList {
    entries: Vec<AccessControlEntry>,
}

impl AccessControlList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<AccessControlEntry>) -> Self {
        Self { entries }
    }

    /// Append an entry
    pub fn add_entry(&mut self, role: impl Into<String>, action: impl Into<String>, effect: AclEffect) {
        self.entries.push(AccessControlEntry::new(role, action, effect));
    }

    /// Read-only view of the entries in insertion order
    pub fn entries(&self) -> &[AccessControlEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AccessControlEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<AccessControlEntry> for AccessControlList {
    fn from_iter<I: IntoIterator<Item = AccessControlEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<AccessControlEntry> for AccessControlList {
    fn extend<I: IntoIterator<Item = AccessControlEntry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for AccessControlList {
    type Item = AccessControlEntry;
    type IntoIter = std::vec::IntoIter<AccessControlEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a AccessControlList {
    type Item = &'a AccessControlEntry;
    type IntoIter = std::slice::Iter<'a, AccessControlEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Where an ACL came from, or what it was resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclScope {
    /// Policy attached to the episode itself
    Episode,
    /// Policy inherited from the episode's series
    Series,
    /// Episode and series policies combined by the merge engine
    Merged,
    /// No policy found; the empty default-deny list
    Global,
}

impl AclScope {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AclScope::Episode => "episode",
            AclScope::Series => "series",
            AclScope::Merged => "merged",
            AclScope::Global => "global",
        }
    }

    /// Try to parse a scope from a string
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "episode" => Some(AclScope::Episode),
            "series" => Some(AclScope::Series),
            "merged" => Some(AclScope::Merged),
            "global" => Some(AclScope::Global),
            _ => None,
        }
    }

    /// Get all scopes
    pub fn all() -> &'static [AclScope] {
        &[
            AclScope::Episode,
            AclScope::Series,
            AclScope::Merged,
            AclScope::Global,
        ]
    }

    /// Only episode and series policies exist as stored documents
    pub const fn is_storable(&self) -> bool {
        matches!(self, AclScope::Episode | AclScope::Series)
    }

    /// Attachment flavor tagging a stored policy of this scope
    pub const fn flavor(&self) -> Option<&'static str> {
        match self {
            AclScope::Episode => Some("security/xacml+episode"),
            AclScope::Series => Some("security/xacml+series"),
            AclScope::Merged | AclScope::Global => None,
        }
    }

    /// File name hint used when storing a policy of this scope
    pub const fn filename(&self) -> Option<&'static str> {
        match self {
            AclScope::Episode => Some("xacml-episode.xml"),
            AclScope::Series => Some("xacml-series.xml"),
            AclScope::Merged | AclScope::Global => None,
        }
    }
}

impl fmt::Display for AclScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strategy for combining a series ACL with an episode ACL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// The episode ACL replaces the series ACL entirely
    #[default]
    Override,
    /// The episode replaces all series entries of every role it mentions
    Roles,
    /// The episode replaces series entries per `(role, action)` pair
    Actions,
}

impl MergeMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MergeMode::Override => "override",
            MergeMode::Roles => "roles",
            MergeMode::Actions => "actions",
        }
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "override" => Some(MergeMode::Override),
            "roles" => Some(MergeMode::Roles),
            "actions" => Some(MergeMode::Actions),
            _ => None,
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
