//! Domain records cached by the collection layer.
//!
//! Anything stored in a [`crate::CollectionEntry`] implements [`Record`]:
//! a stable unique identifier plus the display text the client-side search
//! matches against. Two concrete record types live here - contact
//! [`Profile`]s and [`BoostSummary`] template listings - along with the
//! [`Recipient`] wire shape used by connection-request endpoints.

use serde::{Deserialize, Serialize};

/// A cacheable domain entity with a stable unique identifier.
///
/// Identifiers must be unique within one collection's flattened record
/// list; the cache enforces this at write time.
pub trait Record: Clone + Send + Sync + 'static {
    /// Stable unique id (a profile id, a boost URI, ...).
    fn record_id(&self) -> &str;

    /// Display text the client-side search filter matches against.
    fn search_text(&self) -> String;
}

/// A contact profile as returned by the network layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub profile_id: String,
    pub display_name: String,
    pub bio: String,
    pub short_bio: String,
    pub did: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Profile {
    pub fn new(profile_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Profile {
            profile_id: profile_id.into(),
            display_name: display_name.into(),
            ..Profile::default()
        }
    }

    /// Minimal record synthesized when a profile is blocked before the
    /// server round trip settles. Only the id is known at that point.
    pub fn placeholder(profile_id: impl Into<String>) -> Self {
        Profile {
            profile_id: profile_id.into(),
            ..Profile::default()
        }
    }
}

impl Record for Profile {
    fn record_id(&self) -> &str {
        &self.profile_id
    }

    fn search_text(&self) -> String {
        format!("{} {}", self.display_name, self.profile_id)
    }
}

/// Summary of a managed boost template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoostSummary {
    pub uri: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl BoostSummary {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        BoostSummary {
            uri: uri.into(),
            name: name.into(),
            category: None,
        }
    }
}

impl Record for BoostSummary {
    fn record_id(&self) -> &str {
        &self.uri
    }

    fn search_text(&self) -> String {
        match &self.category {
            Some(category) => format!("{} {}", self.name, category),
            None => self.name.clone(),
        }
    }
}

/// Wire shape for connection-request recipients.
///
/// The network layer returns either a bare profile or a `{ "to": profile }`
/// wrapper depending on the endpoint. Both shapes deserialize into this
/// union and are normalized to a plain [`Profile`] at cache-write time via
/// [`Recipient::into_profile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipient {
    Wrapped { to: Profile },
    Direct(Profile),
}

impl Recipient {
    /// Normalize to the inner profile, discarding the wrapper.
    pub fn into_profile(self) -> Profile {
        match self {
            Recipient::Wrapped { to } => to,
            Recipient::Direct(profile) => profile,
        }
    }

    pub fn profile(&self) -> &Profile {
        match self {
            Recipient::Wrapped { to } => to,
            Recipient::Direct(profile) => profile,
        }
    }
}

impl Record for Recipient {
    fn record_id(&self) -> &str {
        self.profile().record_id()
    }

    fn search_text(&self) -> String {
        self.profile().search_text()
    }
}
