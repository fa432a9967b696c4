//! Wire types for the Jules sessions API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{JulesError, Result};

const SESSION_PREFIX: &str = "sessions/";

/// Canonical `sessions/{id}` reference.
///
/// Every entry point normalizes through [`SessionName::parse`], so a bare id
/// and a full resource name address the same session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionName(String);

impl SessionName {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let id = trimmed.strip_prefix(SESSION_PREFIX).unwrap_or(trimmed);
        if id.is_empty() {
            return Err(JulesError::InvalidSession(format!(
                "empty session id in {raw:?}"
            )));
        }
        if let Some(bad) = id.chars().find(|c| !is_id_char(*c)) {
            return Err(JulesError::InvalidSession(format!(
                "session id {id:?} contains {bad:?}; expected ASCII letters, digits, '-', '_' or '.'"
            )));
        }
        Ok(Self(format!("{SESSION_PREFIX}{id}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare id without the `sessions/` prefix.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0[SESSION_PREFIX.len()..]
    }
}

/// Session ids are pasted into request paths unencoded.
const fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which party produced an activity.
///
/// Values outside the known set are kept verbatim so activities pass
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Originator {
    User,
    Agent,
    System,
    Other(String),
}

impl Originator {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::System => "system",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for Originator {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "user" => Self::User,
            "agent" => Self::Agent,
            "system" => Self::System,
            _ => Self::Other(raw),
        }
    }
}

impl From<Originator> for String {
    fn from(originator: Originator) -> Self {
        match originator {
            Originator::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Originator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable entry of a session's activity log.
///
/// The payload lives in `extra` under a key naming its shape
/// (`userMessaged`, `agentMessaged`, `planGenerated`, ...). Unknown fields
/// are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originator: Option<Originator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    /// Name of the first object-valued extension field, i.e. the payload kind.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.extra
            .iter()
            .find(|(_, value)| value.is_object())
            .map(|(key, _)| key.as_str())
    }

    /// Whether `field` is present on the activity's JSON representation.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        match field {
            "id" => true,
            "name" => self.name.is_some(),
            "originator" => self.originator.is_some(),
            "createTime" => self.create_time.is_some(),
            "description" => self.description.is_some(),
            other => self.extra.contains_key(other),
        }
    }
}

/// One response of `GET {session}/activities`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl Page {
    /// Continuation token, treating an empty string as end of stream.
    #[must_use]
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Caller-held resume state for incremental polling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeCursor {
    #[serde(rename = "lastId", default)]
    pub last_id: Option<String>,
    #[serde(rename = "lastPageToken", default)]
    pub last_token: Option<String>,
}

impl ResumeCursor {
    #[must_use]
    pub fn new(last_id: Option<String>, last_token: Option<String>) -> Self {
        Self {
            last_id,
            last_token,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.last_id.is_none() && self.last_token.is_none()
    }
}
