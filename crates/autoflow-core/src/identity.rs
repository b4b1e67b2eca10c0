//! # Identifier Newtypes
//!
//! String identifiers that validate their format at construction time.
//! Both serialize as plain strings and reject malformed input on
//! deserialization.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Slug identifying a tutorial, e.g. `git-basics`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema), schema(value_type = String))]
pub struct TutorialId(String);

impl TutorialId {
    /// Maximum slug length.
    pub const MAX_LEN: usize = 64;

    /// Create a validated tutorial id.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let valid = !raw.is_empty()
            && raw.len() <= Self::MAX_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if valid {
            Ok(Self(raw))
        } else {
            Err(ValidationError::InvalidTutorialId(raw))
        }
    }

    /// Borrow the slug.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TutorialId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TutorialId> for String {
    fn from(id: TutorialId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TutorialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account username. Same alphabet GitHub allows, plus underscore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema), schema(value_type = String))]
pub struct Username(String);

impl Username {
    /// Create a validated username.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        let valid = (3..=39).contains(&trimmed.len())
            && trimmed
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ValidationError::InvalidUsername(raw))
        }
    }

    /// Borrow the username.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form used for uniqueness checks.
    pub fn canonical(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl TryFrom<String> for Username {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(name: Username) -> Self {
        name.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
