//! Strongly-typed value objects used by the admin console.
//!
//! These wrappers enforce basic invariants (path-safe identifiers, supported
//! page sizes) so that once a value reaches the listing engine or the
//! repository it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Identifier contained characters that cannot be used in a path segment.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
    /// Page size outside of the supported set.
    #[error("unsupported page size: {0}")]
    InvalidPageSize(usize),
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Backend identifier of an entity, safe to embed in a URL path.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Trims the raw identifier and rejects empty values or path separators.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        if trimmed
            .chars()
            .any(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace())
        {
            return Err(TypeConstraintError::InvalidId(trimmed));
        }
        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EntityId {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

/// Number of rows shown per list page.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "usize", into = "usize")]
pub enum PageSize {
    #[default]
    Ten,
    TwentyFive,
    Fifty,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Ten, PageSize::TwentyFive, PageSize::Fifty];

    /// Returns the number of rows as `usize`.
    pub const fn get(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
        }
    }
}

impl Display for PageSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl TryFrom<usize> for PageSize {
    type Error = TypeConstraintError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(PageSize::Ten),
            25 => Ok(PageSize::TwentyFive),
            50 => Ok(PageSize::Fifty),
            other => Err(TypeConstraintError::InvalidPageSize(other)),
        }
    }
}

impl From<PageSize> for usize {
    fn from(value: PageSize) -> Self {
        value.get()
    }
}

impl FromStr for PageSize {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<usize>()
            .map_err(|_| TypeConstraintError::InvalidValue(s.to_string()))?;
        Self::try_from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_rejects_path_separators() {
        assert_eq!(EntityId::new(" 42 ").unwrap().as_str(), "42");
        assert_eq!(EntityId::new("  "), Err(TypeConstraintError::EmptyString));
        assert!(matches!(
            EntityId::new("1/../2"),
            Err(TypeConstraintError::InvalidId(_))
        ));
    }

    #[test]
    fn page_size_accepts_only_supported_values() {
        assert_eq!(PageSize::try_from(25), Ok(PageSize::TwentyFive));
        assert_eq!("50".parse::<PageSize>(), Ok(PageSize::Fifty));
        assert_eq!(
            PageSize::try_from(20),
            Err(TypeConstraintError::InvalidPageSize(20))
        );
        assert_eq!(PageSize::default().get(), 10);
    }

    #[test]
    fn page_size_serializes_as_number() {
        assert_eq!(serde_json::to_string(&PageSize::Fifty).unwrap(), "50");
        let parsed: PageSize = serde_json::from_str("25").unwrap();
        assert_eq!(parsed, PageSize::TwentyFive);
        assert!(serde_json::from_str::<PageSize>("7").is_err());
    }
}
