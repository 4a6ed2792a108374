use crate::{
    duration::{DurationStyle, DurationUnit},
    error::ConfigError,
};
use planner::query::OrClausePolicy;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ID_FIELD: &str = "_id";
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;

/// Immutable, validated configuration used when paging through collections.
#[derive(Debug, Clone, PartialEq)]
pub struct PagingSettings {
    /// Unique field appended to every sort as the final tiebreaker
    pub id_field: String,
    /// Page size used when a caller does not ask for one
    pub default_page_size: usize,
    /// Largest page size a request may ask for
    pub max_page_size: usize,
    /// How keyset predicates combine with a top-level `$or` in the base filter
    pub or_clause_policy: OrClausePolicy,
    /// Time limit for a single window query
    pub max_time: Option<Duration>,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            or_clause_policy: OrClausePolicy::Reject,
            max_time: None,
        }
    }
}

impl PagingSettings {
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    pub fn or_clause_policy(&self) -> OrClausePolicy {
        self.or_clause_policy
    }

    pub fn max_time(&self) -> Option<Duration> {
        self.max_time
    }

    /// Page size for a request, falling back to the default when none was given.
    pub fn page_size(&self, requested: Option<usize>) -> Result<usize, ConfigError> {
        let size = requested.unwrap_or(self.default_page_size);
        if size == 0 || size > self.max_page_size {
            return Err(ConfigError::invalid_value(
                "page_size",
                format!("{size} is outside 1..={}", self.max_page_size),
            ));
        }
        Ok(size)
    }
}

/// Unvalidated settings as read from a file or the environment.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagingSettingsBuilder {
    pub id_field: Option<String>,
    pub default_page_size: Option<usize>,
    pub max_page_size: Option<usize>,
    pub or_clause_policy: Option<OrClausePolicy>,
    /// Duration string, e.g. `"5s"` or `"PT5S"`. Bare numbers are milliseconds.
    pub max_time: Option<String>,
}

impl PagingSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = Some(id_field.into());
        self
    }

    pub fn default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = Some(size);
        self
    }

    pub fn max_page_size(mut self, size: usize) -> Self {
        self.max_page_size = Some(size);
        self
    }

    pub fn or_clause_policy(mut self, policy: OrClausePolicy) -> Self {
        self.or_clause_policy = Some(policy);
        self
    }

    pub fn max_time(mut self, max_time: impl Into<String>) -> Self {
        self.max_time = Some(max_time.into());
        self
    }

    /// Values set in `other` replace the values of `self`.
    pub fn merge(self, other: PagingSettingsBuilder) -> Self {
        Self {
            id_field: other.id_field.or(self.id_field),
            default_page_size: other.default_page_size.or(self.default_page_size),
            max_page_size: other.max_page_size.or(self.max_page_size),
            or_clause_policy: other.or_clause_policy.or(self.or_clause_policy),
            max_time: other.max_time.or(self.max_time),
        }
    }

    pub fn build(self) -> Result<PagingSettings, ConfigError> {
        let defaults = PagingSettings::default();

        let id_field = self.id_field.unwrap_or(defaults.id_field);
        if id_field.trim().is_empty() {
            return Err(ConfigError::invalid_value("id_field", "must not be empty"));
        }

        let max_page_size = self.max_page_size.unwrap_or(defaults.max_page_size);
        if max_page_size == 0 {
            return Err(ConfigError::invalid_value(
                "max_page_size",
                "must be greater than zero",
            ));
        }

        let default_page_size = self
            .default_page_size
            .unwrap_or(defaults.default_page_size.min(max_page_size));
        if default_page_size == 0 || default_page_size > max_page_size {
            return Err(ConfigError::invalid_value(
                "default_page_size",
                format!("{default_page_size} is outside 1..={max_page_size}"),
            ));
        }

        let max_time = self
            .max_time
            .as_deref()
            .map(|value| DurationStyle::detect_and_parse(value, Some(DurationUnit::Millis)))
            .transpose()?;

        Ok(PagingSettings {
            id_field,
            default_page_size,
            max_page_size,
            or_clause_policy: self.or_clause_policy.unwrap_or(defaults.or_clause_policy),
            max_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PagingSettingsBuilder::new().build().unwrap();
        assert_eq!(settings, PagingSettings::default());
        assert_eq!(settings.id_field(), "_id");
        assert_eq!(settings.page_size(None).unwrap(), 20);
        assert!(settings.max_time().is_none());
    }

    #[test]
    fn test_builder() {
        let settings = PagingSettingsBuilder::new()
            .id_field("uuid")
            .default_page_size(5)
            .max_page_size(50)
            .or_clause_policy(OrClausePolicy::Append)
            .max_time("PT2S")
            .build()
            .unwrap();

        assert_eq!(settings.id_field(), "uuid");
        assert_eq!(settings.page_size(None).unwrap(), 5);
        assert_eq!(settings.page_size(Some(50)).unwrap(), 50);
        assert!(settings.page_size(Some(51)).is_err());
        assert!(settings.page_size(Some(0)).is_err());
        assert_eq!(settings.or_clause_policy(), OrClausePolicy::Append);
        assert_eq!(settings.max_time(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_small_max_caps_default() {
        let settings = PagingSettingsBuilder::new().max_page_size(10).build().unwrap();
        assert_eq!(settings.default_page_size(), 10);
    }

    #[test]
    fn test_invalid_values() {
        assert!(PagingSettingsBuilder::new().id_field(" ").build().is_err());
        assert!(PagingSettingsBuilder::new().max_page_size(0).build().is_err());
        assert!(
            PagingSettingsBuilder::new()
                .default_page_size(100)
                .max_page_size(10)
                .build()
                .is_err()
        );
        assert!(matches!(
            PagingSettingsBuilder::new().max_time("soon").build(),
            Err(ConfigError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_merge_prefers_other() {
        let file = PagingSettingsBuilder::new().id_field("id").default_page_size(7);
        let env = PagingSettingsBuilder::new().default_page_size(9);

        let settings = file.merge(env).build().unwrap();
        assert_eq!(settings.id_field(), "id");
        assert_eq!(settings.default_page_size(), 9);
    }
}
