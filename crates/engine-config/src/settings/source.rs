use crate::{error::ConfigError, settings::validated::PagingSettingsBuilder};
use std::path::Path;
use tracing::debug;

pub const ENV_PREFIX: &str = "KEYSET_";

/// Reads a JSON settings file.
pub fn from_file(path: &Path) -> Result<PagingSettingsBuilder, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = serde_json::from_str(&content)?;
    debug!("Read paging settings from {}", path.display());
    Ok(builder)
}

/// Collects `KEYSET_*` overrides. Unknown `KEYSET_*` keys are ignored.
pub fn from_env_vars<I>(vars: I) -> Result<PagingSettingsBuilder, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut builder = PagingSettingsBuilder::new();

    for (key, value) in vars {
        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let value = value.trim();

        builder = match name {
            "ID_FIELD" => builder.id_field(value),
            "DEFAULT_PAGE_SIZE" => builder.default_page_size(parse_usize(&key, value)?),
            "MAX_PAGE_SIZE" => builder.max_page_size(parse_usize(&key, value)?),
            "OR_POLICY" => builder.or_clause_policy(
                value
                    .parse()
                    .map_err(|e| ConfigError::invalid_value(&key, format!("{e}")))?,
            ),
            "MAX_TIME" => builder.max_time(value),
            _ => continue,
        };
        debug!("Applied environment override {key}");
    }

    Ok(builder)
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::invalid_value(key, format!("'{value}' is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner::query::OrClausePolicy;
    use std::{io::Write, time::Duration};

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_overrides() {
        let builder = from_env_vars(vars(&[
            ("KEYSET_ID_FIELD", "uid"),
            ("KEYSET_MAX_PAGE_SIZE", "40"),
            ("KEYSET_OR_POLICY", "append"),
            ("KEYSET_MAX_TIME", "1500"),
            ("KEYSET_UNKNOWN", "x"),
            ("PATH", "/usr/bin"),
        ]))
        .unwrap();

        let settings = builder.build().unwrap();
        assert_eq!(settings.id_field(), "uid");
        assert_eq!(settings.max_page_size(), 40);
        assert_eq!(settings.or_clause_policy(), OrClausePolicy::Append);
        assert_eq!(settings.max_time(), Some(Duration::from_millis(1_500)));
    }

    #[test]
    fn test_env_rejects_bad_numbers() {
        let err = from_env_vars(vars(&[("KEYSET_DEFAULT_PAGE_SIZE", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = from_env_vars(vars(&[("KEYSET_OR_POLICY", "merge")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "id_field": "id", "default_page_size": 3, "or_clause_policy": "append", "max_time": "PT1S" }}"#
        )
        .unwrap();

        let settings = from_file(file.path()).unwrap().build().unwrap();
        assert_eq!(settings.id_field(), "id");
        assert_eq!(settings.default_page_size(), 3);
        assert_eq!(settings.or_clause_policy(), OrClausePolicy::Append);
        assert_eq!(settings.max_time(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_from_file_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "page": 3 }}"#).unwrap();
        assert!(matches!(from_file(file.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = from_file(Path::new("/nonexistent/keyset.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
