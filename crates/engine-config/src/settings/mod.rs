use crate::error::ConfigError;
use std::path::Path;
use tracing::info;

pub mod source;
pub mod validated;

pub use validated::{PagingSettings, PagingSettingsBuilder};

/// Loads paging settings from an optional JSON file, then applies `KEYSET_*`
/// environment overrides and validates the result.
pub fn load(path: Option<&Path>) -> Result<PagingSettings, ConfigError> {
    load_with(path, PagingSettingsBuilder::new())
}

/// Like [`load`], with `overrides` (e.g. command line flags) applied last.
pub fn load_with(
    path: Option<&Path>,
    overrides: PagingSettingsBuilder,
) -> Result<PagingSettings, ConfigError> {
    let file = match path {
        Some(path) => source::from_file(path)?,
        None => PagingSettingsBuilder::new(),
    };
    let env = source::from_env_vars(std::env::vars())?;

    let settings = file.merge(env).merge(overrides).build()?;
    info!(
        id_field = settings.id_field(),
        default_page_size = settings.default_page_size(),
        max_page_size = settings.max_page_size(),
        or_clause_policy = ?settings.or_clause_policy(),
        "Loaded paging settings"
    );
    Ok(settings)
}
