use crate::{
    commands::{Commands, Mode},
    error::CliError,
    input::{parse_document, parse_optional, read_documents},
};
use clap::Parser;
use engine_config::settings::{self, PagingSettings, PagingSettingsBuilder};
use engine_core::{connectors::memory::MemoryStore, find::WindowedFind};
use model::{
    pagination::cursor::{CursorRequest, KeysetCursorRequest, OffsetCursorRequest},
    query::Query,
    sort::Sort,
};
use planner::query::{fetch_size, plan};
use std::{path::Path, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod input;
mod output;

const DATA_COLLECTION: &str = "data";

#[derive(Parser)]
#[command(name = "keyset", version = "0.1.0", about = "Keyset pagination for document queries")]
struct Cli {
    #[arg(long, global = true, help = "Paging settings file (JSON)")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref().map(Path::new);

    match cli.command {
        Commands::Plan {
            query,
            fields,
            sort,
            size,
            keys,
            offset,
            id_field,
        } => {
            let settings = load_settings(config, id_field)?;
            let query = Query::new(parse_document("query", &query)?)
                .with_fields(parse_optional("fields", fields.as_deref())?);
            let sort: Sort = sort.parse()?;
            let size = settings.page_size(size)?;

            let request: CursorRequest = match offset {
                Some(offset) => OffsetCursorRequest::of_size(size, sort)
                    .with_offset(offset)
                    .into(),
                None => {
                    let keys = parse_optional("keys", keys.as_deref())?;
                    keyset_request(size, sort, keys)
                }
            };

            let planned = plan(
                &query,
                &request,
                settings.id_field(),
                settings.or_clause_policy(),
            )?;
            output::emit(&output::plan_json(&planned, fetch_size(&request)), None).await?;
        }
        Commands::Page {
            data,
            filter,
            fields,
            sort,
            size,
            mode,
            max_pages,
            id_field,
            output,
        } => {
            let settings = load_settings(config, id_field)?;
            let query = Query::new(parse_document("filter", &filter)?)
                .with_fields(parse_optional("fields", fields.as_deref())?);
            let sort: Sort = sort.parse()?;
            let size = settings.page_size(size)?;

            let store = MemoryStore::new();
            let loaded = store
                .insert_many(DATA_COLLECTION, read_documents(Path::new(&data)).await?)
                .await;
            info!("Loaded {loaded} documents from {data}");

            let request: CursorRequest = match mode {
                Mode::Keyset => KeysetCursorRequest::of_size(size, sort).into(),
                Mode::Offset => OffsetCursorRequest::of_size(size, sort).into(),
            };

            let finder = WindowedFind::new(Arc::new(store), settings);
            let windows = finder
                .find_windows(DATA_COLLECTION, &query, &request, max_pages)
                .await?;
            info!("Fetched {} windows", windows.len());

            output::emit(&output::windows_json(windows)?, output.as_deref()).await?;
        }
    }

    Ok(())
}

fn load_settings(config: Option<&Path>, id_field: Option<String>) -> Result<PagingSettings, CliError> {
    let mut overrides = PagingSettingsBuilder::new();
    if let Some(id_field) = id_field {
        overrides = overrides.id_field(id_field);
    }
    Ok(settings::load_with(config, overrides)?)
}

fn keyset_request(size: usize, sort: Sort, keys: bson::Document) -> CursorRequest {
    let request = KeysetCursorRequest::of_size(size, sort);
    if keys.is_empty() {
        request.into()
    } else {
        request.with_next(keys).into()
    }
}
