use engine_config::error::ConfigError;
use engine_core::error::EngineError;
use model::error::ModelError;
use planner::error::PlannerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid extended JSON: {0}")]
    ExtendedJson(#[from] bson::extjson::de::Error),

    #[error("Expected a JSON object for {0}")]
    NotADocument(String),

    #[error("Invalid settings: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid argument: {0}")]
    Model(#[from] ModelError),

    #[error("Failed to plan the window query: {0}")]
    Planner(#[from] PlannerError),

    #[error("Failed to fetch windows: {0}")]
    Engine(#[from] EngineError),
}
