use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Handler error on topic '{topic}': {reason}")]
    HandlerError { topic: String, reason: String },

    #[error("Module error in {module}: {reason}")]
    ModuleError { module: String, reason: String },

    #[error("Unexpected payload on topic '{0}'")]
    UnexpectedPayload(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid scheduler state: {0}")]
    InvalidState(String),

    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid value for '{name}': {value}")]
    InvalidParameter { name: &'static str, value: String },
}

impl SimulationError {
    pub fn module(module: &str, reason: impl Into<String>) -> Self {
        SimulationError::ModuleError {
            module: module.to_string(),
            reason: reason.into(),
        }
    }

    pub fn handler(topic: &str, reason: impl Into<String>) -> Self {
        SimulationError::HandlerError {
            topic: topic.to_string(),
            reason: reason.into(),
        }
    }
}
