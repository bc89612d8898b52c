use thiserror::Error;
use workdeck_config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("duplicate palette command id '{command_id}'")]
    DuplicateCommandId { command_id: String },
    #[error("unknown palette command id '{command_id}'")]
    UnknownCommand { command_id: String },
}
