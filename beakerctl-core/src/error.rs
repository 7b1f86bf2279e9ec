use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeakerctlError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No [app:...] section found in {0}")]
    MissingAppSection(String),

    #[error("Required option {0} is not set")]
    MissingOption(String),

    #[error("Option {key} is not an integer number of seconds: {value:?}")]
    InvalidOption { key: String, value: String },

    /// The only error the command layer recovers from: everything else
    /// propagates to the process boundary.
    #[error("Invalid timeout {0:?}: expected an integer with an s, m, h or d suffix")]
    InvalidTimeout(String),

    #[error("Invalid session payload: {0}")]
    Payload(String),
}
