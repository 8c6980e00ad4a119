use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Expected markup not found: {0}")]
    MissingStructure(String),

    #[error("Could not parse {field} from '{text}'")]
    Unparseable { field: &'static str, text: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Ticket history integrity error: {message}")]
    TicketHistory { message: String },
}

pub type Result<T> = std::result::Result<T, ScraperError>;
