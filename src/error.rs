use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaadError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown apartment: {0}")]
    UnknownApartment(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Unknown statement format: {0}")]
    UnknownFormat(String),

    #[error("Unreadable statement: {0}")]
    BadStatement(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, VaadError>;
