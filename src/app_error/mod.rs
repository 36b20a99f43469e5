use thiserror::Error;


#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP Request Error: {0}")]
    Network(String),

    #[error("JSON Serialization/Deserialization Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Environment Resolution Error: {0}")]
    Resolution(String),

    #[error("Version Write Error: {0}")]
    Write(String),

    #[error("Promotion Verification Error: {0}")]
    Verification(String),

    #[error("Model Response Parsing Error: {0}")]
    ResponseParsing(String),

    #[error("Spreadsheet Error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}
