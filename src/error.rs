use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("Workbook error: {0}")]
    Workbook(#[from] umya_spreadsheet::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid layout file: {0}")]
    Layout(#[from] serde_json::Error),

    #[error("Sheet not found in course workbook: {0}")]
    MissingSheet(String),

    #[error("Missing upload field: {0}")]
    MissingUpload(&'static str),

    #[error("Invalid upload: {0}")]
    Upload(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PlanningError>;
