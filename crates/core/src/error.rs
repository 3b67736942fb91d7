use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("unsupported export format: {0} (expected csv or json)")]
    UnknownExportFormat(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
