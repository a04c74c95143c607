use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApexcovError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("SOAP fault: {0}")]
    Soap(String),

    #[error("Invalid class id: '{0}'")]
    InvalidClassId(String),

    #[error("Negative line count (covered: {covered}, uncovered: {uncovered})")]
    NegativeLineCount { covered: i64, uncovered: i64 },

    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("cannot render CSV for an empty report")]
    EmptyReport,

    #[error("coverage lookup failed for {0}")]
    LookupFailed(String),
}

impl From<ureq::Error> for ApexcovError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(status, resp) => ApexcovError::Http {
                status,
                body: resp.into_string().unwrap_or_default(),
            },
            other => ApexcovError::Transport(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApexcovError>;
