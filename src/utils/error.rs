use thiserror::Error;

#[derive(Error, Debug)]
pub enum CutError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Report request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("No stock sheet available for glass code '{code}'")]
    UnknownGlassCode { code: String },

    #[error("Invalid {what}: {value} (must be positive)")]
    InvalidDimension { what: String, value: f64 },

    #[error("Piece {width}x{height}mm does not fit any {code} stock sheet")]
    PieceTooLarge {
        code: String,
        width: f64,
        height: f64,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Config,
    Io,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CutError::ApiError(_) => ErrorCategory::Network,
            CutError::CsvError(_)
            | CutError::UnknownGlassCode { .. }
            | CutError::InvalidDimension { .. }
            | CutError::PieceTooLarge { .. }
            | CutError::ProcessingError { .. } => ErrorCategory::Data,
            CutError::ConfigValidationError { .. }
            | CutError::InvalidConfigValueError { .. }
            | CutError::MissingConfigError { .. } => ErrorCategory::Config,
            CutError::IoError(_) => ErrorCategory::Io,
            // Bugs in our own serialization or bundling, not bad input
            CutError::ZipError(_) | CutError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Transient, a retry may succeed
            CutError::ApiError(_) => ErrorSeverity::Medium,
            CutError::CsvError(_)
            | CutError::UnknownGlassCode { .. }
            | CutError::InvalidDimension { .. }
            | CutError::PieceTooLarge { .. }
            | CutError::ProcessingError { .. } => ErrorSeverity::High,
            CutError::ConfigValidationError { .. }
            | CutError::InvalidConfigValueError { .. }
            | CutError::MissingConfigError { .. } => ErrorSeverity::High,
            CutError::IoError(_) | CutError::ZipError(_) | CutError::SerializationError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CutError::ApiError(_) => {
                "Check the report endpoint URL and network connectivity, then retry".to_string()
            }
            CutError::CsvError(_) => {
                "Verify the input CSV has the expected columns: ITEM, Esp, Largo, Ancho, Pzs."
                    .to_string()
            }
            CutError::IoError(_) => {
                "Check that the output path exists and is writable".to_string()
            }
            CutError::ZipError(_) | CutError::SerializationError(_) => {
                "This is likely a bug; re-run with --verbose and report the log".to_string()
            }
            CutError::ConfigValidationError { field, .. }
            | CutError::InvalidConfigValueError { field, .. }
            | CutError::MissingConfigError { field } => {
                format!("Fix the '{}' setting in your configuration", field)
            }
            CutError::UnknownGlassCode { code } => format!(
                "Add a [[stock]] entry for '{}' or correct the item codes in the source data",
                code
            ),
            CutError::InvalidDimension { .. } => {
                "Remove or fix rows with zero/negative dimensions in the source data".to_string()
            }
            CutError::PieceTooLarge { code, .. } => format!(
                "Configure a larger stock sheet for '{}' or split the oversized piece",
                code
            ),
            CutError::ProcessingError { .. } => {
                "Inspect the source data; no usable cutting rows were found".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the production report: {}", self),
            ErrorCategory::Config => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Problem with the cutting data: {}", self),
            ErrorCategory::Io => format!("File system problem: {}", self),
            ErrorCategory::Internal => format!("Internal error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CutError>;
