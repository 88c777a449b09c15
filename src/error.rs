use std::path::PathBuf;

/// Error crossing the binary boundary: a message plus the process exit code.
///
/// Exit codes:
/// - `2` bad input (missing file, schema problems, invalid flags)
/// - `4` failures while producing output (exports, terminal writes)
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Fatal failure while loading the session dataset.
///
/// No partial dataset is ever returned alongside one of these.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("Sales data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV headers: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No valid rows after validation ({rows_read} read, {rows_dropped} dropped).")]
    NoValidRows { rows_read: usize, rows_dropped: usize },
}

impl DataLoadError {
    /// Classify an I/O failure on `path`: a missing file is `NotFound`, anything else `Io`.
    pub fn from_io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            DataLoadError::NotFound(path.to_path_buf())
        } else {
            DataLoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

impl From<DataLoadError> for AppError {
    fn from(err: DataLoadError) -> Self {
        AppError::new(2, err.to_string())
    }
}
