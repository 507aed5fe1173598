/// Broad failure category, used for exit codes and for telling load failures apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input file missing or unreadable.
    NotFound,
    /// A caller-supplied value is not acceptable (unknown state, bad year range).
    InvalidArgument,
    /// A value could not be coerced to the expected numeric type.
    TypeConversion,
    /// The table loaded but lacks a column the operation needs.
    MissingColumn,
    /// Malformed CSV content or a broken compressed stream.
    Parse,
    /// Writing an output file failed.
    Io,
    /// The map renderer failed.
    Render,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::NotFound | ErrorKind::InvalidArgument | ErrorKind::TypeConversion => 2,
            ErrorKind::MissingColumn | ErrorKind::Parse => 3,
            ErrorKind::Io | ErrorKind::Render => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::TypeConversion => "type conversion",
            ErrorKind::MissingColumn => "missing column",
            ErrorKind::Parse => "parse error",
            ErrorKind::Io => "i/o error",
            ErrorKind::Render => "render error",
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
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
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
