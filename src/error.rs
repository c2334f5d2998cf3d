//! # Error Types Module
//!
//! Centralized error handling for the gesture recognition engine.
//! Provides custom error types for each module with proper context and error chaining.
//!
//! ## Error Types
//! - `PatternImportError`: Reading reference patterns from disk
//! - `PatternStoreError`: Persisting freshly recorded patterns
//! - `ConfigError`: Configuration file I/O, parsing and validation errors
//! - `RecognizerError`: Recording commands and profile changes
//!
//! ## Usage Examples
//! ```rust,ignore
//! // Pattern files use PatternImportError
//! pub fn read_pattern_file(path: &Path) -> Result<Vec<Sample<N>>, PatternImportError> { ... }
//!
//! // Recognizer commands use RecognizerError
//! pub fn end_recording(&mut self) -> Result<RecordingSummary, RecognizerError> { ... }
//! ```
//!
//! ## Why Custom Errors
//! - A malformed pattern line names the file and line it came from
//! - Profile loads can fail closed with a precise reason
//! - Recording commands report misuse instead of panicking

use std::fmt;
use std::path::PathBuf;

/// What went wrong while importing a single pattern file
#[derive(Debug)]
pub enum ImportErrorKind {
    /// The pattern file does not exist
    NotFound,
    /// The file exists but could not be read
    Io(std::io::Error),
    /// A line could not be parsed (line numbers are 1-based)
    Parse { line: usize, reason: String },
}

/// Errors that can occur while importing a pattern file
#[derive(Debug)]
pub struct PatternImportError {
    pub file: PathBuf,
    pub kind: ImportErrorKind,
}

impl PatternImportError {
    pub fn not_found(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            kind: ImportErrorKind::NotFound,
        }
    }

    pub fn parse(file: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            kind: ImportErrorKind::Parse {
                line,
                reason: reason.into(),
            },
        }
    }
}

impl fmt::Display for PatternImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ImportErrorKind::NotFound => {
                write!(f, "Pattern file not found: {}", self.file.display())
            }
            ImportErrorKind::Io(e) => {
                write!(f, "Failed to read pattern file {}: {}", self.file.display(), e)
            }
            ImportErrorKind::Parse { line, reason } => {
                write!(
                    f,
                    "Invalid pattern file {} (line {}): {}",
                    self.file.display(),
                    line,
                    reason
                )
            }
        }
    }
}

impl std::error::Error for PatternImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ImportErrorKind::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors that can occur while persisting a recorded pattern
#[derive(Debug)]
pub enum PatternStoreError {
    /// Failed to create the output directory
    CreateDir { path: PathBuf, source: std::io::Error },
    /// Failed to write a pattern file
    WriteFailed { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for PatternStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternStoreError::CreateDir { path, source } => {
                write!(f, "Failed to create pattern directory {}: {}", path.display(), source)
            }
            PatternStoreError::WriteFailed { path, source } => {
                write!(f, "Failed to write pattern file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for PatternStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PatternStoreError::CreateDir { source, .. } => Some(source),
            PatternStoreError::WriteFailed { source, .. } => Some(source),
        }
    }
}

/// Errors that can occur during configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read config file
    ReadFailed(std::io::Error),
    /// Failed to write config file
    WriteFailed(std::io::Error),
    /// Failed to parse config file
    ParseFailed(toml::de::Error),
    /// Failed to serialize config
    SerializeFailed(toml::ser::Error),
    /// A setting is outside its valid range
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFailed(e) => {
                write!(f, "Failed to read config file: {}", e)
            }
            ConfigError::WriteFailed(e) => {
                write!(f, "Failed to write config file: {}", e)
            }
            ConfigError::ParseFailed(e) => {
                write!(f, "Failed to parse config file: {}", e)
            }
            ConfigError::SerializeFailed(e) => {
                write!(f, "Failed to serialize config: {}", e)
            }
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid setting `{}`: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadFailed(e) => Some(e),
            ConfigError::WriteFailed(e) => Some(e),
            ConfigError::ParseFailed(e) => Some(e),
            ConfigError::SerializeFailed(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

/// Errors returned by recognizer commands
#[derive(Debug)]
pub enum RecognizerError {
    /// A recording is already in progress
    AlreadyRecording,
    /// No recording is in progress
    NotRecording,
    /// A trial was requested but no pattern has been recorded yet
    NoPatternForTrial,
    /// The recording ended before any sample was captured
    EmptyRecording,
    /// A profile could not be loaded
    Import(PatternImportError),
    /// A recorded pattern could not be persisted
    Store(PatternStoreError),
}

impl fmt::Display for RecognizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognizerError::AlreadyRecording => {
                write!(f, "A recording is already in progress")
            }
            RecognizerError::NotRecording => {
                write!(f, "No recording is in progress")
            }
            RecognizerError::NoPatternForTrial => {
                write!(f, "Cannot record a trial before any pattern exists")
            }
            RecognizerError::EmptyRecording => {
                write!(f, "Recording captured no samples")
            }
            RecognizerError::Import(e) => {
                write!(f, "Failed to load profile: {}", e)
            }
            RecognizerError::Store(e) => {
                write!(f, "Failed to store recorded pattern: {}", e)
            }
        }
    }
}

impl std::error::Error for RecognizerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecognizerError::Import(e) => Some(e),
            RecognizerError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PatternImportError> for RecognizerError {
    fn from(e: PatternImportError) -> Self {
        RecognizerError::Import(e)
    }
}

impl From<PatternStoreError> for RecognizerError {
    fn from(e: PatternStoreError) -> Self {
        RecognizerError::Store(e)
    }
}
