//! # Pattern File Module
//!
//! Plain-text storage for reference patterns and recorded trials.
//!
//! ## File Format
//! One sample per line, comma separated, no header:
//! ```text
//! t,c1,c2,...,cN
//! ```
//! `t` is the sample's offset relative to the end of the recording (so the
//! last line is usually `0`). Numbers use `.` as decimal separator regardless
//! of the host locale.
//!
//! ## Storage Backends
//! - `DirectoryPatternStore`: writes files into a directory, optionally a
//!   timestamped session directory
//! - `MemoryPatternStore`: keeps written files in memory (tests, dry runs)

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ImportErrorKind, PatternImportError, PatternStoreError};
use crate::timeseries::Sample;

/// Parse one `t,c1,...,cN` line
fn parse_line<const N: usize>(line: &str) -> Result<Sample<N>, String> {
    let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
    if tokens.len() != N + 1 {
        return Err(format!(
            "expected {} fields, found {}",
            N + 1,
            tokens.len()
        ));
    }

    let t: f64 = tokens[0]
        .parse()
        .map_err(|_| format!("non-numeric time field `{}`", tokens[0]))?;
    if !t.is_finite() {
        return Err(format!("non-finite time field `{}`", tokens[0]));
    }

    let mut values = [0.0f32; N];
    for (c, token) in tokens[1..].iter().enumerate() {
        let value: f32 = token
            .parse()
            .map_err(|_| format!("non-numeric value `{}` in channel {}", token, c + 1))?;
        // f32 parsing accepts nan/inf
        if !value.is_finite() {
            return Err(format!("non-finite value `{}` in channel {}", token, c + 1));
        }
        values[c] = value;
    }

    Ok(Sample::with_offset(t, t, values))
}

/// Parse pattern text. `origin` is only used for error reporting.
///
/// Blank lines are skipped; any other malformed line rejects the whole input.
pub fn parse_pattern<const N: usize>(
    origin: &Path,
    contents: &str,
) -> Result<Vec<Sample<N>>, PatternImportError> {
    let mut samples = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let sample =
            parse_line::<N>(line).map_err(|reason| PatternImportError::parse(origin, idx + 1, reason))?;
        samples.push(sample);
    }
    Ok(samples)
}

/// Read and parse a pattern file
pub fn read_pattern_file<const N: usize>(path: &Path) -> Result<Vec<Sample<N>>, PatternImportError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PatternImportError::not_found(path)
        } else {
            PatternImportError {
                file: path.to_path_buf(),
                kind: ImportErrorKind::Io(e),
            }
        }
    })?;

    parse_pattern(path, &contents)
}

/// Render samples in the pattern file format
pub fn format_pattern<const N: usize>(samples: &[Sample<N>]) -> String {
    let mut out = String::new();
    for sample in samples {
        let _ = write!(out, "{}", sample.t);
        for value in sample.values.iter() {
            let _ = write!(out, ",{}", value);
        }
        out.push('\n');
    }
    out
}

/// Destination for freshly recorded trials and templates
pub trait PatternStore<const N: usize> {
    fn store(&mut self, file_name: &str, samples: &[Sample<N>]) -> Result<(), PatternStoreError>;
}

/// Writes pattern files into a directory
#[derive(Debug, Clone)]
pub struct DirectoryPatternStore {
    dir: PathBuf,
}

impl DirectoryPatternStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under a new timestamped `session_YYYYMMDD_HHMMSS` directory inside `base`
    pub fn session(base: impl AsRef<Path>) -> Self {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let dir = base.as_ref().join(format!("session_{}", timestamp));
        log::info!("Recorded patterns will be written to: {}", dir.display());
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl<const N: usize> PatternStore<N> for DirectoryPatternStore {
    fn store(&mut self, file_name: &str, samples: &[Sample<N>]) -> Result<(), PatternStoreError> {
        // Create directory lazily so an unused session leaves nothing behind
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|source| PatternStoreError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;
        }

        let path = self.dir.join(file_name);
        fs::write(&path, format_pattern(samples)).map_err(|source| PatternStoreError::WriteFailed {
            path: path.clone(),
            source,
        })?;

        log::debug!("Wrote {} samples to {}", samples.len(), path.display());
        Ok(())
    }
}

/// Keeps stored patterns in memory, keyed by file name
#[derive(Debug, Clone, Default)]
pub struct MemoryPatternStore {
    files: BTreeMap<String, String>,
}

impl MemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of a stored file in the pattern file format
    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.files.get(file_name).map(String::as_str)
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl<const N: usize> PatternStore<N> for MemoryPatternStore {
    fn store(&mut self, file_name: &str, samples: &[Sample<N>]) -> Result<(), PatternStoreError> {
        self.files.insert(file_name.to_string(), format_pattern(samples));
        Ok(())
    }
}
