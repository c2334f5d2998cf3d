//! # Pattern Library Module
//!
//! The reference patterns a recognizer matches against, keyed by name.
//!
//! ## Ordering
//! Entries keep insertion order. Profiles always import the baseline pattern
//! first, and the matcher keeps the earlier entry on equal distances, so the
//! baseline wins ties.
//!
//! ## Loading
//! A profile is all-or-nothing: if any file is missing or malformed, no
//! library is produced.

use std::path::Path;

use crate::dtw::DtwMatcher;
use crate::error::PatternImportError;
use crate::pattern_file::read_pattern_file;
use crate::timeseries::Sample;

/// Best-scoring library entry for one window
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    pub name: String,
    pub distance: f32,
}

/// Name under which a pattern file is registered (file name without extension)
pub fn pattern_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct PatternLibrary<const N: usize> {
    entries: Vec<(String, Vec<Sample<N>>)>,
}

impl<const N: usize> PatternLibrary<N> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Import `files` from `dir` in order
    pub fn load(dir: &Path, files: &[String]) -> Result<Self, PatternImportError> {
        let mut library = Self::new();
        for file in files {
            let samples = read_pattern_file::<N>(&dir.join(file))?;
            library.insert(pattern_name(file), samples);
        }
        Ok(library)
    }

    /// Add or replace a pattern. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, samples: Vec<Sample<N>>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = samples,
            None => self.entries.push((name, samples)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[Sample<N>]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, samples)| samples.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Sample<N>])> {
        self.entries
            .iter()
            .map(|(name, samples)| (name.as_str(), samples.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entry with the smallest DTW distance to `window`.
    ///
    /// Empty templates score infinity and are never selected. Returns `None`
    /// when no entry has a finite distance.
    pub fn best_match(&self, window: &[Sample<N>], matcher: &DtwMatcher) -> Option<BestMatch> {
        let mut best: Option<BestMatch> = None;
        for (name, template) in self.iter() {
            let distance = matcher.distance(window, template);
            let better = match &best {
                Some(current) => distance < current.distance,
                None => distance < f32::INFINITY,
            };
            if better {
                best = Some(BestMatch {
                    name: name.to_string(),
                    distance,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtw::BandMode;
    use crate::error::ImportErrorKind;
    use std::fs;
    use tempfile::tempdir;

    fn flat(len: usize, value: f32) -> Vec<Sample<3>> {
        (0..len).map(|_| Sample::new(0.0, [value, 0.0, 0.0])).collect()
    }

    #[test]
    fn test_pattern_name_strips_extension() {
        assert_eq!(pattern_name("gyroStationary.txt"), "gyroStationary");
        assert_eq!(pattern_name("baby-rock.txt"), "baby-rock");
        assert_eq!(pattern_name("noext"), "noext");
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut library = PatternLibrary::<3>::new();
        library.insert("a", flat(2, 0.0));
        library.insert("b", flat(2, 1.0));
        library.insert("a", flat(4, 0.0));

        assert_eq!(library.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(library.get("a").map(|s| s.len()), Some(4));
    }

    #[test]
    fn test_best_match_picks_minimum() {
        let mut library = PatternLibrary::<3>::new();
        library.insert("zero", flat(3, 0.0));
        library.insert("one", flat(3, 1.0));
        let matcher = DtwMatcher::new(3, BandMode::FirstRowColumn);

        let best = library.best_match(&flat(3, 0.9), &matcher).unwrap();
        assert_eq!(best.name, "one");
        assert!(best.distance < 0.5);
    }

    #[test]
    fn test_best_match_tie_keeps_first() {
        let mut library = PatternLibrary::<3>::new();
        library.insert("first", flat(3, 1.0));
        library.insert("second", flat(3, -1.0));
        let matcher = DtwMatcher::new(3, BandMode::FirstRowColumn);

        let best = library.best_match(&flat(3, 0.0), &matcher).unwrap();
        assert_eq!(best.name, "first");
    }

    #[test]
    fn test_empty_template_never_selected() {
        let mut library = PatternLibrary::<3>::new();
        library.insert("empty", Vec::new());
        let matcher = DtwMatcher::new(3, BandMode::FirstRowColumn);
        assert!(library.best_match(&flat(3, 0.0), &matcher).is_none());

        library.insert("real", flat(3, 5.0));
        let best = library.best_match(&flat(3, 0.0), &matcher).unwrap();
        assert_eq!(best.name, "real");
    }

    #[test]
    fn test_load_in_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("still.txt"), "0,0,0,0\n").unwrap();
        fs::write(dir.path().join("tap.txt"), "-0.1,0,0,0\n0,1,5,0\n").unwrap();

        let files = vec!["still.txt".to_string(), "tap.txt".to_string()];
        let library = PatternLibrary::<3>::load(dir.path(), &files).unwrap();

        assert_eq!(library.names().collect::<Vec<_>>(), vec!["still", "tap"]);
        assert_eq!(library.get("tap").map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_load_fails_closed_on_missing_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("still.txt"), "0,0,0,0\n").unwrap();

        let files = vec!["still.txt".to_string(), "gone.txt".to_string()];
        let err = PatternLibrary::<3>::load(dir.path(), &files).unwrap_err();
        assert!(matches!(err.kind, ImportErrorKind::NotFound));
        assert!(err.file.ends_with("gone.txt"));
    }
}
