//! # Configuration Management Module
//!
//! Recognizer tuning and gesture profiles, stored as TOML in the platform
//! configuration directory.
//!
//! ## Settings (per sensor modality)
//! - `alpha`: low-pass smoothing factor in (0, 1]
//! - `lookback`: history length in seconds (negative)
//! - `match_threshold`: maximum DTW distance accepted as a recognition
//! - `band_width` / `band_mode`: Sakoe-Chiba band for DTW
//! - `result_duration`: seconds a recognition is held before the next one
//! - `baseline_pattern`: no-op pattern imported first in every profile
//! - `profiles`: profile name -> ordered list of pattern files
//!
//! ## Storage Location
//! - macOS: ~/Library/Application Support/gesture-warp/config.toml
//! - Linux: ~/.config/gesture-warp/config.toml
//! - Windows: %APPDATA%\gesture-warp\config.toml
//!
//! ## Why A Profile Table
//! Adding a gesture set is a config edit, not a code change.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dtw::{BandMode, DtwMatcher};
use crate::error::ConfigError;
use crate::filter::DEFAULT_ALPHA;

pub const DEFAULT_LOOKBACK: f64 = -1.5;

/// Tuning for one recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    pub alpha: f32,
    pub lookback: f64,
    pub match_threshold: f32,
    pub band_width: usize,
    pub band_mode: BandMode,
    pub result_duration: f64,
    pub baseline_pattern: String,
    pub pattern_dir: PathBuf,
    pub pattern_extension: String,
    pub profiles: BTreeMap<String, Vec<String>>,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self::accel()
    }
}

fn files(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| format!("{}.txt", name)).collect()
}

impl RecognizerConfig {
    /// Preset for 3-axis user acceleration
    pub fn accel() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "baby".to_string(),
            files(&["baby-airplane", "baby-bottle", "baby-bounce", "baby-rock"]),
        );
        profiles.insert(
            "anteater".to_string(),
            files(&["anteater-dig", "anteater-tongue"]),
        );
        profiles.insert(
            "goldenRetriever".to_string(),
            files(&[
                "goldenRetriever-hop",
                "goldenRetriever-tailWag",
                "goldenRetriever-throwBall",
                "goldenRetriever-tugOfWar",
            ]),
        );
        profiles.insert(
            "flamingo".to_string(),
            files(&["flamingo-uncurlNeck", "flamingo-fly"]),
        );
        profiles.insert(
            "zebra".to_string(),
            files(&["zebra-graze", "zebra-kickDefense", "zebra-tailWag", "zebra-trot"]),
        );
        profiles.insert(
            "lynx".to_string(),
            files(&["lynx-claw", "lynx-pounce", "lynx-lick"]),
        );
        profiles.insert(
            "pig".to_string(),
            files(&["pig-rootTruffles", "pig-tailWag"]),
        );
        profiles.insert(
            "snake".to_string(),
            files(&["snake-slither", "snake-hiss"]),
        );
        profiles.insert(
            "rooster".to_string(),
            files(&["rooster-peck", "rooster-tailWag"]),
        );
        profiles.insert(
            "raccoon".to_string(),
            files(&["raccoon-tailWag", "raccoon-climbTree", "raccoon-standUp"]),
        );
        profiles.insert(
            "pony".to_string(),
            files(&["pony-rearUp", "pony-brushHair", "pony-trot"]),
        );
        profiles.insert(
            "duke".to_string(),
            files(&[
                "duke-rollOnBack",
                "duke-pet",
                "duke-hop",
                "duke-tugOfWar",
                "duke-throwBall",
                "duke-tailWag",
            ]),
        );
        profiles.insert(
            "giraffe".to_string(),
            files(&["giraffe-eatLeaves", "giraffe-trot", "giraffe-longNeck", "giraffe-kick"]),
        );
        profiles.insert("elephant".to_string(), files(&["elephant-stampede"]));

        Self {
            alpha: DEFAULT_ALPHA,
            lookback: DEFAULT_LOOKBACK,
            match_threshold: 25.0,
            band_width: 3,
            band_mode: BandMode::FirstRowColumn,
            result_duration: 1.5,
            baseline_pattern: "gyroStationary.txt".to_string(),
            pattern_dir: PathBuf::from("gestures"),
            pattern_extension: "txt".to_string(),
            profiles,
        }
    }

    /// Preset for 2-axis touch displacement (pixels per frame)
    pub fn touch() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "default".to_string(),
            vec!["tickle.csv".to_string(), "brush.csv".to_string()],
        );

        Self {
            alpha: DEFAULT_ALPHA,
            lookback: DEFAULT_LOOKBACK,
            match_threshold: 1200.0,
            band_width: 6,
            band_mode: BandMode::FirstRowColumn,
            result_duration: 2.0,
            baseline_pattern: "noTouch.csv".to_string(),
            pattern_dir: PathBuf::from("gestures"),
            pattern_extension: "csv".to_string(),
            profiles,
        }
    }

    pub fn matcher(&self) -> DtwMatcher {
        DtwMatcher::new(self.band_width, self.band_mode)
    }

    /// Library name of the baseline pattern
    pub fn baseline_name(&self) -> String {
        crate::library::pattern_name(&self.baseline_pattern)
    }

    pub fn has_profile(&self, profile: &str) -> bool {
        self.profiles.contains_key(profile)
    }

    /// Files to import for `profile`, baseline first.
    ///
    /// An unknown profile resolves to the baseline alone.
    pub fn profile_files(&self, profile: &str) -> Vec<String> {
        let mut out = vec![self.baseline_pattern.clone()];
        if let Some(list) = self.profiles.get(profile) {
            out.extend(
                list.iter()
                    .filter(|file| **file != self.baseline_pattern)
                    .cloned(),
            );
        }
        out
    }

    /// Check ranges the recognizer relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "alpha",
                reason: format!("must be in (0, 1], got {}", self.alpha),
            });
        }
        if !(self.lookback < 0.0) {
            return Err(ConfigError::Invalid {
                field: "lookback",
                reason: format!("must be negative, got {}", self.lookback),
            });
        }
        if self.band_width == 0 {
            return Err(ConfigError::Invalid {
                field: "band_width",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.match_threshold.is_finite() {
            return Err(ConfigError::Invalid {
                field: "match_threshold",
                reason: "must be finite".to_string(),
            });
        }
        if !(self.result_duration >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "result_duration",
                reason: format!("must not be negative, got {}", self.result_duration),
            });
        }
        Ok(())
    }
}

/// Apply the keys present in the file on top of `preset`, so a partial
/// `[touch]` table keeps the touch defaults for everything it omits.
fn overlay<'de, D>(preset: RecognizerConfig, deserializer: D) -> Result<RecognizerConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = toml::Table::deserialize(deserializer)?;
    let mut merged = toml::Value::try_from(preset).map_err(de::Error::custom)?;
    if let Some(table) = merged.as_table_mut() {
        table.extend(overrides);
    }
    merged.try_into().map_err(de::Error::custom)
}

fn accel_overlay<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RecognizerConfig, D::Error> {
    overlay(RecognizerConfig::accel(), deserializer)
}

fn touch_overlay<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RecognizerConfig, D::Error> {
    overlay(RecognizerConfig::touch(), deserializer)
}

/// Settings for both sensor modalities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "RecognizerConfig::accel", deserialize_with = "accel_overlay")]
    pub accel: RecognizerConfig,
    #[serde(default = "RecognizerConfig::touch", deserialize_with = "touch_overlay")]
    pub touch: RecognizerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accel: RecognizerConfig::accel(),
            touch: RecognizerConfig::touch(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gesture-warp")
            .join("config.toml")
    }

    /// Load config from the platform location, or create default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, writing the default there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config: Config = toml::from_str(&contents)
                    .map_err(ConfigError::ParseFailed)?;
                config.accel.validate()?;
                config.touch.validate()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File doesn't exist, create default
                let config = Self::default();
                config.save_to(path)?;
                log::info!("Wrote default config to {}", path.display());
                Ok(config)
            }
            Err(e) => Err(ConfigError::ReadFailed(e)),
        }
    }

    /// Save config to the platform location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(ConfigError::WriteFailed)?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(ConfigError::SerializeFailed)?;
        fs::write(path, toml_string)
            .map_err(ConfigError::WriteFailed)?;

        Ok(())
    }
}
