use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{rlog_debug, rlog_error, Error, Result};

/// Tunables for every pipeline stage.
///
/// All sections are optional in TOML; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub extractor: ExtractorConfig,
    pub layout: LayoutConfig,
    pub relevance: RelevanceConfig,
}

/// Effort inference settings for the task extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Effort assigned when a task names no duration.
    pub default_effort_hours: f64,
    pub hours_per_day: f64,
    pub hours_per_week: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            default_effort_hours: 4.0,
            hours_per_day: 8.0,
            hours_per_week: 40.0,
        }
    }
}

/// Force simulation constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub iterations: usize,
    pub node_radius: f64,
    /// Pairs further apart than this do not repel.
    pub repulsion_threshold: f64,
    pub repulsion_strength: f64,
    /// Target separation for nodes joined by an edge.
    pub spring_length: f64,
    pub spring_strength: f64,
    /// Upper bound on how far a node moves in one iteration.
    pub max_displacement: f64,
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            node_radius: 20.0,
            repulsion_threshold: 150.0,
            repulsion_strength: 800.0,
            spring_length: 120.0,
            spring_strength: 0.05,
            max_displacement: 30.0,
            seed: 42,
        }
    }
}

/// Field weights for knowledge resource scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceConfig {
    pub title_weight: f64,
    /// Added once when the whole query appears in the title.
    pub title_phrase_bonus: f64,
    pub tag_weight: f64,
    pub category_weight: f64,
    pub content_weight: f64,
    pub commerce_weight: f64,
    /// Multiplier on `ln(1 + accessCount)`, applied only to resources that matched text.
    pub usage_weight: f64,
    /// Query terms shorter than this are ignored.
    pub min_term_len: usize,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            title_weight: 3.0,
            title_phrase_bonus: 5.0,
            tag_weight: 2.0,
            category_weight: 1.5,
            content_weight: 1.0,
            commerce_weight: 0.5,
            usage_weight: 0.1,
            min_term_len: 2,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).inspect_err(|e| {
            rlog_error!("Config parse failed: {}", e.message());
        })?;
        config.validate().inspect_err(|e| {
            rlog_error!("Config rejected: {}", e);
        })?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        rlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            rlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config = Self::from_toml_str(&fs::read_to_string(path)?)?;
        rlog_debug!(
            "Config loaded: iterations={}, radius={}, default_effort={}",
            config.layout.iterations,
            config.layout.node_radius,
            config.extractor.default_effort_hours
        );
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        rlog_debug!("Config saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let e = &self.extractor;
        if !(e.default_effort_hours >= 0.0 && e.hours_per_day > 0.0 && e.hours_per_week > 0.0) {
            return Err(Error::Config(
                "effort settings must be non-negative and unit sizes positive".to_string(),
            ));
        }

        let l = &self.layout;
        if l.iterations == 0 {
            return Err(Error::Config("layout.iterations must be at least 1".to_string()));
        }
        let positive = [
            ("node_radius", l.node_radius),
            ("repulsion_threshold", l.repulsion_threshold),
            ("spring_length", l.spring_length),
            ("max_displacement", l.max_displacement),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("layout.{} must be positive", name)));
            }
        }
        if !(l.repulsion_strength >= 0.0 && l.spring_strength >= 0.0) {
            return Err(Error::Config("layout force strengths must be non-negative".to_string()));
        }

        let r = &self.relevance;
        let weights = [
            r.title_weight,
            r.title_phrase_bonus,
            r.tag_weight,
            r.category_weight,
            r.content_weight,
            r.commerce_weight,
            r.usage_weight,
        ];
        if weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(Error::Config("relevance weights must be non-negative".to_string()));
        }
        Ok(())
    }
}
