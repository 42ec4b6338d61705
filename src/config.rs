//! Optimizer configuration.
//!
//! Every tunable of the search and the scoring function lives here so
//! operators can retune without touching logic. Defaults are usable
//! as-is; a TOML file may override any subset of fields.
//!
//! # Example
//! ```
//! use timetable_optimizer::config::OptimizerConfig;
//!
//! let config = OptimizerConfig::from_toml_str(
//!     r#"
//!     seed = 42
//!     [weights]
//!     unplaced = 0.4
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.seed, Some(42));
//! assert!((config.weights.unplaced - 0.4).abs() < 1e-12);
//! assert!((config.weights.hard_conflicts - 0.5).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Top-level optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Scoring weights.
    pub weights: ScoreWeights,
    /// Backtracking search settings.
    pub search: SearchConfig,
    /// Diversity and resampling settings.
    pub diversity: DiversityConfig,
    /// Request-level deadline in milliseconds.
    pub timeout_ms: u64,
    /// Worker threads for candidate search. 0 = available parallelism.
    pub workers: usize,
    /// Base seed. `None` = fresh entropy per request.
    pub seed: Option<u64>,
    /// Scoring profiles cycled across generations. Empty = `weights` only.
    pub strategies: Vec<StrategyProfile>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            search: SearchConfig::default(),
            diversity: DiversityConfig::default(),
            timeout_ms: 5_000,
            workers: 0,
            seed: None,
            strategies: StrategyProfile::presets(),
        }
    }
}

/// Weights of the efficiency formula.
///
/// `efficiency = 1 - hard_conflicts * (hard / placements)
///                 - unplaced * (unplaced / requirements)
///                 - utilization_imbalance * imbalance
///                 - preferences * (soft preference violations / placements)`
///
/// `imbalance` mixes the faculty and classroom dimensions, the faculty one
/// counting `faculty_share`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub hard_conflicts: f64,
    pub unplaced: f64,
    pub utilization_imbalance: f64,
    pub preferences: f64,
    pub faculty_share: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            hard_conflicts: 0.5,
            unplaced: 0.3,
            utilization_imbalance: 0.1,
            preferences: 0.05,
            faculty_share: 0.5,
        }
    }
}

/// A named scoring profile.
///
/// Generation `g` is scored with profile `g % strategies.len()`, so a
/// request's options lean towards different goals.
///
/// | Profile | Change to the base weights |
/// |---------|----------------------------|
/// | Faculty-Optimized | faculty balance counts 0.8 of the imbalance |
/// | Classroom-Optimized | classroom balance counts 0.8 of the imbalance |
/// | Balanced Approach | none |
/// | Department-Focused | preference violations weigh double |
/// | Multi-Shift Schedule | utilization imbalance weighs double |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyProfile {
    pub name: String,
    pub description: String,
    /// Replaces `weights.faculty_share`.
    pub faculty_share: Option<f64>,
    /// Multiplies `weights.utilization_imbalance`.
    pub imbalance_scale: f64,
    /// Multiplies `weights.preferences`.
    pub preference_scale: f64,
    pub advantages: Vec<String>,
    pub disadvantages: Vec<String>,
}

impl Default for StrategyProfile {
    fn default() -> Self {
        Self::new("Balanced Approach", "")
    }
}

impl StrategyProfile {
    /// A profile leaving the base weights unchanged.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            faculty_share: None,
            imbalance_scale: 1.0,
            preference_scale: 1.0,
            advantages: Vec::new(),
            disadvantages: Vec::new(),
        }
    }

    pub fn with_faculty_share(mut self, share: f64) -> Self {
        self.faculty_share = Some(share);
        self
    }

    pub fn with_imbalance_scale(mut self, scale: f64) -> Self {
        self.imbalance_scale = scale;
        self
    }

    pub fn with_preference_scale(mut self, scale: f64) -> Self {
        self.preference_scale = scale;
        self
    }

    pub fn with_tradeoffs(mut self, advantages: &[&str], disadvantages: &[&str]) -> Self {
        self.advantages = advantages.iter().map(|s| s.to_string()).collect();
        self.disadvantages = disadvantages.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Base weights adjusted by this profile.
    pub fn weights(&self, base: &ScoreWeights) -> ScoreWeights {
        ScoreWeights {
            utilization_imbalance: base.utilization_imbalance * self.imbalance_scale,
            preferences: base.preferences * self.preference_scale,
            faculty_share: self.faculty_share.unwrap_or(base.faculty_share),
            ..base.clone()
        }
    }

    /// The built-in profiles, in option order.
    pub fn presets() -> Vec<Self> {
        vec![
            Self::new(
                "Faculty-Optimized",
                "Minimizes faculty conflicts and maximizes teaching efficiency",
            )
            .with_faculty_share(0.8)
            .with_tradeoffs(
                &["Optimal teaching load distribution", "High faculty satisfaction"],
                &["May require more classrooms"],
            ),
            Self::new(
                "Classroom-Optimized",
                "Maximizes classroom utilization and minimizes resource waste",
            )
            .with_faculty_share(0.2)
            .with_tradeoffs(
                &["Maximum classroom utilization", "Reduced resource waste"],
                &["Uneven faculty loads"],
            ),
            Self::new(
                "Balanced Approach",
                "Balances faculty efficiency with classroom utilization",
            )
            .with_tradeoffs(
                &["Good balance of all factors", "Suitable for most scenarios"],
                &["Not optimal in any single area"],
            ),
            Self::new(
                "Department-Focused",
                "Optimized for department-specific requirements and preferences",
            )
            .with_preference_scale(2.0)
            .with_tradeoffs(
                &["Subjects spread across the week", "Faculty weekly limits respected"],
                &["May not be optimal globally"],
            ),
            Self::new(
                "Multi-Shift Schedule",
                "Optimized for multiple shifts and extended operating hours",
            )
            .with_imbalance_scale(2.0)
            .with_tradeoffs(
                &["High resource utilization", "Load spread over every slot"],
                &["Complex scheduling requirements"],
            ),
        ]
    }
}

/// Candidate search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Backtrack steps allowed per candidate before giving up on a requirement.
    pub retry_budget: u32,
    /// Place requirements that exhaust the budget at their least-colliding
    /// option (reported as hard conflicts) instead of leaving them unplaced.
    pub relaxed_fallback: bool,
    /// Try options that avoid soft preference violations first.
    pub prefer_spread: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            retry_budget: 200,
            relaxed_fallback: false,
            prefer_spread: true,
        }
    }
}

/// Diversity settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversityConfig {
    /// Candidates sharing more than this fraction of assigned placements
    /// with an accepted candidate are rejected.
    pub overlap_threshold: f64,
    /// Extra generation rounds used to replace rejected candidates.
    pub max_resample_rounds: u32,
    /// Efficiency deducted from options that repeat another option.
    pub duplicate_penalty: f64,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.9,
            max_resample_rounds: 8,
            duplicate_penalty: 0.02,
        }
    }
}

impl OptimizerConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the request deadline.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Request deadline as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Scoring profile of a generation.
    pub fn strategy_for(&self, generation: usize) -> Option<&StrategyProfile> {
        if self.strategies.is_empty() {
            return None;
        }
        self.strategies.get(generation % self.strategies.len())
    }

    /// Scoring weights of a generation.
    pub fn weights_for(&self, generation: usize) -> ScoreWeights {
        match self.strategy_for(generation) {
            Some(profile) => profile.weights(&self.weights),
            None => self.weights.clone(),
        }
    }

    /// Effective worker count.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        for (name, value) in [
            ("weights.hard_conflicts", w.hard_conflicts),
            ("weights.unplaced", w.unplaced),
            ("weights.utilization_imbalance", w.utilization_imbalance),
            ("weights.preferences", w.preferences),
            ("diversity.duplicate_penalty", self.diversity.duplicate_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }

        let share = w.faculty_share;
        if !(0.0..=1.0).contains(&share) {
            return Err(ConfigError::Invalid(format!(
                "weights.faculty_share must be in [0, 1] (got {share})"
            )));
        }

        for profile in &self.strategies {
            for (name, value) in [
                ("imbalance_scale", profile.imbalance_scale),
                ("preference_scale", profile.preference_scale),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "strategy '{}': {name} must be a finite, non-negative number (got {value})",
                        profile.name
                    )));
                }
            }
            if let Some(share) = profile.faculty_share.filter(|s| !(0.0..=1.0).contains(s)) {
                return Err(ConfigError::Invalid(format!(
                    "strategy '{}': faculty_share must be in [0, 1] (got {share})",
                    profile.name
                )));
            }
        }

        let t = self.diversity.overlap_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "diversity.overlap_threshold must be in (0, 1] (got {t})"
            )));
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive".into()));
        }

        Ok(())
    }
}
