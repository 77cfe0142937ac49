//! Configuration types for controlling trial counts, shrinking budgets and generation.

use std::ops::Range;

use crate::shrink::ShrinkConfig;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid number of trials (must be > 0)
    #[error("Invalid trial count: {0} (must be > 0)")]
    InvalidTrials(usize),
    /// Invalid first-round shrink budget (must be > 0)
    #[error("Invalid shrink budget: {0} (must be > 0)")]
    InvalidShrinkBudget(usize),
    /// Invalid retry budget for later shrink rounds (must be > 0)
    #[error("Invalid retry budget: {0} (must be > 0)")]
    InvalidRetryBudget(usize),
    /// Invalid cap on accepted shrink steps (must be > 0)
    #[error("Invalid max shrink steps: {0} (must be > 0)")]
    InvalidMaxShrinkSteps(usize),
    /// Invalid exclusive upper bound on generated lengths (must be > 0)
    #[error("Invalid max length: {0} (must be > 0)")]
    InvalidMaxLength(usize),
    /// Character range is empty or leaves the Unicode code space
    #[error("Invalid char range: {start}..{end}")]
    InvalidCharRange { start: u32, end: u32 },
}

/// Default number of trials per run
pub const DEFAULT_TRIALS: usize = 100;
/// Default number of candidates drawn by every shrink round after the first
pub const DEFAULT_RETRY_BUDGET: usize = 100;
/// Default cap on accepted shrink steps
pub const DEFAULT_MAX_SHRINK_STEPS: usize = 1000;
/// Default exclusive upper bound on generated string and collection lengths
pub const DEFAULT_MAX_LENGTH: usize = 100;
/// Default code point range for generated text
pub const DEFAULT_CHAR_RANGE: Range<u32> = 13..255;

/// Configuration for value generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Generated strings and collections have a length in `[0, max_length)`
    pub max_length: usize,
    /// Code points drawn for generated text
    pub char_range: Range<u32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            char_range: DEFAULT_CHAR_RANGE,
        }
    }
}

impl GeneratorConfig {
    /// Create a new generator configuration with validation
    pub fn new(max_length: usize, char_range: Range<u32>) -> Result<Self, ConfigError> {
        let config = Self {
            max_length,
            char_range,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the generator configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(ConfigError::InvalidMaxLength(self.max_length));
        }
        if self.char_range.is_empty() || self.char_range.end > char::MAX as u32 + 1 {
            return Err(ConfigError::InvalidCharRange {
                start: self.char_range.start,
                end: self.char_range.end,
            });
        }
        Ok(())
    }
}

/// Configuration for a single property run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestConfig {
    /// Number of generate-and-check trials
    pub trials: usize,
    /// Candidates drawn by the first shrink round; `None` uses `trials`
    pub shrink_budget: Option<usize>,
    /// Candidates drawn by every later shrink round
    pub retry_budget: usize,
    /// Cap on accepted shrink steps
    pub max_shrink_steps: usize,
    /// Optional seed for reproducible runs
    pub seed: Option<u64>,
    /// Generator configuration overrides
    pub generator_config: GeneratorConfig,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            shrink_budget: None,
            retry_budget: DEFAULT_RETRY_BUDGET,
            max_shrink_steps: DEFAULT_MAX_SHRINK_STEPS,
            seed: None,
            generator_config: GeneratorConfig::default(),
        }
    }
}

impl TestConfig {
    /// Create a new test configuration with validation
    pub fn new(
        trials: usize,
        seed: Option<u64>,
        generator_config: GeneratorConfig,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            trials,
            seed,
            generator_config,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the test configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::InvalidTrials(self.trials));
        }
        if let Some(0) = self.shrink_budget {
            return Err(ConfigError::InvalidShrinkBudget(0));
        }
        if self.retry_budget == 0 {
            return Err(ConfigError::InvalidRetryBudget(self.retry_budget));
        }
        if self.max_shrink_steps == 0 {
            return Err(ConfigError::InvalidMaxShrinkSteps(self.max_shrink_steps));
        }
        self.generator_config.validate()
    }

    /// Candidates drawn by the first shrink round
    pub fn effective_shrink_budget(&self) -> usize {
        self.shrink_budget.unwrap_or(self.trials)
    }

    /// Shrink settings derived from this configuration
    pub fn shrink_config(&self) -> ShrinkConfig {
        ShrinkConfig::new(self.retry_budget, self.max_shrink_steps)
    }

    /// Merge with a global configuration; this config's seed wins when set
    pub fn merge_with_global(self, global: &GlobalConfig) -> Self {
        Self {
            seed: self.seed.or(global.default_seed),
            ..self
        }
    }

    /// Create a test configuration from global defaults with optional overrides
    pub fn from_global_with_overrides(
        global: &GlobalConfig,
        trials: Option<usize>,
        seed: Option<u64>,
        generator_overrides: Option<GeneratorConfig>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            trials: trials.unwrap_or(global.default_trials),
            seed: seed.or(global.default_seed),
            generator_config: generator_overrides
                .unwrap_or_else(|| global.generator_config.clone()),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }
}

/// Global defaults inherited by runs that do not override them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Default number of trials
    pub default_trials: usize,
    /// Default seed for reproducible runs
    pub default_seed: Option<u64>,
    /// Default generator configuration
    pub generator_config: GeneratorConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_trials: DEFAULT_TRIALS,
            default_seed: None,
            generator_config: GeneratorConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Create a new global configuration with validation
    pub fn new(
        default_trials: usize,
        default_seed: Option<u64>,
        generator_config: GeneratorConfig,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            default_trials,
            default_seed,
            generator_config,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the global configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_trials == 0 {
            return Err(ConfigError::InvalidTrials(self.default_trials));
        }
        self.generator_config.validate()
    }
}

/// Holder for the global configuration
#[derive(Debug, Default)]
pub struct ConfigManager {
    global_config: GlobalConfig,
}

impl ConfigManager {
    /// Create a new configuration manager with default global configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new configuration manager with custom global configuration
    pub fn with_global_config(global_config: GlobalConfig) -> Result<Self, ConfigError> {
        global_config.validate()?;
        Ok(Self { global_config })
    }

    /// Get the current global configuration
    pub fn global_config(&self) -> &GlobalConfig {
        &self.global_config
    }

    /// Update the global configuration
    pub fn set_global_config(&mut self, global_config: GlobalConfig) -> Result<(), ConfigError> {
        global_config.validate()?;
        self.global_config = global_config;
        Ok(())
    }

    /// Create a test configuration that inherits from global defaults
    pub fn create_test_config(&self) -> TestConfig {
        TestConfig::from_global_with_overrides(&self.global_config, None, None, None)
            .unwrap_or_default()
    }
}

// Thread-local so parallel test threads never observe each other's globals
thread_local! {
    static CONFIG_MANAGER: std::cell::RefCell<ConfigManager> = std::cell::RefCell::new(ConfigManager::new());
}

/// Get the current global configuration
pub fn get_global_config() -> GlobalConfig {
    CONFIG_MANAGER.with(|manager| manager.borrow().global_config().clone())
}

/// Set the global configuration
pub fn set_global_config(config: GlobalConfig) -> Result<(), ConfigError> {
    CONFIG_MANAGER.with(|manager| manager.borrow_mut().set_global_config(config))
}

/// Create a test configuration that inherits from global defaults
pub fn create_test_config() -> TestConfig {
    CONFIG_MANAGER.with(|manager| manager.borrow().create_test_config())
}
