//! Configuration structures for the tier table.
//!
//! This module provides TOML-based configuration for the gate. The
//! configuration system supports:
//! - Bundled defaults (include_str! from copyforge.toml)
//! - User overrides (./copyforge.toml or ~/.config/copyforge/copyforge.toml)
//! - Automatic merging with user values taking precedence
//!
//! Quota numbers, window length, and the feature catalog are configuration
//! inputs; nothing here is hard-coded.

use config::{Config, File, FileFormat};
use copyforge_core::{
    CategoryId, FeatureId, FeatureSpec, Quota, Tier, TierTable, window_from_days,
};
use copyforge_error::{ConfigError, CopyforgeError, CopyforgeResult, GateError, GateErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// Usage-window configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WindowConfig {
    /// Window length in days
    pub days: u32,
}

/// A configured quota value: an integer count or the `"unlimited"` sentinel.
///
/// # Example
///
/// ```toml
/// [tiers.pro_plus.quotas]
/// text_generation = "unlimited"
/// intelligence = 200
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum QuotaSetting {
    /// At most this many counter units per window
    Count(u32),
    /// Sentinel keyword; only `"unlimited"` is accepted
    Keyword(String),
}

impl QuotaSetting {
    /// Resolve the setting to a domain quota, rejecting unknown keywords.
    pub fn resolve(&self) -> Result<Quota, ConfigError> {
        match self {
            QuotaSetting::Count(count) => Ok(Quota::Limited(*count)),
            QuotaSetting::Keyword(word) if word == "unlimited" => Ok(Quota::Unlimited),
            QuotaSetting::Keyword(word) => Err(ConfigError::new(format!(
                "Unknown quota keyword '{}': expected an integer or \"unlimited\"",
                word
            ))),
        }
    }
}

/// Per-tier quota configuration.
///
/// # Example
///
/// ```toml
/// [tiers.core.quotas]
/// text_generation = 100
/// image_generation = 50
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct TierQuotaConfig {
    /// Map of category name to quota setting
    #[serde(default)]
    pub quotas: HashMap<String, QuotaSetting>,
}

/// Configuration for a single gated feature.
///
/// # Example
///
/// ```toml
/// [features.competitor_analysis]
/// category = "intelligence"
/// min_tier = "pro_plus"
/// cost = 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeatureConfig {
    /// Category whose counter the feature debits
    pub category: String,
    /// Minimum tier that unlocks the feature
    pub min_tier: Tier,
    /// Cost in counter units per use
    pub cost: u32,
}

/// Top-level gate configuration.
///
/// Loads the tier table from TOML files with a precedence system:
/// 1. Bundled defaults (include_str! from copyforge.toml)
/// 2. User override (./copyforge.toml or ~/.config/copyforge/copyforge.toml)
///
/// # Example
///
/// ```no_run
/// use copyforge_gate::GateConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = GateConfig::load()?;
/// let table = config.build_table()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GateConfig {
    /// Usage-window settings
    pub window: WindowConfig,
    /// Map of tier name to quota configuration
    #[serde(default)]
    pub tiers: HashMap<String, TierQuotaConfig>,
    /// Map of feature name to feature configuration
    #[serde(default)]
    pub features: HashMap<String, FeatureConfig>,
}

impl GateConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> CopyforgeResult<Self> {
        debug!("Loading gate configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                CopyforgeError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CopyforgeError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (copyforge.toml shipped with the library)
    /// 2. User config in home directory (~/.config/copyforge/copyforge.toml)
    /// 3. User config in current directory (./copyforge.toml)
    ///
    /// User config files are optional and will be silently skipped if not found.
    #[instrument]
    pub fn load() -> CopyforgeResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../copyforge.toml");

        let mut builder = Config::builder()
            // Start with bundled defaults
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        // Add user config from home directory (optional)
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/copyforge/copyforge.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        // Add user config from current directory (optional, highest precedence)
        builder = builder.add_source(File::with_name("copyforge").required(false));

        // Build and deserialize
        builder
            .build()
            .map_err(|e| {
                CopyforgeError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CopyforgeError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Resolve the configuration into a validated [`TierTable`].
    ///
    /// Fails fast on unknown tier names, unknown quota keywords, and every
    /// structural defect [`TierTable::new`] rejects.
    #[instrument(skip(self))]
    pub fn build_table(&self) -> CopyforgeResult<TierTable> {
        let mut quotas: BTreeMap<Tier, BTreeMap<CategoryId, Quota>> = BTreeMap::new();
        for (name, tier_config) in &self.tiers {
            let tier: Tier = name
                .parse()
                .map_err(|_| GateError::new(GateErrorKind::UnknownTier(name.clone())))?;
            let mut categories = BTreeMap::new();
            for (category, setting) in &tier_config.quotas {
                categories.insert(CategoryId::new(category.as_str()), setting.resolve()?);
            }
            quotas.insert(tier, categories);
        }

        let mut features = BTreeMap::new();
        for (name, feature) in &self.features {
            let id = FeatureId::new(name.as_str());
            features.insert(
                id.clone(),
                FeatureSpec::new(
                    id,
                    CategoryId::new(feature.category.as_str()),
                    feature.min_tier,
                    feature.cost,
                ),
            );
        }

        let table = TierTable::new(window_from_days(self.window.days), quotas, features)?;
        debug!(
            features = table.features().count(),
            "Built tier table from configuration"
        );
        Ok(table)
    }
}
