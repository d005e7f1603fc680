use crate::core::MatchPolicy;
use crate::models::ScoringWeights;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub auth: AuthSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Marketplace backend that owns accounts, alerts, favorites and listings
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// HS256 secret shared with the backend that issues the tokens
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            redis_url: None,
            ttl_secs: None,
            l1_cache_size: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingSettings {
    pub default_limit: Option<usize>,
    pub max_limit: Option<usize>,
    pub novelty_window_days: Option<i64>,
    pub search_history_depth: Option<usize>,
    pub max_reasons: Option<usize>,
    pub reason_min_points: Option<f64>,
    pub rent_tolerance: Option<f64>,
    pub size_tolerance: Option<f64>,
    pub profession_prefilter: Option<bool>,
    pub min_score: Option<u8>,
}

impl MatchingSettings {
    /// Overlay the configured values on the default policy
    pub fn to_policy(&self) -> MatchPolicy {
        let defaults = MatchPolicy::default();
        let default_limit = self.default_limit.filter(|l| *l > 0).unwrap_or(defaults.default_limit);

        MatchPolicy {
            default_limit,
            max_limit: self.max_limit.unwrap_or(defaults.max_limit).max(default_limit),
            novelty_window_days: self.novelty_window_days.unwrap_or(defaults.novelty_window_days),
            search_history_depth: self.search_history_depth.unwrap_or(defaults.search_history_depth),
            max_reasons: self.max_reasons.unwrap_or(defaults.max_reasons),
            reason_min_points: self.reason_min_points.unwrap_or(defaults.reason_min_points),
            rent_tolerance: self.rent_tolerance.unwrap_or(defaults.rent_tolerance),
            size_tolerance: self.size_tolerance.unwrap_or(defaults.size_tolerance),
            profession_prefilter: self.profession_prefilter.unwrap_or(defaults.profession_prefilter),
            min_score: self.min_score.unwrap_or(defaults.min_score).min(100),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_profession_weight")]
    pub profession: f64,
    #[serde(default = "default_city_weight")]
    pub city: f64,
    #[serde(default = "default_rent_weight")]
    pub rent: f64,
    #[serde(default = "default_size_weight")]
    pub size: f64,
    #[serde(default = "default_structure_weight")]
    pub structure: f64,
    #[serde(default = "default_novelty_weight")]
    pub novelty: f64,
    #[serde(default = "default_featured_weight")]
    pub featured: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            profession: default_profession_weight(),
            city: default_city_weight(),
            rent: default_rent_weight(),
            size: default_size_weight(),
            structure: default_structure_weight(),
            novelty: default_novelty_weight(),
            featured: default_featured_weight(),
        }
    }
}

impl WeightsConfig {
    pub fn to_weights(&self) -> Result<ScoringWeights, ConfigError> {
        let weights = ScoringWeights {
            profession: self.profession,
            city: self.city,
            rent: self.rent,
            size: self.size,
            structure: self.structure,
            novelty: self.novelty,
            featured: self.featured,
        };
        weights.validate().map_err(ConfigError::Message)?;
        Ok(weights)
    }
}

fn default_profession_weight() -> f64 { 0.25 }
fn default_city_weight() -> f64 { 0.25 }
fn default_rent_weight() -> f64 { 0.20 }
fn default_size_weight() -> f64 { 0.10 }
fn default_structure_weight() -> f64 { 0.10 }
fn default_novelty_weight() -> f64 { 0.05 }
fn default_featured_weight() -> f64 { 0.05 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "pretty".to_string() }
fn default_true() -> bool { true }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Configuration file (config/default.toml)
    /// 2. Local overrides (config/local.toml)
    /// 3. Environment variables (prefixed with CABLIB__)
    /// 4. DATABASE_URL, SECRET_KEY, BACKEND_URL and REDIS_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CABLIB__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Validated weight table and matching policy
    pub fn matching_setup(&self) -> Result<(ScoringWeights, MatchPolicy), ConfigError> {
        Ok((self.scoring.weights.to_weights()?, self.matching.to_policy()))
    }
}

fn environment() -> Environment {
    Environment::with_prefix("CABLIB")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the conventional deployment variables on top of the loaded config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("DATABASE_URL", "database.url"),
        ("SECRET_KEY", "auth.jwt_secret"),
        ("BACKEND_URL", "backend.base_url"),
        ("REDIS_URL", "cache.redis_url"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            if !value.trim().is_empty() {
                builder = builder.set_override(key, value)?;
            }
        }
    }

    builder.build()
}
