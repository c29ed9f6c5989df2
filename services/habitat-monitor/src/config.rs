//! Configuration loading for the habitat monitor.
//!
//! Loads `config/monitor.yaml`, expanding `${VAR}` and `${VAR:-default}`
//! from the environment so provider credentials stay out of the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use biodiversity::{OccurrenceConfig, RedListConfig};
use habitat_common::DateRange;
use imagery::{FetcherConfig, HttpSourceConfig};
use serde::Deserialize;
use tracing::debug;
use vegetation::{BandMapping, NdviCalculator, DEFAULT_EPSILON};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub imagery: ImageryConfig,
    #[serde(default)]
    pub occurrence: OccurrenceConfig,
    #[serde(default)]
    pub redlist: RedListConfig,
    #[serde(default)]
    pub ndvi: NdviConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Imagery provider connection plus revisit walk settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageryConfig {
    #[serde(flatten)]
    pub source: HttpSourceConfig,
    #[serde(flatten)]
    pub fetcher: FetcherConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NdviConfig {
    #[serde(flatten)]
    pub bands: BandMapping,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

impl Default for NdviConfig {
    fn default() -> Self {
        Self {
            bands: BandMapping::default(),
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl NdviConfig {
    pub fn calculator(&self) -> Result<NdviCalculator> {
        NdviCalculator::new(self.bands, self.epsilon).context("Invalid NDVI configuration")
    }
}

/// What to analyse and where to put the results.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_species_file")]
    pub species_file: PathBuf,
    #[serde(default = "default_start_date")]
    pub start_date: String,
    #[serde(default = "default_end_date")]
    pub end_date: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Which occurrence location to analyse
    #[serde(default)]
    pub location_index: usize,
}

fn default_species_file() -> PathBuf {
    PathBuf::from("data/endangered_species.json")
}

fn default_start_date() -> String {
    "2023-01-01".to_string()
}

fn default_end_date() -> String {
    "2023-03-31".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            species_file: default_species_file(),
            start_date: default_start_date(),
            end_date: default_end_date(),
            output_dir: default_output_dir(),
            location_index: 0,
        }
    }
}

impl RunConfig {
    pub fn date_range(&self) -> Result<DateRange> {
        DateRange::parse(&self.start_date, &self.end_date).with_context(|| {
            format!(
                "Invalid monitoring window {} .. {}",
                self.start_date, self.end_date
            )
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl MonitorConfig {
    /// Load and validate a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML configuration file without validating it, so callers can
    /// apply overrides first.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded monitor config");
        Ok(config)
    }

    /// Parse and validate YAML text, expanding environment variables first.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config = Self::parse(content)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        Ok(serde_yaml::from_str(&expanded)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.imagery.source.base_url.is_empty(),
            "imagery.base_url cannot be empty"
        );
        self.imagery
            .fetcher
            .validate()
            .context("Invalid imagery walk settings")?;
        anyhow::ensure!(
            self.occurrence.limit > 0,
            "occurrence.limit must be greater than 0"
        );
        self.ndvi.calculator()?;
        self.run.date_range()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        anyhow::ensure!(
            valid_levels.contains(&self.logging.level.as_str()),
            "Invalid log level: {}. Must be one of: {:?}",
            self.logging.level,
            valid_levels
        );

        let valid_formats = ["json", "pretty"];
        anyhow::ensure!(
            valid_formats.contains(&self.logging.format.as_str()),
            "Invalid log format: {}. Must be one of: {:?}",
            self.logging.format,
            valid_formats
        );

        Ok(())
    }
}

/// Expand environment variables in YAML content.
/// Supports ${VAR} and ${VAR:-default} syntax. Comment lines are copied
/// through untouched.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());

    for line in content.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
        } else {
            expand_line(line, &mut result)?;
        }
    }

    Ok(result)
}

fn expand_line(line: &str, out: &mut String) -> Result<()> {
    let mut rest = line;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .with_context(|| format!("Unclosed variable substitution: ${{{}", after.trim_end()))?;
        out.push_str(&resolve_var_expr(&after[..end])?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(())
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr))
    }
}
