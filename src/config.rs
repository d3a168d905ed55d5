use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    eligibility::clock::parse_date,
    error::{CaseError, Result},
};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub filter: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClockConfig {
    /// Pin "today" for reproducible reports (ISO date).
    pub reference_date: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
}

impl Config {
    /// Defaults, then the TOML file at `path` (if present), then
    /// `USAGERS__SECTION__KEY` environment variables.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .set_default("database.path", "usagers.db")?
            .set_default("logging.filter", "usagers=info,usagers_eligibility=info")?
            .set_default("output.format", "table")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("USAGERS").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn reference_date(&self) -> Result<Option<NaiveDate>> {
        match self.clock.reference_date.as_deref() {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_date(raw)
                .map(Some)
                .ok_or_else(|| CaseError::Config(format!("Invalid clock.reference_date: {}", raw))),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}
