// ⚙️ Configuration - constants as data
// Calculator defaults and recommendation thresholds (JSON), server settings (env)

use anyhow::{anyhow, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

// ============================================================================
// ACTIVITY NAMES (emission_factors.activity)
// ============================================================================

pub const CAR_GASOLINE: &str = "car gasoline";
pub const BUS: &str = "bus";
pub const TRAIN: &str = "train";
pub const DOMESTIC_FLIGHT: &str = "domestic flight";
pub const BEEF: &str = "beef";
pub const CHEESE: &str = "cheese";
pub const VEGETABLES: &str = "vegetables";

// ============================================================================
// CALCULATOR CONFIG
// ============================================================================

/// Constants used by the footprint calculator.
///
/// `default_factors` is the fallback when the data store has no row for an
/// activity. Everything else is a fixed conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// activity -> kg CO2 per unit
    pub default_factors: HashMap<String, f64>,

    /// kg CO2 per m³ of water
    pub water_factor: f64,

    /// kg CO2 absorbed by one tree per year
    pub tree_absorption_kg: f64,

    /// kg CO2 of one reference flight
    pub flight_kg: f64,

    /// kg CO2 per km of an average car
    pub car_kg_per_km: f64,

    /// Global average footprint, kg CO2 per person per year
    pub global_annual_avg_kg: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        let default_factors = [
            (CAR_GASOLINE, 0.21),
            (BUS, 0.089),
            (TRAIN, 0.041),
            (DOMESTIC_FLIGHT, 0.255),
            (BEEF, 27.0),
            (CHEESE, 13.5),
            (VEGETABLES, 0.5),
        ]
        .into_iter()
        .map(|(activity, value)| (activity.to_string(), value))
        .collect();

        CalculatorConfig {
            default_factors,
            water_factor: 0.2,
            tree_absorption_kg: 20.0,
            flight_kg: 700.0,
            car_kg_per_km: 0.21,
            global_annual_avg_kg: 4800.0,
        }
    }
}

impl CalculatorConfig {
    /// Configured fallback for an activity (0.0 if the activity is unknown)
    pub fn default_factor(&self, activity: &str) -> f64 {
        self.default_factors.get(activity).copied().unwrap_or(0.0)
    }
}

// ============================================================================
// RECOMMENDATION THRESHOLDS
// ============================================================================

/// Monthly kg CO2 above which a category gets a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub transport: f64,
    pub food: f64,
    pub habitat: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            transport: 50.0,
            food: 30.0,
            habitat: 40.0,
        }
    }
}

// ============================================================================
// APP CONFIG (JSON file)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub calculator: CalculatorConfig,
    pub thresholds: Thresholds,
}

impl AppConfig {
    /// Load overrides from a JSON file; omitted keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let mut config: AppConfig =
            serde_json::from_str(content).context("Failed to parse config JSON")?;

        // A partial factor map only overrides the activities it names
        let mut factors = CalculatorConfig::default().default_factors;
        factors.extend(config.calculator.default_factors.drain());
        config.calculator.default_factors = factors;

        Ok(config)
    }
}

// ============================================================================
// SERVER CONFIG (environment)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub static_dir: PathBuf,
    pub app: AppConfig,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        let app = match env::var("FOOTPRINT_CONFIG") {
            Ok(path) => {
                info!("Loading calculator config from {path}");
                AppConfig::from_file(&path)?
            }
            Err(_) => AppConfig::default(),
        };

        Ok(ServerConfig {
            host: try_load("FOOTPRINT_HOST", "127.0.0.1")?,
            port: try_load("FOOTPRINT_PORT", "5000")?,
            database_path: try_load("FOOTPRINT_DB", "footprint.db")?,
            static_dir: try_load("FOOTPRINT_STATIC_DIR", "web/static")?,
            app,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("Invalid {key} value {raw:?}: {e}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_factors() {
        let config = CalculatorConfig::default();

        assert_eq!(config.default_factor(CAR_GASOLINE), 0.21);
        assert_eq!(config.default_factor(DOMESTIC_FLIGHT), 0.255);
        assert_eq!(config.default_factor(BEEF), 27.0);
        assert_eq!(config.default_factor("hoverboard"), 0.0);
        assert_eq!(config.global_annual_avg_kg, 4800.0);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = AppConfig::from_json(
            r#"{
                "calculator": {"default_factors": {"beef": 30.0}, "global_annual_avg_kg": 5000},
                "thresholds": {"transport": 80}
            }"#,
        )
        .unwrap();

        assert_eq!(config.calculator.default_factor(BEEF), 30.0);
        assert_eq!(config.calculator.default_factor(CHEESE), 13.5);
        assert_eq!(config.calculator.global_annual_avg_kg, 5000.0);
        assert_eq!(config.calculator.water_factor, 0.2);
        assert_eq!(config.thresholds.transport, 80.0);
        assert_eq!(config.thresholds.food, 30.0);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(AppConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_try_load_falls_back_to_default() {
        let port: u16 = try_load("FOOTPRINT_TEST_UNSET_PORT", "5000").unwrap();
        assert_eq!(port, 5000);
    }
}
