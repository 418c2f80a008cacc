// Carbon Footprint Calculator - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod calculator;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod recommendations;
pub mod repository;
pub mod service;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use calculator::{factor_map, round_to, Calculator, FactorMap};
pub use config::{AppConfig, CalculatorConfig, ServerConfig, Thresholds};
pub use db::{
    IntensityOrder, SeedData, SeedReport,
    open_database, open_in_memory, setup_database, seed_database, count_countries,
};
pub use error::FootprintError;
pub use models::{
    ActivityQuantities, CategoryTotals, Country, CountryIntensity, EmissionFactor, EnergySource,
    FootprintInput, FootprintResult, FootprintTotals, IntensitySummary, RegionEmission, Statistics,
};
pub use recommendations::{Area, Priority, Recommendation, RecommendationEngine};
pub use repository::{FootprintRepository, SqliteRepository, StaticRepository};
pub use service::FootprintService;

#[cfg(feature = "server")]
pub use api::{create_router, AppState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
