// 🌱 Footprint Service - repository lookups + calculator + recommendation engine
// One instance is built at startup and shared by every request

use std::sync::Arc;

use crate::calculator::{factor_map, Calculator};
use crate::config::AppConfig;
use crate::db::IntensityOrder;
use crate::error::FootprintError;
use crate::models::{
    CategoryTotals, Country, EmissionFactor, FootprintInput, FootprintResult, IntensitySummary,
    Statistics,
};
use crate::recommendations::{Recommendation, RecommendationEngine};
use crate::repository::FootprintRepository;

/// Size of the most polluting / cleanest rankings
pub const RANKING_SIZE: usize = 10;

pub struct FootprintService {
    repository: Arc<dyn FootprintRepository>,
    calculator: Calculator,
    engine: RecommendationEngine,
}

impl FootprintService {
    pub fn new(repository: Arc<dyn FootprintRepository>, config: AppConfig) -> Self {
        FootprintService {
            repository,
            calculator: Calculator::new(config.calculator),
            engine: RecommendationEngine::new(config.thresholds),
        }
    }

    pub fn country(&self, code: &str) -> Result<Country, FootprintError> {
        self.repository
            .country_by_code(code)?
            .ok_or_else(|| FootprintError::CountryNotFound(code.to_string()))
    }

    pub fn countries(&self) -> Result<Vec<Country>, FootprintError> {
        Ok(self.repository.all_countries()?)
    }

    pub fn emission_factors(&self) -> Result<Vec<EmissionFactor>, FootprintError> {
        Ok(self.repository.emission_factors()?)
    }

    /// Look up the country, then compute. Unknown countries never produce a result.
    pub fn calculate(&self, input: &FootprintInput) -> Result<FootprintResult, FootprintError> {
        let country = self.country(&input.country_code)?;
        let factors = factor_map(&self.repository.emission_factors()?);

        let result = self
            .calculator
            .calculate(country.co2_intensity, &input.quantities, &factors);

        tracing::debug!(
            country = %country.code,
            monthly = result.totals.monthly,
            annual = result.totals.annual,
            "Calculated footprint"
        );

        Ok(result)
    }

    pub fn recommendations(&self, totals: &CategoryTotals) -> Vec<Recommendation> {
        self.engine.recommend(totals)
    }

    pub fn statistics(&self) -> Result<Statistics, FootprintError> {
        Ok(Statistics {
            regions: self.repository.region_emissions()?,
            most_polluting: self
                .repository
                .countries_by_intensity(IntensityOrder::HighestFirst, RANKING_SIZE)?,
            cleanest: self
                .repository
                .countries_by_intensity(IntensityOrder::LowestFirst, RANKING_SIZE)?,
            energy_sources: self.repository.energy_sources()?,
        })
    }

    pub fn intensity_summary(&self) -> Result<IntensitySummary, FootprintError> {
        Ok(self.repository.intensity_summary()?)
    }
}
