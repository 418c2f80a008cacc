// 🗃️ Repository - read-only access to reference data
// The calculator and engine never touch SQL; they receive what the repository returns

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use std::sync::Mutex;

use crate::db::{self, IntensityOrder, SeedData};
use crate::models::{
    Country, CountryIntensity, EmissionFactor, EnergySource, IntensitySummary, RegionEmission,
};

pub trait FootprintRepository: Send + Sync {
    fn country_by_code(&self, code: &str) -> Result<Option<Country>>;

    /// All countries ordered by name
    fn all_countries(&self) -> Result<Vec<Country>>;

    fn emission_factors(&self) -> Result<Vec<EmissionFactor>>;

    fn region_emissions(&self) -> Result<Vec<RegionEmission>>;

    fn countries_by_intensity(
        &self,
        order: IntensityOrder,
        limit: usize,
    ) -> Result<Vec<CountryIntensity>>;

    /// Ordered by co2_per_kwh ascending
    fn energy_sources(&self) -> Result<Vec<EnergySource>>;

    fn intensity_summary(&self) -> Result<IntensitySummary>;
}

// ============================================================================
// SQLITE
// ============================================================================

pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    pub fn new(conn: Connection) -> Self {
        SqliteRepository {
            conn: Mutex::new(conn),
        }
    }

    /// In-memory database seeded with the embedded reference data
    pub fn in_memory() -> Result<Self> {
        let seed = SeedData::embedded()?;
        Ok(Self::new(db::open_in_memory(&seed)?))
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Database connection lock poisoned"))?;
        f(&conn)
    }
}

impl FootprintRepository for SqliteRepository {
    fn country_by_code(&self, code: &str) -> Result<Option<Country>> {
        self.with_conn(|conn| db::get_country(conn, code))
    }

    fn all_countries(&self) -> Result<Vec<Country>> {
        self.with_conn(db::get_all_countries)
    }

    fn emission_factors(&self) -> Result<Vec<EmissionFactor>> {
        self.with_conn(db::get_emission_factors)
    }

    fn region_emissions(&self) -> Result<Vec<RegionEmission>> {
        self.with_conn(db::get_region_emissions)
    }

    fn countries_by_intensity(
        &self,
        order: IntensityOrder,
        limit: usize,
    ) -> Result<Vec<CountryIntensity>> {
        self.with_conn(|conn| db::get_countries_by_intensity(conn, order, limit))
    }

    fn energy_sources(&self) -> Result<Vec<EnergySource>> {
        self.with_conn(db::get_energy_sources)
    }

    fn intensity_summary(&self) -> Result<IntensitySummary> {
        self.with_conn(db::get_intensity_summary)
    }
}

// ============================================================================
// IN-MEMORY (no database)
// ============================================================================

/// Vec-backed repository, handy for tests and for fixed datasets
#[derive(Debug, Clone, Default)]
pub struct StaticRepository {
    pub countries: Vec<Country>,
    pub emission_factors: Vec<EmissionFactor>,
    pub energy_sources: Vec<EnergySource>,
}

impl StaticRepository {
    pub fn new(countries: Vec<Country>, emission_factors: Vec<EmissionFactor>) -> Self {
        StaticRepository {
            countries,
            emission_factors,
            energy_sources: Vec::new(),
        }
    }

    pub fn from_seed(seed: SeedData) -> Self {
        StaticRepository {
            countries: seed.countries,
            emission_factors: seed.emission_factors,
            energy_sources: seed.energy_sources,
        }
    }
}

impl FootprintRepository for StaticRepository {
    fn country_by_code(&self, code: &str) -> Result<Option<Country>> {
        Ok(self.countries.iter().find(|c| c.code == code).cloned())
    }

    fn all_countries(&self) -> Result<Vec<Country>> {
        let mut countries = self.countries.clone();
        countries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(countries)
    }

    fn emission_factors(&self) -> Result<Vec<EmissionFactor>> {
        Ok(self.emission_factors.clone())
    }

    fn region_emissions(&self) -> Result<Vec<RegionEmission>> {
        let mut regions: Vec<RegionEmission> = Vec::new();

        for country in &self.countries {
            match regions.iter_mut().find(|r| r.region == country.region) {
                Some(region) => {
                    // avg_intensity holds the running sum until the end
                    region.country_count += 1;
                    region.avg_intensity += country.co2_intensity;
                    region.min_intensity = region.min_intensity.min(country.co2_intensity);
                    region.max_intensity = region.max_intensity.max(country.co2_intensity);
                }
                None => regions.push(RegionEmission {
                    region: country.region.clone(),
                    country_count: 1,
                    avg_intensity: country.co2_intensity,
                    min_intensity: country.co2_intensity,
                    max_intensity: country.co2_intensity,
                }),
            }
        }

        for region in &mut regions {
            region.avg_intensity /= region.country_count as f64;
        }
        regions.sort_by(|a, b| b.avg_intensity.total_cmp(&a.avg_intensity));

        Ok(regions)
    }

    fn countries_by_intensity(
        &self,
        order: IntensityOrder,
        limit: usize,
    ) -> Result<Vec<CountryIntensity>> {
        let mut ranked: Vec<CountryIntensity> = self
            .countries
            .iter()
            .map(|c| CountryIntensity {
                name: c.name.clone(),
                co2_intensity: c.co2_intensity,
            })
            .collect();

        ranked.sort_by(|a, b| {
            let by_intensity = match order {
                IntensityOrder::HighestFirst => b.co2_intensity.total_cmp(&a.co2_intensity),
                IntensityOrder::LowestFirst => a.co2_intensity.total_cmp(&b.co2_intensity),
            };
            by_intensity.then_with(|| a.name.cmp(&b.name))
        });
        ranked.truncate(limit);

        Ok(ranked)
    }

    fn energy_sources(&self) -> Result<Vec<EnergySource>> {
        let mut sources = self.energy_sources.clone();
        sources.sort_by(|a, b| a.co2_per_kwh.total_cmp(&b.co2_per_kwh));
        Ok(sources)
    }

    fn intensity_summary(&self) -> Result<IntensitySummary> {
        if self.countries.is_empty() {
            return Ok(IntensitySummary::default());
        }

        let intensities = self.countries.iter().map(|c| c.co2_intensity);
        let sum: f64 = intensities.clone().sum();

        Ok(IntensitySummary {
            global_avg: sum / self.countries.len() as f64,
            min_intensity: intensities.clone().fold(f64::INFINITY, f64::min),
            max_intensity: intensities.fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(code: &str, region: &str, intensity: f64) -> Country {
        Country {
            code: code.to_string(),
            name: format!("Country {}", code),
            co2_intensity: intensity,
            region: region.to_string(),
        }
    }

    #[test]
    fn test_static_lookup() {
        let repo = StaticRepository::new(vec![country("AA", "North", 0.5)], vec![]);

        assert!(repo.country_by_code("AA").unwrap().is_some());
        assert!(repo.country_by_code("BB").unwrap().is_none());
    }

    #[test]
    fn test_static_region_aggregates() {
        let repo = StaticRepository::new(
            vec![
                country("AA", "North", 0.2),
                country("BB", "North", 0.4),
                country("CC", "South", 0.9),
            ],
            vec![],
        );

        let regions = repo.region_emissions().unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].region, "South");
        assert_eq!(regions[1].country_count, 2);
        assert!((regions[1].avg_intensity - 0.3).abs() < 1e-9);
        assert_eq!(regions[1].min_intensity, 0.2);
        assert_eq!(regions[1].max_intensity, 0.4);
    }

    #[test]
    fn test_static_matches_sqlite() {
        let seed = SeedData::embedded().unwrap();
        let sqlite = SqliteRepository::in_memory().unwrap();
        let fixed = StaticRepository::from_seed(seed);

        assert_eq!(sqlite.all_countries().unwrap(), fixed.all_countries().unwrap());
        assert_eq!(
            sqlite.countries_by_intensity(IntensityOrder::HighestFirst, 10).unwrap(),
            fixed.countries_by_intensity(IntensityOrder::HighestFirst, 10).unwrap()
        );
        assert_eq!(
            sqlite.energy_sources().unwrap(),
            fixed.energy_sources().unwrap()
        );

        let a = sqlite.intensity_summary().unwrap();
        let b = fixed.intensity_summary().unwrap();
        assert!((a.global_avg - b.global_avg).abs() < 1e-9);
        assert_eq!(a.min_intensity, b.min_intensity);
        assert_eq!(a.max_intensity, b.max_intensity);
    }
}
