use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::models::{
    Country, CountryIntensity, EmissionFactor, EnergySource, IntensitySummary, RegionEmission,
};

// ============================================================================
// SEED DATA (embedded CSV, overridable from a directory)
// ============================================================================

const COUNTRIES_CSV: &str = include_str!("../data/countries.csv");
const EMISSION_FACTORS_CSV: &str = include_str!("../data/emission_factors.csv");
const ENERGY_SOURCES_CSV: &str = include_str!("../data/energy_sources.csv");

/// Reference tables loaded into the database at startup
#[derive(Debug, Clone)]
pub struct SeedData {
    pub countries: Vec<Country>,
    pub emission_factors: Vec<EmissionFactor>,
    pub energy_sources: Vec<EnergySource>,
}

impl SeedData {
    /// Seed files compiled into the binary
    pub fn embedded() -> Result<Self> {
        Ok(SeedData {
            countries: load_csv(COUNTRIES_CSV.as_bytes()).context("Invalid embedded countries.csv")?,
            emission_factors: load_csv(EMISSION_FACTORS_CSV.as_bytes())
                .context("Invalid embedded emission_factors.csv")?,
            energy_sources: load_csv(ENERGY_SOURCES_CSV.as_bytes())
                .context("Invalid embedded energy_sources.csv")?,
        })
    }

    /// Read countries.csv, emission_factors.csv and energy_sources.csv from `dir`
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Ok(SeedData {
            countries: load_csv_file(&dir.join("countries.csv"))?,
            emission_factors: load_csv_file(&dir.join("emission_factors.csv"))?,
            energy_sources: load_csv_file(&dir.join("energy_sources.csv"))?,
        })
    }
}

pub fn load_csv<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: T = result.context("Failed to deserialize seed row")?;
        rows.push(row);
    }

    Ok(rows)
}

pub fn load_csv_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    load_csv(file).with_context(|| format!("Failed to load {:?}", path))
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL is a no-op for in-memory databases
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS countries (
            code TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            region TEXT NOT NULL,
            co2_intensity REAL NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS emission_factors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            activity TEXT UNIQUE NOT NULL,
            co2_emissions REAL NOT NULL,
            unit TEXT NOT NULL,
            category TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS energy_sources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            co2_per_kwh REAL NOT NULL,
            description TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_countries_region ON countries(region)",
        [],
    )?;

    conn.execute(
        "CREATE VIEW IF NOT EXISTS emissions_by_region AS
         SELECT
            region,
            COUNT(*) AS country_count,
            AVG(co2_intensity) AS avg_intensity,
            MIN(co2_intensity) AS min_intensity,
            MAX(co2_intensity) AS max_intensity
         FROM countries
         GROUP BY region",
        [],
    )?;

    Ok(())
}

// ============================================================================
// SEEDING
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub countries: usize,
    pub emission_factors: usize,
    pub energy_sources: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.countries + self.emission_factors + self.energy_sources
    }
}

/// Insert seed rows, skipping rows whose key already exists.
/// Runs in a single transaction; calling it twice inserts nothing the second time.
pub fn seed_database(conn: &mut Connection, seed: &SeedData) -> Result<SeedReport> {
    let tx = conn.transaction()?;
    let mut report = SeedReport::default();

    for country in &seed.countries {
        report.countries += tx.execute(
            "INSERT OR IGNORE INTO countries (code, name, region, co2_intensity)
             VALUES (?1, ?2, ?3, ?4)",
            params![country.code, country.name, country.region, country.co2_intensity],
        )?;
    }

    for factor in &seed.emission_factors {
        report.emission_factors += tx.execute(
            "INSERT OR IGNORE INTO emission_factors (activity, co2_emissions, unit, category)
             VALUES (?1, ?2, ?3, ?4)",
            params![factor.activity, factor.co2_emissions, factor.unit, factor.category],
        )?;
    }

    for source in &seed.energy_sources {
        report.energy_sources += tx.execute(
            "INSERT OR IGNORE INTO energy_sources (name, co2_per_kwh, description)
             VALUES (?1, ?2, ?3)",
            params![source.name, source.co2_per_kwh, source.description],
        )?;
    }

    tx.commit()?;
    Ok(report)
}

/// Open (or create) the database, ensure the schema and seed it if empty
pub fn open_database(path: &Path, seed: &SeedData) -> Result<Connection> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {:?}", path))?;
    prepare(&mut conn, seed)?;
    Ok(conn)
}

pub fn open_in_memory(seed: &SeedData) -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    prepare(&mut conn, seed)?;
    Ok(conn)
}

fn prepare(conn: &mut Connection, seed: &SeedData) -> Result<()> {
    setup_database(conn)?;

    if count_countries(conn)? == 0 {
        let report = seed_database(conn, seed)?;
        tracing::info!(
            countries = report.countries,
            emission_factors = report.emission_factors,
            energy_sources = report.energy_sources,
            "Seeded reference data"
        );
    }

    Ok(())
}

pub fn count_countries(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM countries", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// QUERIES
// ============================================================================

fn country_from_row(row: &rusqlite::Row) -> rusqlite::Result<Country> {
    Ok(Country {
        code: row.get(0)?,
        name: row.get(1)?,
        co2_intensity: row.get(2)?,
        region: row.get(3)?,
    })
}

pub fn get_country(conn: &Connection, code: &str) -> Result<Option<Country>> {
    let country = conn
        .query_row(
            "SELECT code, name, co2_intensity, region FROM countries WHERE code = ?1",
            [code],
            country_from_row,
        )
        .optional()?;

    Ok(country)
}

/// All countries ordered by name
pub fn get_all_countries(conn: &Connection) -> Result<Vec<Country>> {
    let mut stmt =
        conn.prepare("SELECT code, name, co2_intensity, region FROM countries ORDER BY name")?;

    let countries = stmt
        .query_map([], country_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(countries)
}

pub fn get_emission_factors(conn: &Connection) -> Result<Vec<EmissionFactor>> {
    let mut stmt = conn.prepare(
        "SELECT activity, co2_emissions, unit, category
         FROM emission_factors
         ORDER BY category, activity",
    )?;

    let factors = stmt
        .query_map([], |row| {
            Ok(EmissionFactor {
                activity: row.get(0)?,
                co2_emissions: row.get(1)?,
                unit: row.get(2)?,
                category: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(factors)
}

pub fn get_region_emissions(conn: &Connection) -> Result<Vec<RegionEmission>> {
    let mut stmt = conn.prepare(
        "SELECT region, country_count, avg_intensity, min_intensity, max_intensity
         FROM emissions_by_region
         ORDER BY avg_intensity DESC",
    )?;

    let regions = stmt
        .query_map([], |row| {
            Ok(RegionEmission {
                region: row.get(0)?,
                country_count: row.get(1)?,
                avg_intensity: row.get(2)?,
                min_intensity: row.get(3)?,
                max_intensity: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(regions)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntensityOrder {
    HighestFirst,
    LowestFirst,
}

pub fn get_countries_by_intensity(
    conn: &Connection,
    order: IntensityOrder,
    limit: usize,
) -> Result<Vec<CountryIntensity>> {
    let sql = match order {
        IntensityOrder::HighestFirst => {
            "SELECT name, co2_intensity FROM countries ORDER BY co2_intensity DESC, name LIMIT ?1"
        }
        IntensityOrder::LowestFirst => {
            "SELECT name, co2_intensity FROM countries ORDER BY co2_intensity ASC, name LIMIT ?1"
        }
    };

    let mut stmt = conn.prepare(sql)?;
    let countries = stmt
        .query_map([limit as i64], |row| {
            Ok(CountryIntensity {
                name: row.get(0)?,
                co2_intensity: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(countries)
}

pub fn get_energy_sources(conn: &Connection) -> Result<Vec<EnergySource>> {
    let mut stmt = conn.prepare(
        "SELECT name, co2_per_kwh, description FROM energy_sources ORDER BY co2_per_kwh ASC",
    )?;

    let sources = stmt
        .query_map([], |row| {
            Ok(EnergySource {
                name: row.get(0)?,
                co2_per_kwh: row.get(1)?,
                description: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(sources)
}

/// Average/min/max intensity over all countries (zeros when the table is empty)
pub fn get_intensity_summary(conn: &Connection) -> Result<IntensitySummary> {
    let summary = conn.query_row(
        "SELECT AVG(co2_intensity), MIN(co2_intensity), MAX(co2_intensity) FROM countries",
        [],
        |row| {
            let avg: Option<f64> = row.get(0)?;
            let min: Option<f64> = row.get(1)?;
            let max: Option<f64> = row.get(2)?;
            Ok(IntensitySummary {
                global_avg: avg.unwrap_or(0.0),
                min_intensity: min.unwrap_or(0.0),
                max_intensity: max.unwrap_or(0.0),
            })
        },
    )?;

    Ok(summary)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Connection {
        open_in_memory(&SeedData::embedded().unwrap()).unwrap()
    }

    #[test]
    fn test_embedded_seed_parses() {
        let seed = SeedData::embedded().unwrap();

        assert!(seed.countries.len() >= 20);
        assert!(seed.emission_factors.iter().any(|f| f.activity == "car gasoline"));
        assert!(seed.energy_sources.iter().any(|s| s.name == "Coal"));
    }

    #[test]
    fn test_seed_is_idempotent() {
        let seed = SeedData::embedded().unwrap();
        let mut conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let first = seed_database(&mut conn, &seed).unwrap();
        let second = seed_database(&mut conn, &seed).unwrap();

        assert_eq!(first.countries, seed.countries.len());
        assert_eq!(second.total(), 0, "Second seed should insert nothing");
        assert_eq!(count_countries(&conn).unwrap(), seed.countries.len() as i64);
    }

    #[test]
    fn test_get_country() {
        let conn = seeded();

        let france = get_country(&conn, "FR").unwrap().unwrap();
        assert_eq!(france.name, "France");
        assert_eq!(france.region, "Europe");
        assert!(france.co2_intensity > 0.0);

        assert!(get_country(&conn, "ZZ").unwrap().is_none());
    }

    #[test]
    fn test_countries_ordered_by_name() {
        let conn = seeded();
        let countries = get_all_countries(&conn).unwrap();

        let names: Vec<&str> = countries.iter().map(|c| c.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_intensity_rankings() {
        let conn = seeded();

        let top = get_countries_by_intensity(&conn, IntensityOrder::HighestFirst, 10).unwrap();
        let clean = get_countries_by_intensity(&conn, IntensityOrder::LowestFirst, 10).unwrap();

        assert_eq!(top.len(), 10);
        assert_eq!(clean.len(), 10);
        assert!(top.windows(2).all(|w| w[0].co2_intensity >= w[1].co2_intensity));
        assert!(clean.windows(2).all(|w| w[0].co2_intensity <= w[1].co2_intensity));
        assert!(top[0].co2_intensity >= clean[0].co2_intensity);
    }

    #[test]
    fn test_region_view_covers_all_countries() {
        let conn = seeded();
        let regions = get_region_emissions(&conn).unwrap();

        let total: i64 = regions.iter().map(|r| r.country_count).sum();
        assert_eq!(total, count_countries(&conn).unwrap());

        for region in &regions {
            assert!(region.min_intensity <= region.avg_intensity);
            assert!(region.avg_intensity <= region.max_intensity);
        }
    }

    #[test]
    fn test_energy_sources_ascending() {
        let conn = seeded();
        let sources = get_energy_sources(&conn).unwrap();

        assert!(!sources.is_empty());
        assert!(sources.windows(2).all(|w| w[0].co2_per_kwh <= w[1].co2_per_kwh));
    }

    #[test]
    fn test_intensity_summary_empty_table() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let summary = get_intensity_summary(&conn).unwrap();
        assert_eq!(summary, IntensitySummary::default());
    }

    #[test]
    fn test_intensity_summary() {
        let conn = seeded();
        let summary = get_intensity_summary(&conn).unwrap();

        assert!(summary.min_intensity <= summary.global_avg);
        assert!(summary.global_avg <= summary.max_intensity);
    }
}
