// 🌍 Reference & Footprint Models
// Countries, emission factors and the transient input/result shapes of a calculation

use serde::{Deserialize, Serialize};

// ============================================================================
// REFERENCE DATA (immutable after seeding)
// ============================================================================

/// Country with the carbon intensity of its electricity mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// ISO alpha-2 code (e.g. "FR")
    pub code: String,
    pub name: String,
    /// kg CO2 per kWh of electricity generated
    pub co2_intensity: f64,
    pub region: String,
}

/// kg CO2 emitted per unit of an activity (per km, per kg...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    pub activity: String,
    pub co2_emissions: f64,
    pub unit: String,
    pub category: String,
}

/// Electricity generation source, for the statistics page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySource {
    pub name: String,
    pub co2_per_kwh: f64,
    pub description: String,
}

/// Aggregate over all countries of a region (emissions_by_region view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEmission {
    pub region: String,
    pub country_count: i64,
    pub avg_intensity: f64,
    pub min_intensity: f64,
    pub max_intensity: f64,
}

/// Country name + intensity, used by the top-10 rankings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryIntensity {
    pub name: String,
    pub co2_intensity: f64,
}

/// Global intensity figures shown on the landing page
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IntensitySummary {
    pub global_avg: f64,
    pub min_intensity: f64,
    pub max_intensity: f64,
}

/// Everything `GET /api/statistics` returns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub regions: Vec<RegionEmission>,
    pub most_polluting: Vec<CountryIntensity>,
    pub cleanest: Vec<CountryIntensity>,
    pub energy_sources: Vec<EnergySource>,
}

// ============================================================================
// FOOTPRINT INPUT (per request, never persisted)
// ============================================================================

pub const DEFAULT_COUNTRY_CODE: &str = "FR";

fn default_country_code() -> String {
    DEFAULT_COUNTRY_CODE.to_string()
}

/// Monthly quantities reported by the user.
///
/// Every quantity is optional on the wire and defaults to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityQuantities {
    // Transport (km)
    pub car_km: f64,
    pub bus_km: f64,
    pub train_km: f64,
    pub flight_km: f64,

    // Housing
    pub heating_kwh: f64,
    pub electricity_kwh: f64,
    pub water_m3: f64,

    // Food (kg)
    pub meat_kg: f64,
    pub dairy_kg: f64,
    pub vegetables_kg: f64,
}

/// Body of `POST /api/calculate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintInput {
    #[serde(default = "default_country_code")]
    pub country_code: String,

    #[serde(flatten)]
    pub quantities: ActivityQuantities,
}

impl Default for FootprintInput {
    fn default() -> Self {
        FootprintInput {
            country_code: default_country_code(),
            quantities: ActivityQuantities::default(),
        }
    }
}

impl FootprintInput {
    pub fn new(country_code: &str, quantities: ActivityQuantities) -> Self {
        FootprintInput {
            country_code: country_code.to_string(),
            quantities,
        }
    }

    /// Set a quantity from its wire name (`car_km`, `meat_kg`...).
    /// Returns false when the name is not a known quantity.
    pub fn set_quantity(&mut self, name: &str, value: f64) -> bool {
        let q = &mut self.quantities;
        let slot = match name {
            "car_km" => &mut q.car_km,
            "bus_km" => &mut q.bus_km,
            "train_km" => &mut q.train_km,
            "flight_km" => &mut q.flight_km,
            "heating_kwh" => &mut q.heating_kwh,
            "electricity_kwh" => &mut q.electricity_kwh,
            "water_m3" => &mut q.water_m3,
            "meat_kg" => &mut q.meat_kg,
            "dairy_kg" => &mut q.dairy_kg,
            "vegetables_kg" => &mut q.vegetables_kg,
            _ => return false,
        };
        *slot = value;
        true
    }
}

// ============================================================================
// FOOTPRINT RESULT (derived, kg CO2 per month unless stated)
// ============================================================================
// Every section defaults so that a partial result posted back to
// /api/recommendations still deserializes.

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportEmissions {
    pub car: f64,
    pub bus: f64,
    pub train: f64,
    pub flight: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitatEmissions {
    pub heating: f64,
    pub electricity: f64,
    pub water: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodEmissions {
    pub meat: f64,
    pub dairy: f64,
    pub vegetables: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintTotals {
    pub monthly: f64,
    pub annual: f64,
    pub trees_needed: f64,
    pub flights_equivalent: f64,
    #[serde(rename = "cars_km")]
    pub cars_km_equivalent: f64,
    /// Percent above (+) or below (-) the global annual average
    #[serde(rename = "vs_global")]
    pub vs_global_pct: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintResult {
    pub transport: TransportEmissions,
    pub habitat: HabitatEmissions,
    pub food: FoodEmissions,
    pub totals: FootprintTotals,
}

/// Per-category monthly subtotals, the only input of the recommendation engine
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryTotals {
    pub transport: f64,
    pub food: f64,
    pub habitat: f64,
}

impl FootprintResult {
    pub fn category_totals(&self) -> CategoryTotals {
        CategoryTotals {
            transport: self.transport.total,
            food: self.food.total,
            habitat: self.habitat.total,
        }
    }
}
