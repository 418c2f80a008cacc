// 🧮 Footprint Calculator
// Monthly emissions per activity from quantities, country intensity and factors

use crate::config::{self, CalculatorConfig};
use crate::models::{
    ActivityQuantities, EmissionFactor, FoodEmissions, FootprintResult, FootprintTotals,
    HabitatEmissions, TransportEmissions,
};
use std::collections::HashMap;

/// activity -> kg CO2 per unit, as read from the data store
pub type FactorMap = HashMap<String, f64>;

pub fn factor_map(factors: &[EmissionFactor]) -> FactorMap {
    factors
        .iter()
        .map(|f| (f.activity.clone(), f.co2_emissions))
        .collect()
}

/// Round to `decimals` places, ties to even, on the exact stored value.
/// `4.35 * 10` is exactly 43.5 although 4.35 is stored below it, hence no scaling.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

#[derive(Debug, Clone, Default)]
pub struct Calculator {
    config: CalculatorConfig,
}

impl Calculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Calculator { config }
    }

    /// Store value first, configured default otherwise
    fn factor(&self, factors: &FactorMap, activity: &str) -> f64 {
        factors
            .get(activity)
            .copied()
            .unwrap_or_else(|| self.config.default_factor(activity))
    }

    /// Compute a monthly footprint.
    ///
    /// `co2_intensity` is the country's kg CO2 per kWh and applies to both
    /// heating and electricity. Quantities are taken as-is, negative ones included.
    pub fn calculate(
        &self,
        co2_intensity: f64,
        quantities: &ActivityQuantities,
        factors: &FactorMap,
    ) -> FootprintResult {
        let q = quantities;

        let mut transport = TransportEmissions {
            car: q.car_km * self.factor(factors, config::CAR_GASOLINE),
            bus: q.bus_km * self.factor(factors, config::BUS),
            train: q.train_km * self.factor(factors, config::TRAIN),
            flight: q.flight_km * self.factor(factors, config::DOMESTIC_FLIGHT),
            total: 0.0,
        };
        transport.total = transport.car + transport.bus + transport.train + transport.flight;

        let mut habitat = HabitatEmissions {
            heating: q.heating_kwh * co2_intensity,
            electricity: q.electricity_kwh * co2_intensity,
            water: q.water_m3 * self.config.water_factor,
            total: 0.0,
        };
        habitat.total = habitat.heating + habitat.electricity + habitat.water;

        let mut food = FoodEmissions {
            meat: q.meat_kg * self.factor(factors, config::BEEF),
            dairy: q.dairy_kg * self.factor(factors, config::CHEESE),
            vegetables: q.vegetables_kg * self.factor(factors, config::VEGETABLES),
            total: 0.0,
        };
        food.total = food.meat + food.dairy + food.vegetables;

        let monthly = transport.total + habitat.total + food.total;

        FootprintResult {
            transport,
            habitat,
            food,
            totals: self.totals(monthly),
        }
    }

    /// Monthly/annual totals and equivalences from the unrounded monthly sum.
    /// Equivalences derive from the rounded annual figure.
    pub fn totals(&self, monthly: f64) -> FootprintTotals {
        let annual = round_to(monthly * 12.0, 2);

        FootprintTotals {
            monthly: round_to(monthly, 2),
            annual,
            trees_needed: round_to(annual / self.config.tree_absorption_kg, 1),
            flights_equivalent: round_to(annual / self.config.flight_kg, 1),
            cars_km_equivalent: round_to(annual / self.config.car_kg_per_km, 0),
            vs_global_pct: round_to(
                (annual / self.config.global_annual_avg_kg - 1.0) * 100.0,
                1,
            ),
        }
    }
}
