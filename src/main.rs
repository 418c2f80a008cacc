// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::env;
use std::path::Path;
use std::sync::Arc;

// Use library instead of local modules
use carbon_footprint::{
    count_countries, open_database, seed_database, setup_database, FootprintInput,
    FootprintService, SeedData, ServerConfig, SqliteRepository,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("init") => run_init(&args[2..])?,
        Some("calculate") => run_calculate(&args[2..])?,
        Some("stats") => run_stats()?,
        Some(other) => {
            eprintln!("❌ Unknown command: {}", other);
            eprintln!("   Usage: carbon-footprint [init [SEED_DIR] | calculate CODE key=value... | stats]");
            std::process::exit(2);
        }
        // UI mode (default)
        None => run_ui_mode()?,
    }

    Ok(())
}

fn open_service(config: &ServerConfig) -> Result<FootprintService> {
    let seed = SeedData::embedded()?;
    let conn = open_database(&config.database_path, &seed)?;
    let repository = Arc::new(SqliteRepository::new(conn));

    Ok(FootprintService::new(repository, config.app.clone()))
}

fn run_init(args: &[String]) -> Result<()> {
    println!("🗄️  Reference Data Import - CSV → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = ServerConfig::load()?;

    // 1. Load seed CSVs
    println!("\n📂 Loading seed data...");
    let seed = match args.first() {
        Some(dir) => SeedData::from_dir(Path::new(dir))?,
        None => SeedData::embedded()?,
    };
    println!(
        "✓ Loaded {} countries, {} emission factors, {} energy sources",
        seed.countries.len(),
        seed.emission_factors.len(),
        seed.energy_sources.len()
    );

    // 2. Setup database
    println!("\n🔧 Setting up database...");
    let mut conn = Connection::open(&config.database_path)
        .with_context(|| format!("Failed to open {:?}", config.database_path))?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode: {:?}", config.database_path);

    // 3. Insert rows
    println!("\n💾 Inserting reference data...");
    let report = seed_database(&mut conn, &seed)?;
    println!("✓ Inserted {} new rows", report.total());

    // 4. Verify
    println!("\n🔍 Verifying database...");
    let count = count_countries(&conn)?;
    println!("✓ Database contains {} countries", count);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if report.total() == 0 {
        println!("✅ Already up to date");
    } else {
        println!("🎉 Database ready!");
    }

    Ok(())
}

/// `calculate FR car_km=120 meat_kg=3 ...`
fn run_calculate(args: &[String]) -> Result<()> {
    let Some(code) = args.first() else {
        bail!("Usage: carbon-footprint calculate CODE key=value...");
    };

    let mut input = FootprintInput::new(code, Default::default());
    for arg in &args[1..] {
        let (key, value) = arg
            .split_once('=')
            .with_context(|| format!("Expected key=value, got {:?}", arg))?;
        let value: f64 = value
            .parse()
            .with_context(|| format!("Invalid number for {}: {:?}", key, value))?;
        if !input.set_quantity(key, value) {
            bail!("Unknown quantity: {}", key);
        }
    }

    let config = ServerConfig::load()?;
    let service = open_service(&config)?;
    let country = service.country(code)?;
    let result = service.calculate(&input)?;

    println!("🌍 Carbon footprint - {} ({:.3} kg CO₂/kWh)", country.name, country.co2_intensity);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🚗 Transport: {:>10.2} kg/month", result.transport.total);
    println!("🏠 Housing:   {:>10.2} kg/month", result.habitat.total);
    println!("🍽️  Food:      {:>10.2} kg/month", result.food.total);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Monthly: {:.2} kg CO₂", result.totals.monthly);
    println!("Annual:  {:.2} kg CO₂ ({:+.1}% vs global average)", result.totals.annual, result.totals.vs_global_pct);
    println!(
        "≈ {:.1} trees, {:.1} flights, {:.0} km by car",
        result.totals.trees_needed, result.totals.flights_equivalent, result.totals.cars_km_equivalent
    );

    println!("\n💡 Recommendations");
    for rec in service.recommendations(&result.category_totals()) {
        println!("\n{} [{}] {}", rec.category, rec.priority.as_str(), rec.suggestion);
        for action in &rec.actions {
            println!("   • {}", action);
        }
        println!("   → {}", rec.impact);
    }

    Ok(())
}

fn run_stats() -> Result<()> {
    let config = ServerConfig::load()?;
    let service = open_service(&config)?;
    let stats = service.statistics()?;

    println!("📍 Emissions by region (kg CO₂/kWh)");
    for region in &stats.regions {
        println!(
            "   {:<16} {:>3} countries  avg {:.3}  min {:.3}  max {:.3}",
            region.region, region.country_count, region.avg_intensity, region.min_intensity, region.max_intensity
        );
    }

    println!("\n🏭 Most carbon intensive");
    for country in &stats.most_polluting {
        println!("   {:<24} {:.3}", country.name, country.co2_intensity);
    }

    println!("\n🌱 Cleanest");
    for country in &stats.cleanest {
        println!("   {:<24} {:.3}", country.name, country.co2_intensity);
    }

    println!("\n⚡ Energy sources");
    for source in &stats.energy_sources {
        println!("   {:<14} {:.3}  {}", source.name, source.co2_per_kwh, source.description);
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode() -> Result<()> {
    println!("🖥️  Loading Carbon Footprint browser...\n");

    let config = ServerConfig::load()?;
    let service = open_service(&config)?;

    let mut app = ui::App::new(service)?;
    println!("✓ Loaded {} countries\n", app.countries.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode() -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use web UI: cargo run --bin footprint-server --features server");
    std::process::exit(1);
}
