use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use stedkart::api::category::MAX_CATEGORY_LIMIT;
use stedkart::api::{CategoryQuery, CategorySearchClient, MapboxGeocoder};
use stedkart::config::FileConfig;
use stedkart::input::read_address_records;
use stedkart::output::{write_csv, write_geojson};
use stedkart::pipeline::{
    ConversionStats, CoordinateResolver, RowEvent, convert_records, flatten_features,
};

/// Turn store address lists into map data using the Mapbox APIs
///
/// Examples:
///   # Convert the default store list, geocoding rows without coordinates
///   stedkart geojson
///
///   # Convert another file
///   stedkart geojson -i Steder/Nord.csv -o nord.geojson
///
///   # Export up to 25 shopping malls in Norway
///   stedkart category
///
///   # Export supermarkets in Sweden with Swedish labels
///   stedkart category --category supermarket --country SE --language sv -o butiker.csv
///
/// The access token is read from MAPBOX_ACCESS_TOKEN, then from
/// VITE_YOUR_MAPBOX_ACCESS_TOKEN in .env, then prompted for.
#[derive(Parser, Debug)]
#[command(name = "stedkart")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches stedkart.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a semicolon-separated store CSV to a GeoJSON FeatureCollection
    Geojson(GeojsonArgs),
    /// Export category search results (e.g., shopping malls) to CSV
    Category(CategoryArgs),
}

#[derive(clap::Args, Debug)]
struct GeojsonArgs {
    /// Input CSV file (defaults to Steder/StedertstAlle.csv)
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Output GeoJSON file (defaults to steder.geojson)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Country name appended to geocoding queries
    #[arg(long)]
    country: Option<String>,

    /// Country code the geocoder is restricted to
    #[arg(long)]
    country_code: Option<String>,

    /// Pause after each successful geocoding request, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

#[derive(clap::Args, Debug)]
struct CategoryArgs {
    /// Canonical category id
    #[arg(long)]
    category: Option<String>,

    /// Maximum number of results (the API allows at most 25)
    #[arg(short = 'l', long)]
    limit: Option<u32>,

    /// Output CSV file (defaults to mall.csv)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Country filter (ISO 3166 alpha-2)
    #[arg(long)]
    country: Option<String>,

    /// Result language
    #[arg(long)]
    language: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = load_config(args.config.as_deref())?;
    let verbose = args.verbose || file_config.verbose;

    match args.command {
        Command::Geojson(geojson_args) => run_geojson(geojson_args, file_config, verbose),
        Command::Category(category_args) => run_category(category_args, file_config, verbose),
    }
}

fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    if let Some(config_path) = path {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Ok(toml::from_str(&contents).context("Failed to parse config file")?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        Ok(FileConfig::load().unwrap_or_default())
    }
}

fn run_geojson(args: GeojsonArgs, config: FileConfig, verbose: bool) -> Result<()> {
    let total_start = Instant::now();

    let geocoding = config.geocoding;
    let input = args.input.unwrap_or(config.input);
    let output = args.output.unwrap_or(config.output);
    let country_name = args.country.unwrap_or(geocoding.country_name);
    let country_code = args.country_code.unwrap_or(geocoding.country_code);
    let delay_ms = args.delay_ms.unwrap_or(geocoding.delay_ms);

    println!("stedkart - Store CSV to GeoJSON");
    println!("===============================");
    println!();

    if verbose {
        println!("Configuration:");
        println!("  Input: {}", input.display());
        println!("  Output: {}", output.display());
        println!("  Geocoding URL: {}", geocoding.url);
        println!("  Country: {} ({})", country_name, country_code);
        println!("  Request timeout: {}s", geocoding.timeout_secs);
        println!("  Delay after lookup: {}ms", delay_ms);
        println!();
    }

    if !input.exists() {
        bail!("CSV file not found: {}", input.display());
    }

    let token = config.credentials.require_token()?;

    let spinner = create_spinner("Reading CSV...");
    let start = Instant::now();
    let records = read_address_records(&input)?;
    spinner.finish_with_message(format!(
        "Read {} rows from {} [{:.1}s]",
        records.len(),
        input.display(),
        start.elapsed().as_secs_f32()
    ));

    let geocoder = MapboxGeocoder::new(
        &geocoding.url,
        &token,
        &country_code,
        Duration::from_secs(geocoding.timeout_secs),
    )
    .context("Failed to create geocoding client")?;
    let resolver =
        CoordinateResolver::new(geocoder, &country_name, Duration::from_millis(delay_ms));

    let bar = create_progress_bar(records.len() as u64, "Resolving coordinates...");
    let start = Instant::now();
    let (collection, stats) = convert_records(&records, &resolver, |event| {
        bar.set_position(event.row() as u64);
        match event {
            RowEvent::Geocoded {
                row,
                query,
                coordinates,
            } => {
                if verbose {
                    bar.println(format!(
                        "  Geocoded row {}: {} -> ({}, {})",
                        row, query, coordinates.lon, coordinates.lat
                    ));
                }
            }
            RowEvent::NotFound { row, query } => {
                bar.println(format!(
                    "  Warning: no geocoding result for '{}' (row {}), skipping",
                    query, row
                ));
            }
            RowEvent::Failed { row, query, error } => {
                bar.println(format!(
                    "  Warning: geocoding failed for '{}' (row {}): {}, skipping",
                    query, row, error
                ));
            }
            RowEvent::Progress { processed } => {
                if verbose {
                    bar.println(format!("  Processed {} rows...", processed));
                }
            }
        }
    });
    bar.set_position(stats.total_rows as u64);
    bar.finish_with_message(format!(
        "Resolved {} of {} rows ({} geocoded) [{:.1}s]",
        stats.features,
        stats.total_rows,
        stats.geocoded,
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Writing GeoJSON...");
    let start = Instant::now();
    write_geojson(&output, &collection).context("Failed to write GeoJSON file")?;
    spinner.finish_with_message(format!(
        "Wrote {} features [{:.1}s]",
        collection.len(),
        start.elapsed().as_secs_f32()
    ));

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );
    println!();
    print_conversion_summary(&stats, &output);

    Ok(())
}

fn print_conversion_summary(stats: &ConversionStats, output: &Path) {
    println!("Conversion summary");
    println!("==================");
    println!("  Total rows processed:      {}", stats.total_rows);
    println!("  Features with coordinates: {}", stats.features);
    println!("  Rows missing coordinates:  {}", stats.missing_coordinates);
    println!("  Successfully geocoded:     {}", stats.geocoded);
    println!("  Skipped rows:              {}", stats.skipped);
    println!();
    println!("Output: {}", output.display());
}

fn run_category(args: CategoryArgs, config: FileConfig, verbose: bool) -> Result<()> {
    let total_start = Instant::now();

    let category = config.category;
    let query = CategoryQuery {
        category: args.category.unwrap_or(category.category),
        country: args.country.unwrap_or(category.country),
        language: args.language.unwrap_or(category.language),
        limit: args.limit.unwrap_or(category.limit),
    };
    let output = args.output.unwrap_or(category.output);

    println!("stedkart - Category Search Export");
    println!("=================================");
    println!();

    if verbose {
        println!("Configuration:");
        println!("  Search URL: {}", category.url);
        println!("  Category: {}", query.category);
        println!("  Country: {}", query.country);
        println!("  Language: {}", query.language);
        println!("  Limit: {}", query.effective_limit());
        println!("  Output: {}", output.display());
        println!();
    }

    if query.limit > MAX_CATEGORY_LIMIT {
        eprintln!(
            "Warning: limit {} exceeds the API maximum, using {}",
            query.limit, MAX_CATEGORY_LIMIT
        );
    }

    let token = config.credentials.require_token()?;
    let client = CategorySearchClient::new(&category.url, &token)?;

    let spinner = create_spinner(&format!(
        "Searching '{}' in {}...",
        query.category, query.country
    ));
    let start = Instant::now();
    let features = client
        .search(&query)
        .context("Failed to fetch category search results")?;
    spinner.finish_with_message(format!(
        "Fetched {} results [{:.1}s]",
        features.len(),
        start.elapsed().as_secs_f32()
    ));

    let records = flatten_features(&features);
    let written = write_csv(&output, &records)?;

    println!();
    if written == 0 {
        println!("No data to save");
        return Ok(());
    }

    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );
    println!();
    println!("Saved {} results to {}", written, output.display());
    if let Some(first) = records.first() {
        println!("Fields per result: {}", first.len());
    }

    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
