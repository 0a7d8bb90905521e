use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use kmpdc_seeder::config::Config;
use kmpdc_seeder::importer::{ImportSummary, Importer};
use kmpdc_seeder::logging;
use kmpdc_seeder::pipeline::export::{read_extract, write_extract, ExtractBundle};
use kmpdc_seeder::pipeline::ingestion::{
    timestamped_csv_path, write_rows_csv, CsvRowSource, RegisterCrawler, RowSource,
};
use kmpdc_seeder::storage::{InMemoryStorage, Storage};
use kmpdc_seeder::{DegreeStandardizer, NormalizationOutput, QualificationParser, RecordPipeline};

#[derive(Parser)]
#[command(name = "kmpdc_seeder")]
#[command(about = "KMPDC practitioners register scraper and normalizer")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the register and stream it into a timestamped CSV file
    Sync,
    /// Normalize degrees, institutions, specialities and addresses from a scraped CSV
    Extract {
        /// CSV file to read (defaults to the newest file in the CSV storage path)
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Print a summary instead of writing extract files
        #[arg(long)]
        summary: bool,
        /// Directory for the extract files
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Import extract files into storage
    Import {
        /// Directory holding the extract files
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Run sync, extract and import sequentially
    Run,
}

fn build_pipeline(config: &Config) -> Result<RecordPipeline> {
    let degrees = match &config.extract.degree_synonyms {
        Some(path) => DegreeStandardizer::from_path(path)?,
        None => DegreeStandardizer::bundled()?,
    };
    Ok(RecordPipeline::new(QualificationParser::new(degrees)))
}

async fn sync(config: &Config) -> Result<PathBuf> {
    println!("🌐 Fetching data from: {}", config.source.url);
    let crawler = RegisterCrawler::new(config.source.clone())?;
    let rows = crawler.fetch_rows().await?;

    let csv_path = timestamped_csv_path(
        &config.source.csv_storage_path,
        &config.source.csv_filename,
        chrono::Local::now(),
    );
    write_rows_csv(&csv_path, &rows)?;
    println!("🎉 Done! Total rows written: {}", rows.len());
    println!("📄 CSV saved to: {}", csv_path.display());
    Ok(csv_path)
}

fn extract(config: &Config, csv: Option<PathBuf>) -> Result<NormalizationOutput> {
    let source = match csv {
        Some(path) => CsvRowSource::new(path),
        None => CsvRowSource::latest_in(&config.source.csv_storage_path)?,
    };
    println!("📂 Reading data from: {}", source.path().display());

    let rows = source
        .rows()
        .with_context(|| format!("Failed to open or read CSV {}", source.path().display()))?;

    println!("🔍 Extracting normalized entities...");
    let pipeline = build_pipeline(config)?;
    let output = pipeline.normalize(rows);
    println!(
        "✅ Extraction complete. Processed {} practitioners.",
        output.stats.rows
    );
    Ok(output)
}

fn print_extract_summary(output: &NormalizationOutput) {
    let sets = &output.reference_sets;
    let sub_count: usize = sets.sub_specialities.values().map(Vec::len).sum();
    println!("\n📊 {:<28} {:>12}", "Entity", "Unique Count");
    for (entity, count) in [
        ("Practitioners", output.practitioners.len()),
        ("Degrees", sets.degrees.len()),
        ("Institutions", sets.institutions.len()),
        ("Specialities", sets.specialities.len()),
        ("Sub-specialities", sub_count),
        ("Addresses", sets.addresses.len()),
        ("Statuses", sets.statuses.len()),
        ("Qualifications", output.stats.qualifications),
        ("Discarded fragments", output.stats.discarded_fragments),
    ] {
        println!("   {:<28} {:>12}", entity, count);
    }
}

async fn import(bundle: &ExtractBundle) -> Result<ImportSummary> {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    let importer = Importer::new(storage);
    let summary = importer.import(bundle).await?;

    println!("✅ Imported {} practitioners successfully.", summary.practitioners);
    println!("   Qualification links: {}", summary.qualification_links);
    println!("   Skipped (no registration number): {}", summary.skipped_practitioners);
    println!("   Unresolved references (UNKNOWN): {}", summary.unknown_fallbacks);
    Ok(summary)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    match cli.command {
        Commands::Sync => {
            sync(&config).await?;
        }
        Commands::Extract {
            csv,
            summary,
            output,
        } => {
            let result = extract(&config, csv)?;
            if summary {
                print_extract_summary(&result);
            } else {
                let dir = output.unwrap_or_else(|| config.extract.output_dir.clone());
                write_extract(&dir, &ExtractBundle::from(result))?;
                println!("✅ Data extracted successfully to: {}", dir.display());
            }
        }
        Commands::Import { input } => {
            let dir = input.unwrap_or_else(|| config.extract.output_dir.clone());
            println!("📂 Importing data from {}", dir.display());
            let bundle = read_extract(&dir)?;
            import(&bundle).await?;
        }
        Commands::Run => {
            println!("🚀 Running full pipeline (sync + extract + import)...");

            println!("\n📥 Step 1: Syncing register...");
            let csv_path = sync(&config).await?;

            println!("\n🔍 Step 2: Extracting...");
            let output = extract(&config, Some(csv_path))?;
            let bundle = ExtractBundle::from(output);
            write_extract(&config.extract.output_dir, &bundle)?;

            println!("\n🧱 Step 3: Importing...");
            match import(&bundle).await {
                Ok(_) => {
                    info!("Full pipeline finished");
                    println!("✅ Full pipeline completed successfully!");
                }
                Err(e) => {
                    error!("Import failed: {}", e);
                    println!("❌ Import failed: {}", e);
                }
            }
        }
    }
    Ok(())
}
