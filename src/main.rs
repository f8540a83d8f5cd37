use agri_diagnosis::{
    logging::init_logging, AppConfig, AppContext, CropImage, DiagnosisRecord, FilterCriteria,
    HistoryStore, HistorySummary, RecordFilterEngine, RecordSeverity, SimulatedInference,
    SqliteHistoryStore, WorkflowState, export_csv, load_csv,
};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "agri-diagnosis", version, about = "Crop disease diagnosis and history")]
struct Cli {
    /// JSON config file
    #[arg(long, env = "AGRI_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Interface language (en, es, hi, sw)
    #[arg(long, env = "AGRI_LOCALE", global = true)]
    locale: Option<String>,

    /// History database path
    #[arg(long, env = "AGRI_DB", global = true)]
    db: Option<PathBuf>,

    #[arg(long, env = "AGRI_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import diagnosis records from CSV into the history database
    Import { csv: PathBuf },

    /// Export the history database to CSV
    Export { csv: PathBuf },

    /// List history, optionally filtered
    History {
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        crop: Option<String>,

        /// Healthy, Low, Medium, High or Critical
        #[arg(long)]
        severity: Option<String>,
    },

    /// Show the navigation visible to a user
    Nav {
        #[arg(long)]
        email: Option<String>,

        #[arg(long, default_value = "")]
        password: String,
    },

    /// Translate a key in the active locale
    Translate { key: String },

    /// Run the simulated analysis on an image
    Diagnose {
        image: PathBuf,

        #[arg(long, default_value = "Unknown")]
        crop: String,

        #[arg(long, default_value = "Unknown")]
        location: String,

        /// Store the outcome in the history database
        #[arg(long)]
        save: bool,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.log_level);

    let mut ctx = AppContext::new(config)?;
    if let Some(code) = &cli.locale {
        ctx.set_locale_code(code)?;
    }

    match cli.command {
        Command::Import { csv } => run_import(&ctx, csv)?,
        Command::Export { csv } => run_export(&ctx, csv)?,
        Command::History { search, crop, severity } => run_history(&ctx, search, crop, severity)?,
        Command::Nav { email, password } => run_nav(&mut ctx, email, &password)?,
        Command::Translate { key } => println!("{}", ctx.translate(&key)),
        Command::Diagnose { image, crop, location, save } => {
            run_diagnose(&ctx, image, crop, location, save).await?
        }
    }

    Ok(())
}

fn run_import(ctx: &AppContext, csv: PathBuf) -> Result<()> {
    println!("📂 Loading CSV...");
    let records = load_csv(&csv)?;
    println!("✓ Loaded {} records from CSV", records.len());

    let store = SqliteHistoryStore::open(&ctx.config().database_path)?;
    let inserted = store.insert(&records)?;
    let count = store.count()?;

    println!("✓ Inserted {} new records", inserted);
    println!("✓ Duplicates skipped: {}", records.len() - inserted);
    println!("✓ Database contains {} records", count);
    Ok(())
}

fn run_export(ctx: &AppContext, csv: PathBuf) -> Result<()> {
    let store = SqliteHistoryStore::open(&ctx.config().database_path)?;
    let written = export_csv(&csv, &store.list_records()?)?;
    println!("✓ Exported {} records to {}", written, csv.display());
    Ok(())
}

fn run_history(
    ctx: &AppContext,
    search: Option<String>,
    crop: Option<String>,
    severity: Option<String>,
) -> Result<()> {
    let severity = severity
        .map(|s| s.parse::<RecordSeverity>())
        .transpose()?;

    let criteria = FilterCriteria::new()
        .with_search(search.unwrap_or_default())
        .with_crop(crop.unwrap_or_default())
        .with_severity(severity);

    let store = SqliteHistoryStore::open(&ctx.config().database_path)?;
    let records = store.list_records()?;
    let engine = RecordFilterEngine::new(criteria);
    let matched = engine.filter_refs(&records);

    println!("📊 {} ({}/{})", ctx.translate("history"), matched.len(), records.len());
    for record in &matched {
        println!(
            "  {}  {:<10} {:<14} {:<9} {:>3}%  {}",
            record.date,
            record.crop,
            record.disease,
            record.severity,
            record.confidence,
            record.location
        );
    }

    let owned: Vec<DiagnosisRecord> = matched.into_iter().cloned().collect();
    let summary = HistorySummary::from_records(&owned);
    println!(
        "\n✓ {} healthy, {} diseased, average {} {:.1}%",
        summary.healthy,
        summary.diseased(),
        ctx.translate("confidence").to_lowercase(),
        summary.average_confidence
    );
    Ok(())
}

fn run_nav(ctx: &mut AppContext, email: Option<String>, password: &str) -> Result<()> {
    if let Some(email) = email {
        let user = ctx.login(&email, password)?;
        info!(user = %user.email, "signed in for navigation preview");
    }

    println!("👤 {}", ctx.display_name());
    for group in ctx.navigation() {
        println!("\n{}", group.heading);
        for entry in group.entries {
            println!("  {:<20} {}", entry.path, entry.label);
        }
    }
    Ok(())
}

async fn run_diagnose(
    ctx: &AppContext,
    image: PathBuf,
    crop: String,
    location: String,
    save: bool,
) -> Result<()> {
    let backend = Arc::new(SimulatedInference::new(ctx.config().simulated_delay()));
    let mut workflow = ctx.new_workflow(backend);

    workflow.select_image(CropImage::from_file(&image)?)?;
    workflow.analyze()?;
    println!("🔬 {}", ctx.translate("analyzing"));

    let result = match workflow.wait_for_outcome().await {
        WorkflowState::Complete(result) => result.clone(),
        WorkflowState::Failed(error) => bail!("{}: {}", ctx.translate("error"), error),
        other => bail!("analysis ended in unexpected state: {}", other.name()),
    };

    println!("✓ {}", ctx.translate("analysis_complete"));
    println!("\n{}: {}", ctx.translate(result.headline_key()), result.disease_label());
    println!("  {}: {}%", ctx.translate("confidence"), result.confidence());
    println!(
        "  {}: {}",
        ctx.translate("severity"),
        ctx.translate(result.severity().translation_key())
    );
    println!("  {}: {}", ctx.translate("affected_area"), result.affected_area());
    println!("\n{}:", ctx.translate("recommendations"));
    for recommendation in result.recommendations() {
        println!("  • {}", recommendation);
    }

    if save {
        let record = DiagnosisRecord::from_result(
            &result,
            crop,
            location,
            chrono::Local::now().date_naive(),
        );
        let store = SqliteHistoryStore::open(&ctx.config().database_path)?;
        store.insert(std::slice::from_ref(&record))?;
        println!("\n✓ {} ({})", ctx.translate("success"), record.id);
    }

    Ok(())
}
