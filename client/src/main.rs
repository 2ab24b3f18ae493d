//! Plymeasure CLI - measure PLY point clouds through Appwrite
//!
//! # Commands
//!
//! ```bash
//! plymeasure health                        # Probe the Appwrite project
//! plymeasure methods                       # List processing methods
//! plymeasure submit scan.ply --method obb  # Upload, process, print dimensions
//! plymeasure history --limit 5             # Latest result records
//! plymeasure delete <RECORD_ID> <FILE_ID>  # Remove a result and its file
//! ```
//!
//! Configuration comes from the environment (or `.env`), see
//! [`plymeasure::config`]; `--endpoint`, `--project` and `--api-key`
//! override it.

use clap::{Parser, Subcommand};
use plymeasure::{
    pick_file, AppwriteClient, AppwriteConfig, ClientError, Connectivity, PathPicker, PollPolicy,
    ProcessingMethod, ProcessingResult, ProcessingService, ResultRecord, Session,
    DEFAULT_HISTORY_LIMIT,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type Service = ProcessingService<AppwriteClient, AppwriteClient, AppwriteClient, plymeasure::TokioSleeper>;

#[derive(Parser)]
#[command(name = "plymeasure")]
#[command(about = "Measure PLY point clouds with AABB, OBB or PCA bounding boxes", long_about = None)]
struct Cli {
    /// Appwrite API endpoint (overrides APPWRITE_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Appwrite project id (overrides APPWRITE_PROJECT_ID)
    #[arg(long, global = true)]
    project: Option<String>,

    /// Appwrite API key (overrides APPWRITE_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the Appwrite project is reachable
    Health,

    /// Show available processing methods
    Methods,

    /// Upload a PLY file and wait for its dimensions
    Submit {
        /// Input PLY file
        input: PathBuf,

        /// Bounding-box method
        #[arg(short, long, value_enum, default_value_t = ProcessingMethod::Aabb)]
        method: ProcessingMethod,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List previous results, newest first
    History {
        /// Maximum number of records
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,

        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a result record and its uploaded file
    Delete {
        /// Result record id
        record_id: String,
        /// Uploaded file id
        file_id: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match build_service(&cli) {
        Ok(service) => match cli.command {
            Commands::Health => cmd_health(&service).await,
            Commands::Methods => cmd_methods(&service),
            Commands::Submit { input, method, json } => cmd_submit(&service, &input, method, json).await,
            Commands::History { limit, json } => cmd_history(&service, limit, json).await,
            Commands::Delete { record_id, file_id } => cmd_delete(&service, &record_id, &file_id).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_service(cli: &Cli) -> Result<Service, Box<dyn std::error::Error>> {
    let mut config = AppwriteConfig::from_env();
    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint);
    }
    if let Some(project) = &cli.project {
        config = config.with_project(project);
    }
    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key);
    }
    let poll = PollPolicy::from_env().map_err(ClientError::from)?;

    tracing::debug!(?config, ?poll, "Configuration loaded");
    Ok(ProcessingService::appwrite(AppwriteClient::new(config), poll))
}

async fn cmd_health(service: &Service) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔌 Checking connection...");

    let mut session = Session::new();
    session.begin_health_check();
    session.finish_health_check(service.check_health().await);

    println!("Server: {}", session.connectivity().label());
    if let Some(message) = session.connectivity_error() {
        return Err(message.into());
    }
    Ok(())
}

fn cmd_methods(service: &Service) -> Result<(), Box<dyn std::error::Error>> {
    for method in service.methods() {
        println!("  {:<5} {}", method.value, method.label);
    }
    Ok(())
}

async fn cmd_submit(
    service: &Service,
    input: &Path,
    method: ProcessingMethod,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new();

    // Validation happens before any network call.
    session.apply_pick(pick_file(&PathPicker::new(input)).await)?;
    session.select_method(method);

    if let Some(file) = session.file() {
        eprintln!("📄 File: {} ({})", file.name, file.size_label());
    }
    eprintln!("📐 Method: {} - {}", method, method.label());

    session.begin_health_check();
    session.finish_health_check(service.check_health().await);
    if session.connectivity() != Connectivity::Connected {
        let message = session.connectivity_error().unwrap_or("Disconnected").to_string();
        return Err(message.into());
    }

    let submission = session.begin_submission()?;
    let outcome = service
        .submit_for_processing(&submission.file, submission.method, |progress| {
            session.record_progress(progress);
            eprintln!("   {}", progress);
        })
        .await;
    session.finish_submission(outcome);

    if let Some(message) = session.error() {
        return Err(message.into());
    }
    if let Some(result) = session.result() {
        if json {
            println!("{}", serde_json::to_string_pretty(result)?);
        } else {
            print_result(result);
        }
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn print_result(result: &ProcessingResult) {
    println!("\n📊 Results");
    println!("   File:   {}", result.filename);
    println!("   Method: {}", result.method);
    println!("   Dimensions");
    for (label, value) in result.dimensions.format_units() {
        println!("     {:<7} {}", format!("{}:", label), value);
    }
    println!("   Result id: {}", result.result_id);
    println!("   File id:   {}", result.file_id);
}

async fn cmd_history(service: &Service, limit: u32, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let records = service.list_results(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        eprintln!("📋 No results yet.");
        eprintln!("   Use 'plymeasure submit <file>' to process one.");
        return Ok(());
    }

    eprintln!("📋 Latest results ({}):\n", records.len());
    for record in &records {
        print_record(record);
    }
    Ok(())
}

fn print_record(record: &ResultRecord) {
    let created = record
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    println!("  📄 {} ({}, {})", record.filename, record.method, record.status);
    println!("     Created: {}", created);
    if record.status == plymeasure::RecordStatus::Completed {
        let dims = record.dimensions();
        println!(
            "     W × L × H: {:.3} × {:.3} × {:.3}",
            dims.width, dims.length, dims.height
        );
    }
    if let Some(error) = &record.error {
        println!("     Error: {}", error);
    }
    println!("     Record: {}  File: {}", record.id, record.file_id);
    println!();
}

async fn cmd_delete(service: &Service, record_id: &str, file_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    service.delete_result(record_id, file_id).await?;
    eprintln!("🗑️  Result deleted: {}", record_id);
    Ok(())
}
