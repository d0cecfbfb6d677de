use anyhow::Context;
use clap::Parser;
use patient_import::config::toml_config::{LogFormat, TomlConfig};
use patient_import::core::{ConfigProvider, Storage};
use patient_import::utils::{logger, validation::Validate};
use patient_import::{
    parse_patients_csv_bytes, ImportEngine, ImportError, LocalStorage, StorageSink,
};

#[derive(Parser)]
#[command(name = "toml-import")]
#[command(about = "Patient CSV import driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "patient-import.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the dry_run setting from config
    #[arg(long)]
    dry_run: Option<bool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    match (config.log_format(), args.verbose) {
        (LogFormat::Json, true) => logger::init_json_logger("debug"),
        (LogFormat::Json, false) => logger::init_json_logger(config.log_level()),
        (LogFormat::Text, verbose) => logger::init_cli_logger(verbose || config.log_level() == "debug"),
    }

    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let target = config.target();
    let options = config.import_options();
    tracing::info!(
        "Importing {} into workspace={} campaign={} (delimiter={:?}, header={}, offset={})",
        config.input_path(),
        target.workspace_id,
        target.campaign_id,
        options.delimiter as char,
        options.skip_header,
        options.utc_offset
    );

    let content = LocalStorage::new(".".to_string())
        .read_file(config.input_path())
        .await
        .with_context(|| format!("reading {}", config.input_path()))?;

    let output = LocalStorage::new(config.output_path().to_string());
    let engine = ImportEngine::new(StorageSink::new(output.clone()));

    if args.dry_run.unwrap_or_else(|| config.is_dry_run()) {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        let result = parse_patients_csv_bytes(&content, &options);
        println!("{}", serde_json::to_string_pretty(&result)?);
        match result.dry_run_exit_code() {
            0 => {}
            code => std::process::exit(code),
        }
        return Ok(());
    }

    let report_path = format!(
        "{}/{}/import_report.json",
        target.workspace_id, target.campaign_id
    );

    match engine.import_bytes(&target, &content, &options).await {
        Ok(summary) => {
            let json = serde_json::to_string_pretty(&summary)?;
            if config.writes_report() {
                output.write_file(&report_path, json.as_bytes()).await?;
                tracing::info!("📝 Report written to {}", report_path);
            }
            println!("{}", json);
            Ok(())
        }
        Err(ImportError::Rejected {
            errors,
            total_rows,
            valid_rows,
            invalid_rows,
        }) => {
            let report = serde_json::json!({
                "message": "No valid patients in the uploaded CSV",
                "errors": errors,
                "totalRows": total_rows,
                "validRows": valid_rows,
                "invalidRows": invalid_rows,
            });
            let json = serde_json::to_string_pretty(&report)?;
            if config.writes_report() {
                output.write_file(&report_path, json.as_bytes()).await?;
            }
            eprintln!("{}", json);
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            Err(e.into())
        }
    }
}
