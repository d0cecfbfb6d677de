use clap::Parser;
use patient_import::core::{ConfigProvider, Storage};
use patient_import::utils::error::{ErrorSeverity, ImportError};
use patient_import::utils::{logger, validation::Validate};
use patient_import::{
    parse_patients_csv_bytes, CliConfig, ImportEngine, LocalStorage, StorageSink,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting patient-import CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let options = config.import_options();
    let content = match LocalStorage::new(".".to_string()).read_file(&config.input).await {
        Ok(content) => content,
        Err(e) => {
            eprintln!("❌ Could not read '{}': {}", config.input, e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Read {} bytes from {}", content.len(), config.input);

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        let result = parse_patients_csv_bytes(&content, &options);
        println!("{}", serde_json::to_string_pretty(&result)?);
        match result.dry_run_exit_code() {
            0 => {}
            code => std::process::exit(code),
        }
        return Ok(());
    }

    let sink = StorageSink::new(LocalStorage::new(config.output_path().to_string()));
    let engine = ImportEngine::new(sink);

    match engine
        .import_bytes(&config.target(), &content, &options)
        .await
    {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if summary.errors.is_empty() {
                println!("✅ Imported {} patients", summary.patients_created);
            } else {
                println!(
                    "⚠️  Imported {} patients, {} rows skipped",
                    summary.patients_created, summary.invalid_rows
                );
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            if let ImportError::Rejected { errors, .. } = &e {
                for error in errors {
                    eprintln!("  - {}", error);
                }
            }
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
