use certificados::app::pipelines::read_input;
use certificados::config::cli::{Cli, Command};
use certificados::core::preview::preview;
use certificados::core::{Pipeline, RunReport};
use certificados::utils::error::{CertificateError, ErrorSeverity};
use certificados::utils::{logger, validation::Validate};
use certificados::{
    CertificateConfig, CertificateEngine, CustomTextPipeline, LocalStorage, PresencePipeline,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            CertificateConfig::from_file(path).unwrap_or_else(|e| fail(&e))
        }
        None => CertificateConfig::default(),
    };
    cli.apply_overrides(&mut config);
    if cli.verbose {
        tracing::debug!("Effective config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".".to_string());
    let result = match &cli.command {
        Command::Presence(_) => {
            run(PresencePipeline::new(storage, config), monitor_enabled).await
        }
        Command::Custom(_) => {
            run(CustomTextPipeline::new(storage, config), monitor_enabled).await
        }
        Command::Preview(args) => {
            let table = read_input(&storage, &config).await.unwrap_or_else(|e| fail(&e));
            println!("{}", serde_json::to_string_pretty(&preview(&table, args.rows))?);
            return Ok(());
        }
    };

    match result {
        Ok(report) => {
            tracing::info!("✅ Certificates generated successfully!");
            println!("✅ {} certificates generated", report.certificates);
            println!("📁 Output saved to: {}", report.output_path);
            println!(
                "⏱️  Total hours: {} (mean {:.1} per certificate)",
                report.total_hours, report.mean_hours
            );
            for skipped in &report.skipped {
                println!("⚠️  Skipped {}: {}", skipped.participant, skipped.message);
            }
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

async fn run<P: Pipeline>(pipeline: P, monitor_enabled: bool) -> certificados::Result<RunReport> {
    CertificateEngine::new_with_monitoring(pipeline, monitor_enabled)
        .run()
        .await
}

fn fail(e: &CertificateError) -> ! {
    tracing::error!(
        "❌ Certificate batch failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
