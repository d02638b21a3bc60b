use carpark_etl::core::ConfigProvider;
use carpark_etl::utils::error::ErrorSeverity;
use carpark_etl::utils::{logger, validation::Validate};
use carpark_etl::{CarparkPipeline, CliConfig, EtlEngine, EtlError, LocalStorage, TomlConfig};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting carpark-etl");

    let outcome = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            match TomlConfig::from_file(path) {
                Ok(config) => {
                    tracing::info!("Pipeline: {}", config.pipeline.name);
                    let monitor = cli.monitor || config.monitoring_enabled();
                    run(config, monitor).await
                }
                Err(e) => Err(e),
            }
        }
        None => run(cli.clone(), cli.monitor).await,
    };

    match outcome {
        Ok(output_path) => {
            tracing::info!("✅ Carpark ETL completed successfully!");
            println!("✅ Carpark ETL completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Carpark ETL failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn run<C>(config: C, monitor: bool) -> Result<String, EtlError>
where
    C: ConfigProvider + Validate + 'static,
{
    config.validate()?;

    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path());
    let pipeline = CarparkPipeline::new(storage, config)?;
    EtlEngine::new_with_monitoring(pipeline, monitor).run().await
}
