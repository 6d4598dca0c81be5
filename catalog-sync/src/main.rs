use std::process::ExitCode;

use tracing::{error, info};

use catalog_sync::config::Settings;
use catalog_sync::logging::init_tracing;
use catalog_sync::runner::run_periodic;
use catalog_sync::{Dependencies, SyncError};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(settings.log_format);

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Catalog sync stopped with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> Result<(), SyncError> {
    let deps = Dependencies::new(&settings).await?;
    deps.orchestrator.prepare(&deps.tasks).await?;

    let orchestrator = deps.orchestrator.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                orchestrator.shutdown();
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    run_periodic(&deps.orchestrator, &deps.tasks, settings.interval).await;
    Ok(())
}
