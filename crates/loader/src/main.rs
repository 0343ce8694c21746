use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use revingest_loader::config::LoaderConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revingest_loader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match LoaderConfig::from_env_and_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid loader configuration");
            return ExitCode::FAILURE;
        }
    };

    match revingest_loader::run(&config).await {
        Ok(report) => {
            // Total elapsed seconds on stdout, for scripts timing the load.
            println!("{}", report.elapsed.as_secs_f64());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Load aborted");
            ExitCode::FAILURE
        }
    }
}
