use anyhow::Result;
use tracing_subscriber::EnvFilter;

use outbreak_watch::factcheck::FactChecker;
use outbreak_watch::generator::TextGenerator;
use outbreak_watch::outbreak::OutbreakLog;
use outbreak_watch::summary::SummaryService;
use outbreak_watch::{run_server, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env();
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let generator = TextGenerator::from_config(&config);
    let checker = FactChecker::new(generator.clone());
    let summary = SummaryService::new(generator);
    let outbreak_log = OutbreakLog::new(config.origins_csv(), config.paths_csv());

    run_server(config, checker, summary, outbreak_log).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
