use anyhow::Context;
use clap::Parser;
use news_digest::{
    AppConfig, Cli, Collector, DigestFormatter, DigestPipeline, Fetcher, Ledger, Publisher,
    TelegramTransport,
};
use std::time::Instant;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env file is fine; real deployments set the variables directly
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli).context("Invalid configuration")?;

    let started = Instant::now();
    info!("Bot run started");

    let ledger = Ledger::open(&config.ledger_path).await.with_context(|| {
        format!(
            "Failed to open ledger at {}",
            config.ledger_path.display()
        )
    })?;

    let pipeline = build_pipeline(&config)?;
    let result = pipeline.run(&ledger).await;
    ledger.close().await;

    match result {
        Ok(report) => {
            info!(
                "Bot run finished in {:.2}s ({} item(s) delivered)",
                started.elapsed().as_secs_f64(),
                report.committed
            );
            Ok(())
        }
        Err(e) => {
            error!("Bot run failed after {:.2}s", started.elapsed().as_secs_f64());
            Err(e).context("Digest run failed")
        }
    }
}

fn build_pipeline(config: &AppConfig) -> anyhow::Result<DigestPipeline> {
    let fetcher = Fetcher::new(config.fetch.clone()).context("Failed to create HTTP client")?;
    let collector = Collector::from_configs(fetcher, &config.sources)
        .with_adapter_timeout(config.adapter_timeout);

    let transport =
        TelegramTransport::new(config.bot_token.clone()).with_api_base(config.telegram_api_base.clone());
    let publisher = Publisher::new(Box::new(transport), config.publish.clone());

    let pipeline = DigestPipeline::new(
        collector,
        config.keywords.clone(),
        config.scoring,
        DigestFormatter::new(config.digest.clone()),
        publisher,
    )
    .with_send_empty(config.send_empty)
    .with_dry_run(config.dry_run);

    Ok(pipeline)
}
