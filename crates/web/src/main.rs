use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use researchbank_web::config::ConfigOverrides;
use researchbank_web::WebConfig;

/// Research Bank catalogue site
#[derive(Parser)]
#[command(name = "researchbank-web")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "RESEARCHBANK_WEB_CONFIG", default_value = "researchbank-web.toml")]
    config: PathBuf,

    /// Listen address
    #[arg(long, env = "RESEARCHBANK_WEB_ADDR")]
    listen: Option<String>,

    /// Path or URL of catalog.json
    #[arg(long, env = "RESEARCHBANK_CATALOG")]
    catalog: Option<String>,

    /// Path prefix the site is served under
    #[arg(long, env = "RESEARCHBANK_URL_PREFIX")]
    url_prefix: Option<String>,

    /// Seconds a fetched catalogue is reused
    #[arg(long, env = "RESEARCHBANK_CACHE_TTL_SECS")]
    cache_ttl_secs: Option<u64>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<WebConfig> {
        WebConfig::resolve(
            &self.config,
            ConfigOverrides {
                listen: self.listen,
                catalog: self.catalog,
                url_prefix: self.url_prefix,
                cache_ttl_secs: self.cache_ttl_secs,
            },
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = Cli::parse().into_config()?;
    info!(
        "Starting Research Bank web on {} (catalogue: {}, cache ttl: {}s)",
        cfg.listen, cfg.catalog, cfg.cache_ttl_secs
    );

    researchbank_web::server::serve(cfg).await
}
