pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::cache::KeyValueCollection;
use crate::core::config::AppConfig;
use crate::providers::{OpenExchangeRatesProvider, RateCache};
use crate::store::{HistoryStore, KeyValueStore, MemoryCollection};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Convert {
        amount: Option<f64>,
        from: Option<String>,
        to: Option<String>,
        days: Option<u32>,
        show_history: bool,
    },
    History,
}

/// Handles opened at start and closed at shutdown.
pub struct AppContext {
    pub config: AppConfig,
    pub rates: RateCache<OpenExchangeRatesProvider>,
    pub history: HistoryStore,
}

impl AppContext {
    pub async fn open(config: AppConfig) -> Result<Self> {
        let data_path = config.default_data_path()?;
        debug!("Using data path {}", data_path.display());

        if config.provider.app_id.trim().is_empty() {
            warn!("No app_id configured; requests to the rates API will be rejected");
        }
        let provider =
            OpenExchangeRatesProvider::new(&config.provider.base_url, &config.provider.app_id)?;

        let cache_collection: Arc<dyn KeyValueCollection> =
            match KeyValueStore::open(&data_path.join("cache")).and_then(|s| s.collection("rates")) {
                Ok(collection) => collection,
                Err(e) => {
                    warn!("{:#}. Rates will not be cached between runs", e);
                    Arc::new(MemoryCollection::new())
                }
            };
        let rates = RateCache::new(provider, cache_collection, config.cache.freshness())
            .serve_stale_on_error(config.cache.serve_stale_on_error);

        let history = HistoryStore::open(&data_path.join("history.db")).await?;

        Ok(Self {
            config,
            rates,
            history,
        })
    }

    pub async fn close(self) {
        self.history.close().await;
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config for {}", config.provider.base_url);

    let context = AppContext::open(config).await?;
    let result = match command {
        AppCommand::Convert {
            amount,
            from,
            to,
            days,
            show_history,
        } => {
            let days = days.unwrap_or(context.config.history_days);
            run_convert(&context, amount, from, to, days, show_history).await
        }
        AppCommand::History => cli::history::run(&context.history).await,
    };
    context.close().await;
    result
}

async fn run_convert(
    context: &AppContext,
    amount: Option<f64>,
    from: Option<String>,
    to: Option<String>,
    days: u32,
    show_history: bool,
) -> Result<()> {
    let request = cli::convert::prompt_request(amount, from, to)?;
    cli::convert::run(&context.rates, &context.history, &request, days, show_history).await?;
    Ok(())
}
