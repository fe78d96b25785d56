// src/main.rs
mod api;
mod config;
mod coordinator;
mod error;
mod fetcher;
mod mailer;
mod models;
mod report;
mod service;
mod source;
mod storage;

use crate::config::Config;
use crate::fetcher::QuoteFetcher;
use crate::mailer::{LogMailer, Mailer, SpoolMailer};
use crate::service::ReportService;
use crate::storage::FsObjectStore;
use env_logger::{Builder, Env};
use log::{error, info};
use reqwest::Client;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };

    let fetcher = match QuoteFetcher::new(Client::new(), &config.quote) {
        Ok(fetcher) => Arc::new(fetcher),
        Err(e) => {
            error!("Failed to build quote fetcher: {}", e);
            return;
        }
    };
    let store = Arc::new(FsObjectStore::new(&config.storage_root));
    let mailer: Arc<dyn Mailer> = match &config.mail.spool_dir {
        Some(dir) => Arc::new(SpoolMailer::new(dir)),
        None => Arc::new(LogMailer),
    };
    info!(
        "Storing objects under {}, source {:?}",
        config.storage_root.display(),
        config.source
    );

    let addr = config.listen_addr;
    let service = Arc::new(ReportService::new(config, fetcher, store, mailer));
    let api = api::routes(service);

    info!("Server running on http://{}", addr);
    warp::serve(api).run(addr).await;
}
