// src/service.rs
use crate::config::Config;
use crate::coordinator::FanOut;
use crate::error::AppError;
use crate::fetcher::PriceSource;
use crate::mailer::{Mail, Mailer};
use crate::models::Batch;
use crate::report;
use crate::source::load_positions;
use crate::storage::ObjectStore;
use chrono::{DateTime, Datelike, Local};
use log::{error, info};
use serde::ser::Error as _;
use std::sync::Arc;

/// One report run: load positions, price them, store the snapshot, mail the
/// table.
pub struct ReportService {
    config: Config,
    fan_out: FanOut,
    prices: Arc<dyn PriceSource>,
    store: Arc<dyn ObjectStore>,
    mailer: Arc<dyn Mailer>,
}

impl ReportService {
    pub fn new(
        config: Config,
        prices: Arc<dyn PriceSource>,
        store: Arc<dyn ObjectStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let fan_out = FanOut {
            limit: config.max_concurrent_fetches,
            timeout: config.quote.timeout,
        };
        ReportService {
            config,
            fan_out,
            prices,
            store,
            mailer,
        }
    }

    pub fn authorize(&self, api_key: Option<&str>) -> Result<(), AppError> {
        match api_key {
            Some(key) if key == self.config.api_key => Ok(()),
            _ => Err(AppError::Auth),
        }
    }

    /// Returns the JSON snapshot that was written.
    pub async fn run(&self, now: DateTime<Local>) -> Result<String, AppError> {
        let positions =
            load_positions(&self.config.source, self.store.as_ref(), &self.config.bucket).await?;
        let positions = self.fan_out.collect(self.prices.clone(), positions).await;

        let batch = Batch {
            created_at: now.format("%Y-%m-%d").to_string(),
            positions,
        };
        if let Some(p) = batch
            .positions
            .iter()
            .find(|p| !p.bid.is_finite() || !p.value.is_finite())
        {
            return Err(AppError::Serialization(serde_json::Error::custom(format!(
                "non-finite price for {}",
                p.symbol
            ))));
        }
        let json = serde_json::to_string(&batch)?;

        let key = self.config.report_key(now.year(), now.month());
        self.store
            .put(&self.config.bucket, &key, json.clone().into_bytes())
            .await
            .map_err(AppError::StorageWrite)?;
        info!(
            "Snapshot written to {}/{}, profit/loss {:.2}",
            self.config.bucket,
            key,
            report::total_profit(&batch)
        );

        let mail = Mail {
            to: self.config.mail.to.clone(),
            from: self.config.mail.from.clone(),
            subject: self.config.mail.subject.clone(),
            body: report::render(&batch),
        };
        if let Err(e) = self.mailer.send(&mail).await {
            error!("Failed to send report mail: {}", e);
        }

        Ok(json)
    }
}
