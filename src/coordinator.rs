// src/coordinator.rs
use crate::fetcher::PriceSource;
use crate::models::Position;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task;
use tokio::time;

#[derive(Debug, Clone)]
pub struct FanOut {
    /// Upper bound on in-flight fetches, `None` for one task per position.
    pub limit: Option<usize>,
    pub timeout: Duration,
}

impl FanOut {
    /// Prices every position concurrently and returns them in completion
    /// order. Always yields exactly one entry per input.
    pub async fn collect(
        &self,
        source: Arc<dyn PriceSource>,
        positions: Vec<Position>,
    ) -> Vec<Position> {
        let expected = positions.len();
        if expected == 0 {
            return Vec::new();
        }

        let permits = self.limit.map(|n| Arc::new(Semaphore::new(n)));
        let (tx, mut rx) = mpsc::channel(expected);

        for position in positions {
            let tx = tx.clone();
            let source = source.clone();
            let permits = permits.clone();
            let timeout = self.timeout;
            task::spawn(async move {
                let _permit = match &permits {
                    Some(semaphore) => semaphore.acquire().await.ok(),
                    None => None,
                };
                let symbol = position.symbol.clone();
                let priced = match time::timeout(timeout, source.quote(position)).await {
                    Ok(priced) => priced,
                    Err(_) => {
                        warn!("Fetching {} timed out after {:?}", symbol, timeout);
                        Position::default()
                    }
                };
                let _ = tx.send(priced).await;
            });
        }
        drop(tx);

        let mut batch = Vec::with_capacity(expected);
        while batch.len() < expected {
            match rx.recv().await {
                Some(priced) => batch.push(priced),
                // A worker panicked before reporting.
                None => {
                    warn!(
                        "{} of {} fetches never reported",
                        expected - batch.len(),
                        expected
                    );
                    batch.resize(expected, Position::default());
                }
            }
        }
        info!("Collected {} priced positions", batch.len());
        batch
    }
}
