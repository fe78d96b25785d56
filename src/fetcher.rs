// src/fetcher.rs
use crate::config::QuoteConfig;
use crate::error::AppError;
use crate::models::Position;
use async_trait::async_trait;
use log::{debug, warn};
use regex::Regex;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::num::ParseFloatError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("no element matches the quote selector")]
    MissingElement,

    #[error("quote pattern did not match")]
    NoMatch,

    #[error("captured price is not a number: {0}")]
    BadNumber(#[from] ParseFloatError),
}

/// Anything that can put a current price on a position.
///
/// Implementations never fail: a position that cannot be priced comes back
/// as `Position::default()`.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn quote(&self, position: Position) -> Position;
}

pub struct QuoteFetcher {
    client: Client,
    config: QuoteConfig,
    selector: Selector,
}

impl QuoteFetcher {
    pub fn new(client: Client, config: &QuoteConfig) -> Result<Self, AppError> {
        let selector = Selector::parse(&config.selector).map_err(|e| {
            AppError::config(format!("QUOTE_SELECTOR `{}` is invalid: {}", config.selector, e))
        })?;
        Ok(QuoteFetcher {
            client,
            config: config.clone(),
            selector,
        })
    }

    pub async fn fetch_price(&self, symbol: &str) -> Result<f64, FetchError> {
        let url = self.config.url_for(symbol);
        debug!("Fetching quote page {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status()));
        }
        let body = response.text().await?;
        extract_price(&body, &self.selector, &self.config.pattern)
    }
}

/// Pulls the first capture of `pattern` out of the text of every element
/// matching `selector`, with thousands separators removed.
pub fn extract_price(html: &str, selector: &Selector, pattern: &Regex) -> Result<f64, FetchError> {
    let document = Html::parse_document(html);
    let mut matched = false;
    let mut text = String::new();
    for element in document.select(selector) {
        matched = true;
        text.extend(element.text());
    }
    if !matched {
        return Err(FetchError::MissingElement);
    }

    let text = text.replace(',', "");
    let captured = pattern
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .ok_or(FetchError::NoMatch)?;
    Ok(captured.as_str().parse::<f64>()?)
}

#[async_trait]
impl PriceSource for QuoteFetcher {
    async fn quote(&self, position: Position) -> Position {
        match self.fetch_price(&position.symbol).await {
            Ok(value) => Position { value, ..position },
            Err(e) => {
                warn!("Failed to fetch price for {}: {}", position.symbol, e);
                Position::default()
            }
        }
    }
}
