// src/config.rs
use crate::error::AppError;
use regex::Regex;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_QUOTE_URL: &str = "https://finance.yahoo.com/quote/{symbol}";
const DEFAULT_QUOTE_SELECTOR: &str = "div#quote-header-info";
const DEFAULT_QUOTE_PATTERN: &str = r"trend2W10W9M(\d+.\d+)";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3030";
const DEFAULT_STORAGE_ROOT: &str = "./data";

#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    Static,
    Storage { key: String },
}

/// Where and how a quote page is scraped.
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    pub url_template: String,
    pub selector: String,
    pub pattern: Regex,
    pub timeout: Duration,
}

impl QuoteConfig {
    pub fn url_for(&self, symbol: &str) -> String {
        self.url_template.replace("{symbol}", symbol)
    }
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub spool_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub bucket: String,
    pub source: SourceKind,
    pub report_key_template: String,
    pub quote: QuoteConfig,
    /// `None` spawns one fetch per symbol.
    pub max_concurrent_fetches: Option<usize>,
    pub mail: MailConfig,
    pub storage_root: PathBuf,
    pub listen_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::config(format!("{} is not set", name)))
        };
        let or_default = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let source = match or_default("SYMBOL_SOURCE", "storage").as_str() {
            "static" => SourceKind::Static,
            "storage" => SourceKind::Storage {
                key: required("S3_STOCK_DATA")?,
            },
            other => {
                return Err(AppError::config(format!(
                    "SYMBOL_SOURCE must be `static` or `storage`, got `{}`",
                    other
                )))
            }
        };

        let url_template = or_default("QUOTE_URL_TEMPLATE", DEFAULT_QUOTE_URL);
        if !url_template.contains("{symbol}") {
            return Err(AppError::config("QUOTE_URL_TEMPLATE needs a {symbol} placeholder"));
        }

        let pattern_src = or_default("QUOTE_PATTERN", DEFAULT_QUOTE_PATTERN);
        let pattern = Regex::new(&pattern_src)
            .map_err(|e| AppError::config(format!("QUOTE_PATTERN is invalid: {}", e)))?;
        if pattern.captures_len() < 2 {
            return Err(AppError::config("QUOTE_PATTERN needs a capture group"));
        }

        let timeout_secs = parse_number::<u64>(
            "FETCH_TIMEOUT_SECS",
            &or_default("FETCH_TIMEOUT_SECS", &DEFAULT_FETCH_TIMEOUT_SECS.to_string()),
        )?;
        if timeout_secs == 0 {
            return Err(AppError::config("FETCH_TIMEOUT_SECS must be at least 1"));
        }
        let max_concurrent_fetches = match lookup("MAX_CONCURRENT_FETCHES") {
            Some(raw) if !raw.is_empty() => {
                Some(parse_number::<usize>("MAX_CONCURRENT_FETCHES", &raw)?).filter(|n| *n > 0)
            }
            _ => None,
        };

        let listen_addr = or_default("LISTEN_ADDR", DEFAULT_LISTEN_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e| AppError::config(format!("LISTEN_ADDR is invalid: {}", e)))?;

        Ok(Config {
            api_key: required("STOCK_API_KEY")?,
            bucket: required("BUCKET")?,
            source,
            report_key_template: required("S3_FILE_PATH")?,
            quote: QuoteConfig {
                url_template,
                selector: or_default("QUOTE_SELECTOR", DEFAULT_QUOTE_SELECTOR),
                pattern,
                timeout: Duration::from_secs(timeout_secs),
            },
            max_concurrent_fetches,
            mail: MailConfig {
                to: required("MAIL_TO_ADDRESS")?,
                from: required("MAIL_SENDER_ADDRESS")?,
                subject: required("MAIL_SUBJECT")?,
                spool_dir: lookup("MAIL_SPOOL_DIR")
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from),
            },
            storage_root: PathBuf::from(or_default("STORAGE_ROOT", DEFAULT_STORAGE_ROOT)),
            listen_addr,
        })
    }

    /// Snapshot key for a run in the given year and month.
    pub fn report_key(&self, year: i32, month: u32) -> String {
        self.report_key_template
            .replace("{year}", &year.to_string())
            .replace("{month}", &month.to_string())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| AppError::config(format!("{} is invalid: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("STOCK_API_KEY", "secret"),
            ("BUCKET", "stocks"),
            ("S3_STOCK_DATA", "list.csv"),
            ("S3_FILE_PATH", "reports/{year}/{month}/result.json"),
            ("MAIL_TO_ADDRESS", "me@example.com"),
            ("MAIL_SENDER_ADDRESS", "bot@example.com"),
            ("MAIL_SUBJECT", "Daily stock report"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config, AppError> {
        Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_are_applied() {
        let config = load(&base_env()).unwrap();
        assert_eq!(
            config.source,
            SourceKind::Storage {
                key: "list.csv".to_string()
            }
        );
        assert_eq!(config.quote.selector, "div#quote-header-info");
        assert_eq!(config.quote.timeout, Duration::from_secs(10));
        assert_eq!(config.max_concurrent_fetches, None);
        assert_eq!(config.listen_addr.port(), 3030);
        assert!(config.mail.spool_dir.is_none());
        assert_eq!(
            config.quote.url_for("MSFT"),
            "https://finance.yahoo.com/quote/MSFT"
        );
    }

    #[test]
    fn report_key_uses_unpadded_month() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.report_key(2024, 3), "reports/2024/3/result.json");
    }

    #[test]
    fn missing_secret_is_a_config_error() {
        let mut vars = base_env();
        vars.remove("STOCK_API_KEY");
        assert!(matches!(load(&vars), Err(AppError::Config(_))));
    }

    #[test]
    fn static_source_does_not_need_list_key() {
        let mut vars = base_env();
        vars.remove("S3_STOCK_DATA");
        vars.insert("SYMBOL_SOURCE", "static");
        assert_eq!(load(&vars).unwrap().source, SourceKind::Static);
    }

    #[test]
    fn pattern_without_group_is_rejected() {
        let mut vars = base_env();
        vars.insert("QUOTE_PATTERN", r"\d+");
        assert!(matches!(load(&vars), Err(AppError::Config(_))));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut vars = base_env();
        vars.insert("FETCH_TIMEOUT_SECS", "0");
        assert!(matches!(load(&vars), Err(AppError::Config(_))));
        vars.insert("FETCH_TIMEOUT_SECS", "3");
        assert_eq!(load(&vars).unwrap().quote.timeout, Duration::from_secs(3));
    }

    #[test]
    fn url_template_without_symbol_is_rejected() {
        let mut vars = base_env();
        vars.insert("QUOTE_URL_TEMPLATE", "https://quotes.example.com/today");
        assert!(matches!(load(&vars), Err(AppError::Config(_))));
        vars.insert("QUOTE_URL_TEMPLATE", "https://quotes.example.com/q?s={symbol}");
        assert_eq!(
            load(&vars).unwrap().quote.url_for("AAPL"),
            "https://quotes.example.com/q?s=AAPL"
        );
    }

    #[test]
    fn zero_concurrency_means_unbounded() {
        let mut vars = base_env();
        vars.insert("MAX_CONCURRENT_FETCHES", "0");
        assert_eq!(load(&vars).unwrap().max_concurrent_fetches, None);
        vars.insert("MAX_CONCURRENT_FETCHES", "4");
        assert_eq!(load(&vars).unwrap().max_concurrent_fetches, Some(4));
        vars.insert("MAX_CONCURRENT_FETCHES", "four");
        assert!(load(&vars).is_err());
    }
}
