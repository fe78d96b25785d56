// src/source.rs
use crate::config::SourceKind;
use crate::error::AppError;
use crate::models::Position;
use crate::storage::ObjectStore;
use log::{debug, info};

/// Holdings used when no list is kept in storage.
const STATIC_POSITIONS: &[(&str, f64, i64)] = &[
    ("AAPL", 142.50, 10),
    ("MSFT", 251.30, 5),
    ("GOOGL", 98.40, 8),
    ("AMZN", 112.75, 6),
    ("ADBE", 345.00, 2),
];

pub fn static_positions() -> Vec<Position> {
    STATIC_POSITIONS
        .iter()
        .map(|(symbol, bid, hold)| Position::new(symbol, *bid, *hold))
        .collect()
}

/// Parses `symbol,bid,value,hold` lines. Lines without exactly four fields
/// are skipped and unparsable numbers become zero.
pub fn parse_positions(buf: &[u8]) -> Vec<Position> {
    let text = String::from_utf8_lossy(buf);
    text.lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != 4 {
                if !line.is_empty() {
                    debug!("Skipping malformed line: {:?}", line);
                }
                return None;
            }
            Some(Position {
                symbol: fields[0].to_string(),
                bid: parse_price(fields[1]),
                value: parse_price(fields[2]),
                hold: fields[3].parse().unwrap_or(0),
            })
        })
        .collect()
}

/// `NaN`, `inf` and overflowing values count as unparsable.
fn parse_price(field: &str) -> f64 {
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

pub async fn load_positions(
    kind: &SourceKind,
    store: &dyn ObjectStore,
    bucket: &str,
) -> Result<Vec<Position>, AppError> {
    let positions = match kind {
        SourceKind::Static => static_positions(),
        SourceKind::Storage { key } => {
            let buf = store.get(bucket, key).await.map_err(AppError::Storage)?;
            parse_positions(&buf)
        }
    };
    info!("Loaded {} positions", positions.len());
    Ok(positions)
}
