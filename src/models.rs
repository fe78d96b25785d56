// src/models.rs
use serde::{Deserialize, Serialize};

/// One tracked holding. `value` is the latest fetched price.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Position {
    #[serde(rename = "symble")]
    pub symbol: String,
    pub bid: f64,
    pub value: f64,
    pub hold: i64,
}

impl Position {
    pub fn new(symbol: &str, bid: f64, hold: i64) -> Self {
        Position {
            symbol: symbol.to_string(),
            bid,
            value: 0.0,
            hold,
        }
    }

    /// (value - bid) * hold
    pub fn earn(&self) -> f64 {
        (self.value - self.bid) * self.hold as f64
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Batch {
    pub created_at: String,
    #[serde(rename = "body")]
    pub positions: Vec<Position>,
}
