// src/report.rs
use crate::models::Batch;
use std::fmt::Write;

pub fn total_profit(batch: &Batch) -> f64 {
    batch.positions.iter().map(|p| p.earn()).sum()
}

/// Fixed-width profit/loss table used as the mail body.
pub fn render(batch: &Batch) -> String {
    let mut content = String::new();
    let mut sum = 0.0;
    for p in &batch.positions {
        let earn = p.earn();
        let _ = writeln!(
            content,
            "{} {:10.2} {:10.2} {:6} {:10.2}",
            p.symbol, p.bid, p.value, p.hold, earn
        );
        sum += earn;
    }
    content.push_str(&"-".repeat(30));
    content.push('\n');
    let _ = writeln!(content, "{}Profit Loss: {:10.2}", " ".repeat(27), sum);
    content
}
