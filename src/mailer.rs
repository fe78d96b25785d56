// src/mailer.rs
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, PartialEq)]
pub struct Mail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

impl Mail {
    /// Plain text UTF-8 message with RFC 5322 headers.
    pub fn to_message(&self) -> String {
        format!(
            "To: {}\r\nFrom: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=UTF-8\r\n\r\n{}",
            self.to, self.from, self.subject, self.body
        )
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &Mail) -> Result<(), AppError>;
}

/// Drops each message as a `.eml` file for a relay to pick up.
pub struct SpoolMailer {
    dir: PathBuf,
    seq: AtomicU64,
}

impl SpoolMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SpoolMailer {
            dir: dir.into(),
            seq: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl Mailer for SpoolMailer {
    async fn send(&self, mail: &Mail) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;
        let path = self.dir.join(format!(
            "{}-{}.eml",
            Utc::now().format("%Y%m%dT%H%M%S%.6f"),
            self.seq.fetch_add(1, Ordering::Relaxed)
        ));
        // Never replace a message that is already queued.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| AppError::Mail(format!("{}: {}", path.display(), e)))?;
        file.write_all(mail.to_message().as_bytes())
            .await
            .map_err(|e| AppError::Mail(format!("{}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| AppError::Mail(format!("{}: {}", path.display(), e)))?;
        info!("Mail to {} spooled at {}", mail.to, path.display());
        Ok(())
    }
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &Mail) -> Result<(), AppError> {
        info!("Mail to {}:\n{}", mail.to, mail.to_message());
        Ok(())
    }
}

#[cfg(test)]
pub mod recording {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<Mail>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: &Mail) -> Result<(), AppError> {
            self.sent.lock().unwrap().push(mail.clone());
            if self.fail {
                return Err(AppError::Mail("message rejected".to_string()));
            }
            Ok(())
        }
    }
}
