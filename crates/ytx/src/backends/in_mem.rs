//! # Previously, on ytx...
//!
//! 🎬 The broker was down for maintenance. The playlist was not. Someone still wanted to
//! know what *would* have been published. Someone had to write a backend so simple it
//! lives entirely in RAM, gone the moment you blink.
//!
//! That someone was this module.
//!
//! [`InMemorySink`] keeps every published record behind an `Arc<Mutex<...>>` so callers
//! can inspect what arrived. Selectable from config (`sink_config = "InMemory"`) for a
//! dry run where the INFO logs are the product. Tests use it for assertions.
//!
//! `InMemoryPages` (tests only) is a scripted [`PageFetcher`]: you tell it which JSON
//! page answers which request and it writes down every request it receives.
//!
//! ✅ No network calls. No disk I/O. Just vibes and heap memory. 🦆

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::backends::Sink;
use crate::common::OutgoingRecord;

/// 📬 What the in-memory sink has seen so far.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct InMemoryLedger {
    pub(crate) records: Vec<(String, OutgoingRecord)>,
    pub(crate) close_calls: usize,
}

/// 📦 A sink that never forgets.
///
/// Clone-able because tests need to peek inside after handing one copy to the pipeline.
/// The `Arc` means every clone shares the same ledger.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemorySink {
    pub(crate) ledger: Arc<Mutex<InMemoryLedger>>,
}

impl InMemorySink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 🔍 A copy of everything received so far.
    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> InMemoryLedger {
        self.ledger.lock().await.clone()
    }
}

#[async_trait]
impl Sink for InMemorySink {
    async fn send(&mut self, key: &str, record: &OutgoingRecord) -> Result<()> {
        debug!("🧠 in-memory sink kept '{}'", key);
        self.ledger
            .lock()
            .await
            .records
            .push((key.to_string(), record.clone()));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        // 🗑️ nothing to flush. we just write down that somebody remembered to call us.
        self.ledger.lock().await.close_calls += 1;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use scripted::InMemoryPages;
