//! 📂 The file sink: what the broker would have received, one JSON line per record.
//!
//! Handy when the broker is somebody else's problem today. Each line is
//! `{"key": "<video id>", "value": {"TITLE": ..., "VIEWS": ..., "LIKES": ..., "COMMENTS": ...}}`.
//!
//! ⚠️ `File::create` truncates if the file exists. No warning. No backup. Just gone.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{
    fs::File,
    io::{self, AsyncWriteExt},
};
use tracing::trace;

use crate::backends::Sink;
use crate::common::OutgoingRecord;

#[derive(Debug, Deserialize, Clone)]
pub struct FileSinkConfig {
    pub file_name: String,
}

#[derive(Serialize)]
struct KeyedLine<'a> {
    key: &'a str,
    value: &'a OutgoingRecord,
}

/// 🚰 A BufWriter around a tokio `File`. Simple. Honest. Does not retry.
#[derive(Debug)]
pub(crate) struct FileSink {
    file_buf: io::BufWriter<File>,
    sink_config: FileSinkConfig,
}

impl FileSink {
    pub(crate) async fn new(sink_config: FileSinkConfig) -> Result<Self> {
        let file_handle = File::create(&sink_config.file_name).await.with_context(|| {
            format!(
                "💀 The sink file '{}' could not be conjured into existence. \
                 We stared at the path. The path stared back. \
                 One of us was wrong about whether the parent directory existed.",
                sink_config.file_name
            )
        })?;
        Ok(Self {
            file_buf: io::BufWriter::new(file_handle),
            sink_config,
        })
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn send(&mut self, key: &str, record: &OutgoingRecord) -> Result<()> {
        let mut line = serde_json::to_string(&KeyedLine { key, value: record })
            .context("💀 A four-field record refused to become JSON. Serde is having a day.")?;
        line.push('\n');
        trace!("📬 {} bytes for '{}' walked into the file sink", line.len(), key);
        self.file_buf.write_all(line.as_bytes()).await.with_context(|| {
            format!("💀 Could not write to '{}'. Disk full? Permissions?", self.sink_config.file_name)
        })?;
        Ok(())
    }

    /// 🗑️ Flush the BufWriter. Async Drop is not a thing, so this is the only flush you get.
    async fn close(&mut self) -> Result<()> {
        trace!("🎬 final flush of '{}'", self.sink_config.file_name);
        self.file_buf.flush().await.with_context(|| {
            format!(
                "💀 Error flushing '{}'. The bytes were SO CLOSE to the disk.",
                self.sink_config.file_name
            )
        })
    }
}
