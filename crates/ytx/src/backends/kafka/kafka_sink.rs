use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rdkafka::ClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::message::Message;
use rdkafka::producer::{BaseRecord, DeliveryResult, Producer, ProducerContext, ThreadedProducer};
use rdkafka::util::Timeout;
use tracing::{debug, error, info, trace};

use super::KafkaSinkConfig;
use super::avro::AvroRecordEncoder;
use super::schema_registry::SchemaRegistryClient;
use crate::backends::Sink;
use crate::common::OutgoingRecord;
use crate::error::YtxError;

/// 🧾 Running score of delivery reports. Shared between the librdkafka polling thread
/// (which writes) and `close` (which reads the verdict).
#[derive(Debug, Default)]
pub(crate) struct DeliveryLedger {
    delivered: AtomicU64,
    failed: AtomicU64,
    first_failure: Mutex<Option<String>>,
}

impl DeliveryLedger {
    fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failed(&self, reason: String) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut first) = self.first_failure.lock() {
            first.get_or_insert(reason);
        }
    }

    pub(crate) fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub(crate) fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// ⚖️ `Ok(delivered)` if nothing failed, otherwise a `Delivery` error quoting the first failure.
    fn verdict(&self, topic: &str) -> Result<u64, YtxError> {
        let failed = self.failed();
        if failed == 0 {
            return Ok(self.delivered());
        }
        let first = self
            .first_failure
            .lock()
            .ok()
            .and_then(|first| first.clone())
            .unwrap_or_else(|| "no reason given".to_string());
        Err(YtxError::delivery(
            topic,
            format!("{failed} record(s) were not delivered, first failure: {first}"),
        ))
    }
}

/// 📮 librdkafka calls this once per produced record, from its own polling thread.
pub(crate) struct DeliveryReportContext {
    ledger: Arc<DeliveryLedger>,
}

impl ClientContext for DeliveryReportContext {}

impl ProducerContext for DeliveryReportContext {
    type DeliveryOpaque = ();

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, _: Self::DeliveryOpaque) {
        match delivery_result {
            Ok(message) => {
                trace!(
                    "✅ delivered to {} [{}] @ {}",
                    message.topic(),
                    message.partition(),
                    message.offset()
                );
                self.ledger.record_delivered();
            }
            Err((err, message)) => {
                let key = message
                    .key()
                    .map(String::from_utf8_lossy)
                    .unwrap_or_default();
                error!("💀 message delivery failed for key '{}': {}", key, err);
                self.ledger.record_failed(format!("key '{key}': {err}"));
            }
        }
    }
}

/// 🐙 Encodes with the registry's schema, enqueues on a librdkafka producer, flushes on close.
pub(crate) struct KafkaSink {
    topic: String,
    encoder: AvroRecordEncoder,
    producer: Option<ThreadedProducer<DeliveryReportContext>>,
    ledger: Arc<DeliveryLedger>,
    flush_timeout: Timeout,
}

impl std::fmt::Debug for KafkaSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaSink")
            .field("topic", &self.topic)
            .field("schema_id", &self.encoder.schema_id())
            .field("open", &self.producer.is_some())
            .field("ledger", &self.ledger)
            .finish()
    }
}

impl KafkaSink {
    /// 🏗️ Registry first, producer second. If the registry has nothing for us, no producer
    /// is ever created and no playlist page is ever fetched.
    pub(crate) async fn new(config: KafkaSinkConfig) -> Result<Self> {
        let subject = config.subject();
        let registry = SchemaRegistryClient::new(config.schema_registry.clone())?;
        let registered = registry.latest_version(&subject).await?;
        let encoder = AvroRecordEncoder::new(&registered)?;

        let mut client_config = ClientConfig::new();
        for (property, value) in &config.producer {
            client_config.set(property, value);
        }

        let ledger = Arc::new(DeliveryLedger::default());
        let producer: ThreadedProducer<DeliveryReportContext> = client_config
            .create_with_context(DeliveryReportContext {
                ledger: Arc::clone(&ledger),
            })
            .with_context(|| {
                format!(
                    "💀 librdkafka rejected the producer config for topic '{}'. \
                     Check the keys under [sink_config.Kafka.producer].",
                    config.topic
                )
            })?;

        info!(
            "🐙 producing to '{}' with schema id {} (subject '{}')",
            config.topic, registered.id, subject
        );

        Ok(Self {
            topic: config.topic,
            encoder,
            producer: Some(producer),
            ledger,
            flush_timeout: config
                .flush_timeout_secs
                .map(|secs| Timeout::After(Duration::from_secs(secs)))
                .unwrap_or(Timeout::Never),
        })
    }
}

#[async_trait]
impl Sink for KafkaSink {
    async fn send(&mut self, key: &str, record: &OutgoingRecord) -> Result<()> {
        let Some(producer) = self.producer.as_ref() else {
            return Err(YtxError::delivery(&self.topic, "send called after close").into());
        };
        let payload = self.encoder.encode(record)?;

        producer
            .send(BaseRecord::to(&self.topic).key(key).payload(&payload))
            .map_err(|(err, _)| {
                YtxError::delivery(&self.topic, format!("could not enqueue key '{key}': {err}"))
            })?;
        debug!("📬 enqueued {} bytes for '{}'", payload.len(), key);
        Ok(())
    }

    /// 🚽 Flush everything in flight, then ask the ledger how it went.
    async fn close(&mut self) -> Result<()> {
        let Some(producer) = self.producer.take() else {
            return Ok(());
        };
        let timeout = self.flush_timeout;
        let topic = self.topic.clone();

        let flushed = tokio::task::spawn_blocking(move || producer.flush(timeout))
            .await
            .map_err(|err| YtxError::delivery(&topic, format!("flush thread died: {err}")))?;
        flushed.map_err(|err| YtxError::delivery(&topic, format!("flush did not finish: {err}")))?;

        let delivered = self.ledger.verdict(&topic)?;
        info!("🚽 flushed '{}', {} record(s) delivered", topic, delivered);
        Ok(())
    }
}
