//! 💀 The named failures of ytx.
//!
//! Everything in the crate propagates `anyhow::Result` and piles `.context(...)` on top,
//! but the thing at the bottom of the chain is one of these. Callers that care which
//! kind of bad day they are having can `downcast_ref::<YtxError>()` through the chain.
//!
//! 🦆 Five variants. Five stages of grief. Not in the same order.

use thiserror::Error;

/// 🏷️ Every way a run can die, sorted by who to blame.
#[derive(Debug, Error)]
pub enum YtxError {
    /// 📡 We never got an answer. DNS, refused connections, resets mid-body.
    #[error("💀 transport failure while calling {endpoint}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 🧾 We got an answer, and the answer was wrong: bad status, not JSON, wrong shape.
    #[error("💀 {endpoint} returned an unusable response: {reason}")]
    Api { endpoint: String, reason: String },

    /// 🔢 A number that is not a number, or one too big for the box it has to fit in.
    #[error("💀 field '{field}' holds '{value}', which is not a usable count: {reason}")]
    Format {
        field: String,
        value: String,
        reason: String,
    },

    /// 📚 The schema registry is down, empty, or handed us something we cannot encode with.
    #[error("💀 schema registry lookup for subject '{subject}' failed: {reason}")]
    SchemaRegistry {
        subject: String,
        reason: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// 📬 The broker side dropped the ball: enqueue refused, delivery failed, flush timed out.
    #[error("💀 delivery to topic '{topic}' failed: {reason}")]
    Delivery { topic: String, reason: String },
}

impl YtxError {
    pub(crate) fn api(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Api {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn delivery(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Delivery {
            topic: topic.into(),
            reason: reason.into(),
        }
    }

    /// 🔍 Digs the first `YtxError` out of an anyhow chain, context layers and all.
    pub fn find(err: &anyhow::Error) -> Option<&YtxError> {
        err.chain().find_map(|cause| cause.downcast_ref::<YtxError>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn the_one_where_the_typed_error_survives_three_layers_of_context() {
        let buried: anyhow::Result<()> = Err(YtxError::api("videos", "no items"))
            .context("layer one")
            .context("layer two")
            .context("layer three");

        let err = buried.expect_err("💀 we built an Err on purpose");
        match YtxError::find(&err) {
            Some(YtxError::Api { endpoint, reason }) => {
                assert_eq!(endpoint, "videos");
                assert_eq!(reason, "no items");
            }
            honestly_who_knows => panic!("💀 expected an Api error, found {honestly_who_knows:?}"),
        }
    }
}
