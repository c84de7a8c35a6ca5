//! @ai:module:intent Bounded-concurrency batch dispatch over a conversation plan
//! @ai:module:layer application
//! @ai:module:public_api BatchDispatcher
//! @ai:module:stateless false

use crate::plan::ConversationUnit;
use crate::provider::ProviderClient;
use crate::recorder::ResultRecord;
use anyhow::{Context, Result};
use futures::future;
use std::sync::Arc;
use std::time::Duration;

/// @ai:intent Drives a conversation plan through a provider client in
///            fixed-size windows, bounding outstanding calls at the batch
///            size and preserving plan order in the output
pub struct BatchDispatcher<C: ProviderClient> {
    client: Arc<C>,
    batch_size: usize,
    batch_delay: Duration,
}

impl<C: ProviderClient> BatchDispatcher<C> {
    /// @ai:intent Create a new dispatcher
    /// @ai:pre batch_size >= 1
    /// @ai:effects pure
    pub fn new(client: Arc<C>, batch_size: usize, batch_delay: Duration) -> Result<Self> {
        if batch_size < 1 {
            anyhow::bail!("Batch size must be at least 1, got {}", batch_size);
        }

        Ok(Self {
            client,
            batch_size,
            batch_delay,
        })
    }

    /// @ai:intent Run the full plan: pre-flight first, then one window at a
    ///            time, joining every call in a window before the next one
    ///            starts. Every unit yields exactly one record; per-call
    ///            errors and blocks are recorded, never retried, and never
    ///            cancel their siblings.
    /// @ai:post output length == plan length, ordered by sequence_index
    /// @ai:effects network, time
    pub async fn run(&self, plan: &[ConversationUnit]) -> Result<Vec<ResultRecord>> {
        self.client
            .preflight()
            .await
            .with_context(|| format!("Provider '{}' is not usable", self.client.name()))?;

        let total = plan.len();
        let batch_count = total.div_ceil(self.batch_size);
        let mut records = Vec::with_capacity(total);

        for (batch_index, window) in plan.chunks(self.batch_size).enumerate() {
            tracing::info!(
                "Processing batch {}/{} ({} conversations)",
                batch_index + 1,
                batch_count,
                window.len()
            );

            // join_all yields results in submission order, so record order
            // follows sequence_index regardless of completion order.
            let window_records = future::join_all(
                window.iter().map(|unit| self.dispatch_one(unit, total)),
            )
            .await;

            records.extend(window_records);

            // Delay only between windows, never after the last one.
            if records.len() < total {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        Ok(records)
    }

    /// @ai:intent Resolve one conversation unit to its record, timestamped
    ///            at resolution
    /// @ai:effects network
    async fn dispatch_one(&self, unit: &ConversationUnit, total: usize) -> ResultRecord {
        let outcome = self.client.send(&unit.question).await;

        tracing::info!(
            "Conv {}/{} [{}-{}]: {} ({} tokens)",
            unit.sequence_index + 1,
            total,
            unit.question_id,
            unit.repetition,
            outcome.status,
            outcome.tokens_received
        );

        ResultRecord::from_outcome(unit, outcome, chrono::Utc::now())
    }
}
