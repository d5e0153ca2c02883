//! Batch processing with request-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which manages
//! concurrent batch processing with request-based partitioning to enable
//! parallel processing while maintaining per-request operation ordering.
//!
//! # Design
//!
//! A batch of recorded operations is partitioned by request id, so that a
//! request's create and its transitions are applied in their recorded
//! order while operations on different requests run concurrently across
//! tokio tasks.

use std::collections::HashMap;
use std::sync::Arc;

use super::AsyncWithdrawalEngine;
use crate::types::{OperationRecord, RequestId, WithdrawalError};

/// Result of processing a single recorded operation
///
/// Contains the original operation record and the result of applying it.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The operation record that was processed
    pub record: OperationRecord,

    /// The result of applying it (success or error)
    pub result: Result<(), WithdrawalError>,
}

/// Batch processor with request-based partitioning
///
/// `BatchProcessor` partitions operation batches by request id. This
/// enables parallel processing of operations for different requests while
/// maintaining sequential ordering for each individual request.
#[derive(Clone)]
pub struct BatchProcessor {
    /// Thread-safe withdrawal engine
    ///
    /// Wrapped in Arc to enable sharing across async tasks.
    engine: Arc<AsyncWithdrawalEngine>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    pub fn new(engine: Arc<AsyncWithdrawalEngine>) -> Self {
        Self { engine }
    }

    /// Partition a batch of operations by request id
    ///
    /// Each operation appears in exactly one sub-batch, and operations for
    /// each request keep their original order. Sub-batches contain only
    /// operations for a single request.
    pub fn partition_by_request(
        &self,
        batch: Vec<OperationRecord>,
    ) -> HashMap<RequestId, Vec<OperationRecord>> {
        let mut request_batches: HashMap<RequestId, Vec<OperationRecord>> = HashMap::new();

        for record in batch {
            request_batches
                .entry(record.request)
                .or_default()
                .push(record);
        }

        request_batches
    }

    /// Process all operations for a single request sequentially
    ///
    /// Operations are applied in the order they appear in the input
    /// vector, so per-request ordering is maintained even when multiple
    /// requests are being processed concurrently. Errors are captured in
    /// the results and don't stop processing.
    pub async fn process_request_operations(
        &self,
        operations: Vec<OperationRecord>,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(operations.len());

        for record in operations {
            let result = self.engine.apply(record.clone()).map(|_| ());
            results.push(ProcessingResult { record, result });
        }

        results
    }

    /// Process a batch of operations with request-based partitioning
    ///
    /// Partitions the batch by request id, spawns a tokio task per
    /// request, waits for all tasks, and collects the results. Results
    /// may be in a different order than the input due to concurrency;
    /// per-request order is preserved.
    pub async fn process_batch(&self, batch: Vec<OperationRecord>) -> Vec<ProcessingResult> {
        let request_batches = self.partition_by_request(batch);

        let mut tasks = Vec::new();
        for (_request_id, operations) in request_batches {
            let processor = self.clone();
            let task =
                tokio::spawn(async move { processor.process_request_operations(operations).await });
            tasks.push(task);
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(request_results) => results.extend(request_results),
                Err(e) => {
                    tracing::error!("batch task panicked: {e:?}");
                }
            }
        }

        results
    }
}
