use std::{collections::BTreeMap, sync::Arc};

use futures::future;
use tokio::sync::Semaphore;

use crate::{ActionFailure, MonodbError, SchedulingError};

use super::{ExecutionItem, ExecutionList};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Runs execution lists band by band.
#[derive(Debug, Clone)]
pub struct Scheduler {
    max_workers: usize,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Scheduler {
    /// Creates a scheduler running at most `max_workers` actions of a band at once.
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// Creates a scheduler that runs one action at a time.
    pub fn sequential() -> Self {
        Self::new(1)
    }

    /// Runs every item of `list`, lowest priority first.
    ///
    /// Returns the failures of the first band that had any. Later bands are not started.
    pub async fn run(&self, list: ExecutionList) -> Result<(), SchedulingError> {
        let mut bands: BTreeMap<u32, Vec<ExecutionItem>> = BTreeMap::new();
        for item in list {
            bands.entry(item.priority).or_default().push(item);
        }

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        for (priority, items) in bands {
            tracing::debug!(
                "running priority band {} ({} actions, {} workers)",
                priority,
                items.len(),
                self.max_workers
            );

            self.run_band(priority, items, &semaphore).await?;
        }

        Ok(())
    }

    async fn run_band(
        &self,
        priority: u32,
        items: Vec<ExecutionItem>,
        semaphore: &Arc<Semaphore>,
    ) -> Result<(), SchedulingError> {
        let total = items.len();
        let (labels, handles): (Vec<_>, Vec<_>) = items
            .into_iter()
            .map(|item| {
                let semaphore = Arc::clone(semaphore);
                let label = item.label.clone();
                let handle = tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(MonodbError::custom)?;

                    tracing::trace!("starting {}", item.label);
                    item.action.run().await
                });

                (label, handle)
            })
            .unzip();

        // Every task of the band is awaited, even after a failure.
        let results = future::join_all(handles).await;

        let failures: Vec<ActionFailure> = labels
            .into_iter()
            .zip(results)
            .filter_map(|(label, result)| {
                let error = match result {
                    Ok(Ok(())) => return None,
                    Ok(Err(error)) => error,
                    Err(join_error) => MonodbError::JoinError(join_error),
                };

                tracing::error!("{} failed: {}", label, error);
                Some(ActionFailure { label, error })
            })
            .collect();

        if !failures.is_empty() {
            return Err(SchedulingError {
                priority,
                total,
                failures,
            });
        }

        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
