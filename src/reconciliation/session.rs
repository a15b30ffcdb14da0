//! Reconciliation session that loads its pools from a store and persists confirmations

use tracing::instrument;

use crate::reconciliation::matcher::MatchConfig;
use crate::reconciliation::workflow::ReconciliationWorkflow;
use crate::traits::*;
use crate::types::*;

/// Binds a [`ReconciliationWorkflow`] to the store it was loaded from
pub struct ReconciliationSession<S: ReconciliationStore> {
    store: S,
    workflow: ReconciliationWorkflow,
    /// Confirmed in the workflow but not yet accepted by the store
    unsaved: Vec<ConfirmedMatch>,
}

impl<S: ReconciliationStore> ReconciliationSession<S> {
    /// Load the unmatched pools from `store` and run the matcher over them
    #[instrument(skip(store, config))]
    pub async fn open(store: S, config: MatchConfig) -> FinanceResult<Self> {
        let statement_lines = store.unmatched_statement_lines().await?;
        let revenue_records = store.unmatched_revenue_records().await?;

        let workflow = ReconciliationWorkflow::new(statement_lines, revenue_records, config)?;

        tracing::info!(
            candidates = workflow.candidates().len(),
            pending = workflow.pending_candidates().len(),
            "Opened reconciliation session"
        );

        Ok(Self {
            store,
            workflow,
            unsaved: Vec::new(),
        })
    }

    pub fn workflow(&self) -> &ReconciliationWorkflow {
        &self.workflow
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Confirm candidate `index` and hand the pairing to the store.
    ///
    /// The decision is recorded before the store is called. When the store
    /// fails the pairing is kept in [`unsaved_confirmations`](Self::unsaved_confirmations)
    /// and the error is returned; [`retry_unsaved`](Self::retry_unsaved) writes it later.
    #[instrument(skip(self))]
    pub async fn confirm(&mut self, index: usize) -> FinanceResult<ConfirmedMatch> {
        let confirmed = self.workflow.confirm(index)?;
        if let Err(e) = self.persist(&confirmed).await {
            self.unsaved.push(confirmed);
            return Err(e);
        }
        Ok(confirmed)
    }

    /// Pairings the workflow has confirmed but the store has not yet saved
    pub fn unsaved_confirmations(&self) -> &[ConfirmedMatch] {
        &self.unsaved
    }

    /// Persist every unsaved confirmation, in confirmation order.
    ///
    /// Stops at the first failure; pairings written before it are dropped
    /// from the unsaved list. Returns how many were saved.
    #[instrument(skip(self))]
    pub async fn retry_unsaved(&mut self) -> FinanceResult<usize> {
        let pending = std::mem::take(&mut self.unsaved);
        let mut saved = 0usize;
        let mut remaining = pending.into_iter();

        while let Some(confirmed) = remaining.next() {
            if let Err(e) = self.persist(&confirmed).await {
                self.unsaved.push(confirmed);
                self.unsaved.extend(remaining);
                return Err(e);
            }
            saved += 1;
        }

        tracing::info!(saved, "Persisted previously unsaved matches");
        Ok(saved)
    }

    pub fn reject(&mut self, index: usize) -> FinanceResult<&MatchCandidate> {
        self.workflow.reject(index)
    }

    /// Write a confirmed pairing to the store
    pub async fn persist(&mut self, confirmed: &ConfirmedMatch) -> FinanceResult<()> {
        self.store.save_match(confirmed).await.inspect_err(|e| {
            tracing::warn!(
                error = %e,
                statement_line_id = %confirmed.statement_line.id,
                "Failed to persist confirmed match"
            );
        })
    }

    /// Re-run the matcher over the remaining pools
    pub fn rematch(&mut self) -> FinanceResult<usize> {
        self.workflow.rematch()
    }

    /// Close the session, returning the store and the final workflow state.
    ///
    /// Unsaved confirmations are dropped; check
    /// [`unsaved_confirmations`](Self::unsaved_confirmations) first.
    pub fn finish(self) -> (S, ReconciliationWorkflow) {
        if !self.unsaved.is_empty() {
            tracing::warn!(
                unsaved = self.unsaved.len(),
                "Closing reconciliation session with unsaved matches"
            );
        }
        (self.store, self.workflow)
    }
}
