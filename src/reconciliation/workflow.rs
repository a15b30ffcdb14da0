//! Review queue that turns ranked candidates into one-to-one confirmed matches

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::reconciliation::matcher::{find_matches, MatchConfig};
use crate::types::*;
use crate::utils::validation::validate_unique_ids;

/// A candidate together with the reviewer's decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub candidate: MatchCandidate,
    pub status: CandidateStatus,
}

/// Per-status tally of the decision ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionCounts {
    pub proposed: usize,
    pub confirmed: usize,
    pub rejected: usize,
    pub superseded: usize,
}

/// Stateful reconciliation review for one batch of statement lines and revenue records.
///
/// The workflow owns its ledger; callers that share an instance across users
/// must serialize access themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationWorkflow {
    config: MatchConfig,
    statement_lines: Vec<StatementLine>,
    revenue_records: Vec<RevenueRecord>,
    matched_statement_ids: HashSet<String>,
    matched_revenue_ids: HashSet<String>,
    entries: Vec<CandidateEntry>,
}

impl ReconciliationWorkflow {
    /// Run the matcher over both collections and open a review queue
    pub fn new(
        statement_lines: Vec<StatementLine>,
        revenue_records: Vec<RevenueRecord>,
        config: MatchConfig,
    ) -> FinanceResult<Self> {
        let candidates = find_matches(&statement_lines, &revenue_records, &config)?;
        Self::from_candidates(statement_lines, revenue_records, candidates, config)
    }

    /// Open a review queue over candidates produced elsewhere.
    ///
    /// Every candidate must reference a statement line and a revenue record
    /// present in the pools.
    pub fn from_candidates(
        statement_lines: Vec<StatementLine>,
        revenue_records: Vec<RevenueRecord>,
        candidates: Vec<MatchCandidate>,
        config: MatchConfig,
    ) -> FinanceResult<Self> {
        config.validate()?;
        validate_unique_ids(
            statement_lines.iter().map(|l| l.id.as_str()),
            "statement lines",
        )?;
        validate_unique_ids(
            revenue_records.iter().map(|r| r.id.as_str()),
            "revenue records",
        )?;

        let known_statements: HashSet<&str> =
            statement_lines.iter().map(|l| l.id.as_str()).collect();
        let known_revenue: HashSet<&str> =
            revenue_records.iter().map(|r| r.id.as_str()).collect();
        if let Some(orphan) = candidates.iter().find(|c| {
            !known_statements.contains(c.statement_line.id.as_str())
                || !known_revenue.contains(c.revenue_record.id.as_str())
        }) {
            return Err(FinanceError::InvalidConfiguration(format!(
                "candidate ({}, {}) references an entity outside the pools",
                orphan.statement_line.id, orphan.revenue_record.id
            )));
        }

        let entries = candidates
            .into_iter()
            .map(|candidate| CandidateEntry {
                candidate,
                status: CandidateStatus::Proposed,
            })
            .collect();

        Ok(Self {
            config,
            statement_lines,
            revenue_records,
            matched_statement_ids: HashSet::new(),
            matched_revenue_ids: HashSet::new(),
            entries,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// All candidates in ledger order, regardless of status
    pub fn candidates(&self) -> &[CandidateEntry] {
        &self.entries
    }

    pub fn status(&self, index: usize) -> FinanceResult<CandidateStatus> {
        self.entry(index).map(|entry| entry.status)
    }

    /// Accept candidate `index`, removing both of its entities from the pools
    pub fn confirm(&mut self, index: usize) -> FinanceResult<ConfirmedMatch> {
        self.ensure_proposed(index)?;

        let confirmed = self.entries[index].candidate.clone();
        let statement_id = confirmed.statement_line.id.clone();
        let revenue_id = confirmed.revenue_record.id.clone();

        self.entries[index].status = CandidateStatus::Confirmed;
        self.matched_statement_ids.insert(statement_id.clone());
        self.matched_revenue_ids.insert(revenue_id.clone());

        let mut superseded = 0usize;
        for entry in self
            .entries
            .iter_mut()
            .filter(|e| e.status == CandidateStatus::Proposed)
        {
            if entry.candidate.overlaps(&confirmed) {
                entry.status = CandidateStatus::Superseded;
                superseded += 1;
            }
        }

        tracing::info!(
            index,
            statement_line_id = %statement_id,
            revenue_record_id = %revenue_id,
            superseded,
            "Confirmed reconciliation match"
        );

        Ok(ConfirmedMatch::from(&self.entries[index].candidate))
    }

    /// Decline candidate `index`; both entities stay in the pools
    pub fn reject(&mut self, index: usize) -> FinanceResult<&MatchCandidate> {
        self.ensure_proposed(index)?;
        self.entries[index].status = CandidateStatus::Rejected;

        let candidate = &self.entries[index].candidate;
        tracing::info!(
            index,
            statement_line_id = %candidate.statement_line.id,
            revenue_record_id = %candidate.revenue_record.id,
            "Rejected reconciliation candidate"
        );

        Ok(candidate)
    }

    /// Statement lines and revenue records not claimed by any confirmed match
    pub fn remaining_unmatched(&self) -> UnmatchedPools {
        UnmatchedPools {
            statement_lines: self
                .statement_lines
                .iter()
                .filter(|l| !self.matched_statement_ids.contains(&l.id))
                .cloned()
                .collect(),
            revenue_records: self
                .revenue_records
                .iter()
                .filter(|r| !self.matched_revenue_ids.contains(&r.id))
                .cloned()
                .collect(),
        }
    }

    /// Proposed candidates whose entities are both still unmatched, with their ledger index
    pub fn pending_candidates(&self) -> Vec<(usize, &MatchCandidate)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.status == CandidateStatus::Proposed)
            .filter(|(_, entry)| {
                !self
                    .matched_statement_ids
                    .contains(&entry.candidate.statement_line.id)
                    && !self
                        .matched_revenue_ids
                        .contains(&entry.candidate.revenue_record.id)
            })
            .map(|(index, entry)| (index, &entry.candidate))
            .collect()
    }

    /// Every confirmed pairing, in ledger order
    pub fn confirmed_matches(&self) -> Vec<ConfirmedMatch> {
        self.entries
            .iter()
            .filter(|e| e.status == CandidateStatus::Confirmed)
            .map(|e| ConfirmedMatch::from(&e.candidate))
            .collect()
    }

    /// `(statement_line_id, revenue_record_id)` of every rejected candidate
    pub fn rejected_pairs(&self) -> HashSet<(String, String)> {
        self.entries
            .iter()
            .filter(|e| e.status == CandidateStatus::Rejected)
            .map(|e| {
                (
                    e.candidate.statement_line.id.clone(),
                    e.candidate.revenue_record.id.clone(),
                )
            })
            .collect()
    }

    pub fn decision_counts(&self) -> DecisionCounts {
        let mut by_status: HashMap<CandidateStatus, usize> = HashMap::new();
        for entry in &self.entries {
            *by_status.entry(entry.status).or_default() += 1;
        }
        let count = |status| by_status.get(&status).copied().unwrap_or(0);

        DecisionCounts {
            proposed: count(CandidateStatus::Proposed),
            confirmed: count(CandidateStatus::Confirmed),
            rejected: count(CandidateStatus::Rejected),
            superseded: count(CandidateStatus::Superseded),
        }
    }

    /// Run the matcher again over the remaining pools.
    ///
    /// Pairs that were rejected or are still proposed are not offered again.
    /// New candidates are appended, so existing indices stay valid. Returns
    /// the number of candidates added.
    pub fn rematch(&mut self) -> FinanceResult<usize> {
        let pools = self.remaining_unmatched();
        let candidates = find_matches(&pools.statement_lines, &pools.revenue_records, &self.config)?;

        let known: HashSet<(String, String)> = self
            .entries
            .iter()
            .filter(|e| {
                matches!(
                    e.status,
                    CandidateStatus::Rejected | CandidateStatus::Proposed
                )
            })
            .map(|e| {
                (
                    e.candidate.statement_line.id.clone(),
                    e.candidate.revenue_record.id.clone(),
                )
            })
            .collect();

        let before = self.entries.len();
        self.entries.extend(
            candidates
                .into_iter()
                .filter(|c| {
                    !known.contains(&(c.statement_line.id.clone(), c.revenue_record.id.clone()))
                })
                .map(|candidate| CandidateEntry {
                    candidate,
                    status: CandidateStatus::Proposed,
                }),
        );
        let added = self.entries.len() - before;

        tracing::debug!(added, total = self.entries.len(), "Re-ran matcher over remaining pools");
        Ok(added)
    }

    /// Add freshly imported entities to the pools; call [`rematch`](Self::rematch) to score them
    pub fn extend_pools(
        &mut self,
        statement_lines: Vec<StatementLine>,
        revenue_records: Vec<RevenueRecord>,
    ) -> FinanceResult<()> {
        validate_unique_ids(
            self.statement_lines
                .iter()
                .chain(statement_lines.iter())
                .map(|l| l.id.as_str()),
            "statement lines",
        )?;
        validate_unique_ids(
            self.revenue_records
                .iter()
                .chain(revenue_records.iter())
                .map(|r| r.id.as_str()),
            "revenue records",
        )?;

        self.statement_lines.extend(statement_lines);
        self.revenue_records.extend(revenue_records);
        Ok(())
    }

    fn entry(&self, index: usize) -> FinanceResult<&CandidateEntry> {
        self.entries.get(index).ok_or(FinanceError::InvalidIndex {
            index,
            len: self.entries.len(),
        })
    }

    fn ensure_proposed(&self, index: usize) -> FinanceResult<()> {
        let entry = self.entry(index)?;
        if entry.status.is_terminal() {
            return Err(FinanceError::AlreadyDecided {
                index,
                status: entry.status,
            });
        }
        Ok(())
    }
}
