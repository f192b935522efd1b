//! Document-level batch coordination.
//!
//! ```text
//! Idle → Resolving{group} → Assembling → Validating → Reported
//! ```
//!
//! Every candidate group yields exactly one (record, report) entry, in input
//! order. A group that fails validation never stops the groups after it.
//! Resolution and validation are pure and may fan out over rayon; assembly
//! stays sequential so IDs follow input order.

use std::sync::Arc;

use pgxanno_core::{
    AnnotationRecord, BatchEntry, CandidateGroup, DocumentBatch, DocumentInput,
    ResolvedAnnotation, ValidationReport, Verdict, Vocabulary,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::assemble::{SequenceCounter, assemble};
use crate::config::EngineConfig;
use crate::resolve::resolve_group;
use crate::validate::validate;

/// Coordinator state. `Reported` is terminal until the next `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    /// Index of the group being resolved. With parallel resolution all
    /// groups are in flight and this holds the first index.
    Resolving { group: usize },
    Assembling,
    Validating,
    Reported,
}

impl BatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resolving { .. } => "resolving",
            Self::Assembling => "assembling",
            Self::Validating => "validating",
            Self::Reported => "reported",
        }
    }
}

/// Drives resolve → assemble → validate over one document at a time.
pub struct BatchCoordinator {
    vocab: Arc<Vocabulary>,
    config: EngineConfig,
    state: BatchState,
}

impl BatchCoordinator {
    pub fn new(vocab: Arc<Vocabulary>, config: EngineConfig) -> Self {
        Self {
            vocab,
            config,
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process every candidate group in `input`.
    ///
    /// IDs start at 1 for each document.
    pub fn process(&mut self, input: &DocumentInput) -> DocumentBatch {
        self.transition(BatchState::Idle);

        let resolved = self.resolve_all(&input.groups);

        self.transition(BatchState::Assembling);
        let counter = SequenceCounter::new();
        let records: Vec<AnnotationRecord> = resolved
            .into_iter()
            .map(|r| assemble(r, &counter))
            .collect();

        self.transition(BatchState::Validating);
        let reports: Vec<ValidationReport> = if self.config.parallel {
            records.par_iter().map(validate).collect()
        } else {
            records.iter().map(validate).collect()
        };

        let entries: Vec<BatchEntry> = records
            .into_iter()
            .zip(reports)
            .map(|(record, report)| {
                if report.verdict() == Verdict::HardFail {
                    warn!(
                        record_id = record.id(),
                        failed = ?report.failed_checks(),
                        "record failed hard validation"
                    );
                }
                BatchEntry { record, report }
            })
            .collect();

        let batch = DocumentBatch::new(entries);
        self.transition(BatchState::Reported);

        let s = batch.summary;
        info!(
            pmid = input.groups.first().and_then(|g| g.pmid.as_deref()).unwrap_or("-"),
            groups = s.total,
            passed = s.passed,
            soft_failed = s.soft_failed,
            hard_failed = s.hard_failed,
            "document processed"
        );
        batch
    }

    fn resolve_all(&mut self, groups: &[CandidateGroup]) -> Vec<ResolvedAnnotation> {
        let vocab = Arc::clone(&self.vocab);
        let config = self.config;

        if config.parallel {
            self.transition(BatchState::Resolving { group: 0 });
            return groups
                .par_iter()
                .map(|g| resolve_group(g, &vocab, &config))
                .collect();
        }

        let mut out = Vec::with_capacity(groups.len());
        for (i, g) in groups.iter().enumerate() {
            self.transition(BatchState::Resolving { group: i });
            out.push(resolve_group(g, &vocab, &config));
        }
        out
    }

    fn transition(&mut self, next: BatchState) {
        debug!(from = self.state.as_str(), to = next.as_str(), "batch state");
        self.state = next;
    }
}
