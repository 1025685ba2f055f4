//! Merging validated edit proposals onto a caller's rows
//!
//! The validator only guarantees shape. This is where proposals are checked
//! against the rows the caller actually holds before anything is mutated.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::models::{CardChanges, FlashcardRow, ProposedUpdate};

/// Which cards a proposal is allowed to touch
#[derive(Debug, Clone, Default)]
pub enum UpdateScope {
    /// Any card in the row store
    #[default]
    AnyCard,
    /// Only the listed flashcard ids
    Selected(HashSet<String>),
}

impl UpdateScope {
    /// Restrict to `rows` when non-empty, otherwise allow any card.
    pub fn from_selection(rows: &[FlashcardRow]) -> Self {
        if rows.is_empty() {
            Self::AnyCard
        } else {
            Self::Selected(rows.iter().map(|r| r.flashcard_id.clone()).collect())
        }
    }

    fn allows(&self, flashcard_id: &str) -> bool {
        match self {
            Self::AnyCard => true,
            Self::Selected(ids) => ids.contains(flashcard_id),
        }
    }
}

/// Outcome of applying a batch of proposals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    /// Ids whose row was changed
    pub applied: Vec<String>,
    /// Ids with no matching row
    pub unknown: Vec<String>,
    /// Ids that exist but fall outside the scope
    pub out_of_scope: Vec<String>,
    /// Ids whose changes carried no field
    pub empty: Vec<String>,
}

impl ApplyReport {
    pub fn has_rejections(&self) -> bool {
        !self.unknown.is_empty() || !self.out_of_scope.is_empty()
    }
}

/// Apply proposals in order, merging only the fields each one carries.
///
/// Later proposals for the same card win field by field.
pub fn apply_updates(
    rows: &mut [FlashcardRow],
    updates: &[ProposedUpdate],
    scope: &UpdateScope,
) -> ApplyReport {
    let index: HashMap<String, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row.flashcard_id.clone(), i))
        .collect();

    let mut report = ApplyReport::default();

    for update in updates {
        let id = &update.flashcard_id;

        let Some(&pos) = index.get(id) else {
            log::warn!("Proposed update references unknown flashcard {}", id);
            report.unknown.push(id.clone());
            continue;
        };

        if !scope.allows(id) {
            log::warn!("Proposed update for flashcard {} is outside the selection", id);
            report.out_of_scope.push(id.clone());
            continue;
        }

        if update.changes.is_empty() {
            report.empty.push(id.clone());
            continue;
        }

        merge_changes(&mut rows[pos], &update.changes);
        if !report.applied.contains(id) {
            report.applied.push(id.clone());
        }
    }

    log::info!(
        "Applied {} update(s), {} unknown, {} out of scope",
        report.applied.len(),
        report.unknown.len(),
        report.out_of_scope.len()
    );

    report
}

fn merge_changes(row: &mut FlashcardRow, changes: &CardChanges) {
    if let Some(front) = &changes.front {
        row.front = front.clone();
    }
    if let Some(back) = &changes.back {
        row.back = back.clone();
    }
    if let Some(difficulty) = &changes.difficulty {
        row.difficulty = Some(difficulty.clone());
    }
}
