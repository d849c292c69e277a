use serde::Serialize;

use crate::models::ComputedOperation;
use crate::proposal::{format_proposal, grand_total};

/// Operations an agent has simulated for one customer, in the order they were
/// added.
///
/// The draft does not deduplicate or reorder. The proposal lists operations
/// in exactly this order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProposalDraft {
    operations: Vec<ComputedOperation>,
}

impl ProposalDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `operation` and returns its index.
    pub fn push(&mut self, operation: ComputedOperation) -> usize {
        self.operations.push(operation);
        self.operations.len() - 1
    }

    /// Removes the operation at `index`, shifting later ones down.
    /// Out-of-range indexes leave the draft untouched.
    pub fn remove(&mut self, index: usize) -> Option<ComputedOperation> {
        if index < self.operations.len() {
            Some(self.operations.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[ComputedOperation] {
        &self.operations
    }

    pub fn total_released(&self) -> f64 {
        grand_total(&self.operations)
    }

    /// Proposal text for the current operations, or `None` while empty.
    pub fn preview(&self, acceptance_link: &str) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(format_proposal(&self.operations, acceptance_link))
    }
}
