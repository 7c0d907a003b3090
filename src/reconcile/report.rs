//! Per-run results: which entities converged, which failed, what was
//! committed. Partial failure is a first-class outcome, never swallowed.

use super::commit::CommitReport;
use super::error::MutationError;
use super::planner::Plan;

/// The mutation kind an entity ended up needing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn from_plan(plan: &Plan) -> Self {
        match plan {
            Plan::Noop => Action::None,
            Plan::Create { .. } => Action::Create,
            Plan::Update { .. } => Action::Update,
            Plan::Delete => Action::Delete,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::None => "none",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// One entity's result within a run.
#[derive(Debug)]
pub struct EntityOutcome {
    pub resource: &'static str,
    pub id: String,
    pub action: Action,
    pub error: Option<MutationError>,
}

impl EntityOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// The result of one reconciliation run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<EntityOutcome>,
    pub commits: Vec<CommitReport>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(EntityOutcome::is_success)
            && self.commits.iter().all(CommitReport::is_success)
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    /// Mutations actually applied (noops excluded, failures excluded).
    pub fn changed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.is_success() && o.action != Action::None)
            .count()
    }
}
