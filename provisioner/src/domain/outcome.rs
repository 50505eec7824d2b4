//! Per-item outcomes aggregated into a run report.
//!
//! Workflows never abort on a single failed submission. Each item instead
//! records whether it succeeded, failed, or was skipped, and the caller
//! decides what to do with the summary.

use std::fmt;

/// Workflow step an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Creating a dashboard user from the roster.
    CreateUser,
    /// Creating a global placeholder variable.
    GlobalVariable,
    /// Creating a variable on a specific user.
    UserVariable,
    /// Creating a data restriction.
    Restriction,
    /// Writing inherited variables onto one user during a cascade.
    CascadeVariables,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateUser => "create_user",
            Self::GlobalVariable => "global_variable",
            Self::UserVariable => "user_variable",
            Self::Restriction => "restriction",
            Self::CascadeVariables => "cascade_variables",
        })
    }
}

/// Result of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    /// The item was applied.
    Succeeded,
    /// The item failed; `detail` carries the underlying error.
    Failed {
        /// Rendered error.
        detail: String,
    },
    /// The item was not attempted.
    Skipped {
        /// Why the item was not attempted.
        reason: String,
    },
}

/// Outcome of one item in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    /// Workflow step.
    pub stage: Stage,
    /// Human-readable subject, such as a usercode or variable name.
    pub subject: String,
    /// What happened.
    pub status: ItemStatus,
}

impl ItemOutcome {
    /// Successful outcome.
    pub fn succeeded(stage: Stage, subject: impl Into<String>) -> Self {
        Self {
            stage,
            subject: subject.into(),
            status: ItemStatus::Succeeded,
        }
    }

    /// Failed outcome.
    pub fn failed(stage: Stage, subject: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self {
            stage,
            subject: subject.into(),
            status: ItemStatus::Failed {
                detail: detail.to_string(),
            },
        }
    }

    /// Skipped outcome.
    pub fn skipped(stage: Stage, subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stage,
            subject: subject.into(),
            status: ItemStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    /// Build from a `Result`, rendering the error as the failure detail.
    pub fn from_result<E: fmt::Display>(
        stage: Stage,
        subject: impl Into<String>,
        result: &Result<(), E>,
    ) -> Self {
        match result {
            Ok(()) => Self::succeeded(stage, subject),
            Err(error) => Self::failed(stage, subject, error),
        }
    }

    /// Whether the item failed.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, ItemStatus::Failed { .. })
    }
}

/// Ordered collection of item outcomes for one run.
///
/// # Examples
/// ```
/// use dashboard_provisioner::domain::{ItemOutcome, RunReport, Stage};
///
/// let mut report = RunReport::default();
/// report.push(ItemOutcome::succeeded(Stage::CreateUser, "ALICE"));
/// report.push(ItemOutcome::failed(Stage::CreateUser, "BOB", "status 409"));
///
/// assert_eq!(report.succeeded(), 1);
/// assert_eq!(report.failed(), 1);
/// assert!(!report.is_clean());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    outcomes: Vec<ItemOutcome>,
}

impl RunReport {
    /// Append one outcome.
    pub fn push(&mut self, outcome: ItemOutcome) {
        self.outcomes.push(outcome);
    }

    /// Append a batch of outcomes.
    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = ItemOutcome>) {
        self.outcomes.extend(outcomes);
    }

    /// Append every outcome of another report.
    pub fn merge(&mut self, other: Self) {
        self.outcomes.extend(other.outcomes);
    }

    /// All outcomes in recording order.
    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    /// Outcomes for one stage.
    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes
            .iter()
            .filter(move |outcome| outcome.stage == stage)
    }

    /// Count of successful items.
    pub fn succeeded(&self) -> usize {
        self.count(|status| matches!(status, ItemStatus::Succeeded))
    }

    /// Count of failed items.
    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, ItemStatus::Failed { .. }))
    }

    /// Count of skipped items.
    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, ItemStatus::Skipped { .. }))
    }

    /// Failed outcomes only.
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_failure())
    }

    /// Whether no item failed.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, predicate: impl Fn(&ItemStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.status))
            .count()
    }
}
