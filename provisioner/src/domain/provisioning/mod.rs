//! Bulk user provisioning from a roster.
//!
//! Steps run in order, and the items inside each step are submitted
//! concurrently:
//! - create one user per roster entry;
//! - create a global placeholder for every variable name;
//! - create each created user's own variables;
//! - resolve restriction targets against the data catalogue, then create
//!   the restrictions.
//!
//! Individual submissions are best-effort and recorded in the
//! [`RunReport`]. Token acquisition, catalogue collection, and restriction
//! lookup are fatal.

use std::sync::Arc;

use futures_util::future::join_all;
use roster::Roster;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::ports::{CreatedUser, DashboardApi, NewRestriction};
use crate::domain::{AccessToken, ItemOutcome, NewVariable, RunReport, Stage, UserId, WorkflowError};

mod catalogue;
mod password;
mod payloads;

pub use catalogue::{CatalogueConnection, DataCatalogue, RestrictionLookupError};
pub use password::{PASSWORD_CHARSET, PASSWORD_LENGTH, generate_password};
pub use payloads::{
    MatchedEntry, PendingRestriction, global_placeholders, match_created, pending_restrictions,
    user_requests, user_variables,
};

/// Default parent for created users: the dashboard's super administrator.
pub const DEFAULT_PARENT_ID: UserId = UserId::new(1);

/// Knobs for one provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningConfig {
    /// Parent assigned to every created user.
    pub parent_id: UserId,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            parent_id: DEFAULT_PARENT_ID,
        }
    }
}

/// A provisioning run that hit a fatal error part-way through.
///
/// Users and variables submitted before the failure stay on the dashboard;
/// `report` lists their outcomes so callers can still summarise them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provisioning stopped after {} recorded outcomes: {error}", recorded(.report))]
pub struct ProvisioningAborted {
    /// Outcomes recorded before the failure.
    pub report: RunReport,
    /// Fatal error that stopped the run.
    pub error: WorkflowError,
}

/// Domain service that creates users, variables, and restrictions.
#[derive(Clone)]
pub struct UserProvisioner {
    api: Arc<dyn DashboardApi>,
}

impl UserProvisioner {
    /// Create a provisioner over the given dashboard port.
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api }
    }

    /// Provision everything described by `roster`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisioningAborted`] when a fatal step fails. Its `error`
    /// is [`WorkflowError::Authentication`] when no token is issued,
    /// [`WorkflowError::CatalogueFetch`] when the catalogue cannot be read,
    /// or [`WorkflowError::RestrictionLookup`] when any restriction target
    /// is unknown; in the last case no restriction is submitted. Its
    /// `report` holds every outcome recorded before the failure.
    pub async fn run(
        &self,
        roster: &Roster,
        config: ProvisioningConfig,
    ) -> Result<RunReport, ProvisioningAborted> {
        let mut report = RunReport::default();
        match self.run_stages(roster, config, &mut report).await {
            Ok(()) => {
                info!(
                    succeeded = report.succeeded(),
                    failed = report.failed(),
                    skipped = report.skipped(),
                    "provisioning finished"
                );
                Ok(report)
            }
            Err(error) => {
                warn!(
                    error = %error,
                    recorded = report.outcomes().len(),
                    "provisioning stopped early"
                );
                Err(ProvisioningAborted { report, error })
            }
        }
    }

    async fn run_stages(
        &self,
        roster: &Roster,
        config: ProvisioningConfig,
        report: &mut RunReport,
    ) -> Result<(), WorkflowError> {
        info!("getting token");
        let token = self
            .api
            .acquire_token()
            .await
            .map_err(WorkflowError::Authentication)?;

        info!(users = roster.len(), "creating users");
        let created = self.create_users(&token, roster, config, report).await;

        info!(created = created.len(), "processing created users");
        let matched = match_created(roster, &created);
        let mut variables = Vec::new();
        let mut restrictions = Vec::new();
        for item in &matched {
            match item.user_id {
                Some(user_id) => {
                    variables.extend(
                        user_variables(user_id, item.entry)
                            .into_iter()
                            .map(|variable| (item.username, variable)),
                    );
                    restrictions.extend(pending_restrictions(item.username, user_id, item.entry));
                }
                None => record_skipped(report, item),
            }
        }

        let globals = global_placeholders(roster);
        info!(count = globals.len(), "creating global variables");
        self.create_globals(&token, &globals, report).await;

        info!(count = variables.len(), "creating user variables");
        self.create_user_variables(&token, &variables, report)
            .await;

        if !restrictions.is_empty() {
            info!("grabbing data connections");
            let catalogue = DataCatalogue::collect(self.api.as_ref(), &token)
                .await
                .map_err(WorkflowError::CatalogueFetch)?;
            let resolved = resolve_restrictions(&catalogue, &restrictions)?;

            info!(count = resolved.len(), "creating user restrictions");
            self.create_restrictions(&token, &restrictions, &resolved, report)
                .await;
        }
        Ok(())
    }

    async fn create_users(
        &self,
        token: &AccessToken,
        roster: &Roster,
        config: ProvisioningConfig,
        report: &mut RunReport,
    ) -> Vec<CreatedUser> {
        let requests = user_requests(roster, config.parent_id, &mut rand::rng());
        let results = join_all(
            requests
                .iter()
                .map(|request| self.api.create_user(token, request)),
        )
        .await;

        let mut created = Vec::with_capacity(results.len());
        for (request, result) in requests.iter().zip(results) {
            match result {
                Ok(user) => {
                    report.push(ItemOutcome::succeeded(Stage::CreateUser, &request.usercode));
                    created.push(user);
                }
                Err(error) => {
                    warn!(usercode = %request.usercode, error = %error, "failed to create user");
                    report.push(ItemOutcome::failed(
                        Stage::CreateUser,
                        &request.usercode,
                        error,
                    ));
                }
            }
        }
        created
    }

    async fn create_globals(
        &self,
        token: &AccessToken,
        globals: &[NewVariable],
        report: &mut RunReport,
    ) {
        let results = join_all(
            globals
                .iter()
                .map(|variable| self.api.create_global_variable(token, variable)),
        )
        .await;
        for (variable, result) in globals.iter().zip(results) {
            if let Err(error) = &result {
                warn!(name = %variable.name, error = %error, "failed to create global variable");
            }
            report.push(ItemOutcome::from_result(
                Stage::GlobalVariable,
                &variable.name,
                &result,
            ));
        }
    }

    async fn create_user_variables(
        &self,
        token: &AccessToken,
        variables: &[(&str, NewVariable)],
        report: &mut RunReport,
    ) {
        let results = join_all(
            variables
                .iter()
                .map(|(_, variable)| self.api.create_user_variable(token, variable)),
        )
        .await;
        for ((username, variable), result) in variables.iter().zip(results) {
            if let Err(error) = &result {
                warn!(
                    usercode = %username,
                    user_id = %variable.user_id,
                    name = %variable.name,
                    error = %error,
                    "failed to create user variable"
                );
            }
            report.push(ItemOutcome::from_result(
                Stage::UserVariable,
                subject(username, &variable.name),
                &result,
            ));
        }
    }

    async fn create_restrictions(
        &self,
        token: &AccessToken,
        pending: &[PendingRestriction],
        resolved: &[NewRestriction],
        report: &mut RunReport,
    ) {
        let results = join_all(
            resolved
                .iter()
                .map(|restriction| self.api.create_restriction(token, restriction)),
        )
        .await;
        for ((origin, restriction), result) in pending.iter().zip(resolved).zip(results) {
            if let Err(error) = &result {
                warn!(
                    usercode = %origin.username,
                    column_id = restriction.column_id,
                    error = %error,
                    "failed to create restriction"
                );
            }
            report.push(ItemOutcome::from_result(
                Stage::Restriction,
                subject(&origin.username, &origin.target),
                &result,
            ));
        }
    }
}

/// Resolve every pending restriction, failing on the first unknown target.
pub fn resolve_restrictions(
    catalogue: &DataCatalogue,
    pending: &[PendingRestriction],
) -> Result<Vec<NewRestriction>, RestrictionLookupError> {
    pending
        .iter()
        .map(|restriction| {
            Ok(NewRestriction {
                user_id: restriction.user_id,
                column_id: catalogue.resolve(&restriction.target)?,
                value: restriction.value.clone(),
            })
        })
        .collect()
}

fn record_skipped(report: &mut RunReport, item: &MatchedEntry<'_>) {
    const REASON: &str = "user was not created";
    report.extend(item.entry.variables.keys().map(|name| {
        ItemOutcome::skipped(Stage::UserVariable, subject(item.username, name), REASON)
    }));
    report.extend(item.entry.restrictions.keys().map(|target| {
        ItemOutcome::skipped(Stage::Restriction, subject(item.username, target), REASON)
    }));
}

fn recorded(report: &RunReport) -> usize {
    report.outcomes().len()
}

fn subject(username: &str, item: &str) -> String {
    format!("{username}:{item}")
}

#[cfg(test)]
mod tests;
