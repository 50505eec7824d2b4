//! Variable cascade workflow.
//!
//! The run is four strictly ordered phases:
//! - build the user tree under the configured root;
//! - fetch every node's variables (a full pre-pass, any failure is fatal);
//! - resolve each node's missing variables top-down;
//! - write the missing variables back, depth-first, one node at a time.
//!
//! The write phase is best-effort: a failed node is recorded in the
//! [`RunReport`] and the walk still descends into its children.

use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::{debug, info, warn};

use crate::domain::ports::DashboardApi;
use crate::domain::{
    AccessToken, ItemOutcome, NewVariable, NodeId, RunReport, Stage, UserId, UserTree,
    VariableConflict, WorkflowError,
};

mod resolver;

pub use resolver::resolve_missing_variables;

/// Knobs for one cascade run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeOptions {
    /// Resolve and report without writing anything back.
    pub dry_run: bool,
}

/// Result of a completed cascade run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Tree with fetched and resolved variables on every node.
    pub tree: UserTree,
    /// One outcome per node that had missing variables.
    pub report: RunReport,
    /// Same-name disagreements collapsed during resolution.
    pub conflicts: Vec<VariableConflict>,
}

/// Domain service that cascades inherited variables down a user hierarchy.
#[derive(Clone)]
pub struct VariableCascade {
    api: Arc<dyn DashboardApi>,
}

impl VariableCascade {
    /// Create a cascade over the given dashboard port.
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api }
    }

    /// Run the whole cascade for the subtree rooted at `root_user_id`.
    ///
    /// # Errors
    ///
    /// Token acquisition, user listing, hierarchy construction, and any
    /// variable fetch are fatal. Write failures are not; they appear in
    /// [`CascadeOutcome::report`].
    pub async fn run(
        &self,
        root_user_id: UserId,
        options: CascadeOptions,
    ) -> Result<CascadeOutcome, WorkflowError> {
        info!("getting token");
        let token = self
            .api
            .acquire_token()
            .await
            .map_err(WorkflowError::Authentication)?;

        info!(root_user_id = %root_user_id, "organising users into a hierarchy");
        let mut tree = self.build_tree(&token, root_user_id).await?;

        info!(users = tree.len(), "fetching variables");
        self.fetch_variables(&token, &mut tree).await?;

        info!("finding missing variables in descendants");
        let conflicts = resolve_missing_variables(&mut tree);

        info!(dry_run = options.dry_run, "updating variables");
        let report = self.write_missing_variables(&token, &tree, options).await;

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped(),
            "cascade finished"
        );
        Ok(CascadeOutcome {
            tree,
            report,
            conflicts,
        })
    }

    /// List all users and arrange the ones under `root_user_id` into a tree.
    pub async fn build_tree(
        &self,
        token: &AccessToken,
        root_user_id: UserId,
    ) -> Result<UserTree, WorkflowError> {
        let users = self
            .api
            .list_users(token)
            .await
            .map_err(WorkflowError::UserListing)?;
        Ok(UserTree::build(users, root_user_id)?)
    }

    /// Populate the variables of every node. Fetches run concurrently.
    pub async fn fetch_variables(
        &self,
        token: &AccessToken,
        tree: &mut UserTree,
    ) -> Result<(), WorkflowError> {
        let targets: Vec<(NodeId, UserId)> = tree
            .breadth_first()
            .map(|id| (id, tree.node(id).id()))
            .collect();

        let fetched = try_join_all(targets.into_iter().map(|(node, user_id)| async move {
            let variables = self
                .api
                .list_user_variables(token, user_id)
                .await
                .map_err(|source| WorkflowError::VariableFetch { user_id, source })?;
            debug!(user_id = %user_id, count = variables.len(), "fetched variables");
            Ok::<_, WorkflowError>((node, variables))
        }))
        .await?;

        for (node, variables) in fetched {
            tree.set_variables(node, variables);
        }
        Ok(())
    }

    /// Submit every node's missing variables, depth-first.
    ///
    /// Entries for one node are written sequentially in resolution order.
    /// The first failure stops that node's batch; siblings and descendants
    /// are still processed.
    pub async fn write_missing_variables(
        &self,
        token: &AccessToken,
        tree: &UserTree,
        options: CascadeOptions,
    ) -> RunReport {
        let mut report = RunReport::default();
        for id in tree.depth_first() {
            let node = tree.node(id);
            let missing = node.missing_variables();
            if missing.is_empty() {
                continue;
            }

            if options.dry_run {
                for variable in missing {
                    let value = if variable.is_secure {
                        "<redacted>"
                    } else {
                        variable.value.as_str()
                    };
                    info!(
                        usercode = node.usercode(),
                        name = %variable.name,
                        value,
                        "dry run: would apply missing variable"
                    );
                }
                report.push(ItemOutcome::skipped(
                    Stage::CascadeVariables,
                    node.usercode(),
                    "dry run",
                ));
                continue;
            }

            info!(
                usercode = node.usercode(),
                count = missing.len(),
                "applying missing variables"
            );
            let mut result = Ok(());
            for variable in missing {
                let request = NewVariable::inherited(node.id(), variable);
                if let Err(error) = self.api.create_user_variable(token, &request).await {
                    warn!(
                        usercode = node.usercode(),
                        name = %variable.name,
                        error = %error,
                        "failed to apply missing variable"
                    );
                    result = Err(error);
                    break;
                }
            }
            report.push(ItemOutcome::from_result(
                Stage::CascadeVariables,
                node.usercode(),
                &result,
            ));
        }
        report
    }
}
