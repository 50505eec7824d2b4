//! Chart export.

use serde_json::Value;
use tracing::info;

use super::WorkflowError;
use super::ports::DashboardApi;

/// Fetch the JSON definition of one chart.
///
/// # Errors
///
/// Returns [`WorkflowError::Authentication`] when no token is issued and
/// [`WorkflowError::ChartExport`] when the export call fails.
pub async fn export_chart(api: &dyn DashboardApi, chart_id: u64) -> Result<Value, WorkflowError> {
    info!("getting token");
    let token = api
        .acquire_token()
        .await
        .map_err(WorkflowError::Authentication)?;
    info!(chart_id, "exporting chart");
    api.export_chart(&token, chart_id)
        .await
        .map_err(|source| WorkflowError::ChartExport { chart_id, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccessToken;
    use crate::domain::ports::{DashboardApiError, MockDashboardApi};
    use serde_json::json;

    #[tokio::test]
    async fn export_uses_issued_token() {
        let mut api = MockDashboardApi::new();
        api.expect_acquire_token()
            .times(1)
            .returning(|| Ok(AccessToken::new("tok")));
        api.expect_export_chart()
            .withf(|token, chart_id| token.expose() == "tok" && *chart_id == 17)
            .times(1)
            .returning(|_, _| Ok(json!({ "title": "Revenue" })));

        let chart = export_chart(&api, 17).await.expect("export succeeds");

        assert_eq!(chart, json!({ "title": "Revenue" }));
    }

    #[tokio::test]
    async fn export_failure_names_the_chart() {
        let mut api = MockDashboardApi::new();
        api.expect_acquire_token()
            .returning(|| Ok(AccessToken::new("tok")));
        api.expect_export_chart()
            .returning(|_, _| Err(DashboardApiError::rejected(404_u16, "no such chart")));

        let error = export_chart(&api, 3).await.expect_err("export fails");

        assert!(matches!(error, WorkflowError::ChartExport { chart_id: 3, .. }));
    }
}
