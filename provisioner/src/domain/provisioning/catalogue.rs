//! Data-connection catalogue used to resolve restriction targets.
//!
//! Restriction targets in a roster read `connectionName.columnDisplayName`.
//! The dashboard wants a numeric column id, and there is no endpoint that
//! lists columns directly, so the whole connection, table, and column tree is
//! fetched once per run.

use futures_util::future::try_join_all;
use thiserror::Error;

use crate::domain::AccessToken;
use crate::domain::ports::{Column, DashboardApi, DashboardApiError, DataConnection};

/// A restriction target that does not name a known column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestrictionLookupError {
    /// The target is not `connection.column`.
    #[error("restriction target `{target}` is not of the form connection.column")]
    MalformedTarget {
        /// Raw target.
        target: String,
    },
    /// No data connection carries the name.
    #[error("no data connection named `{name}`")]
    UnknownDataConnection {
        /// Requested connection name.
        name: String,
    },
    /// The connection has no column with the display name.
    #[error("data connection `{connection}` has no column named `{column}`")]
    UnknownColumn {
        /// Connection searched.
        connection: String,
        /// Requested column display name.
        column: String,
    },
}

/// One connection with the columns of all its tables flattened together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueConnection {
    /// Connection summary.
    pub connection: DataConnection,
    /// Columns across every table, in table then column order.
    pub columns: Vec<Column>,
}

/// Read-only snapshot of the dashboard's data connections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataCatalogue {
    connections: Vec<CatalogueConnection>,
}

impl DataCatalogue {
    /// Build a catalogue from already fetched connections.
    pub fn new(connections: Vec<CatalogueConnection>) -> Self {
        Self { connections }
    }

    /// Fetch every connection, table, and column. Requests at each level run
    /// concurrently; the first failure aborts the collection.
    pub async fn collect(
        api: &dyn DashboardApi,
        token: &AccessToken,
    ) -> Result<Self, DashboardApiError> {
        let connections = api.list_data_connections(token).await?;
        let connections = try_join_all(
            connections
                .into_iter()
                .map(|connection| collect_connection(api, token, connection)),
        )
        .await?;
        Ok(Self { connections })
    }

    /// Connections in listing order.
    pub fn connections(&self) -> &[CatalogueConnection] {
        &self.connections
    }

    /// Resolve `connectionName.columnDisplayName` to a column id.
    ///
    /// The target splits at its first `.`, so column display names may
    /// themselves contain dots. The first connection with a matching name is
    /// searched.
    ///
    /// # Examples
    /// ```
    /// use dashboard_provisioner::domain::ports::{Column, DataConnection};
    /// use dashboard_provisioner::domain::{CatalogueConnection, DataCatalogue};
    ///
    /// let catalogue = DataCatalogue::new(vec![CatalogueConnection {
    ///     connection: DataConnection { id: 1, name: "Sales".into() },
    ///     columns: vec![Column { id: 40, display_name: "Region".into() }],
    /// }]);
    /// assert_eq!(catalogue.resolve("Sales.Region"), Ok(40));
    /// assert!(catalogue.resolve("Sales").is_err());
    /// ```
    pub fn resolve(&self, target: &str) -> Result<i64, RestrictionLookupError> {
        let Some((connection_name, column_name)) = target.split_once('.') else {
            return Err(RestrictionLookupError::MalformedTarget {
                target: target.to_owned(),
            });
        };
        if connection_name.is_empty() || column_name.is_empty() {
            return Err(RestrictionLookupError::MalformedTarget {
                target: target.to_owned(),
            });
        }

        let connection = self
            .connections
            .iter()
            .find(|entry| entry.connection.name == connection_name)
            .ok_or_else(|| RestrictionLookupError::UnknownDataConnection {
                name: connection_name.to_owned(),
            })?;

        connection
            .columns
            .iter()
            .find(|column| column.display_name == column_name)
            .map(|column| column.id)
            .ok_or_else(|| RestrictionLookupError::UnknownColumn {
                connection: connection_name.to_owned(),
                column: column_name.to_owned(),
            })
    }
}

async fn collect_connection(
    api: &dyn DashboardApi,
    token: &AccessToken,
    connection: DataConnection,
) -> Result<CatalogueConnection, DashboardApiError> {
    let tables = api.list_tables(token, connection.id).await?;
    let per_table = try_join_all(
        tables
            .iter()
            .map(|table| api.list_columns(token, connection.id, table.id)),
    )
    .await?;
    Ok(CatalogueConnection {
        connection,
        columns: per_table.into_iter().flatten().collect(),
    })
}
