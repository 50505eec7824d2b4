//! Test utilities for the provisioner crate.
//!
//! Only compiled for unit tests.

pub mod dashboard {
    //! In-memory dashboard used by the workflow tests.
    //!
    //! Reads come from fixtures set up front; writes are recorded in call
    //! order so tests can assert on exactly what a workflow submitted.

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use crate::domain::ports::{
        Column, CreatedUser, DashboardApi, DashboardApiError, DataConnection, NewRestriction,
        NewUser, Table,
    };
    use crate::domain::{AccessToken, NewVariable, UserId, UserRecord, Variable};

    pub const TOKEN: &str = "test-token";

    #[derive(Default)]
    pub struct FakeDashboard {
        pub users: Vec<UserRecord>,
        pub variables: HashMap<UserId, Vec<Variable>>,
        pub fail_token: bool,
        pub fail_fetch_for: HashSet<UserId>,
        pub fail_writes_for: HashSet<UserId>,
        pub reject_usercodes: HashSet<String>,
        pub assigned_ids: HashMap<String, i64>,
        pub connections: Vec<DataConnection>,
        pub tables: HashMap<i64, Vec<Table>>,
        pub columns: HashMap<(i64, i64), Vec<Column>>,
        pub fail_catalogue: bool,
        pub fail_restrictions_for: HashSet<UserId>,
        next_id: AtomicI64,
        pub catalogue_calls: AtomicUsize,
        pub written: Mutex<Vec<NewVariable>>,
        pub globals: Mutex<Vec<NewVariable>>,
        pub created_users: Mutex<Vec<NewUser>>,
        pub restrictions: Mutex<Vec<NewRestriction>>,
    }

    impl FakeDashboard {
        pub fn with_users(users: Vec<UserRecord>) -> Self {
            Self {
                users,
                ..Self::default()
            }
        }

        pub fn define(mut self, user_id: i64, variables: &[(&str, &str)]) -> Self {
            self.variables.insert(
                UserId::new(user_id),
                variables
                    .iter()
                    .map(|(name, value)| Variable::new(*name, *value, false))
                    .collect(),
            );
            self
        }

        pub fn fail_writes_for(mut self, user_id: i64) -> Self {
            self.fail_writes_for.insert(UserId::new(user_id));
            self
        }

        pub fn fail_fetch_for(mut self, user_id: i64) -> Self {
            self.fail_fetch_for.insert(UserId::new(user_id));
            self
        }

        pub fn with_catalogue(
            mut self,
            connection: (i64, &str),
            table_id: i64,
            columns: &[(i64, &str)],
        ) -> Self {
            self.connections.push(DataConnection {
                id: connection.0,
                name: connection.1.to_owned(),
            });
            self.tables.entry(connection.0).or_default().push(Table {
                id: table_id,
                name: format!("table-{table_id}"),
            });
            self.columns.insert(
                (connection.0, table_id),
                columns
                    .iter()
                    .map(|(id, display_name)| Column {
                        id: *id,
                        display_name: (*display_name).to_owned(),
                    })
                    .collect(),
            );
            self
        }

        pub fn written(&self) -> Vec<NewVariable> {
            self.written.lock().expect("written mutex").clone()
        }

        pub fn globals(&self) -> Vec<NewVariable> {
            self.globals.lock().expect("globals mutex").clone()
        }

        pub fn created_users(&self) -> Vec<NewUser> {
            self.created_users.lock().expect("users mutex").clone()
        }

        pub fn restrictions(&self) -> Vec<NewRestriction> {
            self.restrictions.lock().expect("restrictions mutex").clone()
        }

        fn check(token: &AccessToken) -> Result<(), DashboardApiError> {
            if token.expose() == TOKEN {
                Ok(())
            } else {
                Err(DashboardApiError::unauthorized("unexpected token"))
            }
        }

        fn catalogue_guard(&self) -> Result<(), DashboardApiError> {
            self.catalogue_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_catalogue {
                Err(DashboardApiError::rejected(500_u16, "catalogue offline"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl DashboardApi for FakeDashboard {
        async fn acquire_token(&self) -> Result<AccessToken, DashboardApiError> {
            if self.fail_token {
                return Err(DashboardApiError::unauthorized("bad credentials"));
            }
            Ok(AccessToken::new(TOKEN))
        }

        async fn list_users(
            &self,
            token: &AccessToken,
        ) -> Result<Vec<UserRecord>, DashboardApiError> {
            Self::check(token)?;
            Ok(self.users.clone())
        }

        async fn list_user_variables(
            &self,
            token: &AccessToken,
            user_id: UserId,
        ) -> Result<Vec<Variable>, DashboardApiError> {
            Self::check(token)?;
            if self.fail_fetch_for.contains(&user_id) {
                return Err(DashboardApiError::rejected(500_u16, "variables unavailable"));
            }
            Ok(self.variables.get(&user_id).cloned().unwrap_or_default())
        }

        async fn create_user_variable(
            &self,
            token: &AccessToken,
            variable: &NewVariable,
        ) -> Result<(), DashboardApiError> {
            Self::check(token)?;
            if self.fail_writes_for.contains(&variable.user_id) {
                return Err(DashboardApiError::rejected(409_u16, "variable exists"));
            }
            self.written
                .lock()
                .expect("written mutex")
                .push(variable.clone());
            Ok(())
        }

        async fn create_global_variable(
            &self,
            token: &AccessToken,
            variable: &NewVariable,
        ) -> Result<(), DashboardApiError> {
            Self::check(token)?;
            self.globals
                .lock()
                .expect("globals mutex")
                .push(variable.clone());
            Ok(())
        }

        async fn create_user(
            &self,
            token: &AccessToken,
            user: &NewUser,
        ) -> Result<CreatedUser, DashboardApiError> {
            Self::check(token)?;
            if self.reject_usercodes.contains(&user.usercode) {
                return Err(DashboardApiError::rejected(400_u16, "usercode taken"));
            }
            self.created_users
                .lock()
                .expect("users mutex")
                .push(user.clone());
            let id = self
                .assigned_ids
                .get(&user.usercode)
                .copied()
                .unwrap_or_else(|| 1_000 + self.next_id.fetch_add(1, Ordering::SeqCst));
            Ok(CreatedUser {
                id: UserId::new(id),
                usercode: user.usercode.to_uppercase(),
            })
        }

        async fn create_restriction(
            &self,
            token: &AccessToken,
            restriction: &NewRestriction,
        ) -> Result<(), DashboardApiError> {
            Self::check(token)?;
            if self.fail_restrictions_for.contains(&restriction.user_id) {
                return Err(DashboardApiError::rejected(422_u16, "restriction refused"));
            }
            self.restrictions
                .lock()
                .expect("restrictions mutex")
                .push(restriction.clone());
            Ok(())
        }

        async fn list_data_connections(
            &self,
            token: &AccessToken,
        ) -> Result<Vec<DataConnection>, DashboardApiError> {
            Self::check(token)?;
            self.catalogue_guard()?;
            Ok(self.connections.clone())
        }

        async fn list_tables(
            &self,
            token: &AccessToken,
            connection_id: i64,
        ) -> Result<Vec<Table>, DashboardApiError> {
            Self::check(token)?;
            self.catalogue_guard()?;
            Ok(self.tables.get(&connection_id).cloned().unwrap_or_default())
        }

        async fn list_columns(
            &self,
            token: &AccessToken,
            connection_id: i64,
            table_id: i64,
        ) -> Result<Vec<Column>, DashboardApiError> {
            Self::check(token)?;
            self.catalogue_guard()?;
            Ok(self
                .columns
                .get(&(connection_id, table_id))
                .cloned()
                .unwrap_or_default())
        }

        async fn export_chart(
            &self,
            token: &AccessToken,
            chart_id: u64,
        ) -> Result<Value, DashboardApiError> {
            Self::check(token)?;
            Ok(json!({ "chartId": chart_id }))
        }
    }
}
