//! Unit tests for the provisioning workflow.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use roster::Roster;
use rstest::{fixture, rstest};

use super::{ProvisioningConfig, RestrictionLookupError, UserProvisioner};
use crate::domain::ports::NewRestriction;
use crate::domain::{ItemStatus, NewVariable, Stage, UserId, WorkflowError};
use crate::test_support::dashboard::FakeDashboard;

fn roster(json: &str) -> Roster {
    Roster::from_json(json).expect("roster parses")
}

#[fixture]
fn alice_and_bob() -> Roster {
    roster(
        r#"{
            "alice": {
                "email": "alice@example.com",
                "forenames": "Alice",
                "surnames": "Liddell",
                "type": "User",
                "variables": { "theme": "dark" }
            },
            "bob": {
                "email": "bob@example.com",
                "forenames": "Bob",
                "surnames": "Builder",
                "type": "Chart Explorer"
            }
        }"#,
    )
}

#[fixture]
fn with_restrictions() -> Roster {
    roster(
        r#"{
            "carol": {
                "email": "carol@example.com",
                "forenames": "Carol",
                "surnames": "Danvers",
                "type": "User",
                "restrictions": { "Sales.Region": "North", "Sales.Channel": "Online" }
            }
        }"#,
    )
}

fn dashboard() -> FakeDashboard {
    let mut api = FakeDashboard::default();
    api.assigned_ids.insert("alice".to_owned(), 11);
    api.assigned_ids.insert("bob".to_owned(), 12);
    api.assigned_ids.insert("carol".to_owned(), 13);
    api.with_catalogue((5, "Sales"), 50, &[(500, "Region"), (501, "Channel")])
}

#[rstest]
#[tokio::test]
async fn single_variable_yields_one_global_and_one_user_variable(alice_and_bob: Roster) {
    let api = Arc::new(dashboard());
    let provisioner = UserProvisioner::new(api.clone());

    let report = provisioner
        .run(&alice_and_bob, ProvisioningConfig::default())
        .await
        .expect("provisioning succeeds");

    assert_eq!(
        api.globals(),
        vec![NewVariable {
            user_id: UserId::GLOBAL,
            name: "theme".to_owned(),
            value: "to be defined".to_owned(),
            is_secure: None,
        }]
    );
    assert_eq!(
        api.written(),
        vec![NewVariable {
            user_id: UserId::new(11),
            name: "theme".to_owned(),
            value: "dark".to_owned(),
            is_secure: None,
        }]
    );
    assert!(report.is_clean());
    assert_eq!(report.for_stage(Stage::CreateUser).count(), 2);
    assert_eq!(api.catalogue_calls.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test]
async fn created_users_carry_parent_and_type(alice_and_bob: Roster) {
    let api = Arc::new(dashboard());
    let provisioner = UserProvisioner::new(api.clone());

    provisioner
        .run(
            &alice_and_bob,
            ProvisioningConfig {
                parent_id: UserId::new(7),
            },
        )
        .await
        .expect("provisioning succeeds");

    let users: Vec<(String, u8, i64)> = api
        .created_users()
        .into_iter()
        .map(|u| (u.usercode, u.user_type_id, u.parent_id.get()))
        .collect();
    assert_eq!(
        users,
        vec![("alice".to_owned(), 3, 7), ("bob".to_owned(), 2, 7)]
    );
}

#[rstest]
#[tokio::test]
async fn failed_creation_skips_that_users_items(alice_and_bob: Roster) {
    let mut api = dashboard();
    api.reject_usercodes.insert("alice".to_owned());
    let api = Arc::new(api);
    let provisioner = UserProvisioner::new(api.clone());

    let report = provisioner
        .run(&alice_and_bob, ProvisioningConfig::default())
        .await
        .expect("creation failures are not fatal");

    assert_eq!(report.failed(), 1);
    let skipped: Vec<&str> = report
        .outcomes()
        .iter()
        .filter(|o| matches!(o.status, ItemStatus::Skipped { .. }))
        .map(|o| o.subject.as_str())
        .collect();
    assert_eq!(skipped, ["alice:theme"]);
    assert!(api.written().is_empty());
    assert_eq!(api.globals().len(), 1);
}

#[rstest]
#[tokio::test]
async fn restrictions_resolve_to_column_ids(with_restrictions: Roster) {
    let api = Arc::new(dashboard());
    let provisioner = UserProvisioner::new(api.clone());

    let report = provisioner
        .run(&with_restrictions, ProvisioningConfig::default())
        .await
        .expect("provisioning succeeds");

    let mut submitted = api.restrictions();
    submitted.sort_by_key(|r| r.column_id);
    assert_eq!(
        submitted,
        vec![
            NewRestriction {
                user_id: UserId::new(13),
                column_id: 500,
                value: "North".to_owned(),
            },
            NewRestriction {
                user_id: UserId::new(13),
                column_id: 501,
                value: "Online".to_owned(),
            },
        ]
    );
    assert_eq!(report.for_stage(Stage::Restriction).count(), 2);
}

#[rstest]
#[tokio::test]
async fn unknown_connection_is_fatal_before_any_restriction(with_restrictions: Roster) {
    let mut api = FakeDashboard::default();
    api.assigned_ids.insert("carol".to_owned(), 13);
    let api = Arc::new(api.with_catalogue((6, "Marketing"), 60, &[(600, "Region")]));
    let provisioner = UserProvisioner::new(api.clone());

    let aborted = provisioner
        .run(&with_restrictions, ProvisioningConfig::default())
        .await
        .expect_err("unknown connection is fatal");

    assert_eq!(
        aborted.error,
        WorkflowError::RestrictionLookup(RestrictionLookupError::UnknownDataConnection {
            name: "Sales".to_owned()
        })
    );
    assert!(api.restrictions().is_empty());
}

#[rstest]
#[tokio::test]
async fn catalogue_failure_is_fatal(with_restrictions: Roster) {
    let mut api = dashboard();
    api.fail_catalogue = true;
    let api = Arc::new(api);

    let aborted = UserProvisioner::new(api.clone())
        .run(&with_restrictions, ProvisioningConfig::default())
        .await
        .expect_err("catalogue failure is fatal");

    assert!(matches!(aborted.error, WorkflowError::CatalogueFetch(_)));
    assert!(api.restrictions().is_empty());
    assert_eq!(aborted.report.for_stage(Stage::CreateUser).count(), 1);
    assert_eq!(aborted.report.succeeded(), 1);
}

#[rstest]
#[tokio::test]
async fn rejected_restriction_does_not_abort_siblings(with_restrictions: Roster) {
    let mut api = dashboard();
    api.fail_restrictions_for.insert(UserId::new(13));
    let api = Arc::new(api);

    let report = UserProvisioner::new(api.clone())
        .run(&with_restrictions, ProvisioningConfig::default())
        .await
        .expect("restriction failures are not fatal");

    assert_eq!(report.for_stage(Stage::Restriction).count(), 2);
    assert!(report.for_stage(Stage::Restriction).all(|o| o.is_failure()));
    assert_eq!(report.for_stage(Stage::CreateUser).filter(|o| !o.is_failure()).count(), 1);
}

#[rstest]
#[tokio::test]
async fn token_failure_is_fatal(alice_and_bob: Roster) {
    let mut api = dashboard();
    api.fail_token = true;
    let api = Arc::new(api);

    let aborted = UserProvisioner::new(api.clone())
        .run(&alice_and_bob, ProvisioningConfig::default())
        .await
        .expect_err("token failure is fatal");

    assert!(matches!(aborted.error, WorkflowError::Authentication(_)));
    assert!(aborted.report.outcomes().is_empty());
    assert!(api.created_users().is_empty());
}

#[rstest]
#[tokio::test]
async fn fatal_lookup_keeps_outcomes_of_earlier_stages() {
    let roster = roster(
        r#"{
            "alice": {
                "email": "alice@example.com",
                "type": "User",
                "variables": { "theme": "dark" },
                "restrictions": { "Finance.Region": "North" }
            }
        }"#,
    );
    let api = Arc::new(dashboard());

    let aborted = UserProvisioner::new(api.clone())
        .run(&roster, ProvisioningConfig::default())
        .await
        .expect_err("unknown connection is fatal");

    assert!(matches!(aborted.error, WorkflowError::RestrictionLookup(_)));
    let stages: Vec<Stage> = aborted.report.outcomes().iter().map(|o| o.stage).collect();
    assert_eq!(
        stages,
        [Stage::CreateUser, Stage::GlobalVariable, Stage::UserVariable]
    );
    assert!(aborted.report.is_clean());
    assert_eq!(api.written().len(), 1);
    assert!(api.restrictions().is_empty());
    assert!(aborted.to_string().contains("3 recorded outcomes"));
}
