//! Integration tests for the Diesel adapters against embedded PostgreSQL.
//!
//! Each test clones a freshly migrated database from the shared
//! `pg-embedded-setup-unpriv` cluster. Set `SKIP_TEST_CLUSTER=1` where the
//! PostgreSQL binaries are unavailable.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use registrar::domain::ports::{
    RegistrationSequence, UserCountSource, UserPersistenceError, UserRepository,
};
use registrar::domain::{
    AssignedCode, DisplayName, FallbackCode, RegistrationCode, Role, User, UserId,
};
use registrar::outbound::persistence::{
    DbPool, DieselRegistrationSequence, DieselUserRepository, PoolConfig,
};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::atexit_cleanup::shared_cluster_handle;
use support::embedded_postgres::execute_sql;
use support::{handle_cluster_setup_failure, provision_template_database};

struct TestContext {
    runtime: Runtime,
    users: DieselUserRepository,
    sequence: DieselRegistrationSequence,
    database_url: String,
    _database: TemporaryDatabase,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let temp_db = provision_template_database(cluster)?;
    let database_url = temp_db.url().to_string();

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        users: DieselUserRepository::new(pool.clone()),
        sequence: DieselRegistrationSequence::new(pool),
        database_url,
        _database: temp_db,
    })
}

#[fixture]
fn context() -> Option<TestContext> {
    match setup_context() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn user(code: RegistrationCode, minutes_ago: i64) -> User {
    // PostgreSQL keeps microseconds; truncate so round trips compare equal.
    let created_at = Utc::now() - Duration::minutes(minutes_ago);
    let created_at =
        DateTime::from_timestamp_millis(created_at.timestamp_millis()).expect("valid timestamp");
    User::new(
        UserId::random(),
        DisplayName::new("Diesel Test User").expect("valid name"),
        Role::Teacher,
        code,
        created_at,
    )
}

#[rstest]
fn users_round_trip_and_count(context: Option<TestContext>) {
    let Some(context) = context else {
        eprintln!("SKIP-TEST-CLUSTER: users_round_trip_and_count skipped");
        return;
    };
    let alice = user(AssignedCode::for_count(0).into(), 0);

    context.runtime.block_on(async {
        context.users.insert(&alice).await.expect("insert");
        let found = context
            .users
            .find_by_id(alice.id())
            .await
            .expect("find")
            .expect("present");

        assert_eq!(found, alice);
        assert_eq!(context.users.count_users().await.expect("count"), 1);
        assert!(
            context
                .users
                .find_by_id(&UserId::random())
                .await
                .expect("find")
                .is_none()
        );
    });
}

#[rstest]
fn duplicate_ids_are_reported(context: Option<TestContext>) {
    let Some(context) = context else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_ids_are_reported skipped");
        return;
    };
    let alice = user(AssignedCode::for_count(0).into(), 0);

    let err = context.runtime.block_on(async {
        context.users.insert(&alice).await.expect("insert");
        context.users.insert(&alice).await.expect_err("duplicate")
    });

    assert!(matches!(err, UserPersistenceError::Duplicate { .. }));
}

#[rstest]
fn sequence_hands_out_unique_ordinals(context: Option<TestContext>) {
    let Some(context) = context else {
        eprintln!("SKIP-TEST-CLUSTER: sequence_hands_out_unique_ordinals skipped");
        return;
    };

    let ordinals = context
        .runtime
        .block_on(join_all((0..32).map(|_| context.sequence.next_ordinal())));
    let unique: HashSet<i64> = ordinals
        .into_iter()
        .map(|ordinal| ordinal.expect("ordinal"))
        .collect();

    assert_eq!(unique.len(), 32);
    assert_eq!(unique.iter().min(), Some(&1));
    assert_eq!(unique.iter().max(), Some(&32));
}

#[rstest]
fn sequence_continues_after_counted_registrations(context: Option<TestContext>) {
    let Some(context) = context else {
        eprintln!("SKIP-TEST-CLUSTER: sequence_continues_after_counted_registrations skipped");
        return;
    };

    let (first, second) = context.runtime.block_on(async {
        for count in 0..5 {
            let counted = user(AssignedCode::for_count(count).into(), 0);
            context.users.insert(&counted).await.expect("insert");
        }
        let first = context.sequence.next_ordinal().await.expect("ordinal");
        let second = context.sequence.next_ordinal().await.expect("ordinal");
        (first, second)
    });

    assert_eq!(first, 6);
    assert_eq!(second, 7);
}

#[rstest]
fn sequence_never_moves_backwards(context: Option<TestContext>) {
    let Some(context) = context else {
        eprintln!("SKIP-TEST-CLUSTER: sequence_never_moves_backwards skipped");
        return;
    };
    execute_sql(
        &context.database_url,
        "UPDATE registration_sequence SET last_ordinal = 40 WHERE id = 1",
    )
    .expect("advance counter");

    let ordinal = context.runtime.block_on(async {
        let counted = user(AssignedCode::for_count(0).into(), 0);
        context.users.insert(&counted).await.expect("insert");
        context.sequence.next_ordinal().await.expect("ordinal")
    });

    assert_eq!(ordinal, 41);
}

#[rstest]
fn fallback_holders_are_listed_counted_and_replaced(context: Option<TestContext>) {
    let Some(context) = context else {
        eprintln!("SKIP-TEST-CLUSTER: fallback_holders_are_listed_counted_and_replaced skipped");
        return;
    };
    let now = Utc::now();
    let older: RegistrationCode = FallbackCode::new(now - Duration::minutes(10)).into();
    let newer: RegistrationCode = FallbackCode::new(now).into();
    let first = user(older, 10);
    let second = user(newer, 1);
    let settled = user(AssignedCode::for_count(3).into(), 20);
    let replacement: RegistrationCode = AssignedCode::for_count(4).into();

    context.runtime.block_on(async {
        for entry in [&second, &settled, &first] {
            context.users.insert(entry).await.expect("insert");
        }

        let listed = context
            .users
            .list_with_fallback_codes(10)
            .await
            .expect("list");
        assert_eq!(listed, vec![first.clone(), second.clone()]);
        assert_eq!(
            context
                .users
                .list_with_fallback_codes(1)
                .await
                .expect("list"),
            vec![first.clone()]
        );
        assert_eq!(
            context
                .users
                .count_with_fallback_codes()
                .await
                .expect("count"),
            2
        );

        assert!(
            context
                .users
                .replace_registration_code(first.id(), &older, &replacement)
                .await
                .expect("swap")
        );
        assert!(
            !context
                .users
                .replace_registration_code(first.id(), &older, &replacement)
                .await
                .expect("stale swap")
        );

        let remaining = context
            .users
            .list_with_fallback_codes(10)
            .await
            .expect("list");
        assert_eq!(remaining, vec![second]);
        assert_eq!(
            context
                .users
                .count_with_fallback_codes()
                .await
                .expect("count"),
            1
        );
    });
}
