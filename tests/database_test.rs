mod common;

use std::sync::Arc;

use chrono::Duration;
use common::{fixed_time, man, wallet, woman};
use nikah_match::config::MatchingConfig;
use nikah_match::models::{
    CandidateFilter, Gender, InteractionType, MessageKind, MessagePayload, NewInteraction,
};
use nikah_match::{Database, MatchError, MatchService, SqliteRepository};
use rusqlite::Connection;
use tempfile::TempDir;

fn temp_database() -> (TempDir, Database) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_url = format!("sqlite://{}", dir.path().join("test.db").display());
    let db = Database::new(&db_url).expect("Failed to create database");
    (dir, db)
}

fn filter(gender: Gender, min: u8, max: u8, exclude: u32) -> CandidateFilter {
    CandidateFilter {
        gender,
        age_min: min,
        age_max: max,
        exclude_key: wallet(exclude),
    }
}

fn message(from: u32, to: u32, minutes: i64) -> NewInteraction {
    NewInteraction {
        sender: wallet(from),
        recipient: wallet(to),
        interaction_type: InteractionType::Message,
        message: Some(MessagePayload {
            kind: MessageKind::Text,
            content: Some(format!("message at {minutes}")),
            url: None,
        }),
        created_at: fixed_time() + Duration::minutes(minutes),
    }
}

#[test]
fn test_database_creation_and_initialization() {
    let (_dir, db) = temp_database();
    let _conn = db.get_connection().expect("Failed to get database connection");
}

#[test]
fn test_in_memory_database() {
    let db = Database::new(":memory:").expect("Failed to create database");
    let profile = man(2, 30).build();
    db.upsert_profile(&profile).expect("Failed to store profile");
    assert_eq!(db.get_profile(&wallet(2)).expect("lookup"), Some(profile));
}

#[test]
fn test_profile_round_trip() {
    let (_dir, db) = temp_database();
    let profile = woman(1, 26)
        .range(24, 30)
        .interests(&["reading", "hiking"])
        .occupation("Engineer")
        .build();

    let stored = db.upsert_profile(&profile).expect("Failed to store profile");
    assert_eq!(stored, profile);

    let fetched = db.get_profile(&wallet(1)).expect("lookup");
    assert_eq!(fetched, Some(profile));
    assert_eq!(db.get_profile(&wallet(9)).expect("lookup"), None);
}

#[test]
fn test_upsert_keeps_creation_time() {
    let (_dir, db) = temp_database();
    let original = man(2, 30).build();
    db.upsert_profile(&original).expect("insert");

    let mut changed = original.clone();
    changed.age = 31;
    changed.created_at = fixed_time() + Duration::days(10);
    let stored = db.upsert_profile(&changed).expect("update");

    assert_eq!(stored.age, 31);
    assert_eq!(stored.created_at, original.created_at);

    let fetched = db.get_profile(&wallet(2)).expect("lookup").expect("profile exists");
    assert_eq!(fetched.age, 31);
    assert_eq!(fetched.created_at, original.created_at);
}

#[test]
fn test_query_profiles_applies_filter_in_insertion_order() {
    let (_dir, db) = temp_database();
    for profile in [
        woman(1, 26).build(),
        man(5, 27).build(),
        man(3, 40).build(),
        man(4, 25).inactive().build(),
        man(2, 29).build(),
        woman(6, 28).build(),
    ] {
        db.upsert_profile(&profile).expect("insert");
    }

    let pool = db
        .query_profiles(&filter(Gender::Male, 24, 30, 1), 10)
        .expect("query");
    let keys: Vec<String> = pool.into_iter().map(|p| p.wallet_address).collect();
    assert_eq!(keys, vec![wallet(5), wallet(2)]);

    let limited = db.query_profiles(&filter(Gender::Male, 18, 60, 1), 1).expect("query");
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].wallet_address, wallet(5));
}

#[test]
fn test_query_profiles_excludes_requester() {
    let (_dir, db) = temp_database();
    db.upsert_profile(&man(2, 27).build()).expect("insert");
    db.upsert_profile(&man(3, 27).build()).expect("insert");

    let pool = db.query_profiles(&filter(Gender::Male, 18, 60, 2), 10).expect("query");
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].wallet_address, wallet(3));
}

#[test]
fn test_query_profiles_rejects_inverted_range() {
    let (_dir, db) = temp_database();
    let err = db.query_profiles(&filter(Gender::Male, 40, 20, 1), 10).unwrap_err();
    assert!(matches!(err, MatchError::Validation(_)));
}

#[test]
fn test_get_profiles_skips_unknown_keys() {
    let (_dir, db) = temp_database();
    db.upsert_profile(&man(2, 27).build()).expect("insert");
    db.upsert_profile(&man(3, 28).build()).expect("insert");

    let found = db
        .get_profiles(&[wallet(3), wallet(9), wallet(2)])
        .expect("lookup");
    assert_eq!(found.len(), 2);
    assert!(db.get_profiles(&[]).expect("lookup").is_empty());
}

#[test]
fn test_interactions_are_returned_newest_first() {
    let (_dir, db) = temp_database();

    let first = db.add_interaction(message(2, 1, 0)).expect("append");
    let second = db.add_interaction(message(3, 1, 5)).expect("append");
    db.add_interaction(message(1, 2, 7)).expect("append");
    db.add_interaction(NewInteraction {
        sender: wallet(4),
        recipient: wallet(1),
        interaction_type: InteractionType::ViewProfile,
        message: None,
        created_at: fixed_time(),
    })
    .expect("append");
    assert!(second.id > first.id);

    let received = db
        .get_interactions_by_recipient(&wallet(1), InteractionType::Message)
        .expect("query");
    let senders: Vec<String> = received.iter().map(|i| i.sender.clone()).collect();
    assert_eq!(senders, vec![wallet(3), wallet(2)]);
    assert_eq!(received[1], first);

    let views = db
        .get_interactions_by_recipient(&wallet(1), InteractionType::ViewProfile)
        .expect("query");
    assert_eq!(views.len(), 1);
    assert!(views[0].message.is_none());

    let sent = db
        .get_interactions_by_sender(&wallet(1), InteractionType::Message)
        .expect("query");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, wallet(2));
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_url = format!("sqlite:{}", dir.path().join("nested").join("match.db").display());

    {
        let db = Database::new(&db_url).expect("Failed to create database");
        db.upsert_profile(&man(2, 27).build()).expect("insert");
        db.add_interaction(message(2, 1, 0)).expect("append");
    }

    let db = Database::new(&db_url).expect("Failed to reopen database");
    assert!(db.get_profile(&wallet(2)).expect("lookup").is_some());
    assert_eq!(
        db.get_interactions_by_sender(&wallet(2), InteractionType::Message)
            .expect("query")
            .len(),
        1
    );
}

#[tokio::test]
async fn test_service_over_sqlite_store() {
    let (_dir, db) = temp_database();
    let service = MatchService::with_store(Arc::new(SqliteRepository::new(db)), MatchingConfig::default());

    service
        .save_profile(woman(1, 26).range(24, 30).interests(&["reading", "hiking", "cooking"]).build())
        .await
        .expect("save");
    service
        .save_profile(man(2, 27).range(25, 32).interests(&["reading", "hiking", "football"]).build())
        .await
        .expect("save");
    service.save_profile(man(3, 45).build()).await.expect("save");

    let matches = service.get_potential_matches(&wallet(1), None).await.expect("ranking");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].compatibility_score, 88);

    service
        .record_message(&wallet(2), &wallet(1), MessageKind::Text, Some("Salam".to_string()), None)
        .await
        .expect("record");
    let inbox = service.get_users_who_messaged_me(&wallet(1)).await.expect("inbox");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].profile.wallet_address, wallet(2));
}

#[test]
fn test_interactions_at_the_same_time_put_the_later_id_first() {
    let (_dir, db) = temp_database();

    let earlier = db.add_interaction(message(3, 1, 0)).expect("append");
    let later = db.add_interaction(message(2, 1, 0)).expect("append");

    let received = db
        .get_interactions_by_recipient(&wallet(1), InteractionType::Message)
        .expect("query");
    let ids: Vec<i64> = received.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![later.id, earlier.id]);
}

#[tokio::test]
async fn test_timed_out_write_can_still_commit() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("test.db");
    let db = Database::new(&format!("sqlite:{}", path.display())).expect("Failed to create database");
    let settings = MatchingConfig {
        store_timeout_ms: 50,
        ..MatchingConfig::default()
    };
    let service = MatchService::with_store(Arc::new(SqliteRepository::new(db.clone())), settings);

    // hold the write lock so the upsert blocks past the timeout
    let blocker = Connection::open(&path).expect("open second connection");
    blocker.execute_batch("BEGIN EXCLUSIVE").expect("take lock");

    let err = service.save_profile(man(2, 27).build()).await.unwrap_err();
    assert!(matches!(err, MatchError::Timeout { operation: "profiles.upsert", .. }));

    blocker.execute_batch("COMMIT").expect("release lock");
    drop(blocker);

    let mut stored = None;
    for _ in 0..100 {
        stored = db.get_profile(&wallet(2)).expect("lookup");
        if stored.is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    assert!(stored.is_some(), "the abandoned upsert should land once the lock is released");
}
