//! Database integration tests
//!
//! Covers prediction history ownership and ordering, account registration
//! and login, and session expiry/refresh.

use chrono::Duration;
use sqlx::SqlitePool;
use uuid::Uuid;
use vm_common::auth::User;
use vm_common::db::{self, predictions, sessions, users};
use vm_common::models::{
    ImageInput, ManualInput, NewPrediction, PredictionRequest, PredictionType, VoiceInput,
};
use vm_common::Error;

async fn setup() -> SqlitePool {
    db::init_in_memory_pool().await.expect("in-memory database")
}

async fn register(pool: &SqlitePool, email: &str) -> User {
    users::create_user(pool, email, "correct-horse")
        .await
        .expect("user should register")
}

fn manual_request(location: &str) -> PredictionRequest {
    PredictionRequest::Manual(ManualInput {
        bedrooms: 3,
        floors: 2,
        area_sqft: 1200.0,
        location: location.to_string(),
        amenities: Some(vec!["Parking".to_string()]),
    })
}

// =============================================================================
// Prediction history
// =============================================================================

#[tokio::test]
async fn test_insert_assigns_id_and_timestamp() {
    let pool = setup().await;
    let user = register(&pool, "owner@example.in").await;

    let row = NewPrediction::from_request(user.id, &manual_request("Pune"), 7_500_000.0);
    let saved = predictions::insert_prediction(&pool, &row).await.unwrap();

    assert_ne!(saved.id, Uuid::nil());
    assert_eq!(saved.prediction_type, PredictionType::Manual);
    assert_eq!(saved.location.as_deref(), Some("Pune"));
    assert_eq!(saved.amenities, Some(vec!["Parking".to_string()]));

    let loaded = predictions::get_prediction(&pool, user.id, saved.id)
        .await
        .unwrap()
        .expect("row should exist");
    assert_eq!(loaded, saved);
}

#[tokio::test]
async fn test_each_modality_round_trips_its_fields() {
    let pool = setup().await;
    let user = register(&pool, "modes@example.in").await;

    let image = PredictionRequest::Image(ImageInput {
        image_url: "data:image/png;base64,iVBORw0KGgo=".to_string(),
    });
    let voice = PredictionRequest::Voice(VoiceInput {
        transcript: "three bedroom villa near the beach".to_string(),
    });

    for request in [image, voice] {
        let row = NewPrediction::from_request(user.id, &request, 9_000_000.0);
        let saved = predictions::insert_prediction(&pool, &row).await.unwrap();
        let loaded = predictions::get_prediction(&pool, user.id, saved.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(loaded.prediction_type, request.prediction_type());
        assert!(loaded.bedrooms.is_none());
        assert!(loaded.amenities.is_none());
    }
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let pool = setup().await;
    let user = register(&pool, "history@example.in").await;

    for location in ["Pune", "Mumbai", "Nashik", "Thane"] {
        let row = NewPrediction::from_request(user.id, &manual_request(location), 1.0);
        predictions::insert_prediction(&pool, &row).await.unwrap();
    }

    let listed = predictions::list_predictions(&pool, user.id).await.unwrap();
    assert_eq!(listed.len(), 4);
    assert!(listed
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
    assert_eq!(listed[0].location.as_deref(), Some("Thane"));
    assert_eq!(listed[3].location.as_deref(), Some("Pune"));
}

#[tokio::test]
async fn test_list_only_returns_own_rows() {
    let pool = setup().await;
    let alice = register(&pool, "alice@example.in").await;
    let bob = register(&pool, "bob@example.in").await;

    let row = NewPrediction::from_request(alice.id, &manual_request("Pune"), 1.0);
    let saved = predictions::insert_prediction(&pool, &row).await.unwrap();

    assert!(predictions::list_predictions(&pool, bob.id).await.unwrap().is_empty());
    assert!(predictions::get_prediction(&pool, bob.id, saved.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_delete_removes_exactly_one_owned_row() {
    let pool = setup().await;
    let alice = register(&pool, "alice@example.in").await;
    let bob = register(&pool, "bob@example.in").await;

    let mut ids = Vec::new();
    for location in ["Pune", "Mumbai", "Nashik"] {
        let row = NewPrediction::from_request(alice.id, &manual_request(location), 1.0);
        ids.push(predictions::insert_prediction(&pool, &row).await.unwrap().id);
    }

    // Another user cannot delete it
    assert!(!predictions::delete_prediction(&pool, bob.id, ids[1]).await.unwrap());

    assert!(predictions::delete_prediction(&pool, alice.id, ids[1]).await.unwrap());
    assert!(!predictions::delete_prediction(&pool, alice.id, ids[1]).await.unwrap());

    let remaining: Vec<Uuid> = predictions::list_predictions(&pool, alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(remaining, vec![ids[2], ids[0]]);
}

#[tokio::test]
async fn test_insert_for_unknown_owner_fails() {
    let pool = setup().await;

    let row = NewPrediction::from_request(Uuid::new_v4(), &manual_request("Pune"), 1.0);
    let result = predictions::insert_prediction(&pool, &row).await;

    assert!(matches!(result, Err(Error::Database(_))));
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_duplicate_email_rejected_case_insensitively() {
    let pool = setup().await;
    register(&pool, "dup@example.in").await;

    let result = users::create_user(&pool, "DUP@example.in", "another-pass").await;
    assert!(matches!(result, Err(Error::InvalidInput(msg)) if msg == "User already registered"));
}

#[tokio::test]
async fn test_authenticate() {
    let pool = setup().await;
    let user = register(&pool, "login@example.in").await;

    let found = users::authenticate(&pool, "Login@Example.in", "correct-horse")
        .await
        .unwrap();
    assert_eq!(found, user);

    let wrong = users::authenticate(&pool, "login@example.in", "battery-staple").await;
    assert!(matches!(wrong, Err(Error::Unauthorized(_))));

    let unknown = users::authenticate(&pool, "nobody@example.in", "correct-horse").await;
    assert!(matches!(unknown, Err(Error::Unauthorized(_))));

    assert_eq!(users::get_user(&pool, user.id).await.unwrap(), Some(user));
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_session_lifecycle() {
    let pool = setup().await;
    let user = register(&pool, "session@example.in").await;

    let session = sessions::create_session(&pool, &user, Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(session.token_type, "bearer");

    let loaded = sessions::load_session(&pool, &session.access_token)
        .await
        .unwrap()
        .expect("session should be live");
    assert_eq!(loaded.user, user);

    assert_eq!(sessions::delete_user_sessions(&pool, user.id).await.unwrap(), 1);
    assert!(sessions::load_session(&pool, &session.access_token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_sign_out_ends_every_session_of_the_user_only() {
    let pool = setup().await;
    let user = register(&pool, "laptop@example.in").await;
    let other = register(&pool, "neighbour@example.in").await;

    let laptop = sessions::create_session(&pool, &user, Duration::hours(1)).await.unwrap();
    let phone = sessions::create_session(&pool, &user, Duration::hours(1)).await.unwrap();
    let theirs = sessions::create_session(&pool, &other, Duration::hours(1)).await.unwrap();

    assert_eq!(sessions::delete_user_sessions(&pool, user.id).await.unwrap(), 2);

    for token in [&laptop.access_token, &phone.access_token] {
        assert!(sessions::load_session(&pool, token).await.unwrap().is_none());
    }
    assert!(sessions::load_session(&pool, &theirs.access_token)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_expired_session_is_rejected_and_removed() {
    let pool = setup().await;
    let user = register(&pool, "expired@example.in").await;

    let session = sessions::create_session(&pool, &user, Duration::seconds(-1))
        .await
        .unwrap();

    assert!(sessions::load_session(&pool, &session.access_token)
        .await
        .unwrap()
        .is_none());
    assert_eq!(sessions::delete_user_sessions(&pool, user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_refresh_extends_expiry() {
    let pool = setup().await;
    let user = register(&pool, "refresh@example.in").await;

    let session = sessions::create_session(&pool, &user, Duration::minutes(1))
        .await
        .unwrap();
    let refreshed = sessions::refresh_session(&pool, &session.access_token, Duration::hours(2))
        .await
        .unwrap()
        .expect("live session refreshes");

    assert_eq!(refreshed.access_token, session.access_token);
    assert!(refreshed.expires_at > session.expires_at);

    assert!(sessions::refresh_session(&pool, "not-a-token", Duration::hours(2))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_purge_expired_sessions() {
    let pool = setup().await;
    let user = register(&pool, "purge@example.in").await;

    sessions::create_session(&pool, &user, Duration::seconds(-5)).await.unwrap();
    sessions::create_session(&pool, &user, Duration::seconds(-5)).await.unwrap();
    let live = sessions::create_session(&pool, &user, Duration::hours(1)).await.unwrap();

    assert_eq!(sessions::purge_expired_sessions(&pool).await.unwrap(), 2);
    assert!(sessions::load_session(&pool, &live.access_token)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_file_database_created_on_first_open() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("valuematrix.db");

    let pool = db::init_database_pool(&db_path).await.unwrap();
    assert!(db_path.exists());
    drop(pool);

    // Opening again keeps working
    assert!(db::init_database_pool(&db_path).await.is_ok());
}
