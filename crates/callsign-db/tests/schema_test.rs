//! Integration tests for schema initialization using in-memory SurrealDB.

use callsign_core::repository::UserRepository;
use callsign_db::DbManager;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    callsign_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info_str = format!("{:?}", info.expect("INFO FOR DB should return a value"));

    assert!(info_str.contains("user"), "missing user table");
    assert!(info_str.contains("_migration"), "missing migration table");
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    callsign_db::run_migrations(&db).await.unwrap();
    callsign_db::run_migrations(&db).await.unwrap();

    let mut result = db
        .query("SELECT VALUE version FROM _migration")
        .await
        .unwrap();
    let versions: Vec<u32> = result.take(0).unwrap();
    assert_eq!(versions, vec![1]);
}

#[tokio::test]
async fn opened_manager_is_migrated() {
    let client = Surreal::new::<Mem>(()).await.unwrap();
    let db = DbManager::open(client, "test", "test").await.unwrap();

    let mut result = db
        .client()
        .query("SELECT VALUE version FROM _migration")
        .await
        .unwrap();
    let versions: Vec<u32> = result.take(0).unwrap();
    assert_eq!(versions, vec![1]);

    // Reopening an already migrated database is a no-op.
    let db = DbManager::open(db.client().clone(), "test", "test")
        .await
        .unwrap();
    let err = db.users().find_by_id(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(
        err,
        callsign_core::error::CallsignError::NotFound { .. }
    ));
}
