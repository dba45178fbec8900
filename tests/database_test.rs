//! Database bootstrap integration tests, mirroring the teacher's
//! `test_migrations_create_all_tables`/connection-lifecycle coverage.

use sqlx::Row;

use autoanalyst_core::adapters::sqlite::connection::{open, open_in_memory};

#[tokio::test]
async fn migrations_create_all_expected_tables() {
    let pool = open_in_memory().await.expect("failed to open in-memory database");

    let rows = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .fetch_all(&pool)
        .await
        .expect("failed to list tables");

    let names: Vec<String> = rows.iter().map(|r| r.get::<String, _>("name")).collect();

    for expected in [
        "agent_templates",
        "user_template_preferences",
        "deep_analysis_reports",
        "usage_records",
        "schema_migrations",
    ] {
        assert!(names.contains(&expected.to_string()), "missing table: {expected}");
    }
}

#[tokio::test]
async fn running_migrations_twice_is_a_no_op() {
    let pool = open_in_memory().await.unwrap();
    // Re-opening against the same in-memory pool isn't meaningful (the
    // database disappears with the connection), so instead verify the
    // migrator itself is idempotent by invoking it again directly.
    use autoanalyst_core::adapters::sqlite::migrations::{all_embedded_migrations, Migrator};
    let migrator = Migrator::new(pool.clone());
    let applied = migrator.run_embedded_migrations(all_embedded_migrations()).await.unwrap();
    assert_eq!(applied, 0, "no migrations should be pending on a freshly migrated database");
}

#[tokio::test]
async fn file_backed_pool_persists_schema_across_reopen() {
    let dir = std::env::temp_dir().join(format!("autoanalyst-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let db_path = dir.join("test.db");
    let path_str = db_path.to_string_lossy().to_string();

    {
        let pool = open(&path_str, 1).await.expect("failed to open file-backed database");
        pool.close().await;
    }

    let pool = open(&path_str, 1).await.expect("failed to reopen file-backed database");
    let rows = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table'")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert!(!rows.is_empty());
    pool.close().await;

    std::fs::remove_dir_all(&dir).ok();
}
