use std::collections::HashMap;
use std::sync::Arc;

use qoreorm::engine::{DbFamily, Location, SqlxConnector};
use qoreorm::{new_engine, new_engine_with_params, EngineConfig, EngineError, EngineFactory, Registry};

fn isolated_factory() -> EngineFactory {
    EngineFactory::new(
        Arc::new(Registry::with_defaults()),
        Arc::new(SqlxConnector::default()),
        EngineConfig::default(),
    )
}

#[tokio::test]
async fn sqlite_file_engine() {
    qoreorm::observability::init_tracing(&EngineConfig::default());

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("test.db");
    let dsn = format!("file:{}", path.display());

    let engine = isolated_factory()
        .new_engine("sqlite3", &dsn)
        .await
        .expect("engine builds");

    assert_eq!(engine.family(), DbFamily::Sqlite);
    assert_eq!(engine.dialect().family(), DbFamily::Sqlite);
    assert_eq!(engine.database_tz(), Location::Utc);
    assert_eq!(engine.tz_location(), Location::Local);
    let version = engine.dialect().server_version().expect("version probed");
    assert!(version.starts_with('3'), "unexpected sqlite version {}", version);
    assert!(path.exists());

    engine.ping().await.expect("ping");
    engine.close().await.expect("close");
    assert!(matches!(engine.ping().await, Err(EngineError::Closed)));
}

#[tokio::test]
async fn sqlite_paths_open_the_named_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir(dir.path().join("sub")).expect("subdir");
    let factory = isolated_factory();

    let cases = [
        ("my data.db", "my data.db"),
        ("sub/../rel.db", "rel.db"),
        ("50%25.db", "50%25.db"),
    ];
    for (relative, expected) in cases {
        let dsn = format!("file:{}/{}", dir.path().display(), relative);
        let engine = factory.new_engine("sqlite3", &dsn).await.expect("engine builds");
        engine.close().await.expect("close");

        assert!(
            dir.path().join(expected).is_file(),
            "{} did not create {}",
            dsn,
            expected
        );
    }
    assert!(!dir.path().join("sub").join("rel.db").exists());
    assert!(!dir.path().join("50%.db").exists());
}

#[tokio::test]
async fn sqlite_clone_opens_second_connection() {
    let engine = isolated_factory()
        .new_engine("sqlite3", ":memory:")
        .await
        .expect("engine builds");

    let clone = engine.try_clone().await.expect("clone builds");
    assert_ne!(clone.connection_id(), engine.connection_id());
    assert_eq!(clone.data_source_name(), ":memory:");

    clone.close().await.expect("close clone");
    engine.ping().await.expect("original unaffected");
    engine.close().await.expect("close original");
}

#[tokio::test]
async fn global_construction_functions() {
    let err = new_engine("nosuchdriver", "file:test.db")
        .await
        .expect_err("unknown driver");
    assert!(matches!(err, EngineError::UnsupportedDriver { .. }));

    let params = HashMap::from([("journal".to_string(), "wal".to_string())]);
    let engine = new_engine_with_params("sqlite3", ":memory:", params.clone())
        .await
        .expect("engine builds");
    assert_eq!(engine.dialect().params(), &params);
    engine.close().await.expect("close");
}

#[tokio::test]
async fn sql_server_has_no_sqlx_transport() {
    let err = isolated_factory()
        .new_engine("mssql", "server=localhost;database=app")
        .await
        .expect_err("no transport");
    assert!(matches!(err, EngineError::ConnectionError { .. }));
}
