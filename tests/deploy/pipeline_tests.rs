use serde_json::json;
use static_deploy::deploy::{DeployError, Deployer};
use std::sync::Arc;

use crate::common::{config, md5_of, workspace, RecordingSink};

const PAGE: &str = "<html><body>hello</body></html>";

#[tokio::test]
async fn test_first_deploy_uploads_everything() {
    let ws = workspace(&[("a.js", "console.log(1)"), ("b.html", PAGE)]);
    let sink = Arc::new(RecordingSink::default());

    let report = Deployer::new(config(&ws), sink.clone()).run().await.unwrap();

    assert_eq!(report.uploaded, vec!["a.js", "b.html"]);
    assert_eq!(sink.uploads(), vec!["a.js", "b.html"]);
    assert!(report.is_complete());
    assert_eq!(report.scanned, 2);
    assert_eq!(
        sink.stored_manifest().unwrap(),
        json!({"mapv2": {"a.js": 1, "b.html": md5_of(PAGE)}})
    );
    assert!(!ws.path().join("docschina-assets.json").exists());
}

#[tokio::test]
async fn test_html_is_scheduled_after_assets() {
    let ws = workspace(&[
        ("index.html", PAGE),
        ("about/index.html", PAGE),
        ("static/app.js", "1"),
        ("static/app.css", "2"),
    ]);
    let sink = Arc::new(RecordingSink::default());

    let report = Deployer::new(config(&ws), sink.clone()).run().await.unwrap();

    let first_html = report.uploaded.iter().position(|p| p.ends_with(".html")).unwrap();
    assert!(report.uploaded[..first_html].iter().all(|p| !p.ends_with(".html")));
    assert!(report.uploaded[first_html..].iter().all(|p| p.ends_with(".html")));
    assert_eq!(report.uploaded.len(), 4);
}

#[tokio::test]
async fn test_unchanged_files_are_skipped() {
    let ws = workspace(&[("a.js", "1"), ("b.html", PAGE), ("c.html", "<p>new</p>")]);
    let remote = json!({"mapv2": {"a.js": 1, "b.html": md5_of(PAGE), "c.html": "stale"}});
    let sink = Arc::new(RecordingSink::with_manifest(&remote.to_string()));

    let report = Deployer::new(config(&ws), sink.clone()).run().await.unwrap();

    assert_eq!(report.uploaded, vec!["c.html"]);
    let stored = sink.stored_manifest().unwrap();
    assert_eq!(stored["mapv2"]["a.js"], json!(1));
    assert_eq!(stored["mapv2"]["c.html"], json!(md5_of("<p>new</p>")));
}

#[tokio::test]
async fn test_remote_entries_for_deleted_files_are_kept() {
    let ws = workspace(&[("a.js", "1")]);
    let remote = json!({"mapv2": {"old.js": 1}});
    let sink = Arc::new(RecordingSink::with_manifest(&remote.to_string()));

    Deployer::new(config(&ws), sink.clone()).run().await.unwrap();

    assert_eq!(
        sink.stored_manifest().unwrap(),
        json!({"mapv2": {"old.js": 1, "a.js": 1}})
    );
}

#[tokio::test]
async fn test_skip_and_force_prefixes() {
    let ws = workspace(&[("a.js", "1"), ("vendor/lib.js", "2"), ("sw.js", "3")]);
    let remote = json!({"mapv2": {"a.js": 1, "sw.js": 1}});
    let sink = Arc::new(RecordingSink::with_manifest(&remote.to_string()));

    let mut cfg = config(&ws);
    cfg.skip_files = vec!["vendor".to_string()];
    cfg.force_files = vec!["sw".to_string()];

    let report = Deployer::new(cfg, sink.clone()).run().await.unwrap();

    assert_eq!(report.uploaded, vec!["sw.js"]);
}

#[tokio::test]
async fn test_force_ignores_remote_manifest() {
    let ws = workspace(&[("a.js", "1"), ("b.html", PAGE)]);
    let remote = json!({"mapv2": {"a.js": 1, "b.html": md5_of(PAGE), "old.js": 1}});
    let sink = Arc::new(RecordingSink::with_manifest(&remote.to_string()));

    let mut cfg = config(&ws);
    cfg.force = true;

    let report = Deployer::new(cfg, sink.clone()).run().await.unwrap();

    assert_eq!(report.uploaded, vec!["a.js", "b.html"]);
    assert_eq!(*sink.fetches.lock().unwrap(), 0);
    assert_eq!(
        sink.stored_manifest().unwrap(),
        json!({"mapv2": {"a.js": 1, "b.html": md5_of(PAGE)}})
    );
}

#[tokio::test]
async fn test_broken_remote_manifest_counts_as_empty() {
    let ws = workspace(&[("a.js", "1")]);
    let sink = Arc::new(RecordingSink::with_manifest("<Error>AccessDenied</Error>"));

    let report = Deployer::new(config(&ws), sink.clone()).run().await.unwrap();

    assert_eq!(report.uploaded, vec!["a.js"]);
}

#[tokio::test]
async fn test_failed_uploads_are_left_out_of_manifest() {
    let ws = workspace(&[("a.js", "1"), ("b.js", "2"), ("c.html", PAGE)]);
    let sink = Arc::new(RecordingSink {
        fail_keys: vec!["b.js".to_string()],
        ..Default::default()
    });

    let report = Deployer::new(config(&ws), sink.clone()).run().await.unwrap();

    assert_eq!(report.uploaded, vec!["a.js", "c.html"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, "b.js");
    assert!(!report.is_complete());
    assert_eq!(sink.uploads().len(), 3);

    let stored = sink.stored_manifest().unwrap();
    assert!(stored["mapv2"].get("b.js").is_none());
    assert_eq!(report.deploy_result(), r#"["a.js","c.html"]"#);
}

#[tokio::test]
async fn test_manifest_persist_failure_is_fatal() {
    let ws = workspace(&[("a.js", "1")]);
    let sink = Arc::new(RecordingSink {
        fail_store: true,
        ..Default::default()
    });

    let err = Deployer::new(config(&ws), sink.clone()).run().await.unwrap_err();

    assert!(matches!(err, DeployError::ManifestPersist(_)));
    assert_eq!(sink.uploads(), vec!["a.js"]);
}

#[tokio::test]
async fn test_dry_run_uploads_nothing() {
    let ws = workspace(&[("a.js", "1"), ("b.html", PAGE)]);
    let sink = Arc::new(RecordingSink::default());

    let mut cfg = config(&ws);
    cfg.dry_run = true;

    let report = Deployer::new(cfg, sink.clone()).run().await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.planned, vec!["a.js", "b.html"]);
    assert!(report.uploaded.is_empty());
    assert!(sink.uploads().is_empty());
    assert!(sink.stored_manifest().is_none());
}

#[tokio::test]
async fn test_keep_local_manifest() {
    let ws = workspace(&[("a.js", "1")]);
    let sink = Arc::new(RecordingSink::default());

    let mut cfg = config(&ws);
    cfg.keep_local_manifest = true;
    cfg.manifest_name = "assets.json".to_string();

    Deployer::new(cfg, sink).run().await.unwrap();

    let local = std::fs::read_to_string(ws.path().join("assets.json")).unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&local).unwrap(),
        json!({"mapv2": {"a.js": 1}})
    );
}

#[tokio::test]
async fn test_dest_prefix_applies_to_keys_only() {
    let ws = workspace(&[("a.js", "1")]);
    let sink = Arc::new(RecordingSink::default());

    let mut cfg = config(&ws);
    cfg.dest_path = "docs/".to_string();

    let report = Deployer::new(cfg, sink.clone()).run().await.unwrap();

    assert_eq!(sink.uploads(), vec!["docs/a.js"]);
    assert_eq!(report.uploaded, vec!["a.js"]);
    assert_eq!(sink.stored_manifest().unwrap(), json!({"mapv2": {"a.js": 1}}));
}

#[tokio::test]
async fn test_missing_source_dir() {
    let ws = workspace(&[]);
    let sink = Arc::new(RecordingSink::default());

    let mut cfg = config(&ws);
    cfg.src_path = "build".to_string();

    let err = Deployer::new(cfg, sink.clone()).run().await.unwrap_err();

    assert!(matches!(err, DeployError::SourceNotFound { .. }));
    assert!(sink.stored_manifest().is_none());
}

#[tokio::test]
async fn test_empty_source_dir_still_stores_manifest() {
    let ws = workspace(&[]);
    let sink = Arc::new(RecordingSink::default());

    let report = Deployer::new(config(&ws), sink.clone()).run().await.unwrap();

    assert!(report.uploaded.is_empty());
    assert_eq!(sink.stored_manifest().unwrap(), json!({"mapv2": {}}));
}

#[tokio::test]
async fn test_kept_manifest_in_source_dir_is_not_uploaded() {
    let ws = workspace(&[("a.js", "1"), ("index.html", PAGE)]);

    let mut cfg = config(&ws);
    cfg.workspace = Some(ws.path().join("dist"));
    cfg.src_path = String::new();
    cfg.keep_local_manifest = true;

    let first = Arc::new(RecordingSink::default());
    Deployer::new(cfg.clone(), first.clone()).run().await.unwrap();
    assert!(ws.path().join("dist/docschina-assets.json").exists());

    let stored = first.stored_manifest().unwrap().to_string();
    let second = Arc::new(RecordingSink::with_manifest(&stored));
    let report = Deployer::new(cfg, second.clone()).run().await.unwrap();

    assert!(report.uploaded.is_empty());
    assert!(second.uploads().is_empty());
    assert_eq!(
        second.stored_manifest().unwrap(),
        json!({"mapv2": {"a.js": 1, "index.html": md5_of(PAGE)}})
    );
}

#[tokio::test]
async fn test_report_keeps_scheduling_order() {
    let names: Vec<String> = (0..12).map(|i| format!("chunk-{:02}.js", i)).collect();
    let mut files: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "x")).collect();
    files.push(("index.html", PAGE));
    let ws = workspace(&files);
    let sink = Arc::new(RecordingSink::default());

    let mut cfg = config(&ws);
    cfg.concurrency = Some(4);

    let report = Deployer::new(cfg, sink).run().await.unwrap();

    assert_eq!(report.uploaded, report.planned);
    assert_eq!(report.uploaded.last().unwrap(), "index.html");
}
