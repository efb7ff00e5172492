use serde_json::json;
use static_deploy::deploy::{CosSink, Deployer};
use static_deploy::oss::MemoryObjectStore;
use std::sync::Arc;

use crate::common::{config, md5_of, workspace};

#[tokio::test]
async fn test_cos_deploy_with_remote_manifest() {
    let ws = workspace(&[("a.js", "1"), ("b.js", "2"), ("index.html", "<p>hi</p>")]);

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/docschina-assets.json")
        .with_status(200)
        .with_body(json!({"mapv2": {"a.js": 1, "index.html": md5_of("<p>hi</p>")}}).to_string())
        .create_async()
        .await;

    let store = Arc::new(MemoryObjectStore::new());
    let sink = CosSink::new(
        store.clone(),
        "docschina-assets.json",
        format!("{}/docschina-assets.json", server.url()),
    )
    .unwrap();

    let mut cfg = config(&ws);
    cfg.dest_path = "site".to_string();

    let report = Deployer::new(cfg, Arc::new(sink)).run().await.unwrap();
    mock.assert_async().await;

    assert_eq!(report.target, "cos");
    assert_eq!(report.uploaded, vec!["b.js"]);
    assert_eq!(store.keys(), vec!["docschina-assets.json", "site/b.js"]);

    let stored: serde_json::Value =
        serde_json::from_slice(&store.get("docschina-assets.json").unwrap()).unwrap();
    assert_eq!(
        stored,
        json!({"mapv2": {"a.js": 1, "b.js": 1, "index.html": md5_of("<p>hi</p>")}})
    );
}

#[tokio::test]
async fn test_cos_first_deploy_on_404() {
    let ws = workspace(&[("a.js", "1"), ("index.html", "<p>hi</p>")]);

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/docschina-assets.json")
        .with_status(404)
        .with_body("<Error><Code>NoSuchKey</Code></Error>")
        .create_async()
        .await;

    let store = Arc::new(MemoryObjectStore::new());
    let sink = CosSink::new(
        store.clone(),
        "docschina-assets.json",
        format!("{}/docschina-assets.json", server.url()),
    )
    .unwrap();

    let report = Deployer::new(config(&ws), Arc::new(sink)).run().await.unwrap();

    assert_eq!(report.uploaded, vec!["a.js", "index.html"]);
    assert_eq!(
        store.keys(),
        vec!["a.js", "docschina-assets.json", "index.html"]
    );
}
