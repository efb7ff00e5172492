use serde_json::json;
use static_deploy::deploy::{Deployer, HostingSink};
use static_deploy::oss::MemoryObjectStore;
use std::sync::Arc;

use crate::common::{config, md5_of, workspace};

#[tokio::test]
async fn test_incremental_redeploy() {
    let ws = workspace(&[
        ("static/app.3f2a.js", "console.log(1)"),
        ("index.html", "<h1>v1</h1>"),
    ]);
    let hosting = Arc::new(MemoryObjectStore::new());
    let storage = Arc::new(MemoryObjectStore::new());
    let sink = || {
        Arc::new(HostingSink::new(
            "docs-env",
            hosting.clone(),
            storage.clone(),
            "docschina-assets.json",
        ))
    };

    let mut cfg = config(&ws);
    cfg.env_id = Some("docs-env".to_string());

    let first = Deployer::new(cfg.clone(), sink()).run().await.unwrap();
    assert_eq!(first.uploaded, vec!["static/app.3f2a.js", "index.html"]);
    assert_eq!(hosting.keys(), vec!["index.html", "static/app.3f2a.js"]);
    assert_eq!(storage.keys(), vec!["docschina-assets.json"]);

    // 无变化时不上传任何文件
    let second = Deployer::new(cfg.clone(), sink()).run().await.unwrap();
    assert!(second.uploaded.is_empty());

    std::fs::write(ws.path().join("dist/index.html"), "<h1>v2</h1>").unwrap();
    std::fs::write(ws.path().join("dist/static/app.9c1d.js"), "console.log(2)").unwrap();

    let third = Deployer::new(cfg, sink()).run().await.unwrap();
    assert_eq!(third.uploaded, vec!["static/app.9c1d.js", "index.html"]);
    assert_eq!(
        hosting.get("index.html").unwrap().as_ref(),
        b"<h1>v2</h1>"
    );

    let stored: serde_json::Value =
        serde_json::from_slice(&storage.get("docschina-assets.json").unwrap()).unwrap();
    assert_eq!(
        stored,
        json!({"mapv2": {
            "static/app.3f2a.js": 1,
            "static/app.9c1d.js": 1,
            "index.html": md5_of("<h1>v2</h1>"),
        }})
    );
}
