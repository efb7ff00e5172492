use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::deploy::{AssetSink, DeployError, Manifest, UploadTask};
use crate::oss::{ObjectStore, PutFileOptions};

/// 对象存储模式默认并发数
pub const COS_CONCURRENCY: usize = 10;

/// 对象存储模式
///
/// 资源和清单都写入同一个 COS 存储桶；清单通过存储桶的公网地址直接 GET，
/// 不需要签名。
pub struct CosSink {
    store: Arc<dyn ObjectStore>,
    http: reqwest::Client,
    manifest_name: String,
    manifest_url: String,
}

impl CosSink {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        manifest_name: impl Into<String>,
        manifest_url: impl Into<String>,
    ) -> Result<Self, DeployError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            store,
            http,
            manifest_name: manifest_name.into(),
            manifest_url: manifest_url.into(),
        })
    }

    /// 存储桶公网访问地址下的清单 URL
    pub fn public_manifest_url(bucket: &str, region: &str, manifest_name: &str) -> String {
        format!(
            "http://{}.cos.{}.myqcloud.com/{}",
            bucket,
            region,
            manifest_name.trim_start_matches('/')
        )
    }

    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }
}

#[async_trait]
impl AssetSink for CosSink {
    fn name(&self) -> &str {
        "cos"
    }

    fn concurrency(&self) -> usize {
        COS_CONCURRENCY
    }

    async fn fetch_manifest(&self) -> Result<Manifest, DeployError> {
        debug!(url = %self.manifest_url, "fetching manifest");

        let response = self
            .http
            .get(&self.manifest_url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        Manifest::from_slice(&body)
    }

    async fn upload_asset(&self, task: &UploadTask) -> Result<(), DeployError> {
        self.store
            .put_file(&task.key, &task.local_path, PutFileOptions::default())
            .await
            .map_err(|source| DeployError::Upload {
                key: task.key.clone(),
                source,
            })
    }

    async fn store_manifest(&self, local_path: &Path) -> Result<(), DeployError> {
        let options = PutFileOptions {
            content_type: Some("application/json".to_string()),
            ..Default::default()
        };

        self.store
            .put_file(&self.manifest_name, local_path, options)
            .await
            .map_err(|source| DeployError::Upload {
                key: self.manifest_name.clone(),
                source,
            })
    }
}
