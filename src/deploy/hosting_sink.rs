use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::deploy::{AssetSink, DeployError, Manifest, UploadTask};
use crate::oss::{GetObjectOptions, ObjectStore, PutFileOptions};

/// 静态托管模式默认并发数
pub const HOSTING_CONCURRENCY: usize = 5;

/// 云开发静态托管模式
///
/// 资源写入环境的静态托管存储桶，清单保存在环境的云存储桶中
pub struct HostingSink {
    env_id: String,
    hosting: Arc<dyn ObjectStore>,
    storage: Arc<dyn ObjectStore>,
    manifest_name: String,
}

impl HostingSink {
    pub fn new(
        env_id: impl Into<String>,
        hosting: Arc<dyn ObjectStore>,
        storage: Arc<dyn ObjectStore>,
        manifest_name: impl Into<String>,
    ) -> Self {
        Self {
            env_id: env_id.into(),
            hosting,
            storage,
            manifest_name: manifest_name.into(),
        }
    }

    pub fn env_id(&self) -> &str {
        &self.env_id
    }
}

#[async_trait]
impl AssetSink for HostingSink {
    fn name(&self) -> &str {
        "hosting"
    }

    fn concurrency(&self) -> usize {
        HOSTING_CONCURRENCY
    }

    async fn fetch_manifest(&self) -> Result<Manifest, DeployError> {
        let body = self
            .storage
            .get_object(&self.manifest_name, GetObjectOptions::default())
            .await?;
        Manifest::from_slice(&body)
    }

    async fn upload_asset(&self, task: &UploadTask) -> Result<(), DeployError> {
        self.hosting
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

        self.storage
            .put_file(&self.manifest_name, local_path, options)
            .await
            .map_err(|source| DeployError::Upload {
                key: self.manifest_name.clone(),
                source,
            })
    }
}
