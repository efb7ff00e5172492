use async_trait::async_trait;
use static_deploy::cfg::{DeployConfig, RetryConfig};
use static_deploy::deploy::{AssetSink, DeployError, Manifest, UploadTask};
use static_deploy::oss::ObjectStoreError;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// 记录上传顺序的 sink，可指定上传失败的文件
#[derive(Default)]
pub struct RecordingSink {
    pub remote_manifest: Option<String>,
    pub fail_keys: Vec<String>,
    pub fail_store: bool,
    pub uploads: Mutex<Vec<String>>,
    pub stored_manifest: Mutex<Option<String>>,
    pub fetches: Mutex<usize>,
}

impl RecordingSink {
    pub fn with_manifest(json: &str) -> Self {
        Self {
            remote_manifest: Some(json.to_string()),
            ..Default::default()
        }
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn stored_manifest(&self) -> Option<serde_json::Value> {
        self.stored_manifest
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| serde_json::from_str(s).unwrap())
    }
}

#[async_trait]
impl AssetSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn concurrency(&self) -> usize {
        3
    }

    async fn fetch_manifest(&self) -> Result<Manifest, DeployError> {
        *self.fetches.lock().unwrap() += 1;
        match &self.remote_manifest {
            Some(json) => Manifest::from_slice(json.as_bytes()),
            None => Err(DeployError::Storage(ObjectStoreError::NotFound {
                key: "docschina-assets.json".to_string(),
            })),
        }
    }

    async fn upload_asset(&self, task: &UploadTask) -> Result<(), DeployError> {
        self.uploads.lock().unwrap().push(task.key.clone());
        if self.fail_keys.contains(&task.key) {
            return Err(DeployError::Upload {
                key: task.key.clone(),
                source: ObjectStoreError::Network("connection reset".to_string()),
            });
        }
        Ok(())
    }

    async fn store_manifest(&self, local_path: &Path) -> Result<(), DeployError> {
        if self.fail_store {
            return Err(DeployError::Upload {
                key: "docschina-assets.json".to_string(),
                source: ObjectStoreError::Network("access denied".to_string()),
            });
        }
        let content = std::fs::read_to_string(local_path)?;
        *self.stored_manifest.lock().unwrap() = Some(content);
        Ok(())
    }
}

/// 在临时工作目录下创建 `dist/` 资源目录
pub fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, content) in files {
        let full = dir.path().join("dist").join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }
    std::fs::create_dir_all(dir.path().join("dist")).unwrap();
    dir
}

pub fn config(workspace: &TempDir) -> DeployConfig {
    DeployConfig {
        secret_id: "AKIDexample".to_string(),
        secret_key: "secret".to_string(),
        bucket: Some("docs-1250000000".to_string()),
        region: Some("ap-guangzhou".to_string()),
        workspace: Some(workspace.path().to_path_buf()),
        src_path: "dist".to_string(),
        retry: RetryConfig::disabled(),
        ..Default::default()
    }
}

pub fn md5_of(content: &str) -> String {
    static_deploy::deploy::md5_hex(content.as_bytes())
}
