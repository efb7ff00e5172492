use thiserror::Error;

use crate::oss::ObjectStoreError;

/// 部署流程错误
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("资源目录不存在: {path}")]
    SourceNotFound { path: String },

    #[error("扫描文件失败: {0}")]
    Scan(String),

    #[error("清单格式错误: {0}")]
    ManifestFormat(#[from] serde_json::Error),

    #[error("获取清单失败: {0}")]
    ManifestFetch(String),

    #[error("保存清单失败: {0}")]
    ManifestPersist(String),

    #[error("上传失败 [{key}]: {source}")]
    Upload {
        key: String,
        #[source]
        source: ObjectStoreError,
    },

    #[error("存储错误: {0}")]
    Storage(#[from] ObjectStoreError),

    #[error("HTTP 错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl DeployError {
    /// 清单不存在（首次部署）
    pub fn is_manifest_missing(&self) -> bool {
        match self {
            DeployError::Storage(e) => e.is_not_found(),
            DeployError::Http(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }
}
