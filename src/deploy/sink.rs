use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::deploy::{DeployError, Manifest};

/// 一次上传任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    /// 本地绝对路径
    pub local_path: PathBuf,
    /// 相对资源目录的路径，也是清单中的键
    pub rel_path: String,
    /// 远端对象键
    pub key: String,
}

impl UploadTask {
    pub fn new(root: &Path, rel_path: &str, dest_prefix: &str) -> Self {
        Self {
            local_path: root.join(rel_path),
            rel_path: rel_path.to_string(),
            key: remote_key(dest_prefix, rel_path),
        }
    }
}

/// 计算远端对象键：`dest_prefix/rel_path`，前缀为空时即为 `rel_path`
pub fn remote_key(dest_prefix: &str, rel_path: &str) -> String {
    let prefix = dest_prefix
        .trim_start_matches("./")
        .trim_start_matches('/')
        .trim_end_matches('/');
    let rel = rel_path.trim_start_matches('/');

    if prefix.is_empty() || prefix == "." {
        rel.to_string()
    } else {
        format!("{}/{}", prefix, rel)
    }
}

/// 资源上传目标
///
/// 对象存储与静态托管两种模式共用同一套对比与上传流程，差异只在这里
#[async_trait]
pub trait AssetSink: Send + Sync {
    /// 目标名称，用于日志
    fn name(&self) -> &str;

    /// 默认上传并发数
    fn concurrency(&self) -> usize;

    /// 获取远端清单
    async fn fetch_manifest(&self) -> Result<Manifest, DeployError>;

    /// 上传单个资源文件
    async fn upload_asset(&self, task: &UploadTask) -> Result<(), DeployError>;

    /// 上传本地清单文件，覆盖远端清单
    async fn store_manifest(&self, local_path: &Path) -> Result<(), DeployError>;
}
