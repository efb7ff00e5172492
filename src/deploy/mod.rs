//! deploy 模块 - 增量部署
//!
//! 通过远端清单 `{"mapv2": {path: 1 | md5}}` 判断哪些文件需要上传：
//!
//! - 非 HTML 文件在清单中标记为 `1`，视为内容不可变（文件名带 hash）
//! - HTML 文件记录内容 MD5，内容变化时重新上传
//! - HTML 文件最后上传，保证页面引用的资源先就绪
//!
//! 支持两种目标：[`CosSink`]（腾讯云 COS 存储桶）和 [`HostingSink`]（云开发静态托管）

pub mod cos_sink;
pub mod deployer;
pub mod error;
pub mod hosting_sink;
pub mod manifest;
pub mod reconcile;
pub mod report;
pub mod scan;
pub mod sink;
pub mod uploader;

pub use cos_sink::{CosSink, COS_CONCURRENCY};
pub use deployer::Deployer;
pub use error::DeployError;
pub use hosting_sink::{HostingSink, HOSTING_CONCURRENCY};
pub use manifest::{is_html, md5_hex, Manifest, Marker};
pub use reconcile::{decide, html_last, select_uploads, Decision, ReconcileRules};
pub use report::{DeployReport, FailedFile};
pub use scan::{scan_files, ScanEntry};
pub use sink::{remote_key, AssetSink, UploadTask};
pub use uploader::{build_tasks, UploadObserver, UploadOutcome, Uploader};

use std::sync::Arc;

use crate::cfg::{DeployConfig, Target};
use crate::oss::{CosObjectStore, CosObjectStoreConfig, ObjectStore};

/// 根据部署目标创建上传端
pub fn create_sink(config: &DeployConfig, target: &Target) -> Result<Arc<dyn AssetSink>, DeployError> {
    match target {
        Target::Cos { bucket, region } => {
            let store = open_store(config, bucket, region)?;
            let manifest_url = config
                .manifest_url
                .clone()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| CosSink::public_manifest_url(bucket, region, &config.manifest_name));

            Ok(Arc::new(CosSink::new(
                store,
                config.manifest_name.clone(),
                manifest_url,
            )?))
        }
        Target::Hosting {
            env_id,
            hosting_bucket,
            hosting_region,
            storage_bucket,
            storage_region,
        } => {
            let hosting = open_store(config, hosting_bucket, hosting_region)?;
            let storage = open_store(config, storage_bucket, storage_region)?;

            Ok(Arc::new(HostingSink::new(
                env_id.clone(),
                hosting,
                storage,
                config.manifest_name.clone(),
            )))
        }
    }
}

fn open_store(
    config: &DeployConfig,
    bucket: &str,
    region: &str,
) -> Result<Arc<dyn ObjectStore>, DeployError> {
    let store = CosObjectStore::new(CosObjectStoreConfig {
        bucket: bucket.to_string(),
        region: region.to_string(),
        endpoint: config.endpoint.clone().filter(|e| !e.trim().is_empty()),
        force_path_style: None,
        secret_id: config.secret_id.clone(),
        secret_key: config.secret_key.clone(),
    })?;

    Ok(Arc::new(store))
}
