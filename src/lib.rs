//! static-deploy - 静态资源增量部署
//!
//! 把本地构建产物增量同步到腾讯云 COS 存储桶或云开发静态托管，
//! 通过远端清单跳过未变化的文件。
//!
//! ## 模块
//!
//! - **cfg**: 部署配置（GitHub Action 输入 / 本地配置文件）
//! - **deploy**: 清单、文件扫描、对比、并发上传与清单写回
//! - **oss**: 对象存储（COS S3 兼容接口）
//! - **action**: GitHub Actions 输出与注解

pub mod action;
pub mod cfg;
pub mod deploy;
pub mod oss;

pub use cfg::{DeployConfig, RetryConfig, Target};
pub use deploy::{create_sink, AssetSink, DeployError, DeployReport, Deployer, Manifest, Marker};
pub use oss::{CosObjectStore, CosObjectStoreConfig, MemoryObjectStore, ObjectStore, ObjectStoreError};
