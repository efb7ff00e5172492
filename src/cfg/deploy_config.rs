use anyhow::{anyhow, Result};
use backon::{ConstantBuilder, ExponentialBuilder};
use garde::Validate;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::serde_duration::{serde_as, HumanDur};

/// 默认的清单文件名
pub const DEFAULT_MANIFEST_NAME: &str = "docschina-assets.json";

/// 云开发静态托管默认地域
pub const DEFAULT_HOSTING_REGION: &str = "ap-shanghai";

/// 单文件上传重试配置
#[serde_as]
#[derive(Debug, Clone, Deserialize, Serialize, SmartDefault, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryConfig {
    /// 最大重试次数，0 表示不重试
    #[default = 2]
    #[garde(range(max = 20))]
    pub max_times: usize,

    /// 退避策略: "constant" / "exponential"
    #[default = "exponential"]
    #[garde(pattern("^(constant|exponential)$"))]
    pub strategy: String,

    /// 延迟（constant 策略）或最小延迟（exponential 策略）
    #[serde_as(as = "HumanDur")]
    #[default(Duration::from_millis(500))]
    #[garde(skip)]
    pub delay: Duration,

    /// 最大延迟（exponential 策略）
    #[serde_as(as = "HumanDur")]
    #[default(Duration::from_secs(10))]
    #[garde(skip)]
    pub max_delay: Duration,

    /// 是否添加随机抖动
    #[default = true]
    #[garde(skip)]
    pub jitter: bool,
}

impl RetryConfig {
    /// 不重试
    pub fn disabled() -> Self {
        Self {
            max_times: 0,
            ..Default::default()
        }
    }

    /// 构建 backon 的退避策略
    pub fn build_backoff(&self) -> Box<dyn Iterator<Item = Duration> + Send + Sync> {
        match self.strategy.as_str() {
            "constant" => {
                let mut builder = ConstantBuilder::default()
                    .with_delay(self.delay)
                    .with_max_times(self.max_times);
                if self.jitter {
                    builder = builder.with_jitter();
                }
                Box::new(backon::BackoffBuilder::build(builder))
            }
            _ => {
                let mut builder = ExponentialBuilder::default()
                    .with_min_delay(self.delay)
                    .with_max_delay(self.max_delay)
                    .with_max_times(self.max_times);
                if self.jitter {
                    builder = builder.with_jitter();
                }
                Box::new(backon::BackoffBuilder::build(builder))
            }
        }
    }
}

/// 部署目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 对象存储模式：资源与清单都在同一个 COS 存储桶
    Cos { bucket: String, region: String },
    /// 云开发静态托管模式：资源上传到托管存储桶，清单保存在环境的云存储桶
    Hosting {
        env_id: String,
        hosting_bucket: String,
        hosting_region: String,
        storage_bucket: String,
        storage_region: String,
    },
}

impl Target {
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Cos { .. } => "cos",
            Target::Hosting { .. } => "hosting",
        }
    }
}

/// 部署配置
///
/// 启动时构造一次，之后以引用方式传给部署流程。
/// 字段名与 GitHub Action 输入保持一致（camelCase）。
#[derive(Clone, Deserialize, Serialize, SmartDefault, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployConfig {
    #[garde(length(min = 1))]
    pub secret_id: String,

    #[garde(length(min = 1))]
    pub secret_key: String,

    /// 云开发环境 ID，设置后使用静态托管模式
    #[garde(skip)]
    pub env_id: Option<String>,

    /// COS 存储桶（对象存储模式）
    #[garde(skip)]
    pub bucket: Option<String>,

    /// COS 地域（对象存储模式），也作为托管模式各存储桶的默认地域
    #[garde(skip)]
    pub region: Option<String>,

    #[garde(skip)]
    pub hosting_bucket: Option<String>,

    #[garde(skip)]
    pub hosting_region: Option<String>,

    #[garde(skip)]
    pub storage_bucket: Option<String>,

    #[garde(skip)]
    pub storage_region: Option<String>,

    /// 自定义 COS 端点
    #[garde(skip)]
    pub endpoint: Option<String>,

    /// 工作目录，默认取 `GITHUB_WORKSPACE`，否则为当前目录
    #[garde(skip)]
    pub workspace: Option<PathBuf>,

    /// 本地资源目录（相对工作目录）
    #[serde(rename = "staticSrcPath")]
    #[garde(skip)]
    pub src_path: String,

    /// 远端路径前缀
    #[serde(rename = "staticDestPath")]
    #[garde(skip)]
    pub dest_path: String,

    /// 忽略远端清单，全量上传
    #[serde(rename = "isForce")]
    #[garde(skip)]
    pub force: bool,

    /// 跳过的路径前缀
    #[garde(skip)]
    pub skip_files: Vec<String>,

    /// 强制上传的路径前缀
    #[garde(skip)]
    pub force_files: Vec<String>,

    /// 清单文件名
    #[serde(rename = "assetFileName")]
    #[default(DEFAULT_MANIFEST_NAME.to_string())]
    #[garde(length(min = 1))]
    pub manifest_name: String,

    /// 对象存储模式下获取清单的地址，默认为存储桶公网地址
    #[garde(skip)]
    pub manifest_url: Option<String>,

    /// 上传并发数，不设置时使用目标的默认值
    #[garde(range(min = 1, max = 256))]
    pub concurrency: Option<usize>,

    #[garde(dive)]
    pub retry: RetryConfig,

    /// 上传后保留本地清单文件
    #[garde(skip)]
    pub keep_local_manifest: bool,

    /// 只计算待上传列表，不上传
    #[garde(skip)]
    pub dry_run: bool,
}

impl DeployConfig {
    /// 校验配置并解析部署目标
    pub fn check(&self) -> Result<Target> {
        self.validate().map_err(|e| anyhow!("配置校验失败: {}", e))?;
        self.target()
    }

    /// 解析部署目标，`envId` 非空时为静态托管模式
    pub fn target(&self) -> Result<Target> {
        match non_empty(&self.env_id) {
            Some(env_id) => {
                let default_region = non_empty(&self.region).unwrap_or(DEFAULT_HOSTING_REGION);
                let hosting_bucket = non_empty(&self.hosting_bucket)
                    .ok_or_else(|| anyhow!("静态托管模式需要 hostingBucket"))?;
                let storage_bucket = non_empty(&self.storage_bucket)
                    .ok_or_else(|| anyhow!("静态托管模式需要 storageBucket"))?;

                Ok(Target::Hosting {
                    env_id: env_id.to_string(),
                    hosting_bucket: hosting_bucket.to_string(),
                    hosting_region: non_empty(&self.hosting_region)
                        .unwrap_or(default_region)
                        .to_string(),
                    storage_bucket: storage_bucket.to_string(),
                    storage_region: non_empty(&self.storage_region)
                        .unwrap_or(default_region)
                        .to_string(),
                })
            }
            None => {
                let bucket = non_empty(&self.bucket)
                    .ok_or_else(|| anyhow!("对象存储模式需要 bucket"))?;
                let region = non_empty(&self.region)
                    .ok_or_else(|| anyhow!("对象存储模式需要 region"))?;

                Ok(Target::Cos {
                    bucket: bucket.to_string(),
                    region: region.to_string(),
                })
            }
        }
    }

    /// 工作目录
    pub fn workspace_dir(&self) -> PathBuf {
        if let Some(workspace) = &self.workspace {
            return workspace.clone();
        }
        std::env::var_os("GITHUB_WORKSPACE")
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// 本地资源目录的绝对路径
    pub fn source_dir(&self) -> PathBuf {
        join_relative(&self.workspace_dir(), &self.src_path)
    }

    /// 本地清单文件路径
    pub fn local_manifest_path(&self) -> PathBuf {
        self.workspace_dir().join(&self.manifest_name)
    }

    /// 本地清单位于资源目录内时，返回它相对资源目录的路径
    pub fn manifest_in_source(&self) -> Option<String> {
        let manifest = self.local_manifest_path();
        let source = self.source_dir();
        let rel = manifest.strip_prefix(&source).ok()?;

        let parts: Vec<&str> = rel
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn join_relative(base: &Path, rel: &str) -> PathBuf {
    let rel = rel.trim_start_matches("./");
    if rel.is_empty() || rel == "." {
        base.to_path_buf()
    } else {
        base.join(rel)
    }
}
