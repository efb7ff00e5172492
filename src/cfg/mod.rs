//! cfg 模块 - 部署配置
//!
//! CI 环境中从 GitHub Action 输入读取，本地运行时从配置文件读取，
//! 最终都得到同一个 [`DeployConfig`]

pub mod action_source;
pub mod deploy_config;
pub mod file_source;
pub mod serde_duration;
pub mod source;

pub use action_source::ActionInputSource;
pub use deploy_config::{
    DeployConfig, RetryConfig, Target, DEFAULT_HOSTING_REGION, DEFAULT_MANIFEST_NAME,
};
pub use file_source::{FileSource, DEFAULT_CONFIG_FILE};
pub use source::{ConfigSource, ConfigValue};

use anyhow::{Context, Result};

/// 根据运行环境选择配置源
///
/// `in_ci` 为 true 时读取 Action 输入，否则读取配置文件（默认 `static-deploy.yaml`）
pub fn select_source(config_path: Option<&str>, in_ci: bool) -> Box<dyn ConfigSource> {
    if in_ci {
        Box::new(ActionInputSource::from_env())
    } else {
        Box::new(FileSource::new(config_path.unwrap_or(DEFAULT_CONFIG_FILE)))
    }
}

/// 从配置源加载部署配置，`overrides` 中的字段优先
pub fn load_config(source: &dyn ConfigSource, overrides: Option<ConfigValue>) -> Result<DeployConfig> {
    let mut value = source
        .load()
        .with_context(|| format!("加载配置失败: {}", source.describe()))?;

    if let Some(overrides) = overrides {
        value.merge(overrides);
    }

    value
        .into_type()
        .with_context(|| format!("配置格式错误: {}", source.describe()))
}
