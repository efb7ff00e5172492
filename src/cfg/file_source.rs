//! 文件配置源
//!
//! 支持 JSON/YAML/TOML 格式，按扩展名选择解析器。
//! 解析前会展开内容中的 `${VAR}` 环境变量，密钥可以不落盘。

use anyhow::{anyhow, Context, Result};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use super::source::{ConfigSource, ConfigValue};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "static-deploy.yaml";

/// 文件配置源
///
/// # 示例
/// ```no_run
/// use static_deploy::cfg::{ConfigSource, FileSource};
///
/// let source = FileSource::new("~/deploy/static-deploy.yaml");
/// let config = source.load().unwrap();
/// ```
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// 创建文件配置源，路径支持 `~` 展开
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            path: PathBuf::from(shellexpand::tilde(path.as_ref()).to_string()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 根据扩展名解析配置
    fn parse_config(content: &str, ext: &str) -> Result<JsonValue> {
        match ext {
            "json" => Ok(serde_json::from_str(content)?),
            "yaml" | "yml" => Ok(serde_yaml::from_str(content)?),
            "toml" => Ok(toml::from_str(content)?),
            _ => Err(anyhow!("不支持的文件格式: {}", ext)),
        }
    }

    /// 展开 `${VAR_NAME}` 形式的环境变量，未定义的变量保持原样
    fn expand_env_vars(content: &str) -> String {
        let re = regex_lite::Regex::new(r"\$\{([^}]+)\}").expect("valid regex");

        re.replace_all(content, |caps: &regex_lite::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<ConfigValue> {
        if !self.path.exists() {
            return Err(anyhow!("配置文件不存在: {}", self.path.display()));
        }

        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("读取配置文件失败: {}", self.path.display()))?;

        let value = Self::parse_config(&Self::expand_env_vars(&content), &ext)
            .with_context(|| format!("解析配置文件失败: {}", self.path.display()))?;

        Ok(ConfigValue::new(value))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
