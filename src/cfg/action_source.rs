//! GitHub Action 输入配置源
//!
//! Runner 会把 `with:` 中的每个输入以 `INPUT_<NAME 大写>` 的形式放进环境变量，
//! 这里把它们还原成与配置文件相同字段名的 JSON 对象。

use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

use super::source::{ConfigSource, ConfigValue};

#[derive(Debug, Clone, Copy)]
enum InputKind {
    Text,
    Flag,
    List,
    Number,
}

/// 支持的 Action 输入（名称与配置文件字段一致）
const INPUTS: &[(&str, InputKind)] = &[
    ("secretId", InputKind::Text),
    ("secretKey", InputKind::Text),
    ("envId", InputKind::Text),
    ("bucket", InputKind::Text),
    ("region", InputKind::Text),
    ("hostingBucket", InputKind::Text),
    ("hostingRegion", InputKind::Text),
    ("storageBucket", InputKind::Text),
    ("storageRegion", InputKind::Text),
    ("endpoint", InputKind::Text),
    ("staticSrcPath", InputKind::Text),
    ("staticDestPath", InputKind::Text),
    ("assetFileName", InputKind::Text),
    ("manifestUrl", InputKind::Text),
    ("isForce", InputKind::Flag),
    ("keepLocalManifest", InputKind::Flag),
    ("dryRun", InputKind::Flag),
    ("skipFiles", InputKind::List),
    ("forceFiles", InputKind::List),
    ("concurrency", InputKind::Number),
];

/// GitHub Action 输入配置源
pub struct ActionInputSource {
    vars: HashMap<String, String>,
}

impl ActionInputSource {
    /// 从当前进程环境变量读取
    pub fn from_env() -> Self {
        Self::new(std::env::vars())
    }

    /// 从给定的环境变量集合读取
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// 读取单个输入，空白值视为未设置
    fn input(&self, name: &str) -> Option<&str> {
        let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
        self.vars
            .get(&key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn convert(name: &str, raw: &str, kind: InputKind) -> Result<JsonValue> {
        match kind {
            InputKind::Text => Ok(JsonValue::String(raw.to_string())),
            InputKind::Flag => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(JsonValue::Bool(true)),
                "false" | "0" | "no" => Ok(JsonValue::Bool(false)),
                _ => Err(anyhow!("输入 {} 不是布尔值: {}", name, raw)),
            },
            InputKind::List => {
                let value: JsonValue = serde_json::from_str(raw)
                    .with_context(|| format!("输入 {} 不是 JSON 数组: {}", name, raw))?;
                if !value.is_array() {
                    return Err(anyhow!("输入 {} 不是 JSON 数组: {}", name, raw));
                }
                Ok(value)
            }
            InputKind::Number => {
                let n: u64 = raw
                    .parse()
                    .with_context(|| format!("输入 {} 不是整数: {}", name, raw))?;
                Ok(JsonValue::from(n))
            }
        }
    }
}

impl ConfigSource for ActionInputSource {
    fn load(&self) -> Result<ConfigValue> {
        let mut map = Map::new();

        for (name, kind) in INPUTS {
            if let Some(raw) = self.input(name) {
                map.insert(name.to_string(), Self::convert(name, raw, *kind)?);
            }
        }

        if let Some(workspace) = self.vars.get("GITHUB_WORKSPACE") {
            map.insert(
                "workspace".to_string(),
                JsonValue::String(workspace.clone()),
            );
        }

        Ok(ConfigValue::new(JsonValue::Object(map)))
    }

    fn describe(&self) -> String {
        "github-action-inputs".to_string()
    }
}
