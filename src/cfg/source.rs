//! 配置源抽象
//!
//! 部署配置可以来自 CI 输入（GitHub Action inputs）或本地配置文件，
//! 两者都先归一成 JSON 值，再反序列化为 [`DeployConfig`](super::DeployConfig)

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// 配置值包装，提供类型转换能力
#[derive(Debug, Clone)]
pub struct ConfigValue(pub JsonValue);

impl ConfigValue {
    pub fn new(value: JsonValue) -> Self {
        Self(value)
    }

    /// 转换为指定类型（消费 self）
    pub fn into_type<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.0)?)
    }

    pub fn as_value(&self) -> &JsonValue {
        &self.0
    }

    /// 用 `other` 中的字段覆盖当前对象的同名字段
    pub fn merge(&mut self, other: ConfigValue) {
        match (&mut self.0, other.0) {
            (JsonValue::Object(base), JsonValue::Object(over)) => {
                for (k, v) in over {
                    base.insert(k, v);
                }
            }
            (base, over) => *base = over,
        }
    }
}

/// 配置来源抽象
pub trait ConfigSource: Send + Sync {
    /// 加载配置
    fn load(&self) -> Result<ConfigValue>;

    /// 来源描述，用于日志
    fn describe(&self) -> String;
}
