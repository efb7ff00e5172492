//! 资源清单
//!
//! 清单记录已上传文件的版本标记，远端以 `{"mapv2": {"<path>": <marker>}}` 的 JSON 保存。
//! 非 HTML 文件的文件名本身带内容哈希，标记为常量 `1`；
//! HTML 文件名不变但内容会变，标记为内容的 MD5。

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;

use crate::deploy::DeployError;

/// 版本标记
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum Marker {
    /// 常量 `1`：已上传
    Uploaded,
    /// HTML 内容的 MD5（小写十六进制）
    Digest(String),
    /// 无法识别的值，原样保留，与任何新计算的标记都不相等
    Other(JsonValue),
}

impl From<JsonValue> for Marker {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Number(ref n) if n.as_u64() == Some(1) => Marker::Uploaded,
            JsonValue::String(s) => Marker::Digest(s),
            other => Marker::Other(other),
        }
    }
}

impl From<Marker> for JsonValue {
    fn from(marker: Marker) -> Self {
        match marker {
            Marker::Uploaded => JsonValue::from(1),
            Marker::Digest(s) => JsonValue::String(s),
            Marker::Other(v) => v,
        }
    }
}

impl Marker {
    /// 根据文件类型计算标记
    ///
    /// `rel_path` 用于判断是否 HTML，`abs_path` 用于读取内容
    pub fn for_file(rel_path: &str, abs_path: &Path) -> std::io::Result<Self> {
        if is_html(rel_path) {
            let content = std::fs::read(abs_path)?;
            Ok(Marker::Digest(md5_hex(&content)))
        } else {
            Ok(Marker::Uploaded)
        }
    }
}

/// 扩展名恰好为 `html`（区分大小写）
pub fn is_html(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|ext| ext == "html")
        .unwrap_or(false)
}

/// 计算 MD5 十六进制摘要
pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// 资源清单
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    mapv2: BTreeMap<String, Marker>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析远端清单，缺少 `mapv2` 时视为空
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DeployError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// 序列化为紧凑 JSON
    pub fn to_vec(&self) -> Result<Vec<u8>, DeployError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// 清单中 `path` 的标记与 `marker` 相同
    pub fn is_unchanged(&self, path: &str, marker: &Marker) -> bool {
        self.mapv2.get(path) == Some(marker)
    }

    /// 记录（或覆盖）一个文件的标记
    pub fn record(&mut self, path: impl Into<String>, marker: Marker) {
        self.mapv2.insert(path.into(), marker);
    }

    pub fn get(&self, path: &str) -> Option<&Marker> {
        self.mapv2.get(path)
    }

    pub fn len(&self) -> usize {
        self.mapv2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapv2.is_empty()
    }

    /// 写入本地文件，自动创建父目录
    pub fn write_to(&self, path: &Path) -> Result<(), DeployError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_vec()?)?;
        Ok(())
    }
}
