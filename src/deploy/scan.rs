use glob::{MatchOptions, Pattern};
use std::path::{Component, Path};

use crate::deploy::DeployError;

/// 扫描得到的本地条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// 相对资源目录的路径，统一使用 `/` 分隔
    pub path: String,
    pub is_dir: bool,
}

impl ScanEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }
}

/// 递归列出 `root` 下的所有文件和目录（`**/*`）
///
/// 与 shell 默认行为一致，以 `.` 开头的条目不会被匹配。结果按路径排序。
pub fn scan_files(root: &Path) -> Result<Vec<ScanEntry>, DeployError> {
    if !root.is_dir() {
        return Err(DeployError::SourceNotFound {
            path: root.display().to_string(),
        });
    }

    let pattern = format!(
        "{}/**/*",
        Pattern::escape(&root.to_string_lossy()).trim_end_matches('/')
    );
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: true,
    };

    let paths = glob::glob_with(&pattern, options).map_err(|e| DeployError::Scan(e.to_string()))?;

    let mut entries = Vec::new();
    for path in paths {
        let path = path.map_err(|e| DeployError::Scan(e.to_string()))?;
        let rel = match path.strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };

        let Some(rel_path) = to_slash_path(rel) else {
            continue;
        };

        entries.push(ScanEntry {
            path: rel_path,
            is_dir: path.is_dir(),
        });
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

/// 转为 `/` 分隔的相对路径，含隐藏组件或为空时返回 None
fn to_slash_path(rel: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_string_lossy();
                if part.starts_with('.') {
                    return None;
                }
                parts.push(part.into_owned());
            }
            _ => return None,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
