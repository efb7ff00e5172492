//! 增量对比
//!
//! 根据远端清单和 skip/force 前缀，从扫描结果中挑出需要上传的文件，
//! 并把 HTML 放到最后：入口页面引用的静态资源必须先上线。

use std::path::Path;
use tracing::debug;

use crate::deploy::manifest::{is_html, Manifest, Marker};
use crate::deploy::scan::ScanEntry;
use crate::deploy::DeployError;

/// 跳过/强制上传规则
///
/// 匹配方式是普通字符串前缀，不按路径段切分：`"img"` 也会匹配 `"images/x.png"`。
#[derive(Debug, Clone, Default)]
pub struct ReconcileRules {
    pub skip_files: Vec<String>,
    pub force_files: Vec<String>,
    /// 精确匹配、优先级最高的排除路径
    pub excluded: Vec<String>,
}

impl ReconcileRules {
    pub fn new(skip_files: Vec<String>, force_files: Vec<String>) -> Self {
        Self {
            skip_files,
            force_files,
            excluded: Vec::new(),
        }
    }

    pub fn with_excluded(mut self, path: impl Into<String>) -> Self {
        self.excluded.push(path.into());
        self
    }

    pub fn is_skipped(&self, path: &str) -> bool {
        self.excluded.iter().any(|p| p == path) || matches_prefix(&self.skip_files, path)
    }

    pub fn is_forced(&self, path: &str) -> bool {
        matches_prefix(&self.force_files, path)
    }
}

fn matches_prefix(prefixes: &[String], path: &str) -> bool {
    prefixes
        .iter()
        .any(|prefix| !prefix.is_empty() && path.starts_with(prefix.as_str()))
}

/// 单个条目的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skipped,
    Forced,
    Directory,
    Unchanged,
    Changed,
}

impl Decision {
    pub fn should_upload(self) -> bool {
        matches!(self, Decision::Forced | Decision::Changed)
    }
}

/// 按优先级判定单个条目
///
/// 1. 命中 skip 前缀 → 跳过
/// 2. 命中 force 前缀 → 上传
/// 3. 目录 → 跳过
/// 4. 清单中标记一致 → 跳过
/// 5. 其余 → 上传
pub fn decide(
    entry: &ScanEntry,
    root: &Path,
    manifest: &Manifest,
    rules: &ReconcileRules,
) -> Result<Decision, DeployError> {
    if rules.is_skipped(&entry.path) {
        return Ok(Decision::Skipped);
    }

    if rules.is_forced(&entry.path) {
        return Ok(Decision::Forced);
    }

    if entry.is_dir {
        return Ok(Decision::Directory);
    }

    let marker = Marker::for_file(&entry.path, &root.join(&entry.path))?;
    if manifest.is_unchanged(&entry.path, &marker) {
        return Ok(Decision::Unchanged);
    }

    Ok(Decision::Changed)
}

/// 挑出需要上传的文件，HTML 排在最后
pub fn select_uploads(
    entries: &[ScanEntry],
    root: &Path,
    manifest: &Manifest,
    rules: &ReconcileRules,
) -> Result<Vec<String>, DeployError> {
    let mut selected = Vec::new();

    for entry in entries {
        let decision = decide(entry, root, manifest, rules)?;
        debug!(path = %entry.path, ?decision, "reconciled");
        if decision.should_upload() {
            selected.push(entry.path.clone());
        }
    }

    Ok(html_last(selected))
}

/// 稳定分区：非 HTML 在前，HTML 在后，组内保持原顺序
pub fn html_last(files: Vec<String>) -> Vec<String> {
    let (html, mut assets): (Vec<String>, Vec<String>) =
        files.into_iter().partition(|f| is_html(f));
    assets.extend(html);
    assets
}
