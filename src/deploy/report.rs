use serde::Serialize;

/// 上传失败的文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: String,
    pub error: String,
}

/// 一次部署的结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeployReport {
    /// 部署目标（cos / hosting）
    pub target: String,
    /// 扫描到的文件数（不含目录）
    pub scanned: usize,
    /// 对比后需要上传的文件，按调度顺序
    pub planned: Vec<String>,
    /// 本次增量上传成功的文件，按调度顺序
    pub uploaded: Vec<String>,
    pub failed: Vec<FailedFile>,
    pub dry_run: bool,
}

impl DeployReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Action 输出 `deployResult` 的内容：增量上传文件列表的 JSON
    pub fn deploy_result(&self) -> String {
        serde_json::to_string(&self.uploaded).unwrap_or_else(|_| "[]".to_string())
    }
}
