use backon::Retryable;
use futures::stream::{self, Stream, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cfg::RetryConfig;
use crate::deploy::{AssetSink, DeployError, UploadTask};
use crate::oss::ObjectStoreError;

/// 上传进度回调
pub trait UploadObserver: Send + Sync {
    /// 开始上传，`total` 为任务总数
    fn on_start(&self, _total: usize) {}

    /// 单个文件上传结束（含重试）
    fn on_complete(&self, task: &UploadTask, error: Option<&DeployError>);

    /// 全部结束
    fn on_finish(&self) {}
}

/// 单个任务的上传结果
#[derive(Debug)]
pub struct UploadOutcome {
    /// 任务在调度列表中的位置
    pub index: usize,
    pub task: UploadTask,
    pub result: Result<(), DeployError>,
}

/// 为选中的文件构建上传任务，磁盘上是目录的条目会被丢弃
pub fn build_tasks(root: &Path, files: &[String], dest_prefix: &str) -> Vec<UploadTask> {
    files
        .iter()
        .map(|rel| UploadTask::new(root, rel, dest_prefix))
        .filter(|task| {
            let keep = !task.local_path.is_dir();
            if !keep {
                debug!(path = %task.rel_path, "skip directory entry");
            }
            keep
        })
        .collect()
}

/// 有界并发上传器
///
/// 任务按列表顺序进入并发池，同时最多 `concurrency` 个在途，
/// 任意一个完成后下一个立即补上；单个失败不影响其他任务。
pub struct Uploader {
    sink: Arc<dyn AssetSink>,
    concurrency: usize,
    retry: RetryConfig,
    observer: Option<Arc<dyn UploadObserver>>,
}

impl Uploader {
    pub fn new(sink: Arc<dyn AssetSink>, concurrency: usize, retry: RetryConfig) -> Self {
        Self {
            sink,
            concurrency: concurrency.max(1),
            retry,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Option<Arc<dyn UploadObserver>>) -> Self {
        self.observer = observer;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// 上传全部任务，结果按完成顺序产出
    pub fn upload(&self, tasks: Vec<UploadTask>) -> impl Stream<Item = UploadOutcome> + '_ {
        if let Some(observer) = &self.observer {
            observer.on_start(tasks.len());
        }

        stream::iter(tasks.into_iter().enumerate())
            .map(move |(index, task)| async move {
                let result = self.upload_one(&task).await;
                if let Some(observer) = &self.observer {
                    observer.on_complete(&task, result.as_ref().err());
                }
                UploadOutcome {
                    index,
                    task,
                    result,
                }
            })
            .buffer_unordered(self.concurrency)
    }

    async fn upload_one(&self, task: &UploadTask) -> Result<(), DeployError> {
        let sink = self.sink.as_ref();

        (|| sink.upload_asset(task))
            .retry(self.retry.build_backoff())
            .when(is_retryable)
            .notify(|err: &DeployError, delay: Duration| {
                warn!(
                    key = %task.key,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "upload failed, retrying"
                );
            })
            .await
    }
}

/// 本地文件问题重试无意义
fn is_retryable(err: &DeployError) -> bool {
    !matches!(
        err,
        DeployError::Upload {
            source: ObjectStoreError::Io(_) | ObjectStoreError::NotAFile { .. },
            ..
        } | DeployError::Io(_)
    )
}
