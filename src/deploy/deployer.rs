use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::cfg::DeployConfig;
use crate::deploy::reconcile::{select_uploads, ReconcileRules};
use crate::deploy::scan::scan_files;
use crate::deploy::uploader::{build_tasks, UploadObserver, Uploader};
use crate::deploy::{AssetSink, DeployError, DeployReport, FailedFile, Manifest, Marker};

/// 增量部署流程
///
/// 读取远端清单 → 扫描本地文件 → 对比 → 有界并发上传 → 写回清单
pub struct Deployer {
    config: DeployConfig,
    sink: Arc<dyn AssetSink>,
    observer: Option<Arc<dyn UploadObserver>>,
}

impl Deployer {
    pub fn new(config: DeployConfig, sink: Arc<dyn AssetSink>) -> Self {
        Self {
            config,
            sink,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn UploadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// 执行一次部署
    ///
    /// 单个文件上传失败不会中断部署，只会出现在 `report.failed` 中；
    /// 清单写回失败则整体失败。
    pub async fn run(&self) -> Result<DeployReport, DeployError> {
        let root = self.config.source_dir();
        let mut report = DeployReport {
            target: self.sink.name().to_string(),
            dry_run: self.config.dry_run,
            ..Default::default()
        };

        let mut manifest = self.load_manifest().await;

        let entries = scan_files(&root)?;
        report.scanned = entries.iter().filter(|e| !e.is_dir).count();

        let mut rules = ReconcileRules::new(
            self.config.skip_files.clone(),
            self.config.force_files.clone(),
        );
        // 保留在资源目录里的本地清单不能当作资源上传
        if let Some(manifest_path) = self.config.manifest_in_source() {
            rules = rules.with_excluded(manifest_path);
        }
        let selected = select_uploads(&entries, &root, &manifest, &rules)?;
        info!(
            target_kind = %self.sink.name(),
            source = %root.display(),
            scanned = report.scanned,
            selected = selected.len(),
            "reconciled local files against manifest"
        );

        let tasks = build_tasks(&root, &selected, &self.config.dest_path);
        report.planned = tasks.iter().map(|t| t.rel_path.clone()).collect();

        if self.config.dry_run {
            info!(planned = report.planned.len(), "dry run, nothing uploaded");
            return Ok(report);
        }

        let concurrency = self.config.concurrency.unwrap_or_else(|| self.sink.concurrency());
        let uploader = Uploader::new(self.sink.clone(), concurrency, self.config.retry.clone())
            .with_observer(self.observer.clone());

        info!(tasks = tasks.len(), concurrency = uploader.concurrency(), "start uploading");

        let outcomes = uploader.upload(tasks);
        futures::pin_mut!(outcomes);

        let mut uploaded = Vec::new();
        let mut failed = Vec::new();

        // 清单只在这里修改，上传任务本身不接触清单
        while let Some(outcome) = outcomes.next().await {
            let index = outcome.index;
            let task = outcome.task;
            if let Err(e) = outcome.result {
                error!(path = %task.rel_path, key = %task.key, error = %e, "upload failed");
                failed.push((
                    index,
                    FailedFile {
                        path: task.rel_path,
                        error: e.to_string(),
                    },
                ));
                continue;
            }

            match Marker::for_file(&task.rel_path, &task.local_path) {
                Ok(marker) => {
                    info!(path = %task.rel_path, key = %task.key, "uploaded");
                    manifest.record(task.rel_path.clone(), marker);
                    uploaded.push((index, task.rel_path));
                }
                Err(e) => {
                    error!(path = %task.rel_path, error = %e, "uploaded but failed to fingerprint");
                    failed.push((
                        index,
                        FailedFile {
                            path: task.rel_path,
                            error: e.to_string(),
                        },
                    ));
                }
            }
        }

        // 结果按完成顺序到达，报告按调度顺序输出
        uploaded.sort_by_key(|(index, _)| *index);
        failed.sort_by_key(|(index, _)| *index);
        report.uploaded = uploaded.into_iter().map(|(_, path)| path).collect();
        report.failed = failed.into_iter().map(|(_, file)| file).collect();

        if let Some(observer) = &self.observer {
            observer.on_finish();
        }

        info!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            "finish uploading"
        );

        self.persist_manifest(&manifest).await?;

        Ok(report)
    }

    /// 获取远端清单，任何失败都视为空清单
    async fn load_manifest(&self) -> Manifest {
        if self.config.force {
            info!("force mode, ignoring remote manifest");
            return Manifest::new();
        }

        match self.sink.fetch_manifest().await {
            Ok(manifest) => {
                info!(entries = manifest.len(), "loaded remote manifest");
                manifest
            }
            Err(e) if e.is_manifest_missing() => {
                info!("remote manifest not found, uploading everything");
                Manifest::new()
            }
            Err(e) => {
                warn!(error = %e, "failed to load remote manifest, uploading everything");
                Manifest::new()
            }
        }
    }

    /// 写本地清单并上传覆盖远端清单
    async fn persist_manifest(&self, manifest: &Manifest) -> Result<(), DeployError> {
        let path = self.config.local_manifest_path();

        manifest
            .write_to(&path)
            .map_err(|e| DeployError::ManifestPersist(format!("{}: {}", path.display(), e)))?;

        self.sink
            .store_manifest(&path)
            .await
            .map_err(|e| DeployError::ManifestPersist(e.to_string()))?;

        info!(path = %path.display(), entries = manifest.len(), "manifest stored");

        if !self.config.keep_local_manifest {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "failed to remove local manifest");
            }
        }

        Ok(())
    }
}
