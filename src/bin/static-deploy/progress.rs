// Progress bar display for static-deploy

use indicatif::{ProgressBar, ProgressStyle};
use static_deploy::deploy::{DeployError, UploadObserver, UploadTask};
use std::sync::atomic::{AtomicU64, Ordering};

/// Create a progress bar for the upload queue
pub fn create_upload_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Upload observer that drives an indicatif progress bar
pub struct UploadProgressBar {
    bar: ProgressBar,
    transferred_bytes: AtomicU64,
}

impl UploadProgressBar {
    pub fn new() -> Self {
        Self {
            bar: create_upload_progress_bar(),
            transferred_bytes: AtomicU64::new(0),
        }
    }
}

impl UploadObserver for UploadProgressBar {
    fn on_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn on_complete(&self, task: &UploadTask, error: Option<&DeployError>) {
        match error {
            Some(err) => self.bar.println(format!("Failed: {} - {}", task.rel_path, err)),
            None => {
                let size = std::fs::metadata(&task.local_path).map(|m| m.len()).unwrap_or(0);
                let total = self.transferred_bytes.fetch_add(size, Ordering::Relaxed) + size;
                self.bar.set_message(format!("{} ({})", task.rel_path, format_bytes(total)));
            }
        }
        self.bar.inc(1);
    }

    fn on_finish(&self) {
        self.bar.finish_with_message(format!(
            "done ({})",
            format_bytes(self.transferred_bytes.load(Ordering::Relaxed))
        ));
    }
}

/// Format bytes into human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format timestamp into human-readable string
pub fn format_timestamp(timestamp: &chrono::DateTime<chrono::Local>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}
