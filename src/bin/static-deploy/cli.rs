// CLI argument definitions using clap

use clap::Parser;
use serde_json::{Map, Value};

#[derive(Parser, Debug)]
#[command(name = "static-deploy")]
#[command(version)]
#[command(about = "Incrementally deploy static assets to Tencent COS or CloudBase hosting", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ./static-deploy.yaml, ignored in CI)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Read GitHub Action inputs even when CI is not set
    #[arg(long)]
    pub action: bool,

    /// Ignore the remote manifest and upload everything
    #[arg(long)]
    pub force: bool,

    /// Only print the files that would be uploaded
    #[arg(long)]
    pub dry_run: bool,

    /// Number of concurrent uploads (default depends on target)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Keep the generated manifest file in the workspace
    #[arg(long)]
    pub keep_manifest: bool,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Flags that override loaded configuration, keyed by config field name
    pub fn overrides(&self) -> Option<Value> {
        let mut map = Map::new();
        if self.force {
            map.insert("isForce".to_string(), Value::Bool(true));
        }
        if self.dry_run {
            map.insert("dryRun".to_string(), Value::Bool(true));
        }
        if self.keep_manifest {
            map.insert("keepLocalManifest".to_string(), Value::Bool(true));
        }
        if let Some(concurrency) = self.concurrency {
            map.insert("concurrency".to_string(), Value::from(concurrency));
        }

        if map.is_empty() {
            None
        } else {
            Some(Value::Object(map))
        }
    }

    /// Default log filter derived from verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
