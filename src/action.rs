//! GitHub Actions 工作流命令
//!
//! 输出写入 `$GITHUB_OUTPUT` 文件；未设置时退回到 `::set-output` 命令

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// 是否运行在 CI 环境中
pub fn in_ci() -> bool {
    std::env::var("CI")
        .map(|v| !v.is_empty() && v != "false" && v != "0")
        .unwrap_or(false)
}

/// 设置 Action 输出
pub fn set_output(name: &str, value: &str) -> std::io::Result<()> {
    match std::env::var_os("GITHUB_OUTPUT").filter(|v| !v.is_empty()) {
        Some(path) => append_output(Path::new(&path), name, value),
        None => {
            println!("::set-output name={}::{}", name, escape_data(value));
            Ok(())
        }
    }
}

/// 以 heredoc 形式追加输出，值中可以包含换行
fn append_output(path: &Path, name: &str, value: &str) -> std::io::Result<()> {
    let mut delimiter = String::from("ghadelimiter");
    while value.contains(&delimiter) {
        delimiter.push('_');
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}<<{}", name, delimiter)?;
    writeln!(file, "{}", value)?;
    writeln!(file, "{}", delimiter)?;
    Ok(())
}

/// 输出错误注解
pub fn error(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// 输出警告注解
pub fn warning(message: &str) {
    println!("::warning::{}", escape_data(message));
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
