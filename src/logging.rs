// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别与输出格式
// ==========================================

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{fmt, EnvFilter};

/// 输出格式环境变量（取值 json 时输出 JSON 行）
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

fn env_filter() -> EnvFilter {
    // 从环境变量读取日志级别，默认为 info
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn json_requested() -> bool {
    std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=vendor_stock_upload=trace
/// - LOG_FORMAT: json 时输出结构化 JSON
///
/// # 示例
/// ```no_run
/// use vendor_stock_upload::logging;
/// logging::init();
/// ```
pub fn init() {
    if json_requested() {
        fmt().json().with_env_filter(env_filter()).init();
        return;
    }

    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化日志系统,同时追加写入日志文件
///
/// 控制台与文件输出同一事件流;文件不带 ANSI 颜色,LOG_FORMAT=json 时两者均为 JSON 行
pub fn init_with_file<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())?;
    let writer = std::io::stdout.and(Mutex::new(file));

    if json_requested() {
        fmt()
            .json()
            .with_env_filter(env_filter())
            .with_writer(writer)
            .init();
        return Ok(());
    }

    fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .init();
    Ok(())
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
