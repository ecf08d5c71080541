// ==========================================
// 供应商库存上传 - 命令行入口
// ==========================================
// 用法: vendor-stock-upload [input] [output.json] [config.json]
// 输出: JSON 层级模型 + 错误清单;运行日志追加到配置的日志文件
// 红线: 行级错误不影响退出码,仅 I/O 失败返回非零
// ==========================================

use anyhow::Context;
use std::path::{Path, PathBuf};
use vendor_stock_upload::config::{ConfigManager, UploadConfigReader};
use vendor_stock_upload::importer::{write_error_log, write_json_file, StockImporter};
use vendor_stock_upload::{logging, APP_NAME, VERSION};

const DEFAULT_INPUT_FILE: &str = "stock.csv";
const DEFAULT_CONFIG_FILE: &str = "config.json";

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| DEFAULT_INPUT_FILE.to_string());
    let output_arg = args.next();
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    let config = ConfigManager::load(&config_path)
        .with_context(|| format!("无法加载配置: {}", config_path))?;

    let log_file = config.get_log_file()?;
    logging::init_with_file(&log_file)
        .with_context(|| format!("无法打开日志文件: {}", log_file))?;

    tracing::info!("==================================================");
    tracing::info!("{} - 系统版本: {}", APP_NAME, VERSION);
    tracing::info!("==================================================");

    let output = match output_arg {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(config.get_output_file()?),
    };
    let errors_file = error_list_path(&output);

    let importer = StockImporter::new(config);
    let report = importer
        .import_file(&input)
        .with_context(|| format!("上传失败: {}", input))?;

    write_json_file(&output, &report.inventory)?;
    write_error_log(&errors_file, &report.errors)?;

    tracing::info!(
        run_id = %report.run_id,
        input = %input,
        output = %output.display(),
        errors_file = %errors_file.display(),
        total_rows = report.total_rows,
        error_rows = report.error_row_count(),
        errors = report.errors.len(),
        "上传结束"
    );
    Ok(())
}

/// output.json → output.errors.log
fn error_list_path(output: &Path) -> PathBuf {
    output.with_extension("errors.log")
}
