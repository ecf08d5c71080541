// ==========================================
// 供应商库存上传 - 结果导出
// ==========================================
// 输出: 层级模型 JSON（pretty）+ 纯文本错误日志
// 错误日志行格式: [Stock Upload] Error: Row {n}: {message}
// ==========================================

use crate::domain::UploadInventory;
use crate::engine::RowError;
use crate::importer::error::{ImportError, ImportResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const ERROR_LOG_PREFIX: &str = "[Stock Upload] Error: ";

/// 模型 → pretty JSON 字符串
pub fn export_json(inventory: &UploadInventory) -> ImportResult<String> {
    Ok(serde_json::to_string_pretty(inventory)?)
}

pub fn write_json_file<P: AsRef<Path>>(path: P, inventory: &UploadInventory) -> ImportResult<()> {
    let path = path.as_ref();
    let json = export_json(inventory)?;
    std::fs::write(path, json).map_err(|e| write_error(path, e))?;

    info!(file = %path.display(), contracts = inventory.contracts.len(), "JSON 导出完成");
    Ok(())
}

/// 单条错误的日志行
pub fn format_error_line(error: &RowError) -> String {
    format!("{}{}", ERROR_LOG_PREFIX, error)
}

/// 写出错误日志（覆盖写,每条错误一行;无错误时生成空文件）
pub fn write_error_log<P: AsRef<Path>>(path: P, errors: &[RowError]) -> ImportResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| write_error(path, e))?;
    let mut writer = BufWriter::new(file);

    for error in errors {
        writeln!(writer, "{}", format_error_line(error)).map_err(|e| write_error(path, e))?;
    }
    writer.flush().map_err(|e| write_error(path, e))?;

    info!(file = %path.display(), errors = errors.len(), "错误日志写出完成");
    Ok(())
}

fn write_error(path: &Path, err: std::io::Error) -> ImportError {
    ImportError::FileWriteError {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
