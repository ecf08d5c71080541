// ==========================================
// 供应商库存上传 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 约定: 首行为表头,单元格去首尾空白,完全空白的行跳过
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, RawRecord, RawSheet};
use crate::engine::row_validator::DEFAULT_DATE_FORMAT;
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 按表头组装一行;全部为空时返回 None
fn build_record<I>(headers: &[String], cells: I) -> Option<RawRecord>
where
    I: IntoIterator<Item = String>,
{
    let mut row_map = HashMap::new();
    for (col_idx, value) in cells.into_iter().enumerate() {
        if let Some(header) = headers.get(col_idx) {
            row_map.insert(header.clone(), value.trim().to_string());
        }
    }

    if row_map.values().all(|v| v.is_empty()) {
        return None;
    }
    Some(row_map)
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<RawSheet> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            if let Some(row_map) = build_record(&headers, record.iter().map(str::to_string)) {
                records.push(row_map);
            }
        }

        debug!(file = %file_path.display(), rows = records.len(), "CSV 解析完成");
        Ok(RawSheet { headers, records })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 仅读取第一个工作表;日期单元格按配置的日期格式转为文本
pub struct ExcelParser {
    date_format: String,
}

impl ExcelParser {
    pub fn new(date_format: &str) -> Self {
        Self {
            date_format: date_format.to_string(),
        }
    }

    /// 工作表区域 → 表头 + 行记录
    pub fn range_to_sheet(&self, range: &Range<Data>) -> ImportResult<RawSheet> {
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无表头行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let records: Vec<RawRecord> = rows
            .filter_map(|data_row| {
                build_record(
                    &headers,
                    data_row.iter().map(|c| cell_to_string(c, &self.date_format)),
                )
            })
            .collect();

        Ok(RawSheet { headers, records })
    }
}

impl Default for ExcelParser {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

/// 单元格文本化: 日期类型按日期格式输出,其余沿用 calamine 的文本表示（整数值浮点输出不带小数部分）
fn cell_to_string(cell: &Data, date_format: &str) -> String {
    match cell {
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
            Some(date) => date.format(date_format).to_string(),
            None => cell.to_string(),
        },
        other => other.to_string(),
    }
}

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<RawSheet> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;
        let sheet = self.range_to_sheet(&range)?;

        debug!(file = %file_path.display(), sheet = %sheet_name, rows = sheet.records.len(), "Excel 解析完成");
        Ok(sheet)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
#[derive(Default)]
pub struct UniversalFileParser {
    excel: ExcelParser,
}

impl UniversalFileParser {
    pub fn new(date_format: &str) -> Self {
        Self {
            excel: ExcelParser::new(date_format),
        }
    }
}

impl FileParser for UniversalFileParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<RawSheet> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_to_raw_records(file_path),
            "xlsx" | "xls" => self.excel.parse_to_raw_records(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}
