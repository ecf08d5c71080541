// ==========================================
// 供应商库存上传 - 导入管道 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 阶段: 文件解析 → 字段映射 → 引擎
// ==========================================

use crate::domain::StockRow;
use crate::engine::RowError;
use crate::importer::error::ImportResult;
use std::collections::HashMap;
use std::path::Path;

/// 原始行记录（列名 → 已去空白的单元格文本）
pub type RawRecord = HashMap<String, String>;

// ==========================================
// RawSheet - 解析后的原始表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawSheet {
    /// 返回 `required` 中表头缺失的列名（保持 `required` 顺序）
    pub fn missing_headers(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|h| !self.headers.iter().any(|existing| existing == *h))
            .map(|h| h.to_string())
            .collect()
    }
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表
    ///
    /// # 返回
    /// - Ok(RawSheet): 表头 + 非空行记录（文件顺序）
    /// - Err: 文件不存在、格式不支持、解析失败
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<RawSheet>;
}

// ==========================================
// MappedRow - 字段映射结果
// ==========================================
// 映射失败的字段取零值/空值,行仍然产出
#[derive(Debug, Clone, Default)]
pub struct MappedRow {
    pub row: StockRow,
    pub errors: Vec<RowError>,
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 原始行记录 → StockRow,逐字段收集错误
// 实现者: StockFieldMapper
pub trait FieldMapper: Send + Sync {
    /// # 参数
    /// - record: 原始行记录
    /// - row_number: 行号（1 起,不含表头）
    fn map_to_stock_row(&self, record: &RawRecord, row_number: usize) -> MappedRow;
}
