// ==========================================
// 供应商库存上传 - 库存导入器
// ==========================================
// 职责: 整合上传流程,从文件到层级模型
// 流程: 解析 → 表头检查 → 字段映射 → 行校验 → 对账 → 重叠校验
// 红线: 行级问题只进入报告错误列表;仅输入无法读取时返回 Err
// ==========================================

use crate::config::UploadConfigReader;
use crate::domain::{StockRow, UploadInventory};
use crate::engine::row_validator::DEFAULT_DATE_FORMAT;
use crate::engine::{run_upload, RowError};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::exporter::format_error_line;
use crate::importer::field_mapper::{columns, StockFieldMapper};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{FieldMapper, FileParser, RawRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// UploadReport - 单次上传运行结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub total_rows: usize,
    pub inventory: UploadInventory,
    pub errors: Vec<RowError>,
    pub elapsed_ms: u64,
}

impl UploadReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 至少产生一条错误的行数（不含运行级错误）
    pub fn error_row_count(&self) -> usize {
        let mut rows: Vec<usize> = self
            .errors
            .iter()
            .map(|e| e.row_no)
            .filter(|&r| r > 0)
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows.len()
    }
}

// ==========================================
// StockImporter - 库存导入器
// ==========================================
pub struct StockImporter<C>
where
    C: UploadConfigReader,
{
    // 配置读取器
    config: C,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
}

impl<C> StockImporter<C>
where
    C: UploadConfigReader,
{
    /// 使用默认组件（按扩展名解析 + 标准列映射）
    ///
    /// Excel 日期单元格按配置的日期格式转为文本
    pub fn new(config: C) -> Self {
        let date_format = config
            .get_date_format()
            .unwrap_or_else(|_| DEFAULT_DATE_FORMAT.to_string());
        Self::with_components(
            config,
            Box::new(UniversalFileParser::new(&date_format)),
            Box::new(StockFieldMapper),
        )
    }

    pub fn with_components(
        config: C,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
    ) -> Self {
        Self {
            config,
            file_parser,
            field_mapper,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 从文件导入
    ///
    /// # 返回
    /// - Ok(UploadReport): 模型 + 全部行级错误
    /// - Err: 文件不存在、格式不支持、解析失败、表头缺失、配置无效
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<UploadReport> {
        let file_path = file_path.as_ref();

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let sheet = self
            .file_parser
            .parse_to_raw_records(file_path)
            .map_err(|e| {
                error!(error = %e, "文件解析失败");
                e
            })?;

        // === 步骤 2: 表头检查 ===
        let missing = sheet.missing_headers(&columns::REQUIRED);
        if !missing.is_empty() {
            error!(missing = ?missing, "表头缺失");
            return Err(ImportError::HeaderMissing(missing));
        }

        info!(total_rows = sheet.records.len(), "文件解析完成");
        self.import_records(&sheet.records)
    }

    /// 对已解析的原始行记录运行上传流程
    pub fn import_records(&self, records: &[RawRecord]) -> ImportResult<UploadReport> {
        let start_time = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, total_rows = records.len(), "开始库存上传");

        let rules = self.config.validation_rules()?;
        let approval_comment = self.config.get_approval_comment()?;

        // === 步骤 3: 字段映射（行号 = 下标 + 1） ===
        debug!("步骤 3: 字段映射");
        let (rows, field_errors) = self.map_records(records);

        // === 步骤 4: 校验 + 对账 + 重叠校验 ===
        debug!("步骤 4: 引擎运行");
        let outcome = run_upload(&rows, field_errors, &rules, &approval_comment);

        for row_error in &outcome.errors {
            warn!(run_id = %run_id, "{}", format_error_line(row_error));
        }

        let report = UploadReport {
            run_id,
            started_at,
            total_rows: rows.len(),
            inventory: outcome.inventory,
            errors: outcome.errors,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            run_id = %run_id,
            total_rows = report.total_rows,
            contracts = report.inventory.contracts.len(),
            errors = report.errors.len(),
            error_rows = report.error_row_count(),
            elapsed_ms = report.elapsed_ms,
            "库存上传完成"
        );
        Ok(report)
    }

    fn map_records(&self, records: &[RawRecord]) -> (Vec<StockRow>, Vec<RowError>) {
        let mut rows = Vec::with_capacity(records.len());
        let mut errors = Vec::new();

        for (idx, record) in records.iter().enumerate() {
            let mapped = self.field_mapper.map_to_stock_row(record, idx + 1);
            rows.push(mapped.row);
            errors.extend(mapped.errors);
        }

        (rows, errors)
    }
}
