// ==========================================
// 供应商库存上传 - 字段映射器实现
// ==========================================
// 职责: 源列 → StockRow 字段 + 类型转换 + 派生字段
// 红线: 单字段失败只记录 FormatError,其余字段照常映射,行始终产出
// ==========================================

use crate::domain::{DrumNo, LiName, StockRow};
use crate::engine::drum_set::{expand_range, union_checking_duplicates};
use crate::engine::error::{ReconcileError, RowError};
use crate::importer::importer_trait::{FieldMapper as FieldMapperTrait, MappedRow, RawRecord};

/// 源文件列名（去空白后精确匹配）
pub mod columns {
    pub const VENDOR: &str = "Vendor";
    pub const MATERIAL: &str = "Material";
    pub const DESCRIPTION: &str = "Description";
    pub const CONTRACT: &str = "Contract";
    pub const PO_NUMBER: &str = "PO Number";
    pub const PO_LINE_ITEM: &str = "PO line item";
    pub const LI_NO: &str = "Li No";
    pub const LI_DATE: &str = "LI Date";
    pub const BATCH_NO: &str = "Batch No.";
    pub const BATCH_DUE_DATE: &str = "Batch Due date";
    pub const DRUM_SIZE: &str = "Drum Size";
    pub const TOTAL_NO_OF_DRUMS: &str = "Total nos. of Drum";
    pub const AVAILABLE_DRUM_NOS: &str = "Available Drum Nos.";
    pub const AVAILABLE_FULL_DRUMS: &str = "Available Full Drums";
    pub const FULL_DRUM_TOTAL_QUANTITY: &str = "Full Drum Total Quantity";
    pub const BUFFER_DRUM_NO: &str = "Buffer Drum No.";
    pub const BUFFER_NO_OF_DRUMS: &str = "Buffer No. of Drum";
    pub const BUFFER_QUANTITY: &str = "Buffer Quantity";
    pub const SAMPLE_DRUM: &str = "Sample Drum (Yes/No)";
    pub const SAMPLE_DRUM_NO: &str = "Sample Drum No.";
    pub const SAMPLE_LENGTH: &str = "Sample Length (m)";
    pub const NO_OF_SHORT_LENGTH_DRUMS: &str = "No of Short length Drums";
    pub const SHORT_LENGTH_TOTAL_QUANTITY: &str = "Short Length total Quantity";
    pub const BATCH_TEST_REPORT_DATE: &str = "Batch Test Report Date";
    pub const REMARKS: &str = "Remarks";
    pub const BATCH_TEST_REPORT_FILE_NAME: &str = "Batch Test Report File Name";

    /// 文件顺序的全部必需列
    pub const REQUIRED: [&str; 26] = [
        VENDOR,
        MATERIAL,
        DESCRIPTION,
        CONTRACT,
        PO_NUMBER,
        PO_LINE_ITEM,
        LI_NO,
        LI_DATE,
        BATCH_NO,
        BATCH_DUE_DATE,
        DRUM_SIZE,
        TOTAL_NO_OF_DRUMS,
        AVAILABLE_DRUM_NOS,
        AVAILABLE_FULL_DRUMS,
        FULL_DRUM_TOTAL_QUANTITY,
        BUFFER_DRUM_NO,
        BUFFER_NO_OF_DRUMS,
        BUFFER_QUANTITY,
        SAMPLE_DRUM,
        SAMPLE_DRUM_NO,
        SAMPLE_LENGTH,
        NO_OF_SHORT_LENGTH_DRUMS,
        SHORT_LENGTH_TOTAL_QUANTITY,
        BATCH_TEST_REPORT_DATE,
        REMARKS,
        BATCH_TEST_REPORT_FILE_NAME,
    ];
}

use columns::*;

pub struct StockFieldMapper;

impl FieldMapperTrait for StockFieldMapper {
    fn map_to_stock_row(&self, record: &RawRecord, row_number: usize) -> MappedRow {
        let mut cx = MapContext {
            record,
            row_number,
            errors: Vec::new(),
        };

        let li_name = cx.parse_li_name(LI_NO);
        let drum_size = cx.parse_i64(DRUM_SIZE);
        let total_no_of_drums = cx.parse_i64(TOTAL_NO_OF_DRUMS);
        let available_drum_nos = cx.parse_drums(AVAILABLE_DRUM_NOS);
        let available_full_drums = cx.parse_i64(AVAILABLE_FULL_DRUMS);
        let full_drum_total_quantity = cx.parse_i64(FULL_DRUM_TOTAL_QUANTITY);
        let buffer_drum_nos = cx.parse_drums(BUFFER_DRUM_NO);
        let buffer_no_of_drums = cx.parse_i64(BUFFER_NO_OF_DRUMS);
        let buffer_quantity = cx.parse_i64(BUFFER_QUANTITY);
        let sample_drum_nos = cx.parse_drums(SAMPLE_DRUM_NO);
        let sample_lengths = cx.parse_lengths(SAMPLE_LENGTH);
        let no_of_short_length_drums = cx.parse_i64(NO_OF_SHORT_LENGTH_DRUMS);
        let short_length_total_qty = cx.parse_f64(SHORT_LENGTH_TOTAL_QUANTITY);

        // 派生: 审批桶号 = 可用 ∪ 缓冲 ∪ 取样（重复保留并上报）
        let (approved_drum_numbers, dup) = union_checking_duplicates(&[
            &available_drum_nos,
            &buffer_drum_nos,
            &sample_drum_nos,
        ]);
        if let Some(dup) = dup {
            cx.push(dup.with_context("approved drum numbers (available, buffer, sample)"));
        }

        // 派生: 总量 = 桶规格 × 总桶数（溢出时报错并置 0）
        let total_qty = match drum_size.checked_mul(total_no_of_drums) {
            Some(qty) => qty,
            None => {
                cx.push(ReconcileError::consistency(
                    "total quantity",
                    format!("桶规格 {} × 总桶数 {} 溢出", drum_size, total_no_of_drums),
                ));
                0
            }
        };

        let row = StockRow {
            vendor: cx.get_string(VENDOR),
            material_code: cx.get_string(MATERIAL),
            material_desc: cx.get_string(DESCRIPTION),
            contract_no: cx.get_string(CONTRACT),
            po_number: cx.get_string(PO_NUMBER),
            po_line_item: cx.get_string(PO_LINE_ITEM),
            li_name,
            li_date: cx.get_string(LI_DATE),
            batch_no: cx.get_string(BATCH_NO),
            batch_due_date: cx.get_string(BATCH_DUE_DATE),
            drum_size,
            total_no_of_drums,
            total_qty,
            available_drum_nos,
            available_full_drums,
            full_drum_total_quantity,
            buffer_drum_nos,
            buffer_no_of_drums,
            buffer_quantity,
            sample_drum: cx.get_string(SAMPLE_DRUM),
            sample_drum_nos,
            sample_lengths,
            no_of_short_length_drums,
            short_length_total_qty,
            approved_drum_numbers,
            batch_test_report_date: cx.get_string(BATCH_TEST_REPORT_DATE),
            remarks: cx.get_string(REMARKS),
            batch_test_report_file_name: cx.get_string(BATCH_TEST_REPORT_FILE_NAME),
            row_number,
        };

        MappedRow {
            row,
            errors: cx.errors,
        }
    }
}

// ==========================================
// MapContext - 单行映射上下文（累积错误）
// ==========================================
struct MapContext<'a> {
    record: &'a RawRecord,
    row_number: usize,
    errors: Vec<RowError>,
}

impl MapContext<'_> {
    fn push(&mut self, error: ReconcileError) {
        self.errors.push(RowError::new(self.row_number, error));
    }

    /// 提取字符串字段（缺列视为空）
    fn get_string(&self, key: &str) -> String {
        self.record
            .get(key)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// "CODE-NUMBER" → LiName;不是恰好两段时报错并返回空值
    fn parse_li_name(&mut self, key: &str) -> LiName {
        let raw = self.get_string(key);
        let parts: Vec<&str> = raw.split('-').collect();
        match parts.as_slice() {
            [code, number] => LiName::new(code.trim(), number.trim()),
            _ => {
                self.push(ReconcileError::format(
                    key,
                    format!("invalid LI Name format: '{}'", raw),
                ));
                LiName::default()
            }
        }
    }

    /// 解析整数（空值同样报错）
    fn parse_i64(&mut self, key: &str) -> i64 {
        let value = self.get_string(key);
        match value.parse::<i64>() {
            Ok(v) => v,
            Err(_) => {
                self.push(ReconcileError::format(
                    key,
                    format!("无法解析为整数: '{}'", value),
                ));
                0
            }
        }
    }

    /// 解析浮点数（空值同样报错）
    fn parse_f64(&mut self, key: &str) -> f64 {
        let value = self.get_string(key);
        match value.parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                self.push(ReconcileError::format(
                    key,
                    format!("无法解析为浮点数: '{}'", value),
                ));
                0.0
            }
        }
    }

    /// 解析桶号区间描述（空值为空集合）
    fn parse_drums(&mut self, key: &str) -> Vec<DrumNo> {
        match expand_range(&self.get_string(key)) {
            Ok(drums) => drums,
            Err(err) => {
                let message = match err {
                    ReconcileError::Format { message, .. } => message,
                    other => other.to_string(),
                };
                self.push(ReconcileError::format(key, message));
                Vec::new()
            }
        }
    }

    /// 逗号分隔的取样长度;空值或 "0" 视为无取样
    fn parse_lengths(&mut self, key: &str) -> Vec<f64> {
        let value = self.get_string(key);
        if value.is_empty() || value == "0" {
            return Vec::new();
        }

        let parsed: Result<Vec<f64>, _> = value
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect();

        match parsed {
            Ok(lengths) => lengths,
            Err(_) => {
                self.push(ReconcileError::format(
                    key,
                    format!("无法解析取样长度: '{}'", value),
                ));
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        let mut row: HashMap<String, String> = REQUIRED
            .iter()
            .map(|h| (h.to_string(), String::new()))
            .collect();
        for (k, v) in pairs {
            row.insert(k.to_string(), v.to_string());
        }
        row
    }

    fn numeric_defaults() -> Vec<(&'static str, &'static str)> {
        vec![
            (LI_NO, "LI-001"),
            (DRUM_SIZE, "500"),
            (TOTAL_NO_OF_DRUMS, "4"),
            (AVAILABLE_FULL_DRUMS, "2"),
            (FULL_DRUM_TOTAL_QUANTITY, "1000"),
            (BUFFER_NO_OF_DRUMS, "1"),
            (BUFFER_QUANTITY, "500"),
            (NO_OF_SHORT_LENGTH_DRUMS, "1"),
            (SHORT_LENGTH_TOTAL_QUANTITY, "497.5"),
        ]
    }

    fn field_of(error: &RowError) -> String {
        match &error.error {
            ReconcileError::Format { field, .. } => field.clone(),
            other => panic!("期望 FormatError,实际 {:?}", other),
        }
    }

    #[test]
    fn test_field_mapper_basic() {
        let mut pairs = numeric_defaults();
        pairs.extend([
            (VENDOR, " Acme "),
            (CONTRACT, "C1"),
            (AVAILABLE_DRUM_NOS, "1-2"),
            (BUFFER_DRUM_NO, "3"),
            (SAMPLE_DRUM_NO, "4"),
            (SAMPLE_LENGTH, "2.5"),
            (BATCH_TEST_REPORT_DATE, "01-02-2024"),
        ]);
        let mapped = StockFieldMapper.map_to_stock_row(&record(&pairs), 3);

        assert!(mapped.errors.is_empty(), "{:?}", mapped.errors);
        let row = mapped.row;
        assert_eq!(row.vendor, "Acme");
        assert_eq!(row.li_name, LiName::new("LI", "001"));
        assert_eq!(row.total_qty, 2000);
        assert_eq!(row.available_drum_nos, vec![1, 2]);
        assert_eq!(row.approved_drum_numbers, vec![1, 2, 3, 4]);
        assert_eq!(row.sample_lengths, vec![2.5]);
        assert_eq!(row.short_length_total_qty, 497.5);
        assert_eq!(row.row_number, 3);
    }

    #[test]
    fn test_li_name_must_have_two_parts() {
        for raw in ["LI001", "LI-0-1", ""] {
            let mut pairs = numeric_defaults();
            pairs.push((LI_NO, raw));
            let mapped = StockFieldMapper.map_to_stock_row(&record(&pairs), 1);

            assert_eq!(mapped.errors.len(), 1, "'{}' 应只报一条错误", raw);
            assert_eq!(field_of(&mapped.errors[0]), LI_NO);
            assert_eq!(mapped.row.li_name, LiName::default());
        }
    }

    #[test]
    fn test_every_bad_field_is_collected() {
        let mut pairs = numeric_defaults();
        pairs.extend([
            (DRUM_SIZE, "big"),
            (BUFFER_QUANTITY, ""),
            (AVAILABLE_DRUM_NOS, "a-b"),
            (SAMPLE_LENGTH, "2.5,x"),
        ]);
        let mapped = StockFieldMapper.map_to_stock_row(&record(&pairs), 9);

        let fields: Vec<String> = mapped.errors.iter().map(field_of).collect();
        assert_eq!(
            fields,
            vec![DRUM_SIZE, AVAILABLE_DRUM_NOS, BUFFER_QUANTITY, SAMPLE_LENGTH]
        );
        assert!(mapped.errors.iter().all(|e| e.row_no == 9));
        // 失败字段取零值,行仍产出
        assert_eq!(mapped.row.drum_size, 0);
        assert_eq!(mapped.row.total_qty, 0);
        assert!(mapped.row.available_drum_nos.is_empty());
    }

    #[test]
    fn test_sample_length_zero_or_blank_is_empty() {
        for raw in ["", "0"] {
            let mut pairs = numeric_defaults();
            pairs.push((SAMPLE_LENGTH, raw));
            let mapped = StockFieldMapper.map_to_stock_row(&record(&pairs), 1);
            assert!(mapped.row.sample_lengths.is_empty());
            assert!(mapped.errors.is_empty(), "{:?}", mapped.errors);
        }
    }

    #[test]
    fn test_overlapping_sets_reported_and_kept() {
        let mut pairs = numeric_defaults();
        pairs.extend([(AVAILABLE_DRUM_NOS, "1-3"), (BUFFER_DRUM_NO, "3")]);
        let mapped = StockFieldMapper.map_to_stock_row(&record(&pairs), 2);

        assert_eq!(mapped.row.approved_drum_numbers, vec![1, 2, 3, 3]);
        assert_eq!(mapped.errors.len(), 1);
        assert_eq!(mapped.errors[0].error.kind(), "DuplicateError");
    }

    #[test]
    fn test_overflowing_total_quantity_is_reported() {
        let mut pairs = numeric_defaults();
        pairs.push((DRUM_SIZE, "9223372036854775807"));
        pairs.push((TOTAL_NO_OF_DRUMS, "2"));
        let mapped = StockFieldMapper.map_to_stock_row(&record(&pairs), 4);

        assert_eq!(mapped.row.total_qty, 0);
        assert_eq!(mapped.row.drum_size, i64::MAX);
        assert_eq!(mapped.errors.len(), 1);
        assert_eq!(mapped.errors[0].row_no, 4);
        assert_eq!(mapped.errors[0].error.kind(), "ConsistencyError");
    }
}
