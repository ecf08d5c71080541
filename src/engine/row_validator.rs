// ==========================================
// 供应商库存上传 - 行记录校验器
// ==========================================
// 职责: 单行内部一致性校验（必填/格式/数量恒等式/桶数一致）
// 红线: 各项独立校验、全部收集,任一失败不短路其他校验
// ==========================================

use crate::domain::StockRow;
use crate::engine::error::{ReconcileError, RowError};
use chrono::NaiveDate;
use regex::Regex;

/// 浮点数量比较容差
pub const QTY_EPSILON: f64 = 1e-6;

pub const DEFAULT_DRUM_SIZES: [i64; 4] = [250, 300, 500, 1000];
pub const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y";
pub const DEFAULT_BATCH_NO_PATTERN: &str = r"^\d{1,2}/\d{1,2}$";

// ==========================================
// ValidationRules - 已解析的校验规则
// ==========================================
// 由配置层构造,引擎不直接读取配置
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub valid_drum_sizes: Vec<i64>,
    pub date_format: String,
    batch_no_pattern: Regex,
}

impl ValidationRules {
    pub fn new(
        valid_drum_sizes: Vec<i64>,
        date_format: &str,
        batch_no_pattern: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            valid_drum_sizes,
            date_format: date_format.to_string(),
            batch_no_pattern: Regex::new(batch_no_pattern)?,
        })
    }

    /// 日期必须可解析且按格式回写后与原文一致（拒绝 "1-1-2024" 这类非补零写法）
    pub fn is_valid_date(&self, value: &str) -> bool {
        match NaiveDate::parse_from_str(value, &self.date_format) {
            Ok(date) => date.format(&self.date_format).to_string() == value,
            Err(_) => false,
        }
    }

    pub fn is_valid_batch_no(&self, value: &str) -> bool {
        self.batch_no_pattern.is_match(value)
    }

    pub fn is_valid_drum_size(&self, drum_size: i64) -> bool {
        self.valid_drum_sizes.contains(&drum_size)
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_DRUM_SIZES.to_vec(),
            DEFAULT_DATE_FORMAT,
            DEFAULT_BATCH_NO_PATTERN,
        )
        .expect("默认批次号正则必须可编译")
    }
}

pub fn qty_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= QTY_EPSILON
}

/// 校验单行记录
///
/// # 返回
/// - Vec<RowError>: 全部违规（行号取 row.row_number）,无违规时为空
pub fn validate(row: &StockRow, rules: &ValidationRules) -> Vec<RowError> {
    let mut errors = Vec::new();
    let mut push = |error: ReconcileError| errors.push(RowError::new(row.row_number, error));

    // ===== 必填字段 =====
    if row.vendor.is_empty() {
        push(ReconcileError::RequiredField("vendor".to_string()));
    }
    if row.material_code.is_empty() {
        push(ReconcileError::RequiredField("material code".to_string()));
    }
    if row.material_desc.is_empty() {
        push(ReconcileError::RequiredField("material description".to_string()));
    }
    if row.contract_no.is_empty() {
        push(ReconcileError::RequiredField("contract no.".to_string()));
    }
    if row.li_name.li_code.is_empty() || row.li_name.li_number.is_empty() {
        push(ReconcileError::RequiredField("LI No.".to_string()));
    }

    // ===== 格式 =====
    if !rules.is_valid_date(&row.li_date) {
        push(ReconcileError::format(
            "LI Date",
            format!("日期格式无效: '{}'", row.li_date),
        ));
    }
    if !rules.is_valid_batch_no(&row.batch_no) {
        push(ReconcileError::format(
            "Batch No.",
            format!("批次号格式无效: '{}'", row.batch_no),
        ));
    }
    if !rules.is_valid_date(&row.batch_due_date) {
        push(ReconcileError::format(
            "Batch Due date",
            format!("日期格式无效: '{}'", row.batch_due_date),
        ));
    }
    if !rules.is_valid_drum_size(row.drum_size) {
        push(ReconcileError::format(
            "Drum Size",
            format!(
                "不支持的桶规格 {}（允许: {:?}）",
                row.drum_size, rules.valid_drum_sizes
            ),
        ));
    }

    // ===== 总量 =====
    if row.total_no_of_drums <= 0 {
        push(ReconcileError::consistency(
            "Total nos. of Drum",
            "总桶数必须大于 0",
        ));
    }
    if Some(row.total_qty) != row.drum_size.checked_mul(row.total_no_of_drums) {
        push(ReconcileError::consistency(
            "total quantity",
            format!(
                "总量 {} != 桶规格 {} × 总桶数 {}",
                row.total_qty, row.drum_size, row.total_no_of_drums
            ),
        ));
    }
    if row.total_qty <= 0 {
        push(ReconcileError::consistency("total quantity", "总量必须大于 0"));
    }

    // ===== 可用满桶 =====
    if row.available_drum_nos.len() as i64 != row.available_full_drums {
        push(ReconcileError::consistency(
            "Available Drum Nos.",
            format!(
                "可用桶号数 {} 与可用满桶数 {} 不一致",
                row.available_drum_nos.len(),
                row.available_full_drums
            ),
        ));
    }
    if Some(row.full_drum_total_quantity) != row.available_full_drums.checked_mul(row.drum_size) {
        push(ReconcileError::consistency(
            "Full Drum Total Quantity",
            format!(
                "满桶总量 {} != 可用满桶数 {} × 桶规格 {}",
                row.full_drum_total_quantity, row.available_full_drums, row.drum_size
            ),
        ));
    }

    // ===== 缓冲桶 =====
    if row.buffer_drum_nos.len() as i64 != row.buffer_no_of_drums {
        push(ReconcileError::consistency(
            "Buffer Drum No.",
            format!(
                "缓冲桶号数 {} 与缓冲桶数 {} 不一致",
                row.buffer_drum_nos.len(),
                row.buffer_no_of_drums
            ),
        ));
    }
    if Some(row.buffer_quantity) != row.buffer_no_of_drums.checked_mul(row.drum_size) {
        push(ReconcileError::consistency(
            "Buffer Quantity",
            format!(
                "缓冲量 {} != 缓冲桶数 {} × 桶规格 {}",
                row.buffer_quantity, row.buffer_no_of_drums, row.drum_size
            ),
        ));
    }

    // ===== 取样/短缺 =====
    if row.sample_drum_nos.len() as i64 != row.no_of_short_length_drums {
        push(ReconcileError::consistency(
            "Sample Drum No.",
            format!(
                "取样桶号数 {} 与短缺桶数 {} 不一致",
                row.sample_drum_nos.len(),
                row.no_of_short_length_drums
            ),
        ));
    }
    if row.sample_lengths.len() != row.sample_drum_nos.len() {
        push(ReconcileError::consistency(
            "Sample Length (m)",
            format!(
                "取样长度个数 {} 与取样桶号数 {} 不一致",
                row.sample_lengths.len(),
                row.sample_drum_nos.len()
            ),
        ));
    }
    let expected_short =
        row.drum_size as f64 * row.no_of_short_length_drums as f64 - row.sample_length_total();
    if !qty_eq(row.short_length_total_qty, expected_short) {
        push(ReconcileError::consistency(
            "Short Length total Quantity",
            format!(
                "短缺总量 {} != 桶规格 × 短缺桶数 - 取样长度合计 = {}",
                row.short_length_total_qty, expected_short
            ),
        ));
    }

    // ===== 审批桶号（i128 求和,超大桶数不溢出）=====
    let expected_approved = row.available_full_drums as i128
        + row.buffer_no_of_drums as i128
        + row.no_of_short_length_drums as i128;
    if row.approved_drum_numbers.len() as i128 != expected_approved {
        push(ReconcileError::consistency(
            "approved drum numbers",
            format!(
                "审批桶号数 {} != 可用 + 缓冲 + 短缺桶数 {}",
                row.approved_drum_numbers.len(),
                expected_approved
            ),
        ));
    }

    // ===== 检测报告（仅当报告日期存在）=====
    if row.has_test_report() {
        if !rules.is_valid_date(&row.batch_test_report_date) {
            push(ReconcileError::format(
                "Batch Test Report Date",
                format!("日期格式无效: '{}'", row.batch_test_report_date),
            ));
        }
        if row.batch_test_report_file_name.is_empty() {
            push(ReconcileError::RequiredField(
                "batch test report file name".to_string(),
            ));
        }
        if row.total_no_of_drums as i128 != expected_approved {
            push(ReconcileError::consistency(
                "Total nos. of Drum",
                format!(
                    "总桶数 {} != 可用 + 缓冲 + 短缺桶数 {}",
                    row.total_no_of_drums, expected_approved
                ),
            ));
        }
        let accounted = row.full_drum_total_quantity as f64
            + row.buffer_quantity as f64
            + row.short_length_total_qty
            + row.sample_length_total();
        if !qty_eq(row.total_qty as f64, accounted) {
            push(ReconcileError::consistency(
                "total quantity",
                format!(
                    "总量 {} != 满桶 + 缓冲 + 短缺 + 取样合计 {}",
                    row.total_qty, accounted
                ),
            ));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LiName;

    /// 一行完全自洽的记录: 500 规格 × 10 桶,5 可用 + 2 缓冲 + 2 取样（1 桶未审批）
    fn valid_row() -> StockRow {
        StockRow {
            vendor: "Vendor1".to_string(),
            material_code: "MAT1".to_string(),
            material_desc: "Cable".to_string(),
            contract_no: "C1".to_string(),
            po_number: "PO1".to_string(),
            po_line_item: "10".to_string(),
            li_name: LiName::new("LI", "001"),
            li_date: "01-01-2024".to_string(),
            batch_no: "1/2".to_string(),
            batch_due_date: "15-01-2024".to_string(),
            drum_size: 500,
            total_no_of_drums: 9,
            total_qty: 4500,
            available_drum_nos: vec![1, 2, 3, 4, 5],
            available_full_drums: 5,
            full_drum_total_quantity: 2500,
            buffer_drum_nos: vec![6, 7],
            buffer_no_of_drums: 2,
            buffer_quantity: 1000,
            sample_drum: "Yes".to_string(),
            sample_drum_nos: vec![8, 9],
            sample_lengths: vec![100.0, 200.0],
            no_of_short_length_drums: 2,
            short_length_total_qty: 700.0,
            approved_drum_numbers: vec![1, 2, 3, 4, 5, 6, 7, 8, 9],
            batch_test_report_date: "20-01-2024".to_string(),
            remarks: String::new(),
            batch_test_report_file_name: "report.pdf".to_string(),
            row_number: 1,
        }
    }

    fn kinds(errors: &[RowError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.error.kind()).collect()
    }

    #[test]
    fn test_valid_row_passes() {
        let errors = validate(&valid_row(), &ValidationRules::default());
        assert!(errors.is_empty(), "不应有错误: {:?}", errors);
    }

    #[test]
    fn test_required_fields_all_reported() {
        let mut row = valid_row();
        row.vendor.clear();
        row.material_code.clear();
        row.material_desc.clear();
        row.contract_no.clear();
        row.li_name.li_number.clear();

        let errors = validate(&row, &ValidationRules::default());
        assert_eq!(kinds(&errors), vec!["RequiredFieldError"; 5]);
        assert!(errors.iter().all(|e| e.row_no == 1));
    }

    #[test]
    fn test_date_and_batch_formats() {
        let rules = ValidationRules::default();
        assert!(rules.is_valid_date("31-12-2024"));
        assert!(!rules.is_valid_date("1-1-2024"));
        assert!(!rules.is_valid_date("2024-12-31"));
        assert!(!rules.is_valid_date("31-02-2024"));
        assert!(!rules.is_valid_date(""));

        assert!(rules.is_valid_batch_no("1/2"));
        assert!(rules.is_valid_batch_no("12/34"));
        assert!(!rules.is_valid_batch_no("123/4"));
        assert!(!rules.is_valid_batch_no("BatchNo1"));
    }

    #[test]
    fn test_drum_size_must_be_supported() {
        let mut row = valid_row();
        row.drum_size = 400;
        let errors = validate(&row, &ValidationRules::default());
        assert!(errors.iter().any(|e| matches!(
            &e.error,
            ReconcileError::Format { field, .. } if field == "Drum Size"
        )));
    }

    #[test]
    fn test_count_mismatches_do_not_short_circuit() {
        let mut row = valid_row();
        row.available_full_drums = 4; // 桶号数 5 ≠ 4,满桶总量 2500 ≠ 2000,审批数 9 ≠ 8,总桶数 9 ≠ 8
        let errors = validate(&row, &ValidationRules::default());
        let subjects: Vec<String> = errors
            .iter()
            .filter_map(|e| match &e.error {
                ReconcileError::Consistency { subject, .. } => Some(subject.clone()),
                _ => None,
            })
            .collect();
        assert!(subjects.contains(&"Available Drum Nos.".to_string()));
        assert!(subjects.contains(&"Full Drum Total Quantity".to_string()));
        assert!(subjects.contains(&"approved drum numbers".to_string()));
        assert!(subjects.contains(&"Total nos. of Drum".to_string()));
    }

    #[test]
    fn test_short_length_total_checked() {
        let mut row = valid_row();
        row.short_length_total_qty = 650.0;
        let errors = validate(&row, &ValidationRules::default());
        assert!(errors.iter().any(|e| matches!(
            &e.error,
            ReconcileError::Consistency { subject, .. } if subject == "Short Length total Quantity"
        )));
    }

    #[test]
    fn test_report_checks_skipped_without_report_date() {
        let mut row = valid_row();
        row.batch_test_report_date.clear();
        row.batch_test_report_file_name.clear();
        row.total_no_of_drums = 10;
        row.total_qty = 5000; // 1 桶未审批,无报告时允许
        let errors = validate(&row, &ValidationRules::default());
        assert!(errors.is_empty(), "不应有错误: {:?}", errors);
    }

    #[test]
    fn test_report_requires_file_name_and_full_accounting() {
        let mut row = valid_row();
        row.batch_test_report_file_name.clear();
        row.total_no_of_drums = 10;
        row.total_qty = 5000;
        let errors = validate(&row, &ValidationRules::default());
        let kinds = kinds(&errors);
        assert!(kinds.contains(&"RequiredFieldError"));
        // 总桶数与总量两项恒等式均失败
        assert_eq!(kinds.iter().filter(|k| **k == "ConsistencyError").count(), 2);
    }

    #[test]
    fn test_overflowing_quantities_are_reported_not_wrapped() {
        let mut row = valid_row();
        row.drum_size = i64::MAX;
        row.total_no_of_drums = 2;
        // 回绕后的乘积不能通过总量校验
        row.total_qty = i64::MAX.wrapping_mul(2);
        row.available_full_drums = i64::MAX;
        row.buffer_no_of_drums = i64::MAX;

        let errors = validate(&row, &ValidationRules::default());
        for subject in ["total quantity", "Full Drum Total Quantity", "Buffer Quantity"] {
            assert!(
                errors.iter().any(|e| matches!(
                    &e.error,
                    ReconcileError::Consistency { subject: s, .. } if s == subject
                )),
                "缺少 {} 错误: {:?}",
                subject,
                errors
            );
        }
        assert!(errors.iter().any(|e| matches!(
            &e.error,
            ReconcileError::Consistency { subject, .. } if subject == "approved drum numbers"
        )));
    }
}
