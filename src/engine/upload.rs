// ==========================================
// 供应商库存上传 - 引擎入口
// ==========================================
// 流程: 逐行校验 → 顺序对账 → 跨批次重叠校验
// 错误顺序: 字段映射 + 行校验（按行） → 对账（按行） → 重叠（运行级）
// ==========================================

use crate::domain::{StockRow, UploadInventory};
use crate::engine::error::RowError;
use crate::engine::overlap_validator::validate_overlaps;
use crate::engine::reconciler::reconcile;
use crate::engine::row_validator::{validate, ValidationRules};
use tracing::info;

/// 一次上传运行的引擎输出
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub inventory: UploadInventory,
    pub errors: Vec<RowError>,
}

impl UploadOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// 运行完整引擎流程
///
/// # 参数
/// - rows: 按文件顺序的行记录
/// - field_errors: 上游字段映射产生的错误（按行号有序）,与行校验错误按行交织
/// - rules: 已解析的校验规则
/// - approval_comment: 新建审批记录的固定备注
pub fn run_upload(
    rows: &[StockRow],
    field_errors: Vec<RowError>,
    rules: &ValidationRules,
    approval_comment: &str,
) -> UploadOutcome {
    // 同一行内映射错误在前;排序稳定,保持各自原顺序
    let mut errors = field_errors;
    errors.extend(rows.iter().flat_map(|row| validate(row, rules)));
    errors.sort_by_key(|e| e.row_no);
    let row_error_count = errors.len();

    let (inventory, reconcile_errors) = reconcile(rows, rules, approval_comment);
    let reconcile_error_count = reconcile_errors.len();
    errors.extend(reconcile_errors);

    let overlap_errors = validate_overlaps(&inventory);
    let overlap_error_count = overlap_errors.len();
    errors.extend(overlap_errors);

    info!(
        rows = rows.len(),
        row_errors = row_error_count,
        reconcile_errors = reconcile_error_count,
        overlap_errors = overlap_error_count,
        "上传引擎运行完成"
    );

    UploadOutcome { inventory, errors }
}
