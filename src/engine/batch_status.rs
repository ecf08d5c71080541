// ==========================================
// 供应商库存上传 - 批次状态分类器
// ==========================================
// 职责: 由批次内各桶规格分区汇总量派生批次状态
// 规则顺序: BUFFER → PARTIAL_BUFFER → AVAILABLE → DOCS_PENDING_UPLOAD
// ==========================================

use crate::domain::{Batch, BatchStatus, DrumPartition};
use crate::engine::row_validator::qty_eq;

/// 批次内全部分区的汇总量
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchTotals {
    pub buffer_qty: i64,
    pub test_qty: f64,
    pub short_qty: f64,
    pub available_qty: i64,
}

impl BatchTotals {
    pub fn from_partitions<'a, I>(partitions: I) -> Self
    where
        I: IntoIterator<Item = &'a DrumPartition>,
    {
        partitions
            .into_iter()
            .fold(BatchTotals::default(), |mut totals, partition| {
                totals.buffer_qty = totals.buffer_qty.saturating_add(partition.buffer_quantity);
                totals.test_qty += partition.test_quantity;
                totals.short_qty += partition.short_quantity;
                totals.available_qty =
                    totals.available_qty.saturating_add(partition.available_quantity);
                totals
            })
    }
}

/// 通用分类（批次后续合并时使用）
pub fn classify(total_quantity: i64, totals: &BatchTotals) -> BatchStatus {
    let non_available = totals.buffer_qty as f64 + totals.test_qty + totals.short_qty;

    if qty_eq(total_quantity as f64, non_available) {
        return BatchStatus::Buffer;
    }

    if totals.buffer_qty > 0 && totals.buffer_qty < total_quantity && totals.available_qty > 0 {
        return BatchStatus::PartialBuffer;
    }

    if totals.available_qty > 0 {
        return BatchStatus::Available;
    }

    BatchStatus::DocsPendingUpload
}

pub fn classify_batch(batch: &Batch) -> BatchStatus {
    let totals = BatchTotals::from_partitions(batch.drum_partitions.values());
    classify(batch.total_quantity, &totals)
}

/// 新建批次时的初始分类（仅基于首行的单个分区）
///
/// - 无检测报告: DOCS_PENDING_UPLOAD
/// - 无缓冲且有可用: AVAILABLE
/// - 全部为缓冲/检测/短缺: BUFFER
/// - 其余: PARTIAL_BUFFER
/// - 未审批量等于总量时强制 DOCS_PENDING_UPLOAD
pub fn classify_new_batch(
    total_quantity: i64,
    partition: &DrumPartition,
    has_test_report: bool,
) -> BatchStatus {
    if !has_test_report {
        return BatchStatus::DocsPendingUpload;
    }

    let non_available =
        partition.buffer_quantity as f64 + partition.test_quantity + partition.short_quantity;

    let status = if partition.buffer_quantity == 0 && partition.available_quantity > 0 {
        BatchStatus::Available
    } else if qty_eq(total_quantity as f64, non_available) {
        BatchStatus::Buffer
    } else {
        BatchStatus::PartialBuffer
    };

    if partition.unapproved_quantity == total_quantity {
        return BatchStatus::DocsPendingUpload;
    }
    status
}
