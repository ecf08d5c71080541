// ==========================================
// 供应商库存上传 - 桶规格分区合并器
// ==========================================
// 职责: 行记录 → 桶规格分区（新建 / 累加）,维护数量恒等式
// 恒等式: quantity == available + buffer + test + short + unapproved
// ==========================================

use crate::domain::{DrumDetails, DrumNo, DrumPartition, StockRow};
use crate::engine::drum_set::{full_drum_quantity, subtract, union_checking_duplicates};
use crate::engine::error::{ReconcileError, RowError};
use crate::engine::row_validator::QTY_EPSILON;
use tracing::debug;

// ==========================================
// SampleUnpack - 取样拆解结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleUnpack {
    pub test_entries: Vec<DrumDetails>,  // (桶号, 取样长度)
    pub test_quantity: f64,
    pub short_entries: Vec<DrumDetails>, // (桶号, 桶规格 - 取样长度)
    pub short_quantity: f64,
}

/// 将取样桶号与取样长度拆解为检测明细与短缺明细
///
/// 前置条件: 两个切片等长（由行校验器保证）;不等长时按较短者处理。
pub fn unpack_sample(
    sample_drum_numbers: &[DrumNo],
    sample_lengths: &[f64],
    drum_size: i64,
) -> SampleUnpack {
    let mut unpack = SampleUnpack::default();

    for (&drum_number, &length) in sample_drum_numbers.iter().zip(sample_lengths) {
        let short = drum_size as f64 - length;

        unpack.test_entries.push(DrumDetails {
            drum_number,
            quantity: length,
        });
        unpack.test_quantity += length;

        unpack.short_entries.push(DrumDetails {
            drum_number,
            quantity: short,
        });
        unpack.short_quantity += short;
    }

    unpack
}

/// 合并入口: 分区不存在则新建,存在则累加
pub fn merge_into_partition(
    existing: Option<DrumPartition>,
    row: &StockRow,
) -> (DrumPartition, Vec<RowError>) {
    match existing {
        None => create_partition(row),
        Some(mut partition) => {
            let errors = update_partition(&mut partition, row);
            (partition, errors)
        }
    }
}

/// 新建分区
pub fn create_partition(row: &StockRow) -> (DrumPartition, Vec<RowError>) {
    let drum_size = row.drum_size;
    let sample = unpack_sample(&row.sample_drum_nos, &row.sample_lengths, drum_size);

    // 可用桶号 = 审批桶号 - 取样桶号 - 缓冲桶号
    let available = subtract(&row.approved_drum_numbers, &row.sample_drum_nos);
    let available = subtract(&available, &row.buffer_drum_nos);

    let mut partition = DrumPartition {
        drum_size,
        quantity: row.total_qty,
        unapproved_quantity: 0,
        available_quantity: full_drum_quantity(drum_size, &available),
        available_drum_numbers: available,
        buffer_quantity: full_drum_quantity(drum_size, &row.buffer_drum_nos),
        buffer_drum_numbers: row.buffer_drum_nos.clone(),
        test_quantity: sample.test_quantity,
        test_drum_numbers: sample.test_entries,
        short_quantity: sample.short_quantity,
        short_drum_numbers: sample.short_entries,
    };
    recompute_unapproved(&mut partition);

    debug!(
        row_no = row.row_number,
        drum_size,
        quantity = partition.quantity,
        unapproved = partition.unapproved_quantity,
        "新建桶规格分区"
    );

    let errors = check_identity(&partition, row.row_number).into_iter().collect();
    (partition, errors)
}

/// 累加到已有分区（原地更新）
pub fn update_partition(partition: &mut DrumPartition, row: &StockRow) -> Vec<RowError> {
    let mut errors = Vec::new();
    let drum_size = partition.drum_size;

    // 数量累加饱和,不回绕;越界由恒等式校验上报
    partition.quantity = partition.quantity.saturating_add(row.total_qty);

    // 可用
    partition.available_quantity = partition
        .available_quantity
        .saturating_add(row.full_drum_total_quantity);
    let (available, dup) = union_checking_duplicates(&[
        &partition.available_drum_numbers,
        &row.available_drum_nos,
    ]);
    partition.available_drum_numbers = available;
    if let Some(dup) = dup {
        let context = format!("drum partition {} available drum numbers", drum_size);
        errors.push(RowError::new(row.row_number, dup.with_context(&context)));
    }

    // 缓冲
    partition.buffer_quantity = partition.buffer_quantity.saturating_add(row.buffer_quantity);
    let (buffer, dup) =
        union_checking_duplicates(&[&partition.buffer_drum_numbers, &row.buffer_drum_nos]);
    partition.buffer_drum_numbers = buffer;
    if let Some(dup) = dup {
        let context = format!("drum partition {} buffer drum numbers", drum_size);
        errors.push(RowError::new(row.row_number, dup.with_context(&context)));
    }

    // 取样: 直接追加,同一规格允许多次取样事件
    let sample = unpack_sample(&row.sample_drum_nos, &row.sample_lengths, drum_size);
    partition.test_quantity += sample.test_quantity;
    partition.test_drum_numbers.extend(sample.test_entries);
    partition.short_quantity += sample.short_quantity;
    partition.short_drum_numbers.extend(sample.short_entries);

    recompute_unapproved(partition);

    debug!(
        row_no = row.row_number,
        drum_size,
        quantity = partition.quantity,
        unapproved = partition.unapproved_quantity,
        "累加桶规格分区"
    );

    errors.extend(check_identity(partition, row.row_number));
    errors
}

/// 未审批量 = 总量 - 可用 - 缓冲 - 检测 - 短缺（浮点计算后截断为整数）
fn recompute_unapproved(partition: &mut DrumPartition) {
    let unapproved = partition.quantity as f64
        - partition.available_quantity as f64
        - partition.buffer_quantity as f64
        - partition.test_quantity
        - partition.short_quantity;
    partition.unapproved_quantity = unapproved as i64;
}

fn check_identity(partition: &DrumPartition, row_no: usize) -> Option<RowError> {
    let residual = partition.identity_residual();
    if residual.abs() <= QTY_EPSILON {
        return None;
    }

    Some(RowError::new(
        row_no,
        ReconcileError::consistency(
            &format!("drum partition {}", partition.drum_size),
            format!(
                "总量 {} != 可用 {} + 缓冲 {} + 检测 {} + 短缺 {} + 未审批 {}（残差 {}）",
                partition.quantity,
                partition.available_quantity,
                partition.buffer_quantity,
                partition.test_quantity,
                partition.short_quantity,
                partition.unapproved_quantity,
                residual
            ),
        ),
    ))
}
