// ==========================================
// 供应商库存上传 - 跨批次桶号重叠校验
// ==========================================
// 职责: 全部行合并后,检查同一合同内同一物料编码的审批桶号不重复
// 范围: 该物料编码所有 LI 的所有批次、所有审批日期、所有规格子项
// 输出: 每个物料编码至多一条运行级错误（row_no = 0）
// ==========================================

use crate::domain::{DrumNo, UploadInventory};
use crate::engine::drum_set::union_checking_duplicates;
use crate::engine::error::RowError;
use std::collections::BTreeMap;
use tracing::warn;

pub fn validate_overlaps(inventory: &UploadInventory) -> Vec<RowError> {
    let mut errors = Vec::new();

    for contract in &inventory.contracts {
        // 物料编码有序遍历,输出顺序确定
        let mut by_material: BTreeMap<&str, Vec<&[DrumNo]>> = BTreeMap::new();

        for li in &contract.lis {
            let sets = by_material.entry(li.material_code.as_str()).or_default();
            for batch in &li.batches {
                for approval in batch.batch_test_approvals.values() {
                    for entry in &approval.approval_drum_numbers {
                        sets.push(entry.drum_numbers.as_slice());
                    }
                }
            }
        }

        for (material_code, sets) in by_material {
            if let (_, Some(dup)) = union_checking_duplicates(&sets) {
                let context = format!(
                    "contract {} material code {} overlapping approved drum numbers",
                    contract.contract_no, material_code
                );
                let error = RowError::run_level(dup.with_context(&context));
                warn!(contract_no = %contract.contract_no, material_code, "{}", error);
                errors.push(error);
            }
        }
    }

    errors
}
