// ==========================================
// 供应商库存上传 - 对账引擎（编排器）
// ==========================================
// 职责: 按输入顺序折叠行记录 → 合同 / LI / 批次 层级模型
// 流程: 定位或创建合同 → LI → 批次 → 委派分区/审批合并 → 重算批次状态
// 红线: 任一行出错不影响后续行,错误按行号累积
// ==========================================

use crate::domain::{
    ApprovalKey, Batch, Contract, LiStatus, LineItem, StockRow, UploadInventory,
};
use crate::engine::approval_merger::{create_approval, merge_approval, MergeCase};
use crate::engine::batch_status::{classify_batch, classify_new_batch};
use crate::engine::error::{ReconcileError, RowError};
use crate::engine::partition_merger::{create_partition, merge_into_partition};
use crate::engine::row_validator::ValidationRules;
use std::collections::HashMap;
use tracing::{debug, info};

type LiKey = (usize, String, String); // (合同下标, li_code, li_number)
type BatchKey = (usize, usize, String); // (合同下标, LI 下标, batch_no)

// ==========================================
// Reconciler - 单次运行的对账状态
// ==========================================
// 实体保存在 Vec 中保持首次出现顺序,复合键 → 下标 的索引避免线性扫描
pub struct Reconciler<'a> {
    rules: &'a ValidationRules,
    approval_comment: String,
    inventory: UploadInventory,
    contract_index: HashMap<String, usize>,
    li_index: HashMap<LiKey, usize>,
    batch_index: HashMap<BatchKey, usize>,
    errors: Vec<RowError>,
}

impl<'a> Reconciler<'a> {
    pub fn new(rules: &'a ValidationRules, approval_comment: &str) -> Self {
        Self {
            rules,
            approval_comment: approval_comment.to_string(),
            inventory: UploadInventory::default(),
            contract_index: HashMap::new(),
            li_index: HashMap::new(),
            batch_index: HashMap::new(),
            errors: Vec::new(),
        }
    }

    /// 合并单行
    pub fn merge_row(&mut self, row: &StockRow) {
        let contract_idx = self.locate_contract(row);
        let li_idx = self.locate_line_item(contract_idx, row);

        let batch_key = (contract_idx, li_idx, row.batch_no.clone());
        let line_item = &mut self.inventory.contracts[contract_idx].lis[li_idx];

        match self.batch_index.get(&batch_key).copied() {
            None => {
                let (batch, errors) = create_batch(row, self.rules, &self.approval_comment);
                debug!(
                    row_no = row.row_number,
                    contract_no = %row.contract_no,
                    batch_no = %row.batch_no,
                    status = %batch.status,
                    "新建批次"
                );
                line_item.batches.push(batch);
                self.batch_index
                    .insert(batch_key, line_item.batches.len() - 1);
                self.errors.extend(errors);
            }
            Some(batch_idx) => {
                let batch = &mut line_item.batches[batch_idx];
                let errors = merge_into_batch(batch, row, self.rules, &self.approval_comment);
                debug!(
                    row_no = row.row_number,
                    contract_no = %row.contract_no,
                    batch_no = %row.batch_no,
                    status = %batch.status,
                    "合并到已有批次"
                );
                self.errors.extend(errors);
            }
        }
    }

    /// 结束运行,交出模型与错误
    pub fn finish(self) -> (UploadInventory, Vec<RowError>) {
        (self.inventory, self.errors)
    }

    fn locate_contract(&mut self, row: &StockRow) -> usize {
        if let Some(&idx) = self.contract_index.get(&row.contract_no) {
            return idx;
        }

        self.inventory.contracts.push(Contract {
            contract_no: row.contract_no.clone(),
            lis: Vec::new(),
        });
        let idx = self.inventory.contracts.len() - 1;
        self.contract_index.insert(row.contract_no.clone(), idx);
        debug!(row_no = row.row_number, contract_no = %row.contract_no, "新建合同");
        idx
    }

    /// 定位 LI;已存在时校验 LI 级字段一致性（不一致仅报错,保留首值）
    fn locate_line_item(&mut self, contract_idx: usize, row: &StockRow) -> usize {
        let key = (
            contract_idx,
            row.li_name.li_code.clone(),
            row.li_name.li_number.clone(),
        );
        let contract = &mut self.inventory.contracts[contract_idx];

        if let Some(&idx) = self.li_index.get(&key) {
            let errors = check_line_item(&contract.lis[idx], row);
            self.errors.extend(errors);
            return idx;
        }

        contract.lis.push(LineItem {
            material_code: row.material_code.clone(),
            li_code: row.li_name.li_code.clone(),
            li_number: row.li_name.li_number.clone(),
            description: row.material_desc.clone(),
            batches: Vec::new(),
            hos_approval_date: row.li_date.clone(),
            status: LiStatus::VendorAcknowledged,
        });
        let idx = contract.lis.len() - 1;
        self.li_index.insert(key, idx);
        idx
    }
}

/// 按输入顺序对账全部行
pub fn reconcile(
    rows: &[StockRow],
    rules: &ValidationRules,
    approval_comment: &str,
) -> (UploadInventory, Vec<RowError>) {
    let mut reconciler = Reconciler::new(rules, approval_comment);
    for row in rows {
        reconciler.merge_row(row);
    }
    let (inventory, errors) = reconciler.finish();

    info!(
        rows = rows.len(),
        contracts = inventory.contracts.len(),
        errors = errors.len(),
        "对账完成"
    );
    (inventory, errors)
}

fn check_line_item(line_item: &LineItem, row: &StockRow) -> Vec<RowError> {
    let checks = [
        ("hos approval date", &line_item.hos_approval_date, &row.li_date),
        ("material code", &line_item.material_code, &row.material_code),
        ("material description", &line_item.description, &row.material_desc),
    ];

    checks
        .into_iter()
        .filter(|(_, expected, found)| expected != found)
        .map(|(field, expected, found)| {
            RowError::new(
                row.row_number,
                ReconcileError::mismatch(field, expected, found),
            )
        })
        .collect()
}

/// 新建批次（首行路径）: 分区 + 可选审批 + 初始状态
fn create_batch(
    row: &StockRow,
    rules: &ValidationRules,
    approval_comment: &str,
) -> (Batch, Vec<RowError>) {
    let mut batch = Batch::new(&row.batch_no, &row.batch_due_date, &row.remarks);
    batch.total_quantity = row.total_qty;

    let (partition, errors) = create_partition(row);

    if row.has_test_report() {
        let key = ApprovalKey::new(&row.batch_test_report_date, &rules.date_format);
        batch
            .batch_test_approvals
            .insert(key, create_approval(row, approval_comment));
    }

    batch.status = classify_new_batch(batch.total_quantity, &partition, row.has_test_report());
    batch.drum_partitions.insert(row.drum_size, partition);

    (batch, errors)
}

/// 合并到已有批次: 六种情形分派,累加总量,重算状态
fn merge_into_batch(
    batch: &mut Batch,
    row: &StockRow,
    rules: &ValidationRules,
    approval_comment: &str,
) -> Vec<RowError> {
    let mut errors = Vec::new();

    if batch.submission_date != row.batch_due_date {
        errors.push(RowError::new(
            row.row_number,
            ReconcileError::mismatch("submission date", &batch.submission_date, &row.batch_due_date),
        ));
    }

    let key = ApprovalKey::new(&row.batch_test_report_date, &rules.date_format);
    let case = MergeCase::classify(
        batch.drum_partitions.contains_key(&row.drum_size),
        row.has_test_report(),
        batch.batch_test_approvals.contains_key(&key),
    );

    let existing = batch.drum_partitions.remove(&row.drum_size);
    let (partition, partition_errors) = merge_into_partition(existing, row);
    batch.drum_partitions.insert(row.drum_size, partition);
    errors.extend(partition_errors);

    errors.extend(merge_approval(
        &mut batch.batch_test_approvals,
        case,
        key,
        row,
        approval_comment,
    ));

    batch.total_quantity = batch.total_quantity.saturating_add(row.total_qty);
    batch.status = classify_batch(batch);

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BatchStatus, LiName};
    use crate::engine::approval_merger::DEFAULT_APPROVAL_COMMENT;

    /// 500 规格 × 4 桶,桶号 base+1..base+4 全部可用
    fn row(row_number: usize, contract: &str, li: &str, batch: &str, base: u32) -> StockRow {
        let drums: Vec<u32> = (base + 1..=base + 4).collect();
        StockRow {
            vendor: "V".to_string(),
            material_code: "M".to_string(),
            material_desc: "Cable".to_string(),
            contract_no: contract.to_string(),
            li_name: LiName::new("LI", li),
            li_date: "01-01-2024".to_string(),
            batch_no: batch.to_string(),
            batch_due_date: "10-01-2024".to_string(),
            drum_size: 500,
            total_no_of_drums: 4,
            total_qty: 2000,
            available_drum_nos: drums.clone(),
            available_full_drums: 4,
            full_drum_total_quantity: 2000,
            approved_drum_numbers: drums,
            batch_test_report_date: "05-01-2024".to_string(),
            batch_test_report_file_name: "r.pdf".to_string(),
            row_number,
            ..Default::default()
        }
    }

    fn run(rows: &[StockRow]) -> (UploadInventory, Vec<RowError>) {
        reconcile(rows, &ValidationRules::default(), DEFAULT_APPROVAL_COMMENT)
    }

    #[test]
    fn test_hierarchy_keeps_first_seen_order() {
        let rows = [
            row(1, "C2", "001", "1/1", 0),
            row(2, "C1", "001", "1/1", 10),
            row(3, "C2", "002", "1/1", 20),
            row(4, "C2", "001", "2/1", 30),
        ];
        let (inventory, errors) = run(&rows);

        assert!(errors.is_empty(), "{:?}", errors);
        let contracts: Vec<&str> = inventory
            .contracts
            .iter()
            .map(|c| c.contract_no.as_str())
            .collect();
        assert_eq!(contracts, vec!["C2", "C1"]);

        let c2 = inventory.find_contract("C2").unwrap();
        assert_eq!(c2.lis.len(), 2);
        let batches: Vec<&str> = c2.lis[0].batches.iter().map(|b| b.batch_no.as_str()).collect();
        assert_eq!(batches, vec!["1/1", "2/1"]);
        assert_eq!(c2.lis[0].status, LiStatus::VendorAcknowledged);
    }

    #[test]
    fn test_new_batch_gets_approval_and_initial_status() {
        let (inventory, _) = run(&[row(1, "C1", "001", "1/1", 0)]);
        let batch = &inventory.contracts[0].lis[0].batches[0];

        assert_eq!(batch.total_quantity, 2000);
        assert_eq!(batch.status, BatchStatus::Available);
        assert_eq!(batch.batch_test_approvals.len(), 1);
        assert_eq!(batch.partition(500).unwrap().available_quantity, 2000);
    }

    #[test]
    fn test_new_batch_without_report_is_docs_pending() {
        let mut r = row(1, "C1", "001", "1/1", 0);
        r.batch_test_report_date.clear();
        let (inventory, _) = run(&[r]);
        let batch = &inventory.contracts[0].lis[0].batches[0];

        assert_eq!(batch.status, BatchStatus::DocsPendingUpload);
        assert!(batch.batch_test_approvals.is_empty());
    }

    #[test]
    fn test_existing_batch_accumulates() {
        let rows = [row(1, "C1", "001", "1/1", 0), row(2, "C1", "001", "1/1", 10)];
        let (inventory, errors) = run(&rows);
        let batch = &inventory.contracts[0].lis[0].batches[0];

        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(batch.total_quantity, 4000);
        assert_eq!(batch.drum_partitions.len(), 1);
        assert_eq!(batch.partition(500).unwrap().quantity, 4000);
        // 同一报告日期 → 合并到同一审批
        assert_eq!(batch.batch_test_approvals.len(), 1);
        assert_eq!(
            batch.approval("05-01-2024").unwrap().approved_for(500).unwrap().drum_numbers.len(),
            8
        );
    }

    #[test]
    fn test_line_item_mismatches_reported_first_value_kept() {
        let mut second = row(2, "C1", "001", "1/1", 10);
        second.li_date = "02-01-2024".to_string();
        second.material_code = "M2".to_string();
        second.material_desc = "Wire".to_string();
        second.batch_due_date = "11-01-2024".to_string();

        let (inventory, errors) = run(&[row(1, "C1", "001", "1/1", 0), second]);

        let fields: Vec<String> = errors
            .iter()
            .filter_map(|e| match &e.error {
                ReconcileError::Mismatch { field, .. } => Some(field.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                "hos approval date",
                "material code",
                "material description",
                "submission date"
            ]
        );
        assert!(errors.iter().all(|e| e.row_no == 2));

        let li = &inventory.contracts[0].lis[0];
        assert_eq!(li.material_code, "M");
        assert_eq!(li.hos_approval_date, "01-01-2024");
        assert_eq!(li.batches[0].submission_date, "10-01-2024");
        // 合并照常进行
        assert_eq!(li.batches[0].total_quantity, 4000);
    }

    #[test]
    fn test_new_line_item_in_existing_contract_is_not_checked() {
        let mut second = row(2, "C1", "002", "1/1", 10);
        second.material_code = "OTHER".to_string();
        let (_, errors) = run(&[row(1, "C1", "001", "1/1", 0), second]);
        assert!(errors.is_empty(), "{:?}", errors);
    }
}
