// ==========================================
// 供应商库存上传 - 批次检测审批合并器
// ==========================================
// 职责: 按 (分区是否存在, 报告日期是否给出, 审批是否存在) 分派六种合并结果
// 红线: 审批记录创建后状态固定 APPROVED,不再重新评估
// ==========================================

use crate::domain::{
    ApprovalDrumNumber, ApprovalKey, ApprovalStatus, BatchTestApproval, BatchTestDrumNumbers,
    StockRow,
};
use crate::engine::drum_set::union_checking_duplicates;
use crate::engine::error::RowError;
use crate::engine::partition_merger::unpack_sample;
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_APPROVAL_COMMENT: &str = "Batch Test report uploaded on Go-live phase 1";

// ==========================================
// MergeCase - 单行对批次的六种合并情形
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeCase {
    NewSizeNoApproval,      // 1. 新规格,无报告日期
    ExistingSizeNoApproval, // 2. 已有规格,无报告日期
    ExistingSizeSameDate,   // 3. 已有规格,报告日期已存在
    ExistingSizeNewDate,    // 4. 已有规格,新报告日期
    NewSizeSameDate,        // 5. 新规格,报告日期已存在
    NewSizeNewDate,         // 6. 新规格,新报告日期
}

/// 审批侧动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalAction {
    Skip,              // 不触碰审批
    MergeIntoExisting, // 追加到已有审批的同规格子项（缺失则新建子项）
    AppendSizeEntry,   // 向已有审批追加新规格子项
    CreateApproval,    // 新建审批记录
}

impl MergeCase {
    pub const ALL: [MergeCase; 6] = [
        MergeCase::NewSizeNoApproval,
        MergeCase::ExistingSizeNoApproval,
        MergeCase::ExistingSizeSameDate,
        MergeCase::ExistingSizeNewDate,
        MergeCase::NewSizeSameDate,
        MergeCase::NewSizeNewDate,
    ];

    /// 报告日期未给出时 approval_exists 不参与判定
    pub fn classify(partition_exists: bool, date_given: bool, approval_exists: bool) -> Self {
        match (partition_exists, date_given, approval_exists) {
            (false, false, _) => MergeCase::NewSizeNoApproval,
            (true, false, _) => MergeCase::ExistingSizeNoApproval,
            (true, true, true) => MergeCase::ExistingSizeSameDate,
            (true, true, false) => MergeCase::ExistingSizeNewDate,
            (false, true, true) => MergeCase::NewSizeSameDate,
            (false, true, false) => MergeCase::NewSizeNewDate,
        }
    }

    pub fn approval_action(self) -> ApprovalAction {
        match self {
            MergeCase::NewSizeNoApproval | MergeCase::ExistingSizeNoApproval => {
                ApprovalAction::Skip
            }
            MergeCase::ExistingSizeSameDate => ApprovalAction::MergeIntoExisting,
            MergeCase::NewSizeSameDate => ApprovalAction::AppendSizeEntry,
            MergeCase::ExistingSizeNewDate | MergeCase::NewSizeNewDate => {
                ApprovalAction::CreateApproval
            }
        }
    }

    pub fn partition_exists(self) -> bool {
        matches!(
            self,
            MergeCase::ExistingSizeNoApproval
                | MergeCase::ExistingSizeSameDate
                | MergeCase::ExistingSizeNewDate
        )
    }
}

/// 以本行取样与审批桶号新建审批记录
pub fn create_approval(row: &StockRow, approval_comment: &str) -> BatchTestApproval {
    BatchTestApproval {
        approval_date: row.batch_test_report_date.clone(),
        test_drum_numbers: vec![test_entry(row)],
        approval_drum_numbers: vec![approval_entry(row)],
        status: ApprovalStatus::Approved,
        approval_comment: approval_comment.to_string(),
    }
}

fn test_entry(row: &StockRow) -> BatchTestDrumNumbers {
    let sample = unpack_sample(&row.sample_drum_nos, &row.sample_lengths, row.drum_size);
    BatchTestDrumNumbers {
        drum_size: row.drum_size,
        drum_numbers: sample.test_entries,
    }
}

fn approval_entry(row: &StockRow) -> ApprovalDrumNumber {
    ApprovalDrumNumber {
        drum_size: row.drum_size,
        drum_numbers: row.approved_drum_numbers.clone(),
    }
}

/// 按合并情形更新批次审批表
///
/// # 参数
/// - approvals: 批次审批表（按 ApprovalKey 有序）
/// - case: 本行合并情形
/// - key: 本行报告日期对应的键（情形 1/2 时不使用）
///
/// # 返回
/// - 本行产生的重复桶号错误
pub fn merge_approval(
    approvals: &mut BTreeMap<ApprovalKey, BatchTestApproval>,
    case: MergeCase,
    key: ApprovalKey,
    row: &StockRow,
    approval_comment: &str,
) -> Vec<RowError> {
    let mut errors = Vec::new();
    let action = case.approval_action();
    debug!(row_no = row.row_number, ?case, ?action, "审批合并");

    match action {
        ApprovalAction::Skip => {}
        ApprovalAction::CreateApproval => {
            approvals.insert(key, create_approval(row, approval_comment));
        }
        ApprovalAction::AppendSizeEntry => match approvals.get_mut(&key) {
            Some(approval) => {
                approval.test_drum_numbers.push(test_entry(row));
                approval.approval_drum_numbers.push(approval_entry(row));
            }
            None => {
                approvals.insert(key, create_approval(row, approval_comment));
            }
        },
        ApprovalAction::MergeIntoExisting => match approvals.get_mut(&key) {
            Some(approval) => {
                let sample =
                    unpack_sample(&row.sample_drum_nos, &row.sample_lengths, row.drum_size);
                match approval
                    .test_drum_numbers
                    .iter_mut()
                    .find(|t| t.drum_size == row.drum_size)
                {
                    Some(tested) => tested.drum_numbers.extend(sample.test_entries),
                    None => approval.test_drum_numbers.push(BatchTestDrumNumbers {
                        drum_size: row.drum_size,
                        drum_numbers: sample.test_entries,
                    }),
                }

                match approval
                    .approval_drum_numbers
                    .iter_mut()
                    .find(|a| a.drum_size == row.drum_size)
                {
                    Some(approved) => {
                        let (drums, dup) = union_checking_duplicates(&[
                            &approved.drum_numbers,
                            &row.approved_drum_numbers,
                        ]);
                        approved.drum_numbers = drums;
                        if let Some(dup) = dup {
                            let context = format!(
                                "approval {} drum size {} approved drum numbers",
                                row.batch_test_report_date, row.drum_size
                            );
                            errors.push(RowError::new(row.row_number, dup.with_context(&context)));
                        }
                    }
                    None => approval.approval_drum_numbers.push(approval_entry(row)),
                }
            }
            None => {
                approvals.insert(key, create_approval(row, approval_comment));
            }
        },
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DrumDetails;

    const FMT: &str = "%d-%m-%Y";

    fn row(drum_size: i64, date: &str, approved: Vec<u32>, samples: Vec<u32>) -> StockRow {
        let lengths = samples.iter().map(|_| 10.0).collect();
        StockRow {
            drum_size,
            batch_test_report_date: date.to_string(),
            approved_drum_numbers: approved,
            sample_drum_nos: samples,
            sample_lengths: lengths,
            row_number: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_covers_all_six_cases() {
        let mut seen = Vec::new();
        for partition_exists in [false, true] {
            for date_given in [false, true] {
                for approval_exists in [false, true] {
                    let case = MergeCase::classify(partition_exists, date_given, approval_exists);
                    assert_eq!(case.partition_exists(), partition_exists);
                    if !seen.contains(&case) {
                        seen.push(case);
                    }
                }
            }
        }
        assert_eq!(seen.len(), MergeCase::ALL.len());
        for case in MergeCase::ALL {
            assert!(seen.contains(&case), "{:?} 未被覆盖", case);
        }
    }

    #[test]
    fn test_action_table() {
        use ApprovalAction::*;
        let expected = [
            (MergeCase::NewSizeNoApproval, Skip),
            (MergeCase::ExistingSizeNoApproval, Skip),
            (MergeCase::ExistingSizeSameDate, MergeIntoExisting),
            (MergeCase::ExistingSizeNewDate, CreateApproval),
            (MergeCase::NewSizeSameDate, AppendSizeEntry),
            (MergeCase::NewSizeNewDate, CreateApproval),
        ];
        for (case, action) in expected {
            assert_eq!(case.approval_action(), action, "{:?}", case);
        }
    }

    #[test]
    fn test_create_approval_defaults() {
        let approval = create_approval(&row(500, "01-02-2024", vec![1, 2], vec![2]), "comment");
        assert_eq!(approval.status, ApprovalStatus::Approved);
        assert_eq!(approval.approval_comment, "comment");
        assert_eq!(approval.approved_for(500).unwrap().drum_numbers, vec![1, 2]);
        assert_eq!(
            approval.tested_for(500).unwrap().drum_numbers,
            vec![DrumDetails { drum_number: 2, quantity: 10.0 }]
        );
    }

    #[test]
    fn test_skip_cases_leave_approvals_untouched() {
        let mut approvals = BTreeMap::new();
        let r = row(500, "", vec![1], vec![]);
        for case in [MergeCase::NewSizeNoApproval, MergeCase::ExistingSizeNoApproval] {
            let errors = merge_approval(&mut approvals, case, ApprovalKey::new("", FMT), &r, "c");
            assert!(errors.is_empty());
        }
        assert!(approvals.is_empty());
    }

    #[test]
    fn test_merge_into_existing_same_size() {
        let mut approvals = BTreeMap::new();
        let key = ApprovalKey::new("01-02-2024", FMT);
        let first = row(500, "01-02-2024", vec![1, 2], vec![2]);
        merge_approval(&mut approvals, MergeCase::NewSizeNewDate, key.clone(), &first, "c");

        let second = row(500, "01-02-2024", vec![3, 4], vec![4]);
        let errors = merge_approval(
            &mut approvals,
            MergeCase::ExistingSizeSameDate,
            key.clone(),
            &second,
            "c",
        );

        assert!(errors.is_empty());
        let approval = &approvals[&key];
        assert_eq!(approval.approved_for(500).unwrap().drum_numbers, vec![1, 2, 3, 4]);
        assert_eq!(approval.tested_for(500).unwrap().drum_numbers.len(), 2);
    }

    #[test]
    fn test_merge_into_existing_creates_missing_size_entry() {
        let mut approvals = BTreeMap::new();
        let key = ApprovalKey::new("01-02-2024", FMT);
        merge_approval(
            &mut approvals,
            MergeCase::NewSizeNewDate,
            key.clone(),
            &row(500, "01-02-2024", vec![1], vec![]),
            "c",
        );

        // 同日期、已有 250 分区但审批中无 250 子项
        merge_approval(
            &mut approvals,
            MergeCase::ExistingSizeSameDate,
            key.clone(),
            &row(250, "01-02-2024", vec![7], vec![]),
            "c",
        );

        let approval = &approvals[&key];
        assert_eq!(approval.approved_for(250).unwrap().drum_numbers, vec![7]);
        assert!(approval.tested_for(250).unwrap().drum_numbers.is_empty());
    }

    #[test]
    fn test_merge_into_existing_reports_duplicates() {
        let mut approvals = BTreeMap::new();
        let key = ApprovalKey::new("01-02-2024", FMT);
        merge_approval(
            &mut approvals,
            MergeCase::NewSizeNewDate,
            key.clone(),
            &row(500, "01-02-2024", vec![1, 2], vec![]),
            "c",
        );
        let mut dup = row(500, "01-02-2024", vec![2, 3], vec![]);
        dup.row_number = 4;
        let errors = merge_approval(
            &mut approvals,
            MergeCase::ExistingSizeSameDate,
            key.clone(),
            &dup,
            "c",
        );

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row_no, 4);
        assert_eq!(
            approvals[&key].approved_for(500).unwrap().drum_numbers,
            vec![1, 2, 2, 3]
        );
    }

    #[test]
    fn test_append_size_entry_and_new_date() {
        let mut approvals = BTreeMap::new();
        let feb = ApprovalKey::new("01-02-2024", FMT);
        merge_approval(
            &mut approvals,
            MergeCase::NewSizeNewDate,
            feb.clone(),
            &row(500, "01-02-2024", vec![1], vec![]),
            "c",
        );
        merge_approval(
            &mut approvals,
            MergeCase::NewSizeSameDate,
            feb.clone(),
            &row(1000, "01-02-2024", vec![1], vec![]),
            "c",
        );
        let jan = ApprovalKey::new("15-01-2024", FMT);
        merge_approval(
            &mut approvals,
            MergeCase::ExistingSizeNewDate,
            jan.clone(),
            &row(500, "15-01-2024", vec![9], vec![]),
            "c",
        );

        assert_eq!(approvals[&feb].approval_drum_numbers.len(), 2);
        let dates: Vec<&str> = approvals.values().map(|a| a.approval_date.as_str()).collect();
        assert_eq!(dates, vec!["15-01-2024", "01-02-2024"]);
    }
}
