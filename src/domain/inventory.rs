// ==========================================
// 供应商库存上传 - 库存层级模型
// ==========================================
// 层级: Contract → LineItem → Batch → DrumPartition / BatchTestApproval
// 用途: 对账引擎输出,由导出层序列化为交换结构
// 生命周期: 仅在单次上传运行内,首次被行引用时创建,之后原地更新,不删除
// ==========================================

use crate::domain::types::{ApprovalStatus, BatchStatus, LiStatus};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// 桶号
pub type DrumNo = u32;

// ==========================================
// UploadInventory - 上传结果根节点
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UploadInventory {
    pub contracts: Vec<Contract>, // 按首次出现顺序
}

impl UploadInventory {
    pub fn find_contract(&self, contract_no: &str) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.contract_no == contract_no)
    }
}

// ==========================================
// Contract - 合同
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contract {
    pub contract_no: String,
    pub lis: Vec<LineItem>, // 按首次出现顺序
}

impl Contract {
    pub fn find_li(&self, li_code: &str, li_number: &str) -> Option<&LineItem> {
        self.lis
            .iter()
            .find(|li| li.li_code == li_code && li.li_number == li_number)
    }
}

// ==========================================
// LineItem - 合同行项目 (LI)
// ==========================================
// 主键: (li_code, li_number),合同内唯一
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub material_code: String,
    pub li_code: String,
    pub li_number: String,
    pub description: String,
    pub batches: Vec<Batch>,
    pub hos_approval_date: String, // 各行必须一致,不一致仅报错,保留首值
    pub status: LiStatus,
}

impl LineItem {
    pub fn find_batch(&self, batch_no: &str) -> Option<&Batch> {
        self.batches.iter().find(|b| b.batch_no == batch_no)
    }
}

// ==========================================
// Batch - 批次
// ==========================================
// 桶规格分区与检测审批直接以有序映射保存,序列化时按键升序输出为数组
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batch {
    pub batch_no: String,
    pub total_quantity: i64, // 随合并累加
    pub submission_date: String,
    #[serde(rename = "drum_partition", serialize_with = "serialize_values")]
    pub drum_partitions: BTreeMap<i64, DrumPartition>,
    #[serde(serialize_with = "serialize_values")]
    pub batch_test_approvals: BTreeMap<ApprovalKey, BatchTestApproval>,
    pub remarks: String,
    pub status: BatchStatus,
}

impl Batch {
    pub fn new(batch_no: &str, submission_date: &str, remarks: &str) -> Self {
        Self {
            batch_no: batch_no.to_string(),
            total_quantity: 0,
            submission_date: submission_date.to_string(),
            drum_partitions: BTreeMap::new(),
            batch_test_approvals: BTreeMap::new(),
            remarks: remarks.to_string(),
            status: BatchStatus::DocsPendingUpload,
        }
    }

    pub fn partition(&self, drum_size: i64) -> Option<&DrumPartition> {
        self.drum_partitions.get(&drum_size)
    }

    /// 按原始日期字符串查找审批记录
    pub fn approval(&self, approval_date: &str) -> Option<&BatchTestApproval> {
        self.batch_test_approvals
            .values()
            .find(|a| a.approval_date == approval_date)
    }
}

// ==========================================
// DrumPartition - 桶规格分区
// ==========================================
// 恒等式: quantity == available + buffer + test + short + unapproved
// 四个桶号集合两两不相交
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrumPartition {
    pub drum_size: i64,
    pub quantity: i64,
    pub unapproved_quantity: i64, // 浮点差值截断为整数,不一致时可为负
    pub available_quantity: i64,
    pub available_drum_numbers: Vec<DrumNo>,
    pub buffer_quantity: i64,
    pub buffer_drum_numbers: Vec<DrumNo>,
    pub test_quantity: f64,
    pub test_drum_numbers: Vec<DrumDetails>,
    pub short_quantity: f64,
    pub short_drum_numbers: Vec<DrumDetails>,
}

impl DrumPartition {
    /// 恒等式残差（浮点,截断前口径）
    pub fn identity_residual(&self) -> f64 {
        self.quantity as f64
            - self.unapproved_quantity as f64
            - self.available_quantity as f64
            - self.buffer_quantity as f64
            - self.test_quantity
            - self.short_quantity
    }
}

/// 单桶取样/短缺明细
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrumDetails {
    #[serde(rename = "number")]
    pub drum_number: DrumNo,
    pub quantity: f64,
}

// ==========================================
// BatchTestApproval - 批次检测审批
// ==========================================
// 主键: approval_date,批次内唯一
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchTestApproval {
    pub approval_date: String,
    pub test_drum_numbers: Vec<BatchTestDrumNumbers>,
    pub approval_drum_numbers: Vec<ApprovalDrumNumber>,
    pub status: ApprovalStatus,
    pub approval_comment: String,
}

impl BatchTestApproval {
    pub fn approved_for(&self, drum_size: i64) -> Option<&ApprovalDrumNumber> {
        self.approval_drum_numbers
            .iter()
            .find(|a| a.drum_size == drum_size)
    }

    pub fn tested_for(&self, drum_size: i64) -> Option<&BatchTestDrumNumbers> {
        self.test_drum_numbers.iter().find(|t| t.drum_size == drum_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchTestDrumNumbers {
    pub drum_size: i64,
    pub drum_numbers: Vec<DrumDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalDrumNumber {
    pub drum_size: i64,
    pub drum_numbers: Vec<DrumNo>,
}

// ==========================================
// ApprovalKey - 审批记录排序键
// ==========================================
// 可解析日期按日历升序在前,无法解析的按原始字符串排在其后
// 注意: 不是原始 dd-mm-yyyy 字符串的字典序（跨月时两者结果不同）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApprovalKey {
    unparsed: bool,
    date: Option<NaiveDate>,
    raw: String,
}

impl ApprovalKey {
    pub fn new(raw: &str, date_format: &str) -> Self {
        let date = NaiveDate::parse_from_str(raw, date_format).ok();
        Self {
            unparsed: date.is_none(),
            date,
            raw: raw.to_string(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

fn serialize_values<S, K, V>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    serializer.collect_seq(map.values())
}
