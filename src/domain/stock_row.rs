// ==========================================
// 供应商库存上传 - 扁平行记录
// ==========================================
// 用途: 导入管道中间产物（文件解析 → 字段映射 → 此结构 → 对账引擎）
// 生命周期: 仅在上传流程内,不进入层级模型
// ==========================================

use crate::domain::inventory::DrumNo;
use serde::{Deserialize, Serialize};

/// LI 编号（源列 "Li No" 形如 `CODE-NUMBER`）
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LiName {
    pub li_code: String,
    pub li_number: String,
}

impl LiName {
    pub fn new(li_code: &str, li_number: &str) -> Self {
        Self {
            li_code: li_code.to_string(),
            li_number: li_number.to_string(),
        }
    }
}

// ==========================================
// StockRow - 一行供应商发货/桶批次记录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    // ===== 基础信息 =====
    pub vendor: String,
    pub material_code: String,
    pub material_desc: String,
    pub contract_no: String,
    pub po_number: String,
    pub po_line_item: String,
    pub li_name: LiName,
    pub li_date: String, // dd-mm-yyyy

    // ===== 批次 =====
    pub batch_no: String,       // digits/digits
    pub batch_due_date: String, // dd-mm-yyyy

    // ===== 桶规格与数量 =====
    pub drum_size: i64,
    pub total_no_of_drums: i64,
    pub total_qty: i64, // 派生: drum_size × total_no_of_drums

    // ===== 可用满桶 =====
    pub available_drum_nos: Vec<DrumNo>,
    pub available_full_drums: i64,
    pub full_drum_total_quantity: i64,

    // ===== 缓冲桶 =====
    pub buffer_drum_nos: Vec<DrumNo>,
    pub buffer_no_of_drums: i64,
    pub buffer_quantity: i64,

    // ===== 取样桶 =====
    pub sample_drum: String, // Yes/No
    pub sample_drum_nos: Vec<DrumNo>,
    pub sample_lengths: Vec<f64>,
    pub no_of_short_length_drums: i64,
    pub short_length_total_qty: f64,

    // ===== 派生: 可用 ∪ 缓冲 ∪ 取样（升序,保留重复）=====
    pub approved_drum_numbers: Vec<DrumNo>,

    // ===== 检测报告 =====
    pub batch_test_report_date: String, // 为空表示本行无检测报告
    pub remarks: String,
    pub batch_test_report_file_name: String,

    // 元信息
    pub row_number: usize, // 数据行号（从 1 开始,不含表头）
}

impl StockRow {
    pub fn has_test_report(&self) -> bool {
        !self.batch_test_report_date.is_empty()
    }

    pub fn sample_length_total(&self) -> f64 {
        self.sample_lengths.iter().sum()
    }
}
