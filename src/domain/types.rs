// ==========================================
// 供应商库存上传 - 领域类型定义
// ==========================================
// 职责: 合同/LI/批次/审批的状态枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与下游接口一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 批次状态 (Batch Status)
// ==========================================
// 由批次内全部桶规格分区的汇总数量派生,每次合并后重算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Buffer,            // 全部为缓冲/取样/短缺
    PartialBuffer,     // 部分缓冲,部分可用
    Available,         // 存在可用量
    DocsPendingUpload, // 待上传检测报告
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Buffer => write!(f, "BUFFER"),
            BatchStatus::PartialBuffer => write!(f, "PARTIAL_BUFFER"),
            BatchStatus::Available => write!(f, "AVAILABLE"),
            BatchStatus::DocsPendingUpload => write!(f, "DOCS_PENDING_UPLOAD"),
        }
    }
}

// ==========================================
// LI 状态 (Line Item Status)
// ==========================================
// 创建时固定为 VENDOR_ACKNOWLEDGED,引擎不再修改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiStatus {
    VendorAcknowledged,
}

impl fmt::Display for LiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiStatus::VendorAcknowledged => write!(f, "VENDOR_ACKNOWLEDGED"),
        }
    }
}

// ==========================================
// 检测审批状态 (Approval Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Approved,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Approved => write!(f, "APPROVED"),
        }
    }
}
