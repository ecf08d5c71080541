// ==========================================
// 供应商库存上传 - 领域模型层
// ==========================================
// 职责: 定义库存层级实体、扁平行记录、状态类型
// 红线: 不含解析逻辑,不含对账逻辑
// ==========================================

pub mod inventory;
pub mod stock_row;
pub mod types;

// 重导出核心类型
pub use inventory::{
    ApprovalDrumNumber, ApprovalKey, Batch, BatchTestApproval, BatchTestDrumNumbers, Contract,
    DrumDetails, DrumNo, DrumPartition, LineItem, UploadInventory,
};
pub use stock_row::{LiName, StockRow};
pub use types::{ApprovalStatus, BatchStatus, LiStatus};
