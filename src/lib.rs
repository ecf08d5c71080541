// ==========================================
// 供应商库存上传 - 核心库
// ==========================================
// 职责: 扁平库存行 → 合同/LI/批次/桶规格 层级模型 + 错误列表
// 技术栈: Rust + serde + tracing
// 红线: 引擎不做 I/O;行级错误不终止整次上传
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 校验与对账
pub mod engine;

// 导入层 - 外部文件与导出
pub mod importer;

// 配置层 - 上传配置
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ApprovalStatus, BatchStatus, LiStatus};

// 领域实体
pub use domain::{
    Batch, BatchTestApproval, Contract, DrumNo, DrumPartition, LineItem, LiName, StockRow,
    UploadInventory,
};

// 引擎
pub use engine::{
    reconcile, run_upload, validate, validate_overlaps, ReconcileError, RowError,
    UploadOutcome, ValidationRules,
};

// 导入
pub use importer::{ImportError, ImportResult, StockImporter, UploadReport};

// 配置
pub use config::{ConfigManager, UploadConfigReader};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "供应商库存上传";
