// ==========================================
// 供应商库存上传 - 对账引擎层
// ==========================================
// 职责: 扁平行记录 → 合同 / LI / 批次 / 分区 / 审批 层级模型
// 红线: 纯计算不做 I/O,所有错误非致命、按行累积
// ==========================================

pub mod approval_merger;
pub mod batch_status;
pub mod drum_set;
pub mod error;
pub mod overlap_validator;
pub mod partition_merger;
pub mod reconciler;
pub mod row_validator;
pub mod upload;

// 重导出核心引擎
pub use approval_merger::{ApprovalAction, MergeCase, DEFAULT_APPROVAL_COMMENT};
pub use batch_status::{classify_batch, classify_new_batch, BatchTotals};
pub use drum_set::{expand_range, subtract, union_checking_duplicates};
pub use error::{ReconcileError, RowError};
pub use overlap_validator::validate_overlaps;
pub use partition_merger::{merge_into_partition, unpack_sample, SampleUnpack};
pub use reconciler::{reconcile, Reconciler};
pub use row_validator::{validate, ValidationRules, QTY_EPSILON};
pub use upload::{run_upload, UploadOutcome};
