// ==========================================
// 供应商库存上传 - 配置层
// ==========================================
// 职责: 上传配置读取（校验规则 / 审批备注 / 输出文件名）
// 存储: 扁平 JSON 键值文件,缺省全部取默认值
// ==========================================

pub mod config_manager;
pub mod upload_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, DEFAULT_LOG_FILE, DEFAULT_OUTPUT_FILE};
pub use upload_config_trait::UploadConfigReader;
