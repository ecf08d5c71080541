// ==========================================
// 供应商库存上传 - 上传配置读取 Trait
// ==========================================
// 职责: 定义上传流程所需的配置读取接口
// 红线: 不包含配置写入、不包含业务逻辑;引擎只消费解析后的 ValidationRules
// ==========================================

use crate::config::config_manager::config_keys;
use crate::engine::ValidationRules;
use crate::importer::error::{ImportError, ImportResult};

// ==========================================
// UploadConfigReader Trait
// ==========================================
// 实现者: ConfigManager（扁平 JSON 键值文件）
pub trait UploadConfigReader: Send + Sync {
    // ===== 行校验 =====

    /// 获取允许的桶规格
    ///
    /// # 默认值
    /// - [250, 300, 500, 1000]
    fn get_valid_drum_sizes(&self) -> ImportResult<Vec<i64>>;

    /// 获取日期格式（chrono 格式串）
    ///
    /// # 默认值
    /// - %d-%m-%Y
    fn get_date_format(&self) -> ImportResult<String>;

    /// 获取批次号正则
    ///
    /// # 默认值
    /// - ^\d{1,2}/\d{1,2}$
    fn get_batch_no_pattern(&self) -> ImportResult<String>;

    // ===== 审批 =====

    /// 新建审批记录的固定备注
    fn get_approval_comment(&self) -> ImportResult<String>;

    // ===== 输出 =====

    /// 默认 output.json
    fn get_output_file(&self) -> ImportResult<String>;

    /// 默认 VendorStockUpload.log
    fn get_log_file(&self) -> ImportResult<String>;

    /// 解析为引擎使用的校验规则
    ///
    /// # 返回
    /// - Err(ConfigValueError): 批次号正则无法编译
    fn validation_rules(&self) -> ImportResult<ValidationRules> {
        let pattern = self.get_batch_no_pattern()?;
        ValidationRules::new(
            self.get_valid_drum_sizes()?,
            &self.get_date_format()?,
            &pattern,
        )
        .map_err(|e| ImportError::ConfigValueError {
            key: config_keys::BATCH_NO_PATTERN.to_string(),
            value: pattern.clone(),
            message: e.to_string(),
        })
    }
}
