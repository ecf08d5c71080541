// ==========================================
// 供应商库存上传 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 扁平 JSON 键值文件（{"key": "value", ...}）,文件缺失时全部取默认值
// ==========================================

use crate::config::upload_config_trait::UploadConfigReader;
use crate::engine::approval_merger::DEFAULT_APPROVAL_COMMENT;
use crate::engine::row_validator::{
    DEFAULT_BATCH_NO_PATTERN, DEFAULT_DATE_FORMAT, DEFAULT_DRUM_SIZES,
};
use crate::importer::error::{ImportError, ImportResult};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_OUTPUT_FILE: &str = "output.json";
pub const DEFAULT_LOG_FILE: &str = "VendorStockUpload.log";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
}

impl ConfigManager {
    /// 全部取默认值
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文件加载
    ///
    /// # 返回
    /// - Ok: 文件不存在时为全默认配置
    /// - Err(ConfigReadError): 文件存在但无法读取或不是 JSON 对象
    pub fn load<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(file = %path.display(), "配置文件不存在,使用默认配置");
            return Ok(Self::new());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        let manager = Self::from_json(&raw).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;

        info!(file = %path.display(), keys = manager.values.len(), "配置加载完成");
        Ok(manager)
    }

    /// 从 JSON 文本解析;非字符串值按 JSON 文本保存,数组按逗号拼接
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let map: HashMap<String, Value> = serde_json::from_str(raw)?;
        let values = map
            .into_iter()
            .map(|(key, value)| (key, value_to_string(value)))
            .collect();
        Ok(Self { values })
    }

    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// 覆写单个配置项
    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_config_value(key)
            .map(str::to_string)
            .unwrap_or_else(|| default.to_string())
    }

    /// 获取所有配置的快照（JSON格式,键有序）
    pub fn get_config_snapshot(&self) -> ImportResult<String> {
        let ordered: BTreeMap<&String, &String> = self.values.iter().collect();
        Ok(serde_json::to_string(&ordered)?)
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

// ==========================================
// UploadConfigReader Trait 实现
// ==========================================
impl UploadConfigReader for ConfigManager {
    fn get_valid_drum_sizes(&self) -> ImportResult<Vec<i64>> {
        let Some(value) = self.get_config_value(config_keys::VALID_DRUM_SIZES) else {
            return Ok(DEFAULT_DRUM_SIZES.to_vec());
        };

        let sizes: Vec<i64> = value
            .split(',')
            .filter_map(|s| s.trim().parse::<i64>().ok())
            .filter(|&s| s > 0)
            .collect();

        if sizes.is_empty() {
            warn!(
                config_key = config_keys::VALID_DRUM_SIZES,
                raw_value = %value,
                "桶规格配置无有效值，使用默认配置"
            );
            Ok(DEFAULT_DRUM_SIZES.to_vec())
        } else {
            Ok(sizes)
        }
    }

    fn get_date_format(&self) -> ImportResult<String> {
        Ok(self.get_config_or_default(config_keys::DATE_FORMAT, DEFAULT_DATE_FORMAT))
    }

    fn get_batch_no_pattern(&self) -> ImportResult<String> {
        Ok(self.get_config_or_default(config_keys::BATCH_NO_PATTERN, DEFAULT_BATCH_NO_PATTERN))
    }

    fn get_approval_comment(&self) -> ImportResult<String> {
        Ok(self.get_config_or_default(config_keys::APPROVAL_COMMENT, DEFAULT_APPROVAL_COMMENT))
    }

    fn get_output_file(&self) -> ImportResult<String> {
        Ok(self.get_config_or_default(config_keys::OUTPUT_FILE, DEFAULT_OUTPUT_FILE))
    }

    fn get_log_file(&self) -> ImportResult<String> {
        Ok(self.get_config_or_default(config_keys::LOG_FILE, DEFAULT_LOG_FILE))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 行校验
    pub const VALID_DRUM_SIZES: &str = "valid_drum_sizes"; // 逗号分隔或 JSON 数组
    pub const DATE_FORMAT: &str = "date_format";
    pub const BATCH_NO_PATTERN: &str = "batch_no_pattern";

    // 审批
    pub const APPROVAL_COMMENT: &str = "approval_comment";

    // 输出
    pub const OUTPUT_FILE: &str = "output_file";
    pub const LOG_FILE: &str = "log_file";
}
