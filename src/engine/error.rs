// ==========================================
// 供应商库存上传 - 对账错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 所有错误均非致命,按行累积后随模型一并返回
// ==========================================

use crate::domain::DrumNo;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use thiserror::Error;

/// 对账错误分类
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    // ===== 字段无法解析 =====
    #[error("字段格式错误 ({field}): {message}")]
    Format { field: String, message: String },

    // ===== 必填字段缺失 =====
    #[error("必填字段缺失: {0}")]
    RequiredField(String),

    // ===== 计算恒等式不成立 =====
    #[error("数量不一致 ({subject}): {message}")]
    Consistency { subject: String, message: String },

    // ===== 同一实体跨行字段不一致 =====
    #[error("{field} 不一致: 已有 '{expected}', 本行 '{found}'")]
    Mismatch {
        field: String,
        expected: String,
        found: String,
    },

    // ===== 桶号重复 =====
    #[error("桶号重复 ({context}): {duplicates:?}")]
    Duplicate {
        context: String,
        duplicates: Vec<DrumNo>,
    },
}

impl ReconcileError {
    pub fn format(field: &str, message: impl Into<String>) -> Self {
        ReconcileError::Format {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn consistency(subject: &str, message: impl Into<String>) -> Self {
        ReconcileError::Consistency {
            subject: subject.to_string(),
            message: message.into(),
        }
    }

    pub fn mismatch(field: &str, expected: &str, found: &str) -> Self {
        ReconcileError::Mismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// 为重复错误补充上下文（DrumSet 层只知道重复值,不知道调用场景）
    pub fn with_context(self, context: &str) -> Self {
        match self {
            ReconcileError::Duplicate { duplicates, .. } => ReconcileError::Duplicate {
                context: context.to_string(),
                duplicates,
            },
            other => other,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReconcileError::Format { .. } => "FormatError",
            ReconcileError::RequiredField(_) => "RequiredFieldError",
            ReconcileError::Consistency { .. } => "ConsistencyError",
            ReconcileError::Mismatch { .. } => "MismatchError",
            ReconcileError::Duplicate { .. } => "DuplicateError",
        }
    }
}

// ==========================================
// RowError - 行号 + 错误
// ==========================================
// row_no = 0 表示运行级/跨行错误（如跨批次桶号重叠）
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub row_no: usize,
    pub error: ReconcileError,
}

impl RowError {
    pub fn new(row_no: usize, error: ReconcileError) -> Self {
        Self { row_no, error }
    }

    pub fn run_level(error: ReconcileError) -> Self {
        Self { row_no: 0, error }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row_no, self.error)
    }
}

impl std::error::Error for RowError {}

// 报告输出: { row_no, kind, message }
impl Serialize for RowError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RowError", 3)?;
        state.serialize_field("row_no", &self.row_no)?;
        state.serialize_field("kind", self.error.kind())?;
        state.serialize_field("message", &self.error.to_string())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_display() {
        let err = RowError::new(3, ReconcileError::RequiredField("vendor".to_string()));
        assert_eq!(err.to_string(), "Row 3: 必填字段缺失: vendor");
    }

    #[test]
    fn test_with_context_only_touches_duplicates() {
        let dup = ReconcileError::Duplicate {
            context: String::new(),
            duplicates: vec![3],
        }
        .with_context("available drum numbers");
        assert_eq!(
            dup,
            ReconcileError::Duplicate {
                context: "available drum numbers".to_string(),
                duplicates: vec![3],
            }
        );

        let required = ReconcileError::RequiredField("vendor".to_string()).with_context("x");
        assert_eq!(required.kind(), "RequiredFieldError");
    }

    #[test]
    fn test_row_error_serializes_kind_and_message() {
        let err = RowError::run_level(ReconcileError::mismatch("material code", "M", "N"));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["row_no"], 0);
        assert_eq!(value["kind"], "MismatchError");
        assert_eq!(value["message"], "material code 不一致: 已有 'M', 本行 'N'");
    }
}
