// ==========================================
// 供应商库存上传 - 导入层
// ==========================================
// 职责: 外部文件 → StockRow → 引擎 → JSON / 错误日志
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod exporter;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod stock_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use exporter::{export_json, format_error_line, write_error_log, write_json_file};
pub use field_mapper::{columns, StockFieldMapper};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use stock_importer::{StockImporter, UploadReport};

// 重导出 Trait 接口
pub use importer_trait::{FieldMapper, FileParser, MappedRow, RawRecord, RawSheet};
