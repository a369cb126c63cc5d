// ==========================================
// 后台运营系统 - 导入层
// ==========================================
// 职责: 上传文件解析、列定位、行匹配、批次编排
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod column_resolver;
pub mod error;
pub mod file_parser;
pub mod row_matcher;
pub mod status_importer;

// 重导出核心类型
pub use column_resolver::{
    ColumnMap, ColumnOverrides, ColumnResolver, HeaderMatch, ImportField, SaleField,
    ShipmentField,
};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, Table, UniversalFileParser};
pub use row_matcher::{SaleMatcher, ShipmentMatcher};
pub use status_importer::{AbortReason, ReconcileSummary, StatusImporter};
