// ==========================================
// 后台运营系统 - 上传文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 二维字符串表，第 0 行为表头
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{Data, Range, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;

/// 解析后的表格（第 0 行为表头）
pub type Table = Vec<Vec<String>>;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// 支持的扩展名（小写，不含点）
    fn extensions(&self) -> &'static [&'static str];

    /// 解析上传的文件内容
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Table>;

    /// 解析磁盘文件
    fn parse_file(&self, file_path: &Path) -> ImportResult<Table> {
        // 检查文件存在
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        // 检查扩展名
        let ext = extension_of(&file_path.to_string_lossy());
        if !self.extensions().contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let bytes = std::fs::read(file_path)?;
        self.parse_bytes(&bytes)
    }
}

/// 取文件名扩展名（小写）
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 除表头外，丢弃完全空白的行
fn drop_blank_rows(table: Table) -> Table {
    table
        .into_iter()
        .enumerate()
        .filter(|(idx, row)| *idx == 0 || row.iter().any(|c| !c.trim().is_empty()))
        .map(|(_, row)| row)
        .collect()
}

// ==========================================
// CSV Parser 实现
// ==========================================
// 不修剪单元格：物流表头按原文精确匹配
pub struct CsvParser;

impl FileParser for CsvParser {
    fn extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }

    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Table> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        let mut table = Vec::new();
        for result in reader.records() {
            let record = result?;
            table.push(record.iter().map(str::to_string).collect());
        }

        Ok(drop_blank_rows(table))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 只读取第一个工作表
pub struct ExcelParser;

impl ExcelParser {
    fn range_to_table(range: &Range<Data>) -> Table {
        let table = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        drop_blank_rows(table)
    }
}

impl FileParser for ExcelParser {
    fn extensions(&self) -> &'static [&'static str] {
        &["xlsx", "xls"]
    }

    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Table> {
        // xlsx 为 zip 容器（PK 头），否则按 xls 处理
        let cursor = Cursor::new(bytes.to_vec());
        let range = if bytes.starts_with(b"PK") {
            let mut workbook = Xlsx::new(cursor)
                .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
            let sheet_name = workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
            workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| ImportError::ExcelParseError(e.to_string()))?
        } else {
            let mut workbook =
                Xls::new(cursor).map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
            let sheet_name = workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
            workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| ImportError::ExcelParseError(e.to_string()))?
        };

        Ok(Self::range_to_table(&range))
    }
}

/// 单元格转字符串；无小数部分的数值按整数输出（运单号常被存为数字）
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    fn parser_for(ext: &str) -> ImportResult<Box<dyn FileParser>> {
        match ext {
            "csv" => Ok(Box::new(CsvParser)),
            "xlsx" | "xls" => Ok(Box::new(ExcelParser)),
            _ => Err(ImportError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// 解析磁盘文件
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Table> {
        let path = file_path.as_ref();
        let ext = extension_of(&path.to_string_lossy());
        Self::parser_for(&ext)?.parse_file(path)
    }

    /// 解析上传内容（按原始文件名选择解析器）
    pub fn parse_upload(&self, file_name: &str, bytes: &[u8]) -> ImportResult<Table> {
        let ext = extension_of(file_name);
        Self::parser_for(&ext)?.parse_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_csv_parser_keeps_cells_verbatim() {
        let bytes = "Guia,Estado Guia\nTRK1, EN TRANSITO\n".as_bytes();
        let table = CsvParser.parse_bytes(bytes).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table[0], vec!["Guia", "Estado Guia"]);
        assert_eq!(table[1], vec!["TRK1", " EN TRANSITO"]);
    }

    #[test]
    fn test_csv_parser_strips_bom_and_blank_rows() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("SDS,Descripcion Estado\nS1,APROBADA\n,\nS2\n".as_bytes());

        let table = CsvParser.parse_bytes(&bytes).unwrap();

        assert_eq!(table[0][0], "SDS");
        // 空行被丢弃，短行保留
        assert_eq!(table.len(), 3);
        assert_eq!(table[2], vec!["S2"]);
    }

    #[test]
    fn test_parse_file_from_disk() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "Guia,Estado Guia").unwrap();
        writeln!(temp_file, "TRK9,ENTREGADO").unwrap();

        let table = UniversalFileParser.parse(temp_file.path()).unwrap();
        assert_eq!(table[1], vec!["TRK9", "ENTREGADO"]);
    }

    #[test]
    fn test_file_not_found_and_unsupported_format() {
        assert!(matches!(
            UniversalFileParser.parse("no_existe.csv"),
            Err(ImportError::FileNotFound(_))
        ));
        assert!(matches!(
            UniversalFileParser.parse_upload("reporte.pdf", b"%PDF"),
            Err(ImportError::UnsupportedFormat(ext)) if ext == "pdf"
        ));
    }

    #[test]
    fn test_invalid_excel_bytes() {
        assert!(matches!(
            UniversalFileParser.parse_upload("reporte.xlsx", b"PK not really a zip"),
            Err(ImportError::ExcelParseError(_))
        ));
    }

    #[test]
    fn test_cell_to_string_integral_float() {
        assert_eq!(cell_to_string(&Data::Float(123456.0)), "123456");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
