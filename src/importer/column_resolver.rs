// ==========================================
// 后台运营系统 - 列定位器
// ==========================================
// 职责: 表头行 → 逻辑字段列号；支持人工指定列号覆盖
// 规则:
// 1) 从左到右扫描表头，同名列以"最后一个"为准
// 2) 人工覆盖无条件替换扫描结果（即使扫描未命中或命中其他列）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

// ==========================================
// ImportField - 导入文件的逻辑字段
// ==========================================
pub trait ImportField: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// 全部字段（按声明顺序）
    const ALL: &'static [Self];

    /// 期望的表头文字
    fn header_label(&self) -> &'static str;

    /// 覆盖参数中使用的键名（如 `guia=5`）
    fn override_key(&self) -> &'static str;

    fn from_override_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.override_key() == key)
    }
}

// ==========================================
// 物流导入字段（快递商导出）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShipmentField {
    TrackingCode, // 运单号
    Status,       // 状态
    Description,  // 最后事件描述
    Location,     // 位置
}

impl ImportField for ShipmentField {
    const ALL: &'static [Self] = &[
        ShipmentField::TrackingCode,
        ShipmentField::Status,
        ShipmentField::Description,
        ShipmentField::Location,
    ];

    fn header_label(&self) -> &'static str {
        match self {
            ShipmentField::TrackingCode => "Guia",
            ShipmentField::Status => "Estado Guia",
            ShipmentField::Description => "Ultimo Evento Nombre",
            ShipmentField::Location => "Ubicacion",
        }
    }

    fn override_key(&self) -> &'static str {
        match self {
            ShipmentField::TrackingCode => "guia",
            ShipmentField::Status => "estado",
            ShipmentField::Description => "descripcion",
            ShipmentField::Location => "ubicacion",
        }
    }
}

// ==========================================
// 销售导入字段（销售系统导出）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SaleField {
    SaleCode,    // 销售编码 (SDS)，必需
    Status,      // 状态描述，必需
    Description, // 备注
}

impl SaleField {
    /// 缺失即中止整个批次的字段
    pub const REQUIRED: &'static [SaleField] = &[SaleField::SaleCode, SaleField::Status];
}

impl ImportField for SaleField {
    const ALL: &'static [Self] = &[SaleField::SaleCode, SaleField::Status, SaleField::Description];

    fn header_label(&self) -> &'static str {
        match self {
            SaleField::SaleCode => "SDS",
            SaleField::Status => "Descripcion Estado",
            SaleField::Description => "Observacion",
        }
    }

    fn override_key(&self) -> &'static str {
        match self {
            SaleField::SaleCode => "sds",
            SaleField::Status => "estado",
            SaleField::Description => "observacion",
        }
    }
}

// ==========================================
// ColumnOverrides - 人工指定列号
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOverrides<F: ImportField> {
    indices: HashMap<F, usize>,
}

impl<F: ImportField> Default for ColumnOverrides<F> {
    fn default() -> Self {
        Self {
            indices: HashMap::new(),
        }
    }
}

impl<F: ImportField> ColumnOverrides<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: F, index: usize) -> Self {
        self.indices.insert(field, index);
        self
    }

    pub fn get(&self, field: F) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// 解析 `键=列号` 形式的参数（列号从 0 开始）
    ///
    /// 同一字段重复出现时以最后一个为准
    pub fn parse_pairs<I, S>(pairs: I) -> ImportResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = Self::new();
        for pair in pairs {
            let input = pair.as_ref();
            let (key, value) = input
                .split_once('=')
                .ok_or_else(|| ImportError::InvalidOverride {
                    input: input.to_string(),
                    message: "期望格式 campo=indice".to_string(),
                })?;

            let field = F::from_override_key(key.trim()).ok_or_else(|| {
                ImportError::InvalidOverride {
                    input: input.to_string(),
                    message: format!(
                        "未知字段，可选: {}",
                        F::ALL
                            .iter()
                            .map(|f| f.override_key())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                }
            })?;

            let index = value
                .trim()
                .parse::<usize>()
                .map_err(|e| ImportError::InvalidOverride {
                    input: input.to_string(),
                    message: e.to_string(),
                })?;

            overrides.indices.insert(field, index);
        }
        Ok(overrides)
    }
}

// ==========================================
// ColumnMap - 定位结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap<F: ImportField> {
    indices: HashMap<F, usize>,
}

impl<F: ImportField> ColumnMap<F> {
    pub fn get(&self, field: F) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    /// 未定位的字段
    pub fn unresolved(&self) -> Vec<F> {
        F::ALL
            .iter()
            .copied()
            .filter(|f| !self.indices.contains_key(f))
            .collect()
    }

    /// 第一个未定位的必需字段
    pub fn first_missing(&self, required: &[F]) -> Option<F> {
        required
            .iter()
            .copied()
            .find(|f| !self.indices.contains_key(f))
    }

    /// 未定位的字段一律落到指定列
    ///
    /// 物流导入沿用该行为：缺列时读第 0 列而不是报错
    pub fn with_fallback(mut self, index: usize) -> Self {
        for field in F::ALL {
            self.indices.entry(*field).or_insert(index);
        }
        self
    }

    /// 读取一行中字段对应的单元格；列未定位或行过短时为 None
    pub fn cell<'r>(&self, row: &'r [String], field: F) -> Option<&'r str> {
        self.get(field)
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
    }
}

// ==========================================
// HeaderMatch - 表头比较方式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatch {
    Exact,   // 原文精确匹配（物流）
    Trimmed, // 去首尾空白后精确匹配（销售）
}

// ==========================================
// ColumnResolver - 列定位器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ColumnResolver {
    mode: HeaderMatch,
}

impl ColumnResolver {
    pub fn new(mode: HeaderMatch) -> Self {
        Self { mode }
    }

    fn header_matches(&self, cell: &str, label: &str) -> bool {
        match self.mode {
            HeaderMatch::Exact => cell == label,
            HeaderMatch::Trimmed => cell.trim() == label,
        }
    }

    /// 定位所有字段
    pub fn resolve<F: ImportField>(
        &self,
        headers: &[String],
        overrides: &ColumnOverrides<F>,
    ) -> ColumnMap<F> {
        let mut indices = HashMap::new();

        for field in F::ALL {
            // 同名表头：后出现的覆盖先出现的
            let scanned = headers
                .iter()
                .enumerate()
                .filter(|(_, cell)| self.header_matches(cell, field.header_label()))
                .map(|(idx, _)| idx)
                .last();

            if let Some(idx) = overrides.get(*field).or(scanned) {
                indices.insert(*field, idx);
            }
        }

        ColumnMap { indices }
    }
}
