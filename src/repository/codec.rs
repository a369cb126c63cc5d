// ==========================================
// 后台运营系统 - 行映射辅助
// ==========================================

use rusqlite::types::Type;
use std::str::FromStr;

/// 将 TEXT 列解析为封闭枚举（状态/类型），失败时转为 rusqlite 转换错误
pub(crate) fn parse_text_column<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.to_string().into())
    })
}
