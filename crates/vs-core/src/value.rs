//! 狀態值模型
//!
//! 所有保存結果都由此樹狀結構組成：空值、純量、字串與有序序列。

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, StateError};

/// 狀態值（保存結果的節點）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StateValue {
    /// 無狀態
    #[default]
    Null,
    /// 布林
    Bool(bool),
    /// 整數
    Int(i64),
    /// 十進位數
    Decimal(Decimal),
    /// 字串
    Text(String),
    /// 日期
    Date(NaiveDate),
    /// 有序序列
    Seq(Vec<StateValue>),
}

impl StateValue {
    /// 建立二元組（以長度 2 的序列表示）
    pub fn pair(first: impl Into<StateValue>, second: impl Into<StateValue>) -> Self {
        StateValue::Seq(vec![first.into(), second.into()])
    }

    /// 將 Option 轉為狀態值，None 對應 Null
    pub fn from_option(value: Option<StateValue>) -> Self {
        value.unwrap_or(StateValue::Null)
    }

    /// 檢查是否為空值
    pub fn is_null(&self) -> bool {
        matches!(self, StateValue::Null)
    }

    /// Null 轉為 None，其餘原樣保留
    pub fn into_option(self) -> Option<StateValue> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            StateValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            StateValue::Decimal(d) => Some(*d),
            StateValue::Int(i) => Some(Decimal::from(*i)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            StateValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[StateValue]> {
        match self {
            StateValue::Seq(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// 節點種類名稱（用於錯誤訊息）
    pub fn kind(&self) -> &'static str {
        match self {
            StateValue::Null => "null",
            StateValue::Bool(_) => "bool",
            StateValue::Int(_) => "int",
            StateValue::Decimal(_) => "decimal",
            StateValue::Text(_) => "text",
            StateValue::Date(_) => "date",
            StateValue::Seq(_) => "seq",
        }
    }

    /// 要求為序列，否則回報損毀
    pub fn expect_seq(&self, context: &str) -> Result<&[StateValue]> {
        self.as_seq().ok_or_else(|| {
            StateError::corruption(format!("{}: 預期序列，實際為 {}", context, self.kind()))
        })
    }

    /// 要求為固定長度序列
    pub fn expect_arity(&self, arity: usize, context: &str) -> Result<&[StateValue]> {
        let items = self.expect_seq(context)?;
        if items.len() != arity {
            return Err(StateError::corruption(format!(
                "{}: 預期 {} 個元素，實際為 {}",
                context,
                arity,
                items.len()
            )));
        }
        Ok(items)
    }

    /// 要求為二元組
    pub fn expect_pair(&self, context: &str) -> Result<(&StateValue, &StateValue)> {
        let items = self.expect_arity(2, context)?;
        Ok((&items[0], &items[1]))
    }

    /// 要求為字串
    pub fn expect_str(&self, context: &str) -> Result<&str> {
        self.as_str().ok_or_else(|| {
            StateError::corruption(format!("{}: 預期字串，實際為 {}", context, self.kind()))
        })
    }

    /// 要求為非負整數索引
    pub fn expect_index(&self, context: &str) -> Result<usize> {
        self.as_int()
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| {
                StateError::corruption(format!("{}: 預期非負整數，實際為 {}", context, self.kind()))
            })
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Bool(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Int(value)
    }
}

impl From<i32> for StateValue {
    fn from(value: i32) -> Self {
        StateValue::Int(i64::from(value))
    }
}

impl From<u32> for StateValue {
    fn from(value: u32) -> Self {
        StateValue::Int(i64::from(value))
    }
}

impl From<usize> for StateValue {
    fn from(value: usize) -> Self {
        // 集合索引遠小於 i64 上限
        StateValue::Int(value as i64)
    }
}

impl From<Decimal> for StateValue {
    fn from(value: Decimal) -> Self {
        StateValue::Decimal(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Text(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Text(value)
    }
}

impl From<NaiveDate> for StateValue {
    fn from(value: NaiveDate) -> Self {
        StateValue::Date(value)
    }
}

impl From<Vec<StateValue>> for StateValue {
    fn from(value: Vec<StateValue>) -> Self {
        StateValue::Seq(value)
    }
}

impl<T: Into<StateValue>> From<Option<T>> for StateValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(StateValue::Null)
    }
}

/// 從狀態值讀取具型別的屬性值
pub trait FromStateValue: Sized {
    fn from_state_value(value: &StateValue) -> Option<Self>;
}

impl FromStateValue for bool {
    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromStateValue for i64 {
    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_int()
    }
}

impl FromStateValue for i32 {
    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_int().and_then(|i| i32::try_from(i).ok())
    }
}

impl FromStateValue for u32 {
    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_int().and_then(|i| u32::try_from(i).ok())
    }
}

impl FromStateValue for Decimal {
    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_decimal()
    }
}

impl FromStateValue for String {
    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromStateValue for NaiveDate {
    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_shape() {
        let pair = StateValue::pair("Width", "10px");

        let (key, value) = pair.expect_pair("test").unwrap();
        assert_eq!(key.as_str(), Some("Width"));
        assert_eq!(value.as_str(), Some("10px"));
    }

    #[test]
    fn test_expect_arity_mismatch() {
        let seq = StateValue::Seq(vec![StateValue::Int(1)]);

        let err = seq.expect_pair("pair").unwrap_err();
        assert!(matches!(err, StateError::StateCorruption(_)));
    }

    #[test]
    fn test_expect_index_rejects_negative() {
        assert_eq!(StateValue::Int(3).expect_index("tag").unwrap(), 3);
        assert!(StateValue::Int(-1).expect_index("tag").is_err());
        assert!(StateValue::from("3").expect_index("tag").is_err());
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<String> = None;
        assert!(StateValue::from(none).is_null());
        assert_eq!(StateValue::from(Some(5i64)), StateValue::Int(5));
        assert_eq!(StateValue::Null.into_option(), None);
    }

    #[test]
    fn test_typed_read() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();

        assert_eq!(bool::from_state_value(&StateValue::Bool(true)), Some(true));
        assert_eq!(u32::from_state_value(&StateValue::Int(-4)), None);
        assert_eq!(Decimal::from_state_value(&StateValue::Int(7)), Some(Decimal::from(7)));
        assert_eq!(NaiveDate::from_state_value(&StateValue::Date(date)), Some(date));
        assert_eq!(String::from_state_value(&StateValue::Int(1)), None);
    }

    #[test]
    fn test_json_tree_roundtrip() {
        // 保存結果必須能由通用樹狀序列化器表示
        let tree = StateValue::Seq(vec![
            StateValue::pair("Width", "20px"),
            StateValue::pair("Visible", false),
            StateValue::pair("Rate", Decimal::new(125, 1)),
            StateValue::Null,
        ]);

        let json = serde_json::to_string(&tree).unwrap();
        let back: StateValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
