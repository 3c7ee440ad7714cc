//! 尺寸單位模型

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{FromStateValue, StateError, StateValue};

/// 單位類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitType {
    /// 像素
    Pixel,
    /// 點
    Point,
    /// 派卡
    Pica,
    /// 英吋
    Inch,
    /// 公釐
    Mm,
    /// 公分
    Cm,
    /// 百分比
    Percentage,
    /// 字高
    Em,
    /// x 字高
    Ex,
}

impl UnitType {
    /// CSS 後綴
    pub fn suffix(&self) -> &'static str {
        match self {
            UnitType::Pixel => "px",
            UnitType::Point => "pt",
            UnitType::Pica => "pc",
            UnitType::Inch => "in",
            UnitType::Mm => "mm",
            UnitType::Cm => "cm",
            UnitType::Percentage => "%",
            UnitType::Em => "em",
            UnitType::Ex => "ex",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        let unit = match suffix.to_ascii_lowercase().as_str() {
            "" | "px" => UnitType::Pixel,
            "pt" => UnitType::Point,
            "pc" => UnitType::Pica,
            "in" => UnitType::Inch,
            "mm" => UnitType::Mm,
            "cm" => UnitType::Cm,
            "%" => UnitType::Percentage,
            "em" => UnitType::Em,
            "ex" => UnitType::Ex,
            _ => return None,
        };
        Some(unit)
    }
}

/// 尺寸（數值 + 單位），例如 `10px`、`50%`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub value: Decimal,
    pub unit_type: UnitType,
}

impl Unit {
    /// 創建新的尺寸
    pub fn new(value: Decimal, unit_type: UnitType) -> Self {
        Self { value, unit_type }
    }

    /// 像素尺寸
    pub fn pixel(value: i64) -> Self {
        Self::new(Decimal::from(value), UnitType::Pixel)
    }

    /// 百分比尺寸
    pub fn percentage(value: i64) -> Self {
        Self::new(Decimal::from(value), UnitType::Percentage)
    }

    /// 檢查是否為負值
    pub fn is_negative(&self) -> bool {
        self.value < Decimal::ZERO
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value.normalize(), self.unit_type.suffix())
    }
}

impl FromStr for Unit {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(StateError::InvalidUnit(s.to_string()));
        }

        // 數字部分：可選負號、數字與小數點
        let split = trimmed
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
            .map(|(i, _)| i)
            .unwrap_or(trimmed.len());

        let (number, suffix) = trimmed.split_at(split);
        let value =
            Decimal::from_str(number).map_err(|_| StateError::InvalidUnit(s.to_string()))?;
        let unit_type = UnitType::from_suffix(suffix.trim())
            .ok_or_else(|| StateError::InvalidUnit(s.to_string()))?;

        Ok(Self::new(value, unit_type))
    }
}

impl From<Unit> for StateValue {
    fn from(value: Unit) -> Self {
        StateValue::Text(value.to_string())
    }
}

impl FromStateValue for Unit {
    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_str().and_then(|s| s.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("10px", Decimal::from(10), UnitType::Pixel)]
    #[case("10", Decimal::from(10), UnitType::Pixel)]
    #[case("50%", Decimal::from(50), UnitType::Percentage)]
    #[case("1.5em", Decimal::new(15, 1), UnitType::Em)]
    #[case(" 12 pt ", Decimal::from(12), UnitType::Point)]
    #[case("-3px", Decimal::from(-3), UnitType::Pixel)]
    fn test_parse_unit(#[case] input: &str, #[case] value: Decimal, #[case] unit_type: UnitType) {
        let unit: Unit = input.parse().unwrap();
        assert_eq!(unit.value, value);
        assert_eq!(unit.unit_type, unit_type);
    }

    #[rstest]
    #[case("")]
    #[case("px")]
    #[case("10furlongs")]
    #[case("1.2.3px")]
    fn test_parse_invalid_unit(#[case] input: &str) {
        let err = input.parse::<Unit>().unwrap_err();
        assert!(matches!(err, StateError::InvalidUnit(_)));
    }

    #[test]
    fn test_display_normalizes() {
        let unit = Unit::new(Decimal::new(1000, 2), UnitType::Pixel);
        assert_eq!(unit.to_string(), "10px");
        assert_eq!(Unit::percentage(50).to_string(), "50%");
    }

    #[test]
    fn test_state_value_conversion() {
        let value = StateValue::from(Unit::pixel(20));
        assert_eq!(value, StateValue::Text("20px".to_string()));
        assert_eq!(Unit::from_state_value(&value), Some(Unit::pixel(20)));
        assert!(Unit::pixel(-1).is_negative());
    }
}
