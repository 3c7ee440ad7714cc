//! # ViewState Core
//!
//! 核心資料模型與類型定義

pub mod config;
pub mod unit;
pub mod value;

// Re-export 主要類型
pub use config::StateConfig;
pub use unit::{Unit, UnitType};
pub use value::{FromStateValue, StateValue};

/// 狀態錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("無效的集合元素: {0}")]
    InvalidElement(String),

    #[error("狀態資料損毀: {0}")]
    StateCorruption(String),

    #[error("參數超出範圍: {name}（{reason}）")]
    ArgumentOutOfRange { name: String, reason: String },

    #[error("參數不可為空: {0}")]
    ArgumentNull(String),

    #[error("無效的尺寸單位: {0}")]
    InvalidUnit(String),

    #[error("狀態資料過大: {size} 位元組（上限 {limit}）")]
    StateTooLarge { size: usize, limit: usize },

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StateError {
    /// 建立損毀錯誤
    pub fn corruption(message: impl Into<String>) -> Self {
        Self::StateCorruption(message.into())
    }

    /// 建立超出範圍錯誤
    pub fn out_of_range(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ArgumentOutOfRange {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StateError>;
