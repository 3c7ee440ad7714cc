//! # ViewState Format
//!
//! 隱藏欄位編碼層（JSON + 十六進位 + SHA-256 完整性摘要）

pub mod formatter;

// Re-export 主要類型
pub use formatter::StateFormatter;
