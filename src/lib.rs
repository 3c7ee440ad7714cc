//! # ViewState
//!
//! 跨回傳請求保存控制項狀態：變更追蹤、可追蹤集合、控制項樹遞迴保存與隱藏欄位編碼

pub use vs_controls;
pub use vs_core;
pub use vs_format;
pub use vs_state;

// Re-export 主要類型
pub use vs_controls::{Control, GridViewState, HotSpotCollection, ViewStateMode};
pub use vs_core::{Result, StateConfig, StateError, StateValue, Unit};
pub use vs_format::StateFormatter;
pub use vs_state::{ManagedCollection, ManagedElement, PropertyStore, StateManager};

/// 保存整個頁面並編碼為隱藏欄位內容
pub fn save_page(root: &Control, formatter: &StateFormatter) -> Result<String> {
    let state = root.save_state_recursive(ViewStateMode::Enabled);
    tracing::debug!("頁面狀態保存完成: 有內容 = {}", state.is_some());
    formatter.serialize(state.as_ref())
}

/// 解碼隱藏欄位內容並還原到重建後的頁面
pub fn load_page(root: &mut Control, formatter: &StateFormatter, field: &str) -> Result<()> {
    if let Some(state) = formatter.deserialize(field)? {
        root.load_state_recursive(&state)?;
    }
    Ok(())
}
