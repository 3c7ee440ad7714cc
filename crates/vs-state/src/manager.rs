//! 狀態管理介面

use vs_core::{Result, StateValue};

/// 可追蹤、可保存、可還原的狀態物件
///
/// 屬性儲存、集合與集合元素都實作此介面，外層物件把生命週期呼叫轉發給內層。
pub trait StateManager {
    /// 是否處於追蹤階段
    fn is_tracking(&self) -> bool;

    /// 進入追蹤階段
    fn track_state(&mut self);

    /// 是否有待保存的變更
    fn is_dirty(&self) -> bool;

    /// 將目前所有狀態標記為髒，下次保存時完整輸出
    fn set_dirty(&mut self);

    /// 保存髒狀態；無變更時回傳 None
    fn save_state(&self) -> Option<StateValue>;

    /// 保存完整狀態（不論髒標記）；沒有任何已設置的屬性時回傳 None
    fn save_full_state(&self) -> Option<StateValue>;

    /// 還原先前保存的狀態
    fn load_state(&mut self, state: &StateValue) -> Result<()>;
}
