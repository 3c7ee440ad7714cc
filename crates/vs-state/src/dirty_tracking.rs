//! 髒標記追蹤

use std::collections::HashSet;

/// 髒標記追蹤器
///
/// 只有在進入追蹤階段後，寫入才會被記錄為髒。
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    tracking: bool,
    dirty_keys: HashSet<String>,
}

impl DirtyTracker {
    /// 創建新的追蹤器（尚未追蹤）
    pub fn new() -> Self {
        Self {
            tracking: false,
            dirty_keys: HashSet::new(),
        }
    }

    /// 進入追蹤階段（單向、可重複呼叫）
    pub fn begin_tracking(&mut self) {
        self.tracking = true;
    }

    /// 是否處於追蹤階段
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// 記錄一次寫入；僅在追蹤階段標記為髒
    pub fn record_write(&mut self, key: &str) {
        if self.tracking {
            self.mark_dirty(key);
        }
    }

    /// 強制標記為髒（不論是否追蹤）
    pub fn mark_dirty(&mut self, key: &str) {
        if !self.dirty_keys.contains(key) {
            self.dirty_keys.insert(key.to_string());
        }
    }

    /// 清除單一鍵的髒標記
    pub fn mark_clean(&mut self, key: &str) {
        self.dirty_keys.remove(key);
    }

    /// 檢查鍵是否為髒
    pub fn is_dirty(&self, key: &str) -> bool {
        self.dirty_keys.contains(key)
    }

    /// 是否有任何髒鍵
    pub fn has_dirty(&self) -> bool {
        !self.dirty_keys.is_empty()
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_keys.clear();
    }

    /// 獲取所有髒鍵（無序）
    pub fn dirty_keys(&self) -> Vec<String> {
        self.dirty_keys.iter().cloned().collect()
    }
}
