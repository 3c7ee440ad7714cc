//! 有序字典的保存與還原
//!
//! 用於資料列主鍵值這類「整體保存」的鍵值表，不做髒標記追蹤。

use indexmap::IndexMap;
use vs_core::{Result, StateValue};

/// 保存有序字典；空字典回傳 None
pub fn save_ordered(map: &IndexMap<String, StateValue>) -> Option<StateValue> {
    if map.is_empty() {
        return None;
    }

    let pairs = map
        .iter()
        .map(|(key, value)| StateValue::pair(key.as_str(), value.clone()))
        .collect();
    Some(StateValue::Seq(pairs))
}

/// 還原有序字典（先清空，再依保存順序插入）
pub fn load_ordered(map: &mut IndexMap<String, StateValue>, state: &StateValue) -> Result<()> {
    let mut restored = IndexMap::new();
    if !state.is_null() {
        for entry in state.expect_seq("有序字典")? {
            let (key, value) = entry.expect_pair("有序字典項目")?;
            restored.insert(key.expect_str("有序字典鍵")?.to_string(), value.clone());
        }
    }

    *map = restored;
    Ok(())
}
