//! 屬性儲存（ViewState）

use indexmap::IndexMap;
use vs_core::{FromStateValue, Result, StateValue};

use crate::dirty_tracking::DirtyTracker;
use crate::manager::StateManager;

/// 單一控制項的屬性儲存
///
/// 只記錄明確設置過的屬性；不存在的鍵代表使用類型預設值。
/// 進入追蹤階段後的寫入會被標記為髒，保存時只輸出髒鍵。
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    values: IndexMap<String, StateValue>,
    tracker: DirtyTracker,
}

impl PropertyStore {
    /// 創建空的屬性儲存
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
            tracker: DirtyTracker::new(),
        }
    }

    /// 讀取屬性值；未設置時回傳 None
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.values.get(key)
    }

    /// 讀取具型別的屬性值；未設置或型別不符時回傳 None
    pub fn get_as<T: FromStateValue>(&self, key: &str) -> Option<T> {
        self.values.get(key).and_then(T::from_state_value)
    }

    /// 讀取具型別的屬性值，未設置時使用預設值
    pub fn get_or<T: FromStateValue>(&self, key: &str, default: T) -> T {
        self.get_as(key).unwrap_or(default)
    }

    /// 設置屬性值
    ///
    /// 追蹤階段外設置 Null 等同移除；追蹤階段內則保留一個髒的 Null，
    /// 讓重設動作也能被保存。
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<StateValue>) {
        let key = key.into();
        let value = value.into();

        if value.is_null() && !self.tracker.is_tracking() {
            self.remove(&key);
            return;
        }

        self.values.insert(key.clone(), value);
        self.tracker.record_write(&key);
    }

    /// 強制將鍵標記為髒（鍵不存在時無作用）
    pub fn mark_dirty(&mut self, key: &str) {
        if self.values.contains_key(key) {
            self.tracker.mark_dirty(key);
        }
    }

    /// 移除屬性
    pub fn remove(&mut self, key: &str) -> Option<StateValue> {
        self.tracker.mark_clean(key);
        self.values.shift_remove(key)
    }

    /// 清除所有屬性
    pub fn clear(&mut self) {
        self.values.clear();
        self.tracker.clear();
    }

    /// 是否有此鍵（包含追蹤中重設留下的 Null）
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// 此鍵是否設有非 Null 的值
    pub fn is_set(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|value| !value.is_null())
    }

    /// 是否至少有一個鍵設有非 Null 的值
    pub fn has_values(&self) -> bool {
        self.values.values().any(|value| !value.is_null())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 依設置順序列出鍵
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// 依設置順序列出鍵值
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 檢查單一鍵是否為髒
    pub fn is_item_dirty(&self, key: &str) -> bool {
        self.tracker.is_dirty(key)
    }

    /// 將所有現有鍵標記為髒或乾淨
    pub fn set_all_dirty(&mut self, dirty: bool) {
        if dirty {
            for key in self.values.keys() {
                self.tracker.mark_dirty(key);
            }
        } else {
            self.tracker.clear();
        }
    }

    /// 進入追蹤階段（單向、可重複呼叫）
    pub fn begin_tracking(&mut self) {
        self.tracker.begin_tracking();
    }

    pub fn is_tracking(&self) -> bool {
        self.tracker.is_tracking()
    }

    /// 保存髒鍵
    ///
    /// 無髒鍵時回傳 None；否則依儲存順序輸出 `[(key, value), ...]`。
    pub fn save(&self) -> Option<StateValue> {
        if !self.tracker.has_dirty() {
            return None;
        }

        let pairs: Vec<StateValue> = self
            .values
            .iter()
            .filter(|(key, _)| self.tracker.is_dirty(key))
            .map(|(key, value)| StateValue::pair(key.as_str(), value.clone()))
            .collect();

        Some(StateValue::Seq(pairs))
    }

    /// 保存所有鍵（不論髒標記）
    pub fn save_all(&self) -> Option<StateValue> {
        if self.values.is_empty() {
            return None;
        }

        let pairs = self
            .values
            .iter()
            .map(|(key, value)| StateValue::pair(key.as_str(), value.clone()))
            .collect();

        Some(StateValue::Seq(pairs))
    }

    /// 還原先前保存的鍵值
    ///
    /// 還原不是變更，載入的鍵不會被標記為髒。格式錯誤時不修改任何內容。
    pub fn load(&mut self, state: &StateValue) -> Result<()> {
        if state.is_null() {
            return Ok(());
        }

        // 先完整驗證，再套用
        let mut restored = Vec::new();
        for entry in state.expect_seq("屬性儲存")? {
            let (key, value) = entry.expect_pair("屬性鍵值")?;
            let key = key.expect_str("屬性鍵")?;
            restored.push((key.to_string(), value.clone()));
        }

        tracing::debug!("還原屬性 {} 筆", restored.len());

        for (key, value) in restored {
            self.tracker.mark_clean(&key);
            self.values.insert(key, value);
        }

        Ok(())
    }
}

impl StateManager for PropertyStore {
    fn is_tracking(&self) -> bool {
        self.tracker.is_tracking()
    }

    fn track_state(&mut self) {
        self.begin_tracking();
    }

    fn is_dirty(&self) -> bool {
        self.tracker.has_dirty()
    }

    fn set_dirty(&mut self) {
        self.set_all_dirty(true);
    }

    fn save_state(&self) -> Option<StateValue> {
        self.save()
    }

    fn save_full_state(&self) -> Option<StateValue> {
        self.save_all()
    }

    fn load_state(&mut self, state: &StateValue) -> Result<()> {
        self.load(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vs_core::StateError;

    #[test]
    fn test_sets_before_tracking_are_defaults() {
        let mut store = PropertyStore::new();
        store.set("Width", "10px");
        store.set("Visible", true);
        store.begin_tracking();

        assert_eq!(store.save(), None);
        assert_eq!(store.get("Width"), Some(&StateValue::from("10px")));
    }

    #[test]
    fn test_width_example() {
        let mut store = PropertyStore::new();
        store.set("Width", "10px");
        store.begin_tracking();
        store.set("Width", "20px");

        let saved = store.save().unwrap();
        assert_eq!(
            saved,
            StateValue::Seq(vec![StateValue::pair("Width", "20px")])
        );

        let mut fresh = PropertyStore::new();
        fresh.load(&saved).unwrap();
        assert_eq!(fresh.get("Width"), Some(&StateValue::from("20px")));
        assert!(!fresh.is_item_dirty("Width"));
    }

    #[test]
    fn test_dirty_is_not_cleared_by_same_value() {
        let mut store = PropertyStore::new();
        store.set("Text", "a");
        store.begin_tracking();

        store.set("Text", "b");
        store.set("Text", "b");
        store.set("Text", "a");

        assert!(store.is_item_dirty("Text"));
        assert_eq!(
            store.save(),
            Some(StateValue::Seq(vec![StateValue::pair("Text", "a")]))
        );
    }

    #[test]
    fn test_save_keeps_store_order() {
        let mut store = PropertyStore::new();
        store.set("A", 1i64);
        store.set("B", 2i64);
        store.set("C", 3i64);
        store.begin_tracking();

        store.set("C", 30i64);
        store.set("A", 10i64);

        assert_eq!(
            store.save(),
            Some(StateValue::Seq(vec![
                StateValue::pair("A", 10i64),
                StateValue::pair("C", 30i64),
            ]))
        );
    }

    #[test]
    fn test_null_semantics() {
        let mut store = PropertyStore::new();
        store.set("CssClass", "grid");
        store.set("CssClass", StateValue::Null);
        assert!(!store.contains("CssClass"));

        store.set("ToolTip", "hint");
        store.begin_tracking();
        store.set("ToolTip", StateValue::Null);

        // 追蹤中設置 Null 要能被保存，但不算已設置
        assert!(store.contains("ToolTip"));
        assert!(!store.is_set("ToolTip"));
        assert!(!store.has_values());
        assert_eq!(
            store.save(),
            Some(StateValue::Seq(vec![StateValue::pair("ToolTip", StateValue::Null)]))
        );
    }

    #[test]
    fn test_mark_dirty_forces_output() {
        let mut store = PropertyStore::new();
        store.set("Items", StateValue::Seq(vec![StateValue::from("x")]));
        store.begin_tracking();
        assert_eq!(store.save(), None);

        store.mark_dirty("Items");
        store.mark_dirty("Missing");
        assert!(store.save().is_some());
        assert!(!store.contains("Missing"));
    }

    #[test]
    fn test_set_all_dirty_and_save_all() {
        let mut store = PropertyStore::new();
        store.set("A", 1i64);
        store.set("B", 2i64);

        assert_eq!(store.save(), None);
        assert_eq!(store.save_all().unwrap().as_seq().unwrap().len(), 2);

        store.set_all_dirty(true);
        assert_eq!(store.save(), store.save_all());

        store.set_all_dirty(false);
        assert_eq!(store.save(), None);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = PropertyStore::new();
        store.begin_tracking();
        store.set("A", 1i64);
        store.set("B", 2i64);

        assert_eq!(store.remove("A"), Some(StateValue::Int(1)));
        assert!(!store.is_item_dirty("A"));
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["B"]);

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.save(), None);
    }

    #[test]
    fn test_typed_accessors() {
        let mut store = PropertyStore::new();
        store.set("PageSize", 25i64);

        assert_eq!(store.get_or("PageSize", 10i64), 25);
        assert_eq!(store.get_or("PageIndex", 0i64), 0);
        assert_eq!(store.get_as::<String>("PageSize"), None);
    }

    #[test]
    fn test_load_null_is_noop() {
        let mut store = PropertyStore::new();
        store.set("A", 1i64);

        store.load(&StateValue::Null).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_malformed_is_corruption() {
        let mut store = PropertyStore::new();
        store.set("A", 1i64);

        let cases = vec![
            StateValue::from("not a list"),
            StateValue::Seq(vec![StateValue::Seq(vec![StateValue::from("A")])]),
            StateValue::Seq(vec![StateValue::pair(5i64, "x")]),
            StateValue::Seq(vec![StateValue::pair("B", 2i64), StateValue::Int(9)]),
        ];

        for state in cases {
            let err = store.load(&state).unwrap_err();
            assert!(matches!(err, StateError::StateCorruption(_)));
        }

        // 失敗時不修改內容
        assert_eq!(store.len(), 1);
        assert!(!store.contains("B"));
    }

    #[test]
    fn test_loaded_values_then_tracked_write() {
        let mut store = PropertyStore::new();
        store
            .load(&StateValue::Seq(vec![
                StateValue::pair("A", 1i64),
                StateValue::pair("B", 2i64),
            ]))
            .unwrap();
        store.begin_tracking();
        assert_eq!(store.save(), None);

        store.set("B", 3i64);
        assert_eq!(
            store.save(),
            Some(StateValue::Seq(vec![StateValue::pair("B", 3i64)]))
        );
    }

    fn scalar() -> impl Strategy<Value = StateValue> {
        prop_oneof![
            any::<bool>().prop_map(StateValue::Bool),
            any::<i64>().prop_map(StateValue::Int),
            "[a-z0-9]{0,8}".prop_map(StateValue::Text),
        ]
    }

    proptest! {
        #[test]
        fn prop_pre_tracking_sets_save_nothing(
            writes in proptest::collection::vec(("[A-D]", scalar()), 0..20)
        ) {
            let mut store = PropertyStore::new();
            for (key, value) in writes {
                store.set(key, value);
            }
            store.begin_tracking();
            prop_assert_eq!(store.save(), None);
        }

        #[test]
        fn prop_tracked_writes_roundtrip(
            defaults in proptest::collection::vec(("[A-D]", scalar()), 0..8),
            writes in proptest::collection::vec(("[A-F]", scalar()), 1..12)
        ) {
            let mut store = PropertyStore::new();
            for (key, value) in defaults {
                store.set(key, value);
            }
            store.begin_tracking();
            for (key, value) in &writes {
                store.set(key.clone(), value.clone());
            }

            let saved = store.save().expect("寫入後必須有髒鍵");
            let mut fresh = PropertyStore::new();
            fresh.load(&saved).unwrap();

            for (key, _) in &writes {
                prop_assert!(store.is_item_dirty(key));
                prop_assert_eq!(fresh.get(key), store.get(key));
            }
        }
    }
}
