//! 控制項樹的遞迴保存與還原
//!
//! 每個節點的保存結果為 `[自身狀態, [子索引, 子狀態, ...]]`，兩格皆可為 Null；
//! 整棵子樹都沒有狀態時回傳 None。

use std::collections::BTreeMap;

use vs_core::{Result, StateError, StateValue};
use vs_state::PropertyStore;

/// 檢視狀態模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewStateMode {
    /// 沿用父節點
    #[default]
    Inherit,
    /// 啟用
    Enabled,
    /// 停用
    Disabled,
}

/// 控制項節點
#[derive(Debug, Clone)]
pub struct Control {
    id: Option<String>,
    view_state: PropertyStore,
    enable_view_state: bool,
    view_state_mode: ViewStateMode,
    children: Vec<Control>,
    /// 尚未建立的子節點狀態（依索引暫存）
    pending_child_state: BTreeMap<usize, StateValue>,
}

impl Control {
    /// 創建新的控制項
    pub fn new() -> Self {
        Self {
            id: None,
            view_state: PropertyStore::new(),
            enable_view_state: true,
            view_state_mode: ViewStateMode::Inherit,
            children: Vec::new(),
            pending_child_state: BTreeMap::new(),
        }
    }

    /// 建構器模式：設置 ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// 建構器模式：設置檢視狀態模式
    pub fn with_view_state_mode(mut self, mode: ViewStateMode) -> Self {
        self.view_state_mode = mode;
        self
    }

    /// 建構器模式：停用整棵子樹的檢視狀態
    pub fn without_view_state(mut self) -> Self {
        self.enable_view_state = false;
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn view_state(&self) -> &PropertyStore {
        &self.view_state
    }

    pub fn view_state_mut(&mut self) -> &mut PropertyStore {
        &mut self.view_state
    }

    pub fn enable_view_state(&self) -> bool {
        self.enable_view_state
    }

    pub fn set_enable_view_state(&mut self, enable: bool) {
        self.enable_view_state = enable;
    }

    pub fn view_state_mode(&self) -> ViewStateMode {
        self.view_state_mode
    }

    pub fn set_view_state_mode(&mut self, mode: ViewStateMode) {
        self.view_state_mode = mode;
    }

    pub fn children(&self) -> &[Control] {
        &self.children
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Control> {
        self.children.get_mut(index)
    }

    /// 暫存中的子節點狀態數量
    pub fn pending_child_count(&self) -> usize {
        self.pending_child_state.len()
    }

    /// 依 ID 搜尋子孫節點（深度優先）
    pub fn find_control(&self, id: &str) -> Option<&Control> {
        self.children.iter().find_map(|child| {
            if child.id() == Some(id) {
                Some(child)
            } else {
                child.find_control(id)
            }
        })
    }

    pub fn is_tracking(&self) -> bool {
        self.view_state.is_tracking()
    }

    /// 整棵子樹進入追蹤階段
    pub fn track_state_recursive(&mut self) {
        self.view_state.begin_tracking();
        for child in &mut self.children {
            child.track_state_recursive();
        }
    }

    /// 加入子節點
    ///
    /// 父節點已在追蹤時，子節點跟著進入追蹤；若先前還原時有此索引的暫存狀態，立即套用。
    pub fn add_child(&mut self, mut child: Control) -> Result<usize> {
        let index = self.children.len();

        if self.is_tracking() {
            child.track_state_recursive();
        }

        if let Some(state) = self.pending_child_state.remove(&index) {
            tracing::debug!("子節點 {} 套用暫存狀態", index);
            child.load_state_recursive(&state)?;
        }

        self.children.push(child);
        Ok(index)
    }

    /// 遞迴保存
    ///
    /// `inherited` 為父節點的有效模式；根節點通常傳入 `Enabled`。
    pub fn save_state_recursive(&self, inherited: ViewStateMode) -> Option<StateValue> {
        if !self.enable_view_state {
            return None;
        }

        let effective = match self.view_state_mode {
            ViewStateMode::Inherit => inherited,
            mode => mode,
        };

        let own = if effective == ViewStateMode::Enabled {
            self.view_state.save()
        } else {
            None
        };

        let mut child_states = Vec::new();
        for (index, child) in self.children.iter().enumerate() {
            if let Some(state) = child.save_state_recursive(effective) {
                child_states.push(StateValue::from(index));
                child_states.push(state);
            }
        }

        if own.is_none() && child_states.is_empty() {
            return None;
        }

        let children = if child_states.is_empty() {
            StateValue::Null
        } else {
            StateValue::Seq(child_states)
        };
        Some(StateValue::pair(StateValue::from_option(own), children))
    }

    /// 遞迴還原
    ///
    /// 子狀態依索引分派；索引超出目前子節點數時暫存，待 `add_child` 時套用。
    pub fn load_state_recursive(&mut self, state: &StateValue) -> Result<()> {
        if state.is_null() || !self.enable_view_state {
            return Ok(());
        }

        let (own, children) = state.expect_pair("控制項狀態")?;
        self.view_state.load(own)?;

        if children.is_null() {
            return Ok(());
        }

        let entries = children.expect_seq("子節點狀態")?;
        if entries.len() % 2 != 0 {
            tracing::warn!("子節點狀態長度為奇數: {}", entries.len());
            return Err(StateError::corruption("子節點狀態必須成對出現"));
        }

        for entry in entries.chunks(2) {
            let index = entry[0].expect_index("子節點索引")?;
            let child_state = &entry[1];

            match self.children.get_mut(index) {
                Some(child) => child.load_state_recursive(child_state)?,
                None => {
                    self.pending_child_state.insert(index, child_state.clone());
                }
            }
        }

        Ok(())
    }
}

impl Default for Control {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Control {
        let mut form = Control::new().with_id("form1");
        form.add_child(Control::new().with_id("name")).unwrap();
        form.add_child(Control::new().with_id("email")).unwrap();

        let mut root = Control::new().with_id("page");
        root.add_child(form).unwrap();
        root
    }

    #[test]
    fn test_untouched_tree_saves_nothing() {
        let mut root = page();
        root.track_state_recursive();

        assert_eq!(root.save_state_recursive(ViewStateMode::Enabled), None);
    }

    #[test]
    fn test_nested_roundtrip() {
        let mut root = page();
        root.track_state_recursive();
        root.child_mut(0)
            .unwrap()
            .child_mut(1)
            .unwrap()
            .view_state_mut()
            .set("Text", "a@b.c");

        let saved = root.save_state_recursive(ViewStateMode::Enabled).unwrap();

        let mut next_request = page();
        next_request.load_state_recursive(&saved).unwrap();
        let email = next_request.find_control("email").unwrap();
        assert_eq!(email.view_state().get_as::<String>("Text").as_deref(), Some("a@b.c"));
        assert!(next_request.find_control("name").unwrap().view_state().is_empty());
    }

    #[test]
    fn test_disabled_mode_skips_own_state_only() {
        let mut root = page();
        root.child_mut(0)
            .unwrap()
            .set_view_state_mode(ViewStateMode::Disabled);
        root.child_mut(0)
            .unwrap()
            .child_mut(0)
            .unwrap()
            .set_view_state_mode(ViewStateMode::Enabled);
        root.track_state_recursive();

        let form = root.child_mut(0).unwrap();
        form.view_state_mut().set("Action", "/post");
        form.child_mut(0).unwrap().view_state_mut().set("Text", "kept");
        form.child_mut(1).unwrap().view_state_mut().set("Text", "dropped");

        let saved = root.save_state_recursive(ViewStateMode::Enabled).unwrap();
        let mut next_request = page();
        next_request.load_state_recursive(&saved).unwrap();

        assert!(next_request.find_control("form1").unwrap().view_state().is_empty());
        assert_eq!(
            next_request
                .find_control("name")
                .unwrap()
                .view_state()
                .get_as::<String>("Text")
                .as_deref(),
            Some("kept")
        );
        assert!(next_request.find_control("email").unwrap().view_state().is_empty());
    }

    #[test]
    fn test_enable_view_state_false_skips_subtree() {
        let mut root = page();
        root.child_mut(0).unwrap().set_enable_view_state(false);
        root.track_state_recursive();
        root.child_mut(0)
            .unwrap()
            .child_mut(0)
            .unwrap()
            .view_state_mut()
            .set("Text", "x");

        assert_eq!(root.save_state_recursive(ViewStateMode::Enabled), None);
    }

    #[test]
    fn test_pending_state_applied_on_add() {
        let mut root = Control::new();
        root.add_child(Control::new()).unwrap();
        root.add_child(Control::new()).unwrap();
        root.track_state_recursive();
        root.child_mut(1).unwrap().view_state_mut().set("Text", "late");
        let saved = root.save_state_recursive(ViewStateMode::Enabled).unwrap();

        // 下一次請求：子節點在還原之後才動態建立
        let mut next_request = Control::new();
        next_request.track_state_recursive();
        next_request.load_state_recursive(&saved).unwrap();
        assert_eq!(next_request.pending_child_count(), 1);

        next_request.add_child(Control::new()).unwrap();
        next_request.add_child(Control::new()).unwrap();
        assert_eq!(next_request.pending_child_count(), 0);

        let late = &next_request.children()[1];
        assert!(late.is_tracking());
        assert_eq!(late.view_state().get_as::<String>("Text").as_deref(), Some("late"));
        // 還原的值不是變更
        assert!(!late.view_state().is_item_dirty("Text"));
    }

    #[test]
    fn test_corrupted_child_list() {
        let mut root = page();

        let odd = StateValue::pair(StateValue::Null, StateValue::Seq(vec![StateValue::Int(0)]));
        assert!(matches!(
            root.load_state_recursive(&odd),
            Err(StateError::StateCorruption(_))
        ));

        let bad_index = StateValue::pair(
            StateValue::Null,
            StateValue::Seq(vec![StateValue::from("form1"), StateValue::Null]),
        );
        assert!(root.load_state_recursive(&bad_index).is_err());

        assert!(root.load_state_recursive(&StateValue::Int(1)).is_err());
    }
}
