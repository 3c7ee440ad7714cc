//! 可追蹤的多型集合
//!
//! 元素類型為封閉的列舉，每個變體對應一個已知類型標籤（宣告順序，只可附加）。
//! 標籤是保存結果中唯一的執行期類型資訊。

use vs_core::{Result, StateError, StateValue};

use crate::manager::StateManager;

/// 集合元素
pub trait ManagedElement: StateManager + Sized {
    /// 已知類型名稱表，索引即標籤
    const KNOWN_TYPES: &'static [&'static str];

    /// 此元素的類型標籤
    fn type_tag(&self) -> usize;

    /// 依標籤建立預設元素
    fn create_known_type(tag: usize) -> Result<Self>;

    /// 元素本身的約束檢查（插入前呼叫）
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// 集合層級的插入檢查：候選元素與其餘元素
pub type ElementValidator<T> = fn(candidate: &T, others: &[&T]) -> Result<()>;

/// 可追蹤的有序多型集合
///
/// 追蹤階段內的任何結構變更（新增、插入、移除、替換、清空）都會讓下次保存
/// 輸出整個集合，而不是只輸出變更部分。
#[derive(Debug, Clone)]
pub struct ManagedCollection<T: ManagedElement> {
    items: Vec<T>,
    tracking: bool,
    save_all: bool,
    validator: Option<ElementValidator<T>>,
}

impl<T: ManagedElement> ManagedCollection<T> {
    /// 創建空集合
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            tracking: false,
            save_all: false,
            validator: None,
        }
    }

    /// 建構器模式：設置集合層級的插入檢查
    pub fn with_validator(mut self, validator: ElementValidator<T>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// 已知類型名稱表
    pub fn known_types() -> &'static [&'static str] {
        T::KNOWN_TYPES
    }

    /// 依標籤建立元素；未知標籤視為狀態損毀
    pub fn create_known_type(tag: usize) -> Result<T> {
        if tag >= T::KNOWN_TYPES.len() {
            return Err(StateError::corruption(format!(
                "未知的類型標籤 {}（已知 {} 種）",
                tag,
                T::KNOWN_TYPES.len()
            )));
        }
        T::create_known_type(tag)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// 可變存取；元素自行追蹤屬性變更
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// 附加元素，回傳索引
    pub fn add(&mut self, element: T) -> Result<usize> {
        let index = self.items.len();
        self.insert_internal(index, element)?;
        Ok(index)
    }

    /// 在指定位置插入元素
    pub fn insert(&mut self, index: usize, element: T) -> Result<()> {
        if index > self.items.len() {
            return Err(StateError::out_of_range(
                "index",
                format!("{} 超出集合長度 {}", index, self.items.len()),
            ));
        }
        self.insert_internal(index, element)
    }

    /// 移除指定位置的元素
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        self.check_index(index)?;

        let removed = self.items.remove(index);
        if self.tracking {
            tracing::debug!("移除集合元素 {}，下次保存輸出完整集合", index);
            self.set_dirty();
        }
        Ok(removed)
    }

    /// 替換指定位置的元素，回傳舊元素
    pub fn set(&mut self, index: usize, mut element: T) -> Result<T> {
        self.check_index(index)?;
        self.validate_element(&element, Some(index))?;

        if self.tracking {
            element.track_state();
            element.set_dirty();
            self.save_all = true;
        }
        Ok(std::mem::replace(&mut self.items[index], element))
    }

    /// 清空集合
    pub fn clear(&mut self) {
        self.items.clear();
        if self.tracking {
            self.save_all = true;
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(StateError::out_of_range(
                "index",
                format!("{} 超出集合長度 {}", index, self.items.len()),
            ));
        }
        Ok(())
    }

    fn validate_element(&self, element: &T, replacing: Option<usize>) -> Result<()> {
        let tag = element.type_tag();
        if tag >= T::KNOWN_TYPES.len() {
            return Err(StateError::InvalidElement(format!(
                "類型標籤 {} 不在已知類型中",
                tag
            )));
        }

        element.validate()?;

        if let Some(validator) = self.validator {
            let others: Vec<&T> = self
                .items
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != replacing)
                .map(|(_, item)| item)
                .collect();
            validator(element, &others)?;
        }

        Ok(())
    }

    fn insert_internal(&mut self, index: usize, mut element: T) -> Result<()> {
        self.validate_element(&element, None)?;

        if self.tracking {
            element.track_state();
            element.set_dirty();
            self.save_all = true;
            tracing::debug!(
                "插入集合元素 {}（{}）",
                index,
                T::KNOWN_TYPES[element.type_tag()]
            );
        }

        self.items.insert(index, element);
        Ok(())
    }
}

impl<T: ManagedElement> Default for ManagedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ManagedElement> StateManager for ManagedCollection<T> {
    fn is_tracking(&self) -> bool {
        self.tracking
    }

    fn track_state(&mut self) {
        self.tracking = true;
        for item in &mut self.items {
            item.track_state();
        }
    }

    fn is_dirty(&self) -> bool {
        self.save_all || self.items.iter().any(StateManager::is_dirty)
    }

    fn set_dirty(&mut self) {
        self.save_all = true;
        for item in &mut self.items {
            item.set_dirty();
        }
    }

    /// 無結構變更且無髒元素時回傳 None；
    /// 否則依序輸出每個元素的 `(標籤, 完整狀態)`。
    fn save_state(&self) -> Option<StateValue> {
        if !self.is_dirty() {
            return None;
        }
        self.save_entries()
    }

    fn save_full_state(&self) -> Option<StateValue> {
        if self.items.is_empty() {
            return None;
        }
        self.save_entries()
    }

    /// 清空後依保存順序重建元素
    fn load_state(&mut self, state: &StateValue) -> Result<()> {
        if state.is_null() {
            return Ok(());
        }

        let mut rebuilt = Vec::new();
        for entry in state.expect_seq("集合狀態")? {
            let (tag, element_state) = entry.expect_pair("集合元素")?;
            let tag = tag.expect_index("類型標籤")?;

            let mut element = Self::create_known_type(tag)?;
            if !element_state.is_null() {
                element.load_state(element_state)?;
            }
            if self.tracking {
                element.track_state();
            }
            rebuilt.push(element);
        }

        tracing::debug!("重建集合元素 {} 個", rebuilt.len());

        self.items = rebuilt;
        self.save_all = false;
        Ok(())
    }
}

impl<T: ManagedElement> ManagedCollection<T> {
    fn save_entries(&self) -> Option<StateValue> {
        let entries = self
            .items
            .iter()
            .map(|item| {
                StateValue::pair(
                    item.type_tag(),
                    StateValue::from_option(item.save_full_state()),
                )
            })
            .collect();
        Some(StateValue::Seq(entries))
    }
}

impl<'a, T: ManagedElement> IntoIterator for &'a ManagedCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
