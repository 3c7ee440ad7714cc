//! 資料表格的複合狀態
//!
//! 檢視狀態為固定六格的序列，各格依序為：
//! 自身屬性、欄位集合、標題樣式、資料列樣式、交替列樣式、繫結欄位值。
//!
//! 頁碼、選取列、編輯列、排序與主鍵欄位名稱另存於控制狀態，
//! 停用檢視狀態時仍會保存。

use indexmap::IndexMap;
use vs_core::{Result, StateError, StateValue};
use vs_state::ordered::{load_ordered, save_ordered};
use vs_state::{PropertyStore, StateManager};

use crate::field::{field_collection, DataControlFieldCollection};
use crate::style::TableItemStyle;

const SLOT_COUNT: usize = 6;
const CONTROL_SLOT_COUNT: usize = 6;

const PAGE_SIZE: &str = "PageSize";
const ALLOW_PAGING: &str = "AllowPaging";

/// 預設每頁筆數
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn code(self) -> i64 {
        match self {
            SortDirection::Ascending => 0,
            SortDirection::Descending => 1,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(SortDirection::Ascending),
            1 => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// 控制狀態（不受檢視狀態開關影響）
#[derive(Debug, Clone, PartialEq, Eq)]
struct ControlState {
    edit_index: i64,
    page_index: i64,
    selected_index: i64,
    sort_expression: String,
    sort_direction: SortDirection,
    data_key_names: Vec<String>,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            edit_index: -1,
            page_index: 0,
            selected_index: -1,
            sort_expression: String::new(),
            sort_direction: SortDirection::Ascending,
            data_key_names: Vec::new(),
        }
    }
}

/// 資料表格狀態
#[derive(Debug, Clone)]
pub struct GridViewState {
    enable_view_state: bool,
    control_state: ControlState,
    view_state: PropertyStore,
    columns: DataControlFieldCollection,
    header_style: TableItemStyle,
    row_style: TableItemStyle,
    alternating_row_style: TableItemStyle,
    bound_field_values: IndexMap<String, StateValue>,
    bound_field_values_dirty: bool,
}

impl GridViewState {
    /// 創建空的表格狀態
    pub fn new() -> Self {
        Self {
            enable_view_state: true,
            control_state: ControlState::default(),
            view_state: PropertyStore::new(),
            columns: field_collection(),
            header_style: TableItemStyle::new(),
            row_style: TableItemStyle::new(),
            alternating_row_style: TableItemStyle::new(),
            bound_field_values: IndexMap::new(),
            bound_field_values_dirty: false,
        }
    }

    /// 建構器模式：停用檢視狀態（控制狀態不受影響）
    pub fn without_view_state(mut self) -> Self {
        self.enable_view_state = false;
        self
    }

    pub fn enable_view_state(&self) -> bool {
        self.enable_view_state
    }

    pub fn set_enable_view_state(&mut self, enable: bool) {
        self.enable_view_state = enable;
    }

    pub fn page_index(&self) -> i64 {
        self.control_state.page_index
    }

    /// 設置頁碼；不可為負
    pub fn set_page_index(&mut self, index: i64) -> Result<()> {
        if index < 0 {
            return Err(StateError::out_of_range("PageIndex", format!("{} 不可為負值", index)));
        }
        self.control_state.page_index = index;
        Ok(())
    }

    pub fn page_size(&self) -> i64 {
        self.view_state.get_or(PAGE_SIZE, DEFAULT_PAGE_SIZE)
    }

    /// 設置每頁筆數；必須大於 0
    pub fn set_page_size(&mut self, size: i64) -> Result<()> {
        if size < 1 {
            return Err(StateError::out_of_range("PageSize", format!("{} 必須大於 0", size)));
        }
        self.view_state.set(PAGE_SIZE, size);
        Ok(())
    }

    pub fn allow_paging(&self) -> bool {
        self.view_state.get_or(ALLOW_PAGING, false)
    }

    pub fn set_allow_paging(&mut self, allow: bool) {
        self.view_state.set(ALLOW_PAGING, allow);
    }

    pub fn sort_expression(&self) -> &str {
        &self.control_state.sort_expression
    }

    pub fn set_sort_expression(&mut self, expression: impl Into<String>) {
        self.control_state.sort_expression = expression.into();
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.control_state.sort_direction
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.control_state.sort_direction = direction;
    }

    /// 選取列索引（-1 表示未選取）
    pub fn selected_index(&self) -> i64 {
        self.control_state.selected_index
    }

    pub fn set_selected_index(&mut self, index: i64) -> Result<()> {
        if index < -1 {
            return Err(StateError::out_of_range(
                "SelectedIndex",
                format!("{} 小於 -1", index),
            ));
        }
        self.control_state.selected_index = index;
        Ok(())
    }

    /// 編輯列索引（-1 表示未編輯）
    pub fn edit_index(&self) -> i64 {
        self.control_state.edit_index
    }

    pub fn set_edit_index(&mut self, index: i64) -> Result<()> {
        if index < -1 {
            return Err(StateError::out_of_range("EditIndex", format!("{} 小於 -1", index)));
        }
        self.control_state.edit_index = index;
        Ok(())
    }

    /// 主鍵欄位名稱
    pub fn data_key_names(&self) -> &[String] {
        &self.control_state.data_key_names
    }

    pub fn set_data_key_names(&mut self, names: Vec<String>) {
        self.control_state.data_key_names = names;
    }

    pub fn columns(&self) -> &DataControlFieldCollection {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut DataControlFieldCollection {
        &mut self.columns
    }

    pub fn header_style(&self) -> &TableItemStyle {
        &self.header_style
    }

    pub fn header_style_mut(&mut self) -> &mut TableItemStyle {
        &mut self.header_style
    }

    pub fn row_style(&self) -> &TableItemStyle {
        &self.row_style
    }

    pub fn row_style_mut(&mut self) -> &mut TableItemStyle {
        &mut self.row_style
    }

    pub fn alternating_row_style(&self) -> &TableItemStyle {
        &self.alternating_row_style
    }

    pub fn alternating_row_style_mut(&mut self) -> &mut TableItemStyle {
        &mut self.alternating_row_style
    }

    /// 編輯中資料列的繫結欄位值
    pub fn bound_field_values(&self) -> &IndexMap<String, StateValue> {
        &self.bound_field_values
    }

    /// 替換繫結欄位值（整體保存）
    pub fn set_bound_field_values(&mut self, values: IndexMap<String, StateValue>) {
        self.bound_field_values = values;
        if self.view_state.is_tracking() {
            self.bound_field_values_dirty = true;
        }
    }

    /// 保存控制狀態；全部為預設值時回傳 None
    ///
    /// 格式為六格序列：編輯列、頁碼、選取列、排序運算式、排序方向、主鍵欄位名稱，
    /// 預設值的格子為 Null。
    pub fn save_control_state(&self) -> Option<StateValue> {
        let state = &self.control_state;
        if *state == ControlState::default() {
            return None;
        }

        let non_default = |keep: bool, value: StateValue| {
            if keep {
                value
            } else {
                StateValue::Null
            }
        };

        Some(StateValue::Seq(vec![
            non_default(state.edit_index != -1, state.edit_index.into()),
            non_default(state.page_index != 0, state.page_index.into()),
            non_default(state.selected_index != -1, state.selected_index.into()),
            non_default(
                !state.sort_expression.is_empty(),
                state.sort_expression.as_str().into(),
            ),
            non_default(
                state.sort_direction != SortDirection::Ascending,
                state.sort_direction.code().into(),
            ),
            non_default(
                !state.data_key_names.is_empty(),
                StateValue::Seq(
                    state
                        .data_key_names
                        .iter()
                        .map(|name| StateValue::from(name.as_str()))
                        .collect(),
                ),
            ),
        ]))
    }

    /// 還原控制狀態
    ///
    /// 先把所有欄位重設為預設值，再套用保存的值；Null 代表全部為預設值。
    /// 格式錯誤時不修改任何內容。
    pub fn load_control_state(&mut self, state: &StateValue) -> Result<()> {
        let mut restored = ControlState::default();

        if !state.is_null() {
            let slots = state.expect_arity(CONTROL_SLOT_COUNT, "控制狀態")?;
            let int_slot = |slot: &StateValue, name: &str| -> Result<Option<i64>> {
                if slot.is_null() {
                    return Ok(None);
                }
                slot.as_int()
                    .map(Some)
                    .ok_or_else(|| StateError::corruption(format!("{} 應為整數", name)))
            };

            if let Some(index) = int_slot(&slots[0], "EditIndex")? {
                restored.edit_index = index;
            }
            if let Some(index) = int_slot(&slots[1], "PageIndex")? {
                restored.page_index = index;
            }
            if let Some(index) = int_slot(&slots[2], "SelectedIndex")? {
                restored.selected_index = index;
            }
            if !slots[3].is_null() {
                restored.sort_expression = slots[3].expect_str("SortExpression")?.to_string();
            }
            if let Some(code) = int_slot(&slots[4], "SortDirection")? {
                restored.sort_direction = SortDirection::from_code(code).ok_or_else(|| {
                    StateError::corruption(format!("未知的排序方向 {}", code))
                })?;
            }
            if !slots[5].is_null() {
                restored.data_key_names = slots[5]
                    .expect_seq("DataKeyNames")?
                    .iter()
                    .map(|name| name.expect_str("主鍵欄位名稱").map(str::to_string))
                    .collect::<Result<_>>()?;
            }
        }

        self.control_state = restored;
        Ok(())
    }

    fn slots(&self, full: bool) -> Option<StateValue> {
        if !self.enable_view_state {
            return None;
        }

        let save = |manager: &dyn StateManager| {
            if full {
                manager.save_full_state()
            } else {
                manager.save_state()
            }
        };

        let values = if full || self.bound_field_values_dirty {
            save_ordered(&self.bound_field_values)
        } else {
            None
        };

        let slots = [
            save(&self.view_state),
            save(&self.columns),
            save(&self.header_style),
            save(&self.row_style),
            save(&self.alternating_row_style),
            values,
        ];

        if slots.iter().all(Option::is_none) {
            return None;
        }

        Some(StateValue::Seq(
            slots.into_iter().map(StateValue::from_option).collect(),
        ))
    }
}

impl Default for GridViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl StateManager for GridViewState {
    fn is_tracking(&self) -> bool {
        self.view_state.is_tracking()
    }

    fn track_state(&mut self) {
        self.view_state.track_state();
        self.columns.track_state();
        self.header_style.track_state();
        self.row_style.track_state();
        self.alternating_row_style.track_state();
    }

    fn is_dirty(&self) -> bool {
        self.view_state.is_dirty()
            || self.columns.is_dirty()
            || self.header_style.is_dirty()
            || self.row_style.is_dirty()
            || self.alternating_row_style.is_dirty()
            || self.bound_field_values_dirty
    }

    fn set_dirty(&mut self) {
        self.view_state.set_dirty();
        self.columns.set_dirty();
        self.header_style.set_dirty();
        self.row_style.set_dirty();
        self.alternating_row_style.set_dirty();
        self.bound_field_values_dirty = true;
    }

    /// 停用檢視狀態時回傳 None
    fn save_state(&self) -> Option<StateValue> {
        self.slots(false)
    }

    fn save_full_state(&self) -> Option<StateValue> {
        self.slots(true)
    }

    /// 停用檢視狀態時忽略輸入
    fn load_state(&mut self, state: &StateValue) -> Result<()> {
        if state.is_null() || !self.enable_view_state {
            return Ok(());
        }

        let slots = state.expect_arity(SLOT_COUNT, "表格狀態")?;
        self.view_state.load_state(&slots[0])?;
        self.columns.load_state(&slots[1])?;
        self.header_style.load_state(&slots[2])?;
        self.row_style.load_state(&slots[3])?;
        self.alternating_row_style.load_state(&slots[4])?;
        if !slots[5].is_null() {
            load_ordered(&mut self.bound_field_values, &slots[5])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{BoundField, ButtonField};
    use crate::style::HorizontalAlign;
    use chrono::NaiveDate;
    use rstest::rstest;

    /// 宣告式設定（每次請求都會重建）
    fn declared() -> GridViewState {
        let mut grid = GridViewState::new();
        grid.set_allow_paging(true);
        grid.set_page_size(20).unwrap();
        grid.columns_mut().add(BoundField::new("OrderID").into()).unwrap();
        grid.columns_mut().add(BoundField::new("OrderDate").into()).unwrap();
        grid.header_style_mut().style_mut().set_font_bold(true);
        grid
    }

    #[test]
    fn test_defaults() {
        let grid = GridViewState::new();

        assert_eq!(grid.page_index(), 0);
        assert_eq!(grid.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(grid.selected_index(), -1);
        assert_eq!(grid.edit_index(), -1);
        assert_eq!(grid.sort_direction(), SortDirection::Ascending);
        assert!(!grid.allow_paging());
        assert!(grid.columns().is_empty());
        assert_eq!(grid.save_control_state(), None);
    }

    #[test]
    fn test_argument_ranges() {
        let mut grid = GridViewState::new();

        assert!(grid.set_page_index(-1).is_err());
        assert!(grid.set_page_size(0).is_err());
        assert!(grid.set_selected_index(-2).is_err());
        assert!(grid.set_edit_index(-2).is_err());
        assert!(grid.set_selected_index(-1).is_ok());
    }

    #[test]
    fn test_declared_state_not_saved() {
        let mut grid = declared();
        grid.track_state();

        assert!(!grid.is_dirty());
        assert_eq!(grid.save_state(), None);
    }

    #[test]
    fn test_postback_cycle() {
        let mut grid = declared();
        grid.track_state();

        grid.set_page_index(3).unwrap();
        grid.set_selected_index(2).unwrap();
        grid.row_style_mut()
            .set_horizontal_align(HorizontalAlign::Center);

        let mut values = IndexMap::new();
        values.insert("OrderID".to_string(), StateValue::Int(10250));
        values.insert(
            "OrderDate".to_string(),
            StateValue::Date(NaiveDate::from_ymd_opt(1996, 7, 8).unwrap()),
        );
        grid.set_bound_field_values(values.clone());

        let saved = grid.save_state().unwrap();
        let control = grid.save_control_state().unwrap();
        let slots = saved.as_seq().unwrap();
        assert_eq!(slots.len(), SLOT_COUNT);
        assert!(slots[0].is_null());
        assert!(slots[1].is_null());
        assert!(slots[2].is_null());
        assert!(slots[4].is_null());

        // 下一次請求：先重建宣告式設定，再還原
        let mut next = declared();
        next.load_control_state(&control).unwrap();
        next.load_state(&saved).unwrap();
        next.track_state();

        assert_eq!(next.page_index(), 3);
        assert_eq!(next.selected_index(), 2);
        assert_eq!(next.page_size(), 20);
        assert_eq!(next.row_style().horizontal_align(), HorizontalAlign::Center);
        assert!(next.header_style().style().font_bold());
        assert_eq!(next.columns().len(), 2);
        assert_eq!(next.bound_field_values(), &values);
        assert_eq!(next.save_state(), None);
    }

    #[test]
    fn test_control_state_survives_disabled_view_state() {
        let mut grid = declared().without_view_state();
        grid.track_state();
        grid.set_page_index(4).unwrap();
        grid.set_edit_index(1).unwrap();
        grid.set_sort_expression("OrderDate");
        grid.set_sort_direction(SortDirection::Descending);
        grid.set_data_key_names(vec!["OrderID".to_string()]);
        grid.set_allow_paging(false);

        assert_eq!(grid.save_state(), None);
        let control = grid.save_control_state().unwrap();

        let mut next = declared().without_view_state();
        next.load_control_state(&control).unwrap();

        assert_eq!(next.page_index(), 4);
        assert_eq!(next.edit_index(), 1);
        assert_eq!(next.selected_index(), -1);
        assert_eq!(next.sort_expression(), "OrderDate");
        assert_eq!(next.sort_direction(), SortDirection::Descending);
        assert_eq!(next.data_key_names(), ["OrderID".to_string()]);
        // 檢視狀態中的屬性維持宣告值
        assert!(next.allow_paging());
    }

    #[test]
    fn test_load_control_state_resets_to_defaults() {
        let mut grid = GridViewState::new();
        grid.set_page_index(2).unwrap();
        let control = grid.save_control_state().unwrap();

        // 宣告時設置的值不在控制狀態中時，還原後回到預設值
        let mut next = GridViewState::new();
        next.set_selected_index(5).unwrap();
        next.set_sort_expression("ShipCity");
        next.load_control_state(&control).unwrap();

        assert_eq!(next.page_index(), 2);
        assert_eq!(next.selected_index(), -1);
        assert_eq!(next.sort_expression(), "");

        next.load_control_state(&StateValue::Null).unwrap();
        assert_eq!(next.page_index(), 0);
    }

    #[rstest]
    #[case(StateValue::Seq(vec![StateValue::Null; 5]))]
    #[case(StateValue::Seq(vec![
        StateValue::from("x"),
        StateValue::Null,
        StateValue::Null,
        StateValue::Null,
        StateValue::Null,
        StateValue::Null,
    ]))]
    #[case(StateValue::Seq(vec![
        StateValue::Null,
        StateValue::Null,
        StateValue::Null,
        StateValue::Null,
        StateValue::Int(7),
        StateValue::Null,
    ]))]
    fn test_corrupted_control_state(#[case] state: StateValue) {
        let mut grid = GridViewState::new();
        grid.set_page_index(1).unwrap();

        let err = grid.load_control_state(&state).unwrap_err();
        assert!(matches!(err, StateError::StateCorruption(_)));
        assert_eq!(grid.page_index(), 1);
    }

    #[test]
    fn test_column_change_replaces_columns() {
        let mut grid = declared();
        grid.track_state();
        grid.columns_mut()
            .add(ButtonField::new("Select", "選取").into())
            .unwrap();

        let saved = grid.save_state().unwrap();
        let mut next = declared();
        next.load_state(&saved).unwrap();

        assert_eq!(next.columns().len(), 3);
        assert_eq!(
            next.columns().get(1).unwrap().data_field().as_deref(),
            Some("OrderDate")
        );
    }

    #[test]
    fn test_full_state_into_empty_grid() {
        let mut grid = declared();
        grid.set_sort_expression("OrderDate DESC");

        let full = grid.save_full_state().unwrap();
        let control = grid.save_control_state().unwrap();
        let mut empty = GridViewState::new();
        empty.load_state(&full).unwrap();
        empty.load_control_state(&control).unwrap();

        assert!(empty.allow_paging());
        assert_eq!(empty.sort_expression(), "OrderDate DESC");
        assert_eq!(empty.columns().len(), 2);
        assert!(empty.header_style().style().font_bold());
    }

    #[test]
    fn test_wrong_slot_count() {
        let mut grid = GridViewState::new();

        let err = grid
            .load_state(&StateValue::Seq(vec![StateValue::Null; 5]))
            .unwrap_err();
        assert!(matches!(err, StateError::StateCorruption(_)));
    }
}
