//! 資料欄位（表格欄定義）
//!
//! 已知類型：繫結欄（0）、核取方塊欄（1）、按鈕欄（2）。
//! 每個欄位的保存結果為固定兩格：`[屬性, 項目樣式]`。

use vs_core::{Result, StateError, StateValue};
use vs_state::{ManagedCollection, ManagedElement, PropertyStore, StateManager};

use crate::style::TableItemStyle;

const HEADER_TEXT: &str = "HeaderText";
const VISIBLE: &str = "Visible";
const SORT_EXPRESSION: &str = "SortExpression";
const DATA_FIELD: &str = "DataField";
const DATA_FORMAT_STRING: &str = "DataFormatString";
const NULL_DISPLAY_TEXT: &str = "NullDisplayText";
const READ_ONLY: &str = "ReadOnly";
const HTML_ENCODE: &str = "HtmlEncode";
const TEXT: &str = "Text";
const COMMAND_NAME: &str = "CommandName";
const BUTTON_TYPE: &str = "ButtonType";

/// 欄位共用部分：屬性儲存 + 項目樣式
#[derive(Debug, Clone, Default)]
struct FieldCore {
    store: PropertyStore,
    item_style: TableItemStyle,
}

impl FieldCore {
    fn text(&self, key: &str) -> String {
        self.store.get_or(key, String::new())
    }
}

impl StateManager for FieldCore {
    fn is_tracking(&self) -> bool {
        self.store.is_tracking()
    }

    fn track_state(&mut self) {
        self.store.track_state();
        self.item_style.track_state();
    }

    fn is_dirty(&self) -> bool {
        self.store.is_dirty() || self.item_style.is_dirty()
    }

    fn set_dirty(&mut self) {
        self.store.set_dirty();
        self.item_style.set_dirty();
    }

    fn save_state(&self) -> Option<StateValue> {
        slots(self.store.save_state(), self.item_style.save_state())
    }

    fn save_full_state(&self) -> Option<StateValue> {
        slots(self.store.save_full_state(), self.item_style.save_full_state())
    }

    fn load_state(&mut self, state: &StateValue) -> Result<()> {
        if state.is_null() {
            return Ok(());
        }
        let (own, style) = state.expect_pair("欄位狀態")?;
        self.store.load_state(own)?;
        self.item_style.load_state(style)
    }
}

fn slots(own: Option<StateValue>, style: Option<StateValue>) -> Option<StateValue> {
    if own.is_none() && style.is_none() {
        return None;
    }
    Some(StateValue::pair(
        StateValue::from_option(own),
        StateValue::from_option(style),
    ))
}

/// 繫結欄
#[derive(Debug, Clone, Default)]
pub struct BoundField {
    core: FieldCore,
}

impl BoundField {
    pub fn new(data_field: impl Into<String>) -> Self {
        let mut field = Self::default();
        field.core.store.set(DATA_FIELD, data_field.into());
        field
    }

    pub fn data_format_string(&self) -> String {
        self.core.text(DATA_FORMAT_STRING)
    }

    pub fn set_data_format_string(&mut self, format: impl Into<String>) {
        self.core.store.set(DATA_FORMAT_STRING, format.into());
    }

    pub fn null_display_text(&self) -> String {
        self.core.text(NULL_DISPLAY_TEXT)
    }

    pub fn set_null_display_text(&mut self, text: impl Into<String>) {
        self.core.store.set(NULL_DISPLAY_TEXT, text.into());
    }

    pub fn read_only(&self) -> bool {
        self.core.store.get_or(READ_ONLY, false)
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.core.store.set(READ_ONLY, read_only);
    }

    /// 是否對輸出做 HTML 編碼（預設為 true）
    pub fn html_encode(&self) -> bool {
        self.core.store.get_or(HTML_ENCODE, true)
    }

    pub fn set_html_encode(&mut self, encode: bool) {
        self.core.store.set(HTML_ENCODE, encode);
    }
}

/// 核取方塊欄
#[derive(Debug, Clone, Default)]
pub struct CheckBoxField {
    core: FieldCore,
}

impl CheckBoxField {
    pub fn new(data_field: impl Into<String>) -> Self {
        let mut field = Self::default();
        field.core.store.set(DATA_FIELD, data_field.into());
        field
    }

    pub fn text(&self) -> String {
        self.core.text(TEXT)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.core.store.set(TEXT, text.into());
    }

    pub fn read_only(&self) -> bool {
        self.core.store.get_or(READ_ONLY, false)
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.core.store.set(READ_ONLY, read_only);
    }
}

/// 按鈕外觀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonType {
    #[default]
    Link,
    Button,
    Image,
}

impl ButtonType {
    fn code(self) -> i64 {
        match self {
            ButtonType::Link => 0,
            ButtonType::Button => 1,
            ButtonType::Image => 2,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ButtonType::Link),
            1 => Some(ButtonType::Button),
            2 => Some(ButtonType::Image),
            _ => None,
        }
    }
}

/// 按鈕欄
#[derive(Debug, Clone, Default)]
pub struct ButtonField {
    core: FieldCore,
}

impl ButtonField {
    pub fn new(command_name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut field = Self::default();
        field.core.store.set(COMMAND_NAME, command_name.into());
        field.core.store.set(TEXT, text.into());
        field
    }

    pub fn command_name(&self) -> String {
        self.core.text(COMMAND_NAME)
    }

    pub fn text(&self) -> String {
        self.core.text(TEXT)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.core.store.set(TEXT, text.into());
    }

    pub fn button_type(&self) -> ButtonType {
        self.core
            .store
            .get_as::<i64>(BUTTON_TYPE)
            .and_then(ButtonType::from_code)
            .unwrap_or_default()
    }

    pub fn set_button_type(&mut self, button_type: ButtonType) {
        self.core.store.set(BUTTON_TYPE, button_type.code());
    }
}

/// 資料欄位（封閉的已知類型集合）
#[derive(Debug, Clone)]
pub enum DataControlField {
    Bound(BoundField),
    CheckBox(CheckBoxField),
    Button(ButtonField),
}

impl DataControlField {
    fn core(&self) -> &FieldCore {
        match self {
            DataControlField::Bound(f) => &f.core,
            DataControlField::CheckBox(f) => &f.core,
            DataControlField::Button(f) => &f.core,
        }
    }

    fn core_mut(&mut self) -> &mut FieldCore {
        match self {
            DataControlField::Bound(f) => &mut f.core,
            DataControlField::CheckBox(f) => &mut f.core,
            DataControlField::Button(f) => &mut f.core,
        }
    }

    /// 繫結的資料欄名稱；按鈕欄沒有
    pub fn data_field(&self) -> Option<String> {
        match self {
            DataControlField::Button(_) => None,
            _ => Some(self.core().text(DATA_FIELD)),
        }
    }

    pub fn header_text(&self) -> String {
        self.core().text(HEADER_TEXT)
    }

    pub fn set_header_text(&mut self, text: impl Into<String>) {
        self.core_mut().store.set(HEADER_TEXT, text.into());
    }

    /// 是否顯示（預設為 true）
    pub fn visible(&self) -> bool {
        self.core().store.get_or(VISIBLE, true)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.core_mut().store.set(VISIBLE, visible);
    }

    pub fn sort_expression(&self) -> String {
        self.core().text(SORT_EXPRESSION)
    }

    pub fn set_sort_expression(&mut self, expression: impl Into<String>) {
        self.core_mut().store.set(SORT_EXPRESSION, expression.into());
    }

    pub fn item_style(&self) -> &TableItemStyle {
        &self.core().item_style
    }

    pub fn item_style_mut(&mut self) -> &mut TableItemStyle {
        &mut self.core_mut().item_style
    }
}

impl From<BoundField> for DataControlField {
    fn from(value: BoundField) -> Self {
        DataControlField::Bound(value)
    }
}

impl From<CheckBoxField> for DataControlField {
    fn from(value: CheckBoxField) -> Self {
        DataControlField::CheckBox(value)
    }
}

impl From<ButtonField> for DataControlField {
    fn from(value: ButtonField) -> Self {
        DataControlField::Button(value)
    }
}

impl StateManager for DataControlField {
    fn is_tracking(&self) -> bool {
        self.core().is_tracking()
    }

    fn track_state(&mut self) {
        self.core_mut().track_state();
    }

    fn is_dirty(&self) -> bool {
        self.core().is_dirty()
    }

    fn set_dirty(&mut self) {
        self.core_mut().set_dirty();
    }

    fn save_state(&self) -> Option<StateValue> {
        self.core().save_state()
    }

    fn save_full_state(&self) -> Option<StateValue> {
        self.core().save_full_state()
    }

    fn load_state(&mut self, state: &StateValue) -> Result<()> {
        self.core_mut().load_state(state)
    }
}

impl ManagedElement for DataControlField {
    const KNOWN_TYPES: &'static [&'static str] = &["BoundField", "CheckBoxField", "ButtonField"];

    fn type_tag(&self) -> usize {
        match self {
            DataControlField::Bound(_) => 0,
            DataControlField::CheckBox(_) => 1,
            DataControlField::Button(_) => 2,
        }
    }

    fn create_known_type(tag: usize) -> Result<Self> {
        match tag {
            0 => Ok(DataControlField::Bound(BoundField::default())),
            1 => Ok(DataControlField::CheckBox(CheckBoxField::default())),
            2 => Ok(DataControlField::Button(ButtonField::default())),
            _ => Err(StateError::corruption(format!("未知的欄位類型 {}", tag))),
        }
    }

    fn validate(&self) -> Result<()> {
        if let DataControlField::Button(button) = self {
            if button.command_name().is_empty() {
                return Err(StateError::InvalidElement("按鈕欄缺少 CommandName".to_string()));
            }
        }
        Ok(())
    }
}

/// 欄位集合
pub type DataControlFieldCollection = ManagedCollection<DataControlField>;

/// 創建欄位集合：同一資料欄不可重複繫結
pub fn field_collection() -> DataControlFieldCollection {
    ManagedCollection::new().with_validator(unique_data_field)
}

fn unique_data_field(candidate: &DataControlField, others: &[&DataControlField]) -> Result<()> {
    let Some(data_field) = candidate.data_field().filter(|f| !f.is_empty()) else {
        return Ok(());
    };

    if others
        .iter()
        .any(|other| other.data_field().as_deref() == Some(data_field.as_str()))
    {
        return Err(StateError::InvalidElement(format!(
            "資料欄 {} 已經繫結",
            data_field
        )));
    }
    Ok(())
}
