//! 樣式模型
//!
//! 樣式屬性全部存放在一個屬性儲存中；表格項目樣式以組合方式擴充基本樣式。

use vs_core::{Result, StateError, StateValue, Unit};
use vs_state::{PropertyStore, StateManager};

const FORE_COLOR: &str = "ForeColor";
const BACK_COLOR: &str = "BackColor";
const BORDER_COLOR: &str = "BorderColor";
const CSS_CLASS: &str = "CssClass";
const BORDER_WIDTH: &str = "BorderWidth";
const WIDTH: &str = "Width";
const HEIGHT: &str = "Height";
const FONT_BOLD: &str = "Font_Bold";
const FONT_SIZE: &str = "Font_Size";
const HORIZONTAL_ALIGN: &str = "HorizontalAlign";
const WRAP: &str = "Wrap";

/// 基本樣式
#[derive(Debug, Clone, Default)]
pub struct Style {
    store: PropertyStore,
}

impl Style {
    /// 創建空樣式
    pub fn new() -> Self {
        Self {
            store: PropertyStore::new(),
        }
    }

    pub fn fore_color(&self) -> Option<String> {
        self.store.get_as(FORE_COLOR)
    }

    pub fn set_fore_color(&mut self, color: impl Into<String>) {
        self.store.set(FORE_COLOR, color.into());
    }

    pub fn back_color(&self) -> Option<String> {
        self.store.get_as(BACK_COLOR)
    }

    pub fn set_back_color(&mut self, color: impl Into<String>) {
        self.store.set(BACK_COLOR, color.into());
    }

    pub fn border_color(&self) -> Option<String> {
        self.store.get_as(BORDER_COLOR)
    }

    pub fn set_border_color(&mut self, color: impl Into<String>) {
        self.store.set(BORDER_COLOR, color.into());
    }

    /// CSS 類別（未設置時為空字串）
    pub fn css_class(&self) -> String {
        self.store.get_or(CSS_CLASS, String::new())
    }

    pub fn set_css_class(&mut self, class: impl Into<String>) {
        self.store.set(CSS_CLASS, class.into());
    }

    pub fn border_width(&self) -> Option<Unit> {
        self.store.get_as(BORDER_WIDTH)
    }

    /// 設置框線寬度；不可為負
    pub fn set_border_width(&mut self, width: Unit) -> Result<()> {
        self.set_non_negative_unit("BorderWidth", BORDER_WIDTH, width)
    }

    pub fn width(&self) -> Option<Unit> {
        self.store.get_as(WIDTH)
    }

    /// 設置寬度；不可為負
    pub fn set_width(&mut self, width: Unit) -> Result<()> {
        self.set_non_negative_unit("Width", WIDTH, width)
    }

    pub fn height(&self) -> Option<Unit> {
        self.store.get_as(HEIGHT)
    }

    /// 設置高度；不可為負
    pub fn set_height(&mut self, height: Unit) -> Result<()> {
        self.set_non_negative_unit("Height", HEIGHT, height)
    }

    pub fn font_bold(&self) -> bool {
        self.store.get_or(FONT_BOLD, false)
    }

    pub fn set_font_bold(&mut self, bold: bool) {
        self.store.set(FONT_BOLD, bold);
    }

    pub fn font_size(&self) -> Option<Unit> {
        self.store.get_as(FONT_SIZE)
    }

    pub fn set_font_size(&mut self, size: Unit) -> Result<()> {
        self.set_non_negative_unit("Font.Size", FONT_SIZE, size)
    }

    /// 是否沒有任何已設置的屬性
    pub fn is_empty(&self) -> bool {
        !self.store.has_values()
    }

    /// 以來源樣式覆寫本樣式中來源已設置的屬性
    pub fn copy_from(&mut self, other: &Style) {
        for (key, value) in other.store.iter() {
            if !value.is_null() {
                self.store.set(key, value.clone());
            }
        }
    }

    /// 只補上本樣式尚未設置的屬性
    pub fn merge_with(&mut self, other: &Style) {
        for (key, value) in other.store.iter() {
            if !value.is_null() && !self.store.is_set(key) {
                self.store.set(key, value.clone());
            }
        }
    }

    /// 重設所有屬性
    ///
    /// 追蹤階段內會留下髒的 Null，讓重設能被保存。
    pub fn reset(&mut self) {
        let keys: Vec<String> = self.store.keys().map(str::to_string).collect();
        for key in keys {
            self.store.set(key, StateValue::Null);
        }
    }

    /// 底層屬性儲存
    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }

    fn set_non_negative_unit(&mut self, name: &str, key: &str, unit: Unit) -> Result<()> {
        if unit.is_negative() {
            return Err(StateError::out_of_range(name, format!("{} 不可為負值", unit)));
        }
        self.store.set(key, unit);
        Ok(())
    }
}

impl StateManager for Style {
    fn is_tracking(&self) -> bool {
        self.store.is_tracking()
    }

    fn track_state(&mut self) {
        self.store.track_state();
    }

    fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    fn set_dirty(&mut self) {
        self.store.set_dirty();
    }

    fn save_state(&self) -> Option<StateValue> {
        self.store.save_state()
    }

    fn save_full_state(&self) -> Option<StateValue> {
        self.store.save_full_state()
    }

    fn load_state(&mut self, state: &StateValue) -> Result<()> {
        self.store.load_state(state)
    }
}

/// 水平對齊
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlign {
    #[default]
    NotSet,
    Left,
    Center,
    Right,
    Justify,
}

impl HorizontalAlign {
    fn code(self) -> i64 {
        match self {
            HorizontalAlign::NotSet => 0,
            HorizontalAlign::Left => 1,
            HorizontalAlign::Center => 2,
            HorizontalAlign::Right => 3,
            HorizontalAlign::Justify => 4,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(HorizontalAlign::NotSet),
            1 => Some(HorizontalAlign::Left),
            2 => Some(HorizontalAlign::Center),
            3 => Some(HorizontalAlign::Right),
            4 => Some(HorizontalAlign::Justify),
            _ => None,
        }
    }
}

/// 表格項目樣式（基本樣式 + 對齊與換行）
#[derive(Debug, Clone, Default)]
pub struct TableItemStyle {
    style: Style,
}

impl TableItemStyle {
    pub fn new() -> Self {
        Self {
            style: Style::new(),
        }
    }

    /// 基本樣式屬性
    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    pub fn horizontal_align(&self) -> HorizontalAlign {
        self.style
            .store
            .get_as::<i64>(HORIZONTAL_ALIGN)
            .and_then(HorizontalAlign::from_code)
            .unwrap_or_default()
    }

    pub fn set_horizontal_align(&mut self, align: HorizontalAlign) {
        self.style.store.set(HORIZONTAL_ALIGN, align.code());
    }

    /// 是否換行（預設為 true）
    pub fn wrap(&self) -> bool {
        self.style.store.get_or(WRAP, true)
    }

    pub fn set_wrap(&mut self, wrap: bool) {
        self.style.store.set(WRAP, wrap);
    }

    pub fn is_empty(&self) -> bool {
        self.style.is_empty()
    }

    pub fn copy_from(&mut self, other: &TableItemStyle) {
        self.style.copy_from(&other.style);
    }

    pub fn merge_with(&mut self, other: &TableItemStyle) {
        self.style.merge_with(&other.style);
    }

    pub fn reset(&mut self) {
        self.style.reset();
    }
}

impl StateManager for TableItemStyle {
    fn is_tracking(&self) -> bool {
        self.style.is_tracking()
    }

    fn track_state(&mut self) {
        self.style.track_state();
    }

    fn is_dirty(&self) -> bool {
        self.style.is_dirty()
    }

    fn set_dirty(&mut self) {
        self.style.set_dirty();
    }

    fn save_state(&self) -> Option<StateValue> {
        self.style.save_state()
    }

    fn save_full_state(&self) -> Option<StateValue> {
        self.style.save_full_state()
    }

    fn load_state(&mut self, state: &StateValue) -> Result<()> {
        self.style.load_state(state)
    }
}
