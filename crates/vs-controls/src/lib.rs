//! # ViewState Controls
//!
//! 使用屬性儲存與可追蹤集合的控制項狀態：樣式、熱區、資料欄位、控制項樹與資料表格

pub mod control;
pub mod field;
pub mod grid;
pub mod hotspot;
pub mod style;

// Re-export 主要類型
pub use control::{Control, ViewStateMode};
pub use field::{
    field_collection, BoundField, ButtonField, ButtonType, CheckBoxField, DataControlField,
    DataControlFieldCollection,
};
pub use grid::{GridViewState, SortDirection};
pub use hotspot::{
    CircleHotSpot, HotSpot, HotSpotCollection, HotSpotMode, PolygonHotSpot, RectangleHotSpot,
};
pub use style::{HorizontalAlign, Style, TableItemStyle};
