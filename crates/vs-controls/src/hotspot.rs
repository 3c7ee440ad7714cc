//! 影像地圖熱區
//!
//! 三種已知類型：圓形（0）、矩形（1）、多邊形（2）。標籤只可附加。

use vs_core::{Result, StateError, StateValue};
use vs_state::{ManagedCollection, ManagedElement, PropertyStore, StateManager};

const NAVIGATE_URL: &str = "NavigateUrl";
const ALTERNATE_TEXT: &str = "AlternateText";
const HOT_SPOT_MODE: &str = "HotSpotMode";
const POST_BACK_VALUE: &str = "PostBackValue";
const TARGET: &str = "Target";
const X: &str = "X";
const Y: &str = "Y";
const RADIUS: &str = "Radius";
const LEFT: &str = "Left";
const TOP: &str = "Top";
const RIGHT: &str = "Right";
const BOTTOM: &str = "Bottom";
const COORDINATES: &str = "Coordinates";

/// 熱區點擊行為
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HotSpotMode {
    /// 沿用影像地圖設定
    #[default]
    NotSet,
    /// 導向網址
    Navigate,
    /// 回傳伺服器
    PostBack,
    /// 無作用
    Inactive,
}

impl HotSpotMode {
    fn code(self) -> i64 {
        match self {
            HotSpotMode::NotSet => 0,
            HotSpotMode::Navigate => 1,
            HotSpotMode::PostBack => 2,
            HotSpotMode::Inactive => 3,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(HotSpotMode::NotSet),
            1 => Some(HotSpotMode::Navigate),
            2 => Some(HotSpotMode::PostBack),
            3 => Some(HotSpotMode::Inactive),
            _ => None,
        }
    }
}

/// 圓形熱區
#[derive(Debug, Clone, Default)]
pub struct CircleHotSpot {
    store: PropertyStore,
}

impl CircleHotSpot {
    /// 創建圓形熱區；半徑不可為負
    pub fn new(x: i64, y: i64, radius: i64) -> Result<Self> {
        let mut circle = Self::default();
        circle.set_x(x);
        circle.set_y(y);
        circle.set_radius(radius)?;
        Ok(circle)
    }

    pub fn x(&self) -> i64 {
        self.store.get_or(X, 0)
    }

    pub fn set_x(&mut self, x: i64) {
        self.store.set(X, x);
    }

    pub fn y(&self) -> i64 {
        self.store.get_or(Y, 0)
    }

    pub fn set_y(&mut self, y: i64) {
        self.store.set(Y, y);
    }

    pub fn radius(&self) -> i64 {
        self.store.get_or(RADIUS, 0)
    }

    pub fn set_radius(&mut self, radius: i64) -> Result<()> {
        if radius < 0 {
            return Err(StateError::out_of_range("Radius", format!("{} 不可為負值", radius)));
        }
        self.store.set(RADIUS, radius);
        Ok(())
    }
}

/// 矩形熱區
#[derive(Debug, Clone, Default)]
pub struct RectangleHotSpot {
    store: PropertyStore,
}

impl RectangleHotSpot {
    /// 創建矩形熱區；右下角不可在左上角之前
    pub fn new(left: i64, top: i64, right: i64, bottom: i64) -> Result<Self> {
        if right < left || bottom < top {
            return Err(StateError::out_of_range(
                "Rectangle",
                format!("({},{})-({},{}) 不是有效矩形", left, top, right, bottom),
            ));
        }
        let mut rect = Self::default();
        rect.store.set(LEFT, left);
        rect.store.set(TOP, top);
        rect.store.set(RIGHT, right);
        rect.store.set(BOTTOM, bottom);
        Ok(rect)
    }

    pub fn left(&self) -> i64 {
        self.store.get_or(LEFT, 0)
    }

    pub fn top(&self) -> i64 {
        self.store.get_or(TOP, 0)
    }

    pub fn right(&self) -> i64 {
        self.store.get_or(RIGHT, 0)
    }

    pub fn bottom(&self) -> i64 {
        self.store.get_or(BOTTOM, 0)
    }
}

/// 多邊形熱區
#[derive(Debug, Clone, Default)]
pub struct PolygonHotSpot {
    store: PropertyStore,
}

impl PolygonHotSpot {
    /// 以 `x1,y1,x2,y2,...` 格式創建；合法性在加入集合時檢查
    pub fn new(coordinates: impl Into<String>) -> Self {
        let mut polygon = Self::default();
        polygon.set_coordinates(coordinates);
        polygon
    }

    pub fn coordinates(&self) -> String {
        self.store.get_or(COORDINATES, String::new())
    }

    pub fn set_coordinates(&mut self, coordinates: impl Into<String>) {
        self.store.set(COORDINATES, coordinates.into());
    }

    /// 解析座標點
    pub fn points(&self) -> Result<Vec<(i64, i64)>> {
        let coordinates = self.coordinates();
        let numbers = coordinates
            .split(',')
            .map(|part| part.trim().parse::<i64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| {
                StateError::InvalidElement(format!("多邊形座標格式錯誤: {}", coordinates))
            })?;

        if numbers.len() % 2 != 0 || numbers.len() < 6 {
            return Err(StateError::InvalidElement(format!(
                "多邊形至少需要三個點且座標成對: {}",
                coordinates
            )));
        }

        Ok(numbers.chunks(2).map(|p| (p[0], p[1])).collect())
    }
}

/// 熱區（封閉的已知類型集合）
#[derive(Debug, Clone)]
pub enum HotSpot {
    Circle(CircleHotSpot),
    Rectangle(RectangleHotSpot),
    Polygon(PolygonHotSpot),
}

impl HotSpot {
    fn store(&self) -> &PropertyStore {
        match self {
            HotSpot::Circle(h) => &h.store,
            HotSpot::Rectangle(h) => &h.store,
            HotSpot::Polygon(h) => &h.store,
        }
    }

    fn store_mut(&mut self) -> &mut PropertyStore {
        match self {
            HotSpot::Circle(h) => &mut h.store,
            HotSpot::Rectangle(h) => &mut h.store,
            HotSpot::Polygon(h) => &mut h.store,
        }
    }

    /// 影像地圖標記中的形狀名稱
    pub fn markup_name(&self) -> &'static str {
        match self {
            HotSpot::Circle(_) => "circle",
            HotSpot::Rectangle(_) => "rect",
            HotSpot::Polygon(_) => "poly",
        }
    }

    /// 影像地圖標記中的座標字串
    pub fn coordinates(&self) -> String {
        match self {
            HotSpot::Circle(c) => format!("{},{},{}", c.x(), c.y(), c.radius()),
            HotSpot::Rectangle(r) => {
                format!("{},{},{},{}", r.left(), r.top(), r.right(), r.bottom())
            }
            HotSpot::Polygon(p) => p.coordinates(),
        }
    }

    pub fn navigate_url(&self) -> String {
        self.store().get_or(NAVIGATE_URL, String::new())
    }

    pub fn set_navigate_url(&mut self, url: impl Into<String>) {
        self.store_mut().set(NAVIGATE_URL, url.into());
    }

    pub fn alternate_text(&self) -> String {
        self.store().get_or(ALTERNATE_TEXT, String::new())
    }

    pub fn set_alternate_text(&mut self, text: impl Into<String>) {
        self.store_mut().set(ALTERNATE_TEXT, text.into());
    }

    pub fn hot_spot_mode(&self) -> HotSpotMode {
        self.store()
            .get_as::<i64>(HOT_SPOT_MODE)
            .and_then(HotSpotMode::from_code)
            .unwrap_or_default()
    }

    pub fn set_hot_spot_mode(&mut self, mode: HotSpotMode) {
        self.store_mut().set(HOT_SPOT_MODE, mode.code());
    }

    pub fn post_back_value(&self) -> String {
        self.store().get_or(POST_BACK_VALUE, String::new())
    }

    pub fn set_post_back_value(&mut self, value: impl Into<String>) {
        self.store_mut().set(POST_BACK_VALUE, value.into());
    }

    pub fn target(&self) -> String {
        self.store().get_or(TARGET, String::new())
    }

    pub fn set_target(&mut self, target: impl Into<String>) {
        self.store_mut().set(TARGET, target.into());
    }
}

impl From<CircleHotSpot> for HotSpot {
    fn from(value: CircleHotSpot) -> Self {
        HotSpot::Circle(value)
    }
}

impl From<RectangleHotSpot> for HotSpot {
    fn from(value: RectangleHotSpot) -> Self {
        HotSpot::Rectangle(value)
    }
}

impl From<PolygonHotSpot> for HotSpot {
    fn from(value: PolygonHotSpot) -> Self {
        HotSpot::Polygon(value)
    }
}

impl StateManager for HotSpot {
    fn is_tracking(&self) -> bool {
        self.store().is_tracking()
    }

    fn track_state(&mut self) {
        self.store_mut().track_state();
    }

    fn is_dirty(&self) -> bool {
        self.store().is_dirty()
    }

    fn set_dirty(&mut self) {
        self.store_mut().set_dirty();
    }

    fn save_state(&self) -> Option<StateValue> {
        self.store().save_state()
    }

    fn save_full_state(&self) -> Option<StateValue> {
        self.store().save_full_state()
    }

    fn load_state(&mut self, state: &StateValue) -> Result<()> {
        self.store_mut().load_state(state)
    }
}

impl ManagedElement for HotSpot {
    const KNOWN_TYPES: &'static [&'static str] =
        &["CircleHotSpot", "RectangleHotSpot", "PolygonHotSpot"];

    fn type_tag(&self) -> usize {
        match self {
            HotSpot::Circle(_) => 0,
            HotSpot::Rectangle(_) => 1,
            HotSpot::Polygon(_) => 2,
        }
    }

    fn create_known_type(tag: usize) -> Result<Self> {
        match tag {
            0 => Ok(HotSpot::Circle(CircleHotSpot::default())),
            1 => Ok(HotSpot::Rectangle(RectangleHotSpot::default())),
            2 => Ok(HotSpot::Polygon(PolygonHotSpot::default())),
            _ => Err(StateError::corruption(format!("未知的熱區類型 {}", tag))),
        }
    }

    fn validate(&self) -> Result<()> {
        if let HotSpot::Polygon(polygon) = self {
            polygon.points()?;
        }
        Ok(())
    }
}

/// 熱區集合
pub type HotSpotCollection = ManagedCollection<HotSpot>;
