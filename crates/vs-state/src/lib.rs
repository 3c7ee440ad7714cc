//! # ViewState Tracking
//!
//! 屬性儲存、髒標記追蹤與可追蹤集合

pub mod collection;
pub mod dirty_tracking;
pub mod manager;
pub mod ordered;
pub mod store;

// Re-export 主要類型
pub use collection::{ManagedCollection, ManagedElement};
pub use dirty_tracking::DirtyTracker;
pub use manager::StateManager;
pub use store::PropertyStore;
