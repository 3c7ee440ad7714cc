//! 狀態持久化配置

use serde::{Deserialize, Serialize};

use crate::{Result, StateError};

/// 預設狀態大小上限（位元組）
pub const DEFAULT_MAX_STATE_BYTES: usize = 1024 * 1024;

/// 隱藏欄位狀態格式化配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// 是否附加完整性摘要（防止用戶端竄改）
    pub enable_mac: bool,

    /// 摘要金鑰
    pub mac_key: String,

    /// 編碼後狀態的最大長度
    pub max_state_bytes: usize,
}

impl StateConfig {
    /// 創建新的配置（預設不啟用摘要）
    pub fn new() -> Self {
        Self {
            enable_mac: false,
            mac_key: String::new(),
            max_state_bytes: DEFAULT_MAX_STATE_BYTES,
        }
    }

    /// 建構器模式：啟用摘要並設置金鑰
    pub fn with_mac_key(mut self, key: impl Into<String>) -> Self {
        self.enable_mac = true;
        self.mac_key = key.into();
        self
    }

    /// 建構器模式：停用摘要
    pub fn without_mac(mut self) -> Self {
        self.enable_mac = false;
        self
    }

    /// 建構器模式：設置大小上限
    pub fn with_max_state_bytes(mut self, limit: usize) -> Self {
        self.max_state_bytes = limit;
        self
    }

    /// 從 JSON 載入配置
    ///
    /// 缺少的欄位使用預設值
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: StateConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 檢查配置是否可用
    pub fn validate(&self) -> Result<()> {
        if self.enable_mac && self.mac_key.is_empty() {
            return Err(StateError::ArgumentNull("mac_key".to_string()));
        }
        if self.max_state_bytes == 0 {
            return Err(StateError::out_of_range("max_state_bytes", "必須大於 0"));
        }
        Ok(())
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self::new()
    }
}
