//! 狀態格式化器
//!
//! 把保存結果轉成可放進隱藏欄位的字串，並在回傳時還原。
//! 格式：`<十六進位 JSON>`，啟用摘要時為 `<十六進位 JSON>.<HMAC-SHA256 十六進位>`。

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{info, warn};
use vs_core::{Result, StateConfig, StateError, StateValue};

type HmacSha256 = Hmac<Sha256>;

/// 摘要分隔符
const DIGEST_SEPARATOR: char = '.';

/// 狀態格式化器
#[derive(Debug, Clone)]
pub struct StateFormatter {
    config: StateConfig,
}

impl StateFormatter {
    /// 以配置創建格式化器
    pub fn new(config: StateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    /// 編碼保存結果；None 編碼為空字串
    pub fn serialize(&self, state: Option<&StateValue>) -> Result<String> {
        let Some(state) = state else {
            return Ok(String::new());
        };

        let json = serde_json::to_vec(state)?;
        let payload = hex::encode(&json);

        let token = if self.config.enable_mac {
            let mut mac = self.mac()?;
            mac.update(payload.as_bytes());
            let digest = hex::encode(mac.finalize().into_bytes());
            format!("{}{}{}", payload, DIGEST_SEPARATOR, digest)
        } else {
            payload
        };

        self.check_size(token.len())?;
        info!("狀態編碼完成: {} 位元組", token.len());
        Ok(token)
    }

    /// 解碼隱藏欄位內容；空字串回傳 None
    pub fn deserialize(&self, token: &str) -> Result<Option<StateValue>> {
        if token.is_empty() {
            return Ok(None);
        }
        self.check_size(token.len())?;

        let payload = if self.config.enable_mac {
            let (payload, digest) = token.rsplit_once(DIGEST_SEPARATOR).ok_or_else(|| {
                warn!("狀態缺少完整性摘要");
                StateError::corruption("缺少完整性摘要")
            })?;

            let digest = hex::decode(digest)
                .map_err(|e| StateError::corruption(format!("摘要解碼失敗: {}", e)))?;

            let mut mac = self.mac()?;
            mac.update(payload.as_bytes());
            mac.verify_slice(&digest).map_err(|_| {
                warn!("狀態完整性摘要不符，可能已被竄改");
                StateError::corruption("完整性摘要不符")
            })?;
            payload
        } else {
            token
        };

        let json = hex::decode(payload)
            .map_err(|e| StateError::corruption(format!("十六進位解碼失敗: {}", e)))?;
        let state: StateValue = serde_json::from_slice(&json)
            .map_err(|e| StateError::corruption(format!("狀態結構無法解析: {}", e)))?;

        info!("狀態解碼完成: {} 位元組", token.len());
        Ok(state.into_option())
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size > self.config.max_state_bytes {
            return Err(StateError::StateTooLarge {
                size,
                limit: self.config.max_state_bytes,
            });
        }
        Ok(())
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(self.config.mac_key.as_bytes())
            .map_err(|_| StateError::ArgumentNull("mac_key".to_string()))
    }
}
