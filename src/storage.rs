//! 持久化键值存储
//!
//! 浏览器端对应 LocalStorage，测试中使用 [`MemoryStore`]。

use serde::{Serialize, de::DeserializeOwned};
use std::cell::RefCell;
use std::collections::HashMap;
use thiserror::Error;

// =========================================================
// 存储键
// =========================================================

pub const KEY_USER: &str = "gift-app-user";
pub const KEY_USER_ROLE: &str = "gift-app-user-role";
pub const KEY_LAST_LOGIN: &str = "gift-app-last-login";
pub const KEY_TOKEN: &str = "gift-app-token";
pub const KEY_REFRESH_TOKEN: &str = "gift-app-refresh-token";
pub const KEY_THEME: &str = "gift-app-theme";
pub const KEY_LANGUAGE: &str = "gift-app-language";

/// 注销时需要清除的全部认证键
pub const AUTH_KEYS: [&str; 5] = [
    KEY_TOKEN,
    KEY_REFRESH_TOKEN,
    KEY_USER,
    KEY_USER_ROLE,
    KEY_LAST_LOGIN,
];

#[derive(Debug, Error)]
pub enum StorageError {
    /// 存储不可用 (隐私模式、配额耗尽等)
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt value under `{key}`: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str);
}

/// JSON 读写辅助
pub trait KeyValueStoreExt: KeyValueStore {
    /// 键不存在返回 `Ok(None)`，内容无法解析返回 `Err`
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

// =========================================================
// 内存实现
// =========================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftdesk_shared::SessionUser;

    #[test]
    fn json_round_trip_and_corruption() {
        let store = MemoryStore::new();
        store
            .set_json(KEY_USER, &SessionUser::new("a@b.com", "Ahmed"))
            .unwrap();
        let user: Option<SessionUser> = store.get_json(KEY_USER).unwrap();
        assert_eq!(user.unwrap().full_name, "Ahmed");

        store.set(KEY_USER, "{not json").unwrap();
        let err = store.get_json::<SessionUser>(KEY_USER).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));

        assert!(store.get_json::<SessionUser>(KEY_LAST_LOGIN).unwrap().is_none());
    }
}
