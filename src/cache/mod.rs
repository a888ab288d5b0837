//! 对象缓存
//!
//! 目前只有进程内的 moka 实现。值以 JSON 字符串存放，键约定见 [`user_key`]。

mod moka;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

pub use self::moka::MokaObjectCache;

use crate::errors::Result;

#[derive(Debug, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    async fn insert_raw(&self, key: String, value: String);
    async fn remove(&self, key: &str);
}

/// 会话用户缓存键
pub fn user_key(user_id: i64) -> String {
    format!("user:{user_id}")
}

/// 读取并反序列化，损坏的条目会被删除
pub async fn get_json<T: DeserializeOwned>(cache: &dyn ObjectCache, key: &str) -> Option<T> {
    match cache.get_raw(key).await {
        CacheResult::Found(json) => match serde_json::from_str::<T>(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Dropping undecodable cache entry {}: {}", key, e);
                cache.remove(key).await;
                None
            }
        },
        CacheResult::NotFound => None,
    }
}

pub async fn insert_json<T: Serialize>(cache: &dyn ObjectCache, key: String, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => cache.insert_raw(key, json).await,
        Err(e) => tracing::warn!("Failed to serialize cache entry {}: {}", key, e),
    }
}

pub fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    Ok(Arc::new(MokaObjectCache::from_config()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_json_helpers_round_trip_and_drop_garbage() {
        let cache = MokaObjectCache::new(100, 60);

        insert_json(&cache, user_key(3), &vec![1, 2, 3]).await;
        assert_eq!(get_json::<Vec<i32>>(&cache, "user:3").await, Some(vec![1, 2, 3]));

        cache.insert_raw("user:4".into(), "{not json".into()).await;
        assert_eq!(get_json::<Vec<i32>>(&cache, "user:4").await, None);
        assert_eq!(cache.get_raw("user:4").await, CacheResult::NotFound);
    }
}
