use crate::SessionStore;
use app_error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Process-local session store; expiry is not modelled.
#[derive(Default)]
pub struct MemorySessions {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessions {
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessions {
    async fn set(&self, key: &str, value: &str, _ttl_seconds: u64) -> Result<(), AppError> {
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn del(&self, keys: &[&str]) -> Result<(), AppError> {
        let mut entries = self.entries.lock().await;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn set_get_del() {
        let store = MemorySessions::default();
        store.set("a@b:1", "token", 60).await.unwrap();
        assert_eq!(store.get("a@b:1").await.unwrap().as_deref(), Some("token"));
        store.del(&["a@b:1", "missing"]).await.unwrap();
        assert_eq!(store.get("a@b:1").await.unwrap(), None);
        assert_eq!(store.len().await, 0);
    }
}
