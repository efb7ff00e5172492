use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::RwLock;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::oss::{
    GetObjectOptions, ObjectStore, ObjectStoreError, PutObjectOptions, PutStreamOptions,
};

/// 内存 ObjectStore，用于本地预览和测试
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前所有对象键（有序）
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .read()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// 同步读取对象内容
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.objects
            .read()
            .ok()
            .and_then(|objects| objects.get(key).cloned())
    }

    fn insert(&self, key: &str, value: Bytes) -> Result<(), ObjectStoreError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|e| ObjectStoreError::InvalidInput(e.to_string()))?;
        objects.insert(key.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        key: &str,
        value: Bytes,
        _options: PutObjectOptions,
    ) -> Result<(), ObjectStoreError> {
        self.insert(key, value)
    }

    async fn get_object(
        &self,
        key: &str,
        options: GetObjectOptions,
    ) -> Result<Bytes, ObjectStoreError> {
        let value = self.get(key).ok_or_else(|| ObjectStoreError::NotFound {
            key: key.to_string(),
        })?;

        match options.range {
            Some(range) => {
                let end = (range.end as usize).min(value.len());
                let start = (range.start as usize).min(end);
                Ok(value.slice(start..end))
            }
            None => Ok(value),
        }
    }

    async fn put_stream(
        &self,
        key: &str,
        mut reader: Box<dyn AsyncRead + Send + Unpin>,
        size: Option<u64>,
        _options: PutStreamOptions,
    ) -> Result<(), ObjectStoreError> {
        let mut buffer = Vec::with_capacity(size.unwrap_or(0) as usize);
        reader.read_to_end(&mut buffer).await?;
        self.insert(key, Bytes::from(buffer))
    }
}
