use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use tokio::io::AsyncRead;

use crate::oss::{
    GetObjectOptions, ObjectStoreError, PutFileOptions, PutObjectOptions, PutStreamOptions,
};

/// 对象存储统一接口
#[async_trait]
pub trait ObjectStore: Send + Sync {
    // === 基础接口 ===

    /// 上传对象（带选项）
    async fn put_object(
        &self,
        key: &str,
        value: Bytes,
        options: PutObjectOptions,
    ) -> Result<(), ObjectStoreError>;

    /// 获取对象（带选项）
    ///
    /// 对象不存在时返回 `ObjectStoreError::NotFound`
    async fn get_object(&self, key: &str, options: GetObjectOptions)
        -> Result<Bytes, ObjectStoreError>;

    // === 流式接口 ===

    /// 流式上传
    ///
    /// `size` 为 None 表示大小未知
    async fn put_stream(
        &self,
        key: &str,
        reader: Box<dyn AsyncRead + Send + Unpin>,
        size: Option<u64>,
        options: PutStreamOptions,
    ) -> Result<(), ObjectStoreError>;

    // === 文件操作（默认实现） ===

    /// 上传本地文件
    async fn put_file(
        &self,
        key: &str,
        local_path: &Path,
        options: PutFileOptions,
    ) -> Result<(), ObjectStoreError> {
        let metadata = tokio::fs::metadata(local_path).await?;
        if !metadata.is_file() {
            return Err(ObjectStoreError::NotAFile {
                path: local_path.display().to_string(),
            });
        }

        let file = tokio::fs::File::open(local_path).await?;
        self.put_stream(key, Box::new(file), Some(metadata.len()), options.into())
            .await
    }
}
