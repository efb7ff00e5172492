//! oss 模块 - 对象存储
//!
//! 腾讯云 COS 与云开发静态托管底层都是 COS 存储桶，统一通过 S3 兼容接口访问

mod cos_object_store;
mod error;
mod memory_object_store;
mod object_store;
mod object_store_types;

pub use cos_object_store::{CosObjectStore, CosObjectStoreConfig};
pub use error::ObjectStoreError;
pub use memory_object_store::MemoryObjectStore;
pub use object_store::ObjectStore;
pub use object_store_types::{
    GetObjectOptions, PartInfo, PutFileOptions, PutObjectOptions, PutStreamOptions,
};
