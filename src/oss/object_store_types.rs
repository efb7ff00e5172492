use smart_default::SmartDefault;
use std::collections::HashMap;

/// 上传选项
#[derive(Debug, Clone, Default)]
pub struct PutObjectOptions {
    pub content_type: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

/// 获取选项
#[derive(Debug, Clone, Default)]
pub struct GetObjectOptions {
    pub range: Option<std::ops::Range<u64>>,
}

/// 分片信息
#[derive(Debug, Clone)]
pub struct PartInfo {
    pub part_number: u32,
    pub etag: String,
    pub size: u64,
}

/// 流式上传选项
#[derive(Debug, Clone, SmartDefault)]
pub struct PutStreamOptions {
    pub content_type: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
    /// 使用分片上传的阈值（默认 100MB）
    #[default = 104857600]
    pub multipart_threshold: u64,
    /// 分片大小（默认 8MB）
    #[default = 8388608]
    pub part_size: usize,
}

/// 文件上传选项
#[derive(Debug, Clone, SmartDefault)]
pub struct PutFileOptions {
    pub content_type: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
    /// 使用分片上传的阈值（默认 100MB）
    #[default = 104857600]
    pub multipart_threshold: u64,
    /// 分片大小（默认 8MB）
    #[default = 8388608]
    pub part_size: usize,
}

impl From<PutFileOptions> for PutStreamOptions {
    fn from(options: PutFileOptions) -> Self {
        Self {
            content_type: options.content_type,
            metadata: options.metadata,
            multipart_threshold: options.multipart_threshold,
            part_size: options.part_size,
        }
    }
}
