use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{
    BehaviorVersion, Region, RequestChecksumCalculation, ResponseChecksumValidation,
};
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::{error::SdkError, primitives::ByteStream, Client};
use bytes::Bytes;
use garde::Validate;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::oss::{
    GetObjectOptions, ObjectStore, ObjectStoreError, PartInfo, PutObjectOptions,
    PutStreamOptions,
};

const PROVIDER: &str = "COS";

/// 腾讯云 COS ObjectStore 配置
///
/// COS 提供 S3 兼容接口，这里通过 aws-sdk-s3 访问，
/// 默认端点为 `https://cos.{region}.myqcloud.com`，使用 virtual-hosted 风格访问存储桶。
#[derive(Deserialize, Serialize, SmartDefault, Clone, Validate)]
#[serde(default)]
pub struct CosObjectStoreConfig {
    /// 存储桶名称（形如 `name-1250000000`）
    #[garde(length(min = 1))]
    #[default = ""]
    pub bucket: String,

    /// 地域，如 `ap-guangzhou`
    #[garde(length(min = 1))]
    #[default = "ap-guangzhou"]
    pub region: String,

    /// 自定义端点（私有化部署或测试时使用）
    #[garde(skip)]
    pub endpoint: Option<String>,

    /// 是否使用 path-style URL，设置了 endpoint 时默认为 true
    #[garde(skip)]
    pub force_path_style: Option<bool>,

    /// SecretId
    #[garde(length(min = 1))]
    #[default = ""]
    pub secret_id: String,

    /// SecretKey
    #[garde(length(min = 1))]
    #[default = ""]
    pub secret_key: String,
}

impl CosObjectStoreConfig {
    /// 实际使用的端点
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cos.{}.myqcloud.com", self.region))
    }
}

/// COS ObjectStore 实现
pub struct CosObjectStore {
    client: Arc<Client>,
    config: CosObjectStoreConfig,
}

impl CosObjectStore {
    /// 唯一的构造方法
    pub fn new(config: CosObjectStoreConfig) -> Result<Self, ObjectStoreError> {
        if let Err(errors) = config.validate() {
            return Err(ObjectStoreError::Configuration(format!("{}", errors)));
        }

        let credentials = Credentials::new(
            &config.secret_id,
            &config.secret_key,
            None,
            None,
            "static-deploy",
        );

        // 自定义 endpoint 的兼容存储通常只支持 path-style
        let use_path_style = config
            .force_path_style
            .unwrap_or(config.endpoint.is_some());

        // COS 不识别 SDK 默认附加的 CRC 校验头，仅在必须时计算
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(config.endpoint_url())
            .force_path_style(use_path_style)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();

        Ok(Self {
            client: Arc::new(Client::from_conf(s3_config)),
            config,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// 流式分片上传的内部实现
    async fn put_stream_multipart(
        &self,
        key: &str,
        upload_id: &str,
        reader: &mut Box<dyn AsyncRead + Send + Unpin>,
        options: &PutStreamOptions,
    ) -> Result<(), ObjectStoreError> {
        let part_size = options.part_size;
        let mut parts: Vec<PartInfo> = Vec::new();
        let mut part_number: u32 = 1;

        loop {
            let mut buffer = vec![0u8; part_size];
            let mut buffer_len = 0;

            while buffer_len < part_size {
                let n = reader.read(&mut buffer[buffer_len..]).await?;
                if n == 0 {
                    break;
                }
                buffer_len += n;
            }

            if buffer_len == 0 {
                break;
            }

            buffer.truncate(buffer_len);

            let part_info = self
                .upload_part(key, upload_id, part_number, Bytes::from(buffer))
                .await?;

            parts.push(part_info);
            part_number += 1;
        }

        if parts.is_empty() {
            // 空文件：取消分片上传，改用普通上传
            self.abort_multipart_upload(key, upload_id).await?;
            self.put_object(key, Bytes::new(), PutObjectOptions::default())
                .await?;
        } else {
            self.complete_multipart_upload(key, upload_id, parts).await?;
        }

        Ok(())
    }

    async fn create_multipart_upload(
        &self,
        key: &str,
        options: PutObjectOptions,
    ) -> Result<String, ObjectStoreError> {
        let mut request = self
            .client
            .create_multipart_upload()
            .bucket(&self.config.bucket)
            .key(key);

        if let Some(ct) = &options.content_type {
            request = request.content_type(ct);
        }

        if let Some(metadata) = &options.metadata {
            for (k, v) in metadata {
                request = request.metadata(k, v);
            }
        }

        let output = request
            .send()
            .await
            .map_err(|e| ObjectStoreError::from_provider(e, PROVIDER, "create_multipart_upload"))?;

        output.upload_id.ok_or_else(|| ObjectStoreError::MultipartUpload {
            message: "No upload_id returned".to_string(),
        })
    }

    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        data: Bytes,
    ) -> Result<PartInfo, ObjectStoreError> {
        let size = data.len() as u64;

        let output = self
            .client
            .upload_part()
            .bucket(&self.config.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number as i32)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| ObjectStoreError::from_provider(e, PROVIDER, "upload_part"))?;

        let etag = output.e_tag.ok_or_else(|| ObjectStoreError::MultipartUpload {
            message: "No ETag returned for part".to_string(),
        })?;

        Ok(PartInfo {
            part_number,
            etag,
            size,
        })
    }

    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: Vec<PartInfo>,
    ) -> Result<(), ObjectStoreError> {
        let completed_parts: Vec<CompletedPart> = parts
            .into_iter()
            .map(|p| {
                CompletedPart::builder()
                    .part_number(p.part_number as i32)
                    .e_tag(p.etag)
                    .build()
            })
            .collect();

        let completed_upload = CompletedMultipartUpload::builder()
            .set_parts(Some(completed_parts))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(&self.config.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(completed_upload)
            .send()
            .await
            .map_err(|e| {
                ObjectStoreError::from_provider(e, PROVIDER, "complete_multipart_upload")
            })?;

        Ok(())
    }

    async fn abort_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
    ) -> Result<(), ObjectStoreError> {
        self.client
            .abort_multipart_upload()
            .bucket(&self.config.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| ObjectStoreError::from_provider(e, PROVIDER, "abort_multipart_upload"))?;

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for CosObjectStore {
    async fn put_object(
        &self,
        key: &str,
        value: Bytes,
        options: PutObjectOptions,
    ) -> Result<(), ObjectStoreError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(ByteStream::from(value));

        if let Some(ct) = &options.content_type {
            request = request.content_type(ct);
        }

        if let Some(metadata) = &options.metadata {
            for (k, v) in metadata {
                request = request.metadata(k, v);
            }
        }

        request
            .send()
            .await
            .map_err(|e| ObjectStoreError::from_provider(e, PROVIDER, "put_object"))?;

        Ok(())
    }

    async fn get_object(
        &self,
        key: &str,
        options: GetObjectOptions,
    ) -> Result<Bytes, ObjectStoreError> {
        let mut builder = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key);

        if let Some(range) = options.range {
            let range_header = format!("bytes={}-{}", range.start, range.end.saturating_sub(1));
            builder = builder.range(range_header);
        }

        let output = builder.send().await.map_err(|e| match e {
            SdkError::ServiceError(ref se) if se.err().is_no_such_key() => {
                ObjectStoreError::NotFound {
                    key: key.to_string(),
                }
            }
            _ => ObjectStoreError::from_provider(e, PROVIDER, "get_object"),
        })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| ObjectStoreError::Network(e.to_string()))?
            .into_bytes();

        Ok(bytes)
    }

    async fn put_stream(
        &self,
        key: &str,
        mut reader: Box<dyn AsyncRead + Send + Unpin>,
        size: Option<u64>,
        options: PutStreamOptions,
    ) -> Result<(), ObjectStoreError> {
        // 大小未知时强制分片上传，避免整体读入内存
        match size {
            Some(s) if s < options.multipart_threshold => {
                let mut buffer = Vec::with_capacity(s as usize);
                tokio::io::copy(&mut reader, &mut buffer).await?;

                let put_options = PutObjectOptions {
                    content_type: options.content_type,
                    metadata: options.metadata,
                };
                self.put_object(key, Bytes::from(buffer), put_options).await
            }
            _ => {
                let put_options = PutObjectOptions {
                    content_type: options.content_type.clone(),
                    metadata: options.metadata.clone(),
                };
                let upload_id = self.create_multipart_upload(key, put_options).await?;

                let result = self
                    .put_stream_multipart(key, &upload_id, &mut reader, &options)
                    .await;

                if result.is_err() {
                    // 忽略取消错误，保留原始错误
                    let _ = self.abort_multipart_upload(key, &upload_id).await;
                }

                result
            }
        }
    }
}
