//! S3交互模块
//!
//! 该模块包含了与AWS S3交互的功能，包括：
//! - 获取S3客户端
//! - 计算本地分片的ETag并查询远程ETag
//! - 上传文件分片

use std::time::SystemTime;

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

use crate::body::ContentBody;
use crate::config::S3Config;
use crate::file_body::FileBody;

/// 对象存储
///
/// 上传流程只依赖这两个操作，测试时可以换成内存实现
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// 查询远程对象的ETag，对象不存在时返回`None`
    async fn remote_etag(&self, key: &str) -> Result<Option<String>>;

    /// 上传文件分片，返回上传时分片的字节数
    async fn upload(&self, key: &str, body: &FileBody) -> Result<u64>;
}

/// 基于AWS S3的对象存储
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// 根据配置创建S3存储
    pub async fn connect(config: &S3Config) -> Self {
        Self {
            client: get_s3_client(config).await,
            bucket: config.bucket.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl ObjectStore for S3Store {
    async fn remote_etag(&self, key: &str) -> Result<Option<String>> {
        let bucket = &self.bucket;

        // 使用HEAD请求获取对象元数据，不下载内容
        match self.client.head_object().bucket(bucket).key(key).send().await {
            // 对象存在，取出并规范化ETag
            Ok(output) => Ok(output.e_tag().map(normalize_etag)),
            // 对象不存在，视为需要上传
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(None),
            // 其他错误直接返回
            Err(err) => Err(err).with_context(|| format!("Failed to query s3://{bucket}/{key}")),
        }
    }

    /// 对象的`Content-Type`取自分片的内容类型，`Content-Disposition`带上分片的文件名
    async fn upload(&self, key: &str, body: &FileBody) -> Result<u64> {
        let bucket = &self.bucket;

        // 读取分片当前的长度（用于日志和返回值）
        let length = body
            .content_length()
            .with_context(|| format!("Failed to stat {}", body.file().display()))?;

        // 以流的方式读取文件，避免整个文件进入内存
        let stream = ByteStream::from_path(body.file())
            .await
            .with_context(|| format!("Failed to open {}", body.file().display()))?;

        // 上传文件到S3
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(stream)
            .content_type(body.content_type().to_string())
            .content_disposition(content_disposition(body.filename()))
            .send()
            .await
            .with_context(|| format!("Failed to upload s3://{bucket}/{key}"))?;

        Ok(length)
    }
}

/// 获取AWS S3客户端
///
/// 配置中带有完整凭证时使用该凭证，否则使用默认凭证链
///
/// # Arguments
///
/// * `config` - S3配置
///
/// # Returns
///
/// * `Client` - 配置好的S3客户端实例
pub async fn get_s3_client(config: &S3Config) -> Client {
    // 从默认配置开始构建
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    // 如果配置了完整的凭证，使用指定的凭证和区域
    if let Some(credentials) = &config.credentials {
        debug!("Using static credentials for region {}", credentials.region);
        loader = loader
            .region(aws_config::Region::new(credentials.region.clone()))
            .credentials_provider(Credentials::new(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.clone(),
                None,
                None::<SystemTime>,
                "env",
            ));
    }

    // 如果设置了自定义端点URL，配置它
    if let Some(endpoint_url) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    // 加载AWS配置
    let sdk_config = loader.load().await;

    // 自定义端点（MinIO等）一般只支持路径风格的访问
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.endpoint_url.is_some())
        .build();

    // 创建并返回S3客户端
    Client::from_conf(s3_config)
}

/// 计算本地分片的ETag
///
/// 通过`write_to`把分片内容直接写入MD5上下文，不在内存中保留整个文件
pub fn calculate_local_etag(body: &FileBody) -> std::io::Result<String> {
    // 边读边计算MD5
    let mut context = md5::Context::new();
    body.write_to(&mut context)?;
    // 将哈希转换为十六进制字符串并返回
    Ok(format!("{:x}", context.finalize()))
}

/// 规范化S3返回的ETag
///
/// S3的ETag带有双引号，例如`"5d41402abc4b2a76b9719d911017c592"`
pub fn normalize_etag(etag: &str) -> String {
    etag.trim().trim_matches('"').to_string()
}

/// 生成远程键名：前缀 + 文件名
///
/// 非空前缀会被补齐结尾的`/`
pub fn build_key(prefix: &str, filename: &str) -> String {
    let prefix = prefix.trim_start_matches('/');
    if prefix.is_empty() {
        filename.to_string()
    } else if prefix.ends_with('/') {
        format!("{prefix}{filename}")
    } else {
        format!("{prefix}/{filename}")
    }
}

fn content_disposition(filename: &str) -> String {
    let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
    format!("attachment; filename=\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn key_joins_prefix_and_filename() {
        assert_eq!(build_key("", "a.txt"), "a.txt");
        assert_eq!(build_key("docs", "a.txt"), "docs/a.txt");
        assert_eq!(build_key("docs/", "a.txt"), "docs/a.txt");
        assert_eq!(build_key("/docs/2024", "a.txt"), "docs/2024/a.txt");
    }

    #[test]
    fn disposition_escapes_quotes() {
        assert_eq!(content_disposition("a.txt"), "attachment; filename=\"a.txt\"");
        assert_eq!(
            content_disposition("say \"hi\".txt"),
            "attachment; filename=\"say \\\"hi\\\".txt\""
        );
    }

    #[test]
    fn quoted_s3_etag_is_normalized() {
        assert_eq!(
            normalize_etag("\"5d41402abc4b2a76b9719d911017c592\""),
            "5d41402abc4b2a76b9719d911017c592"
        );
        assert_eq!(normalize_etag("5d41402abc4b2a76b9719d911017c592"), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn local_etag_is_md5_of_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello").unwrap();

        let etag = calculate_local_etag(&FileBody::new(&path)).unwrap();
        assert_eq!(etag, "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn local_etag_of_multi_chunk_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.bin");
        let content: Vec<u8> = (0..10_000u32).map(|i| (i % 253) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        let etag = calculate_local_etag(&FileBody::new(&path)).unwrap();
        assert_eq!(etag, format!("{:x}", md5::compute(&content)));
    }

    #[test]
    fn local_etag_of_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(calculate_local_etag(&FileBody::new(dir.path().join("nope"))).is_err());
    }
}
