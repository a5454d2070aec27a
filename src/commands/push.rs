//! Push命令核心功能模块
//!
//! 该模块负责把一个文件分片上传到对象存储

use anyhow::Result;
use tracing::{info, warn};

use crate::commands::BodyArgs;
use crate::config::S3Config;
use crate::file_body::FileBody;
use crate::s3::{ObjectStore, S3Store, build_key, calculate_local_etag};

/// 上传结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// 已上传
    Uploaded {
        /// 远程S3键名
        key: String,
        /// 上传的字节数
        bytes: u64,
    },
    /// 远程ETag与本地一致，跳过上传
    Skipped {
        /// 远程S3键名
        key: String,
    },
}

/// 判断是否需要上传
///
/// 远程对象不存在或ETag不同时需要上传
pub fn needs_upload(local_etag: &str, remote_etag: Option<&str>) -> bool {
    remote_etag != Some(local_etag)
}

/// 把分片上传到指定的对象存储
///
/// # Arguments
///
/// * `store` - 对象存储
/// * `body` - 文件分片
/// * `key` - 远程键名
/// * `force` - 忽略ETag比较，总是上传
///
/// # Returns
///
/// * `Result<PushOutcome>` - 上传或跳过
pub async fn push_body<S: ObjectStore>(
    store: &S,
    body: &FileBody,
    key: &str,
    force: bool,
) -> Result<PushOutcome> {
    if !force {
        // 在阻塞线程中计算本地ETag（文件读取是同步的）
        let local_body = body.clone();
        let local_etag =
            tokio::task::spawn_blocking(move || calculate_local_etag(&local_body)).await??;

        // 获取远程ETag
        let remote_etag = store.remote_etag(key).await?;

        // ETag相同，跳过上传
        if !needs_upload(&local_etag, remote_etag.as_deref()) {
            info!("Unchanged, skipped: {}", key);
            return Ok(PushOutcome::Skipped {
                key: key.to_string(),
            });
        }

        // 远程存在但内容不同，将被覆盖
        if remote_etag.is_some() {
            warn!("Remote object {} differs from local file, overwriting", key);
        }
    }

    // 上传文件
    let bytes = store.upload(key, body).await?;

    // 输出上传成功信息
    info!("Uploaded: {} ({} bytes)", key, bytes);
    Ok(PushOutcome::Uploaded {
        key: key.to_string(),
        bytes,
    })
}

/// Push文件到S3的主要函数
///
/// 该函数负责整个上传过程：
/// 1. 加载配置
/// 2. 构造文件分片并生成远程键名
/// 3. 比较本地与远程ETag（除非指定了`force`）
/// 4. 上传分片
///
/// # Arguments
///
/// * `args` - 构造分片的参数
/// * `prefix` - 远程S3前缀
/// * `force` - 忽略ETag比较，总是上传
pub async fn push_file(args: &BodyArgs, prefix: &str, force: bool) -> Result<PushOutcome> {
    // 从环境变量加载S3配置
    let config = S3Config::from_env()?;

    // 构造文件分片
    let body = args.build()?;

    // 远程键名由前缀和分片的文件名组成
    let key = build_key(prefix, body.filename());

    // 输出操作信息
    info!(
        "Pushing {} to bucket: {}, key: {}",
        body.file().display(),
        config.bucket,
        key
    );

    // 获取S3存储实例
    let store = S3Store::connect(&config).await;

    // 执行上传
    push_body(&store, &body, &key, force).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::ContentBody;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// 内存中的对象存储，记录所有上传
    struct MemoryStore {
        etag: Option<String>,
        uploads: Mutex<Vec<String>>,
    }

    impl MemoryStore {
        fn new(etag: Option<&str>) -> Self {
            Self {
                etag: etag.map(str::to_string),
                uploads: Mutex::new(Vec::new()),
            }
        }

        fn uploads(&self) -> Vec<String> {
            self.uploads.lock().unwrap().clone()
        }
    }

    impl ObjectStore for MemoryStore {
        async fn remote_etag(&self, _key: &str) -> Result<Option<String>> {
            Ok(self.etag.clone())
        }

        async fn upload(&self, key: &str, body: &FileBody) -> Result<u64> {
            self.uploads.lock().unwrap().push(key.to_string());
            Ok(body.content_length()?)
        }
    }

    fn hello_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello").unwrap();
        path
    }

    const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";

    #[test]
    fn upload_decision() {
        assert!(needs_upload("abc", None));
        assert!(needs_upload("abc", Some("def")));
        assert!(!needs_upload("abc", Some("abc")));
    }

    #[tokio::test]
    async fn missing_remote_object_is_uploaded() {
        let dir = TempDir::new().unwrap();
        let body = FileBody::new(hello_file(&dir));
        let store = MemoryStore::new(None);

        let outcome = push_body(&store, &body, "docs/hello.txt", false).await.unwrap();
        assert_eq!(
            outcome,
            PushOutcome::Uploaded {
                key: "docs/hello.txt".to_string(),
                bytes: 5,
            }
        );
        assert_eq!(store.uploads(), vec!["docs/hello.txt"]);
    }

    #[tokio::test]
    async fn matching_etag_is_skipped() {
        let dir = TempDir::new().unwrap();
        let body = FileBody::new(hello_file(&dir));
        let store = MemoryStore::new(Some(HELLO_MD5));

        let outcome = push_body(&store, &body, "hello.txt", false).await.unwrap();
        assert_eq!(
            outcome,
            PushOutcome::Skipped {
                key: "hello.txt".to_string()
            }
        );
        assert!(store.uploads().is_empty());
    }

    #[tokio::test]
    async fn different_etag_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let body = FileBody::new(hello_file(&dir));
        let store = MemoryStore::new(Some("0123456789abcdef0123456789abcdef"));

        let outcome = push_body(&store, &body, "hello.txt", false).await.unwrap();
        assert!(matches!(outcome, PushOutcome::Uploaded { bytes: 5, .. }));
        assert_eq!(store.uploads().len(), 1);
    }

    #[tokio::test]
    async fn force_ignores_matching_etag() {
        let dir = TempDir::new().unwrap();
        let body = FileBody::new(hello_file(&dir));
        let store = MemoryStore::new(Some(HELLO_MD5));

        let outcome = push_body(&store, &body, "hello.txt", true).await.unwrap();
        assert!(matches!(outcome, PushOutcome::Uploaded { .. }));
        assert_eq!(store.uploads(), vec!["hello.txt"]);
    }

    #[tokio::test]
    async fn missing_local_file_fails_before_upload() {
        let dir = TempDir::new().unwrap();
        let body = FileBody::new(dir.path().join("gone.txt"));
        let store = MemoryStore::new(None);

        assert!(push_body(&store, &body, "gone.txt", false).await.is_err());
        assert!(store.uploads().is_empty());
    }
}
