//! 配置加载模块
//!
//! 从环境变量（包括`.env`文件）读取S3相关配置

use anyhow::{Result, anyhow};

/// 显式指定的AWS凭证
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

/// S3配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    /// 存储桶名称
    pub bucket: String,
    /// 三个变量都设置时才会使用，否则走默认凭证链
    pub credentials: Option<StaticCredentials>,
    /// 自定义端点URL（例如MinIO）
    pub endpoint_url: Option<String>,
}

impl S3Config {
    /// 从进程环境变量加载配置
    ///
    /// 会先尝试加载当前目录下的`.env`文件
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过查询函数加载配置
    ///
    /// # Arguments
    ///
    /// * `lookup` - 根据变量名返回变量值
    ///
    /// # Returns
    ///
    /// * `Result<S3Config>` - 缺少`AWS_BUCKET`时返回错误
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bucket = get("AWS_BUCKET")
            .ok_or_else(|| anyhow!("AWS_BUCKET environment variable not set"))?;

        let credentials = match (
            get("AWS_ACCESS_KEY_ID"),
            get("AWS_SECRET_ACCESS_KEY"),
            get("AWS_REGION"),
        ) {
            (Some(access_key_id), Some(secret_access_key), Some(region)) => {
                Some(StaticCredentials {
                    access_key_id,
                    secret_access_key,
                    region,
                })
            }
            _ => None,
        };

        Ok(Self {
            bucket,
            credentials,
            endpoint_url: get("AWS_ENDPOINT_URL"),
        })
    }
}
