//! 命令行子命令
//!
//! 每个子命令都先根据`BodyArgs`构造出`FileBody`，再对其进行操作

pub mod copy;
pub mod inspect;
pub mod push;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::content_type::ContentType;
use crate::file_body::FileBody;
use crate::utils::mime::guess_content_type;

/// 构造文件分片所需的参数
#[derive(Args, Debug, Clone, Default)]
pub struct BodyArgs {
    /// Local file path
    pub path: PathBuf,
    /// Display filename (defaults to the file's own name)
    #[arg(long)]
    pub filename: Option<String>,
    /// MIME type (defaults to application/octet-stream)
    #[arg(long)]
    pub mime_type: Option<String>,
    /// Character set
    #[arg(long)]
    pub charset: Option<String>,
    /// Guess the MIME type from the file extension
    #[arg(long, conflicts_with = "mime_type")]
    pub guess: bool,
}

impl BodyArgs {
    /// 根据参数构造文件分片
    ///
    /// # Returns
    ///
    /// * `Result<FileBody>` - MIME类型无法解析时返回错误
    pub fn build(&self) -> Result<FileBody> {
        let content_type = match &self.mime_type {
            Some(mime_type) => ContentType::create(mime_type, None)
                .with_context(|| format!("Invalid MIME type: {mime_type}"))?,
            None if self.guess => guess_content_type(&self.path),
            None => ContentType::DEFAULT_BINARY,
        };

        let content_type = match self.charset.as_deref() {
            Some(charset) => ContentType::create(content_type.mime_type(), Some(charset))
                .with_context(|| format!("Invalid charset: {charset}"))?,
            None => content_type,
        };

        Ok(FileBody::with_filename(
            self.path.clone(),
            content_type,
            self.filename.clone(),
        ))
    }
}
