//! Copy命令
//!
//! 通过`write_to`把分片内容写到文件或标准输出

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::body::ContentBody;
use crate::file_body::FileBody;

/// 复制分片内容
///
/// # Arguments
///
/// * `body` - 文件分片
/// * `output` - 输出文件路径，为`None`时写到标准输出
///
/// # Returns
///
/// * `Result<u64>` - 写出的字节数
pub fn copy_body(body: &FileBody, output: Option<&Path>) -> Result<u64> {
    let copied = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            body.write_to(&mut out)
                .with_context(|| format!("Failed to copy {} to {}", body.file().display(), path.display()))?
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            body.write_to(&mut out)
                .with_context(|| format!("Failed to copy {}", body.file().display()))?
        }
    };

    info!("Copied {} ({} bytes)", body.filename(), copied);
    Ok(copied)
}
