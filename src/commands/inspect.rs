//! Inspect命令
//!
//! 输出文件分片的元数据：文件名、内容类型、传输编码和长度

use anyhow::{Context, Result};

use crate::body::ContentBody;
use crate::commands::BodyArgs;

/// 输出分片的元数据
pub fn inspect_file(args: &BodyArgs) -> Result<()> {
    let body = args.build()?;
    println!("{}", describe(&body)?);
    Ok(())
}

/// 以`key: value`的形式描述一个分片
///
/// 长度在调用时实时读取
pub fn describe(body: &dyn ContentBody) -> Result<String> {
    let length = body
        .content_length()
        .context("Failed to read content length")?;
    Ok(format!(
        "filename: {}\ncontent-type: {}\ntransfer-encoding: {}\ncontent-length: {}",
        body.filename().unwrap_or("-"),
        body.content_type(),
        body.transfer_encoding(),
        length
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_body::FileBody;
    use tempfile::TempDir;

    #[test]
    fn describe_file_body() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "twelve bytes").unwrap();

        let body = FileBody::guessed(&path);
        assert_eq!(
            describe(&body).unwrap(),
            "filename: notes.txt\ncontent-type: text/plain\ntransfer-encoding: binary\ncontent-length: 12"
        );
    }

    #[test]
    fn describe_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let body = FileBody::new(dir.path().join("gone.bin"));
        assert!(describe(&body).is_err());
    }
}
