//! 文件分片模块
//!
//! 把本地文件包装成multipart表单中的一个二进制分片

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::body::{ContentBody, ENC_BINARY};
use crate::content_type::ContentType;
use crate::utils::mime::guess_content_type;

/// 每次从文件中读取的块大小
pub const CHUNK_SIZE: usize = 4096;

/// 以本地文件为内容的二进制分片
///
/// 构造时不做任何I/O，也不检查文件是否存在；
/// 每次读取或写出都会重新打开文件，调用结束后立即关闭
#[derive(Debug, Clone)]
pub struct FileBody {
    file: PathBuf,
    filename: String,
    content_type: ContentType,
}

impl FileBody {
    /// 使用默认内容类型和文件本身的名称创建分片
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self::with_content_type(file, ContentType::DEFAULT_BINARY)
    }

    pub fn with_content_type(file: impl Into<PathBuf>, content_type: ContentType) -> Self {
        Self::with_filename(file, content_type, None::<String>)
    }

    /// 创建分片
    ///
    /// # Arguments
    ///
    /// * `file` - 本地文件路径
    /// * `content_type` - 分片的内容类型
    /// * `filename` - 显示的文件名，为`None`时使用文件本身的名称
    pub fn with_filename(
        file: impl Into<PathBuf>,
        content_type: ContentType,
        filename: Option<impl Into<String>>,
    ) -> Self {
        let file = file.into();
        let filename = match filename {
            Some(filename) => filename.into(),
            None => base_name(&file),
        };
        Self {
            file,
            filename,
            content_type,
        }
    }

    /// 根据MIME类型字符串和字符集创建分片
    ///
    /// # Returns
    ///
    /// * `anyhow::Result<FileBody>` - MIME类型或字符集非法时返回错误
    pub fn with_mime_type(
        file: impl Into<PathBuf>,
        mime_type: &str,
        charset: Option<&str>,
    ) -> anyhow::Result<Self> {
        let content_type = ContentType::create(mime_type, charset)?;
        Ok(Self::with_content_type(file, content_type))
    }

    /// 根据文件扩展名推断内容类型
    pub fn guessed(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let content_type = guess_content_type(&file);
        Self::with_content_type(file, content_type)
    }

    /// 打开文件用于读取，读取位置在文件开头
    ///
    /// 返回的句柄归调用方所有
    pub fn open(&self) -> io::Result<File> {
        File::open(&self.file)
    }

    /// 底层文件路径
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl ContentBody for FileBody {
    fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    fn filename(&self) -> Option<&str> {
        Some(&self.filename)
    }

    fn transfer_encoding(&self) -> &str {
        ENC_BINARY
    }

    // 每次都重新读取文件元数据，不做缓存
    fn content_length(&self) -> io::Result<u64> {
        Ok(std::fs::metadata(&self.file)?.len())
    }

    fn write_to(&self, out: &mut dyn Write) -> io::Result<u64> {
        // 句柄交给copy_chunked，复制结束（或出错）时随之关闭
        let copied = copy_chunked(self.open()?, out)?;
        debug!("Copied {} bytes from {}", copied, self.file.display());
        Ok(copied)
    }
}

/// 按块把输入复制到输出，结束后刷新输出
///
/// 输入按值传入，无论成功还是出错都会在返回前被释放
fn copy_chunked<R: Read>(mut input: R, out: &mut dyn Write) -> io::Result<u64> {
    // 固定大小的缓冲区
    let mut buf = [0u8; CHUNK_SIZE];
    // 已复制的字节数
    let mut total = 0u64;

    // 循环读取直到文件末尾
    loop {
        let read = match input.read(&mut buf) {
            // 读到末尾，结束复制
            Ok(0) => break,
            Ok(read) => read,
            // 被信号中断时重试
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        // 写出本次读到的数据
        out.write_all(&buf[..read])?;
        total += read as u64;
    }

    // 刷新输出流
    out.flush()?;
    Ok(total)
}

// 没有文件名的路径（例如`/`或`..`）退回到整个路径
fn base_name(file: &Path) -> String {
    match file.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => file.to_string_lossy().into_owned(),
    }
}
