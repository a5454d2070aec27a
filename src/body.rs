//! 表单分片能力定义
//!
//! multipart编码器只依赖这里的`ContentBody`，不关心分片内容来自哪里

use std::io::{self, Write};

use crate::content_type::ContentType;

/// 二进制传输编码，内容不做任何转换
pub const ENC_BINARY: &str = "binary";

/// multipart表单中的一个分片
///
/// 内容类型相关的查询方法都有默认实现，实现者只需要给出`content_type`
pub trait ContentBody {
    /// 分片的内容类型
    fn content_type(&self) -> &ContentType;

    /// `Content-Disposition`中的文件名
    fn filename(&self) -> Option<&str>;

    /// `Content-Transfer-Encoding`的取值
    fn transfer_encoding(&self) -> &str;

    /// 分片内容的字节数
    fn content_length(&self) -> io::Result<u64>;

    /// 将分片内容写入输出流，返回写入的字节数
    fn write_to(&self, out: &mut dyn Write) -> io::Result<u64>;

    fn mime_type(&self) -> &str {
        self.content_type().mime_type()
    }

    fn media_type(&self) -> &str {
        self.content_type().media_type()
    }

    fn sub_type(&self) -> &str {
        self.content_type().sub_type()
    }

    fn charset(&self) -> Option<&str> {
        self.content_type().charset()
    }
}
