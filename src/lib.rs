//! 文件分片库
//!
//! 把本地文件作为multipart/form-data请求中的一个分片：
//! 提供内容类型、传输编码、文件名和长度，并按需把文件内容写到输出流

pub mod body;
pub mod commands;
pub mod config;
pub mod content_type;
pub mod file_body;
pub mod s3;
pub mod utils;

pub use body::{ContentBody, ENC_BINARY};
pub use content_type::ContentType;
pub use file_body::{CHUNK_SIZE, FileBody};
