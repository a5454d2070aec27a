//! MIME类型处理工具
//!
//! 该模块提供了根据文件扩展名推断内容类型的工具函数

use std::path::Path;

use mime_guess::from_path;

use crate::content_type::ContentType;

/// 根据文件扩展名获取内容类型
///
/// 该函数使用mime_guess库根据文件扩展名自动检测MIME类型，
/// 无法识别时使用`application/octet-stream`
///
/// # Arguments
///
/// * `file_path` - 文件路径
///
/// # Returns
///
/// * `ContentType` - 推断出的内容类型
pub fn guess_content_type(file_path: &Path) -> ContentType {
    from_path(file_path)
        .first()
        .map(ContentType::from)
        .unwrap_or_default()
}
