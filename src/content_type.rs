//! 内容类型模块
//!
//! 该模块定义了表单分片使用的内容类型（MIME类型 + 可选字符集）

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use mime_guess::mime::{self, Mime};

/// 内容类型
///
/// 对`Mime`的简单包装，只保留MIME类型本身以及`charset`参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    mime: Mime,
}

impl ContentType {
    /// 默认的二进制内容类型：`application/octet-stream`
    pub const DEFAULT_BINARY: ContentType = ContentType {
        mime: mime::APPLICATION_OCTET_STREAM,
    };

    /// 默认的文本内容类型：`text/plain; charset=utf-8`
    pub const DEFAULT_TEXT: ContentType = ContentType {
        mime: mime::TEXT_PLAIN_UTF_8,
    };

    /// 根据MIME类型和字符集创建内容类型
    ///
    /// MIME类型中自带的参数会被丢弃，只有`charset`会被保留；
    /// 字符集必须是单个token，不能夹带其他参数
    ///
    /// # Arguments
    ///
    /// * `mime_type` - MIME类型，例如`image/png`
    /// * `charset` - 字符集（可选）
    ///
    /// # Returns
    ///
    /// * `Result<ContentType>` - 内容类型，MIME类型或字符集非法时返回错误
    pub fn create(mime_type: &str, charset: Option<&str>) -> Result<Self> {
        // 先解析MIME类型本身
        let parsed: Mime = mime_type
            .trim()
            .parse()
            .with_context(|| format!("invalid MIME type: {mime_type:?}"))?;

        let mime: Mime = match charset.map(str::trim).filter(|c| !c.is_empty()) {
            Some(charset) => {
                // 字符集里出现`;`、`=`、空白或引号都会变成额外的参数
                if !is_token(charset) {
                    bail!("invalid charset: {charset:?}");
                }
                format!("{}; charset={}", parsed.essence_str(), charset)
                    .parse()
                    .with_context(|| format!("invalid charset: {charset:?}"))?
            }
            // 去掉MIME类型自带的参数
            None if parsed.params().next().is_some() => parsed.essence_str().parse()?,
            None => parsed,
        };
        Ok(Self { mime })
    }

    /// MIME类型，形如`type/subtype`
    pub fn mime_type(&self) -> &str {
        self.mime.essence_str()
    }

    /// 主类型，例如`image`
    pub fn media_type(&self) -> &str {
        self.mime.type_().as_str()
    }

    /// 子类型，例如`png`
    pub fn sub_type(&self) -> &str {
        self.mime.subtype().as_str()
    }

    pub fn charset(&self) -> Option<&str> {
        self.mime.get_param(mime::CHARSET).map(|name| name.as_str())
    }

    pub fn as_mime(&self) -> &Mime {
        &self.mime
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::DEFAULT_BINARY
    }
}

impl From<Mime> for ContentType {
    fn from(mime: Mime) -> Self {
        Self { mime }
    }
}

impl FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parsed: Mime = s
            .trim()
            .parse()
            .with_context(|| format!("invalid content type: {s:?}"))?;
        let charset = parsed.get_param(mime::CHARSET).map(|c| c.as_str().to_string());
        Self::create(parsed.essence_str(), charset.as_deref())
    }
}

// RFC 2045中的token：可见ASCII字符，且不含tspecials
fn is_token(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?=".contains(&b))
}

// 以HTTP头的形式输出，例如`text/plain; charset=utf-8`
impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.mime, f)
    }
}
