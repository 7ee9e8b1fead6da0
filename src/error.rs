//! # 核心错误类型
//!
//! [`StegoError`] 覆盖帧构建、嵌入和提取过程中所有可能的失败情况。

use std::fmt;

/// 隐写编码或解码过程中可能出现的错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// 像素缓冲区不是合法的 RGBA 布局，或缺少必需的参数。
    InvalidInput(String),
    /// 请求编码的消息为空。
    EmptyMessage,
    /// 消息 (含标记与结束符) 的位数超过图像可用的通道数。
    CapacityExceeded { required: usize, available: usize },
    /// 恢复出的数据不以标记开头，图像中没有隐藏信息。
    NoHiddenMessage,
    /// 消息中包含无法用单个字节表示的字符。
    UnsupportedCharacter { index: usize, ch: char },
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(reason) => write!(f, "invalid input: {reason}"),
            Self::EmptyMessage => write!(f, "message is empty"),
            Self::CapacityExceeded {
                required,
                available,
            } => write!(
                f,
                "message too large for this image (required {required} bits, available {available} bits)"
            ),
            Self::NoHiddenMessage => write!(f, "this image does not contain a hidden message"),
            Self::UnsupportedCharacter { index, ch } => write!(
                f,
                "character {ch:?} (U+{:04X}) at index {index} cannot be encoded as a single byte",
                u32::from(*ch)
            ),
        }
    }
}

impl std::error::Error for StegoError {}
