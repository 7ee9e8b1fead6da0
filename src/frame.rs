//! # 帧构建模块
//!
//! 将文本消息转换为待嵌入的位序列：`标记 + 消息 + 结束符`，
//! 每个字符按其码位编码为 8 位，高位在前。

use crate::constants::{BITS_PER_CHAR, MARKER, MAX_CODE_POINT, TERMINATOR};
use crate::error::StegoError;

/// 已成帧的载荷字节，按位 (MSB 优先) 供编码器消费。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStream {
    bytes: Vec<u8>,
}

impl BitStream {
    /// 为 `message` 构建完整的帧。
    ///
    /// # Errors
    ///
    /// * 消息为空时返回 [`StegoError::EmptyMessage`]。
    /// * 字符码位大于 255 或为 U+0000 时返回 [`StegoError::UnsupportedCharacter`]，
    ///   前者会被截断，后者会被误读为结束符。
    pub fn from_message(message: &str) -> Result<Self, StegoError> {
        if message.is_empty() {
            return Err(StegoError::EmptyMessage);
        }

        let mut bytes = Vec::with_capacity(MARKER.len() + message.len() + 1);
        bytes.extend_from_slice(MARKER);

        for (index, ch) in message.chars().enumerate() {
            let code = u32::from(ch);
            if code > MAX_CODE_POINT || code == u32::from(TERMINATOR) {
                return Err(StegoError::UnsupportedCharacter { index, ch });
            }
            bytes.push(code as u8);
        }

        bytes.push(TERMINATOR);
        Ok(Self { bytes })
    }

    /// 帧的总位数。
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * BITS_PER_CHAR
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 按嵌入顺序逐位产出 (每项为 0 或 1)。
    pub fn bits(&self) -> impl Iterator<Item = u8> + '_ {
        self.bytes
            .iter()
            .flat_map(|&byte| (0..BITS_PER_CHAR).rev().map(move |shift| (byte >> shift) & 1))
    }
}

/// 长度为 `message_chars` 的消息成帧后需要的位数。
pub fn required_bits(message_chars: usize) -> usize {
    (MARKER.len() + message_chars + 1) * BITS_PER_CHAR
}
