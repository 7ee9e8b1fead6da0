use crate::constants::{BITS_PER_CHAR, BYTES_PER_PIXEL, CHANNELS_PER_PIXEL, MARKER, TERMINATOR};
use crate::error::StegoError;
use crate::frame::{BitStream, required_bits};

fn check_layout(pix: &[u8]) -> Result<(), StegoError> {
    if pix.len() % BYTES_PER_PIXEL != 0 {
        return Err(StegoError::InvalidInput(format!(
            "pixel buffer length {} is not a multiple of {BYTES_PER_PIXEL}",
            pix.len()
        )));
    }
    Ok(())
}

/// 可写入的通道字节数，即可嵌入的最大位数。
pub fn capacity_bits(pix: &[u8]) -> Result<usize, StegoError> {
    check_layout(pix)?;
    Ok(pix.len() / BYTES_PER_PIXEL * CHANNELS_PER_PIXEL)
}

/// 可嵌入的整字节数 (含标记与结束符)。
pub fn capacity_bytes(pix: &[u8]) -> Result<usize, StegoError> {
    Ok(capacity_bits(pix)? / BITS_PER_CHAR)
}

/// 该缓冲区能承载的最长消息字符数；连标记和结束符都放不下时为 `None`。
pub fn max_message_len(pix: &[u8]) -> Result<Option<usize>, StegoError> {
    let available = capacity_bits(pix)?;
    let overhead = required_bits(0);
    Ok(available
        .checked_sub(overhead)
        .map(|spare| spare / BITS_PER_CHAR)
        .filter(|&chars| chars > 0))
}

fn channels_mut(pix: &mut [u8]) -> impl Iterator<Item = &mut u8> {
    pix.chunks_exact_mut(BYTES_PER_PIXEL)
        .flat_map(|px| px.iter_mut().take(CHANNELS_PER_PIXEL))
}

fn channels(pix: &[u8]) -> impl Iterator<Item = &u8> {
    pix.chunks_exact(BYTES_PER_PIXEL)
        .flat_map(|px| px.iter().take(CHANNELS_PER_PIXEL))
}

/// 将 `message` 写入每个像素 R、G、B 字节的最低位，Alpha 不动。
/// 任何错误都在写入第一个字节之前返回。
pub fn encode(pix: &mut [u8], message: &str) -> Result<(), StegoError> {
    let available = capacity_bits(pix)?;
    let stream = BitStream::from_message(message)?;

    let required = stream.bit_len();
    if required > available {
        return Err(StegoError::CapacityExceeded {
            required,
            available,
        });
    }

    for (byte, bit) in channels_mut(pix).zip(stream.bits()) {
        *byte = (*byte & 0xFE) | bit;
    }

    Ok(())
}

/// 按相同顺序读取最低位，直到结束符或缓冲区耗尽，并剥离标记。
pub fn decode(pix: &[u8]) -> Result<String, StegoError> {
    check_layout(pix)?;

    let mut lsbs = channels(pix).map(|&byte| byte & 1);
    let mut recovered = Vec::new();

    loop {
        let mut value = 0u8;
        let mut taken = 0;
        for bit in lsbs.by_ref().take(BITS_PER_CHAR) {
            value = (value << 1) | bit;
            taken += 1;
        }

        if taken < BITS_PER_CHAR || value == TERMINATOR {
            break;
        }

        recovered.push(value);

        if recovered.len() == MARKER.len() && recovered != MARKER {
            return Err(StegoError::NoHiddenMessage);
        }
    }

    match recovered.strip_prefix(MARKER) {
        Some(payload) => Ok(payload.iter().map(|&byte| char::from(byte)).collect()),
        None => Err(StegoError::NoHiddenMessage),
    }
}
