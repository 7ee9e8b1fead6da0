/// 每个隐写载荷开头的固定标记。
/// 解码时若恢复出的前缀与此不一致，则认为图像中没有隐藏信息。
pub const MARKER: &[u8] = b"STEGO:";

/// 载荷结束符：一个全零字节。
pub const TERMINATOR: u8 = 0;

/// 每个像素在 RGBA 缓冲区中占用的字节数。
pub const BYTES_PER_PIXEL: usize = 4;

/// 每个像素中可用于隐写的通道数 (R, G, B)。
/// Alpha 通道永远不会被修改。
pub const CHANNELS_PER_PIXEL: usize = 3;

/// 每个字符按 `u8` (8 bits) 处理，每个通道字节存储 1 bit。
pub const BITS_PER_CHAR: usize = 8;

/// 单个字符允许的最大码位 (Latin-1 范围)。
pub const MAX_CODE_POINT: u32 = 0xFF;
