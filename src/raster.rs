//! # 像素缓冲区与图像后端
//!
//! 隐写核心只处理内存中的 RGBA 字节。把图像文件解码成 [`PixelBuffer`]
//! 以及把缓冲区写回图像文件的工作由 [`RasterBackend`] 完成，
//! 默认实现 [`ImageBackend`] 基于 `image` crate。

use crate::constants::BYTES_PER_PIXEL;
use crate::error::StegoError;
use crate::steganography;
use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use std::path::Path;

/// 行优先的 RGBA 像素数据，长度恒为 `width * height * 4`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// # Errors
    ///
    /// 当 `data` 的长度与 `width * height * 4` 不一致时返回 [`StegoError::InvalidInput`]。
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, StegoError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| {
                StegoError::InvalidInput(format!("image dimensions {width}x{height} overflow"))
            })?;

        if data.len() != expected {
            return Err(StegoError::InvalidInput(format!(
                "expected {expected} bytes for a {width}x{height} RGBA image, got {}",
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / BYTES_PER_PIXEL
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// 原地嵌入消息，参见 [`steganography::encode`]。
    pub fn hide(&mut self, message: &str) -> Result<(), StegoError> {
        steganography::encode(&mut self.data, message)
    }

    /// 提取隐藏的消息，参见 [`steganography::decode`]。
    pub fn recover(&self) -> Result<String, StegoError> {
        steganography::decode(&self.data)
    }
}

/// 图像文件与 [`PixelBuffer`] 之间的转换接口。
pub trait RasterBackend {
    /// 读取图像文件并转换为 RGBA 缓冲区。
    fn load(&self, path: &Path) -> Result<PixelBuffer>;

    /// 将缓冲区以无损格式写入 `path`。
    fn save(&self, pixels: &PixelBuffer, path: &Path) -> Result<()>;
}

/// 只有这些格式能原样保留最低位。
pub const LOSSLESS_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
    ImageFormat::WebP,
    ImageFormat::Qoi,
];

/// 根据扩展名确定输出格式，拒绝有损或不支持的格式。
pub fn lossless_format(path: &Path) -> Result<ImageFormat> {
    let format = ImageFormat::from_path(path).with_context(|| {
        format!(
            "Cannot determine an image format from the extension of {}",
            path.display()
        )
    })?;

    anyhow::ensure!(
        LOSSLESS_FORMATS.contains(&format),
        "{:?} is not a lossless output format; the hidden bits would not survive. Use png, bmp, tiff, webp or qoi.",
        format
    );

    Ok(format)
}

/// 基于 `image` crate 的默认后端。
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageBackend;

impl RasterBackend for ImageBackend {
    fn load(&self, path: &Path) -> Result<PixelBuffer> {
        let rgba = image::open(path)
            .with_context(|| format!("Unable to decode image: {}", path.display()))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(PixelBuffer::new(width, height, rgba.into_raw())?)
    }

    fn save(&self, pixels: &PixelBuffer, path: &Path) -> Result<()> {
        let format = lossless_format(path)?;
        let img = RgbaImage::from_raw(pixels.width(), pixels.height(), pixels.as_bytes().to_vec())
            .context("Pixel buffer does not match its dimensions")?;

        img.save_with_format(path, format)
            .with_context(|| format!("Unable to encode image: {}", path.display()))
    }
}
