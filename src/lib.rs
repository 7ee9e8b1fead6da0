//! # lsb_marker 库
//!
//! 本库包含带标记帧的 LSB 隐写核心逻辑及其命令行外壳。

// 声明库包含的所有模块。

pub mod cli;
pub mod constants;
pub mod error;
pub mod frame;
pub mod handler;
pub mod raster;
pub mod steganography;

pub use error::StegoError;
pub use raster::PixelBuffer;
pub use steganography::{decode, encode};
