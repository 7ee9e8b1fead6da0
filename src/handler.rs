//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、图像后端、调用核心隐写算法以及向用户报告结果。

use crate::cli::{CapacityArgs, HideArgs, MessageSource, RecoverArgs};
use crate::error::StegoError;
use crate::raster::{ImageBackend, RasterBackend, lossless_format};
use crate::steganography::{capacity_bits, max_message_len};
use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// 在输入文件同目录下生成 `<prefix><名称>.<ext>` 形式的默认输出路径。
fn default_output_path(input: &Path, prefix: &str, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    input.with_file_name(format!("{prefix}{stem}.{ext}"))
}

/// 除非指定了 `--force`，否则拒绝覆盖已存在的文件。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn read_message(source: &MessageSource) -> Result<String> {
    match (&source.text, &source.message) {
        (Some(path), _) => fs::read_to_string(path).with_context(|| {
            format!(
                "Unable to read text file: {}",
                path.to_string_lossy().red().bold()
            )
        }),
        (None, Some(message)) => Ok(message.clone()),
        (None, None) => Err(StegoError::InvalidInput(
            "either a text file or a message is required".to_string(),
        )
        .into()),
    }
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 使用默认的 [`ImageBackend`]，详见 [`hide_with`]。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    hide_with(&ImageBackend, args)
}

/// 使用指定后端执行 'Hide' 命令。
///
/// 负责读取图像和消息、检查目标路径与格式、调用隐写核心函数嵌入消息，
/// 最后将结果写入目标图像文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或文本文件。
/// * 目标文件已存在且未指定 `--force`，或目标格式不是无损格式。
/// * 消息为空、包含无法编码的字符，或图像空间不足。
/// * 无法写入到目标图像文件。
pub fn hide_with<B: RasterBackend>(backend: &B, args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_output_path(&args.image, "encoded_", "png"));
    ensure_writable(&dest, args.force)?;
    lossless_format(&dest)?;

    let message = read_message(&args.source)?;

    let mut pixels = backend.load(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    debug!(
        "loaded {}x{} cover image from {}",
        pixels.width(),
        pixels.height(),
        args.image.display()
    );

    pixels.hide(&message).map_err(|err| match err {
        StegoError::CapacityExceeded {
            required,
            available,
        } => anyhow::anyhow!(
            "Not enough space in the image to hide the text. \nRequired: {} bits, Available: {} bits",
            required.to_string().red().bold(),
            available.to_string().green().bold()
        ),
        other => anyhow::Error::new(other).context("Failed to hide the message in the image"),
    })?;
    info!(
        "embedded {} characters into {}",
        message.chars().count(),
        args.image.display()
    );

    backend.save(&pixels, &dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 使用默认的 [`ImageBackend`]，详见 [`recover_with`]。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    recover_with(&ImageBackend, args)
}

/// 使用指定后端执行 'Recover' 命令。
///
/// 负责读取经过隐写的图像、调用恢复核心函数提取并校验标记，
/// 最后将恢复的文本内容写入目标文本文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 目标文件已存在且未指定 `--force`。
/// * 图像中没有带标记的隐藏信息。
/// * 无法写入到目标文本文件。
pub fn recover_with<B: RasterBackend>(backend: &B, args: RecoverArgs) -> Result<()> {
    let dest = args
        .text
        .clone()
        .unwrap_or_else(|| default_output_path(&args.image, "decoded_", "txt"));
    ensure_writable(&dest, args.force)?;

    let pixels = backend.load(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    debug!(
        "scanning {} pixels of {}",
        pixels.pixel_count(),
        args.image.display()
    );

    let text = pixels.recover().map_err(|err| match err {
        StegoError::NoHiddenMessage => anyhow::anyhow!(
            "This image does not contain a hidden message: {}",
            args.image.to_string_lossy().red().bold()
        ),
        other => anyhow::Error::new(other).context(format!(
            "Failed to recover the message from '{}'",
            args.image.to_string_lossy().red().bold()
        )),
    })?;
    info!("recovered {} characters", text.chars().count());

    fs::write(&dest, text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    capacity_with(&ImageBackend, args)
}

/// 使用指定后端报告图像的隐写容量。
pub fn capacity_with<B: RasterBackend>(backend: &B, args: CapacityArgs) -> Result<()> {
    let pixels = backend.load(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let bits = capacity_bits(pixels.as_bytes())?;
    let chars = max_message_len(pixels.as_bytes())?;

    println!(
        "{}x{} pixels, {} usable bits",
        pixels.width(),
        pixels.height(),
        bits.to_string().green().bold()
    );
    match chars {
        Some(chars) => println!(
            "Up to {} characters can be hidden in {}",
            chars.to_string().green().bold(),
            args.image.to_string_lossy().green().bold()
        ),
        None => println!(
            "{} is too small to hide any message",
            args.image.to_string_lossy().red().bold()
        ),
    }

    Ok(())
}
