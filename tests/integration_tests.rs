use anyhow::Ok;
use image::{ImageBuffer, Rgba};
use lsb_marker::{
    PixelBuffer,
    cli::{CapacityArgs, HideArgs, MessageSource, RecoverArgs},
    handler::{handle_capacity, handle_hide, handle_recover, hide_with, recover_with},
    raster::{ImageBackend, RasterBackend},
};
use rand::RngCore;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的测试图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut img_buf = ImageBuffer::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height * 4) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.chunks_exact(4))
        .for_each(|(pixel, chunk)| {
            *pixel = Rgba([chunk[0], chunk[1], chunk[2], 255]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

fn from_file(path: &Path) -> MessageSource {
    MessageSource {
        text: Some(path.to_path_buf()),
        message: None,
    }
}

fn inline(message: &str) -> MessageSource {
    MessageSource {
        text: None,
        message: Some(message.to_string()),
    }
}

/// 验证从隐藏到恢复的完整流程
#[test]
fn test_handle_hide_and_recover_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let hidden_image_path = dir.path().join("hidden.png");
    let source_text_path = dir.path().join("source.txt");
    let recovered_text_path = dir.path().join("recovered.txt");

    create_test_image(&original_image_path, 100, 100);
    let original_text = "This is a test message for the handler! Ça marche très bien.";
    fs::write(&source_text_path, original_text)?;

    // 2. 测试 handle_hide
    let hide_args = HideArgs {
        image: original_image_path.clone(),
        source: from_file(&source_text_path),
        dest: Some(hidden_image_path.clone()),
        force: false,
    };
    handle_hide(hide_args)?;
    assert!(
        hidden_image_path.exists(),
        "Hidden image should be created."
    );

    // 3. 测试 handle_recover
    let recover_args = RecoverArgs {
        image: hidden_image_path.clone(),
        text: Some(recovered_text_path.clone()),
        force: false,
    };
    handle_recover(recover_args)?;
    assert!(
        recovered_text_path.exists(),
        "Recovered text file should be created."
    );

    // 4. 验证结果
    let recovered_text = fs::read_to_string(&recovered_text_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text must match the original."
    );

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并完成操作
#[test]
fn test_handle_hide_and_recover_with_defaults() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.bmp");

    create_test_image(&original_image_path, 100, 100);
    let original_text = "Testing default path generation.";

    // 2. 测试 handle_hide，不提供 dest 路径
    let hide_args = HideArgs {
        image: original_image_path.clone(),
        source: inline(original_text),
        dest: None,
        force: false,
    };
    handle_hide(hide_args)?;

    // 默认输出总是 PNG
    let expected_hidden_path = dir.path().join("encoded_original.png");
    assert!(
        expected_hidden_path.exists(),
        "Default hidden image should be created at: {:?}",
        expected_hidden_path
    );

    // 3. 测试 handle_recover，不提供 text 输出路径
    let recover_args = RecoverArgs {
        image: expected_hidden_path,
        text: None,
        force: false,
    };
    handle_recover(recover_args)?;

    let expected_recovered_path = dir.path().join("decoded_encoded_original.txt");
    assert!(
        expected_recovered_path.exists(),
        "Default recovered text file should be created at: {:?}",
        expected_recovered_path
    );

    // 4. 验证结果
    let recovered_text = fs::read_to_string(&expected_recovered_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text from default file must match the original."
    );

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let dest_path = dir.path().join("dest.png");

    create_test_image(&image_path, 50, 50);

    // 2. 场景一：测试覆盖保护
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;
    assert!(dest_path.exists());

    let hide_args_no_force = HideArgs {
        image: image_path.clone(),
        source: inline("some text"),
        dest: Some(dest_path.clone()),
        force: false,
    };

    let result = handle_hide(hide_args_no_force);
    assert!(result.is_err(), "Execution should fail without --force when file exists.");
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    let hide_args_with_force = HideArgs {
        image: image_path.clone(),
        source: inline("some text"),
        dest: Some(dest_path.clone()),
        force: true,
    };

    let result = handle_hide(hide_args_with_force);
    assert!(result.is_ok(), "Execution should succeed with --force when file exists.");

    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证空间不足时的错误处理，且不会产生输出文件
#[test]
fn test_handle_hide_not_enough_space() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("small.png");
    let text_path = dir.path().join("large.txt");
    let dest_path = dir.path().join("dest.png");

    create_test_image(&image_path, 10, 10);
    fs::write(&text_path, "a".repeat(5000))?;

    // 2. 执行并断言错误
    let hide_args = HideArgs {
        image: image_path,
        source: from_file(&text_path),
        dest: Some(dest_path.clone()),
        force: false,
    };
    let result = handle_hide(hide_args);

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Not enough space"));
    }
    assert!(!dest_path.exists(), "No output should be written on failure.");

    Ok(())
}

/// 验证有损的输出格式会被拒绝
#[test]
fn test_handle_hide_rejects_lossy_destination() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("cover.png");
    let dest_path = dir.path().join("out.jpg");
    create_test_image(&image_path, 20, 20);

    let result = handle_hide(HideArgs {
        image: image_path,
        source: inline("hi"),
        dest: Some(dest_path.clone()),
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("not a lossless output format"));
    }
    assert!(!dest_path.exists());

    Ok(())
}

/// 验证未经隐写的图像会报告没有隐藏信息
#[test]
fn test_handle_recover_plain_image() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("plain.png");
    let text_path = dir.path().join("out.txt");
    create_test_image(&image_path, 64, 64);

    let result = handle_recover(RecoverArgs {
        image: image_path,
        text: Some(text_path.clone()),
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("does not contain a hidden message"));
    }
    assert!(!text_path.exists());

    Ok(())
}

/// 验证非 Latin-1 文本会被明确拒绝
#[test]
fn test_handle_hide_rejects_wide_characters() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("cover.png");
    create_test_image(&image_path, 100, 100);

    let result = handle_hide(HideArgs {
        image: image_path,
        source: inline("这是一个测试信息"),
        dest: Some(dir.path().join("out.png")),
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(format!("{e:#}").contains("cannot be encoded as a single byte"));
    }

    Ok(())
}

#[test]
fn test_handle_capacity() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("cover.png");
    create_test_image(&image_path, 16, 16);

    handle_capacity(CapacityArgs { image: image_path })?;

    let missing = handle_capacity(CapacityArgs {
        image: dir.path().join("missing.png"),
    });
    assert!(missing.is_err());

    Ok(())
}

/// 验证默认后端读写后像素数据保持不变
#[test]
fn test_image_backend_preserves_pixels() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("lossless.png");
    create_test_image(&path, 12, 9);

    let backend = ImageBackend;
    let loaded = backend.load(&path)?;
    assert_eq!((loaded.width(), loaded.height()), (12, 9));

    let copy = dir.path().join("copy.qoi");
    backend.save(&loaded, &copy)?;
    assert_eq!(backend.load(&copy)?, loaded);

    Ok(())
}

/// 内存中的后端，用于验证处理逻辑不依赖具体的图像格式
#[derive(Default)]
struct MemoryBackend {
    images: RefCell<HashMap<PathBuf, PixelBuffer>>,
}

impl RasterBackend for MemoryBackend {
    fn load(&self, path: &Path) -> anyhow::Result<PixelBuffer> {
        self.images
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no image at {}", path.display()))
    }

    fn save(&self, pixels: &PixelBuffer, path: &Path) -> anyhow::Result<()> {
        self.images
            .borrow_mut()
            .insert(path.to_path_buf(), pixels.clone());
        Ok(())
    }
}

#[test]
fn test_handlers_with_swapped_backend() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    let text = dir.path().join("message.txt");

    let backend = MemoryBackend::default();
    let cover_pixels = PixelBuffer::new(20, 20, vec![128u8; 20 * 20 * 4])?;
    backend.save(&cover_pixels, &cover)?;

    hide_with(
        &backend,
        HideArgs {
            image: cover.clone(),
            source: inline("in memory"),
            dest: Some(stego.clone()),
            force: false,
        },
    )?;

    // 原始载体不受影响
    assert_eq!(backend.load(&cover)?, cover_pixels);
    assert_ne!(backend.load(&stego)?, cover_pixels);

    recover_with(
        &backend,
        RecoverArgs {
            image: stego,
            text: Some(text.clone()),
            force: false,
        },
    )?;
    assert_eq!(fs::read_to_string(&text)?, "in memory");

    Ok(())
}
