//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::constants::{
    HIDDEN_IMAGE_PREFIX, OUTPUT_IMAGE_EXTENSION, RECOVERED_TEXT_EXTENSION, RECOVERED_TEXT_PREFIX,
};
use crate::error::StegoError;
use crate::pixels::PixelBuffer;
use crate::steganography::{decode, encode};
use anyhow::{Context, Result};
use colored::Colorize;
use image::{ImageFormat, ImageReader};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和文本文件、检查隐写空间是否足够、调用隐写核心函数隐藏文本，
/// 最后将结果以 PNG 格式写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标路径不是 `.png`，或目标文件已存在且未指定 `--force`。
/// * 无法读取或解码输入的图像，无法读取文本文件，或文本文件为空。
/// * 图像没有足够的空间来隐藏文本。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_path(&args.image, HIDDEN_IMAGE_PREFIX, OUTPUT_IMAGE_EXTENSION));

    anyhow::ensure!(
        has_extension(&dest, OUTPUT_IMAGE_EXTENSION),
        "Output image must be a PNG file: {}. \nLossy or other formats would destroy the hidden bits.",
        dest.to_string_lossy().red().bold()
    );
    ensure_writable(&dest, args.force)?;

    let pixels = load_pixels(&args.image)?;

    let text = fs::read(&args.text).with_context(|| {
        format!(
            "Unable to read text file: {}",
            args.text.to_string_lossy().red().bold()
        )
    })?;

    anyhow::ensure!(
        !text.is_empty(),
        "Text file is empty, there is no message to hide: {}",
        args.text.to_string_lossy().red().bold()
    );

    let encoded = encode(&pixels, &text).map_err(|err| match err {
        StegoError::Capacity {
            required,
            available,
        } => anyhow::anyhow!(
            "Not enough space in the image to hide the text. \nRequired: {} bits, Available: {} bits (at most {} bytes of text)",
            required.to_string().red().bold(),
            available.to_string().green().bold(),
            pixels.max_message_len().to_string().green().bold()
        ),
        other => anyhow::Error::new(other).context(format!(
            "Failed to hide the text in {}.",
            args.image.to_string_lossy().red().bold()
        )),
    })?;

    encoded
        .into_image()
        .context("Encoded pixel data does not match the image dimensions.")?
        .save_with_format(&dest, ImageFormat::Png)
        .with_context(|| {
            format!(
                "Unable to write to target image file: {}",
                dest.to_string_lossy().red().bold()
            )
        })?;

    info!("Hid {} bytes in {}", text.len(), dest.display());
    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、调用解码核心函数还原文本，
/// 最后将恢复的字节原样写入目标文本文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取或解码输入的图像。
/// * 图像中没有可识别的隐藏文本，或隐藏的文本为空。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let dest = args
        .text
        .clone()
        .unwrap_or_else(|| default_path(&args.image, RECOVERED_TEXT_PREFIX, RECOVERED_TEXT_EXTENSION));

    ensure_writable(&dest, args.force)?;

    let pixels = load_pixels(&args.image)?;

    let text = decode(&pixels).with_context(|| {
        format!(
            "No hidden message found in '{}'. \nThe image may not contain a hidden message or was saved in a lossy format.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    // 长度字段为零的图像与未经隐写的图像无法区分。
    anyhow::ensure!(
        !text.is_empty(),
        "No hidden message found in '{}'. \nThe length field is zero, so the image carries no text.",
        args.image.to_string_lossy().red().bold()
    );

    fs::write(&dest, &text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    info!("Recovered {} bytes into {}", text.len(), dest.display());
    println!(
        "The text has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Capacity' 命令：报告图像尺寸、载体样本数以及可隐藏的最大字节数。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let pixels = load_pixels(&args.image)?;

    println!(
        "{}: {}x{} pixels, {} carrier samples, up to {} bytes of text",
        args.image.to_string_lossy().bold(),
        pixels.width(),
        pixels.height(),
        pixels.capacity().to_string().green(),
        pixels.max_message_len().to_string().green().bold()
    );

    Ok(())
}

/// 读取并解码图像文件，丢弃 Alpha 通道后展平为 RGB 缓冲区。
fn load_pixels(path: &Path) -> Result<PixelBuffer> {
    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .with_context(|| {
            format!(
                "Unable to read image file: {}",
                path.to_string_lossy().red().bold()
            )
        })?
        .decode()
        .with_context(|| {
            format!(
                "Unable to decode image file: {}",
                path.to_string_lossy().red().bold()
            )
        })?;

    info!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );

    PixelBuffer::from_image(&image).with_context(|| {
        format!(
            "Image has no usable pixel data: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 输出文件已存在时，只有在 `force` 为真时才允许继续。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 在 `source` 所在目录下生成 `<prefix><文件名主干>.<extension>`。
fn default_path(source: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();

    source.with_file_name(format!("{prefix}{stem}.{extension}"))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
