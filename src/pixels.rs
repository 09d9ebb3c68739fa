//! # 像素缓冲区模块
//!
//! 隐写核心只处理 `PixelBuffer`：按行优先、通道次序 (R, G, B) 展平的 8 位样本序列。
//! 本模块负责它与 `image` crate 类型之间的转换，Alpha 通道在此处被丢弃。

use crate::constants::{BITS_PER_BYTE, CHANNELS_PER_PIXEL, LENGTH_FIELD_BITS};
use crate::error::{Result, StegoError};
use image::{DynamicImage, RgbImage};

/// 一张 RGB 图像的展平像素数据。
///
/// 长度恒等于 `width * height * 3`，尺寸均不为零。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// 由原始 RGB 样本构造缓冲区。
    ///
    /// # Errors
    ///
    /// 尺寸为零或样本数量与 `width * height * 3` 不符时返回
    /// [`StegoError::InvalidDimensions`]。
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(CHANNELS_PER_PIXEL));

        match expected {
            Some(expected) if expected > 0 && expected == samples.len() => Ok(Self {
                width,
                height,
                samples,
            }),
            _ => Err(StegoError::InvalidDimensions {
                width,
                height,
                expected: expected.unwrap_or(usize::MAX),
                len: samples.len(),
            }),
        }
    }

    /// 将任意已解码图像展平为 RGB 缓冲区，丢弃 Alpha 通道。
    ///
    /// 高于 8 位的通道会被转换为 8 位。
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        Self::from_rgb(image.to_rgb8())
    }

    pub fn from_rgb(image: RgbImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }

    /// 转换回 `image` crate 的 RGB 图像，供调用方以无损格式保存。
    pub fn into_image(self) -> Result<RgbImage> {
        let (width, height, len) = (self.width, self.height, self.samples.len());
        RgbImage::from_raw(width, height, self.samples).ok_or(StegoError::InvalidDimensions {
            width,
            height,
            expected: (width as usize) * (height as usize) * CHANNELS_PER_PIXEL,
            len,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    /// 可嵌入的总位数，即载体字节的数量 (`3 * width * height`)。
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// 在扣除长度字段后，最多能隐藏的消息字节数。
    pub fn max_message_len(&self) -> usize {
        max_message_len(self.capacity())
    }
}

/// 给定载体字节数时，最多能隐藏的消息字节数。
pub fn max_message_len(capacity: usize) -> usize {
    capacity.saturating_sub(LENGTH_FIELD_BITS) / BITS_PER_BYTE
}
