//! # LSB 隐写核心
//!
//! 载体布局 (编码器与解码器必须完全一致)：
//!
//! ```text
//! 样本索引:  0 ............ 31 | 32 ...................... 32 + 8n - 1
//! 内容:      长度字段 (u32, 大端) | 消息字节 0..n，每字节最高位在前
//! ```
//!
//! 每个载体样本只使用最低位，高 7 位保持不变。样本按 R, G, B, R, G, B … 连续使用，
//! 不跳过任何位置。

use crate::constants::{BITS_PER_BYTE, CARRIER_MASK, LENGTH_FIELD_BITS, LSB_MASK};
use crate::error::{DecodeError, Result, StegoError};
use crate::pixels::PixelBuffer;
use log::{debug, trace};

/// 将 `value` 的低 `bits` 位 (最高位在前) 写入 `pix[dix..dix + bits]` 各字节的最低位。
///
/// # Errors
///
/// * `bits` 大于 64 时返回 [`StegoError::FieldTooWide`]。
/// * 目标区域超出 `pix` 时返回 [`StegoError::Capacity`]。
///
/// 出错时 `pix` 不会被修改。
pub fn modify(value: u64, pix: &mut [u8], dix: usize, bits: usize) -> Result<()> {
    check_width(bits)?;

    let end = dix
        .checked_add(bits)
        .filter(|&end| end <= pix.len())
        .ok_or(StegoError::Capacity {
            required: dix.saturating_add(bits),
            available: pix.len(),
        })?;

    for (i, byte) in pix[dix..end].iter_mut().enumerate() {
        let bit = ((value >> (bits - 1 - i)) as u8) & LSB_MASK;
        *byte = (*byte & CARRIER_MASK) | bit;
    }

    Ok(())
}

/// 从 `pix[dix..dix + bits]` 各字节的最低位读出一个整数 (最高位在前)。
///
/// # Errors
///
/// * `bits` 大于 64 时返回 [`StegoError::FieldTooWide`]。
/// * 读取区域超出 `pix` 时返回 [`DecodeError::LengthOverflow`]。
pub fn recover(pix: &[u8], dix: usize, bits: usize) -> Result<u64> {
    check_width(bits)?;

    let end = dix
        .checked_add(bits)
        .filter(|&end| end <= pix.len())
        .ok_or(DecodeError::LengthOverflow {
            declared: bits,
            available: pix.len().saturating_sub(dix),
        })?;

    Ok(pix[dix..end]
        .iter()
        .fold(0u64, |acc, &byte| (acc << 1) | u64::from(byte & LSB_MASK)))
}

fn check_width(bits: usize) -> Result<()> {
    if bits > u64::BITS as usize {
        return Err(StegoError::FieldTooWide { bits });
    }
    Ok(())
}

/// 完整比特流 (长度字段 + 消息) 需要的载体样本数。
pub fn required_bits(message_len: usize) -> Option<usize> {
    message_len
        .checked_mul(BITS_PER_BYTE)
        .and_then(|payload| payload.checked_add(LENGTH_FIELD_BITS))
}

/// 将 `message` 隐藏到 `pixels` 的副本中并返回该副本。
///
/// 容量检查先于任何写入，输入缓冲区永远不会被修改。
///
/// # Errors
///
/// 长度字段加消息超出载体样本数时返回 [`StegoError::Capacity`]。
pub fn encode(pixels: &PixelBuffer, message: &[u8]) -> Result<PixelBuffer> {
    let available = pixels.capacity();

    // 负载位数必须能写进 32 位长度字段。
    let required = required_bits(message.len())
        .filter(|&bits| u32::try_from(bits - LENGTH_FIELD_BITS).is_ok())
        .ok_or(StegoError::Capacity {
            required: usize::MAX,
            available,
        })?;

    if required > available {
        return Err(StegoError::Capacity {
            required,
            available,
        });
    }

    let payload_bits = required - LENGTH_FIELD_BITS;
    debug!(
        "Embedding {} payload bits into {} of {} carrier samples",
        payload_bits, required, available
    );

    let mut encoded = pixels.clone();
    let samples = encoded.samples_mut();

    modify(payload_bits as u64, samples, 0, LENGTH_FIELD_BITS)?;

    message.iter().enumerate().try_for_each(|(i, &byte)| {
        trace!("byte {i}: {byte:#04x}");
        modify(
            u64::from(byte),
            samples,
            LENGTH_FIELD_BITS + BITS_PER_BYTE * i,
            BITS_PER_BYTE,
        )
    })?;

    Ok(encoded)
}

/// 按单字节字符 (码点 0..=255) 隐藏文本。
///
/// # Errors
///
/// 文本包含码点大于 255 的字符时返回 [`StegoError::UnencodableCharacter`]，
/// 否则同 [`encode`]。
pub fn encode_text(pixels: &PixelBuffer, text: &str) -> Result<PixelBuffer> {
    let bytes = text
        .chars()
        .enumerate()
        .map(|(index, ch)| {
            u8::try_from(ch).map_err(|_| StegoError::UnencodableCharacter { ch, index })
        })
        .collect::<Result<Vec<u8>>>()?;

    encode(pixels, &bytes)
}

/// 从 `pixels` 中读出长度字段，并据此还原被隐藏的字节。
///
/// 未经隐写的图像没有任何校验信息：长度字段要么越界而报错，要么得到无意义的字节。
///
/// # Errors
///
/// * 载体样本少于 32 个时返回 [`DecodeError::Truncated`]。
/// * 声明的长度超出剩余样本时返回 [`DecodeError::LengthOverflow`]。
/// * 声明的长度不是 8 的倍数时返回 [`DecodeError::UnalignedLength`]。
pub fn decode(pixels: &PixelBuffer) -> Result<Vec<u8>> {
    let samples = pixels.samples();
    let available = samples.len();

    if available < LENGTH_FIELD_BITS {
        return Err(DecodeError::Truncated { available }.into());
    }

    let declared = recover(samples, 0, LENGTH_FIELD_BITS)? as usize;
    let remaining = available - LENGTH_FIELD_BITS;
    debug!("Length field declares {declared} payload bits, {remaining} carrier samples remain");

    if declared > remaining {
        return Err(DecodeError::LengthOverflow {
            declared,
            available: remaining,
        }
        .into());
    }

    if declared % BITS_PER_BYTE != 0 {
        return Err(DecodeError::UnalignedLength(declared).into());
    }

    (0..declared / BITS_PER_BYTE)
        .map(|i| {
            recover(
                samples,
                LENGTH_FIELD_BITS + BITS_PER_BYTE * i,
                BITS_PER_BYTE,
            )
            .map(|value| value as u8)
        })
        .collect()
}

/// [`encode_text`] 的对偶操作：每个字节还原为同码点的字符。
pub fn decode_text(pixels: &PixelBuffer) -> Result<String> {
    Ok(decode(pixels)?.into_iter().map(char::from).collect())
}

/// 严格模式：要求恢复出的字节是合法的 UTF-8。
///
/// # Errors
///
/// 字节不是 UTF-8 时返回 [`DecodeError::InvalidText`]，否则同 [`decode`]。
pub fn decode_utf8(pixels: &PixelBuffer) -> Result<String> {
    String::from_utf8(decode(pixels)?).map_err(|_| DecodeError::InvalidText.into())
}
