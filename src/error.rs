//! # 错误类型模块
//!
//! 隐写核心只会产生这里定义的错误。命令行层再通过 `anyhow` 为它们附加上下文。

use thiserror::Error;

/// 隐写核心的统一错误类型。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StegoError {
    /// 图像的载体字节不足以容纳长度字段和消息。
    #[error("Not enough space in the image: required {required} bits, available {available} bits")]
    Capacity { required: usize, available: usize },

    /// 无法从像素数据中还原出消息。
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// 原始像素数据与给定尺寸不符，或尺寸为零。
    #[error("Invalid pixel buffer: {width}x{height} RGB needs {expected} bytes, got {len}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        expected: usize,
        len: usize,
    },

    /// 文本中包含无法用单个字节表示的字符。
    #[error("Character {ch:?} at index {index} cannot be encoded as a single byte")]
    UnencodableCharacter { ch: char, index: usize },

    /// 单次读写的位数超过了 `u64` 的宽度。
    #[error("Attempted to access {bits} bits at once, more than 64")]
    FieldTooWide { bits: usize },
}

/// 解码阶段的错误。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// 载体字节连长度字段都放不下。
    #[error("Image holds only {available} carrier samples, fewer than the length field needs")]
    Truncated { available: usize },

    /// 长度字段声明的位数超出了剩余的载体字节。
    #[error("Declared payload of {declared} bits exceeds the {available} carrier samples left")]
    LengthOverflow { declared: usize, available: usize },

    /// 长度字段不是 8 的倍数，不可能由编码器写入。
    #[error("Declared payload of {0} bits is not a whole number of bytes")]
    UnalignedLength(usize),

    /// 恢复出的字节不是合法的 UTF-8 文本。
    #[error("Recovered bytes are not valid UTF-8 text")]
    InvalidText,
}

pub type Result<T> = std::result::Result<T, StegoError>;
