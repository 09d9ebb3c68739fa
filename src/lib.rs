//! # stegtext 库
//!
//! 本库包含 LSB 文本隐写工具的核心逻辑：
//!
//! * [`steganography`]：编码器与解码器，纯函数，不做任何 I/O。
//! * [`pixels`]：RGB 像素缓冲区及其与 `image` crate 的转换。
//! * [`cli`] 与 [`handler`]：命令行外壳，负责文件读写与结果报告。

pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod pixels;
pub mod steganography;

pub use error::{DecodeError, Result, StegoError};
pub use pixels::PixelBuffer;
pub use steganography::{decode, decode_text, decode_utf8, encode, encode_text};
