/// 每个像素参与隐写的通道数 (R, G, B)。
/// Alpha 通道在进入隐写流程之前就已被丢弃。
pub const CHANNELS_PER_PIXEL: usize = 3;

/// 长度字段占用的位数。
/// 长度以大端序 `u32` 存储，每个载体字节的最低位存放 1 bit，
/// 因此长度字段固定占用前 32 个载体字节。
pub const LENGTH_FIELD_BITS: usize = 32;

/// 每个消息字节占用的位数 (最高位在前)。
pub const BITS_PER_BYTE: usize = 8;

/// 载体字节中用于隐写的位。
pub const LSB_MASK: u8 = 0b0000_0001;

/// 载体字节中必须保持不变的高 7 位。
pub const CARRIER_MASK: u8 = 0b1111_1110;

/// 未指定输出路径时，隐写图像文件名的前缀。
pub const HIDDEN_IMAGE_PREFIX: &str = "doctored_";

/// 未指定输出路径时，恢复文本文件名的前缀。
pub const RECOVERED_TEXT_PREFIX: &str = "recovered_";

/// 恢复文本文件的默认扩展名。
pub const RECOVERED_TEXT_EXTENSION: &str = "txt";

/// 隐写结果唯一允许的容器格式扩展名 (无损)。
pub const OUTPUT_IMAGE_EXTENSION: &str = "png";
