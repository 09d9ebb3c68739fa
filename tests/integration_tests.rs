use image::{ImageBuffer, Rgba};
use rand::RngCore;
use stegtext::{
    PixelBuffer,
    cli::{CapacityArgs, HideArgs, RecoverArgs},
    handler::{handle_capacity, handle_hide, handle_recover},
};
use std::fs;
use std::path::Path;
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
            *pixel = Rgba([chunk[0], chunk[1], chunk[2], chunk[3]]);
        });

    img_buf.save(path).expect("Failed to create test image.");
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
    let original_text = "This is a test message for the handler! 这是一个给处理器的测试信息！";
    fs::write(&source_text_path, original_text)?;

    // 2. 测试 handle_hide
    let hide_args = HideArgs {
        image: original_image_path.clone(),
        text: source_text_path.clone(),
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

/// 验证输出为 RGB PNG，且只有最低位被改动
#[test]
fn test_hidden_image_is_rgb_png_with_lsb_changes_only() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let hidden_image_path = dir.path().join("hidden.png");
    let source_text_path = dir.path().join("source.txt");

    create_test_image(&original_image_path, 40, 30);
    fs::write(&source_text_path, "lsb only")?;

    handle_hide(HideArgs {
        image: original_image_path.clone(),
        text: source_text_path,
        dest: Some(hidden_image_path.clone()),
        force: false,
    })?;

    let original = PixelBuffer::from_image(&image::open(&original_image_path)?)?;
    let hidden_image = image::open(&hidden_image_path)?;
    assert_eq!(hidden_image.color(), image::ColorType::Rgb8);

    let hidden = PixelBuffer::from_image(&hidden_image)?;
    assert_eq!(original.capacity(), hidden.capacity());
    for (a, b) in original.samples().iter().zip(hidden.samples()) {
        assert_eq!(a >> 1, b >> 1);
    }
    assert_eq!(stegtext::decode(&hidden)?, b"lsb only");

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并完成操作
#[test]
fn test_handle_hide_and_recover_with_defaults() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let source_text_path = dir.path().join("source.txt");

    create_test_image(&original_image_path, 100, 100);
    let original_text = "Testing default path generation. 测试默认路径生成。";
    fs::write(&source_text_path, original_text)?;

    // 2. 测试 handle_hide，不提供 dest 路径
    let hide_args = HideArgs {
        image: original_image_path.clone(),
        text: source_text_path.clone(),
        dest: None,
        force: false,
    };
    handle_hide(hide_args)?;

    let expected_hidden_path = dir.path().join("doctored_original.png");
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

    let expected_recovered_path = dir.path().join("recovered_doctored_original.txt");
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

/// 非 PNG 输入 (BMP) 的默认输出仍然是 PNG
#[test]
fn test_default_output_is_png_for_bmp_input() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let original_image_path = dir.path().join("cover.bmp");
    let source_text_path = dir.path().join("source.txt");

    create_test_image(&original_image_path, 32, 32);
    fs::write(&source_text_path, "from a bitmap")?;

    handle_hide(HideArgs {
        image: original_image_path,
        text: source_text_path,
        dest: None,
        force: false,
    })?;

    let hidden = PixelBuffer::from_image(&image::open(dir.path().join("doctored_cover.png"))?)?;
    assert_eq!(stegtext::decode(&hidden)?, b"from a bitmap");

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let text_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("dest.png");

    create_test_image(&image_path, 50, 50);
    fs::write(&text_path, "some text")?;

    // 2. 场景一：测试覆盖保护
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;
    assert!(dest_path.exists());

    let hide_args_no_force = HideArgs {
        image: image_path.clone(),
        text: text_path.clone(),
        dest: Some(dest_path.clone()),
        force: false,
    };

    let result = handle_hide(hide_args_no_force);
    assert!(
        result.is_err(),
        "Execution should fail without --force when file exists."
    );
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    let hide_args_with_force = HideArgs {
        image: image_path.clone(),
        text: text_path.clone(),
        dest: Some(dest_path.clone()),
        force: true,
    };

    let result = handle_hide(hide_args_with_force);
    assert!(
        result.is_ok(),
        "Execution should succeed with --force when file exists."
    );

    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    // 4. 场景三：恢复时同样受覆盖保护
    let recovered_path = dir.path().join("recovered.txt");
    fs::write(&recovered_path, "keep me")?;

    let result = handle_recover(RecoverArgs {
        image: dest_path.clone(),
        text: Some(recovered_path.clone()),
        force: false,
    });
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&recovered_path)?, "keep me");

    handle_recover(RecoverArgs {
        image: dest_path,
        text: Some(recovered_path.clone()),
        force: true,
    })?;
    assert_eq!(fs::read_to_string(&recovered_path)?, "some text");

    Ok(())
}

/// 验证空间不足时的错误处理
#[test]
fn test_handle_hide_not_enough_space() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("small.png");
    let text_path = dir.path().join("large.txt");
    let dest_path = dir.path().join("dest.png");

    create_test_image(&image_path, 10, 10);
    fs::write(&text_path, "a".repeat(34))?;

    // 2. 执行并断言错误
    let hide_args = HideArgs {
        image: image_path,
        text: text_path,
        dest: Some(dest_path.clone()),
        force: false,
    };
    let result = handle_hide(hide_args);

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Not enough space"));
    }
    assert!(!dest_path.exists(), "No output may be written on failure.");

    Ok(())
}

/// 有损或非 PNG 的输出路径必须被拒绝
#[test]
fn test_handle_hide_rejects_non_png_destination() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let text_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("dest.jpg");

    create_test_image(&image_path, 20, 20);
    fs::write(&text_path, "lossy would eat this")?;

    let result = handle_hide(HideArgs {
        image: image_path,
        text: text_path,
        dest: Some(dest_path.clone()),
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("must be a PNG file"));
    }
    assert!(!dest_path.exists());

    Ok(())
}

/// 从未隐写过的图像中恢复：声明长度越界时报错，且不产生输出文件
#[test]
fn test_handle_recover_without_hidden_message() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("plain.png");
    let text_path = dir.path().join("out.txt");

    // 全白图像：所有最低位为 1，长度字段远超容量
    ImageBuffer::from_pixel(8, 8, image::Rgb([255u8, 255, 255])).save(&image_path)?;

    let result = handle_recover(RecoverArgs {
        image: image_path,
        text: Some(text_path.clone()),
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("No hidden message found"));
    }
    assert!(!text_path.exists());

    Ok(())
}

#[test]
fn test_handle_capacity() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    create_test_image(&image_path, 10, 10);

    handle_capacity(CapacityArgs {
        image: image_path.clone(),
    })?;

    assert!(
        handle_capacity(CapacityArgs {
            image: dir.path().join("missing.png"),
        })
        .is_err()
    );

    Ok(())
}

/// 全黑图像的长度字段为零，不能被当作成功恢复
#[test]
fn test_handle_recover_black_image_reports_no_message() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("black.png");
    let text_path = dir.path().join("out.txt");

    ImageBuffer::from_pixel(8, 8, image::Rgb([0u8, 0, 0])).save(&image_path)?;

    let result = handle_recover(RecoverArgs {
        image: image_path,
        text: Some(text_path.clone()),
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("No hidden message found"));
    }
    assert!(!text_path.exists(), "No output may be written on failure.");

    Ok(())
}

/// 空文本文件没有可隐藏的内容
#[test]
fn test_handle_hide_rejects_empty_text() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let text_path = dir.path().join("empty.txt");
    let dest_path = dir.path().join("dest.png");

    create_test_image(&image_path, 20, 20);
    fs::write(&text_path, "")?;

    let result = handle_hide(HideArgs {
        image: image_path,
        text: text_path,
        dest: Some(dest_path.clone()),
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Text file is empty"));
    }
    assert!(!dest_path.exists());

    Ok(())
}
