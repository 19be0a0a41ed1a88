//! # 解码与缩放流水线模块
//!
//! ## 设计思路
//!
//! 缓存文件下载完成后，在本地按目标尺寸等比缩放并原地覆盖。
//! 缩放方向由宽高比决定：目标比原图“更窄”时按高度缩放，否则按宽度缩放，
//! 因此输出始终保持原图宽高比。
//!
//! ## 实现思路
//!
//! 1. 读取文件并猜测格式
//! 2. 只读文件头取得尺寸，先做像素上限校验，再完整解码
//! 3. 计算缩放后尺寸，输出同样受像素上限约束
//! 4. `fast_image_resize` 双三次（Catmull-Rom）重采样，失败时回退 `image::resize_exact`
//! 5. 按缓存路径扩展名写回（无法识别时沿用输入格式），不支持透明通道的格式先转 RGB8

use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, ImageReader, Rgba};

use super::ImageError;

/// 缩放所依据的轴。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAxis {
    Width,
    Height,
}

/// 比较宽高比（宽 / 高）选择缩放轴。
pub fn scale_axis(image_ratio: f64, target_ratio: f64) -> ScaleAxis {
    if target_ratio < image_ratio {
        ScaleAxis::Height
    } else {
        ScaleAxis::Width
    }
}

/// 等比缩放后的尺寸。
pub fn scaled_dimensions(image: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (img_w, img_h) = (u64::from(image.0.max(1)), u64::from(image.1.max(1)));
    let (target_w, target_h) = (u64::from(target.0), u64::from(target.1));

    let image_ratio = img_w as f64 / img_h as f64;
    let target_ratio = target_w as f64 / target_h.max(1) as f64;

    let (w, h) = match scale_axis(image_ratio, target_ratio) {
        ScaleAxis::Height => (img_w * target_h / img_h, target_h),
        ScaleAxis::Width => (target_w, img_h * target_w / img_w),
    };

    let clamp = |v: u64| u32::try_from(v).unwrap_or(u32::MAX).max(1);
    (clamp(w), clamp(h))
}

/// 校验像素数量是否超过上限。
pub fn validate_pixel_limits(width: u32, height: u32, max_pixels: u64) -> Result<(), ImageError> {
    let pixels = u64::from(width)
        .checked_mul(u64::from(height))
        .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > max_pixels {
        return Err(ImageError::ResourceLimit(format!(
            "图片像素过大：{}x{} = {} 像素（限制：{} 像素）",
            width, height, pixels, max_pixels
        )));
    }

    Ok(())
}

fn inspect_dimensions(bytes: &[u8], format: ImageFormat) -> Result<(u32, u32), ImageError> {
    ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|e| ImageError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

fn supports_alpha(format: ImageFormat) -> bool {
    !matches!(format, ImageFormat::Jpeg | ImageFormat::Pnm | ImageFormat::Hdr)
}

/// 原地缩放缓存文件，返回输出尺寸。
///
/// 原图与输出的像素数都不得超过 `max_pixels`，否则返回 `ResourceLimit`。
pub fn resize_in_place(
    path: &Path,
    target: (u32, u32),
    max_pixels: u64,
) -> Result<(u32, u32), ImageError> {
    let started = Instant::now();

    let bytes = std::fs::read(path)
        .map_err(|e| ImageError::FileSystem(format!("无法读取 {}：{}", path.display(), e)))?;
    let input_format = image::guess_format(&bytes)
        .map_err(|e| ImageError::InvalidFormat(format!("不支持的图片格式：{}", e)))?;

    let (header_width, header_height) = inspect_dimensions(&bytes, input_format)?;
    validate_pixel_limits(header_width, header_height, max_pixels)?;

    let decoded = image::load_from_memory_with_format(&bytes, input_format)
        .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;
    drop(bytes);
    let decode_ms = started.elapsed().as_millis();

    let (raw_width, raw_height) = decoded.dimensions();
    let (width, height) = scaled_dimensions((raw_width, raw_height), target);
    validate_pixel_limits(width, height, max_pixels)?;

    let resized = match resize_with_fast_image_resize(&decoded, width, height) {
        Ok(resized) => resized,
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize_exact：{}", err);
            decoded.resize_exact(width, height, FilterType::CatmullRom)
        }
    };

    let output_format = ImageFormat::from_path(path).unwrap_or(input_format);
    let output = if decoded.color().has_alpha() && supports_alpha(output_format) {
        resized
    } else {
        DynamicImage::ImageRgb8(resized.to_rgb8())
    };

    output
        .save_with_format(path, output_format)
        .map_err(|e| ImageError::FileSystem(format!("写回缓存失败：{}", e)))?;

    log::info!(
        "✅ 图片缩放完成 - 原始尺寸: {}x{} 输出尺寸: {}x{}（decode={}ms, total={}ms）",
        raw_width,
        raw_height,
        width,
        height,
        decode_ms,
        started.elapsed().as_millis()
    );

    Ok((width, height))
}

fn resize_with_fast_image_resize(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
) -> Result<DynamicImage, ImageError> {
    let src = image.to_rgba8();
    let (src_width, src_height) = src.dimensions();

    let src_image =
        fr::images::Image::from_vec_u8(src_width, src_height, src.into_raw(), fr::PixelType::U8x4)
            .map_err(|e| ImageError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ImageError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    let rgba =
        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| ImageError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))?;

    Ok(DynamicImage::ImageRgba8(rgba))
}
