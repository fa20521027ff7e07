use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// 3×3 Gaussian smoothing, applied separably.
const BLUR_KERNEL: [f32; 3] = [0.25, 0.5, 0.25];
/// Side of the neighbourhood the local threshold is computed over.
const THRESHOLD_BLOCK: usize = 11;
/// Subtracted from the local mean; pixels must be darker than `mean - bias` to be ink.
const THRESHOLD_BIAS: i32 = 2;
/// Chebyshev radius of the closing element; 0 is a 1×1 square.
const CLOSE_RADIUS: u8 = 0;

const INK: u8 = 0;
const PAPER: u8 = 255;

/// Decode raw image bytes (JPEG / PNG / WEBP / …).
pub fn decode(data: &[u8]) -> Result<DynamicImage, PreprocessError> {
    Ok(image::load_from_memory(data)?)
}

/// Grayscale → 3×3 blur → adaptive threshold → closing.
///
/// The result is strictly two-valued and keeps the input dimensions. Callers
/// must not pass an empty image.
pub fn normalize(img: DynamicImage) -> GrayImage {
    let gray = to_single_channel(img);
    let smoothed = gaussian_blur3(&gray);
    let binary = adaptive_threshold(&smoothed, THRESHOLD_BLOCK, THRESHOLD_BIAS);
    morphology::close(&binary, Norm::LInf, CLOSE_RADIUS)
}

pub fn encode_png(img: &GrayImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

fn to_single_channel(img: DynamicImage) -> GrayImage {
    match img {
        DynamicImage::ImageLuma8(gray) => gray,
        other => other.to_luma8(),
    }
}

fn gaussian_blur3(img: &GrayImage) -> GrayImage {
    let smoothed = convolve_separable(img, &BLUR_KERNEL);
    let width = img.width() as usize;
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let v = smoothed[y as usize * width + x as usize];
        Luma([v.round().clamp(0.0, 255.0) as u8])
    })
}

/// Binarize against a Gaussian-weighted local mean so shadows and glare only
/// shift the threshold instead of swallowing the text.
fn adaptive_threshold(img: &GrayImage, block: usize, bias: i32) -> GrayImage {
    let mean = convolve_separable(img, &gaussian_kernel(block));
    let width = img.width() as usize;
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let local = mean[y as usize * width + x as usize].round() as i32;
        let px = img.get_pixel(x, y)[0] as i32;
        Luma([if px - local > -bias { PAPER } else { INK }])
    })
}

/// Sampled Gaussian of odd `size`, sigma derived from the size.
fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Row pass then column pass; samples outside the image repeat the edge pixel.
fn convolve_separable(img: &GrayImage, kernel: &[f32]) -> Vec<f32> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let radius = (kernel.len() / 2) as isize;
    let src: Vec<f32> = img.as_raw().iter().map(|&p| p as f32).collect();
    let at = |i: usize, offset: usize, len: usize| -> usize {
        (i as isize + offset as isize - radius).clamp(0, len as isize - 1) as usize
    };

    let mut rows = vec![0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            rows[y * w + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| weight * src[y * w + at(x, k, w)])
                .sum();
        }
    }

    let mut out = vec![0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            out[y * w + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| weight * rows[at(y, k, h) * w + x])
                .sum();
        }
    }
    out
}
