//! Icon builder
//!
//! Decodes a source raster image, resamples it to every requested square
//! size and writes all frames into one ICO file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageError, ImageReader};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::IconError;
use crate::ico::{IconDir, IconFrame};
use crate::sizes::validate_sizes;

/// Interpolation used when scaling the source to each frame size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Everything needed to produce one icon file
#[derive(Debug, Clone)]
pub struct IconJob {
    pub source: PathBuf,
    pub output: PathBuf,
    pub sizes: Vec<u32>,
    pub filter: ResampleFilter,
}

/// What was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconReport {
    pub output: PathBuf,
    pub frame_sizes: Vec<u32>,
    pub bytes_written: usize,
}

impl IconJob {
    pub fn run(&self) -> Result<IconReport, IconError> {
        build_icon(&self.source, &self.output, &self.sizes, self.filter)
    }
}

/// Build an ICO at `output` with one frame per entry in `sizes`.
///
/// Nothing is written unless decoding and encoding of every frame succeed.
pub fn build_icon(
    source: &Path,
    output: &Path,
    sizes: &[u32],
    filter: ResampleFilter,
) -> Result<IconReport, IconError> {
    validate_sizes(sizes)?;

    let image = decode_source(source)?;
    info!(
        "Decoded {} ({}x{})",
        source.display(),
        image.width(),
        image.height()
    );

    let bytes = encode_icon(&image, sizes, filter)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IconError::Write {
            path: output.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(output, &bytes).map_err(|e| IconError::Write {
        path: output.to_path_buf(),
        source: e,
    })?;

    info!(
        "Wrote {} ({} frames, {} bytes)",
        output.display(),
        sizes.len(),
        bytes.len()
    );

    Ok(IconReport {
        output: output.to_path_buf(),
        frame_sizes: sizes.to_vec(),
        bytes_written: bytes.len(),
    })
}

/// Resample `image` to each size and serialize the resulting container
pub fn encode_icon(
    image: &DynamicImage,
    sizes: &[u32],
    filter: ResampleFilter,
) -> Result<Vec<u8>, IconError> {
    validate_sizes(sizes)?;

    let mut dir = IconDir::new();
    for &size in sizes {
        dir.push(render_frame(image, size, filter)?);
    }
    dir.to_bytes()
}

/// Decode by content, so a PNG with a misleading extension still loads
fn decode_source(path: &Path) -> Result<DynamicImage, IconError> {
    let decode_err = |source: ImageError| IconError::Decode {
        path: path.to_path_buf(),
        source,
    };

    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| decode_err(ImageError::IoError(e)))?
        .decode()
        .map_err(decode_err)
}

fn render_frame(
    image: &DynamicImage,
    size: u32,
    filter: ResampleFilter,
) -> Result<IconFrame, IconError> {
    let rgba = if image.width() == size && image.height() == size {
        image.to_rgba8()
    } else {
        image.resize_exact(size, size, filter.into()).to_rgba8()
    };

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(rgba.as_raw(), size, size, ExtendedColorType::Rgba8)
        .map_err(|source| IconError::Encode { size, source })?;

    debug!("Encoded {}x{} frame ({} bytes)", size, size, png.len());
    Ok(IconFrame { size, png })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ico::IconDir;
    use crate::sizes::DEFAULT_SIZES;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn default_sizes_from_512_source() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_png(tmp.path(), "icon.png", 512, 512);
        let output = tmp.path().join("icon.ico");

        let report =
            build_icon(&source, &output, &DEFAULT_SIZES, ResampleFilter::Lanczos3).unwrap();
        assert_eq!(report.frame_sizes, DEFAULT_SIZES.to_vec());

        let bytes = fs::read(&output).unwrap();
        assert_eq!(report.bytes_written, bytes.len());

        let frames = IconDir::parse(&bytes).unwrap();
        assert_eq!(frames.len(), 9);
        for (frame, &size) in frames.iter().zip(DEFAULT_SIZES.iter()) {
            assert_eq!((frame.width, frame.height), (size, size));
        }
    }

    #[test]
    fn non_square_source_is_stretched_to_square() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_png(tmp.path(), "wide.png", 64, 20);
        let output = tmp.path().join("wide.ico");

        build_icon(&source, &output, &[32], ResampleFilter::Triangle).unwrap();
        let frames = IconDir::parse(&fs::read(&output).unwrap()).unwrap();
        assert_eq!((frames[0].width, frames[0].height), (32, 32));
    }

    #[test]
    fn duplicates_give_redundant_frames() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_png(tmp.path(), "icon.png", 40, 40);
        let output = tmp.path().join("dup.ico");

        build_icon(&source, &output, &[16, 16, 24], ResampleFilter::Nearest).unwrap();
        let frames = IconDir::parse(&fs::read(&output).unwrap()).unwrap();
        let widths: Vec<u32> = frames.iter().map(|f| f.width).collect();
        assert_eq!(widths, vec![16, 16, 24]);
    }

    #[test]
    fn missing_source_is_decode_error_and_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("icon.ico");
        let missing = tmp.path().join("nope.png");

        let err = build_icon(&missing, &output, &[16], ResampleFilter::default()).unwrap_err();
        assert!(matches!(err, IconError::Decode { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn corrupt_source_is_decode_error() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("broken.png");
        fs::write(&source, b"\x89PNG\r\n\x1a\nnot really").unwrap();
        let output = tmp.path().join("icon.ico");

        let err = build_icon(&source, &output, &[16], ResampleFilter::default()).unwrap_err();
        assert!(matches!(err, IconError::Decode { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn zero_size_fails_before_reading_anything() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("icon.ico");

        // Source does not exist: size validation must win
        let missing = tmp.path().join("nope.png");
        let err = build_icon(&missing, &output, &[16, 0], ResampleFilter::default()).unwrap_err();
        assert!(matches!(err, IconError::InvalidSize(0)));
        assert!(!output.exists());
    }

    #[test]
    fn oversized_frame_is_rejected_before_allocating() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_png(tmp.path(), "icon.png", 16, 16);
        let output = tmp.path().join("icon.ico");

        let err = build_icon(&source, &output, &[70000], ResampleFilter::Nearest).unwrap_err();
        assert!(matches!(err, IconError::SizeTooLarge { size: 70000, .. }));
        assert!(!output.exists());
    }

    #[test]
    fn unwritable_output_is_write_error() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_png(tmp.path(), "icon.png", 16, 16);
        // A regular file where a directory is needed
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        let err = build_icon(&source, &blocker.join("icon.ico"), &[16], ResampleFilter::default())
            .unwrap_err();
        assert!(matches!(err, IconError::Write { .. }));
    }

    #[test]
    fn creates_missing_output_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_png(tmp.path(), "icon.png", 16, 16);
        let output = tmp.path().join("assets").join("nested").join("icon.ico");

        build_icon(&source, &output, &[16], ResampleFilter::default()).unwrap();
        assert!(output.is_file());
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_png(tmp.path(), "icon.png", 100, 100);
        let output = tmp.path().join("icon.ico");

        build_icon(&source, &output, &[16, 48, 128], ResampleFilter::Lanczos3).unwrap();
        let first = fs::read(&output).unwrap();
        build_icon(&source, &output, &[16, 48, 128], ResampleFilter::Lanczos3).unwrap();
        assert_eq!(first, fs::read(&output).unwrap());
    }

    #[test]
    fn filter_names_match_config_spelling() {
        let parsed: ResampleFilter = serde_json::from_str("\"catmull-rom\"").unwrap();
        assert_eq!(parsed, ResampleFilter::CatmullRom);
        assert_eq!(serde_json::to_string(&ResampleFilter::Lanczos3).unwrap(), "\"lanczos3\"");
    }
}
