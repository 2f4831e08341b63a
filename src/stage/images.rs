//! Image stage: recompress PNG, JPEG and SVG, copy everything else.
//!
//! An optimized encoding that is not smaller than the source is
//! discarded and the original bytes are kept.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};

use super::{Artifact, StageContext, StageError, read};
use crate::fileset::SourceFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageKind {
    Png,
    Jpeg,
    Svg,
    Other,
}

impl ImageKind {
    fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Self::Png,
            Some("jpg" | "jpeg") => Self::Jpeg,
            Some("svg") => Self::Svg,
            _ => Self::Other,
        }
    }
}

pub fn run(files: &[SourceFile], ctx: &StageContext<'_>) -> Result<Vec<Artifact>, StageError> {
    let mut artifacts = Vec::with_capacity(files.len());
    for file in files {
        let original = read(&file.path)?;
        let optimized = optimize(&file.path, &original, ctx.jpeg_quality)?;
        let bytes = match optimized {
            Some(smaller) if smaller.len() < original.len() => {
                crate::debug!(
                    "images";
                    "{}: {} -> {} bytes",
                    file.rel.display(),
                    original.len(),
                    smaller.len()
                );
                smaller
            }
            _ => original,
        };
        artifacts.push(Artifact::new(ctx.output.join(&file.rel), bytes));
    }
    Ok(artifacts)
}

/// Re-encode `bytes`. `None` means the format is copied as is.
fn optimize(path: &Path, bytes: &[u8], jpeg_quality: u8) -> Result<Option<Vec<u8>>, StageError> {
    let image_err = |source| StageError::Image {
        path: path.to_path_buf(),
        source,
    };

    match ImageKind::from_path(path) {
        ImageKind::Png => {
            let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
                .map_err(image_err)?;
            let mut out = Vec::new();
            let encoder =
                PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
            img.write_with_encoder(encoder).map_err(image_err)?;
            Ok(Some(out))
        }
        ImageKind::Jpeg => {
            let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
                .map_err(image_err)?;
            // The JPEG encoder only takes 8-bit luma or rgb.
            let img = match img {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
                other => DynamicImage::ImageRgb8(other.to_rgb8()),
            };
            let mut out = Vec::new();
            let encoder = JpegEncoder::new_with_quality(&mut out, jpeg_quality);
            img.write_with_encoder(encoder).map_err(image_err)?;
            Ok(Some(out))
        }
        // usvg is built without text shaping and would drop <text> nodes
        ImageKind::Svg if has_text(bytes) => Ok(None),
        ImageKind::Svg => {
            let tree = usvg::Tree::from_data(bytes, &usvg::Options::default()).map_err(|e| {
                StageError::Svg {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?;
            let write_options = usvg::WriteOptions {
                indent: usvg::Indent::None,
                ..Default::default()
            };
            Ok(Some(tree.to_string(&write_options).into_bytes()))
        }
        ImageKind::Other => Ok(None),
    }
}

fn has_text(svg: &[u8]) -> bool {
    svg.windows(5).any(|w| w == b"<text")
}
