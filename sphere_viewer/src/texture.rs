//! RGBA buffer plumbing between CPU surfaces and wgpu: row padding for the
//! copy-alignment rules, plus PNG load/store for overlay pages and frame
//! dumps.

use std::{borrow::Cow, fs::File, path::Path};

use anyhow::{Context, Result, ensure};
use image::{ColorType, ImageEncoder, codecs::png::PngEncoder};

/// An RGBA buffer ready for `Queue::write_texture`: rows padded out to
/// `COPY_BYTES_PER_ROW_ALIGNMENT` when the tight stride does not already
/// satisfy it.
pub struct RgbaUpload<'a> {
    data: Cow<'a, [u8]>,
    bytes_per_row: u32,
}

impl RgbaUpload<'_> {
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.bytes_per_row
    }
}

pub fn pad_rgba_rows(width: u32, height: u32, data: &[u8]) -> Result<RgbaUpload<'_>> {
    ensure!(width > 0 && height > 0, "texture has no dimensions");
    let tight_stride = width as usize * 4;
    let expected = tight_stride * height as usize;
    ensure!(
        data.len() == expected,
        "RGBA buffer is {} bytes, expected {}x{} ({expected})",
        data.len(),
        width,
        height
    );

    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
    if tight_stride % alignment == 0 {
        return Ok(RgbaUpload {
            data: Cow::Borrowed(data),
            bytes_per_row: tight_stride as u32,
        });
    }

    let padded_stride = tight_stride.div_ceil(alignment) * alignment;
    let mut padded = vec![0u8; padded_stride * height as usize];
    for (row, pixels) in data.chunks_exact(tight_stride).enumerate() {
        let start = row * padded_stride;
        padded[start..start + tight_stride].copy_from_slice(pixels);
    }

    Ok(RgbaUpload {
        data: Cow::Owned(padded),
        bytes_per_row: padded_stride as u32,
    })
}

/// Strip copy-alignment padding from a GPU readback buffer.
pub fn strip_row_padding(width: u32, height: u32, padded_stride: u32, data: &[u8]) -> Vec<u8> {
    let tight_stride = width as usize * 4;
    let mut rgba = Vec::with_capacity(tight_stride * height as usize);
    for row in 0..height as usize {
        let start = row * padded_stride as usize;
        rgba.extend_from_slice(&data[start..start + tight_stride]);
    }
    rgba
}

pub fn load_rgba_png(path: &Path) -> Result<(u32, u32, Vec<u8>)> {
    let decoded = image::open(path)
        .with_context(|| format!("decoding overlay page {}", path.display()))?
        .into_rgba8();
    let (width, height) = decoded.dimensions();
    ensure!(width > 0 && height > 0, "page {} is empty", path.display());
    Ok((width, height, decoded.into_raw()))
}

pub fn write_rgba_png(path: &Path, width: u32, height: u32, data: &[u8]) -> Result<()> {
    ensure!(
        data.len() == width as usize * height as usize * 4,
        "RGBA buffer is {} bytes, expected {}x{}",
        data.len(),
        width,
        height
    );
    let file =
        File::create(path).with_context(|| format!("creating PNG {}", path.display()))?;
    PngEncoder::new(file)
        .write_image(data, width, height, ColorType::Rgba8.into())
        .with_context(|| format!("encoding PNG {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_rows_borrow_the_input() {
        // 64 px * 4 = 256 bytes per row, already aligned.
        let data = vec![7u8; 64 * 2 * 4];
        let upload = pad_rgba_rows(64, 2, &data).expect("upload");
        assert_eq!(upload.bytes_per_row(), 256);
        assert_eq!(upload.pixels().len(), data.len());
    }

    #[test]
    fn narrow_rows_are_padded_to_alignment() {
        let mut data = vec![0u8; 3 * 2 * 4];
        data[0] = 0xAA;
        data[3 * 4] = 0xBB; // first byte of row 1

        let upload = pad_rgba_rows(3, 2, &data).expect("upload");
        let stride = upload.bytes_per_row() as usize;
        assert_eq!(stride % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize, 0);
        assert_eq!(upload.pixels().len(), stride * 2);
        assert_eq!(upload.pixels()[0], 0xAA);
        assert_eq!(upload.pixels()[stride], 0xBB);
    }

    #[test]
    fn padding_round_trips_through_strip() {
        let data: Vec<u8> = (0..5 * 3 * 4).map(|value| value as u8).collect();
        let upload = pad_rgba_rows(5, 3, &data).expect("upload");
        let stripped =
            strip_row_padding(5, 3, upload.bytes_per_row(), upload.pixels());
        assert_eq!(stripped, data);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let data = vec![0u8; 10];
        assert!(pad_rgba_rows(4, 4, &data).is_err());
    }

    #[test]
    fn png_round_trip_preserves_pixels() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("frame.png");
        let data: Vec<u8> = (0..4 * 2 * 4).map(|value| (value * 3) as u8).collect();

        write_rgba_png(&path, 4, 2, &data).expect("write png");
        let (width, height, decoded) = load_rgba_png(&path).expect("read png");
        assert_eq!((width, height), (4, 2));
        assert_eq!(decoded, data);
    }
}
