// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion to the canonical frame representation
//!
//! Every raw frame a camera stream delivers is turned into upright, tightly
//! packed RGBA here before it is published. Conversion runs on the capture
//! worker, so it stays on the CPU and allocates exactly one output buffer per
//! step.

use super::types::{BackendError, BackendResult, CameraFrame, PixelFormat, RawFrame, SensorRotation};

/// Convert a raw frame to an upright canonical frame
///
/// Applies pixel format conversion and then rotation normalization. The
/// capture timestamp and sequence number are carried over.
pub fn to_canonical(raw: &RawFrame, rotation: SensorRotation) -> BackendResult<CameraFrame> {
    let rgba = convert_to_rgba(raw)?;
    let (data, width, height) = rotate_rgba(rgba, raw.width, raw.height, rotation);

    Ok(CameraFrame {
        width,
        height,
        data: data.into(),
        captured_at: raw.captured_at,
        sequence: raw.sequence,
    })
}

/// Convert a raw frame of any supported format to packed RGBA
///
/// Row padding is stripped. Fails if the buffer is too small for the
/// declared geometry.
pub fn convert_to_rgba(raw: &RawFrame) -> BackendResult<Vec<u8>> {
    if raw.width == 0 || raw.height == 0 {
        return Err(BackendError::InvalidFrame(format!(
            "empty frame geometry {}x{}",
            raw.width, raw.height
        )));
    }

    let stride = raw.stride as usize;
    if stride < raw.format.min_stride(raw.width) {
        return Err(BackendError::InvalidFrame(format!(
            "stride {} too small for {}x{} {:?}",
            stride, raw.width, raw.height, raw.format
        )));
    }

    let needed = raw.format.min_buffer_len(raw.width, raw.height, stride);
    if raw.data.len() < needed {
        return Err(BackendError::InvalidFrame(format!(
            "buffer is {} bytes, {:?} {}x{} needs {}",
            raw.data.len(),
            raw.format,
            raw.width,
            raw.height,
            needed
        )));
    }

    let data: &[u8] = &raw.data;
    let (width, height) = (raw.width as usize, raw.height as usize);

    let rgba = match raw.format {
        PixelFormat::RGBA => packed_to_rgba(data, width, height, stride, 4, |px| {
            [px[0], px[1], px[2], px[3]]
        }),
        PixelFormat::BGRA => packed_to_rgba(data, width, height, stride, 4, |px| {
            [px[2], px[1], px[0], px[3]]
        }),
        PixelFormat::RGB24 => packed_to_rgba(data, width, height, stride, 3, |px| {
            [px[0], px[1], px[2], 255]
        }),
        PixelFormat::Gray8 => packed_to_rgba(data, width, height, stride, 1, |px| {
            [px[0], px[0], px[0], 255]
        }),
        // Y0 U Y1 V
        PixelFormat::YUYV => packed_422_to_rgba(data, width, height, stride, [0, 2], 1, 3),
        // U Y0 V Y1
        PixelFormat::UYVY => packed_422_to_rgba(data, width, height, stride, [1, 3], 0, 2),
        PixelFormat::NV12 => nv12_to_rgba(data, width, height, stride),
    };

    Ok(rgba)
}

/// Rotate packed RGBA clockwise by the sensor rotation
///
/// Returns the rotated buffer with its new width and height. No-op
/// rotations hand the input back without copying.
pub fn rotate_rgba(
    data: Vec<u8>,
    width: u32,
    height: u32,
    rotation: SensorRotation,
) -> (Vec<u8>, u32, u32) {
    if rotation == SensorRotation::None {
        return (data, width, height);
    }

    let (w, h) = (width as usize, height as usize);
    let (out_w, out_h) = if rotation.swaps_dimensions() {
        (h, w)
    } else {
        (w, h)
    };
    let mut out = vec![0u8; data.len()];

    for y in 0..h {
        for x in 0..w {
            let (dx, dy) = match rotation {
                SensorRotation::Rotate90 => (h - 1 - y, x),
                SensorRotation::Rotate180 => (w - 1 - x, h - 1 - y),
                SensorRotation::Rotate270 => (y, w - 1 - x),
                SensorRotation::None => (x, y),
            };
            let src = (y * w + x) * 4;
            let dst = (dy * out_w + dx) * 4;
            out[dst..dst + 4].copy_from_slice(&data[src..src + 4]);
        }
    }

    (out, out_w as u32, out_h as u32)
}

/// BT.601 YUV to RGB
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
    [r, g, b]
}

/// Convert a packed format with a fixed number of bytes per pixel
fn packed_to_rgba<F>(
    data: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    bytes_per_pixel: usize,
    to_rgba: F,
) -> Vec<u8>
where
    F: Fn(&[u8]) -> [u8; 4],
{
    let mut rgba = Vec::with_capacity(width * height * 4);

    for row in 0..height {
        let start = row * stride;
        let line = &data[start..start + width * bytes_per_pixel];
        for px in line.chunks_exact(bytes_per_pixel) {
            rgba.extend_from_slice(&to_rgba(px));
        }
    }

    rgba
}

/// Convert packed 4:2:2 where each 4-byte macropixel encodes 2 pixels
///
/// `luma` gives the offsets of Y0 and Y1 inside the macropixel, `u` and `v`
/// the chroma offsets.
fn packed_422_to_rgba(
    data: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    luma: [usize; 2],
    u: usize,
    v: usize,
) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(width * height * 4);

    for row in 0..height {
        let start = row * stride;
        let line = &data[start..start + width.div_ceil(2) * 4];
        let mut emitted = 0;

        for chunk in line.chunks_exact(4) {
            for &y_offset in &luma {
                if emitted == width {
                    break;
                }
                let [r, g, b] = yuv_to_rgb(chunk[y_offset], chunk[u], chunk[v]);
                rgba.extend_from_slice(&[r, g, b, 255]);
                emitted += 1;
            }
        }
    }

    rgba
}

/// Convert NV12 (full-resolution Y plane, half-resolution interleaved UV)
fn nv12_to_rgba(data: &[u8], width: usize, height: usize, stride: usize) -> Vec<u8> {
    let uv_plane = &data[stride * height..];
    let mut rgba = Vec::with_capacity(width * height * 4);

    for row in 0..height {
        let y_line = &data[row * stride..row * stride + width];
        let uv_line = &uv_plane[(row / 2) * stride..];
        for (col, &y) in y_line.iter().enumerate() {
            let uv = (col / 2) * 2;
            let [r, g, b] = yuv_to_rgb(y, uv_line[uv], uv_line[uv + 1]);
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }

    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(width: u32, height: u32, stride: u32, format: PixelFormat, data: Vec<u8>) -> RawFrame {
        RawFrame {
            stride,
            ..RawFrame::new(width, height, format, data)
        }
    }

    #[test]
    fn test_rgba_with_stride_padding() {
        let data: Vec<u8> = vec![
            255, 0, 0, 255, // Red pixel
            0, 255, 0, 255, // Green pixel
            0, 0, // stride padding
            0, 0, 255, 255, // Blue pixel
            255, 255, 255, 255, // White pixel
            0, 0, // stride padding
        ];

        let rgba = convert_to_rgba(&raw(2, 2, 10, PixelFormat::RGBA, data)).unwrap();
        assert_eq!(rgba.len(), 16);
        assert_eq!(&rgba[0..4], &[255, 0, 0, 255]);
        assert_eq!(&rgba[4..8], &[0, 255, 0, 255]);
        assert_eq!(&rgba[8..12], &[0, 0, 255, 255]);
        assert_eq!(&rgba[12..16], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_bgra_swaps_channels() {
        let rgba = convert_to_rgba(&raw(1, 1, 4, PixelFormat::BGRA, vec![10, 20, 30, 40])).unwrap();
        assert_eq!(rgba, vec![30, 20, 10, 40]);
    }

    #[test]
    fn test_gray8_expands_to_opaque_rgba() {
        let rgba = convert_to_rgba(&raw(2, 1, 2, PixelFormat::Gray8, vec![0, 200])).unwrap();
        assert_eq!(rgba, vec![0, 0, 0, 255, 200, 200, 200, 255]);
    }

    #[test]
    fn test_yuyv_neutral_chroma_is_gray() {
        // Y0=50 U=128 Y1=150 V=128
        let rgba = convert_to_rgba(&raw(2, 1, 4, PixelFormat::YUYV, vec![50, 128, 150, 128])).unwrap();
        assert_eq!(rgba, vec![50, 50, 50, 255, 150, 150, 150, 255]);
    }

    #[test]
    fn test_uyvy_neutral_chroma_is_gray() {
        // U=128 Y0=80 V=128 Y1=160
        let rgba = convert_to_rgba(&raw(2, 1, 4, PixelFormat::UYVY, vec![128, 80, 128, 160])).unwrap();
        assert_eq!(rgba, vec![80, 80, 80, 255, 160, 160, 160, 255]);
    }

    #[test]
    fn test_nv12_neutral_chroma_is_gray() {
        // 2x2 Y plane followed by one UV pair
        let data = vec![10, 20, 30, 40, 128, 128];
        let rgba = convert_to_rgba(&raw(2, 2, 2, PixelFormat::NV12, data)).unwrap();
        let lumas: Vec<u8> = rgba.chunks_exact(4).map(|px| px[0]).collect();
        assert_eq!(lumas, vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_nv12_odd_width_without_padding_is_rejected() {
        // 3 bytes per row leaves no room for the second UV pair
        let err = convert_to_rgba(&raw(3, 2, 3, PixelFormat::NV12, vec![100; 9])).unwrap_err();
        assert!(matches!(err, BackendError::InvalidFrame(_)));

        // Packed constructor picks the padded stride, so 9 bytes is short
        let err = convert_to_rgba(&RawFrame::new(3, 2, PixelFormat::NV12, vec![100; 9]))
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidFrame(_)));
    }

    #[test]
    fn test_nv12_odd_width_with_padded_rows() {
        // Y rows: 10 20 30 _, 40 50 60 _; one UV row: two neutral pairs
        let data = vec![10, 20, 30, 0, 40, 50, 60, 0, 128, 128, 128, 128];
        let rgba = convert_to_rgba(&raw(3, 2, 4, PixelFormat::NV12, data)).unwrap();
        let lumas: Vec<u8> = rgba.chunks_exact(4).map(|px| px[0]).collect();
        assert_eq!(lumas, vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let err = convert_to_rgba(&raw(4, 4, 16, PixelFormat::RGBA, vec![0; 20])).unwrap_err();
        assert!(matches!(err, BackendError::InvalidFrame(_)));
    }

    #[test]
    fn test_zero_geometry_is_rejected() {
        assert!(convert_to_rgba(&raw(0, 4, 0, PixelFormat::Gray8, vec![])).is_err());
    }

    #[test]
    fn test_rotate_90_clockwise() {
        // 2x1 image: A B  ->  1x2 image: A over B
        let a = [1, 1, 1, 1];
        let b = [2, 2, 2, 2];
        let data = [a, b].concat();

        let (out, w, h) = rotate_rgba(data, 2, 1, SensorRotation::Rotate90);
        assert_eq!((w, h), (1, 2));
        assert_eq!(&out[0..4], &a);
        assert_eq!(&out[4..8], &b);
    }

    #[test]
    fn test_rotate_90_moves_top_left_to_top_right() {
        // 2x2: A B / C D rotated clockwise is C A / D B
        let px = |v: u8| [v, v, v, 255];
        let data = [px(1), px(2), px(3), px(4)].concat();

        let (out, w, h) = rotate_rgba(data, 2, 2, SensorRotation::Rotate90);
        assert_eq!((w, h), (2, 2));
        let order: Vec<u8> = out.chunks_exact(4).map(|p| p[0]).collect();
        assert_eq!(order, vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_rotate_180_and_270() {
        let px = |v: u8| [v, v, v, 255];
        let data = [px(1), px(2), px(3), px(4)].concat();

        let (out, _, _) = rotate_rgba(data.clone(), 2, 2, SensorRotation::Rotate180);
        let order: Vec<u8> = out.chunks_exact(4).map(|p| p[0]).collect();
        assert_eq!(order, vec![4, 3, 2, 1]);

        let (out, _, _) = rotate_rgba(data, 2, 2, SensorRotation::Rotate270);
        let order: Vec<u8> = out.chunks_exact(4).map(|p| p[0]).collect();
        assert_eq!(order, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_to_canonical_keeps_metadata() {
        let frame = raw(2, 1, 2, PixelFormat::Gray8, vec![0, 255]).with_sequence(7);
        let canonical = to_canonical(&frame, SensorRotation::Rotate90).unwrap();
        assert_eq!((canonical.width, canonical.height), (1, 2));
        assert_eq!(canonical.sequence, 7);
        assert_eq!(canonical.captured_at, frame.captured_at);
        assert_eq!(canonical.pixel(0, 1), Some([255, 255, 255, 255]));
    }
}
