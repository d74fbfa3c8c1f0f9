//! Frame conversion and transformation utilities.

use nokhwa::pixel_format::RgbFormat;

use super::types::Frame;

/// Decode a nokhwa buffer into an RGB [`Frame`].
///
/// nokhwa's `decode_image` handles MJPEG, YUYV, NV12 and friends.
/// Returns `None` if the buffer cannot be decoded.
pub fn convert_to_rgb(buffer: &nokhwa::Buffer, timestamp_ms: f64) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();

    Some(Frame {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
        timestamp_ms,
    })
}

/// Mirror a frame horizontally (flip left-right) for selfie mode.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let bpp = Frame::BYTES_PER_PIXEL;

    for y in 0..height {
        let row_start = y * width * bpp;
        let row = &mut frame.data[row_start..row_start + width * bpp];

        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}
