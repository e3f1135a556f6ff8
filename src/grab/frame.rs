use anyhow::{bail, Result};

pub const BYTES_PER_PIXEL: usize = 4;

/// Owned RGBA8 pixel buffer, row-major, no padding between rows.
///
/// Allocated once and overwritten in place on every capture, so the
/// sampling loop does no per-frame allocation.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between the start of one row and the next. This buffer is
    /// tightly packed, so stride equals width * 4.
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride() + x as usize * BYTES_PER_PIXEL
    }

    /// Read a single pixel (for testing)
    #[allow(dead_code)]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }

    /// Mirror every row left-to-right.
    pub fn flip_horizontal(&mut self) {
        let w = self.width as usize;
        if w < 2 {
            return;
        }
        for row in self.data.chunks_exact_mut(w * BYTES_PER_PIXEL) {
            let (mut left, mut right) = (0, w - 1);
            while left < right {
                for c in 0..BYTES_PER_PIXEL {
                    row.swap(left * BYTES_PER_PIXEL + c, right * BYTES_PER_PIXEL + c);
                }
                left += 1;
                right -= 1;
            }
        }
    }

    /// Mirror the rows top-to-bottom.
    pub fn flip_vertical(&mut self) {
        let stride = self.stride();
        let h = self.height as usize;
        for y in 0..h / 2 {
            let (head, tail) = self.data.split_at_mut((h - 1 - y) * stride);
            head[y * stride..(y + 1) * stride].swap_with_slice(&mut tail[..stride]);
        }
    }

    pub fn rotate_180(&mut self) {
        self.flip_horizontal();
        self.flip_vertical();
    }

    /// Rotate a square buffer 90 degrees clockwise.
    pub fn rotate_90_cw(&mut self) -> Result<()> {
        self.transpose_square()?;
        self.flip_horizontal();
        Ok(())
    }

    /// Rotate a square buffer 90 degrees counter-clockwise.
    pub fn rotate_90_ccw(&mut self) -> Result<()> {
        self.transpose_square()?;
        self.flip_vertical();
        Ok(())
    }

    fn transpose_square(&mut self) -> Result<()> {
        if self.width != self.height {
            bail!(
                "rotation by 90/270 degrees needs a square buffer, got {}x{}",
                self.width,
                self.height
            );
        }
        let n = self.width as usize;
        for y in 0..n {
            for x in (y + 1)..n {
                let a = (y * n + x) * BYTES_PER_PIXEL;
                let b = (x * n + y) * BYTES_PER_PIXEL;
                for c in 0..BYTES_PER_PIXEL {
                    self.data.swap(a + c, b + c);
                }
            }
        }
        Ok(())
    }

    /// Swap the red and blue channels of every pixel.
    pub fn swap_red_blue(&mut self) {
        for px in self.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.swap(0, 2);
        }
    }
}

/// Copy `rows` rows of `row_bytes` bytes each, honoring the stride of both
/// buffers. Row r is read at `r * src_stride` and written at
/// `r * dst_stride`; any destination padding past `row_bytes` is left
/// untouched.
pub fn copy_rows(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    row_bytes: usize,
    rows: usize,
) -> Result<()> {
    if src_stride < row_bytes || dst_stride < row_bytes {
        bail!(
            "stride smaller than row payload (src {}, dst {}, row {})",
            src_stride,
            dst_stride,
            row_bytes
        );
    }
    if rows == 0 || row_bytes == 0 {
        return Ok(());
    }
    let src_needed = (rows - 1) * src_stride + row_bytes;
    let dst_needed = (rows - 1) * dst_stride + row_bytes;
    if src.len() < src_needed {
        bail!("source buffer too small ({} < {})", src.len(), src_needed);
    }
    if dst.len() < dst_needed {
        bail!("destination buffer too small ({} < {})", dst.len(), dst_needed);
    }
    for r in 0..rows {
        let s = r * src_stride;
        let d = r * dst_stride;
        dst[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed_buffer(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                buf.set_pixel(x, y, [x as u8, y as u8, 0, 255]);
            }
        }
        buf
    }

    #[test]
    fn copies_rows_with_matching_stride() {
        let (w, h) = (64usize, 64usize);
        let row_bytes = w * BYTES_PER_PIXEL;
        let src: Vec<u8> = (0..row_bytes * h).map(|i| (i % 251) as u8).collect();
        let mut dst = vec![0u8; row_bytes * h];
        copy_rows(&src, row_bytes, &mut dst, row_bytes, row_bytes, h).unwrap();
        assert_eq!(src, dst);
    }

    #[test]
    fn copies_rows_into_padded_destination() {
        let (w, h) = (64usize, 64usize);
        let row_bytes = w * BYTES_PER_PIXEL;
        let dst_stride = row_bytes + 8;
        let src: Vec<u8> = (0..row_bytes * h).map(|i| (i % 249) as u8).collect();
        let mut dst = vec![0xAAu8; dst_stride * h];
        copy_rows(&src, row_bytes, &mut dst, dst_stride, row_bytes, h).unwrap();
        for r in 0..h {
            assert_eq!(
                &dst[r * dst_stride..r * dst_stride + row_bytes],
                &src[r * row_bytes..(r + 1) * row_bytes]
            );
            // padding bytes must not be written
            assert!(dst[r * dst_stride + row_bytes..(r + 1) * dst_stride]
                .iter()
                .all(|&b| b == 0xAA));
        }
    }

    #[test]
    fn rejects_stride_smaller_than_row() {
        let src = vec![0u8; 64];
        let mut dst = vec![0u8; 64];
        assert!(copy_rows(&src, 8, &mut dst, 8, 16, 4).is_err());
    }

    #[test]
    fn rejects_undersized_buffers() {
        let src = vec![0u8; 15];
        let mut dst = vec![0u8; 64];
        assert!(copy_rows(&src, 8, &mut dst, 8, 8, 2).is_err());

        let src = vec![0u8; 64];
        let mut dst = vec![0u8; 15];
        assert!(copy_rows(&src, 8, &mut dst, 8, 8, 2).is_err());
    }

    #[test]
    fn flip_horizontal_mirrors_each_row() {
        let base = indexed_buffer(4, 3);
        let mut flipped = indexed_buffer(4, 3);
        flipped.flip_horizontal();
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(flipped.pixel(x, y), base.pixel(3 - x, y));
            }
        }
    }

    #[test]
    fn flip_vertical_mirrors_the_rows() {
        let base = indexed_buffer(4, 3);
        let mut flipped = indexed_buffer(4, 3);
        flipped.flip_vertical();
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(flipped.pixel(x, y), base.pixel(x, 2 - y));
            }
        }
    }

    #[test]
    fn rotate_180_maps_to_opposite_corner() {
        let base = indexed_buffer(4, 3);
        let mut rotated = indexed_buffer(4, 3);
        rotated.rotate_180();
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(rotated.pixel(x, y), base.pixel(3 - x, 2 - y));
            }
        }
    }

    #[test]
    fn rotate_90_cw_on_square_buffer() {
        let base = indexed_buffer(3, 3);
        let mut rotated = indexed_buffer(3, 3);
        rotated.rotate_90_cw().unwrap();
        // clockwise: out(x, y) = in(y, n-1-x)
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(rotated.pixel(x, y), base.pixel(y, 2 - x));
            }
        }
    }

    #[test]
    fn rotate_90_ccw_undoes_cw() {
        let base = indexed_buffer(3, 3);
        let mut rotated = indexed_buffer(3, 3);
        rotated.rotate_90_cw().unwrap();
        rotated.rotate_90_ccw().unwrap();
        assert_eq!(rotated.as_bytes(), base.as_bytes());
    }

    #[test]
    fn rotate_90_rejects_non_square() {
        let mut buf = PixelBuffer::new(4, 2);
        assert!(buf.rotate_90_cw().is_err());
        assert!(buf.rotate_90_ccw().is_err());
    }

    #[test]
    fn swap_red_blue_exchanges_channels() {
        let mut buf = PixelBuffer::new(2, 1);
        buf.set_pixel(0, 0, [10, 20, 30, 40]);
        buf.set_pixel(1, 0, [1, 2, 3, 4]);
        buf.swap_red_blue();
        assert_eq!(buf.pixel(0, 0), [30, 20, 10, 40]);
        assert_eq!(buf.pixel(1, 0), [3, 2, 1, 4]);
    }
}
