//! RGB565 framebuffer and the frame sink abstraction.
//!
//! [`Framebuffer`] implements `DrawTarget` over a big-endian RGB565 byte
//! buffer, the format the ST7789 panels expect, so the same bytes can be
//! handed to the SPI DMA on the firmware or blitted to the simulator window.
//!
//! # Performance
//!
//! - `clear()` and `fill_solid()` write 32-bit words (two pixels at a time)
//! - `fill_contiguous()` walks rows directly instead of going through `draw_iter()`

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Consumer of composed frames (a physical panel, a window, a test counter).
pub trait FrameSink {
    type Error;

    /// Push one big-endian RGB565 frame.
    fn push(
        &mut self,
        frame: &[u8],
    ) -> Result<(), Self::Error>;
}

/// Two sinks showing the same content (the two eyes mirror each other).
impl<A, B, E> FrameSink for (A, B)
where
    A: FrameSink<Error = E>,
    B: FrameSink<Error = E>,
{
    type Error = E;

    fn push(
        &mut self,
        frame: &[u8],
    ) -> Result<(), Self::Error> {
        self.0.push(frame)?;
        self.1.push(frame)
    }
}

/// Bytes of one big-endian RGB565 pixel.
#[inline]
fn pixel_bytes(color: Rgb565) -> [u8; 2] {
    let raw: RawU16 = color.into();
    raw.into_inner().to_be_bytes()
}

/// `DrawTarget` over a borrowed RGB565 buffer.
pub struct Framebuffer<'a> {
    buffer: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Framebuffer<'a> {
    /// Wrap a buffer of at least `width * height * 2` bytes.
    ///
    /// Returns `None` if the buffer is too small.
    pub fn new(
        buffer: &'a mut [u8],
        width: u32,
        height: u32,
    ) -> Option<Self> {
        let (width, height) = (width as usize, height as usize);
        if buffer.len() < width * height * 2 {
            return None;
        }
        Some(Self { buffer, width, height })
    }

    /// Raw frame bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] { &self.buffer[..self.width * self.height * 2] }

    /// Read back a pixel.
    pub fn pixel(
        &self,
        x: u32,
        y: u32,
    ) -> Option<Rgb565> {
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 2;
        let raw = u16::from_be_bytes([self.buffer[idx], self.buffer[idx + 1]]);
        Some(RawU16::new(raw).into())
    }

    /// Fill the whole frame with one color, two pixels per 32-bit write.
    pub fn clear_buffer(
        &mut self,
        color: Rgb565,
    ) {
        let [hi, lo] = pixel_bytes(color);
        let word = [hi, lo, hi, lo];
        let len = self.width * self.height * 2;
        let mut chunks = self.buffer[..len].chunks_exact_mut(4);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&word);
        }
        chunks.into_remainder().copy_from_slice(&word[..len % 4]);
    }

    #[inline]
    fn set_pixel(
        &mut self,
        x: i32,
        y: i32,
        color: Rgb565,
    ) {
        if x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height {
            let idx = (y as usize * self.width + x as usize) * 2;
            self.buffer[idx..idx + 2].copy_from_slice(&pixel_bytes(color));
        }
    }
}

impl OriginDimensions for Framebuffer<'_> {
    fn size(&self) -> Size { Size::new(self.width as u32, self.height as u32) }
}

impl DrawTarget for Framebuffer<'_> {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn fill_contiguous<I>(
        &mut self,
        area: &Rectangle,
        colors: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let drawable_area = area.intersection(&self.bounding_box());
        if drawable_area.size == Size::zero() {
            return Ok(());
        }
        if drawable_area != *area {
            // Colors are laid out over the full area; clip pixel by pixel
            return self.draw_iter(area.points().zip(colors).map(|(p, c)| Pixel(p, c)));
        }

        let mut colors = colors.into_iter();
        for y in drawable_area.rows() {
            let row_start = y as usize * self.width;
            for x in drawable_area.columns() {
                let Some(color) = colors.next() else {
                    return Ok(());
                };
                let idx = (row_start + x as usize) * 2;
                self.buffer[idx..idx + 2].copy_from_slice(&pixel_bytes(color));
            }
        }
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let drawable_area = area.intersection(&self.bounding_box());
        if drawable_area.size == Size::zero() {
            return Ok(());
        }

        let [hi, lo] = pixel_bytes(color);
        let x_start = drawable_area.top_left.x as usize;
        let width = drawable_area.size.width as usize;

        for y in drawable_area.rows() {
            let start = (y as usize * self.width + x_start) * 2;
            let row = &mut self.buffer[start..start + width * 2];
            let mut chunks = row.chunks_exact_mut(4);
            for chunk in &mut chunks {
                chunk.copy_from_slice(&[hi, lo, hi, lo]);
            }
            let rest = chunks.into_remainder();
            if !rest.is_empty() {
                rest.copy_from_slice(&[hi, lo]);
            }
        }
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        self.clear_buffer(color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::primitives::PrimitiveStyle;

    use super::*;

    struct Counter(usize);

    impl FrameSink for Counter {
        type Error = ();

        fn push(
            &mut self,
            _frame: &[u8],
        ) -> Result<(), ()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn test_rejects_short_buffer() {
        let mut buf = [0u8; 10];
        assert!(Framebuffer::new(&mut buf, 4, 4).is_none());
    }

    #[test]
    fn test_clear_and_read_back() {
        let mut buf = [0u8; 5 * 3 * 2];
        let mut fb = Framebuffer::new(&mut buf, 5, 3).unwrap();
        fb.clear(Rgb565::RED).unwrap();
        assert_eq!(fb.pixel(0, 0), Some(Rgb565::RED));
        assert_eq!(fb.pixel(4, 2), Some(Rgb565::RED));
        assert_eq!(fb.pixel(5, 0), None);
        // Big-endian RGB565 red
        assert_eq!(&fb.as_bytes()[..2], &[0xF8, 0x00]);
    }

    #[test]
    fn test_fill_solid_odd_width() {
        let mut buf = [0u8; 8 * 4 * 2];
        let mut fb = Framebuffer::new(&mut buf, 8, 4).unwrap();
        Rectangle::new(Point::new(1, 1), Size::new(3, 2))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::GREEN))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.pixel(0, 1), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(1, 1), Some(Rgb565::GREEN));
        assert_eq!(fb.pixel(3, 2), Some(Rgb565::GREEN));
        assert_eq!(fb.pixel(4, 2), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(1, 3), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_fill_contiguous_clips() {
        let mut buf = [0u8; 4 * 4 * 2];
        let mut fb = Framebuffer::new(&mut buf, 4, 4).unwrap();
        let area = Rectangle::new(Point::new(-1, -1), Size::new(3, 3));
        fb.fill_contiguous(&area, core::iter::repeat(Rgb565::BLUE)).unwrap();
        assert_eq!(fb.pixel(0, 0), Some(Rgb565::BLUE));
        assert_eq!(fb.pixel(1, 1), Some(Rgb565::BLUE));
        assert_eq!(fb.pixel(2, 2), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_pair_sink_mirrors() {
        let mut pair = (Counter(0), Counter(0));
        pair.push(&[0; 4]).unwrap();
        assert_eq!((pair.0.0, pair.1.0), (1, 1));
    }
}
