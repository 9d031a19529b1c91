// ============================================================================
// Pixel helpers
// ============================================================================

/// Blend one channel: `src * alpha + dst * (255 - alpha)`, divided by 255
/// with the shift approximation `(x + 1 + (x >> 8)) >> 8`
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let mixed = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((mixed + 1 + (mixed >> 8)) >> 8) as u8
}

/// Store one pixel. Memory order is A, B, G, R (RGBA8888 on little-endian).
#[inline]
fn store(dest: &mut [u8], r: u8, g: u8, b: u8, a: u8) {
    dest[0] = a;
    dest[1] = b;
    dest[2] = g;
    dest[3] = r;
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// Software frame or layer in RGBA8888.
///
/// The full frame is always opaque. Region-sized layers start fully
/// transparent and only the stroked pixels become opaque, so compositing a
/// layer touches nothing but its lines.
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Opaque black buffer
    pub fn with_size(width: u32, height: u32) -> Self {
        let mut buffer = Self {
            pixels: vec![0; (width * height * 4) as usize],
            width,
            height,
        };
        buffer.clear(0, 0, 0);
        buffer
    }

    /// Build from tightly packed R, G, B, A bytes (the layout decoders produce)
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Option<Self> {
        if rgba.len() != (width * height * 4) as usize {
            return None;
        }
        let mut pixels = vec![0; rgba.len()];
        for (dst, src) in pixels.chunks_exact_mut(4).zip(rgba.chunks_exact(4)) {
            store(dst, src[0], src[1], src[2], src[3]);
        }
        Some(Self {
            pixels,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Fill with an opaque color
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        self.clear_rgba(r, g, b, 255);
    }

    /// Fill with any color, including fully transparent for layers
    pub fn clear_rgba(&mut self, r: u8, g: u8, b: u8, a: u8) {
        for px in self.pixels.chunks_exact_mut(4) {
            store(px, r, g, b, a);
        }
    }

    /// Opaque write, ignored outside the buffer
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if self.in_bounds(x, y) {
            let i = self.offset(x as u32, y as u32);
            store(&mut self.pixels[i..i + 4], r, g, b, 255);
        }
    }

    /// Opaque write without a bounds check
    ///
    /// # Safety
    /// `x < width` and `y < height` must hold.
    #[inline]
    unsafe fn set_pixel_unchecked(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) {
        let i = self.offset(x, y);
        *self.pixels.get_unchecked_mut(i) = 255;
        *self.pixels.get_unchecked_mut(i + 1) = b;
        *self.pixels.get_unchecked_mut(i + 2) = g;
        *self.pixels.get_unchecked_mut(i + 3) = r;
    }

    /// (r, g, b) at a pixel, None outside the buffer
    #[cfg(test)]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        self.get_pixel_rgba(x, y).map(|(r, g, b, _)| (r, g, b))
    }

    /// (r, g, b, a) at a pixel, None outside the buffer
    #[cfg(test)]
    pub fn get_pixel_rgba(&self, x: i32, y: i32) -> Option<(u8, u8, u8, u8)> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let i = self.offset(x as u32, y as u32);
        let px = &self.pixels[i..i + 4];
        Some((px[3], px[2], px[1], px[0]))
    }

    /// Horizontal span, clipped, endpoints in either order
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, r: u8, g: u8, b: u8) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let lo = lo.max(0);
        let hi = hi.min(self.width as i32 - 1);
        if lo > hi {
            return;
        }
        let start = self.offset(lo as u32, y as u32);
        let end = self.offset(hi as u32, y as u32) + 4;
        for px in self.pixels[start..end].chunks_exact_mut(4) {
            store(px, r, g, b, 255);
        }
    }

    /// One pixel wide line (Bresenham), clipped to the buffer first
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, r: u8, g: u8, b: u8) {
        let Some((mut x, mut y, x_end, y_end)) = self.clip_line(x0, y0, x1, y1) else {
            return;
        };

        let dx = (x_end - x).abs();
        let dy = -(y_end - y).abs();
        let sx = if x < x_end { 1 } else { -1 };
        let sy = if y < y_end { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            // Safety: both endpoints were clipped into the buffer and every
            // step moves towards x_end/y_end
            unsafe {
                self.set_pixel_unchecked(x as u32, y as u32, r, g, b);
            }
            if x == x_end && y == y_end {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Cohen-Sutherland clip to the buffer rectangle.
    /// None when the segment lies entirely outside.
    fn clip_line(
        &self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
    ) -> Option<(i32, i32, i32, i32)> {
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const TOP: u8 = 4;
        const BOTTOM: u8 = 8;

        let w = self.width as i32;
        let h = self.height as i32;
        let code = |x: i32, y: i32| -> u8 {
            let mut c = 0;
            if x < 0 {
                c |= LEFT;
            } else if x >= w {
                c |= RIGHT;
            }
            if y < 0 {
                c |= TOP;
            } else if y >= h {
                c |= BOTTOM;
            }
            c
        };

        let mut c0 = code(x0, y0);
        let mut c1 = code(x1, y1);

        // Converges within four passes for any finite input
        for _ in 0..8 {
            if c0 | c1 == 0 {
                return Some((x0, y0, x1, y1));
            }
            if c0 & c1 != 0 {
                return None;
            }

            let out = if c0 != 0 { c0 } else { c1 };
            // i64 keeps dx * dy from overflowing on far off-screen points
            let (dx, dy) = ((x1 - x0) as i64, (y1 - y0) as i64);
            let (fx0, fy0) = (x0 as i64, y0 as i64);
            let (x, y) = if out & BOTTOM != 0 {
                let y = (h - 1) as i64;
                (fx0 + dx * (y - fy0) / dy, y)
            } else if out & TOP != 0 {
                (fx0 + dx * -fy0 / dy, 0)
            } else if out & RIGHT != 0 {
                let x = (w - 1) as i64;
                (x, fy0 + dy * (x - fx0) / dx)
            } else {
                (0, fy0 + dy * -fx0 / dx)
            };
            let (x, y) = (x as i32, y as i32);

            if out == c0 {
                (x0, y0) = (x, y);
                c0 = code(x0, y0);
            } else {
                (x1, y1) = (x, y);
                c1 = code(x1, y1);
            }
        }
        None
    }

    /// Line `thickness` pixels wide, built from parallel one pixel lines
    pub fn line_thick(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: i32,
        r: u8,
        g: u8,
        b: u8,
    ) {
        if thickness <= 1 {
            self.line(x0, y0, x1, y1, r, g, b);
            return;
        }

        let dx = (x1 - x0) as f32;
        let dy = (y1 - y0) as f32;
        let len = (dx * dx + dy * dy).sqrt();
        if len < 0.001 {
            self.fill_circle(x0, y0, thickness / 2, r, g, b);
            return;
        }

        // Unit normal
        let nx = -dy / len;
        let ny = dx / len;
        let half = (thickness - 1) as f32 / 2.0;
        for i in 0..thickness {
            let t = i as f32 - half;
            let ox = (nx * t) as i32;
            let oy = (ny * t) as i32;
            self.line(x0 + ox, y0 + oy, x1 + ox, y1 + oy, r, g, b);
        }
    }

    /// Open polyline through `points`. Wide strokes get round joints so
    /// sharp turns do not leave notches.
    pub fn polyline(&mut self, points: &[(i32, i32)], thickness: i32, r: u8, g: u8, b: u8) {
        for seg in points.windows(2) {
            let ((x0, y0), (x1, y1)) = (seg[0], seg[1]);
            self.line_thick(x0, y0, x1, y1, thickness, r, g, b);
        }
        if thickness > 2 {
            for &(x, y) in points {
                self.fill_circle(x, y, thickness / 2, r, g, b);
            }
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, r: u8, g: u8, b: u8) {
        if w == 0 {
            return;
        }
        for row in y..y + h as i32 {
            self.hline(x, x + w as i32 - 1, row, r, g, b);
        }
    }

    /// Solid disc, filled span by span (midpoint circle)
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, r: u8, g: u8, b: u8) {
        if radius < 0 {
            return;
        }
        if radius == 0 {
            self.set_pixel(cx, cy, r, g, b);
            return;
        }

        let mut x = radius;
        let mut y = 0;
        let mut err = 1 - radius;
        while x >= y {
            self.hline(cx - x, cx + x, cy + y, r, g, b);
            self.hline(cx - x, cx + x, cy - y, r, g, b);
            self.hline(cx - y, cx + y, cy + x, r, g, b);
            self.hline(cx - y, cx + y, cy - x, r, g, b);

            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    /// Source-over composite of `src` with its top-left corner at
    /// (dst_x, dst_y). Transparent source pixels are skipped, opaque ones
    /// copied, the rest blended. The destination stays opaque.
    pub fn composite(&mut self, src: &PixelBuffer, dst_x: i32, dst_y: i32) {
        let w = self.width as i32;
        let h = self.height as i32;

        for sy in 0..src.height as i32 {
            let dy = dst_y + sy;
            if dy < 0 || dy >= h {
                continue;
            }
            for sx in 0..src.width as i32 {
                let dx = dst_x + sx;
                if dx < 0 || dx >= w {
                    continue;
                }

                let si = src.offset(sx as u32, sy as u32);
                let alpha = src.pixels[si];
                if alpha == 0 {
                    continue;
                }
                let (sr, sg, sb) = (src.pixels[si + 3], src.pixels[si + 2], src.pixels[si + 1]);
                let di = self.offset(dx as u32, dy as u32);
                let dst = &mut self.pixels[di..di + 4];
                if alpha == 255 {
                    store(dst, sr, sg, sb, 255);
                } else {
                    let a = alpha as u16;
                    dst[0] = 255;
                    dst[1] = blend_channel(sb, dst[1], a);
                    dst[2] = blend_channel(sg, dst[2], a);
                    dst[3] = blend_channel(sr, dst[3], a);
                }
            }
        }
    }

    /// Raw bytes for texture upload
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}
