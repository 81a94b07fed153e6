use super::frame::{AxisRange, Frame, FramePayload};

pub type Rgba = [u8; 4];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba,
    pub positive: Rgba,
    pub negative: Rgba,
    pub bar: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [0, 0, 0, 255],
            positive: [0, 0, 255, 255],
            negative: [255, 0, 0, 191],
            bar: [64, 160, 255, 255],
        }
    }
}

/// CPU rasterizer producing tightly packed RGBA8 frames for the encoder.
///
/// Values outside a frame's axis ranges land off-canvas and are clipped.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    palette: Palette,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            palette: Palette::default(),
        }
    }

    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Draw `frame` into `pixels`, replacing whatever was there.
    pub fn rasterize(&self, frame: &Frame, pixels: &mut Vec<u8>) {
        pixels.clear();
        pixels.resize(self.frame_bytes(), 0);
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&self.palette.background);
        }

        match &frame.payload {
            FramePayload::Waveform { positive, negative } => {
                self.polyline(pixels, frame, positive, self.palette.positive);
                self.polyline(pixels, frame, negative, self.palette.negative);
            }
            FramePayload::Bars { heights } => self.bars(pixels, frame, heights),
        }
    }

    fn px(&self, range: &AxisRange, x: f32) -> f32 {
        range.normalize(x) * (self.width.max(1) - 1) as f32
    }

    fn py(&self, range: &AxisRange, y: f32) -> f32 {
        let py = (1.0 - range.normalize(y)) * (self.height.max(1) - 1) as f32;
        // Keep far off-canvas points from producing enormous line walks.
        if py.is_nan() {
            -1.0
        } else {
            py.clamp(-1.0, self.height as f32)
        }
    }

    fn polyline(&self, pixels: &mut [u8], frame: &Frame, values: &[f32], color: Rgba) {
        let points: Vec<(f32, f32)> = values
            .iter()
            .enumerate()
            .map(|(k, &v)| {
                (
                    self.px(&frame.x_range, k as f32),
                    self.py(&frame.y_range, v),
                )
            })
            .collect();

        if let [(x, y)] = points.as_slice() {
            self.blend(pixels, x.round() as i64, y.round() as i64, color);
            return;
        }

        for (seg, pair) in points.windows(2).enumerate() {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as usize;
            // Shared endpoints are drawn once so translucent curves stay even.
            let first = if seg == 0 { 0 } else { 1 };
            for s in first..=steps {
                let t = s as f32 / steps as f32;
                let x = x0 + (x1 - x0) * t;
                let y = y0 + (y1 - y0) * t;
                self.blend(pixels, x.round() as i64, y.round() as i64, color);
            }
        }
    }

    fn bars(&self, pixels: &mut [u8], frame: &Frame, heights: &[f32]) {
        let zero = self.py(&frame.y_range, 0.0);
        for (k, &h) in heights.iter().enumerate() {
            let mut left = self.px(&frame.x_range, k as f32).round() as i64;
            let mut right = self.px(&frame.x_range, (k + 1) as f32).round() as i64;
            if right - left > 3 {
                left += 1;
                right -= 1;
            }
            let right = right.max(left + 1);

            let top = self.py(&frame.y_range, h);
            let (y_min, y_max) = if top < zero { (top, zero) } else { (zero, top) };
            for y in y_min.round() as i64..=y_max.round() as i64 {
                for x in left..right {
                    self.blend(pixels, x, y, self.palette.bar);
                }
            }
        }
    }

    fn blend(&self, pixels: &mut [u8], x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = ((y as usize * self.width as usize) + x as usize) * 4;
        let a = color[3] as f32 / 255.0;
        let inv_a = 1.0 - a;
        for c in 0..3 {
            pixels[idx + c] = (color[c] as f32 * a + pixels[idx + c] as f32 * inv_a) as u8;
        }
        pixels[idx + 3] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * width + x) * 4) as usize;
        [pixels[idx], pixels[idx + 1], pixels[idx + 2], pixels[idx + 3]]
    }

    fn waveform(values: Vec<f32>, ceiling: f32) -> Frame {
        Frame {
            index: 0,
            x_range: AxisRange::new(0.0, values.len() as f32),
            y_range: AxisRange::new(-ceiling, ceiling),
            payload: FramePayload::Waveform {
                negative: values.iter().map(|v| -v).collect(),
                positive: values,
            },
        }
    }

    #[test]
    fn fills_background_at_full_size() {
        let canvas = Canvas::new(16, 9);
        let mut pixels = Vec::new();
        canvas.rasterize(&waveform(vec![0.0; 4], 1.0), &mut pixels);
        assert_eq!(pixels.len(), 16 * 9 * 4);
        assert_eq!(pixel(&pixels, 16, 15, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn silent_waveform_sits_on_the_center_line() {
        let canvas = Canvas::new(32, 21);
        let mut pixels = Vec::new();
        canvas.rasterize(&waveform(vec![0.0; 32], 1.0), &mut pixels);
        // Negative curve is drawn last, on top of the positive one.
        let center = pixel(&pixels, 32, 0, 10);
        assert!(center[0] > 0);
        assert_eq!(pixel(&pixels, 32, 0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn values_beyond_the_ceiling_are_clipped() {
        let canvas = Canvas::new(20, 10);
        let mut pixels = Vec::new();
        canvas.rasterize(
            &waveform(vec![1e9, f32::INFINITY, 0.0, 5e6], 1.0),
            &mut pixels,
        );
        assert_eq!(pixels.len(), canvas.frame_bytes());
    }

    #[test]
    fn bars_grow_up_from_the_zero_line() {
        let canvas = Canvas::new(40, 50);
        let frame = Frame {
            index: 0,
            x_range: AxisRange::new(0.0, 2.0),
            y_range: AxisRange::new(-2.5, 10.0),
            payload: FramePayload::Bars {
                heights: vec![10.0, 0.0],
            },
        };
        let mut pixels = Vec::new();
        canvas.rasterize(&frame, &mut pixels);

        let bar = Palette::default().bar;
        // Full-height bar on the left reaches the top row.
        assert_eq!(pixel(&pixels, 40, 10, 0), bar);
        // Empty bar on the right leaves the area above zero untouched.
        assert_eq!(pixel(&pixels, 40, 30, 5), [0, 0, 0, 255]);
        // Nothing is drawn below the zero line.
        assert_eq!(pixel(&pixels, 40, 10, 49), [0, 0, 0, 255]);
    }

    #[test]
    fn reuses_the_pixel_buffer() {
        let canvas = Canvas::new(8, 8);
        let mut pixels = vec![7u8; 3];
        canvas.rasterize(&waveform(vec![0.5; 8], 1.0), &mut pixels);
        assert_eq!(pixels.len(), 8 * 8 * 4);
    }
}
