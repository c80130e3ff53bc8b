// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;
use crate::math::constants::{ Float, Vector4f };

// Running per-pixel color sums and the number of frames they hold.
#[derive(Debug, Clone)]
pub struct AccumulationBuffer {
    sum: Bitmap,
    frame_count: u32,
    accumulating: bool,
}

impl AccumulationBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { sum: Bitmap::new(width, height), frame_count: 0, accumulating: false }
    }

    pub fn width(&self) -> usize {
        self.sum.width()
    }

    pub fn height(&self) -> usize {
        self.sum.height()
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    // Starts a frame and returns the divisor for it. Any frame that does not continue an
    // accumulating history starts over at 1 with cleared sums.
    pub fn begin_frame(&mut self, use_accumulation: bool) -> u32 {
        if use_accumulation && self.accumulating && self.frame_count > 0 {
            self.frame_count += 1;
        } else {
            self.frame_count = 1;
            self.sum.clear();
        }
        self.accumulating = use_accumulation;
        self.frame_count
    }

    pub fn reset(&mut self) {
        self.frame_count = 0;
        self.sum.clear();
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.sum = Bitmap::new(width, height);
        self.frame_count = 0;
    }

    pub fn sums_mut(&mut self) -> &mut [Vector4f] {
        self.sum.pixels_mut()
    }

    pub fn average_at(&self, x: usize, y: usize) -> Vector4f {
        self.sum[(x, y)] / self.frame_count.max(1) as Float
    }

    pub fn average(&self) -> Bitmap {
        let inv = 1.0 / self.frame_count.max(1) as Float;
        let mut out = self.sum.clone();
        out.pixels_mut().iter_mut().for_each(|p| *p *= inv);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_everywhere(buffer: &mut AccumulationBuffer, value: Vector4f) {
        buffer.sums_mut().iter_mut().for_each(|p| *p += value);
    }

    #[test]
    fn test_accumulation_converges() {
        let mut buffer = AccumulationBuffer::new(2, 2);
        for frame in 0..100 {
            buffer.begin_frame(true);
            let v = if frame % 2 == 0 { 1.0 } else { 0.0 };
            add_everywhere(&mut buffer, Vector4f::new(v, v, v, 1.0));
        }
        assert_eq!(buffer.frame_count(), 100);
        let average = buffer.average_at(1, 1);
        assert!((average.x - 0.5).abs() < 1e-5);
        assert!((average.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_toggle_restarts_history() {
        let mut buffer = AccumulationBuffer::new(1, 1);
        assert_eq!(buffer.begin_frame(true), 1);
        add_everywhere(&mut buffer, Vector4f::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(buffer.begin_frame(true), 2);
        add_everywhere(&mut buffer, Vector4f::new(1.0, 0.0, 0.0, 1.0));

        // Disabled frames always divide by one and never keep history.
        assert_eq!(buffer.begin_frame(false), 1);
        assert_eq!(buffer.average_at(0, 0), Vector4f::zeros());
        add_everywhere(&mut buffer, Vector4f::new(0.2, 0.0, 0.0, 1.0));
        assert_eq!(buffer.begin_frame(false), 1);

        // Re-enabling starts a fresh history.
        add_everywhere(&mut buffer, Vector4f::new(0.4, 0.0, 0.0, 1.0));
        assert_eq!(buffer.begin_frame(true), 1);
        assert_eq!(buffer.average_at(0, 0), Vector4f::zeros());
        assert_eq!(buffer.begin_frame(true), 2);
    }

    #[test]
    fn test_reset_and_resize() {
        let mut buffer = AccumulationBuffer::new(2, 1);
        buffer.begin_frame(true);
        buffer.begin_frame(true);
        buffer.reset();
        assert_eq!(buffer.frame_count(), 0);
        assert_eq!(buffer.begin_frame(true), 1);

        buffer.resize(4, 3);
        assert_eq!((buffer.width(), buffer.height()), (4, 3));
        assert_eq!(buffer.begin_frame(true), 1);
    }
}
