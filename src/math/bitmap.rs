// Copyright 2020 @TwoCookingMice

use super::constants::Vector4f;
use super::spectrum::to_rgba8;

use std::ops;

// Linear RGBA image, row-major with row 0 at the top.
#[derive(Debug, Clone)]
pub struct Bitmap {
    data: Vec<Vector4f>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = Vector4f;

    fn index(&self, index: (usize, usize)) -> &Vector4f {
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Vector4f {
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self { data: vec![Vector4f::zeros(); width * height],
               width,
               height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|p| *p = Vector4f::zeros());
    }

    pub fn pixels(&self) -> &[Vector4f] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [Vector4f] {
        &mut self.data
    }
}

// Display-ready RGBA8 image, four bytes per pixel, same layout as Bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl PixelBuffer {
    pub const CHANNELS: usize = 4;

    pub fn new(width: usize, height: usize) -> Self {
        Self { data: vec![0u8; width * height * Self::CHANNELS], width, height }
    }

    pub fn from_bitmap(bitmap: &Bitmap) -> Self {
        let mut buffer = Self::new(bitmap.width(), bitmap.height());
        for (dst, src) in buffer.data.chunks_exact_mut(Self::CHANNELS).zip(bitmap.pixels()) {
            dst.copy_from_slice(&to_rgba8(src));
        }
        buffer
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (x + self.width * y) * Self::CHANNELS;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2], self.data[idx + 3]]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
