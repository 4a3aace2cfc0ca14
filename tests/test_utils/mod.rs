// tests/test_utils/mod.rs
//
// Shared fixtures for integration tests: deterministic byte streams and
// in-memory images.

#![allow(dead_code)]

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

/// Deterministic xorshift64 byte stream
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    pub fn bytes(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| (self.next_u64() >> 24) as u8).collect()
    }
}

pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    XorShift::new(seed).bytes(len)
}

pub fn encode_png(image: &RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("PNG encoding into memory");
    out.into_inner()
}

/// Uniform gray square
pub fn gray_png(size: u32) -> Vec<u8> {
    encode_png(&RgbImage::from_pixel(size, size, Rgb([128, 128, 128])))
}

/// Pseudo-random colored noise, looks nothing like a flat synthetic render
pub fn noisy_png(width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut rng = XorShift::new(seed);
    let image = RgbImage::from_fn(width, height, |_, _| {
        let v = rng.next_u64();
        Rgb([v as u8, (v >> 8) as u8, (v >> 16) as u8])
    });
    encode_png(&image)
}

/// Photo-like texture: random red, flat green, half-range blue.
///
/// The channels differ in spread, and the luma is noisy but unsharpened, so
/// no pixel heuristic treats it as a flat synthetic render.
pub fn natural_png(size: u32, seed: u64) -> Vec<u8> {
    let mut rng = XorShift::new(seed);
    let image = RgbImage::from_fn(size, size, |_, _| {
        let v = rng.next_u64();
        Rgb([(v >> 24) as u8, 128, ((v >> 32) as u8) / 2])
    });
    encode_png(&image)
}

/// Minimal valid PDF prefix followed by plain text
pub fn pdf_bytes() -> Vec<u8> {
    let mut bytes = b"%PDF-1.7\n".to_vec();
    for i in 0..200 {
        bytes.extend_from_slice(format!("{} 0 obj << /Type /Page >> endobj\n", i).as_bytes());
    }
    bytes
}
