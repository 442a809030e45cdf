//! Recursive-subdivision Mandelbrot renderer built on [`forkjoin_core`].
//!
//! Grounded on the original benchmark's one-task-per-pixel design, adapted
//! to a fork-join-shaped recursive tile split (rather than one task per
//! pixel, which would need a deque capacity equal to the whole image): a
//! region recursively halves along its longer axis until it is no larger
//! than an 8x8 tile, at which point the tile is rendered directly.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use forkjoin_core::{Error, SchedulerBuilder, Spawner};

use crate::spawn_or_inline;

/// Default image width, matching the original benchmark.
pub const WIDTH: usize = 3840;
/// Default image height, matching the original benchmark.
pub const HEIGHT: usize = 2160;
const ITERATIONS: u32 = 1000;
const TILE: usize = 8;

/// A shared output image: one atomic cell per pixel.
///
/// Tiles are disjoint by construction, so each cell is written exactly
/// once; `Ordering::Relaxed` is sufficient because no reader observes a
/// pixel until [`render`] has joined every worker thread, which already
/// establishes happens-before for the whole buffer.
pub struct Image {
    width: usize,
    height: usize,
    pixels: Box<[AtomicU32]>,
}

impl Image {
    fn blank(width: usize, height: usize) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        pixels.resize_with(width * height, || AtomicU32::new(0));
        Self {
            width,
            height,
            pixels: pixels.into_boxed_slice(),
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    fn set(&self, x: usize, y: usize, rgb: u32) {
        self.pixels[y * self.width + x].store(rgb, Ordering::Relaxed);
    }

    /// Snapshots every pixel into a plain row-major `Vec<u32>`
    /// (`0x00RRGGBB` per pixel), suitable for [`crate::bmp::write_bmp`].
    pub fn to_vec(&self) -> Vec<u32> {
        self.pixels.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }
}

fn mandel(c_re: f64, c_im: f64) -> u32 {
    let (mut z_re, mut z_im) = (0.0f64, 0.0f64);
    let mut i = 0;
    while i < ITERATIONS && z_re * z_re + z_im * z_im <= 4.0 {
        let next_re = z_re * z_re - z_im * z_im + c_re;
        let next_im = 2.0 * z_re * z_im + c_im;
        z_re = next_re;
        z_im = next_im;
        i += 1;
    }
    i
}

/// Maps an escape-time count onto an RGB color, following the original
/// benchmark's banded palette.
fn torgb(n: u32) -> u32 {
    let (r, g, b): (u32, u32, u32) = if n < 128 {
        let v = 2 * n;
        (v, 0, 255 - v)
    } else if n < 256 {
        let v = 2 * (n - 128);
        (0, v, 255 - v)
    } else if n < 512 {
        let v = n - 256;
        (255 - v, v, 0)
    } else if n < 1024 {
        let v = (n - 512) / 2;
        (v, 255, v)
    } else {
        (255, 255, 255)
    };
    (r << 16) | (g << 8) | b
}

fn to_complex(x: usize, y: usize, dx: usize, dy: usize, scale: f64) -> (f64, f64) {
    (
        (x as f64 - dx as f64) / scale,
        (y as f64 - dy as f64) / scale,
    )
}

fn render_tile(image: &Image, scale: f64, dx: usize, dy: usize, x0: usize, y0: usize, w: usize, h: usize) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            let (c_re, c_im) = to_complex(x, y, dx, dy, scale);
            image.set(x, y, torgb(mandel(c_re, c_im)));
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_region(
    image: Arc<Image>,
    scale: f64,
    dx: usize,
    dy: usize,
    x0: usize,
    y0: usize,
    w: usize,
    h: usize,
    spawner: &Spawner,
) {
    if w == 0 || h == 0 {
        return;
    }
    if w <= TILE && h <= TILE {
        render_tile(&image, scale, dx, dy, x0, y0, w, h);
        return;
    }

    if w >= h {
        let left_w = (w / 2).max(1);
        let right_w = w - left_w;
        let right_image = image.clone();
        spawn_or_inline(spawner, move |spawner: &Spawner| {
            draw_region(image, scale, dx, dy, x0, y0, left_w, h, spawner)
        });
        spawn_or_inline(spawner, move |spawner: &Spawner| {
            draw_region(right_image, scale, dx, dy, x0 + left_w, y0, right_w, h, spawner)
        });
    } else {
        let top_h = (h / 2).max(1);
        let bottom_h = h - top_h;
        let bottom_image = image.clone();
        spawn_or_inline(spawner, move |spawner: &Spawner| {
            draw_region(image, scale, dx, dy, x0, y0, w, top_h, spawner)
        });
        spawn_or_inline(spawner, move |spawner: &Spawner| {
            draw_region(bottom_image, scale, dx, dy, x0, y0 + top_h, w, bottom_h, spawner)
        });
    }
}

/// Renders a `width`x`height` Mandelbrot image on a forkjoin pool.
///
/// `nthreads == 0` uses [`std::thread::available_parallelism`]; `qlen` is
/// the per-worker deque capacity (a generous bound is fine — every spawn
/// that would exceed it falls back to running inline instead of failing the
/// render).
pub fn render(nthreads: i32, qlen: i32, width: usize, height: usize) -> Result<Image, Error> {
    if nthreads < 0 {
        return Err(Error::ConfigInvalid {
            reason: "nthreads must be >= 0",
        });
    }
    if qlen <= 0 {
        return Err(Error::ConfigInvalid {
            reason: "qlen must be > 0",
        });
    }

    let image = Arc::new(Image::blank(width, height));
    let scale = width as f64 / 4.0;
    let dx = width / 2;
    let dy = height / 2;

    let seed_image = image.clone();
    let mut builder = SchedulerBuilder::new().queue_len(qlen as usize);
    if nthreads > 0 {
        builder = builder.thread_num(nthreads as usize);
    }
    builder.run(move |spawner: &Spawner| {
        draw_region(seed_image, scale, dx, dy, 0, 0, width, height, spawner);
    })?;

    Ok(Arc::try_unwrap(image)
        .unwrap_or_else(|_| unreachable!("every clone of the image handle is dropped before run() returns")))
}

/// Renders the image on the calling thread, with no scheduler involved —
/// the baseline the parallel path is benchmarked against.
pub fn render_serial(width: usize, height: usize) -> Image {
    let image = Image::blank(width, height);
    let scale = width as f64 / 4.0;
    let dx = width / 2;
    let dy = height / 2;
    render_tile(&image, scale, dx, dy, 0, 0, width, height);
    image
}
