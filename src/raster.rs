use crate::constants::PIXEL_SIZE;
use crate::error::{Result, TaskError};
use std::fmt;

/// Geographic output bounds, EPSG:4326.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Parses a `minx,miny,maxx,maxy` extent string.
    pub fn parse(extent: &str) -> Result<Self> {
        let parts: Vec<f64> = extent
            .split(',')
            .map(|c| c.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| TaskError::Config(format!("Invalid extent '{}': {}", extent, e)))?;

        if parts.len() != 4 {
            return Err(TaskError::Config(format!(
                "Extent must have 4 coordinates, got {}: '{}'",
                parts.len(),
                extent
            )));
        }

        let bounds = Bounds {
            min_x: parts[0],
            min_y: parts[1],
            max_x: parts[2],
            max_y: parts[3],
        };
        if !bounds.min_x.is_finite()
            || !bounds.min_y.is_finite()
            || !bounds.max_x.is_finite()
            || !bounds.max_y.is_finite()
            || bounds.min_x >= bounds.max_x
            || bounds.min_y >= bounds.max_y
        {
            return Err(TaskError::Config(format!("Degenerate extent: '{}'", extent)));
        }

        Ok(bounds)
    }

    /// Snaps to the pixel grid the way gdal_rasterize -tap does: mins floored,
    /// maxes ceiled to multiples of the pixel size.
    pub fn target_aligned(&self, pixel_size: f64) -> Bounds {
        Bounds {
            min_x: (self.min_x / pixel_size).floor() * pixel_size,
            min_y: (self.min_y / pixel_size).floor() * pixel_size,
            max_x: (self.max_x / pixel_size).ceil() * pixel_size,
            max_y: (self.max_y / pixel_size).ceil() * pixel_size,
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Pixel grid implied by target-aligned bounds at the task pixel size.
#[derive(Debug, Clone, Copy)]
pub struct Grid {
    pub width: u64,
    pub height: u64,
}

impl Grid {
    pub fn from_bounds(bounds: &Bounds) -> Grid {
        let aligned = bounds.target_aligned(PIXEL_SIZE);
        Grid {
            width: ((aligned.max_x - aligned.min_x) / PIXEL_SIZE).round() as u64,
            height: ((aligned.max_y - aligned.min_y) / PIXEL_SIZE).round() as u64,
        }
    }

    /// Vertical strips for splitting the stacked image: `count` strips of
    /// `ceil(width / count)` pixels, the last taking the remainder.
    pub fn strips(&self, count: usize) -> Vec<Strip> {
        let count = count.max(1) as u64;
        let strip_width = self.width.div_ceil(count);
        let mut strips = Vec::new();
        let mut x_off = 0;
        while x_off < self.width {
            let width = strip_width.min(self.width - x_off);
            strips.push(Strip {
                x_off,
                width,
                height: self.height,
            });
            x_off += width;
        }
        strips
    }
}

/// One vertical window of the stacked image, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strip {
    pub x_off: u64,
    pub width: u64,
    pub height: u64,
}
