use crate::params::Params;

/// Logical size of the page in CSS pixels, plus the (capped) device pixel ratio.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Viewport {
        let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(Params::MAX_DEVICE_PIXEL_RATIO)
        } else {
            1.0
        };
        Viewport {
            width: width.max(0.0),
            height: height.max(0.0),
            device_pixel_ratio,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    // Size of the canvas backing store
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width * self.device_pixel_ratio).floor() as u32,
            (self.height * self.device_pixel_ratio).floor() as u32,
        )
    }
}
