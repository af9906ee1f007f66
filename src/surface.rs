// Seams between the controller and the browser: where pixels go, and how the
// next frame gets scheduled

use crate::color::Color;
use crate::viewport::Viewport;
use vecmath::Vector2;
use wasm_bindgen::JsValue;

pub trait Surface {
    /// Resize the backing store to the viewport's physical size and scale
    /// drawing so callers keep working in logical pixels.
    fn resize(&mut self, viewport: &Viewport) -> Result<(), JsValue>;

    fn clear(&mut self, width: f64, height: f64) -> Result<(), JsValue>;

    fn fill_circle(
        &mut self,
        center: Vector2<f64>,
        radius: f64,
        color: Color,
        alpha: f64,
    ) -> Result<(), JsValue>;

    fn stroke_line(
        &mut self,
        from: Vector2<f64>,
        to: Vector2<f64>,
        width: f64,
        color: Color,
        alpha: f64,
    ) -> Result<(), JsValue>;
}

pub trait FrameScheduler {
    /// Ask for the controller to be ticked on the next frame, returning a handle
    /// that can cancel the request.
    fn request_frame(&mut self) -> Result<i32, JsValue>;

    fn cancel_frame(&mut self, handle: i32) -> Result<(), JsValue>;
}

/// One-shot timers, as setTimeout/clearTimeout hand them out
pub trait Timers {
    fn set_timeout(&mut self, delay_ms: i32) -> Result<i32, JsValue>;

    fn clear_timeout(&mut self, handle: i32);
}
