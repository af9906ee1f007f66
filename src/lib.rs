mod utils;

pub mod backdrop;
pub mod color;
pub mod debounce;
pub mod params;
pub mod particle;
pub mod surface;
pub mod viewport;
pub mod web;

use wasm_bindgen::prelude::*;

pub use backdrop::{Backdrop, Launch, Pointer, Tick};
pub use params::{Config, Params};
pub use particle::Particle;
pub use surface::{FrameScheduler, Surface, Timers};
pub use viewport::Viewport;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Entry point for the page: starts the particle backdrop on `#bg-canvas`.
/// Does nothing when the canvas is missing or reduced motion is requested.
#[wasm_bindgen]
pub fn initialize() -> Result<(), JsValue> {
    utils::set_panic_hook();
    utils::init_logger();
    web::mount().map(|_| ())
}
