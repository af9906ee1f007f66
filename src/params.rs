/// Tuning parameters for the particle network
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Surface
    pub const CANVAS_ID: &'static str = "bg-canvas";
    pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;
    pub const RESIZE_DEBOUNCE_MS: i32 = 150;

    // Population: roughly one particle per 16k px^2
    pub const AREA_PER_PARTICLE: f64 = 16_000.0;
    pub const MIN_PARTICLES: usize = 30;
    pub const MAX_PARTICLES: usize = 140;

    // Particles
    pub const INITIAL_SPEED: f64 = 0.35; // px per frame, per axis
    pub const MAX_SPEED: f64 = 0.6;
    pub const MIN_RADIUS: f64 = 1.2;
    pub const MAX_RADIUS: f64 = 2.6;
    pub const WRAP_MARGIN: f64 = 10.0;
    pub const PARTICLE_ALPHA: f64 = 0.95;

    // Parallax
    pub const POINTER_PULL: f64 = 0.0009;

    // Links
    pub const MIN_LINK_DISTANCE: f64 = 90.0;
    pub const MAX_LINK_DISTANCE: f64 = 160.0;
    pub const LINK_DISTANCE_DIVISOR: f64 = 8.0;
    pub const LINK_ALPHA_SCALE: f64 = 0.35;
    pub const MIN_LINK_ALPHA: f64 = 0.05;
    pub const MAX_LINK_ALPHA: f64 = 0.28;
    pub const LINK_WIDTH: f64 = 1.0;

    // Frame guard
    pub const MIN_FPS: f64 = 24.0;
}

/// Runtime copy of [`Params`] held by each controller
#[derive(Debug, Clone)]
pub struct Config {
    pub area_per_particle: f64,
    pub min_particles: usize,
    pub max_particles: usize,
    pub initial_speed: f64,
    pub max_speed: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    pub wrap_margin: f64,
    pub particle_alpha: f64,
    pub pointer_pull: f64,
    pub min_link_distance: f64,
    pub max_link_distance: f64,
    pub link_distance_divisor: f64,
    pub link_alpha_scale: f64,
    pub min_link_alpha: f64,
    pub max_link_alpha: f64,
    pub link_width: f64,
    pub min_fps: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            area_per_particle: Params::AREA_PER_PARTICLE,
            min_particles: Params::MIN_PARTICLES,
            max_particles: Params::MAX_PARTICLES,
            initial_speed: Params::INITIAL_SPEED,
            max_speed: Params::MAX_SPEED,
            min_radius: Params::MIN_RADIUS,
            max_radius: Params::MAX_RADIUS,
            wrap_margin: Params::WRAP_MARGIN,
            particle_alpha: Params::PARTICLE_ALPHA,
            pointer_pull: Params::POINTER_PULL,
            min_link_distance: Params::MIN_LINK_DISTANCE,
            max_link_distance: Params::MAX_LINK_DISTANCE,
            link_distance_divisor: Params::LINK_DISTANCE_DIVISOR,
            link_alpha_scale: Params::LINK_ALPHA_SCALE,
            min_link_alpha: Params::MIN_LINK_ALPHA,
            max_link_alpha: Params::MAX_LINK_ALPHA,
            link_width: Params::LINK_WIDTH,
            min_fps: Params::MIN_FPS,
        }
    }
}

impl Config {
    pub fn particle_count(&self, area: f64) -> usize {
        // NaN and negative areas saturate to 0 and land on the minimum
        let count = (area / self.area_per_particle).floor() as usize;
        count.max(self.min_particles).min(self.max_particles)
    }

    pub fn link_distance(&self, area: f64) -> f64 {
        (area.max(0.0).sqrt() / self.link_distance_divisor)
            .max(self.min_link_distance)
            .min(self.max_link_distance)
    }

    /// Opacity of a link between two particles `dist2` apart (squared), for a
    /// threshold whose square is `max2`.
    pub fn link_alpha(&self, dist2: f64, max2: f64) -> f64 {
        let fade = 1.0 - dist2 / max2;
        (fade * self.link_alpha_scale)
            .max(self.min_link_alpha)
            .min(self.max_link_alpha)
    }

    /// Longest frame interval, in ms, that still gets drawn.
    pub fn frame_budget_ms(&self) -> f64 {
        1000.0 / self.min_fps
    }
}
