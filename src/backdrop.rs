// Animation controller: owns the particle set, pointer and visibility state, and
// drives per-frame physics and drawing through the injected surface and scheduler.

use crate::color::LINK_COLOR;
use crate::params::Config;
use crate::particle::Particle;
use crate::surface::{FrameScheduler, Surface};
use crate::viewport::Viewport;
use rand::Rng;
use vecmath::{vec2_square_len, vec2_sub, Vector2};
use wasm_bindgen::JsValue;

/// Whether the effect should run at all on this page
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Launch {
    Animate,
    NoSurface,
    ReducedMotion,
}

impl Launch {
    pub fn assess(surface_present: bool, prefers_reduced_motion: bool) -> Launch {
        if !surface_present {
            Launch::NoSurface
        } else if prefers_reduced_motion {
            Launch::ReducedMotion
        } else {
            Launch::Animate
        }
    }
}

/// What a single tick did
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Tick {
    Drawn,
    // Frame arrived too late to be worth drawing
    Skipped,
    Paused,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Pointer {
    pub pos: Vector2<f64>,
    pub active: bool,
}

pub struct Backdrop<S, F, R> {
    surface: S,
    frames: F,
    rng: R,
    config: Config,
    viewport: Viewport,
    particles: Vec<Particle>,
    pointer: Pointer,
    paused: bool,
    last_time: f64,
    pending_frame: Option<i32>,
}

impl<S: Surface, F: FrameScheduler, R: Rng> Backdrop<S, F, R> {
    /// Sizes the surface and seeds the particles, but schedules nothing until
    /// [`Backdrop::start`].
    pub fn new(
        surface: S,
        frames: F,
        rng: R,
        config: Config,
        viewport: Viewport,
    ) -> Result<Self, JsValue> {
        let mut backdrop = Backdrop {
            surface,
            frames,
            rng,
            config,
            viewport,
            particles: Vec::new(),
            pointer: Pointer::default(),
            paused: false,
            last_time: 0.0,
            pending_frame: None,
        };
        backdrop.resize(viewport)?;
        Ok(backdrop)
    }

    pub fn resize(&mut self, viewport: Viewport) -> Result<(), JsValue> {
        self.viewport = viewport;
        self.surface.resize(&viewport)?;
        self.initialize_particles();
        log::debug!(
            "backdrop resized to {}x{} @{}x, {} particles",
            viewport.width,
            viewport.height,
            viewport.device_pixel_ratio,
            self.particles.len()
        );
        Ok(())
    }

    fn initialize_particles(&mut self) {
        let count = self.config.particle_count(self.viewport.area());
        let (width, height) = (self.viewport.width, self.viewport.height);
        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let p = Particle::random(&mut self.rng, width, height, &self.config);
            self.particles.push(p);
        }
    }

    pub fn start(&mut self, now: f64, hidden: bool) -> Result<(), JsValue> {
        self.last_time = now;
        self.paused = hidden;
        if !hidden {
            self.schedule()?;
        }
        Ok(())
    }

    /// Frame callback. The caller's frame has fired, so the pending handle is
    /// consumed before anything else.
    pub fn tick(&mut self, timestamp: f64) -> Result<Tick, JsValue> {
        self.pending_frame = None;
        if self.paused {
            return Ok(Tick::Paused);
        }
        let elapsed = timestamp - self.last_time;
        self.last_time = timestamp;

        let outcome = if elapsed < self.config.frame_budget_ms() {
            self.draw()?;
            Tick::Drawn
        } else {
            Tick::Skipped
        };
        self.schedule()?;
        Ok(outcome)
    }

    pub fn draw(&mut self) -> Result<(), JsValue> {
        let Viewport { width, height, .. } = self.viewport;
        self.surface.clear(width, height)?;

        for p in self.particles.iter_mut() {
            if self.pointer.active {
                p.pull_toward(self.pointer.pos, self.config.pointer_pull);
            }
            p.clamp_velocity(self.config.max_speed);
            p.advance(width, height, self.config.wrap_margin);
            self.surface
                .fill_circle(p.pos, p.radius, p.color, self.config.particle_alpha)?;
        }

        let link_distance = self.config.link_distance(self.viewport.area());
        let max2 = link_distance * link_distance;
        for (i, p) in self.particles.iter().enumerate() {
            for q in &self.particles[i + 1..] {
                let dist2 = vec2_square_len(vec2_sub(p.pos, q.pos));
                if dist2 < max2 {
                    let alpha = self.config.link_alpha(dist2, max2);
                    self.surface
                        .stroke_line(p.pos, q.pos, self.config.link_width, LINK_COLOR, alpha)?;
                }
            }
        }
        Ok(())
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer = Pointer {
            pos: [x, y],
            active: true,
        };
    }

    pub fn pointer_left(&mut self) {
        self.pointer.active = false;
    }

    pub fn set_hidden(&mut self, hidden: bool, now: f64) -> Result<(), JsValue> {
        if hidden {
            self.paused = true;
            self.cancel()
        } else if self.paused {
            self.paused = false;
            self.last_time = now;
            self.tick(now).map(|_| ())
        } else {
            Ok(())
        }
    }

    /// Page is going away; drop whatever frame is still outstanding.
    pub fn shutdown(&mut self) -> Result<(), JsValue> {
        self.cancel()
    }

    fn schedule(&mut self) -> Result<(), JsValue> {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.frames.request_frame()?);
        }
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), JsValue> {
        if let Some(handle) = self.pending_frame.take() {
            self.frames.cancel_frame(handle)?;
        }
        Ok(())
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pending_frame(&self) -> Option<i32> {
        self.pending_frame
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    #[cfg(test)]
    pub(crate) fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[cfg(test)]
    pub(crate) fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PALETTE;
    use crate::surface::mock::{Call, ManualFrames, RecordingSurface};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type TestBackdrop = Backdrop<RecordingSurface, ManualFrames, StdRng>;

    fn backdrop(width: f64, height: f64) -> TestBackdrop {
        Backdrop::new(
            RecordingSurface::default(),
            ManualFrames::default(),
            StdRng::seed_from_u64(42),
            Config::default(),
            Viewport::new(width, height, 1.0),
        )
        .unwrap()
    }

    // Fires the outstanding frame, the way the browser would
    fn fire(b: &mut TestBackdrop, timestamp: f64) -> Option<Tick> {
        b.frames_mut().fire().map(|_| b.tick(timestamp).unwrap())
    }

    #[test]
    fn launch_requires_surface_and_motion() {
        assert_eq!(Launch::assess(true, false), Launch::Animate);
        assert_eq!(Launch::assess(true, true), Launch::ReducedMotion);
        assert_eq!(Launch::assess(false, false), Launch::NoSurface);
        assert_eq!(Launch::assess(false, true), Launch::NoSurface);
    }

    #[test]
    fn new_sizes_surface_and_seeds_particles() {
        let b = backdrop(1280.0, 720.0);
        assert_eq!(b.particles().len(), 57);
        assert_eq!(
            b.surface().calls,
            vec![Call::Resize(Viewport::new(1280.0, 720.0, 1.0))]
        );
        assert_eq!(b.pending_frame(), None);
        assert_eq!(b.frames().requested, 0);
    }

    #[test]
    fn resize_replaces_particle_set() {
        let mut b = backdrop(1280.0, 720.0);
        b.resize(Viewport::new(3840.0, 2160.0, 3.0)).unwrap();
        assert_eq!(b.particles().len(), 140);
        assert_eq!(b.viewport().device_pixel_ratio, 2.0);
        for p in b.particles() {
            assert!(p.pos[0] < 3840.0 && p.pos[1] < 2160.0);
        }
        b.resize(Viewport::new(200.0, 200.0, 1.0)).unwrap();
        assert_eq!(b.particles().len(), 30);
    }

    #[test]
    fn draw_clears_then_renders_every_particle() {
        let mut b = backdrop(800.0, 600.0);
        b.surface_mut().calls.clear();
        b.draw().unwrap();
        let calls = &b.surface().calls;
        assert_eq!(calls[0], Call::Clear(800.0, 600.0));
        assert_eq!(b.surface().circles(), b.particles().len());
        for call in calls {
            if let Call::Circle { alpha, color, .. } = call {
                assert_eq!(*alpha, 0.95);
                assert!(PALETTE.contains(color));
            }
        }
    }

    #[test]
    fn velocity_stays_clamped_under_strong_pull() {
        let mut b = backdrop(1024.0, 768.0);
        b.pointer_moved(5000.0, -5000.0);
        for _ in 0..200 {
            b.draw().unwrap();
            for p in b.particles() {
                assert!(p.vel[0].abs() <= 0.6 && p.vel[1].abs() <= 0.6);
            }
        }
    }

    #[test]
    fn pointer_only_pulls_while_active() {
        let mut b = backdrop(800.0, 600.0);
        b.particles_mut().truncate(1);
        b.particles_mut()[0] = Particle::new(100.0, 100.0, 0.0, 0.0, 2.0, PALETTE[0]);

        b.pointer_moved(300.0, 100.0);
        b.draw().unwrap();
        let p = b.particles()[0];
        assert!((p.vel[0] - 0.18).abs() < 1e-12);
        assert!((p.pos[0] - 100.18).abs() < 1e-9);

        b.pointer_left();
        assert!(!b.pointer().active);
        b.draw().unwrap();
        assert!((b.particles()[0].vel[0] - 0.18).abs() < 1e-12);
    }

    #[test]
    fn links_only_nearby_pairs() {
        let mut b = backdrop(1024.0, 1024.0);
        // Link threshold for 1024x1024 is 128px
        *b.particles_mut() = vec![
            Particle::new(100.0, 100.0, 0.0, 0.0, 2.0, PALETTE[0]),
            Particle::new(150.0, 100.0, 0.0, 0.0, 2.0, PALETTE[1]),
            Particle::new(100.0, 220.0, 0.0, 0.0, 2.0, PALETTE[2]),
            Particle::new(900.0, 900.0, 0.0, 0.0, 2.0, PALETTE[0]),
        ];
        b.surface_mut().calls.clear();
        b.draw().unwrap();
        let lines = b.surface().lines();
        // (0,1) at 50px, (0,2) at 120px, (1,2) at 130px is out of range
        assert_eq!(lines.len(), 2);
        let alphas: Vec<f64> = lines
            .iter()
            .map(|c| match c {
                Call::Line { alpha, width, .. } => {
                    assert_eq!(*width, 1.0);
                    *alpha
                }
                _ => unreachable!(),
            })
            .collect();
        assert!(alphas[0] > alphas[1]);
        assert!(alphas.iter().all(|a| *a >= 0.05 && *a <= 0.28));
    }

    #[test]
    fn start_schedules_first_frame() {
        let mut b = backdrop(800.0, 600.0);
        b.start(1000.0, false).unwrap();
        assert_eq!(b.pending_frame(), Some(1));
        assert!(!b.is_paused());
    }

    #[test]
    fn start_hidden_stays_idle() {
        let mut b = backdrop(800.0, 600.0);
        b.start(1000.0, true).unwrap();
        assert!(b.is_paused());
        assert_eq!(b.frames().requested, 0);
    }

    #[test]
    fn tick_draws_and_reschedules() {
        let mut b = backdrop(800.0, 600.0);
        b.start(1000.0, false).unwrap();
        b.surface_mut().calls.clear();
        assert_eq!(fire(&mut b, 1016.0), Some(Tick::Drawn));
        assert_eq!(b.surface().circles(), b.particles().len());
        assert_eq!(b.frames().pending, vec![2]);
        assert_eq!(b.pending_frame(), Some(2));
    }

    #[test]
    fn slow_frames_skip_drawing_but_keep_looping() {
        let mut b = backdrop(800.0, 600.0);
        b.start(1000.0, false).unwrap();
        b.surface_mut().calls.clear();
        assert_eq!(fire(&mut b, 1100.0), Some(Tick::Skipped));
        assert!(b.surface().calls.is_empty());
        assert!(b.pending_frame().is_some());
        // Next frame is back on pace relative to the skipped one
        assert_eq!(fire(&mut b, 1116.0), Some(Tick::Drawn));
    }

    #[test]
    fn hidden_page_stops_the_loop() {
        let mut b = backdrop(800.0, 600.0);
        b.start(1000.0, false).unwrap();
        fire(&mut b, 1016.0);
        b.set_hidden(true, 1020.0).unwrap();
        assert!(b.is_paused());
        assert_eq!(b.pending_frame(), None);
        assert_eq!(b.frames().cancelled, vec![2]);
        assert!(b.frames().pending.is_empty());
        assert_eq!(fire(&mut b, 1032.0), None);
    }

    #[test]
    fn paused_tick_does_not_reschedule() {
        let mut b = backdrop(800.0, 600.0);
        b.start(1000.0, false).unwrap();
        b.set_hidden(true, 1001.0).unwrap();
        b.surface_mut().calls.clear();
        assert_eq!(b.tick(1016.0).unwrap(), Tick::Paused);
        assert!(b.surface().calls.is_empty());
        assert_eq!(b.pending_frame(), None);
    }

    #[test]
    fn visible_page_resumes_within_one_frame() {
        let mut b = backdrop(800.0, 600.0);
        b.start(1000.0, false).unwrap();
        b.set_hidden(true, 1010.0).unwrap();
        b.surface_mut().calls.clear();

        // Long gap while hidden must not count as a slow frame
        b.set_hidden(false, 60_000.0).unwrap();
        assert!(!b.is_paused());
        assert_eq!(b.surface().circles(), b.particles().len());
        assert_eq!(b.frames().pending.len(), 1);
        assert_eq!(fire(&mut b, 60_016.0), Some(Tick::Drawn));
    }

    #[test]
    fn repeated_visibility_changes_keep_a_single_loop() {
        let mut b = backdrop(800.0, 600.0);
        b.start(1000.0, false).unwrap();
        b.set_hidden(false, 1005.0).unwrap();
        assert_eq!(b.frames().pending.len(), 1);

        b.set_hidden(true, 1010.0).unwrap();
        b.set_hidden(true, 1011.0).unwrap();
        b.set_hidden(false, 1020.0).unwrap();
        b.set_hidden(false, 1021.0).unwrap();
        assert_eq!(b.frames().pending.len(), 1);
    }

    #[test]
    fn shutdown_cancels_pending_frame() {
        let mut b = backdrop(800.0, 600.0);
        b.start(1000.0, false).unwrap();
        b.shutdown().unwrap();
        assert_eq!(b.frames().cancelled, vec![1]);
        assert_eq!(b.pending_frame(), None);
        b.shutdown().unwrap();
        assert_eq!(b.frames().cancelled, vec![1]);
    }

    #[test]
    fn independent_instances_do_not_share_state() {
        let mut a = backdrop(800.0, 600.0);
        let b = backdrop(800.0, 600.0);
        a.pointer_moved(10.0, 10.0);
        a.start(0.0, false).unwrap();
        assert!(!b.pointer().active);
        assert_eq!(b.pending_frame(), None);
    }
}
