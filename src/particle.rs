// Simple particle struct to keep track of individual position, velocity, size, and color

use crate::color::{Color, PALETTE};
use crate::params::Config;
use rand::Rng;
use vecmath::{vec2_add, vec2_scale, vec2_sub, Vector2};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vector2<f64>,
    pub vel: Vector2<f64>,
    pub radius: f64,
    pub color: Color,
}

impl Particle {
    pub fn new(pos_x: f64, pos_y: f64, vel_x: f64, vel_y: f64, radius: f64, color: Color) -> Particle {
        Particle {
            pos: [pos_x, pos_y],
            vel: [vel_x, vel_y],
            radius,
            color,
        }
    }

    // Scattered uniformly over the viewport with a slow random drift
    pub fn random<R: Rng>(rng: &mut R, width: f64, height: f64, config: &Config) -> Particle {
        let speed = config.initial_speed;
        let pos_x = rng.gen::<f64>() * width;
        let pos_y = rng.gen::<f64>() * height;
        let vel_x = rng.gen::<f64>() * (2.0 * speed) - speed;
        let vel_y = rng.gen::<f64>() * (2.0 * speed) - speed;
        let radius = rng.gen::<f64>() * (config.max_radius - config.min_radius) + config.min_radius;
        let color = PALETTE[rng.gen_range(0, PALETTE.len())];
        Particle::new(pos_x, pos_y, vel_x, vel_y, radius, color)
    }

    /// Bias velocity toward `target`, proportionally to the distance from it.
    pub fn pull_toward(&mut self, target: Vector2<f64>, strength: f64) {
        let offset = vec2_sub(target, self.pos);
        self.vel = vec2_add(self.vel, vec2_scale(offset, strength));
    }

    pub fn clamp_velocity(&mut self, max: f64) {
        for v in self.vel.iter_mut() {
            *v = v.max(-max).min(max);
        }
    }

    /// One frame of motion, wrapping softly once the particle is `margin`
    /// beyond an edge.
    pub fn advance(&mut self, width: f64, height: f64, margin: f64) {
        self.pos = vec2_add(self.pos, self.vel);
        self.pos[0] = wrap(self.pos[0], width, margin);
        self.pos[1] = wrap(self.pos[1], height, margin);
    }
}

fn wrap(value: f64, extent: f64, margin: f64) -> f64 {
    if value < -margin {
        extent + margin
    } else if value > extent + margin {
        -margin
    } else {
        value
    }
}
