//! Particle effects
//!
//! Short-lived colored dots for lava embers, repellent bursts, potion
//! sparkles and damage sparks. Particles live in world pixels so they stay
//! put when the camera moves. Each one fades linearly from opaque to
//! transparent over its lifetime while its color drifts toward `fade_to`.

use macroquad::math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::camera::Camera;
use crate::platform::surface::{Rgba, Surface};

/// Hard cap on particles per burst.
pub const MAX_BURST: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Added to `velocity.y` every second, +Y is down
    pub gravity: f32,
    pub age: f32,
    pub lifetime: f32,
    pub color: Rgba,
    pub fade_to: Rgba,
    pub size: f32,
}

impl Particle {
    pub fn is_alive(&self) -> bool {
        self.age < self.lifetime
    }

    /// 255 when born, 0 at the end of life.
    pub fn alpha(&self) -> u8 {
        if self.lifetime <= 0.0 {
            return 0;
        }
        (255.0 * (1.0 - self.age / self.lifetime)).clamp(0.0, 255.0) as u8
    }

    fn current_color(&self) -> Rgba {
        let t = if self.lifetime > 0.0 {
            (self.age / self.lifetime).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Rgba::rgba(
            lerp_u8(self.color.r, self.fade_to.r, t),
            lerp_u8(self.color.g, self.fade_to.g, t),
            lerp_u8(self.color.b, self.fade_to.b, t),
            self.alpha(),
        )
    }

    fn step(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.velocity.y += self.gravity * dt;
        self.age += dt;
    }
}

/// How to spawn one burst.
#[derive(Debug, Clone, PartialEq)]
pub struct BurstDef {
    pub count: usize,
    pub color: Rgba,
    pub fade_to: Rgba,
    /// Pixels per second
    pub speed: (f32, f32),
    /// Seconds
    pub lifetime: (f32, f32),
    /// Radius in pixels
    pub size: (f32, f32),
    /// Full cone width in degrees, 360 for all directions
    pub spread_deg: f32,
    /// Cone centre in degrees, 0 = right, 90 = down
    pub direction_deg: f32,
    pub gravity: f32,
}

impl Default for BurstDef {
    fn default() -> Self {
        Self {
            count: 10,
            color: Rgba::WHITE,
            fade_to: Rgba::WHITE,
            speed: (20.0, 50.0),
            lifetime: (0.5, 1.5),
            size: (2.0, 4.0),
            spread_deg: 360.0,
            direction_deg: 0.0,
            gravity: 0.0,
        }
    }
}

impl BurstDef {
    /// Embers rising off a fresh lava field.
    pub fn lava_embers() -> Self {
        Self {
            count: 5,
            color: Rgba::rgb(255, 100, 0),
            fade_to: Rgba::rgb(120, 20, 0),
            speed: (10.0, 30.0),
            lifetime: (1.0, 2.0),
            spread_deg: 60.0,
            direction_deg: -90.0,
            gravity: 50.0,
            ..Self::default()
        }
    }

    /// Blue ring when the repellent goes off.
    pub fn repellent_burst() -> Self {
        Self {
            count: 25,
            color: Rgba::rgb(0, 0, 255),
            fade_to: Rgba::rgb(120, 160, 255),
            speed: (50.0, 120.0),
            lifetime: (0.3, 0.9),
            ..Self::default()
        }
    }

    /// Green sparkles floating up after drinking a potion.
    pub fn potion_sparkle() -> Self {
        Self {
            count: 20,
            color: Rgba::rgb(0, 255, 0),
            fade_to: Rgba::rgb(200, 255, 200),
            speed: (30.0, 80.0),
            lifetime: (0.5, 1.2),
            gravity: -30.0,
            ..Self::default()
        }
    }

    /// Red sparks when the player takes a hit.
    pub fn damage_sparks() -> Self {
        Self {
            count: 12,
            color: Rgba::rgb(255, 40, 40),
            fade_to: Rgba::rgb(90, 0, 0),
            speed: (40.0, 100.0),
            lifetime: (0.2, 0.5),
            size: (1.5, 3.0),
            gravity: 80.0,
            ..Self::default()
        }
    }
}

pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: StdRng,
    max_burst: usize,
}

impl ParticleSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            max_burst: MAX_BURST,
        }
    }

    /// Lower the per-burst cap. Never raises it above `MAX_BURST`.
    pub fn with_max_burst(mut self, max_burst: usize) -> Self {
        self.max_burst = max_burst.min(MAX_BURST);
        self
    }

    fn uniform(&mut self, (a, b): (f32, f32)) -> f32 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if lo == hi {
            lo
        } else {
            self.rng.gen_range(lo..=hi)
        }
    }

    /// Spawn a burst at world pixel `(x, y)`. Returns how many were spawned.
    pub fn emit(&mut self, x: f32, y: f32, def: &BurstDef) -> usize {
        let count = def.count.min(self.max_burst);
        let half = def.spread_deg.abs() * 0.5;
        for _ in 0..count {
            let angle = (def.direction_deg + self.uniform((-half, half))).to_radians();
            let speed = self.uniform(def.speed);
            let lifetime = self.uniform(def.lifetime);
            let size = self.uniform(def.size);
            self.particles.push(Particle {
                position: Vec2::new(x, y),
                velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
                gravity: def.gravity,
                age: 0.0,
                lifetime,
                color: def.color,
                fade_to: def.fade_to,
                size,
            });
        }
        count
    }

    pub fn update(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.step(dt);
        }
        self.particles.retain(Particle::is_alive);
    }

    pub fn render(&self, surface: &mut dyn Surface, camera: &Camera) {
        let (w, h) = surface.size();
        for particle in &self.particles {
            let color = particle.current_color();
            if color.a == 0 {
                continue;
            }
            let screen = camera.world_px_to_screen(particle.position.x, particle.position.y);
            let radius = particle.size * camera.zoom();
            if screen.x < -radius || screen.y < -radius || screen.x > w + radius || screen.y > h + radius {
                continue;
            }
            surface.draw_circle(screen.x, screen.y, radius, color);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 * (1.0 - t) + b as f32 * t).clamp(0.0, 255.0) as u8
}
