//! Ambient particle field: decorative drifting specks, unrelated to
//! gestures.  Spawns lazily up to a fixed count and bounces off the
//! viewport edges.

use rand::Rng;

use crate::geometry::{Point, Vec2, ViewportSize};
use crate::paths::Color;
use crate::render::Canvas;

pub const PARTICLE_COLOR: Color = Color::CYAN;
pub const PARTICLE_ALPHA: f32 = 0.1;
const MAX_SPEED: f32 = 0.25;
const MAX_RADIUS: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub pos:    Point,
    pub vel:    Vec2,
    pub radius: f32,
}

#[derive(Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    capacity:  usize,
}

impl ParticleField {
    pub fn new(capacity: usize) -> Self {
        ParticleField { particles: Vec::with_capacity(capacity), capacity }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Spawn at most one particle, then move and bounce every particle.
    pub fn tick<R: Rng>(&mut self, size: ViewportSize, rng: &mut R) {
        if self.particles.len() < self.capacity && size.width > 0.0 && size.height > 0.0 {
            self.particles.push(Particle {
                pos:    Point::new(rng.random_range(0.0..size.width), rng.random_range(0.0..size.height)),
                vel:    Vec2::new(
                    rng.random_range(-MAX_SPEED..MAX_SPEED),
                    rng.random_range(-MAX_SPEED..MAX_SPEED),
                ),
                radius: rng.random_range(0.0..MAX_RADIUS),
            });
        }

        for p in &mut self.particles {
            p.pos += p.vel;
            if p.pos.x < 0.0 || p.pos.x > size.width {
                p.vel.x = -p.vel.x;
            }
            if p.pos.y < 0.0 || p.pos.y > size.height {
                p.vel.y = -p.vel.y;
            }
        }
    }

    /// Draw every particle as a faint disk.  The caller clears the surface.
    pub fn draw<C: Canvas>(&self, canvas: &mut C) {
        for p in &self.particles {
            canvas.fill_circle(p.pos, p.radius, PARTICLE_COLOR, PARTICLE_ALPHA);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::{Op, Recorder};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const VP: ViewportSize = ViewportSize::new(300.0, 200.0);

    #[test]
    fn spawns_one_per_tick_up_to_capacity() {
        let mut field = ParticleField::new(3);
        let mut rng = StdRng::seed_from_u64(3);
        for expected in [1, 2, 3, 3, 3] {
            field.tick(VP, &mut rng);
            assert_eq!(field.particles().len(), expected);
        }
    }

    #[test]
    fn bounces_off_edges() {
        let mut field = ParticleField::new(0);
        field.particles.push(Particle {
            pos: Point::new(0.1, 100.0),
            vel: Vec2::new(-0.2, 0.0),
            radius: 1.0,
        });
        field.tick(VP, &mut StdRng::seed_from_u64(3));
        assert!(field.particles()[0].vel.x > 0.0);
    }

    #[test]
    fn draws_each_particle() {
        let mut field = ParticleField::new(5);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..5 { field.tick(VP, &mut rng); }
        let mut canvas = Recorder::default();
        field.draw(&mut canvas);
        assert_eq!(canvas.ops.iter().filter(|op| matches!(op, Op::Circle(..))).count(), 5);
    }
}
