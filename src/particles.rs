use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::TAU;

pub(crate) const NUM_PLANKTON: usize = 140;
pub(crate) const NUM_BUBBLES: usize = 45;

// Water column in normalized scene coordinates.
pub(crate) const WATER_TOP: f32 = 0.40;
pub(crate) const WATER_BOTTOM: f32 = 0.96;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Plankton {
    pub(crate) x: f32,
    pub(crate) y: f32,
    speed: f32,
    pub(crate) size: f32,
    phase: f32,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Bubble {
    pub(crate) x: f32,
    pub(crate) y: f32,
    speed: f32,
    pub(crate) size: f32,
    pub(crate) alpha: u8,
}

pub(crate) struct ParticleField {
    rng: StdRng,
    pub(crate) plankton: Vec<Plankton>,
    pub(crate) bubbles: Vec<Bubble>,
}

impl ParticleField {
    pub(crate) fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let plankton = (0..NUM_PLANKTON)
            .map(|_| Plankton {
                x: rng.gen::<f32>(),
                y: rng.gen_range(WATER_TOP..WATER_BOTTOM),
                speed: rng.gen_range(0.018..0.055),
                size: rng.gen_range(0.0035..0.0075),
                phase: rng.gen::<f32>() * TAU,
            })
            .collect();

        let bubbles = (0..NUM_BUBBLES)
            .map(|_| Bubble {
                x: rng.gen::<f32>(),
                y: rng.gen_range(0.60..WATER_BOTTOM),
                speed: rng.gen_range(0.04..0.09),
                size: rng.gen_range(0.004..0.011),
                alpha: rng.gen_range(50..90),
            })
            .collect();

        Self {
            rng,
            plankton,
            bubbles,
        }
    }

    pub(crate) fn update(&mut self, dt: f32, time: f32) {
        for p in &mut self.plankton {
            p.y += p.speed * dt;
            p.x += (time + p.phase).sin() * 0.045 * dt;

            if p.y > WATER_BOTTOM {
                p.y = WATER_TOP;
            }
            if p.x < 0.0 {
                p.x = 1.0;
            } else if p.x > 1.0 {
                p.x = 0.0;
            }
        }

        for b in &mut self.bubbles {
            b.y -= b.speed * dt;
            if b.y < WATER_TOP {
                b.y = WATER_BOTTOM;
                b.x = self.rng.gen::<f32>();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawns_the_configured_population() {
        let field = ParticleField::new(7);
        assert_eq!(field.plankton.len(), NUM_PLANKTON);
        assert_eq!(field.bubbles.len(), NUM_BUBBLES);
    }

    #[test]
    fn particles_stay_inside_the_water_column() {
        let mut field = ParticleField::new(42);
        let mut time = 0.0;
        for _ in 0..2000 {
            time += 1.0 / 60.0;
            field.update(1.0 / 60.0, time);
        }
        for p in &field.plankton {
            assert!(p.y >= WATER_TOP && p.y <= WATER_BOTTOM + 1e-3);
            assert!(p.x >= -1e-3 && p.x <= 1.0 + 1e-3);
        }
        for b in &field.bubbles {
            assert!(b.y >= WATER_TOP - 1e-3 && b.y <= WATER_BOTTOM + 1e-3);
        }
    }

    #[test]
    fn bubbles_respawn_at_the_bottom() {
        let mut field = ParticleField::new(3);
        // force one bubble over the surface
        field.bubbles[0].y = WATER_TOP + 1e-4;
        for _ in 0..10 {
            field.update(0.1, 0.0);
        }
        let b = field.bubbles[0];
        assert!(b.y > WATER_TOP, "bubble was not recycled, y = {}", b.y);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let mut a = ParticleField::new(9);
        let mut b = ParticleField::new(9);
        for i in 0..300 {
            let t = i as f32 / 60.0;
            a.update(1.0 / 60.0, t);
            b.update(1.0 / 60.0, t);
        }
        for (pa, pb) in a.plankton.iter().zip(&b.plankton) {
            assert_eq!(pa.x.to_bits(), pb.x.to_bits());
            assert_eq!(pa.y.to_bits(), pb.y.to_bits());
        }
        for (ba, bb) in a.bubbles.iter().zip(&b.bubbles) {
            assert_eq!(ba.y.to_bits(), bb.y.to_bits());
        }
    }
}
