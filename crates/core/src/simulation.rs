//! The falling-petal layer: a fixed-size set of petals advanced every frame.
//!
//! The collection is created in one batch. Petals that leave the viewport are
//! reseeded in place, so the count only changes through [`PetalSimulation::repopulate`]
//! or a sprite change, both of which rebuild the whole set.

use serde_json::{json, Value};

use crate::config::{PetalConfig, DEFAULT_PETAL_COUNT, DEFAULT_PETAL_SPEED, MAX_PETAL_COUNT};
use crate::engine::Engine;
use crate::petal::{Direction, Petal};
use crate::prng::{RandomSource, Xorshift64};
use crate::surface::{Sprite, Surface, Viewport};

/// Falling-petal particle system.
///
/// Generic over its random source so tests can script every draw; hosts use
/// the default [`Xorshift64`].
pub struct PetalSimulation<R = Xorshift64> {
    petals: Vec<Petal>,
    viewport: Viewport,
    sprite: Sprite,
    speed: f64,
    direction: Direction,
    resets: u64,
    rng: R,
}

impl<R: RandomSource> PetalSimulation<R> {
    /// Creates `config.count` petals spread across `viewport`.
    ///
    /// Called once the sprite has loaded, since resets need its width.
    /// A non-finite configured speed is replaced by the default.
    pub fn new(config: &PetalConfig, viewport: Viewport, sprite: Sprite, rng: R) -> Self {
        let speed = if config.speed.is_finite() {
            config.speed
        } else {
            log::warn!("non-finite petal speed {}, using {DEFAULT_PETAL_SPEED}", config.speed);
            DEFAULT_PETAL_SPEED
        };
        let mut sim = Self {
            petals: Vec::new(),
            viewport,
            sprite,
            speed,
            direction: config.direction,
            resets: 0,
            rng,
        };
        sim.repopulate(config.count);
        sim
    }

    pub fn petals(&self) -> &[Petal] {
        &self.petals
    }

    pub fn len(&self) -> usize {
        self.petals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.petals.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn sprite(&self) -> Sprite {
        self.sprite
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Total petal resets since creation.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Re-applies velocity to every petal for a new speed and direction.
    ///
    /// Positions, sizes and phases are kept.
    pub fn set_motion(&mut self, speed: f64, direction: Direction) {
        if !speed.is_finite() {
            log::warn!("ignoring non-finite petal speed {speed}");
            return;
        }
        self.speed = speed;
        self.direction = direction;
        log::debug!(
            "petal motion: speed {speed}, direction {direction}, {} petals",
            self.petals.len()
        );
        for petal in &mut self.petals {
            petal.set_velocity(&mut self.rng, speed, direction);
        }
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.set_motion(speed, self.direction);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.set_motion(self.speed, direction);
    }

    /// Discards every petal and creates `count` new ones, at most
    /// [`MAX_PETAL_COUNT`].
    pub fn repopulate(&mut self, count: usize) {
        let count = count.min(MAX_PETAL_COUNT);
        let (viewport, speed, direction) = (self.viewport, self.speed, self.direction);
        let mut petals = Vec::with_capacity(count);
        for _ in 0..count {
            petals.push(Petal::new(&mut self.rng, viewport, speed, direction));
        }
        self.petals = petals;
        log::debug!(
            "populated {count} petals over {}x{}",
            viewport.width,
            viewport.height
        );
    }

    /// Swaps the sprite and rebuilds the collection.
    pub fn set_sprite(&mut self, sprite: Sprite) {
        self.sprite = sprite;
        self.repopulate(self.petals.len());
    }

    /// Tracks a viewport resize. Existing petals keep their positions.
    pub fn resize(&mut self, viewport: Viewport) {
        log::debug!("petal viewport {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
    }
}

impl<R: RandomSource> Engine for PetalSimulation<R> {
    fn step(&mut self, pointer_x: f64) {
        let pointer_x = if pointer_x.is_finite() { pointer_x } else { 0.0 };
        for petal in &mut self.petals {
            if petal.advance(&mut self.rng, self.viewport, self.sprite, pointer_x) {
                self.resets += 1;
            }
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        for petal in &self.petals {
            petal.render(surface);
        }
    }

    fn params(&self) -> Value {
        json!({
            "speed": self.speed,
            "count": self.petals.len(),
            "direction": self.direction,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "speed": {
                "type": "number",
                "default": DEFAULT_PETAL_SPEED,
                "min": 0.0,
                "max": 10.0,
                "description": "Speed multiplier for every petal's velocity"
            },
            "count": {
                "type": "integer",
                "default": DEFAULT_PETAL_COUNT,
                "min": 0,
                "max": MAX_PETAL_COUNT,
                "description": "Number of petals; changing it rebuilds the field"
            },
            "direction": {
                "type": "string",
                "default": Direction::Down,
                "enum": Direction::ALL,
                "description": "Travel direction; unknown values fall back to down"
            }
        })
    }
}
