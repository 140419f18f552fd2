//! A single falling petal: creation, velocity, per-frame motion, reset and drawing.
//!
//! Petals are plain records updated in place. They are created once in a
//! batch and reseeded in place when they drift past the trailing edge of the
//! viewport; they are never destroyed.

use std::fmt;
use std::str::FromStr;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::prng::RandomSource;
use crate::surface::{Sprite, Surface, Viewport};

/// Minimum petal width in pixels.
const MIN_WIDTH: f64 = 25.0;
/// Width spread added on top of [`MIN_WIDTH`].
const WIDTH_SPREAD: f64 = 15.0;
/// Minimum petal height in pixels.
const MIN_HEIGHT: f64 = 20.0;
/// Height spread added on top of [`MIN_HEIGHT`].
const HEIGHT_SPREAD: f64 = 10.0;
/// Opacity is `width / OPACITY_WIDTH`, so the widest petals are fully opaque.
const OPACITY_WIDTH: f64 = 40.0;
/// Upper bound of the per-petal wobble phase increment.
const MAX_PHASE_SPEED: f64 = 0.03;
/// Horizontal drift is `(DRIFT_BASE + rand * DRIFT_SPREAD) * speed`.
const DRIFT_BASE: f64 = 1.5;
const DRIFT_SPREAD: f64 = 2.0;
/// Displacement per frame per unit of normalized pointer x.
const POINTER_INFLUENCE: DVec2 = DVec2::new(5.0, 2.0);

/// Direction the petal field travels in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Down,
    Up,
    Left,
    Right,
    Diagonal,
}

impl Direction {
    pub const ALL: [Direction; 5] = [
        Direction::Down,
        Direction::Up,
        Direction::Left,
        Direction::Right,
        Direction::Diagonal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Diagonal => "diagonal",
        }
    }

    /// Parses a direction name, falling back to [`Direction::Down`] for
    /// anything unrecognised.
    pub fn from_name_or_down(name: &str) -> Direction {
        name.parse().unwrap_or_else(|e: CoreError| {
            log::warn!("{e}, falling back to down");
            Direction::Down
        })
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownDirection(s.to_string()))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One particle of the petal field.
#[derive(Debug, Clone, PartialEq)]
pub struct Petal {
    /// Top-left corner of the sprite in viewport pixels. Unbounded.
    pub position: DVec2,
    /// Base sprite size before wobble. Fixed for the petal's lifetime.
    pub size: DVec2,
    /// Derived from width at creation; never changes.
    pub opacity: f64,
    /// Wobble phase in radians, advanced every frame and re-randomised on reset.
    pub phase: f64,
    /// Per-frame phase increment, fixed at creation.
    pub phase_speed: f64,
    /// Per-frame displacement, replaced wholesale by [`Petal::set_velocity`].
    pub velocity: DVec2,
}

impl Petal {
    /// Creates a petal somewhere across the viewport width, vertically anywhere
    /// from one viewport above the top edge down to the bottom edge.
    pub fn new<R: RandomSource + ?Sized>(
        rng: &mut R,
        viewport: Viewport,
        speed: f64,
        direction: Direction,
    ) -> Self {
        let x = rng.next_f64() * viewport.width;
        let y = rng.next_range(-viewport.height, viewport.height);
        let width = MIN_WIDTH + rng.next_f64() * WIDTH_SPREAD;
        let height = MIN_HEIGHT + rng.next_f64() * HEIGHT_SPREAD;
        let phase = rng.next_f64();
        let phase_speed = rng.next_f64() * MAX_PHASE_SPEED;

        let mut petal = Self {
            position: DVec2::new(x, y),
            size: DVec2::new(width, height),
            opacity: width / OPACITY_WIDTH,
            phase,
            phase_speed,
            velocity: DVec2::ZERO,
        };
        petal.set_velocity(rng, speed, direction);
        petal
    }

    /// Replaces the velocity for the given speed and direction.
    ///
    /// | direction | x                          | y       |
    /// |-----------|----------------------------|---------|
    /// | down      | drift                      | +speed  |
    /// | up        | drift                      | -speed  |
    /// | left      | -speed                     | +speed  |
    /// | right     | +speed                     | +speed  |
    /// | diagonal  | fresh drift                | +speed  |
    ///
    /// where drift is `(1.5 + rand * 2) * speed`. The first drift is always
    /// drawn, so every direction consumes at least one random value.
    pub fn set_velocity<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        speed: f64,
        direction: Direction,
    ) {
        let sideways = drift(rng, speed);
        self.velocity = match direction {
            Direction::Down => DVec2::new(sideways, speed),
            Direction::Up => DVec2::new(sideways, -speed),
            Direction::Left => DVec2::new(-speed, speed),
            Direction::Right => DVec2::new(speed, speed),
            Direction::Diagonal => DVec2::new(drift(rng, speed), speed),
        };
    }

    /// Moves by velocity plus pointer drift and advances the wobble phase.
    ///
    /// `pointer_x` is the horizontal pointer position normalized to [0, 1]
    /// of the viewport width; it pushes petals right and down.
    pub fn step(&mut self, pointer_x: f64) {
        self.position += self.velocity + POINTER_INFLUENCE * pointer_x;
        self.phase += self.phase_speed;
    }

    /// True once the petal has moved past the bottom or right edge.
    pub fn is_past_trailing_edge(&self, viewport: Viewport) -> bool {
        self.position.y > viewport.height || self.position.x > viewport.width
    }

    /// Reseeds the petal just off the left edge with a random vertical
    /// position, a fresh phase and a random speed in [0, 1).
    ///
    /// The new velocity always uses [`Direction::Down`], whatever direction
    /// the field is configured with.
    pub fn reset<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        viewport: Viewport,
        sprite: Sprite,
    ) {
        self.position = DVec2::new(
            -sprite.width,
            rng.next_range(-viewport.height, viewport.height),
        );
        self.phase = rng.next_f64();
        let speed = rng.next_f64();
        self.set_velocity(rng, speed, Direction::Down);
    }

    /// Steps the petal and resets it if it left the viewport.
    ///
    /// Returns `true` when a reset happened.
    pub fn advance<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        viewport: Viewport,
        sprite: Sprite,
        pointer_x: f64,
    ) -> bool {
        self.step(pointer_x);
        if self.is_past_trailing_edge(viewport) {
            log::trace!("petal reset at ({:.1}, {:.1})", self.position.x, self.position.y);
            self.reset(rng, viewport, sprite);
            true
        } else {
            false
        }
    }

    /// Drawn size: the base size squeezed by the wobble phase on each axis.
    pub fn wobble_size(&self) -> DVec2 {
        DVec2::new(
            self.size.x * (0.6 + self.phase.cos().abs() / 3.0),
            self.size.y * (0.8 + self.phase.sin().abs() / 5.0),
        )
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        let drawn = self.wobble_size();
        surface.draw_sprite(
            self.position.x,
            self.position.y,
            drawn.x,
            drawn.y,
            self.opacity,
        );
    }
}

fn drift<R: RandomSource + ?Sized>(rng: &mut R, speed: f64) -> f64 {
    (DRIFT_BASE + rng.next_f64() * DRIFT_SPREAD) * speed
}
