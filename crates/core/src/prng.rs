//! Random sources for petal creation and reseeding.
//!
//! Everything random in the simulation is drawn through [`RandomSource`] so
//! hosts can seed a [`Xorshift64`] from the clock while tests script exact
//! draws with a [`Sequence`].

/// A source of uniformly distributed floats in [0, 1).
pub trait RandomSource {
    /// Returns the next value in [0, 1).
    fn next_f64(&mut self) -> f64;

    /// Returns a value in [min, max).
    fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

/// Xorshift64 generator with the (13, 7, 17) shift triple.
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Replaces a zero seed, which would otherwise lock the state at zero.
    const ZERO_SEED_REPLACEMENT: u64 = 0x9E37_79B9_7F4A_7C15;

    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 {
                Self::ZERO_SEED_REPLACEMENT
            } else {
                seed
            },
        }
    }

    /// Seeds from a host timestamp in milliseconds (e.g. `Date.now()`).
    ///
    /// The fractional part is folded in so two mounts within the same
    /// millisecond on high-resolution clocks still diverge.
    pub fn from_timestamp(millis: f64) -> Self {
        let whole = millis.abs().trunc() as u64;
        let frac = (millis.fract().abs() * 1e9) as u64;
        Self::new(whole.rotate_left(20) ^ frac)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl RandomSource for Xorshift64 {
    /// Top 53 bits scaled into the f64 mantissa.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
///
/// An empty sequence always yields 0.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    values: Vec<f64>,
    cursor: usize,
}

impl Sequence {
    /// Values are clamped into [0, 1) so callers cannot break range contracts.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, cursor: 0 }
    }

    /// A sequence that always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for Sequence {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}
