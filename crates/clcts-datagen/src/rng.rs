//! Seedable random source for argument data.
//!
//! Both the native and the portable-IR build of a kernel must be driven
//! with identical inputs for bit-exact comparison, so the generator is
//! explicitly seedable and re-seedable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random source used by every argument generator.
#[derive(Debug)]
pub struct ArgRng {
    rng: StdRng,
    seed: u64,
}

impl ArgRng {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), seed }
    }

    /// Rewind to the initial seed, replaying the exact same stream.
    pub fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_bool(&mut self) -> bool {
        self.rng.gen()
    }

    pub fn next_i8(&mut self, low: i8, high: i8) -> i8 {
        self.rng.gen_range(low..=high)
    }

    pub fn next_u8(&mut self, low: u8, high: u8) -> u8 {
        self.rng.gen_range(low..=high)
    }

    pub fn next_i16(&mut self, low: i16, high: i16) -> i16 {
        self.rng.gen_range(low..=high)
    }

    pub fn next_u16(&mut self, low: u16, high: u16) -> u16 {
        self.rng.gen_range(low..=high)
    }

    pub fn next_i32(&mut self, low: i32, high: i32) -> i32 {
        self.rng.gen_range(low..=high)
    }

    pub fn next_u32(&mut self, low: u32, high: u32) -> u32 {
        self.rng.gen_range(low..=high)
    }

    pub fn next_i64(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..=high)
    }

    pub fn next_u64(&mut self, low: u64, high: u64) -> u64 {
        self.rng.gen_range(low..=high)
    }

    pub fn next_f32(&mut self, low: f32, high: f32) -> f32 {
        self.rng.gen_range(low..high)
    }

    pub fn next_f64(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }

    pub fn next_usize(&mut self, low: usize, high: usize) -> usize {
        self.rng.gen_range(low..=high)
    }
}
