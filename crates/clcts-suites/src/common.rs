//! Small helpers shared by the suite modules.

use clcts_datagen::ArgRng;
use clcts_harness::HarnessError;

/// Wrap a build/generation error as a fatal setup failure for the
/// enclosing test.
pub(crate) fn setup_error(e: impl std::fmt::Display) -> HarnessError {
    HarnessError::Setup(e.to_string())
}

/// Deterministic host payload; the same seed always yields the same bytes
/// so failures reproduce.
pub(crate) fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = ArgRng::new(seed);
    (0..len).map(|_| rng.next_u8(u8::MIN, u8::MAX)).collect()
}
