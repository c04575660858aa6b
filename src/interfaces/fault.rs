use crate::error::{EngineError, Result};
use rand::Rng;

/// Rejects incoming requests at random, simulating a flaky front door.
///
/// Sits in front of the engine only; settlement itself never consults it.
#[derive(Debug, Clone, Copy)]
pub struct FaultInjector {
    rate: f64,
}

impl FaultInjector {
    /// `rate` is the probability in `[0, 1]` that a request fails.
    pub fn new(rate: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(EngineError::ValidationError(format!(
                "Error rate must be between 0 and 1, got {rate}"
            )));
        }
        Ok(Self { rate })
    }

    pub fn should_fail(&self) -> bool {
        self.rate > 0.0 && rand::thread_rng().gen_bool(self.rate)
    }
}
