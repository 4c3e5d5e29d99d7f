//! Model-pool selection policy.
//!
//! Each generation request picks two candidate models from a configured
//! pool: one primary and one fallback, drawn without replacement. The
//! fallback is an extension point — the reference orchestration only
//! ever calls the primary, across all of its retries — but it travels
//! with the pick so callers can use it.
//!
//! Selection is a policy trait so tests can substitute a deterministic
//! picker for the random one.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::LlmError;

/// A primary/fallback model pair chosen for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPick {
    /// The model all attempts for this request go to.
    pub primary: String,
    /// An alternative, absent when the pool has a single entry.
    pub fallback: Option<String>,
}

/// Policy for choosing models out of a configured pool.
pub trait ModelPicker: Send + Sync {
    /// Pick a primary/fallback pair from `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] when the pool is empty.
    fn pick(&self, pool: &[String]) -> Result<ModelPick, LlmError>;
}

/// Production policy: two draws at random, without replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPicker;

impl ModelPicker for RandomPicker {
    fn pick(&self, pool: &[String]) -> Result<ModelPick, LlmError> {
        let mut rng = rand::thread_rng();
        pick_with(&mut rng, pool)
    }
}

/// Random pair draw with an explicit random source.
pub fn pick_with<R: Rng>(rng: &mut R, pool: &[String]) -> Result<ModelPick, LlmError> {
    let mut chosen: Vec<&String> = pool.choose_multiple(rng, 2).collect();
    let Some(primary) = chosen.pop() else {
        return Err(LlmError::Config("model pool is empty".into()));
    };
    Ok(ModelPick {
        primary: primary.clone(),
        fallback: chosen.pop().cloned(),
    })
}

/// Deterministic policy for tests: always the first pool entry as
/// primary, the second (if any) as fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPicker;

impl ModelPicker for FixedPicker {
    fn pick(&self, pool: &[String]) -> Result<ModelPick, LlmError> {
        let Some(primary) = pool.first() else {
            return Err(LlmError::Config("model pool is empty".into()));
        };
        Ok(ModelPick {
            primary: primary.clone(),
            fallback: pool.get(1).cloned(),
        })
    }
}
