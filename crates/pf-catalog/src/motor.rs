//! Standard motor sizes.

use std::sync::LazyLock;

use pf_core::Real;

use crate::error::{CatalogError, CatalogResult};

/// Commercial motor ratings (HP), ascending.
pub const STANDARD_MOTORS_HP: [u32; 21] = [
    15, 20, 25, 30, 40, 50, 60, 75, 100, 125, 150, 175, 200, 250, 300, 350, 400, 450, 500, 550,
    600,
];

static STANDARD_LADDER: LazyLock<MotorLadder> = LazyLock::new(|| MotorLadder {
    sizes_hp: STANDARD_MOTORS_HP.to_vec(),
});

/// Process-wide standard ladder.
pub fn standard_ladder() -> &'static MotorLadder {
    &STANDARD_LADDER
}

/// Strictly ascending, non-empty list of motor sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorLadder {
    sizes_hp: Vec<u32>,
}

impl MotorLadder {
    pub fn new(sizes_hp: Vec<u32>) -> CatalogResult<Self> {
        if sizes_hp.is_empty() {
            return Err(CatalogError::InvalidLadder {
                what: "ladder must contain at least one size",
            });
        }
        if sizes_hp.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CatalogError::InvalidLadder {
                what: "sizes must be strictly ascending",
            });
        }
        if sizes_hp[0] == 0 {
            return Err(CatalogError::InvalidLadder {
                what: "sizes must be positive",
            });
        }
        Ok(Self { sizes_hp })
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes_hp
    }

    pub fn largest(&self) -> u32 {
        // non-empty by construction
        self.sizes_hp[self.sizes_hp.len() - 1]
    }

    /// Smallest size that covers `power`, or `None` beyond the largest.
    pub fn standard_motor(&self, power: Real) -> Option<u32> {
        if !power.is_finite() {
            return None;
        }
        let idx = self
            .sizes_hp
            .partition_point(|&size| Real::from(size) < power);
        self.sizes_hp.get(idx).copied()
    }
}

impl Default for MotorLadder {
    fn default() -> Self {
        standard_ladder().clone()
    }
}
