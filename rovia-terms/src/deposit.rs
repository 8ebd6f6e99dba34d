use rovia_domain::{DepositMode, Vehicle};
use std::collections::HashMap;

use crate::commission::TermsError;

/// Deposits live on a $25 grid with a $25 floor.
pub const DEPOSIT_STEP_DOLLARS: i32 = 25;

/// Normalize a deposit to the nearest $25 increment, never below $25.
pub fn normalize(amount_dollars: i32) -> i32 {
    let rounded = ((amount_dollars + DEPOSIT_STEP_DOLLARS / 2) / DEPOSIT_STEP_DOLLARS)
        * DEPOSIT_STEP_DOLLARS;
    rounded.max(DEPOSIT_STEP_DOLLARS)
}

/// The platform's default deposit plus per-make overrides.
///
/// The default is normalized on the way in; overrides below the floor are
/// rejected outright rather than clamped, so a stored override always
/// reflects what the operator actually asked for.
pub struct DepositSchedule {
    default_dollars: i32,
    make_overrides: HashMap<String, i32>,
}

impl DepositSchedule {
    pub fn new(default_dollars: i32) -> Self {
        Self {
            default_dollars: normalize(default_dollars),
            make_overrides: HashMap::new(),
        }
    }

    pub fn default_dollars(&self) -> i32 {
        self.default_dollars
    }

    pub fn set_default(&mut self, amount_dollars: i32) -> i32 {
        self.default_dollars = normalize(amount_dollars);
        self.default_dollars
    }

    /// Store a per-make override. Amounts below $25 before rounding are
    /// rejected, not stored.
    pub fn set_make_override(&mut self, make: &str, amount_dollars: i32) -> Result<i32, TermsError> {
        if amount_dollars < DEPOSIT_STEP_DOLLARS {
            return Err(TermsError::Validation(format!(
                "deposit override {} is below the ${} floor",
                amount_dollars, DEPOSIT_STEP_DOLLARS
            )));
        }
        let normalized = normalize(amount_dollars);
        self.make_overrides.insert(make.to_lowercase(), normalized);
        Ok(normalized)
    }

    pub fn make_override(&self, make: &str) -> Option<i32> {
        self.make_overrides.get(&make.to_lowercase()).copied()
    }

    /// Resolve the deposit for a vehicle: fixed amount, else make override,
    /// else the platform default. Always on the grid.
    pub fn deposit_for(&self, vehicle: &Vehicle) -> i32 {
        match vehicle.deposit_mode {
            DepositMode::Fixed { amount_dollars } => normalize(amount_dollars),
            DepositMode::PlatformDefault => self
                .make_override(&vehicle.make)
                .unwrap_or(self.default_dollars),
        }
    }
}
