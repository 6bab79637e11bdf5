//! Fan hysteresis with a cycle-count cooldown
//!
//! A prediction above the high threshold latches the fan on and arms a
//! cooldown of `max_cooldown` cycles.  Once predictions drop, the fan keeps
//! running until the cooldown has been counted down, then turns off.  An
//! absent prediction holds the current state unchanged.

use core::fmt;

/// Fan state carried across control cycles.
///
/// Invariant: `cooldown_remaining > 0` implies `fan_on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FanState {
    pub fan_on: bool,
    pub cooldown_remaining: u8,
}

impl fmt::Display for FanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fan_on {
            write!(f, "ON(cooldown={})", self.cooldown_remaining)
        } else {
            write!(f, "OFF")
        }
    }
}

/// What a single [`FanController::decide`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Prediction above threshold; fan on, cooldown re-armed.
    Latched,
    /// Below threshold but cooling down; fan stays on.
    CoolingDown { remaining: u8 },
    /// Cooldown exhausted; fan switched off.
    Released,
    /// Below threshold and already off.
    Idle,
    /// No prediction; nothing changed.
    Held,
}

impl Transition {
    pub fn label(self) -> &'static str {
        match self {
            Self::Latched => "latched",
            Self::CoolingDown { .. } => "cooling down",
            Self::Released => "released",
            Self::Idle => "idle",
            Self::Held => "held",
        }
    }
}

/// Hysteresis state machine driving the fan.
#[derive(Debug, Clone)]
pub struct FanController {
    high_threshold_ppm: f64,
    max_cooldown: u8,
    state: FanState,
}

impl FanController {
    /// Starts off with no cooldown.
    pub fn new(high_threshold_ppm: f64, max_cooldown: u8) -> Self {
        Self {
            high_threshold_ppm,
            max_cooldown,
            state: FanState::default(),
        }
    }

    pub fn state(&self) -> FanState {
        self.state
    }

    pub fn high_threshold_ppm(&self) -> f64 {
        self.high_threshold_ppm
    }

    /// Advance one cycle with this cycle's prediction, if any.
    pub fn decide(&mut self, predicted_ppm: Option<f64>) -> Transition {
        let Some(ppm) = predicted_ppm else {
            return Transition::Held;
        };

        let was_on = self.state.fan_on;
        let transition = if ppm > self.high_threshold_ppm {
            self.state = FanState {
                fan_on: true,
                cooldown_remaining: self.max_cooldown,
            };
            Transition::Latched
        } else if self.state.cooldown_remaining > 0 {
            self.state.cooldown_remaining -= 1;
            self.state.fan_on = true;
            Transition::CoolingDown {
                remaining: self.state.cooldown_remaining,
            }
        } else {
            self.state = FanState::default();
            if was_on { Transition::Released } else { Transition::Idle }
        };

        debug_assert!(self.state.cooldown_remaining == 0 || self.state.fan_on);
        transition
    }
}
