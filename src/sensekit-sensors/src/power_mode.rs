//! Acquisition power-mode state machine.
//!
//! | From \ Transition | `EnterSleep` | `ExitSleep` | `TriggerOneShot` | `ConversionComplete` |
//! |---|---|---|---|---|
//! | `Continuous` | `Sleep` | `Continuous` | rejected | rejected |
//! | `Sleep` | `Sleep` | `Continuous` | `OneShotPending` | rejected |
//! | `OneShotPending` | rejected | `Continuous` | rejected | `Sleep` |
//!
//! [`PowerModeController`] only tracks the logical mode; the device-specific register writes
//! are supplied by the driver as the effect of [`PowerModeController::perform()`]. The
//! controller never waits: readiness polling cadence is up to the caller.

use crate::{error::Error, log};

/// Logical acquisition mode of a device.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerMode {
    /// The device converts continuously; every read returns the latest conversion.
    #[default]
    Continuous,
    /// The device is idle; reads return the last latched, possibly stale, value.
    Sleep,
    /// A one-shot conversion was triggered from [`PowerMode::Sleep`] and has not been observed
    /// as complete yet.
    OneShotPending,
}

impl core::fmt::Display for PowerMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Continuous => write!(f, "continuous"),
            Self::Sleep => write!(f, "sleep"),
            Self::OneShotPending => write!(f, "one-shot pending"),
        }
    }
}

/// Requested change of [`PowerMode`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Stop continuous conversions.
    EnterSleep,
    /// Resume continuous conversions.
    ExitSleep,
    /// Start a single conversion while asleep.
    TriggerOneShot,
    /// The device reported the pending one-shot conversion as complete.
    ConversionComplete,
}

impl core::fmt::Display for Transition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EnterSleep => write!(f, "enter sleep"),
            Self::ExitSleep => write!(f, "exit sleep"),
            Self::TriggerOneShot => write!(f, "trigger a one-shot conversion"),
            Self::ConversionComplete => write!(f, "complete a one-shot conversion"),
        }
    }
}

/// Tracks the [`PowerMode`] of one device.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerModeController {
    mode: PowerMode,
}

impl PowerModeController {
    /// Creates a controller in [`PowerMode::Continuous`], the power-on mode of the devices.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_mode(PowerMode::Continuous)
    }

    /// Creates a controller assuming the device is already in `mode`.
    #[must_use]
    pub const fn with_mode(mode: PowerMode) -> Self {
        Self { mode }
    }

    /// Returns the current logical mode.
    #[must_use]
    pub const fn mode(&self) -> PowerMode {
        self.mode
    }

    /// Returns the mode `transition` leads to from the current mode, or `None` if it is not
    /// allowed.
    ///
    /// Entering sleep while asleep and exiting sleep while running re-assert the current mode,
    /// which resynchronizes a device whose mode is unknown (e.g., after a software restart).
    #[must_use]
    pub const fn target(&self, transition: Transition) -> Option<PowerMode> {
        match (self.mode, transition) {
            (PowerMode::Continuous | PowerMode::Sleep, Transition::EnterSleep)
            | (PowerMode::OneShotPending, Transition::ConversionComplete) => Some(PowerMode::Sleep),
            (_, Transition::ExitSleep) => Some(PowerMode::Continuous),
            (PowerMode::Sleep, Transition::TriggerOneShot) => Some(PowerMode::OneShotPending),
            _ => None,
        }
    }

    /// Performs `transition`.
    ///
    /// The transition is checked first; `effect` (the device I/O) only runs when it is allowed,
    /// and the mode only changes when `effect` succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the transition is not allowed from the current mode,
    /// or the error returned by `effect`.
    pub fn perform<E>(
        &mut self,
        device: &'static str,
        transition: Transition,
        effect: impl FnOnce() -> Result<(), Error<E>>,
    ) -> Result<PowerMode, Error<E>> {
        let Some(next) = self.target(transition) else {
            return Err(Error::InvalidState {
                device,
                mode: self.mode,
                transition,
            });
        };

        effect()?;

        log::debug!("{}: power mode {} -> {}", device, self.mode, next);
        self.mode = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE: &str = "S-5851A";

    fn ok() -> Result<(), Error<()>> {
        Ok(())
    }

    #[test]
    fn starts_in_continuous_mode() {
        assert_eq!(PowerModeController::new().mode(), PowerMode::Continuous);
        assert_eq!(PowerModeController::default().mode(), PowerMode::Continuous);
    }

    #[test]
    fn one_shot_cycle() {
        let mut controller = PowerModeController::new();

        assert_eq!(
            controller.perform(DEVICE, Transition::EnterSleep, ok),
            Ok(PowerMode::Sleep)
        );
        assert_eq!(
            controller.perform(DEVICE, Transition::TriggerOneShot, ok),
            Ok(PowerMode::OneShotPending)
        );
        assert_eq!(
            controller.perform(DEVICE, Transition::ConversionComplete, ok),
            Ok(PowerMode::Sleep)
        );
        assert_eq!(
            controller.perform(DEVICE, Transition::ExitSleep, ok),
            Ok(PowerMode::Continuous)
        );
    }

    #[test]
    fn one_shot_requires_sleep() {
        let mut controller = PowerModeController::new();
        let mut effects = 0;

        let result = controller.perform(DEVICE, Transition::TriggerOneShot, || {
            effects += 1;
            ok()
        });

        assert_eq!(
            result,
            Err(Error::InvalidState {
                device: DEVICE,
                mode: PowerMode::Continuous,
                transition: Transition::TriggerOneShot,
            })
        );
        assert_eq!(effects, 0);
        assert_eq!(controller.mode(), PowerMode::Continuous);
    }

    #[test]
    fn pending_conversion_rejects_a_second_trigger() {
        let mut controller = PowerModeController::with_mode(PowerMode::OneShotPending);

        assert!(controller
            .perform(DEVICE, Transition::TriggerOneShot, ok)
            .is_err());
        assert!(controller
            .perform(DEVICE, Transition::EnterSleep, ok)
            .is_err());
        assert_eq!(controller.mode(), PowerMode::OneShotPending);
    }

    #[test]
    fn completion_is_only_valid_while_pending() {
        for mode in [PowerMode::Continuous, PowerMode::Sleep] {
            let controller = PowerModeController::with_mode(mode);
            assert_eq!(controller.target(Transition::ConversionComplete), None);
        }
    }

    #[test]
    fn failed_effect_keeps_the_mode() {
        let mut controller = PowerModeController::new();

        let result = controller.perform(DEVICE, Transition::EnterSleep, || {
            Err(Error::Transport {
                device: DEVICE,
                operation: crate::Operation::EnterSleep,
                source: (),
            })
        });

        assert!(result.is_err());
        assert_eq!(controller.mode(), PowerMode::Continuous);
    }

    #[test]
    fn mode_can_be_reasserted() {
        let sleeping = PowerModeController::with_mode(PowerMode::Sleep);
        assert_eq!(
            sleeping.target(Transition::EnterSleep),
            Some(PowerMode::Sleep)
        );

        let running = PowerModeController::new();
        assert_eq!(
            running.target(Transition::ExitSleep),
            Some(PowerMode::Continuous)
        );
    }
}
