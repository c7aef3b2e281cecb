//! Maps `Box<dyn Error>` from trait boundaries to typed `LiftError`.
//!
//! The traits in `lift_traits` use `Box<dyn Error + Send + Sync>` for maximum
//! flexibility; this module converts those to our typed error enum, with an
//! optional feature-gated path for `lift_hardware::HwError` downcasting.

use eyre::WrapErr;

use crate::error::{LiftError, Result};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Map a trait-boundary error to a typed `LiftError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> LiftError {
    #[cfg(feature = "hardware-errors")]
    {
        use lift_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Disconnected | HwError::Io(_) => LiftError::Hardware(hw.to_string()),
                other => LiftError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("out of range") {
        LiftError::HardwareFault(s)
    } else {
        LiftError::Hardware(s)
    }
}

/// Sensor reads must succeed; a failed read is surfaced to the caller.
pub fn read_input<T>(r: std::result::Result<T, BoxError>, what: &'static str) -> Result<T> {
    r.map_err(|e| eyre::Report::new(map_hw_error(&*e)))
        .wrap_err(what)
}

/// Commands are fire-and-forget: failures are logged and the loop carries on.
pub(crate) fn fire_and_forget(r: std::result::Result<(), BoxError>, what: &'static str) {
    if let Err(e) = r {
        tracing::warn!(error = %e, command = what, "hardware command failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_hw_errors_are_classified() {
        let e: BoxError = Box::new(lift_hardware::error::HwError::InvalidFloor(9));
        assert!(matches!(map_hw_error(&*e), LiftError::HardwareFault(_)));

        let e: BoxError = Box::new(lift_hardware::error::HwError::Disconnected);
        assert!(matches!(map_hw_error(&*e), LiftError::Hardware(_)));
    }

    #[test]
    fn unknown_errors_fall_back_to_hardware() {
        let e: BoxError = Box::new(std::io::Error::other("bus glitch"));
        match map_hw_error(&*e) {
            LiftError::Hardware(msg) => assert!(msg.contains("bus glitch")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn read_input_keeps_context() {
        let r: std::result::Result<bool, BoxError> = Err(Box::new(std::io::Error::other("eof")));
        let err = read_input(r, "reading stop signal").unwrap_err();
        assert!(format!("{err}").contains("reading stop signal"));
        assert!(err.downcast_ref::<LiftError>().is_some());
    }
}
