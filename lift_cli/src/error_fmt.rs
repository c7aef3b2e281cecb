//! Human-readable error descriptions and structured JSON error formatting.

use lift_core::error::{BuildError, LiftError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid controller settings ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(le) = err.downcast_ref::<LiftError>() {
        return match le {
            LiftError::Init(msg) => format!(
                "What happened: Hardware initialization failed ({msg}).\nLikely causes: Elevator server not running, wrong [hardware] addr, or a firewall blocking the port.\nHow to fix: Start the elevator server (or switch [hardware] backend to \"sim\") and rerun."
            ),
            LiftError::Hardware(msg) => format!(
                "What happened: Lost contact with the hardware while running ({msg}).\nLikely causes: Elevator server stopped, network hiccup, or io_timeout_ms too low.\nHow to fix: Check the server, consider raising hardware.io_timeout_ms, then restart. The motor was commanded to stop."
            ),
            LiftError::HardwareFault(msg) => format!(
                "What happened: The hardware rejected a request ({msg}).\nLikely causes: Floor count mismatch between the controller and the rig, or a protocol mismatch.\nHow to fix: Verify the rig serves the same number of floors and speaks the 4-byte elevator-server protocol."
            ),
            LiftError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: Unknown keys, wrong types, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
            ),
        };
    }

    // String-based heuristics
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid configuration") {
        return "What happened: Configuration is invalid or incomplete.\nLikely causes: Syntax error or wrong value types in the TOML.\nHow to fix: Edit the TOML config and try again.".to_string();
    }

    if lower.contains("sim backend") {
        return format!(
            "What happened: {msg}.\nLikely causes: --press was given while [hardware] backend is not \"sim\".\nHow to fix: Drop --press or switch to the sim backend."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable process exit codes: 3 = hardware init, 4 = hardware failure in the loop, 1 = anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<LiftError>() {
        Some(LiftError::Init(_)) => 3,
        Some(LiftError::Hardware(_) | LiftError::HardwareFault(_)) => 4,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    match err.downcast_ref::<LiftError>() {
        Some(LiftError::Init(_)) => "HardwareInit",
        Some(LiftError::Hardware(_)) => "Hardware",
        Some(LiftError::HardwareFault(_)) => "HardwareFault",
        Some(LiftError::Config(_)) => "Config",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
