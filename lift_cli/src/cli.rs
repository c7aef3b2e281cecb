//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use lift_traits::{Direction, FLOOR_COUNT};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[inline]
pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

#[derive(Parser, Debug)]
#[command(name = "lift", version, about = "Single-cabin elevator controller")]
pub struct Cli {
    /// Path to config TOML; a missing file means built-in defaults
    #[arg(long, value_name = "FILE", default_value = "lift.toml")]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging] level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop until interrupted (Ctrl-C)
    Run {
        /// Press a button on the simulated panel at start, e.g. 3:up, 0:inside (repeatable)
        #[arg(long = "press", value_name = "FLOOR:KIND", value_parser = parse_press)]
        presses: Vec<Press>,
        /// Stop after this many control-loop ticks
        #[arg(long, value_name = "N")]
        max_ticks: Option<u64>,
    },
    /// Run the built-in module checks (door, state machine, queue)
    SelfTest,
    /// Initialize the hardware, read every sensor once and report
    SelfCheck,
}

/// A scripted button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Press {
    pub floor: u8,
    pub kind: Direction,
}

pub fn parse_press(s: &str) -> Result<Press, String> {
    let (floor, kind) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FLOOR:KIND, got {s:?}"))?;
    let floor: u8 = floor
        .trim()
        .parse()
        .map_err(|_| format!("invalid floor {floor:?}"))?;
    if floor >= FLOOR_COUNT {
        return Err(format!(
            "floor {floor} out of range (0..{})",
            FLOOR_COUNT - 1
        ));
    }
    let kind = match kind.trim().to_ascii_lowercase().as_str() {
        "up" => Direction::Up,
        "down" => Direction::Down,
        "inside" | "cab" => Direction::Inside,
        other => return Err(format!("unknown button kind {other:?} (up|down|inside)")),
    };
    Ok(Press { floor, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3:up", 3, Direction::Up)]
    #[case("0:Inside", 0, Direction::Inside)]
    #[case(" 2 : down ", 2, Direction::Down)]
    #[case("1:cab", 1, Direction::Inside)]
    fn press_parses(#[case] s: &str, #[case] floor: u8, #[case] kind: Direction) {
        assert_eq!(parse_press(s), Ok(Press { floor, kind }));
    }

    #[rstest]
    #[case("3", "FLOOR:KIND")]
    #[case("x:up", "invalid floor")]
    #[case("9:up", "out of range")]
    #[case("1:sideways", "unknown button kind")]
    fn press_rejects(#[case] s: &str, #[case] needle: &str) {
        let err = parse_press(s).unwrap_err();
        assert!(err.contains(needle), "{err}");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
