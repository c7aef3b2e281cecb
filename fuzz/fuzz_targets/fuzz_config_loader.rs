#![no_main]
use libfuzzer_sys::fuzz_target;

// Arbitrary TOML must either fail to parse or validate without panicking.
fuzz_target!(|data: &str| {
    if let Ok(cfg) = lift_config::load_toml(data) {
        let _ = cfg.validate(lift_traits::FLOOR_COUNT);
    }
});
