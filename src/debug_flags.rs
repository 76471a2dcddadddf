use std::sync::OnceLock;

pub const DEFAULT_STEP_LIMIT: u64 = 100_000;
pub const DEFAULT_TRACE_HISTORY: usize = 64;

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

// Log every executed instruction at trace level (very noisy)
pub fn trace_cpu() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| env_flag("TRACE_CPU", false))
}

pub fn quiet() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| env_flag("QUIET", false))
}

// Instructions the driver runs before giving up; 0 means unlimited.
pub fn step_limit() -> u64 {
    static V: OnceLock<u64> = OnceLock::new();
    *V.get_or_init(|| env_u64("STEP_LIMIT", DEFAULT_STEP_LIMIT))
}

// Entries kept for the post-mortem dump on a fatal opcode
pub fn trace_history() -> usize {
    static V: OnceLock<usize> = OnceLock::new();
    *V.get_or_init(|| env_u64("TRACE_HISTORY", DEFAULT_TRACE_HISTORY as u64) as usize)
}
