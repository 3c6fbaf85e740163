// Project-wide constants
//
// Centralised here so port numbers and other magic values have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Default bind address for a Brain instance.
pub const DEFAULT_BRAIN_ADDR: &str = "127.0.0.1:8080";

/// Default bind address for a Container instance.
pub const DEFAULT_CONTAINER_ADDR: &str = "127.0.0.1:8081";

/// Health prober wakes every second but only probes every `PROBE_EVERY_TICKS`
/// ticks, per spec.md §4.7 and DESIGN NOTES §9 ("preserve that cadence so
/// stop() observes the running flag with <= 1s latency").
pub const PROBE_TICK_SECS: u64 = 1;
pub const PROBE_EVERY_TICKS: u32 = 5;

/// Outbound HTTP calls (relay, register, probe) time out after this long.
/// spec.md §5 recommends <= 5s to keep the prober tick bounded.
pub const OUTBOUND_TIMEOUT_SECS: u64 = 5;

/// Bounded size of each per-type data buffer (spec.md §3).
pub const DATA_BUFFER_CAP: usize = 50;

/// Confidence floor below which `parseInput` falls through to the fallback
/// phrasebook (spec.md §4.6).
pub const INTENT_CONFIDENCE_FLOOR: f64 = 0.6;

/// Body size cap applied to every HTTP request, mirroring the teacher's own
/// 4MB guard in `AgentServer::serve`.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
