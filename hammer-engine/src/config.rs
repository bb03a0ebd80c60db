use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for the session registry and its background sweep.
///
/// Durations deserialize from human-readable strings ("15s", "2m").
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// How often the sweeper wakes up to close expired auctions and retire
    /// idle sessions
    #[serde(default = "default_sweep_every", with = "humantime_serde")]
    pub sweep_every: Duration,

    /// How long a closed auction's session is kept around after its last
    /// observer disconnects, to tolerate brief reconnect gaps
    #[serde(default = "default_close_grace", with = "humantime_serde")]
    pub close_grace: Duration,
}

fn default_sweep_every() -> Duration {
    Duration::from_secs(1)
}

fn default_close_grace() -> Duration {
    Duration::from_secs(60)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sweep_every: default_sweep_every(),
            close_grace: default_close_grace(),
        }
    }
}
