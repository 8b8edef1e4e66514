use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{BackendError, QueryBackend, QueryOutcome};
use crate::config::GunConfig;

/// In-process stand-in for a real backend.
///
/// Lets hosts and tests exercise the whole gun pipeline without a
/// database. Behavior is controlled entirely through the target
/// descriptor:
///
/// ```text
/// mock://up?latency_us=200&jitter_us=100&fail_rate=0.25&seed=42
/// mock://down
/// ```
///
/// `mock://down` refuses to connect, which drives the bind-failure path.
/// Each `execute` sleeps for `latency_us` plus a random slice of
/// `jitter_us`, then fails with probability `fail_rate`. The RNG is
/// seeded, so a given descriptor replays the same outcome sequence.
#[derive(Debug)]
pub struct MockBackend {
    latency: Duration,
    jitter: Duration,
    fail_rate: f64,
    rng: Mutex<StdRng>,
}

impl MockBackend {
    fn parse(target: &str) -> Result<Self, BackendError> {
        let rest = target
            .strip_prefix("mock://")
            .ok_or_else(|| BackendError::Target(format!("not a mock descriptor: {target}")))?;

        let (host, params) = match rest.split_once('?') {
            Some((host, params)) => (host, params),
            None => (rest, ""),
        };

        match host {
            "up" => {}
            "down" => {
                return Err(BackendError::Unavailable(
                    "mock backend is configured down".into(),
                ))
            }
            other => {
                return Err(BackendError::Target(format!(
                    "unknown mock host {other:?}, expected \"up\" or \"down\""
                )))
            }
        }

        let mut latency_us = 0u64;
        let mut jitter_us = 0u64;
        let mut fail_rate = 0.0f64;
        let mut seed = 1u64;

        fn bad_value(key: &str, value: &str) -> BackendError {
            BackendError::Target(format!("bad value for {key}: {value:?}"))
        }

        for pair in params.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| BackendError::Target(format!("malformed parameter {pair:?}")))?;
            match key {
                "latency_us" => latency_us = value.parse().map_err(|_| bad_value(key, value))?,
                "jitter_us" => jitter_us = value.parse().map_err(|_| bad_value(key, value))?,
                "fail_rate" => {
                    fail_rate = value.parse().map_err(|_| bad_value(key, value))?;
                    if !(0.0..=1.0).contains(&fail_rate) {
                        return Err(BackendError::Target(format!(
                            "fail_rate must be within 0..=1, got {fail_rate}"
                        )));
                    }
                }
                "seed" => seed = value.parse().map_err(|_| bad_value(key, value))?,
                _ => {
                    return Err(BackendError::Target(format!("unknown parameter {key:?}")));
                }
            }
        }

        Ok(Self {
            latency: Duration::from_micros(latency_us),
            jitter: Duration::from_micros(jitter_us),
            fail_rate,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        })
    }
}

#[async_trait]
impl QueryBackend for MockBackend {
    const PROTOCOL: &'static str = "mock";

    async fn connect(conf: &GunConfig) -> Result<Self, BackendError> {
        Self::parse(&conf.target)
    }

    async fn execute(&self, _payload: &str) -> Result<QueryOutcome, BackendError> {
        // Draw both random values under one short lock, then sleep
        // without holding it.
        let (delay, failed) = {
            let mut rng = self.rng.lock();
            let jitter = self.jitter.mul_f64(rng.gen::<f64>());
            (self.latency + jitter, rng.gen::<f64>() < self.fail_rate)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if failed {
            return Err(BackendError::Rejected("simulated query failure".into()));
        }
        Ok(QueryOutcome { rows: 1 })
    }
}
