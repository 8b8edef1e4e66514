use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{BindError, Gun, GunDeps};
use crate::aggregator::Aggregator;
use crate::ammo::Ammo;
use crate::backend::{QueryBackend, SqlBackend};
use crate::config::GunConfig;
use crate::sample::{Sample, STATUS_ERR, STATUS_OK};

/// The production gun: one query per shot against a MySQL-protocol
/// backend.
pub type SqlGun = QueryGun<SqlBackend>;

// ─── Generic gun over a query backend ────────────────────────────

/// Gun implementation generic over the [`QueryBackend`] capability.
///
/// The backend type decides the wire protocol and the protocol tag on
/// every sample; the shoot logic here is backend-agnostic.
pub struct QueryGun<B: QueryBackend> {
    conf: GunConfig,
    bound: Option<Bound<B>>,
}

/// Resources that only exist once bind has completed.
struct Bound<B> {
    backend: B,
    aggregator: Arc<dyn Aggregator>,
    instance_id: usize,
}

impl<B: QueryBackend> QueryGun<B> {
    /// An unbound gun holding only its config. No backend resource is
    /// acquired until [`bind`](Gun::bind).
    pub fn new(conf: GunConfig) -> Self {
        Self { conf, bound: None }
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    fn bound(&self) -> &Bound<B> {
        self.bound
            .as_ref()
            .expect("shoot called on an unbound gun; bind must complete first")
    }
}

#[async_trait]
impl<B: QueryBackend> Gun for QueryGun<B> {
    async fn bind(
        &mut self,
        aggregator: Arc<dyn Aggregator>,
        deps: &GunDeps,
    ) -> Result<(), BindError> {
        if self.bound.is_some() {
            return Err(BindError::AlreadyBound);
        }
        self.conf.validate()?;

        let backend = B::connect(&self.conf)
            .await
            .map_err(|source| BindError::Connect {
                target: self.conf.target.clone(),
                source,
            })?;

        debug!(
            protocol = B::PROTOCOL,
            addr = %self.conf.target,
            instance = deps.instance_id,
            "gun bound"
        );
        self.bound = Some(Bound {
            backend,
            aggregator,
            instance_id: deps.instance_id,
        });
        Ok(())
    }

    async fn shoot(&self, ammo: Ammo) {
        let bound = self.bound();

        let mut sample = Sample::new(ammo.tag.as_str());

        // Timed section covers the backend call only, not
        // classification or reporting.
        let start = Instant::now();
        let result = bound.backend.execute(&ammo.payload).await;
        sample.set_latency(start.elapsed());

        // The status must reflect the error this very call returned.
        match result {
            Ok(_) => sample.set_status(STATUS_OK),
            Err(err) => {
                sample.set_status(STATUS_ERR);
                warn!(
                    tag = %ammo.tag,
                    instance = bound.instance_id,
                    error = %err,
                    "shot failed"
                );
            }
        }

        sample.add_tag(B::PROTOCOL);
        bound.aggregator.report(sample);
    }
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parking_lot::Mutex;
    use tracing_test::traced_test;

    use super::*;
    use crate::backend::MockBackend;

    /// Sink that keeps every reported sample for inspection.
    #[derive(Default)]
    struct Recorded {
        samples: Mutex<Vec<Sample>>,
    }

    impl Aggregator for Recorded {
        fn report(&self, sample: Sample) {
            self.samples.lock().push(sample);
        }
    }

    async fn bound_gun(target: &str, sink: Arc<Recorded>) -> QueryGun<MockBackend> {
        let mut gun = QueryGun::new(GunConfig::new(target).unwrap());
        gun.bind(sink, &GunDeps::default()).await.unwrap();
        gun
    }

    #[tokio::test]
    async fn healthy_shot_reports_one_ok_sample() {
        let sink = Arc::new(Recorded::default());
        let gun = bound_gun("mock://up?latency_us=50", sink.clone()).await;

        gun.shoot(Ammo::new("SELECT 1", "ping")).await;

        let samples = sink.samples.lock();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].tags(), ["ping", "mock"]);
        assert_eq!(samples[0].status_code(), STATUS_OK);
        assert!(samples[0].latency() > Duration::ZERO);
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_shot_reports_err_sample_and_logs_tag() {
        let sink = Arc::new(Recorded::default());
        let gun = bound_gun("mock://up?fail_rate=1.0", sink.clone()).await;

        gun.shoot(Ammo::new("SELECT * FROM missing_table", "bad"))
            .await;

        let samples = sink.samples.lock();
        assert_eq!(samples.len(), 1, "a failed shot must still report");
        assert_eq!(samples[0].tags(), ["bad", "mock"]);
        assert_eq!(samples[0].status_code(), STATUS_ERR);
        assert!(logs_contain("bad"));
    }

    #[tokio::test]
    #[should_panic(expected = "unbound gun")]
    async fn shoot_before_bind_panics() {
        let gun: QueryGun<MockBackend> =
            QueryGun::new(GunConfig::new("mock://up").unwrap());
        gun.shoot(Ammo::new("SELECT 1", "ping")).await;
    }

    #[tokio::test]
    async fn bind_twice_is_rejected() {
        let sink = Arc::new(Recorded::default());
        let mut gun = bound_gun("mock://up", sink.clone()).await;

        let err = gun.bind(sink, &GunDeps::default()).await.unwrap_err();
        assert!(matches!(err, BindError::AlreadyBound));
    }

    #[tokio::test]
    async fn unreachable_target_leaves_gun_unbound() {
        let sink: Arc<dyn Aggregator> = Arc::new(Recorded::default());
        let mut gun: QueryGun<MockBackend> =
            QueryGun::new(GunConfig::new("mock://down").unwrap());

        let err = gun.bind(sink, &GunDeps::default()).await.unwrap_err();
        assert!(matches!(err, BindError::Connect { .. }));
        assert!(!gun.is_bound());
    }

    #[tokio::test]
    async fn deserialized_empty_target_fails_bind() {
        let conf: GunConfig = serde_json::from_str(r#"{"target":""}"#).unwrap();
        let sink: Arc<dyn Aggregator> = Arc::new(Recorded::default());
        let mut gun: QueryGun<MockBackend> = QueryGun::new(conf);

        let err = gun.bind(sink, &GunDeps::default()).await.unwrap_err();
        assert!(matches!(err, BindError::Config(_)));
        assert!(!gun.is_bound());
    }

    #[tokio::test]
    async fn latency_excludes_time_spent_reporting() {
        /// Sink that stalls long enough to dwarf the backend call.
        #[derive(Default)]
        struct Slow {
            samples: Mutex<Vec<Sample>>,
        }

        impl Aggregator for Slow {
            fn report(&self, sample: Sample) {
                std::thread::sleep(Duration::from_millis(200));
                self.samples.lock().push(sample);
            }
        }

        let sink = Arc::new(Slow::default());
        let mut gun: QueryGun<MockBackend> =
            QueryGun::new(GunConfig::new("mock://up").unwrap());
        gun.bind(sink.clone(), &GunDeps::default()).await.unwrap();

        gun.shoot(Ammo::new("SELECT 1", "ping")).await;

        let samples = sink.samples.lock();
        assert_eq!(samples.len(), 1);
        assert!(
            samples[0].latency() < Duration::from_millis(150),
            "latency {:?} should not include the 200ms spent in report",
            samples[0].latency()
        );
    }
}
