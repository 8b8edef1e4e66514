//! Load-generation gun core for SQL-shaped backends.
//!
//! A *gun* executes one unit of work (*ammo*) per shot against a target
//! backend, measures wall-clock latency around the backend call, classifies
//! the outcome as an HTTP-style status code, and reports exactly one
//! [`Sample`] per shot into an [`Aggregator`] sink. The hosting driver that
//! schedules shots, the ammo source that parses work items, and the
//! reporting pipeline behind the aggregator are all external; this crate is
//! the shoot/report core they plug into.
//!
//! # Lifecycle
//!
//! A gun is built unbound from a [`GunConfig`], then [`Gun::bind`] opens
//! the backend connection and records the aggregator, exactly once. After a
//! successful bind the gun can be shared across any number of concurrent
//! workers, each calling [`Gun::shoot`] with its own ammo.
//!
//! ```
//! use std::sync::Arc;
//!
//! use sql_gun::{Ammo, Gun, GunConfig, GunDeps, Registry, SampleCollector};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = Registry::with_defaults();
//! let collector = Arc::new(SampleCollector::new());
//!
//! let mut gun = registry
//!     .gun("mock", GunConfig::new("mock://up?latency_us=100").unwrap())
//!     .unwrap();
//! gun.bind(collector.clone(), &GunDeps::new(0)).await.unwrap();
//!
//! // A bound gun is shared between workers behind an Arc.
//! let gun: Arc<dyn Gun> = Arc::from(gun);
//! gun.shoot(Ammo::new("SELECT 1", "ping")).await;
//!
//! let snapshot = collector.snapshot();
//! assert_eq!(snapshot.total_shots, 1);
//! assert_eq!(snapshot.total_errors, 0);
//! # }
//! ```
//!
//! The `"sql"` gun works the same way with a MySQL-protocol DSN as the
//! target. Failed shots never abort a run: they surface as 500-coded
//! samples plus one diagnostic log line each.

pub mod aggregator;
pub mod ammo;
pub mod backend;
pub mod config;
pub mod gun;
pub mod metrics;
pub mod registry;
pub mod sample;

pub use aggregator::Aggregator;
pub use ammo::{Ammo, AmmoFactory};
pub use backend::{BackendError, MockBackend, QueryBackend, QueryOutcome, SqlBackend};
pub use config::{ConfigError, GunConfig};
pub use gun::{BindError, Gun, GunDeps, QueryGun, SqlGun};
pub use metrics::{snapshot_stream, CollectorSnapshot, PercentileSet, SampleCollector};
pub use registry::{Registry, RegistryError};
pub use sample::{Sample, STATUS_ERR, STATUS_OK};
