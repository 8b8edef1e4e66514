use async_trait::async_trait;
use thiserror::Error;

use crate::config::GunConfig;

pub mod mock;
pub mod sql;

pub use mock::MockBackend;
pub use sql::SqlBackend;

// ─── Errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("driver error: {0}")]
    Driver(#[from] sqlx::Error),
    #[error("invalid target descriptor: {0}")]
    Target(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("request rejected: {0}")]
    Rejected(String),
}

// ─── Capability interface ────────────────────────────────────────

/// Durationless result data of one backend call. Timing is the gun's
/// responsibility, not the backend's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Rows returned (or touched) by the request.
    pub rows: u64,
}

/// Opaque capability that executes one work item against the target
/// system.
///
/// The gun core never names a concrete client type; the backend is chosen
/// by type parameter and its connection handle is created at bind time
/// from `config.target`. Implementations must support concurrent
/// `execute` calls over a shared handle, because the gun adds no locking
/// of its own.
#[async_trait]
pub trait QueryBackend: Send + Sync + Sized + 'static {
    /// Fixed tag identifying the backend kind, attached to every sample
    /// this backend produces.
    const PROTOCOL: &'static str;

    /// Open the long-lived connection handle described by `conf.target`.
    ///
    /// Must fail eagerly on an unreachable target so that bind can refuse
    /// to transition the gun into the bound state.
    async fn connect(conf: &GunConfig) -> Result<Self, BackendError>;

    /// Execute one request. May block for as long as the backend needs;
    /// any deadline handling lives in the backend client, not in the gun.
    async fn execute(&self, payload: &str) -> Result<QueryOutcome, BackendError>;
}
