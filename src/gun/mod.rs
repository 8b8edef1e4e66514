use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::aggregator::Aggregator;
use crate::ammo::Ammo;
use crate::backend::BackendError;
use crate::config::ConfigError;

mod query;

pub use query::{QueryGun, SqlGun};

// ─── Errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid gun config: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot open backend connection to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: BackendError,
    },
    #[error("gun is already bound")]
    AlreadyBound,
}

// ─── Host dependencies ───────────────────────────────────────────

/// Opaque bundle of shared resources the host hands to every gun at
/// bind time.
#[derive(Debug, Clone, Default)]
pub struct GunDeps {
    /// Host-assigned identifier for this gun instance, carried into
    /// diagnostics so failures can be traced back to a worker.
    pub instance_id: usize,
}

impl GunDeps {
    pub fn new(instance_id: usize) -> Self {
        Self { instance_id }
    }
}

// ─── Gun contract ────────────────────────────────────────────────

/// A load-generation unit: executes one ammo item per shot against a
/// backend and reports the outcome.
///
/// # Lifecycle
///
/// A gun is constructed in an unbound state from its config alone; no
/// network resource exists yet. [`bind`](Gun::bind) transitions it to
/// bound exactly once, opening the backend connection and recording the
/// aggregator. If bind fails the gun stays unbound and the host must not
/// proceed to shooting. There is no destroy step: dropping the gun
/// releases the backend resource.
///
/// Once bound, [`shoot`](Gun::shoot) may be called from many tasks
/// concurrently (share the gun behind an `Arc`). Each call produces
/// exactly one [`Sample`](crate::Sample) delivered to the aggregator,
/// whether the backend call succeeded or not.
#[async_trait]
pub trait Gun: Send + Sync {
    /// Open the backend described by the gun's config and record the
    /// sample sink. Must be called exactly once, before any shot.
    async fn bind(
        &mut self,
        aggregator: Arc<dyn Aggregator>,
        deps: &GunDeps,
    ) -> Result<(), BindError>;

    /// Execute one ammo item and report its sample.
    ///
    /// All outcome information flows through the reported sample; backend
    /// errors never escape. Calling this on an unbound gun is a
    /// programming defect and panics rather than corrupting the sample
    /// accounting with a silent no-op.
    async fn shoot(&self, ammo: Ammo);
}
