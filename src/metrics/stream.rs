use std::sync::Arc;
use std::time::Duration;

use tokio_stream::wrappers::IntervalStream;
use tokio_stream::{Stream, StreamExt};

use super::collector::{CollectorSnapshot, SampleCollector};

/// Periodic read-only snapshots of a collector, as an async stream.
///
/// Useful for live dashboards or progress logging while a run is in
/// flight; the collector keeps accepting samples concurrently. The first
/// snapshot is yielded immediately, then one per `every` interval.
pub fn snapshot_stream(
    collector: Arc<SampleCollector>,
    every: Duration,
) -> impl Stream<Item = CollectorSnapshot> {
    let interval = tokio::time::interval(every);
    IntervalStream::new(interval).map(move |_| collector.snapshot())
}
