use crate::sample::Sample;

/// Sink that accepts completed [`Sample`]s.
///
/// The gun core depends only on this accept-contract; what happens to a
/// sample afterwards (histograms, export, logging) is the aggregator's
/// business. Implementations must tolerate concurrent `report` calls,
/// since many shots run in parallel against the same sink.
///
/// `report` is invoked exactly once per shoot, including shots whose
/// backend call failed, and should return quickly: the gun has already
/// measured latency by the time it reports, but a slow sink still stalls
/// the worker driving the gun.
///
/// [`SampleCollector`](crate::metrics::SampleCollector) is the built-in
/// implementation.
pub trait Aggregator: Send + Sync {
    fn report(&self, sample: Sample);
}
