pub mod collector;
pub mod percentiles;
pub mod stream;

pub use collector::{CollectorSnapshot, SampleCollector};
pub use percentiles::PercentileSet;
pub use stream::snapshot_stream;
