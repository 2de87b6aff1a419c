pub mod runtime;
pub mod signal;
pub mod ttl;

pub use runtime::{PipelineConfig, PipelineSummary};
pub use signal::SampleBlock;
pub use ttl::TtlEvent;
