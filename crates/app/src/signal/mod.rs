pub mod detector_task;
pub mod source;

/// One host-delivered cycle of samples for the designated channel.
/// Block length is source-determined and may vary between cycles.
#[derive(Debug, Clone)]
pub struct SampleBlock {
    pub samples: Vec<f32>,

    /// Position of the block's first sample on the stream clock (sample units)
    pub timestamp: u64,
}
