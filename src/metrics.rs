#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderMetrics {
    pub command_count: usize,
    pub image_count: usize,
    pub total_bytes: usize,
}
