//! Session lifecycle state.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not armed; samples are ignored and outputs read as zero.
    #[default]
    Idle,
    /// Armed and waiting for the first sample to fix the time base.
    Armed,
    /// Receiving samples.
    Running,
}
