//! Progress reporting for long-running commands

/// Receives progress of byte-by-byte operations
///
/// A call with a label starts a new phase; `step == total` ends it.
pub trait Progress {
    /// Report `step` of `total`
    fn report(&mut self, step: usize, total: usize, label: Option<&str>);
}

/// Progress sink that discards every report
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _step: usize, _total: usize, _label: Option<&str>) {}
}
