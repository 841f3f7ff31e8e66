//! Progress reporting for long flash operations

/// Observer notified while the programmer works
///
/// Counters passed to the `*_progress` callbacks are cumulative within the
/// current phase.
pub trait FlashProgress {
    /// Called when starting to read flash contents
    fn reading(&mut self, total_bytes: usize);

    /// Called after each chunk is read
    fn read_progress(&mut self, bytes_read: usize);

    /// Called when starting erase operations
    fn erasing(&mut self, blocks_to_erase: usize, bytes_to_erase: usize);

    /// Called after each block is erased
    fn erase_progress(&mut self, blocks_erased: usize, bytes_erased: usize);

    /// Called when starting write operations
    fn writing(&mut self, bytes_to_write: usize);

    /// Called after each chunk is written
    fn write_progress(&mut self, bytes_written: usize);

    /// Called when starting the readback comparison
    fn verifying(&mut self, bytes_to_verify: usize);

    /// Called after each chunk is compared
    fn verify_progress(&mut self, bytes_verified: usize);

    /// Called when the operation is complete
    fn complete(&mut self);
}

/// A no-op progress reporter
pub struct NoProgress;

impl FlashProgress for NoProgress {
    fn reading(&mut self, _total_bytes: usize) {}
    fn read_progress(&mut self, _bytes_read: usize) {}
    fn erasing(&mut self, _blocks_to_erase: usize, _bytes_to_erase: usize) {}
    fn erase_progress(&mut self, _blocks_erased: usize, _bytes_erased: usize) {}
    fn writing(&mut self, _bytes_to_write: usize) {}
    fn write_progress(&mut self, _bytes_written: usize) {}
    fn verifying(&mut self, _bytes_to_verify: usize) {}
    fn verify_progress(&mut self, _bytes_verified: usize) {}
    fn complete(&mut self) {}
}
