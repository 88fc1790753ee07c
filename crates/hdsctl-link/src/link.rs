//! The device link interface.

use crate::error::LinkResult;

/// A point-to-point bulk-transfer link to the instrument.
///
/// Implementations enforce their own per-transfer I/O timeout. Opening the
/// link is the constructor's job and closing it happens on drop.
pub trait DeviceLink: Send {
    /// Write one command. Returns the number of bytes transferred.
    fn write(&mut self, data: &[u8]) -> LinkResult<usize>;

    /// Read one response of at most `max_len` bytes.
    ///
    /// An empty buffer means no data was available, which is not an error.
    fn read(&mut self, max_len: usize) -> LinkResult<Vec<u8>>;
}

impl<L: DeviceLink + ?Sized> DeviceLink for Box<L> {
    fn write(&mut self, data: &[u8]) -> LinkResult<usize> {
        (**self).write(data)
    }

    fn read(&mut self, max_len: usize) -> LinkResult<Vec<u8>> {
        (**self).read(max_len)
    }
}
