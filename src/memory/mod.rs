use std::io::{Error, ErrorKind, Result};
use std::ops::Range;

pub const ADDRESS_SPACE_SIZE: usize = 0x10000;

/// Flat backing store for the whole CPU address space. Indexing by `u16`
/// keeps every access in bounds.
pub struct Memory {
    pub(crate) data: Box<[u8; ADDRESS_SPACE_SIZE]>,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            data: Box::new([0; ADDRESS_SPACE_SIZE]),
        }
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, data: u8) {
        self.data[addr as usize] = data;
    }

    pub fn clear(&mut self, range: Range<u16>) {
        self.data[range.start as usize..range.end as usize].fill(0);
    }

    // Save state methods
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.to_vec()
    }

    /// Restores from a snapshot, which must cover the whole address space.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<()> {
        check_snapshot_len(bytes.len())?;
        self.data.copy_from_slice(bytes);
        Ok(())
    }
}

pub fn check_snapshot_len(len: usize) -> Result<()> {
    if len != ADDRESS_SPACE_SIZE {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!(
                "memory snapshot is {} bytes, expected {}",
                len, ADDRESS_SPACE_SIZE
            ),
        ));
    }
    Ok(())
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
