//! Binary stream primitives
//!
//! All values are little-endian. Strings are a `u32` byte length followed by
//! UTF-8 bytes with no terminator.

use std::io::{self, Read, Write};

use crate::error::corrupt;

/// Upper bound on speculative pre-allocation driven by a count read from the
/// stream. Larger counts still work, they just grow incrementally.
pub(crate) const MAX_PREALLOC: usize = 4096;

/// Write primitives used by the archive writer
pub trait BinaryOutput {
    fn write_dword(&mut self, val: u32) -> io::Result<()>;

    fn write_float(&mut self, val: f32) -> io::Result<()>;

    fn write_string(&mut self, val: &str) -> io::Result<()>;

    /// Write a raw run of dwords without a count prefix
    fn write_dwords(&mut self, vals: &[u32]) -> io::Result<()>;

    /// Write a raw run of floats without a count prefix
    fn write_floats(&mut self, vals: &[f32]) -> io::Result<()>;

    /// Write a length or count as a dword, rejecting values above `u32::MAX`
    fn write_count(&mut self, count: usize) -> io::Result<()> {
        let count = u32::try_from(count)
            .map_err(|_| corrupt(format!("count {} does not fit in a dword", count)))?;
        self.write_dword(count)
    }
}

impl<W: Write + ?Sized> BinaryOutput for W {
    fn write_dword(&mut self, val: u32) -> io::Result<()> {
        self.write_all(&val.to_le_bytes())
    }

    fn write_float(&mut self, val: f32) -> io::Result<()> {
        self.write_all(&val.to_le_bytes())
    }

    fn write_string(&mut self, val: &str) -> io::Result<()> {
        self.write_count(val.len())?;
        self.write_all(val.as_bytes())
    }

    fn write_dwords(&mut self, vals: &[u32]) -> io::Result<()> {
        let mut bytes = Vec::with_capacity(vals.len() * 4);
        for v in vals {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        self.write_all(&bytes)
    }

    fn write_floats(&mut self, vals: &[f32]) -> io::Result<()> {
        let mut bytes = Vec::with_capacity(vals.len() * 4);
        for v in vals {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        self.write_all(&bytes)
    }
}

/// Read primitives used by the archive reader
pub trait BinaryInput {
    fn read_dword(&mut self) -> io::Result<u32>;

    fn read_float(&mut self) -> io::Result<f32>;

    fn read_string(&mut self) -> io::Result<String>;

    fn read_dwords(&mut self, count: usize) -> io::Result<Vec<u32>>;

    fn read_floats(&mut self, count: usize) -> io::Result<Vec<f32>>;

    /// Read a dword count as `usize`
    fn read_count(&mut self) -> io::Result<usize> {
        Ok(self.read_dword()? as usize)
    }
}

impl<R: Read + ?Sized> BinaryInput for R {
    fn read_dword(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_float(&mut self) -> io::Result<f32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    fn read_string(&mut self) -> io::Result<String> {
        let len = self.read_count()?;
        let mut bytes = Vec::with_capacity(len.min(MAX_PREALLOC));
        // Grows with the bytes actually present, not the declared length
        Read::take(&mut *self, len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
        }
        String::from_utf8(bytes).map_err(|e| corrupt(format!("invalid UTF-8 in string: {}", e)))
    }

    fn read_dwords(&mut self, count: usize) -> io::Result<Vec<u32>> {
        let mut vals = Vec::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            vals.push(self.read_dword()?);
        }
        Ok(vals)
    }

    fn read_floats(&mut self, count: usize) -> io::Result<Vec<f32>> {
        let mut vals = Vec::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            vals.push(self.read_float()?);
        }
        Ok(vals)
    }
}
