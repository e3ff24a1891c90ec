//! Bounds-checked little-endian writer for host-interop buffers.
//!
//! A point list is a `u32` count followed by `(i32 x, i32 y)` pairs.

use crate::error::WireError;
use crate::point::MousePoint;

/// Encoded size of a point list holding `count` points.
pub fn points_encoded_len(count: usize) -> usize {
    4 + count * 8
}

/// Writes values into a byte slice.
#[derive(Debug)]
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        let remaining = self.remaining();
        let dst = self
            .buf
            .get_mut(self.pos..self.pos + bytes.len())
            .ok_or(WireError::Overflow {
                needed: bytes.len(),
                remaining,
            })?;
        dst.copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    pub fn write_i32(&mut self, v: i32) -> Result<(), WireError> {
        self.put(&v.to_le_bytes())
    }

    pub fn write_u32(&mut self, v: u32) -> Result<(), WireError> {
        self.put(&v.to_le_bytes())
    }

    /// Write a `u32`-counted point list. Nothing is written on overflow.
    pub fn write_points(&mut self, points: &[MousePoint]) -> Result<(), WireError> {
        let needed = points_encoded_len(points.len());
        if needed > self.remaining() {
            return Err(WireError::Overflow {
                needed,
                remaining: self.remaining(),
            });
        }
        self.write_u32(points.len() as u32)?;
        for p in points {
            self.write_i32(p.x)?;
            self.write_i32(p.y)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_layout() {
        let mut buf = [0u8; 20];
        let mut w = ByteWriter::new(&mut buf);
        w.write_points(&[MousePoint::new(1, -2), MousePoint::new(0x0102, 3)])
            .unwrap();
        assert_eq!(w.position(), 20);
        assert_eq!(w.remaining(), 0);
        assert_eq!(&buf[..4], &[2, 0, 0, 0]);
        assert_eq!(&buf[4..8], &[1, 0, 0, 0]);
        assert_eq!(&buf[8..12], &[0xFE, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&buf[12..16], &[0x02, 0x01, 0, 0]);
        assert_eq!(&buf[16..20], &[3, 0, 0, 0]);
    }

    #[test]
    fn test_write_points_overflow_writes_nothing() {
        let mut buf = [0xAAu8; 11];
        let mut w = ByteWriter::new(&mut buf);
        let err = w.write_points(&[MousePoint::new(1, 1)]).unwrap_err();
        assert_eq!(
            err,
            WireError::Overflow {
                needed: 12,
                remaining: 11
            }
        );
        assert_eq!(w.position(), 0);
        assert!(buf.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_scalars_after_points() {
        let mut buf = [0u8; 12];
        let mut w = ByteWriter::new(&mut buf);
        w.write_points(&[]).unwrap();
        w.write_i32(-1).unwrap();
        w.write_u32(7).unwrap();
        assert!(w.write_u32(1).is_err());
        assert_eq!(w.position(), 12);
        assert_eq!(buf, [0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 7, 0, 0, 0]);
    }
}
