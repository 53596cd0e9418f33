//! Little-endian primitives shared by the encoder and decoder.

use bytes::{Buf, BufMut};

pub(crate) fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.put_u16_le(value);
}

/// Write `value` with a `u16` length prefix. The caller checks the length.
pub(crate) fn put_value(buf: &mut Vec<u8>, value: &[u8]) {
    buf.put_u16_le(value.len() as u16);
    buf.put_slice(value);
}

/// Bounds-checked cursor over encoded bytes.
pub(crate) struct WireReader<'a> {
    buf: &'a [u8],
}

impl<'a> WireReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub(crate) fn read_u16(&mut self) -> Option<u16> {
        if self.buf.remaining() < 2 {
            return None;
        }
        Some(self.buf.get_u16_le())
    }

    /// Read a `u16`-length-prefixed value.
    pub(crate) fn read_value(&mut self) -> Option<&'a [u8]> {
        let len = self.read_u16()? as usize;
        if self.buf.len() < len {
            return None;
        }
        let (value, rest) = self.buf.split_at(len);
        self.buf = rest;
        Some(value)
    }
}
