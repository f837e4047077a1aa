//! Byte-level message reader and writer.
//!
//! All communication is through a stream of messages. The first byte of a
//! message identifies the message type, and the next four bytes specify the
//! length of the rest of the message (this length count includes itself,
//! but not the message-type byte).
//!
//! All multi-byte integers are transmitted in network byte order (most
//! significant byte first). Strings are NUL terminated with no embedded NUL.
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::postgres::ProtocolError;

/// Integer signess in postgres docs is awful.
pub(crate) trait UsizeExt {
    /// length is usize in rust, while postgres wants i32,
    /// this will panic when overflow instead of wrapping
    fn to_i32(self) -> i32;
    /// length is usize in rust, while postgres wants i16,
    /// this will panic when overflow instead of wrapping
    fn to_i16(self) -> i16;
}

impl UsizeExt for usize {
    fn to_i32(self) -> i32 {
        self.try_into().expect("message size too large for protocol")
    }

    fn to_i16(self) -> i16 {
        self.try_into().expect("message size too large for protocol")
    }
}

/// A growable buffer for building postgres messages.
///
/// The length prefix of a frame is not known until the whole body is
/// written, so [`begin_frame`][MessageWriter::begin_frame] reserves four
/// zero bytes and [`end_frame`][MessageWriter::end_frame] patches them
/// afterwards.
#[derive(Debug, Default)]
pub struct MessageWriter {
    buf: BytesMut,
}

impl MessageWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self { buf: BytesMut::new() }
    }

    /// Create an empty writer with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: BytesMut::with_capacity(capacity) }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append a single byte.
    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    /// Append a big-endian signed 16-bit integer.
    pub fn write_int16(&mut self, value: i16) {
        self.buf.put_i16(value);
    }

    /// Append a big-endian unsigned 16-bit integer.
    pub fn write_uint16(&mut self, value: u16) {
        self.buf.put_u16(value);
    }

    /// Append a big-endian signed 32-bit integer.
    pub fn write_int32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    /// Append a big-endian unsigned 32-bit integer.
    pub fn write_uint32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    /// Append a fixed byte sequence.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Append a NUL terminated string.
    ///
    /// Postgres `String` has no length prefix, the terminator is the only
    /// delimiter.
    pub fn write_cstring(&mut self, string: &str) {
        self.buf.put_slice(string.as_bytes());
        self.buf.put_u8(b'\0');
    }

    /// Overwrite a big-endian 32-bit integer at an earlier offset.
    ///
    /// # Panics
    ///
    /// Panics if `offset + 4` exceeds the written length.
    pub fn patch_int32(&mut self, offset: usize, value: i32) {
        self.buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    }

    /// Start a framed message.
    ///
    /// Writes the type byte if any (the startup, SSL request and cancel
    /// request messages have none), then reserves the four length bytes.
    /// Returns the offset to pass to [`end_frame`][MessageWriter::end_frame].
    pub fn begin_frame(&mut self, tag: Option<u8>) -> usize {
        if let Some(tag) = tag {
            self.buf.put_u8(tag);
        }
        let offset = self.buf.len();
        self.buf.put_i32(0);
        offset
    }

    /// Finish a framed message by patching its length.
    ///
    /// The length counts everything from the length field itself to the end
    /// of the buffer, which is exactly `len() - offset`.
    pub fn end_frame(&mut self, offset: usize) {
        let frame_len = (self.buf.len() - offset).to_i32();
        self.patch_int32(offset, frame_len);
    }

    /// Freeze the written bytes.
    pub fn to_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

/// A positional reader over one message payload.
///
/// Every read is bounds checked and fails with
/// [`ProtocolError::UnexpectedEof`] instead of panicking, since the payload
/// comes from the network. Byte-sequence reads are zero-copy slices of the
/// input [`Bytes`].
#[derive(Debug)]
pub struct MessageReader {
    buf: Bytes,
}

impl MessageReader {
    /// Create a reader over a message payload.
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn check(&self, len: usize) -> Result<(), ProtocolError> {
        if self.buf.remaining() < len {
            return Err(ProtocolError::UnexpectedEof);
        }
        Ok(())
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        self.check(1)?;
        Ok(self.buf.get_u8())
    }

    /// Read a big-endian signed 16-bit integer.
    pub fn read_int16(&mut self) -> Result<i16, ProtocolError> {
        self.check(2)?;
        Ok(self.buf.get_i16())
    }

    /// Read a big-endian unsigned 16-bit integer.
    pub fn read_uint16(&mut self) -> Result<u16, ProtocolError> {
        self.check(2)?;
        Ok(self.buf.get_u16())
    }

    /// Read a big-endian signed 32-bit integer.
    pub fn read_int32(&mut self) -> Result<i32, ProtocolError> {
        self.check(4)?;
        Ok(self.buf.get_i32())
    }

    /// Read a big-endian unsigned 32-bit integer.
    pub fn read_uint32(&mut self) -> Result<u32, ProtocolError> {
        self.check(4)?;
        Ok(self.buf.get_u32())
    }

    /// Read a fixed count of bytes as a zero-copy slice.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes, ProtocolError> {
        self.check(len)?;
        Ok(self.buf.split_to(len))
    }

    /// Read a NUL terminated string.
    ///
    /// Scans to the first NUL, consumes the terminator, and decodes the
    /// bytes before it as UTF-8.
    pub fn read_cstring(&mut self) -> Result<String, ProtocolError> {
        let end = self
            .buf
            .iter()
            .position(|b| *b == b'\0')
            .ok_or(ProtocolError::UnexpectedEof)?;
        let body = self.buf.split_to(end);
        self.buf.advance(1); // nul
        match std::str::from_utf8(&body) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => Err(ProtocolError::InvalidUtf8),
        }
    }

    /// Take everything left as a zero-copy slice.
    pub fn read_remaining(&mut self) -> Bytes {
        self.buf.split_off(0)
    }

    /// Fail with [`ProtocolError::InvalidMessage`] if any payload is left.
    ///
    /// Used by fixed-shape messages, which reject trailing bytes.
    pub fn expect_end(&self, message: &str) -> Result<(), ProtocolError> {
        if self.buf.has_remaining() {
            return Err(ProtocolError::invalid(format_args!(
                "{} bytes of trailing data after {message}",
                self.buf.remaining(),
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roundtrip() {
        let mut w = MessageWriter::new();
        w.write_u8(b'Z');
        w.write_int16(-2);
        w.write_uint16(7);
        w.write_int32(-42);
        w.write_uint32(196608);
        w.write_cstring("user");
        w.write_bytes(b"\x01\x02");

        let mut r = MessageReader::new(w.to_bytes());
        assert_eq!(r.read_u8().unwrap(), b'Z');
        assert_eq!(r.read_int16().unwrap(), -2);
        assert_eq!(r.read_uint16().unwrap(), 7);
        assert_eq!(r.read_int32().unwrap(), -42);
        assert_eq!(r.read_uint32().unwrap(), 196608);
        assert_eq!(r.read_cstring().unwrap(), "user");
        assert_eq!(&r.read_bytes(2).unwrap()[..], b"\x01\x02");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn cstring_single_terminator() {
        let mut w = MessageWriter::new();
        w.write_cstring("SELECT 1");
        let bytes = w.to_bytes();
        assert_eq!(bytes.iter().filter(|b| **b == 0).count(), 1);
        assert_eq!(bytes.last(), Some(&0));
    }

    #[test]
    fn read_past_end() {
        let mut r = MessageReader::new(Bytes::from_static(&[0, 0]));
        assert!(matches!(r.read_int32(), Err(ProtocolError::UnexpectedEof)));

        let mut r = MessageReader::new(Bytes::from_static(b"no terminator"));
        assert!(matches!(r.read_cstring(), Err(ProtocolError::UnexpectedEof)));
    }

    #[test]
    fn cstring_invalid_utf8() {
        let mut r = MessageReader::new(Bytes::from_static(&[0xff, 0xfe, 0x00]));
        assert!(matches!(r.read_cstring(), Err(ProtocolError::InvalidUtf8)));
    }

    #[test]
    fn frame_length_law() {
        let mut w = MessageWriter::new();
        let frame = w.begin_frame(Some(b'Q'));
        w.write_cstring("SELECT 1");
        w.end_frame(frame);

        let bytes = w.to_bytes();
        let len = i32::from_be_bytes(bytes[1..5].try_into().unwrap());
        assert_eq!(len as usize, bytes.len() - 1);
    }

    #[test]
    fn untagged_frame() {
        let mut w = MessageWriter::new();
        let frame = w.begin_frame(None);
        w.write_int32(80877103);
        w.end_frame(frame);

        let bytes = w.to_bytes();
        assert_eq!(bytes.len(), 8);
        let len = i32::from_be_bytes(bytes[0..4].try_into().unwrap());
        assert_eq!(len, 8);
    }
}
