//! Typed big-endian readers and writers for instruction arguments

use crate::address::{Address, ADDRESS_LEN};
use crate::error::{ArgsError, ArgsResult};
use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, BytesMut};

/// Sequential reader over one instruction's argument bytes
///
/// Every read is bounds-checked; fixed layouts finish with [`ArgsReader::finish`]
/// so that unexpected trailing bytes are rejected rather than ignored.
#[derive(Debug, Clone)]
pub struct ArgsReader<'a> {
    args: &'a [u8],
    offset: usize,
}

impl<'a> ArgsReader<'a> {
    pub fn new(args: &'a [u8]) -> Self {
        Self { args, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.args.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, need: usize, field: &'static str) -> ArgsResult<&'a [u8]> {
        if need > self.remaining() {
            return Err(ArgsError::Truncated {
                field,
                need,
                got: self.remaining(),
                offset: self.offset,
            });
        }
        let slice = &self.args[self.offset..self.offset + need];
        self.offset += need;
        Ok(slice)
    }

    pub fn read_u8(&mut self, field: &'static str) -> ArgsResult<u8> {
        Ok(self.take(1, field)?[0])
    }

    pub fn read_u16(&mut self, field: &'static str) -> ArgsResult<u16> {
        Ok(BigEndian::read_u16(self.take(2, field)?))
    }

    pub fn read_u64(&mut self, field: &'static str) -> ArgsResult<u64> {
        Ok(BigEndian::read_u64(self.take(8, field)?))
    }

    pub fn read_u128(&mut self, field: &'static str) -> ArgsResult<u128> {
        Ok(BigEndian::read_u128(self.take(16, field)?))
    }

    pub fn read_address(&mut self, field: &'static str) -> ArgsResult<Address> {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(self.take(ADDRESS_LEN, field)?);
        Ok(Address(bytes))
    }

    /// Remaining bytes, consuming them
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.args[self.offset..];
        self.offset = self.args.len();
        rest
    }

    /// Fail if any bytes are left unread
    pub fn finish(self) -> ArgsResult<()> {
        if !self.is_empty() {
            return Err(ArgsError::TrailingBytes {
                extra: self.remaining(),
                offset: self.offset,
            });
        }
        Ok(())
    }
}

/// Big-endian argument encoder used by the program builder
#[derive(Debug, Default, Clone)]
pub struct ArgsWriter {
    buf: BytesMut,
}

impl ArgsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.buf.put_u8(value);
        self
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.buf.put_u16(value);
        self
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.buf.put_u64(value);
        self
    }

    pub fn u128(mut self, value: u128) -> Self {
        self.buf.put_u128(value);
        self
    }

    pub fn address(mut self, value: &Address) -> Self {
        self.buf.put_slice(value.as_bytes());
        self
    }

    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.buf.put_slice(value);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}
