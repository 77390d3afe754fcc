//! Minimal BCS encoding for Aptos entry function arguments and resources.
//!
//! Integers are little-endian, sequences and byte strings carry a ULEB128 length prefix, and options are a `0`/`1`
//! tag followed by the value.

use crate::{
    state::AccountAddress,
    utils::errors::{SdkError, SdkResult},
};

#[derive(Debug, Default)]
pub struct BcsWriter {
    buf: Vec<u8>,
}

impl BcsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_uleb128(&mut self, mut value: u64) -> &mut Self {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return self;
            }
            self.buf.push(byte | 0x80);
        }
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.buf.push(value as u8);
        self
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_address(&mut self, address: &AccountAddress) -> &mut Self {
        self.buf.extend_from_slice(&address.0);
        self
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_uleb128(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn write_str(&mut self, value: &str) -> &mut Self {
        self.write_bytes(value.as_bytes())
    }

    pub fn write_option<T>(&mut self, value: Option<T>, write: impl FnOnce(&mut Self, T) -> &mut Self) -> &mut Self {
        match value {
            Some(value) => {
                self.write_u8(1);
                write(self, value)
            }
            None => self.write_u8(0),
        }
    }
}

/// Encodes a single value as a standalone argument.
pub fn encode_u64(value: u64) -> Vec<u8> {
    let mut writer = BcsWriter::new();
    writer.write_u64(value);
    writer.into_bytes()
}

pub fn encode_bool(value: bool) -> Vec<u8> {
    let mut writer = BcsWriter::new();
    writer.write_bool(value);
    writer.into_bytes()
}

pub fn encode_address(address: &AccountAddress) -> Vec<u8> {
    let mut writer = BcsWriter::new();
    writer.write_address(address);
    writer.into_bytes()
}

pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut writer = BcsWriter::new();
    writer.write_bytes(bytes);
    writer.into_bytes()
}

pub fn encode_str(value: &str) -> Vec<u8> {
    let mut writer = BcsWriter::new();
    writer.write_str(value);
    writer.into_bytes()
}

pub fn encode_option_bool(value: Option<bool>) -> Vec<u8> {
    let mut writer = BcsWriter::new();
    writer.write_option(value, BcsWriter::write_bool);
    writer.into_bytes()
}

pub fn encode_option_u64(value: Option<u64>) -> Vec<u8> {
    let mut writer = BcsWriter::new();
    writer.write_option(value, BcsWriter::write_u64);
    writer.into_bytes()
}

pub struct BcsReader<'a> {
    kind: &'static str,
    data: &'a [u8],
}

impl<'a> BcsReader<'a> {
    /// `kind` names the decoded structure in errors.
    pub fn new(kind: &'static str, data: &'a [u8]) -> Self {
        Self { kind, data }
    }

    fn take(&mut self, len: usize) -> SdkResult<&'a [u8]> {
        if self.data.len() < len {
            return Err(SdkError::malformed(self.kind, format!("needed {len} bytes, {} left", self.data.len())));
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;

        Ok(head)
    }

    pub fn read_uleb128(&mut self) -> SdkResult<u64> {
        let mut value = 0u64;
        for shift in (0..64).step_by(7) {
            let byte = self.take(1)?[0];
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }

        Err(SdkError::malformed(self.kind, "ULEB128 value does not fit in 64 bits"))
    }

    pub fn read_bool(&mut self) -> SdkResult<bool> {
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SdkError::malformed(self.kind, format!("invalid bool {other}"))),
        }
    }

    pub fn read_u8(&mut self) -> SdkResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u64(&mut self) -> SdkResult<u64> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn read_address(&mut self) -> SdkResult<AccountAddress> {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(self.take(32)?);
        Ok(AccountAddress(bytes))
    }

    pub fn read_bytes(&mut self) -> SdkResult<&'a [u8]> {
        let len = self.read_uleb128()?;
        let len = usize::try_from(len).map_err(|_| SdkError::malformed(self.kind, "length does not fit in memory"))?;
        self.take(len)
    }

    pub fn read_string(&mut self) -> SdkResult<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|err| SdkError::malformed(self.kind, err))
    }

    pub fn read_option<T>(&mut self, read: impl FnOnce(&mut Self) -> SdkResult<T>) -> SdkResult<Option<T>> {
        match self.read_u8()? {
            0 => Ok(None),
            1 => read(self).map(Some),
            other => Err(SdkError::malformed(self.kind, format!("invalid option tag {other}"))),
        }
    }
}
