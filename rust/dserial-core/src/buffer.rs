// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::ensure;
use crate::error::Error;
use crate::types::{MAX_BLOCK_SIZE, TC_BLOCKDATA, TC_BLOCKDATALONG};
use crate::util::{modified_utf8_len, to_modified_utf8};
use byteorder::{BigEndian, ByteOrder};

/// Growable big-endian byte buffer.
#[derive(Default)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Self {
        Writer {
            bf: Vec::with_capacity(capacity),
        }
    }

    pub fn reset(&mut self) {
        // keep capacity and reset len to 0
        self.bf.clear();
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn set_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), Error> {
        let capacity = self.bf.len();
        self.bf
            .get_mut(offset..offset + data.len())
            .ok_or_else(|| Error::buffer_out_of_bound(offset, data.len(), capacity))?
            .copy_from_slice(data);
        Ok(())
    }

    pub fn write_bytes(&mut self, v: &[u8]) -> usize {
        self.bf.extend_from_slice(v);
        v.len()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bf.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.bf.push(value as u8);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.bf.push(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        let mut b = [0; 2];
        BigEndian::write_u16(&mut b, value);
        self.bf.extend_from_slice(&b);
    }

    pub fn write_i16(&mut self, value: i16) {
        let mut b = [0; 2];
        BigEndian::write_i16(&mut b, value);
        self.bf.extend_from_slice(&b);
    }

    /// Writes one UTF-16 code unit, the wire form of a Java `char`.
    pub fn write_char(&mut self, value: u16) {
        self.write_u16(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        let mut b = [0; 4];
        BigEndian::write_i32(&mut b, value);
        self.bf.extend_from_slice(&b);
    }

    pub fn write_i64(&mut self, value: i64) {
        let mut b = [0; 8];
        BigEndian::write_i64(&mut b, value);
        self.bf.extend_from_slice(&b);
    }

    pub fn write_u64(&mut self, value: u64) {
        let mut b = [0; 8];
        BigEndian::write_u64(&mut b, value);
        self.bf.extend_from_slice(&b);
    }

    pub fn write_f32(&mut self, value: f32) {
        let mut b = [0; 4];
        BigEndian::write_f32(&mut b, value);
        self.bf.extend_from_slice(&b);
    }

    pub fn write_f64(&mut self, value: f64) {
        let mut b = [0; 8];
        BigEndian::write_f64(&mut b, value);
        self.bf.extend_from_slice(&b);
    }

    /// Writes every UTF-16 code unit of `s`, like `DataOutput.writeChars`.
    pub fn write_chars(&mut self, s: &str) {
        for unit in s.encode_utf16() {
            self.write_u16(unit);
        }
    }

    /// Writes `s` with a two byte length prefix, like `DataOutput.writeUTF`.
    pub fn write_utf(&mut self, s: &str) -> Result<(), Error> {
        let len = modified_utf8_len(s);
        ensure!(
            len <= u16::MAX as usize,
            Error::encode_error(format!("Encoded string too long: {} bytes", len))
        );
        self.write_u16(len as u16);
        self.write_bytes(&to_modified_utf8(s));
        Ok(())
    }

    /// Writes `s` with an eight byte length prefix, the body of `TC_LONGSTRING`.
    pub fn write_long_utf(&mut self, s: &str) {
        let bytes = to_modified_utf8(s);
        self.write_u64(bytes.len() as u64);
        self.write_bytes(&bytes);
    }
}

/// Output stream switching between plain and block-data mode.
///
/// In block-data mode writes are buffered and framed as `TC_BLOCKDATA` or
/// `TC_BLOCKDATALONG` records when the mode is left. Records never exceed
/// [`MAX_BLOCK_SIZE`] bytes.
#[derive(Default)]
pub struct BlockDataWriter {
    out: Writer,
    pending: Option<Writer>,
}

impl BlockDataWriter {
    pub fn new(out: Writer) -> Self {
        BlockDataWriter { out, pending: None }
    }

    #[inline(always)]
    pub fn is_block_data_mode(&self) -> bool {
        self.pending.is_some()
    }

    /// The writer receiving bytes in the current mode.
    #[inline(always)]
    pub fn current(&mut self) -> &mut Writer {
        match self.pending {
            Some(ref mut block) => block,
            None => &mut self.out,
        }
    }

    /// Length of the underlying stream, excluding unflushed block data.
    pub fn stream_len(&self) -> usize {
        self.out.len()
    }

    /// Overwrites an `int` previously written to the underlying stream.
    pub fn patch_i32(&mut self, offset: usize, value: i32) -> Result<(), Error> {
        self.out.set_bytes(offset, &value.to_be_bytes())
    }

    /// Switches the mode and returns the previous one.
    ///
    /// Leaving block-data mode flushes the buffered bytes; entering it while
    /// it is already active is an error.
    pub fn set_block_data_mode(&mut self, active: bool) -> Result<bool, Error> {
        let was_active = self.is_block_data_mode();
        if active {
            ensure!(
                !was_active,
                Error::invalid_state("Block data mode is already active")
            );
            self.pending = Some(Writer::default());
        } else if let Some(block) = self.pending.take() {
            for chunk in block.as_slice().chunks(MAX_BLOCK_SIZE) {
                if chunk.len() <= u8::MAX as usize {
                    self.out.write_u8(TC_BLOCKDATA);
                    self.out.write_u8(chunk.len() as u8);
                } else {
                    self.out.write_u8(TC_BLOCKDATALONG);
                    self.out.write_i32(chunk.len() as i32);
                }
                self.out.write_bytes(chunk);
            }
        }
        Ok(was_active)
    }

    /// Returns the finished stream.
    pub fn finish(self) -> Result<Vec<u8>, Error> {
        ensure!(
            !self.is_block_data_mode(),
            Error::invalid_state("Stream has pending block data")
        );
        Ok(self.out.into_bytes())
    }
}
