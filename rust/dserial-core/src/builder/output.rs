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

use super::StreamBuilder;
use crate::buffer::Writer;
use crate::error::Error;

/// Primitive field values of one class, in declaration order.
#[derive(Default)]
pub struct PrimitiveFields {
    values: Writer,
}

impl PrimitiveFields {
    pub fn byte(&mut self, value: i8) -> &mut Self {
        self.values.write_i8(value);
        self
    }

    /// A Java `char`, given as its UTF-16 code unit.
    pub fn char(&mut self, value: u16) -> &mut Self {
        self.values.write_char(value);
        self
    }

    pub fn double(&mut self, value: f64) -> &mut Self {
        self.values.write_f64(value);
        self
    }

    pub fn float(&mut self, value: f32) -> &mut Self {
        self.values.write_f32(value);
        self
    }

    pub fn int(&mut self, value: i32) -> &mut Self {
        self.values.write_i32(value);
        self
    }

    pub fn long(&mut self, value: i64) -> &mut Self {
        self.values.write_i64(value);
        self
    }

    pub fn short(&mut self, value: i16) -> &mut Self {
        self.values.write_i16(value);
        self
    }

    pub fn boolean(&mut self, value: bool) -> &mut Self {
        self.values.write_bool(value);
        self
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.values.as_slice()
    }
}

/// The `ObjectOutput` handed to custom write routines.
///
/// Primitive writes land in the current block-data record. Objects written
/// through [`builder`](Self::builder) interrupt the record and resume block
/// data afterwards, as `ObjectOutputStream.writeObject` does.
pub struct DataOutput<'a> {
    builder: &'a mut StreamBuilder,
}

impl<'a> DataOutput<'a> {
    pub(crate) fn new(builder: &'a mut StreamBuilder) -> Self {
        DataOutput { builder }
    }

    /// Writes the low eight bits of `value`, like `DataOutput.write(int)`.
    pub fn write_u8(&mut self, value: u8) {
        self.builder.writer().write_u8(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.builder.writer().write_i8(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.builder.writer().write_bool(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.builder.writer().write_i16(value);
    }

    pub fn write_char(&mut self, value: u16) {
        self.builder.writer().write_char(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.builder.writer().write_i32(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.builder.writer().write_i64(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.builder.writer().write_f32(value);
    }

    pub fn write_f64(&mut self, value: f64) {
        self.builder.writer().write_f64(value);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.builder.writer().write_bytes(bytes);
    }

    pub fn write_chars(&mut self, s: &str) {
        self.builder.writer().write_chars(s);
    }

    pub fn write_utf(&mut self, s: &str) -> Result<(), Error> {
        self.builder.writer().write_utf(s)
    }

    /// Writes the class's serializable fields in their default layout, as
    /// `defaultWriteObject` does. Block data written so far is flushed first.
    pub fn default_write_object<F>(&mut self, build: F) -> Result<(), Error>
    where
        F: FnOnce(&mut StreamBuilder) -> Result<(), Error>,
    {
        self.builder.guarded(|b| {
            b.out.set_block_data_mode(false)?;
            build(b)?;
            b.out.set_block_data_mode(true)?;
            Ok(())
        })
    }

    /// Gives access to the builder for writing nested objects.
    pub fn builder(&mut self) -> &mut StreamBuilder {
        self.builder
    }
}
