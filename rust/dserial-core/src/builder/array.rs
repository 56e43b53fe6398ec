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
use crate::ensure;
use crate::error::Error;
use crate::types::TypeCode;

mod private {
    pub trait Sealed {}
}

/// Rust types standing in for Java primitive array elements.
///
/// `u16` is a Java `char`; every other type maps to the Java type of the same
/// width and signedness.
pub trait PrimitiveElement: Copy + private::Sealed {
    const TYPE_CODE: TypeCode;

    fn write_to(self, writer: &mut Writer);
}

macro_rules! impl_primitive_element {
    ($($ty:ty => $code:ident, $method:ident;)*) => {
        $(
            impl private::Sealed for $ty {}

            impl PrimitiveElement for $ty {
                const TYPE_CODE: TypeCode = TypeCode::$code;

                #[inline(always)]
                fn write_to(self, writer: &mut Writer) {
                    writer.$method(self);
                }
            }
        )*
    };
}

impl_primitive_element! {
    i8 => Byte, write_i8;
    u16 => Char, write_char;
    f64 => Double, write_f64;
    f32 => Float, write_f32;
    i32 => Int, write_i32;
    i64 => Long, write_i64;
    i16 => Short, write_i16;
    bool => Boolean, write_bool;
}

/// Element writer of one array. Either [`primitives`](Self::primitives) or
/// [`elements`](Self::elements) may be called, once, and must match the
/// component type of the array class; an array left untouched is written
/// with length zero.
pub struct ArrayElements<'a> {
    builder: &'a mut StreamBuilder,
    component: TypeCode,
    written: bool,
}

impl<'a> ArrayElements<'a> {
    pub(crate) fn new(builder: &'a mut StreamBuilder, component: TypeCode) -> Self {
        ArrayElements {
            builder,
            component,
            written: false,
        }
    }

    /// Writes the length and values of a primitive array.
    pub fn primitives<T: PrimitiveElement>(&mut self, values: &[T]) -> Result<(), Error> {
        let claimed = self.claim();
        let component = self.component;
        self.builder.guarded(|b| {
            claimed?;
            ensure!(
                component == T::TYPE_CODE,
                Error::invalid_state(format!(
                    "{:?} elements written to an array of {:?}",
                    T::TYPE_CODE,
                    component
                ))
            );
            let len = array_len(values.len())?;
            let writer = b.writer();
            writer.write_i32(len);
            for value in values {
                value.write_to(writer);
            }
            Ok(())
        })
    }

    /// Writes the elements of an object array. The length is the number of
    /// objects `build` writes directly into the array.
    pub fn elements<F>(&mut self, build: F) -> Result<(), Error>
    where
        F: FnOnce(&mut StreamBuilder) -> Result<(), Error>,
    {
        let claimed = self.claim();
        let component = self.component;
        self.builder.guarded(|b| {
            claimed?;
            ensure!(
                !component.is_primitive(),
                Error::invalid_state(format!(
                    "Object elements written to an array of {:?}",
                    component
                ))
            );
            b.begin_elements()?;
            build(b)?;
            b.end_elements()
        })
    }

    pub(crate) fn finish(self) -> Result<(), Error> {
        if !self.written {
            self.builder.writer().write_i32(0);
        }
        Ok(())
    }

    fn claim(&mut self) -> Result<(), Error> {
        ensure!(
            !self.written,
            Error::invalid_state("Array elements are already written")
        );
        self.written = true;
        Ok(())
    }
}

fn array_len(len: usize) -> Result<i32, Error> {
    i32::try_from(len).map_err(|_| Error::encode_error(format!("Array too long: {} elements", len)))
}
