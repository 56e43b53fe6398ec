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

//! # dserial
//!
//! Build Java serialization streams byte for byte, without a JVM.
//!
//! Two front ends share one handle model:
//!
//! - the [`StreamBuilder`] DSL, where every object is written explicitly and
//!   identity is expressed with [`Handle`]s;
//! - object graphs of [`JavaObject`]s shared through `Rc`, written by the
//!   [`GraphWriter`], where identity is the allocation.
//!
//! In both, an object gets an index when it is committed to the stream and
//! every later occurrence is written as a back-reference to that index.
//!
//! ## The builder DSL
//!
//! ```rust
//! use dserial::{serial, ClassDescSpec, Handle, SC_SERIALIZABLE};
//!
//! let message = Handle::new();
//! let bytes = serial(|b| {
//!     b.descriptors(|d| {
//!         d.desc(
//!             &ClassDescSpec::new("Pair")
//!                 .uid(1)
//!                 .flags(SC_SERIALIZABLE)
//!                 .field("first", "java.lang.String")
//!                 .field("second", "java.lang.String"),
//!         )
//!     })?;
//!     b.slot(|b| {
//!         b.objs(|b| {
//!             b.string("hello", &message)?;
//!             b.reference(&message)
//!         })
//!     })
//! })
//! .unwrap();
//! assert_eq!(&bytes[..2], &[0xAC, 0xED]);
//! ```
//!
//! ## Object graphs
//!
//! ```rust
//! use dserial::{
//!     write_graph, ArrayData, ClassDesc, ClassDescSpec, JavaObject, Value, SC_SERIALIZABLE,
//! };
//!
//! let strings = ClassDesc::class(
//!     ClassDescSpec::new("java.lang.String[]")
//!         .uid(-5921575005990323385)
//!         .flags(SC_SERIALIZABLE),
//! );
//! let hello = JavaObject::string("hello");
//! let array = JavaObject::array(
//!     &strings,
//!     ArrayData::Object(vec![Value::from(&hello), Value::from(&hello)]),
//! );
//! let bytes = write_graph(&Value::from(&array)).unwrap();
//! // the second element refers back to the first
//! assert_eq!(&bytes[bytes.len() - 5..], &[0x71, 0x00, 0x7E, 0x00, 0x02]);
//! ```

pub use dserial_core::{
    builder::{
        ArrayElements, ClassDescSpec, DataOutput, DescriptorsBuilder, FieldSpec, PrimitiveElement,
        PrimitiveFields, StreamBuilder,
    },
    error::Error,
    graph::{
        ArrayData, ClassData, ClassDesc, DescKind, ExternalHook, GraphWriter, JavaObject,
        ObjectOutput, ObjectRef, Value, WriteObjectHook,
    },
    handle::{Handle, HandleAccess},
    resolver::handle_table::HandleTable,
    types::flags::{SC_BLOCK_DATA, SC_ENUM, SC_EXTERNALIZABLE, SC_SERIALIZABLE, SC_WRITE_METHOD},
    Config, Dserial,
};

/// Builds a stream holding one serializable object with the default [`Config`].
pub fn serial<F>(build: F) -> Result<Vec<u8>, Error>
where
    F: FnOnce(&mut StreamBuilder) -> Result<(), Error>,
{
    Dserial::default().serial(build)
}

/// Builds a stream holding one externalizable object with the default [`Config`].
pub fn external<F>(build: F) -> Result<Vec<u8>, Error>
where
    F: FnOnce(&mut StreamBuilder) -> Result<(), Error>,
{
    Dserial::default().external(build)
}

/// Serializes the graph reachable from `root` with the default [`Config`].
pub fn write_graph(root: &Value) -> Result<Vec<u8>, Error> {
    Dserial::default().write_graph(root)
}
