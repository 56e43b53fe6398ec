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

//! # dserial core
//!
//! Construction of byte-exact streams in the Java Object Serialization Stream
//! Protocol (magic `0xACED`, version 5).
//!
//! Every object written to a stream gets an object index the first time it is
//! written; later occurrences are back-references to that index. Objects are
//! represented by [`Handle`](handle::Handle)s, which may be created and
//! referred to before the object exists and are assigned exactly once, when
//! the object is committed to the stream.
//!
//! ## Modules
//!
//! - **`handle`**: `Handle` and the `HandleAccess` gateway assigning indices
//! - **`resolver`**: identity and string keyed handle tables
//! - **`builder`**: the `StreamBuilder` DSL and class descriptors
//! - **`graph`**: `Rc` based object graphs and the `GraphWriter`
//! - **`buffer`**: big-endian `Writer` and block-data framing
//! - **`types`**: protocol constants
//! - **`error`**: error type and result helpers
//! - **`util`**: modified UTF-8 and type name conversions
//!
//! ## Usage
//!
//! ```rust
//! use dserial_core::builder::ClassDescSpec;
//! use dserial_core::graph::{ClassData, ClassDesc, JavaObject, Value};
//! use dserial_core::types::flags::SC_SERIALIZABLE;
//! use dserial_core::Dserial;
//!
//! let desc = ClassDesc::class(
//!     ClassDescSpec::new("Node")
//!         .uid(1)
//!         .flags(SC_SERIALIZABLE)
//!         .field("next", "Node"),
//! );
//! let node = JavaObject::serial(&desc, vec![ClassData::Fields(vec![Value::Null])]);
//! // close the cycle
//! node.set_field(0, 0, Value::from(&node)).unwrap();
//!
//! let bytes = Dserial::default().write_graph(&Value::from(&node)).unwrap();
//! assert_eq!(&bytes[bytes.len() - 5..], &[0x71, 0x00, 0x7E, 0x00, 0x02]);
//! ```

pub mod buffer;
pub mod builder;
pub mod config;
pub mod dserial;
pub mod error;
pub mod graph;
pub mod handle;
pub mod resolver;
pub mod types;
pub mod util;

pub use config::Config;
pub use dserial::Dserial;
pub use error::Error;
pub use handle::{Handle, HandleAccess};
