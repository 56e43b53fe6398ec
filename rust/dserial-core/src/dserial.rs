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

use crate::builder::StreamBuilder;
use crate::config::Config;
use crate::error::Error;
use crate::graph::{GraphWriter, Value};
use crate::handle::Handle;

/// Entry point producing complete serialization streams.
///
/// `Dserial` holds the [`Config`] every stream it starts is built with. Each
/// call produces one self-contained stream: handles, the identity table and
/// interned type strings never carry over from one call to the next.
///
/// # Examples
///
/// ```rust
/// use dserial_core::builder::ClassDescSpec;
/// use dserial_core::types::flags::SC_SERIALIZABLE;
/// use dserial_core::Dserial;
///
/// let dserial = Dserial::default().max_depth(64);
/// let bytes = dserial
///     .serial(|b| {
///         b.descriptors(|d| {
///             d.desc(
///                 &ClassDescSpec::new("SimpleSerializableClass")
///                     .uid(1)
///                     .flags(SC_SERIALIZABLE)
///                     .field("i", "int"),
///             )
///         })?;
///         b.slot(|b| b.prims(|p| {
///             p.int(1);
///         }))
///     })
///     .unwrap();
/// assert_eq!(bytes[4], 0x73);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Dserial {
    config: Config,
}

impl Dserial {
    /// Sets the maximum object nesting depth.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config = self.config.max_depth(max_depth);
        self
    }

    /// Enables or disables sharing of equal field type signatures.
    pub fn intern_type_strings(mut self, intern: bool) -> Self {
        self.config = self.config.intern_type_strings(intern);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Starts a stream to be written with the builder DSL.
    pub fn builder(&self) -> StreamBuilder {
        StreamBuilder::with_config(self.config.clone())
    }

    /// Builds a stream holding one serializable object.
    pub fn serial<F>(&self, build: F) -> Result<Vec<u8>, Error>
    where
        F: FnOnce(&mut StreamBuilder) -> Result<(), Error>,
    {
        let mut builder = self.builder();
        builder.serial_obj(&Handle::new(), build)?;
        builder.finish()
    }

    /// Builds a stream holding one externalizable object.
    pub fn external<F>(&self, build: F) -> Result<Vec<u8>, Error>
    where
        F: FnOnce(&mut StreamBuilder) -> Result<(), Error>,
    {
        let mut builder = self.builder();
        builder.external_obj(&Handle::new(), build)?;
        builder.finish()
    }

    /// Serializes the graph reachable from `root`.
    pub fn write_graph(&self, root: &Value) -> Result<Vec<u8>, Error> {
        let mut writer = GraphWriter::with_config(self.config.clone());
        writer.write(root)?;
        writer.finish()
    }
}
