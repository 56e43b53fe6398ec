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

/// Configuration for stream construction.
///
/// Held by the [`StreamBuilder`](crate::builder::StreamBuilder) for the lifetime of one
/// stream and by [`Dserial`](crate::Dserial) as a template for every stream it starts.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of objects that may be open at once.
    ///
    /// Each open object of a graph write costs a dozen stack frames. The
    /// default fits a 2 MiB thread in debug builds; raise it only together
    /// with the stack size.
    pub max_depth: u32,
    /// Whether equal field type signatures share one string handle.
    /// The JDK interns these strings, so this must stay enabled to
    /// reproduce its streams byte for byte.
    pub intern_type_strings: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: 128,
            intern_type_strings: true,
        }
    }
}

impl Config {
    /// Creates a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum object nesting depth.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enables or disables sharing of field type signature strings.
    pub fn intern_type_strings(mut self, intern: bool) -> Self {
        self.intern_type_strings = intern;
        self
    }

    /// Get maximum nesting depth.
    #[inline(always)]
    pub fn get_max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Check if type signature interning is enabled.
    #[inline(always)]
    pub fn is_intern_type_strings(&self) -> bool {
        self.intern_type_strings
    }
}
