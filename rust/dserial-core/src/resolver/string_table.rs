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

use crate::handle::Handle;
use std::collections::HashMap;

/// Handles of interned strings.
///
/// The JDK interns field type signatures, so equal signatures are the same
/// string object and share a handle. This table gives value-equal strings a
/// single identity; it is the only place where value equality stands in for
/// object identity.
#[derive(Default)]
pub struct StringTable {
    handles: HashMap<String, Handle>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle of `s` and whether this is its first occurrence.
    pub fn resolve(&mut self, s: &str) -> (Handle, bool) {
        if let Some(handle) = self.handles.get(s) {
            return (handle.clone(), false);
        }
        let handle = Handle::new();
        self.handles.insert(s.to_string(), handle.clone());
        (handle, true)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
