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
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Identity-keyed registry of the handles of one graph write.
///
/// HandleTable maps object pointer addresses to handles, so that the writer
/// can tell the first sight of an object from every later one. Lookups for an
/// identity not seen before register a fresh, unassigned handle before
/// returning, which lets a child edge pointing back to an ancestor find the
/// ancestor's handle while the ancestor is still being written.
///
/// Only addresses are stored; the table never keeps an object alive. Callers
/// must keep the graph alive for as long as the table is in use.
///
/// # Examples
///
/// ```rust
/// use dserial_core::resolver::handle_table::HandleTable;
/// use std::rc::Rc;
///
/// let mut table = HandleTable::new();
/// let obj = Rc::new(42);
///
/// let (first, first_sight) = table.resolve(&obj);
/// assert!(first_sight);
///
/// let (again, first_sight) = table.resolve(&obj.clone());
/// assert!(!first_sight);
/// assert!(first.ptr_eq(&again));
/// ```
#[derive(Default)]
pub struct HandleTable {
    handles: HashMap<usize, Handle>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle of the object behind `rc`, and whether this is the
    /// first time the object is seen.
    pub fn resolve<T: ?Sized>(&mut self, rc: &Rc<T>) -> (Handle, bool) {
        self.resolve_address(Rc::as_ptr(rc) as *const () as usize)
    }

    /// Same as [`resolve`](Self::resolve) for objects shared through `Arc`.
    pub fn resolve_arc<T: ?Sized>(&mut self, arc: &Arc<T>) -> (Handle, bool) {
        self.resolve_address(Arc::as_ptr(arc) as *const () as usize)
    }

    fn resolve_address(&mut self, ptr_addr: usize) -> (Handle, bool) {
        match self.handles.entry(ptr_addr) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => (entry.insert(Handle::new()).clone(), true),
        }
    }

    /// Number of distinct identities seen.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Drops every registered handle.
    pub fn reset(&mut self) {
        self.handles.clear();
    }
}
