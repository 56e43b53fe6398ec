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

//! Object handles and the gateway that assigns them.
//!
//! A [`Handle`] is an identity placeholder for one object of a stream. It can be
//! created long before the object is written, passed around freely and cloned;
//! all clones share one write-once slot. The index inside the slot is visible
//! only to [`HandleAccess`], which cannot be constructed outside this crate.
//! Each [`StreamBuilder`](crate::builder::StreamBuilder) owns exactly one
//! gateway and is therefore the only code able to assign or read an index.
//!
//! ```rust
//! use dserial_core::handle::Handle;
//!
//! let handle = Handle::new();
//! let same = handle.clone();
//! assert!(!handle.is_assigned());
//! assert!(handle.ptr_eq(&same));
//! assert_eq!(handle.to_string(), "Handle{objectIndex=?}");
//! ```

use crate::error::Error;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Identity placeholder for one object in a stream.
#[derive(Clone, Default)]
pub struct Handle {
    object_index: Rc<Cell<Option<u32>>>,
}

impl Handle {
    /// Creates a handle which has not been assigned an object index yet.
    /// The index is assigned when the handle is passed to the builder call
    /// writing the object it stands for.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether this handle has been assigned an object index.
    #[inline(always)]
    pub fn is_assigned(&self) -> bool {
        self.object_index.get().is_some()
    }

    /// Returns whether both handles share the same slot.
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Rc::ptr_eq(&self.object_index, &other.object_index)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.object_index.get() {
            Some(index) => write!(f, "Handle{{objectIndex={}}}", index),
            None => f.write_str("Handle{objectIndex=?}"),
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Capability to assign and read handle indices.
pub struct HandleAccess {
    _sealed: (),
}

impl HandleAccess {
    pub(crate) fn new() -> Self {
        HandleAccess { _sealed: () }
    }

    /// Commits `object_index` as the permanent index of `unassigned_handle`.
    ///
    /// Fails with [`Error::AlreadyAssigned`] if the handle has an index already,
    /// whatever value is supplied now.
    pub fn assign_index(&self, unassigned_handle: &Handle, object_index: u32) -> Result<(), Error> {
        if unassigned_handle.is_assigned() {
            return Err(Error::already_assigned(unassigned_handle.to_string()));
        }
        unassigned_handle.object_index.set(Some(object_index));
        Ok(())
    }

    /// Returns the index committed for `assigned_handle`.
    ///
    /// Fails with [`Error::NotAssignedYet`] before [`assign_index`](Self::assign_index).
    pub fn object_index(&self, assigned_handle: &Handle) -> Result<u32, Error> {
        assigned_handle
            .object_index
            .get()
            .ok_or_else(Error::not_assigned_yet)
    }
}
