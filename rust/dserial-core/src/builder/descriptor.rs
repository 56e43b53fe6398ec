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
use crate::ensure;
use crate::error::Error;
use crate::handle::Handle;
use crate::types::TypeCode;
use crate::util::field_type_code;

/// A serializable field: its name and source-style type name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub type_name: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        FieldSpec {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    pub fn type_code(&self) -> Result<TypeCode, Error> {
        field_type_code(&self.type_name)
    }
}

/// Description of one class as it appears in a plain class descriptor.
///
/// Type names use Java source syntax: `int`, `java.lang.String`, `byte[]`,
/// `java.lang.Object[][]`. Fields are written in the order they are added;
/// the JDK lists primitive fields first, each group sorted by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDescSpec {
    pub name: String,
    pub uid: Option<i64>,
    pub flags: u8,
    pub fields: Vec<FieldSpec>,
}

impl ClassDescSpec {
    pub fn new(name: impl Into<String>) -> Self {
        ClassDescSpec {
            name: name.into(),
            uid: None,
            flags: 0,
            fields: Vec::new(),
        }
    }

    pub fn uid(mut self, uid: i64) -> Self {
        self.uid = Some(uid);
        self
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn field(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.fields.push(FieldSpec::new(name, type_name));
        self
    }

    #[inline(always)]
    pub fn has_flags(&self, flags: u8) -> bool {
        self.flags & flags == flags
    }
}

/// Writes the class descriptor chain of one object, concrete class first.
///
/// The chain is terminated with `TC_NULL` when the closure returns, unless it
/// ended in a [`reference`](Self::reference) to a descriptor written earlier.
pub struct DescriptorsBuilder<'a> {
    builder: &'a mut StreamBuilder,
    is_enum: bool,
    written: usize,
    terminated: bool,
}

impl<'a> DescriptorsBuilder<'a> {
    pub(crate) fn new(builder: &'a mut StreamBuilder, is_enum: bool) -> Self {
        DescriptorsBuilder {
            builder,
            is_enum,
            written: 0,
            terminated: false,
        }
    }

    /// Writes a plain class descriptor with a fresh handle.
    pub fn desc(&mut self, spec: &ClassDescSpec) -> Result<(), Error> {
        self.desc_with(&Handle::new(), spec)
    }

    /// Writes a plain class descriptor and assigns it `handle`, so that later
    /// objects of the same class can refer back to it.
    pub fn desc_with(&mut self, handle: &Handle, spec: &ClassDescSpec) -> Result<(), Error> {
        let is_enum = self.is_enum;
        self.append(handle, |b| b.write_class_desc(handle, spec, is_enum))
    }

    /// Writes a dynamic proxy descriptor for `interfaces`.
    ///
    /// The proxy's super descriptor (`java.lang.reflect.Proxy`) is written by
    /// the next [`desc`](Self::desc) call.
    pub fn proxy<S: AsRef<str>>(&mut self, interfaces: &[S]) -> Result<(), Error> {
        self.proxy_with(&Handle::new(), interfaces)
    }

    pub fn proxy_with<S: AsRef<str>>(
        &mut self,
        handle: &Handle,
        interfaces: &[S],
    ) -> Result<(), Error> {
        self.append(handle, |b| b.write_proxy_desc(handle, interfaces))
    }

    /// Refers back to a descriptor written earlier. This ends the chain: the
    /// referenced descriptor's own super descriptors are already in the stream.
    pub fn reference(&mut self, handle: &Handle) -> Result<(), Error> {
        self.append(handle, |b| b.write_handle_reference(handle))?;
        self.terminated = true;
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<(), Error> {
        ensure!(
            self.written > 0,
            Error::invalid_state("No class descriptor written")
        );
        if !self.terminated {
            self.builder.write_null_desc();
        }
        Ok(())
    }

    /// Writes one descriptor of the chain. The first one names the class of
    /// the object.
    fn append<F>(&mut self, handle: &Handle, write: F) -> Result<(), Error>
    where
        F: FnOnce(&mut StreamBuilder) -> Result<(), Error>,
    {
        ensure!(
            !self.terminated,
            Error::invalid_state("Descriptor chain already ended with a reference")
        );
        let first = self.written == 0;
        self.builder.guarded(|b| {
            write(b)?;
            if first {
                b.set_object_class(handle)?;
            }
            Ok(())
        })?;
        self.written += 1;
        Ok(())
    }
}
