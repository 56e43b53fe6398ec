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

//! Stream construction.
//!
//! [`StreamBuilder`] writes one serialization stream. Its public methods form a
//! closure based DSL: every object is opened by a call taking the object's
//! [`Handle`] and a closure that writes the object's content, and the object is
//! closed when the closure returns. The builder assigns each handle the next
//! object index when the object is committed to the stream, so a handle can be
//! referenced with [`StreamBuilder::reference`] anywhere after that point,
//! including from inside the object itself.
//!
//! ```rust
//! use dserial_core::builder::{ClassDescSpec, StreamBuilder};
//! use dserial_core::handle::Handle;
//! use dserial_core::types::flags::SC_SERIALIZABLE;
//!
//! let node = Handle::new();
//! let mut builder = StreamBuilder::new();
//! builder
//!     .serial_obj(&node, |b| {
//!         b.descriptors(|d| {
//!             d.desc(
//!                 &ClassDescSpec::new("Node")
//!                     .uid(1)
//!                     .flags(SC_SERIALIZABLE)
//!                     .field("next", "Node"),
//!             )
//!         })?;
//!         b.slot(|b| b.objs(|b| b.reference(&node)))
//!     })
//!     .unwrap();
//! let bytes = builder.finish().unwrap();
//! assert_eq!(&bytes[..4], &[0xAC, 0xED, 0x00, 0x05]);
//! ```

mod array;
mod descriptor;
mod output;

pub use array::{ArrayElements, PrimitiveElement};
pub use descriptor::{ClassDescSpec, DescriptorsBuilder, FieldSpec};
pub use output::{DataOutput, PrimitiveFields};

use crate::buffer::{BlockDataWriter, Writer};
use crate::config::Config;
use crate::ensure;
use crate::error::Error;
use crate::handle::{Handle, HandleAccess};
use crate::resolver::string_table::StringTable;
use crate::types::{
    TypeCode, TypeTag, BASE_WIRE_HANDLE, STREAM_MAGIC, STREAM_VERSION, TC_CLASSDESC, TC_ENDBLOCKDATA,
    TC_LONGSTRING, TC_NULL, TC_PROXYCLASSDESC, TC_REFERENCE, TC_STRING,
};
use crate::util::{class_get_name, field_signature, field_type_code};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrameKind {
    Serial,
    External,
    Class,
    Enum,
    Array,
}

impl FrameKind {
    fn tag(self) -> TypeTag {
        match self {
            FrameKind::Serial | FrameKind::External => TypeTag::Object,
            FrameKind::Class => TypeTag::Class,
            FrameKind::Enum => TypeTag::Enum,
            FrameKind::Array => TypeTag::Array,
        }
    }
}

struct ObjectFrame {
    kind: FrameKind,
    handle: Handle,
    restore_block_mode: bool,
    committed: bool,
    /// `Class.getName` of the object's class, unless it is a proxy class.
    class_name: Option<Rc<str>>,
}

struct ElementScope {
    depth: usize,
    count: i32,
    offset: usize,
}

/// Writer of one serialization stream.
///
/// The first failing call poisons the builder: every later call returns
/// [`Error::Poisoned`] and no bytes can be obtained from it.
pub struct StreamBuilder {
    out: BlockDataWriter,
    access: HandleAccess,
    config: Config,
    next_handle_index: u32,
    type_strings: StringTable,
    class_names: HashMap<u32, Rc<str>>,
    frames: Vec<ObjectFrame>,
    element_scopes: Vec<ElementScope>,
    poisoned: Option<String>,
}

impl Default for StreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Starts a stream by writing the stream header.
    pub fn with_config(config: Config) -> Self {
        let mut header = Writer::with_capacity(64);
        header.write_u16(STREAM_MAGIC);
        header.write_u16(STREAM_VERSION);
        StreamBuilder {
            out: BlockDataWriter::new(header),
            access: HandleAccess::new(),
            config,
            next_handle_index: 0,
            type_strings: StringTable::default(),
            class_names: HashMap::new(),
            frames: Vec::new(),
            element_scopes: Vec::new(),
            poisoned: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of object indices assigned so far.
    pub fn assigned_handles(&self) -> u32 {
        self.next_handle_index
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    /// Writes a serializable object (`TC_OBJECT`).
    ///
    /// `build` must call [`descriptors`](Self::descriptors) first and then one
    /// [`slot`](Self::slot) per serializable class, top-most superclass first.
    pub fn serial_obj<F>(&mut self, handle: &Handle, build: F) -> Result<(), Error>
    where
        F: FnOnce(&mut StreamBuilder) -> Result<(), Error>,
    {
        self.guarded(|b| {
            b.begin_object(FrameKind::Serial, handle)?;
            build(b)?;
            b.end_object()
        })
    }

    /// Writes an externalizable object (`TC_OBJECT`).
    ///
    /// `build` must call [`descriptors`](Self::descriptors) and then
    /// [`write_external`](Self::write_external).
    pub fn external_obj<F>(&mut self, handle: &Handle, build: F) -> Result<(), Error>
    where
        F: FnOnce(&mut StreamBuilder) -> Result<(), Error>,
    {
        self.guarded(|b| {
            b.begin_object(FrameKind::External, handle)?;
            build(b)?;
            b.end_object()
        })
    }

    /// Writes the class descriptor chain of the object being written and
    /// assigns the object's handle.
    pub fn descriptors<F>(&mut self, build: F) -> Result<(), Error>
    where
        F: for<'a> FnOnce(&mut DescriptorsBuilder<'a>) -> Result<(), Error>,
    {
        self.guarded(|b| {
            let is_enum = {
                let frame = b.open_frame()?;
                ensure!(
                    !frame.committed,
                    Error::invalid_state("Descriptors of this object are already written")
                );
                frame.kind == FrameKind::Enum
            };
            let mut descriptors = DescriptorsBuilder::new(b, is_enum);
            build(&mut descriptors)?;
            descriptors.finish()?;
            b.commit_object()
        })
    }

    /// Writes the data of one serializable class of the current object.
    pub fn slot<F>(&mut self, build: F) -> Result<(), Error>
    where
        F: FnOnce(&mut StreamBuilder) -> Result<(), Error>,
    {
        self.guarded(|b| {
            b.expect_body(FrameKind::Serial, "slot")?;
            build(b)
        })
    }

    /// Writes primitive field values in declaration order.
    pub fn prims<F>(&mut self, build: F) -> Result<(), Error>
    where
        F: FnOnce(&mut PrimitiveFields),
    {
        self.guarded(|b| {
            b.expect_body(FrameKind::Serial, "prims")?;
            ensure!(
                !b.out.is_block_data_mode(),
                Error::invalid_state("Primitive fields cannot be written as block data")
            );
            let mut fields = PrimitiveFields::default();
            build(&mut fields);
            b.out.current().write_bytes(fields.as_bytes());
            Ok(())
        })
    }

    /// Writes object field values in declaration order.
    pub fn objs<F>(&mut self, build: F) -> Result<(), Error>
    where
        F: FnOnce(&mut StreamBuilder) -> Result<(), Error>,
    {
        self.guarded(|b| {
            b.expect_body(FrameKind::Serial, "objs")?;
            build(b)
        })
    }

    /// Writes the output of a class's `writeObject` method: block data
    /// followed by `TC_ENDBLOCKDATA`.
    pub fn write_object<F>(&mut self, build: F) -> Result<(), Error>
    where
        F: for<'a> FnOnce(&mut DataOutput<'a>) -> Result<(), Error>,
    {
        self.guarded(|b| {
            b.expect_body(FrameKind::Serial, "write_object")?;
            b.block_data(build)
        })
    }

    /// Writes the output of `writeExternal`: block data followed by
    /// `TC_ENDBLOCKDATA`.
    pub fn write_external<F>(&mut self, build: F) -> Result<(), Error>
    where
        F: for<'a> FnOnce(&mut DataOutput<'a>) -> Result<(), Error>,
    {
        self.guarded(|b| {
            b.expect_body(FrameKind::External, "write_external")?;
            b.block_data(build)
        })
    }

    /// Writes a class object (`TC_CLASS`) described by the descriptors `build` writes.
    pub fn class_obj<F>(&mut self, handle: &Handle, build: F) -> Result<(), Error>
    where
        F: for<'a> FnOnce(&mut DescriptorsBuilder<'a>) -> Result<(), Error>,
    {
        self.guarded(|b| {
            b.begin_object(FrameKind::Class, handle)?;
            b.descriptors(build)?;
            b.end_object()
        })
    }

    /// Writes an enum constant (`TC_ENUM`).
    ///
    /// `build` writes the descriptors of the enum class and of `java.lang.Enum`;
    /// their uids are always written as `0`.
    pub fn enum_constant<F>(&mut self, name: &str, handle: &Handle, build: F) -> Result<(), Error>
    where
        F: for<'a> FnOnce(&mut DescriptorsBuilder<'a>) -> Result<(), Error>,
    {
        self.guarded(|b| {
            b.begin_object(FrameKind::Enum, handle)?;
            b.descriptors(build)?;
            b.write_string_record(name, &Handle::new())?;
            b.end_object()
        })
    }

    /// Writes a string object (`TC_STRING`, or `TC_LONGSTRING` above 65535 bytes).
    pub fn string(&mut self, text: &str, handle: &Handle) -> Result<(), Error> {
        self.guarded(|b| {
            b.on_started_object();
            b.with_plain_mode(|b| b.write_string_record(text, handle))
        })
    }

    /// Writes `null`.
    pub fn null(&mut self) -> Result<(), Error> {
        self.guarded(|b| {
            b.on_started_object();
            b.with_plain_mode(|b| {
                b.out.current().write_u8(TC_NULL);
                Ok(())
            })
        })
    }

    /// Writes a back-reference to an object written earlier.
    pub fn reference(&mut self, handle: &Handle) -> Result<(), Error> {
        self.guarded(|b| {
            b.on_started_object();
            b.with_plain_mode(|b| b.write_handle_reference(handle))
        })
    }

    /// Writes an array (`TC_ARRAY`) of the array class `spec` describes.
    pub fn array<F>(&mut self, handle: &Handle, spec: &ClassDescSpec, build: F) -> Result<(), Error>
    where
        F: for<'a> FnOnce(&mut ArrayElements<'a>) -> Result<(), Error>,
    {
        self.array_with(handle, |d| d.desc(spec), build)
    }

    /// Writes an array whose descriptor is written by `descriptors`, which
    /// may refer back to a descriptor written earlier.
    pub fn array_with<D, F>(
        &mut self,
        handle: &Handle,
        descriptors: D,
        build: F,
    ) -> Result<(), Error>
    where
        D: for<'a> FnOnce(&mut DescriptorsBuilder<'a>) -> Result<(), Error>,
        F: for<'a> FnOnce(&mut ArrayElements<'a>) -> Result<(), Error>,
    {
        self.guarded(|b| {
            b.begin_object(FrameKind::Array, handle)?;
            b.descriptors(descriptors)?;
            let component = b.array_component()?;
            let mut elements = ArrayElements::new(b, component);
            build(&mut elements)?;
            elements.finish()?;
            b.end_object()
        })
    }

    /// Returns the finished stream.
    pub fn finish(self) -> Result<Vec<u8>, Error> {
        if let Some(first) = self.poisoned {
            return Err(Error::poisoned(first));
        }
        ensure!(
            self.frames.is_empty() && self.element_scopes.is_empty(),
            Error::invalid_state("Stream finished while objects are still open")
        );
        let handles = self.next_handle_index;
        let bytes = self.out.finish()?;
        debug!(len = bytes.len(), handles, "finished stream");
        Ok(bytes)
    }

    /// Runs `op`, recording its failure as the reason this builder is unusable.
    pub(crate) fn guarded<T, F>(&mut self, op: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Self) -> Result<T, Error>,
    {
        if let Some(first) = &self.poisoned {
            return Err(Error::poisoned(first.clone()));
        }
        let result = op(self);
        if let Err(err) = &result {
            if self.poisoned.is_none() {
                self.poisoned = Some(err.to_string());
            }
        } else if let Some(first) = &self.poisoned {
            // a nested failure was dropped by the caller
            return Err(Error::poisoned(first.clone()));
        }
        result
    }

    #[inline(always)]
    pub(crate) fn writer(&mut self) -> &mut Writer {
        self.out.current()
    }

    pub(crate) fn begin_object(&mut self, kind: FrameKind, handle: &Handle) -> Result<(), Error> {
        let max_depth = self.config.get_max_depth();
        ensure!(
            (self.frames.len() as u32) < max_depth,
            Error::depth_exceed(format!(
                "Object nesting exceeds the maximum depth of {}",
                max_depth
            ))
        );
        self.on_started_object();
        let restore_block_mode = self.out.set_block_data_mode(false)?;
        self.out.current().write_u8(kind.tag().into());
        self.frames.push(ObjectFrame {
            kind,
            handle: handle.clone(),
            restore_block_mode,
            committed: false,
            class_name: None,
        });
        Ok(())
    }

    /// Assigns the handle of the innermost open object.
    pub(crate) fn commit_object(&mut self) -> Result<(), Error> {
        let handle = {
            let frame = self.open_frame()?;
            ensure!(
                !frame.committed,
                Error::invalid_state("Object is already committed")
            );
            frame.committed = true;
            frame.handle.clone()
        };
        self.assign_next(&handle)?;
        Ok(())
    }

    pub(crate) fn end_object(&mut self) -> Result<(), Error> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| Error::invalid_state("No object is open"))?;
        ensure!(
            frame.committed,
            Error::invalid_state("Object closed before its descriptors were written")
        );
        if frame.restore_block_mode {
            self.out.set_block_data_mode(true)?;
        }
        Ok(())
    }

    pub(crate) fn write_class_desc(
        &mut self,
        handle: &Handle,
        spec: &ClassDescSpec,
        is_enum: bool,
    ) -> Result<(), Error> {
        let name = class_get_name(&spec.name)?;
        let uid = if is_enum {
            0
        } else {
            spec.uid.ok_or_else(|| {
                Error::type_error(format!("No serialVersionUID given for {}", spec.name))
            })?
        };
        ensure!(
            spec.fields.len() <= i16::MAX as usize,
            Error::type_error(format!("Too many fields in {}", spec.name))
        );
        let mut fields = Vec::with_capacity(spec.fields.len());
        for field in &spec.fields {
            ensure!(
                !field.name.is_empty(),
                Error::type_error(format!("Unnamed field in {}", spec.name))
            );
            let code = field_type_code(&field.type_name)?;
            let signature = field_signature(&field.type_name)?;
            fields.push((code, field.name.as_str(), signature));
        }
        self.with_plain_mode(|b| {
            b.out.current().write_u8(TC_CLASSDESC);
            b.out.current().write_utf(&name)?;
            b.out.current().write_i64(uid);
            let index = b.assign_next(handle)?;
            b.class_names.insert(index, Rc::from(name.as_str()));
            let w = b.out.current();
            w.write_u8(spec.flags);
            w.write_i16(fields.len() as i16);
            for (code, field_name, signature) in &fields {
                b.out.current().write_u8((*code).into());
                b.out.current().write_utf(field_name)?;
                if !code.is_primitive() {
                    b.write_type_string(signature)?;
                }
            }
            b.out.current().write_u8(TC_ENDBLOCKDATA);
            Ok(())
        })
    }

    /// Records the class of the innermost open object from the first
    /// descriptor of its chain.
    pub(crate) fn set_object_class(&mut self, desc: &Handle) -> Result<(), Error> {
        let index = self.access.object_index(desc)?;
        let class_name = self.class_names.get(&index).cloned();
        self.open_frame()?.class_name = class_name;
        Ok(())
    }

    /// Component type code of the innermost open object, which must be an
    /// array.
    pub(crate) fn array_component(&mut self) -> Result<TypeCode, Error> {
        let frame = self.open_frame()?;
        let name = frame
            .class_name
            .as_deref()
            .ok_or_else(|| Error::type_error("Array class must be a plain class descriptor"))?;
        name.strip_prefix('[')
            .and_then(|component| component.bytes().next())
            .and_then(|code| TypeCode::try_from(code).ok())
            .ok_or_else(|| Error::type_error(format!("{} is not an array class", name)))
    }

    pub(crate) fn write_proxy_desc<S: AsRef<str>>(
        &mut self,
        handle: &Handle,
        interfaces: &[S],
    ) -> Result<(), Error> {
        let names = interfaces
            .iter()
            .map(|name| class_get_name(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.with_plain_mode(|b| {
            b.out.current().write_u8(TC_PROXYCLASSDESC);
            b.assign_next(handle)?;
            b.out.current().write_i32(names.len() as i32);
            for name in &names {
                b.out.current().write_utf(name)?;
            }
            b.out.current().write_u8(TC_ENDBLOCKDATA);
            Ok(())
        })
    }

    pub(crate) fn write_handle_reference(&mut self, handle: &Handle) -> Result<(), Error> {
        let index = self.access.object_index(handle)?;
        trace!(index, "writing back-reference");
        let w = self.out.current();
        w.write_u8(TC_REFERENCE);
        w.write_i32(BASE_WIRE_HANDLE + index as i32);
        Ok(())
    }

    pub(crate) fn write_string_record(&mut self, text: &str, handle: &Handle) -> Result<(), Error> {
        let long = crate::util::modified_utf8_len(text) > u16::MAX as usize;
        let w = self.out.current();
        w.write_u8(if long { TC_LONGSTRING } else { TC_STRING });
        self.assign_next(handle)?;
        let w = self.out.current();
        if long {
            w.write_long_utf(text);
            Ok(())
        } else {
            w.write_utf(text)
        }
    }

    pub(crate) fn write_type_string(&mut self, signature: &str) -> Result<(), Error> {
        if !self.config.is_intern_type_strings() {
            return self.write_string_record(signature, &Handle::new());
        }
        let (handle, first_sight) = self.type_strings.resolve(signature);
        if first_sight {
            self.write_string_record(signature, &handle)
        } else {
            self.write_handle_reference(&handle)
        }
    }

    pub(crate) fn write_null_desc(&mut self) {
        self.out.current().write_u8(TC_NULL);
    }

    /// Enters block-data mode for a custom write routine and closes it with
    /// `TC_ENDBLOCKDATA` once `build` returns.
    pub(crate) fn block_data<F>(&mut self, build: F) -> Result<(), Error>
    where
        F: for<'a> FnOnce(&mut DataOutput<'a>) -> Result<(), Error>,
    {
        let depth = self.frames.len();
        self.out.set_block_data_mode(true)?;
        build(&mut DataOutput::new(self))?;
        ensure!(
            self.frames.len() == depth && self.out.is_block_data_mode(),
            Error::invalid_state("Custom write routine left the stream unbalanced")
        );
        self.out.set_block_data_mode(false)?;
        self.out.current().write_u8(TC_ENDBLOCKDATA);
        Ok(())
    }

    pub(crate) fn begin_elements(&mut self) -> Result<(), Error> {
        ensure!(
            !self.out.is_block_data_mode(),
            Error::invalid_state("Array elements cannot be written as block data")
        );
        let offset = self.out.stream_len();
        self.out.current().write_i32(0);
        self.element_scopes.push(ElementScope {
            depth: self.frames.len(),
            count: 0,
            offset,
        });
        Ok(())
    }

    pub(crate) fn end_elements(&mut self) -> Result<(), Error> {
        let scope = self
            .element_scopes
            .pop()
            .ok_or_else(|| Error::invalid_state("No array elements are open"))?;
        ensure!(
            scope.depth == self.frames.len(),
            Error::invalid_state("Array elements closed at the wrong depth")
        );
        self.out.patch_i32(scope.offset, scope.count)
    }

    pub(crate) fn assign_next(&mut self, handle: &Handle) -> Result<u32, Error> {
        let index = self.next_handle_index;
        self.access.assign_index(handle, index)?;
        self.next_handle_index += 1;
        trace!(index, "assigned object handle");
        Ok(index)
    }

    fn with_plain_mode<T, F>(&mut self, op: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Self) -> Result<T, Error>,
    {
        let restore = self.out.set_block_data_mode(false)?;
        let value = op(self)?;
        if restore {
            self.out.set_block_data_mode(true)?;
        }
        Ok(value)
    }

    fn on_started_object(&mut self) {
        let depth = self.frames.len();
        if let Some(scope) = self.element_scopes.last_mut() {
            if scope.depth == depth {
                scope.count += 1;
            }
        }
    }

    fn open_frame(&mut self) -> Result<&mut ObjectFrame, Error> {
        self.frames
            .last_mut()
            .ok_or_else(|| Error::invalid_state("No object is open"))
    }

    fn expect_body(&mut self, kind: FrameKind, operation: &str) -> Result<(), Error> {
        let frame = self.open_frame()?;
        ensure!(
            frame.kind == kind,
            Error::invalid_state(format!(
                "{} is not allowed in a {:?} object",
                operation, frame.kind
            ))
        );
        ensure!(
            frame.committed,
            Error::invalid_state(format!("{} called before descriptors", operation))
        );
        Ok(())
    }
}
