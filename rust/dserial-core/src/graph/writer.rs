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

use super::model::{ArrayData, ClassData, ClassDesc, DescKind, JavaObject, ObjectRef, Value};
use crate::builder::{
    ArrayElements, ClassDescSpec, DataOutput, DescriptorsBuilder, FrameKind, PrimitiveElement,
    PrimitiveFields, StreamBuilder,
};
use crate::config::Config;
use crate::ensure;
use crate::error::Error;
use crate::handle::Handle;
use crate::resolver::handle_table::HandleTable;
use crate::types::flags::{SC_EXTERNALIZABLE, SC_SERIALIZABLE, SC_WRITE_METHOD};
use crate::types::TypeCode;
use crate::util::field_signature;
use std::any::Any;
use std::rc::Rc;
use tracing::debug;

/// Serializes object graphs into one stream.
///
/// Objects are identified by allocation. The handle state lives as long as the
/// writer, so an object written by one [`write`](Self::write) call is referred
/// back to by later calls, as `ObjectOutputStream` does.
pub struct GraphWriter {
    builder: StreamBuilder,
    state: GraphState,
}

impl Default for GraphWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphWriter {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        GraphWriter {
            builder: StreamBuilder::with_config(config),
            state: GraphState::default(),
        }
    }

    /// Writes `value` and everything reachable from it.
    pub fn write(&mut self, value: &Value) -> Result<(), Error> {
        let state = &mut self.state;
        self.builder.guarded(|b| write_value(b, state, value))?;
        debug!(
            objects = self.state.table.len(),
            handles = self.builder.assigned_handles(),
            "wrote object graph"
        );
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>, Error> {
        self.builder.finish()
    }
}

/// Identities seen by one writer. Written objects are pinned so a temporary
/// created inside a hook cannot reuse the address of one already in the table.
#[derive(Default)]
struct GraphState {
    table: HandleTable,
    pinned: Vec<Rc<dyn Any>>,
}

impl GraphState {
    fn resolve<T: Any>(&mut self, rc: &Rc<T>) -> (Handle, bool) {
        let (handle, first_sight) = self.table.resolve(rc);
        if first_sight {
            self.pinned.push(rc.clone());
        }
        (handle, first_sight)
    }
}

/// Output of a [`WriteObjectHook`](super::WriteObjectHook) or
/// [`ExternalHook`](super::ExternalHook).
pub struct ObjectOutput<'a, 'b> {
    out: &'a mut DataOutput<'b>,
    state: &'a mut GraphState,
    class: Option<(&'a ClassDescSpec, &'a [Value])>,
    default_written: bool,
}

impl<'a, 'b> ObjectOutput<'a, 'b> {
    fn new(
        out: &'a mut DataOutput<'b>,
        state: &'a mut GraphState,
        class: Option<(&'a ClassDescSpec, &'a [Value])>,
    ) -> Self {
        ObjectOutput {
            out,
            state,
            class,
            default_written: false,
        }
    }

    /// Writes the fields of the class being serialized in the default layout.
    /// Only available to `writeObject` hooks, at most once.
    pub fn default_write_object(&mut self) -> Result<(), Error> {
        let (spec, fields) = self.class.ok_or_else(|| {
            Error::invalid_state("defaultWriteObject is not available to writeExternal")
        })?;
        ensure!(
            !self.default_written,
            Error::invalid_state("defaultWriteObject called twice")
        );
        self.default_written = true;
        let state = &mut *self.state;
        self.out
            .default_write_object(|b| write_fields(b, state, spec, fields))
    }

    /// Writes an object, or a back-reference if it was written before.
    pub fn write_object(&mut self, value: &Value) -> Result<(), Error> {
        write_value(self.out.builder(), self.state, value)
    }

    pub fn write_u8(&mut self, value: u8) {
        self.out.write_u8(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.out.write_bool(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.out.write_i16(value);
    }

    pub fn write_char(&mut self, value: u16) {
        self.out.write_char(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.out.write_i32(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.out.write_i64(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.out.write_f32(value);
    }

    pub fn write_f64(&mut self, value: f64) {
        self.out.write_f64(value);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.out.write_bytes(bytes);
    }

    pub fn write_utf(&mut self, s: &str) -> Result<(), Error> {
        self.out.write_utf(s)
    }
}

fn write_value(
    b: &mut StreamBuilder,
    state: &mut GraphState,
    value: &Value,
) -> Result<(), Error> {
    match value {
        Value::Null => b.null(),
        Value::Object(obj) => write_object(b, state, obj),
        primitive => Err(Error::type_error(format!(
            "Primitive {:?} cannot be written as an object",
            primitive
        ))),
    }
}

fn write_object(
    b: &mut StreamBuilder,
    state: &mut GraphState,
    obj: &ObjectRef,
) -> Result<(), Error> {
    let (handle, first_sight) = state.resolve(obj);
    if !first_sight {
        return b.reference(&handle);
    }
    match &**obj {
        JavaObject::String(text) => b.string(text, &handle),
        JavaObject::Class(desc) => b.class_obj(&handle, |d| write_descs(d, state, desc)),
        JavaObject::Enum { desc, constant } => {
            b.enum_constant(constant, &handle, |d| write_descs(d, state, desc))
        }
        JavaObject::Array { desc, elements } => {
            // copied out so hooks further down may mutate the array
            let elements = elements
                .try_borrow()
                .map_err(|_| Error::invalid_state("Array elements are being mutated"))?
                .clone();
            check_array_desc(desc, &elements)?;
            b.guarded(|b| {
                b.begin_object(FrameKind::Array, &handle)?;
                b.descriptors(|d| write_descs(d, state, desc))?;
                let component = b.array_component()?;
                let mut writer = ArrayElements::new(b, component);
                write_elements(&mut writer, state, &elements)?;
                writer.finish()?;
                b.end_object()
            })
        }
        JavaObject::Serial { desc, data } => {
            let data = data
                .try_borrow()
                .map_err(|_| Error::invalid_state("Class data is being mutated"))?
                .clone();
            let layout = desc.class_layout();
            ensure!(
                layout.len() == data.len(),
                Error::type_error(format!(
                    "{} has {} serializable classes but {} were given data",
                    desc.name(),
                    layout.len(),
                    data.len()
                ))
            );
            b.serial_obj(&handle, |b| {
                b.descriptors(|d| write_descs(d, state, desc))?;
                for (spec, class_data) in layout.into_iter().zip(data.iter()) {
                    write_class_data(b, state, spec, class_data)?;
                }
                Ok(())
            })
        }
        JavaObject::External { desc, hook } => {
            if let Some(spec) = desc.spec() {
                ensure!(
                    spec.has_flags(SC_EXTERNALIZABLE),
                    Error::type_error(format!("{} is not externalizable", spec.name))
                );
            }
            b.external_obj(&handle, |b| {
                b.descriptors(|d| write_descs(d, state, desc))?;
                b.write_external(|out| {
                    hook.write_external(&mut ObjectOutput::new(out, state, None))
                })
            })
        }
    }
}

/// Writes the descriptor chain of `desc`, ending at the first descriptor that
/// is already in the stream.
fn write_descs(
    d: &mut DescriptorsBuilder<'_>,
    state: &mut GraphState,
    desc: &Rc<ClassDesc>,
) -> Result<(), Error> {
    let mut current = Some(desc);
    while let Some(desc) = current {
        let (handle, first_sight) = state.resolve(desc);
        if !first_sight {
            return d.reference(&handle);
        }
        match &desc.kind {
            DescKind::Class(spec) => d.desc_with(&handle, spec)?,
            DescKind::Proxy(interfaces) => d.proxy_with(&handle, interfaces)?,
        }
        current = desc.super_desc.as_ref();
    }
    Ok(())
}

fn write_class_data(
    b: &mut StreamBuilder,
    state: &mut GraphState,
    spec: &ClassDescSpec,
    class_data: &ClassData,
) -> Result<(), Error> {
    ensure!(
        spec.has_flags(SC_SERIALIZABLE),
        Error::type_error(format!("{} is not serializable", spec.name))
    );
    match class_data {
        ClassData::Fields(fields) => b.slot(|b| write_fields(b, state, spec, fields)),
        ClassData::Custom { fields, hook } => {
            ensure!(
                spec.has_flags(SC_WRITE_METHOD),
                Error::type_error(format!("{} has no writeObject method", spec.name))
            );
            b.slot(|b| {
                b.write_object(|out| {
                    let class = Some((spec, fields.as_slice()));
                    hook.write_object(&mut ObjectOutput::new(out, state, class))
                })
            })
        }
    }
}

/// Writes primitive fields, then object fields, each in declaration order.
fn write_fields(
    b: &mut StreamBuilder,
    state: &mut GraphState,
    spec: &ClassDescSpec,
    values: &[Value],
) -> Result<(), Error> {
    ensure!(
        values.len() == spec.fields.len(),
        Error::type_error(format!(
            "{} declares {} fields but {} values were given",
            spec.name,
            spec.fields.len(),
            values.len()
        ))
    );
    let mut has_objects = false;
    for (field, value) in spec.fields.iter().zip(values) {
        let code = field.type_code()?;
        let fits = if code.is_primitive() {
            value.primitive_code() == Some(code)
        } else {
            has_objects = true;
            value.primitive_code().is_none()
        };
        ensure!(
            fits,
            Error::type_error(format!(
                "Value {:?} does not fit field {}.{} of type {}",
                value, spec.name, field.name, field.type_name
            ))
        );
    }
    b.prims(|p| {
        for value in values {
            write_primitive(p, value);
        }
    })?;
    if has_objects {
        b.objs(|b| {
            for value in values.iter().filter(|v| v.primitive_code().is_none()) {
                write_value(b, state, value)?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn write_primitive(p: &mut PrimitiveFields, value: &Value) {
    match *value {
        Value::Boolean(v) => p.boolean(v),
        Value::Byte(v) => p.byte(v),
        Value::Char(v) => p.char(v),
        Value::Short(v) => p.short(v),
        Value::Int(v) => p.int(v),
        Value::Long(v) => p.long(v),
        Value::Float(v) => p.float(v),
        Value::Double(v) => p.double(v),
        Value::Null | Value::Object(_) => return,
    };
}

fn write_elements(
    a: &mut ArrayElements<'_>,
    state: &mut GraphState,
    elements: &ArrayData,
) -> Result<(), Error> {
    match elements {
        ArrayData::Byte(v) => a.primitives(v),
        ArrayData::Char(v) => a.primitives(v),
        ArrayData::Double(v) => a.primitives(v),
        ArrayData::Float(v) => a.primitives(v),
        ArrayData::Int(v) => a.primitives(v),
        ArrayData::Long(v) => a.primitives(v),
        ArrayData::Short(v) => a.primitives(v),
        ArrayData::Boolean(v) => a.primitives(v),
        ArrayData::Object(values) => a.elements(|b| {
            for value in values {
                write_value(b, state, value)?;
            }
            Ok(())
        }),
    }
}

/// Checks that the array class of `desc` has the component type of `elements`.
fn check_array_desc(desc: &ClassDesc, elements: &ArrayData) -> Result<(), Error> {
    let spec = desc
        .spec()
        .ok_or_else(|| Error::type_error("Array class cannot be a proxy class"))?;
    let signature = field_signature(&spec.name)?;
    let component = signature.as_bytes().get(1).copied();
    let expected = match elements {
        ArrayData::Byte(_) => component_code::<i8>(),
        ArrayData::Char(_) => component_code::<u16>(),
        ArrayData::Double(_) => component_code::<f64>(),
        ArrayData::Float(_) => component_code::<f32>(),
        ArrayData::Int(_) => component_code::<i32>(),
        ArrayData::Long(_) => component_code::<i64>(),
        ArrayData::Short(_) => component_code::<i16>(),
        ArrayData::Boolean(_) => component_code::<bool>(),
        ArrayData::Object(_) => {
            ensure!(
                matches!(component, Some(b'L') | Some(b'[')),
                Error::type_error(format!("{} is not an object array class", spec.name))
            );
            return Ok(());
        }
    };
    ensure!(
        component == Some(expected.into()),
        Error::type_error(format!(
            "{} does not hold {:?} elements",
            spec.name, expected
        ))
    );
    Ok(())
}

fn component_code<T: PrimitiveElement>() -> TypeCode {
    T::TYPE_CODE
}
