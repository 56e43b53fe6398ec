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

use super::writer::ObjectOutput;
use crate::builder::ClassDescSpec;
use crate::error::Error;
use crate::types::TypeCode;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type ObjectRef = Rc<JavaObject>;

/// A field value, array element or top-level object.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Boolean(bool),
    Byte(i8),
    /// A Java `char` as its UTF-16 code unit.
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Object(ObjectRef),
}

impl Value {
    /// Type code of a primitive value, `None` for `Null` and objects.
    pub fn primitive_code(&self) -> Option<TypeCode> {
        let code = match self {
            Value::Boolean(_) => TypeCode::Boolean,
            Value::Byte(_) => TypeCode::Byte,
            Value::Char(_) => TypeCode::Char,
            Value::Short(_) => TypeCode::Short,
            Value::Int(_) => TypeCode::Int,
            Value::Long(_) => TypeCode::Long,
            Value::Float(_) => TypeCode::Float,
            Value::Double(_) => TypeCode::Double,
            Value::Null | Value::Object(_) => return None,
        };
        Some(code)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<&ObjectRef> for Value {
    fn from(obj: &ObjectRef) -> Self {
        Value::Object(obj.clone())
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive!(
    bool => Boolean,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double
);

/// Class descriptor of an object, linked to its superclass descriptor.
///
/// Descriptors are objects of the stream too: a descriptor shared by several
/// objects is written in full once and referred back to afterwards.
#[derive(Debug)]
pub struct ClassDesc {
    pub kind: DescKind,
    pub super_desc: Option<Rc<ClassDesc>>,
}

#[derive(Debug)]
pub enum DescKind {
    Class(ClassDescSpec),
    /// A dynamic proxy class implementing the listed interfaces.
    Proxy(Vec<String>),
}

impl ClassDesc {
    pub fn class(spec: ClassDescSpec) -> Rc<ClassDesc> {
        Rc::new(ClassDesc {
            kind: DescKind::Class(spec),
            super_desc: None,
        })
    }

    pub fn class_extends(spec: ClassDescSpec, super_desc: &Rc<ClassDesc>) -> Rc<ClassDesc> {
        Rc::new(ClassDesc {
            kind: DescKind::Class(spec),
            super_desc: Some(super_desc.clone()),
        })
    }

    /// A proxy descriptor; `super_desc` is the descriptor of `java.lang.reflect.Proxy`.
    pub fn proxy(interfaces: &[&str], super_desc: &Rc<ClassDesc>) -> Rc<ClassDesc> {
        Rc::new(ClassDesc {
            kind: DescKind::Proxy(interfaces.iter().map(|s| s.to_string()).collect()),
            super_desc: Some(super_desc.clone()),
        })
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            DescKind::Class(spec) => &spec.name,
            DescKind::Proxy(_) => "$Proxy",
        }
    }

    pub fn spec(&self) -> Option<&ClassDescSpec> {
        match &self.kind {
            DescKind::Class(spec) => Some(spec),
            DescKind::Proxy(_) => None,
        }
    }

    /// Plain class descriptors of the hierarchy, top-most superclass first.
    pub fn class_layout(&self) -> Vec<&ClassDescSpec> {
        let mut layout = Vec::new();
        let mut current = Some(self);
        while let Some(desc) = current {
            if let Some(spec) = desc.spec() {
                layout.push(spec);
            }
            current = desc.super_desc.as_deref();
        }
        layout.reverse();
        layout
    }
}

/// Elements of an array object.
#[derive(Clone, Debug)]
pub enum ArrayData {
    Byte(Vec<i8>),
    Char(Vec<u16>),
    Double(Vec<f64>),
    Float(Vec<f32>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Short(Vec<i16>),
    Boolean(Vec<bool>),
    Object(Vec<Value>),
}

impl ArrayData {
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Byte(v) => v.len(),
            ArrayData::Char(v) => v.len(),
            ArrayData::Double(v) => v.len(),
            ArrayData::Float(v) => v.len(),
            ArrayData::Int(v) => v.len(),
            ArrayData::Long(v) => v.len(),
            ArrayData::Short(v) => v.len(),
            ArrayData::Boolean(v) => v.len(),
            ArrayData::Object(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Custom `writeObject` routine of one class.
///
/// It runs after the enclosing object's handle is assigned, so writing the
/// enclosing object again from inside the hook produces a back-reference.
pub trait WriteObjectHook {
    fn write_object(&self, out: &mut ObjectOutput<'_, '_>) -> Result<(), Error>;
}

/// `writeExternal` routine of an externalizable class.
pub trait ExternalHook {
    fn write_external(&self, out: &mut ObjectOutput<'_, '_>) -> Result<(), Error>;
}

/// Serializable data of one class in an object's hierarchy.
#[derive(Clone)]
pub enum ClassData {
    /// Field values in declaration order, written in the default layout.
    Fields(Vec<Value>),
    /// Field values plus the class's `writeObject` hook. The class descriptor
    /// must carry `SC_WRITE_METHOD`.
    Custom {
        fields: Vec<Value>,
        hook: Rc<dyn WriteObjectHook>,
    },
}

impl ClassData {
    pub fn fields(&self) -> &[Value] {
        match self {
            ClassData::Fields(fields) | ClassData::Custom { fields, .. } => fields,
        }
    }

    fn fields_mut(&mut self) -> &mut Vec<Value> {
        match self {
            ClassData::Fields(fields) | ClassData::Custom { fields, .. } => fields,
        }
    }
}

impl fmt::Debug for ClassData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassData::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
            ClassData::Custom { fields, .. } => {
                f.debug_struct("Custom").field("fields", fields).finish()
            }
        }
    }
}

/// An object of the graph.
///
/// Array elements and class data sit in `RefCell`s so that cycles can be
/// closed after the objects taking part in them exist. The writer copies them
/// when it reaches the object, so a hook may mutate an object whose write is
/// still in progress; the stream keeps the values the copy saw.
pub enum JavaObject {
    String(String),
    Class(Rc<ClassDesc>),
    Enum {
        desc: Rc<ClassDesc>,
        constant: String,
    },
    Array {
        desc: Rc<ClassDesc>,
        elements: RefCell<ArrayData>,
    },
    Serial {
        desc: Rc<ClassDesc>,
        /// One entry per plain class descriptor, top-most superclass first.
        data: RefCell<Vec<ClassData>>,
    },
    External {
        desc: Rc<ClassDesc>,
        hook: Rc<dyn ExternalHook>,
    },
}

impl JavaObject {
    pub fn string(text: impl Into<String>) -> ObjectRef {
        Rc::new(JavaObject::String(text.into()))
    }

    pub fn class(desc: &Rc<ClassDesc>) -> ObjectRef {
        Rc::new(JavaObject::Class(desc.clone()))
    }

    pub fn enum_constant(desc: &Rc<ClassDesc>, constant: impl Into<String>) -> ObjectRef {
        Rc::new(JavaObject::Enum {
            desc: desc.clone(),
            constant: constant.into(),
        })
    }

    pub fn array(desc: &Rc<ClassDesc>, elements: ArrayData) -> ObjectRef {
        Rc::new(JavaObject::Array {
            desc: desc.clone(),
            elements: RefCell::new(elements),
        })
    }

    pub fn serial(desc: &Rc<ClassDesc>, data: Vec<ClassData>) -> ObjectRef {
        Rc::new(JavaObject::Serial {
            desc: desc.clone(),
            data: RefCell::new(data),
        })
    }

    pub fn external(desc: &Rc<ClassDesc>, hook: Rc<dyn ExternalHook>) -> ObjectRef {
        Rc::new(JavaObject::External {
            desc: desc.clone(),
            hook,
        })
    }

    pub fn desc(&self) -> Option<&Rc<ClassDesc>> {
        match self {
            JavaObject::String(_) | JavaObject::Class(_) => None,
            JavaObject::Enum { desc, .. }
            | JavaObject::Array { desc, .. }
            | JavaObject::Serial { desc, .. }
            | JavaObject::External { desc, .. } => Some(desc),
        }
    }

    /// Replaces field `field` of class `class` (index into the class data).
    pub fn set_field(&self, class: usize, field: usize, value: Value) -> Result<(), Error> {
        let JavaObject::Serial { data, .. } = self else {
            return Err(Error::type_error("Only serializable objects have fields"));
        };
        let mut data = data
            .try_borrow_mut()
            .map_err(|_| Error::invalid_state("Class data is borrowed elsewhere"))?;
        let slot = data
            .get_mut(class)
            .and_then(|class_data| class_data.fields_mut().get_mut(field))
            .ok_or_else(|| Error::type_error(format!("No field {} in class {}", field, class)))?;
        *slot = value;
        Ok(())
    }

    /// Replaces element `index` of an object array.
    pub fn set_element(&self, index: usize, value: Value) -> Result<(), Error> {
        let JavaObject::Array { elements, .. } = self else {
            return Err(Error::type_error("Only arrays have elements"));
        };
        let mut elements = elements
            .try_borrow_mut()
            .map_err(|_| Error::invalid_state("Array elements are borrowed elsewhere"))?;
        let ArrayData::Object(values) = &mut *elements else {
            return Err(Error::type_error("Only object arrays hold references"));
        };
        let len = values.len();
        let slot = values
            .get_mut(index)
            .ok_or_else(|| {
                Error::type_error(format!("Index {} out of bounds for length {}", index, len))
            })?;
        *slot = value;
        Ok(())
    }
}

impl fmt::Debug for JavaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaObject::String(text) => f.debug_tuple("String").field(text).finish(),
            JavaObject::Class(desc) => f.debug_tuple("Class").field(&desc.name()).finish(),
            JavaObject::Enum { desc, constant } => f
                .debug_struct("Enum")
                .field("class", &desc.name())
                .field("constant", constant)
                .finish(),
            JavaObject::Array { desc, .. } => {
                f.debug_struct("Array").field("class", &desc.name()).finish()
            }
            JavaObject::Serial { desc, .. } => {
                f.debug_struct("Serial").field("class", &desc.name()).finish()
            }
            JavaObject::External { desc, .. } => {
                f.debug_struct("External").field("class", &desc.name()).finish()
            }
        }
    }
}
