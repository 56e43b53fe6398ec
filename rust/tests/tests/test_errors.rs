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

use dserial::{ClassDescSpec, Error, Handle, StreamBuilder, SC_SERIALIZABLE};

fn spec() -> ClassDescSpec {
    ClassDescSpec::new("SimpleSerializableClass")
        .uid(1)
        .flags(SC_SERIALIZABLE)
        .field("i", "int")
}

#[test]
fn test_violation_poisons_builder() {
    let mut builder = StreamBuilder::new();
    assert!(builder.reference(&Handle::new()).is_err());
    assert!(builder.is_poisoned());

    let err = builder.null().unwrap_err();
    assert!(matches!(err, Error::Poisoned(_)));
    assert_eq!(
        err.to_string(),
        "Stream is unusable after an earlier failure: Object index has not been assigned yet"
    );
    assert!(matches!(builder.finish(), Err(Error::Poisoned(_))));
}

#[test]
fn test_swallowed_error_still_poisons() {
    let handle = Handle::new();
    let mut builder = StreamBuilder::new();
    let result = builder.serial_obj(&Handle::new(), |b| {
        b.descriptors(|d| d.desc(&spec()))?;
        b.slot(|b| {
            b.objs(|b| {
                // the failure is ignored by the caller
                let _ = b.reference(&handle);
                Ok(())
            })
        })
    });
    assert!(result.is_err());
    assert!(builder.is_poisoned());
    assert!(builder.finish().is_err());
}

#[test]
fn test_slot_before_descriptors() {
    let mut builder = StreamBuilder::new();
    let err = builder
        .serial_obj(&Handle::new(), |b| b.slot(|_| Ok(())))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[test]
fn test_descriptors_written_twice() {
    let mut builder = StreamBuilder::new();
    let err = builder
        .serial_obj(&Handle::new(), |b| {
            b.descriptors(|d| d.desc(&spec()))?;
            b.descriptors(|d| d.desc(&spec()))
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[test]
fn test_object_without_descriptors() {
    let mut builder = StreamBuilder::new();
    let err = builder
        .serial_obj(&Handle::new(), |_| Ok(()))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[test]
fn test_write_external_in_serializable_object() {
    let mut builder = StreamBuilder::new();
    let err = builder
        .serial_obj(&Handle::new(), |b| {
            b.descriptors(|d| d.desc(&spec()))?;
            b.write_external(|_| Ok(()))
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[test]
fn test_array_elements_written_twice() {
    let array = ClassDescSpec::new("int[]").uid(1).flags(SC_SERIALIZABLE);
    let mut builder = StreamBuilder::new();
    let err = builder
        .array(&Handle::new(), &array, |a| {
            a.primitives(&[1i32])?;
            a.primitives(&[2i32])
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[test]
fn test_invalid_field_type() {
    let bad = ClassDescSpec::new("Bad")
        .uid(1)
        .flags(SC_SERIALIZABLE)
        .field("x", "java/lang/String");
    let mut builder = StreamBuilder::new();
    let err = builder
        .class_obj(&Handle::new(), |d| d.desc(&bad))
        .unwrap_err();
    assert!(matches!(err, Error::TypeError(_)));
}

#[test]
fn test_open_block_data_cannot_nest() {
    let mut builder = StreamBuilder::new();
    let err = builder
        .serial_obj(&Handle::new(), |b| {
            b.descriptors(|d| d.desc(&spec()))?;
            b.slot(|b| {
                b.write_object(|out| out.builder().prims(|p| {
                    p.int(1);
                }))
            })
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[test]
fn test_primitives_in_object_array() {
    let strings = ClassDescSpec::new("java.lang.String[]")
        .uid(1)
        .flags(SC_SERIALIZABLE);
    let mut builder = StreamBuilder::new();
    let err = builder
        .array(&Handle::new(), &strings, |a| a.primitives(&[1i32, 2, 3]))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
    assert!(builder.is_poisoned());
    assert!(builder.finish().is_err());
}

#[test]
fn test_swallowed_component_mismatch_still_poisons() {
    let strings = ClassDescSpec::new("java.lang.String[]")
        .uid(1)
        .flags(SC_SERIALIZABLE);
    let mut builder = StreamBuilder::new();
    let result = builder.array(&Handle::new(), &strings, |a| {
        assert!(a.primitives(&[1i32]).is_err());
        Ok(())
    });
    assert!(result.is_err());
    assert!(builder.is_poisoned());
}

#[test]
fn test_objects_in_primitive_array() {
    let ints = ClassDescSpec::new("int[]").uid(1).flags(SC_SERIALIZABLE);
    let mut builder = StreamBuilder::new();
    let err = builder
        .array(&Handle::new(), &ints, |a| {
            a.elements(|b| b.string("x", &Handle::new()))
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[test]
fn test_wrong_primitive_width() {
    let ints = ClassDescSpec::new("int[]").uid(1).flags(SC_SERIALIZABLE);
    let desc = Handle::new();
    let mut builder = StreamBuilder::new();
    builder
        .array_with(&Handle::new(), |d| d.desc_with(&desc, &ints), |a| {
            a.primitives(&[1i32])
        })
        .unwrap();
    // the component type is known through a back-reference too
    let err = builder
        .array_with(&Handle::new(), |d| d.reference(&desc), |a| {
            a.primitives(&[1i64])
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[test]
fn test_array_of_non_array_class() {
    let mut builder = StreamBuilder::new();
    let err = builder
        .array(&Handle::new(), &spec(), |a| a.primitives(&[1i32]))
        .unwrap_err();
    assert!(matches!(err, Error::TypeError(_)));
}
