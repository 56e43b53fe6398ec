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

//! Handle assignment as observed through the builder.

use dserial::{ClassDescSpec, Error, Handle, StreamBuilder, SC_SERIALIZABLE};

fn write_simple(b: &mut StreamBuilder, handle: &Handle) -> Result<(), Error> {
    b.serial_obj(handle, |b| {
        b.descriptors(|d| {
            d.desc(
                &ClassDescSpec::new("SimpleSerializableClass")
                    .uid(1)
                    .flags(SC_SERIALIZABLE)
                    .field("i", "int"),
            )
        })?;
        b.slot(|b| {
            b.prims(|p| {
                p.int(1);
            })
        })
    })
}

#[test]
fn test_new_handle_is_unassigned() {
    let handle = Handle::new();
    assert!(!handle.is_assigned());
    assert!(!Handle::default().is_assigned());
    assert_eq!(handle.to_string(), "Handle{objectIndex=?}");
}

#[test]
fn test_handle_assigned_when_written() {
    let handle = Handle::new();
    let alias = handle.clone();
    let mut builder = StreamBuilder::new();
    write_simple(&mut builder, &handle).unwrap();
    assert!(handle.is_assigned());
    assert!(alias.is_assigned());
    // the class descriptor took index 0
    assert_eq!(format!("{:?}", handle), "Handle{objectIndex=1}");
}

#[test]
fn test_handle_unassigned_while_descriptors_are_written() {
    let handle = Handle::new();
    let mut builder = StreamBuilder::new();
    builder
        .serial_obj(&handle, |b| {
            assert!(!handle.is_assigned());
            b.descriptors(|d| {
                d.desc(&ClassDescSpec::new("Empty").uid(1).flags(SC_SERIALIZABLE))?;
                assert!(!handle.is_assigned());
                Ok(())
            })?;
            assert!(handle.is_assigned());
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_indices_follow_first_sight_order() {
    let first = Handle::new();
    let second = Handle::new();
    let mut builder = StreamBuilder::new();
    builder.string("a", &first).unwrap();
    builder.string("b", &second).unwrap();
    builder.reference(&first).unwrap();
    builder.reference(&second).unwrap();
    assert_eq!(builder.assigned_handles(), 2);
    assert_eq!(first.to_string(), "Handle{objectIndex=0}");
    let bytes = builder.finish().unwrap();
    assert_eq!(
        &bytes[bytes.len() - 10..],
        &[0x71, 0x00, 0x7E, 0x00, 0x00, 0x71, 0x00, 0x7E, 0x00, 0x01]
    );
}

#[test]
fn test_forward_reference_fails() {
    let later = Handle::new();
    let mut builder = StreamBuilder::new();
    let err = builder.reference(&later).unwrap_err();
    assert!(matches!(err, Error::NotAssignedYet));
    assert_eq!(err.to_string(), "Object index has not been assigned yet");
    assert!(!later.is_assigned());
}

#[test]
fn test_one_handle_for_two_objects_fails() {
    let handle = Handle::new();
    let mut builder = StreamBuilder::new();
    builder.string("first", &handle).unwrap();
    let err = builder.string("second", &handle).unwrap_err();
    assert!(err.is_handle_violation());
    assert_eq!(
        err.to_string(),
        "Object index has already been assigned: Handle{objectIndex=0}"
    );
}

#[test]
fn test_handles_belong_to_one_stream() {
    let handle = Handle::new();
    let mut first = StreamBuilder::new();
    first.string("x", &handle).unwrap();
    first.finish().unwrap();

    // a handle keeps its index; a second stream cannot assign it again
    let mut second = StreamBuilder::new();
    assert!(matches!(
        second.string("x", &handle),
        Err(Error::AlreadyAssigned(_))
    ));
}
