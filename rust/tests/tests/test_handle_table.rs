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

use dserial_core::resolver::handle_table::HandleTable;
use dserial_core::resolver::string_table::StringTable;
use std::rc::Rc;
use std::sync::Arc;

#[test]
fn test_rc_identity() {
    let mut table = HandleTable::new();

    let rc1 = Rc::new(42i32);
    let rc2 = rc1.clone();

    let (handle, first_sight) = table.resolve(&rc1);
    assert!(first_sight);
    let (same, first_sight) = table.resolve(&rc2);
    assert!(!first_sight);
    assert!(handle.ptr_eq(&same));
    assert!(!handle.is_assigned());
}

#[test]
fn test_arc_identity() {
    let mut table = HandleTable::new();

    let arc1 = Arc::new(String::from("shared"));
    let arc2 = arc1.clone();

    assert!(table.resolve_arc(&arc1).1);
    assert!(!table.resolve_arc(&arc2).1);
    assert_eq!(table.len(), 1);
}

#[test]
fn test_equal_values_are_distinct() {
    let mut table = HandleTable::new();

    let a = Rc::new(String::from("same"));
    let b = Rc::new(String::from("same"));

    let (ha, _) = table.resolve(&a);
    let (hb, first_sight) = table.resolve(&b);
    assert!(first_sight);
    assert!(!ha.ptr_eq(&hb));
    assert_eq!(table.len(), 2);
}

#[test]
fn test_table_does_not_own_objects() {
    let mut table = HandleTable::new();
    let rc = Rc::new(vec![1u8, 2, 3]);
    table.resolve(&rc);
    assert_eq!(Rc::strong_count(&rc), 1);
}

#[test]
fn test_reset_discards_identities() {
    let mut table = HandleTable::new();
    let rc = Rc::new(1u64);
    let (before, _) = table.resolve(&rc);
    table.reset();
    assert!(table.is_empty());
    let (after, first_sight) = table.resolve(&rc);
    assert!(first_sight);
    assert!(!before.ptr_eq(&after));
}

#[test]
fn test_unsized_values() {
    let mut table = HandleTable::new();
    let s: Rc<str> = Rc::from("text");
    let alias = s.clone();
    assert!(table.resolve(&s).1);
    assert!(!table.resolve(&alias).1);
}

#[test]
fn test_string_table_by_value() {
    let mut strings = StringTable::default();
    let (a, first_sight) = strings.resolve("Ljava/lang/String;");
    assert!(first_sight);
    let (b, first_sight) = strings.resolve(&String::from("Ljava/lang/String;"));
    assert!(!first_sight);
    assert!(a.ptr_eq(&b));
    assert_eq!(strings.len(), 1);
}
