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

//! Object graphs and the writer that serializes them.
//!
//! Objects are shared through [`Rc`](std::rc::Rc); two values pointing at the
//! same allocation are the same Java object and are written once, every later
//! occurrence becoming a back-reference. Value-equal but distinct allocations
//! are distinct objects.

mod model;
mod writer;

pub use model::{
    ArrayData, ClassData, ClassDesc, DescKind, ExternalHook, JavaObject, ObjectRef, Value,
    WriteObjectHook,
};
pub use writer::{GraphWriter, ObjectOutput};
