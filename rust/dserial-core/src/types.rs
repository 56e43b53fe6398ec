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

//! Constants of the Java Object Serialization Stream Protocol.

use num_enum::{IntoPrimitive, TryFromPrimitive};

pub const STREAM_MAGIC: u16 = 0xACED;
pub const STREAM_VERSION: u16 = 5;

/// First wire handle; object index `n` is written as `BASE_WIRE_HANDLE + n`.
pub const BASE_WIRE_HANDLE: i32 = 0x7E_0000;

/// Largest block-data record the JDK emits before starting a new one.
pub const MAX_BLOCK_SIZE: usize = 1024;

/// Record tags preceding every element of a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum TypeTag {
    Null = 0x70,
    Reference = 0x71,
    ClassDesc = 0x72,
    Object = 0x73,
    String = 0x74,
    Array = 0x75,
    Class = 0x76,
    BlockData = 0x77,
    EndBlockData = 0x78,
    Reset = 0x79,
    BlockDataLong = 0x7A,
    Exception = 0x7B,
    LongString = 0x7C,
    ProxyClassDesc = 0x7D,
    Enum = 0x7E,
}

pub const TC_NULL: u8 = TypeTag::Null as u8;
pub const TC_REFERENCE: u8 = TypeTag::Reference as u8;
pub const TC_CLASSDESC: u8 = TypeTag::ClassDesc as u8;
pub const TC_OBJECT: u8 = TypeTag::Object as u8;
pub const TC_STRING: u8 = TypeTag::String as u8;
pub const TC_ARRAY: u8 = TypeTag::Array as u8;
pub const TC_CLASS: u8 = TypeTag::Class as u8;
pub const TC_BLOCKDATA: u8 = TypeTag::BlockData as u8;
pub const TC_ENDBLOCKDATA: u8 = TypeTag::EndBlockData as u8;
pub const TC_BLOCKDATALONG: u8 = TypeTag::BlockDataLong as u8;
pub const TC_LONGSTRING: u8 = TypeTag::LongString as u8;
pub const TC_PROXYCLASSDESC: u8 = TypeTag::ProxyClassDesc as u8;
pub const TC_ENUM: u8 = TypeTag::Enum as u8;

/// Class descriptor flags.
pub mod flags {
    pub const SC_WRITE_METHOD: u8 = 0x01;
    pub const SC_SERIALIZABLE: u8 = 0x02;
    pub const SC_EXTERNALIZABLE: u8 = 0x04;
    pub const SC_BLOCK_DATA: u8 = 0x08;
    pub const SC_ENUM: u8 = 0x10;
}

/// Field type codes used in class descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum TypeCode {
    Byte = b'B',
    Char = b'C',
    Double = b'D',
    Float = b'F',
    Int = b'I',
    Long = b'J',
    Short = b'S',
    Boolean = b'Z',
    Array = b'[',
    Object = b'L',
}

impl TypeCode {
    /// Maps a Java primitive type name (`int`, `boolean`, ...) to its code.
    pub fn from_primitive_name(name: &str) -> Option<TypeCode> {
        let code = match name {
            "byte" => TypeCode::Byte,
            "char" => TypeCode::Char,
            "double" => TypeCode::Double,
            "float" => TypeCode::Float,
            "int" => TypeCode::Int,
            "long" => TypeCode::Long,
            "short" => TypeCode::Short,
            "boolean" => TypeCode::Boolean,
            _ => return None,
        };
        Some(code)
    }

    #[inline(always)]
    pub fn is_primitive(self) -> bool {
        !matches!(self, TypeCode::Array | TypeCode::Object)
    }
}
