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

use crate::ensure;
use crate::error::Error;
use crate::types::TypeCode;

/// Encodes `s` the way `DataOutput.writeUTF` does.
///
/// This is not standard UTF-8: NUL takes two bytes and characters outside the
/// basic multilingual plane are written as two three-byte surrogate sequences.
pub fn to_modified_utf8(s: &str) -> Vec<u8> {
    // Longest case: 1 u16 to 3 u8
    let mut bytes = Vec::with_capacity(s.len() + s.len() / 2);
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => bytes.push(unit as u8),
            // [0000|0bbb|bbcc|cccc] => [110|bbbbb], [10|cccccc]
            0x0000 | 0x0080..=0x07FF => {
                bytes.push(0b1100_0000 | ((unit >> 6) & 0b1_1111) as u8);
                bytes.push(0b1000_0000 | (unit & 0b11_1111) as u8);
            }
            // [aaaa|bbbb|bbcc|cccc] => [1110|aaaa], [10|bbbbbb], [10|cccccc]
            _ => {
                bytes.push(0b1110_0000 | ((unit >> 12) & 0b1111) as u8);
                bytes.push(0b1000_0000 | ((unit >> 6) & 0b11_1111) as u8);
                bytes.push(0b1000_0000 | (unit & 0b11_1111) as u8);
            }
        }
    }
    bytes
}

/// Length in bytes of the modified UTF-8 form of `s`.
pub fn modified_utf8_len(s: &str) -> usize {
    s.encode_utf16()
        .map(|unit| match unit {
            0x0001..=0x007F => 1,
            0x0000 | 0x0080..=0x07FF => 2,
            _ => 3,
        })
        .sum()
}

/// Splits a source-style type name into its element name and array rank,
/// e.g. `java.lang.Object[][]` into `("java.lang.Object", 2)`.
fn split_array_rank(type_name: &str) -> Result<(&str, usize), Error> {
    let mut element = type_name.trim();
    let mut rank = 0;
    while let Some(stripped) = element.strip_suffix("[]") {
        element = stripped;
        rank += 1;
    }
    ensure!(
        !element.is_empty() && !element.contains(['[', ']', ' ', '/', ';']),
        Error::type_error(format!("Invalid type name: '{}'", type_name))
    );
    Ok((element, rank))
}

/// Returns the field type signature of a source-style type name:
/// `int` becomes `I`, `java.lang.String` becomes `Ljava/lang/String;` and
/// `int[][]` becomes `[[I`.
pub fn field_signature(type_name: &str) -> Result<String, Error> {
    let (element, rank) = split_array_rank(type_name)?;
    let mut signature = "[".repeat(rank);
    match TypeCode::from_primitive_name(element) {
        Some(code) => signature.push(u8::from(code) as char),
        None => {
            signature.push('L');
            signature.push_str(&element.replace('.', "/"));
            signature.push(';');
        }
    }
    Ok(signature)
}

/// Returns the name `Class.getName()` reports for a source-style type name.
/// Array classes keep the dots of their element name: `java.lang.String[]`
/// becomes `[Ljava.lang.String;`.
pub fn class_get_name(type_name: &str) -> Result<String, Error> {
    let (element, rank) = split_array_rank(type_name)?;
    if rank == 0 {
        return Ok(element.to_string());
    }
    let mut name = "[".repeat(rank);
    match TypeCode::from_primitive_name(element) {
        Some(code) => name.push(u8::from(code) as char),
        None => {
            name.push('L');
            name.push_str(element);
            name.push(';');
        }
    }
    Ok(name)
}

/// Returns the type code a field of `type_name` is declared with.
pub fn field_type_code(type_name: &str) -> Result<TypeCode, Error> {
    let (element, rank) = split_array_rank(type_name)?;
    if rank > 0 {
        return Ok(TypeCode::Array);
    }
    Ok(TypeCode::from_primitive_name(element).unwrap_or(TypeCode::Object))
}
