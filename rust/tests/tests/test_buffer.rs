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

use dserial_core::buffer::{BlockDataWriter, Writer};
use dserial_core::util::{modified_utf8_len, to_modified_utf8};
use rand::Rng;

#[test]
fn test_fixed_width_integers() {
    let test_data: Vec<(i64, Vec<u8>)> = vec![
        (0, vec![0, 0, 0, 0, 0, 0, 0, 0]),
        (1, vec![0, 0, 0, 0, 0, 0, 0, 1]),
        (-1, vec![0xFF; 8]),
        (
            0x0102_0304_0506_0708,
            vec![1, 2, 3, 4, 5, 6, 7, 8],
        ),
        (i64::MIN, vec![0x80, 0, 0, 0, 0, 0, 0, 0]),
    ];
    for (value, expected) in &test_data {
        let mut writer = Writer::default();
        writer.write_i64(*value);
        assert_eq!(&writer.dump(), expected);

        let mut writer = Writer::default();
        writer.write_i32(*value as i32);
        assert_eq!(writer.dump(), expected[4..].to_vec());
    }
}

#[test]
fn test_floats_use_ieee_bits() {
    let mut writer = Writer::default();
    writer.write_f32(0.75);
    writer.write_f64(-2.0);
    assert_eq!(
        writer.dump(),
        vec![0x3F, 0x40, 0, 0, 0xC0, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn test_write_chars_is_utf16() {
    let mut writer = Writer::default();
    writer.write_chars("a\u{1F600}");
    assert_eq!(writer.dump(), vec![0, 0x61, 0xD8, 0x3D, 0xDE, 0x00]);
}

#[test]
fn test_random_strings_length_prefix() {
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let len = rng.gen_range(0..200);
        let s: String = (0..len)
            .map(|_| char::from_u32(rng.gen_range(0..0xD000u32)).unwrap_or('?'))
            .collect();
        let mut writer = Writer::default();
        writer.write_utf(&s).unwrap();
        let bytes = writer.dump();
        let prefix = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
        assert_eq!(prefix, modified_utf8_len(&s));
        assert_eq!(&bytes[2..], to_modified_utf8(&s).as_slice());
    }
}

#[test]
fn test_block_data_interrupted_by_plain_write() {
    let mut out = BlockDataWriter::new(Writer::default());
    out.set_block_data_mode(true).unwrap();
    out.current().write_i32(5);
    let was_active = out.set_block_data_mode(false).unwrap();
    out.current().write_u8(0x70);
    if was_active {
        out.set_block_data_mode(true).unwrap();
    }
    out.current().write_bool(true);
    out.set_block_data_mode(false).unwrap();
    assert_eq!(
        out.finish().unwrap(),
        vec![0x77, 4, 0, 0, 0, 5, 0x70, 0x77, 1, 1]
    );
}
