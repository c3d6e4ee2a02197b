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

//! Digests used by SigV4.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Hex encoded SHA256 digest of `content`.
pub fn hex_sha256(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Raw HMAC-SHA256 of `content` keyed with `key`.
///
/// The output is meant to be the key of the next step in a derivation chain.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> Vec<u8> {
    mac(key, content).finalize().into_bytes().to_vec()
}

/// Hex encoded HMAC-SHA256 of `content` keyed with `key`.
pub fn hex_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    hex::encode(mac(key, content).finalize().into_bytes())
}

fn mac(key: &[u8], content: &[u8]) -> HmacSha256 {
    // HMAC pads or hashes the key, every length is accepted.
    let mut mac = HmacSha256::new_from_slice(key).expect("hmac must accept any key length");
    mac.update(content);
    mac
}
