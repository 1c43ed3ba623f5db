use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::collections::BTreeMap;

type HmacSha1 = Hmac<Sha1>;

/// Checks an `X-Twilio-Signature` value against the request it claims to
/// sign. The scheme is base64(HMAC-SHA1(auth_token, url + params)) where
/// params are concatenated as key then value in ascending key order, which
/// a `BTreeMap` gives for free.
///
/// An empty auth token rejects everything; verification without a shared
/// secret is meaningless.
pub fn verify_twilio_signature(
    auth_token: &str,
    signature: &str,
    url: &str,
    params: &BTreeMap<String, String>,
) -> bool {
    if auth_token.is_empty() {
        return false;
    }
    let Ok(claimed) = BASE64.decode(signature) else {
        return false;
    };
    let mut mac = match HmacSha1::new_from_slice(auth_token.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(signing_payload(url, params).as_bytes());
    // verify_slice compares in constant time.
    mac.verify_slice(&claimed).is_ok()
}

/// Computes the signature a sender would attach. Used by tests and local
/// webhook simulators.
pub fn compute_twilio_signature(
    auth_token: &str,
    url: &str,
    params: &BTreeMap<String, String>,
) -> String {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes()).expect("hmac key");
    mac.update(signing_payload(url, params).as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

fn signing_payload(url: &str, params: &BTreeMap<String, String>) -> String {
    let mut payload = String::from(url);
    for (key, value) in params {
        payload.push_str(key);
        payload.push_str(value);
    }
    payload
}
