//! Strings and the modified UTF-8 encoding
//!
//! The runtime exchanges strings as "modified UTF-8": U+0000 is written as
//! the two bytes `C0 80`, and supplementary characters are written as a
//! surrogate pair with each half encoded as a three-byte sequence.

use std::ffi::{CStr, CString};

use crate::env::Env;
use crate::error::{JniError, JniResult};
use crate::refs::ObjectHandle;

/// Create a string object from Rust text. Returns a local reference.
pub fn new_string(env: &mut Env<'_>, text: &str) -> JniResult<ObjectHandle> {
    let encoded = CString::new(to_modified_utf8(text))?;
    let raw = env.boundary().new_string_utf(&encoded);
    env.check_exception()?;
    if raw.is_null() {
        return Err(JniError::AllocationFailed("string".to_string()));
    }
    // SAFETY: the runtime just returned this local reference.
    Ok(unsafe { ObjectHandle::from_raw(raw) })
}

/// Copy a string object's contents into Rust text.
pub fn read_string(env: &mut Env<'_>, string: ObjectHandle) -> JniResult<String> {
    if string.is_null() {
        return Err(JniError::StringConversion("null string".to_string()));
    }
    let chars = env.boundary().get_string_utf_chars(string.as_raw());
    if chars.is_null() {
        env.check_exception()?;
        return Err(JniError::AllocationFailed("string contents".to_string()));
    }
    // SAFETY: the runtime hands back a NUL-terminated buffer that stays
    // valid until released below.
    let bytes = unsafe { CStr::from_ptr(chars) }.to_bytes().to_vec();
    env.boundary().release_string_utf_chars(string.as_raw(), chars);
    from_modified_utf8(&bytes)
}

/// Length in UTF-16 code units.
pub fn string_length(env: &mut Env<'_>, string: ObjectHandle) -> JniResult<usize> {
    if string.is_null() {
        return Err(JniError::StringConversion("null string".to_string()));
    }
    let len = env.boundary().get_string_length(string.as_raw());
    env.check_exception()?;
    Ok(len.max(0) as usize)
}

// ============================================================================
// Encoding
// ============================================================================

pub fn to_modified_utf8(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c as u32 {
            0 => out.extend_from_slice(&[0xC0, 0x80]),
            code if code >= 0x10000 => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    push_three_byte(&mut out, *unit);
                }
            }
            _ => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out
}

fn push_three_byte(out: &mut Vec<u8>, unit: u16) {
    out.push(0xE0 | (unit >> 12) as u8);
    out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
    out.push(0x80 | (unit & 0x3F) as u8);
}

/// Decode modified UTF-8. Unpaired surrogates become U+FFFD; malformed
/// byte sequences are an error.
pub fn from_modified_utf8(bytes: &[u8]) -> JniResult<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i];
        let (unit, width) = if b0 & 0x80 == 0 {
            (u16::from(b0), 1)
        } else if b0 & 0xE0 == 0xC0 {
            let b1 = continuation(bytes, i, 1)?;
            ((u16::from(b0 & 0x1F) << 6) | b1, 2)
        } else if b0 & 0xF0 == 0xE0 {
            let b1 = continuation(bytes, i, 1)?;
            let b2 = continuation(bytes, i, 2)?;
            ((u16::from(b0 & 0x0F) << 12) | (b1 << 6) | b2, 3)
        } else {
            return Err(JniError::StringConversion(format!(
                "invalid lead byte 0x{:02X} at offset {}",
                b0, i
            )));
        };
        units.push(unit);
        i += width;
    }
    Ok(char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

fn continuation(bytes: &[u8], start: usize, offset: usize) -> JniResult<u16> {
    match bytes.get(start + offset) {
        Some(&b) if b & 0xC0 == 0x80 => Ok(u16::from(b & 0x3F)),
        _ => Err(JniError::StringConversion(format!(
            "truncated sequence at offset {}",
            start
        ))),
    }
}
