//! A text-sequence container-adapter and its flat exports.
//!
//! This is the Rust rendition of what the generator emits for an adapter
//! over `vector<string>`: construction, value copy, append, indexed get,
//! size and the single release path, under the same symbols and the same
//! contracts. An out-of-range `Get` traps.

#![allow(non_snake_case)]

use std::ffi::c_char;

use crate::buffer::{copy_text_out, text_in};
use crate::guard::{guard, require, require_mut, trap};

/// An ordered sequence of owned strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSequence {
    items: Vec<String>,
}

impl TextSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TextSequence {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Create an empty sequence. Release with [`StringVector_delete`].
#[no_mangle]
pub extern "C" fn StringVector_StringVector_0() -> *mut TextSequence {
    guard(|| Box::into_raw(Box::new(TextSequence::new())))
}

/// Create an independent copy of `src`. The caller keeps ownership of `src`.
///
/// # Safety
/// `src` must be a live handle from this module.
#[no_mangle]
pub unsafe extern "C" fn StringVector_StringVector_S(
    src: *const TextSequence,
) -> *mut TextSequence {
    guard(|| {
        let src = unsafe { require(src, "src") };
        Box::into_raw(Box::new(src.clone()))
    })
}

/// Append a copy of `item`.
///
/// # Safety
/// `target` must be a live handle not used concurrently; `item` must be a
/// NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn StringVector_Add_s(target: *mut TextSequence, item: *const c_char) {
    guard(|| {
        let target = unsafe { require_mut(target, "target") };
        let item = unsafe { text_in(item, "item") };
        target.push(item);
    })
}

/// Copy element `index` into `out_buffer`, truncating to `out_capacity - 1`
/// bytes. Traps when `index` is out of range.
///
/// # Safety
/// `target` must be a live handle; `out_buffer` must be null or valid for
/// `out_capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn StringVector_Get_z(
    target: *mut TextSequence,
    index: usize,
    out_buffer: *mut c_char,
    out_capacity: usize,
) {
    guard(|| {
        let target = unsafe { require(target, "target") };
        match target.get(index) {
            Some(item) => {
                unsafe { copy_text_out(item, out_buffer, out_capacity) };
            }
            None => trap(&format!(
                "index {index} out of range for sequence of length {}",
                target.len()
            )),
        }
    })
}

/// Number of elements.
///
/// # Safety
/// `target` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn StringVector_Size_0(target: *mut TextSequence) -> usize {
    guard(|| unsafe { require(target, "target") }.len())
}

/// Release `target`. The pointer is invalid afterwards; null is ignored.
///
/// # Safety
/// `target` must be null or a live handle from this module, released at
/// most once.
#[no_mangle]
pub unsafe extern "C" fn StringVector_delete(target: *mut TextSequence) {
    guard(|| {
        if !target.is_null() {
            drop(unsafe { Box::from_raw(target) });
        }
    })
}
