//! Text transfer across the boundary.
//!
//! Text goes in as a read-only, NUL-terminated C string that is copied
//! before the call returns. Text comes out through a caller-supplied buffer:
//! at most `capacity - 1` bytes followed by a terminator. Longer text is
//! truncated silently; truncation is data loss, not an error.

use std::ffi::{c_char, CStr};

use crate::guard::trap;

/// Copy `src` into `dst`, truncating to `dst.len() - 1` bytes and writing a
/// terminator. Returns the number of text bytes written. An empty `dst` is
/// left untouched.
pub fn copy_into(src: &[u8], dst: &mut [u8]) -> usize {
    let Some(limit) = dst.len().checked_sub(1) else {
        return 0;
    };
    let n = src.len().min(limit);
    dst[..n].copy_from_slice(&src[..n]);
    dst[n] = 0;
    n
}

/// Copy `src` into the caller's buffer of `capacity` bytes.
///
/// Writes nothing when `buffer` is null or `capacity` is zero.
///
/// # Safety
/// `buffer` must be null or valid for writes of `capacity` bytes.
pub unsafe fn copy_text_out(src: &str, buffer: *mut c_char, capacity: usize) -> usize {
    if buffer.is_null() || capacity == 0 {
        return 0;
    }
    let dst = unsafe { std::slice::from_raw_parts_mut(buffer.cast::<u8>(), capacity) };
    copy_into(src.as_bytes(), dst)
}

/// Copy a caller's C string into owned text. Invalid UTF-8 is replaced.
///
/// # Safety
/// `text` must be null or point to a NUL-terminated string that stays valid
/// for the duration of this call.
pub unsafe fn text_in(text: *const c_char, what: &str) -> String {
    if text.is_null() {
        trap(&format!("null {what}"));
    }
    unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fits_with_terminator() {
        let mut buf = [0xffu8; 8];
        assert_eq!(copy_into(b"admins", &mut buf), 6);
        assert_eq!(&buf[..7], b"admins\0");
        assert_eq!(buf[7], 0xff);
    }

    #[test]
    fn truncates_to_capacity_minus_one() {
        let mut buf = [0xffu8; 4];
        assert_eq!(copy_into(b"admins", &mut buf), 3);
        assert_eq!(&buf, b"adm\0");
    }

    #[test]
    fn capacity_one_writes_only_terminator() {
        let mut buf = [0xffu8; 1];
        assert_eq!(copy_into(b"x", &mut buf), 0);
        assert_eq!(buf, [0]);
    }

    #[test]
    fn null_or_empty_buffer_is_untouched() {
        assert_eq!(unsafe { copy_text_out("abc", std::ptr::null_mut(), 16) }, 0);
        let mut buf = [0x7fu8; 2];
        let written = unsafe { copy_text_out("abc", buf.as_mut_ptr().cast(), 0) };
        assert_eq!(written, 0);
        assert_eq!(buf, [0x7f, 0x7f]);
    }

    #[test]
    fn text_in_copies() {
        let owned = std::ffi::CString::new("group").unwrap();
        let copied = unsafe { text_in(owned.as_ptr(), "name") };
        drop(owned);
        assert_eq!(copied, "group");
    }

    proptest! {
        #[test]
        fn prop_never_writes_past_capacity(
            text in "[ -~]{0,64}",
            capacity in 0usize..80,
        ) {
            // one guard byte past the advertised capacity
            let mut buf = vec![0xaau8; capacity + 1];
            let written = unsafe { copy_text_out(&text, buf.as_mut_ptr().cast(), capacity) };
            prop_assert_eq!(buf[capacity], 0xaa);
            if capacity == 0 {
                prop_assert_eq!(written, 0);
            } else {
                prop_assert_eq!(written, text.len().min(capacity - 1));
                prop_assert_eq!(&buf[..written], &text.as_bytes()[..written]);
                prop_assert_eq!(buf[written], 0);
            }
        }

        #[test]
        fn prop_round_trip_with_enough_capacity(text in "[ -~]{0,64}") {
            let mut buf = vec![0u8; text.len() + 1];
            let written = copy_into(text.as_bytes(), &mut buf);
            let back = CStr::from_bytes_with_nul(&buf[..=written]).unwrap();
            prop_assert_eq!(back.to_str().unwrap(), text.as_str());
        }
    }
}
