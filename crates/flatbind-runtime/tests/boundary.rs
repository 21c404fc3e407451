use std::ffi::{c_char, CStr};
use std::process::Command;

use flatbind_runtime::sequence::{
    StringVector_Add_s, StringVector_Get_z, StringVector_Size_0, StringVector_StringVector_0,
    StringVector_delete,
};
use flatbind_runtime::{guard, trap};
use proptest::prelude::*;

const CASE_VAR: &str = "FLATBIND_TRAP_CASE";

/// Re-run this test binary on a single test with `CASE_VAR` set, so the
/// child executes the trapping branch and the parent observes its exit.
fn run_trap_case(test: &str, case: &str) -> std::process::ExitStatus {
    let exe = std::env::current_exe().unwrap();
    Command::new(exe)
        .args([test, "--exact", "--nocapture", "--test-threads=1"])
        .env(CASE_VAR, case)
        .status()
        .unwrap()
}

fn get(seq: *mut flatbind_runtime::TextSequence, index: usize, capacity: usize) -> String {
    let mut buf = vec![0 as c_char; capacity.max(1)];
    unsafe { StringVector_Get_z(seq, index, buf.as_mut_ptr(), capacity) };
    unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

#[test]
fn appended_items_come_back_in_order() {
    let seq = StringVector_StringVector_0();
    for name in ["ann", "bob", "cy"] {
        let owned = std::ffi::CString::new(name).unwrap();
        unsafe { StringVector_Add_s(seq, owned.as_ptr()) };
    }
    assert_eq!(unsafe { StringVector_Size_0(seq) }, 3);
    assert_eq!(get(seq, 0, 16), "ann");
    assert_eq!(get(seq, 2, 16), "cy");
    assert_eq!(get(seq, 1, 3), "bo");
    unsafe { StringVector_delete(seq) };
}

#[test]
fn out_of_range_get_traps() {
    if std::env::var(CASE_VAR).as_deref() == Ok("index") {
        let seq = StringVector_StringVector_0();
        let mut buf = [0 as c_char; 8];
        unsafe { StringVector_Get_z(seq, 0, buf.as_mut_ptr(), buf.len()) };
        return;
    }
    let status = run_trap_case("out_of_range_get_traps", "index");
    assert!(!status.success());
}

#[test]
fn null_text_in_traps() {
    if std::env::var(CASE_VAR).as_deref() == Ok("null-text") {
        let seq = StringVector_StringVector_0();
        unsafe { StringVector_Add_s(seq, std::ptr::null()) };
        return;
    }
    let status = run_trap_case("null_text_in_traps", "null-text");
    assert!(!status.success());
}

#[test]
fn panic_under_guard_aborts() {
    if std::env::var(CASE_VAR).as_deref() == Ok("panic") {
        guard(|| panic!("escaped"));
        return;
    }
    let status = run_trap_case("panic_under_guard_aborts", "panic");
    assert!(!status.success());
}

#[test]
fn trap_terminates() {
    if std::env::var(CASE_VAR).as_deref() == Ok("trap") {
        trap("requested");
    }
    let status = run_trap_case("trap_terminates", "trap");
    assert!(!status.success());
}

proptest! {
    #[test]
    fn prop_size_matches_appends(items in prop::collection::vec("[a-z]{0,12}", 0..20)) {
        let seq = StringVector_StringVector_0();
        for item in &items {
            let owned = std::ffi::CString::new(item.as_str()).unwrap();
            unsafe { StringVector_Add_s(seq, owned.as_ptr()) };
        }
        prop_assert_eq!(unsafe { StringVector_Size_0(seq) }, items.len());
        for (i, item) in items.iter().enumerate() {
            prop_assert_eq!(&get(seq, i, 16), item);
        }
        unsafe { StringVector_delete(seq) };
    }
}
