use std::ffi::CStr;

use strqueue::api;
use strqueue::harness::Harness;
use strqueue::stdx::Queue;

fn drain(queue: &mut Queue) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = [0u8; 64];
    while api::remove_head(Some(&mut *queue), Some(&mut buf)) {
        let value = CStr::from_bytes_until_nul(&buf).unwrap();
        out.push(value.to_str().unwrap().to_owned());
    }
    out
}

#[test]
fn empty_queue() {
    let mut q = api::create().unwrap();
    assert_eq!(api::size(Some(&q)), 0);
    assert!(!api::remove_head(Some(&mut q), None));
    api::destroy(Some(q));
}

#[test]
fn tail_inserts_come_out_in_order() {
    let mut q = api::create().unwrap();
    for v in ["a", "b", "c"] {
        assert!(api::insert_tail(Some(&mut q), v));
    }
    assert_eq!(api::size(Some(&q)), 3);

    let mut buf = [0u8; 8];
    assert!(api::remove_head(Some(&mut q), Some(&mut buf)));
    assert_eq!(CStr::from_bytes_until_nul(&buf).unwrap(), c"a");
    assert!(api::remove_head(Some(&mut q), Some(&mut buf)));
    assert_eq!(CStr::from_bytes_until_nul(&buf).unwrap(), c"b");
    assert_eq!(api::size(Some(&q)), 1);
}

#[test]
fn single_head_insert() {
    let mut q = api::create().unwrap();
    assert!(api::insert_head(Some(&mut q), "x"));
    assert_eq!(api::size(Some(&q)), 1);

    let head = q.peek_head().unwrap();
    let tail = q.peek_tail().unwrap();
    assert_eq!(head, "x");
    assert!(std::ptr::eq(head, tail));
}

#[test]
fn sort_fruit() {
    let mut q = api::create().unwrap();
    for v in ["banana", "apple", "cherry"] {
        assert!(api::insert_tail(Some(&mut q), v));
    }

    api::sort(Some(&mut q));
    assert_eq!(drain(&mut q), ["apple", "banana", "cherry"]);
    assert_eq!(api::size(Some(&q)), 0);
}

#[test]
fn remove_head_truncates_to_capacity() {
    let mut q = api::create().unwrap();
    assert!(api::insert_tail(Some(&mut q), "hello"));

    let mut buf = [0xaau8; 3];
    assert!(api::remove_head(Some(&mut q), Some(&mut buf)));
    assert_eq!(CStr::from_bytes_until_nul(&buf).unwrap(), c"he");
    assert_eq!(api::size(Some(&q)), 0);
}

#[test]
fn reverse_then_sort_then_reverse() {
    let mut q = api::create().unwrap();
    for v in ["d", "b", "a", "c"] {
        assert!(api::insert_head(Some(&mut q), v));
    }
    // c a b d
    api::reverse(Some(&mut q));
    assert_eq!(q.iter().collect::<Vec<_>>(), ["d", "b", "a", "c"]);

    api::sort(Some(&mut q));
    api::reverse(Some(&mut q));
    assert!(api::insert_tail(Some(&mut q), "z"));
    assert_eq!(drain(&mut q), ["d", "c", "b", "a", "z"]);
}

#[test]
fn size_counts_successful_operations_only() {
    let harness = Harness::new();
    let mut q = Queue::try_new_in(harness.clone()).unwrap();
    let mut expected = 0;

    for i in 0..20u64 {
        if i % 3 == 0 {
            harness.fail_next_attempts(i % 2);
        }
        let value = i.to_string();
        let ok = if i % 2 == 0 {
            api::insert_head(Some(&mut q), &value)
        } else {
            api::insert_tail(Some(&mut q), &value)
        };
        assert_eq!(ok, i % 3 != 0);
        if ok {
            expected += 1;
        }
        if i % 5 == 4 && api::remove_head(Some(&mut q), None) {
            expected -= 1;
        }
        assert_eq!(api::size(Some(&q)), expected);
    }

    api::destroy(Some(q));
    assert_eq!(harness.live_blocks(), 0);
}
