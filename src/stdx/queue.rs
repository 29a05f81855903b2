//! Singly-linked queue of owned strings.
//!
//! Supports insertion at either end, removal from the head, in-place reversal
//! and a stable merge sort, all by rewiring links. Reversal and sorting never
//! allocate or free an element.
//!
//! # Design
//!
//! Elements are heap blocks linked through `Option<NonNull<Element>>`. The
//! queue owns every element reachable from `head`; `tail` aliases the last
//! one so appends are O(1). Each element and each value buffer is obtained
//! through the queue's [`AllocPolicy`], so allocation exhaustion surfaces as
//! [`QueueError::AllocationFailure`] instead of an abort, and a failed insert
//! releases whatever it had already obtained.
//!
//! # Example
//!
//! ```
//! use strqueue::stdx::Queue;
//!
//! let mut queue = Queue::new();
//! queue.insert_tail("banana").unwrap();
//! queue.insert_tail("apple").unwrap();
//! queue.insert_head("cherry").unwrap();
//!
//! queue.sort();
//! assert_eq!(queue.iter().collect::<Vec<_>>(), ["apple", "banana", "cherry"]);
//!
//! let mut buf = [0u8; 3];
//! queue.remove_head(Some(&mut buf)).unwrap();
//! assert_eq!(&buf, b"ap\0");
//! ```

use core::alloc::Layout;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;
use std::alloc::{alloc, dealloc};

use crate::alloc::{AllocPolicy, System};
use crate::error::QueueError;

// Compile-time: verify u32 fits in usize
const _: () = assert!(
    size_of::<usize>() >= size_of::<u32>(),
    "Platform must have at least 32-bit addressing"
);

struct Element {
    value: String,
    next: Option<NonNull<Element>>,
}

const ELEMENT_LAYOUT: Layout = Layout::new::<Element>();

const _: () = assert!(ELEMENT_LAYOUT.size() > 0);

/// Layout accounted for a value buffer of `len` bytes.
#[inline]
fn value_layout(len: usize) -> Layout {
    assert!(len <= isize::MAX as usize);

    // SAFETY: align 1 is a power of two and `len` does not exceed isize::MAX.
    unsafe { Layout::from_size_align_unchecked(len, 1) }
}

/// Copies `value` into `buf` as a NUL-terminated byte string.
///
/// At most `buf.len() - 1` bytes are copied; longer values are silently
/// truncated. Bytes after the terminator are zeroed. An empty `buf` is left
/// untouched. Returns the number of value bytes copied.
pub fn copy_truncated(value: &str, buf: &mut [u8]) -> usize {
    let Some(room) = buf.len().checked_sub(1) else {
        return 0;
    };

    let copied = value.len().min(room);
    buf[..copied].copy_from_slice(&value.as_bytes()[..copied]);
    buf[copied..].fill(0);

    assert!(buf[copied] == 0);
    copied
}

/// Queue of owned strings.
///
/// Uses `u32` length for 32/64-bit portability. Panics on overflow (> 4B elements).
pub struct Queue<P: AllocPolicy = System> {
    head: Option<NonNull<Element>>,
    tail: Option<NonNull<Element>>,
    len: u32,
    policy: P,
    _owns: PhantomData<Box<Element>>,
}

// SAFETY: the queue exclusively owns every element it links; nothing else
// holds the pointers.
unsafe impl<P: AllocPolicy + Send> Send for Queue<P> {}

impl Queue<System> {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            policy: System,
            _owns: PhantomData,
        }
    }

    pub fn try_new() -> Result<Self, QueueError> {
        Self::try_new_in(System)
    }
}

impl Default for Queue<System> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: AllocPolicy> Queue<P> {
    /// Creates an empty queue whose blocks are admitted by `policy`.
    ///
    /// # Errors
    /// [`QueueError::AllocationFailure`] if the policy refuses the queue header.
    pub fn try_new_in(mut policy: P) -> Result<Self, QueueError> {
        let header = Layout::new::<Self>();
        if !policy.admit(header) {
            return Err(QueueError::AllocationFailure);
        }
        policy.on_alloc(header);

        let queue = Self {
            head: None,
            tail: None,
            len: 0,
            policy,
            _owns: PhantomData,
        };

        assert!(queue.is_empty());
        Ok(queue)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        let empty = self.head.is_none();

        assert!(empty == self.tail.is_none());
        assert!(empty == (self.len == 0));

        empty
    }

    /// Number of elements. O(1).
    #[inline]
    pub fn size(&self) -> u32 {
        assert!((self.len == 0) == self.head.is_none());
        assert!((self.len == 0) == self.tail.is_none());

        self.len
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.size()
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn peek_head(&self) -> Option<&str> {
        // SAFETY: head is owned by the queue and outlives the returned borrow.
        self.head.map(|ptr| unsafe { ptr.as_ref() }.value.as_str())
    }

    pub fn peek_tail(&self) -> Option<&str> {
        // SAFETY: tail is owned by the queue and outlives the returned borrow.
        self.tail.map(|ptr| unsafe { ptr.as_ref() }.value.as_str())
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head,
            remaining: self.len,
            _queue: PhantomData,
        }
    }

    /// Copies `value` into a new element at the front.
    ///
    /// # Errors
    /// [`QueueError::AllocationFailure`]; the queue is unchanged.
    ///
    /// # Panics
    /// If the length would overflow `u32::MAX`.
    pub fn insert_head(&mut self, value: &str) -> Result<(), QueueError> {
        let old_len = self.len;
        assert!(old_len < u32::MAX, "queue length overflow");

        let node = self.element_new(value, self.head)?;

        self.head = Some(node);
        if self.tail.is_none() {
            assert!(old_len == 0);
            self.tail = Some(node);
        }
        self.len += 1;

        assert!(self.len == old_len + 1);
        assert!(self.head == Some(node));
        assert!(!self.is_empty());
        Ok(())
    }

    /// Copies `value` into a new element at the back.
    ///
    /// # Errors
    /// [`QueueError::AllocationFailure`]; the queue is unchanged.
    ///
    /// # Panics
    /// If the length would overflow `u32::MAX`.
    pub fn insert_tail(&mut self, value: &str) -> Result<(), QueueError> {
        let old_len = self.len;
        assert!(old_len < u32::MAX, "queue length overflow");

        let node = self.element_new(value, None)?;

        match self.tail {
            None => {
                assert!(self.head.is_none());
                assert!(self.len == 0);

                self.head = Some(node);
            }
            Some(mut tail_ptr) => {
                // SAFETY: tail_ptr is owned by the queue.
                let tail = unsafe { tail_ptr.as_mut() };
                assert!(tail.next.is_none(), "tail element has non-null next");

                tail.next = Some(node);
            }
        }
        self.tail = Some(node);
        self.len += 1;

        assert!(self.len == old_len + 1);
        assert!(self.tail == Some(node));
        Ok(())
    }

    /// Detaches the head element and hands its value to the caller.
    pub fn pop_front(&mut self) -> Option<String> {
        let head_ptr = self.head?;
        let old_len = self.len;
        assert!(old_len > 0, "head exists but len is 0");

        // SAFETY: head_ptr is owned by the queue.
        let next = unsafe { head_ptr.as_ref() }.next;

        self.head = next;
        if next.is_none() {
            assert!(self.tail == Some(head_ptr));
            self.tail = None;
        }
        self.len -= 1;

        assert!(self.len == old_len - 1);
        assert!(self.head.is_none() == self.tail.is_none());

        Some(self.element_release(head_ptr))
    }

    /// Removes the head element, optionally copying its value into `out`.
    ///
    /// `out` receives at most `out.len() - 1` bytes plus a NUL terminator;
    /// see [`copy_truncated`]. Truncation is not an error.
    ///
    /// # Errors
    /// [`QueueError::InvalidQueue`] if the queue is empty.
    pub fn remove_head(&mut self, out: Option<&mut [u8]>) -> Result<(), QueueError> {
        let value = self.pop_front().ok_or(QueueError::InvalidQueue)?;

        if let Some(buf) = out {
            copy_truncated(&value, buf);
        }
        Ok(())
    }

    /// Releases every element. The queue stays usable.
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}

        assert!(self.is_empty());
    }

    /// Reverses the queue in place by flipping every link.
    pub fn reverse(&mut self) {
        if self.len <= 1 {
            return;
        }

        let old_head = self.head;
        let old_tail = self.tail;

        let mut prev: Option<NonNull<Element>> = None;
        let mut current = self.head;
        while let Some(mut ptr) = current {
            // SAFETY: ptr is owned by the queue; each element is visited once.
            let element = unsafe { ptr.as_mut() };
            current = element.next;
            element.next = prev;
            prev = Some(ptr);
        }

        self.head = prev;
        self.tail = old_head;

        assert!(self.head == old_tail);
        // SAFETY: tail is owned by the queue.
        assert!(self.tail.is_some_and(|t| unsafe { t.as_ref() }.next.is_none()));
    }

    /// Sorts values into non-decreasing byte order, keeping equal values in
    /// their original relative order.
    pub fn sort(&mut self) {
        if self.len <= 1 {
            return;
        }

        self.head = merge_sort(self.head);

        // Tail is whatever the merge left last.
        let mut count: u32 = 0;
        let mut last = None;
        let mut current = self.head;
        while let Some(ptr) = current {
            count += 1;
            assert!(count <= self.len, "sort: more elements than len");

            last = current;
            // SAFETY: ptr is owned by the queue.
            current = unsafe { ptr.as_ref() }.next;
        }

        assert!(count == self.len, "sort: lost elements");
        self.tail = last;
    }

    fn element_new(
        &mut self,
        value: &str,
        next: Option<NonNull<Element>>,
    ) -> Result<NonNull<Element>, QueueError> {
        let buffer = value_layout(value.len());

        if !self.policy.admit(ELEMENT_LAYOUT) {
            return Err(QueueError::AllocationFailure);
        }
        // SAFETY: ELEMENT_LAYOUT has non-zero size.
        let raw = unsafe { alloc(ELEMENT_LAYOUT) }.cast::<Element>();
        let ptr = NonNull::new(raw).ok_or(QueueError::AllocationFailure)?;
        self.policy.on_alloc(ELEMENT_LAYOUT);

        let mut owned = String::new();
        if !self.policy.admit(buffer) || owned.try_reserve_exact(value.len()).is_err() {
            // SAFETY: ptr came from `alloc(ELEMENT_LAYOUT)` and was never initialised.
            unsafe { dealloc(ptr.as_ptr().cast(), ELEMENT_LAYOUT) };
            self.policy.on_free(ELEMENT_LAYOUT);
            return Err(QueueError::AllocationFailure);
        }
        self.policy.on_alloc(buffer);
        owned.push_str(value);

        // SAFETY: ptr is valid for writes and suitably aligned for Element.
        unsafe { ptr.as_ptr().write(Element { value: owned, next }) };
        Ok(ptr)
    }

    /// Frees an element already unlinked from the queue and returns its value.
    fn element_release(&mut self, ptr: NonNull<Element>) -> String {
        // SAFETY: ptr was allocated by `element_new` with the global allocator
        // and ELEMENT_LAYOUT, which is the layout Box<Element> uses.
        let element = unsafe { Box::from_raw(ptr.as_ptr()) };
        let Element { value, .. } = *element;

        self.policy.on_free(ELEMENT_LAYOUT);
        self.policy.on_free(value_layout(value.len()));
        value
    }

    /// Verify structural invariants. Only available in debug builds.
    #[cfg(debug_assertions)]
    pub fn check_invariants(&self) {
        if self.len == 0 {
            assert!(self.head.is_none(), "len=0 but head is Some");
            assert!(self.tail.is_none(), "len=0 but tail is Some");
            return;
        }

        assert!(self.head.is_some(), "len>0 but head is None");
        assert!(self.tail.is_some(), "len>0 but tail is None");

        // SAFETY: tail is owned by the queue.
        unsafe {
            let tail = self.tail.unwrap();
            assert!(tail.as_ref().next.is_none(), "tail has non-null next");
        }

        if self.len == 1 {
            assert!(self.head == self.tail, "len=1 but head != tail");
        }

        let mut count: u32 = 0;
        let mut current = self.head;
        let mut last: Option<NonNull<Element>> = None;

        while let Some(ptr) = current {
            count += 1;
            assert!(count <= self.len, "more nodes than len indicates (cycle?)");

            last = current;
            // SAFETY: ptr is reachable from head, so the queue owns it.
            current = unsafe { ptr.as_ref().next };
        }

        assert!(
            count == self.len,
            "counted {} nodes but len is {}",
            count,
            self.len
        );
        assert!(last == self.tail, "last reachable node is not tail");
    }
}

impl<P: AllocPolicy> Drop for Queue<P> {
    fn drop(&mut self) {
        self.clear();
        self.policy.on_free(Layout::new::<Self>());
    }
}

impl<P: AllocPolicy> fmt::Debug for Queue<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, P: AllocPolicy> IntoIterator for &'a Queue<P> {
    type Item = &'a str;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Head-to-tail iterator over a queue's values.
pub struct Iter<'a> {
    next: Option<NonNull<Element>>,
    remaining: u32,
    _queue: PhantomData<&'a Element>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let ptr = self.next?;
        assert!(self.remaining > 0);

        // SAFETY: the queue is borrowed for 'a, so its elements stay alive
        // and unmodified.
        let element: &'a Element = unsafe { ptr.as_ref() };
        self.next = element.next;
        self.remaining -= 1;

        Some(element.value.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// Sorts the chain starting at `head`, returning the new head.
fn merge_sort(head: Option<NonNull<Element>>) -> Option<NonNull<Element>> {
    let first = head?;
    // SAFETY: every pointer in the chain is owned by the queue being sorted.
    if unsafe { first.as_ref() }.next.is_none() {
        return head;
    }

    let second = split(first);
    let left = merge_sort(Some(first));
    let right = merge_sort(second);

    merge(left, right)
}

/// Cuts the chain at its midpoint and returns the head of the second half.
///
/// Slow starts at `head` and fast one step ahead, so for an even length the
/// first half is the longer-or-equal one and neither half is empty.
fn split(head: NonNull<Element>) -> Option<NonNull<Element>> {
    let mut slow = head;
    // SAFETY: head is a live element of the chain being sorted.
    let mut fast = unsafe { head.as_ref() }.next;

    while let Some(f) = fast {
        // SAFETY: f was read from a link of the chain, so it is live.
        let Some(f_next) = (unsafe { f.as_ref() }).next else {
            break;
        };
        // SAFETY: slow trails fast within the same chain.
        match unsafe { slow.as_ref() }.next {
            Some(s) => slow = s,
            None => break,
        }
        // SAFETY: f_next was read from a link of the chain, so it is live.
        fast = unsafe { f_next.as_ref() }.next;
    }

    // SAFETY: slow is live and no other reference to it exists here.
    let second = unsafe { slow.as_mut() }.next.take();
    assert!(second.is_some(), "split of a chain shorter than two");
    second
}

/// Merges two sorted chains. On ties the element from `left` goes first.
fn merge(
    mut left: Option<NonNull<Element>>,
    mut right: Option<NonNull<Element>>,
) -> Option<NonNull<Element>> {
    let mut head: Option<NonNull<Element>> = None;
    let mut last: Option<NonNull<Element>> = None;

    loop {
        let (node, done) = match (left, right) {
            (Some(l), Some(r)) => {
                // SAFETY: l and r are distinct live elements of the chain.
                let take_left = unsafe { l.as_ref().value <= r.as_ref().value };
                if take_left {
                    left = unsafe { l.as_ref() }.next;
                    (l, false)
                } else {
                    right = unsafe { r.as_ref() }.next;
                    (r, false)
                }
            }
            (Some(rest), None) | (None, Some(rest)) => (rest, true),
            (None, None) => break,
        };

        match last {
            None => head = Some(node),
            // SAFETY: last is a live element already placed in the output.
            Some(mut prev) => unsafe { prev.as_mut().next = Some(node) },
        }
        last = Some(node);

        if done {
            break;
        }
    }

    head
}
