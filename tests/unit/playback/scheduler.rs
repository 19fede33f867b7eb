use super::*;

#[test]
fn requests_are_unique_and_ordered() {
    let mut q = FrameQueue::new();
    let a = q.request_frame();
    let b = q.request_frame();
    assert_ne!(a, b);
    assert!(a < b);
    assert_eq!(q.len(), 2);
    assert_eq!(q.take_due(), vec![a, b]);
    assert!(q.is_empty());
}

#[test]
fn cancel_removes_only_that_request() {
    let mut q = FrameQueue::new();
    let a = q.request_frame();
    let b = q.request_frame();
    q.cancel_frame(a);
    q.cancel_frame(FrameRequestId(999));
    assert_eq!(q.take_due(), vec![b]);
}

#[test]
fn ids_keep_increasing_after_drain() {
    let mut q = FrameQueue::new();
    let a = q.request_frame();
    q.take_due();
    let b = q.request_frame();
    assert!(b > a);
}
