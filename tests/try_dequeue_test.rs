use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use turnstile::{TicketQueue, TryDequeueError};

#[test]
fn test_empty_try_dequeue() {
    let q: TicketQueue<i32> = TicketQueue::new();
    assert_eq!(q.try_dequeue(), Err(TryDequeueError::Empty));
    assert_eq!(q.try_dequeue(), Err(TryDequeueError::Empty));
    assert_eq!(q.visited(), 0);
}

#[test]
fn test_failed_attempts_return_their_tickets() {
    let q: TicketQueue<i32> = TicketQueue::new();
    for _ in 0..1000 {
        assert_eq!(q.try_dequeue(), Err(TryDequeueError::Empty));
    }
    let stats = q.stats();
    assert_eq!(stats.next_ticket, 0);
    assert_eq!(stats.serving_ticket, 0);
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_no_ticket_leak_before_blocking_consumer() {
    let q = Arc::new(TicketQueue::new());
    for _ in 0..64 {
        assert!(q.try_dequeue().is_err());
    }
    q.enqueue(7).unwrap();

    // A fresh blocking consumer must be served straight away instead of
    // waiting behind 64 phantom tickets.
    let (tx, rx) = mpsc::channel();
    let q2 = q.clone();
    let consumer = thread::spawn(move || {
        tx.send(q2.dequeue()).unwrap();
    });

    let got = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("blocking consumer stalled behind leaked tickets");
    assert_eq!(got, Ok(7));
    consumer.join().unwrap();
    assert_eq!(q.stats().next_ticket, 1);
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_no_ticket_leak_while_consumer_waits() {
    let q = Arc::new(TicketQueue::new());
    let q2 = q.clone();
    let consumer = thread::spawn(move || q2.dequeue());

    while q.waiting() == 0 {
        thread::yield_now();
    }
    for _ in 0..100 {
        assert_eq!(q.try_dequeue(), Err(TryDequeueError::Empty));
    }
    q.enqueue(1).unwrap();
    assert_eq!(consumer.join().unwrap(), Ok(1));

    // The polled tickets left no gap for the next caller either.
    q.enqueue(2).unwrap();
    assert_eq!(q.try_dequeue(), Ok(2));
}

#[test]
fn test_try_dequeue_returns_immediately() {
    let q: TicketQueue<u64> = TicketQueue::new();
    let budget = Duration::from_millis(500);

    let start = Instant::now();
    for _ in 0..10_000 {
        assert_eq!(q.try_dequeue(), Err(TryDequeueError::Empty));
    }
    assert!(
        start.elapsed() < budget,
        "10k empty polls took {:?}",
        start.elapsed()
    );
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_try_dequeue_does_not_block_behind_waiters() {
    let q = Arc::new(TicketQueue::<u32>::new());
    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let q = q.clone();
            thread::spawn(move || q.dequeue())
        })
        .collect();
    while q.waiting() < 4 {
        thread::yield_now();
    }

    let start = Instant::now();
    assert_eq!(q.try_dequeue(), Err(TryDequeueError::Empty));
    assert!(start.elapsed() < Duration::from_millis(100));

    for i in 0..4 {
        q.enqueue(i).unwrap();
    }
    let mut got: Vec<_> = waiters.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
    got.sort();
    assert_eq!(got, vec![0, 1, 2, 3]);
}

#[test]
fn test_success_takes_the_head() {
    let q = TicketQueue::new();
    q.enqueue('a').unwrap();
    q.enqueue('b').unwrap();
    assert_eq!(q.try_dequeue(), Ok('a'));
    assert_eq!(q.len(), 1);
    assert_eq!(q.visited(), 1);
    assert_eq!(q.stats().serving_ticket, 1);
}

#[test]
fn test_error_messages() {
    assert_eq!(TryDequeueError::Empty.to_string(), "queue is empty");
    assert_eq!(
        TryDequeueError::Busy.to_string(),
        "earlier tickets are still waiting to be served"
    );
    assert_eq!(TryDequeueError::Destroyed.to_string(), "queue has been destroyed");
}
