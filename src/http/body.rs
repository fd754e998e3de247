//! Request body delivery.
//!
//! The connection pushes body bytes in as they arrive; the application reads
//! them through the `wsgi.input` handle in its environment.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::{Bytes, BytesMut};
use tokio::sync::Notify;

#[derive(Debug)]
struct BodyState {
    expected: usize,
    received: BytesMut,
    aborted: bool,
}

/// Shared view of one request's body.
///
/// Cloning yields another handle to the same buffer.
#[derive(Debug, Clone)]
pub struct RequestBody {
    state: Rc<RefCell<BodyState>>,
    notify: Rc<Notify>,
}

/// Outcome of pushing bytes into a [`RequestBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// More bytes are still expected.
    Partial,
    /// The declared length has been reached.
    Complete,
    /// The chunk ran past the declared length.
    Overflow,
}

impl RequestBody {
    pub fn new(expected: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(BodyState {
                expected,
                received: BytesMut::with_capacity(expected.min(64 * 1024)),
                aborted: false,
            })),
            notify: Rc::new(Notify::new()),
        }
    }

    /// The declared body length.
    pub fn expected(&self) -> usize {
        self.state.borrow().expected
    }

    /// Number of bytes received so far.
    pub fn len(&self) -> usize {
        self.state.borrow().received.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_complete(&self) -> bool {
        let state = self.state.borrow();
        state.received.len() == state.expected
    }

    pub fn is_aborted(&self) -> bool {
        self.state.borrow().aborted
    }

    /// Copy of the bytes received so far.
    pub fn received(&self) -> Bytes {
        Bytes::copy_from_slice(&self.state.borrow().received)
    }

    /// Waits until the whole body is in and returns it.
    ///
    /// Resolves to `None` if the exchange is torn down before the body is
    /// complete; a body that was already complete is still returned.
    pub async fn read_to_end(&self) -> Option<Bytes> {
        loop {
            let notified = self.notify.notified();
            {
                let state = self.state.borrow();
                if state.received.len() == state.expected {
                    return Some(Bytes::copy_from_slice(&state.received));
                }
                if state.aborted {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Appends a chunk, refusing anything past the declared length.
    ///
    /// On overflow nothing is appended.
    pub(crate) fn deliver(&self, chunk: &[u8]) -> Delivery {
        let delivery = {
            let mut state = self.state.borrow_mut();
            if state.received.len() + chunk.len() > state.expected {
                Delivery::Overflow
            } else {
                state.received.extend_from_slice(chunk);
                if state.received.len() == state.expected {
                    Delivery::Complete
                } else {
                    Delivery::Partial
                }
            }
        };
        if delivery == Delivery::Complete {
            self.notify.notify_waiters();
        }
        delivery
    }

    /// Marks the body as abandoned and wakes any reader.
    pub(crate) fn abort(&self) {
        self.state.borrow_mut().aborted = true;
        self.notify.notify_waiters();
    }
}
