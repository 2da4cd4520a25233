//! Command queue: one request on the wire at a time.
//!
//! The receiver answers strictly in order and cannot tell replies apart, so
//! requests are written one by one. Each [`PendingRequest`] carries a oneshot
//! sender that is completed exactly once: by the matching reply, by its timer,
//! by a write failure, or by [`CommandQueue::drain`].
//!
//! The queue itself does no I/O. The connection driver asks it for the next
//! bytes to write ([`CommandQueue::promote`]), feeds it parsed frames
//! ([`CommandQueue::resolve`]) and wakes it when a timer is due
//! ([`CommandQueue::expire`]).
//!
//! ```text
//! push ─► waiting (FIFO) ─► promote ─► in flight ─► resolve / expire
//!                                                     │
//!               frame with nothing in flight ◄────────┘ returned as status
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::error::{ArcamError, Result};
use crate::protocol::{answer, Frame};

/// Sender half used to complete a request.
pub type ReplySender = oneshot::Sender<Result<Frame>>;

/// A request waiting for, or awaiting, its reply.
#[derive(Debug)]
pub struct PendingRequest {
    /// Sequence number, for logging.
    id: u64,
    /// Encoded frame to write.
    bytes: Bytes,
    /// Completion handle.
    reply: ReplySender,
    /// When the request times out.
    deadline: Instant,
}

impl PendingRequest {
    fn complete(self, result: Result<Frame>) {
        if self.reply.send(result).is_err() {
            tracing::trace!(id = self.id, "Caller dropped before reply");
        }
    }
}

/// FIFO of pending requests with a single in-flight slot.
#[derive(Debug)]
pub struct CommandQueue {
    waiting: VecDeque<PendingRequest>,
    in_flight: Option<PendingRequest>,
    /// Earliest time the next request may be written.
    ready_at: Option<Instant>,
    timeout: Duration,
    gap: Duration,
    next_id: u64,
}

impl CommandQueue {
    /// Create an empty queue.
    ///
    /// `timeout` bounds each request from the moment it is pushed; `gap` is
    /// the pause after each reply before the next write.
    pub fn new(timeout: Duration, gap: Duration) -> Self {
        Self {
            waiting: VecDeque::new(),
            in_flight: None,
            ready_at: None,
            timeout,
            gap,
            next_id: 1,
        }
    }

    /// Append a request to the tail of the queue. Returns its sequence number.
    pub fn push(&mut self, bytes: Bytes, reply: ReplySender, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.waiting.push_back(PendingRequest {
            id,
            bytes,
            reply,
            deadline: now + self.timeout,
        });
        id
    }

    /// Move the head of the queue in flight and return the bytes to write.
    ///
    /// Returns `None` while a request is in flight, during the post-reply
    /// gap, or when nothing is waiting. Requests whose caller has gone away
    /// are skipped.
    pub fn promote(&mut self, now: Instant) -> Option<Bytes> {
        if self.in_flight.is_some() {
            return None;
        }
        if self.ready_at.is_some_and(|at| at > now) {
            return None;
        }
        self.ready_at = None;

        while let Some(request) = self.waiting.pop_front() {
            if request.reply.is_closed() {
                tracing::trace!(id = request.id, "Skipping abandoned request");
                continue;
            }
            tracing::trace!(id = request.id, bytes = ?&request.bytes[..], "Promoting request");
            let bytes = request.bytes.clone();
            self.in_flight = Some(request);
            return Some(bytes);
        }

        None
    }

    /// Reject the in-flight request because its bytes could not be written.
    ///
    /// The next request may be promoted straight away.
    pub fn write_failed(&mut self, error: ArcamError) {
        if let Some(request) = self.in_flight.take() {
            tracing::debug!(id = request.id, %error, "Write failed");
            request.complete(Err(error));
        }
    }

    /// Offer a parsed frame to the in-flight request.
    ///
    /// Error-coded frames reject the request, anything else resolves it.
    /// When nothing is in flight the frame is unsolicited and handed back.
    pub fn resolve(&mut self, frame: Frame, now: Instant) -> Option<Frame> {
        let Some(request) = self.in_flight.take() else {
            return Some(frame);
        };

        self.ready_at = Some(now + self.gap);

        if frame.is_error() {
            tracing::debug!(
                id = request.id,
                code = frame.answer,
                "Receiver rejected command"
            );
            request.complete(Err(ArcamError::Device {
                code: frame.answer,
                message: answer::error_message(frame.answer),
            }));
        } else {
            tracing::trace!(id = request.id, "Request resolved");
            request.complete(Ok(frame));
        }

        None
    }

    /// Reject every request whose timer has fired. Returns how many expired.
    pub fn expire(&mut self, now: Instant) -> usize {
        let mut expired = 0;

        if self.in_flight.as_ref().is_some_and(|r| r.deadline <= now) {
            if let Some(request) = self.in_flight.take() {
                tracing::debug!(id = request.id, "In-flight request timed out");
                request.complete(Err(ArcamError::CommandTimeout(self.timeout)));
                expired += 1;
            }
        }

        while self.waiting.front().is_some_and(|r| r.deadline <= now) {
            if let Some(request) = self.waiting.pop_front() {
                tracing::debug!(id = request.id, "Queued request timed out");
                request.complete(Err(ArcamError::CommandTimeout(self.timeout)));
                expired += 1;
            }
        }

        expired
    }

    /// Earliest instant at which [`expire`](Self::expire) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let in_flight = self.in_flight.as_ref().map(|r| r.deadline);
        let waiting = self.waiting.front().map(|r| r.deadline);
        match (in_flight, waiting) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Instant at which a waiting request becomes eligible for promotion,
    /// if the queue is currently held back by the post-reply gap.
    pub fn ready_at(&self) -> Option<Instant> {
        if self.in_flight.is_some() || self.waiting.is_empty() {
            return None;
        }
        self.ready_at
    }

    /// Reject every queued and in-flight request with a disconnect error.
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        if let Some(request) = self.in_flight.take() {
            request.complete(Err(ArcamError::Disconnected));
            drained += 1;
        }
        for request in self.waiting.drain(..) {
            request.complete(Err(ArcamError::Disconnected));
            drained += 1;
        }
        self.ready_at = None;
        if drained > 0 {
            tracing::debug!(count = drained, "Drained command queue");
        }
        drained
    }

    /// Number of requests not yet completed, including the in-flight one.
    pub fn len(&self) -> usize {
        self.waiting.len() + usize::from(self.in_flight.is_some())
    }

    /// Check if no request is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a request is on the wire awaiting its reply.
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}
