//! Bounded command queue between input capture and the executor
//!
//! Capture side pushes with [`CommandQueue::try_enqueue`], which never
//! blocks and reports a full queue instead. The executor side suspends on
//! [`CommandQueue::dequeue`] until a request is available. Ordering is
//! strictly FIFO.
//!
//! [`CommandQueue::submit_blocking`] tags its request with a ticket and waits
//! for the executor to hand back the outcome for that ticket. Only one
//! blocking submitter at a time is supported.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::command::{Action, Command};
use crate::executor::Outcome;

/// Default queue depth
pub const QUEUE_CAPACITY: usize = 16;

/// Returned when a non-blocking enqueue finds the queue full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull;

/// A queued command, optionally awaited by its submitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Request {
    pub command: Command,
    /// Set when a caller is waiting for the outcome
    pub ticket: Option<u16>,
}

impl Request {
    fn fire_and_forget(command: Command) -> Self {
        Self {
            command,
            ticket: None,
        }
    }
}

/// Fixed-capacity FIFO of command requests
pub struct CommandQueue<M: RawMutex, const N: usize = QUEUE_CAPACITY> {
    requests: Channel<M, Request, N>,
    completed: Signal<M, (u16, Outcome)>,
    next_ticket: Mutex<M, Cell<u16>>,
}

impl<M: RawMutex, const N: usize> CommandQueue<M, N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            requests: Channel::new(),
            completed: Signal::new(),
            next_ticket: Mutex::new(Cell::new(0)),
        }
    }

    /// Append a command without waiting
    ///
    /// On a full queue the command is dropped and the contents are left
    /// unchanged.
    pub fn try_enqueue(&self, command: Command) -> Result<(), QueueFull> {
        self.requests
            .try_send(Request::fire_and_forget(command))
            .map_err(|_| QueueFull)
    }

    /// Build and append a command without waiting
    pub fn submit(&self, action: Action, arg: i16) -> Result<(), QueueFull> {
        self.try_enqueue(Command::new(action, arg))
    }

    /// Append a command, waiting for space if the queue is full
    pub async fn enqueue_blocking(&self, command: Command) {
        self.requests.send(Request::fire_and_forget(command)).await;
    }

    /// Remove the oldest request, waiting until one is available
    pub async fn dequeue(&self) -> Request {
        self.requests.receive().await
    }

    /// Append a command and wait for the executor's outcome
    pub async fn submit_blocking(&self, action: Action, arg: i16) -> Outcome {
        let ticket = self.next_ticket.lock(|next| {
            let ticket = next.get();
            next.set(ticket.wrapping_add(1));
            ticket
        });

        self.requests
            .send(Request {
                command: Command::new(action, arg),
                ticket: Some(ticket),
            })
            .await;

        loop {
            let (done, outcome) = self.completed.wait().await;
            if done == ticket {
                return outcome;
            }
        }
    }

    /// Hand the outcome of a ticketed request back to its submitter
    pub fn complete(&self, ticket: u16, outcome: Outcome) {
        self.completed.signal((ticket, outcome));
    }

    /// Number of queued requests
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns true if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Maximum number of queued requests
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<M: RawMutex, const N: usize> Default for CommandQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}
