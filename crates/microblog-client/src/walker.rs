//! Feed walker state machine.
//!
//! Walks the feed backwards from a start id, newest first, in bounded pages.
//! Uses the action pattern: the walker never performs I/O. The driver
//! ([`crate::reader::FeedReader`] in production, tests directly) executes the
//! returned actions and feeds store responses back in as events.
//!
//! # State Machine
//!
//! ```text
//! ┌───────────┐  Latest   ┌────────┐  Page (more wanted)
//! │ Resolving │──────────>│ Paging │<──────────┐
//! └───────────┘           └────────┘───────────┘
//!       │ empty feed          │ satisfied / exhausted
//!       ↓                     ↓
//!   ┌──────┐              ┌──────┐
//!   │ Done │              │ Done │
//!   └──────┘              └──────┘
//! ```
//!
//! # Invariants
//!
//! - Messages are emitted in strictly descending id order, no duplicates
//! - A message is emitted only after its whole page verified
//! - Only ids ≤ the resolved start are ever emitted, so messages published
//!   during the walk are excluded
//! - At most `count` messages are emitted

use microblog_proto::{Message, MessageId};

use crate::{
    error::ClientError,
    verify::{VerifiedMessage, Verifier},
};

/// What to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkRequest {
    /// Highest id to start from. `None` or an id above the head starts at
    /// the head.
    pub start: Option<MessageId>,
    /// Maximum number of messages to emit
    pub count: usize,
}

impl WalkRequest {
    /// Walk `count` messages back from the head.
    pub fn latest(count: usize) -> Self {
        Self { start: None, count }
    }
}

/// Walker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// Waiting for the latest message to learn the head id
    Resolving,
    /// Waiting for a page at the cursor
    Paging,
    /// Finished or aborted
    Done,
}

/// Why a walk finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEnd {
    /// Requested number of messages emitted
    Satisfied,
    /// Feed ran out before the count was reached
    Exhausted,
    /// Feed has no messages
    EmptyFeed,
}

/// Store responses fed into the walker.
#[derive(Debug, Clone)]
pub enum WalkEvent {
    /// Response to [`WalkAction::FetchLatest`]
    Latest(Vec<Message>),
    /// Response to [`WalkAction::FetchPage`]
    Page(Vec<Message>),
}

/// Actions the driver must execute, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkAction {
    /// Fetch the single most recent message
    FetchLatest,
    /// Fetch up to `limit` messages with id ≤ `next`, newest first
    FetchPage {
        /// Page size
        limit: usize,
        /// Highest id wanted
        next: MessageId,
    },
    /// Hand a verified message to the caller
    Emit(VerifiedMessage),
    /// Walk finished
    Finish(WalkEnd),
}

/// Sans-IO backward pager over a feed store.
#[derive(Debug)]
pub struct FeedWalker<'v> {
    verifier: &'v Verifier,
    request: WalkRequest,
    page_cap: usize,
    state: WalkState,
    cursor: Option<MessageId>,
    remaining: usize,
    requested: usize,
    pages: usize,
    end: Option<WalkEnd>,
}

impl<'v> FeedWalker<'v> {
    /// Create a walker. A `page_cap` of 0 is treated as 1.
    pub fn new(verifier: &'v Verifier, request: WalkRequest, page_cap: usize) -> Self {
        Self {
            verifier,
            request,
            page_cap: page_cap.max(1),
            state: WalkState::Resolving,
            cursor: None,
            remaining: request.count,
            requested: 0,
            pages: 0,
            end: None,
        }
    }

    /// First actions of the walk.
    pub fn start(&mut self) -> Vec<WalkAction> {
        if self.request.count == 0 {
            return vec![self.finish(WalkEnd::Satisfied)];
        }
        vec![WalkAction::FetchLatest]
    }

    /// Process a store response and return the next actions.
    ///
    /// Any error aborts the walk: the walker moves to `Done` and nothing
    /// from the offending response is emitted.
    pub fn handle(&mut self, event: WalkEvent) -> Result<Vec<WalkAction>, ClientError> {
        let result = match (self.state, event) {
            (WalkState::Resolving, WalkEvent::Latest(messages)) => self.handle_latest(messages),
            (WalkState::Paging, WalkEvent::Page(messages)) => self.handle_page(messages),
            (state, event) => Err(ClientError::Protocol(format!(
                "unexpected {} response while {state:?}",
                match event {
                    WalkEvent::Latest(_) => "latest",
                    WalkEvent::Page(_) => "page",
                }
            ))),
        };

        if result.is_err() {
            self.state = WalkState::Done;
        }
        result
    }

    /// Current state.
    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Highest id still wanted. `None` until the start is resolved.
    pub fn cursor(&self) -> Option<MessageId> {
        self.cursor
    }

    /// Messages still wanted.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Pages received so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// How the walk ended. `None` while running or after an error.
    pub fn end(&self) -> Option<WalkEnd> {
        self.end
    }

    fn handle_latest(&mut self, messages: Vec<Message>) -> Result<Vec<WalkAction>, ClientError> {
        if messages.len() > 1 {
            return Err(ClientError::Protocol(format!(
                "asked for 1 latest message, got {}",
                messages.len()
            )));
        }

        let Some(latest) = messages.into_iter().next() else {
            return Ok(vec![self.finish(WalkEnd::EmptyFeed)]);
        };

        let head = self.verifier.verify(latest)?.id();
        if head == 0 {
            return Err(ClientError::Protocol("message id 0 is not a valid id".to_string()));
        }

        let start = self.request.start.filter(|&s| s <= head).unwrap_or(head);
        tracing::debug!(head, start, "resolved walk start");

        self.cursor = Some(start);
        if start == 0 {
            return Ok(vec![self.finish(WalkEnd::Exhausted)]);
        }

        self.state = WalkState::Paging;
        Ok(vec![self.fetch_page(start)])
    }

    fn handle_page(&mut self, messages: Vec<Message>) -> Result<Vec<WalkAction>, ClientError> {
        let mut cursor = self.cursor.unwrap_or_default();

        if messages.len() > self.requested {
            return Err(ClientError::Protocol(format!(
                "asked for {} messages, got {}",
                self.requested,
                messages.len()
            )));
        }

        // Check the whole page before emitting any of it.
        let mut verified = Vec::with_capacity(messages.len());
        for message in messages {
            let id = message
                .id
                .ok_or_else(|| ClientError::Protocol("stored message has no message-id".into()))?;
            if id == 0 || id > cursor {
                return Err(ClientError::Protocol(format!(
                    "message {id} out of order, expected id at most {cursor}"
                )));
            }
            verified.push(self.verifier.verify(message)?);
            cursor = id - 1;
        }

        self.pages += 1;
        let short = verified.len() < self.requested;
        tracing::debug!(page = self.pages, received = verified.len(), cursor, "page verified");

        let mut actions = Vec::with_capacity(verified.len() + 1);
        for message in verified {
            self.remaining -= 1;
            actions.push(WalkAction::Emit(message));
        }
        self.cursor = Some(cursor);

        if self.remaining == 0 {
            actions.push(self.finish(WalkEnd::Satisfied));
        } else if short || cursor == 0 {
            actions.push(self.finish(WalkEnd::Exhausted));
        } else {
            actions.push(self.fetch_page(cursor));
        }

        Ok(actions)
    }

    fn fetch_page(&mut self, next: MessageId) -> WalkAction {
        self.requested = self.remaining.min(self.page_cap);
        WalkAction::FetchPage { limit: self.requested, next }
    }

    fn finish(&mut self, end: WalkEnd) -> WalkAction {
        self.state = WalkState::Done;
        self.end = Some(end);
        WalkAction::Finish(end)
    }
}
