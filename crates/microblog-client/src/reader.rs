//! Synchronous driver for [`FeedWalker`].

use std::collections::VecDeque;

use microblog_proto::limits::DEFAULT_PAGE_CAP;

use crate::{
    error::ClientError,
    store::FeedStore,
    verify::{VerifiedMessage, Verifier},
    walker::{FeedWalker, WalkAction, WalkEnd, WalkEvent, WalkRequest},
};

/// Outcome of a completed walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    /// Messages handed to the caller
    pub emitted: usize,
    /// Page requests made (not counting the head lookup)
    pub pages: usize,
    /// Why the walk stopped
    pub end: WalkEnd,
}

/// Reads verified messages from a [`FeedStore`].
#[derive(Debug)]
pub struct FeedReader<S> {
    store: S,
    verifier: Verifier,
    page_cap: usize,
}

impl<S: FeedStore> FeedReader<S> {
    /// Reader with the default page cap.
    pub fn new(store: S, verifier: Verifier) -> Self {
        Self { store, verifier, page_cap: DEFAULT_PAGE_CAP }
    }

    /// Override the page cap. 0 is treated as 1.
    #[must_use]
    pub fn with_page_cap(mut self, page_cap: usize) -> Self {
        self.page_cap = page_cap.max(1);
        self
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Walk the feed, calling `on_message` for each verified message in
    /// descending id order.
    ///
    /// Stops at the first error from the store, verification or the
    /// callback. Messages already passed to `on_message` stay delivered.
    pub fn walk<F>(&self, request: WalkRequest, mut on_message: F) -> Result<WalkSummary, ClientError>
    where
        F: FnMut(VerifiedMessage) -> Result<(), ClientError>,
    {
        let mut walker = FeedWalker::new(&self.verifier, request, self.page_cap);
        let mut queue: VecDeque<WalkAction> = walker.start().into();
        let mut emitted = 0;

        while let Some(action) = queue.pop_front() {
            match action {
                WalkAction::FetchLatest => {
                    let latest = self.store.latest(1)?;
                    queue.extend(walker.handle(WalkEvent::Latest(latest))?);
                },
                WalkAction::FetchPage { limit, next } => {
                    let page = self.store.page(limit, next)?;
                    queue.extend(walker.handle(WalkEvent::Page(page))?);
                },
                WalkAction::Emit(message) => {
                    emitted += 1;
                    on_message(message)?;
                },
                WalkAction::Finish(end) => {
                    let summary = WalkSummary { emitted, pages: walker.pages(), end };
                    tracing::info!(emitted, pages = summary.pages, ?end, "walk finished");
                    return Ok(summary);
                },
            }
        }

        Err(ClientError::Protocol("walk stopped without finishing".to_string()))
    }

    /// Walk the feed and collect the verified messages.
    pub fn collect(&self, request: WalkRequest) -> Result<Vec<VerifiedMessage>, ClientError> {
        let mut messages = Vec::new();
        self.walk(request, |message| {
            messages.push(message);
            Ok(())
        })?;
        Ok(messages)
    }
}
