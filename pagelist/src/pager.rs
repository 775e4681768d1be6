use crate::key::KeySet;
use crate::{Editable, ListContext, PagedItem, PagedSource, SourceError, Timestamp};

/// Which page a [`PageRequest`] asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageKind {
    First,
    Next,
}

/// A fetch issued by a [`CursorPager`], to be answered with [`CursorPager::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRequest {
    pub kind: PageKind,
    /// Only items created strictly before this are wanted (`None`: newest first page).
    pub before: Option<Timestamp>,
    pub take: usize,
    /// Pager generation at issue time; a reset makes older requests stale.
    pub generation: u64,
    /// Issue sequence number. Only the outstanding request may complete or cancel.
    pub id: u64,
}

/// Why a fetch was not issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Skip {
    /// Another request is still outstanding.
    InFlight,
    /// A search or predicate is active; paging is client-side only.
    Filtering,
    /// No first page has been loaded yet.
    NoCursor,
    /// The last page came back short.
    Exhausted,
}

/// Result of a page fetch that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageOutcome {
    Applied {
        /// Items the source returned.
        received: usize,
        /// Items actually added to the loaded set.
        added: usize,
        has_more: bool,
    },
    /// Nothing was requested.
    Skipped(Skip),
    /// The response belonged to an older context, or to a request that is no longer
    /// outstanding, and was dropped.
    Stale,
}

impl PageOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Fetches items newest-first in bounded pages, remembering the oldest creation time seen.
///
/// The pager owns the loaded set. Optimistic mutations go through [`Self::prepend`],
/// [`Self::replace`] and [`Self::remove`] so the key index stays consistent.
#[derive(Clone, Debug)]
pub struct CursorPager<T: PagedItem> {
    items: Vec<T>,
    keys: KeySet<T::Key>,
    cursor: Option<Timestamp>,
    has_more: bool,
    paused: bool,
    in_flight: Option<u64>,
    last_request: u64,
    generation: u64,
    revision: u64,
}

impl<T: PagedItem> Default for CursorPager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PagedItem> CursorPager<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            keys: KeySet::default(),
            cursor: None,
            has_more: true,
            paused: false,
            in_flight: None,
            last_request: 0,
            generation: 0,
            revision: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> Option<Timestamp> {
        self.cursor
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Bumped on every change to the loaded set.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.keys.contains(key)
    }

    /// Suspends (or resumes) server paging, e.g. while a client-side filter is active.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            ptrace!(paused, "CursorPager::set_paused");
            self.paused = paused;
        }
    }

    /// Drops all loaded items and forgets the cursor. Outstanding requests become stale.
    pub fn reset(&mut self) {
        pdebug!(
            generation = self.generation,
            loaded = self.items.len(),
            "CursorPager::reset"
        );
        self.items.clear();
        self.keys.clear();
        self.cursor = None;
        self.has_more = true;
        self.in_flight = None;
        self.generation = self.generation.wrapping_add(1);
        self.bump();
    }

    /// Starts a request for the `take` newest items.
    pub fn begin_first_page(&mut self, take: usize) -> Result<PageRequest, Skip> {
        self.check_can_fetch()?;
        Ok(self.issue(PageKind::First, None, take))
    }

    /// Starts a request for `take` items strictly older than the cursor.
    pub fn begin_next_page(&mut self, take: usize) -> Result<PageRequest, Skip> {
        self.check_can_fetch()?;
        let Some(cursor) = self.cursor else {
            return Err(Skip::NoCursor);
        };
        if !self.has_more {
            return Err(Skip::Exhausted);
        }
        Ok(self.issue(PageKind::Next, Some(cursor), take))
    }

    fn check_can_fetch(&self) -> Result<(), Skip> {
        if self.in_flight.is_some() {
            return Err(Skip::InFlight);
        }
        if self.paused {
            return Err(Skip::Filtering);
        }
        Ok(())
    }

    fn issue(&mut self, kind: PageKind, before: Option<Timestamp>, take: usize) -> PageRequest {
        let take = take.max(1);
        self.last_request = self.last_request.wrapping_add(1);
        let id = self.last_request;
        self.in_flight = Some(id);
        ptrace!(?kind, ?before, take, id, generation = self.generation, "CursorPager: issue");
        PageRequest {
            kind,
            before,
            take,
            generation: self.generation,
            id,
        }
    }

    /// Whether `request` is the one currently awaiting an answer.
    pub fn is_outstanding(&self, request: &PageRequest) -> bool {
        request.generation == self.generation && self.in_flight == Some(request.id)
    }

    /// Abandons `request` so a new fetch may be issued. Returns `false` (and changes nothing) if
    /// it is not the outstanding request.
    pub fn cancel(&mut self, request: &PageRequest) -> bool {
        if !self.is_outstanding(request) {
            return false;
        }
        pdebug!(kind = ?request.kind, id = request.id, "CursorPager: request cancelled");
        self.in_flight = None;
        true
    }

    /// Applies the answer to `request`.
    ///
    /// A failure leaves items, cursor and `has_more` untouched and is returned to the caller.
    /// Responses to anything but the outstanding request (from before the last [`Self::reset`],
    /// cancelled, or already applied) are dropped as [`PageOutcome::Stale`], errors included.
    pub fn complete(
        &mut self,
        request: &PageRequest,
        result: Result<Vec<T>, SourceError>,
    ) -> Result<PageOutcome, SourceError> {
        if !self.is_outstanding(request) {
            pdebug!(
                id = request.id,
                request_generation = request.generation,
                generation = self.generation,
                "CursorPager: dropping stale response"
            );
            return Ok(PageOutcome::Stale);
        }
        self.in_flight = None;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                pwarn!(kind = ?request.kind, error = %err, "CursorPager: fetch failed");
                return Err(err);
            }
        };

        let received = page.len();
        if request.kind == PageKind::First {
            self.items.clear();
            self.keys.clear();
            self.cursor = None;
        }

        let mut added = 0usize;
        let mut last_in_order = None;
        for item in page {
            let created_at = item.created_at();
            if let Some(before) = request.before {
                if created_at >= before {
                    pwarn!(
                        %created_at,
                        %before,
                        "CursorPager: source returned an item not older than the cursor"
                    );
                    continue;
                }
            }
            last_in_order = Some(created_at);

            let key = item.key();
            if self.keys.contains(&key) {
                pwarn!(?key, "CursorPager: dropping duplicate key");
                continue;
            }
            self.keys.insert(key);
            self.items.push(item);
            added += 1;
        }

        if let Some(ts) = last_in_order {
            self.cursor = Some(ts);
        }
        self.has_more = received >= request.take;
        if request.kind == PageKind::Next && last_in_order.is_none() && received > 0 {
            // Nothing usable came back; asking again would repeat the same page.
            self.has_more = false;
        }
        self.bump();

        pdebug!(
            kind = ?request.kind,
            received,
            added,
            has_more = self.has_more,
            cursor = ?self.cursor,
            "CursorPager: page applied"
        );
        Ok(PageOutcome::Applied {
            received,
            added,
            has_more: self.has_more,
        })
    }

    /// Inserts a freshly created item at the front. Cursor and `has_more` are untouched.
    ///
    /// If the key is already loaded the existing entry is replaced instead.
    pub fn prepend(&mut self, item: T) {
        let key = item.key();
        if self.keys.contains(&key) {
            self.replace(&key, item);
            return;
        }
        self.keys.insert(key);
        self.items.insert(0, item);
        self.bump();
    }

    /// Replaces the item with `key` in place. Returns `false` if it is not loaded.
    pub fn replace(&mut self, key: &T::Key, item: T) -> bool {
        let Some(slot) = self.items.iter_mut().find(|it| &it.key() == key) else {
            return false;
        };
        let new_key = item.key();
        *slot = item;
        if &new_key != key {
            self.keys.remove(key);
            self.keys.insert(new_key);
        }
        self.bump();
        true
    }

    /// Removes the item with `key`.
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        if !self.keys.remove(key) {
            return None;
        }
        let pos = self.items.iter().position(|it| &it.key() == key)?;
        self.bump();
        Some(self.items.remove(pos))
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl<T: Editable> CursorPager<T> {
    /// Loads the `take` newest items from `source`, replacing the loaded set.
    pub async fn fetch_first_page(
        &mut self,
        source: &dyn PagedSource<T>,
        context: &ListContext,
        take: usize,
    ) -> Result<PageOutcome, SourceError> {
        let request = match self.begin_first_page(take) {
            Ok(request) => request,
            Err(skip) => return Ok(PageOutcome::Skipped(skip)),
        };
        let result = source.fetch_page(context, None, request.take).await;
        self.complete(&request, result)
    }

    /// Appends the next `take` older items from `source`.
    ///
    /// This is a no-op (no request is issued) without a cursor, once exhausted, or while paused.
    pub async fn fetch_next_page(
        &mut self,
        source: &dyn PagedSource<T>,
        context: &ListContext,
        take: usize,
    ) -> Result<PageOutcome, SourceError> {
        let request = match self.begin_next_page(take) {
            Ok(request) => request,
            Err(skip) => return Ok(PageOutcome::Skipped(skip)),
        };
        let result = source.fetch_page(context, request.before, request.take).await;
        self.complete(&request, result)
    }
}
