use crate::filter::{FilterPipeline, FilteredView};
use crate::{
    Action, Collection, CursorPager, Editable, FilterField, FilterState, ListContext, PageOutcome,
    PageRequest, PagedItem, PagedSource, PermissionGate, Skip, SortDirective, SourceError,
    StoreOptions, StoreSnapshot, Timestamp,
};

/// A page request tagged with the context it was issued for.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageTicket {
    pub context: ListContext,
    pub request: PageRequest,
}

/// Result of a create/update/delete that did not fail at the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The source accepted the write and local state was patched.
    Applied,
    /// The source accepted the write but the item is not in the loaded set.
    NotLoaded,
    /// The permission gate refused; the source was not called.
    Denied(Action),
}

/// Paging, filtering and optimistic mutation state for one collection of one team.
///
/// Owns the loaded set (through a [`CursorPager`]) and derives the visible list through a
/// memoized [`FilterPipeline`]. Nothing else mutates the loaded set or cursor.
///
/// Fetches are split into *request* and *apply* so that a response arriving after the team or
/// tab changed can be recognised and dropped. The `load_*` methods wrap both halves for callers
/// that simply await a [`PagedSource`].
#[derive(Clone, Debug)]
pub struct PagedListStore<T: PagedItem> {
    options: StoreOptions,
    context: ListContext,
    pager: CursorPager<T>,
    pipeline: FilterPipeline,
    filter: FilterState,
    last_error: Option<SourceError>,
}

impl<T: PagedItem> PagedListStore<T> {
    pub fn new(context: ListContext, options: StoreOptions) -> Self {
        pdebug!(%context, page_size = options.page_size, "PagedListStore::new");
        Self {
            pipeline: FilterPipeline::new(options.search_fields.clone()),
            filter: options.default_filter(),
            options,
            context,
            pager: CursorPager::new(),
            last_error: None,
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn context(&self) -> &ListContext {
        &self.context
    }

    /// The loaded set, in fetch order with optimistic patches applied.
    pub fn items(&self) -> &[T] {
        self.pager.items()
    }

    /// The filtered, sorted view. Recomputed only when items or filter changed.
    pub fn filtered_items(&mut self) -> FilteredView<'_, T> {
        self.pipeline
            .view(self.pager.items(), self.pager.revision(), &self.filter)
    }

    pub fn loading(&self) -> bool {
        self.pager.is_loading()
    }

    pub fn has_more(&self) -> bool {
        self.pager.has_more()
    }

    pub fn cursor(&self) -> Option<Timestamp> {
        self.pager.cursor()
    }

    pub fn last_error(&self) -> Option<&SourceError> {
        self.last_error.as_ref()
    }

    pub fn pager(&self) -> &CursorPager<T> {
        &self.pager
    }

    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn is_filtering(&self) -> bool {
        self.filter.is_filtering()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            context: self.context.clone(),
            loaded: self.pager.len(),
            cursor: self.pager.cursor(),
            has_more: self.pager.has_more(),
            loading: self.pager.is_loading(),
            filtering: self.filter.is_filtering(),
            error: self.last_error.as_ref().map(ToString::to_string),
        }
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
        self.sync_paused();
    }

    pub fn update_filter(&mut self, f: impl FnOnce(&mut FilterState)) {
        f(&mut self.filter);
        self.sync_paused();
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.update_filter(|filter| filter.search_text = text.into());
    }

    pub fn set_predicate(&mut self, field: FilterField, value: impl Into<String>) {
        self.update_filter(|filter| {
            filter.predicates.insert(field, value.into());
        });
    }

    pub fn set_sort(&mut self, sort: SortDirective) {
        self.update_filter(|filter| filter.sort = sort);
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(self.options.default_filter());
    }

    fn sync_paused(&mut self) {
        self.pager.set_paused(self.filter.is_filtering());
    }

    /// Starts a first-page fetch for the current context.
    pub fn request_first_page(&mut self) -> Result<PageTicket, Skip> {
        let request = self.pager.begin_first_page(self.options.take())?;
        Ok(self.ticket(request))
    }

    /// Starts a "load more" fetch. Suppressed while loading, filtering, or exhausted.
    pub fn request_next_page(&mut self) -> Result<PageTicket, Skip> {
        let request = self.pager.begin_next_page(self.options.take())?;
        Ok(self.ticket(request))
    }

    fn ticket(&self, request: PageRequest) -> PageTicket {
        PageTicket {
            context: self.context.clone(),
            request,
        }
    }

    /// Applies the response to `ticket`.
    ///
    /// Responses for another team/tab, or from before a reset, are dropped and reported as
    /// [`PageOutcome::Stale`]. A failure is recorded in [`Self::last_error`] and returned;
    /// loaded items, cursor and `has_more` keep their previous values.
    pub fn apply_page(
        &mut self,
        ticket: &PageTicket,
        result: Result<Vec<T>, SourceError>,
    ) -> Result<PageOutcome, SourceError> {
        if ticket.context != self.context {
            pdebug!(
                from = %ticket.context,
                current = %self.context,
                "PagedListStore: dropping response for another context"
            );
            return Ok(PageOutcome::Stale);
        }
        match self.pager.complete(&ticket.request, result) {
            Ok(outcome) => {
                if outcome.is_applied() {
                    self.last_error = None;
                }
                Ok(outcome)
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Abandons `ticket` so a later request can be issued.
    ///
    /// Returns `false` when the ticket is not the outstanding request of the current context.
    pub fn cancel(&mut self, ticket: &PageTicket) -> bool {
        ticket.context == self.context && self.pager.cancel(&ticket.request)
    }

    /// Selects another team and starts loading its first page.
    pub fn switch_team(&mut self, team_id: impl Into<String>) -> Result<PageTicket, Skip> {
        self.context.team_id = team_id.into();
        self.reset()
    }

    /// Selects another tab and starts loading its first page.
    pub fn switch_collection(&mut self, collection: Collection) -> Result<PageTicket, Skip> {
        self.context.collection = collection;
        self.reset()
    }

    /// Clears items, cursor and filter, then starts loading the first page.
    pub fn reset(&mut self) -> Result<PageTicket, Skip> {
        pdebug!(context = %self.context, "PagedListStore::reset");
        self.pager.reset();
        self.filter = self.options.default_filter();
        self.last_error = None;
        self.sync_paused();
        self.request_first_page()
    }
}

impl<T: Editable> PagedListStore<T> {
    /// Fetches and applies the first page.
    pub async fn load_first_page(
        &mut self,
        source: &dyn PagedSource<T>,
    ) -> Result<PageOutcome, SourceError> {
        match self.request_first_page() {
            Ok(ticket) => self.fetch_and_apply(source, ticket).await,
            Err(skip) => Ok(PageOutcome::Skipped(skip)),
        }
    }

    /// Fetches and applies the next page, if one may exist.
    pub async fn load_next_page(
        &mut self,
        source: &dyn PagedSource<T>,
    ) -> Result<PageOutcome, SourceError> {
        match self.request_next_page() {
            Ok(ticket) => self.fetch_and_apply(source, ticket).await,
            Err(skip) => Ok(PageOutcome::Skipped(skip)),
        }
    }

    /// Switches team and loads the new team's first page.
    pub async fn load_team(
        &mut self,
        source: &dyn PagedSource<T>,
        team_id: impl Into<String>,
    ) -> Result<PageOutcome, SourceError> {
        match self.switch_team(team_id) {
            Ok(ticket) => self.fetch_and_apply(source, ticket).await,
            Err(skip) => Ok(PageOutcome::Skipped(skip)),
        }
    }

    /// Awaits `source` for `ticket` and applies the response.
    ///
    /// Dropping the returned future before it finishes cancels the ticket.
    pub async fn fetch_and_apply(
        &mut self,
        source: &dyn PagedSource<T>,
        ticket: PageTicket,
    ) -> Result<PageOutcome, SourceError> {
        let mut pending = PendingTicket {
            store: self,
            ticket: Some(ticket.clone()),
        };
        let result = source
            .fetch_page(&ticket.context, ticket.request.before, ticket.request.take)
            .await;
        pending.ticket = None;
        pending.store.apply_page(&ticket, result)
    }

    /// Creates an item and puts it at the front of the loaded set.
    pub async fn create(
        &mut self,
        source: &dyn PagedSource<T>,
        gate: &dyn PermissionGate,
        draft: T::Draft,
    ) -> Result<MutationOutcome, SourceError> {
        if let Some(denied) = self.check(gate, Action::Create) {
            return Ok(denied);
        }
        let result = source.create_item(&self.context, draft).await;
        let item = self.record(result)?;
        self.pager.prepend(item);
        Ok(MutationOutcome::Applied)
    }

    /// Updates an item and patches the loaded copy in place.
    pub async fn update(
        &mut self,
        source: &dyn PagedSource<T>,
        gate: &dyn PermissionGate,
        key: &T::Key,
        patch: T::Patch,
    ) -> Result<MutationOutcome, SourceError> {
        if let Some(denied) = self.check(gate, Action::Update) {
            return Ok(denied);
        }
        let result = source.update_item(&self.context, key, patch).await;
        let item = self.record(result)?;
        if self.pager.replace(key, item) {
            Ok(MutationOutcome::Applied)
        } else {
            Ok(MutationOutcome::NotLoaded)
        }
    }

    /// Deletes an item and drops it from the loaded set.
    pub async fn delete(
        &mut self,
        source: &dyn PagedSource<T>,
        gate: &dyn PermissionGate,
        key: &T::Key,
    ) -> Result<MutationOutcome, SourceError> {
        if let Some(denied) = self.check(gate, Action::Delete) {
            return Ok(denied);
        }
        let result = source.delete_item(&self.context, key).await;
        self.record(result)?;
        if self.pager.remove(key).is_some() {
            Ok(MutationOutcome::Applied)
        } else {
            Ok(MutationOutcome::NotLoaded)
        }
    }

    fn check(&self, gate: &dyn PermissionGate, action: Action) -> Option<MutationOutcome> {
        if gate.can_perform(action, &self.context) {
            return None;
        }
        pdebug!(%action, context = %self.context, "PagedListStore: permission denied");
        Some(MutationOutcome::Denied(action))
    }

    fn record<R>(&mut self, result: Result<R, SourceError>) -> Result<R, SourceError> {
        if let Err(err) = &result {
            pwarn!(error = %err, context = %self.context, "PagedListStore: mutation failed");
            self.last_error = Some(err.clone());
        }
        result
    }
}

/// Cancels its ticket on drop unless disarmed.
struct PendingTicket<'a, T: PagedItem> {
    store: &'a mut PagedListStore<T>,
    ticket: Option<PageTicket>,
}

impl<T: PagedItem> Drop for PendingTicket<'_, T> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            pdebug!(context = %ticket.context, "PagedListStore: fetch abandoned");
            self.store.cancel(&ticket);
        }
    }
}
