use pagelist::{
    Collection, Editable, MutationOutcome, PageOutcome, PageTicket, PagedItem, PagedListStore,
    PagedSource, PermissionGate, Skip, SourceError, ViewWindow,
};

use crate::{
    Debouncer, ListView, ListViewOptions, LoadMoreTrigger, VisibleRow, apply_anchor,
    capture_first_visible_anchor,
};

/// A framework-neutral controller for one paged list on screen.
///
/// Bundles a [`PagedListStore`], a [`ListView`], a debounced search box and a
/// [`LoadMoreTrigger`]. It does not hold any UI objects. Adapters drive it by calling:
/// - `on_container_height` / `on_scroll` when UI events occur
/// - `on_search_input` on every keystroke and `tick(now_ms)` from a frame/timer tick
/// - `render` to obtain the rows to draw, then `load_more_if_needed` after a scroll
#[derive(Clone, Debug)]
pub struct ListController<T: PagedItem> {
    store: PagedListStore<T>,
    view: ListView,
    search: Debouncer<String>,
    trigger: LoadMoreTrigger,
}

impl<T: PagedItem> ListController<T> {
    pub fn new(store: PagedListStore<T>, view_options: ListViewOptions) -> Self {
        Self {
            store,
            view: ListView::new(view_options),
            search: Debouncer::default(),
            trigger: LoadMoreTrigger::default(),
        }
    }

    pub fn with_search_debounce(mut self, delay_ms: u64) -> Self {
        self.search = Debouncer::new(delay_ms);
        self
    }

    pub fn with_trigger(mut self, trigger: LoadMoreTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn store(&self) -> &PagedListStore<T> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PagedListStore<T> {
        &mut self.store
    }

    pub fn view(&self) -> &ListView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ListView {
        &mut self.view
    }

    pub fn into_store(self) -> PagedListStore<T> {
        self.store
    }

    pub fn on_container_height(&mut self, height: f64) {
        self.view.on_container_height(height);
    }

    pub fn on_scroll(&mut self, offset: f64) {
        self.view.on_scroll(offset);
    }

    /// Records a keystroke in the search box. Applied by [`Self::tick`] after the quiet period.
    pub fn on_search_input(&mut self, text: impl Into<String>, now_ms: u64) {
        self.search.set(text.into(), now_ms);
    }

    pub fn is_search_pending(&self) -> bool {
        self.search.is_pending()
    }

    /// Applies a debounced search value whose quiet period has elapsed.
    ///
    /// Returns `true` when the store's search text changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        match self.search.tick(now_ms) {
            Some(text) => self.apply_search(text),
            None => false,
        }
    }

    /// Applies a pending search value immediately.
    pub fn flush_search(&mut self) -> bool {
        match self.search.flush() {
            Some(text) => self.apply_search(text),
            None => false,
        }
    }

    fn apply_search(&mut self, text: String) -> bool {
        if self.store.filter().search_text == text {
            return false;
        }
        adebug!(search = %text, "ListController: search applied");
        self.store.set_search_text(text);
        true
    }

    /// Calls `f` for every visible row of the filtered view and returns the window used.
    pub fn render(&mut self, f: impl FnMut(VisibleRow<'_, T, T::Key>)) -> ViewWindow {
        let rows = self.store.filtered_items();
        self.view.render(&rows, |item: &T| item.key(), f)
    }

    /// Whether the current viewport is close enough to the end to fetch the next page.
    pub fn wants_more(&mut self) -> bool {
        let count = self.store.filtered_items().len();
        let window = self.view.window(count);
        self.trigger.should_load_store(&window, &self.store)
    }

    /// Selects another team. Scroll position and any pending search are discarded.
    pub fn switch_team(&mut self, team_id: impl Into<String>) -> Result<PageTicket, Skip> {
        self.search.cancel();
        self.view.on_scroll(0.0);
        self.store.switch_team(team_id)
    }

    /// Selects another tab. Scroll position and any pending search are discarded.
    pub fn switch_collection(&mut self, collection: Collection) -> Result<PageTicket, Skip> {
        self.search.cancel();
        self.view.on_scroll(0.0);
        self.store.switch_collection(collection)
    }
}

impl<T: Editable> ListController<T> {
    /// Fetches the next page when [`Self::wants_more`] holds.
    ///
    /// Returns `Ok(None)` when the viewport is not near the end.
    pub async fn load_more_if_needed(
        &mut self,
        source: &dyn PagedSource<T>,
    ) -> Result<Option<PageOutcome>, SourceError> {
        if !self.wants_more() {
            return Ok(None);
        }
        atrace!(loaded = self.store.items().len(), "ListController: near end, loading more");
        self.store.load_next_page(source).await.map(Some)
    }

    /// Creates an item while keeping the row under the viewport's top edge in place.
    pub async fn create_anchored(
        &mut self,
        source: &dyn PagedSource<T>,
        gate: &dyn PermissionGate,
        draft: T::Draft,
    ) -> Result<MutationOutcome, SourceError> {
        let anchor = {
            let rows = self.store.filtered_items();
            capture_first_visible_anchor(&self.view, &rows, |item: &T| item.key())
        };
        let outcome = self.store.create(source, gate, draft).await?;
        if let (MutationOutcome::Applied, Some(anchor)) = (outcome, anchor) {
            let rows = self.store.filtered_items();
            apply_anchor(&mut self.view, &anchor, rows.len(), |key| rows.position_of(key));
        }
        Ok(outcome)
    }
}
