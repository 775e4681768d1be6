use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{Editable, ListContext, Note, PagedItem, SourceError, Task, Timestamp, Todo};

/// The document-store contract consumed by the pager and store.
///
/// One implementation per backend; entity types differ only in field mapping, which lives in
/// [`Editable`].
#[async_trait]
pub trait PagedSource<T: Editable>: Send + Sync {
    /// Returns at most `take` items in strictly descending creation order, all created strictly
    /// before `before` (unconstrained when `None`).
    async fn fetch_page(
        &self,
        context: &ListContext,
        before: Option<Timestamp>,
        take: usize,
    ) -> Result<Vec<T>, SourceError>;

    async fn create_item(&self, context: &ListContext, draft: T::Draft) -> Result<T, SourceError>;

    async fn update_item(
        &self,
        context: &ListContext,
        key: &T::Key,
        patch: T::Patch,
    ) -> Result<T, SourceError>;

    async fn delete_item(&self, context: &ListContext, key: &T::Key) -> Result<(), SourceError>;
}

/// An in-process [`PagedSource`] keeping each context's items in memory.
///
/// Like a real document store it assigns ids and creation times itself: `build` receives a
/// per-source sequence number and the creation time for every created item. Useful for demos
/// and tests: it counts fetches and can be told to fail the next one.
pub struct MemorySource<T: Editable> {
    inner: Mutex<Inner<T>>,
    build: Box<dyn Fn(u64, Timestamp, T::Draft) -> T + Send + Sync>,
}

struct Inner<T> {
    collections: HashMap<ListContext, Vec<T>>,
    seq: u64,
    clock: i64,
    fetches: usize,
    fail_next: Option<SourceError>,
}

impl<T: Editable> fmt::Debug for MemorySource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemorySource")
            .field("contexts", &inner.collections.len())
            .field("seq", &inner.seq)
            .field("fetches", &inner.fetches)
            .finish_non_exhaustive()
    }
}

impl<T: Editable> MemorySource<T> {
    pub fn new(build: impl Fn(u64, Timestamp, T::Draft) -> T + Send + Sync + 'static) -> Self {
        Self {
            inner: Mutex::new(Inner {
                collections: HashMap::new(),
                seq: 0,
                clock: 0,
                fetches: 0,
                fail_next: None,
            }),
            build: Box::new(build),
        }
    }

    /// Number of `fetch_page` calls received so far.
    pub fn fetch_count(&self) -> usize {
        self.inner.lock().fetches
    }

    /// Makes the next `fetch_page` call fail with `error`.
    pub fn fail_next_fetch(&self, error: SourceError) {
        self.inner.lock().fail_next = Some(error);
    }
}

impl MemorySource<Task> {
    /// A task store minting ids `task-1`, `task-2`, ...
    pub fn tasks() -> Self {
        Self::new(|seq, created_at, draft| {
            Task::from_draft(format!("task-{seq}"), created_at, draft)
        })
    }
}

impl MemorySource<Note> {
    /// A note store minting ids `note-1`, `note-2`, ...
    pub fn notes() -> Self {
        Self::new(|seq, created_at, draft| {
            Note::from_draft(format!("note-{seq}"), created_at, draft)
        })
    }
}

impl MemorySource<Todo> {
    /// A todo store minting ids `todo-1`, `todo-2`, ...
    pub fn todos() -> Self {
        Self::new(|seq, created_at, draft| {
            Todo::from_draft(format!("todo-{seq}"), created_at, draft)
        })
    }
}

impl<T: Editable + Clone> MemorySource<T> {
    /// Stores `item` as-is under `context`.
    pub fn insert(&self, context: &ListContext, item: T) {
        let mut inner = self.inner.lock();
        inner.clock = inner.clock.max(item.created_at().as_millis());
        inner
            .collections
            .entry(context.clone())
            .or_default()
            .push(item);
    }

    pub fn extend(&self, context: &ListContext, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.insert(context, item);
        }
    }

    pub fn len(&self, context: &ListContext) -> usize {
        self.inner
            .lock()
            .collections
            .get(context)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self, context: &ListContext) -> bool {
        self.len(context) == 0
    }
}

#[async_trait]
impl<T: Editable + Clone> PagedSource<T> for MemorySource<T> {
    async fn fetch_page(
        &self,
        context: &ListContext,
        before: Option<Timestamp>,
        take: usize,
    ) -> Result<Vec<T>, SourceError> {
        let mut inner = self.inner.lock();
        inner.fetches += 1;
        if let Some(err) = inner.fail_next.take() {
            return Err(err);
        }
        let Some(items) = inner.collections.get(context) else {
            return Ok(Vec::new());
        };
        let mut page: Vec<&T> = items
            .iter()
            .filter(|it| before.is_none_or(|b| it.created_at() < b))
            .collect();
        page.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(page.into_iter().take(take).cloned().collect())
    }

    async fn create_item(&self, context: &ListContext, draft: T::Draft) -> Result<T, SourceError> {
        let mut inner = self.inner.lock();
        inner.seq += 1;
        inner.clock += 1;
        let item = (self.build)(inner.seq, Timestamp(inner.clock), draft);
        inner
            .collections
            .entry(context.clone())
            .or_default()
            .push(item.clone());
        Ok(item)
    }

    async fn update_item(
        &self,
        context: &ListContext,
        key: &T::Key,
        patch: T::Patch,
    ) -> Result<T, SourceError> {
        let mut inner = self.inner.lock();
        let item = inner
            .collections
            .get_mut(context)
            .and_then(|items| items.iter_mut().find(|it| &it.key() == key))
            .ok_or_else(|| SourceError::NotFound(format!("{key:?}")))?;
        item.apply_patch(patch);
        Ok(item.clone())
    }

    async fn delete_item(&self, context: &ListContext, key: &T::Key) -> Result<(), SourceError> {
        let mut inner = self.inner.lock();
        let items = inner
            .collections
            .get_mut(context)
            .ok_or_else(|| SourceError::NotFound(format!("{key:?}")))?;
        let pos = items
            .iter()
            .position(|it| &it.key() == key)
            .ok_or_else(|| SourceError::NotFound(format!("{key:?}")))?;
        items.remove(pos);
        Ok(())
    }
}
