use crate::*;

use async_trait::async_trait;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_f64(&mut self, start: f64, end: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        start + (end - start) * unit
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Row {
    id: u32,
    t: i64,
    pinned: bool,
    title: &'static str,
    body: &'static str,
    owner: &'static str,
}

fn row(id: u32, t: i64) -> Row {
    Row {
        id,
        t,
        pinned: false,
        title: "",
        body: "",
        owner: "u1",
    }
}

impl PagedItem for Row {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }

    fn created_at(&self) -> Timestamp {
        Timestamp(self.t)
    }

    fn is_pinned(&self) -> bool {
        self.pinned
    }

    fn text_field(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Title => Some(self.title),
            TextField::Content => Some(self.body),
            TextField::Category => None,
        }
    }

    fn filter_field(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Creator => Some(self.owner),
            _ => None,
        }
    }
}

fn ids(view: FilteredView<'_, Row>) -> Vec<u32> {
    view.iter().map(|r| r.id).collect()
}

fn task(n: u32, t: i64) -> Task {
    Task {
        id: format!("t{n}"),
        title: format!("Task {n}"),
        description: String::new(),
        status: TaskStatus::Open,
        priority: Priority::Medium,
        creator_id: "u1".into(),
        assignee_id: None,
        created_at: Timestamp(t),
    }
}

fn tasks_ctx(team: &str) -> ListContext {
    ListContext::new(team, Collection::Tasks)
}

/// A source holding `n` tasks for `team`, created at t=1..=n.
fn seeded(team: &str, n: u32) -> MemorySource<Task> {
    let source = MemorySource::tasks();
    source.extend(&tasks_ctx(team), (1..=n).map(|i| task(i, i as i64)));
    source
}

fn allow_all(_: Action, _: &ListContext) -> bool {
    true
}

fn deny_all(_: Action, _: &ListContext) -> bool {
    false
}

// ---------------------------------------------------------------------------------------------
// window

#[test]
fn window_for_a_thousand_rows_at_top() {
    let w = compute_window(
        WindowInput::new(1000, 120.0, 600.0)
            .with_overscan(8)
            .with_scroll_offset(0.0),
    );
    assert_eq!(w.start_index, 0);
    // ceil(600/120) + 2*8
    assert_eq!(w.end_index, 21);
    assert_eq!(w.total_height, 120_000.0);
    assert_eq!(w.offset_top, 0.0);
}

#[test]
fn window_scrolled_into_the_middle() {
    let w = compute_window(
        WindowInput::new(1000, 120.0, 600.0)
            .with_overscan(8)
            .with_scroll_offset(12_000.0),
    );
    // first visible row is 100
    assert_eq!(w.start_index, 92);
    assert_eq!(w.end_index, 113);
    assert_eq!(w.offset_top, 92.0 * 120.0);
    assert!(w.contains(100));
    assert!(!w.contains(113));
}

#[test]
fn window_for_empty_list_is_empty() {
    let w = compute_window(WindowInput::new(0, 40.0, 400.0).with_overscan(3));
    assert_eq!(w, ViewWindow::EMPTY);
    assert!(w.is_empty());
    assert_eq!(w.total_height, 0.0);
}

#[test]
fn window_clamps_invalid_geometry() {
    for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let w = compute_window(WindowInput::new(10, bad, 100.0));
        assert_eq!(w, ViewWindow::EMPTY);
    }

    // negative / NaN container and scroll are treated as zero
    let w = compute_window(
        WindowInput::new(10, 10.0, f64::NAN)
            .with_overscan(1)
            .with_scroll_offset(-50.0),
    );
    assert_eq!(w.start_index, 0);
    assert_eq!(w.end_index, 2);
}

#[test]
fn window_scrolled_past_the_end_stays_in_bounds() {
    let w = compute_window(
        WindowInput::new(5, 10.0, 30.0)
            .with_overscan(1)
            .with_scroll_offset(10_000.0),
    );
    assert_eq!(w.start_index, 5);
    assert_eq!(w.end_index, 5);
    assert!(w.is_scroll_out_of_range(10_000.0));
    assert!(!w.is_scroll_out_of_range(50.0));
}

#[test]
fn window_bounds_hold_for_random_inputs() {
    let mut rng = Lcg::new(0x5eed);
    for _ in 0..5_000 {
        let count = rng.gen_range_usize(0, 2_000);
        let item_height = rng.gen_f64(1.0, 200.0);
        let container = rng.gen_f64(1.0, 2_000.0);
        let overscan = rng.gen_range_usize(0, 20);
        let scroll = rng.gen_f64(0.0, 500_000.0);

        let w = compute_window(
            WindowInput::new(count, item_height, container)
                .with_overscan(overscan)
                .with_scroll_offset(scroll),
        );
        assert!(w.start_index <= w.end_index);
        assert!(w.end_index <= count);
        let budget = (container / item_height).ceil() as usize + 2 * overscan;
        assert!(w.len() <= budget, "len={} budget={budget}", w.len());
        assert_eq!(w.offset_top, row_top(w.start_index, item_height));
    }
}

// ---------------------------------------------------------------------------------------------
// pipeline

#[test]
fn pinned_items_lead_newest_first() {
    let items = vec![
        Row {
            pinned: true,
            ..row(1, 5)
        },
        row(2, 3),
        Row {
            pinned: true,
            ..row(3, 4)
        },
    ];
    let state = FilterState::default()
        .with_sort(SortDirective::Newest)
        .with_pinned_first(true);
    let mut p = FilterPipeline::default();
    // A, C, B
    assert_eq!(ids(p.view(&items, 0, &state)), vec![1, 3, 2]);
}

#[test]
fn search_is_case_insensitive_over_any_configured_field() {
    let items = vec![
        Row {
            title: "Quarterly Report",
            ..row(1, 1)
        },
        Row {
            body: "draft the REPORT outline",
            ..row(2, 2)
        },
        Row {
            title: "Groceries",
            ..row(3, 3)
        },
    ];
    let state = FilterState::default().with_search_text("  report ");
    assert_eq!(
        filter::run(&items, &state, &[TextField::Title, TextField::Content]),
        vec![1, 0]
    );
    // body is not searched when not configured
    assert_eq!(filter::run(&items, &state, &[TextField::Title]), vec![0]);

    let blank = FilterState::default().with_search_text("   ");
    assert!(!blank.is_filtering());
    assert_eq!(filter::run(&items, &blank, &[TextField::Title]).len(), 3);
}

#[test]
fn predicates_combine_with_and_and_all_is_a_no_op() {
    let mut a = task(1, 1);
    a.creator_id = "ann".into();
    a.status = TaskStatus::Done;
    let mut b = task(2, 2);
    b.creator_id = "ann".into();
    let mut c = task(3, 3);
    c.creator_id = "bob".into();
    c.status = TaskStatus::Done;
    let items = vec![a, b, c];

    let state = FilterState::default()
        .with_predicate(FilterField::Creator, "ann")
        .with_predicate(FilterField::Status, "done");
    assert_eq!(filter::run(&items, &state, &[]), vec![0]);

    let state = FilterState::default()
        .with_predicate(FilterField::Creator, ALL)
        .with_predicate(FilterField::Status, "done");
    assert_eq!(filter::run(&items, &state, &[]), vec![2, 0]);

    let state = FilterState::default().with_predicate(FilterField::Priority, ALL);
    assert!(!state.is_filtering());
    assert_eq!(filter::run(&items, &state, &[]), vec![2, 1, 0]);

    // unassigned tasks never match an assignee predicate
    let state = FilterState::default().with_predicate(FilterField::Assignee, "ann");
    assert!(filter::run(&items, &state, &[]).is_empty());
}

#[test]
fn oldest_sort_is_stable_on_ties() {
    let items = vec![row(1, 7), row(2, 3), row(3, 7), row(4, 3)];
    let state = FilterState::default().with_sort(SortDirective::Oldest);
    assert_eq!(filter::run(&items, &state, &[]), vec![1, 3, 0, 2]);

    let state = FilterState::default().with_sort(SortDirective::Newest);
    assert_eq!(filter::run(&items, &state, &[]), vec![0, 2, 1, 3]);
}

#[test]
fn pipeline_is_memoized_and_deterministic() {
    let items: Vec<Row> = (0..50).map(|i| row(i, (i % 7) as i64)).collect();
    let state = FilterState::default().with_pinned_first(true);
    let mut p = FilterPipeline::default();

    let first = ids(p.view(&items, 1, &state));
    let second = ids(p.view(&items, 1, &state));
    assert_eq!(first, second);
    assert_eq!(p.runs(), 1);

    // new revision recomputes, same output
    let third = ids(p.view(&items, 2, &state));
    assert_eq!(first, third);
    assert_eq!(p.runs(), 2);

    let other = state.clone().with_sort(SortDirective::Oldest);
    let _ = p.view(&items, 2, &other);
    assert_eq!(p.runs(), 3);
}

#[test]
fn pinned_first_holds_for_random_sets() {
    let mut rng = Lcg::new(42);
    for round in 0..200 {
        let n = rng.gen_range_usize(0, 60);
        let items: Vec<Row> = (0..n)
            .map(|i| Row {
                pinned: rng.gen_bool(),
                ..row(i as u32, rng.gen_range_u64(0, 20) as i64)
            })
            .collect();
        let sort = if round % 2 == 0 {
            SortDirective::Newest
        } else {
            SortDirective::Oldest
        };
        let state = FilterState::default().with_sort(sort).with_pinned_first(true);
        let out = filter::run(&items, &state, &[]);
        assert_eq!(out.len(), n);

        let first_unpinned = out.iter().position(|&i| !items[i].pinned).unwrap_or(n);
        assert!(out[first_unpinned..].iter().all(|&i| !items[i].pinned));

        // within each group the creation order follows the directive
        for group in [&out[..first_unpinned], &out[first_unpinned..]] {
            for pair in group.windows(2) {
                let (a, b) = (items[pair[0]].t, items[pair[1]].t);
                match sort {
                    SortDirective::Newest => assert!(a >= b),
                    SortDirective::Oldest => assert!(a <= b),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------------------------
// pager

#[tokio::test]
async fn short_page_exhausts_and_further_loads_issue_nothing() {
    let source = seeded("alpha", 9);
    let ctx = tasks_ctx("alpha");
    let mut pager = CursorPager::<Task>::new();

    let out = pager.fetch_first_page(&source, &ctx, 6).await.unwrap();
    assert_eq!(
        out,
        PageOutcome::Applied {
            received: 6,
            added: 6,
            has_more: true
        }
    );
    assert_eq!(pager.cursor(), Some(Timestamp(4)));

    let out = pager.fetch_next_page(&source, &ctx, 6).await.unwrap();
    assert_eq!(
        out,
        PageOutcome::Applied {
            received: 3,
            added: 3,
            has_more: false
        }
    );
    assert_eq!(pager.cursor(), Some(Timestamp(1)));
    assert_eq!(source.fetch_count(), 2);

    let out = pager.fetch_next_page(&source, &ctx, 6).await.unwrap();
    assert_eq!(out, PageOutcome::Skipped(Skip::Exhausted));
    assert_eq!(source.fetch_count(), 2);
    assert_eq!(pager.len(), 9);
}

#[tokio::test]
async fn next_page_without_cursor_is_a_no_op() {
    let source = seeded("alpha", 3);
    let mut pager = CursorPager::<Task>::new();
    let out = pager
        .fetch_next_page(&source, &tasks_ctx("alpha"), 5)
        .await
        .unwrap();
    assert_eq!(out, PageOutcome::Skipped(Skip::NoCursor));
    assert_eq!(source.fetch_count(), 0);
}

#[tokio::test]
async fn empty_first_page_means_no_more() {
    let source = MemorySource::tasks();
    let mut pager = CursorPager::<Task>::new();
    let out = pager
        .fetch_first_page(&source, &tasks_ctx("empty"), 5)
        .await
        .unwrap();
    assert_eq!(
        out,
        PageOutcome::Applied {
            received: 0,
            added: 0,
            has_more: false
        }
    );
    assert_eq!(pager.cursor(), None);
}

#[tokio::test]
async fn cursor_only_moves_backwards_in_time() {
    let source = seeded("alpha", 50);
    let ctx = tasks_ctx("alpha");
    let mut pager = CursorPager::<Task>::new();
    pager.fetch_first_page(&source, &ctx, 7).await.unwrap();

    loop {
        let before = pager.cursor().unwrap();
        let loaded = pager.len();
        let out = pager.fetch_next_page(&source, &ctx, 7).await.unwrap();
        if !out.is_applied() {
            break;
        }
        assert!(pager.items()[loaded..].iter().all(|t| t.created_at < before));
        assert!(pager.cursor().unwrap() <= before);
    }

    assert_eq!(pager.len(), 50);
    let mut keys: Vec<_> = pager.items().iter().map(|t| t.id.clone()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 50);
}

#[test]
fn duplicate_keys_and_out_of_order_items_are_dropped() {
    let mut pager = CursorPager::<Row>::new();
    let req = pager.begin_first_page(3).unwrap();
    pager
        .complete(&req, Ok(vec![row(1, 30), row(2, 20), row(3, 10)]))
        .unwrap();

    let req = pager.begin_next_page(3).unwrap();
    assert_eq!(req.before, Some(Timestamp(10)));
    // row 3 again, plus one item not older than the cursor
    let out = pager
        .complete(&req, Ok(vec![row(9, 15), row(3, 9), row(4, 5)]))
        .unwrap();
    assert_eq!(
        out,
        PageOutcome::Applied {
            received: 3,
            added: 1,
            has_more: true
        }
    );
    let ids: Vec<u32> = pager.items().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(pager.cursor(), Some(Timestamp(5)));
}

#[tokio::test]
async fn failed_fetch_keeps_state_and_allows_retry() {
    let source = seeded("alpha", 10);
    let ctx = tasks_ctx("alpha");
    let mut pager = CursorPager::<Task>::new();
    pager.fetch_first_page(&source, &ctx, 4).await.unwrap();
    let (cursor, len, rev) = (pager.cursor(), pager.len(), pager.revision());

    source.fail_next_fetch(SourceError::Unavailable("offline".into()));
    let err = pager.fetch_next_page(&source, &ctx, 4).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(pager.cursor(), cursor);
    assert_eq!(pager.len(), len);
    assert_eq!(pager.revision(), rev);
    assert!(pager.has_more());
    assert!(!pager.is_loading());

    let out = pager.fetch_next_page(&source, &ctx, 4).await.unwrap();
    assert!(out.is_applied());
    assert_eq!(pager.len(), 8);
}

#[test]
fn only_one_request_in_flight() {
    let mut pager = CursorPager::<Row>::new();
    let first = pager.begin_first_page(2).unwrap();
    assert_eq!(pager.begin_first_page(2), Err(Skip::InFlight));
    pager.complete(&first, Ok(vec![row(1, 9), row(2, 8)])).unwrap();

    let next = pager.begin_next_page(2).unwrap();
    assert!(pager.is_loading());
    assert_eq!(pager.begin_next_page(2), Err(Skip::InFlight));
    pager.complete(&next, Ok(vec![row(3, 7)])).unwrap();
    assert!(!pager.is_loading());
    assert!(!pager.has_more());
}

#[test]
fn reset_makes_outstanding_requests_stale() {
    let mut pager = CursorPager::<Row>::new();
    let old = pager.begin_first_page(2).unwrap();
    pager.reset();
    assert_eq!(pager.complete(&old, Ok(vec![row(1, 1)])), Ok(PageOutcome::Stale));
    assert_eq!(
        pager.complete(&old, Err(SourceError::Unavailable("late".into()))),
        Ok(PageOutcome::Stale)
    );
    assert!(pager.is_empty());
    assert!(!pager.is_loading());
}

#[test]
fn replayed_response_does_not_reopen_the_request_slot() {
    let mut pager = CursorPager::<Row>::new();
    let first = pager.begin_first_page(2).unwrap();
    pager.complete(&first, Ok(vec![row(1, 30), row(2, 20)])).unwrap();

    let next = pager.begin_next_page(2).unwrap();
    assert_ne!(first.id, next.id);
    // the first page delivered a second time while the next one is outstanding
    let out = pager.complete(&first, Ok(vec![row(1, 30), row(2, 20)]));
    assert_eq!(out, Ok(PageOutcome::Stale));
    assert!(pager.is_loading());
    assert_eq!(pager.begin_next_page(2), Err(Skip::InFlight));

    let out = pager.complete(&next, Ok(vec![row(3, 10)])).unwrap();
    assert!(out.is_applied());
    assert_eq!(pager.cursor(), Some(Timestamp(10)));
    assert_eq!(pager.complete(&next, Ok(vec![row(4, 5)])), Ok(PageOutcome::Stale));
    assert_eq!(pager.len(), 3);
}

#[test]
fn cancel_releases_only_the_outstanding_request() {
    let mut pager = CursorPager::<Row>::new();
    let abandoned = pager.begin_first_page(2).unwrap();
    assert!(pager.cancel(&abandoned));
    assert!(!pager.is_loading());
    assert!(!pager.cancel(&abandoned));

    let current = pager.begin_first_page(2).unwrap();
    assert!(!pager.cancel(&abandoned));
    assert!(pager.is_loading());
    assert_eq!(pager.complete(&abandoned, Ok(vec![row(9, 9)])), Ok(PageOutcome::Stale));
    assert!(pager.is_empty());

    pager.complete(&current, Ok(vec![row(1, 2)])).unwrap();
    assert_eq!(pager.len(), 1);
}

#[tokio::test]
async fn paused_pager_skips_the_first_page_too() {
    let source = seeded("alpha", 5);
    let mut pager = CursorPager::<Task>::new();
    pager.set_paused(true);
    let out = pager
        .fetch_first_page(&source, &tasks_ctx("alpha"), 5)
        .await
        .unwrap();
    assert_eq!(out, PageOutcome::Skipped(Skip::Filtering));
    assert_eq!(source.fetch_count(), 0);
    assert!(!pager.is_loading());
}

#[test]
fn zero_take_is_clamped() {
    let mut pager = CursorPager::<Row>::new();
    assert_eq!(pager.begin_first_page(0).unwrap().take, 1);
}

#[test]
fn optimistic_edits_keep_the_key_index_in_sync() {
    let mut pager = CursorPager::<Row>::new();
    let req = pager.begin_first_page(5).unwrap();
    pager.complete(&req, Ok(vec![row(1, 9), row(2, 8)])).unwrap();
    let cursor = pager.cursor();

    pager.prepend(row(3, 10));
    assert_eq!(pager.items()[0].id, 3);
    assert!(pager.contains_key(&3));
    assert_eq!(pager.cursor(), cursor);

    // prepending a known key replaces in place
    pager.prepend(Row {
        title: "edited",
        ..row(1, 9)
    });
    assert_eq!(pager.len(), 3);
    assert_eq!(pager.items()[1].title, "edited");

    assert!(!pager.replace(&42, row(42, 1)));
    assert_eq!(pager.remove(&2).map(|r| r.id), Some(2));
    assert!(!pager.contains_key(&2));
    assert_eq!(pager.remove(&2), None);
}

// ---------------------------------------------------------------------------------------------
// store

fn task_store(team: &str) -> PagedListStore<Task> {
    PagedListStore::new(tasks_ctx(team), StoreOptions::new(6))
}

#[tokio::test]
async fn store_exposes_items_filtered_items_and_flags() {
    let source = seeded("alpha", 9);
    let mut store = task_store("alpha");
    assert!(store.has_more());
    assert!(!store.loading());

    store.load_first_page(&source).await.unwrap();
    assert_eq!(store.items().len(), 6);
    assert!(store.has_more());

    let titles: Vec<&str> = store
        .filtered_items()
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles[0], "Task 9");

    store.load_next_page(&source).await.unwrap();
    assert_eq!(store.filtered_items().len(), 9);
    assert!(!store.has_more());
    assert_eq!(store.cursor(), Some(Timestamp(1)));
}

#[tokio::test]
async fn search_with_no_matches_leaves_paging_alone() {
    let source = seeded("alpha", 9);
    let mut store = task_store("alpha");
    store.load_first_page(&source).await.unwrap();
    let (cursor, has_more) = (store.cursor(), store.has_more());

    store.set_search_text("foo");
    assert!(store.filtered_items().is_empty());
    assert_eq!(store.items().len(), 6);
    assert_eq!(store.cursor(), cursor);
    assert_eq!(store.has_more(), has_more);

    // filtered views do not page the server
    let out = store.load_next_page(&source).await.unwrap();
    assert_eq!(out, PageOutcome::Skipped(Skip::Filtering));
    assert_eq!(source.fetch_count(), 1);

    store.set_search_text("");
    assert!(store.load_next_page(&source).await.unwrap().is_applied());
}

#[tokio::test]
async fn team_switch_discards_the_in_flight_page() {
    let source = seeded("alpha", 9);
    source.extend(&tasks_ctx("beta"), (100..103).map(|i| task(i, i as i64)));
    let mut store = task_store("alpha");
    store.load_first_page(&source).await.unwrap();

    let old = store.request_next_page().unwrap();
    let old_result = source
        .fetch_page(&old.context, old.request.before, old.request.take)
        .await;

    let new = store.switch_team("beta").unwrap();
    assert!(store.items().is_empty());
    assert!(store.loading());

    assert_eq!(store.apply_page(&old, old_result), Ok(PageOutcome::Stale));
    assert!(store.items().is_empty());

    store.fetch_and_apply(&source, new).await.unwrap();
    let ids: Vec<&str> = store.items().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t102", "t101", "t100"]);
    assert!(!store.has_more());
    assert_eq!(store.context().team_id, "beta");
}

#[tokio::test]
async fn leaving_and_returning_to_a_tab_still_drops_old_responses() {
    let source = seeded("alpha", 9);
    let mut store = task_store("alpha");
    let stale = store.request_first_page().unwrap();

    store.switch_collection(Collection::Notes).unwrap();
    let fresh = store.switch_collection(Collection::Tasks).unwrap();
    assert_eq!(stale.context, fresh.context);

    let result = source.fetch_page(&stale.context, None, 6).await;
    assert_eq!(store.apply_page(&stale, result), Ok(PageOutcome::Stale));
    assert!(store.fetch_and_apply(&source, fresh).await.unwrap().is_applied());
}

#[tokio::test]
async fn context_switch_resets_filter_and_error() {
    let source = seeded("alpha", 3);
    let mut store = task_store("alpha");
    store.set_predicate(FilterField::Status, "done");
    source.fail_next_fetch(SourceError::Unavailable("down".into()));
    store.clear_filter();
    assert!(store.load_first_page(&source).await.is_err());
    assert!(store.last_error().is_some());
    store.set_search_text("task");

    let ticket = store.switch_team("alpha").unwrap();
    assert!(!store.is_filtering());
    assert!(store.last_error().is_none());
    assert_eq!(ticket.request.kind, PageKind::First);
}

#[tokio::test]
async fn failed_load_is_recorded_and_cleared_by_the_next_success() {
    let source = seeded("alpha", 9);
    let mut store = task_store("alpha");
    source.fail_next_fetch(SourceError::Unavailable("timeout".into()));

    assert!(store.load_first_page(&source).await.is_err());
    assert!(store.items().is_empty());
    assert!(store.has_more());
    assert_eq!(
        store.snapshot().error.as_deref(),
        Some("source unavailable: timeout")
    );

    store.load_first_page(&source).await.unwrap();
    assert!(store.last_error().is_none());
    assert_eq!(store.items().len(), 6);
}

#[tokio::test]
async fn first_page_is_not_fetched_while_filtering() {
    let source = seeded("alpha", 9);
    let mut store = task_store("alpha");

    store.set_predicate(FilterField::Status, "done");
    let out = store.load_first_page(&source).await.unwrap();
    assert_eq!(out, PageOutcome::Skipped(Skip::Filtering));

    store.set_predicate(FilterField::Status, ALL);
    store.set_search_text("task");
    let out = store.load_first_page(&source).await.unwrap();
    assert_eq!(out, PageOutcome::Skipped(Skip::Filtering));
    assert_eq!(source.fetch_count(), 0);
    assert!(store.items().is_empty());

    store.clear_filter();
    assert!(store.load_first_page(&source).await.unwrap().is_applied());
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn abandoned_ticket_can_be_cancelled() {
    let source = seeded("alpha", 9);
    let mut store = task_store("alpha");
    store.load_first_page(&source).await.unwrap();

    let ticket = store.request_next_page().unwrap();
    assert_eq!(
        store.load_next_page(&source).await.unwrap(),
        PageOutcome::Skipped(Skip::InFlight)
    );
    assert!(store.loading());

    assert!(store.cancel(&ticket));
    assert!(!store.loading());
    assert!(!store.cancel(&ticket));

    let out = store.load_next_page(&source).await.unwrap();
    assert!(out.is_applied());
    assert_eq!(store.items().len(), 9);
    assert_eq!(store.apply_page(&ticket, Ok(Vec::new())), Ok(PageOutcome::Stale));
}

/// A source whose fetches never finish.
struct Hanging;

#[async_trait]
impl PagedSource<Task> for Hanging {
    async fn fetch_page(
        &self,
        _context: &ListContext,
        _before: Option<Timestamp>,
        _take: usize,
    ) -> Result<Vec<Task>, SourceError> {
        std::future::pending().await
    }

    async fn create_item(
        &self,
        _context: &ListContext,
        _draft: TaskDraft,
    ) -> Result<Task, SourceError> {
        Err(SourceError::Unavailable("hanging".into()))
    }

    async fn update_item(
        &self,
        _context: &ListContext,
        _key: &String,
        _patch: TaskPatch,
    ) -> Result<Task, SourceError> {
        Err(SourceError::Unavailable("hanging".into()))
    }

    async fn delete_item(&self, _context: &ListContext, _key: &String) -> Result<(), SourceError> {
        Err(SourceError::Unavailable("hanging".into()))
    }
}

#[tokio::test]
async fn dropping_a_pending_load_frees_the_request_slot() {
    let source = seeded("alpha", 9);
    let mut store = task_store("alpha");
    store.load_first_page(&source).await.unwrap();

    tokio::select! {
        biased;
        _ = store.load_next_page(&Hanging) => panic!("fetch should never finish"),
        _ = std::future::ready(()) => {}
    }

    assert!(!store.loading());
    let out = store.load_next_page(&source).await.unwrap();
    assert!(out.is_applied());
    assert_eq!(store.items().len(), 9);
}

#[tokio::test]
async fn create_prepends_without_touching_the_cursor() {
    let source = seeded("alpha", 9);
    let mut store = task_store("alpha");
    store.load_first_page(&source).await.unwrap();
    let (cursor, has_more) = (store.cursor(), store.has_more());

    let draft = TaskDraft {
        title: "Ship it".into(),
        creator_id: "u1".into(),
        ..TaskDraft::default()
    };
    let out = store.create(&source, &allow_all, draft).await.unwrap();
    assert_eq!(out, MutationOutcome::Applied);
    assert_eq!(store.items()[0].title, "Ship it");
    assert_eq!(store.items().len(), 7);
    assert_eq!(store.cursor(), cursor);
    assert_eq!(store.has_more(), has_more);
    assert_eq!(store.filtered_items().get(0).map(|t| t.title.as_str()), Some("Ship it"));
}

#[tokio::test]
async fn source_assigns_ids_and_creation_times() {
    let ctx = ListContext::new("alpha", Collection::Todos);
    let source = MemorySource::<Todo>::new(|seq, created_at, draft| {
        Todo::from_draft(format!("srv-{seq:03}"), created_at, draft)
    });
    source.insert(
        &ctx,
        Todo::from_draft("seed", Timestamp(40), TodoDraft::default()),
    );
    let mut store = PagedListStore::new(ctx, StoreOptions::default());
    store.load_first_page(&source).await.unwrap();

    let draft = TodoDraft {
        title: "Buy milk".into(),
        ..TodoDraft::default()
    };
    let out = store.create(&source, &allow_all, draft).await.unwrap();
    assert_eq!(out, MutationOutcome::Applied);
    assert_eq!(store.items()[0].id, "srv-001");
    assert_eq!(store.items()[0].created_at, Timestamp(41));
    assert!(!store.items()[0].completed);
    assert_eq!(store.items()[1].id, "seed");
}

#[tokio::test]
async fn update_and_delete_patch_the_loaded_set() {
    let source = seeded("alpha", 9);
    let mut store = task_store("alpha");
    store.load_first_page(&source).await.unwrap();

    let key = "t8".to_string();
    let patch = TaskPatch {
        status: Some(TaskStatus::Done),
        ..TaskPatch::default()
    };
    let out = store.update(&source, &allow_all, &key, patch).await.unwrap();
    assert_eq!(out, MutationOutcome::Applied);
    let pos = store.items().iter().position(|t| t.id == "t8").unwrap();
    assert_eq!(store.items()[pos].status, TaskStatus::Done);
    assert_eq!(pos, 1);

    // exists on the server but not loaded yet
    let out = store
        .update(&source, &allow_all, &"t1".to_string(), TaskPatch::default())
        .await
        .unwrap();
    assert_eq!(out, MutationOutcome::NotLoaded);

    let out = store.delete(&source, &allow_all, &key).await.unwrap();
    assert_eq!(out, MutationOutcome::Applied);
    assert!(store.items().iter().all(|t| t.id != "t8"));
    assert_eq!(source.len(&tasks_ctx("alpha")), 8);
}

#[tokio::test]
async fn denied_mutations_never_reach_the_source() {
    let source = seeded("alpha", 3);
    let mut store = task_store("alpha");
    store.load_first_page(&source).await.unwrap();

    let out = store
        .create(&source, &deny_all, TaskDraft::default())
        .await
        .unwrap();
    assert_eq!(out, MutationOutcome::Denied(Action::Create));
    let out = store
        .delete(&source, &deny_all, &"t1".to_string())
        .await
        .unwrap();
    assert_eq!(out, MutationOutcome::Denied(Action::Delete));

    assert_eq!(source.len(&tasks_ctx("alpha")), 3);
    assert_eq!(store.items().len(), 3);
    assert!(store.last_error().is_none());
}

#[tokio::test]
async fn failed_mutation_keeps_local_state() {
    let source = seeded("alpha", 3);
    let mut store = task_store("alpha");
    store.load_first_page(&source).await.unwrap();

    let err = store
        .delete(&source, &allow_all, &"missing".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::NotFound(_)));
    assert_eq!(store.items().len(), 3);
    assert_eq!(store.last_error(), Some(&err));
}

#[tokio::test]
async fn notes_group_pinned_first_when_configured() {
    let ctx = ListContext::new("alpha", Collection::Notes);
    let source = MemorySource::notes();
    for (i, pinned) in [(1, false), (2, true), (3, false), (4, true)] {
        source.insert(
            &ctx,
            Note {
                id: format!("n{i}"),
                title: format!("Note {i}"),
                content: String::new(),
                category: "general".into(),
                creator_id: "u1".into(),
                pinned,
                created_at: Timestamp(i),
            },
        );
    }
    let mut store = PagedListStore::new(ctx, StoreOptions::new(10).with_pinned_first(true));
    store.load_first_page(&source).await.unwrap();

    let ids: Vec<&str> = store
        .filtered_items()
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(ids, vec!["n4", "n2", "n3", "n1"]);
}

#[tokio::test]
async fn session_role_gates_mutations() {
    let source = seeded("alpha", 2);
    let mut store = task_store("alpha");
    store.load_first_page(&source).await.unwrap();

    let member = SessionContext::new("u1", "alpha", Role::Member);
    let key = "t1".to_string();
    assert_eq!(
        store.delete(&source, &member, &key).await.unwrap(),
        MutationOutcome::Denied(Action::Delete)
    );
    assert_eq!(
        store
            .update(&source, &member, &key, TaskPatch::default())
            .await
            .unwrap(),
        MutationOutcome::Applied
    );

    let admin_elsewhere = SessionContext::new("u2", "beta", Role::Admin);
    assert!(!admin_elsewhere.can_perform(Action::Create, store.context()));
    let viewer = SessionContext::new("u3", "alpha", Role::Viewer);
    assert!(!viewer.can_perform(Action::Create, store.context()));
    let owner = SessionContext::new("u4", "alpha", Role::Owner);
    assert_eq!(
        store.delete(&source, &owner, &key).await.unwrap(),
        MutationOutcome::Applied
    );
    assert_eq!(owner.list_context(Collection::Tasks), *store.context());
}

#[test]
fn snapshot_reflects_paging_state() {
    let mut store = task_store("alpha");
    let ticket = store.request_first_page().unwrap();
    let snap = store.snapshot();
    assert!(snap.loading);
    assert_eq!(snap.loaded, 0);

    store
        .apply_page(&ticket, Ok(vec![task(2, 2), task(1, 1)]))
        .unwrap();
    let snap = store.snapshot();
    assert_eq!(
        snap,
        StoreSnapshot {
            context: tasks_ctx("alpha"),
            loaded: 2,
            cursor: Some(Timestamp(1)),
            has_more: false,
            loading: false,
            filtering: false,
            error: None,
        }
    );
}

#[test]
fn filtered_view_is_recomputed_only_after_changes() {
    let mut store = task_store("alpha");
    let ticket = store.request_first_page().unwrap();
    store
        .apply_page(&ticket, Ok(vec![task(3, 3), task(2, 2), task(1, 1)]))
        .unwrap();

    let _ = store.filtered_items();
    let _ = store.filtered_items();
    assert_eq!(store.pipeline().runs(), 1);

    store.set_sort(SortDirective::Oldest);
    let first = store.filtered_items().get(0).map(|t| t.id.clone());
    assert_eq!(first.as_deref(), Some("t1"));
    assert_eq!(store.pipeline().runs(), 2);

    assert_eq!(store.filtered_items().position_of(&"t3".to_string()), Some(2));
    assert_eq!(store.pipeline().runs(), 2);
}
