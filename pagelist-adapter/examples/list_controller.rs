use pagelist::{
    Action, Collection, ListContext, MemorySource, PagedListStore, Priority, StoreOptions, Task,
    TaskDraft, TaskStatus, Timestamp,
};
use pagelist_adapter::{ListController, ListViewOptions};

fn allow_all(_: Action, _: &ListContext) -> bool {
    true
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), pagelist::SourceError> {
    // Example: drive one list the way a UI adapter would.
    //
    // 1) forward container size / scroll events
    // 2) render the visible rows by key
    // 3) fetch more when the viewport nears the end
    // 4) debounce the search box from a timer tick
    let context = ListContext::new("team-a", Collection::Tasks);
    let source = MemorySource::tasks();
    source.extend(
        &context,
        (1..=200).map(|n| Task {
            id: format!("seed-{n}"),
            title: format!("Task {n}"),
            description: String::new(),
            status: TaskStatus::Open,
            priority: Priority::Medium,
            creator_id: "u1".into(),
            assignee_id: None,
            created_at: Timestamp::from_millis(n),
        }),
    );

    let store = PagedListStore::new(context, StoreOptions::new(50));
    let mut c = ListController::new(store, ListViewOptions::new(32.0, 320.0));
    c.store_mut().load_first_page(&source).await?;

    for offset in [0.0, 800.0, 1_400.0] {
        c.on_scroll(offset);
        let mut keys = Vec::new();
        let window = c.render(|row| keys.push(row.key));
        println!("offset={offset} window={window:?} first={:?}", keys.first());
        if let Some(outcome) = c.load_more_if_needed(&source).await? {
            println!("  loaded more: {outcome:?}");
        }
    }

    c.on_search_input("task 19", 0);
    c.tick(100);
    println!("search pending={}", c.is_search_pending());
    c.tick(300);
    let mut keys = Vec::new();
    c.render(|row| keys.push(row.key));
    println!("search results: {keys:?}");

    c.store_mut().clear_filter();
    let draft = TaskDraft {
        title: "Pinned to viewport".into(),
        ..TaskDraft::default()
    };
    let outcome = c.create_anchored(&source, &allow_all, draft).await?;
    println!("create: {outcome:?} offset={}", c.view().scroll_offset());
    Ok(())
}
