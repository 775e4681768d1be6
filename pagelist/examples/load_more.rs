// Example: cursor paging, search and an optimistic create against an in-memory source.
use pagelist::{
    Collection, MemorySource, PagedListStore, Priority, Role, SessionContext, StoreOptions, Task,
    TaskDraft, TaskStatus, Timestamp,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), pagelist::SourceError> {
    let session = SessionContext::new("u1", "team-a", Role::Member);
    let context = session.list_context(Collection::Tasks);

    let source = MemorySource::tasks();
    source.extend(
        &context,
        (1..=45).map(|n| Task {
            id: format!("seed-{n}"),
            title: format!("Seeded task {n}"),
            description: String::new(),
            status: TaskStatus::Open,
            priority: Priority::Medium,
            creator_id: "u1".into(),
            assignee_id: None,
            created_at: Timestamp::from_millis(n),
        }),
    );

    let mut store = PagedListStore::new(context, StoreOptions::new(20));
    let outcome = store.load_first_page(&source).await?;
    println!("{outcome:?} -> {:?}", store.snapshot());
    while store.has_more() {
        let outcome = store.load_next_page(&source).await?;
        println!("{outcome:?} -> {:?}", store.snapshot());
    }

    store.set_search_text("task 4");
    let shown: Vec<&str> = store
        .filtered_items()
        .iter()
        .map(|t| t.id.as_str())
        .collect();
    println!("search 'task 4': {shown:?}");
    store.clear_filter();

    let draft = TaskDraft {
        title: "Write release notes".into(),
        creator_id: session.user_id.clone(),
        ..TaskDraft::default()
    };
    let outcome = store.create(&source, &session, draft).await?;
    println!("create: {outcome:?}, first={:?}", store.items().first().map(|t| &t.id));
    Ok(())
}
