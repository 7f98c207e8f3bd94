//! Store, repository and reqwest transport against the live server.
//!
//! # Design
//! Starts the server on a random port, then drives `TodoStore` through the
//! real HTTP stack. Validates that the client's request building and response
//! handling agree with the server end-to-end.

use todo_core::{
    ApiClient, AppConfig, CreateTodo, HttpTodoRepository, ReqwestTransport, SyncBridge,
    TodoRepository, TodoStore,
};

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(todo_server::run(listener));
    format!("http://{addr}/api")
}

fn repository(base: &str) -> HttpTodoRepository<ReqwestTransport> {
    let config = AppConfig::from_lookup(|name| (name == "API_BASE").then(|| base.to_string()))
        .unwrap();
    HttpTodoRepository::from_config(&config)
}

#[tokio::test]
async fn store_lifecycle_over_http() {
    let base = start_server().await;
    let store = TodoStore::new(repository(&base));

    // Step 1: load: empty.
    store.load().await;
    assert!(store.items().is_empty());
    assert!(store.error().is_none());

    // Step 2: create, then reload: the server reflects it.
    store.create(CreateTodo::new("Buy milk")).await;
    store.load().await;
    let items = store.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Buy milk");
    let id = items[0].id;

    // Step 3: toggle persists.
    store.toggle(id).await;
    assert!(store.error().is_none());
    let remote = store.repository().fetch_all().await.unwrap();
    assert!(remote[0].completed);

    // Step 4: delete (204) removes locally and remotely.
    store.delete(id).await;
    assert!(store.items().is_empty());
    assert!(store.repository().fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn server_rejections_become_store_errors() {
    let base = start_server().await;
    let store = TodoStore::new(repository(&base));

    // The server validates too: a one-character title bypassing the client
    // form path is refused.
    store.create(CreateTodo::new("x")).await;
    assert_eq!(
        store.error().as_deref(),
        Some("HTTP Error: 422 Unprocessable Entity")
    );
    assert!(store.items().is_empty());

    // Toggle an item the server no longer has: rolled back with the 404.
    store.create(CreateTodo::new("Walk dog")).await;
    let id = store.items()[0].id;
    store.repository().delete(id).await.unwrap();

    store.toggle(id).await;
    assert!(!store.items()[0].completed);
    assert_eq!(store.error().as_deref(), Some("HTTP Error: 404 Not Found"));
}

#[tokio::test]
async fn refresh_through_bridge_picks_up_remote_changes() {
    let base = start_server().await;
    let other = repository(&base);
    let seed = other.fetch_all().await.unwrap();
    let store = TodoStore::with_items(repository(&base), seed.clone());
    let mut bridge = SyncBridge::new(seed);

    other.create(&CreateTodo::new("Added elsewhere")).await.unwrap();
    let fresh = other.fetch_all().await.unwrap();

    assert!(bridge.on_data_received(&store, &fresh));
    assert_eq!(store.items()[0].title, "Added elsewhere");
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{addr}/api"), ReqwestTransport::new());
    let store = TodoStore::new(HttpTodoRepository::new(client));
    store.load().await;

    let error = store.error().unwrap();
    assert!(error.starts_with("Network request failed: "), "{error}");
    assert!(!store.loading());
}
