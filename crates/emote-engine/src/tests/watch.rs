use std::sync::{Arc, Mutex};

use chat_dom::DomTree;

use super::*;
use crate::watch::{ContainerKind, ContainerWatcher};

#[tokio::test]
async fn discovery_backfills_existing_messages() {
    init_logging();
    let mut tree = DomTree::new();
    let page = build_page(&mut tree);
    let (first, _) = push_message(&mut tree, page.timeline, "hi :PepeLaugh:");
    let (second, _) = push_message(&mut tree, page.timeline, ":monkaS: hello");
    let tree = Arc::new(Mutex::new(tree));
    let resolver = resolver(StubDirectory::with_emotes(&["PepeLaugh", "monkaS"]));
    let config = config();

    let mut watcher = ContainerWatcher::new(ContainerKind::Timeline);
    assert!(!watcher.is_attached());
    watcher.discover(&tree, &resolver, &config).await;
    assert!(watcher.is_attached());

    let guard = tree.lock().unwrap();
    assert_eq!(guard.observer_count(), 1);
    assert_eq!(
        body_shape(&guard, first),
        vec![
            ("#text:hi ".into(), None),
            ("img".into(), Some("PepeLaugh".into())),
        ]
    );
    assert_eq!(
        body_shape(&guard, second),
        vec![
            ("img".into(), Some("monkaS".into())),
            ("#text: hello".into(), None),
        ]
    );
}

#[tokio::test]
async fn discovery_without_container_is_a_noop() {
    init_logging();
    let tree = Arc::new(Mutex::new(DomTree::new()));
    let resolver = resolver(StubDirectory::with_emotes(&[]));
    let config = config();

    let mut watcher = ContainerWatcher::new(ContainerKind::Timeline);
    watcher.discover(&tree, &resolver, &config).await;
    assert!(!watcher.is_attached());
    assert_eq!(tree.lock().unwrap().observer_count(), 0);
}

#[tokio::test]
async fn added_messages_are_scanned_and_indicators_ignored() {
    init_logging();
    let mut tree = DomTree::new();
    let page = build_page(&mut tree);
    let timeline = page.timeline;
    let tree = Arc::new(Mutex::new(tree));
    let resolver = resolver(StubDirectory::with_emotes(&["PepeLaugh"]));
    let config = config();

    let mut watcher = ContainerWatcher::new(ContainerKind::Timeline);
    watcher.discover(&tree, &resolver, &config).await;

    let (message, indicator) = {
        let mut guard = tree.lock().unwrap();
        let (message, _) = push_message(&mut guard, timeline, ":PepeLaugh:");
        // Typing indicator: a direct addition without the message class.
        let indicator = guard.create_element("div");
        guard.add_class(indicator, "typing-indicator");
        guard.append_child(timeline, indicator).unwrap();
        (message, indicator)
    };

    watcher.pump(&tree, &resolver, &config).await;

    let guard = tree.lock().unwrap();
    assert_eq!(
        body_shape(&guard, message),
        vec![("img".into(), Some("PepeLaugh".into()))]
    );
    assert!(guard.is_attached(indicator));
    assert_eq!(resolver.directory().calls_made(), 1);
}

#[tokio::test]
async fn removed_container_tears_down_and_reattach_backfills() {
    init_logging();
    let mut tree = DomTree::new();
    let page = build_page(&mut tree);
    let timeline = page.timeline;
    push_message(&mut tree, page.timeline, ":PepeLaugh:");
    let tree = Arc::new(Mutex::new(tree));
    let resolver = resolver(StubDirectory::with_emotes(&["PepeLaugh"]));
    let config = config();

    let mut watcher = ContainerWatcher::new(ContainerKind::Timeline);
    watcher.discover(&tree, &resolver, &config).await;
    assert!(watcher.is_attached());

    // Panel closed: container leaves the tree.
    tree.lock().unwrap().remove(timeline).unwrap();
    watcher.pump(&tree, &resolver, &config).await;
    assert!(!watcher.is_attached());
    assert_eq!(tree.lock().unwrap().observer_count(), 0);

    // Panel reopened: fresh container, prior rewrites lost.
    let fresh = {
        let mut guard = tree.lock().unwrap();
        let root = guard.root();
        let list = guard.create_element("ul");
        guard.add_class(list, "messages-list");
        guard.append_child(root, list).unwrap();
        let (message, _) = push_message(&mut guard, list, ":PepeLaugh: again");
        message
    };

    watcher.discover(&tree, &resolver, &config).await;
    assert!(watcher.is_attached());
    let guard = tree.lock().unwrap();
    assert_eq!(guard.observer_count(), 1);
    assert_eq!(
        body_shape(&guard, fresh),
        vec![
            ("img".into(), Some("PepeLaugh".into())),
            ("#text: again".into(), None),
        ]
    );
    // The second resolution came from the cache, not the network.
    assert_eq!(resolver.directory().calls_made(), 1);
}

#[tokio::test]
async fn discovery_is_idempotent_while_attached() {
    init_logging();
    let mut tree = DomTree::new();
    let page = build_page(&mut tree);
    push_message(&mut tree, page.timeline, ":PepeLaugh:");
    let tree = Arc::new(Mutex::new(tree));
    let resolver = resolver(StubDirectory::with_emotes(&["PepeLaugh"]));
    let config = config();

    let mut watcher = ContainerWatcher::new(ContainerKind::Timeline);
    watcher.discover(&tree, &resolver, &config).await;
    watcher.discover(&tree, &resolver, &config).await;
    watcher.discover(&tree, &resolver, &config).await;

    // One observer, one backfill, one network call.
    assert_eq!(tree.lock().unwrap().observer_count(), 1);
    assert_eq!(resolver.directory().calls_made(), 1);
}
