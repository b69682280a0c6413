#![allow(clippy::unwrap_used)]

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use brush_manager::data::events::{self, DataEvent};
use brush_manager::data::{init_registry, with_registry_read, with_registry_write};
use brush_manager::{ContextMode, ManagerConfig};
use parking_lot::Mutex;

#[test]
fn subscribers_can_read_the_registry_during_writes() {
    let dir = tempfile::tempdir().unwrap();
    init_registry(&ManagerConfig::with_data_dir(dir.path())).unwrap();

    // Category count seen by the subscriber when the event arrives.
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = events::subscribe(move |event| {
        if let DataEvent::CategoryAdded { category, .. } = event {
            if category == "registry-events" {
                let count = with_registry_read(|registry| {
                    registry
                        .peek(ContextMode::Sculpt)
                        .map(|data| data.brush_cats.len())
                })
                .unwrap();
                sink.lock().push(count);
            }
        }
    });

    let (done, finished) = mpsc::channel();
    std::thread::spawn(move || {
        let added = with_registry_write(|registry| {
            registry
                .get_data(ContextMode::Sculpt)
                .brush_cats
                .add("Events", Some("registry-events"))
                .uuid()
                .to_string()
        });
        done.send(added.unwrap()).unwrap();
    });

    let added = finished.recv_timeout(Duration::from_secs(5)).unwrap();
    events::unsubscribe(id);

    assert_eq!(added, "registry-events");
    assert_eq!(*seen.lock(), vec![Some(1)]);
}
