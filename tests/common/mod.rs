#![allow(dead_code)]

use parking_lot::Mutex;
use std::{
    sync::Arc,
    thread::{self, JoinHandle, ThreadId},
    time::{Duration, Instant},
};
use tickbound::{well_known, ContentLoader, DispatchError, Dispatcher, ResourceKind, TickHub};

pub const MISSING: &str = "void";
pub const DEADLINE: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Texture(pub String);

impl Texture {
    pub fn content(name: &str) -> Self {
        Texture(format!("content:{}", name))
    }

    pub fn global(name: &str) -> Self {
        Texture(format!("global:{}", name))
    }
}

/// Content loader that remembers every call and the thread it was made on.
#[derive(Default)]
pub struct Library {
    calls: Mutex<Vec<(String, ThreadId)>>,
}

impl Library {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn calls_for(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|(n, _)| n == name).count()
    }

    pub fn threads(&self) -> Vec<ThreadId> {
        self.calls.lock().iter().map(|(_, id)| *id).collect()
    }
}

impl ContentLoader for Library {
    type Resource = Texture;
    type Error = String;

    fn load(&self, name: &str) -> Result<Texture, String> {
        self.calls
            .lock()
            .push((name.to_owned(), thread::current().id()));
        if name == MISSING {
            Err(format!("no content named `{}`", name))
        } else {
            Ok(Texture::content(name))
        }
    }
}

pub type TestDispatcher = Dispatcher<Library, Arc<TickHub>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds a dispatcher with the emote sheet registered as a global, without an owner.
pub fn dispatcher() -> (TestDispatcher, Arc<TickHub>) {
    init_logger();
    let hub = Arc::new(TickHub::new());
    let dispatcher = Dispatcher::builder(Library::default(), hub.clone())
        .sprite_sheet(
            well_known::EMOTE_SPRITE_SHEET,
            Texture::global(well_known::EMOTE_SPRITE_SHEET),
        )
        .build();
    (dispatcher, hub)
}

/// Same as [`dispatcher()`], with the calling thread initialized as the owner.
pub fn owned_dispatcher() -> (TestDispatcher, Arc<TickHub>) {
    let (dispatcher, hub) = dispatcher();
    dispatcher.initialize().unwrap();
    (dispatcher, hub)
}

pub fn spawn_load(
    dispatcher: &TestDispatcher,
    name: &str,
    kind: ResourceKind,
) -> JoinHandle<Result<Texture, DispatchError>> {
    let dispatcher = dispatcher.clone();
    let name = name.to_owned();
    thread::spawn(move || dispatcher.load(&name, kind))
}

/// Spins without ticking until `condition` holds.
pub fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + DEADLINE;
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        thread::sleep(Duration::from_millis(1));
    }
}

/// Fires the hub from the calling thread until every worker has finished.
pub fn pump<T>(hub: &TickHub, workers: Vec<JoinHandle<T>>) -> Vec<T> {
    let deadline = Instant::now() + DEADLINE;
    while workers.iter().any(|worker| !worker.is_finished()) {
        assert!(Instant::now() < deadline, "workers never finished");
        hub.fire();
        thread::sleep(Duration::from_millis(1));
    }
    workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .collect()
}
