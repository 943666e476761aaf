use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
use tickbound::{well_known, Dispatcher, ResourceKind, TickHub};

#[derive(Clone, Debug)]
struct Texture {
    name: String,
    loaded_on: thread::ThreadId,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let hub = Arc::new(TickHub::new());
    let loader = |name: &str| -> Result<Texture, String> {
        if name.starts_with("missing") {
            return Err(format!("no texture named `{}`", name));
        }
        Ok(Texture {
            name: name.to_owned(),
            loaded_on: thread::current().id(),
        })
    };
    let emotes = Texture {
        name: well_known::EMOTE_SPRITE_SHEET.to_owned(),
        loaded_on: thread::current().id(),
    };
    let dispatcher = Dispatcher::builder(loader, hub.clone())
        .sprite_sheet(well_known::EMOTE_SPRITE_SHEET, emotes)
        .wait_timeout(Duration::from_secs(5))
        .build();
    dispatcher.initialize().expect("main thread is the owner");

    let requests = [
        (well_known::EMOTE_SPRITE_SHEET, ResourceKind::SpriteSheet),
        ("Maps/springobjects", ResourceKind::Image),
        ("Characters/Abigail", ResourceKind::Image),
        ("missing/nothing", ResourceKind::Image),
        ("TileSheets/Craftables", ResourceKind::SpriteSheet),
    ];
    let workers: Vec<_> = requests
        .iter()
        .map(|(name, kind)| {
            let dispatcher = dispatcher.clone();
            let name = name.to_string();
            let kind = *kind;
            thread::spawn(move || {
                let result = dispatcher.load(&name, kind);
                (name, kind, result)
            })
        })
        .collect();

    // Stand-in for the host's frame loop.
    let started = Instant::now();
    let mut frames = 0;
    while workers.iter().any(|worker| !worker.is_finished()) {
        hub.fire();
        frames += 1;
        thread::sleep(Duration::from_millis(16));
    }

    let owner = thread::current().id();
    for worker in workers {
        let (name, kind, result) = worker.join().expect("worker panicked");
        match result {
            Ok(texture) => println!(
                "{} `{}` -> {} (loaded on owner thread: {})",
                kind,
                name,
                texture.name,
                texture.loaded_on == owner
            ),
            Err(error) => println!("{} `{}` -> {}", kind, name, error),
        }
    }
    println!("{} frames in {:?}", frames, started.elapsed());
}
