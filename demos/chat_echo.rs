use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chatline::{
    logging, ChatSession, EnvConfig, HistoryStore, HotKeyFlow, JsonFileBackend, ProcessTerminal,
    SessionOptions,
};

const WELCOME_TEXT: &str =
    "Welcome to chat-echo!\nType a message and press Enter. Up/Down recall history, Ctrl+L clears, Ctrl+C exits.\n\n";

const RESPONSES: [&str; 6] = [
    "That's interesting! Tell me more.",
    "I see what you mean.",
    "Could you elaborate on that?",
    "That makes sense to me.",
    "I hadn't thought of it that way.",
    "Thanks for sharing that.",
];

fn dim(text: &str) -> String {
    format!("\x1b[2m{text}\x1b[22m")
}

fn bold(text: &str) -> String {
    format!("\x1b[1m{text}\x1b[22m")
}

fn pick_response() -> &'static str {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos() as usize)
        .unwrap_or(0);
    RESPONSES[nanos % RESPONSES.len()]
}

fn main() -> std::io::Result<()> {
    let config = EnvConfig::from_env();
    let debug_log = logging::init(&config);

    let mut terminal = ProcessTerminal::new();
    if let Some(path) = config.write_log.as_deref() {
        terminal = terminal.with_write_log(path);
    }

    let history = match config.history_file.clone() {
        Some(path) => HistoryStore::spawn_load(Arc::new(JsonFileBackend::new(path))),
        None => HistoryStore::in_memory(),
    };

    let options = SessionOptions {
        render_mode: config.render_mode,
        prompt: bold("> "),
        placeholder: "Send a message".to_string(),
    };
    let mut session = ChatSession::new(terminal, history, options);
    let handle = session.handle();

    let clear_handle = handle.clone();
    session.hotkeys_mut().on("ctrl+l", move |_, _| {
        clear_handle.clear();
        HotKeyFlow::Consumed
    });
    let draft_handle = handle.clone();
    session.hotkeys_mut().on("shift+tab", move |_, editor| {
        draft_handle.append(dim(&format!("[draft: {:?}]\n", editor.text())));
        HotKeyFlow::Consumed
    });

    let echo = handle.clone();
    session.set_on_submit(move |line| {
        echo.append(format!("{} {line}\n", bold("you:")));
        let stream = echo.clone();
        thread::spawn(move || {
            stream.append(bold("bot: "));
            for word in pick_response().split_inclusive(' ') {
                thread::sleep(Duration::from_millis(40));
                stream.append(word);
            }
            stream.append("\n\n");
        });
    });

    session.start()?;
    handle.append(dim(WELCOME_TEXT));
    let result = session.run();

    if config.debug {
        for record in debug_log.records() {
            eprintln!("{record}");
        }
    }
    result
}
