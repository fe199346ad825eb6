use chrono::NaiveDate;
use std::io;
use termo::cli::parse_cli;
use termo::controller::GameController;
use termo::info_log;
use termo::logging::init_logging;
use termo::mode::GameMode;
use termo::persistence::{FileStore, KeyValueStore, MemoryStore};
use termo::provisioning::{DailyWordService, today};
use termo::tui::TuiApp;
use termo::word_store::{DAILY_WORDS_FILE, FileWordStore, MemoryWordStore, WordStore};
use termo::wordbank::WordBank;

fn main() -> io::Result<()> {
    let cli = parse_cli();
    init_logging(cli.verbose, cli.resolved_log_file().as_deref())?;

    let bank = match &cli.wordbank_path {
        Some(path) => match WordBank::from_file(path) {
            Ok(bank) => bank,
            Err(e) => {
                eprintln!("Failed to load word bank from '{}': {e}", path.display());
                return Ok(());
            }
        },
        None => WordBank::embedded(),
    };
    if bank.is_empty() {
        eprintln!("The word bank has no five-letter words.");
        return Ok(());
    }
    info_log!("Loaded {} words", bank.len());

    let day = today();
    match cli.resolved_data_dir() {
        Some(dir) => {
            info_log!("Using data directory {}", dir.display());
            let word_store = FileWordStore::new(dir.join(DAILY_WORDS_FILE));
            play(bank, word_store, FileStore::new(dir), day, cli.mode)
        }
        None => {
            info_log!("Running without persistence");
            play(bank, MemoryWordStore::new(), MemoryStore::new(), day, cli.mode)
        }
    }
}

fn play<W: WordStore, K: KeyValueStore>(
    bank: WordBank,
    word_store: W,
    store: K,
    day: NaiveDate,
    mode: Option<GameMode>,
) -> io::Result<()> {
    let daily_words = DailyWordService::new(word_store, bank.clone());
    let mut controller = GameController::new(bank, daily_words, store, day, mode);

    let mut app = TuiApp::new()?;
    let result = app.run(&mut controller);
    app.cleanup()?;
    result
}
