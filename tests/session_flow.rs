use std::rc::Rc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use keyladder::app::App;
use keyladder::config::Config;
use keyladder::notify::{Notification, QueueSink};
use keyladder::quotes::Quote;
use keyladder::session::Transition;
use keyladder::session::tokenizer::CharState;
use keyladder::store::json_store::JsonStore;
use keyladder::store::{HistoryStore, ProgressStore};

fn json_store(dir: &TempDir) -> Rc<JsonStore> {
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    store
        .save_script(
            "warmup",
            vec![
                Quote::new("w1", "ab cd"),
                Quote::new("w2", "ef gh"),
                Quote::new("w3", "ij kl"),
            ],
        )
        .unwrap();
    Rc::new(store)
}

fn config() -> Config {
    Config {
        user_id: "tester".to_string(),
        script_id: Some("warmup".to_string()),
        ..Config::default()
    }
}

/// Types the current quote perfectly, one key every 250ms.
fn type_current(app: &mut App, mut now: Instant) -> (Transition, Instant) {
    let text = app.session.quote().content.clone();
    let mut last = Transition::Ignored;
    for ch in text.chars() {
        now += Duration::from_millis(250);
        last = app.handle_input_at(ch, now);
    }
    (last, now)
}

#[test]
fn typing_a_quote_records_history_and_progress() {
    let dir = TempDir::new().unwrap();
    let store = json_store(&dir);
    let mut app = App::with_rng(config(), store.clone(), SmallRng::seed_from_u64(11));

    let (last, _) = type_current(&mut app, Instant::now());
    let completed = match last {
        Transition::Finished(completed) => completed,
        other => panic!("expected finish, got {other:?}"),
    };
    assert_eq!(completed.stats.correct_chars, 4);
    assert_eq!(completed.stats.incorrect_chars, 0);
    assert_eq!(completed.stats.accuracy, 100.0);
    assert!(completed.stats.wpm > 0.0);

    let stats = store.user_stats("tester").unwrap();
    assert_eq!(stats.sessions, 1);
    assert_eq!(stats.best_wpm, completed.stats.wpm);

    let saved = store.get_progress("tester").unwrap().unwrap();
    assert_eq!(saved.level_attempts_used, 1);
    assert_eq!(saved.successful_quotes_count, 1);
    assert_eq!(saved.baseline_wpm, Some(completed.stats.wpm));
    assert!(saved.completed_quotes.contains(&completed.quote_id));
}

#[test]
fn progress_carries_over_to_a_new_app() {
    let dir = TempDir::new().unwrap();
    let store = json_store(&dir);
    {
        let mut app = App::with_rng(config(), store.clone(), SmallRng::seed_from_u64(2));
        type_current(&mut app, Instant::now());
    }

    let reopened = Rc::new(JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap());
    let mut app = App::with_rng(config(), reopened, SmallRng::seed_from_u64(3));
    assert_eq!(app.progress().level_attempts_used, 1);
    assert!(app.wpm_threshold().is_some());
}

#[test]
fn rotation_visits_every_quote_before_repeating() {
    let dir = TempDir::new().unwrap();
    let store = json_store(&dir);
    let mut app = App::with_rng(config(), store, SmallRng::seed_from_u64(5));

    let mut seen = vec![app.session.quote().id.clone()];
    let mut now = Instant::now();
    for _ in 0..2 {
        let (_, end) = type_current(&mut app, now);
        now = end + app.config.repeat_delay();
        app.on_tick_at(now);
        seen.push(app.session.quote().id.clone());
    }
    seen.sort();
    assert_eq!(seen, vec!["w1", "w2", "w3"]);
}

#[test]
fn climbing_a_level_notifies_and_raises_the_bar() {
    let dir = TempDir::new().unwrap();
    let store = json_store(&dir);
    let sink = Rc::new(QueueSink::new());
    let mut app =
        App::with_rng(config(), store.clone(), SmallRng::seed_from_u64(9)).with_sink(sink.clone());

    let required = app.level_parameters().required_quotes;
    let mut now = Instant::now();
    for _ in 0..required {
        let (_, end) = type_current(&mut app, now);
        now = end + app.config.repeat_delay();
        app.on_tick_at(now);
    }

    let notes = sink.drain();
    assert_eq!(notes.len(), 1);
    assert!(matches!(&notes[0], Notification::LevelCompleted(e) if e.completed_level == 1));

    let progress = app.progress();
    assert_eq!(progress.current_level, 2);
    assert_eq!(progress.successful_quotes_count, 0);
    assert_eq!(store.get_progress("tester").unwrap().unwrap().current_level, 2);
}

#[test]
fn death_mode_restarts_without_counting_an_attempt() {
    let dir = TempDir::new().unwrap();
    let store = json_store(&dir);
    let mut cfg = config();
    cfg.death_mode = true;
    let mut app = App::with_rng(cfg, store.clone(), SmallRng::seed_from_u64(4));

    let now = Instant::now();
    let first = app.session.quote().content.chars().next().unwrap();
    app.handle_input_at(first, now);
    let t = app.handle_input_at('#', now + Duration::from_millis(200));
    assert_eq!(t, Transition::Died { failures: 1 });
    assert_eq!(app.session.current_word_index(), 0);
    assert_eq!(app.session.current_char_index(), 0);
    assert!(!app.session.is_active());

    assert!(store.get_progress("tester").unwrap().is_none());
    assert_eq!(store.user_stats("tester").unwrap().sessions, 0);
}

#[test]
fn smart_backspace_rewinds_to_start_of_error_run() {
    let dir = TempDir::new().unwrap();
    let store = json_store(&dir);
    let mut app = App::with_rng(config(), store, SmallRng::seed_from_u64(6));

    let now = Instant::now();
    let first = app.session.quote().content.chars().next().unwrap();
    app.handle_input_at(first, now);
    app.handle_input_at('#', now);
    app.smart_backspace();
    assert_eq!(app.session.current_word_index(), 0);
    assert_eq!(app.session.current_char_index(), 0);
    assert_eq!(
        app.session.words()[0].characters[0].state,
        CharState::Current
    );
    assert_eq!(app.session.counts().incorrect, 1);
}
