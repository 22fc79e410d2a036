use std::rc::Rc;
use std::time::Instant;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::engine::levels::GameLevel;
use crate::engine::progression::{ProgressUpdate, ProgressionEngine, UserProgress};
use crate::notify::{Notification, NotificationSink};
use crate::quotes::QuoteSelector;
use crate::session::input::{Transition, TypingSession};
use crate::session::result::{SessionCompleted, SessionRecord};
use crate::store::schema::UserStats;
use crate::store::{HistoryStore, ProgressStore, QuoteSource, StoreError};

/// What happens once the grace delay after a finished quote runs out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AfterFinish {
    Repeat,
    NextQuote,
}

/// Owns the running session and wires it to quote selection, progression
/// and persistence.
pub struct App {
    pub config: Config,
    pub session: TypingSession,
    pub last_result: Option<SessionCompleted>,
    pub last_update: Option<ProgressUpdate>,
    pub should_quit: bool,
    pending: Option<(Instant, AfterFinish)>,
    selector: QuoteSelector,
    progression: ProgressionEngine,
    quotes: Rc<dyn QuoteSource>,
    history: Rc<dyn HistoryStore>,
    sinks: Vec<Rc<dyn NotificationSink>>,
}

impl App {
    pub fn new<S>(config: Config, store: Rc<S>) -> Self
    where
        S: QuoteSource + HistoryStore + ProgressStore + 'static,
    {
        Self::with_rng(config, store, SmallRng::from_entropy())
    }

    pub fn with_rng<S>(config: Config, store: Rc<S>, rng: SmallRng) -> Self
    where
        S: QuoteSource + HistoryStore + ProgressStore + 'static,
    {
        let mut selector = QuoteSelector::with_rng(config.script_id.clone(), rng);
        let quote = selector.load_next(&*store);

        let mut session = TypingSession::new(quote);
        session.set_death_mode(config.death_mode);
        session.set_repeat_mode(config.repeat_mode);

        let progression = ProgressionEngine::new(store.clone(), config.level_table());
        let quotes: Rc<dyn QuoteSource> = store.clone();
        let history: Rc<dyn HistoryStore> = store;

        Self {
            config,
            session,
            last_result: None,
            last_update: None,
            should_quit: false,
            pending: None,
            selector,
            progression,
            quotes,
            history,
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: Rc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }

    // --- Typing ---

    pub fn handle_input(&mut self, ch: char) -> Transition {
        self.handle_input_at(ch, Instant::now())
    }

    pub fn handle_input_at(&mut self, ch: char, now: Instant) -> Transition {
        let transition = self.session.handle_input_at(ch, now);
        if let Transition::Finished(completed) = &transition {
            self.on_finished(completed.clone(), now);
        }
        transition
    }

    pub fn smart_backspace(&mut self) -> Transition {
        self.session.smart_backspace()
    }

    /// Restart the current quote from scratch.
    pub fn reset_test(&mut self) -> Transition {
        self.pending = None;
        self.session.reset_test()
    }

    pub fn load_new_quote(&mut self) -> Transition {
        self.pending = None;
        let quote = self.selector.load_next(self.quotes.as_ref());
        debug!("loaded quote {}", quote.id);
        self.session.load_quote(quote)
    }

    pub fn toggle_death_mode(&mut self) -> bool {
        let on = self.session.toggle_death_mode();
        self.config.death_mode = on;
        on
    }

    pub fn toggle_repeat_mode(&mut self) -> bool {
        let on = self.session.toggle_repeat_mode();
        self.config.repeat_mode = on;
        on
    }

    pub fn on_tick(&mut self) {
        self.on_tick_at(Instant::now());
    }

    /// Refresh live stats and run the post-finish action once its delay
    /// has passed.
    pub fn on_tick_at(&mut self, now: Instant) {
        self.session.on_tick(now);
        match self.pending {
            Some((due, action)) if now >= due => {
                self.pending = None;
                match action {
                    AfterFinish::Repeat => {
                        self.session.reset_test();
                    }
                    AfterFinish::NextQuote => {
                        self.load_new_quote();
                    }
                }
            }
            _ => {}
        }
    }

    pub fn pending(&self) -> Option<(Instant, AfterFinish)> {
        self.pending
    }

    fn on_finished(&mut self, completed: SessionCompleted, now: Instant) {
        if let Some(script_id) = self.config.script_id.as_deref()
            && !self.config.user_id.is_empty()
        {
            let record = SessionRecord::from_completed(&completed, &self.config.user_id, script_id);
            if let Err(e) = self.history.record_session(&record) {
                warn!("failed to record session: {e}");
                self.notify(Notification::Error(format!("could not save session: {e}")));
            }
        }

        let update = self.progression.consume(&self.config.user_id, &completed);
        info!(
            "quote {} finished: {} wpm, {}% accuracy, successful: {}",
            completed.quote_id, completed.stats.wpm, completed.stats.accuracy, update.successful
        );
        if let Some(event) = self.progression.level_just_completed() {
            self.notify(Notification::LevelCompleted(event));
        }

        let action = if self.session.repeat_mode() {
            AfterFinish::Repeat
        } else {
            AfterFinish::NextQuote
        };
        self.pending = Some((now + self.config.repeat_delay(), action));
        self.last_result = Some(completed);
        self.last_update = Some(update);
    }

    fn notify(&self, notification: Notification) {
        for sink in &self.sinks {
            sink.notify(notification.clone());
        }
    }

    // --- Progression ---

    pub fn progress(&mut self) -> UserProgress {
        let user_id = self.config.user_id.clone();
        self.progression.progress(&user_id).clone()
    }

    pub fn level_parameters(&mut self) -> GameLevel {
        let level = self.progress().current_level;
        self.progression.get_level_parameters(level)
    }

    pub fn wpm_threshold(&mut self) -> Option<f64> {
        let user_id = self.config.user_id.clone();
        self.progression.current_wpm_threshold(&user_id)
    }

    pub fn attempts_remaining(&mut self) -> u32 {
        let user_id = self.config.user_id.clone();
        self.progression.attempts_remaining(&user_id)
    }

    pub fn reset_progress(&mut self) -> UserProgress {
        let user_id = self.config.user_id.clone();
        self.last_update = None;
        self.progression.reset_progress(&user_id).clone()
    }

    pub fn user_stats(&self) -> Result<UserStats, StoreError> {
        self.history.user_stats(&self.config.user_id)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::notify::QueueSink;
    use crate::quotes::Quote;
    use crate::store::memory::MemoryStore;

    fn store() -> Rc<MemoryStore> {
        Rc::new(MemoryStore::new().with_script(
            "drills",
            vec![Quote::new("d1", "ab cd"), Quote::new("d2", "ef gh")],
        ))
    }

    fn config() -> Config {
        Config {
            script_id: Some("drills".to_string()),
            user_id: "alice".to_string(),
            ..Config::default()
        }
    }

    fn app(store: &Rc<MemoryStore>) -> App {
        App::with_rng(config(), store.clone(), SmallRng::seed_from_u64(7))
    }

    fn type_quote(app: &mut App, start: Instant) -> Instant {
        let text = app.session.quote().content.clone();
        let mut now = start;
        for ch in text.chars() {
            now += Duration::from_millis(300);
            app.handle_input_at(ch, now);
        }
        now
    }

    #[test]
    fn test_finished_session_is_recorded_once() {
        let store = store();
        let mut app = app(&store);
        let end = type_quote(&mut app, Instant::now());
        assert!(app.session.is_finished());

        // Input after the finish is dropped and records nothing more.
        app.handle_input_at('x', end);
        let sessions = store.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].user_id, "alice");
        assert_eq!(sessions[0].script_id, "drills");
        assert_eq!(sessions[0].quote_id, app.session.quote().id);
    }

    #[test]
    fn test_no_history_without_script() {
        let store = store();
        let mut cfg = config();
        cfg.script_id = None;
        let mut app = App::with_rng(cfg, store.clone(), SmallRng::seed_from_u64(1));
        type_quote(&mut app, Instant::now());
        assert!(app.session.is_finished());
        assert!(store.sessions().is_empty());
        // Progression still hears about it.
        assert_eq!(app.progress().level_attempts_used, 1);
    }

    #[test]
    fn test_next_quote_after_grace_delay() {
        let store = store();
        let mut app = app(&store);
        let first = app.session.quote().id.clone();
        let end = type_quote(&mut app, Instant::now());

        app.on_tick_at(end + Duration::from_millis(100));
        assert!(app.session.is_finished());

        app.on_tick_at(end + app.config.repeat_delay());
        assert!(!app.session.is_finished());
        assert_ne!(app.session.quote().id, first);
        assert!(app.pending().is_none());
    }

    #[test]
    fn test_repeat_mode_represents_same_quote() {
        let store = store();
        let mut app = app(&store);
        assert!(app.toggle_repeat_mode());
        let first = app.session.quote().id.clone();
        let end = type_quote(&mut app, Instant::now());
        assert_eq!(app.pending().map(|(_, a)| a), Some(AfterFinish::Repeat));

        app.on_tick_at(end + Duration::from_secs(5));
        assert_eq!(app.session.quote().id, first);
        assert!(!app.session.is_finished());
        assert!(!app.session.is_active());
        assert_eq!(app.session.counts().correct, 0);
    }

    #[test]
    fn test_reset_cancels_pending_action() {
        let store = store();
        let mut app = app(&store);
        let first = app.session.quote().id.clone();
        let end = type_quote(&mut app, Instant::now());
        app.reset_test();
        app.on_tick_at(end + Duration::from_secs(5));
        assert_eq!(app.session.quote().id, first);
    }

    #[test]
    fn test_level_completion_is_notified() {
        let store = store();
        let sink = Rc::new(QueueSink::new());
        let mut cfg = config();
        let mut level_one = cfg.level_table().get_level_parameters(1);
        level_one.required_quotes = 1;
        cfg.levels = Some(vec![level_one]);
        let mut app = App::with_rng(cfg, store.clone(), SmallRng::seed_from_u64(3))
            .with_sink(sink.clone());

        type_quote(&mut app, Instant::now());
        match sink.pop() {
            Some(Notification::LevelCompleted(e)) => {
                assert_eq!(e.completed_level, 1);
                assert_eq!(e.next_level, 2);
            }
            other => panic!("expected level completion, got {other:?}"),
        }
        assert_eq!(app.progress().current_level, 2);
        assert!(app.last_update.as_ref().unwrap().level_completed.is_some());
    }

    #[test]
    fn test_toggles_mirror_into_config() {
        let store = store();
        let mut app = app(&store);
        assert!(app.toggle_death_mode());
        assert!(app.config.death_mode);
        assert!(app.session.death_mode());
        assert!(!app.toggle_death_mode());
        assert!(!app.config.death_mode);
    }

    #[test]
    fn test_reset_progress() {
        let store = store();
        let mut app = app(&store);
        type_quote(&mut app, Instant::now());
        assert_eq!(app.progress().level_attempts_used, 1);
        let fresh = app.reset_progress();
        assert_eq!(fresh, UserProgress::new("alice"));
        assert!(app.last_update.is_none());
    }

    #[test]
    fn test_user_stats_reads_history() {
        let store = store();
        let mut app = app(&store);
        type_quote(&mut app, Instant::now());
        let stats = app.user_stats().unwrap();
        assert_eq!(stats.sessions, 1);
        assert!(stats.best_wpm > 0.0);
    }
}
