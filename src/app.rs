use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;
use tracing::warn;

use crate::action::Action;
use crate::client::HnClient;
use crate::feed;
use crate::store::Store;
use crate::tui::Event;
use crate::types::Story;

pub struct App {
    /// Full sorted collection, hidden stories included. Hiding replaces the
    /// story at its index; nothing is ever removed.
    pub stories: Vec<Story>,
    /// Index into the exposed (non-hidden) collection.
    pub cursor: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    /// Ids skipped during the last load.
    pub failed: usize,
    pub should_quit: bool,
    limit: usize,
    concurrency: usize,
    /// Generation counter; completions from superseded loads are dropped.
    load_id: u64,
    client: Arc<HnClient>,
    store: Arc<Store>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        client: HnClient,
        store: Store,
        limit: usize,
        concurrency: usize,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            stories: Vec::new(),
            cursor: 0,
            loading: false,
            error: None,
            notice: None,
            failed: 0,
            should_quit: false,
            limit,
            concurrency,
            load_id: 0,
            client: Arc::new(client),
            store: Arc::new(store),
            action_tx,
        }
    }

    /// The navigable subset: every story not hidden, in collection order.
    pub fn exposed(&self) -> impl Iterator<Item = &Story> {
        self.stories.iter().filter(|s| !s.hidden)
    }

    pub fn exposed_len(&self) -> usize {
        self.exposed().count()
    }

    pub fn selected(&self) -> Option<&Story> {
        self.exposed().nth(self.cursor)
    }

    /// Map an exposed position back to its index in the full collection.
    fn underlying_index(&self, exposed_pos: usize) -> Option<usize> {
        self.stories
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.hidden)
            .nth(exposed_pos)
            .map(|(i, _)| i)
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::LoadFeed,
            Event::Key(key) => self.handle_key(key),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
            KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
            KeyCode::Char('g') => Action::GoToTop,
            KeyCode::Char('G') => Action::GoToBottom,
            KeyCode::Char('h') => Action::HideCurrent,
            KeyCode::Char('l') => Action::OpenLink,
            KeyCode::Enter => Action::OpenComments,
            KeyCode::Char('y') => Action::YankUrl,
            KeyCode::Char('r') => Action::LoadFeed,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if self.error.is_some() && !matches!(action, Action::Quit | Action::Error(_)) {
            self.error = None;
        }
        if self.notice.is_some() && !matches!(action, Action::None) {
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::MoveDown => {
                let len = self.exposed_len();
                if len > 0 && self.cursor < len - 1 {
                    self.cursor += 1;
                }
            }
            Action::MoveUp => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            Action::GoToTop => {
                self.cursor = 0;
            }
            Action::GoToBottom => {
                self.cursor = self.exposed_len().saturating_sub(1);
            }
            Action::HideCurrent => {
                self.hide_current();
            }
            Action::OpenLink => {
                if let Some(story) = self.selected() {
                    let url = story.link().to_string();
                    self.open_url(&url);
                }
            }
            Action::OpenComments => {
                if let Some(story) = self.selected() {
                    let url = story.original.clone();
                    self.open_url(&url);
                }
            }
            Action::YankUrl => {
                self.yank_url();
            }
            Action::LoadFeed => {
                self.loading = true;
                self.load_id += 1;
                self.spawn_load();
            }
            Action::FeedLoaded {
                stories,
                failed,
                load_id,
            } => {
                // A newer load was started while this one was in flight.
                if load_id != self.load_id {
                    return;
                }
                self.loading = false;
                self.stories = stories;
                self.failed = failed;
                self.cursor = 0;
            }
            Action::Error(msg) => {
                self.loading = false;
                self.error = Some(msg);
            }
            Action::None => {}
        }
    }

    /// Mark the story under the cursor hidden, persist the flag, and move
    /// the cursor to the next entry unless it was already on the last one.
    /// The story stays in `self.stories`; only the exposed view shrinks.
    fn hide_current(&mut self) {
        let len = self.exposed_len();
        if len == 0 {
            return;
        }
        let Some(idx) = self.underlying_index(self.cursor) else {
            return;
        };

        let mut story = self.stories[idx].clone();
        story.hidden = true;
        if let Err(e) = self.store.put(&story) {
            warn!(id = story.id, error = %e, "failed to persist hidden flag");
            self.error = Some(format!("failed to persist hide: {}", e));
        }
        self.stories[idx] = story;

        if self.cursor + 1 < len {
            self.cursor += 1;
        }
        self.cursor = self.cursor.min(self.exposed_len().saturating_sub(1));
    }

    fn open_url(&mut self, url: &str) {
        if let Err(e) = open::that(url) {
            warn!(url, error = %e, "failed to open browser");
            self.error = Some(format!("failed to open {}: {}", url, e));
        }
    }

    fn yank_url(&mut self) {
        let Some(story) = self.selected() else {
            return;
        };
        let url = story.link().to_string();
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(url.clone())) {
            Ok(()) => {
                self.notice = Some(format!("copied {}", url));
            }
            Err(e) => {
                self.error = Some(format!("clipboard error: {}", e));
            }
        }
    }

    fn spawn_load(&self) {
        let tx = self.action_tx.clone();
        let client = Arc::clone(&self.client);
        let store = Arc::clone(&self.store);
        let limit = self.limit;
        let concurrency = self.concurrency;
        let load_id = self.load_id;
        tokio::spawn(async move {
            match feed::load_best(&client, &store, limit, concurrency).await {
                Ok(load) => {
                    tx.send(Action::FeedLoaded {
                        stories: load.stories,
                        failed: load.failed,
                        load_id,
                    })
                    .ok();
                }
                Err(e) => {
                    tx.send(e.into()).ok();
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{sort_by_score, test_story};

    struct Fixture {
        app: App,
        store: Store,
        _dir: tempfile::TempDir,
        _rx: mpsc::UnboundedReceiver<Action>,
    }

    fn fixture_with(mut stories: Vec<Story>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("cache")).unwrap();
        let client = HnClient::new("http://localhost:1", "http://localhost:1").unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let mut app = App::new(client, store.clone(), 0, 4, tx);

        sort_by_score(&mut stories);
        app.update(Action::FeedLoaded {
            stories,
            failed: 0,
            load_id: 0,
        });

        Fixture {
            app,
            store,
            _dir: dir,
            _rx: rx,
        }
    }

    fn scenario_stories() -> Vec<Story> {
        vec![test_story(1, 10), test_story(2, 30), test_story(3, 20)]
    }

    fn exposed_ids(app: &App) -> Vec<u64> {
        app.exposed().map(|s| s.id).collect()
    }

    #[test]
    fn load_exposes_scenario_order() {
        let f = fixture_with(scenario_stories());
        assert_eq!(exposed_ids(&f.app), vec![2, 3, 1]);
        assert_eq!(f.app.cursor, 0);
    }

    #[test]
    fn move_down_never_passes_the_last_index() {
        let mut f = fixture_with(scenario_stories());
        for _ in 0..10 {
            f.app.update(Action::MoveDown);
        }
        assert_eq!(f.app.cursor, 2);
        assert!(f.app.selected().is_some());
    }

    #[test]
    fn move_down_on_empty_list_is_a_noop() {
        let mut f = fixture_with(Vec::new());
        f.app.update(Action::MoveDown);
        assert_eq!(f.app.cursor, 0);
    }

    #[test]
    fn move_up_stops_at_zero() {
        let mut f = fixture_with(scenario_stories());
        f.app.update(Action::MoveUp);
        assert_eq!(f.app.cursor, 0);
        f.app.update(Action::MoveDown);
        f.app.update(Action::MoveUp);
        f.app.update(Action::MoveUp);
        assert_eq!(f.app.cursor, 0);
    }

    #[test]
    fn go_to_top_and_bottom() {
        let mut f = fixture_with(scenario_stories());
        f.app.update(Action::GoToBottom);
        assert_eq!(f.app.cursor, 2);
        f.app.update(Action::GoToTop);
        assert_eq!(f.app.cursor, 0);
    }

    #[test]
    fn hide_at_top_persists_and_advances() {
        let mut f = fixture_with(scenario_stories());
        f.app.update(Action::HideCurrent);

        // Item 2 (score 30, cursor 0) is hidden and persisted as such.
        assert!(f.store.get(2).unwrap().hidden);
        assert_eq!(exposed_ids(&f.app), vec![3, 1]);
        // Cursor advanced past the hidden slot: position 1 of [3, 1] is item 1.
        assert_eq!(f.app.cursor, 1);
        assert_eq!(f.app.selected().unwrap().id, 1);
    }

    #[test]
    fn hidden_story_stays_in_the_underlying_collection() {
        let mut f = fixture_with(scenario_stories());
        f.app.update(Action::HideCurrent);
        assert_eq!(f.app.stories.len(), 3);
        assert_eq!(f.app.exposed_len(), 2);
    }

    #[test]
    fn hide_on_last_entry_clamps_the_cursor() {
        let mut f = fixture_with(scenario_stories());
        f.app.update(Action::GoToBottom);
        f.app.update(Action::HideCurrent);

        assert_eq!(exposed_ids(&f.app), vec![2, 3]);
        assert_eq!(f.app.cursor, 1);
        assert_eq!(f.app.selected().unwrap().id, 3);
    }

    #[test]
    fn hiding_everything_leaves_an_empty_exposed_list() {
        let mut f = fixture_with(scenario_stories());
        f.app.update(Action::HideCurrent);
        f.app.update(Action::HideCurrent);
        f.app.update(Action::HideCurrent);

        assert_eq!(f.app.exposed_len(), 0);
        assert_eq!(f.app.cursor, 0);
        assert!(f.app.selected().is_none());
        // Another hide on the empty list must not panic or persist anything.
        f.app.update(Action::HideCurrent);
        assert_eq!(f.app.cursor, 0);
    }

    #[test]
    fn hidden_stories_are_skipped_when_mapping_the_cursor() {
        let mut f = fixture_with(scenario_stories());
        f.app.update(Action::HideCurrent); // hides 2, cursor now on 1
        f.app.update(Action::MoveUp); // back to 3
        assert_eq!(f.app.selected().unwrap().id, 3);
        f.app.update(Action::HideCurrent); // hides 3
        assert_eq!(exposed_ids(&f.app), vec![1]);
        assert_eq!(f.app.selected().unwrap().id, 1);
    }

    #[tokio::test]
    async fn stale_load_results_are_discarded() {
        let mut f = fixture_with(Vec::new());
        f.app.update(Action::LoadFeed); // generation 1
        f.app.update(Action::LoadFeed); // generation 2 supersedes it

        f.app.update(Action::FeedLoaded {
            stories: scenario_stories(),
            failed: 0,
            load_id: 1,
        });
        assert!(f.app.loading);
        assert!(f.app.stories.is_empty());

        f.app.update(Action::FeedLoaded {
            stories: scenario_stories(),
            failed: 2,
            load_id: 2,
        });
        assert!(!f.app.loading);
        assert_eq!(f.app.stories.len(), 3);
        assert_eq!(f.app.failed, 2);
    }

    #[test]
    fn error_is_cleared_by_the_next_action() {
        let mut f = fixture_with(scenario_stories());
        f.app.update(Action::Error("boom".to_string()));
        assert_eq!(f.app.error.as_deref(), Some("boom"));
        f.app.update(Action::MoveDown);
        assert!(f.app.error.is_none());
    }

    #[test]
    fn init_event_starts_a_load_and_keys_map_to_actions() {
        let f = fixture_with(Vec::new());
        assert!(matches!(f.app.handle_event(Event::Init), Action::LoadFeed));
        assert!(matches!(f.app.handle_event(Event::Tick), Action::None));

        let key = |c| Event::Key(KeyEvent::from(KeyCode::Char(c)));
        assert!(matches!(f.app.handle_event(key('j')), Action::MoveDown));
        assert!(matches!(f.app.handle_event(key('k')), Action::MoveUp));
        assert!(matches!(f.app.handle_event(key('h')), Action::HideCurrent));
        assert!(matches!(f.app.handle_event(key('l')), Action::OpenLink));
        assert!(matches!(
            f.app.handle_event(Event::Key(KeyEvent::from(KeyCode::Enter))),
            Action::OpenComments
        ));
        assert!(matches!(f.app.handle_event(key('r')), Action::LoadFeed));
        assert!(matches!(f.app.handle_event(key('q')), Action::Quit));
        assert!(matches!(f.app.handle_event(key('x')), Action::None));
    }
}
