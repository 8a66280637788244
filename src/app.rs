use std::sync::Arc;
use ratatui::layout::Rect;
use tracing::info;
use crate::auth::AuthForm;
use crate::chat::ChatSession;
use crate::config::Config;
use crate::metrics::{MetricSnapshot, MetricStore};
use crate::navigation::{NavLink, Navigator, Page};
use crate::viewer::ViewerHandle;
use crate::workout::{PlanGenerator, WorkoutPlanner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// All session state, owned by the event loop and handed to handlers
pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub navigator: Navigator,

    // Account page
    pub auth: AuthForm,
    pub signed_in_as: Option<String>,

    // Dashboard
    pub metric_store: MetricStore,
    pub displayed_metrics: Option<MetricSnapshot>,
    pub workout_focus: String,
    pub planner: WorkoutPlanner,

    // Coach chat
    pub chat: ChatSession,
    pub chat_input: String,
    pub chat_cursor: usize,
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Landing
    pub viewer: ViewerHandle,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Click targets, updated during render
    pub nav_areas: Vec<(NavLink, Rect)>,
    pub get_started_area: Option<Rect>,
}

impl App {
    pub fn new(config: &Config, generator: Arc<dyn PlanGenerator>) -> Self {
        let mut navigator = Navigator::new();
        navigator.show_page(Some(Page::Landing));

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            navigator,

            auth: AuthForm::new(),
            signed_in_as: None,

            metric_store: MetricStore::new(),
            displayed_metrics: None,
            workout_focus: String::new(),
            planner: WorkoutPlanner::new(generator),

            chat: ChatSession::new(config.chat_delay()),
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            viewer: ViewerHandle::init(Rect::default(), Rect::default()),

            animation_frame: 0,

            nav_areas: Vec::new(),
            get_started_area: None,
        }
    }

    pub fn current_page(&self) -> Option<Page> {
        self.navigator.visible()
    }

    pub fn show_page(&mut self, page: Page) {
        self.navigator.show_page(Some(page));
        self.input_mode = InputMode::Normal;
    }

    pub fn follow_link(&mut self, link: NavLink) {
        self.show_page(link.target());
        if let Some(mode) = link.auth_mode() {
            self.auth.select(mode);
        }
    }

    /// Submit the account form. On success the user lands on the dashboard
    /// with fresh metrics; on failure the form shows the error inline.
    pub fn submit_auth(&mut self) -> bool {
        match self.auth.submit() {
            Ok(event) => {
                info!(mode = ?event.mode, "signed in");
                self.signed_in_as = Some(event.email);
                self.show_page(Page::Dashboard);
                self.refresh_metrics();
                true
            }
            Err(_) => false,
        }
    }

    pub fn refresh_metrics(&mut self) {
        self.displayed_metrics = Some(self.metric_store.get());
    }

    pub fn request_workout(&mut self) -> bool {
        let snapshot = self.metric_store.get();
        let focus = self.workout_focus.clone();
        self.planner.request(snapshot, &focus)
    }

    /// Blank input is left in place untouched
    pub fn send_chat(&mut self) {
        if self.chat.send(&self.chat_input) {
            self.chat_input.clear();
            self.chat_cursor = 0;
            self.scroll_chat_to_bottom();
        }
    }

    /// Advance one animation frame and collect finished background work
    pub fn on_tick(&mut self) {
        self.viewer.tick();
        if self.planner.is_generating() || self.chat.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.poll_background();
    }

    pub fn poll_background(&mut self) {
        self.planner.poll();
        if self.chat.poll_replies() > 0 {
            self.scroll_chat_to_bottom();
        }
    }

    pub fn quit(&mut self) {
        info!("shutting down");
        self.viewer.stop();
        self.should_quit = true;
    }

    /// Scroll chat so the newest message (or typing indicator) is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.chat.history() {
            total_lines += 1; // Role line ("You:" or "Coach:")
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                total_lines += ((char_count / wrap_width) + 1) as u16;
            }
            total_lines += 1; // Blank line after message
        }

        if self.chat.is_waiting() {
            total_lines += 2; // "Coach:" + "Typing..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }
}
