use anyhow::Result;
use ratatui::widgets::ListState;

use pitchside_core::{ChatClient, ChatController, ClientConfig, MatchQuery, ModelId, SubmitError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Chat session (transcript, loading state, selected model)
    pub chat: ChatController<ChatClient>,

    // Input box
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Transcript viewport
    pub scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub follow: bool,     // Keep the newest message in view

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Model picker state
    pub show_model_picker: bool,
    pub model_picker_state: ListState,

    // One-line notice in the footer, cleared on the next key press
    pub notice: Option<String>,
}

impl App {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = ChatClient::new(&config.api_endpoint, config.request_timeout)?;

        Ok(Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            chat: ChatController::new(config, client),

            input: String::new(),
            cursor: 0,

            scroll: 0,
            chat_height: 0,
            chat_width: 0,
            follow: true,

            animation_frame: 0,

            show_model_picker: false,
            model_picker_state: ListState::default(),

            notice: None,
        })
    }

    /// Submit whatever is in the input box. Empty input is ignored; input
    /// typed while a reply is pending stays in the box.
    pub fn submit_input(&mut self) {
        match self.chat.submit(&self.input) {
            Ok(()) => {
                self.input.clear();
                self.cursor = 0;
                self.follow = true;
                self.scroll_to_bottom();
            }
            Err(SubmitError::Empty) => {}
            Err(SubmitError::Busy) => {
                self.notice = Some("Still analyzing the previous question...".to_string());
            }
        }
    }

    /// Pick up a finished reply, if any. Called on every loop iteration.
    pub fn poll_reply(&mut self) {
        if self.chat.poll() && self.follow {
            self.scroll_to_bottom();
        }
    }

    pub fn new_chat(&mut self) {
        match self.chat.reset() {
            Ok(()) => {
                self.scroll = 0;
                self.follow = true;
            }
            Err(_) => {
                self.notice = Some("Wait for the current answer before starting over".to_string());
            }
        }
    }

    /// Fixture detected in the text being typed.
    pub fn detected_match(&self) -> Option<MatchQuery> {
        MatchQuery::parse(&self.input)
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll());
        self.follow = self.scroll == self.max_scroll();
    }

    pub fn scroll_page_up(&mut self) {
        self.scroll_up((self.visible_height() / 2).max(1));
    }

    pub fn scroll_page_down(&mut self) {
        self.scroll_down((self.visible_height() / 2).max(1));
    }

    /// Scroll chat to bottom so the newest message (or "Analyzing...") is visible
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
        self.follow = true;
    }

    fn max_scroll(&self) -> u16 {
        self.transcript_lines().saturating_sub(self.visible_height())
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Rendered height of the transcript, wrapped the same way it is drawn.
    fn transcript_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };
        let rows = crate::ui::transcript_paragraph(self).line_count(wrap_width);
        u16::try_from(rows).unwrap_or(u16::MAX)
    }

    // Model picker methods
    pub fn open_model_picker(&mut self) {
        let current = ModelId::all()
            .iter()
            .position(|m| *m == self.chat.selected_model());
        self.model_picker_state.select(current.or(Some(0)));
        self.show_model_picker = true;
    }

    pub fn model_picker_nav_down(&mut self) {
        let len = ModelId::all().len();
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn model_picker_nav_up(&mut self) {
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_model(&mut self) {
        if let Some(model) = self
            .model_picker_state
            .selected()
            .and_then(|i| ModelId::all().get(i).copied())
        {
            self.chat.select_model(model);
        }
        self.show_model_picker = false;
    }
}
