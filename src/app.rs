use std::time::Duration;

use log::debug;

use typequiz::catalog::{Catalog, Session};
use typequiz::config::{Config, Difficulty};
use typequiz::session::controller::{ControllerError, GameEvent, Screen, SessionController};
use typequiz::session::view::{self, ViewModel};
use typequiz::store::ProgressStore;

use crate::ui::components::menu;
use crate::ui::theme::Theme;

/// Front-end state around the controller: the input buffer, the menu cursor
/// and a one-line notice.
pub struct App {
    pub controller: SessionController,
    pub theme: &'static Theme,
    pub input: String,
    pub selected: usize,
    pub notice: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        catalog: Catalog,
        store: Option<Box<dyn ProgressStore>>,
        theme: &'static Theme,
        seed: Option<u64>,
    ) -> Self {
        let default_difficulty = config.default_difficulty;
        let mut controller = SessionController::new(config, catalog, store);
        if let Some(seed) = seed {
            controller = controller.with_seed(seed);
        }
        let selected = Difficulty::all()
            .iter()
            .position(|d| *d == default_difficulty)
            .unwrap_or(0);
        Self {
            controller,
            theme,
            input: String::new(),
            selected,
            notice: None,
            should_quit: false,
        }
    }

    pub fn view(&self) -> ViewModel {
        view::render_state(&self.controller)
    }

    pub fn screen(&self) -> Screen {
        self.controller.screen()
    }

    // --- Menus ---

    pub fn menu_len(&self) -> usize {
        match self.controller.screen() {
            Screen::ModeSelect => Difficulty::all().len(),
            Screen::SessionSelect => Session::all().len(),
            Screen::CourseSelect => self.controller.course_entries().len(),
            Screen::InRun | Screen::Result => 0,
        }
    }

    pub fn menu_next(&mut self) {
        self.selected = menu::step(self.selected, self.menu_len(), true);
    }

    pub fn menu_prev(&mut self) {
        self.selected = menu::step(self.selected, self.menu_len(), false);
    }

    /// Pick entry `index` of the current menu.
    pub fn choose(&mut self, index: usize) {
        self.notice = None;
        let outcome = match self.controller.screen() {
            Screen::ModeSelect => match Difficulty::all().get(index) {
                Some(&difficulty) => self.controller.select_difficulty(difficulty),
                None => return,
            },
            Screen::SessionSelect => match Session::all().get(index) {
                Some(&session) => self.controller.select_session(session),
                None => return,
            },
            Screen::CourseSelect => {
                self.input.clear();
                self.controller.select_course(index)
            }
            Screen::InRun | Screen::Result => return,
        };
        match outcome {
            Ok(()) => {
                if self.controller.screen() != Screen::InRun {
                    self.selected = 0;
                }
            }
            Err(ControllerError::CourseLocked { .. }) => {
                self.notice = Some("That course is still locked".to_string());
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
        self.pump_events();
    }

    pub fn confirm(&mut self) {
        self.choose(self.selected);
    }

    pub fn back(&mut self) {
        self.notice = None;
        if self.controller.screen() == Screen::ModeSelect {
            self.should_quit = true;
            return;
        }
        self.controller.back();
        self.selected = 0;
    }

    // --- Run ---

    pub fn type_char(&mut self, ch: char) {
        self.input.push(ch);
        self.feed();
    }

    pub fn paste(&mut self, text: &str) {
        self.input.push_str(text);
        self.feed();
    }

    pub fn backspace(&mut self) {
        if self.input.pop().is_some() {
            self.feed();
        }
    }

    fn feed(&mut self) {
        let outcome = self.controller.on_input(&self.input);
        if let Some(buffer) = outcome.reset_buffer {
            self.input = buffer;
        }
        self.pump_events();
    }

    pub fn abandon_run(&mut self) {
        self.controller.end_run(true);
        self.input.clear();
        self.selected = 0;
        self.pump_events();
    }

    pub fn go_home(&mut self) {
        self.controller.return_home();
        self.selected = 0;
    }

    pub fn tick(&mut self, elapsed: Duration) {
        self.controller.tick(elapsed);
        self.pump_events();
    }

    fn pump_events(&mut self) {
        for event in self.controller.drain_events() {
            debug!("{event:?}");
            match event {
                GameEvent::ProblemLoaded { .. } | GameEvent::RunEnded { .. } => self.input.clear(),
                GameEvent::CourseUnlocked { index } => {
                    self.notice = Some(format!("Course {} unlocked!", index + 1));
                }
                _ => {}
            }
        }
    }
}
