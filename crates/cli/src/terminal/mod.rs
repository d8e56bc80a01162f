//! Terminal implementation of the menu presenter.
//!
//! Every screen is drawn on the alternate screen in raw mode and the
//! terminal is restored before the screen returns, so the launched
//! `ansible-playbook` always gets a normal terminal.
//!
//! # User Interface
//!
//! List screens support:
//! - Arrow keys or vim-style (j/k) navigation, mouse click and scroll
//! - Enter to select an entry
//! - `/` to filter entries (fuzzy search, or by number)
//! - Escape to go back to the previous screen
//! - `q` or Ctrl-C to cancel
//!
//! Text screens accept a line of input; Enter on an empty line keeps the
//! proposal or the default. Ctrl-D leaves the option at its default even when
//! a proposal is shown.

pub mod input;
pub mod types;
pub mod ui;

use std::io::stdout;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, ExecutableCommand};
use playpick_core::error::Result;
use playpick_core::menu::{ChoicePrompt, Presenter, Response, TextPrompt};

/// Puts the terminal into screen mode and restores it on drop.
pub(crate) struct ScreenGuard {
    mouse_capture: bool,
}

impl ScreenGuard {
    pub(crate) fn enter(mouse_capture: bool) -> Result<Self> {
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        enable_raw_mode()?;

        // Constructed before anything else can fail so the drop always runs
        let guard = Self { mouse_capture };

        if mouse_capture {
            stdout.execute(EnableMouseCapture)?;
        }
        stdout.execute(cursor::Show)?;

        Ok(guard)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = stdout();
        if self.mouse_capture {
            let _ = stdout.execute(DisableMouseCapture);
        }
        let _ = stdout.execute(LeaveAlternateScreen);
    }
}

/// [`Presenter`] backed by crossterm.
#[derive(Default)]
pub struct TerminalPresenter {
    /// Shown on the next screen, then dropped.
    pending_message: Option<String>,
}

impl TerminalPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for TerminalPresenter {
    fn choose(&mut self, prompt: &ChoicePrompt) -> Result<Response<usize>> {
        let message = self.pending_message.take();
        ui::prompt_for_choice(prompt, message.as_deref())
    }

    fn ask_text(&mut self, prompt: &TextPrompt) -> Result<Response<String>> {
        let message = self.pending_message.take();
        input::prompt_value(prompt, message.as_deref())
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        log::debug!("Operator notice: {message}");
        self.pending_message = Some(message.to_string());
        Ok(())
    }
}
