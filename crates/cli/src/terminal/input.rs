use std::io::{stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::Color::{DarkGreen, Red, Reset};
use crossterm::style::{Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use playpick_core::error::Result;
use playpick_core::menu::{Response, TextPrompt};

use super::ScreenGuard;

/// State of the line being edited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineState {
    pub buffer: String,
}

/// What a key press does to the line.
#[derive(Debug, PartialEq, Eq)]
pub enum LineEvent {
    Continue,
    Done(Response<String>),
    /// Ring the bell, the key is not meaningful right now.
    Reject,
}

/// Prompts for a free-text value.
///
/// Enter on an empty line accepts the proposal, or skips when there is none.
/// Ctrl-D skips even when a proposal is shown.
pub fn prompt_value(prompt: &TextPrompt, message: Option<&str>) -> Result<Response<String>> {
    let _screen_guard = ScreenGuard::enter(false)?;
    let mut line = LineState::default();

    redraw(prompt, &line, message)?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };

        if key_event.kind == KeyEventKind::Release {
            continue;
        }

        match handle_key_event(key_event, prompt, &mut line) {
            LineEvent::Continue => redraw(prompt, &line, message)?,
            LineEvent::Done(response) => return Ok(response),
            LineEvent::Reject => {
                queue!(stdout(), Print("\x07"))?;
                stdout().flush()?;
            }
        }
    }
}

/// Applies one key press to the line.
pub fn handle_key_event(
    key_event: KeyEvent,
    prompt: &TextPrompt,
    line: &mut LineState,
) -> LineEvent {
    let control = key_event.modifiers.contains(KeyModifiers::CONTROL);

    match key_event.code {
        KeyCode::Char('c') if control => LineEvent::Done(Response::Cancel),
        // Back to the default, whatever is proposed
        KeyCode::Char('d') if control => {
            if prompt.allow_skip {
                LineEvent::Done(Response::Skip)
            } else {
                LineEvent::Reject
            }
        }
        KeyCode::Char('u') if control => {
            line.buffer.clear();
            LineEvent::Continue
        }
        KeyCode::Char(c) if !control => {
            line.buffer.push(c);
            LineEvent::Continue
        }
        KeyCode::Backspace => {
            line.buffer.pop();
            LineEvent::Continue
        }
        KeyCode::Tab => match &prompt.proposal {
            // Start editing from the proposal
            Some(proposal) => {
                line.buffer = proposal.clone();
                LineEvent::Continue
            }
            None => LineEvent::Reject,
        },
        KeyCode::Esc => LineEvent::Done(Response::Back),
        KeyCode::Enter => {
            // Surrounding spaces are kept, they may matter to the value
            if !line.buffer.trim().is_empty() {
                return LineEvent::Done(Response::Value(line.buffer.clone()));
            }

            match (&prompt.proposal, prompt.allow_skip) {
                (Some(proposal), _) => LineEvent::Done(Response::Value(proposal.clone())),
                (None, true) => LineEvent::Done(Response::Skip),
                (None, false) => LineEvent::Reject,
            }
        }
        _ => LineEvent::Continue,
    }
}

fn redraw(prompt: &TextPrompt, line: &LineState, message: Option<&str>) -> Result<()> {
    let mut stdout = stdout();
    let (width, _) = terminal::size()?;

    let instructions = match (&prompt.proposal, prompt.allow_skip) {
        (Some(_), true) => {
            "<enter>: Accept  |  <tab>: Edit  |  ^D: Default  |  <esc>: Back  |  ^C: Cancel"
        }
        (Some(_), false) => "<enter>: Accept  |  <tab>: Edit  |  <esc>: Back  |  ^C: Cancel",
        (None, true) => "<enter>: Accept (empty keeps default)  |  <esc>: Back  |  ^C: Cancel",
        (None, false) => "<enter>: Accept  |  <esc>: Back  |  ^C: Cancel",
    };
    let padding = " ".repeat((width as usize).saturating_sub(instructions.len() + 2));

    let label = match &prompt.proposal {
        Some(proposal) => format!("Value [{proposal}]: "),
        None => "Value: ".to_string(),
    };

    queue!(
        stdout,
        Clear(ClearType::All),
        MoveTo(0, 0),
        SetAttribute(Attribute::Bold),
        Print(&prompt.title),
        SetAttribute(Attribute::Reset),
        MoveTo(0, 1),
        SetBackgroundColor(DarkGreen),
        Print("  "),
        Print(instructions),
        Print(padding),
        SetBackgroundColor(Reset),
    )?;

    if let Some(message) = message {
        queue!(
            stdout,
            MoveTo(0, 4),
            SetForegroundColor(Red),
            Print(message),
            SetForegroundColor(Reset),
        )?;
    }

    queue!(stdout, MoveTo(0, 3), Print(label), Print(&line.buffer))?;

    stdout.flush()?;
    Ok(())
}
