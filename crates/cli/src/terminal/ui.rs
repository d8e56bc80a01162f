use std::fmt::Display;
use std::io::{stdout, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use crossterm::style::Color::{DarkBlue, DarkGreen, Reset, Yellow};
use crossterm::style::{
    Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, event, queue, terminal};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use playpick_core::error::Result;
use playpick_core::menu::{ChoicePrompt, Response};

use super::types::CycleDirection::{Down, Up};
use super::types::{CycleDirection, Row, RowTarget, UiState, ViewportState};
use super::ScreenGuard;

/// Label of the row that keeps an option at its default.
pub const SKIP_LABEL: &str = "(keep default)";

/// Terminal row of the first list entry: title and instructions come first.
const LIST_TOP: u16 = 2;

/// Lines that are not list rows: title, instructions and footer.
const CHROME_HEIGHT: u16 = 3;

/// Builds the rows for a prompt, with the skip row first when allowed.
#[must_use]
pub fn build_rows(prompt: &ChoicePrompt) -> Vec<Row> {
    let skip = prompt.allow_skip.then(|| Row {
        target: RowTarget::Skip,
        label: SKIP_LABEL.to_string(),
    });

    skip.into_iter()
        .chain(prompt.choices.iter().enumerate().map(|(i, label)| Row {
            target: RowTarget::Choice(i),
            label: label.clone(),
        }))
        .collect()
}

fn response_for(target: RowTarget) -> Response<usize> {
    match target {
        RowTarget::Choice(i) => Response::Value(i),
        RowTarget::Skip => Response::Skip,
    }
}

fn redraw_ui(
    title: &str,
    ui_state: &UiState,
    rows: &[Row],
    indexes_to_display: &[usize],
    message: Option<&str>,
) -> Result<()> {
    let mut stdout = stdout();

    queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

    queue!(
        stdout,
        SetAttribute(Attribute::Bold),
        Print(truncate(title, ui_state.viewport.width)),
        SetAttribute(Attribute::Reset),
    )?;

    print_header(ui_state, indexes_to_display.len())?;

    if indexes_to_display.is_empty() {
        queue!(
            stdout,
            MoveTo(0, LIST_TOP),
            SetForegroundColor(Color::Red),
            Print("No matching entries!".to_string()),
            SetAttribute(Attribute::Reset),
        )?;
    } else {
        print_rows_with_selection(ui_state, rows, indexes_to_display)?;
    }

    let footer_row = LIST_TOP + ui_state.viewport.height;
    queue!(stdout, MoveTo(0, footer_row), Clear(ClearType::CurrentLine))?;

    if ui_state.is_filtering {
        queue!(
            stdout,
            SetAttribute(Attribute::Bold),
            Print(format!("Filter: {}", ui_state.filter_text)),
            SetAttribute(Attribute::Reset)
        )?;
    } else if let Some(message) = message {
        queue!(
            stdout,
            SetForegroundColor(Color::Red),
            Print(truncate(message, ui_state.viewport.width)),
            SetForegroundColor(Reset),
        )?;
    }

    stdout.flush()?;
    Ok(())
}

/// Prompts the user to choose one row of the list.
///
/// `message` is shown below the list, e.g. why the previous answer was
/// rejected.
pub fn prompt_for_choice(prompt: &ChoicePrompt, message: Option<&str>) -> Result<Response<usize>> {
    let rows = build_rows(prompt);

    let _screen_guard = ScreenGuard::enter(true)?; // Restores the terminal on every return path

    let (width, height) = terminal::size()?;

    let initial_row = rows
        .iter()
        .position(|row| row.target == RowTarget::Choice(prompt.selected))
        .unwrap_or(0);

    let viewport_height = height.saturating_sub(CHROME_HEIGHT).max(1);
    let mut ui_state = UiState {
        selected_index: initial_row,
        viewport: ViewportState {
            offset: initial_row.saturating_sub(viewport_height as usize - 1),
            height: viewport_height,
            width,
        },
        is_filtering: false,
        filter_text: String::new(),
    };

    let mut indexes_to_display = filter_displayed_indexes(&rows, &ui_state.filter_text);
    redraw_ui(&prompt.title, &ui_state, &rows, &indexes_to_display, message)?;

    let mut down_row: Option<u16> = None;

    loop {
        if !event::poll(Duration::from_millis(500))? {
            continue;
        }

        let mut new_ui_state: Option<UiState> = None;
        let mut index_change_direction: Option<CycleDirection> = None;

        match event::read()? {
            Event::Mouse(MouseEvent {
                kind,
                row,
                modifiers,
                ..
            }) if modifiers == KeyModifiers::NONE => match kind {
                MouseEventKind::Down(MouseButton::Left) => down_row = Some(row),
                MouseEventKind::Up(MouseButton::Left) => {
                    if let Some(clicked) = down_row.take().and_then(|down_row| {
                        clicked_index(down_row, row, &ui_state, indexes_to_display.len())
                    }) {
                        return Ok(response_for(rows[indexes_to_display[clicked]].target));
                    }
                }
                MouseEventKind::ScrollDown => index_change_direction = Some(Down),
                MouseEventKind::ScrollUp => index_change_direction = Some(Up),
                _ => {}
            },
            Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                let (response, new_state, new_direction) =
                    handle_key_event(key_event, &ui_state, &rows, &indexes_to_display);

                if let Some(response) = response {
                    return Ok(response);
                }

                new_ui_state = new_state;
                index_change_direction = new_direction;
            }
            Event::Resize(width, height) => {
                new_ui_state = Some(handle_resize(
                    width,
                    height,
                    &ui_state,
                    indexes_to_display.len(),
                ));
            }
            _ => {}
        }

        if let Some(direction) = index_change_direction {
            let base = new_ui_state.as_ref().unwrap_or(&ui_state);
            new_ui_state = Some(move_selected_index(
                base,
                indexes_to_display.len(),
                direction,
            ));
        }

        if let Some(new_ui_state) = new_ui_state {
            if new_ui_state != ui_state {
                if new_ui_state.filter_text != ui_state.filter_text {
                    indexes_to_display = filter_displayed_indexes(&rows, &new_ui_state.filter_text);
                }
                ui_state = new_ui_state;
                redraw_ui(&prompt.title, &ui_state, &rows, &indexes_to_display, message)?;
            }
        }
    }
}

/// Index among the displayed rows hit by a click, if any.
fn clicked_index(
    down_row: u16,
    up_row: u16,
    ui_state: &UiState,
    displayed: usize,
) -> Option<usize> {
    if down_row != up_row || down_row < LIST_TOP {
        return None;
    }

    let index = (down_row - LIST_TOP) as usize + ui_state.viewport.offset;
    (index < displayed && down_row < LIST_TOP + ui_state.viewport.height).then_some(index)
}

/// Handle keyboard events in the list screen.
fn handle_key_event(
    key_event: KeyEvent,
    ui_state: &UiState,
    rows: &[Row],
    indexes_to_display: &[usize],
) -> (
    Option<Response<usize>>,
    Option<UiState>,
    Option<CycleDirection>,
) {
    match key_event.code {
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            (Some(Response::Cancel), None, None)
        }
        KeyCode::Up => (None, None, Some(Up)),
        KeyCode::Down => (None, None, Some(Down)),
        KeyCode::Enter => {
            let response = indexes_to_display
                .get(ui_state.selected_index)
                .map(|row_index| response_for(rows[*row_index].target));
            (response, None, None)
        }
        KeyCode::Backspace if ui_state.is_filtering => {
            let mut updated_state = ui_state.clone();
            updated_state.filter_text.pop();
            updated_state.selected_index = 0;
            updated_state.viewport.offset = 0;
            (None, Some(updated_state), None)
        }
        KeyCode::Esc if ui_state.is_filtering => {
            let mut updated_state = ui_state.clone();
            updated_state.is_filtering = false;
            updated_state.filter_text = String::new();
            updated_state.selected_index = 0;
            updated_state.viewport.offset = 0;
            (None, Some(updated_state), None)
        }
        KeyCode::Esc => (Some(Response::Back), None, None),
        KeyCode::Char(c) if ui_state.is_filtering => {
            let mut updated_state = ui_state.clone();
            updated_state.filter_text.push(c);
            updated_state.selected_index = 0;
            updated_state.viewport.offset = 0;
            (None, Some(updated_state), None)
        }
        KeyCode::Char('/') => {
            let mut updated_state = ui_state.clone();
            updated_state.is_filtering = true;
            (None, Some(updated_state), None)
        }
        KeyCode::Char('k') => (None, None, Some(Up)),
        KeyCode::Char('j') => (None, None, Some(Down)),
        KeyCode::Char('q') => (Some(Response::Cancel), None, None),
        _ => (None, None, None),
    }
}

/// Handle window resize events
fn handle_resize(width: u16, height: u16, ui_state: &UiState, displayed: usize) -> UiState {
    let new_height = height.saturating_sub(CHROME_HEIGHT).max(1);
    let mut ui_state = ui_state.clone();
    let mut new_viewport = ViewportState {
        width,
        height: new_height,
        offset: ui_state.viewport.offset,
    };

    // If growing taller, try to show more items above current selection
    match new_height.cmp(&ui_state.viewport.height) {
        std::cmp::Ordering::Greater if new_viewport.offset > 0 => {
            let height_increase = new_height - ui_state.viewport.height;
            new_viewport.offset = new_viewport.offset.saturating_sub(height_increase as usize);
        }
        std::cmp::Ordering::Less
            if ui_state.selected_index >= new_viewport.offset + new_height as usize =>
        {
            new_viewport.offset = ui_state.selected_index.saturating_sub(new_height as usize - 1);

            if new_viewport.offset + new_height as usize > displayed {
                new_viewport.offset = displayed.saturating_sub(new_height as usize);
            }
        }
        _ => {}
    }

    ui_state.viewport = new_viewport;
    ui_state
}

/// Print the instruction bar below the title
fn print_header(ui_state: &UiState, display_count: usize) -> Result<()> {
    let mut stdout = stdout();
    let width = ui_state.viewport.width as usize;

    let left_padding_size = 2usize;
    let left_padding = " ".repeat(left_padding_size);

    let instructions = if ui_state.is_filtering {
        "<esc>: Stop Filtering".to_string()
    } else {
        format!(
            "/: Filter   |   {}/{}   |   <esc>: Back   |   q: Cancel",
            pad_to_width_of(ui_state.selected_index + 1, display_count),
            display_count
        )
    };

    let right_padding = " ".repeat(width.saturating_sub(left_padding_size + instructions.len()));

    queue!(
        stdout,
        MoveTo(0, 1),
        SetBackgroundColor(DarkGreen),
        Print(left_padding),
        Print(instructions),
        Print(right_padding),
        SetBackgroundColor(Reset),
        SetForegroundColor(Reset),
    )?;

    Ok(())
}

/// Pad a value to match the width of the largest value
fn pad_to_width_of<T: Display>(value: T, max_number: usize) -> String {
    let width = format!("{max_number}").len();
    format!("{:>width$}", value.to_string())
}

fn truncate(text: &str, width: u16) -> String {
    text.chars().take(width as usize).collect()
}

/// Clear and write one row of the list
fn clear_and_write_row(
    terminal_row: u16,
    row: &Row,
    row_count: usize,
    is_selected: bool,
    terminal_width: u16,
) -> Result<()> {
    let mut stdout = stdout();

    queue!(stdout, MoveTo(0, terminal_row), Clear(ClearType::CurrentLine))?;

    let index_as_string = pad_to_width_of(row.target, row_count);
    let content = truncate(&format!("[{index_as_string}] {row}"), terminal_width);

    let padding = " ".repeat((terminal_width as usize).saturating_sub(content.chars().count()));

    if is_selected {
        queue!(
            stdout,
            SetAttribute(Attribute::Bold),
            SetBackgroundColor(DarkBlue),
            SetForegroundColor(Yellow),
        )?;
    }

    queue!(stdout, Print(content), Print(padding))?;

    queue!(
        stdout,
        SetAttribute(Attribute::Reset),
        SetBackgroundColor(Reset),
        SetForegroundColor(Reset),
    )?;

    Ok(())
}

/// Print the visible rows with the selected one highlighted
fn print_rows_with_selection(
    ui_state: &UiState,
    rows: &[Row],
    indexes_to_display: &[usize],
) -> Result<()> {
    let mut stdout = stdout();

    let viewport = &ui_state.viewport;

    let visible_rows = indexes_to_display
        .iter()
        .skip(viewport.offset)
        .take(viewport.height as usize);

    for (i, row_index) in visible_rows.enumerate() {
        let is_selected = i + viewport.offset == ui_state.selected_index;

        clear_and_write_row(
            LIST_TOP + i as u16,
            &rows[*row_index],
            rows.len(),
            is_selected,
            viewport.width,
        )?;
        queue!(stdout, cursor::MoveToNextLine(1))?;
    }

    Ok(())
}

/// Move the selected index in the given direction, wrapping around
fn move_selected_index(ui_state: &UiState, displayed: usize, direction: CycleDirection) -> UiState {
    if displayed == 0 {
        return ui_state.clone();
    }

    let mut new_index = ui_state.selected_index;
    let mut ui_state = ui_state.clone();
    let height = ui_state.viewport.height as usize;

    match direction {
        Up => {
            if new_index == 0 {
                new_index = displayed - 1;
                ui_state.viewport.offset = new_index.saturating_sub(height - 1);
            } else {
                new_index -= 1;
                if new_index < ui_state.viewport.offset {
                    ui_state.viewport.offset = new_index;
                }
            }
        }
        Down => {
            new_index = (new_index + 1) % displayed;
            if new_index < ui_state.selected_index {
                ui_state.viewport.offset = 0;
            } else if new_index >= ui_state.viewport.offset + height {
                ui_state.viewport.offset = new_index + 1 - height;
            }
        }
    }

    ui_state.selected_index = new_index;
    ui_state
}

/// Indexes into `rows` that match the filter, in row order.
///
/// A numeric filter matches on the displayed number, anything else is fuzzy
/// matched against the label.
fn filter_displayed_indexes(rows: &[Row], predicate: &str) -> Vec<usize> {
    if predicate.is_empty() {
        return (0..rows.len()).collect();
    }

    let matcher = SkimMatcherV2::default();
    let is_numeric = predicate.parse::<usize>().is_ok();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            if is_numeric {
                row.target.to_string().contains(predicate)
            } else {
                matcher.fuzzy_match(&row.label, predicate).is_some()
            }
        })
        .map(|(i, _)| i)
        .collect()
}
