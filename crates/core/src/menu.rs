//! The sequence of selection screens that builds up a run.
//!
//! The machine walks `SelectPlaybook → SelectInventory → OptionalFlag(k)… →
//! Confirm` and ends in either `Ready` or `Aborted`. Each screen is shown
//! through a [`Presenter`], so the machine runs the same against a terminal UI
//! or a scripted test double.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};

use crate::assembler::assemble;
use crate::catalog::{Catalog, OptionSpec, OptionValue, ValueKind, INVENTORY};
use crate::error::{Error, Result};
use crate::inventory::{inventory_entries, ALL_HOSTS};
use crate::locator::PlaybookRef;
use crate::selection::{RunSpec, Selection};

/// Answer to a single screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response<T> {
    Value(T),
    /// Keep the option at its default.
    Skip,
    /// Return to the previous screen.
    Back,
    /// Abandon the whole session.
    Cancel,
}

/// A list of labelled choices shown on one screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoicePrompt {
    pub title: String,
    pub choices: Vec<String>,
    /// Index that should be highlighted initially.
    pub selected: usize,
    /// Whether [`Response::Skip`] is a meaningful answer.
    pub allow_skip: bool,
}

/// A free-text prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextPrompt {
    pub title: String,
    /// Value offered to the operator, returned when they accept it unchanged.
    pub proposal: Option<String>,
    pub allow_skip: bool,
}

/// Capability to interact with the operator.
pub trait Presenter {
    /// Shows a list and returns the index of the chosen entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the presentation layer fails.
    fn choose(&mut self, prompt: &ChoicePrompt) -> Result<Response<usize>>;

    /// Asks for free text.
    ///
    /// # Errors
    ///
    /// Returns an error if the presentation layer fails.
    fn ask_text(&mut self, prompt: &TextPrompt) -> Result<Response<String>>;

    /// Shows a message, e.g. why a value was rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the presentation layer fails.
    fn notify(&mut self, message: &str) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    SelectPlaybook,
    SelectInventory,
    /// The k-th option after the inventory, in catalog order.
    OptionalFlag(usize),
    Confirm,
    Ready,
    Aborted,
}

impl Screen {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Screen::Ready | Screen::Aborted)
    }
}

/// Result of driving the machine to a terminal state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuOutcome {
    Ready {
        playbook: PlaybookRef,
        selection: Selection,
        run_spec: RunSpec,
    },
    Aborted,
}

/// Labels of the confirmation screen, in presentation order.
pub const CONFIRM_CHOICES: [&str; 2] = ["Run", "Cancel"];

const FLAG_CHOICES: [&str; 2] = ["no", "yes"];

/// Last entry of a host pattern list, leads to a free-text prompt.
pub const OTHER_PATTERN: &str = "Other pattern...";

/// Holds the in-progress selection and the current screen.
pub struct MenuMachine<'a> {
    playbooks: &'a [PlaybookRef],
    catalog: &'a Catalog,
    proposals: &'a IndexMap<String, String>,
    executable: String,
    working_directory: PathBuf,
    optional: Vec<&'a OptionSpec>,
    screen: Screen,
    playbook: Option<usize>,
    selection: Selection,
    /// Command the operator confirmed.
    confirmed: Option<RunSpec>,
}

impl<'a> MenuMachine<'a> {
    /// Creates a machine positioned on the playbook screen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPlaybooks`] if `playbooks` is empty.
    pub fn new(
        playbooks: &'a [PlaybookRef],
        catalog: &'a Catalog,
        proposals: &'a IndexMap<String, String>,
        executable: &str,
        working_directory: &Path,
    ) -> Result<Self> {
        if playbooks.is_empty() {
            return Err(Error::no_playbooks(working_directory.display().to_string()));
        }

        Ok(Self {
            playbooks,
            catalog,
            proposals,
            executable: executable.to_string(),
            working_directory: working_directory.to_path_buf(),
            optional: catalog
                .iter()
                .filter(|option| option.name != INVENTORY)
                .collect(),
            screen: Screen::SelectPlaybook,
            playbook: None,
            selection: Selection::new(),
            confirmed: None,
        })
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Presents the current screen once and moves to the next state.
    ///
    /// # Errors
    ///
    /// Returns an error if the presenter fails or the selection can not be
    /// assembled on the confirmation screen.
    pub fn step(&mut self, presenter: &mut dyn Presenter) -> Result<Screen> {
        let next = match self.screen {
            Screen::SelectPlaybook => self.select_playbook(presenter)?,
            Screen::SelectInventory => self.select_inventory(presenter)?,
            Screen::OptionalFlag(k) => self.select_optional(k, presenter)?,
            Screen::Confirm => self.confirm(presenter)?,
            terminal => terminal,
        };

        if next != self.screen {
            debug!("Menu transition {:?} -> {:?}", self.screen, next);
        }
        self.screen = next;
        Ok(next)
    }

    /// Steps until `Ready` or `Aborted`.
    ///
    /// # Errors
    ///
    /// Returns an error if the presenter fails or assembling fails.
    pub fn run(mut self, presenter: &mut dyn Presenter) -> Result<MenuOutcome> {
        while !self.step(presenter)?.is_terminal() {}

        match self.screen {
            Screen::Ready => {
                let run_spec = match self.confirmed.take() {
                    Some(run_spec) => run_spec,
                    None => self.assemble()?,
                };
                let playbook = self.chosen_playbook()?.clone();
                Ok(MenuOutcome::Ready {
                    playbook,
                    selection: self.selection,
                    run_spec,
                })
            }
            _ => Ok(MenuOutcome::Aborted),
        }
    }

    fn select_playbook(&mut self, presenter: &mut dyn Presenter) -> Result<Screen> {
        let prompt = ChoicePrompt {
            title: "Choose playbook".to_string(),
            choices: self.playbooks.iter().map(ToString::to_string).collect(),
            selected: self.playbook.unwrap_or(0),
            allow_skip: false,
        };

        Ok(match presenter.choose(&prompt)? {
            Response::Value(index) if index < self.playbooks.len() => {
                self.playbook = Some(index);
                Screen::SelectInventory
            }
            Response::Value(index) => {
                presenter.notify(&format!("There is no playbook number {}", index + 1))?;
                Screen::SelectPlaybook
            }
            Response::Cancel => Screen::Aborted,
            Response::Skip | Response::Back => {
                presenter.notify("A playbook has to be chosen")?;
                Screen::SelectPlaybook
            }
        })
    }

    fn select_inventory(&mut self, presenter: &mut dyn Presenter) -> Result<Screen> {
        let catalog = self.catalog;
        let Some(option) = catalog.get(INVENTORY) else {
            return Ok(self.first_optional_screen());
        };

        Ok(match self.ask_option(option, presenter)? {
            Step::Advance => self.first_optional_screen(),
            Step::Stay => Screen::SelectInventory,
            Step::Back => Screen::SelectPlaybook,
            Step::Cancel => Screen::Aborted,
        })
    }

    fn select_optional(&mut self, k: usize, presenter: &mut dyn Presenter) -> Result<Screen> {
        let Some(option) = self.optional.get(k).copied() else {
            return Ok(Screen::Confirm);
        };

        Ok(match self.ask_option(option, presenter)? {
            Step::Advance if k + 1 < self.optional.len() => Screen::OptionalFlag(k + 1),
            Step::Advance => Screen::Confirm,
            Step::Stay => Screen::OptionalFlag(k),
            Step::Back if k == 0 => self.inventory_screen(),
            Step::Back => Screen::OptionalFlag(k - 1),
            Step::Cancel => Screen::Aborted,
        })
    }

    fn confirm(&mut self, presenter: &mut dyn Presenter) -> Result<Screen> {
        // A value can go stale after its screen, e.g. a deleted inventory file
        let run_spec = match self.assemble() {
            Ok(run_spec) => run_spec,
            Err(Error::Validation { option, reason }) => {
                presenter.notify(&Error::validation(&option, reason).to_string())?;
                return Ok(self.screen_of(&option));
            }
            Err(e) => return Err(e),
        };
        let prompt = ChoicePrompt {
            title: format!("Run `{run_spec}`?"),
            choices: CONFIRM_CHOICES.iter().map(ToString::to_string).collect(),
            selected: 0,
            allow_skip: false,
        };

        Ok(match presenter.choose(&prompt)? {
            Response::Value(0) => {
                self.confirmed = Some(run_spec);
                Screen::Ready
            }
            Response::Value(_) | Response::Cancel => Screen::Aborted,
            Response::Back => self.last_option_screen(),
            Response::Skip => Screen::Confirm,
        })
    }

    /// Presents one option and records the answer when it validates.
    fn ask_option(&mut self, option: &OptionSpec, presenter: &mut dyn Presenter) -> Result<Step> {
        let value = match option.kind {
            ValueKind::Flag => {
                let current = matches!(
                    self.selection.get(option.name),
                    Some(OptionValue::Enabled(true))
                );
                let prompt = ChoicePrompt {
                    title: option.to_string(),
                    choices: FLAG_CHOICES.iter().map(ToString::to_string).collect(),
                    selected: usize::from(current),
                    allow_skip: true,
                };
                match presenter.choose(&prompt)? {
                    Response::Value(index @ (0 | 1)) => {
                        Response::Value(OptionValue::Enabled(index == 1))
                    }
                    Response::Value(index) => return out_of_range(index, presenter),
                    Response::Skip => Response::Skip,
                    Response::Back => Response::Back,
                    Response::Cancel => Response::Cancel,
                }
            }
            ValueKind::Choice(choices) => {
                let current = self
                    .selection
                    .get(option.name)
                    .and_then(OptionValue::as_text)
                    .and_then(|text| choices.iter().position(|choice| *choice == text));
                let prompt = ChoicePrompt {
                    title: option.to_string(),
                    choices: choices.iter().map(ToString::to_string).collect(),
                    selected: current.unwrap_or(0),
                    allow_skip: true,
                };
                match presenter.choose(&prompt)? {
                    Response::Value(index) => match choices.get(index) {
                        Some(choice) => Response::Value(OptionValue::text(choice)),
                        None => return out_of_range(index, presenter),
                    },
                    Response::Skip => Response::Skip,
                    Response::Back => Response::Back,
                    Response::Cancel => Response::Cancel,
                }
            }
            ValueKind::HostPattern => {
                let patterns = self.host_patterns();
                if patterns.is_empty() {
                    self.ask_free_text(option, presenter)?
                } else {
                    let current = self.selection.get(option.name).and_then(OptionValue::as_text);
                    let selected = match current {
                        Some(current) => patterns
                            .iter()
                            .position(|(_, pattern)| pattern == current)
                            .unwrap_or(patterns.len()),
                        None => 0,
                    };
                    let prompt = ChoicePrompt {
                        title: option.to_string(),
                        choices: patterns
                            .iter()
                            .map(|(label, _)| label.clone())
                            .chain(std::iter::once(OTHER_PATTERN.to_string()))
                            .collect(),
                        selected,
                        allow_skip: true,
                    };
                    match presenter.choose(&prompt)? {
                        Response::Value(index) if index < patterns.len() => {
                            Response::Value(OptionValue::text(&patterns[index].1))
                        }
                        Response::Value(index) if index == patterns.len() => {
                            match self.ask_free_text(option, presenter)? {
                                // Back to the list of patterns
                                Response::Back => return Ok(Step::Stay),
                                other => other,
                            }
                        }
                        Response::Value(index) => return out_of_range(index, presenter),
                        Response::Skip => Response::Skip,
                        Response::Back => Response::Back,
                        Response::Cancel => Response::Cancel,
                    }
                }
            }
            ValueKind::FreeText | ValueKind::Path => self.ask_free_text(option, presenter)?,
        };

        match value {
            Response::Value(value) => {
                if let Err(reason) = option.validate(&value, &self.working_directory) {
                    presenter.notify(&Error::validation(option.name, reason).to_string())?;
                    return Ok(Step::Stay);
                }
                self.selection.set(option.name, value);
                Ok(Step::Advance)
            }
            Response::Skip => {
                self.selection.clear(option.name);
                Ok(Step::Advance)
            }
            Response::Back => Ok(Step::Back),
            Response::Cancel => Ok(Step::Cancel),
        }
    }

    fn ask_free_text(
        &self,
        option: &OptionSpec,
        presenter: &mut dyn Presenter,
    ) -> Result<Response<OptionValue>> {
        let proposal = self
            .selection
            .get(option.name)
            .and_then(OptionValue::as_text)
            .map(ToString::to_string)
            .or_else(|| self.proposals.get(option.name).cloned());
        let prompt = TextPrompt {
            title: option.to_string(),
            proposal,
            allow_skip: true,
        };
        Ok(presenter.ask_text(&prompt)?.map(OptionValue::Text))
    }

    /// `(label, pattern)` pairs for the chosen inventory, `all` first. Empty
    /// when no inventory is chosen or it names nothing.
    fn host_patterns(&self) -> Vec<(String, String)> {
        let Some(inventory) = self.selection.get(INVENTORY).and_then(OptionValue::as_text) else {
            return Vec::new();
        };

        let entries = match inventory_entries(&self.working_directory.join(inventory)) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Not offering inventory entries: {e}");
                return Vec::new();
            }
        };

        if entries.is_empty() {
            return Vec::new();
        }

        std::iter::once((ALL_HOSTS.to_string(), ALL_HOSTS.to_string()))
            .chain(
                entries
                    .iter()
                    .filter(|entry| entry.pattern() != ALL_HOSTS)
                    .map(|entry| (entry.to_string(), entry.pattern().to_string())),
            )
            .collect()
    }

    /// Screen on which option `name` is answered.
    fn screen_of(&self, name: &str) -> Screen {
        if name == INVENTORY {
            return self.inventory_screen();
        }

        self.optional
            .iter()
            .position(|option| option.name == name)
            .map_or_else(|| self.last_option_screen(), Screen::OptionalFlag)
    }

    fn inventory_screen(&self) -> Screen {
        if self.catalog.get(INVENTORY).is_some() {
            Screen::SelectInventory
        } else {
            Screen::SelectPlaybook
        }
    }

    fn first_optional_screen(&self) -> Screen {
        if self.optional.is_empty() {
            Screen::Confirm
        } else {
            Screen::OptionalFlag(0)
        }
    }

    fn last_option_screen(&self) -> Screen {
        match self.optional.len() {
            0 => self.inventory_screen(),
            n => Screen::OptionalFlag(n - 1),
        }
    }

    fn chosen_playbook(&self) -> Result<&PlaybookRef> {
        self.playbook
            .and_then(|index| self.playbooks.get(index))
            .ok_or_else(|| Error::no_playbooks(self.working_directory.display().to_string()))
    }

    fn assemble(&self) -> Result<RunSpec> {
        assemble(
            &self.executable,
            self.catalog,
            self.chosen_playbook()?,
            &self.selection,
            &self.working_directory,
        )
    }
}

enum Step {
    Advance,
    Stay,
    Back,
    Cancel,
}

fn out_of_range(index: usize, presenter: &mut dyn Presenter) -> Result<Step> {
    presenter.notify(&format!("There is no choice number {}", index + 1))?;
    Ok(Step::Stay)
}

impl<T> Response<T> {
    /// Maps the carried value, leaving the other answers untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        match self {
            Response::Value(value) => Response::Value(f(value)),
            Response::Skip => Response::Skip,
            Response::Back => Response::Back,
            Response::Cancel => Response::Cancel,
        }
    }
}
