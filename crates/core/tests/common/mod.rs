//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use playpick_core::error::Result;
use playpick_core::menu::{ChoicePrompt, Presenter, Response, TextPrompt};
use playpick_core::selection::{RunResult, RunSpec};
use playpick_core::supervisor::Supervisor;
use tempfile::TempDir;

/// One canned operator answer.
#[derive(Clone, Debug)]
pub enum Answer {
    Pick(usize),
    Enter(&'static str),
    /// Accept whatever the text prompt proposes.
    Proposal,
    Skip,
    Back,
    Cancel,
}

/// Presenter that replays a script and records every screen it was shown.
#[derive(Default)]
pub struct ScriptedPresenter {
    answers: VecDeque<Answer>,
    pub screens: Vec<String>,
    /// Choices and initially highlighted index of every list screen.
    pub lists: Vec<(Vec<String>, usize)>,
    pub proposals: Vec<Option<String>>,
    pub notifications: Vec<String>,
}

impl ScriptedPresenter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: answers.into(),
            ..Self::default()
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.answers.is_empty()
    }

    fn next(&mut self, title: &str) -> Answer {
        self.answers
            .pop_front()
            .unwrap_or_else(|| panic!("script ran out of answers at `{title}`"))
    }
}

impl Presenter for ScriptedPresenter {
    fn choose(&mut self, prompt: &ChoicePrompt) -> Result<Response<usize>> {
        self.screens.push(prompt.title.clone());
        self.lists.push((prompt.choices.clone(), prompt.selected));
        Ok(match self.next(&prompt.title) {
            Answer::Pick(index) => Response::Value(index),
            Answer::Skip => Response::Skip,
            Answer::Back => Response::Back,
            Answer::Cancel => Response::Cancel,
            other => panic!("`{other:?}` is not an answer to list `{}`", prompt.title),
        })
    }

    fn ask_text(&mut self, prompt: &TextPrompt) -> Result<Response<String>> {
        self.screens.push(prompt.title.clone());
        self.proposals.push(prompt.proposal.clone());
        Ok(match self.next(&prompt.title) {
            Answer::Enter(text) => Response::Value(text.to_string()),
            Answer::Proposal => match &prompt.proposal {
                Some(proposal) => Response::Value(proposal.clone()),
                None => Response::Skip,
            },
            Answer::Skip => Response::Skip,
            Answer::Back => Response::Back,
            Answer::Cancel => Response::Cancel,
            other => panic!("`{other:?}` is not an answer to text `{}`", prompt.title),
        })
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        self.notifications.push(message.to_string());
        Ok(())
    }
}

/// Supervisor that records what it was asked to run instead of running it.
pub struct RecordingSupervisor {
    pub runs: Vec<RunSpec>,
    pub exit_code: i32,
}

impl RecordingSupervisor {
    pub fn new(exit_code: i32) -> Self {
        Self {
            runs: Vec::new(),
            exit_code,
        }
    }
}

impl Supervisor for RecordingSupervisor {
    fn run(&mut self, run_spec: &RunSpec) -> Result<RunResult> {
        self.runs.push(run_spec.clone());
        Ok(RunResult {
            exit_code: self.exit_code,
            interrupted: false,
        })
    }
}

/// Number of option screens after the inventory screen in the default catalog.
pub const OPTIONAL_SCREENS: usize = 9;

/// `site.yml`, `group/deploy.yml` and an inventory `hosts.ini`.
pub fn playbook_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "site.yml");
    write(dir.path(), "group/deploy.yml");
    fs::write(dir.path().join("hosts.ini"), "[web]\nweb1\n").unwrap();
    dir
}

pub fn write(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "- hosts: all\n  tasks: []\n").unwrap();
}

pub fn canonical(dir: &TempDir) -> PathBuf {
    dir.path().canonicalize().unwrap()
}

pub fn skips(count: usize) -> Vec<Answer> {
    vec![Answer::Skip; count]
}
