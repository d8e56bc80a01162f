//! Playpick Core Library
//!
//! This crate provides the core functionality for playpick, an interactive
//! front-end that finds Ansible playbooks, walks the operator through the
//! run-time options and launches `ansible-playbook` with a validated argument
//! vector.
//!
//! # Key Features
//!
//! - **Playbook Discovery**: Deterministic, lazy scanning of a playbook tree
//! - **Option Catalog**: Typed description and validation of supported flags
//! - **Menu State Machine**: Screen sequence over an abstract [`menu::Presenter`]
//! - **Command Assembly**: Pure mapping from selections to an argument vector
//! - **Run Supervision**: Child process attached to the operator's terminal
//!
//! # Examples
//!
//! Listing the playbooks below a directory:
//!
//! ```no_run
//! use playpick_core::locator::locate_playbooks;
//!
//! for playbook in locate_playbooks(std::path::Path::new("playbooks"))? {
//!     println!("{playbook}");
//! }
//! # Ok::<(), playpick_core::error::Error>(())
//! ```

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod error;
pub mod inventory;
pub mod locator;
pub mod menu;
pub mod selection;
pub mod session;
pub mod supervisor;
