//! Playpick CLI Library
//!
//! This crate provides the command-line interface for playpick, an
//! interactive front-end for `ansible-playbook`. It parses arguments and
//! draws the menu screens in the terminal; the menu logic itself lives in
//! `playpick_core`.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`terminal`]: Terminal presenter for the list and text screens
//!
//! # Examples
//!
//! ```bash
//! # Scan the current directory
//! playpick
//!
//! # Scan another directory and only print the assembled command
//! playpick --dry-run ~/ansible
//!
//! # Launch a different ansible-playbook
//! playpick -e /opt/ansible/bin/ansible-playbook
//! ```

pub mod cli_args;
pub mod terminal;
