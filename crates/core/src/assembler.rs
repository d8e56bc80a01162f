//! Turns a chosen playbook and a [`Selection`] into a [`RunSpec`].

use std::collections::HashMap;
use std::path::Path;

use leon::Template;
use log::debug;

use crate::catalog::{Catalog, OptionSpec, OptionValue};
use crate::error::{Error, Result};
use crate::locator::PlaybookRef;
use crate::selection::{RunSpec, Selection};

/// Executable launched when nothing else is configured.
pub const DEFAULT_EXECUTABLE: &str = "ansible-playbook";

/// Builds the argument vector for one run.
///
/// Options are emitted in catalog order; values equal to the option's default
/// emit nothing. Every template element becomes exactly one argument, so
/// values are never split or re-interpreted. The playbook, relative to
/// `working_directory`, is always the last argument.
///
/// # Errors
///
/// Returns [`Error::UnknownOption`] for a selection entry the catalog does not
/// define and [`Error::Validation`] for a value its validator rejects.
pub fn assemble(
    executable: &str,
    catalog: &Catalog,
    playbook: &PlaybookRef,
    selection: &Selection,
    working_directory: &Path,
) -> Result<RunSpec> {
    for (name, value) in selection.iter() {
        let option = catalog
            .get(name)
            .ok_or_else(|| Error::UnknownOption(name.to_string()))?;

        option
            .validate(value, working_directory)
            .map_err(|reason| Error::validation(name, reason))?;
    }

    let mut args: Vec<String> = Vec::new();

    for option in catalog.iter() {
        let Some(value) = selection.get(option.name) else {
            continue;
        };

        if option.is_default(value) {
            continue;
        }

        args.extend(render_flag(option, value)?);
    }

    args.push(playbook_argument(playbook, working_directory));

    debug!("Assembled arguments: {:?}", args);

    Ok(RunSpec {
        executable: executable.to_string(),
        args,
        working_directory: working_directory.to_path_buf(),
    })
}

fn render_flag(option: &OptionSpec, value: &OptionValue) -> Result<Vec<String>> {
    // A disabled flag never gets here unless its default is `true`, in which
    // case there is no flag spelling for "off".
    if let OptionValue::Enabled(false) = value {
        return Ok(Vec::new());
    }

    let mut context: HashMap<&str, &str> = HashMap::new();
    if let Some(text) = value.as_text() {
        context.insert("value", text);
    }

    let mut rendered = Vec::with_capacity(option.flag.len());
    for element in option.flag {
        let template = Template::parse(element)?;
        rendered.push(template.render(&context)?);
    }

    Ok(rendered)
}

fn playbook_argument(playbook: &PlaybookRef, working_directory: &Path) -> String {
    match playbook.path().strip_prefix(working_directory) {
        Ok(_) => playbook.name().to_string(),
        Err(_) => playbook.path().display().to_string(),
    }
}
