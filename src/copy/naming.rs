// src/copy/naming.rs

//! Numbered copy names: `"<N>. copy of <name>"`

use crate::assembly::Element;
use crate::error::{Error, Result};
use crate::store::AssemblyStore;
use regex::Regex;

/// Default label between the counter and the original name
pub const DEFAULT_COPY_LABEL: &str = "copy of";

/// Next free copy name for `source` within its type and variant scope
///
/// Existing names of the form `"<N>. <label> <name>"` are matched without
/// regard to case; the result uses the highest `N` found plus one, or 1.
pub fn unique_copy_name(
    store: &dyn AssemblyStore,
    source: &Element,
    label: &str,
) -> Result<String> {
    let suffix = format!("{} {}", label, source.name);
    let names =
        store.find_element_names_in_scope(source.element_type_node_id, source.project_variant_id)?;

    let next = next_counter(&names, &suffix)?;
    Ok(format!("{}. {}", next, suffix))
}

fn next_counter(names: &[String], suffix: &str) -> Result<u64> {
    let pattern = Regex::new(&format!(r"(?i)^(\d+)\. {}$", regex::escape(suffix)))
        .map_err(|e| Error::InitError(format!("Invalid copy name pattern: {}", e)))?;

    let max = names
        .iter()
        .filter_map(|name| pattern.captures(name))
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    Ok(max + 1)
}
