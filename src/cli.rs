// src/cli.rs
//! CLI definitions for lca-assembly
//!
//! Only argument definitions live here; the handlers are in `commands`.

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "lca-assembly")]
#[command(version)]
#[command(about = "Maintain, copy and audit building element assemblies", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to the database file (overrides the configuration)
    #[arg(short, long, global = true)]
    pub db_path: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Deep-copy an element with its members or components
    CopyElement {
        /// Element to copy
        element_id: i64,

        /// Owner of the copy (default: the configured acting user)
        #[arg(long)]
        owner: Option<i64>,

        /// Project variant to copy into (default: template scope)
        #[arg(long)]
        project_variant: Option<i64>,

        /// Access group of the copy (default: the source's)
        #[arg(long)]
        access_group: Option<i64>,

        /// Keep the source name instead of numbering the copy
        #[arg(long)]
        keep_name: bool,

        /// Also copy cached results
        #[arg(long)]
        with_cache: bool,

        /// Composite element the copy becomes a member of
        #[arg(long)]
        composite: Option<i64>,

        /// Member position inside the composite (default: last)
        #[arg(long, requires = "composite")]
        position: Option<i32>,
    },

    /// Copy a single component into an element
    CopyComponent {
        /// Component to copy
        component_id: i64,

        /// Element receiving the copy
        target_element_id: i64,

        /// Link the copy to this sibling component
        #[arg(long)]
        sibling: Option<i64>,

        /// Also copy cached results
        #[arg(long)]
        with_cache: bool,

        /// Let the copy cover the whole layer area
        #[arg(long)]
        reset_area_ratio: bool,

        /// Layer position of the copy
        #[arg(long)]
        position: Option<i32>,
    },

    /// Split a layer into two siblings sharing its area
    CreateSibling {
        /// Layer component to split
        component_id: i64,
    },

    /// Renumber layers (leaf element) or members (composite element)
    Reindex {
        element_id: i64,
    },

    /// Show surface areas of an element
    Surface {
        element_id: i64,
    },

    /// Show or change whether an element's components are extant
    Extant {
        element_id: i64,

        /// Mark all components extant (true) or not (false)
        #[arg(long)]
        set: Option<bool>,
    },

    /// Audit the conversions a material needs
    Conversions {
        material_id: i64,

        /// Count operation-phase processes too (overrides the configuration)
        #[arg(long)]
        include_operation: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the conversion factors of a material
    Matrix {
        material_id: i64,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
