// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn id_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).required(true).help(help)
}

fn build_cli() -> Command {
    Command::new("lca-assembly")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Maintain, copy and audit building element assemblies")
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("Path to the configuration file (default: /etc/lca-assembly/config.toml)"),
        )
        .arg(
            Arg::new("db_path")
                .short('d')
                .long("db-path")
                .value_name("PATH")
                .global(true)
                .help(
                    "Database path (default: /var/lib/lca-assembly/assembly.db, env LCA_ASSEMBLY_DB)",
                ),
        )
        .subcommand(Command::new("init").about("Initialize a new database"))
        .subcommand(
            Command::new("copy-element")
                .about("Deep-copy an element with its members or components")
                .arg(id_arg("element_id", "Element to copy"))
                .arg(Arg::new("owner").long("owner").help("Owner of the copy"))
                .arg(
                    Arg::new("project_variant")
                        .long("project-variant")
                        .help("Project variant to copy into (default: template scope)"),
                )
                .arg(Arg::new("access_group").long("access-group").help("Access group of the copy"))
                .arg(
                    Arg::new("keep_name")
                        .long("keep-name")
                        .action(ArgAction::SetTrue)
                        .help("Keep the source name instead of numbering the copy"),
                )
                .arg(
                    Arg::new("with_cache")
                        .long("with-cache")
                        .action(ArgAction::SetTrue)
                        .help("Also copy cached results"),
                )
                .arg(
                    Arg::new("composite")
                        .long("composite")
                        .help("Composite element the copy joins"),
                )
                .arg(
                    Arg::new("position")
                        .long("position")
                        .help("Member position in the composite"),
                ),
        )
        .subcommand(
            Command::new("copy-component")
                .about("Copy a single component into an element")
                .arg(id_arg("component_id", "Component to copy"))
                .arg(id_arg("target_element_id", "Element receiving the copy"))
                .arg(Arg::new("sibling").long("sibling").help("Link the copy to this sibling"))
                .arg(
                    Arg::new("with_cache")
                        .long("with-cache")
                        .action(ArgAction::SetTrue)
                        .help("Also copy cached results"),
                )
                .arg(
                    Arg::new("reset_area_ratio")
                        .long("reset-area-ratio")
                        .action(ArgAction::SetTrue)
                        .help("Let the copy cover the whole layer area"),
                )
                .arg(Arg::new("position").long("position").help("Layer position of the copy")),
        )
        .subcommand(
            Command::new("create-sibling")
                .about("Split a layer into two siblings sharing its area")
                .arg(id_arg("component_id", "Layer component to split")),
        )
        .subcommand(
            Command::new("reindex")
                .about("Renumber layers or composite members")
                .arg(id_arg("element_id", "Element to reindex")),
        )
        .subcommand(
            Command::new("surface")
                .about("Show surface areas of an element")
                .arg(id_arg("element_id", "Element")),
        )
        .subcommand(
            Command::new("extant")
                .about("Show or change whether an element's components are extant")
                .arg(id_arg("element_id", "Element"))
                .arg(Arg::new("set").long("set").value_parser(["true", "false"]).help("New flag")),
        )
        .subcommand(
            Command::new("conversions")
                .about("Audit the conversions a material needs")
                .arg(id_arg("material_id", "Material"))
                .arg(
                    Arg::new("include_operation")
                        .long("include-operation")
                        .action(ArgAction::SetTrue)
                        .help("Count operation-phase processes too"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the result as JSON"),
                ),
        )
        .subcommand(
            Command::new("matrix")
                .about("Show the conversion factors of a material")
                .arg(id_arg("material_id", "Material")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("lca-assembly.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
