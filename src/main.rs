// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use lca_assembly::{ComponentCopyOptions, Config};
use std::path::Path;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::resolve(cli.config.as_deref().map(Path::new))?;
    if let Some(db_path) = cli.db_path {
        config.db_path = db_path;
    }

    match cli.command {
        Some(Commands::Init) => commands::cmd_init(&config.db_path),

        Some(Commands::CopyElement {
            element_id,
            owner,
            project_variant,
            access_group,
            keep_name,
            with_cache,
            composite,
            position,
        }) => commands::cmd_copy_element(
            &config,
            element_id,
            owner,
            project_variant,
            access_group,
            keep_name,
            with_cache,
            composite,
            position,
        ),

        Some(Commands::CopyComponent {
            component_id,
            target_element_id,
            sibling,
            with_cache,
            reset_area_ratio,
            position,
        }) => {
            let options = ComponentCopyOptions {
                sibling_id: sibling,
                copy_cache_items: with_cache,
                reset_area_ratio,
                layer_position: position,
            };
            commands::cmd_copy_component(&config, component_id, target_element_id, options)
        }

        Some(Commands::CreateSibling { component_id }) => {
            commands::cmd_create_sibling(&config, component_id)
        }

        Some(Commands::Reindex { element_id }) => commands::cmd_reindex(&config, element_id),

        Some(Commands::Surface { element_id }) => commands::cmd_surface(&config, element_id),

        Some(Commands::Extant { element_id, set }) => {
            commands::cmd_extant(&config, element_id, set)
        }

        Some(Commands::Conversions {
            material_id,
            include_operation,
            json,
        }) => commands::cmd_conversions(&config, material_id, include_operation, json),

        Some(Commands::Matrix { material_id }) => commands::cmd_matrix(&config, material_id),

        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "lca-assembly",
                &mut std::io::stdout(),
            );
            Ok(())
        }

        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
