// src/commands.rs
//! Command handlers for the lca-assembly CLI

use anyhow::{Context as _, Result};
use lca_assembly::assembly::{
    self, load_component, load_element, max_surface, non_opaque_area, opaque_area,
};
use lca_assembly::{
    ComponentCopyOptions, Config, CopyOptions, ElementCopier, SqliteStore, SystemClock,
};
use tracing::info;

/// Create the database file and schema
pub fn cmd_init(db_path: &str) -> Result<()> {
    info!("Initializing database at: {}", db_path);
    lca_assembly::db::init(db_path)?;
    println!("Database initialized successfully at: {}", db_path);
    Ok(())
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path))
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_copy_element(
    config: &Config,
    element_id: i64,
    owner: Option<i64>,
    project_variant: Option<i64>,
    access_group: Option<i64>,
    keep_name: bool,
    with_cache: bool,
    composite: Option<i64>,
    position: Option<i32>,
) -> Result<()> {
    let store = open_store(config)?;
    let clock = SystemClock;
    let copier = ElementCopier::new(store.context(&clock), config.acting_user_id)
        .with_copy_label(config.copy_label.clone());

    let mut options = CopyOptions {
        owner_id: owner,
        project_variant_id: project_variant,
        access_group_id: access_group,
        copy_name: keep_name,
        copy_cache_items: with_cache,
        composite: None,
    };
    if let Some(composite_id) = composite {
        options = options.nested_in(composite_id, position);
    }

    let copy = copier.copy_element(element_id, &options)?;
    println!(
        "Copied element {} to {} '{}'",
        element_id,
        copy.id.unwrap_or_default(),
        copy.name
    );
    Ok(())
}

pub fn cmd_copy_component(
    config: &Config,
    component_id: i64,
    target_element_id: i64,
    options: ComponentCopyOptions,
) -> Result<()> {
    let store = open_store(config)?;
    let clock = SystemClock;
    let copier = ElementCopier::new(store.context(&clock), config.acting_user_id);

    let source = load_component(&store, component_id)?;
    let copy = copier.copy_component(&source, target_element_id, &options)?;
    println!(
        "Copied component {} to {} in element {}",
        component_id,
        copy.id.unwrap_or_default(),
        target_element_id
    );
    Ok(())
}

pub fn cmd_create_sibling(config: &Config, component_id: i64) -> Result<()> {
    let store = open_store(config)?;
    let clock = SystemClock;
    let ctx = store.context(&clock);

    let mut component = load_component(&store, component_id)?;
    let sibling = assembly::create_sibling(&ctx, &mut component)?;
    println!(
        "Created sibling {} for component {} (area ratio 0.5 each)",
        sibling.id.unwrap_or_default(),
        component_id
    );
    Ok(())
}

pub fn cmd_reindex(config: &Config, element_id: i64) -> Result<()> {
    let store = open_store(config)?;
    let clock = SystemClock;
    let ctx = store.context(&clock);

    let element = load_element(&store, element_id)?;
    let (what, changed) = if element.is_composite() {
        ("members", assembly::reindex_composite_assignments(&ctx, &element)?)
    } else {
        ("layers", assembly::reindex_layers(&ctx, &element)?)
    };

    println!("Reindexed {} of element {}: {} changed", what, element_id, changed);
    Ok(())
}

pub fn cmd_surface(config: &Config, element_id: i64) -> Result<()> {
    let store = open_store(config)?;
    let element = load_element(&store, element_id)?;

    println!("Element {} '{}'", element_id, element.name);
    println!(
        "  Quantity:        {} {}",
        element.quantity, element.ref_unit
    );
    println!(
        "  Surface area:    {:.3} m2",
        assembly::surface_area(&store, &element)?
    );

    if element.is_composite() {
        println!(
            "  Non-opaque area: {:.3} m2",
            non_opaque_area(&store, &element)?
        );
        if let Some(area) = opaque_area(&store, &element)? {
            println!("  Opaque area:     {:.3} m2", area);
        }
    } else {
        println!("  Max surface:     {:.3} m2", max_surface(&store, &element)?);
        if !assembly::geometry_and_ref_unit_matches(&store, &element)? {
            println!("  Warning: layer geometry does not describe 1 m2");
        }
    }
    Ok(())
}

pub fn cmd_extant(config: &Config, element_id: i64, set: Option<bool>) -> Result<()> {
    let store = open_store(config)?;
    let element = load_element(&store, element_id)?;

    if let Some(extant) = set {
        let clock = SystemClock;
        let ctx = store.context(&clock);
        let updated = assembly::set_all_extant(&ctx, &element, extant)?;
        println!(
            "Element {}: {}",
            element_id,
            if updated { "updated" } else { "unchanged" }
        );
    }

    let describe = |flag: Option<bool>| match flag {
        Some(true) => "yes",
        Some(false) => "no",
        None => "n/a",
    };
    println!(
        "Element {}: all extant: {}, any extant: {}",
        element_id,
        describe(assembly::is_extant(&store, &element)?),
        describe(assembly::has_extants(&store, &element)?)
    );
    Ok(())
}

pub fn cmd_conversions(
    config: &Config,
    material_id: i64,
    include_operation: bool,
    json: bool,
) -> Result<()> {
    let store = open_store(config)?;
    let material = lca_assembly::conversion::load_material(&store, material_id)?;
    let include_operation = include_operation || config.include_operation_phase;

    let resolution =
        lca_assembly::resolve_required_conversions(&store, &material, include_operation)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    println!("Material {} '{}'", material_id, material.name);
    let sections = [
        ("Required", &resolution.required),
        ("Missing", &resolution.missing),
        ("Additional", &resolution.additional),
    ];
    for (title, conversions) in sections {
        println!("{} ({}):", title, conversions.len());
        for c in conversions {
            let factor = c
                .factor
                .map(|f| f.to_string())
                .unwrap_or_else(|| "?".to_string());
            println!(
                "  1 {} = {} {}{}",
                c.in_unit,
                factor,
                c.out_unit,
                c.ident
                    .as_deref()
                    .map(|i| format!(" [{}]", i))
                    .unwrap_or_default()
            );
        }
    }
    Ok(())
}

pub fn cmd_matrix(config: &Config, material_id: i64) -> Result<()> {
    let store = open_store(config)?;
    let mut material = lca_assembly::conversion::load_material(&store, material_id)?;
    let name = material.name.clone();
    let matrix = material.conversion_matrix(&store, false)?;

    println!("Material {} '{}': {} factors", material_id, name, matrix.len());
    for (from, to, factor) in matrix.entries() {
        println!("  {} -> {}: {}", from, to, factor);
    }
    Ok(())
}
