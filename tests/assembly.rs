// tests/assembly.rs

//! Assembly tree tests: components, siblings, reindexing, composite
//! membership, surfaces and extant flags.

mod common;

use common::{CLADDING_TYPE, WALL_LAYER_TYPE, WALL_TYPE, WINDOW_TYPE, setup_test_db, setup_wall};
use lca_assembly::assembly::{self, Component, Layer, SiblingPair};
use lca_assembly::{AssemblyStore, Error, Unit};

#[test]
fn test_composite_rejects_components() {
    let db = setup_test_db();
    let wall = db.element(WALL_TYPE, "Wall", Unit::m2(), 1.0);
    let wall_id = wall.id.unwrap();

    let mut layer = Component::new_layer(wall_id, 1, 1, 50, Layer::new(0.2));
    let err = assembly::add_component(&db.ctx(), &wall, &mut layer).unwrap_err();

    assert!(matches!(err, Error::CompositeCannotHoldComponents(id) if id == wall_id));
    assert!(layer.id.is_none());
    assert_eq!(db.count("element_components"), 0);
}

#[test]
fn test_layers_are_appended() {
    let db = setup_test_db();
    let leaf = db.element(WALL_LAYER_TYPE, "Masonry", Unit::m2(), 1.0);

    let first = db.layer(&leaf, 0.2);
    let second = db.layer(&leaf, 0.1);
    let plain = db.plain_component(&leaf, 3.0);

    assert_eq!(first.layer_position(), Some(1));
    assert_eq!(second.layer_position(), Some(2));
    assert_eq!(plain.layer_position(), None);

    let stored = db.store.find_components(leaf.id.unwrap()).unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[2].id, plain.id);
    assert_eq!(stored[0].created.as_deref(), Some("2024-03-01T12:00:00Z"));
}

#[test]
fn test_create_sibling_links_both_ways() {
    let db = setup_test_db();
    let leaf = db.element(WALL_LAYER_TYPE, "Masonry", Unit::m2(), 1.0);
    let mut layer = db.layer_with(&leaf, Layer::new(0.2).with_dimensions(2.0, 3.0));

    let sibling = assembly::create_sibling(&db.ctx(), &mut layer).unwrap();

    assert_eq!(layer.sibling_id(), sibling.id);
    assert_eq!(sibling.sibling_id(), layer.id);
    assert_eq!(layer.layer_area_ratio(), Some(0.5));
    assert_eq!(sibling.layer_area_ratio(), Some(0.5));
    assert_eq!(sibling.layer_position(), layer.layer_position());
    assert_eq!(sibling.layer.as_ref().map(|l| (l.length, l.width)), Some((2.0, 3.0)));
    assert_eq!(sibling.material_id, layer.material_id);

    let stored_a = db.reload_component(layer.id.unwrap());
    let stored_b = db.reload_component(sibling.id.unwrap());
    assert_eq!(stored_a.sibling_id(), stored_b.id);
    assert_eq!(stored_b.sibling_id(), stored_a.id);

    let components = db.store.find_components(leaf.id.unwrap()).unwrap();
    assert_eq!(
        SiblingPair::resolve(&components).unwrap(),
        vec![SiblingPair::new(layer.id.unwrap(), sibling.id.unwrap())]
    );
}

#[test]
fn test_create_sibling_twice_fails() {
    let db = setup_test_db();
    let leaf = db.element(WALL_LAYER_TYPE, "Masonry", Unit::m2(), 1.0);
    let mut layer = db.layer(&leaf, 0.2);
    let mut stale = layer.clone();

    let mut sibling = assembly::create_sibling(&db.ctx(), &mut layer).unwrap();
    assert_eq!(db.count("element_components"), 2);

    let err = assembly::create_sibling(&db.ctx(), &mut layer).unwrap_err();
    assert!(matches!(err, Error::AlreadyHasSibling(_)));

    // The stored state decides, not the caller's copy
    let err = assembly::create_sibling(&db.ctx(), &mut stale).unwrap_err();
    assert!(matches!(err, Error::AlreadyHasSibling(_)));

    let err = assembly::create_sibling(&db.ctx(), &mut sibling).unwrap_err();
    assert!(matches!(err, Error::AlreadyHasSibling(_)));

    assert_eq!(db.count("element_components"), 2);
}

#[test]
fn test_create_sibling_requires_layer() {
    let db = setup_test_db();
    let leaf = db.element(WALL_LAYER_TYPE, "Masonry", Unit::m2(), 1.0);
    let mut plain = db.plain_component(&leaf, 2.0);

    let err = assembly::create_sibling(&db.ctx(), &mut plain).unwrap_err();
    assert!(matches!(err, Error::NotALayer(_)));
}

#[test]
fn test_area_ratio_stays_complementary() {
    let db = setup_test_db();
    let leaf = db.element(WALL_LAYER_TYPE, "Masonry", Unit::m2(), 1.0);
    let mut layer = db.layer(&leaf, 0.2);
    let sibling = assembly::create_sibling(&db.ctx(), &mut layer).unwrap();

    assembly::set_layer_area_ratio(&db.ctx(), &mut layer, 0.25).unwrap();

    assert_eq!(layer.layer_area_ratio(), Some(0.25));
    let stored_sibling = db.reload_component(sibling.id.unwrap());
    assert_eq!(stored_sibling.layer_area_ratio(), Some(0.75));

    for bad in [0.0, 1.0, 1.5, f64::NAN] {
        let err = assembly::set_layer_area_ratio(&db.ctx(), &mut layer, bad).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "layer_area_ratio", .. }));
    }
    assert_eq!(db.reload_component(layer.id.unwrap()).layer_area_ratio(), Some(0.25));

    let mut single = db.layer(&leaf, 0.1);
    assembly::set_layer_area_ratio(&db.ctx(), &mut single, 1.0).unwrap();
}

#[test]
fn test_remove_component_releases_sibling() {
    let db = setup_test_db();
    let leaf = db.element(WALL_LAYER_TYPE, "Masonry", Unit::m2(), 1.0);
    let mut first = db.layer(&leaf, 0.2);
    let sibling = assembly::create_sibling(&db.ctx(), &mut first).unwrap();
    let last = db.layer(&leaf, 0.1);
    assert_eq!(last.layer_position(), Some(2));

    assembly::remove_component(&db.ctx(), sibling.id.unwrap()).unwrap();

    let survivor = db.reload_component(first.id.unwrap());
    assert!(!survivor.has_sibling());
    assert_eq!(survivor.layer_area_ratio(), Some(1.0));
    assert!(db.store.find_component(sibling.id.unwrap()).unwrap().is_none());

    assembly::remove_component(&db.ctx(), first.id.unwrap()).unwrap();
    assert_eq!(db.reload_component(last.id.unwrap()).layer_position(), Some(1));

    let err = assembly::remove_component(&db.ctx(), 999).unwrap_err();
    assert!(matches!(err, Error::NotFoundError(_)));
}

#[test]
fn test_reindex_layers_is_dense_and_idempotent() {
    let db = setup_test_db();
    let leaf = db.element(WALL_LAYER_TYPE, "Masonry", Unit::m2(), 1.0);

    let a = db.layer_with(&leaf, Layer::new(0.1).at_position(5));
    let mut b = db.layer_with(&leaf, Layer::new(0.2).at_position(9));
    let b_sibling = assembly::create_sibling(&db.ctx(), &mut b).unwrap();
    let c = db.layer_with(&leaf, Layer::new(0.3).at_position(12));
    let plain = db.plain_component(&leaf, 4.0);

    let changed = assembly::reindex_layers(&db.ctx(), &leaf).unwrap();
    assert_eq!(changed, 4);

    let position = |id: Option<i64>| db.reload_component(id.unwrap()).layer_position();
    assert_eq!(position(a.id), Some(1));
    assert_eq!(position(b.id), Some(2));
    assert_eq!(position(b_sibling.id), Some(2));
    assert_eq!(position(c.id), Some(3));
    assert_eq!(position(plain.id), None);

    // 4 layers, one sibling duplicate
    let mut positions: Vec<i32> = db
        .store
        .find_components(leaf.id.unwrap())
        .unwrap()
        .iter()
        .filter_map(Component::layer_position)
        .collect();
    positions.dedup();
    assert_eq!(positions, vec![1, 2, 3]);

    assert_eq!(assembly::reindex_layers(&db.ctx(), &leaf).unwrap(), 0);
    assert_eq!(position(c.id), Some(3));
}

#[test]
fn test_reindex_composite_is_noop_for_layers() {
    let db = setup_test_db();
    let fixture = setup_wall(&db);

    assert_eq!(assembly::reindex_layers(&db.ctx(), &fixture.wall).unwrap(), 0);
    assert_eq!(
        assembly::reindex_composite_assignments(&db.ctx(), &fixture.m1).unwrap(),
        0
    );
}

#[test]
fn test_opaque_members_go_before_openings() {
    let db = setup_test_db();
    let wall = db.project_element(WALL_TYPE, "Wall", Unit::m2(), 10.0);
    let wall_id = wall.id.unwrap();

    let mut masonry = db.project_element(WALL_LAYER_TYPE, "Masonry", Unit::m3(), 3.0);
    let mut window = db.project_element(WINDOW_TYPE, "Window", Unit::piece(), 2.0);
    db.layer_with(&window, Layer::new(0.1).with_dimensions(1.2, 1.5));
    let mut plaster = db.project_element(CLADDING_TYPE, "Plaster", Unit::kg(), 1.0);

    let ctx = db.ctx();
    assert_eq!(assembly::assign_member(&ctx, &wall, &mut masonry, None).unwrap().position, 1);
    assert_eq!(assembly::assign_member(&ctx, &wall, &mut window, None).unwrap().position, 2);
    assert_eq!(assembly::assign_member(&ctx, &wall, &mut plaster, None).unwrap().position, 2);

    let order: Vec<(i64, i32)> = db
        .store
        .find_assignments(wall_id)
        .unwrap()
        .iter()
        .map(|a| (a.element_id, a.position))
        .collect();
    assert_eq!(
        order,
        vec![
            (masonry.id.unwrap(), 1),
            (plaster.id.unwrap(), 2),
            (window.id.unwrap(), 3)
        ]
    );

    // Opaque members follow the composite; openings keep their own measure
    assert_eq!(masonry.quantity, 10.0);
    assert_eq!(masonry.ref_unit, Unit::m2());
    assert!((plaster.quantity - 6.4).abs() < 1e-9);
    assert_eq!(db.reload_element(plaster.id.unwrap()).ref_unit, Unit::m2());
    assert_eq!(window.quantity, 2.0);
    assert_eq!(window.ref_unit, Unit::piece());
}

#[test]
fn test_assign_propagates_public_and_reference_flags() {
    let db = setup_test_db();
    let mut wall = db.element(WALL_TYPE, "Wall", Unit::m2(), 1.0);
    wall.is_public = true;
    wall.is_reference = true;
    db.store.update_element(&wall).unwrap();

    let mut leaf = db.element(WALL_LAYER_TYPE, "Masonry", Unit::m2(), 1.0);
    assembly::assign_member(&db.ctx(), &wall, &mut leaf, None).unwrap();

    let stored = db.reload_element(leaf.id.unwrap());
    assert!(stored.is_public);
    assert!(stored.is_reference);
}

#[test]
fn test_assign_rejects_cycles_and_leaf_targets() {
    let db = setup_test_db();
    let outer = db.element(WALL_TYPE, "Outer", Unit::m2(), 1.0);
    let mut inner = db.element(WALL_TYPE, "Inner", Unit::m2(), 1.0);
    let mut outer_member = outer.clone();
    let mut leaf = db.element(WALL_LAYER_TYPE, "Masonry", Unit::m2(), 1.0);

    assembly::assign_member(&db.ctx(), &outer, &mut inner, None).unwrap();

    let err = assembly::assign_member(&db.ctx(), &inner, &mut outer_member, None).unwrap_err();
    assert!(matches!(err, Error::CyclicAssembly(_)));

    let mut itself = outer.clone();
    let err = assembly::assign_member(&db.ctx(), &outer, &mut itself, None).unwrap_err();
    assert!(matches!(err, Error::CyclicAssembly(_)));

    let mut other = db.element(WALL_LAYER_TYPE, "Plaster", Unit::m2(), 1.0);
    let err = assembly::assign_member(&db.ctx(), &leaf, &mut other, None).unwrap_err();
    assert!(matches!(err, Error::NotAComposite(_)));

    assembly::assign_member(&db.ctx(), &inner, &mut leaf, None).unwrap();
    assert_eq!(db.count("composite_elements"), 2);
}

#[test]
fn test_unassign_closes_gap() {
    let db = setup_test_db();
    let fixture = setup_wall(&db);
    let wall_id = fixture.wall.id.unwrap();
    let mut cladding = db.element(CLADDING_TYPE, "Cladding", Unit::m2(), 1.0);
    assembly::assign_member(&db.ctx(), &fixture.wall, &mut cladding, None).unwrap();

    assembly::unassign_member(&db.ctx(), &fixture.wall, fixture.m1.id.unwrap()).unwrap();

    let positions: Vec<(i64, i32)> = db
        .store
        .find_assignments(wall_id)
        .unwrap()
        .iter()
        .map(|a| (a.element_id, a.position))
        .collect();
    assert_eq!(
        positions,
        vec![(fixture.m2.id.unwrap(), 1), (cladding.id.unwrap(), 2)]
    );
}

#[test]
fn test_reindex_composite_assignments() {
    let db = setup_test_db();
    let fixture = setup_wall(&db);
    let wall_id = fixture.wall.id.unwrap();

    let mut assignments = db.store.find_assignments(wall_id).unwrap();
    assignments[0].position = 4;
    assignments[1].position = 9;
    for a in &assignments {
        db.store.update_assignment(a).unwrap();
    }

    assert_eq!(
        assembly::reindex_composite_assignments(&db.ctx(), &fixture.wall).unwrap(),
        2
    );
    let positions: Vec<i32> = db
        .store
        .find_assignments(wall_id)
        .unwrap()
        .iter()
        .map(|a| a.position)
        .collect();
    assert_eq!(positions, vec![1, 2]);
    assert_eq!(
        assembly::reindex_composite_assignments(&db.ctx(), &fixture.wall).unwrap(),
        0
    );
}

#[test]
fn test_surface_area() {
    let db = setup_test_db();

    // Area-measured elements report their quantity
    let area_leaf = db.element(WALL_LAYER_TYPE, "Masonry", Unit::m2(), 10.0);
    db.layer_with(&area_leaf, Layer::new(0.2).with_dimensions(2.0, 2.0));
    assert_eq!(assembly::surface_area(&db.store, &area_leaf).unwrap(), 10.0);

    // Otherwise the largest layer surface times quantity
    let beam = db.element(WALL_LAYER_TYPE, "Beam", Unit::m(), 2.0);
    db.layer_with(&beam, Layer::new(0.2).with_dimensions(2.0, 3.0));
    db.layer_with(&beam, Layer::new(0.1).with_dimensions(1.0, 1.0));
    assert_eq!(assembly::max_surface(&db.store, &beam).unwrap(), 6.0);
    assert_eq!(assembly::surface_area(&db.store, &beam).unwrap(), 12.0);

    let empty = db.element(WALL_LAYER_TYPE, "Empty", Unit::kg(), 5.0);
    assert_eq!(assembly::surface_area(&db.store, &empty).unwrap(), 0.0);

    // Composites use their largest opaque member, openings are skipped
    let wall = db.element(WALL_TYPE, "Wall", Unit::piece(), 3.0);
    let mut opaque = db.element(WALL_LAYER_TYPE, "Panel", Unit::kg(), 1.0);
    db.layer_with(&opaque, Layer::new(0.2).with_dimensions(2.0, 2.0));
    let mut window = db.element(WINDOW_TYPE, "Window", Unit::piece(), 1.0);
    db.layer_with(&window, Layer::new(0.1).with_dimensions(3.0, 3.0));
    assembly::assign_member(&db.ctx(), &wall, &mut opaque, None).unwrap();
    assembly::assign_member(&db.ctx(), &wall, &mut window, None).unwrap();

    assert_eq!(assembly::surface_area(&db.store, &wall).unwrap(), 12.0);
}

#[test]
fn test_opaque_and_non_opaque_area() {
    let db = setup_test_db();
    let wall = db.project_element(WALL_TYPE, "Wall", Unit::m2(), 10.0);
    let mut window = db.project_element(WINDOW_TYPE, "Window", Unit::piece(), 3.0);
    db.layer_with(&window, Layer::new(0.1).with_dimensions(1.0, 1.5));
    assembly::assign_member(&db.ctx(), &wall, &mut window, None).unwrap();

    assert_eq!(assembly::non_opaque_area(&db.store, &wall).unwrap(), 4.5);
    assert_eq!(assembly::opaque_area(&db.store, &wall).unwrap(), Some(5.5));

    let template = db.element(WALL_TYPE, "Template wall", Unit::m2(), 8.0);
    assert_eq!(assembly::opaque_area(&db.store, &template).unwrap(), Some(8.0));

    let small = db.project_element(WALL_TYPE, "Small wall", Unit::m2(), 2.0);
    let mut big_window = db.project_element(WINDOW_TYPE, "Big window", Unit::piece(), 1.0);
    db.layer_with(&big_window, Layer::new(0.1).with_dimensions(2.0, 2.0));
    assembly::assign_member(&db.ctx(), &small, &mut big_window, None).unwrap();
    assert_eq!(assembly::opaque_area(&db.store, &small).unwrap(), Some(0.0));

    let leaf = db.project_element(WALL_LAYER_TYPE, "Leaf", Unit::m2(), 1.0);
    assert_eq!(assembly::opaque_area(&db.store, &leaf).unwrap(), None);
}

#[test]
fn test_extant_flags() {
    let db = setup_test_db();
    let leaf = db.element(WALL_LAYER_TYPE, "Masonry", Unit::m2(), 1.0);
    assert_eq!(assembly::is_extant(&db.store, &leaf).unwrap(), None);

    let mut existing = Component::new(leaf.id.unwrap(), 1, 1, 40).extant(12);
    assembly::add_component(&db.ctx(), &leaf, &mut existing).unwrap();
    let new = db.plain_component(&leaf, 1.0);

    assert_eq!(assembly::is_extant(&db.store, &leaf).unwrap(), Some(false));
    assert_eq!(assembly::has_extants(&db.store, &leaf).unwrap(), Some(true));

    assert!(assembly::set_all_extant(&db.ctx(), &leaf, true).unwrap());
    assert_eq!(assembly::is_extant(&db.store, &leaf).unwrap(), Some(true));
    assert!(!assembly::set_all_extant(&db.ctx(), &leaf, true).unwrap());

    assert!(assembly::set_all_extant(&db.ctx(), &leaf, false).unwrap());
    let existing = db.reload_component(existing.id.unwrap());
    assert!(!existing.is_extant);
    assert_eq!(existing.life_time_delay, 0);
    assert!(!db.reload_component(new.id.unwrap()).is_extant);
    assert_eq!(assembly::has_extants(&db.store, &leaf).unwrap(), Some(false));

    let wall = db.element(WALL_TYPE, "Wall", Unit::m2(), 1.0);
    assert_eq!(assembly::has_extants(&db.store, &wall).unwrap(), None);
    assert!(!assembly::set_all_extant(&db.ctx(), &wall, true).unwrap());
}

#[test]
fn test_geometry_and_ref_unit_check() {
    let db = setup_test_db();

    let square = db.element(WALL_LAYER_TYPE, "Square", Unit::m2(), 1.0);
    db.layer(&square, 0.2);
    assert!(assembly::geometry_and_ref_unit_matches(&db.store, &square).unwrap());

    let oversized = db.element(WALL_LAYER_TYPE, "Oversized", Unit::m2(), 1.0);
    db.layer_with(&oversized, Layer::new(0.2).with_dimensions(2.0, 1.0));
    assert!(!assembly::geometry_and_ref_unit_matches(&db.store, &oversized).unwrap());

    let by_volume = db.element(WALL_LAYER_TYPE, "Volume", Unit::m3(), 1.0);
    db.layer_with(&by_volume, Layer::new(0.2).with_dimensions(2.0, 1.0));
    assert!(assembly::geometry_and_ref_unit_matches(&db.store, &by_volume).unwrap());
}
