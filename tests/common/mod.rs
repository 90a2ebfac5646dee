// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use lca_assembly::assembly::{self, Component, Element, ElementType, Layer};
use lca_assembly::{
    AssemblyStore, Context, EntityKind, FixedClock, IdAllocator, Material, SqliteStore, Unit, db,
};
use tempfile::TempDir;

/// Composite level wall (DIN 330)
pub const WALL_TYPE: i64 = 1;
/// Load-bearing wall layer, opaque (DIN 331)
pub const WALL_LAYER_TYPE: i64 = 2;
/// Exterior windows, non-opaque (DIN 334)
pub const WINDOW_TYPE: i64 = 3;
/// Cladding without an opacity flag (DIN 335)
pub const CLADDING_TYPE: i64 = 4;

pub const PROJECT_VARIANT: i64 = 7;
pub const ACTING_USER: i64 = 42;

/// A migrated database in a temp dir with the element types above.
///
/// Keep the value alive for the duration of the test.
pub struct TestDb {
    _dir: TempDir,
    pub db_path: String,
    pub store: SqliteStore,
    pub clock: FixedClock,
}

impl TestDb {
    pub fn ctx(&self) -> Context<'_> {
        self.store.context(&self.clock)
    }

    /// Number of rows in `table`
    pub fn count(&self, table: &str) -> i64 {
        self.store
            .connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    pub fn element_type(&self, node_id: i64) -> ElementType {
        self.store.find_element_type(node_id).unwrap().unwrap()
    }

    /// Insert a template element
    pub fn element(&self, type_node_id: i64, name: &str, unit: Unit, quantity: f64) -> Element {
        self.insert(type_node_id, name, unit, quantity, None)
    }

    /// Insert an element into the test project variant
    pub fn project_element(
        &self,
        type_node_id: i64,
        name: &str,
        unit: Unit,
        quantity: f64,
    ) -> Element {
        self.insert(type_node_id, name, unit, quantity, Some(PROJECT_VARIANT))
    }

    fn insert(
        &self,
        type_node_id: i64,
        name: &str,
        unit: Unit,
        quantity: f64,
        project_variant_id: Option<i64>,
    ) -> Element {
        let mut element = Element::new(&self.element_type(type_node_id), name, unit)
            .unwrap()
            .with_quantity(quantity);
        element.project_variant_id = project_variant_id;
        assembly::insert_element(&self.ctx(), &mut element).unwrap();
        element
    }

    /// Append a 1 m x 1 m layer of `size` metres
    pub fn layer(&self, element: &Element, size: f64) -> Component {
        self.layer_with(element, Layer::new(size))
    }

    pub fn layer_with(&self, element: &Element, layer: Layer) -> Component {
        let mut component = Component::new_layer(element.id.unwrap(), 1, 1, 50, layer);
        assembly::add_component(&self.ctx(), element, &mut component).unwrap();
        component
    }

    /// Append a plain (non-layer) component
    pub fn plain_component(&self, element: &Element, quantity: f64) -> Component {
        let mut component = Component::new(element.id.unwrap(), 1, 1, 30).with_quantity(quantity);
        assembly::add_component(&self.ctx(), element, &mut component).unwrap();
        component
    }

    pub fn material(&self, name: &str) -> Material {
        let mut material = Material::new(name);
        material.id = Some(self.store.next_id(EntityKind::Material).unwrap());
        self.store.insert_material(&material).unwrap();
        material
    }

    pub fn reload_element(&self, id: i64) -> Element {
        self.store.find_element(id).unwrap().unwrap()
    }

    pub fn reload_component(&self, id: i64) -> Component {
        self.store.find_component(id).unwrap().unwrap()
    }
}

/// Create a test database with the standard element types.
pub fn setup_test_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db").to_str().unwrap().to_string();

    db::init(&db_path).unwrap();
    let store = SqliteStore::open(&db_path).unwrap();

    let types = [
        ElementType::new(WALL_TYPE, 330, "Exterior walls"),
        ElementType::new(WALL_LAYER_TYPE, 331, "Load-bearing exterior walls").with_opaque(true),
        ElementType::new(WINDOW_TYPE, 334, "Exterior windows").with_opaque(false),
        ElementType::new(CLADDING_TYPE, 335, "Exterior wall cladding"),
    ];
    for element_type in &types {
        store.insert_element_type(element_type).unwrap();
    }

    TestDb {
        _dir: dir,
        db_path,
        store,
        clock: FixedClock(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
    }
}

/// A template wall made of two opaque members:
/// `m1` with a sibling pair at position 1 and a plain layer at 2,
/// `m2` with a single layer.
pub struct WallFixture {
    pub wall: Element,
    pub m1: Element,
    pub m2: Element,
    pub pair: (Component, Component),
    pub m1_plain: Component,
    pub m2_layer: Component,
}

pub fn setup_wall(db: &TestDb) -> WallFixture {
    let ctx = db.ctx();
    let wall = db.element(WALL_TYPE, "Wall Type A", Unit::m2(), 1.0);
    let mut m1 = db.element(WALL_LAYER_TYPE, "Masonry", Unit::m2(), 1.0);
    let mut m2 = db.element(WALL_LAYER_TYPE, "Plaster", Unit::m2(), 1.0);

    let mut a = db.layer(&m1, 0.175);
    let b = assembly::create_sibling(&ctx, &mut a).unwrap();
    let m1_plain = db.layer(&m1, 0.1);
    let m2_layer = db.layer(&m2, 0.015);

    assembly::assign_member(&ctx, &wall, &mut m1, None).unwrap();
    assembly::assign_member(&ctx, &wall, &mut m2, None).unwrap();

    WallFixture {
        wall: db.reload_element(wall.id.unwrap()),
        m1,
        m2,
        pair: (a, b),
        m1_plain,
        m2_layer,
    }
}
