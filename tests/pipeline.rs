use sqlerd::config::LayoutConfig;
use sqlerd::error::Error;
use sqlerd::layout::LayoutEngine;
use sqlerd::model::RelationshipKind;
use sqlerd::sql::extract;
use sqlerd::view::{ViewTransform, column_at, table_at};

fn fixed(_font: &str, text: &str) -> f64 {
    text.chars().count() as f64 * 7.0
}

const SHOP: &str = r#"
-- Shop schema
CREATE TABLE customers (
    id SERIAL PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    name TEXT
);

CREATE TABLE products (
    id SERIAL PRIMARY KEY,
    title VARCHAR(200) NOT NULL,
    price NUMERIC(10,2) DEFAULT 0 CHECK (price >= 0)
);

CREATE TABLE orders (
    id SERIAL PRIMARY KEY,
    customer_id INT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT now()
);

CREATE TABLE order_items (
    order_id INT NOT NULL,
    product_id INT NOT NULL,
    quantity INT DEFAULT 1,
    PRIMARY KEY (order_id, product_id),
    CONSTRAINT fk_items_order FOREIGN KEY (order_id) REFERENCES orders(id)
);

ALTER TABLE order_items ADD CONSTRAINT fk_items_product
    FOREIGN KEY (product_id) REFERENCES products(id);
"#;

#[test]
fn test_round_trip_basic_table() {
    let schema = extract("CREATE TABLE t (id INT PRIMARY KEY, name VARCHAR(50) NOT NULL)");
    assert_eq!(schema.tables.len(), 1);
    let t = &schema.tables[0];
    assert_eq!(t.name, "t");

    let id = t.column("id").unwrap();
    assert!(id.is_primary_key);
    assert!(id.is_not_null);

    let name = t.column("name").unwrap();
    assert!(name.is_not_null);
    assert_eq!(name.data_type, "VARCHAR(50)");
}

#[test]
fn test_extraction_is_idempotent() {
    assert_eq!(extract(SHOP), extract(SHOP));
}

#[test]
fn test_inline_reference_synthesizes_relationship() {
    let schema = extract("CREATE TABLE orders(id INT, customer_id INT REFERENCES customers(id))");
    assert_eq!(schema.relationships.len(), 1);
    let rel = &schema.relationships[0];
    assert_eq!(rel.from.table, "orders");
    assert_eq!(rel.from.columns, vec!["customer_id"]);
    assert_eq!(rel.to.table, "customers");
    assert_eq!(rel.to.columns, vec!["id"]);
    assert_eq!(rel.kind, RelationshipKind::ManyToOne);
}

#[test]
fn test_inline_and_alter_reference_deduplicated() {
    let schema = extract(
        r#"
        CREATE TABLE customers (id INT PRIMARY KEY);
        CREATE TABLE orders (id INT, customer_id INT REFERENCES customers(id));
        ALTER TABLE orders
            ADD CONSTRAINT fk_cust FOREIGN KEY (customer_id) REFERENCES customers(id);
        "#,
    );
    assert_eq!(schema.relationships.len(), 1);
}

#[test]
fn test_shop_schema() {
    let schema = extract(SHOP);
    let names: Vec<_> = schema.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["customers", "products", "orders", "order_items"]);
    assert_eq!(schema.relationships.len(), 3);

    let items = schema.table("order_items").unwrap();
    assert!(items.column("order_id").unwrap().is_primary_key);
    assert!(items.column("product_id").unwrap().is_primary_key);
    let product = items.column("product_id").unwrap().foreign_key.as_ref().unwrap();
    assert_eq!(product.table, "products");

    let price = schema.table("products").unwrap().column("price").unwrap();
    assert_eq!(price.data_type, "NUMERIC(10,2)");
    assert_eq!(price.default_value.as_deref(), Some("0"));
    assert_eq!(price.check_expression.as_deref(), Some("(price >= 0)"));

    let created = schema.table("orders").unwrap().column("created_at").unwrap();
    assert_eq!(created.data_type, "TIMESTAMP WITH TIME ZONE");
}

#[test]
fn test_empty_input() {
    let schema = extract("");
    assert!(schema.tables.is_empty());
    assert!(schema.relationships.is_empty());

    let layout = LayoutEngine::default().layout(&[], &[], &fixed);
    assert!(layout.is_empty());

    let err = sqlerd::diagram("-- nothing here", &fixed, &LayoutConfig::default()).unwrap_err();
    assert!(matches!(err, Error::NoTables));
}

#[test]
fn test_chain_layering() {
    let schema = extract(
        r#"
        CREATE TABLE c (id INT, b_id INT REFERENCES b(id));
        CREATE TABLE b (id INT, a_id INT REFERENCES a(id));
        CREATE TABLE a (id INT);
        "#,
    );
    let layout = LayoutEngine::default().layout(&schema.tables, &schema.relationships, &fixed);

    assert_eq!(layout.layer_of("a"), Some(0));
    assert_eq!(layout.layer_of("b"), Some(1));
    assert_eq!(layout.layer_of("c"), Some(2));
    let y = |n: &str| layout.position(n).unwrap().y;
    assert!(y("a") < y("b") && y("b") < y("c"));
}

#[test]
fn test_no_overlap_within_layers() {
    let diagram = sqlerd::diagram(SHOP, &fixed, &LayoutConfig::default()).unwrap();
    let layout = &diagram.layout;
    assert_eq!(layout.len(), 4);

    for layer in &layout.layers {
        let mut boxes: Vec<_> = layer.iter().map(|n| *layout.position(n).unwrap()).collect();
        boxes.sort_by(|a, b| a.x.total_cmp(&b.x));
        for pair in boxes.windows(2) {
            assert!(pair[0].right() + 50.0 <= pair[1].x);
        }
    }
}

#[test]
fn test_mutual_references_complete() {
    let schema = extract(
        r#"
        CREATE TABLE a (id INT PRIMARY KEY, b_id INT);
        CREATE TABLE b (id INT PRIMARY KEY, a_id INT REFERENCES a(id));
        ALTER TABLE a ADD FOREIGN KEY (b_id) REFERENCES b(id);
        "#,
    );
    assert_eq!(schema.relationships.len(), 2);
    let layout = LayoutEngine::default().layout(&schema.tables, &schema.relationships, &fixed);
    assert!(layout.position("a").is_some());
    assert!(layout.position("b").is_some());
}

#[test]
fn test_diagram_json_shape() {
    let diagram = sqlerd::diagram(SHOP, &fixed, &LayoutConfig::default()).unwrap();
    assert_eq!(diagram.edges.len(), 3);

    let json = serde_json::to_value(&diagram).unwrap();
    assert_eq!(json["tables"][0]["name"], "customers");
    assert_eq!(json["tables"][0]["columns"][0]["type"], "SERIAL");
    assert_eq!(json["tables"][0]["columns"][0]["isAutoIncrement"], true);
    assert_eq!(json["relationships"][0]["type"], "many-to-one");
    assert!(json["layout"]["positions"]["orders"]["x"].is_number());
}

#[test]
fn test_drag_and_hit_test() {
    let diagram = sqlerd::diagram(SHOP, &fixed, &LayoutConfig::default()).unwrap();
    let mut layout = diagram.layout.clone();
    let tables = &diagram.schema.tables;

    assert!(layout.move_table("orders", 5000.0, 5000.0));
    assert!(!layout.move_table("missing", 0.0, 0.0));

    let view = ViewTransform::fit(&layout, 1280.0, 720.0).unwrap();
    let (sx, sy) = view.world_to_screen(5010.0, 5010.0);
    let (wx, wy) = view.screen_to_world(sx, sy);
    assert_eq!(table_at(&layout, tables, wx, wy).unwrap().name, "orders");

    // second row of orders
    let config = LayoutConfig::default();
    let (_, col) = column_at(&layout, tables, &config, 5010.0, 5000.0 + 36.0 + 30.0).unwrap();
    assert_eq!(col.name, "customer_id");
}
