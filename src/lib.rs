pub mod config;
pub mod error;
pub mod layout;
pub mod measure;
pub mod model;
pub mod sql;
pub mod view;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use config::LayoutConfig;
use error::Error;
use layout::{EdgeAnchor, Layout, LayoutEngine, edge_anchors};
use measure::TextMeasurer;
use model::Schema;

/// Extracted schema together with its layout.
#[derive(Debug, Clone, Serialize)]
pub struct Diagram {
    #[serde(flatten)]
    pub schema: Schema,
    pub layout: Layout,
    pub edges: Vec<EdgeAnchor>,
}

/// Extract the schema from `sql` and lay it out.
///
/// Fails with [`Error::NoTables`] when the input defines no tables.
pub fn diagram<M: TextMeasurer + ?Sized>(
    sql: &str,
    measurer: &M,
    config: &LayoutConfig,
) -> Result<Diagram, Error> {
    let schema = sql::extract(sql);
    if schema.is_empty() {
        return Err(Error::NoTables);
    }

    let layout = LayoutEngine::new(config.clone()).layout(
        &schema.tables,
        &schema.relationships,
        measurer,
    );
    let edges = edge_anchors(&layout, &schema, config);

    Ok(Diagram {
        schema,
        layout,
        edges,
    })
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Extract tables and relationships from SQL DDL as JSON.
#[wasm_bindgen(js_name = "extractSchema")]
pub fn extract_schema(sql: &str) -> Result<String, String> {
    serde_json::to_string(&sql::extract(sql)).map_err(|e| e.to_string())
}

/// Extract and lay out SQL DDL as JSON.
///
/// `measure` is called as `measure(font, text)` and must return the text
/// width in pixels, e.g. `(f, t) => { ctx.font = f; return ctx.measureText(t).width; }`.
#[wasm_bindgen(js_name = "layoutSchema")]
pub fn layout_schema(sql: &str, measure: &js_sys::Function) -> Result<String, String> {
    let measurer = JsMeasurer(measure);
    let diagram = diagram(sql, &measurer, &LayoutConfig::default()).map_err(|e| e.to_string())?;
    serde_json::to_string(&diagram).map_err(|e| e.to_string())
}

struct JsMeasurer<'a>(&'a js_sys::Function);

impl TextMeasurer for JsMeasurer<'_> {
    fn measure(&self, font: &str, text: &str) -> f64 {
        self.0
            .call2(&JsValue::NULL, &JsValue::from_str(font), &JsValue::from_str(text))
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }
}
