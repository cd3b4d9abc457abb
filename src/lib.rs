pub mod analysis;
pub mod ast;
pub mod bundle;
pub mod chen;
pub mod crowsfoot;
pub mod ident;
pub mod sql;

use wasm_bindgen::prelude::*;

pub use ast::{Column, ForeignKey, Schema, Table};
pub use bundle::{generate, DiagramBundle, GenerateError};
pub use chen::{build_chen_graph, render_chen_text, ChenGraph};
pub use crowsfoot::render_crows_foot;
pub use sql::parse_schema;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render MySQL DDL to every diagram. Resolves to the bundle object or
/// throws an `Error` for blank input and input without tables.
#[wasm_bindgen(js_name = "sqlToDiagrams")]
pub fn sql_to_diagrams(sql: &str) -> Result<JsValue, JsValue> {
    let bundle = generate(sql).map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))?;
    let json = serde_json::to_string(&bundle)
        .map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))?;
    js_sys::JSON::parse(&json)
}
