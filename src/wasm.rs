use crate::logs::{self, projector};
use crate::model::WorkflowTemplate;
use crate::validate;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn validate_template_json(json: &str) -> String {
    let template: WorkflowTemplate = match serde_json::from_str(json) {
        Ok(t) => t,
        Err(e) => {
            return serde_json::json!({
                "valid": false,
                "errors": [format!("JSON parse error: {}", e)]
            })
            .to_string();
        }
    };
    match validate::validate(&template) {
        Ok(()) => serde_json::json!({ "valid": true }).to_string(),
        Err(errors) => {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            serde_json::json!({
                "valid": false,
                "errors": error_strings
            })
            .to_string()
        }
    }
}

/// Fold a JSON log array into per-agent decisions.
#[wasm_bindgen]
pub fn project_logs_json(json: &str) -> String {
    let entries = match logs::parse_entries(json) {
        Ok(entries) => entries,
        Err(e) => {
            return serde_json::json!({
                "error": format!("JSON parse error: {}", e)
            })
            .to_string();
        }
    };
    let decisions = projector::project(&entries);
    serde_json::to_string(&decisions).unwrap_or_else(|e| {
        serde_json::json!({
            "error": format!("Serialization error: {}", e)
        })
        .to_string()
    })
}

/// Registry catalog as a JS array, for building the node palette.
#[wasm_bindgen]
pub fn list_node_types() -> Result<JsValue, JsValue> {
    let registry = crate::registry::NodeTypeRegistry::builtin();
    let descriptors: Vec<_> = registry.descriptors().collect();
    serde_wasm_bindgen::to_value(&descriptors).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn get_schema() -> String {
    crate::schema::get_schema_json()
}
