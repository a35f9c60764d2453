//! WASM bindings for item-aliases.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.

use crate::aliases::Aliases;
use crate::platform::{Platform, PlatformData};
use crate::types::{CanonicalItem, ItemStack, Tags};
use std::sync::Arc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// An alias service over a platform table.
#[wasm_bindgen]
pub struct AliasesHandle {
    inner: Aliases,
}

#[wasm_bindgen]
impl AliasesHandle {
    /// Create an empty service from a platform table in JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(platform_json: &str) -> Result<AliasesHandle, JsError> {
        let platform = PlatformData::from_json(platform_json).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(AliasesHandle {
            inner: Aliases::new(Arc::new(platform)),
        })
    }

    /// Load aliases from a ZIP archive's bytes. Returns the diagnostics, one
    /// per line.
    #[wasm_bindgen(js_name = loadArchive)]
    pub fn load_archive(&self, data: &[u8]) -> Result<Vec<String>, JsError> {
        let diagnostics = self
            .inner
            .load_alias_archive(data)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(diagnostics.iter().map(|d| d.to_string()).collect())
    }

    /// Load aliases from alias file text.
    #[wasm_bindgen(js_name = loadText)]
    pub fn load_text(&self, text: &str) -> Vec<String> {
        let diagnostics = self.inner.load_alias_text(text);
        diagnostics.iter().map(|d| d.to_string()).collect()
    }

    /// Resolve a name and return the selector snapshot as JSON, or
    /// `undefined` when the name does not resolve.
    #[wasm_bindgen(js_name = resolveName)]
    pub fn resolve_name(&self, name: &str) -> Result<Option<String>, JsError> {
        let selector = match self.inner.resolve_name(name) {
            Some(selector) => selector,
            None => return Ok(None),
        };
        let snapshot = selector.snapshot(self.inner.platform());
        serde_json::to_string(&snapshot)
            .map(Some)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Name of an item with the given material id and tags (JSON).
    #[wasm_bindgen(js_name = materialName)]
    pub fn material_name(&self, material: &str, tags_json: Option<String>, plural: bool) -> Result<String, JsError> {
        let item = self.item(material, tags_json.as_deref())?;
        Ok(self.inner.material_name(&item, plural))
    }

    /// Minecraft id of the alias naming the item.
    #[wasm_bindgen(js_name = minecraftId)]
    pub fn minecraft_id(&self, material: &str, tags_json: Option<String>) -> Result<Option<String>, JsError> {
        let item = self.item(material, tags_json.as_deref())?;
        Ok(self.inner.minecraft_id(&item))
    }

    /// Number of alias names loaded.
    #[wasm_bindgen(getter, js_name = aliasCount)]
    pub fn alias_count(&self) -> usize {
        self.inner.snapshot().alias_count()
    }

    fn item(&self, material_id: &str, tags_json: Option<&str>) -> Result<CanonicalItem, JsError> {
        let platform = self.inner.platform();
        let material = platform
            .material(material_id)
            .ok_or_else(|| JsError::new(&format!("Unknown material: {}", material_id)))?;
        let info = platform
            .material_info(material)
            .ok_or_else(|| JsError::new(&format!("Unknown material: {}", material_id)))?;

        let mut stack = ItemStack::new(material);
        if let Some(json) = tags_json {
            let tags: Tags = serde_json::from_str(json).map_err(|e| JsError::new(&e.to_string()))?;
            stack.tags = tags;
        }
        Ok(CanonicalItem::from_stack(&stack, info))
    }
}
