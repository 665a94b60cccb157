//! JSON page descriptions used by the simulator and tests.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::{Document, ElementId, DEFAULT_VIEWPORT_HEIGHT};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("invalid page fixture: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate element id '{0}' in page fixture")]
    DuplicateId(String),
    #[error("element without a tag in page fixture")]
    MissingTag,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageFixture {
    #[serde(default)]
    pub scroll_y: i64,
    #[serde(default = "default_viewport")]
    pub viewport_height: i64,
    #[serde(default)]
    pub body: Vec<ElementSpec>,
}

fn default_viewport() -> i64 {
    DEFAULT_VIEWPORT_HEIGHT
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default)]
    pub offset_top: i64,
    #[serde(default)]
    pub height: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSpec>,
}

impl PageFixture {
    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn build(&self) -> Result<Document, FixtureError> {
        let mut doc = Document::new();
        doc.set_viewport_height(self.viewport_height);
        let mut seen = HashSet::new();
        let body = doc.body();
        for spec in &self.body {
            build_element(&mut doc, body, spec, &mut seen)?;
        }
        doc.set_scroll_y(self.scroll_y);
        Ok(doc)
    }
}

fn build_element(
    doc: &mut Document,
    parent: ElementId,
    spec: &ElementSpec,
    seen: &mut HashSet<String>,
) -> Result<ElementId, FixtureError> {
    if spec.tag.trim().is_empty() {
        return Err(FixtureError::MissingTag);
    }
    let el = doc.create_element(spec.tag.trim());
    if let Some(id) = &spec.id {
        if !seen.insert(id.clone()) {
            return Err(FixtureError::DuplicateId(id.clone()));
        }
        doc.set_id(el, id.clone());
    }
    for class in &spec.classes {
        doc.add_class(el, class);
    }
    for (name, value) in &spec.attributes {
        doc.set_attribute(el, name, value.clone());
    }
    for (key, value) in &spec.data {
        doc.set_data(el, key, value.clone());
    }
    doc.set_text(el, spec.text.clone());
    doc.set_value(el, spec.value.clone());
    if let Some(element) = doc.element_mut(el) {
        element.offset_top = spec.offset_top;
        element.height = spec.height;
    }
    doc.append_child(parent, el);
    for child in &spec.children {
        build_element(doc, el, child, seen)?;
    }
    Ok(el)
}

#[cfg(test)]
#[path = "tests/fixture_tests.rs"]
mod tests;
