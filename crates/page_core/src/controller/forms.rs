use std::rc::Rc;

use shared::{
    domain::{SearchParams, SearchResult},
    locale::Messages,
    protocol::SearchRequest,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::ControllerSettings,
    dom::{contract, Document, ElementId},
    events::{EventKind, ListenerTarget},
    page::Page,
};

use super::{Capabilities, Disposer, Services};

const FIELD_TAGS: [&str; 3] = ["input", "select", "textarea"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} required field(s) left empty", .invalid_fields.len())]
pub struct ValidationError {
    pub invalid_fields: Vec<ElementId>,
}

pub fn required_fields(doc: &Document, form: ElementId) -> Vec<ElementId> {
    doc.descendants(form)
        .into_iter()
        .filter(|el| {
            doc.element(*el)
                .is_some_and(|e| e.has_attribute(contract::REQUIRED_ATTR))
        })
        .collect()
}

/// Marks empty required fields with the error class and clears it from the
/// filled ones.
pub fn validate_form(doc: &mut Document, form: ElementId) -> Result<(), ValidationError> {
    let mut invalid_fields = Vec::new();
    for field in required_fields(doc, form) {
        let empty = doc.value(field).map_or(true, |v| v.trim().is_empty());
        doc.set_class(field, contract::ERROR_CLASS, empty);
        if empty {
            invalid_fields.push(field);
        }
    }
    if invalid_fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { invalid_fields })
    }
}

/// Named fields of `form` with non-empty trimmed values.
pub fn collect_params(doc: &Document, form: ElementId) -> SearchParams {
    SearchParams::from_fields(doc.descendants(form).into_iter().filter_map(|el| {
        let element = doc.element(el)?;
        if !FIELD_TAGS.contains(&element.tag()) {
            return None;
        }
        let name = element.attribute(contract::NAME_ATTR)?;
        Some((name.to_string(), element.value.clone()))
    }))
}

pub(super) fn attach_validation(
    page: &Page,
    caps: &Capabilities,
    settings: &ControllerSettings,
    disposer: &mut Disposer,
) {
    let messages = settings.locale.messages();
    for form in &caps.forms {
        let form = *form;
        let fields = required_fields(&page.document(), form);
        if fields.is_empty() {
            continue;
        }

        let on_submit = page.clone();
        disposer.listen(ListenerTarget::Element(form), EventKind::Submit, move |event| {
            let result = validate_form(&mut on_submit.document_mut(), form);
            if let Err(err) = result {
                event.prevent_default();
                debug!(invalid = err.invalid_fields.len(), "form submission blocked");
                on_submit.document_mut().alert(messages.required_fields);
            }
        });

        for field in fields {
            let on_input = page.clone();
            disposer.listen(ListenerTarget::Element(field), EventKind::Input, move |_| {
                on_input
                    .document_mut()
                    .remove_class(field, contract::ERROR_CLASS);
            });
        }
    }
}

pub(super) fn attach_search(
    page: &Page,
    caps: &Capabilities,
    services: &Services,
    settings: &ControllerSettings,
    disposer: &mut Disposer,
) {
    if caps.search_forms.is_empty() {
        return;
    }
    if caps.results_container.is_none() {
        warn!("search form present without a results container; results will not be shown");
    }
    let messages = settings.locale.messages();

    for form in &caps.search_forms {
        let form = *form;
        let container = caps.results_container;
        let service = Rc::clone(&services.search);
        let page = page.clone();
        let active = disposer.liveness();
        disposer.listen(ListenerTarget::Element(form), EventKind::Submit, move |event| {
            event.prevent_default();
            let params = collect_params(&page.document(), form);
            if let Some(container) = container {
                render_loading(&mut page.document_mut(), container, messages);
            }
            info!(params = params.len(), "search submitted");

            let request = SearchRequest::new(params);
            let service = Rc::clone(&service);
            let target = page.clone();
            let active = Rc::clone(&active);
            page.scheduler().spawn_local(Box::pin(async move {
                let outcome = service.search(&request).await;
                if !active.get() {
                    debug!("controller disposed; search result dropped");
                    return;
                }
                let Some(container) = container else {
                    return;
                };
                let mut doc = target.document_mut();
                match outcome {
                    Ok(results) => {
                        debug!(results = results.len(), "search completed");
                        render_results(&mut doc, container, &results, messages);
                    }
                    Err(err) => {
                        warn!(error = %err, "search failed");
                        render_failure(&mut doc, container, messages);
                    }
                }
            }));
        });
    }
}

fn append_text(doc: &mut Document, parent: ElementId, tag: &str, class: &str, text: String) {
    let el = doc.create_element(tag);
    doc.add_class(el, class);
    doc.set_text(el, text);
    doc.append_child(parent, el);
}

pub fn render_loading(doc: &mut Document, container: ElementId, messages: &Messages) {
    doc.clear_children(container);
    append_text(doc, container, "div", "loading", messages.loading.to_string());
}

pub fn render_failure(doc: &mut Document, container: ElementId, messages: &Messages) {
    doc.clear_children(container);
    append_text(doc, container, "p", "search-error", messages.search_failed.to_string());
}

pub fn render_results(
    doc: &mut Document,
    container: ElementId,
    results: &[SearchResult],
    messages: &Messages,
) {
    doc.clear_children(container);
    if results.is_empty() {
        append_text(doc, container, "p", "no-results", messages.no_results.to_string());
        return;
    }

    let list = doc.create_element("div");
    doc.add_class(list, "results-list");
    doc.append_child(container, list);
    for result in results {
        let item = doc.create_element("div");
        doc.add_class(item, "result-item");
        doc.append_child(list, item);
        append_text(doc, item, "h3", "result-title", result.title.clone());
        append_text(doc, item, "span", "result-category", result.category.clone());
        append_text(doc, item, "span", "result-region", result.region.clone());
        append_text(
            doc,
            item,
            "span",
            "result-score",
            format!("{}: {:.1}", messages.score_label, result.score),
        );
        append_text(doc, item, "p", "result-description", result.description.clone());
    }
}
