use std::{fs, path::PathBuf, rc::Rc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use page_core::{
    contract, initialize, load_settings, Capabilities, ControllerSettings, Document, ElementId,
    HttpSearchService, Page, PageFixture, Scheduler, SearchService, Services, TokioScheduler,
    Visibility, FRAME_INTERVAL,
};
use serde_json::{json, Value};
use shared::{domain::SearchParams, protocol::SearchRequest};
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEMO_PAGE: &str = include_str!("../pages/demo.json");

#[derive(Parser, Debug)]
#[command(about = "Replays visitor interactions against a page fixture")]
struct Cli {
    /// Page fixture (JSON); the bundled demo page when omitted.
    #[arg(long)]
    page: Option<PathBuf>,
    /// Controller settings (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints the page state right after initialization.
    Inspect,
    /// Clicks the element matching `#id`, `.class` or a tag name.
    Click { selector: String },
    /// Scrolls the window through each offset in turn.
    Scroll {
        #[arg(required = true, allow_negative_numbers = true)]
        offsets: Vec<i64>,
    },
    /// Fills named fields of a form and submits it.
    Submit {
        form_id: String,
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Queries the search service directly and prints the results.
    Search {
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        /// Search backend base URL; the mock service when neither this nor
        /// the settings name one.
        #[arg(long)]
        endpoint: Option<String>,
    },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty field name in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

fn resolve_selector(doc: &Document, selector: &str) -> Option<ElementId> {
    if let Some(id) = selector.strip_prefix('#') {
        doc.get_element_by_id(id)
    } else if let Some(class) = selector.strip_prefix('.') {
        doc.elements_by_class(class).first().copied()
    } else {
        doc.elements_by_tag(selector).first().copied()
    }
}

fn load_page(path: Option<&PathBuf>) -> Result<Document> {
    let raw = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read page fixture {}", path.display()))?,
        None => DEMO_PAGE.to_string(),
    };
    let fixture = PageFixture::from_json(&raw).context("failed to parse page fixture")?;
    Ok(fixture.build()?)
}

fn search_service(
    scheduler: Rc<dyn Scheduler>,
    settings: &ControllerSettings,
    endpoint: Option<&str>,
) -> Result<Services> {
    match endpoint.or(settings.search_endpoint.as_deref()) {
        Some(endpoint) => {
            let service = HttpSearchService::new(endpoint, settings.search_timeout)
                .with_context(|| format!("invalid search endpoint {endpoint}"))?;
            info!(url = %service.search_url(), "using http search backend");
            Ok(Services::new(Rc::new(service)))
        }
        None => Ok(Services::mock(scheduler, settings)),
    }
}

fn element_label(doc: &Document, el: ElementId) -> String {
    match doc.element(el) {
        Some(element) => match element.id() {
            Some(id) => format!("{}#{id}", element.tag()),
            None => element.tag().to_string(),
        },
        None => format!("<removed {}>", el.0),
    }
}

fn snapshot(page: &Page, caps: &Capabilities) -> Value {
    let doc = page.document();
    let header = caps.header.map(|header| {
        json!({
            "transform": doc.style(header).and_then(|s| s.transform.clone()),
            "scrolled": doc.has_class(header, contract::SCROLLED_CLASS),
        })
    });
    let back_to_top = doc
        .elements_by_class(contract::BACK_TO_TOP_CLASS)
        .first()
        .and_then(|button| doc.style(*button))
        .map(|style| style.visibility == Visibility::Visible);
    let visible_cards: Vec<String> = caps
        .article_cards
        .iter()
        .filter(|card| doc.is_rendered(**card))
        .map(|card| element_label(&doc, *card))
        .collect();
    let active_filter = caps
        .tag_filters
        .iter()
        .find(|f| doc.has_class(**f, contract::ACTIVE_CLASS))
        .and_then(|f| doc.data(*f, contract::TAG_DATA));
    let invalid_fields: Vec<String> = doc
        .elements_by_class(contract::ERROR_CLASS)
        .into_iter()
        .map(|el| element_label(&doc, el))
        .collect();
    let pending_images: Vec<String> = caps
        .lazy_images
        .iter()
        .filter(|img| doc.has_class(**img, contract::LAZY_CLASS))
        .map(|img| element_label(&doc, *img))
        .collect();
    let submissions: Vec<String> = doc
        .native_submissions()
        .iter()
        .map(|form| element_label(&doc, *form))
        .collect();

    json!({
        "scroll_y": doc.scroll_y(),
        "menu_open": caps.nav_toggle.map(|t| doc.has_class(t, contract::ACTIVE_CLASS)),
        "header": header,
        "back_to_top_visible": back_to_top,
        "active_filter": active_filter,
        "visible_cards": visible_cards,
        "invalid_fields": invalid_fields,
        "pending_images": pending_images,
        "results": caps.results_container.map(|c| doc.text_content(c)),
        "scroll_request": doc.last_scroll_request().map(|r| json!({
            "top": r.top,
            "behavior": format!("{:?}", r.behavior),
        })),
        "alerts": doc.notices(),
        "navigations": doc.navigations(),
        "native_submissions": submissions,
    })
}

async fn wait_for_search(page: &Page, caps: &Capabilities, limit: Duration) {
    let Some(container) = caps.results_container else {
        return;
    };
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        let loading = {
            let doc = page.document();
            doc.descendants(container)
                .into_iter()
                .any(|el| doc.has_class(el, "loading"))
        };
        if !loading {
            return;
        }
        tokio::time::sleep(FRAME_INTERVAL).await;
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref())?;
    let scheduler = TokioScheduler::new();

    if let Command::Search { fields, endpoint } = &cli.command {
        let services = search_service(scheduler, &settings, endpoint.as_deref())?;
        let request = SearchRequest::new(SearchParams::from_fields(fields.clone()));
        let results = services.search.search(&request).await?;
        info!(results = results.len(), "search finished");
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let doc = load_page(cli.page.as_ref())?;
    let page = Page::new(doc, scheduler.clone());
    let caps = Capabilities::discover(&page.document());
    let services = search_service(scheduler, &settings, None)?;
    let disposer = initialize(&page, &caps, services, &settings);

    match &cli.command {
        Command::Inspect | Command::Search { .. } => {}
        Command::Click { selector } => {
            let target = resolve_selector(&page.document(), selector)
                .ok_or_else(|| anyhow!("no element matches '{selector}'"))?;
            let outcome = page.click(target);
            info!(selector = %selector, prevented = outcome.default_prevented, "clicked");
        }
        Command::Scroll { offsets } => {
            for offset in offsets {
                page.scroll_window(*offset);
            }
        }
        Command::Submit { form_id, fields } => {
            let form = page
                .document()
                .get_element_by_id(form_id.trim_start_matches('#'))
                .ok_or_else(|| anyhow!("no form with id '{form_id}'"))?;
            if page.document().element(form).map(|e| e.tag()) != Some("form") {
                bail!("'{form_id}' is not a form");
            }
            for (name, value) in fields {
                let field = {
                    let doc = page.document();
                    doc.descendants(form)
                        .into_iter()
                        .find(|el| doc.attribute(*el, contract::NAME_ATTR) == Some(name.as_str()))
                };
                let field =
                    field.ok_or_else(|| anyhow!("form '{form_id}' has no field named '{name}'"))?;
                page.input(field, value.clone());
            }
            let outcome = page.submit(form);
            info!(form = %form_id, prevented = outcome.default_prevented, "submitted");
            if caps.search_forms.contains(&form) {
                wait_for_search(&page, &caps, settings.search_latency + settings.search_timeout)
                    .await;
            }
        }
    }

    // let fades settle before reporting
    tokio::time::sleep(settings.fade_duration + FRAME_INTERVAL * 2).await;
    println!("{}", serde_json::to_string_pretty(&snapshot(&page, &caps))?);
    disposer.dispose();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let local = LocalSet::new();
    let result = local.run_until(run(cli)).await;
    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "page_sim failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_pairs() {
        assert_eq!(
            parse_field("keyword=数学").expect("field"),
            ("keyword".to_string(), "数学".to_string())
        );
        assert_eq!(
            parse_field("note=a=b").expect("field"),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_field("keyword").is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn demo_page_exposes_every_behavior() {
        let doc = load_page(None).expect("demo page");
        let caps = Capabilities::discover(&doc);
        assert!(caps.nav_toggle.is_some() && caps.nav_menu.is_some());
        assert!(caps.header.is_some());
        assert_eq!(caps.search_forms.len(), 1);
        assert!(caps.results_container.is_some());
        assert_eq!(caps.article_cards.len(), 3);
        assert_eq!(caps.tag_filters.len(), 4);
        assert_eq!(caps.lazy_images.len(), 2);
    }

    #[test]
    fn resolves_id_class_and_tag_selectors() {
        let doc = load_page(None).expect("demo page");
        assert_eq!(
            resolve_selector(&doc, "#nav-toggle"),
            doc.get_element_by_id("nav-toggle")
        );
        assert_eq!(
            resolve_selector(&doc, ".tag-filter"),
            doc.get_element_by_id("filter-all")
        );
        assert_eq!(
            resolve_selector(&doc, "header"),
            doc.elements_by_class("header").first().copied()
        );
        assert_eq!(resolve_selector(&doc, "#missing"), None);
    }

    #[test]
    fn snapshot_reports_initial_state() {
        let scheduler = page_core::VirtualScheduler::new();
        let page = Page::new(load_page(None).expect("demo page"), scheduler.clone());
        let caps = Capabilities::discover(&page.document());
        let settings = ControllerSettings::default();
        let _disposer = initialize(&page, &caps, Services::mock(scheduler, &settings), &settings);

        let state = snapshot(&page, &caps);
        assert_eq!(state["scroll_y"], 0);
        assert_eq!(state["menu_open"], false);
        assert_eq!(state["back_to_top_visible"], false);
        assert_eq!(state["active_filter"], "all");
        assert_eq!(state["pending_images"], json!(["img#column-banner"]));
    }
}
