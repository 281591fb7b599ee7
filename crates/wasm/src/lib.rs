//! Browser surface for the timeline viewer.
//!
//! On start the module binds to the page: `#input` (file picker), `#demo`
//! (button), `#execution` (the column whose width bars may use), `#chart`
//! (the table) and `#panel` with its `#panel-<field>` slots. Script callers
//! can also use [`render_profile`] directly.

mod dom;

use std::cell::RefCell;

use thiserror::Error;
use tracetree_core::config::DEMO_PATH;
use tracetree_core::parsers::{ParseError, parse_process_tree};
use tracetree_core::pipeline::{DEMO_PROFILE, LoadSequencer, Ticket};
use tracetree_core::views::chart::{Chart, render_chart_with};
use tracetree_core::{ChartConfig, LayoutError, Surface};
use tracetree_protocol::{PanelEvent, Point};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, HtmlInputElement, MouseEvent, Response};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("failed to encode chart: {0}")]
    Encode(#[from] serde_json::Error),
}

pub fn chart_from_json(
    json: &[u8],
    width: f64,
    config: &ChartConfig,
) -> Result<Chart, RenderError> {
    let tree = parse_process_tree(json)?;
    Ok(render_chart_with(&tree, width, config)?)
}

/// The laid-out chart for `json` at `width`, encoded as JSON.
pub fn chart_json(json: &str, width: f64) -> Result<String, RenderError> {
    let chart = chart_from_json(json.as_bytes(), width, &ChartConfig::default())?;
    Ok(serde_json::to_string(&chart)?)
}

/// Parse `tracetree` JSON and lay it out for a bar column `width` pixels
/// wide. Returns the chart (timeline plus drawable rows) as JSON.
#[wasm_bindgen]
pub fn render_profile(json: &str, width: f64) -> Result<String, JsError> {
    chart_json(json, width).map_err(|e| JsError::new(&e.to_string()))
}

#[derive(Default)]
struct Viewer {
    surface: Surface,
    sequencer: LoadSequencer,
    /// Click handlers for the bars currently in the table.
    handlers: Vec<Closure<dyn FnMut(MouseEvent)>>,
}

thread_local! {
    static VIEWER: RefCell<Viewer> = RefCell::new(Viewer::default());
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let document = dom::document()?;

    if let Some(input) = document.get_element_by_id(dom::INPUT_ID) {
        let input: HtmlInputElement = input.dyn_into()?;
        let picker = input.clone();
        let on_change = Closure::<dyn FnMut()>::new(move || {
            let Some(file) = picker.files().and_then(|files| files.get(0)) else {
                return;
            };
            let ticket = issue_ticket();
            spawn_local(async move {
                let text = JsFuture::from(file.text())
                    .await
                    .map(|v| v.as_string().unwrap_or_default());
                finish_load(ticket, &file.name(), text);
            });
        });
        input.set_onchange(Some(on_change.as_ref().unchecked_ref()));
        on_change.forget();
    }

    if let Some(button) = document.get_element_by_id(dom::DEMO_ID) {
        let on_click = Closure::<dyn FnMut()>::new(|| {
            let ticket = issue_ticket();
            spawn_local(async move {
                let text = demo_text(fetch_text(DEMO_PATH).await, |e| {
                    dom::warn(&format!(
                        "{DEMO_PATH} is not served here ({e:?}), using the bundled copy"
                    ));
                });
                finish_load(ticket, DEMO_PATH, Ok(text));
            });
        });
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    // Bars stop propagation, so any click that reaches the body missed them.
    if let Some(body) = document.body() {
        let on_click = Closure::<dyn FnMut()>::new(|| {
            dom::log("clicked body");
            let event = VIEWER.with(|v| v.borrow_mut().surface.dismiss());
            if let Some(event) = event {
                present(&event);
            }
        });
        body.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    Ok(())
}

fn issue_ticket() -> Ticket {
    VIEWER.with(|v| v.borrow_mut().sequencer.issue())
}

async fn fetch_text(url: &str) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "{url}: HTTP {}",
            response.status()
        )));
    }
    JsFuture::from(response.text()?)
        .await?
        .as_string()
        .ok_or_else(|| JsValue::from_str("response body is not text"))
}

/// The demo profile: the page's own copy when it serves one, otherwise the
/// copy built into this module.
fn demo_text<E>(fetched: Result<String, E>, on_missing: impl FnOnce(E)) -> String {
    match fetched {
        Ok(text) => text,
        Err(e) => {
            on_missing(e);
            String::from_utf8_lossy(DEMO_PROFILE).into_owned()
        }
    }
}

/// Render a finished load, unless a newer one has been requested since.
fn finish_load(ticket: Ticket, source: &str, text: Result<String, JsValue>) {
    let current = VIEWER.with(|v| v.borrow().sequencer.is_current(ticket));
    if !current {
        dom::warn(&format!("dropping superseded load of {source}"));
        return;
    }
    let text = match text {
        Ok(text) => text,
        Err(e) => {
            dom::error(&format!("failed to read {source}: {e:?}"));
            return;
        }
    };
    if let Err(e) = render_into_page(&text) {
        dom::error(&format!("failed to chart {source}: {e:?}"));
    }
}

fn render_into_page(text: &str) -> Result<(), JsValue> {
    let document = dom::document()?;
    let width = dom::available_width(&document);
    let config = VIEWER.with(|v| v.borrow().surface.config().clone());
    let chart = chart_from_json(text.as_bytes(), width, &config)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    dom::log(&format!(
        "{} rows, available: {width}, scale: {}",
        chart.len(),
        chart.timeline.scale
    ));

    // The new body is built detached, so any failure above or here leaves
    // the current table untouched.
    let (tbody, bars) = dom::build_body(&document, &chart)?;
    let handlers = bars
        .iter()
        .enumerate()
        .map(|(index, bar)| attach_bar_handler(index, bar))
        .collect::<Result<Vec<_>, _>>()?;
    dom::swap_body(&document, &tbody)?;

    let (closed, stale) = VIEWER.with(|v| {
        let mut viewer = v.borrow_mut();
        let stale = std::mem::replace(&mut viewer.handlers, handlers);
        (viewer.surface.apply(chart), stale)
    });
    // The old bars are detached now; their handlers can go.
    drop(stale);
    if let Some(event) = closed {
        dom::present(&document, &event)?;
    }
    Ok(())
}

fn attach_bar_handler(
    index: usize,
    bar: &web_sys::Element,
) -> Result<Closure<dyn FnMut(MouseEvent)>, JsValue> {
    let handler = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
        ev.stop_propagation();
        let at = Point::new(f64::from(ev.page_x()), f64::from(ev.page_y()));
        let event = VIEWER.with(|v| v.borrow_mut().surface.bar_clicked(index, at));
        if let Some(event) = event {
            present(&event);
        }
    });
    bar.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())?;
    Ok(handler)
}

fn present(event: &PanelEvent) {
    if let PanelEvent::Open { fields, .. } = event
        && let Some(pid) = fields.iter().find(|f| f.key == "pid")
    {
        dom::log(&format!("clicked {}", pid.value));
    }
    if let Err(e) = dom::document().and_then(|d: Document| dom::present(&d, event)) {
        dom::error(&format!("failed to update panel: {e:?}"));
    }
}
