//! Page plumbing: the element ids the viewer binds to, table construction,
//! and the detail panel.

use tracetree_core::views::chart::Chart;
use tracetree_protocol::{Bar, PanelEvent};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlTableElement};

pub const INPUT_ID: &str = "input";
pub const DEMO_ID: &str = "demo";
pub const EXECUTION_ID: &str = "execution";
pub const CHART_ID: &str = "chart";
pub const PANEL_ID: &str = "panel";

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

pub fn warn(msg: &str) {
    web_sys::console::warn_1(&JsValue::from_str(msg));
}

pub fn error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

/// Width of the execution column header, i.e. the space bars may use.
/// Zero when the page has no such column, which layout rejects.
pub fn available_width(document: &Document) -> f64 {
    document
        .get_element_by_id(EXECUTION_ID)
        .map(|el| f64::from(el.client_width()))
        .unwrap_or(0.0)
}

fn px(v: f64) -> String {
    format!("{v}px")
}

pub fn bar_style(bar: &Bar) -> String {
    format!("left: {}; width: {}", px(bar.offset_px), px(bar.width_px))
}

pub fn panel_slot_id(key: &str) -> String {
    format!("{PANEL_ID}-{key}")
}

/// Build a detached table body for `chart`. Returns the body and the bar
/// elements in row order so the caller can attach click handlers.
pub fn build_body(document: &Document, chart: &Chart) -> Result<(Element, Vec<Element>), JsValue> {
    let tbody = document.create_element("tbody")?;
    let mut bars = Vec::with_capacity(chart.len());
    for row in &chart.rows {
        let tr = document.create_element("tr")?;

        let label = document.create_element("td")?;
        label.set_class_name("label");
        label.set_text_content(Some(&row.label));

        let cell = document.create_element("td")?;
        let bar = document.create_element("div")?;
        bar.set_class_name("bar");
        bar.set_attribute("style", &bar_style(&row.bar))?;
        bar.set_attribute("title", &row.bar.tooltip)?;
        cell.append_child(&bar)?;

        tr.append_child(&label)?;
        tr.append_child(&cell)?;
        tbody.append_child(&tr)?;
        bars.push(bar);
    }
    Ok((tbody, bars))
}

/// Swap `tbody` in as the chart table's body in one DOM operation.
pub fn swap_body(document: &Document, tbody: &Element) -> Result<(), JsValue> {
    let Some(table) = document.get_element_by_id(CHART_ID) else {
        return Ok(());
    };
    let table: HtmlTableElement = table.dyn_into()?;
    match table.t_bodies().item(0) {
        Some(old) => table.replace_child(tbody, &old)?,
        None => table.append_child(tbody)?,
    };
    Ok(())
}

/// Reflect a panel event on the page. Missing slots are skipped.
pub fn present(document: &Document, event: &PanelEvent) -> Result<(), JsValue> {
    let Some(panel) = document.get_element_by_id(PANEL_ID) else {
        return Ok(());
    };
    let panel: HtmlElement = panel.dyn_into()?;
    let style = panel.style();
    match event {
        PanelEvent::Open { anchor, fields } => {
            for field in fields {
                if let Some(slot) = document.get_element_by_id(&panel_slot_id(&field.key)) {
                    slot.set_text_content(Some(&field.value));
                }
            }
            style.set_property("left", &px(anchor.x))?;
            style.set_property("top", &px(anchor.y))?;
            style.set_property("display", "block")?;
        }
        PanelEvent::Close => style.set_property("display", "none")?,
    }
    Ok(())
}
