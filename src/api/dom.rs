//! DOM materialization of the presentation plan

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::embedder::presentation::{
    CLOSE_CLASS, CLOSE_HOVER_BACKGROUND, CLOSE_LABEL, CLOSE_REST_BACKGROUND, CLOSE_STYLE,
    CONTAINER_CLASS, CONTAINER_STYLE, CONTENT_CLASS, HEADER_CLASS, HEADER_STYLE, ROOT_STYLE,
    TITLE_CLASS, TITLE_STYLE, WRAPPER_STYLE, WRAPPER_TAG,
};
use crate::embedder::{failure_panel, loading_panel, Presentation, Visibility};
use crate::models::EmbedderConfig;

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("No document"))
}

fn create(document: &Document, tag: &str, class: &str, style: &str) -> Result<HtmlElement, JsValue> {
    let element: HtmlElement = document.create_element(tag)?.dyn_into()?;
    if !class.is_empty() {
        element.set_class_name(class);
    }
    element.style().set_css_text(style);
    Ok(element)
}

pub fn apply_visibility(root: &HtmlElement, visibility: Visibility) {
    if let Err(e) = root.style().set_property("display", visibility.css_display()) {
        log::error!("Failed to set visibility: {:?}", e);
    }
}

/// Reset the root element and show the loading placeholder
pub fn show_loading(root: &HtmlElement, config: &EmbedderConfig, visibility: Visibility) {
    root.style().set_css_text(ROOT_STYLE);
    apply_visibility(root, visibility);
    root.set_inner_html(&loading_panel(config));
}

pub fn show_failure(root: &HtmlElement, config: &EmbedderConfig, message: &str) {
    root.set_inner_html(&failure_panel(config, message));
}

/// Replace the root's content with the wrapped card
pub fn assemble<F>(
    root: &HtmlElement,
    config: &EmbedderConfig,
    card: &HtmlElement,
    on_close: F,
) -> Result<(), JsValue>
where
    F: Fn() + 'static,
{
    let document = document()?;
    let plan = Presentation::for_config(config);

    root.set_inner_html("");

    let container = create(&document, "div", CONTAINER_CLASS, CONTAINER_STYLE)?;
    let wrapper = create(&document, WRAPPER_TAG, "", WRAPPER_STYLE)?;

    if let Some(header_plan) = &plan.header {
        let header = create(&document, "div", HEADER_CLASS, HEADER_STYLE)?;

        let title = create(&document, "div", TITLE_CLASS, TITLE_STYLE)?;
        title.set_text_content(Some(&header_plan.title));
        header.append_child(&title)?;

        if header_plan.show_close {
            header.append_child(&close_button(&document, on_close)?)?;
        }

        wrapper.append_child(&header)?;
    }

    let content = create(&document, "div", CONTENT_CLASS, &plan.content_style())?;
    content.append_child(card)?;
    wrapper.append_child(&content)?;
    container.append_child(&wrapper)?;
    root.append_child(&container)?;

    Ok(())
}

fn close_button<F>(document: &Document, on_close: F) -> Result<HtmlElement, JsValue>
where
    F: Fn() + 'static,
{
    let button = create(document, "button", CLOSE_CLASS, CLOSE_STYLE)?;
    button.set_text_content(Some(CLOSE_LABEL));

    for (event, background) in [
        ("mouseenter", CLOSE_HOVER_BACKGROUND),
        ("mouseleave", CLOSE_REST_BACKGROUND),
    ] {
        let target = button.clone();
        let hover: Closure<dyn Fn()> = Closure::new(move || {
            if let Err(e) = target.style().set_property("background-color", background) {
                log::error!("Failed to set close button hover: {:?}", e);
            }
        });
        button.add_event_listener_with_callback(event, hover.as_ref().unchecked_ref())?;
        hover.forget();
    }

    let click: Closure<dyn Fn()> = Closure::new(on_close);
    button.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
    click.forget();

    Ok(button)
}
