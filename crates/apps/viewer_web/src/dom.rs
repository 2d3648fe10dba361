use interaction::{Region, Surface};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

/// Page-backed surface. Regions are looked up by id on every write, so
/// elements added after boot are picked up.
pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn element(&self, region: Region) -> Option<Element> {
        self.document.get_element_by_id(region.element_id())
    }
}

impl std::fmt::Debug for DomSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomSurface").finish_non_exhaustive()
    }
}

impl Surface for DomSurface {
    fn has_region(&self, region: Region) -> bool {
        self.element(region).is_some()
    }

    fn set_visible(&mut self, region: Region, visible: bool) {
        let Some(el) = self
            .element(region)
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let display = if visible { "flex" } else { "none" };
        let _ = el.style().set_property("display", display);
    }

    fn set_text(&mut self, region: Region, text: &str) {
        if let Some(el) = self.element(region) {
            el.set_text_content(Some(text));
        }
    }

    fn set_html(&mut self, region: Region, html: &str) {
        if let Some(el) = self.element(region) {
            el.set_inner_html(html);
        }
    }

    fn set_embed_url(&mut self, region: Region, url: &str) {
        if let Some(el) = self.element(region) {
            let _ = el.set_attribute("src", url);
        }
    }
}

/// Hooks the overlay's close button, if the page has one.
pub fn wire_close_button(document: &Document, on_close: fn()) -> Result<(), JsValue> {
    let Some(button) = document.get_element_by_id(Region::CloseIframe.element_id()) else {
        return Ok(());
    };
    let cb = Closure::<dyn FnMut()>::new(on_close);
    button.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}
