//! The slice of the DOM the page hooks read and write.
//!
//! Every hook is written against [`PageElement`] so the reconciliation logic
//! runs unchanged against `web_sys::Element` in the browser and against an
//! in-memory tree in tests.

use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, HtmlElement, HtmlInputElement, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

pub trait PageElement: Clone {
    fn element_id(&self) -> String;
    fn has_class(&self, class: &str) -> bool;
    /// Nearest ancestor (or self) carrying `class`.
    fn closest_with_class(&self, class: &str) -> Option<Self>;
    /// Descendants carrying `class`, in document order.
    fn descendants_with_class(&self, class: &str) -> Vec<Self>;
    /// Descendant `<input type="hidden">` elements with the given `name`.
    fn hidden_inputs_named(&self, name: &str) -> Vec<Self>;
    /// Descendant with the given id.
    fn find_by_id(&self, id: &str) -> Option<Self>;
    fn last_child_element(&self) -> Option<Self>;
    /// Whether the element is still attached to the document.
    fn connected(&self) -> bool;

    fn input_value(&self) -> String;
    fn set_input_value(&self, value: &str);
    fn checked(&self) -> bool;
    fn set_input_disabled(&self, disabled: bool);
    fn set_input_name(&self, name: &str);

    fn attr(&self, name: &str) -> Option<String>;
    fn set_attr(&self, name: &str, value: &str);
    /// Toggle between `display: block` and `display: none`.
    fn set_shown(&self, shown: bool);
    fn scroll_to_start(&self);

    fn first_descendant_with_class(&self, class: &str) -> Option<Self> {
        self.descendants_with_class(class).into_iter().next()
    }
}

fn query_all(element: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = element.query_selector_all(selector) else {
        debug!("invalid selector {}", selector);
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl PageElement for Element {
    fn element_id(&self) -> String {
        self.id()
    }

    fn has_class(&self, class: &str) -> bool {
        self.matches(&format!(".{}", class)).unwrap_or(false)
    }

    fn closest_with_class(&self, class: &str) -> Option<Self> {
        self.closest(&format!(".{}", class)).ok().flatten()
    }

    fn descendants_with_class(&self, class: &str) -> Vec<Self> {
        query_all(self, &format!(".{}", class))
    }

    fn hidden_inputs_named(&self, name: &str) -> Vec<Self> {
        query_all(self, &format!("input[name=\"{}\"][type=\"hidden\"]", name))
    }

    fn find_by_id(&self, id: &str) -> Option<Self> {
        if self.id() == id {
            return Some(self.clone());
        }
        self.query_selector(&format!("[id=\"{}\"]", id)).ok().flatten()
    }

    fn last_child_element(&self) -> Option<Self> {
        self.last_element_child()
    }

    fn connected(&self) -> bool {
        self.is_connected()
    }

    fn input_value(&self) -> String {
        self.dyn_ref::<HtmlInputElement>()
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn set_input_value(&self, value: &str) {
        if let Some(input) = self.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn checked(&self) -> bool {
        self.dyn_ref::<HtmlInputElement>()
            .map(|input| input.checked())
            .unwrap_or(false)
    }

    fn set_input_disabled(&self, disabled: bool) {
        if let Some(input) = self.dyn_ref::<HtmlInputElement>() {
            input.set_disabled(disabled);
        }
    }

    fn set_input_name(&self, name: &str) {
        if let Some(input) = self.dyn_ref::<HtmlInputElement>() {
            input.set_name(name);
        }
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn set_attr(&self, name: &str, value: &str) {
        if let Err(err) = self.set_attribute(name, value) {
            debug!("set_attribute {} failed: {:?}", name, err);
        }
    }

    fn set_shown(&self, shown: bool) {
        if let Some(html) = self.dyn_ref::<HtmlElement>() {
            let display = if shown { "block" } else { "none" };
            let _ = html.style().set_property("display", display);
        }
    }

    fn scroll_to_start(&self) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        self.scroll_into_view_with_scroll_into_view_options(&options);
    }
}
