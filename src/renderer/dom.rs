//! DOM render target
//!
//! Each node is an absolutely positioned `div.flashcard` inside the
//! container; the render step writes `transform` and `z-index` only.

use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlElement, MouseEvent, TouchEvent};

use super::{NodeTransform, RenderTarget};
use crate::records::format_term;
use crate::sim::SimulationNode;

/// Called with (node id, container-relative pointer) on pointer down
pub type PointerDownHandler = Rc<dyn Fn(usize, Vec2)>;

/// A node's element plus the listeners bound to it
pub struct DomNode {
    pub element: HtmlElement,
    _listeners: Vec<Closure<dyn FnMut(Event)>>,
}

/// Renders nodes as elements inside a container
pub struct DomTarget {
    document: Document,
    container: HtmlElement,
    on_pointer_down: PointerDownHandler,
}

impl DomTarget {
    pub fn new(document: Document, container: HtmlElement, on_pointer_down: PointerDownHandler) -> Self {
        Self {
            document,
            container,
            on_pointer_down,
        }
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// Container size in CSS pixels
    pub fn size(&self) -> (f32, f32) {
        let rect = self.container.get_bounding_client_rect();
        (rect.width() as f32, rect.height() as f32)
    }

    fn create_div(&self, class: &str) -> Result<HtmlElement, JsValue> {
        let el: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        el.set_class_name(class);
        Ok(el)
    }

    fn build_element(&self, node: &SimulationNode) -> Result<HtmlElement, JsValue> {
        let card = self.create_div("flashcard")?;
        let diameter = format!("{}px", node.radius * 2.0);
        let style = card.style();
        style.set_property("width", &diameter)?;
        style.set_property("height", &diameter)?;
        style.set_property("cursor", "grab")?;
        card.set_attribute("data-node-id", &node.id.to_string())?;

        let term = self.create_div("term")?;
        let parts = format_term(&node.term);
        term.set_text_content(Some(parts.main));
        if let Some(translation) = parts.translation {
            let span = self.document.create_element("span")?;
            span.set_class_name("term-translation");
            span.set_text_content(Some(&format!("({})", translation)));
            term.append_child(&self.document.create_element("br")?)?;
            term.append_child(&span)?;
        }
        card.append_child(&term)?;

        let definition = self.create_div("definition")?;
        definition.set_text_content(Some(&node.definition));
        card.append_child(&definition)?;

        let button = self.document.create_element("button")?;
        button.set_class_name("drill-down-button");
        button.set_attribute("title", "Explore this topic")?;
        button.set_text_content(Some("+"));
        card.append_child(&button)?;

        self.container.append_child(&card)?;
        Ok(card)
    }

    fn bind_pointer_down(&self, element: &HtmlElement, node_id: usize) -> Vec<Closure<dyn FnMut(Event)>> {
        let mut listeners = Vec::new();

        for kind in ["mousedown", "touchstart"] {
            let handler = self.on_pointer_down.clone();
            let container = self.container.clone();
            let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let Some((x, y)) = client_point(&event) else {
                    return;
                };
                event.prevent_default();
                handler(node_id, container_point(&container, x, y));
            });
            if element
                .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
                .is_err()
            {
                log::warn!("Could not bind {} on node {}", kind, node_id);
            }
            listeners.push(closure);
        }

        listeners
    }
}

impl RenderTarget for DomTarget {
    type Handle = Option<DomNode>;

    fn attach(&mut self, node: &SimulationNode) -> Self::Handle {
        match self.build_element(node) {
            Ok(element) => {
                let listeners = self.bind_pointer_down(&element, node.id);
                Some(DomNode {
                    element,
                    _listeners: listeners,
                })
            }
            Err(e) => {
                log::error!("Failed to create element for node {}: {:?}", node.id, e);
                None
            }
        }
    }

    fn apply_transform(&mut self, handle: &Self::Handle, transform: &NodeTransform) {
        let Some(node) = handle else {
            return;
        };
        let style = node.element.style();
        let _ = style.set_property("transform", &transform.css());
        let _ = style.set_property("z-index", &transform.z_index.to_string());
    }

    fn set_expanded(&mut self, handle: &Self::Handle, expanded: bool) {
        if let Some(node) = handle {
            let _ = node.element.class_list().toggle_with_force("expanded", expanded);
        }
    }

    fn set_selected(&mut self, handle: &Self::Handle, selected: bool) {
        if let Some(node) = handle {
            let _ = node.element.class_list().toggle_with_force("selected", selected);
        }
    }

    fn clear(&mut self) {
        self.container.set_inner_html("");
    }
}

/// Client coordinates of a mouse event or the first touch
pub fn client_point(event: &Event) -> Option<(f32, f32)> {
    if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
        return Some((mouse.client_x() as f32, mouse.client_y() as f32));
    }
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some((touch.client_x() as f32, touch.client_y() as f32))
}

/// Convert client coordinates into the container's space
pub fn container_point(container: &HtmlElement, client_x: f32, client_y: f32) -> Vec2 {
    let rect = container.get_bounding_client_rect();
    Vec2::new(client_x - rect.left() as f32, client_y - rect.top() as f32)
}
