//! Flashcard Explorer entry point
//!
//! On the web this wires the layout engine to the page: node elements,
//! pointer handlers, and the requestAnimationFrame loop. The host page fetches
//! flashcards itself and hands them over through the exported `Explorer`.
//! Natively it runs a headless demo of the layout.

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use wasm_bindgen::prelude::*;
    use web_sys::{Element, Event, HtmlElement};

    use flashcard_explorer::renderer::DomTarget;
    use flashcard_explorer::renderer::dom::{PointerDownHandler, client_point, container_point};
    use flashcard_explorer::sim::Viewport;
    use flashcard_explorer::{ExplorerSession, LayoutEngine, LayoutSettings, parse_records};

    /// Pointer travel (px) after which a press counts as a drag, not a click
    const CLICK_SLOP: f32 = 4.0;

    struct App {
        session: ExplorerSession<DomTarget>,
        container: HtmlElement,
        /// Loop generation that has a frame callback pending
        scheduled_loop: Option<u64>,
        /// Pointer position at press, cleared once it moves past the slop
        press_origin: Option<glam::Vec2>,
        /// Last press turned into a drag; swallow the click that follows
        suppress_click: bool,
    }

    impl App {
        fn on_pointer_down(&mut self, node_id: usize, pointer: glam::Vec2) {
            if self.session.engine_mut().begin_drag(node_id, pointer) {
                self.press_origin = Some(pointer);
                self.suppress_click = false;
                let _ = self.container.style().set_property("cursor", "grabbing");
            }
        }

        fn on_pointer_move(&mut self, pointer: glam::Vec2) {
            if !self.session.engine().is_dragging() {
                return;
            }
            if let Some(origin) = self.press_origin {
                if origin.distance(pointer) > CLICK_SLOP {
                    self.suppress_click = true;
                    self.press_origin = None;
                }
            }
            self.session.engine_mut().drag_to(pointer);
        }

        fn on_pointer_up(&mut self) {
            if self.session.engine_mut().end_drag().is_some() {
                let _ = self.container.style().remove_property("cursor");
            }
            self.press_origin = None;
        }

        /// Click delegation: background collapses, the drill-down button
        /// selects, anywhere else on a card toggles expansion
        fn on_click(&mut self, target: &Element) {
            if std::mem::take(&mut self.suppress_click) {
                return;
            }
            let container: &Element = self.container.as_ref();
            if target == container {
                self.session.engine_mut().collapse_expanded();
                return;
            }
            let Some(card) = target.closest(".flashcard").ok().flatten() else {
                return;
            };
            let Some(id) = card
                .get_attribute("data-node-id")
                .and_then(|v| v.parse::<usize>().ok())
            else {
                return;
            };

            if target.closest(".drill-down-button").ok().flatten().is_some() {
                if let Err(e) = self.session.toggle_selection(id) {
                    log::warn!("{}", e);
                }
            } else {
                self.session.engine_mut().toggle_expansion(id);
            }
        }

        fn sync_viewport(&mut self) {
            let (w, h) = self.session.engine().target().size();
            self.session.engine_mut().resize(w, h);
        }
    }

    /// Schedule a frame for the engine's current loop unless one is pending
    fn ensure_loop(app: &Rc<RefCell<App>>) {
        let generation = {
            let mut a = app.borrow_mut();
            let engine = a.session.engine();
            if !engine.is_running() {
                return;
            }
            let generation = engine.loop_generation();
            if a.scheduled_loop == Some(generation) {
                return;
            }
            a.scheduled_loop = Some(generation);
            generation
        };
        request_animation_frame(Rc::downgrade(app), generation);
    }

    fn request_animation_frame(app: Weak<RefCell<App>>, generation: u64) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, generation, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Weak<RefCell<App>>, generation: u64, time: f64) {
        let Some(strong) = app.upgrade() else {
            return;
        };
        let alive = {
            let mut a = strong.borrow_mut();
            a.sync_viewport();
            let alive = a.session.engine_mut().frame(generation, time).is_some();
            if !alive && a.scheduled_loop == Some(generation) {
                a.scheduled_loop = None;
            }
            alive
        };
        if alive {
            request_animation_frame(app, generation);
        }
    }

    /// Attach a document-level listener that forwards to `App`
    fn listen(
        target: &web_sys::EventTarget,
        kind: &str,
        app: &Rc<RefCell<App>>,
        handler: impl Fn(&mut App, &Event) + 'static,
    ) {
        let weak = Rc::downgrade(app);
        let closure = Closure::<dyn FnMut(_)>::new(move |event: Event| {
            if let Some(app) = weak.upgrade() {
                if let Ok(mut a) = app.try_borrow_mut() {
                    handler(&mut a, &event);
                }
                ensure_loop(&app);
            }
        });
        let _ = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_input_handlers(app: &Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let container = app.borrow().container.clone();

        for kind in ["mousemove", "touchmove"] {
            let container = container.clone();
            listen(&document, kind, app, move |a, event| {
                if !a.session.engine().is_dragging() {
                    return;
                }
                if let Some((x, y)) = client_point(event) {
                    event.prevent_default();
                    a.on_pointer_move(container_point(&container, x, y));
                }
            });
        }

        for kind in ["mouseup", "touchend", "touchcancel"] {
            listen(&document, kind, app, |a, _event| a.on_pointer_up());
        }

        listen(&container, "click", app, |a, event| {
            if let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
                a.on_click(&target);
            }
        });

        if let Some(window) = web_sys::window() {
            listen(&window, "resize", app, |a, _event| a.sync_viewport());
        }
    }

    /// Handle for the host page
    #[wasm_bindgen]
    pub struct Explorer {
        app: Rc<RefCell<App>>,
    }

    #[wasm_bindgen]
    impl Explorer {
        /// Bind to the element with id `container_id`
        #[wasm_bindgen(constructor)]
        pub fn new(container_id: &str) -> Result<Explorer, JsValue> {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| JsValue::from_str("no document"))?;
            let container: HtmlElement = document
                .get_element_by_id(container_id)
                .ok_or_else(|| JsValue::from_str("flashcard container not found"))?
                .dyn_into()
                .map_err(|_| JsValue::from_str("flashcard container is not an HTML element"))?;

            let settings = LayoutSettings::load();
            let rect = container.get_bounding_client_rect();
            let viewport = Viewport::new(rect.width() as f32, rect.height() as f32);

            let app = Rc::new_cyclic(|weak: &Weak<RefCell<App>>| {
                let weak = weak.clone();
                let on_pointer_down: PointerDownHandler = Rc::new(move |id, pointer| {
                    if let Some(app) = weak.upgrade() {
                        if let Ok(mut a) = app.try_borrow_mut() {
                            a.on_pointer_down(id, pointer);
                        }
                    }
                });
                let target = DomTarget::new(document, container.clone(), on_pointer_down);
                let engine = LayoutEngine::new(target, viewport, settings);
                RefCell::new(App {
                    session: ExplorerSession::new(engine),
                    container,
                    scheduled_loop: None,
                    press_origin: None,
                    suppress_click: false,
                })
            });

            setup_input_handlers(&app);
            log::info!("Explorer bound to #{}", container_id);
            Ok(Explorer { app })
        }

        /// Show cards for `topic` from the generation service's JSON reply
        #[wasm_bindgen(js_name = showTopic)]
        pub fn show_topic(&self, topic: &str, cards_json: &str, drill_down: bool) -> Result<(), JsValue> {
            let records = parse_records(cards_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
            {
                let mut a = self.app.borrow_mut();
                a.sync_viewport();
                a.session
                    .show_topic(topic, records, drill_down)
                    .map_err(|e| JsValue::from_str(&e.to_string()))?;
            }
            ensure_loop(&self.app);
            Ok(())
        }

        /// Return to breadcrumb `index`
        #[wasm_bindgen(js_name = navigateTo)]
        pub fn navigate_to(&self, index: usize) -> Result<(), JsValue> {
            self.app
                .borrow_mut()
                .session
                .navigate_to(index)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            ensure_loop(&self.app);
            Ok(())
        }

        pub fn breadcrumbs(&self) -> js_sys::Array {
            self.app
                .borrow()
                .session
                .history()
                .breadcrumbs()
                .into_iter()
                .map(JsValue::from_str)
                .collect()
        }

        /// Combined topic for a drill-down from the selected cards
        #[wasm_bindgen(js_name = selectionTopic)]
        pub fn selection_topic(&self) -> Option<String> {
            self.app.borrow().session.selection_topic()
        }

        #[wasm_bindgen(js_name = clearSelection)]
        pub fn clear_selection(&self) {
            self.app.borrow_mut().session.clear_selection();
        }

        #[wasm_bindgen(js_name = selectedCount)]
        pub fn selected_count(&self) -> usize {
            self.app.borrow().session.selection().ids().len()
        }

        /// Turn spring animation off or on and remember the choice
        #[wasm_bindgen(js_name = setReducedMotion)]
        pub fn set_reduced_motion(&self, enabled: bool) {
            let mut a = self.app.borrow_mut();
            let mut settings = a.session.engine().settings().clone();
            settings.reduced_motion = enabled;
            settings.save();
            a.session.engine_mut().set_settings(settings);
        }

        /// Clear everything back to the start view
        pub fn reset(&self) {
            self.app.borrow_mut().session.reset();
        }
    }

    pub fn init_logging() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Flashcard Explorer starting...");
    }
}

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::init_logging();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Flashcard Explorer (native) starting...");
    log::info!("Native mode runs a headless layout demo - serve the wasm build for the UI");

    demo_layout();
}

/// Build a small topic, disturb it, and report how the layout settles
#[cfg(not(target_arch = "wasm32"))]
fn demo_layout() {
    use flashcard_explorer::renderer::RecordingTarget;
    use flashcard_explorer::sim::{Viewport, compute_hex_slots};
    use flashcard_explorer::{FlashcardRecord, LayoutEngine, LayoutSettings};
    use glam::Vec2;

    let records: Vec<FlashcardRecord> = [
        ("Cell", "Basic unit of life", 10.0),
        ("Nucleus", "Holds the genome", 8.0),
        ("Mitochondria", "Produces ATP", 7.0),
        ("Ribosome", "Translates mRNA into protein", 6.0),
        ("Membrane", "Lipid bilayer boundary", 6.0),
        ("Golgi apparatus", "Packages proteins", 4.0),
        ("Lysosome", "Breaks down waste", 3.0),
    ]
    .into_iter()
    .map(|(term, definition, importance)| FlashcardRecord::new(term, definition, importance))
    .collect();

    let mut engine = LayoutEngine::new(
        RecordingTarget::new(),
        Viewport::new(1280.0, 800.0),
        LayoutSettings::default(),
    );
    engine.create_nodes(&records);

    // Fling node 3 into a corner and let go
    if let Some(pos) = engine.node(3).map(|n| n.pos) {
        engine.begin_drag(3, pos);
        engine.drag_to(Vec2::new(50.0, 50.0));
        engine.end_drag();
    }
    engine.toggle_expansion(1);

    let generation = engine.loop_generation();
    let mut settled_at = None;
    for frame in 0..600u32 {
        let settled = engine
            .frame(generation, frame as f64 * 16.67)
            .is_some_and(|report| report.settled);
        if settled && settled_at.is_none() {
            settled_at = Some(frame);
        }
    }

    let viewport = engine.viewport();
    let avg = engine.state().average_radius();
    let slots = compute_hex_slots(engine.nodes().len(), viewport.width, viewport.height, avg);
    for (node, slot) in engine.nodes().iter().zip(&slots) {
        println!(
            "{:>2} {:<16} r={:>5.1} pos=({:>7.1}, {:>7.1}) slot=({:>7.1}, {:>7.1}){}",
            node.id,
            node.term,
            node.radius,
            node.pos.x,
            node.pos.y,
            slot.pos.x,
            slot.pos.y,
            if node.is_expanded { " [expanded]" } else { "" }
        );
    }
    match settled_at {
        Some(frame) => println!("\nLayout settled after {} frames", frame),
        None => println!("\nLayout still moving after 600 frames"),
    }
    println!("{} transform writes", engine.target().writes);
}
