//! Be My Valentine entry point
//!
//! Handles platform-specific initialization and runs the page loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_page {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, Event, EventTarget, HtmlElement, PageTransitionEvent};

    use be_my_valentine::Settings;
    use be_my_valentine::platform::{DomLayout, ids, now_secs};
    use be_my_valentine::sim::{
        BatchId, ImageStatus, Phase, Positioning, Session, SessionEvent, Transition,
    };

    /// Page instance holding all state
    struct Page {
        session: Session,
        layout: DomLayout,
        document: Document,
        /// Cleared on teardown; stops the frame loop
        running: bool,
    }

    impl Page {
        fn element(&self, id: &str) -> Option<Element> {
            self.document.get_element_by_id(id)
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.element(id) {
                let _ = el.class_list().toggle_with_force("hidden", hidden);
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.element(id) {
                el.set_text_content(Some(text));
            }
        }

        /// Fill static copy from settings
        fn init_copy(&self) -> Result<(), JsValue> {
            let settings = self.session.settings();
            self.set_text(ids::PROMPT, &self.session.prompt_text());
            self.set_text(ids::YES_BUTTON, &settings.yes_label);
            self.set_text(ids::NO_BUTTON, &settings.no_label);
            self.set_text(ids::CELEBRATION_HEADLINE, &settings.celebration.headline);
            self.set_text(ids::CELEBRATION_FALLBACK, &settings.celebration.fallback_text);
            self.set_text(ids::PLAN_BUTTON, &settings.plan.button_label);
            self.set_text(ids::PLAN_TITLE, &settings.plan.title);
            self.set_text(ids::PLAN_CLOSE, &settings.plan.close_label);

            if let Some(list) = self.element(ids::PLAN_ITEMS) {
                list.set_inner_html("");
                for item in &settings.plan.items {
                    let li = self.document.create_element("li")?;
                    li.set_text_content(Some(item));
                    list.append_child(&li)?;
                }
            }

            if self.document.title().is_empty() {
                self.document.set_title(&self.session.prompt_text());
            }
            Ok(())
        }

        /// Feed a transition's events to the DOM
        fn apply(&mut self, transition: Transition) {
            let events = transition.events().to_vec();
            self.apply_events(&events);
        }

        fn apply_events(&mut self, events: &[SessionEvent]) {
            for event in events {
                match *event {
                    SessionEvent::PhaseChanged(phase) => {
                        log::info!("Phase -> {:?}", phase);
                        if phase == Phase::Celebrating {
                            self.load_celebration_image();
                        }
                    }
                    SessionEvent::EvasiveMoved { fallback: true, .. } => {
                        log::warn!("Evasive button may overlap: no clear spot found");
                    }
                    SessionEvent::BatchEmitted(id) => {
                        if let Err(e) = self.spawn_batch(id) {
                            log::warn!("Could not render confetti batch {}: {:?}", id.0, e);
                        }
                    }
                    SessionEvent::BatchExpired(id) => self.remove_batch(id),
                    _ => {}
                }
            }
            self.render();
        }

        /// Start fetching the image the first time the celebration shows
        fn load_celebration_image(&self) {
            let Some(img) = self
                .element(ids::CELEBRATION_IMAGE)
                .and_then(|el| el.dyn_into::<web_sys::HtmlImageElement>().ok())
            else {
                return;
            };
            if img.src().is_empty() {
                let celebration = &self.session.settings().celebration;
                img.set_alt(&celebration.image_alt);
                img.set_src(&celebration.image_url);
            }
        }

        fn spawn_batch(&self, id: BatchId) -> Result<(), JsValue> {
            let Some(layer) = self.element(ids::CONFETTI) else {
                return Ok(());
            };
            let Some(batch) = self.session.effect().batch(id) else {
                return Ok(());
            };

            let container = self.document.create_element("div")?;
            container.set_id(&ids::confetti_batch(id.0));
            for p in &batch.particles {
                let piece: HtmlElement = self.document.create_element("div")?.dyn_into()?;
                piece.set_class_name("confetti");
                let style = piece.style();
                style.set_property("left", &format!("{}%", p.left_percent))?;
                style.set_property("top", "-10px")?;
                style.set_property("background", &p.color)?;
                style.set_property("width", &format!("{}px", p.size))?;
                style.set_property("height", &format!("{}px", p.size))?;
                style.set_property("animation-duration", &format!("{}s", p.fall_duration_secs))?;
                style.set_property("animation-delay", &format!("{}s", p.start_delay_secs))?;
                container.append_child(&piece)?;
            }
            layer.append_child(&container)?;
            Ok(())
        }

        fn remove_batch(&self, id: BatchId) {
            if let Some(el) = self.element(&ids::confetti_batch(id.0)) {
                el.remove();
            }
        }

        /// Sync visibility, text and position with session state
        fn render(&self) {
            let session = &self.session;

            self.set_hidden(ids::YES_BUTTON, !session.buttons_visible());
            self.set_hidden(ids::NO_BUTTON, !session.buttons_visible());

            if let Some(no_btn) = self
                .element(ids::NO_BUTTON)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let style = no_btn.style();
                match session.positioning() {
                    Positioning::Fixed(pos) => {
                        let _ = no_btn.class_list().add_1("fixed");
                        let _ = style.set_property("left", &format!("{}px", pos.x));
                        let _ = style.set_property("top", &format!("{}px", pos.y));
                    }
                    Positioning::Flow => {
                        let _ = no_btn.class_list().remove_1("fixed");
                        let _ = style.remove_property("left");
                        let _ = style.remove_property("top");
                    }
                }
            }

            match session.current_message() {
                Some(msg) => {
                    self.set_text(ids::NO_MESSAGE, msg);
                    self.set_hidden(ids::NO_MESSAGE, false);
                }
                None => self.set_hidden(ids::NO_MESSAGE, true),
            }

            self.set_hidden(ids::CELEBRATION, !session.celebration_visible());
            let failed = session.image_status() == ImageStatus::Failed;
            self.set_hidden(ids::CELEBRATION_IMAGE, failed);
            self.set_hidden(ids::CELEBRATION_FALLBACK, !failed);
            self.set_hidden(ids::PLAN_MODAL, !session.plan_open());
        }

        /// Stop timers and the frame loop unless the page may be shown again
        fn hide(&mut self, persisted: bool) {
            if !self.session.on_page_hide(persisted).is_applied() {
                return;
            }
            self.running = false;
            if let Some(layer) = self.element(ids::CONFETTI) {
                layer.set_inner_html("");
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Be My Valentine starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let page = Page {
            session: Session::with_seed(settings, seed),
            layout: DomLayout::new(window, document.clone()),
            document,
            running: true,
        };
        page.init_copy()?;
        page.render();
        log::info!("Session initialized with seed: {}", seed);

        let page = Rc::new(RefCell::new(page));
        setup_evasive_handlers(page.clone())?;
        setup_buttons(page.clone())?;
        setup_image_handlers(page.clone())?;
        setup_window_handlers(page.clone())?;

        request_animation_frame(page);

        log::info!("Be My Valentine running!");
        Ok(())
    }

    fn listen(
        target: &EventTarget,
        event: &str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_evasive_handlers(page: Rc<RefCell<Page>>) -> Result<(), JsValue> {
        let Some(btn) = page.borrow().element(ids::NO_BUTTON) else {
            log::warn!("No #{} element, evasive button disabled", ids::NO_BUTTON);
            return Ok(());
        };

        // Mouse / pointer click
        {
            let page = page.clone();
            listen(&btn, "click", move |event: Event| {
                event.prevent_default();
                event.stop_propagation();
                let mut guard = page.borrow_mut();
                let p = &mut *guard;
                let transition = p.session.on_evasive_activate(&p.layout);
                p.apply(transition);
            })?;
        }

        // Touch start (fires before the finger can land a click)
        listen(&btn, "touchstart", move |event: Event| {
            event.prevent_default();
            event.stop_propagation();
            let mut guard = page.borrow_mut();
            let p = &mut *guard;
            let transition = p.session.on_evasive_activate(&p.layout);
            p.apply(transition);
        })
    }

    fn setup_buttons(page: Rc<RefCell<Page>>) -> Result<(), JsValue> {
        let document = page.borrow().document.clone();

        if let Some(btn) = document.get_element_by_id(ids::YES_BUTTON) {
            let page = page.clone();
            listen(&btn, "click", move |_event: Event| {
                let mut p = page.borrow_mut();
                let transition = p.session.on_affirmative_activate(now_secs());
                p.apply(transition);
            })?;
        }

        if let Some(btn) = document.get_element_by_id(ids::PLAN_BUTTON) {
            let page = page.clone();
            listen(&btn, "click", move |_event: Event| {
                let mut p = page.borrow_mut();
                let transition = p.session.on_show_plan();
                p.apply(transition);
            })?;
        }

        if let Some(btn) = document.get_element_by_id(ids::PLAN_CLOSE) {
            listen(&btn, "click", move |_event: Event| {
                let mut p = page.borrow_mut();
                let transition = p.session.on_close_plan();
                p.apply(transition);
            })?;
        }
        Ok(())
    }

    fn setup_image_handlers(page: Rc<RefCell<Page>>) -> Result<(), JsValue> {
        let Some(img) = page.borrow().element(ids::CELEBRATION_IMAGE) else {
            return Ok(());
        };

        {
            let page = page.clone();
            listen(&img, "error", move |_event: Event| {
                let mut p = page.borrow_mut();
                let transition = p.session.on_celebration_image_error();
                p.apply(transition);
            })?;
        }

        listen(&img, "load", move |_event: Event| {
            let mut p = page.borrow_mut();
            let transition = p.session.on_celebration_image_loaded();
            p.apply(transition);
        })
    }

    fn setup_window_handlers(page: Rc<RefCell<Page>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        {
            let page = page.clone();
            listen(&window, "resize", move |_event: Event| {
                let mut guard = page.borrow_mut();
                let p = &mut *guard;
                let transition = p.session.on_resize(&p.layout);
                p.apply(transition);
            })?;
        }

        listen(&window, "pagehide", move |event: Event| {
            let persisted = event
                .dyn_ref::<PageTransitionEvent>()
                .is_some_and(|e| e.persisted());
            log::info!("Page hidden (persisted: {})", persisted);
            page.borrow_mut().hide(persisted);
        })
    }

    fn request_animation_frame(page: Rc<RefCell<Page>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(page, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(page: Rc<RefCell<Page>>, time: f64) {
        {
            let mut p = page.borrow_mut();
            if !p.running {
                return;
            }
            let now = time / 1000.0;
            if p.session.next_timer_due().is_some_and(|due| due <= now) {
                let events = p.session.tick(now);
                p.apply_events(&events);
            }
        }

        request_animation_frame(page);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_page::run() {
        log::error!("Failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Be My Valentine (native) starting...");
    log::info!("The page runs in the browser - run with `trunk serve` for the web version");

    println!("\nRunning headless session...");
    headless_session();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play a scripted visit against fixed geometry and report what happened
#[cfg(not(target_arch = "wasm32"))]
fn headless_session() {
    use be_my_valentine::Settings;
    use be_my_valentine::sim::{LayoutSnapshot, Phase, Positioning, Session, SessionEvent};

    let mut session = Session::with_seed(Settings::load(), 2024);
    let mut layout = LayoutSnapshot::centered(800.0, 600.0);
    println!("{}", session.prompt_text());

    for _ in 0..5 {
        let transition = session.on_evasive_activate(&layout);
        if let Positioning::Fixed(pos) = session.positioning() {
            layout = layout.with_evasive_at(pos);
            println!(
                "No #{} -> ({:.0}, {:.0}): {}",
                session.evasive_clicks(),
                pos.x,
                pos.y,
                session.current_message().unwrap_or_default()
            );
        }
        if transition
            .events()
            .iter()
            .any(|e| matches!(e, SessionEvent::EvasiveMoved { fallback: true, .. }))
        {
            println!("  (no clear spot, kept last candidate)");
        }
    }

    session.on_affirmative_activate(0.0);
    let mut batches = session.effect().batches().len();
    let mut t = 0.0;
    while t < 15.0 {
        t += 1.0 / 60.0;
        batches += session
            .tick(t)
            .iter()
            .filter(|e| matches!(e, SessionEvent::BatchEmitted(_)))
            .count();
    }
    println!("Confetti batches emitted: {}", batches);

    session.on_show_plan();
    assert_eq!(session.phase(), Phase::PlanDetailOpen);
    for item in &session.settings().plan.items {
        println!("  {}", item);
    }
    session.on_close_plan();
    session.teardown();
    println!("✓ Headless session finished in {:?}", session.phase());
}
