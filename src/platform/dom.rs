//! DOM-backed layout probe

use web_sys::{Document, Window};

use super::ids;
use crate::sim::{LayoutProbe, Rect, Viewport};

/// Reads element rectangles straight from the live layout
pub struct DomLayout {
    window: Window,
    document: Document,
}

impl DomLayout {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    fn rect_of(&self, id: &str) -> Option<Rect> {
        let el = self.document.get_element_by_id(id)?;
        let r = el.get_bounding_client_rect();
        Some(Rect::new(
            r.left() as f32,
            r.top() as f32,
            r.width() as f32,
            r.height() as f32,
        ))
    }

    fn window_dimension(value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>) -> f32 {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    }
}

impl LayoutProbe for DomLayout {
    fn viewport(&self) -> Viewport {
        Viewport::new(
            Self::window_dimension(self.window.inner_width()),
            Self::window_dimension(self.window.inner_height()),
        )
    }

    fn affirmative_rect(&self) -> Option<Rect> {
        self.rect_of(ids::YES_BUTTON)
    }

    fn prompt_rect(&self) -> Option<Rect> {
        self.rect_of(ids::PROMPT)
    }

    fn evasive_rect(&self) -> Option<Rect> {
        self.rect_of(ids::NO_BUTTON)
    }
}

/// Page clock in seconds, same time base as `requestAnimationFrame`
pub fn now_secs() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now() / 1000.0)
        .unwrap_or(0.0)
}
