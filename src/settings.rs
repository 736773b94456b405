//! Widget settings
//!
//! Copy and tuning for the page. Loaded from an inline JSON block in the page
//! (`<script type="application/json" id="valentine-config">`), with the
//! recipient optionally overridden by a `?to=` query parameter.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::PlacementParams;

/// Evasive button placement tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    /// Clearance from the viewport edges (px)
    pub margin: f32,
    /// Clearance around the Yes button and the prompt (px)
    pub padding: f32,
    /// Candidates tried before keeping the last one
    pub max_attempts: u32,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            margin: EDGE_MARGIN,
            padding: OVERLAP_PADDING,
            max_attempts: PLACEMENT_MAX_ATTEMPTS,
        }
    }
}

impl From<PlacementSettings> for PlacementParams {
    fn from(s: PlacementSettings) -> Self {
        PlacementParams {
            margin: s.margin,
            padding: s.padding,
            max_attempts: s.max_attempts,
        }
    }
}

/// Confetti tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfettiSettings {
    pub batch_size: usize,
    /// Seconds each batch stays on screen
    pub batch_lifetime: f64,
    /// Seconds between batches
    pub emit_interval: f64,
    /// Seconds after the first batch when emission stops
    pub emit_duration: f64,
    pub min_size: f32,
    pub max_size: f32,
    pub min_fall: f32,
    pub max_fall: f32,
    pub max_delay: f32,
    /// CSS colors
    pub palette: Vec<String>,
}

impl Default for ConfettiSettings {
    fn default() -> Self {
        Self {
            batch_size: CONFETTI_BATCH_SIZE,
            batch_lifetime: CONFETTI_BATCH_LIFETIME,
            emit_interval: CONFETTI_EMIT_INTERVAL,
            emit_duration: CONFETTI_EMIT_DURATION,
            min_size: CONFETTI_MIN_SIZE,
            max_size: CONFETTI_MAX_SIZE,
            min_fall: CONFETTI_MIN_FALL,
            max_fall: CONFETTI_MAX_FALL,
            max_delay: CONFETTI_MAX_DELAY,
            palette: CONFETTI_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// What the page shows after "Yes"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CelebrationSettings {
    pub headline: String,
    pub image_url: String,
    pub image_alt: String,
    /// Shown in place of the image if it fails to load
    pub fallback_text: String,
}

impl Default for CelebrationSettings {
    fn default() -> Self {
        Self {
            headline: "🎉 Yay! I love you! 🎉".to_string(),
            image_url: "https://images.unsplash.com/photo-1516589178581-6cd7833ae3b2?w=400&h=400&fit=crop&crop=center".to_string(),
            image_alt: "Valentine's celebration".to_string(),
            fallback_text: "💕💖💕".to_string(),
        }
    }
}

/// The date plan shown in the modal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanDetails {
    /// Label of the button that opens the modal
    pub button_label: String,
    pub title: String,
    /// One entry per line of the plan
    pub items: Vec<String>,
    pub close_label: String,
}

impl Default for PlanDetails {
    fn default() -> Self {
        Self {
            button_label: "Find out what we will do here".to_string(),
            title: "Find out what we'll do together! 💕".to_string(),
            items: vec![
                "🌹 Pick-up at 7pm".to_string(),
                "🍝 Dinner at our favourite place".to_string(),
                "🍫 Dessert and a long walk home".to_string(),
            ],
            close_label: "Close".to_string(),
        }
    }
}

/// Everything the page can be configured with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Who is being asked
    pub recipient: String,
    /// Prompt template; `{name}` is replaced by the recipient
    pub question: String,
    pub yes_label: String,
    pub no_label: String,
    /// Taunts shown after each No, cycling
    pub messages: Vec<String>,
    pub placement: PlacementSettings,
    pub confetti: ConfettiSettings,
    pub celebration: CelebrationSettings,
    pub plan: PlanDetails,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recipient: "Deffy".to_string(),
            question: "{name}, will you be my Valentine?".to_string(),
            yes_label: "Yes".to_string(),
            no_label: "No".to_string(),
            messages: [
                "Are you sure you want to press that one?",
                "Really?",
                "Not quite...",
                "Almost there..",
                "I dare you",
                "I think you are mistaken",
                "WRONG",
                "Really? :(",
                "Try again!",
                "Nope, not that one!",
                "Keep trying!",
                "Almost got it!",
                "So close!",
                "Not the right button!",
                "Hmm, try the other one",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
            placement: PlacementSettings::default(),
            confetti: ConfettiSettings::default(),
            celebration: CelebrationSettings::default(),
            plan: PlanDetails::default(),
        }
    }
}

impl Settings {
    /// Element holding the JSON settings block (used only in wasm32)
    #[allow(dead_code)]
    const CONFIG_ELEMENT_ID: &'static str = "valentine-config";

    /// Query parameter naming the recipient
    const RECIPIENT_PARAM: &'static str = "to";

    /// Parse settings from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// The question with the recipient filled in
    pub fn prompt_text(&self) -> String {
        self.question.replace("{name}", &self.recipient)
    }

    pub fn placement_params(&self) -> PlacementParams {
        self.placement.into()
    }

    /// Repair out-of-range tuning. Returns the number of fields reset.
    pub fn sanitize(&mut self) -> usize {
        let mut fixes = 0;
        let placement_defaults = PlacementSettings::default();
        let confetti_defaults = ConfettiSettings::default();

        if !(self.placement.margin >= 0.0 && self.placement.margin.is_finite()) {
            log::warn!("Invalid placement margin {}, using default", self.placement.margin);
            self.placement.margin = placement_defaults.margin;
            fixes += 1;
        }
        if !(self.placement.padding >= 0.0 && self.placement.padding.is_finite()) {
            log::warn!("Invalid placement padding {}, using default", self.placement.padding);
            self.placement.padding = placement_defaults.padding;
            fixes += 1;
        }
        if self.placement.max_attempts == 0 {
            log::warn!("Placement needs at least one attempt, using default");
            self.placement.max_attempts = placement_defaults.max_attempts;
            fixes += 1;
        }

        let c = &mut self.confetti;
        if c.batch_size > CONFETTI_MAX_BATCH_SIZE {
            log::warn!(
                "Confetti batch_size {} too large, capping at {}",
                c.batch_size,
                CONFETTI_MAX_BATCH_SIZE
            );
            c.batch_size = CONFETTI_MAX_BATCH_SIZE;
            fixes += 1;
        }
        for (name, value, default) in [
            ("batch_lifetime", &mut c.batch_lifetime, confetti_defaults.batch_lifetime),
            ("emit_interval", &mut c.emit_interval, confetti_defaults.emit_interval),
        ] {
            if !(*value > 0.0 && value.is_finite()) {
                log::warn!("Invalid confetti {} {}, using default", name, value);
                *value = default;
                fixes += 1;
            }
        }
        if c.emit_interval < CONFETTI_MIN_EMIT_INTERVAL {
            log::warn!(
                "Confetti emit_interval {} too short, raising to {}",
                c.emit_interval,
                CONFETTI_MIN_EMIT_INTERVAL
            );
            c.emit_interval = CONFETTI_MIN_EMIT_INTERVAL;
            fixes += 1;
        }
        if !(c.emit_duration >= 0.0 && c.emit_duration.is_finite()) {
            log::warn!("Invalid confetti emit_duration {}, using default", c.emit_duration);
            c.emit_duration = confetti_defaults.emit_duration;
            fixes += 1;
        }
        for (name, value) in [
            ("batch_lifetime", &mut c.batch_lifetime),
            ("emit_duration", &mut c.emit_duration),
        ] {
            if *value > CONFETTI_MAX_TIMING {
                log::warn!(
                    "Confetti {} {} too long, capping at {}",
                    name,
                    value,
                    CONFETTI_MAX_TIMING
                );
                *value = CONFETTI_MAX_TIMING;
                fixes += 1;
            }
        }
        for (name, value, default) in [
            ("min_size", &mut c.min_size, confetti_defaults.min_size),
            ("max_size", &mut c.max_size, confetti_defaults.max_size),
            ("min_fall", &mut c.min_fall, confetti_defaults.min_fall),
            ("max_fall", &mut c.max_fall, confetti_defaults.max_fall),
            ("max_delay", &mut c.max_delay, confetti_defaults.max_delay),
        ] {
            if !(*value >= 0.0 && value.is_finite()) {
                log::warn!("Invalid confetti {} {}, using default", name, value);
                *value = default;
                fixes += 1;
            }
        }
        for (name, min, max) in [
            ("size", &mut c.min_size, &mut c.max_size),
            ("fall", &mut c.min_fall, &mut c.max_fall),
        ] {
            if *min > *max {
                log::warn!("Confetti {} range inverted, swapping", name);
                std::mem::swap(min, max);
                fixes += 1;
            }
        }
        if c.palette.is_empty() {
            log::warn!("Empty confetti palette, using default");
            c.palette = confetti_defaults.palette;
            fixes += 1;
        }

        fixes
    }

    /// Apply overrides from a URL query string (with or without leading `?`)
    pub fn apply_query(&mut self, query: &str) {
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key != Self::RECIPIENT_PARAM {
                continue;
            }
            let value = value.replace('+', " ");
            match urlencoding::decode(&value) {
                Ok(name) if !name.trim().is_empty() => {
                    log::info!("Recipient from query: {}", name.trim());
                    self.recipient = name.trim().to_string();
                }
                Ok(_) => {}
                Err(e) => log::warn!("Ignoring undecodable recipient: {}", e),
            }
        }
    }

    /// Load settings from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let window = web_sys::window();
        let inline = window
            .as_ref()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        let mut settings = match inline {
            Some(json) if !json.trim().is_empty() => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from #{}", Self::CONFIG_ELEMENT_ID);
                    settings
                }
                Err(e) => {
                    log::warn!("Malformed settings JSON ({}), using defaults", e);
                    Self::default()
                }
            },
            _ => {
                log::info!("Using default settings");
                Self::default()
            }
        };

        if let Some(search) = window.and_then(|w| w.location().search().ok()) {
            settings.apply_query(&search);
        }
        settings
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let s = Settings::default();
        assert_eq!(s.messages.len(), 15);
        assert_eq!(s.placement.max_attempts, 50);
        assert_eq!(s.confetti.batch_size, 150);
        assert_eq!(s.confetti.palette.len(), 10);
        assert_eq!(s.prompt_text(), "Deffy, will you be my Valentine?");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{"recipient": "Sam", "confetti": {"batch_size": 20}}"#)
            .unwrap();
        assert_eq!(s.recipient, "Sam");
        assert_eq!(s.confetti.batch_size, 20);
        assert_eq!(s.confetti.emit_interval, 2.0);
        assert_eq!(s.messages, Settings::default().messages);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{ recipient: ").is_err());
    }

    #[test]
    fn test_sanitize_repairs_tuning() {
        let mut s = Settings::default();
        s.placement.max_attempts = 0;
        s.placement.margin = -5.0;
        s.confetti.emit_interval = 0.0;
        s.confetti.min_size = 20.0;
        s.confetti.palette.clear();
        assert_eq!(s.sanitize(), 5);
        assert_eq!(s.placement.max_attempts, 50);
        assert_eq!(s.placement.margin, 20.0);
        assert_eq!(s.confetti.emit_interval, 2.0);
        assert_eq!((s.confetti.min_size, s.confetti.max_size), (15.0, 20.0));
        assert!(!s.confetti.palette.is_empty());
        assert_eq!(s.sanitize(), 0);
    }

    #[test]
    fn test_sanitize_bounds_confetti_rate() {
        let mut s = Settings::from_json(
            r#"{"confetti": {"emit_interval": 0.0001, "batch_size": 1000000}}"#,
        )
        .unwrap();
        assert_eq!(s.confetti.emit_interval, CONFETTI_MIN_EMIT_INTERVAL);
        assert_eq!(s.confetti.batch_size, CONFETTI_MAX_BATCH_SIZE);
        assert_eq!(s.sanitize(), 0);
    }

    #[test]
    fn test_sanitize_caps_long_timings() {
        let mut s = Settings::default();
        s.confetti.batch_lifetime = 1e9;
        s.confetti.emit_duration = f64::INFINITY;
        assert_eq!(s.sanitize(), 2);
        assert_eq!(s.confetti.batch_lifetime, CONFETTI_MAX_TIMING);
        assert_eq!(s.confetti.emit_duration, CONFETTI_EMIT_DURATION);
    }

    #[test]
    fn test_sanitize_rejects_nan_particle_ranges() {
        let mut s = Settings::default();
        s.confetti.min_size = f32::NAN;
        s.confetti.max_size = f32::INFINITY;
        s.confetti.min_fall = -1.0;
        s.confetti.max_fall = f32::NAN;
        s.confetti.max_delay = f32::NAN;
        assert_eq!(s.sanitize(), 5);
        let c = &s.confetti;
        assert_eq!((c.min_size, c.max_size), (CONFETTI_MIN_SIZE, CONFETTI_MAX_SIZE));
        assert_eq!((c.min_fall, c.max_fall), (CONFETTI_MIN_FALL, CONFETTI_MAX_FALL));
        assert_eq!(c.max_delay, CONFETTI_MAX_DELAY);
    }

    #[test]
    fn test_query_overrides_recipient() {
        let mut s = Settings::default();
        s.apply_query("?lang=en&to=Alex%20%26%20Co");
        assert_eq!(s.recipient, "Alex & Co");
        s.apply_query("to=Mary+Jane");
        assert_eq!(s.prompt_text(), "Mary Jane, will you be my Valentine?");
    }

    #[test]
    fn test_empty_query_value_is_ignored() {
        let mut s = Settings::default();
        s.apply_query("?to=&x=1");
        assert_eq!(s.recipient, "Deffy");
        s.apply_query("");
        assert_eq!(s.recipient, "Deffy");
    }
}
