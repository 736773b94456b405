//! Element ids the page must provide

pub const PROMPT: &str = "prompt";
pub const YES_BUTTON: &str = "yes-btn";
pub const NO_BUTTON: &str = "no-btn";
pub const NO_MESSAGE: &str = "no-message";
pub const CELEBRATION: &str = "celebration";
pub const CELEBRATION_HEADLINE: &str = "celebration-headline";
pub const CELEBRATION_IMAGE: &str = "celebration-img";
pub const CELEBRATION_FALLBACK: &str = "celebration-fallback";
pub const PLAN_BUTTON: &str = "plan-btn";
pub const PLAN_MODAL: &str = "plan-modal";
pub const PLAN_TITLE: &str = "plan-title";
pub const PLAN_ITEMS: &str = "plan-items";
pub const PLAN_CLOSE: &str = "plan-close";
pub const CONFETTI: &str = "confetti";

/// Container element for one confetti batch
pub fn confetti_batch(batch: u32) -> String {
    format!("confetti-batch-{}", batch)
}
