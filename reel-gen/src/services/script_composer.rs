//! Script composition
//!
//! Builds the narration as `{hook} {topic}. {suffix}`, with the hook chosen
//! by an injectable [`HookSelector`].

use crate::models::{Script, Topic};
use rand::Rng;

/// Opening phrases, one of which starts every script
pub const HOOKS: [&str; 5] = [
    "You won't believe this...",
    "Stop scrolling! This will change everything...",
    "I tried this for 30 days and...",
    "This is the secret they don't want you to know...",
    "Wait until you see this...",
];

/// Fixed promotional sentence appended after the topic
pub const PROMO_SUFFIX: &str = "It's absolutely game-changing and here's why you need it right now. Don't miss out on this incredible recommendation!";

/// Picks which hook opens the script
pub trait HookSelector: Send + Sync {
    /// Return an index in `0..count`
    fn select(&self, count: usize) -> usize;
}

/// Uniform random selection
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomHookSelector;

impl HookSelector for RandomHookSelector {
    fn select(&self, count: usize) -> usize {
        rand::thread_rng().gen_range(0..count)
    }
}

/// Always the same index (wrapped into range)
#[derive(Debug, Clone, Copy)]
pub struct FixedHookSelector(pub usize);

impl HookSelector for FixedHookSelector {
    fn select(&self, count: usize) -> usize {
        self.0 % count
    }
}

pub struct ScriptComposer {
    selector: Box<dyn HookSelector>,
}

impl Default for ScriptComposer {
    fn default() -> Self {
        Self::new(Box::new(RandomHookSelector))
    }
}

impl ScriptComposer {
    pub fn new(selector: Box<dyn HookSelector>) -> Self {
        Self { selector }
    }

    pub fn compose(&self, topic: &Topic) -> Script {
        // Out-of-range selector output is clamped to the last hook
        let index = self.selector.select(HOOKS.len()).min(HOOKS.len() - 1);
        let hook = HOOKS[index];

        tracing::debug!(hook_index = index, "Composed script");

        Script::new(format!("{} {}. {}", hook, topic, PROMO_SUFFIX))
    }
}
