//! Achievement polling and story events

use super::handlers::Context;
use super::GameState;
use crate::data::{Achievement, StoryEvent};
use crate::output::{Signal, Speed};

/// How often polled achievements are evaluated
pub const ACHIEVEMENT_CHECK_INTERVAL_MS: u64 = 5000;

/// Polled achievements that are true now and not yet awarded
pub fn newly_earned(state: &GameState, now_ms: u64) -> Vec<Achievement> {
    Achievement::ALL
        .into_iter()
        .filter(|a| a.is_polled() && !state.has_achievement(*a) && a.check(state, now_ms))
        .collect()
}

/// Award every polled achievement that has become true
pub fn check_achievements(ctx: &mut Context<'_>) {
    for achievement in newly_earned(ctx.state, ctx.now) {
        ctx.award(achievement);
    }
}

/// Fire each story event whose threshold has been crossed, at most once
pub fn fire_story_events(ctx: &mut Context<'_>) {
    for event in StoryEvent::ALL {
        if !event.triggered(ctx.state) {
            continue;
        }
        tracing::info!("Story event at corruption {}", event.threshold());
        ctx.script
            .type_lines(event.lines().iter().copied(), Speed::Normal);
        ctx.award(event.achievement());
        if let Some(cue) = event.cue() {
            ctx.script.signal(Signal::Cue(cue));
        }
    }
}
