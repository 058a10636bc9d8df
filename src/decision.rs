//! Notification decision policy
//!
//! This module answers one question per incoming event: which sinks should
//! fire, and why not for the ones that don't. The rules, in precedence order:
//! - muted channel: suppress everything, no further checks
//! - focused on the event's channel: suppress everything (user is looking at it)
//! - focused elsewhere: suppress native; sound stays on unless
//!   `suppress_sound_when_focused` is set
//! - unfocused: everything fires
//!
//! The decision is the single source of truth. Sinks read `reasons` for their
//! own suppressed-result reporting but never re-derive policy from context.

use serde::{Deserialize, Serialize};

use crate::context::NotificationContext;
use crate::error::DecisionError;
use crate::event::NotificationEvent;

/// Suppression reason token
///
/// Stable string form (`as_str`) is what shows up in sink results, logs and
/// the CLI JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    /// The event's channel is muted
    ChannelMuted,
    /// Window focused and the event's channel is the open one
    FocusedCurrentChannel,
    /// Window focused, but on a different (or no) channel
    FocusedWindow,
    /// Sound globally disabled in preferences
    SoundDisabled,
    /// Dry-run dispatch, nothing fires
    DryRun,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuppressReason::ChannelMuted => "channel_muted",
            SuppressReason::FocusedCurrentChannel => "focused_current_channel",
            SuppressReason::FocusedWindow => "focused_window",
            SuppressReason::SoundDisabled => "sound_disabled",
            SuppressReason::DryRun => "dry_run",
        }
    }
}

impl std::fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Policy knobs supplied at construction time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionPolicy {
    /// Also suppress sound while the window is focused on another channel.
    /// Off by default so ambient audio cues still work when the user is
    /// elsewhere in the UI.
    pub suppress_sound_when_focused: bool,
}

/// The single authoritative answer computed once per event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDecision {
    /// Whether the native OS notification sink should fire
    pub send_native: bool,
    /// Whether the sound sink should fire
    pub play_sound: bool,
    /// Suppression reasons, in the order the rules fired. The first entry is
    /// the primary explanation handed to a suppressed sink that has no more
    /// specific reason of its own.
    pub reasons: Vec<SuppressReason>,
}

impl NotificationDecision {
    /// True when no sink should fire
    pub fn fully_suppressed(&self) -> bool {
        !self.send_native && !self.play_sound
    }
}

/// Compute the decision for one event against a context snapshot.
///
/// Pure and deterministic: no I/O, no side effects. Malformed events are a
/// precondition violation surfaced as an error before any sink runs.
pub fn decide(
    event: &NotificationEvent,
    context: &NotificationContext,
    policy: &DecisionPolicy,
) -> Result<NotificationDecision, DecisionError> {
    event.validate()?;

    // Rule 1: mute dominates everything
    if context.muted_channels.contains(&event.channel) {
        return Ok(NotificationDecision {
            send_native: false,
            play_sound: false,
            reasons: vec![SuppressReason::ChannelMuted],
        });
    }

    // Rule 2: user is already looking at this conversation
    if context.window_focused && context.open_channel.as_deref() == Some(event.channel.as_str()) {
        return Ok(NotificationDecision {
            send_native: false,
            play_sound: false,
            reasons: vec![SuppressReason::FocusedCurrentChannel],
        });
    }

    let mut send_native = true;
    let mut play_sound = true;
    let mut reasons = Vec::new();

    // Rule 3: focused, but elsewhere in the app
    if context.window_focused {
        send_native = false;
        reasons.push(SuppressReason::FocusedWindow);
        if policy.suppress_sound_when_focused {
            play_sound = false;
        }
    }

    // Global sound toggle only ever turns sound off, never back on
    if play_sound && !context.sound_enabled {
        play_sound = false;
        reasons.push(SuppressReason::SoundDisabled);
    }

    Ok(NotificationDecision {
        send_native,
        play_sound,
        reasons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> NotificationEvent {
        NotificationEvent::new("c1", "bob", "hi").with_id("e1")
    }

    #[test]
    fn test_unfocused_enables_both() {
        let decision = decide(
            &event(),
            &NotificationContext::default(),
            &DecisionPolicy::default(),
        )
        .unwrap();

        assert!(decision.send_native);
        assert!(decision.play_sound);
        assert!(decision.reasons.is_empty());
    }

    #[test]
    fn test_muted_channel_suppresses_both() {
        let ctx = NotificationContext::default().with_muted("c1");
        let decision = decide(&event(), &ctx, &DecisionPolicy::default()).unwrap();

        assert!(decision.fully_suppressed());
        assert_eq!(decision.reasons, vec![SuppressReason::ChannelMuted]);
    }

    #[test]
    fn test_mute_dominates_focus_state() {
        // Muted wins regardless of focus; no focus reason is appended
        let ctx = NotificationContext::default()
            .with_muted("c1")
            .with_focus(true)
            .with_open_channel("c1");
        let decision = decide(&event(), &ctx, &DecisionPolicy::default()).unwrap();

        assert!(decision.fully_suppressed());
        assert_eq!(decision.reasons, vec![SuppressReason::ChannelMuted]);
    }

    #[test]
    fn test_focused_current_channel_suppresses_both() {
        let ctx = NotificationContext::default()
            .with_focus(true)
            .with_open_channel("c1");
        let decision = decide(&event(), &ctx, &DecisionPolicy::default()).unwrap();

        assert!(decision.fully_suppressed());
        assert_eq!(decision.reasons, vec![SuppressReason::FocusedCurrentChannel]);
    }

    #[test]
    fn test_focused_other_channel_keeps_sound() {
        let ctx = NotificationContext::default()
            .with_focus(true)
            .with_open_channel("c2");
        let decision = decide(&event(), &ctx, &DecisionPolicy::default()).unwrap();

        assert!(!decision.send_native);
        assert!(decision.play_sound);
        assert_eq!(decision.reasons, vec![SuppressReason::FocusedWindow]);
    }

    #[test]
    fn test_focused_no_open_channel_keeps_sound() {
        let ctx = NotificationContext::default().with_focus(true);
        let decision = decide(&event(), &ctx, &DecisionPolicy::default()).unwrap();

        assert!(!decision.send_native);
        assert!(decision.play_sound);
        assert_eq!(decision.reasons, vec![SuppressReason::FocusedWindow]);
    }

    #[test]
    fn test_suppress_sound_when_focused_policy() {
        let ctx = NotificationContext::default()
            .with_focus(true)
            .with_open_channel("c2");
        let policy = DecisionPolicy {
            suppress_sound_when_focused: true,
        };
        let decision = decide(&event(), &ctx, &policy).unwrap();

        assert!(decision.fully_suppressed());
        assert_eq!(decision.reasons, vec![SuppressReason::FocusedWindow]);
    }

    #[test]
    fn test_sound_disabled_only_affects_sound() {
        let ctx = NotificationContext::default().with_sound_enabled(false);
        let decision = decide(&event(), &ctx, &DecisionPolicy::default()).unwrap();

        assert!(decision.send_native);
        assert!(!decision.play_sound);
        assert_eq!(decision.reasons, vec![SuppressReason::SoundDisabled]);
    }

    #[test]
    fn test_focused_window_and_sound_disabled_reason_order() {
        let ctx = NotificationContext::default()
            .with_focus(true)
            .with_sound_enabled(false);
        let decision = decide(&event(), &ctx, &DecisionPolicy::default()).unwrap();

        assert!(decision.fully_suppressed());
        assert_eq!(
            decision.reasons,
            vec![SuppressReason::FocusedWindow, SuppressReason::SoundDisabled]
        );
    }

    #[test]
    fn test_deterministic() {
        let ctx = NotificationContext::default()
            .with_focus(true)
            .with_open_channel("c2");
        let policy = DecisionPolicy::default();
        let a = decide(&event(), &ctx, &policy).unwrap();
        let b = decide(&event(), &ctx, &policy).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_malformed_event_fails_fast() {
        let bad = NotificationEvent::new("", "bob", "hi");
        let result = decide(
            &bad,
            &NotificationContext::default(),
            &DecisionPolicy::default(),
        );
        assert_eq!(result.unwrap_err(), DecisionError::MissingField("channel"));
    }

    #[test]
    fn test_reason_tokens() {
        assert_eq!(SuppressReason::ChannelMuted.as_str(), "channel_muted");
        assert_eq!(
            SuppressReason::FocusedCurrentChannel.as_str(),
            "focused_current_channel"
        );
        assert_eq!(SuppressReason::FocusedWindow.as_str(), "focused_window");
        assert_eq!(SuppressReason::SoundDisabled.as_str(), "sound_disabled");
        assert_eq!(SuppressReason::DryRun.as_str(), "dry_run");
    }

    #[test]
    fn test_reason_serialization_matches_tokens() {
        let json = serde_json::to_string(&SuppressReason::FocusedCurrentChannel).unwrap();
        assert_eq!(json, "\"focused_current_channel\"");
    }
}
