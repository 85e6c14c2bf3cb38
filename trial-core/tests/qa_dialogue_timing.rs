//! QA tests for reply pacing in the chat dialogue.
//!
//! These tests verify the synchronizer's timing contract:
//! - A reply is never shown before the player's own line finishes revealing
//! - A fast reply waits out the minimum gap after that reveal
//! - A slow reply shows immediately once it arrives
//!
//! Run with: `cargo test -p trial-core --test qa_dialogue_timing`

use trial_core::testing::TestHarness;
use trial_core::{Action, CharacterId, SessionEvent, Surface};

/// Walks into the investigation and opens a dialogue, returning the offset
/// at which the chat is idle and input is enabled.
fn ready_harness(character: CharacterId) -> (TestHarness, u64) {
    let mut harness = TestHarness::new();
    harness.walk_to_investigation(0);
    harness.open_dialogue(character, 101_000);
    (harness, 162_000)
}

fn queued_request_id(harness: &mut TestHarness) -> u64 {
    harness
        .session
        .take_commands()
        .iter()
        .find_map(|c| match c {
            trial_core::Command::RequestReply { request_id, .. } => Some(*request_id),
            _ => None,
        })
        .expect("a reply request should be queued")
}

#[test]
fn qa_fast_reply_waits_for_the_minimum_gap() {
    let (mut harness, t0) = ready_harness(CharacterId::Logos);

    // 17 characters at 50 ms: the user reveal finishes at t0 + 850.
    harness.act(Action::SubmitLine("Were you on site?".into()), t0);
    let request_id = queued_request_id(&mut harness);

    // Reply lands 100 ms after submission, long before the reveal is done.
    harness.event(
        SessionEvent::ReplyArrived {
            character: CharacterId::Logos,
            request_id,
            text: "Yes".into(),
        },
        t0 + 100,
    );

    // Finish the user reveal exactly on schedule.
    harness.pump(t0 + 850);
    assert_eq!(harness.content(Surface::Chat), "Were you on site?");
    assert!(harness.session.is_thinking());

    // The gap has not elapsed: still the user's text.
    harness.pump(t0 + 2849);
    assert_eq!(harness.content(Surface::Chat), "Were you on site?");

    // At finish + 2000 ms the reply starts revealing.
    harness.pump(t0 + 2850);
    assert!(!harness.session.is_thinking());
    harness.pump(t0 + 10_000);
    assert_eq!(harness.content(Surface::Chat), "Yes");
}

#[test]
fn qa_slow_reply_shows_immediately_on_arrival() {
    let (mut harness, t0) = ready_harness(CharacterId::Evan);

    harness.act(Action::SubmitLine("Were you on site?".into()), t0);
    let request_id = queued_request_id(&mut harness);

    harness.pump(t0 + 850);
    assert!(harness.session.is_thinking());

    // Reply arrives 3 seconds after the reveal finished; no extra delay.
    harness.event(
        SessionEvent::ReplyArrived {
            character: CharacterId::Evan,
            request_id,
            text: "Yes, I had just arrived.".into(),
        },
        t0 + 3850,
    );
    harness.pump(t0 + 3850);
    assert!(!harness.session.is_thinking());
    assert!(harness.session.transcript().turns(CharacterId::Evan).len() >= 3);

    harness.pump(t0 + 20_000);
    assert_eq!(harness.content(Surface::Chat), "Yes, I had just arrived.");
}

#[test]
fn qa_input_reenables_only_after_the_reply_reveal() {
    let (mut harness, t0) = ready_harness(CharacterId::Indus);

    harness.act(Action::SubmitLine("Why did you comply?".into()), t0);
    let request_id = queued_request_id(&mut harness);
    assert!(!harness.session.input_enabled());

    harness.event(
        SessionEvent::ReplyArrived {
            character: CharacterId::Indus,
            request_id,
            text: "Management left me no alternative.".into(),
        },
        t0 + 200,
    );

    harness.pump(t0 + 950); // user reveal done (19 chars)
    harness.pump(t0 + 2950); // reply starts
    assert!(!harness.session.input_enabled());

    harness.pump(t0 + 30_000); // reply reveal done
    assert!(harness.session.input_enabled());
}

#[test]
fn qa_failed_reply_reenables_input_without_a_turn() {
    let (mut harness, t0) = ready_harness(CharacterId::Logos);

    harness.act(Action::SubmitLine("Show me entry 4411.".into()), t0);
    let request_id = queued_request_id(&mut harness);
    let turns_before = harness.session.transcript().turns(CharacterId::Logos).len();

    harness.pump(t0 + 5_000);
    harness.event(
        SessionEvent::ReplyFailed {
            character: CharacterId::Logos,
            request_id,
        },
        t0 + 6_000,
    );
    harness.pump(t0 + 6_000);

    assert!(harness.session.input_enabled());
    assert!(!harness.session.is_thinking());
    assert_eq!(
        harness.session.transcript().turns(CharacterId::Logos).len(),
        turns_before
    );
}

#[test]
fn qa_reply_for_an_old_request_is_ignored() {
    let (mut harness, t0) = ready_harness(CharacterId::Evan);

    harness.act(Action::SubmitLine("What did you hear?".into()), t0);
    let request_id = queued_request_id(&mut harness);

    // A reply tagged with a different id must not satisfy the join.
    harness.event(
        SessionEvent::ReplyArrived {
            character: CharacterId::Evan,
            request_id: request_id + 1,
            text: "wrong".into(),
        },
        t0 + 100,
    );
    harness.pump(t0 + 30_000);
    assert!(harness.session.is_thinking());
    assert_ne!(harness.content(Surface::Chat), "wrong");
}
