use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};

use lauter::{
    Booster, ContextState, ControlState, Document, DomNode, MediaElement, Output, Responder,
    SourceError, StateController,
};

const SAMPLE_RATE: u32 = 48_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A booster wired to a ring buffer sink, plus the consumer half to listen on.
fn booster_with(document: &Rc<Document>) -> (Booster, rtrb::Consumer<f32>) {
    let (producer, consumer) = rtrb::RingBuffer::new(1 << 18);
    let booster = Booster::new(document.clone(), Output::rtrb(producer), SAMPLE_RATE);
    (booster, consumer)
}

/// A responder that records its (serialized) response for inspection.
fn capture() -> (Responder, Rc<RefCell<Option<Value>>>) {
    let slot = Rc::new(RefCell::new(None));
    let slot_cb = slot.clone();
    let responder = Responder::new(move |response| {
        *slot_cb.borrow_mut() = Some(serde_json::to_value(response).unwrap());
    });
    (responder, slot)
}

fn looping_tone(amplitude: f32) -> Rc<MediaElement> {
    Rc::new(MediaElement::audio(vec![amplitude; 1024]).looping())
}

#[test]
fn initial_state_is_disabled_at_100() {
    let document = Document::new();
    let (booster, _consumer) = booster_with(&document);

    assert_eq!(
        booster.state(),
        ControlState {
            enabled: false,
            percent: 100.0
        }
    );
    // Nothing has needed the audio graph yet
    assert_eq!(booster.context_state(), None);
}

#[test]
fn discovery_is_idempotent() {
    init_tracing();
    let document = Document::new();
    document.append_all([
        DomNode::Media(looping_tone(0.1)),
        DomNode::Other("div"),
        DomNode::Media(looping_tone(0.2)),
    ]);

    // Drive the controller directly so the graph's node count is visible:
    // amp + sink + one source per routed element.
    let (producer, _consumer) = rtrb::RingBuffer::new(1 << 12);
    let controller = Rc::new(RefCell::new(StateController::new(
        &document,
        Output::rtrb(producer),
        SAMPLE_RATE,
    )));

    controller.borrow_mut().set_state(true, 200.0);
    assert_eq!(controller.borrow_mut().routed_count(), 2);
    assert_eq!(controller.borrow().node_count(), 4);

    // Same unchanged DOM, rediscovered twice more: nothing new connects
    controller.borrow_mut().discover();
    controller.borrow_mut().set_state(true, 200.0);
    assert_eq!(controller.borrow_mut().routed_count(), 2);
    assert_eq!(controller.borrow().node_count(), 4);
}

#[test]
fn dynamically_inserted_media_is_connected() {
    init_tracing();
    let document = Document::new();
    let (booster, _consumer) = booster_with(&document);
    assert_eq!(booster.connected_elements(), 0);

    // No explicit call on the booster: the mutation alone triggers discovery
    document.append(DomNode::Media(looping_tone(0.1)));
    assert_eq!(booster.connected_elements(), 1);

    // A batch insert costs one discovery pass and connects both
    document.append_all([
        DomNode::Media(looping_tone(0.1)),
        DomNode::Media(looping_tone(0.1)),
    ]);
    assert_eq!(booster.connected_elements(), 3);
}

#[test]
fn cross_origin_media_stays_unrouted() {
    let document = Document::new();
    let (booster, _consumer) = booster_with(&document);

    document.append(DomNode::Media(Rc::new(
        MediaElement::audio(vec![0.5; 256]).cross_origin(),
    )));
    booster.set_state(true, 100.0);
    booster.set_state(true, 100.0);

    // Retried every pass, fails identically, never fatal
    assert_eq!(booster.connected_elements(), 0);
}

#[test]
fn routed_element_cannot_be_bound_again() {
    let document = Document::new();
    let (booster, _consumer) = booster_with(&document);

    let element = looping_tone(0.1);
    document.append(DomNode::Media(element.clone()));
    booster.set_state(true, 100.0);
    assert_eq!(booster.connected_elements(), 1);

    assert!(matches!(
        element.create_source(),
        Err(SourceError::AlreadyBound)
    ));
}

#[test]
fn removed_and_readded_element_is_still_recognized() {
    let document = Document::new();
    let (booster, _consumer) = booster_with(&document);

    let element = looping_tone(0.1);
    document.append(DomNode::Media(element.clone()));
    booster.set_state(true, 100.0);
    assert_eq!(booster.connected_elements(), 1);

    // Same identity leaves and comes back: no reconnection attempt
    document.remove_media(&element);
    document.append(DomNode::Media(element.clone()));
    booster.set_state(true, 100.0);
    assert_eq!(booster.connected_elements(), 1);
}

#[test]
fn dropped_elements_fall_out_of_the_routed_set() {
    let document = Document::new();
    let (booster, _consumer) = booster_with(&document);

    let keeper = looping_tone(0.1);
    document.append(DomNode::Media(keeper.clone()));
    {
        let transient = looping_tone(0.2);
        document.append(DomNode::Media(transient.clone()));
        booster.set_state(true, 100.0);
        assert_eq!(booster.connected_elements(), 2);
        document.remove_media(&transient);
    }
    // The transient element is gone; membership never extended its lifetime
    assert_eq!(booster.connected_elements(), 1);
}

#[test]
fn rapid_updates_leave_only_the_last_target() {
    init_tracing();
    let document = Document::new();
    document.append(DomNode::Media(looping_tone(0.25)));
    let (booster, mut consumer) = booster_with(&document);

    document.dispatch_gesture();
    booster.set_state(true, 100.0);
    booster.set_state(true, 50.0);
    booster.set_state(true, 900.0);

    // Only the final target is scheduled
    assert_eq!(booster.scheduled_gain(), Some(9.0));

    // ~1.3s of audio: dozens of time constants, fully converged on 9x
    for _ in 0..1000 {
        booster.process();
    }
    let mut last = 0.0;
    while let Ok(sample) = consumer.pop() {
        last = sample;
    }
    assert!(
        (last - 0.25 * 9.0).abs() < 1e-3,
        "expected ~2.25, got {last}"
    );
}

#[test]
fn disabling_ramps_back_to_unity() {
    let document = Document::new();
    document.append(DomNode::Media(looping_tone(0.25)));
    let (booster, mut consumer) = booster_with(&document);

    document.dispatch_gesture();
    booster.set_state(true, 300.0);
    for _ in 0..500 {
        booster.process();
    }
    booster.set_state(false, 300.0);
    assert_eq!(booster.scheduled_gain(), Some(1.0));

    for _ in 0..1000 {
        booster.process();
    }
    let mut last = 0.0;
    while let Ok(sample) = consumer.pop() {
        last = sample;
    }
    // Unity gain: the source's own amplitude
    assert!((last - 0.25).abs() < 1e-3, "expected ~0.25, got {last}");
    // The percent is remembered, just not applied
    assert_eq!(booster.state().percent, 300.0);
}

#[test]
fn nan_percent_collapses_to_silence() {
    let document = Document::new();
    let (booster, _consumer) = booster_with(&document);

    booster.set_state(true, f64::NAN);
    assert_eq!(booster.state().percent, 0.0);
    assert_eq!(booster.scheduled_gain(), Some(0.0));
}

#[test]
fn ping_answers_ok() {
    let document = Document::new();
    let (booster, _consumer) = booster_with(&document);

    let (responder, reply) = capture();
    assert!(booster.on_message(&json!({"type": "PING"}), responder));
    assert_eq!(*reply.borrow(), Some(json!({"ok": true})));
    // Liveness probe only: no state change, no graph construction
    assert_eq!(booster.context_state(), None);
}

#[test]
fn set_state_then_get_state_round_trips() {
    let document = Document::new();
    let (booster, _consumer) = booster_with(&document);

    let (responder, reply) = capture();
    assert!(booster.on_message(
        &json!({"type": "SET_STATE", "enabled": true, "percent": 250}),
        responder
    ));
    assert_eq!(*reply.borrow(), Some(json!({"ok": true})));

    let (responder, reply) = capture();
    assert!(booster.on_message(&json!({"type": "GET_STATE"}), responder));
    assert_eq!(
        *reply.borrow(),
        Some(json!({"enabled": true, "percent": 250.0}))
    );
}

#[test]
fn malformed_percent_normalizes_to_zero() {
    let document = Document::new();
    let (booster, _consumer) = booster_with(&document);

    let (responder, _reply) = capture();
    booster.on_message(
        &json!({"type": "SET_STATE", "enabled": true, "percent": "abc"}),
        responder,
    );

    assert_eq!(
        booster.state(),
        ControlState {
            enabled: true,
            percent: 0.0
        }
    );
    assert_eq!(booster.scheduled_gain(), Some(0.0));
}

#[test]
fn out_of_range_wire_percent_is_clamped() {
    let document = Document::new();
    let (booster, _consumer) = booster_with(&document);

    let (responder, _reply) = capture();
    booster.on_message(
        &json!({"type": "SET_STATE", "enabled": true, "percent": 1000}),
        responder,
    );
    assert_eq!(booster.state().percent, 900.0);
    assert_eq!(booster.scheduled_gain(), Some(9.0));

    let (responder, _reply) = capture();
    booster.on_message(
        &json!({"type": "SET_STATE", "enabled": true, "percent": -5}),
        responder,
    );
    assert_eq!(booster.state().percent, 0.0);
}

#[test]
fn unknown_messages_are_left_unanswered() {
    let document = Document::new();
    let (booster, _consumer) = booster_with(&document);

    let (responder, reply) = capture();
    assert!(!booster.on_message(&json!({"type": "SELF_DESTRUCT"}), responder));
    assert_eq!(*reply.borrow(), None);

    let (responder, reply) = capture();
    assert!(!booster.on_message(&json!(["not", "an", "object"]), responder));
    assert_eq!(*reply.borrow(), None);
}

#[test]
fn end_to_end_boost_suspend_resume() {
    init_tracing();
    let document = Document::new();
    document.append(DomNode::Media(looping_tone(0.25)));
    let (booster, mut consumer) = booster_with(&document);

    // Fresh state
    assert_eq!(
        booster.state(),
        ControlState {
            enabled: false,
            percent: 100.0
        }
    );

    // Enable at 300% before any user gesture: gain is scheduled, but the
    // platform keeps the context suspended
    let (responder, reply) = capture();
    booster.on_message(
        &json!({"type": "SET_STATE", "enabled": true, "percent": 300}),
        responder,
    );
    assert_eq!(*reply.borrow(), Some(json!({"ok": true})));
    assert_eq!(booster.scheduled_gain(), Some(3.0));
    assert_eq!(booster.context_state(), Some(ContextState::Suspended));

    // Suspension pauses processing entirely
    for _ in 0..8 {
        booster.process();
    }
    assert!(consumer.pop().is_err());

    // First gesture resumes the context without any further command
    document.dispatch_gesture();
    assert_eq!(booster.context_state(), Some(ContextState::Running));
    for _ in 0..8 {
        booster.process();
    }
    assert!(consumer.pop().is_ok());

    // Disable: effective gain back to unity, stored percent untouched
    let (responder, _reply) = capture();
    booster.on_message(
        &json!({"type": "SET_STATE", "enabled": false, "percent": 300}),
        responder,
    );
    assert_eq!(booster.scheduled_gain(), Some(1.0));

    let (responder, reply) = capture();
    booster.on_message(&json!({"type": "GET_STATE"}), responder);
    assert_eq!(
        *reply.borrow(),
        Some(json!({"enabled": false, "percent": 300.0}))
    );
}
