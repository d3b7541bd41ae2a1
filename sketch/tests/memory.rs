//! Execution memory: frame scoping, dump versus pop, console swapping.

use std::io;

use pretty_assertions::assert_eq;

use sketch::instruction::FailureKind;
use sketch::memory::{Buffer, Console, Frame, Memory, Stream, Value};

#[test]
fn unbound_addresses_read_as_null() {
    let memory = Memory::new();
    assert_eq!(memory.get("missing"), Value::Null);
    assert_ne!(Value::text(""), Value::Null);
}

#[test]
fn set_writes_the_base_frame() {
    let mut memory = Memory::new();
    memory.push_frame(Frame::new());
    memory.push_frame(Frame::new());
    memory.set("x", Value::text("1"));
    memory.pop_frame();
    memory.pop_frame();
    assert_eq!(memory.depth(), 1);
    assert_eq!(memory.get("x"), Value::text("1"));
}

#[test]
fn bindings_in_a_popped_frame_disappear() {
    let mut memory = Memory::new();
    memory.set("x", Value::text("outer"));
    memory.push_frame(Frame::owned_by("test"));
    memory.bind("y", Value::text("inner"));
    memory.bind("x", Value::text("shadow"));
    assert_eq!(memory.get("x"), Value::text("shadow"));
    assert_eq!(memory.get("y"), Value::text("inner"));

    let popped = memory.pop_frame();
    assert_eq!(popped.owner(), Some("test"));
    assert_eq!(memory.get("y"), Value::Null);
    assert_eq!(memory.get("x"), Value::text("outer"));
}

#[test]
fn dumped_frames_merge_into_the_caller() {
    let mut memory = Memory::new();
    memory.push_frame(Frame::new());
    memory.push_frame(Frame::new());
    memory.bind("y", Value::text("inner"));
    memory.push_value(Value::text("left over"));

    let dumped = memory.dump_frame();
    assert_eq!(dumped.stack(), &[Value::text("left over")]);
    assert_eq!(dumped.heap().get("y"), Some(&Value::text("inner")));
    assert!(memory.frames()[1].contains("y"));
    assert_eq!(memory.depth(), 2);
    assert_eq!(memory.get("y"), Value::text("inner"));
    assert_eq!(memory.peek_value(), Some(&Value::text("left over")));

    memory.pop_frame();
    assert_eq!(memory.get("y"), Value::Null);
}

#[test]
fn dumping_the_last_frame_keeps_its_bindings() {
    let mut memory = Memory::new();
    memory.bind("x", Value::text("kept"));
    memory.dump_frame();
    assert_eq!(memory.depth(), 1);
    assert_eq!(memory.get("x"), Value::text("kept"));
}

#[test]
fn the_frame_stack_is_never_empty() {
    let mut memory = Memory::new();
    memory.set("x", Value::text("gone"));
    memory.pop_frame();
    assert_eq!(memory.depth(), 1);
    assert_eq!(memory.get("x"), Value::Null);
    memory.pop_frame();
    assert_eq!(memory.depth(), 1);
}

#[test]
fn value_stack_is_per_frame() {
    let mut memory = Memory::new();
    memory.push_value(Value::text("base"));
    memory.push_frame(Frame::new());
    assert_eq!(memory.pop_value(), Value::Null);
    memory.push_value(Value::text("top"));
    assert_eq!(memory.pop_value(), Value::text("top"));
    memory.pop_frame();
    assert_eq!(memory.pop_value(), Value::text("base"));
}

#[test]
fn compute_updates_the_nearest_binding() {
    let mut memory = Memory::new();
    memory.set("n", Value::text("a"));
    memory.push_frame(Frame::new());
    memory.bind("n", Value::text("b"));

    let result = memory.compute("n", |value| Value::text(format!("{}!", value)));
    assert_eq!(result, Value::text("b!"));
    memory.pop_frame();
    assert_eq!(memory.get("n"), Value::text("a"));
}

#[test]
fn compute_reaches_a_base_binding_through_inner_frames() {
    let mut memory = Memory::new();
    memory.set("x", Value::text("v1"));
    memory.push_frame(Frame::new());
    memory.compute("x", |value| Value::text(format!("{}+", value)));
    assert!(!memory.frames()[1].contains("x"));
    memory.pop_frame();
    assert_eq!(memory.get("x"), Value::text("v1+"));
}

#[test]
fn compute_on_a_missing_address_stores_in_the_base_frame() {
    let mut memory = Memory::new();
    memory.push_frame(Frame::new());
    let result = memory.compute("count", |value| {
        assert!(value.is_null());
        Value::text("1")
    });
    assert_eq!(result, Value::text("1"));
    memory.pop_frame();
    assert_eq!(memory.get("count"), Value::text("1"));
}

#[test]
fn print_goes_to_the_console() {
    let buffer = Buffer::new();
    let mut memory = Memory::with_console(Box::new(buffer.clone()));
    memory.print("Hello, ").expect("print");
    memory.print("world").expect("print");
    assert_eq!(buffer.contents(), "Hello, world");
}

#[test]
fn set_console_closes_the_previous_one() {
    let first = Buffer::new();
    let second = Buffer::new();
    let mut memory = Memory::with_console(Box::new(first.clone()));
    memory.print("one").expect("print");
    memory.set_console(Box::new(second.clone())).expect("close");
    memory.print("two").expect("print");

    assert!(first.is_closed());
    assert!(!second.is_closed());
    assert_eq!(first.contents(), "one");
    assert_eq!(second.contents(), "two");
}

#[test]
fn replace_console_hands_back_an_open_console() {
    let first = Buffer::new();
    let mut memory = Memory::with_console(Box::new(first.clone()));
    let mut previous = memory.replace_console(Box::new(Buffer::new()));
    assert!(!first.is_closed());
    previous.write("still open").expect("write");
    assert_eq!(first.contents(), "still open");
}

#[test]
fn printing_to_a_closed_console_fails() {
    let mut buffer = Buffer::new();
    buffer.close().expect("close");
    let mut memory = Memory::with_console(Box::new(buffer));
    let error = memory.print("lost").unwrap_err();
    assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
}

#[test]
fn stream_console_writes_bytes() {
    let mut stream = Stream::new(Vec::new());
    stream.write("abc").expect("write");
    stream.close().expect("flush");
    assert_eq!(stream.into_inner(), b"abc".to_vec());
}

#[test]
fn step_limit() {
    let mut memory = Memory::new().with_step_limit(2);
    assert!(memory.tick().is_ok());
    assert!(memory.tick().is_ok());
    let failure = memory.tick().unwrap_err();
    assert!(matches!(failure.kind, FailureKind::StepLimit(2)));
    assert_eq!(memory.steps(), 3);

    let mut unlimited = Memory::new();
    for _ in 0..10_000 {
        assert!(unlimited.tick().is_ok());
    }
}
