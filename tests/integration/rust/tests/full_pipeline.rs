//! Full Pipeline Integration Tests
//!
//! Tests the complete flow: container bytes -> loader -> bytecode
//! modules -> VM namespaces -> player ticks on the micro-task queue.
//! This is the most critical integration test suite.

use std::cell::RefCell;
use std::rc::Rc;

use bytecode::BytecodeModule;
use container::ContainerBuilder;
use core_types::DataBuffer;
use player::{Player, PlayerEventSink, PresentationState};
use scheduler::MicroTaskQueue;
use vm::{ExecutionMode, Namespace, VmInstance};

/// Sink that records host commands and frame ticks.
#[derive(Default)]
struct RecordingSink {
    commands: Vec<(String, String)>,
    frames: usize,
}

impl PlayerEventSink for RecordingSink {
    fn on_send_updates(
        &mut self,
        _updates: &DataBuffer,
        _assets: &[DataBuffer],
        sync: bool,
    ) -> Option<DataBuffer> {
        if sync {
            let mut reply = DataBuffer::new();
            reply.write_i32(1);
            reply.write_i32(1);
            reply.write_i32(0);
            reply.write_i32(0);
            Some(reply)
        } else {
            None
        }
    }

    fn on_host_command(&mut self, command: &str, args: &str) {
        self.commands.push((command.to_string(), args.to_string()));
    }

    fn on_frame_processed(&mut self) {
        self.frames += 1;
    }
}

struct Pipeline {
    state: Rc<RefCell<PresentationState>>,
    sink: Rc<RefCell<RecordingSink>>,
    player: Player,
    vm: VmInstance,
    queue: MicroTaskQueue,
}

fn pipeline() -> Pipeline {
    let state = Rc::new(RefCell::new(PresentationState::new()));
    let sink = Rc::new(RefCell::new(RecordingSink::default()));
    let events: Rc<RefCell<dyn PlayerEventSink>> = sink.clone();
    Pipeline {
        player: Player::new(Rc::clone(&state), events),
        state,
        sink,
        vm: VmInstance::new(ExecutionMode::Compile, ExecutionMode::Compile),
        queue: MicroTaskQueue::new(),
    }
}

fn module_bytes(name: &str, defs: &[&str], refs: &[&str]) -> Vec<u8> {
    BytecodeModule::new(
        name,
        defs.iter().map(|s| s.to_string()).collect(),
        refs.iter().map(|s| s.to_string()).collect(),
        vec![0x01],
    )
    .to_bytes()
}

/// Test: a container's bytecode lands in the application namespace and
/// its frames tick on the queue.
#[test]
fn test_container_bytecode_executes_and_frames_tick() {
    let mut p = pipeline();
    let bytes = ContainerBuilder::new()
        .frame_rate(10)
        .bytecode(&module_bytes("ignored", &["movie.Main"], &[]))
        .host_command("trace", "hello")
        .show_frame()
        .build();

    p.player
        .load_bytes("movie.swf", &bytes, &mut p.vm, &mut p.queue)
        .unwrap();
    let ticks = p.queue.run(0, 3);

    assert_eq!(ticks, 3);
    assert_eq!(
        p.vm.definition_of(Namespace::Application, "movie.Main"),
        Some("TAG0")
    );
    assert_eq!(p.sink.borrow().frames, 3);
    assert_eq!(
        p.sink.borrow().commands,
        vec![
            ("trace".to_string(), "hello".to_string()),
            ("trace".to_string(), "hello".to_string()),
            ("trace".to_string(), "hello".to_string()),
        ]
    );
    assert_eq!(p.state.borrow().display_roots()[0].frames_played, 3);
}

/// Test: container bytecode resolves symbols defined earlier in the
/// system namespace, like a bootstrapped builtin.
#[test]
fn test_container_bytecode_links_against_the_system_namespace() {
    let mut p = pipeline();
    let builtin = BytecodeModule::new(
        "builtin",
        vec!["host.Object".to_string()],
        Vec::new(),
        vec![0x01],
    );
    p.vm.execute_in(Namespace::System, &builtin).unwrap();

    let bytes = ContainerBuilder::new()
        .bytecode(&module_bytes("ignored", &["movie.Main"], &["host.Object"]))
        .build();

    p.player
        .load_bytes("movie.swf", &bytes, &mut p.vm, &mut p.queue)
        .unwrap();

    assert_eq!(
        p.vm.executed_modules(Namespace::Application),
        ["TAG0".to_string()]
    );
}

/// Test: blocks in one container execute in stream order and see each
/// other's definitions.
#[test]
fn test_blocks_execute_in_stream_order() {
    let mut p = pipeline();
    let bytes = ContainerBuilder::new()
        .named_bytecode(0, "first", &module_bytes("ignored", &["a.A"], &[]))
        .named_bytecode(0, "second", &module_bytes("ignored", &["b.B"], &["a.A"]))
        .build();

    p.player
        .load_bytes("ordered.swf", &bytes, &mut p.vm, &mut p.queue)
        .unwrap();

    assert_eq!(
        p.vm.executed_modules(Namespace::Application),
        ["first".to_string(), "second".to_string()]
    );
}

/// Test: symbol bindings and image assets from the container surface in
/// the presentation state, and the initial sync flush records metrics.
#[test]
fn test_presentation_state_mirrors_the_container() {
    let mut p = pipeline();
    let bytes = ContainerBuilder::new()
        .symbols(&[(3, "movie.Clip")])
        .image(3, &[0xDE, 0xAD])
        .show_frame()
        .build();

    p.player
        .load_bytes("assets.swf", &bytes, &mut p.vm, &mut p.queue)
        .unwrap();

    let state = p.state.borrow();
    assert_eq!(
        state.clip_registry().get(&3).map(String::as_str),
        Some("movie.Clip")
    );
    assert_eq!(state.decoded_image_count(), 1);
    let metrics = state.last_text_metrics().unwrap();
    assert_eq!(
        (
            metrics.text_width,
            metrics.text_height,
            metrics.offset_x,
            metrics.line_count
        ),
        (1, 1, 0, 0)
    );
}

/// Test: a duration budget bounds virtual time, not wall time.
#[test]
fn test_duration_budget_bounds_virtual_time() {
    let mut p = pipeline();
    let bytes = ContainerBuilder::new().frame_rate(10).show_frame().build();
    p.player
        .load_bytes("clock.swf", &bytes, &mut p.vm, &mut p.queue)
        .unwrap();

    // 100 ms per tick: a 450 ms budget admits ticks at 100..400.
    let ticks = p.queue.run(450, 0);

    assert_eq!(ticks, 4);
    assert_eq!(p.queue.now_ms(), 400);
}

/// Test: requesting a stop from inside a tick ends the run immediately.
#[test]
fn test_stop_signal_ends_the_run_from_inside_a_tick() {
    let mut p = pipeline();
    let bytes = ContainerBuilder::new().frame_rate(10).show_frame().build();
    p.player
        .load_bytes("stoppable.swf", &bytes, &mut p.vm, &mut p.queue)
        .unwrap();

    let stop = p.queue.stop_signal();
    let mut remaining = 2;
    p.queue.schedule_interval(100, move |_queue| {
        remaining -= 1;
        if remaining == 0 {
            stop.request_stop();
        }
    });

    p.queue.run(0, 100);

    assert_eq!(p.state.borrow().display_roots()[0].frames_played, 2);
}
