//! The headless container player.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use bytecode::BytecodeModule;
use container::{ContainerFile, FileLoader, Frame, LoadListener, SymbolEntry};
use core_types::DataBuffer;
use scheduler::MicroTaskQueue;
use vm::{Namespace, VmInstance};

use crate::error::PlayerError;
use crate::presentation::{DisplayRoot, PresentationState, TextMetrics};

/// Frame rate assumed when a container header declares zero.
const DEFAULT_FRAME_RATE: u16 = 24;

/// Host side of the playback protocol.
///
/// The player calls these synchronously, from load and from frame
/// ticks. Every method has a no-op default.
pub trait PlayerEventSink {
    /// An update buffer flush. A `sync` flush may answer with a reply
    /// buffer; the initial flush reads four `i32` text metrics out of
    /// it. Asynchronous flushes expect no reply.
    fn on_send_updates(
        &mut self,
        _updates: &DataBuffer,
        _assets: &[DataBuffer],
        _sync: bool,
    ) -> Option<DataBuffer> {
        None
    }

    /// A host command reached from the current frame.
    fn on_host_command(&mut self, _command: &str, _args: &str) {}

    /// A frame finished processing.
    fn on_frame_processed(&mut self) {}
}

/// Collects the parsed container and its assets during a load.
#[derive(Default)]
struct CaptureListener {
    file: Option<ContainerFile>,
    symbols: Vec<SymbolEntry>,
    assets: Vec<DataBuffer>,
}

impl LoadListener for CaptureListener {
    fn on_open(&mut self, file: &ContainerFile) {
        self.file = Some(file.clone());
    }

    fn on_symbols_discovered(&mut self, symbols: &[SymbolEntry]) {
        self.symbols.extend_from_slice(symbols);
    }

    fn on_image_bytes(&mut self, _character_id: u16, bytes: &[u8]) {
        self.assets.push(DataBuffer::from_bytes(bytes.to_vec()));
    }
}

/// Loads containers and drives their timelines on the micro-task queue.
pub struct Player {
    state: Rc<RefCell<PresentationState>>,
    sink: Rc<RefCell<dyn PlayerEventSink>>,
    base_url: Option<PathBuf>,
}

impl Player {
    /// A player over shared presentation state and a host sink.
    pub fn new(
        state: Rc<RefCell<PresentationState>>,
        sink: Rc<RefCell<dyn PlayerEventSink>>,
    ) -> Player {
        Player {
            state,
            sink,
            base_url: None,
        }
    }

    /// Uses the directory of `file_path` as the base for relative asset
    /// references.
    pub fn set_base_url(&mut self, file_path: &Path) {
        self.base_url = file_path.parent().map(Path::to_path_buf);
    }

    /// Resolves an asset reference against the base URL. Absolute paths
    /// pass through unchanged.
    pub fn resolve_url(&self, reference: &str) -> PathBuf {
        let candidate = Path::new(reference);
        if candidate.is_absolute() {
            return candidate.to_path_buf();
        }
        match &self.base_url {
            Some(base) => base.join(candidate),
            None => candidate.to_path_buf(),
        }
    }

    /// Reads a container from disk and loads it.
    pub fn load_file(
        &mut self,
        path: &Path,
        vm: &mut VmInstance,
        queue: &mut MicroTaskQueue,
    ) -> Result<(), PlayerError> {
        let bytes = std::fs::read(path).map_err(|error| PlayerError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        self.set_base_url(path);
        let name = path.display().to_string();
        self.load_bytes(&name, &bytes, vm, queue)
    }

    /// Loads a container from memory under `name`.
    ///
    /// Bytecode blocks execute immediately in the application namespace,
    /// in stream order; anonymous blocks are tagged `TAG<i>` by their
    /// zero-based position. One synchronous update flush follows, then a
    /// frame tick is scheduled every `1000 / frame_rate` virtual
    /// milliseconds. Zero-frame movies schedule nothing.
    pub fn load_bytes(
        &mut self,
        name: &str,
        bytes: &[u8],
        vm: &mut VmInstance,
        queue: &mut MicroTaskQueue,
    ) -> Result<(), PlayerError> {
        let mut listener = CaptureListener::default();
        FileLoader::new(&mut listener).load_bytes(bytes)?;
        let Some(file) = listener.file.take() else {
            return Ok(());
        };

        let frame_rate = if file.frame_rate() == 0 {
            DEFAULT_FRAME_RATE
        } else {
            file.frame_rate()
        };
        let root_index = {
            let mut state = self.state.borrow_mut();
            for symbol in &listener.symbols {
                state.bind_clip(symbol.character_id, &symbol.name);
            }
            for _ in 0..listener.assets.len() {
                state.note_decoded_image();
            }
            state.add_root(DisplayRoot {
                movie_name: name.to_string(),
                frame_rate,
                frame_count: file.frame_count(),
                current_frame: 0,
                frames_played: 0,
            })
        };

        for (index, block) in file.bytecode_blocks().iter().enumerate() {
            let origin = block
                .name
                .clone()
                .unwrap_or_else(|| format!("TAG{}", index));
            let module = BytecodeModule::parse(&block.data, &origin).map_err(|error| {
                PlayerError::Module {
                    block: origin.clone(),
                    error,
                }
            })?;
            vm.execute_in(Namespace::Application, &module)?;
        }

        self.flush_initial_updates(name, &file, &listener.assets);

        if !file.frames().is_empty() {
            self.schedule_ticks(queue, root_index, file.frames().to_vec(), frame_rate);
        }
        Ok(())
    }

    /// One synchronous flush after load. The reply, when the host gives
    /// one, carries the measured text metrics.
    fn flush_initial_updates(&self, name: &str, file: &ContainerFile, assets: &[DataBuffer]) {
        let mut updates = DataBuffer::new();
        updates.write_cstring(name);
        updates.write_u16(file.frame_rate());
        updates.write_u16(file.frame_count());
        let reply = self.sink.borrow_mut().on_send_updates(&updates, assets, true);
        if let Some(reply) = reply {
            if let Some(metrics) = parse_text_metrics(reply) {
                self.state.borrow_mut().set_text_metrics(metrics);
            }
        }
    }

    fn schedule_ticks(
        &self,
        queue: &mut MicroTaskQueue,
        root_index: usize,
        frames: Vec<Frame>,
        frame_rate: u16,
    ) {
        // Never a zero-length interval, whatever the header claims.
        let interval = (1000 / u64::from(frame_rate.max(1))).max(1);
        let state = Rc::clone(&self.state);
        let sink = Rc::clone(&self.sink);
        queue.schedule_interval(interval, move |_queue| {
            let frame_index = match state.borrow().display_roots().get(root_index) {
                Some(root) => root.current_frame,
                // The presentation was reset under a stale tick.
                None => return,
            };
            if let Some(frame) = frames.get(frame_index) {
                for command in &frame.commands {
                    sink.borrow_mut().on_host_command(&command.command, &command.args);
                }
            }
            sink.borrow_mut().on_frame_processed();
            let mut updates = DataBuffer::new();
            updates.write_u32(frame_index as u32);
            sink.borrow_mut().on_send_updates(&updates, &[], false);
            let mut state = state.borrow_mut();
            if let Some(root) = state.root_mut(root_index) {
                root.frames_played += 1;
                root.current_frame = (root.current_frame + 1) % frames.len();
            }
        });
    }
}

fn parse_text_metrics(mut reply: DataBuffer) -> Option<TextMetrics> {
    reply.set_position(0);
    let text_width = reply.read_i32().ok()?;
    let text_height = reply.read_i32().ok()?;
    let offset_x = reply.read_i32().ok()?;
    let line_count = reply.read_i32().ok()?;
    Some(TextMetrics {
        text_width,
        text_height,
        offset_x,
        line_count,
    })
}
