//! Bytecode extraction from packaged containers.

use bytecode::BytecodeModule;
use container::{ContainerError, ContainerFile, FileLoader, LoadListener};

use crate::writer::ShellWriter;

/// Collects bytecode blocks from the `on_open` callback.
///
/// Symbol and image callbacks are accepted through the listener's
/// defaults and deliberately ignored; extraction only cares about the
/// block list.
#[derive(Default)]
struct BlockCollector {
    modules: Vec<BytecodeModule>,
    bad_block: Option<(String, String)>,
}

impl LoadListener for BlockCollector {
    fn on_open(&mut self, file: &ContainerFile) {
        for (index, block) in file.bytecode_blocks().iter().enumerate() {
            let origin = format!("TAG{}", index);
            match BytecodeModule::parse(&block.data, &origin) {
                Ok(module) => self.modules.push(module),
                Err(error) => {
                    self.bad_block = Some((origin, error.to_string()));
                    return;
                }
            }
        }
    }
}

/// Extracts every embedded bytecode module from a container buffer.
///
/// Blocks are wrapped in discovery order and tagged `TAG<i>` by their
/// zero-based position in the block list. A container with no blocks
/// yields `Some` of an empty vector; a buffer that fails to parse, or a
/// block that is not a valid module, yields `None` after exactly one
/// reported failure. Nothing escapes this boundary as an error.
pub fn extract_bytecode(buffer: &[u8], writer: &ShellWriter) -> Option<Vec<BytecodeModule>> {
    let mut collector = BlockCollector::default();
    let outcome: Result<(), ContainerError> = FileLoader::new(&mut collector).load_bytes(buffer);
    if let Err(error) = outcome {
        writer.error_line(&format!("Cannot parse container, reason: {}", error));
        return None;
    }
    if let Some((origin, reason)) = collector.bad_block {
        writer.error_line(&format!(
            "Cannot parse container, reason: block {} is not a bytecode module: {}",
            origin, reason
        ));
        return None;
    }
    Some(collector.modules)
}
