//! Rendering and writing of the emitted module.
//!
//! The textual form is whatever LLVM prints; this module only chooses the
//! artifact kind and where the bytes go.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use inkwell::module::Module;
use inkwell::targets::{
    CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine, TargetTriple,
};
use inkwell::OptimizationLevel;

use crate::config::{Destination, OutputFormat};
use crate::error::{EmitError, EmitResult};

/// The module in LLVM's human-readable assembly notation.
pub fn render_ir(module: &Module) -> String {
    module.print_to_string().to_string()
}

/// Run the LLVM verifier over the module.
pub fn verify(module: &Module) -> EmitResult<()> {
    module.verify().map_err(|e| EmitError::Verification {
        reason: e.to_string(),
    })
}

/// Version of the linked LLVM as (major, minor, patch).
pub fn llvm_version() -> (u32, u32, u32) {
    let (mut major, mut minor, mut patch) = (0, 0, 0);
    // SAFETY: LLVMGetVersion only writes through the three out-pointers.
    unsafe { llvm_sys::core::LLVMGetVersion(&mut major, &mut minor, &mut patch) };
    (major, minor, patch)
}

/// Create a target machine for `triple`, or for the host when `None`.
///
/// The module is retargeted (triple and data layout) so the IR matches the
/// machine that lowers it.
pub fn target_machine(module: &Module, triple: Option<&str>) -> EmitResult<TargetMachine> {
    let config = InitializationConfig::default();
    let triple = match triple {
        Some(name) => {
            Target::initialize_all(&config);
            TargetTriple::create(name)
        }
        None => {
            Target::initialize_native(&config).map_err(|reason| EmitError::Target { reason })?;
            TargetMachine::get_default_triple()
        }
    };

    let target = Target::from_triple(&triple).map_err(|e| EmitError::Target {
        reason: e.to_string(),
    })?;
    let machine = target
        .create_target_machine(
            &triple,
            "generic",
            "",
            OptimizationLevel::None,
            RelocMode::PIC,
            CodeModel::Default,
        )
        .ok_or_else(|| EmitError::Target {
            reason: format!("no target machine for {}", triple.as_str().to_string_lossy()),
        })?;

    log::debug!("🎯 Target machine for {}", triple.as_str().to_string_lossy());
    module.set_triple(&triple);
    module.set_data_layout(&machine.get_target_data().get_data_layout());
    Ok(machine)
}

/// Produce the bytes of `module` in the requested format.
pub fn artifact_bytes(
    module: &Module,
    format: OutputFormat,
    triple: Option<&str>,
) -> EmitResult<Vec<u8>> {
    if format.needs_target() {
        let machine = target_machine(module, triple)?;
        let file_type = match format {
            OutputFormat::Assembly => FileType::Assembly,
            _ => FileType::Object,
        };
        let buffer = machine
            .write_to_memory_buffer(module, file_type)
            .map_err(|e| EmitError::Target {
                reason: e.to_string(),
            })?;
        return Ok(buffer.as_slice().to_vec());
    }

    if let Some(name) = triple {
        module.set_triple(&TargetTriple::create(name));
    }

    Ok(match format {
        OutputFormat::Bitcode => module.write_bitcode_to_memory().as_slice().to_vec(),
        _ => render_ir(module).into_bytes(),
    })
}

/// Write `module` as `format` to `destination`.
pub fn write_artifact(
    module: &Module,
    format: OutputFormat,
    destination: &Destination,
    triple: Option<&str>,
) -> EmitResult<()> {
    if *destination == Destination::Stderr && format == OutputFormat::LlvmIr && triple.is_none() {
        module.print_to_stderr();
        return Ok(());
    }

    let bytes = artifact_bytes(module, format, triple)?;
    log::trace!("   Writing {} bytes of {:?}", bytes.len(), format);

    match destination {
        Destination::Stdout => write_stream(io::stdout().lock(), &bytes, "<stdout>"),
        Destination::Stderr => write_stream(io::stderr().lock(), &bytes, "<stderr>"),
        Destination::File(path) => write_file(path, &bytes),
    }
}

fn write_stream(mut stream: impl Write, bytes: &[u8], name: &str) -> EmitResult<()> {
    stream
        .write_all(bytes)
        .and_then(|()| stream.flush())
        .map_err(|source| EmitError::Io {
            path: PathBuf::from(name),
            source,
        })
}

fn write_file(path: &Path, bytes: &[u8]) -> EmitResult<()> {
    let io_err = |source: io::Error| EmitError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    fs::write(path, bytes).map_err(io_err)
}
