//! main_maker - build the LLVM IR of a "Hello, world!" program.
//!
//! The crate drives LLVM through inkwell to construct a module named `top`
//! holding `void main()`, whose single `entrypoint` block calls
//! `puts("Hello, world!\n")` and returns. The module can then be printed in
//! LLVM's textual notation or lowered to bitcode, assembly or an object file.
//!
//! # Primary Usage
//!
//! ```ignore
//! use inkwell::context::Context;
//! use main_maker::{emit_module, render_ir, EmitterConfig};
//!
//! let context = Context::create();
//! let module = emit_module(&context, &EmitterConfig::default())?;
//! print!("{}", render_ir(&module));
//! ```
//!
//! # Architecture
//!
//! - [`emitter`] - Step-by-step module construction
//! - [`render`] - Textual rendering, verification and artifact output
//! - [`config`] - Names, output formats and destinations
//! - [`error`] - Error types

pub mod config;
pub mod emitter;
pub mod error;
pub mod render;

pub use config::{Destination, EmitterConfig, OutputFormat};
pub use emitter::{emit_module, DemoEmitter};
pub use error::{EmitError, EmitResult};
pub use render::{artifact_bytes, llvm_version, render_ir, verify, write_artifact};
