//! Demo binary: build the "Hello, world!" module and print it.
//!
//! Without arguments the module's LLVM IR goes to stdout. Log records go to
//! stderr and are controlled by `RUST_LOG`.

use std::path::PathBuf;

use clap::Parser;
use inkwell::context::Context;
use main_maker::{
    emit_module, llvm_version, verify, write_artifact, Destination, EmitterConfig, OutputFormat,
};

#[derive(Parser, Debug)]
#[command(version, about = "Print the LLVM IR of a Hello, world! program", long_about = None)]
struct Cli {
    /// Module identifier.
    #[arg(long, default_value = "top")]
    module_name: String,

    /// Name of the defined function.
    #[arg(long, default_value = "main")]
    function_name: String,

    /// Label of the entry block.
    #[arg(long, default_value = "entrypoint")]
    entry_label: String,

    /// Text stored in the global string constant.
    #[arg(long, default_value = "Hello, world!\n")]
    message: String,

    /// External routine called with the message.
    #[arg(long, default_value = "puts")]
    callee: String,

    /// Artifact to produce.
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::LlvmIr)]
    emit: OutputFormat,

    /// Write to a file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Write to stderr, like LLVM's module dump.
    #[arg(long, conflicts_with = "output")]
    stderr: bool,

    /// Run the LLVM verifier before writing.
    #[arg(long)]
    verify: bool,

    /// Target triple for the module (defaults to the host for machine code).
    #[arg(long, value_name = "TRIPLE")]
    target_triple: Option<String>,
}

impl Cli {
    fn emitter_config(&self) -> EmitterConfig {
        EmitterConfig::default()
            .with_module_name(&self.module_name)
            .with_function_name(&self.function_name)
            .with_entry_label(&self.entry_label)
            .with_message(&self.message)
            .with_callee(&self.callee)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let (major, minor, patch) = llvm_version();
    log::debug!("Using LLVM {}.{}.{}", major, minor, patch);

    let context = Context::create();
    let result = emit_module(&context, &cli.emitter_config()).and_then(|module| {
        if cli.verify {
            verify(&module)?;
            log::info!("✅ Module verified");
        }
        let destination = Destination::from_args(cli.output.clone(), cli.stderr);
        write_artifact(&module, cli.emit, &destination, cli.target_triple.as_deref())
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
