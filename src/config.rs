//! Emitter configuration.
//!
//! The defaults reproduce the fixed demo program: a module `top` holding
//! `void main()` whose `entrypoint` block calls `puts("Hello, world!\n")`.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::error::{EmitError, EmitResult};

/// Names and text used while building the demo module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterConfig {
    /// Module identifier, printed as `; ModuleID = '...'`.
    pub module_name: String,

    /// Name of the defined function.
    pub function_name: String,

    /// Label of the single basic block.
    pub entry_label: String,

    /// Text stored in the global string constant (without the trailing NUL).
    pub message: String,

    /// External `puts`-like routine the function calls.
    pub callee: String,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            module_name: "top".to_string(),
            function_name: "main".to_string(),
            entry_label: "entrypoint".to_string(),
            message: "Hello, world!\n".to_string(),
            callee: "puts".to_string(),
        }
    }
}

impl EmitterConfig {
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = name.into();
        self
    }

    pub fn with_entry_label(mut self, label: impl Into<String>) -> Self {
        self.entry_label = label.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_callee(mut self, callee: impl Into<String>) -> Self {
        self.callee = callee.into();
        self
    }

    /// Length in bytes of the emitted string constant, NUL included.
    pub fn message_len(&self) -> usize {
        self.message.len() + 1
    }

    /// Check that every name can be handed to LLVM as a C string.
    ///
    /// The message is exempt: it is emitted from its bytes.
    pub fn validate(&self) -> EmitResult<()> {
        let names = [
            ("module name", &self.module_name),
            ("function name", &self.function_name),
            ("entry label", &self.entry_label),
            ("callee", &self.callee),
        ];
        for (field, name) in names {
            if name.contains('\0') {
                return Err(EmitError::InvalidName {
                    field,
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Artifact kinds the module can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable LLVM assembly.
    #[default]
    LlvmIr,
    /// LLVM bitcode.
    Bitcode,
    /// Target assembly.
    Assembly,
    /// Relocatable object file.
    Object,
}

impl OutputFormat {
    /// Whether this format needs a target machine.
    pub fn needs_target(self) -> bool {
        matches!(self, OutputFormat::Assembly | OutputFormat::Object)
    }
}

/// Where the rendered artifact goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Destination {
    #[default]
    Stdout,
    /// Standard error, the convention of LLVM's own module dump.
    Stderr,
    File(PathBuf),
}

impl Destination {
    /// A file path wins over `--stderr`; neither means stdout.
    pub fn from_args(output: Option<PathBuf>, stderr: bool) -> Self {
        match output {
            Some(path) => Destination::File(path),
            None if stderr => Destination::Stderr,
            None => Destination::Stdout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_demo_program() {
        let config = EmitterConfig::default();
        assert_eq!(config.module_name, "top");
        assert_eq!(config.function_name, "main");
        assert_eq!(config.entry_label, "entrypoint");
        assert_eq!(config.message, "Hello, world!\n");
        assert_eq!(config.callee, "puts");
        assert_eq!(config.message_len(), 15);
    }

    #[test]
    fn builder_setters_override_fields() {
        let config = EmitterConfig::default()
            .with_module_name("demo")
            .with_function_name("start")
            .with_entry_label("entry")
            .with_message("hi")
            .with_callee("write_line");
        assert_eq!(config.module_name, "demo");
        assert_eq!(config.function_name, "start");
        assert_eq!(config.entry_label, "entry");
        assert_eq!(config.message_len(), 3);
        assert_eq!(config.callee, "write_line");
    }

    #[test]
    fn validate_rejects_nul_in_names() {
        assert!(EmitterConfig::default().validate().is_ok());
        assert!(EmitterConfig::default().with_message("ab\0cd").validate().is_ok());

        let err = EmitterConfig::default()
            .with_entry_label("entry\0point")
            .validate()
            .unwrap_err();
        assert!(matches!(err, EmitError::InvalidName { field: "entry label", .. }));
    }

    #[test]
    fn destination_prefers_file() {
        assert_eq!(Destination::from_args(None, false), Destination::Stdout);
        assert_eq!(Destination::from_args(None, true), Destination::Stderr);
        assert_eq!(
            Destination::from_args(Some(PathBuf::from("out.ll")), true),
            Destination::File(PathBuf::from("out.ll"))
        );
    }

    #[test]
    fn only_machine_formats_need_target() {
        assert!(!OutputFormat::LlvmIr.needs_target());
        assert!(!OutputFormat::Bitcode.needs_target());
        assert!(OutputFormat::Assembly.needs_target());
        assert!(OutputFormat::Object.needs_target());
    }
}
