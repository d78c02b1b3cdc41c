// This module builds the demo module with inkwell. DemoEmitter borrows an LLVM
// context, owns the module and an IR builder, and exposes one method per step of
// the construction: define the entry function, append and enter its block,
// create the global message string, declare the external puts-like routine,
// emit the call and emit the void return. emit_module runs those steps in order
// and hands back the finished module. Builder failures are propagated as
// EmitError values instead of being unwrapped.

//! Construction of the "Hello, world!" module.
//!
//! # Example
//! ```ignore
//! use inkwell::context::Context;
//! use main_maker::{emit_module, EmitterConfig};
//!
//! let context = Context::create();
//! let module = emit_module(&context, &EmitterConfig::default())?;
//! print!("{}", module.print_to_string().to_string());
//! ```

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::types::FunctionType;
use inkwell::values::{CallSiteValue, FunctionValue, InstructionValue, PointerValue};
use inkwell::AddressSpace;

use crate::config::EmitterConfig;
use crate::error::{EmitError, EmitResult};

/// Step-by-step builder for the demo module.
pub struct DemoEmitter<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    config: EmitterConfig,
}

impl<'ctx> DemoEmitter<'ctx> {
    /// Create the named module and an IR builder inside `context`.
    pub fn new(context: &'ctx Context, config: EmitterConfig) -> EmitResult<Self> {
        config.validate()?;
        log::debug!("📦 Creating module '{}'", config.module_name);
        let module = context.create_module(&config.module_name);
        let builder = context.create_builder();

        Ok(Self {
            context,
            module,
            builder,
            config,
        })
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    /// Add `void <function_name>()` with external linkage.
    pub fn define_function(&self) -> FunctionValue<'ctx> {
        let fn_type = self.context.void_type().fn_type(&[], false);
        log::debug!("🔧 Defining function @{}", self.config.function_name);
        self.module
            .add_function(&self.config.function_name, fn_type, Some(Linkage::External))
    }

    /// Append the entry block to `function` and move the builder to its end.
    pub fn append_entry_block(&self, function: FunctionValue<'ctx>) -> BasicBlock<'ctx> {
        let block = self
            .context
            .append_basic_block(function, &self.config.entry_label);
        self.builder.position_at_end(block);
        block
    }

    /// Create the private global holding the message and return its address.
    ///
    /// The constant is built from the message bytes, so interior NULs are
    /// kept and the array is always `message_len()` bytes long.
    pub fn build_message(&self) -> EmitResult<PointerValue<'ctx>> {
        let text = self.context.const_string(self.config.message.as_bytes(), true);
        let global = self.module.add_global(text.get_type(), None, "");
        global.set_linkage(Linkage::Private);
        global.set_unnamed_addr(true);
        global.set_constant(true);
        global.set_alignment(1);
        global.set_initializer(&text);

        log::trace!(
            "   Global string constant of {} bytes",
            self.config.message_len()
        );
        Ok(global.as_pointer_value())
    }

    /// Signature of the external routine: `i32 (ptr)`.
    pub fn callee_type(&self) -> FunctionType<'ctx> {
        let ptr_type = self.context.ptr_type(AddressSpace::default());
        self.context.i32_type().fn_type(&[ptr_type.into()], false)
    }

    /// Get or insert the declaration of the external routine.
    pub fn declare_callee(&self) -> EmitResult<FunctionValue<'ctx>> {
        let callee_type = self.callee_type();

        if let Some(existing) = self.module.get_function(&self.config.callee) {
            if existing.get_type() != callee_type {
                return Err(EmitError::SignatureMismatch {
                    name: self.config.callee.clone(),
                });
            }
            return Ok(existing);
        }

        log::debug!("🔧 Declaring external @{}", self.config.callee);
        Ok(self.module.add_function(&self.config.callee, callee_type, None))
    }

    /// Call `callee` with the message pointer as its only argument.
    pub fn build_call(
        &self,
        callee: FunctionValue<'ctx>,
        message: PointerValue<'ctx>,
    ) -> EmitResult<CallSiteValue<'ctx>> {
        let call = self.builder.build_call(callee, &[message.into()], "")?;
        Ok(call)
    }

    /// Terminate the current block with `ret void`.
    pub fn build_return(&self) -> EmitResult<InstructionValue<'ctx>> {
        Ok(self.builder.build_return(None)?)
    }

    pub fn finish(self) -> Module<'ctx> {
        self.module
    }
}

/// Build the whole demo module in `context`.
pub fn emit_module<'ctx>(
    context: &'ctx Context,
    config: &EmitterConfig,
) -> EmitResult<Module<'ctx>> {
    let emitter = DemoEmitter::new(context, config.clone())?;

    let function = emitter.define_function();
    emitter.append_entry_block(function);

    let message = emitter.build_message()?;
    let callee = emitter.declare_callee()?;
    emitter.build_call(callee, message)?;
    emitter.build_return()?;

    log::info!(
        "Emitted @{} in module '{}'",
        config.function_name,
        config.module_name
    );
    Ok(emitter.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell::values::InstructionOpcode;

    #[test]
    fn entry_block_ends_in_single_terminator() {
        let context = Context::create();
        let module = emit_module(&context, &EmitterConfig::default()).unwrap();

        let main = module.get_function("main").unwrap();
        assert_eq!(main.count_params(), 0);
        assert_eq!(main.count_basic_blocks(), 1);

        let entry = main.get_first_basic_block().unwrap();
        assert_eq!(entry.get_name().to_str().unwrap(), "entrypoint");

        let opcodes: Vec<_> = entry.get_instructions().map(|i| i.get_opcode()).collect();
        assert_eq!(opcodes, vec![InstructionOpcode::Call, InstructionOpcode::Return]);
        assert_eq!(
            entry.get_terminator().map(|t| t.get_opcode()),
            Some(InstructionOpcode::Return)
        );
    }

    #[test]
    fn callee_is_a_bodiless_declaration() {
        let context = Context::create();
        let module = emit_module(&context, &EmitterConfig::default()).unwrap();

        let puts = module.get_function("puts").unwrap();
        assert_eq!(puts.count_basic_blocks(), 0);
        assert_eq!(puts.count_params(), 1);
        assert!(puts.get_type().get_return_type().unwrap().is_int_type());
    }

    #[test]
    fn declare_callee_reuses_existing_declaration() {
        let context = Context::create();
        let emitter = DemoEmitter::new(&context, EmitterConfig::default()).unwrap();

        let first = emitter.declare_callee().unwrap();
        let second = emitter.declare_callee().unwrap();
        assert_eq!(first, second);
        assert_eq!(emitter.module().get_functions().count(), 1);
    }

    #[test]
    fn message_with_interior_nul_keeps_every_byte() {
        let context = Context::create();
        let config = EmitterConfig::default().with_message("ab\0cd");
        let module = emit_module(&context, &config).unwrap();

        let global = module.get_first_global().unwrap();
        let array = global.get_initializer().unwrap().into_array_value();
        assert_eq!(array.get_type().len() as usize, config.message_len());
        assert_eq!(config.message_len(), 6);
        assert!(module.print_to_string().to_string().contains(r#"[6 x i8] c"ab\00cd\00""#));
    }

    #[test]
    fn nul_in_function_name_is_rejected() {
        let context = Context::create();
        let config = EmitterConfig::default().with_function_name("ma\0in");

        let err = emit_module(&context, &config).unwrap_err();
        assert!(matches!(err, EmitError::InvalidName { field: "function name", .. }));
    }

    #[test]
    fn callee_clashing_with_defined_function_is_rejected() {
        let context = Context::create();
        let config = EmitterConfig::default().with_callee("main");

        let err = emit_module(&context, &config).unwrap_err();
        assert!(matches!(err, EmitError::SignatureMismatch { ref name } if name == "main"));
    }

    #[test]
    fn message_global_is_private_constant() {
        let context = Context::create();
        let module = emit_module(&context, &EmitterConfig::default()).unwrap();

        let global = module.get_first_global().unwrap();
        assert!(global.is_constant());
        assert_eq!(global.get_linkage(), Linkage::Private);
        assert!(module.get_first_global().unwrap().get_next_global().is_none());
    }
}
