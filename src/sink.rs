//! The event interface the decoder drives.
use crate::opcode::Opcode;
use crate::types::{BinarySection, ExternalKind, Limits, RelocType, Type};
use thiserror::Error;

/// Returned by a sink callback to abort the decode.
///
/// The decoder surfaces it as a "`<callback>` callback failed" error at the
/// current offset; it carries no payload of its own.
#[derive(Debug, Error)]
#[error("sink requested abort")]
pub struct SinkError;

pub type SinkResult = Result<(), SinkError>;

/// A consumer of module structure.
///
/// The decoder calls exactly one method per structural element it
/// discovers, in input order. Every method defaults to `Ok(())`, so a sink
/// implements only the events it cares about. Returning `Err(SinkError)`
/// from any callback aborts the decode.
///
/// Borrowed arguments (`&str` names, `&[u8]` payloads, type slices) point
/// into the caller's input buffer or the decoder's scratch space and are
/// only valid for the duration of the callback.
#[allow(unused_variables)]
pub trait Sink {
    /// Receives every error message before the decode call fails.
    ///
    /// Return `true` to mark the error handled; otherwise the decoder
    /// prints it to standard error.
    fn on_error(&mut self, offset: usize, message: &str) -> bool {
        false
    }

    // Module framing.
    fn begin_module(&mut self, version: u32) -> SinkResult {
        Ok(())
    }
    fn end_module(&mut self) -> SinkResult {
        Ok(())
    }
    fn begin_section(&mut self, section: BinarySection, size: u32) -> SinkResult {
        Ok(())
    }

    // Custom sections.
    fn begin_custom_section(&mut self, size: u32, name: &str) -> SinkResult {
        Ok(())
    }
    fn end_custom_section(&mut self) -> SinkResult {
        Ok(())
    }

    // Type section.
    fn begin_type_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_type_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn on_type(&mut self, index: u32, params: &[Type], result: Option<Type>) -> SinkResult {
        Ok(())
    }
    fn end_type_section(&mut self) -> SinkResult {
        Ok(())
    }

    // Import section.
    fn begin_import_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_import_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    /// Reported once per import, before the kind-specific event below.
    fn on_import(&mut self, index: u32, module: &str, field: &str) -> SinkResult {
        Ok(())
    }
    fn on_import_func(&mut self, import_index: u32, func_index: u32, sig_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_import_table(
        &mut self,
        import_index: u32,
        table_index: u32,
        elem_type: Type,
        limits: &Limits,
    ) -> SinkResult {
        Ok(())
    }
    fn on_import_memory(
        &mut self,
        import_index: u32,
        memory_index: u32,
        limits: &Limits,
    ) -> SinkResult {
        Ok(())
    }
    fn on_import_global(
        &mut self,
        import_index: u32,
        global_index: u32,
        ty: Type,
        mutable: bool,
    ) -> SinkResult {
        Ok(())
    }
    fn on_import_exception(
        &mut self,
        import_index: u32,
        except_index: u32,
        sig: &[Type],
    ) -> SinkResult {
        Ok(())
    }
    fn end_import_section(&mut self) -> SinkResult {
        Ok(())
    }

    // Function section.
    fn begin_function_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_function_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn on_function(&mut self, func_index: u32, sig_index: u32) -> SinkResult {
        Ok(())
    }
    fn end_function_section(&mut self) -> SinkResult {
        Ok(())
    }

    // Table section.
    fn begin_table_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_table_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn on_table(&mut self, table_index: u32, elem_type: Type, limits: &Limits) -> SinkResult {
        Ok(())
    }
    fn end_table_section(&mut self) -> SinkResult {
        Ok(())
    }

    // Memory section.
    fn begin_memory_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_memory_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn on_memory(&mut self, memory_index: u32, limits: &Limits) -> SinkResult {
        Ok(())
    }
    fn end_memory_section(&mut self) -> SinkResult {
        Ok(())
    }

    // Global section.
    fn begin_global_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_global_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn begin_global(&mut self, global_index: u32, ty: Type, mutable: bool) -> SinkResult {
        Ok(())
    }
    fn begin_global_init_expr(&mut self, global_index: u32) -> SinkResult {
        Ok(())
    }
    fn end_global_init_expr(&mut self, global_index: u32) -> SinkResult {
        Ok(())
    }
    fn end_global(&mut self, global_index: u32) -> SinkResult {
        Ok(())
    }
    fn end_global_section(&mut self) -> SinkResult {
        Ok(())
    }

    // Export section.
    fn begin_export_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_export_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn on_export(
        &mut self,
        index: u32,
        kind: ExternalKind,
        item_index: u32,
        name: &str,
    ) -> SinkResult {
        Ok(())
    }
    fn end_export_section(&mut self) -> SinkResult {
        Ok(())
    }

    // Start section.
    fn begin_start_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_start_function(&mut self, func_index: u32) -> SinkResult {
        Ok(())
    }
    fn end_start_section(&mut self) -> SinkResult {
        Ok(())
    }

    // Element section.
    fn begin_elem_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_elem_segment_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn begin_elem_segment(&mut self, segment_index: u32, table_index: u32) -> SinkResult {
        Ok(())
    }
    fn begin_elem_segment_init_expr(&mut self, segment_index: u32) -> SinkResult {
        Ok(())
    }
    fn end_elem_segment_init_expr(&mut self, segment_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_elem_segment_function_index_count(
        &mut self,
        segment_index: u32,
        count: u32,
    ) -> SinkResult {
        Ok(())
    }
    fn on_elem_segment_function_index(
        &mut self,
        segment_index: u32,
        func_index: u32,
    ) -> SinkResult {
        Ok(())
    }
    fn end_elem_segment(&mut self, segment_index: u32) -> SinkResult {
        Ok(())
    }
    fn end_elem_section(&mut self) -> SinkResult {
        Ok(())
    }

    // Code section.
    fn begin_code_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_function_body_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn begin_function_body(&mut self, func_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_local_decl_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn on_local_decl(&mut self, decl_index: u32, count: u32, ty: Type) -> SinkResult {
        Ok(())
    }
    fn end_function_body(&mut self, func_index: u32) -> SinkResult {
        Ok(())
    }
    fn end_code_section(&mut self) -> SinkResult {
        Ok(())
    }

    // Data section.
    fn begin_data_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_data_segment_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn begin_data_segment(&mut self, segment_index: u32, memory_index: u32) -> SinkResult {
        Ok(())
    }
    fn begin_data_segment_init_expr(&mut self, segment_index: u32) -> SinkResult {
        Ok(())
    }
    fn end_data_segment_init_expr(&mut self, segment_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_data_segment_data(&mut self, segment_index: u32, data: &[u8]) -> SinkResult {
        Ok(())
    }
    fn end_data_segment(&mut self, segment_index: u32) -> SinkResult {
        Ok(())
    }
    fn end_data_section(&mut self) -> SinkResult {
        Ok(())
    }

    // Initializer expressions. `index` is the global or segment being
    // initialized.
    fn on_init_expr_i32_const(&mut self, index: u32, value: i32) -> SinkResult {
        Ok(())
    }
    fn on_init_expr_i64_const(&mut self, index: u32, value: i64) -> SinkResult {
        Ok(())
    }
    fn on_init_expr_f32_const(&mut self, index: u32, value_bits: u32) -> SinkResult {
        Ok(())
    }
    fn on_init_expr_f64_const(&mut self, index: u32, value_bits: u64) -> SinkResult {
        Ok(())
    }
    fn on_init_expr_get_global(&mut self, index: u32, global_index: u32) -> SinkResult {
        Ok(())
    }

    // Instructions. `on_opcode` fires for every instruction before its
    // dedicated event; the `on_opcode_*` echoes report the raw immediates
    // for tracing and disassembly sinks.
    fn on_opcode(&mut self, opcode: Opcode) -> SinkResult {
        Ok(())
    }
    fn on_opcode_bare(&mut self) -> SinkResult {
        Ok(())
    }
    fn on_opcode_index(&mut self, value: u32) -> SinkResult {
        Ok(())
    }
    fn on_opcode_u32(&mut self, value: u32) -> SinkResult {
        Ok(())
    }
    fn on_opcode_u32_u32(&mut self, first: u32, second: u32) -> SinkResult {
        Ok(())
    }
    fn on_opcode_u64(&mut self, value: u64) -> SinkResult {
        Ok(())
    }
    fn on_opcode_f32(&mut self, value_bits: u32) -> SinkResult {
        Ok(())
    }
    fn on_opcode_f64(&mut self, value_bits: u64) -> SinkResult {
        Ok(())
    }
    fn on_opcode_block_sig(&mut self, sig: Option<Type>) -> SinkResult {
        Ok(())
    }

    fn on_unreachable(&mut self) -> SinkResult {
        Ok(())
    }
    fn on_nop(&mut self) -> SinkResult {
        Ok(())
    }
    fn on_block(&mut self, sig: Option<Type>) -> SinkResult {
        Ok(())
    }
    fn on_loop(&mut self, sig: Option<Type>) -> SinkResult {
        Ok(())
    }
    fn on_if(&mut self, sig: Option<Type>) -> SinkResult {
        Ok(())
    }
    fn on_else(&mut self) -> SinkResult {
        Ok(())
    }
    fn on_try(&mut self, sig: Option<Type>) -> SinkResult {
        Ok(())
    }
    fn on_catch(&mut self, except_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_catch_all(&mut self) -> SinkResult {
        Ok(())
    }
    fn on_throw(&mut self, except_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_rethrow(&mut self, depth: u32) -> SinkResult {
        Ok(())
    }
    fn on_drop(&mut self) -> SinkResult {
        Ok(())
    }
    fn on_select(&mut self) -> SinkResult {
        Ok(())
    }
    fn on_br(&mut self, depth: u32) -> SinkResult {
        Ok(())
    }
    fn on_br_if(&mut self, depth: u32) -> SinkResult {
        Ok(())
    }
    fn on_br_table(&mut self, target_depths: &[u32], default_target_depth: u32) -> SinkResult {
        Ok(())
    }
    fn on_return(&mut self) -> SinkResult {
        Ok(())
    }
    fn on_call(&mut self, func_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_call_indirect(&mut self, sig_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_get_local(&mut self, local_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_set_local(&mut self, local_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_tee_local(&mut self, local_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_get_global(&mut self, global_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_set_global(&mut self, global_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_load(&mut self, opcode: Opcode, alignment_log2: u32, offset: u32) -> SinkResult {
        Ok(())
    }
    fn on_store(&mut self, opcode: Opcode, alignment_log2: u32, offset: u32) -> SinkResult {
        Ok(())
    }
    fn on_current_memory(&mut self) -> SinkResult {
        Ok(())
    }
    fn on_grow_memory(&mut self) -> SinkResult {
        Ok(())
    }
    fn on_i32_const(&mut self, value: i32) -> SinkResult {
        Ok(())
    }
    fn on_i64_const(&mut self, value: i64) -> SinkResult {
        Ok(())
    }
    fn on_f32_const(&mut self, value_bits: u32) -> SinkResult {
        Ok(())
    }
    fn on_f64_const(&mut self, value_bits: u64) -> SinkResult {
        Ok(())
    }
    fn on_binary(&mut self, opcode: Opcode) -> SinkResult {
        Ok(())
    }
    fn on_compare(&mut self, opcode: Opcode) -> SinkResult {
        Ok(())
    }
    fn on_unary(&mut self, opcode: Opcode) -> SinkResult {
        Ok(())
    }
    fn on_convert(&mut self, opcode: Opcode) -> SinkResult {
        Ok(())
    }
    /// An `end` closing a nested block.
    fn on_end_expr(&mut self) -> SinkResult {
        Ok(())
    }
    /// The `end` terminating a function body, observed exactly at the body
    /// boundary.
    fn on_end_func(&mut self) -> SinkResult {
        Ok(())
    }

    // "name" custom section.
    fn begin_names_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_function_name_subsection(
        &mut self,
        subsection_index: u32,
        name_type: u32,
        size: u32,
    ) -> SinkResult {
        Ok(())
    }
    fn on_function_names_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn on_function_name(&mut self, func_index: u32, name: &str) -> SinkResult {
        Ok(())
    }
    fn on_local_name_subsection(
        &mut self,
        subsection_index: u32,
        name_type: u32,
        size: u32,
    ) -> SinkResult {
        Ok(())
    }
    fn on_local_name_function_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn on_local_name_local_count(&mut self, func_index: u32, count: u32) -> SinkResult {
        Ok(())
    }
    fn on_local_name(&mut self, func_index: u32, local_index: u32, name: &str) -> SinkResult {
        Ok(())
    }
    fn end_names_section(&mut self) -> SinkResult {
        Ok(())
    }

    // "reloc.*" custom sections.
    fn begin_reloc_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_reloc_count(
        &mut self,
        count: u32,
        section: BinarySection,
        section_name: &str,
    ) -> SinkResult {
        Ok(())
    }
    fn on_reloc(&mut self, ty: RelocType, offset: u32, index: u32, addend: i32) -> SinkResult {
        Ok(())
    }
    fn end_reloc_section(&mut self) -> SinkResult {
        Ok(())
    }

    // "linking" custom section.
    fn begin_linking_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_stack_global(&mut self, global_index: u32) -> SinkResult {
        Ok(())
    }
    fn on_symbol_info_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn on_symbol_info(&mut self, name: &str, flags: u32) -> SinkResult {
        Ok(())
    }
    fn end_linking_section(&mut self) -> SinkResult {
        Ok(())
    }

    // "exception" custom section (feature-gated).
    fn begin_exception_section(&mut self, size: u32) -> SinkResult {
        Ok(())
    }
    fn on_exception_count(&mut self, count: u32) -> SinkResult {
        Ok(())
    }
    fn on_exception_type(&mut self, except_index: u32, sig: &[Type]) -> SinkResult {
        Ok(())
    }
    fn end_exception_section(&mut self) -> SinkResult {
        Ok(())
    }
}

/// A sink that ignores every event. Useful when only the success or failure
/// of a decode matters.
#[derive(Debug, Default)]
pub struct NopSink;

impl Sink for NopSink {}
