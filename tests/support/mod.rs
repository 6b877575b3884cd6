//! Shared helpers: a little module assembler and a sink that records the
//! ordered event stream as readable strings.
use wasink::{BinarySection, ExternalKind, Limits, Opcode, RelocType, Sink, SinkResult, Type};

/// Minimal unsigned LEB128 encoding.
pub fn uleb(value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    let mut rest = value;
    while rest >= 0x80 {
        out.push(rest as u8 | 0x80);
        rest >>= 7;
    }
    out.push(rest as u8);
    out
}

/// Minimal signed LEB128 encoding; terminates once the remaining bits are
/// pure sign extension.
pub fn sleb(value: i64) -> Vec<u8> {
    let mut out = Vec::new();
    let mut rest = value;
    loop {
        let byte = (rest & 0x7F) as u8;
        rest >>= 7;
        let sign_clear = byte & 0x40 == 0;
        if (rest == 0 && sign_clear) || (rest == -1 && !sign_clear) {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// Length-prefixed string bytes.
pub fn name(s: &str) -> Vec<u8> {
    let mut out = uleb(s.len() as u32);
    out.extend_from_slice(s.as_bytes());
    out
}

pub fn cat(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

/// A function signature entry for the type section.
pub fn func_type(params: &[u8], result: Option<u8>) -> Vec<u8> {
    let mut out = vec![0x60];
    out.extend(uleb(params.len() as u32));
    out.extend_from_slice(params);
    match result {
        Some(ty) => {
            out.extend(uleb(1));
            out.push(ty);
        }
        None => out.extend(uleb(0)),
    }
    out
}

/// Assembles a binary module: preamble plus raw sections.
pub struct ModuleBuilder {
    bytes: Vec<u8>,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        ModuleBuilder {
            bytes: vec![0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00],
        }
    }

    pub fn section(mut self, id: u8, payload: &[u8]) -> Self {
        self.bytes.push(id);
        self.bytes.extend(uleb(payload.len() as u32));
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn custom_section(self, section_name: &str, payload: &[u8]) -> Self {
        let body = cat(&[&name(section_name), payload]);
        self.section(0, &body)
    }

    /// Appends bytes verbatim, for malformed-module tests.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

fn limits(l: &Limits) -> String {
    match l.max {
        Some(max) => format!("{}..{}", l.initial, max),
        None => format!("{}..", l.initial),
    }
}

fn types(sig: &[Type]) -> String {
    let names: Vec<&str> = sig.iter().map(|t| t.name()).collect();
    format!("[{}]", names.join(", "))
}

fn block_sig(sig: Option<Type>) -> &'static str {
    sig.map_or("void", Type::name)
}

/// Records one string per event. Errors are captured (and claimed, so the
/// decoder does not print to stderr during tests).
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<String>,
    pub errors: Vec<(usize, String)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, event: String) -> SinkResult {
        self.events.push(event);
        Ok(())
    }
}

impl Sink for RecordingSink {
    fn on_error(&mut self, offset: usize, message: &str) -> bool {
        self.errors.push((offset, message.to_owned()));
        true
    }

    fn begin_module(&mut self, version: u32) -> SinkResult {
        self.push(format!("begin_module({version})"))
    }
    fn end_module(&mut self) -> SinkResult {
        self.push("end_module".into())
    }
    fn begin_section(&mut self, section: BinarySection, size: u32) -> SinkResult {
        self.push(format!("begin_section({section}, {size})"))
    }

    fn begin_custom_section(&mut self, size: u32, name: &str) -> SinkResult {
        self.push(format!("begin_custom_section({name:?}, {size})"))
    }
    fn end_custom_section(&mut self) -> SinkResult {
        self.push("end_custom_section".into())
    }

    fn begin_type_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_type_section({size})"))
    }
    fn on_type_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_type_count({count})"))
    }
    fn on_type(&mut self, index: u32, params: &[Type], result: Option<Type>) -> SinkResult {
        self.push(format!(
            "on_type({}, {} -> {})",
            index,
            types(params),
            block_sig(result)
        ))
    }
    fn end_type_section(&mut self) -> SinkResult {
        self.push("end_type_section".into())
    }

    fn begin_import_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_import_section({size})"))
    }
    fn on_import_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_import_count({count})"))
    }
    fn on_import(&mut self, index: u32, module: &str, field: &str) -> SinkResult {
        self.push(format!("on_import({index}, {module:?}, {field:?})"))
    }
    fn on_import_func(&mut self, import_index: u32, func_index: u32, sig_index: u32) -> SinkResult {
        self.push(format!(
            "on_import_func({import_index}, {func_index}, {sig_index})"
        ))
    }
    fn on_import_table(
        &mut self,
        import_index: u32,
        table_index: u32,
        elem_type: Type,
        l: &Limits,
    ) -> SinkResult {
        self.push(format!(
            "on_import_table({import_index}, {table_index}, {elem_type}, {})",
            limits(l)
        ))
    }
    fn on_import_memory(
        &mut self,
        import_index: u32,
        memory_index: u32,
        l: &Limits,
    ) -> SinkResult {
        self.push(format!(
            "on_import_memory({import_index}, {memory_index}, {})",
            limits(l)
        ))
    }
    fn on_import_global(
        &mut self,
        import_index: u32,
        global_index: u32,
        ty: Type,
        mutable: bool,
    ) -> SinkResult {
        self.push(format!(
            "on_import_global({import_index}, {global_index}, {ty}, {mutable})"
        ))
    }
    fn on_import_exception(
        &mut self,
        import_index: u32,
        except_index: u32,
        sig: &[Type],
    ) -> SinkResult {
        self.push(format!(
            "on_import_exception({import_index}, {except_index}, {})",
            types(sig)
        ))
    }
    fn end_import_section(&mut self) -> SinkResult {
        self.push("end_import_section".into())
    }

    fn begin_function_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_function_section({size})"))
    }
    fn on_function_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_function_count({count})"))
    }
    fn on_function(&mut self, func_index: u32, sig_index: u32) -> SinkResult {
        self.push(format!("on_function({func_index}, {sig_index})"))
    }
    fn end_function_section(&mut self) -> SinkResult {
        self.push("end_function_section".into())
    }

    fn begin_table_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_table_section({size})"))
    }
    fn on_table_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_table_count({count})"))
    }
    fn on_table(&mut self, table_index: u32, elem_type: Type, l: &Limits) -> SinkResult {
        self.push(format!("on_table({table_index}, {elem_type}, {})", limits(l)))
    }
    fn end_table_section(&mut self) -> SinkResult {
        self.push("end_table_section".into())
    }

    fn begin_memory_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_memory_section({size})"))
    }
    fn on_memory_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_memory_count({count})"))
    }
    fn on_memory(&mut self, memory_index: u32, l: &Limits) -> SinkResult {
        self.push(format!("on_memory({memory_index}, {})", limits(l)))
    }
    fn end_memory_section(&mut self) -> SinkResult {
        self.push("end_memory_section".into())
    }

    fn begin_global_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_global_section({size})"))
    }
    fn on_global_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_global_count({count})"))
    }
    fn begin_global(&mut self, global_index: u32, ty: Type, mutable: bool) -> SinkResult {
        self.push(format!("begin_global({global_index}, {ty}, {mutable})"))
    }
    fn begin_global_init_expr(&mut self, global_index: u32) -> SinkResult {
        self.push(format!("begin_global_init_expr({global_index})"))
    }
    fn end_global_init_expr(&mut self, global_index: u32) -> SinkResult {
        self.push(format!("end_global_init_expr({global_index})"))
    }
    fn end_global(&mut self, global_index: u32) -> SinkResult {
        self.push(format!("end_global({global_index})"))
    }
    fn end_global_section(&mut self) -> SinkResult {
        self.push("end_global_section".into())
    }

    fn begin_export_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_export_section({size})"))
    }
    fn on_export_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_export_count({count})"))
    }
    fn on_export(
        &mut self,
        index: u32,
        kind: ExternalKind,
        item_index: u32,
        name: &str,
    ) -> SinkResult {
        self.push(format!("on_export({index}, {kind}, {item_index}, {name:?})"))
    }
    fn end_export_section(&mut self) -> SinkResult {
        self.push("end_export_section".into())
    }

    fn begin_start_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_start_section({size})"))
    }
    fn on_start_function(&mut self, func_index: u32) -> SinkResult {
        self.push(format!("on_start_function({func_index})"))
    }
    fn end_start_section(&mut self) -> SinkResult {
        self.push("end_start_section".into())
    }

    fn begin_elem_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_elem_section({size})"))
    }
    fn on_elem_segment_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_elem_segment_count({count})"))
    }
    fn begin_elem_segment(&mut self, segment_index: u32, table_index: u32) -> SinkResult {
        self.push(format!("begin_elem_segment({segment_index}, {table_index})"))
    }
    fn begin_elem_segment_init_expr(&mut self, segment_index: u32) -> SinkResult {
        self.push(format!("begin_elem_segment_init_expr({segment_index})"))
    }
    fn end_elem_segment_init_expr(&mut self, segment_index: u32) -> SinkResult {
        self.push(format!("end_elem_segment_init_expr({segment_index})"))
    }
    fn on_elem_segment_function_index_count(
        &mut self,
        segment_index: u32,
        count: u32,
    ) -> SinkResult {
        self.push(format!(
            "on_elem_segment_function_index_count({segment_index}, {count})"
        ))
    }
    fn on_elem_segment_function_index(
        &mut self,
        segment_index: u32,
        func_index: u32,
    ) -> SinkResult {
        self.push(format!(
            "on_elem_segment_function_index({segment_index}, {func_index})"
        ))
    }
    fn end_elem_segment(&mut self, segment_index: u32) -> SinkResult {
        self.push(format!("end_elem_segment({segment_index})"))
    }
    fn end_elem_section(&mut self) -> SinkResult {
        self.push("end_elem_section".into())
    }

    fn begin_code_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_code_section({size})"))
    }
    fn on_function_body_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_function_body_count({count})"))
    }
    fn begin_function_body(&mut self, func_index: u32) -> SinkResult {
        self.push(format!("begin_function_body({func_index})"))
    }
    fn on_local_decl_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_local_decl_count({count})"))
    }
    fn on_local_decl(&mut self, decl_index: u32, count: u32, ty: Type) -> SinkResult {
        self.push(format!("on_local_decl({decl_index}, {count}, {ty})"))
    }
    fn end_function_body(&mut self, func_index: u32) -> SinkResult {
        self.push(format!("end_function_body({func_index})"))
    }
    fn end_code_section(&mut self) -> SinkResult {
        self.push("end_code_section".into())
    }

    fn begin_data_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_data_section({size})"))
    }
    fn on_data_segment_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_data_segment_count({count})"))
    }
    fn begin_data_segment(&mut self, segment_index: u32, memory_index: u32) -> SinkResult {
        self.push(format!("begin_data_segment({segment_index}, {memory_index})"))
    }
    fn begin_data_segment_init_expr(&mut self, segment_index: u32) -> SinkResult {
        self.push(format!("begin_data_segment_init_expr({segment_index})"))
    }
    fn end_data_segment_init_expr(&mut self, segment_index: u32) -> SinkResult {
        self.push(format!("end_data_segment_init_expr({segment_index})"))
    }
    fn on_data_segment_data(&mut self, segment_index: u32, data: &[u8]) -> SinkResult {
        self.push(format!("on_data_segment_data({segment_index}, {data:?})"))
    }
    fn end_data_segment(&mut self, segment_index: u32) -> SinkResult {
        self.push(format!("end_data_segment({segment_index})"))
    }
    fn end_data_section(&mut self) -> SinkResult {
        self.push("end_data_section".into())
    }

    fn on_init_expr_i32_const(&mut self, index: u32, value: i32) -> SinkResult {
        self.push(format!("on_init_expr_i32_const({index}, {value})"))
    }
    fn on_init_expr_i64_const(&mut self, index: u32, value: i64) -> SinkResult {
        self.push(format!("on_init_expr_i64_const({index}, {value})"))
    }
    fn on_init_expr_f32_const(&mut self, index: u32, value_bits: u32) -> SinkResult {
        self.push(format!("on_init_expr_f32_const({index}, {value_bits:#x})"))
    }
    fn on_init_expr_f64_const(&mut self, index: u32, value_bits: u64) -> SinkResult {
        self.push(format!("on_init_expr_f64_const({index}, {value_bits:#x})"))
    }
    fn on_init_expr_get_global(&mut self, index: u32, global_index: u32) -> SinkResult {
        self.push(format!("on_init_expr_get_global({index}, {global_index})"))
    }

    fn on_opcode(&mut self, opcode: Opcode) -> SinkResult {
        self.push(format!("on_opcode({opcode})"))
    }
    fn on_unreachable(&mut self) -> SinkResult {
        self.push("on_unreachable".into())
    }
    fn on_nop(&mut self) -> SinkResult {
        self.push("on_nop".into())
    }
    fn on_block(&mut self, sig: Option<Type>) -> SinkResult {
        self.push(format!("on_block({})", block_sig(sig)))
    }
    fn on_loop(&mut self, sig: Option<Type>) -> SinkResult {
        self.push(format!("on_loop({})", block_sig(sig)))
    }
    fn on_if(&mut self, sig: Option<Type>) -> SinkResult {
        self.push(format!("on_if({})", block_sig(sig)))
    }
    fn on_else(&mut self) -> SinkResult {
        self.push("on_else".into())
    }
    fn on_try(&mut self, sig: Option<Type>) -> SinkResult {
        self.push(format!("on_try({})", block_sig(sig)))
    }
    fn on_catch(&mut self, except_index: u32) -> SinkResult {
        self.push(format!("on_catch({except_index})"))
    }
    fn on_catch_all(&mut self) -> SinkResult {
        self.push("on_catch_all".into())
    }
    fn on_throw(&mut self, except_index: u32) -> SinkResult {
        self.push(format!("on_throw({except_index})"))
    }
    fn on_rethrow(&mut self, depth: u32) -> SinkResult {
        self.push(format!("on_rethrow({depth})"))
    }
    fn on_drop(&mut self) -> SinkResult {
        self.push("on_drop".into())
    }
    fn on_select(&mut self) -> SinkResult {
        self.push("on_select".into())
    }
    fn on_br(&mut self, depth: u32) -> SinkResult {
        self.push(format!("on_br({depth})"))
    }
    fn on_br_if(&mut self, depth: u32) -> SinkResult {
        self.push(format!("on_br_if({depth})"))
    }
    fn on_br_table(&mut self, target_depths: &[u32], default_target_depth: u32) -> SinkResult {
        self.push(format!(
            "on_br_table({target_depths:?}, {default_target_depth})"
        ))
    }
    fn on_return(&mut self) -> SinkResult {
        self.push("on_return".into())
    }
    fn on_call(&mut self, func_index: u32) -> SinkResult {
        self.push(format!("on_call({func_index})"))
    }
    fn on_call_indirect(&mut self, sig_index: u32) -> SinkResult {
        self.push(format!("on_call_indirect({sig_index})"))
    }
    fn on_get_local(&mut self, local_index: u32) -> SinkResult {
        self.push(format!("on_get_local({local_index})"))
    }
    fn on_set_local(&mut self, local_index: u32) -> SinkResult {
        self.push(format!("on_set_local({local_index})"))
    }
    fn on_tee_local(&mut self, local_index: u32) -> SinkResult {
        self.push(format!("on_tee_local({local_index})"))
    }
    fn on_get_global(&mut self, global_index: u32) -> SinkResult {
        self.push(format!("on_get_global({global_index})"))
    }
    fn on_set_global(&mut self, global_index: u32) -> SinkResult {
        self.push(format!("on_set_global({global_index})"))
    }
    fn on_load(&mut self, opcode: Opcode, alignment_log2: u32, offset: u32) -> SinkResult {
        self.push(format!("on_load({opcode}, {alignment_log2}, {offset})"))
    }
    fn on_store(&mut self, opcode: Opcode, alignment_log2: u32, offset: u32) -> SinkResult {
        self.push(format!("on_store({opcode}, {alignment_log2}, {offset})"))
    }
    fn on_current_memory(&mut self) -> SinkResult {
        self.push("on_current_memory".into())
    }
    fn on_grow_memory(&mut self) -> SinkResult {
        self.push("on_grow_memory".into())
    }
    fn on_i32_const(&mut self, value: i32) -> SinkResult {
        self.push(format!("on_i32_const({value})"))
    }
    fn on_i64_const(&mut self, value: i64) -> SinkResult {
        self.push(format!("on_i64_const({value})"))
    }
    fn on_f32_const(&mut self, value_bits: u32) -> SinkResult {
        self.push(format!("on_f32_const({value_bits:#x})"))
    }
    fn on_f64_const(&mut self, value_bits: u64) -> SinkResult {
        self.push(format!("on_f64_const({value_bits:#x})"))
    }
    fn on_binary(&mut self, opcode: Opcode) -> SinkResult {
        self.push(format!("on_binary({opcode})"))
    }
    fn on_compare(&mut self, opcode: Opcode) -> SinkResult {
        self.push(format!("on_compare({opcode})"))
    }
    fn on_unary(&mut self, opcode: Opcode) -> SinkResult {
        self.push(format!("on_unary({opcode})"))
    }
    fn on_convert(&mut self, opcode: Opcode) -> SinkResult {
        self.push(format!("on_convert({opcode})"))
    }
    fn on_end_expr(&mut self) -> SinkResult {
        self.push("on_end_expr".into())
    }
    fn on_end_func(&mut self) -> SinkResult {
        self.push("on_end_func".into())
    }

    fn begin_names_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_names_section({size})"))
    }
    fn on_function_name_subsection(
        &mut self,
        subsection_index: u32,
        name_type: u32,
        size: u32,
    ) -> SinkResult {
        self.push(format!(
            "on_function_name_subsection({subsection_index}, {name_type}, {size})"
        ))
    }
    fn on_function_names_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_function_names_count({count})"))
    }
    fn on_function_name(&mut self, func_index: u32, name: &str) -> SinkResult {
        self.push(format!("on_function_name({func_index}, {name:?})"))
    }
    fn on_local_name_subsection(
        &mut self,
        subsection_index: u32,
        name_type: u32,
        size: u32,
    ) -> SinkResult {
        self.push(format!(
            "on_local_name_subsection({subsection_index}, {name_type}, {size})"
        ))
    }
    fn on_local_name_function_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_local_name_function_count({count})"))
    }
    fn on_local_name_local_count(&mut self, func_index: u32, count: u32) -> SinkResult {
        self.push(format!("on_local_name_local_count({func_index}, {count})"))
    }
    fn on_local_name(&mut self, func_index: u32, local_index: u32, name: &str) -> SinkResult {
        self.push(format!(
            "on_local_name({func_index}, {local_index}, {name:?})"
        ))
    }
    fn end_names_section(&mut self) -> SinkResult {
        self.push("end_names_section".into())
    }

    fn begin_reloc_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_reloc_section({size})"))
    }
    fn on_reloc_count(
        &mut self,
        count: u32,
        section: BinarySection,
        section_name: &str,
    ) -> SinkResult {
        self.push(format!(
            "on_reloc_count({count}, {section}, {section_name:?})"
        ))
    }
    fn on_reloc(&mut self, ty: RelocType, offset: u32, index: u32, addend: i32) -> SinkResult {
        self.push(format!("on_reloc({ty:?}, {offset:#x}, {index}, {addend})"))
    }
    fn end_reloc_section(&mut self) -> SinkResult {
        self.push("end_reloc_section".into())
    }

    fn begin_linking_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_linking_section({size})"))
    }
    fn on_stack_global(&mut self, global_index: u32) -> SinkResult {
        self.push(format!("on_stack_global({global_index})"))
    }
    fn on_symbol_info_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_symbol_info_count({count})"))
    }
    fn on_symbol_info(&mut self, name: &str, flags: u32) -> SinkResult {
        self.push(format!("on_symbol_info({name:?}, {flags:#x})"))
    }
    fn end_linking_section(&mut self) -> SinkResult {
        self.push("end_linking_section".into())
    }

    fn begin_exception_section(&mut self, size: u32) -> SinkResult {
        self.push(format!("begin_exception_section({size})"))
    }
    fn on_exception_count(&mut self, count: u32) -> SinkResult {
        self.push(format!("on_exception_count({count})"))
    }
    fn on_exception_type(&mut self, except_index: u32, sig: &[Type]) -> SinkResult {
        self.push(format!("on_exception_type({except_index}, {})", types(sig)))
    }
    fn end_exception_section(&mut self) -> SinkResult {
        self.push("end_exception_section".into())
    }
}
