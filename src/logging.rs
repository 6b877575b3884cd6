//! A tracing wrapper that logs every event before forwarding it.
use crate::opcode::Opcode;
use crate::sink::{Sink, SinkResult};
use crate::types::{BinarySection, ExternalKind, Limits, RelocType, Type};
use std::fmt;
use std::io::Write;

/// Wraps a sink and a stream; every event prints one indented trace line to
/// the stream and is then forwarded to the inner sink unchanged.
///
/// [`decode`](crate::decode) interposes this automatically when
/// [`DecodeOptions::log_stream`](crate::DecodeOptions) is set, but it can
/// also be composed by hand. Stream write failures are ignored; tracing
/// never aborts a decode.
pub struct LoggingSink<'a, S: Sink + ?Sized> {
    stream: &'a mut dyn Write,
    inner: &'a mut S,
    indent: usize,
}

impl<'a, S: Sink + ?Sized> LoggingSink<'a, S> {
    pub fn new(stream: &'a mut dyn Write, inner: &'a mut S) -> Self {
        LoggingSink {
            stream,
            inner,
            indent: 0,
        }
    }

    fn logf(&mut self, args: fmt::Arguments<'_>) {
        for _ in 0..self.indent {
            let _ = self.stream.write_all(b"  ");
        }
        let _ = self.stream.write_fmt(args);
        let _ = self.stream.write_all(b"\n");
    }
}

fn sig_name(sig: Option<Type>) -> &'static str {
    match sig {
        Some(ty) => ty.name(),
        None => "void",
    }
}

struct TypeList<'a>(&'a [Type]);

impl fmt::Display for TypeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, ty) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            f.write_str(ty.name())?;
        }
        f.write_str("]")
    }
}

fn limits_suffix(limits: &Limits) -> String {
    match limits.max {
        Some(max) => format!("initial: {}, max: {}", limits.initial, max),
        None => format!("initial: {}", limits.initial),
    }
}

// Sections sharing the `(size) -> indent` / `dedent -> ()` shape.
macro_rules! logging_begin {
    ($($method:ident, $label:literal;)+) => {
        $(
            fn $method(&mut self, size: u32) -> SinkResult {
                self.logf(format_args!(concat!($label, "(size: {})"), size));
                self.indent += 1;
                self.inner.$method(size)
            }
        )+
    };
}

macro_rules! logging_end {
    ($($method:ident, $label:literal;)+) => {
        $(
            fn $method(&mut self) -> SinkResult {
                self.indent -= 1;
                self.logf(format_args!($label));
                self.inner.$method()
            }
        )+
    };
}

// Events carrying a single u32.
macro_rules! logging_u32 {
    ($($method:ident, $label:literal, $arg:literal;)+) => {
        $(
            fn $method(&mut self, value: u32) -> SinkResult {
                self.logf(format_args!(concat!($label, "(", $arg, ": {})"), value));
                self.inner.$method(value)
            }
        )+
    };
}

// Events with no payload.
macro_rules! logging_bare {
    ($($method:ident, $label:literal;)+) => {
        $(
            fn $method(&mut self) -> SinkResult {
                self.logf(format_args!($label));
                self.inner.$method()
            }
        )+
    };
}

// Block-structured instructions carrying an inline signature.
macro_rules! logging_block_sig {
    ($($method:ident, $label:literal;)+) => {
        $(
            fn $method(&mut self, sig: Option<Type>) -> SinkResult {
                self.logf(format_args!(concat!($label, "(sig: {})"), sig_name(sig)));
                self.inner.$method(sig)
            }
        )+
    };
}

// Instruction groups reported by opcode.
macro_rules! logging_opcode {
    ($($method:ident, $label:literal;)+) => {
        $(
            fn $method(&mut self, opcode: Opcode) -> SinkResult {
                self.logf(format_args!(concat!($label, "({})"), opcode));
                self.inner.$method(opcode)
            }
        )+
    };
}

impl<S: Sink + ?Sized> Sink for LoggingSink<'_, S> {
    fn on_error(&mut self, offset: usize, message: &str) -> bool {
        self.inner.on_error(offset, message)
    }

    fn begin_module(&mut self, version: u32) -> SinkResult {
        self.logf(format_args!("BeginModule(version: {version})"));
        self.indent += 1;
        self.inner.begin_module(version)
    }

    fn end_module(&mut self) -> SinkResult {
        self.indent -= 1;
        self.logf(format_args!("EndModule"));
        self.inner.end_module()
    }

    fn begin_section(&mut self, section: BinarySection, size: u32) -> SinkResult {
        self.logf(format_args!("BeginSection(section: {section}, size: {size})"));
        self.inner.begin_section(section, size)
    }

    fn begin_custom_section(&mut self, size: u32, name: &str) -> SinkResult {
        self.logf(format_args!(
            "BeginCustomSection(size: {size}, name: \"{name}\")"
        ));
        self.indent += 1;
        self.inner.begin_custom_section(size, name)
    }

    logging_begin! {
        begin_type_section, "BeginTypeSection";
        begin_import_section, "BeginImportSection";
        begin_function_section, "BeginFunctionSection";
        begin_table_section, "BeginTableSection";
        begin_memory_section, "BeginMemorySection";
        begin_global_section, "BeginGlobalSection";
        begin_export_section, "BeginExportSection";
        begin_start_section, "BeginStartSection";
        begin_elem_section, "BeginElemSection";
        begin_code_section, "BeginCodeSection";
        begin_data_section, "BeginDataSection";
        begin_names_section, "BeginNamesSection";
        begin_reloc_section, "BeginRelocSection";
        begin_linking_section, "BeginLinkingSection";
        begin_exception_section, "BeginExceptionSection";
    }

    logging_end! {
        end_custom_section, "EndCustomSection";
        end_type_section, "EndTypeSection";
        end_import_section, "EndImportSection";
        end_function_section, "EndFunctionSection";
        end_table_section, "EndTableSection";
        end_memory_section, "EndMemorySection";
        end_global_section, "EndGlobalSection";
        end_export_section, "EndExportSection";
        end_start_section, "EndStartSection";
        end_elem_section, "EndElemSection";
        end_code_section, "EndCodeSection";
        end_data_section, "EndDataSection";
        end_names_section, "EndNamesSection";
        end_reloc_section, "EndRelocSection";
        end_linking_section, "EndLinkingSection";
        end_exception_section, "EndExceptionSection";
    }

    logging_u32! {
        on_type_count, "OnTypeCount", "count";
        on_import_count, "OnImportCount", "count";
        on_function_count, "OnFunctionCount", "count";
        on_table_count, "OnTableCount", "count";
        on_memory_count, "OnMemoryCount", "count";
        on_global_count, "OnGlobalCount", "count";
        on_export_count, "OnExportCount", "count";
        on_elem_segment_count, "OnElemSegmentCount", "count";
        on_function_body_count, "OnFunctionBodyCount", "count";
        on_local_decl_count, "OnLocalDeclCount", "count";
        on_data_segment_count, "OnDataSegmentCount", "count";
        on_start_function, "OnStartFunction", "func_index";
        on_function_names_count, "OnFunctionNamesCount", "count";
        on_local_name_function_count, "OnLocalNameFunctionCount", "count";
        on_stack_global, "OnStackGlobal", "global_index";
        on_symbol_info_count, "OnSymbolInfoCount", "count";
        on_exception_count, "OnExceptionCount", "count";
    }

    fn on_type(&mut self, index: u32, params: &[Type], result: Option<Type>) -> SinkResult {
        self.logf(format_args!(
            "OnType(index: {}, params: {}, result: {})",
            index,
            TypeList(params),
            sig_name(result)
        ));
        self.inner.on_type(index, params, result)
    }

    fn on_import(&mut self, index: u32, module: &str, field: &str) -> SinkResult {
        self.logf(format_args!(
            "OnImport(index: {index}, module: \"{module}\", field: \"{field}\")"
        ));
        self.inner.on_import(index, module, field)
    }

    fn on_import_func(&mut self, import_index: u32, func_index: u32, sig_index: u32) -> SinkResult {
        self.logf(format_args!(
            "OnImportFunc(import_index: {import_index}, func_index: {func_index}, sig_index: {sig_index})"
        ));
        self.inner.on_import_func(import_index, func_index, sig_index)
    }

    fn on_import_table(
        &mut self,
        import_index: u32,
        table_index: u32,
        elem_type: Type,
        limits: &Limits,
    ) -> SinkResult {
        self.logf(format_args!(
            "OnImportTable(import_index: {}, table_index: {}, elem_type: {}, {})",
            import_index,
            table_index,
            elem_type,
            limits_suffix(limits)
        ));
        self.inner
            .on_import_table(import_index, table_index, elem_type, limits)
    }

    fn on_import_memory(
        &mut self,
        import_index: u32,
        memory_index: u32,
        limits: &Limits,
    ) -> SinkResult {
        self.logf(format_args!(
            "OnImportMemory(import_index: {}, memory_index: {}, {})",
            import_index,
            memory_index,
            limits_suffix(limits)
        ));
        self.inner
            .on_import_memory(import_index, memory_index, limits)
    }

    fn on_import_global(
        &mut self,
        import_index: u32,
        global_index: u32,
        ty: Type,
        mutable: bool,
    ) -> SinkResult {
        self.logf(format_args!(
            "OnImportGlobal(import_index: {import_index}, global_index: {global_index}, type: {ty}, mutable: {mutable})"
        ));
        self.inner
            .on_import_global(import_index, global_index, ty, mutable)
    }

    fn on_import_exception(
        &mut self,
        import_index: u32,
        except_index: u32,
        sig: &[Type],
    ) -> SinkResult {
        self.logf(format_args!(
            "OnImportException(import_index: {}, except_index: {}, sig: {})",
            import_index,
            except_index,
            TypeList(sig)
        ));
        self.inner
            .on_import_exception(import_index, except_index, sig)
    }

    fn on_function(&mut self, func_index: u32, sig_index: u32) -> SinkResult {
        self.logf(format_args!(
            "OnFunction(func_index: {func_index}, sig_index: {sig_index})"
        ));
        self.inner.on_function(func_index, sig_index)
    }

    fn on_table(&mut self, table_index: u32, elem_type: Type, limits: &Limits) -> SinkResult {
        self.logf(format_args!(
            "OnTable(table_index: {}, elem_type: {}, {})",
            table_index,
            elem_type,
            limits_suffix(limits)
        ));
        self.inner.on_table(table_index, elem_type, limits)
    }

    fn on_memory(&mut self, memory_index: u32, limits: &Limits) -> SinkResult {
        self.logf(format_args!(
            "OnMemory(memory_index: {}, {})",
            memory_index,
            limits_suffix(limits)
        ));
        self.inner.on_memory(memory_index, limits)
    }

    fn begin_global(&mut self, global_index: u32, ty: Type, mutable: bool) -> SinkResult {
        self.logf(format_args!(
            "BeginGlobal(global_index: {global_index}, type: {ty}, mutable: {mutable})"
        ));
        self.indent += 1;
        self.inner.begin_global(global_index, ty, mutable)
    }

    fn begin_global_init_expr(&mut self, global_index: u32) -> SinkResult {
        self.logf(format_args!("BeginGlobalInitExpr(global_index: {global_index})"));
        self.indent += 1;
        self.inner.begin_global_init_expr(global_index)
    }

    fn end_global_init_expr(&mut self, global_index: u32) -> SinkResult {
        self.indent -= 1;
        self.logf(format_args!("EndGlobalInitExpr(global_index: {global_index})"));
        self.inner.end_global_init_expr(global_index)
    }

    fn end_global(&mut self, global_index: u32) -> SinkResult {
        self.indent -= 1;
        self.logf(format_args!("EndGlobal(global_index: {global_index})"));
        self.inner.end_global(global_index)
    }

    fn on_export(
        &mut self,
        index: u32,
        kind: ExternalKind,
        item_index: u32,
        name: &str,
    ) -> SinkResult {
        self.logf(format_args!(
            "OnExport(index: {index}, kind: {kind}, item_index: {item_index}, name: \"{name}\")"
        ));
        self.inner.on_export(index, kind, item_index, name)
    }

    fn begin_elem_segment(&mut self, segment_index: u32, table_index: u32) -> SinkResult {
        self.logf(format_args!(
            "BeginElemSegment(segment_index: {segment_index}, table_index: {table_index})"
        ));
        self.indent += 1;
        self.inner.begin_elem_segment(segment_index, table_index)
    }

    fn begin_elem_segment_init_expr(&mut self, segment_index: u32) -> SinkResult {
        self.logf(format_args!(
            "BeginElemSegmentInitExpr(segment_index: {segment_index})"
        ));
        self.indent += 1;
        self.inner.begin_elem_segment_init_expr(segment_index)
    }

    fn end_elem_segment_init_expr(&mut self, segment_index: u32) -> SinkResult {
        self.indent -= 1;
        self.logf(format_args!(
            "EndElemSegmentInitExpr(segment_index: {segment_index})"
        ));
        self.inner.end_elem_segment_init_expr(segment_index)
    }

    fn on_elem_segment_function_index_count(
        &mut self,
        segment_index: u32,
        count: u32,
    ) -> SinkResult {
        self.logf(format_args!(
            "OnElemSegmentFunctionIndexCount(segment_index: {segment_index}, count: {count})"
        ));
        self.inner
            .on_elem_segment_function_index_count(segment_index, count)
    }

    fn on_elem_segment_function_index(
        &mut self,
        segment_index: u32,
        func_index: u32,
    ) -> SinkResult {
        self.logf(format_args!(
            "OnElemSegmentFunctionIndex(segment_index: {segment_index}, func_index: {func_index})"
        ));
        self.inner
            .on_elem_segment_function_index(segment_index, func_index)
    }

    fn end_elem_segment(&mut self, segment_index: u32) -> SinkResult {
        self.indent -= 1;
        self.logf(format_args!("EndElemSegment(segment_index: {segment_index})"));
        self.inner.end_elem_segment(segment_index)
    }

    fn begin_function_body(&mut self, func_index: u32) -> SinkResult {
        self.logf(format_args!("BeginFunctionBody(func_index: {func_index})"));
        self.indent += 1;
        self.inner.begin_function_body(func_index)
    }

    fn on_local_decl(&mut self, decl_index: u32, count: u32, ty: Type) -> SinkResult {
        self.logf(format_args!(
            "OnLocalDecl(decl_index: {decl_index}, count: {count}, type: {ty})"
        ));
        self.inner.on_local_decl(decl_index, count, ty)
    }

    fn end_function_body(&mut self, func_index: u32) -> SinkResult {
        self.indent -= 1;
        self.logf(format_args!("EndFunctionBody(func_index: {func_index})"));
        self.inner.end_function_body(func_index)
    }

    fn begin_data_segment(&mut self, segment_index: u32, memory_index: u32) -> SinkResult {
        self.logf(format_args!(
            "BeginDataSegment(segment_index: {segment_index}, memory_index: {memory_index})"
        ));
        self.indent += 1;
        self.inner.begin_data_segment(segment_index, memory_index)
    }

    fn begin_data_segment_init_expr(&mut self, segment_index: u32) -> SinkResult {
        self.logf(format_args!(
            "BeginDataSegmentInitExpr(segment_index: {segment_index})"
        ));
        self.indent += 1;
        self.inner.begin_data_segment_init_expr(segment_index)
    }

    fn end_data_segment_init_expr(&mut self, segment_index: u32) -> SinkResult {
        self.indent -= 1;
        self.logf(format_args!(
            "EndDataSegmentInitExpr(segment_index: {segment_index})"
        ));
        self.inner.end_data_segment_init_expr(segment_index)
    }

    fn on_data_segment_data(&mut self, segment_index: u32, data: &[u8]) -> SinkResult {
        self.logf(format_args!(
            "OnDataSegmentData(segment_index: {}, size: {})",
            segment_index,
            data.len()
        ));
        self.inner.on_data_segment_data(segment_index, data)
    }

    fn end_data_segment(&mut self, segment_index: u32) -> SinkResult {
        self.indent -= 1;
        self.logf(format_args!("EndDataSegment(segment_index: {segment_index})"));
        self.inner.end_data_segment(segment_index)
    }

    fn on_init_expr_i32_const(&mut self, index: u32, value: i32) -> SinkResult {
        self.logf(format_args!(
            "OnInitExprI32Const(index: {index}, value: {value})"
        ));
        self.inner.on_init_expr_i32_const(index, value)
    }

    fn on_init_expr_i64_const(&mut self, index: u32, value: i64) -> SinkResult {
        self.logf(format_args!(
            "OnInitExprI64Const(index: {index}, value: {value})"
        ));
        self.inner.on_init_expr_i64_const(index, value)
    }

    fn on_init_expr_f32_const(&mut self, index: u32, value_bits: u32) -> SinkResult {
        self.logf(format_args!(
            "OnInitExprF32Const(index: {index}, value_bits: {value_bits:#010x})"
        ));
        self.inner.on_init_expr_f32_const(index, value_bits)
    }

    fn on_init_expr_f64_const(&mut self, index: u32, value_bits: u64) -> SinkResult {
        self.logf(format_args!(
            "OnInitExprF64Const(index: {index}, value_bits: {value_bits:#018x})"
        ));
        self.inner.on_init_expr_f64_const(index, value_bits)
    }

    fn on_init_expr_get_global(&mut self, index: u32, global_index: u32) -> SinkResult {
        self.logf(format_args!(
            "OnInitExprGetGlobal(index: {index}, global_index: {global_index})"
        ));
        self.inner.on_init_expr_get_global(index, global_index)
    }

    // The raw opcode stream and its immediate echoes are forwarded without
    // tracing; the dedicated per-instruction events below carry the same
    // information in readable form.
    fn on_opcode(&mut self, opcode: Opcode) -> SinkResult {
        self.inner.on_opcode(opcode)
    }
    fn on_opcode_bare(&mut self) -> SinkResult {
        self.inner.on_opcode_bare()
    }
    fn on_opcode_index(&mut self, value: u32) -> SinkResult {
        self.inner.on_opcode_index(value)
    }
    fn on_opcode_u32(&mut self, value: u32) -> SinkResult {
        self.inner.on_opcode_u32(value)
    }
    fn on_opcode_u32_u32(&mut self, first: u32, second: u32) -> SinkResult {
        self.inner.on_opcode_u32_u32(first, second)
    }
    fn on_opcode_u64(&mut self, value: u64) -> SinkResult {
        self.inner.on_opcode_u64(value)
    }
    fn on_opcode_f32(&mut self, value_bits: u32) -> SinkResult {
        self.inner.on_opcode_f32(value_bits)
    }
    fn on_opcode_f64(&mut self, value_bits: u64) -> SinkResult {
        self.inner.on_opcode_f64(value_bits)
    }
    fn on_opcode_block_sig(&mut self, sig: Option<Type>) -> SinkResult {
        self.inner.on_opcode_block_sig(sig)
    }

    logging_bare! {
        on_unreachable, "OnUnreachable";
        on_nop, "OnNop";
        on_else, "OnElse";
        on_drop, "OnDrop";
        on_select, "OnSelect";
        on_return, "OnReturn";
        on_current_memory, "OnCurrentMemory";
        on_grow_memory, "OnGrowMemory";
        on_catch_all, "OnCatchAll";
        on_end_expr, "OnEndExpr";
        on_end_func, "OnEndFunc";
    }

    logging_block_sig! {
        on_block, "OnBlock";
        on_loop, "OnLoop";
        on_if, "OnIf";
        on_try, "OnTry";
    }

    logging_u32! {
        on_br, "OnBr", "depth";
        on_br_if, "OnBrIf", "depth";
        on_call, "OnCall", "func_index";
        on_call_indirect, "OnCallIndirect", "sig_index";
        on_get_local, "OnGetLocal", "local_index";
        on_set_local, "OnSetLocal", "local_index";
        on_tee_local, "OnTeeLocal", "local_index";
        on_get_global, "OnGetGlobal", "global_index";
        on_set_global, "OnSetGlobal", "global_index";
        on_catch, "OnCatch", "except_index";
        on_throw, "OnThrow", "except_index";
        on_rethrow, "OnRethrow", "depth";
    }

    fn on_br_table(&mut self, target_depths: &[u32], default_target_depth: u32) -> SinkResult {
        self.logf(format_args!(
            "OnBrTable(targets: {target_depths:?}, default: {default_target_depth})"
        ));
        self.inner.on_br_table(target_depths, default_target_depth)
    }

    fn on_load(&mut self, opcode: Opcode, alignment_log2: u32, offset: u32) -> SinkResult {
        self.logf(format_args!(
            "OnLoad({opcode}, align_log2: {alignment_log2}, offset: {offset})"
        ));
        self.inner.on_load(opcode, alignment_log2, offset)
    }

    fn on_store(&mut self, opcode: Opcode, alignment_log2: u32, offset: u32) -> SinkResult {
        self.logf(format_args!(
            "OnStore({opcode}, align_log2: {alignment_log2}, offset: {offset})"
        ));
        self.inner.on_store(opcode, alignment_log2, offset)
    }

    fn on_i32_const(&mut self, value: i32) -> SinkResult {
        self.logf(format_args!("OnI32Const(value: {value})"));
        self.inner.on_i32_const(value)
    }

    fn on_i64_const(&mut self, value: i64) -> SinkResult {
        self.logf(format_args!("OnI64Const(value: {value})"));
        self.inner.on_i64_const(value)
    }

    fn on_f32_const(&mut self, value_bits: u32) -> SinkResult {
        self.logf(format_args!("OnF32Const(value_bits: {value_bits:#010x})"));
        self.inner.on_f32_const(value_bits)
    }

    fn on_f64_const(&mut self, value_bits: u64) -> SinkResult {
        self.logf(format_args!("OnF64Const(value_bits: {value_bits:#018x})"));
        self.inner.on_f64_const(value_bits)
    }

    logging_opcode! {
        on_binary, "OnBinary";
        on_compare, "OnCompare";
        on_unary, "OnUnary";
        on_convert, "OnConvert";
    }

    fn on_function_name_subsection(
        &mut self,
        subsection_index: u32,
        name_type: u32,
        size: u32,
    ) -> SinkResult {
        self.logf(format_args!(
            "OnFunctionNameSubsection(index: {subsection_index}, name_type: {name_type}, size: {size})"
        ));
        self.inner
            .on_function_name_subsection(subsection_index, name_type, size)
    }

    fn on_function_name(&mut self, func_index: u32, name: &str) -> SinkResult {
        self.logf(format_args!(
            "OnFunctionName(func_index: {func_index}, name: \"{name}\")"
        ));
        self.inner.on_function_name(func_index, name)
    }

    fn on_local_name_subsection(
        &mut self,
        subsection_index: u32,
        name_type: u32,
        size: u32,
    ) -> SinkResult {
        self.logf(format_args!(
            "OnLocalNameSubsection(index: {subsection_index}, name_type: {name_type}, size: {size})"
        ));
        self.inner
            .on_local_name_subsection(subsection_index, name_type, size)
    }

    fn on_local_name_local_count(&mut self, func_index: u32, count: u32) -> SinkResult {
        self.logf(format_args!(
            "OnLocalNameLocalCount(func_index: {func_index}, count: {count})"
        ));
        self.inner.on_local_name_local_count(func_index, count)
    }

    fn on_local_name(&mut self, func_index: u32, local_index: u32, name: &str) -> SinkResult {
        self.logf(format_args!(
            "OnLocalName(func_index: {func_index}, local_index: {local_index}, name: \"{name}\")"
        ));
        self.inner.on_local_name(func_index, local_index, name)
    }

    fn on_reloc_count(
        &mut self,
        count: u32,
        section: BinarySection,
        section_name: &str,
    ) -> SinkResult {
        self.logf(format_args!(
            "OnRelocCount(count: {count}, section: {section}, section_name: \"{section_name}\")"
        ));
        self.inner.on_reloc_count(count, section, section_name)
    }

    fn on_reloc(&mut self, ty: RelocType, offset: u32, index: u32, addend: i32) -> SinkResult {
        self.logf(format_args!(
            "OnReloc(type: {ty:?}, offset: {offset:#x}, index: {index}, addend: {addend})"
        ));
        self.inner.on_reloc(ty, offset, index, addend)
    }

    fn on_symbol_info(&mut self, name: &str, flags: u32) -> SinkResult {
        self.logf(format_args!(
            "OnSymbolInfo(name: \"{name}\", flags: {flags:#x})"
        ));
        self.inner.on_symbol_info(name, flags)
    }

    fn on_exception_type(&mut self, except_index: u32, sig: &[Type]) -> SinkResult {
        self.logf(format_args!(
            "OnExceptionType(except_index: {}, sig: {})",
            except_index,
            TypeList(sig)
        ));
        self.inner.on_exception_type(except_index, sig)
    }
}
