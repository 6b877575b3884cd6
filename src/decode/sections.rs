//! Decoders for the eleven known section kinds, the shared table, memory,
//! global and exception-signature readers, and initializer expressions.
use crate::decode::{Decoder, callback};
use crate::error::{DecodeError, ErrorKind};
use crate::opcode::Opcode;
use crate::sink::Sink;
use crate::types::{ExternalKind, FromMarkerByte, LIMITS_HAS_MAX_FLAG, Limits, MAX_PAGES, Type};

impl<S: Sink + ?Sized> Decoder<'_, '_, S> {
    pub(crate) fn read_type_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_type_section, section_size);
        self.num_signatures = self.read_index("type count")?;
        callback!(self, on_type_count, self.num_signatures);

        for i in 0..self.num_signatures {
            let form = self.read_type("type form")?;
            if form != Type::Func {
                return Err(self.fail(ErrorKind::UnexpectedTypeForm(form)));
            }

            let num_params = self.read_index("function param count")?;
            self.param_types.clear();
            for _ in 0..num_params {
                let param_type = self.read_type("function param type")?;
                if !param_type.is_concrete() {
                    return Err(self.fail(ErrorKind::InvalidParamType(param_type)));
                }
                self.param_types.push(param_type);
            }

            let num_results = self.read_index("function result count")?;
            if num_results > 1 {
                return Err(self.fail(ErrorKind::InvalidResultCount));
            }

            let mut result_type = None;
            if num_results != 0 {
                let ty = self.read_type("function result type")?;
                if !ty.is_concrete() {
                    return Err(self.fail(ErrorKind::InvalidResultType(ty)));
                }
                result_type = Some(ty);
            }

            callback!(self, on_type, i, &self.param_types, result_type);
        }
        callback!(self, end_type_section);
        Ok(())
    }

    pub(crate) fn read_import_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_import_section, section_size);
        self.num_imports = self.read_index("import count")?;
        callback!(self, on_import_count, self.num_imports);

        for i in 0..self.num_imports {
            let module_name = self.read_str("import module name")?;
            let field_name = self.read_str("import field name")?;

            let kind = self.read_u32_leb128("import kind")?;
            let kind = u8::try_from(kind)
                .ok()
                .and_then(ExternalKind::from_marker)
                .ok_or_else(|| self.fail(ErrorKind::InvalidImportKind(kind)))?;
            match kind {
                ExternalKind::Func => {
                    let sig_index = self.read_index("import signature index")?;
                    if sig_index >= self.num_signatures {
                        return Err(self.fail(ErrorKind::InvalidImportSignatureIndex));
                    }
                    callback!(self, on_import, i, module_name, field_name);
                    callback!(self, on_import_func, i, self.num_func_imports, sig_index);
                    self.num_func_imports += 1;
                }
                ExternalKind::Table => {
                    let (elem_type, elem_limits) = self.read_table()?;
                    callback!(self, on_import, i, module_name, field_name);
                    callback!(
                        self,
                        on_import_table,
                        i,
                        self.num_table_imports,
                        elem_type,
                        &elem_limits,
                    );
                    self.num_table_imports += 1;
                }
                ExternalKind::Memory => {
                    let page_limits = self.read_memory()?;
                    callback!(self, on_import, i, module_name, field_name);
                    callback!(
                        self,
                        on_import_memory,
                        i,
                        self.num_memory_imports,
                        &page_limits,
                    );
                    self.num_memory_imports += 1;
                }
                ExternalKind::Global => {
                    let (ty, mutable) = self.read_global_header()?;
                    callback!(self, on_import, i, module_name, field_name);
                    callback!(
                        self,
                        on_import_global,
                        i,
                        self.num_global_imports,
                        ty,
                        mutable,
                    );
                    self.num_global_imports += 1;
                }
                ExternalKind::Except => {
                    if !self.features.exceptions {
                        return Err(self.fail(ErrorKind::ImportExceptionsDisabled));
                    }
                    let sig = self.read_exception_type()?;
                    callback!(self, on_import, i, module_name, field_name);
                    callback!(
                        self,
                        on_import_exception,
                        i,
                        self.num_exception_imports,
                        &sig,
                    );
                    self.num_exception_imports += 1;
                }
            }
        }
        callback!(self, end_import_section);
        Ok(())
    }

    pub(crate) fn read_function_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_function_section, section_size);
        self.num_function_signatures = self.read_index("function signature count")?;
        callback!(self, on_function_count, self.num_function_signatures);

        for i in 0..self.num_function_signatures {
            let func_index = self.num_func_imports + i;
            let sig_index = self.read_index("function signature index")?;
            if sig_index >= self.num_signatures {
                return Err(self.fail(ErrorKind::InvalidFunctionSignatureIndex(sig_index)));
            }
            callback!(self, on_function, func_index, sig_index);
        }
        callback!(self, end_function_section);
        Ok(())
    }

    pub(crate) fn read_table_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_table_section, section_size);
        self.num_tables = self.read_index("table count")?;
        if self.num_tables > 1 {
            return Err(self.fail(ErrorKind::InvalidTableCount(self.num_tables)));
        }
        callback!(self, on_table_count, self.num_tables);

        for i in 0..self.num_tables {
            let table_index = self.num_table_imports + i;
            let (elem_type, elem_limits) = self.read_table()?;
            callback!(self, on_table, table_index, elem_type, &elem_limits);
        }
        callback!(self, end_table_section);
        Ok(())
    }

    pub(crate) fn read_memory_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_memory_section, section_size);
        self.num_memories = self.read_index("memory count")?;
        if self.num_memories > 1 {
            return Err(self.fail(ErrorKind::InvalidMemoryCount(self.num_memories)));
        }
        callback!(self, on_memory_count, self.num_memories);

        for i in 0..self.num_memories {
            let memory_index = self.num_memory_imports + i;
            let page_limits = self.read_memory()?;
            callback!(self, on_memory, memory_index, &page_limits);
        }
        callback!(self, end_memory_section);
        Ok(())
    }

    pub(crate) fn read_global_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_global_section, section_size);
        self.num_globals = self.read_index("global count")?;
        callback!(self, on_global_count, self.num_globals);

        for i in 0..self.num_globals {
            let global_index = self.num_global_imports + i;
            let (global_type, mutable) = self.read_global_header()?;
            callback!(self, begin_global, global_index, global_type, mutable);
            callback!(self, begin_global_init_expr, global_index);
            self.read_init_expr(global_index)?;
            callback!(self, end_global_init_expr, global_index);
            callback!(self, end_global, global_index);
        }
        callback!(self, end_global_section);
        Ok(())
    }

    pub(crate) fn read_export_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_export_section, section_size);
        self.num_exports = self.read_index("export count")?;
        callback!(self, on_export_count, self.num_exports);

        for i in 0..self.num_exports {
            let name = self.read_str("export item name")?;

            let kind_byte = self.read_u8("export external kind")?;
            let Some(kind) = ExternalKind::from_marker(kind_byte) else {
                return Err(self.fail(ErrorKind::InvalidExportExternalKind(kind_byte)));
            };

            let item_index = self.read_index("export item index")?;
            let total = match kind {
                ExternalKind::Func => Some(self.num_total_funcs()),
                ExternalKind::Table => Some(self.num_total_tables()),
                ExternalKind::Memory => Some(self.num_total_memories()),
                ExternalKind::Global => Some(self.num_total_globals()),
                ExternalKind::Except => {
                    // The index cannot be validated here: the exception
                    // section follows the export section.
                    if !self.features.exceptions {
                        return Err(self.fail(ErrorKind::ExportExceptionsDisabled));
                    }
                    None
                }
            };
            if let Some(total) = total
                && item_index >= total
            {
                return Err(self.fail(ErrorKind::InvalidExportIndex {
                    kind: kind.name(),
                    index: item_index,
                }));
            }

            callback!(self, on_export, i, kind, item_index, name);
        }
        callback!(self, end_export_section);
        Ok(())
    }

    pub(crate) fn read_start_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_start_section, section_size);
        let func_index = self.read_index("start function index")?;
        if func_index >= self.num_total_funcs() {
            return Err(self.fail(ErrorKind::InvalidStartFunctionIndex(func_index)));
        }
        callback!(self, on_start_function, func_index);
        callback!(self, end_start_section);
        Ok(())
    }

    pub(crate) fn read_elem_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_elem_section, section_size);
        let num_elem_segments = self.read_index("elem segment count")?;
        callback!(self, on_elem_segment_count, num_elem_segments);
        if num_elem_segments != 0 && self.num_total_tables() == 0 {
            return Err(self.fail(ErrorKind::ElemSectionWithoutTable));
        }

        for i in 0..num_elem_segments {
            let table_index = self.read_index("elem segment table index")?;
            callback!(self, begin_elem_segment, i, table_index);
            callback!(self, begin_elem_segment_init_expr, i);
            self.read_init_expr(i)?;
            callback!(self, end_elem_segment_init_expr, i);

            let num_function_indexes = self.read_index("elem segment function index count")?;
            callback!(self, on_elem_segment_function_index_count, i, num_function_indexes);
            for _ in 0..num_function_indexes {
                let func_index = self.read_index("elem segment function index")?;
                callback!(self, on_elem_segment_function_index, i, func_index);
            }
            callback!(self, end_elem_segment, i);
        }
        callback!(self, end_elem_section);
        Ok(())
    }

    pub(crate) fn read_code_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_code_section, section_size);
        self.num_function_bodies = self.read_index("function body count")?;
        if self.num_function_signatures != self.num_function_bodies {
            return Err(self.fail(ErrorKind::FunctionCountMismatch));
        }
        callback!(self, on_function_body_count, self.num_function_bodies);

        for i in 0..self.num_function_bodies {
            let func_index = self.num_func_imports + i;
            callback!(self, begin_function_body, func_index);
            let body_size = self.read_offset("function body size")?;
            let end_offset = self.offset + body_size;

            let num_local_decls = self.read_index("local declaration count")?;
            callback!(self, on_local_decl_count, num_local_decls);
            for k in 0..num_local_decls {
                let num_local_types = self.read_index("local type count")?;
                let local_type = self.read_type("local type")?;
                if !local_type.is_concrete() {
                    return Err(self.fail(ErrorKind::InvalidLocalType(local_type)));
                }
                callback!(self, on_local_decl, k, num_local_types, local_type);
            }

            self.read_function_body(end_offset)?;

            callback!(self, end_function_body, func_index);
        }
        callback!(self, end_code_section);
        Ok(())
    }

    pub(crate) fn read_data_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_data_section, section_size);
        let num_data_segments = self.read_index("data segment count")?;
        callback!(self, on_data_segment_count, num_data_segments);
        if num_data_segments != 0 && self.num_total_memories() == 0 {
            return Err(self.fail(ErrorKind::DataSectionWithoutMemory));
        }

        for i in 0..num_data_segments {
            let memory_index = self.read_index("data segment memory index")?;
            callback!(self, begin_data_segment, i, memory_index);
            callback!(self, begin_data_segment_init_expr, i);
            self.read_init_expr(i)?;
            callback!(self, end_data_segment_init_expr, i);

            let data = self.read_bytes("data segment data")?;
            callback!(self, on_data_segment_data, i, data);
            callback!(self, end_data_segment, i);
        }
        callback!(self, end_data_section);
        Ok(())
    }

    /// Element type plus limits, shared by the table section and table
    /// imports.
    pub(crate) fn read_table(&mut self) -> Result<(Type, Limits), DecodeError> {
        let elem_type = self.read_type("table elem type")?;
        if elem_type != Type::Anyfunc {
            return Err(self.fail(ErrorKind::TableElemTypeNotAnyfunc));
        }

        let flags = self.read_u32_leb128("table flags")?;
        let initial = self.read_u32_leb128("table initial elem count")?;
        let mut max = None;
        if flags & LIMITS_HAS_MAX_FLAG != 0 {
            let value = self.read_u32_leb128("table max elem count")?;
            if initial > value {
                return Err(self.fail(ErrorKind::TableInitialPastMax));
            }
            max = Some(value);
        }

        Ok((elem_type, Limits { initial, max }))
    }

    /// Page limits, shared by the memory section and memory imports.
    pub(crate) fn read_memory(&mut self) -> Result<Limits, DecodeError> {
        let flags = self.read_u32_leb128("memory flags")?;
        let initial = self.read_u32_leb128("memory initial page count")?;
        if initial > MAX_PAGES {
            return Err(self.fail(ErrorKind::InvalidMemoryInitialSize));
        }
        let mut max = None;
        if flags & LIMITS_HAS_MAX_FLAG != 0 {
            let value = self.read_u32_leb128("memory max page count")?;
            if value > MAX_PAGES {
                return Err(self.fail(ErrorKind::InvalidMemoryMaxSize));
            }
            if initial > value {
                return Err(self.fail(ErrorKind::MemoryInitialPastMax));
            }
            max = Some(value);
        }

        Ok(Limits { initial, max })
    }

    /// Value type and mutability, shared by the global section and global
    /// imports.
    pub(crate) fn read_global_header(&mut self) -> Result<(Type, bool), DecodeError> {
        let global_type = self.read_type("global type")?;
        if !global_type.is_concrete() {
            return Err(self.fail(ErrorKind::InvalidGlobalType(global_type)));
        }

        let mutable = self.read_u8("global mutability")?;
        if mutable > 1 {
            return Err(self.fail(ErrorKind::InvalidGlobalMutability));
        }

        Ok((global_type, mutable == 1))
    }

    /// The list of concrete value types an exception carries, shared by
    /// exception imports and the exception custom section.
    pub(crate) fn read_exception_type(&mut self) -> Result<Vec<Type>, DecodeError> {
        let num_values = self.read_index("exception type count")?;
        let mut sig = Vec::new();
        for _ in 0..num_values {
            let value_type = self.read_type("exception value type")?;
            if !value_type.is_concrete() {
                return Err(self.fail(ErrorKind::InvalidExceptionValueType(value_type)));
            }
            sig.push(value_type);
        }
        Ok(sig)
    }

    /// One constant-producing opcode followed by `end`; a leading `end` is
    /// an empty initializer. `index` is the global or segment being
    /// initialized.
    pub(crate) fn read_init_expr(&mut self, index: u32) -> Result<(), DecodeError> {
        let (opcode, raw) = self.read_opcode("opcode")?;
        match opcode {
            Some(Opcode::I32Const) => {
                let value = self.read_i32_leb128("init_expr i32.const value")?;
                callback!(self, on_init_expr_i32_const, index, value);
            }
            Some(Opcode::I64Const) => {
                let value = self.read_i64_leb128("init_expr i64.const value")?;
                callback!(self, on_init_expr_i64_const, index, value);
            }
            Some(Opcode::F32Const) => {
                let value_bits = self.read_f32_bits("init_expr f32.const value")?;
                callback!(self, on_init_expr_f32_const, index, value_bits);
            }
            Some(Opcode::F64Const) => {
                let value_bits = self.read_f64_bits("init_expr f64.const value")?;
                callback!(self, on_init_expr_f64_const, index, value_bits);
            }
            Some(Opcode::GetGlobal) => {
                let global_index = self.read_index("init_expr get_global index")?;
                callback!(self, on_init_expr_get_global, index, global_index);
            }
            Some(Opcode::End) => return Ok(()),
            _ => return Err(self.fail(ErrorKind::UnexpectedOpcodeInInitExpr(raw))),
        }

        let (opcode, _) = self.read_opcode("opcode")?;
        if opcode != Some(Opcode::End) {
            return Err(self.fail(ErrorKind::ExpectedEndAfterInitExpr));
        }
        Ok(())
    }
}
