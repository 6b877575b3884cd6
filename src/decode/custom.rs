//! Custom sections the decoder understands by name: `"name"`, `"reloc.*"`,
//! `"linking"`, and the feature-gated `"exception"`. Anything else is
//! skipped without inspecting the payload.
use crate::decode::{Decoder, callback};
use crate::error::{DecodeError, ErrorKind};
use crate::sink::Sink;
use crate::types::{BinarySection, RelocType};

// Subsection types of the "name" section.
const NAME_SUBSECTION_FUNCTION: u32 = 1;
const NAME_SUBSECTION_LOCAL: u32 = 2;

// Subsection types of the "linking" section.
const LINKING_STACK_POINTER: u32 = 1;
const LINKING_SYMBOL_INFO: u32 = 2;

impl<S: Sink + ?Sized> Decoder<'_, '_, S> {
    pub(crate) fn read_custom_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        let section_name = self.read_str("section name")?;
        callback!(self, begin_custom_section, section_size, section_name);

        // The name section must follow the import section, so a module
        // that has not reached it yet treats "name" as unknown.
        let name_section_ok =
            matches!(self.last_known_section, Some(s) if s >= BinarySection::Import);
        if self.read_debug_names && name_section_ok && section_name == "name" {
            self.read_names_section(section_size)?;
        } else if section_name.starts_with("reloc.") {
            self.read_reloc_section(section_size)?;
        } else if section_name == "linking" {
            self.read_linking_section(section_size)?;
        } else if self.features.exceptions && section_name == "exception" {
            self.read_exception_section(section_size)?;
        } else {
            // Unknown custom section, skip it.
            log::trace!("skipping custom section {section_name:?}");
            self.offset = self.read_end;
        }
        callback!(self, end_custom_section);
        Ok(())
    }

    fn read_names_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_names_section, section_size);
        let mut i = 0;
        let previous_read_end = self.read_end;
        let mut previous_subsection_type = 0;
        while self.offset < self.read_end {
            let name_type = self.read_u32_leb128("name type")?;
            if i != 0 {
                if name_type == previous_subsection_type {
                    return Err(self.fail(ErrorKind::DuplicateSubSection));
                }
                if name_type < previous_subsection_type {
                    return Err(self.fail(ErrorKind::OutOfOrderSubSection));
                }
            }
            previous_subsection_type = name_type;
            let subsection_size = self.read_offset("subsection size")?;
            let subsection_end = self.offset + subsection_size;
            if subsection_end > self.read_end {
                return Err(self.fail(ErrorKind::SubSectionExtendsPastEnd));
            }
            self.read_end = subsection_end;

            match name_type {
                NAME_SUBSECTION_FUNCTION => {
                    callback!(
                        self,
                        on_function_name_subsection,
                        i,
                        name_type,
                        subsection_size as u32,
                    );
                    if subsection_size != 0 {
                        self.read_function_names()?;
                    }
                }
                NAME_SUBSECTION_LOCAL => {
                    callback!(
                        self,
                        on_local_name_subsection,
                        i,
                        name_type,
                        subsection_size as u32,
                    );
                    if subsection_size != 0 {
                        self.read_local_names()?;
                    }
                }
                _ => {
                    // Unknown subsection, skip it.
                    self.offset = subsection_end;
                }
            }
            i += 1;
            if self.offset != subsection_end {
                return Err(self.fail(ErrorKind::UnfinishedSubSection {
                    expected_end: subsection_end,
                }));
            }
            self.read_end = previous_read_end;
        }
        callback!(self, end_names_section);
        Ok(())
    }

    fn read_function_names(&mut self) -> Result<(), DecodeError> {
        let num_names = self.read_index("name count")?;
        callback!(self, on_function_names_count, num_names);
        let mut last_function_index = None;

        for _ in 0..num_names {
            let function_index = self.read_index("function index")?;
            if let Some(last) = last_function_index {
                if function_index == last {
                    return Err(self.fail(ErrorKind::DuplicateFunctionName(function_index)));
                }
                if function_index < last {
                    return Err(self.fail(ErrorKind::FunctionNameIndexOutOfOrder(function_index)));
                }
            }
            last_function_index = Some(function_index);
            if function_index >= self.num_total_funcs() {
                return Err(self.fail(ErrorKind::InvalidFunctionIndex(function_index)));
            }
            let function_name = self.read_str("function name")?;
            callback!(self, on_function_name, function_index, function_name);
        }
        Ok(())
    }

    fn read_local_names(&mut self) -> Result<(), DecodeError> {
        let num_funcs = self.read_index("function count")?;
        callback!(self, on_local_name_function_count, num_funcs);
        let mut last_function_index = None;

        for _ in 0..num_funcs {
            let function_index = self.read_index("function index")?;
            if function_index >= self.num_total_funcs() {
                return Err(self.fail(ErrorKind::InvalidFunctionIndex(function_index)));
            }
            if let Some(last) = last_function_index
                && function_index <= last
            {
                return Err(self.fail(ErrorKind::LocalsFunctionIndexOutOfOrder(function_index)));
            }
            last_function_index = Some(function_index);

            let num_locals = self.read_index("local count")?;
            callback!(self, on_local_name_local_count, function_index, num_locals);
            let mut last_local_index = None;
            for _ in 0..num_locals {
                let local_index = self.read_index("named index")?;
                if let Some(last) = last_local_index {
                    if local_index == last {
                        return Err(self.fail(ErrorKind::DuplicateLocalIndex(local_index)));
                    }
                    if local_index < last {
                        return Err(self.fail(ErrorKind::LocalIndexOutOfOrder(local_index)));
                    }
                }
                last_local_index = Some(local_index);
                let local_name = self.read_str("name")?;
                callback!(self, on_local_name, function_index, local_index, local_name);
            }
        }
        Ok(())
    }

    fn read_reloc_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_reloc_section, section_size);
        let section_code = self.read_u32_leb128("section")?;
        let Some(section) = BinarySection::from_code(section_code) else {
            return Err(self.fail(ErrorKind::InvalidSectionCode(section_code)));
        };
        let mut section_name = "";
        if section == BinarySection::Custom {
            section_name = self.read_str("section name")?;
        }
        let num_relocs = self.read_index("relocation count")?;
        callback!(self, on_reloc_count, num_relocs, section, section_name);

        for _ in 0..num_relocs {
            let reloc_type = self.read_u32_leb128("relocation type")?;
            let Some(ty) = RelocType::from_code(reloc_type) else {
                return Err(self.fail(ErrorKind::InvalidRelocType(reloc_type)));
            };
            let offset = self.read_offset("offset")?;
            let index = self.read_index("index")?;
            let mut addend = 0;
            if ty.has_addend() {
                addend = self.read_i32_leb128("addend")?;
            }
            callback!(self, on_reloc, ty, offset as u32, index, addend);
        }
        callback!(self, end_reloc_section);
        Ok(())
    }

    fn read_linking_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_linking_section, section_size);
        let previous_read_end = self.read_end;
        while self.offset < self.read_end {
            let linking_type = self.read_u32_leb128("type")?;
            let subsection_size = self.read_offset("subsection size")?;
            let subsection_end = self.offset + subsection_size;
            if subsection_end > self.read_end {
                return Err(self.fail(ErrorKind::SubSectionExtendsPastEnd));
            }
            self.read_end = subsection_end;

            match linking_type {
                LINKING_STACK_POINTER => {
                    let stack_ptr = self.read_u32_leb128("stack pointer index")?;
                    callback!(self, on_stack_global, stack_ptr);
                }
                LINKING_SYMBOL_INFO => {
                    let info_count = self.read_u32_leb128("info count")?;
                    callback!(self, on_symbol_info_count, info_count);
                    for _ in 0..info_count {
                        let name = self.read_str("symbol name")?;
                        let flags = self.read_u32_leb128("sym flags")?;
                        callback!(self, on_symbol_info, name, flags);
                    }
                }
                _ => {
                    // Unknown subsection, skip it.
                    self.offset = subsection_end;
                }
            }
            if self.offset != subsection_end {
                return Err(self.fail(ErrorKind::UnfinishedSubSection {
                    expected_end: subsection_end,
                }));
            }
            self.read_end = previous_read_end;
        }
        callback!(self, end_linking_section);
        Ok(())
    }

    fn read_exception_section(&mut self, section_size: u32) -> Result<(), DecodeError> {
        callback!(self, begin_exception_section, section_size);
        self.num_exceptions = self.read_index("exception count")?;
        callback!(self, on_exception_count, self.num_exceptions);

        for i in 0..self.num_exceptions {
            let sig = self.read_exception_type()?;
            callback!(self, on_exception_type, i, &sig);
        }

        callback!(self, end_exception_section);
        Ok(())
    }
}
