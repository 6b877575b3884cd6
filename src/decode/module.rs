//! Module preamble and top-level section dispatch.
use crate::decode::{Decoder, callback};
use crate::error::{DecodeError, ErrorKind};
use crate::sink::Sink;
use crate::types::BinarySection;

const BINARY_MAGIC: u32 = 0x6D73_6100;
const BINARY_VERSION: u32 = 1;

impl<S: Sink + ?Sized> Decoder<'_, '_, S> {
    pub(crate) fn read_module(&mut self) -> Result<(), DecodeError> {
        let magic = self.read_u32("magic")?;
        if magic != BINARY_MAGIC {
            return Err(self.fail_at(0, ErrorKind::BadMagic));
        }
        let version = self.read_u32("version")?;
        if version != BINARY_VERSION {
            return Err(self.fail_at(
                4,
                ErrorKind::BadVersion {
                    actual: version,
                    expected: BINARY_VERSION,
                },
            ));
        }

        callback!(self, begin_module, version);
        self.read_sections()?;
        callback!(self, end_module);
        Ok(())
    }

    fn read_sections(&mut self) -> Result<(), DecodeError> {
        while self.offset < self.data.len() {
            // The window is widened back to the full input so the next
            // section header can be read.
            self.read_end = self.data.len();
            let section_code = self.read_u32_leb128("section code")?;
            let section_size = self.read_offset("section size")?;
            self.read_end = self.offset + section_size;

            let Some(section) = BinarySection::from_code(section_code) else {
                return Err(self.fail(ErrorKind::InvalidSectionCode(section_code)));
            };

            if self.read_end > self.data.len() {
                return Err(self.fail(ErrorKind::SectionExtendsPastEnd));
            }

            if let Some(last) = self.last_known_section
                && section != BinarySection::Custom
                && section <= last
            {
                return Err(self.fail(ErrorKind::SectionOutOfOrder(section)));
            }

            log::debug!(
                "section {} ({} bytes at {:#x})",
                section.name(),
                section_size,
                self.offset
            );
            callback!(self, begin_section, section, section_size as u32);

            match section {
                BinarySection::Custom => self.read_custom_section(section_size as u32)?,
                BinarySection::Type => self.read_type_section(section_size as u32)?,
                BinarySection::Import => self.read_import_section(section_size as u32)?,
                BinarySection::Function => self.read_function_section(section_size as u32)?,
                BinarySection::Table => self.read_table_section(section_size as u32)?,
                BinarySection::Memory => self.read_memory_section(section_size as u32)?,
                BinarySection::Global => self.read_global_section(section_size as u32)?,
                BinarySection::Export => self.read_export_section(section_size as u32)?,
                BinarySection::Start => self.read_start_section(section_size as u32)?,
                BinarySection::Element => self.read_elem_section(section_size as u32)?,
                BinarySection::Code => self.read_code_section(section_size as u32)?,
                BinarySection::Data => self.read_data_section(section_size as u32)?,
            }

            if self.offset != self.read_end {
                return Err(self.fail(ErrorKind::UnfinishedSection {
                    expected_end: self.read_end,
                }));
            }

            if section != BinarySection::Custom {
                self.last_known_section = Some(section);
            }
        }
        Ok(())
    }
}
