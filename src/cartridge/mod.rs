use std::fs::File;
use std::io::{Error, ErrorKind, Read, Result};

use crate::bus::{Bus, PRG_BANK_SIZE};

const INES_MAGIC: &[u8; 4] = b"NES\x1a";
const INES_HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 512;
const FLAG6_TRAINER: u8 = 0x04;
/// Largest flat image that fits $8000-$FFFF.
pub const MAX_RAW_IMAGE: usize = 0x8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomFormat {
    INes,
    Raw,
}

pub struct Cartridge {
    prg_rom: Vec<u8>,
    mapper: u8,
    format: RomFormat,
}

impl Cartridge {
    pub fn load(path: &str) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.starts_with(INES_MAGIC) {
            Self::from_ines(data)
        } else {
            Self::from_raw(data)
        }
    }

    fn from_ines(data: &[u8]) -> Result<Self> {
        if data.len() < INES_HEADER_SIZE {
            return Err(invalid("Truncated iNES header"));
        }

        let prg_rom_size = data[4] as usize * PRG_BANK_SIZE;
        let flags6 = data[6];
        let flags7 = data[7];
        let mapper = (flags7 & 0xF0) | (flags6 >> 4);

        if prg_rom_size == 0 {
            return Err(invalid("iNES header declares no PRG ROM"));
        }
        if prg_rom_size > MAX_RAW_IMAGE {
            return Err(invalid(&format!(
                "PRG ROM of {} bytes needs bank switching",
                prg_rom_size
            )));
        }

        let mut prg_rom_start = INES_HEADER_SIZE;
        if flags6 & FLAG6_TRAINER != 0 {
            prg_rom_start += TRAINER_SIZE;
        }
        let prg_rom = data
            .get(prg_rom_start..prg_rom_start + prg_rom_size)
            .ok_or_else(|| invalid("PRG ROM extends past end of file"))?
            .to_vec();

        if mapper != 0 {
            log::warn!(
                "Mapper {} not supported, PRG is mapped linearly without banking",
                mapper
            );
        }
        log::debug!(
            "Cartridge loaded - Mapper: {}, PRG ROM: {} bytes",
            mapper,
            prg_rom.len()
        );

        Ok(Cartridge {
            prg_rom,
            mapper,
            format: RomFormat::INes,
        })
    }

    fn from_raw(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(invalid("Empty ROM image"));
        }
        if data.len() > MAX_RAW_IMAGE {
            return Err(invalid(&format!(
                "Raw image of {} bytes exceeds {} bytes",
                data.len(),
                MAX_RAW_IMAGE
            )));
        }
        log::debug!("Raw image loaded: {} bytes", data.len());

        Ok(Cartridge {
            prg_rom: data.to_vec(),
            mapper: 0,
            format: RomFormat::Raw,
        })
    }

    pub fn install(&self, bus: &mut Bus) {
        bus.load_prg(&self.prg_rom);
    }

    pub fn prg_rom(&self) -> &[u8] {
        &self.prg_rom
    }

    pub fn mapper(&self) -> u8 {
        self.mapper
    }

    pub fn format(&self) -> RomFormat {
        self.format
    }
}

fn invalid(message: &str) -> Error {
    Error::new(ErrorKind::InvalidData, message)
}
