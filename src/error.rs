use std::io;

/// Errors surfaced by the core and the ROM loader.
#[derive(Debug, thiserror::Error)]
pub enum ChipError {
    #[error("program too large ({size} bytes), max is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ChipError>;
