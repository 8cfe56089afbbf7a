use std::io;

/// Everything that can go wrong inside the machine itself. Front-end
/// failures (terminal, file paths) never end up in here.
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("failed to read ROM: {0}")]
    Io(#[from] io::Error),
}
