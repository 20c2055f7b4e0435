//! Terminal output for styled chunks
//!
//! The only place renderer output touches stdout. Code spans print bold
//! green, emphasis spans bold blue, matching the original tool's palette.

use super::{Span, StyledChunk};
use colored::Colorize;
use std::io::Write;

/// Current terminal column count, or `None` when the query fails (wrap
/// injection is disabled rather than failing)
pub fn terminal_width() -> Option<u16> {
    crossterm::terminal::size().ok().map(|(cols, _rows)| cols)
}

/// Print chunks immediately, flushing so partial lines appear as they stream
pub fn print_chunks(chunks: &[StyledChunk]) {
    let mut stdout = std::io::stdout();
    for chunk in chunks {
        match chunk.span {
            Span::Code => {
                let _ = write!(stdout, "{}", chunk.text.green().bold());
            }
            Span::Emphasis => {
                let _ = write!(stdout, "{}", chunk.text.blue().bold());
            }
            Span::Plain => {
                let _ = write!(stdout, "{}", chunk.text);
            }
        }
    }
    let _ = stdout.flush();
}
