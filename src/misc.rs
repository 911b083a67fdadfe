use std::sync::atomic::{AtomicUsize, Ordering};

use owo_colors::AnsiColors;

static NEXT_TERMINAL_COLOR: AtomicUsize = AtomicUsize::new(0);

const TERMINAL_COLORS: [AnsiColors; 6] = [
    AnsiColors::Green,
    AnsiColors::Cyan,
    AnsiColors::Magenta,
    AnsiColors::Yellow,
    AnsiColors::Blue,
    AnsiColors::BrightRed,
];

/// Cycles through a set of terminal colors, used so that the forwarded output
/// of consecutive commands can be told apart
pub fn next_terminal_color() -> AnsiColors {
    let i = NEXT_TERMINAL_COLOR.fetch_add(1, Ordering::Relaxed);
    TERMINAL_COLORS[i % TERMINAL_COLORS.len()]
}
