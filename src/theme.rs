//! Terminal theme helpers.
//!
//! Respects the `NO_COLOR` env-var and the `--no-color` CLI flag. Styling is
//! reserved for startup and status output; the relay's operational log lines
//! stay plain so they are stable to grep and to scripts watching stdout.

use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Global color toggle ─────────────────────────────────────────────────────

static COLOR_DISABLED: AtomicBool = AtomicBool::new(false);

/// Call once at startup (after CLI parsing) to disable colour globally.
pub fn disable_color() {
    COLOR_DISABLED.store(true, Ordering::Relaxed);
    colored::control::set_override(false);
}

/// Initialise the colour system.  Checks `NO_COLOR` env-var and optional
/// `--no-color` flag.
pub fn init_color(no_color_flag: bool) {
    if no_color_flag
        || std::env::var("NO_COLOR")
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    {
        disable_color();
    }
}

fn is_color() -> bool {
    !COLOR_DISABLED.load(Ordering::Relaxed)
}

// ── Palette ─────────────────────────────────────────────────────────────────

/// Palette hex values — source of truth.
pub mod palette {
    pub const ACCENT: (u8, u8, u8) = (0xFF, 0x5A, 0x2D);
    pub const INFO: (u8, u8, u8) = (0xFF, 0x8A, 0x5B);
    pub const SUCCESS: (u8, u8, u8) = (0x2F, 0xBF, 0x71);
    pub const MUTED: (u8, u8, u8) = (0x8B, 0x7F, 0x77);
}

// ── Themed formatting helpers ───────────────────────────────────────────────
//
// Each function returns a `String` so callers can `println!("{}", accent("…"))`.

fn apply(text: &str, rgb: (u8, u8, u8)) -> String {
    if is_color() {
        text.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        text.to_string()
    }
}

/// Primary accent (headings, labels).
pub fn accent(text: &str) -> String {
    apply(text, palette::ACCENT)
}

/// Informational values.
pub fn info(text: &str) -> String {
    apply(text, palette::INFO)
}

/// Success state.
pub fn success(text: &str) -> String {
    apply(text, palette::SUCCESS)
}

/// De-emphasis / metadata.
pub fn muted(text: &str) -> String {
    apply(text, palette::MUTED)
}

// ── Composite icons ─────────────────────────────────────────────────────────

/// Green ✓
pub fn icon_ok(label: &str) -> String {
    format!("{} {}", success("✓"), label)
}

// ── Labelled key : value ────────────────────────────────────────────────────

/// Format "  Label  : value" with the label dimmed and the value in accent.
pub fn label_value(label: &str, value: &str) -> String {
    format!("  {} : {}", muted(label), info(value))
}

// ── Box drawing ─────────────────────────────────────────────────────────────

/// Print a styled header box around a title.
pub fn print_header(title: &str) {
    use unicode_width::UnicodeWidthStr;

    let display_w = UnicodeWidthStr::width(title);
    // Inner width = display width of title + at least 4 chars padding (2 each side)
    let inner = (display_w + 4).max(42);
    let pad = inner - display_w;
    let left = pad / 2;
    let right = pad - left;
    println!();
    println!("{}", accent(&format!("┌{}┐", "─".repeat(inner))));
    println!(
        "{}",
        accent(&format!(
            "│{}{}{}│",
            " ".repeat(left),
            title,
            " ".repeat(right)
        ))
    );
    println!("{}", accent(&format!("└{}┘", "─".repeat(inner))));
    println!();
}

// ── Tests ───────────────────────────────────────────────────────────────────
