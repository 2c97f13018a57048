//! Colour palette and semantic styles.
//!
//! Warm, low-contrast dark palette. Feature status drives the roadmap
//! bar colours; everything else goes through the `styles` helpers.

use ratatui::style::Color;

use crate::models::FeatureStatus;

pub mod colors {
    use super::Color;

    // Backgrounds
    pub const BG_DARK: Color = Color::Rgb(0x18, 0x16, 0x16);
    pub const BG_MEDIUM: Color = Color::Rgb(0x1D, 0x1C, 0x19);
    pub const BG_HIGHLIGHT: Color = Color::Rgb(0x28, 0x27, 0x27);
    /// Error popup body
    pub const BG_ERROR: Color = Color::Rgb(0x2A, 0x18, 0x18);

    // Foregrounds
    pub const FG_PRIMARY: Color = Color::Rgb(0xC5, 0xC9, 0xC5);
    pub const FG_DIM: Color = Color::Rgb(0x72, 0x71, 0x69);
    pub const FG_HINT: Color = Color::Rgb(0x54, 0x54, 0x54);

    // Accents
    pub const RED: Color = Color::Rgb(0xC4, 0x74, 0x6E);
    pub const GREEN: Color = Color::Rgb(0x8A, 0x9A, 0x7B);
    pub const YELLOW: Color = Color::Rgb(0xC4, 0xB2, 0x8A);
    pub const ORANGE: Color = Color::Rgb(0xB6, 0x92, 0x7B);
    pub const BLUE: Color = Color::Rgb(0x8B, 0xA4, 0xB0);
    pub const PURPLE: Color = Color::Rgb(0x95, 0x7F, 0xB8);

    // Borders
    pub const BORDER: Color = Color::Rgb(0x72, 0x71, 0x69);
    pub const BORDER_DIM: Color = Color::Rgb(0x3A, 0x3A, 0x3A);
    pub const BORDER_ACCENT: Color = BLUE;

    // Roadmap
    pub const TODAY_MARKER: Color = YELLOW;
    pub const BUCKET_SEPARATOR: Color = BORDER_DIM;
}

/// Bar colour for a feature status
pub fn status_color(status: FeatureStatus) -> Color {
    match status {
        FeatureStatus::Backlog => colors::FG_DIM,
        FeatureStatus::Doing => colors::BLUE,
        FeatureStatus::Done => colors::GREEN,
        FeatureStatus::Blocked => colors::RED,
    }
}

/// Single-character status marker used in lists and bars
pub fn status_icon(status: FeatureStatus) -> char {
    match status {
        FeatureStatus::Backlog => '○',
        FeatureStatus::Doing => '●',
        FeatureStatus::Done => '✓',
        FeatureStatus::Blocked => '!',
    }
}

/// Darken an RGB colour; other colours pass through
pub fn dim(color: Color, factor: f32) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            (r as f32 * factor) as u8,
            (g as f32 * factor) as u8,
            (b as f32 * factor) as u8,
        ),
        other => other,
    }
}

pub mod styles {
    use ratatui::style::{Modifier, Style};

    use super::colors;

    pub fn text() -> Style {
        Style::default().fg(colors::FG_PRIMARY)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(colors::FG_DIM)
    }

    pub fn text_hint() -> Style {
        Style::default().fg(colors::FG_HINT)
    }

    pub fn success() -> Style {
        Style::default().fg(colors::GREEN)
    }

    pub fn error() -> Style {
        Style::default().fg(colors::RED)
    }

    pub fn info() -> Style {
        Style::default().fg(colors::BLUE)
    }

    pub fn selected() -> Style {
        Style::default()
            .fg(colors::BG_DARK)
            .bg(colors::BLUE)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(colors::BORDER)
    }

    pub fn border_dim() -> Style {
        Style::default().fg(colors::BORDER_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(colors::BORDER_ACCENT)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_accent() -> Style {
        Style::default()
            .fg(colors::BLUE)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_active() -> Style {
        title_accent()
    }

    pub fn tab_inactive() -> Style {
        text_dim()
    }

    pub fn form_label() -> Style {
        text_dim()
    }

    pub fn form_input() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .bg(colors::BG_MEDIUM)
    }

    pub fn form_input_focused() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .bg(colors::BG_HIGHLIGHT)
    }

    pub fn button() -> Style {
        form_input()
    }

    pub fn button_focused() -> Style {
        selected()
    }

    pub fn button_danger() -> Style {
        Style::default()
            .fg(colors::BG_DARK)
            .bg(colors::RED)
            .add_modifier(Modifier::BOLD)
    }
}
