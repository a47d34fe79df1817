//! Rendering of a [`LogicalConfig`] as an INI-style text document.
//!
//! Pure and total: the emitter validates nothing, it just formats what the
//! reconciler produced. Section and key order are fixed.

use std::fmt::Write;

use crate::reconcile::{LogicalConfig, KEYBOARD_NAMES};

/// One named section of the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: &'static str,
    /// Key/value pairs in emission order.
    pub pairs: Vec<(&'static str, String)>,
}

/// Build the four output sections in their fixed order.
pub fn sections(config: &LogicalConfig) -> Vec<Section> {
    vec![
        Section {
            name: "Directories",
            pairs: vec![
                ("modules", escape(&config.dir_modules)),
                ("samples", escape(&config.dir_samples)),
                ("instruments", escape(&config.dir_instruments)),
                ("sort_with", "strcasecmp".to_string()),
            ],
        },
        Section {
            name: "General",
            pairs: vec![
                ("classic_mode", "1".to_string()),
                ("palette_cur", config.palette.clone()),
            ],
        },
        Section {
            name: "Pattern Editor",
            pairs: vec![
                ("link_effect_column", bool_value(config.link_effect_column)),
                ("draw_divisions", bool_value(config.draw_divisions)),
                ("centralise_cursor", bool_value(config.centralise_cursor)),
                (
                    "highlight_current_row",
                    bool_value(config.highlight_current_row),
                ),
                (
                    "show_default_volumes",
                    bool_value(config.show_default_volumes),
                ),
                ("edit_copy_mask", config.edit_copy_mask.to_string()),
                (
                    "fast_volume_percent",
                    config.fast_volume_percent.to_string(),
                ),
                ("fast_volume_mode", bool_value(config.fast_volume_mode)),
                ("track_view_scheme", config.track_view_scheme.clone()),
                ("highlight_major", config.row_highlight_major.to_string()),
                ("highlight_minor", config.row_highlight_minor.to_string()),
            ],
        },
        Section {
            name: "MIDI",
            pairs: vec![
                ("flags", config.midi_flags.bits().to_string()),
                ("amplification", config.midi_amplification.to_string()),
                ("c5note", config.midi_c5_note.to_string()),
                ("pitch_depth", "0".to_string()),
            ],
        },
    ]
}

/// Render the complete output document: comment header plus all sections,
/// blank line between sections.
pub fn render(config: &LogicalConfig) -> String {
    let mut out = String::new();

    out.push_str("# Configuration imported from Impulse Tracker\n");
    if config.legacy_keyboard != 0 {
        // The reconciler clamps the id; clamp again so rendering stays total
        // for hand-built configs.
        let _ = writeln!(
            out,
            "# Note: keyboard set to {} (IT <=2.03)",
            KEYBOARD_NAMES[usize::from(config.legacy_keyboard.min(9))]
        );
    }
    out.push('\n');

    for (i, section) in sections(config).iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "[{}]", section.name);
        for (key, value) in &section.pairs {
            let _ = writeln!(out, "{key}={value}");
        }
    }

    out
}

/// Double backslashes so DOS paths survive the config parser.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\")
}

fn bool_value(value: bool) -> String {
    u8::from(value).to_string()
}
