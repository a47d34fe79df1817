use bitflags::bitflags;

use crate::codepage;
use crate::diag::{ordinal, pluralize, DiagnosticSink, Subsystem};
use crate::record::{RawRecord, INFO_PAGE_SLOTS};

/// 64-symbol alphabet packing one 6-bit palette component per character.
pub const PALETTE_ALPHABET: &[u8; 64] =
    b".0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Single-letter codes for per-channel track view schemes.
const SCHEME_ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Window-name tokens for info-page window types 0..=11.
const WINDOW_TYPE_NAMES: [&str; 12] = [
    "samples", "track5", "track8", "track10", "track12", "track18", "track24", "track36",
    "track64", "global", "dots", "tech",
];

/// Keyboard layouts selectable before IT 2.04, ids 0..=9.
pub const KEYBOARD_NAMES: [&str; 10] = [
    "United States",
    "United Kingdom",
    "Sweden/Finland",
    "Spain",
    "Portugal",
    "Netherlands",
    "Italy",
    "Germany",
    "France",
    "unknown",
];

/// Screen row where the first info-page window starts.
const FIRST_INFO_ROW: u32 = 12;

/// Total screen rows available to the info page.
const SCREEN_ROWS: u32 = 50;

/// VGA bytes per screen row: 80 characters, 2 bytes each.
const BYTES_PER_ROW: u32 = 160;

bitflags! {
    /// First packed flag byte: pattern-editor behavior in the low bits,
    /// MIDI recording options above them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct PatternFlags1: u8 {
        const CENTRALISE_CURSOR = 1 << 0;
        const HIGHLIGHT_CURRENT_ROW = 1 << 1;
        const FAST_VOLUME_MODE = 1 << 2;
        const MIDI_TICK_QUANTIZE = 1 << 3;
        const MIDI_BASE_PROGRAM_1 = 1 << 4;
        const MIDI_RECORD_NOTE_OFF = 1 << 5;
        const MIDI_RECORD_VELOCITY = 1 << 6;
        const MIDI_RECORD_AFTERTOUCH = 1 << 7;
    }
}

bitflags! {
    /// Second packed flag byte; only bits 0-1 are assigned.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct PatternFlags2: u8 {
        const SHOW_DEFAULT_VOLUMES = 1 << 0;
        const MIDI_CUT_NOTE_OFF = 1 << 1;
    }
}

bitflags! {
    /// MIDI flag bitmask as emitted in the `[MIDI]` section.
    ///
    /// The six MIDI booleans pack contiguously from bit 0 here; their bit
    /// positions in the record's flag bytes are different.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MidiFlags: u8 {
        const TICK_QUANTIZE = 1 << 0;
        const BASE_PROGRAM_1 = 1 << 1;
        const RECORD_NOTE_OFF = 1 << 2;
        const RECORD_VELOCITY = 1 << 3;
        const RECORD_AFTERTOUCH = 1 << 4;
        const CUT_NOTE_OFF = 1 << 5;
    }
}

/// The reconciled, emission-ready settings model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalConfig {
    pub dir_modules: String,
    pub dir_samples: String,
    pub dir_instruments: String,
    /// Keyboard layout id, clamped to [`KEYBOARD_NAMES`]. Pre-IT 2.04 only.
    pub legacy_keyboard: u8,
    /// 48-character packed palette string.
    pub palette: String,
    /// One `<window-name> <height>` token per active info-page view.
    pub info_page_layout: Vec<String>,
    pub link_effect_column: bool,
    pub draw_divisions: bool,
    pub view_tracking: bool,
    pub centralise_cursor: bool,
    pub highlight_current_row: bool,
    pub fast_volume_mode: bool,
    pub show_default_volumes: bool,
    pub midi_flags: MidiFlags,
    /// One scheme code per channel; empty when no custom track view is
    /// active.
    pub track_view_scheme: String,
    pub row_highlight_minor: u8,
    pub row_highlight_major: u8,
    pub edit_copy_mask: u8,
    pub fast_volume_percent: u16,
    pub midi_amplification: u8,
    pub midi_c5_note: u8,
}

/// Map 48 raw palette bytes to the packed config string.
///
/// Each byte is masked to 6 bits first, so every input maps to a symbol.
pub fn palette_string(palette: &[u8; 48]) -> String {
    palette
        .iter()
        .map(|&b| PALETTE_ALPHABET[usize::from(b & 0x3f)] as char)
        .collect()
}

/// The edit copy mask is stored as 3 bits but consumed with bit 0 forced on
/// and the stored bits shifted up one.
pub(crate) fn repack_edit_copy_mask(raw: u8) -> u8 {
    1 | ((raw & 7) << 1)
}

/// Build the logical settings model from a decoded record.
///
/// Every inconsistency is reported through `sink` and replaced with a safe
/// value; this pass cannot fail.
pub fn reconcile(raw: &RawRecord, sink: &mut DiagnosticSink) -> LogicalConfig {
    let dir_modules = codepage::decode_nul_terminated(&raw.directories[0]);
    let dir_samples = codepage::decode_nul_terminated(&raw.directories[1]);
    let dir_instruments = codepage::decode_nul_terminated(&raw.directories[2]);

    let legacy_keyboard = raw.keyboard.min(9);

    let palette = palette_string(&raw.palette);

    let info_page_layout = reconcile_info_pages(raw, sink);

    // Pattern editor geometry.
    let pe = &raw.pattern_editor;

    let edit_copy_mask = repack_edit_copy_mask(pe.edit_copy_mask);

    if pe.draw_divisions > 1 {
        sink.push(
            Subsystem::PatternEditor,
            format!(
                "weird track-divisions value {}; Alt-H won't work right",
                pe.draw_divisions
            ),
        );
    }
    let mut draw_divisions = pe.draw_divisions != 0;

    // Valid widths are 0 (no custom track view) or 2 and up.
    let mut track_view_width = pe.track_view_width;
    if track_view_width == 1 {
        sink.push(
            Subsystem::PatternEditor,
            "track view has width of 1 (will freeze IT)",
        );
        track_view_width = 0;
    }
    let mut track_view_visible = track_view_width != 0;

    if u32::from(track_view_width) + 14 * u32::from(pe.normal_view_tracks) > 78 {
        sink.push(
            Subsystem::PatternEditor,
            "track setup is too wide, display will look trashed",
        );
    }

    // Track view scheme: the table has a fixed capacity; the logical prefix
    // ends at the sentinel channel or the first invalid scheme code.
    let mut scheme_codes: Vec<u8> = Vec::new();
    let mut prev_channel: i32 = -1;
    for (n, entry) in raw.track_views.iter().enumerate() {
        if entry.channel == 0xff {
            break;
        }
        if entry.scheme > 4 {
            sink.push(
                Subsystem::PatternEditor,
                format!(
                    "{} view uses out-of-range scheme {}, will crash IT",
                    ordinal(n + 1),
                    entry.scheme
                ),
            );
            break;
        }
        // Codes past 3 shift up one to make room for the added
        // 6-column/12-channel view.
        let scheme = if entry.scheme > 3 {
            entry.scheme + 1
        } else {
            entry.scheme
        };
        if entry.channel > 63 {
            sink.push(
                Subsystem::PatternEditor,
                format!(
                    "{} track view shows channel {} (weird but harmless)",
                    ordinal(n + 1),
                    u32::from(entry.channel) + 1
                ),
            );
        } else if prev_channel + 1 != i32::from(entry.channel) {
            sink.push(
                Subsystem::PatternEditor,
                "tracks not in sequential order -- Schism Tracker can't do this",
            );
        }
        scheme_codes.push(scheme);
        prev_channel = i32::from(entry.channel);
    }

    if track_view_visible && scheme_codes.is_empty() {
        sink.push(
            Subsystem::PatternEditor,
            "track view setup was blank... strange!",
        );
        track_view_visible = false;
    }
    if pe.normal_view_tracks != 0 && track_view_visible {
        // Split view: channel data on both sides of the row numbers.
        sink.push(
            Subsystem::PatternEditor,
            "split track view unimplemented in Schism Tracker",
        );
    } else if !track_view_visible {
        // Plain 5-channel view; divisions are always drawn there.
        draw_divisions = true;
        scheme_codes.clear();
    }
    let track_view_scheme: String = scheme_codes
        .iter()
        .map(|&code| SCHEME_ALPHABET[usize::from(code)] as char)
        .collect();

    // View and MIDI flags.
    let vf = &raw.view_flags;

    if vf.view_tracking > 1 {
        sink.push(
            Subsystem::PatternEditor,
            format!(
                "weird view tracking value {}; Ctrl-T won't work right",
                vf.view_tracking
            ),
        );
    }
    if vf.view_tracking != 0 && pe.normal_view_tracks > 0 {
        sink.push(
            Subsystem::PatternEditor,
            "view tracking unimplemented in Schism Tracker",
        );
    }
    if vf.fast_volume_percent > 255 {
        sink.push(
            Subsystem::PatternEditor,
            "fast volume percent has high byte set, Alt-J will be broken",
        );
    }

    let flags1 = PatternFlags1::from_bits_retain(vf.pattern_flags1);
    let flags2 = PatternFlags2::from_bits_retain(vf.pattern_flags2);

    let mut midi_flags = MidiFlags::empty();
    midi_flags.set(
        MidiFlags::TICK_QUANTIZE,
        flags1.contains(PatternFlags1::MIDI_TICK_QUANTIZE),
    );
    midi_flags.set(
        MidiFlags::BASE_PROGRAM_1,
        flags1.contains(PatternFlags1::MIDI_BASE_PROGRAM_1),
    );
    midi_flags.set(
        MidiFlags::RECORD_NOTE_OFF,
        flags1.contains(PatternFlags1::MIDI_RECORD_NOTE_OFF),
    );
    midi_flags.set(
        MidiFlags::RECORD_VELOCITY,
        flags1.contains(PatternFlags1::MIDI_RECORD_VELOCITY),
    );
    midi_flags.set(
        MidiFlags::RECORD_AFTERTOUCH,
        flags1.contains(PatternFlags1::MIDI_RECORD_AFTERTOUCH),
    );
    midi_flags.set(
        MidiFlags::CUT_NOTE_OFF,
        flags2.contains(PatternFlags2::MIDI_CUT_NOTE_OFF),
    );

    LogicalConfig {
        dir_modules,
        dir_samples,
        dir_instruments,
        legacy_keyboard,
        palette,
        info_page_layout,
        link_effect_column: vf.link_effect_column != 0,
        draw_divisions,
        view_tracking: vf.view_tracking != 0,
        centralise_cursor: flags1.contains(PatternFlags1::CENTRALISE_CURSOR),
        highlight_current_row: flags1.contains(PatternFlags1::HIGHLIGHT_CURRENT_ROW),
        fast_volume_mode: flags1.contains(PatternFlags1::FAST_VOLUME_MODE),
        show_default_volumes: flags2.contains(PatternFlags2::SHOW_DEFAULT_VOLUMES),
        midi_flags,
        track_view_scheme,
        row_highlight_minor: pe.row_highlight_minor,
        row_highlight_major: pe.row_highlight_major,
        edit_copy_mask,
        fast_volume_percent: vf.fast_volume_percent,
        midi_amplification: vf.midi_amplification,
        midi_c5_note: vf.midi_c5_note,
    }
}

fn reconcile_info_pages(raw: &RawRecord, sink: &mut DiagnosticSink) -> Vec<String> {
    let mut count = usize::from(raw.info_page_view_count);
    if count == 0 {
        count = 1;
    } else if count > INFO_PAGE_SLOTS {
        sink.push(
            Subsystem::InfoPage,
            "too many views, will probably crash IT",
        );
        count = 1;
    }

    let mut next_row = FIRST_INFO_ROW;
    let mut layout = Vec::with_capacity(count);

    for (n, view) in raw.info_pages[..count].iter().enumerate() {
        let nth = ordinal(n + 1);
        let first_row = u32::from(view.first_row);
        let height = u32::from(view.height);

        // Window contents are drawn straight into view memory; a stored
        // offset that disagrees with the row lands the draw elsewhere.
        if u32::from(view.mem_offset) != BYTES_PER_ROW * first_row {
            sink.push(
                Subsystem::InfoPage,
                format!("{nth} view has strange VGA offset (will look scrambled or crash)"),
            );
        }

        if n == 0 && first_row != next_row {
            sink.push(
                Subsystem::InfoPage,
                format!("{nth} view is on row {first_row} (should be row {next_row})"),
            );
        } else if first_row < next_row {
            sink.push(
                Subsystem::InfoPage,
                format!(
                    "{nth} view overlaps previous by {}",
                    pluralize(next_row - first_row, "row")
                ),
            );
        } else if first_row > next_row {
            sink.push(
                Subsystem::InfoPage,
                format!(
                    "{nth} view followed by {}",
                    pluralize(first_row - next_row, "empty row")
                ),
            );
        }

        if height < 3 {
            sink.push(
                Subsystem::InfoPage,
                format!(
                    "{nth} view is {} too short (will cause crash/hang)",
                    pluralize(3 - height, "row")
                ),
            );
        } else if first_row + height > SCREEN_ROWS {
            sink.push(
                Subsystem::InfoPage,
                format!(
                    "{nth} view is {} too tall (might cause crash)",
                    pluralize(first_row + height - SCREEN_ROWS, "row")
                ),
            );
        }

        let mut window_type = view.window_type;
        if window_type > 11 {
            sink.push(
                Subsystem::InfoPage,
                format!("{nth} view has unknown window type {window_type} (will cause crash)"),
            );
            window_type = 0;
        }

        next_row = first_row + height;

        // The saved height of the first view is off by one; every producer
        // version wrote it that way.
        let mut shown_height = i64::from(view.height);
        if n == 0 {
            shown_height -= 1;
        }
        layout.push(format!(
            "{} {shown_height}",
            WINDOW_TYPE_NAMES[usize::from(window_type)]
        ));
    }

    if next_row == SCREEN_ROWS - 1 {
        // IT 2.11 stretched the last window by one row.
        sink.push(
            Subsystem::InfoPage,
            "extra row at bottom of screen (old IT version?)",
        );
    } else if next_row < SCREEN_ROWS {
        sink.push(
            Subsystem::InfoPage,
            format!(
                "{} extra rows at bottom of screen (corrupt config?)",
                SCREEN_ROWS - next_row
            ),
        );
    } else if next_row > SCREEN_ROWS {
        sink.push(
            Subsystem::InfoPage,
            format!(
                "data extends {} beyond end of screen (corrupt config?)",
                pluralize(next_row - SCREEN_ROWS, "row")
            ),
        );
    }

    if count == INFO_PAGE_SLOTS {
        // The UI stops at five; a sixth needs a hex editor but works.
        sink.push(Subsystem::InfoPage, "six views visible, omghax");
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_copy_mask_repack_is_exact() {
        for raw in 0..=255u8 {
            let packed = repack_edit_copy_mask(raw);
            assert_eq!(packed, 1 | ((raw & 7) << 1));
            assert_eq!(packed & 1, 1, "bit 0 must always be set");
            assert_eq!(packed >> 1, raw & 7);
        }
    }

    #[test]
    fn palette_masks_to_six_bits() {
        let mut palette = [0u8; 48];
        palette[0] = 0x00;
        palette[1] = 0x01;
        palette[2] = 0x3f;
        palette[3] = 0x40; // masks back to 0
        palette[4] = 0xff; // masks to 0x3f
        let s = palette_string(&palette);
        assert!(s.starts_with(".0z.z"));
        assert_eq!(s.len(), 48);
    }

    #[test]
    fn palette_round_trips_through_alphabet() {
        // 16 (r, g, b) triples covering the whole 6-bit range.
        let mut palette = [0u8; 48];
        for (i, slot) in palette.iter_mut().enumerate() {
            *slot = (i * 63 / 47) as u8;
        }
        let s = palette_string(&palette);
        let decoded: Vec<u8> = s
            .bytes()
            .map(|ch| {
                PALETTE_ALPHABET
                    .iter()
                    .position(|&sym| sym == ch)
                    .expect("symbol not in alphabet") as u8
            })
            .collect();
        assert_eq!(decoded, palette);
    }
}
