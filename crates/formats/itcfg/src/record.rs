use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Minimum loadable record size. This is the IT 2.12 layout; shorter files
/// predate the second flag byte and cannot be decoded here.
///
/// Later versions padded the file (2.14p5 grew it to 1337 bytes) without
/// changing the layout, so anything past this size is ignored.
pub const MIN_FILE_SIZE: usize = 527;

/// Length of each stored directory field. The UI only ever used 64
/// characters; the field is 70 bytes on disk.
pub const DIRECTORY_LEN: usize = 70;

/// Number of info-page descriptor slots in the record.
pub const INFO_PAGE_SLOTS: usize = 6;

/// Number of track-view entry slots in the record.
pub const TRACK_VIEW_SLOTS: usize = 100;

/// One info-page window descriptor (8 bytes on disk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InfoPageDescriptor {
    /// Window type index; 0..=11 are valid.
    pub window_type: u16,
    /// First screen row of the window.
    pub first_row: u8,
    /// Window height in rows.
    pub height: u16,
    /// VGA memory offset of the window's first row. Consistent records
    /// store `160 * first_row`.
    pub mem_offset: u16,
}

/// Pattern editor geometry block (8 bytes at 0x137).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawPatternEditor {
    /// Number of tracks shown in the "normal" 13-column view.
    pub normal_view_tracks: u16,
    pub row_highlight_minor: u8,
    pub row_highlight_major: u8,
    /// Edit copy mask, 3 significant bits (instrument/volume/effect).
    pub edit_copy_mask: u8,
    /// Whether divisions between channels are drawn. Only 0 and 1 behave.
    pub draw_divisions: u8,
    /// Width of the box drawn around the custom track view; 0 disables it.
    pub track_view_width: u16,
}

/// One channel/scheme pair from the track view table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackViewEntry {
    /// Channel number, 0-based. 0xFF marks the end of the table.
    pub channel: u8,
    /// Display scheme code; 0..=4 are valid.
    pub scheme: u8,
}

/// View and MIDI flag block (8 bytes at 0x1A7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawViewFlags {
    /// View-channel cursor tracking. Only 0 and 1 behave.
    pub view_tracking: u8,
    /// Link (nonzero) or split (zero) effect column.
    pub link_effect_column: u8,
    /// Packed pattern-editor and MIDI-recording flags, bit 0 first.
    pub pattern_flags1: u8,
    /// MIDI volume amplification percentage.
    pub midi_amplification: u8,
    /// MIDI C-5 note number (60 in unmodified configs).
    pub midi_c5_note: u8,
    /// Fast volume percentage. The editing dialog only ever touched the low
    /// byte.
    pub fast_volume_percent: u16,
    /// Second packed flag byte, bits 0-1 used.
    pub pattern_flags2: u8,
}

/// Byte-accurate decode of one config record.
///
/// Construction performs no semantic validation — counts may be out of
/// range, windows may overlap, flag bytes may carry junk bits. See
/// [`reconcile`](crate::reconcile::reconcile) for the pass that turns this
/// into a usable model.
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// Module, sample, and instrument directories, raw CP437 bytes.
    pub directories: [[u8; DIRECTORY_LEN]; 3],
    /// Keyboard layout byte, ignored by IT 2.04+.
    pub keyboard: u8,
    /// 16 colors × 3 components, one 6-bit value per byte.
    pub palette: [u8; 48],
    pub info_pages: [InfoPageDescriptor; INFO_PAGE_SLOTS],
    /// Number of valid entries in `info_pages`.
    pub info_page_view_count: u16,
    pub pattern_editor: RawPatternEditor,
    pub track_views: [TrackViewEntry; TRACK_VIEW_SLOTS],
    pub view_flags: RawViewFlags,
}

impl RawRecord {
    /// Decode a record from the raw file contents.
    ///
    /// Fails with [`Error::TooShort`] for inputs under [`MIN_FILE_SIZE`]
    /// bytes, before any field is read.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < MIN_FILE_SIZE {
            return Err(Error::TooShort { size: data.len() });
        }
        let mut c = Cursor::new(data);

        let mut directories = [[0u8; DIRECTORY_LEN]; 3];
        for dir in &mut directories {
            dir.copy_from_slice(c.read_bytes(DIRECTORY_LEN)?);
        }

        let keyboard = c.read_u8()?;

        let mut palette = [0u8; 48];
        palette.copy_from_slice(c.read_bytes(48)?);

        let mut info_pages = [InfoPageDescriptor::default(); INFO_PAGE_SLOTS];
        for slot in &mut info_pages {
            let window_type = c.read_u16()?;
            // Always zero in the wild; no known effect.
            let _reserved = c.read_u8()?;
            let first_row = c.read_u8()?;
            let height = c.read_u16()?;
            let mem_offset = c.read_u16()?;
            *slot = InfoPageDescriptor {
                window_type,
                first_row,
                height,
                mem_offset,
            };
        }

        let info_page_view_count = c.read_u16()?;
        let _reserved = c.read_u16()?;

        let pattern_editor = RawPatternEditor {
            normal_view_tracks: c.read_u16()?,
            row_highlight_minor: c.read_u8()?,
            row_highlight_major: c.read_u8()?,
            edit_copy_mask: c.read_u8()?,
            draw_divisions: c.read_u8()?,
            track_view_width: c.read_u16()?,
        };

        let mut track_views = [TrackViewEntry::default(); TRACK_VIEW_SLOTS];
        for entry in &mut track_views {
            entry.channel = c.read_u8()?;
            entry.scheme = c.read_u8()?;
        }

        let view_flags = RawViewFlags {
            view_tracking: c.read_u8()?,
            link_effect_column: c.read_u8()?,
            pattern_flags1: c.read_u8()?,
            midi_amplification: c.read_u8()?,
            midi_c5_note: c.read_u8()?,
            fast_volume_percent: c.read_u16()?,
            pattern_flags2: c.read_u8()?,
        };

        Ok(Self {
            directories,
            keyboard,
            palette,
            info_pages,
            info_page_view_count,
            pattern_editor,
            track_views,
            view_flags,
        })
    }
}
