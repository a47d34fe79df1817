//! Importer for Impulse Tracker's binary `IT.CFG` settings record.
//!
//! The record is a fixed-layout binary blob whose original consumer did
//! almost no error checking — a stray byte could crash or hang it. This
//! crate decodes the record byte for byte ([`record::RawRecord`]),
//! reconciles the raw fields into a logical settings model while reporting
//! every inconsistency it finds ([`reconcile()`], [`Diagnostic`]), and
//! renders the model as an INI-style text document ([`emit`]).
//!
//! Import is one-way and best-effort: only an input too short to hold the
//! record aborts. Every other anomaly becomes a diagnostic plus a safe
//! substitute value, because visibility into the irregularities is the
//! point — not rejection.

pub mod codepage;
pub mod cursor;
pub mod diag;
pub mod emit;
pub mod error;
pub mod reconcile;
pub mod record;

pub use diag::{Diagnostic, DiagnosticSink, Subsystem};
pub use error::{Error, Result};
pub use reconcile::{reconcile, LogicalConfig, MidiFlags};
pub use record::RawRecord;

/// Decode and reconcile a config record in one step.
///
/// Returns the logical model plus the diagnostics gathered while building
/// it, in detection order.
pub fn import(data: &[u8]) -> Result<(LogicalConfig, Vec<Diagnostic>)> {
    let raw = RawRecord::parse(data)?;
    let mut sink = DiagnosticSink::new();
    let config = reconcile(&raw, &mut sink);
    Ok((config, sink.into_vec()))
}
