//! Output formats a host application renders a [`crate::Species`] into:
//! the text population snapshot, MS format, and VCF (spec §6 "External
//! Interfaces"). Binary snapshot and tskit `.trees` output are named in the
//! spec but out of scope here — see `DESIGN.md`.

mod ms;
mod snapshot;
mod vcf;

pub use ms::write_ms;
pub use snapshot::write_text_snapshot;
pub use vcf::write_vcf;
