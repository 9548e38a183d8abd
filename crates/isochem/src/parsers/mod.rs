mod adduct;
mod decoy;
pub mod errors;
mod formula;
pub mod primitives;

pub use adduct::parse_adduct;
pub use decoy::parse_decoy;
pub use formula::{parse_charged_formula, parse_formula};
