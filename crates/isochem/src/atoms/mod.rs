mod charge;
mod element;
pub mod errors;
mod isotope;
pub mod isotope_registry;
mod offset_kind;
