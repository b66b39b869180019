// mod.rs - Data structures module

pub mod alignment;
pub mod moltype;

// Re-export main types for convenience
pub use alignment::Alignment;
pub use moltype::MolType;
