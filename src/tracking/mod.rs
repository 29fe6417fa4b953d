pub mod generator;
pub mod lookup;
pub mod unique;

pub use generator::{classify, generate, generate_at, CarrierFormat};
pub use lookup::{lookup, TrackingLookup};
pub use unique::{generate_unique, GenerateError, UniqueCode};
