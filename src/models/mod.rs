pub mod event;
pub mod package;
pub mod reference;
pub mod shipment;
