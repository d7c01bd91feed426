//! Delivery domain module.
//!
//! Postal delivery areas with tiered charges, delivery types with time slots,
//! and the charge and slot resolution used at checkout. Pure domain logic.

pub mod area;
pub mod charges;
pub mod slots;

pub use area::{AreaStatus, ChargeTier, DeliveryArea, Locality, NewChargeTier, NewDeliveryArea};
pub use charges::resolve_charge;
pub use slots::{DeliveryType, NewTimeSlot, SlotOption, TimeSlot, available_slots};
