use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storeledger_core::{DeliveryTypeKey, DomainError, DomainResult};

use crate::area::{DeliveryArea, child_id};

/// A delivery window. Times are kept as entered (e.g. `9:00 AM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeSlot {
    pub fn window(&self) -> String {
        format!("{} - {}", self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimeSlot {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub active: bool,
}

/// Delivery type (shift) with its time slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryType {
    key: DeliveryTypeKey,
    name: String,
    active: bool,
    #[serde(default)]
    slots: Vec<TimeSlot>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DeliveryType {
    pub fn create(key: DeliveryTypeKey, name: &str, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = required("delivery type name", name)?;
        Ok(Self {
            key,
            name,
            active: true,
            slots: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn key(&self) -> &DeliveryTypeKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn toggle_status(&mut self, now: DateTime<Utc>) -> bool {
        self.active = !self.active;
        self.updated_at = now;
        self.active
    }

    pub fn add_slot(&mut self, input: NewTimeSlot, now: DateTime<Utc>) -> DomainResult<String> {
        let slot = TimeSlot {
            id: child_id("slot"),
            name: required("slot name", &input.name)?,
            start_time: required("start time", &input.start_time)?,
            end_time: required("end time", &input.end_time)?,
            active: input.active,
            created_at: now,
            updated_at: now,
        };
        let id = slot.id.clone();
        self.slots.push(slot);
        self.updated_at = now;
        Ok(id)
    }

    pub fn set_slot_active(&mut self, slot_id: &str, active: bool, now: DateTime<Utc>) -> DomainResult<()> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.id == slot_id)
            .ok_or_else(|| DomainError::not_found(format!("slot {slot_id}")))?;
        slot.active = active;
        slot.updated_at = now;
        self.updated_at = now;
        Ok(())
    }

    pub fn remove_slot(&mut self, slot_id: &str, now: DateTime<Utc>) -> DomainResult<TimeSlot> {
        let idx = self
            .slots
            .iter()
            .position(|s| s.id == slot_id)
            .ok_or_else(|| DomainError::not_found(format!("slot {slot_id}")))?;
        self.updated_at = now;
        Ok(self.slots.remove(idx))
    }
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// A bookable slot for an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOption {
    pub name: String,
    /// `<start> - <end>`.
    pub time: String,
    pub delivery_type: String,
}

impl SlotOption {
    /// Display label, e.g. `9:00 AM - 12:00 PM (Morning)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.time, self.name)
    }
}

/// Active slots of the active delivery types assigned to `area`, in type then
/// slot order, de-duplicated by (slot name, time window, delivery type).
pub fn available_slots<'a>(
    area: &DeliveryArea,
    types: impl IntoIterator<Item = &'a DeliveryType>,
) -> Vec<SlotOption> {
    let mut out: Vec<SlotOption> = Vec::new();
    for dt in types {
        if !dt.active || !area.delivery_types().iter().any(|n| *n == dt.name) {
            continue;
        }
        for slot in dt.slots.iter().filter(|s| s.active) {
            let option = SlotOption {
                name: slot.name.clone(),
                time: slot.window(),
                delivery_type: dt.name.clone(),
            };
            if !out.contains(&option) {
                out.push(option);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{AreaStatus, NewDeliveryArea};
    use storeledger_core::AreaKey;

    fn slot(name: &str, start: &str, end: &str, active: bool) -> NewTimeSlot {
        NewTimeSlot {
            name: name.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            active,
        }
    }

    fn delivery_type(key: &str, name: &str) -> DeliveryType {
        DeliveryType::create(DeliveryTypeKey::new(key).unwrap(), name, Utc::now()).unwrap()
    }

    fn area(types: &[&str]) -> DeliveryArea {
        DeliveryArea::create(
            AreaKey::new("PIN-0001").unwrap(),
            NewDeliveryArea {
                area_code: "560038".to_string(),
                status: AreaStatus::Active,
                localities: vec![],
                delivery_types: types.iter().map(|s| s.to_string()).collect(),
                tiers: vec![],
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn slot_fields_are_required() {
        let mut dt = delivery_type("DT-0001", "Standard");
        assert!(dt.add_slot(slot("Morning", "", "12:00 PM", true), Utc::now()).is_err());
        assert!(DeliveryType::create(DeliveryTypeKey::new("DT-0002").unwrap(), " ", Utc::now()).is_err());
    }

    #[test]
    fn only_active_slots_of_assigned_active_types() {
        let now = Utc::now();
        let mut standard = delivery_type("DT-0001", "Standard");
        standard.add_slot(slot("Morning", "9:00 AM", "12:00 PM", true), now).unwrap();
        standard.add_slot(slot("Morning", "9:00 AM", "12:00 PM", true), now).unwrap();
        let evening = standard.add_slot(slot("Evening", "5:00 PM", "8:00 PM", true), now).unwrap();
        standard.add_slot(slot("Night", "9:00 PM", "11:00 PM", false), now).unwrap();

        let mut express = delivery_type("DT-0002", "Express");
        express.add_slot(slot("Morning", "9:00 AM", "12:00 PM", true), now).unwrap();

        let mut unassigned = delivery_type("DT-0003", "Bulk");
        unassigned.add_slot(slot("Any", "8:00 AM", "8:00 PM", true), now).unwrap();

        let a = area(&["Standard", "Express"]);
        let slots = available_slots(&a, [&standard, &express, &unassigned]);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].label(), "9:00 AM - 12:00 PM (Morning)");
        assert_eq!(slots[2].delivery_type, "Express");

        standard.set_slot_active(&evening, false, now).unwrap();
        express.toggle_status(now);
        let slots = available_slots(&a, [&standard, &express]);
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn remove_slot_reports_missing() {
        let mut dt = delivery_type("DT-0001", "Standard");
        let id = dt.add_slot(slot("Morning", "9:00 AM", "12:00 PM", true), Utc::now()).unwrap();
        assert_eq!(dt.remove_slot(&id, Utc::now()).unwrap().name, "Morning");
        assert!(matches!(dt.remove_slot(&id, Utc::now()), Err(DomainError::NotFound(_))));
    }
}
