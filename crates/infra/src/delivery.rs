//! Delivery service: postal areas, delivery types, and checkout lookups.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use storeledger_core::{AreaKey, DeliveryTypeKey, DomainError, DomainResult, ExpectedVersion};
use storeledger_delivery::{
    DeliveryArea, DeliveryType, NewChargeTier, NewDeliveryArea, NewTimeSlot, SlotOption,
    available_slots,
};

use crate::config::LedgerConfig;
use crate::error::ServiceResult;
use crate::record_store::{Record, RecordStore, RecordStoreExt, ScanFilter};
use crate::sequence::{IdSpace, SequentialIdAllocator};

#[derive(Debug)]
pub struct DeliveryService<S> {
    store: S,
    ids: SequentialIdAllocator,
    page_size: usize,
}

impl<S> DeliveryService<S> {
    pub fn new(store: S, config: &LedgerConfig) -> Self {
        Self {
            store,
            ids: SequentialIdAllocator::from_config(config),
            page_size: config.store.scan_page_size,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: RecordStore> DeliveryService<S> {
    /// Create an area under a fresh `PIN-NNNN` key. Area codes are unique.
    pub fn create_area(&self, input: NewDeliveryArea) -> ServiceResult<DeliveryArea> {
        let code = input.area_code.trim();
        if self.find_area_by_code(code)?.is_some() {
            return Err(DomainError::conflict(format!("area code {code} already exists")).into());
        }

        let key = AreaKey::new(self.ids.next(&self.store, &IdSpace::delivery_areas()))?;
        let area = DeliveryArea::create(key, input, Utc::now())?;
        self.store.save(&area, ExpectedVersion::absent())?;
        info!(
            area_key = %area.key(),
            area_code = area.area_code(),
            tiers = area.tiers().len(),
            "delivery area created"
        );
        Ok(area)
    }

    pub fn get_area(&self, key: &AreaKey) -> ServiceResult<DeliveryArea> {
        Ok(self.store.load_required::<DeliveryArea>(key.as_str())?.record)
    }

    pub fn list_areas(&self) -> ServiceResult<Vec<DeliveryArea>> {
        Ok(self
            .store
            .scan_records::<DeliveryArea>(None, self.page_size)?
            .into_iter()
            .map(|loaded| loaded.record)
            .collect())
    }

    /// Look an area up by its postal code. Exhausts the scan.
    pub fn find_area_by_code(&self, area_code: &str) -> ServiceResult<Option<DeliveryArea>> {
        let filter = ScanFilter::field_equals("area_code", area_code.trim());
        Ok(self
            .store
            .scan_records::<DeliveryArea>(Some(filter), self.page_size)?
            .into_iter()
            .next()
            .map(|loaded| loaded.record))
    }

    pub fn delete_area(&self, key: &AreaKey) -> ServiceResult<()> {
        if !self.store.delete(DeliveryArea::COLLECTION, key.as_str())? {
            return Err(DomainError::not_found(format!("area {key}")).into());
        }
        info!(area_key = %key, "delivery area deleted");
        Ok(())
    }

    /// Replace the area's tiers with a single new one. Returns the tier id.
    pub fn set_charge(&self, key: &AreaKey, tier: NewChargeTier) -> ServiceResult<String> {
        self.modify_area(key, |a, now| a.set_charge(tier, now))
    }

    pub fn update_tier(
        &self,
        key: &AreaKey,
        tier_id: &str,
        minimum_order_value: Option<Decimal>,
        charge: Option<Decimal>,
    ) -> ServiceResult<()> {
        self.modify_area(key, |a, now| a.update_tier(tier_id, minimum_order_value, charge, now))
    }

    pub fn set_tier_active(&self, key: &AreaKey, tier_id: &str, active: bool) -> ServiceResult<()> {
        self.modify_area(key, |a, now| a.set_tier_active(tier_id, active, now))
    }

    pub fn remove_tier(&self, key: &AreaKey, tier_id: &str) -> ServiceResult<()> {
        self.modify_area(key, |a, now| a.remove_tier(tier_id, now).map(|_| ()))
    }

    pub fn toggle_area_status(&self, key: &AreaKey) -> ServiceResult<DeliveryArea> {
        self.modify_area(key, |a, now| {
            a.toggle_status(now);
            Ok(a.clone())
        })
    }

    pub fn add_locality(&self, key: &AreaKey, name: &str) -> ServiceResult<String> {
        self.modify_area(key, |a, now| a.add_locality(name, now))
    }

    /// Assign an existing delivery type to an area (by the type's name).
    pub fn assign_delivery_type(&self, key: &AreaKey, type_key: &DeliveryTypeKey) -> ServiceResult<()> {
        let delivery_type = self.get_delivery_type(type_key)?;
        self.modify_area(key, |a, now| {
            a.assign_delivery_type(delivery_type.name(), now);
            Ok(())
        })
    }

    /// Delivery charge for an order in `area_code`; unknown codes pay nothing.
    pub fn resolve_for_area_code(&self, area_code: &str, subtotal: Decimal) -> ServiceResult<Decimal> {
        let charge = match self.find_area_by_code(area_code)? {
            Some(area) => area.delivery_charge(subtotal),
            None => Decimal::ZERO,
        };
        debug!(area_code, subtotal = %subtotal, charge = %charge, "delivery charge resolved");
        Ok(charge)
    }

    pub fn create_delivery_type(&self, name: &str) -> ServiceResult<DeliveryType> {
        let key = DeliveryTypeKey::new(self.ids.next(&self.store, &IdSpace::delivery_types()))?;
        let delivery_type = DeliveryType::create(key, name, Utc::now())?;
        self.store.save(&delivery_type, ExpectedVersion::absent())?;
        info!(
            delivery_type_key = %delivery_type.key(),
            name = delivery_type.name(),
            "delivery type created"
        );
        Ok(delivery_type)
    }

    pub fn get_delivery_type(&self, key: &DeliveryTypeKey) -> ServiceResult<DeliveryType> {
        Ok(self.store.load_required::<DeliveryType>(key.as_str())?.record)
    }

    pub fn list_delivery_types(&self) -> ServiceResult<Vec<DeliveryType>> {
        Ok(self
            .store
            .scan_records::<DeliveryType>(None, self.page_size)?
            .into_iter()
            .map(|loaded| loaded.record)
            .collect())
    }

    pub fn add_time_slot(&self, key: &DeliveryTypeKey, slot: NewTimeSlot) -> ServiceResult<String> {
        self.modify_type(key, |t, now| t.add_slot(slot, now))
    }

    pub fn set_time_slot_active(&self, key: &DeliveryTypeKey, slot_id: &str, active: bool) -> ServiceResult<()> {
        self.modify_type(key, |t, now| t.set_slot_active(slot_id, active, now))
    }

    pub fn remove_time_slot(&self, key: &DeliveryTypeKey, slot_id: &str) -> ServiceResult<()> {
        self.modify_type(key, |t, now| t.remove_slot(slot_id, now).map(|_| ()))
    }

    pub fn toggle_delivery_type_status(&self, key: &DeliveryTypeKey) -> ServiceResult<bool> {
        self.modify_type(key, |t, now| Ok(t.toggle_status(now)))
    }

    /// Bookable slots for an area code; empty for unknown codes.
    pub fn slots_for_area_code(&self, area_code: &str) -> ServiceResult<Vec<SlotOption>> {
        let Some(area) = self.find_area_by_code(area_code)? else {
            return Ok(Vec::new());
        };
        if area.delivery_types().is_empty() {
            return Ok(Vec::new());
        }
        let types = self.list_delivery_types()?;
        Ok(available_slots(&area, &types))
    }

    fn modify_area<F, R>(&self, key: &AreaKey, edit: F) -> ServiceResult<R>
    where
        F: FnOnce(&mut DeliveryArea, DateTime<Utc>) -> DomainResult<R>,
    {
        let mut loaded = self.store.load_required::<DeliveryArea>(key.as_str())?;
        let result = edit(&mut loaded.record, Utc::now())?;
        self.store
            .save(&loaded.record, ExpectedVersion::Exact(loaded.version))?;
        Ok(result)
    }

    fn modify_type<F, R>(&self, key: &DeliveryTypeKey, edit: F) -> ServiceResult<R>
    where
        F: FnOnce(&mut DeliveryType, DateTime<Utc>) -> DomainResult<R>,
    {
        let mut loaded = self.store.load_required::<DeliveryType>(key.as_str())?;
        let result = edit(&mut loaded.record, Utc::now())?;
        self.store
            .save(&loaded.record, ExpectedVersion::Exact(loaded.version))?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceError;
    use crate::record_store::InMemoryRecordStore;
    use rust_decimal_macros::dec;
    use storeledger_delivery::AreaStatus;

    fn service() -> DeliveryService<InMemoryRecordStore> {
        DeliveryService::new(InMemoryRecordStore::new(), &LedgerConfig::default())
    }

    fn new_area(code: &str, tiers: Vec<NewChargeTier>) -> NewDeliveryArea {
        NewDeliveryArea {
            area_code: code.to_string(),
            status: AreaStatus::Active,
            localities: vec!["Koramangala".to_string()],
            delivery_types: vec![],
            tiers,
        }
    }

    fn tier(min: Decimal, charge: Decimal) -> NewChargeTier {
        NewChargeTier {
            minimum_order_value: min,
            charge,
        }
    }

    #[test]
    fn duplicate_area_codes_are_rejected() {
        let svc = service();
        let a = svc.create_area(new_area("560034", vec![])).unwrap();
        assert_eq!(a.key().as_str(), "PIN-0001");
        let err = svc.create_area(new_area(" 560034 ", vec![])).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));
        assert_eq!(svc.list_areas().unwrap().len(), 1);
    }

    #[test]
    fn charge_lookup_by_area_code() {
        let svc = service();
        svc.create_area(new_area(
            "560034",
            vec![tier(dec!(0), dec!(40)), tier(dec!(500), dec!(0)), tier(dec!(1000), dec!(20))],
        ))
        .unwrap();

        assert_eq!(svc.resolve_for_area_code("560034", dec!(1200)).unwrap(), dec!(40));
        assert_eq!(svc.resolve_for_area_code("999999", dec!(1200)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn tier_edits_persist() {
        let svc = service();
        let area = svc.create_area(new_area("560034", vec![tier(dec!(0), dec!(40))])).unwrap();

        let id = svc.set_charge(area.key(), tier(dec!(300), dec!(30))).unwrap();
        assert_eq!(svc.resolve_for_area_code("560034", dec!(299)).unwrap(), dec!(0));
        assert_eq!(svc.resolve_for_area_code("560034", dec!(300)).unwrap(), dec!(30));

        svc.update_tier(area.key(), &id, None, Some(dec!(25))).unwrap();
        assert_eq!(svc.resolve_for_area_code("560034", dec!(300)).unwrap(), dec!(25));

        svc.set_tier_active(area.key(), &id, false).unwrap();
        assert_eq!(svc.resolve_for_area_code("560034", dec!(300)).unwrap(), dec!(0));

        svc.remove_tier(area.key(), &id).unwrap();
        assert!(svc.get_area(area.key()).unwrap().tiers().is_empty());

        let toggled = svc.toggle_area_status(area.key()).unwrap();
        assert_eq!(toggled.status(), AreaStatus::Inactive);
        assert_eq!(svc.store().get("delivery_areas", "PIN-0001").unwrap().unwrap().version, 6);
    }

    #[test]
    fn slots_follow_assigned_delivery_types() {
        let svc = service();
        let area = svc.create_area(new_area("560034", vec![])).unwrap();
        let express = svc.create_delivery_type("Express").unwrap();
        let standard = svc.create_delivery_type("Standard").unwrap();
        assert_eq!(express.key().as_str(), "DT-0001");

        for (key, name, start, end) in [
            (express.key(), "Morning", "9:00 AM", "11:00 AM"),
            (standard.key(), "Evening", "5:00 PM", "8:00 PM"),
        ] {
            svc.add_time_slot(
                key,
                NewTimeSlot {
                    name: name.to_string(),
                    start_time: start.to_string(),
                    end_time: end.to_string(),
                    active: true,
                },
            )
            .unwrap();
        }

        assert!(svc.slots_for_area_code("560034").unwrap().is_empty());
        svc.assign_delivery_type(area.key(), express.key()).unwrap();

        let slots = svc.slots_for_area_code("560034").unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].delivery_type, "Express");
        assert!(svc.slots_for_area_code("000000").unwrap().is_empty());

        assert!(!svc.toggle_delivery_type_status(express.key()).unwrap());
        assert!(svc.slots_for_area_code("560034").unwrap().is_empty());
    }

    #[test]
    fn deleting_an_unknown_area_is_not_found() {
        let svc = service();
        let area = svc.create_area(new_area("560034", vec![])).unwrap();
        svc.delete_area(area.key()).unwrap();
        assert!(svc.delete_area(area.key()).unwrap_err().is_not_found());
    }
}
