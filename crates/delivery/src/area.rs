use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storeledger_core::money::ensure_non_negative;
use storeledger_core::{AreaKey, DomainError, DomainResult};

/// Short random child-record id: `<prefix>-<8 hex chars>`.
pub(crate) fn child_id(prefix: &str) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &hex[..8])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaStatus {
    Active,
    Inactive,
}

impl AreaStatus {
    pub fn toggled(self) -> Self {
        match self {
            AreaStatus::Active => AreaStatus::Inactive,
            AreaStatus::Inactive => AreaStatus::Active,
        }
    }
}

/// Input for one charge tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChargeTier {
    pub minimum_order_value: Decimal,
    pub charge: Decimal,
}

/// A delivery-charge band: orders of at least `minimum_order_value` pay `charge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeTier {
    pub id: String,
    pub minimum_order_value: Decimal,
    pub charge: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChargeTier {
    pub fn new(input: NewChargeTier, now: DateTime<Utc>) -> DomainResult<Self> {
        check_tier_amounts(input.minimum_order_value, input.charge)?;
        Ok(Self {
            id: child_id("charge"),
            minimum_order_value: input.minimum_order_value,
            charge: input.charge,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether this tier applies to an order of `subtotal`.
    pub fn qualifies(&self, subtotal: Decimal) -> bool {
        self.active && self.minimum_order_value <= subtotal
    }
}

/// Tier entry rule. A charge at or above the threshold it applies to is
/// rejected; a zero-threshold base tier may carry any charge.
fn check_tier_amounts(minimum_order_value: Decimal, charge: Decimal) -> DomainResult<()> {
    ensure_non_negative("minimum order value", minimum_order_value)?;
    ensure_non_negative("delivery charge", charge)?;
    if minimum_order_value > Decimal::ZERO && charge >= minimum_order_value {
        return Err(DomainError::validation(format!(
            "delivery charge {charge} must be less than minimum order value {minimum_order_value}"
        )));
    }
    Ok(())
}

/// A named locality inside a postal area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locality {
    pub id: String,
    pub name: String,
}

impl Locality {
    pub fn new(name: &str) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("locality name cannot be empty"));
        }
        Ok(Self {
            id: child_id("area"),
            name: name.to_string(),
        })
    }
}

/// Input: create a delivery area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeliveryArea {
    pub area_code: String,
    pub status: AreaStatus,
    pub localities: Vec<String>,
    pub delivery_types: Vec<String>,
    pub tiers: Vec<NewChargeTier>,
}

/// Postal delivery area with its charge tiers and assigned delivery types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryArea {
    key: AreaKey,
    area_code: String,
    status: AreaStatus,
    /// Delivery type names, matched against [`crate::DeliveryType::name`].
    delivery_types: Vec<String>,
    localities: Vec<Locality>,
    tiers: Vec<ChargeTier>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DeliveryArea {
    pub fn create(key: AreaKey, input: NewDeliveryArea, now: DateTime<Utc>) -> DomainResult<Self> {
        let area_code = input.area_code.trim().to_string();
        if area_code.is_empty() {
            return Err(DomainError::validation("area code is required"));
        }

        let localities = input
            .localities
            .iter()
            .filter(|name| !name.trim().is_empty())
            .map(|name| Locality::new(name))
            .collect::<DomainResult<Vec<_>>>()?;

        let tiers = input
            .tiers
            .into_iter()
            .map(|t| ChargeTier::new(t, now))
            .collect::<DomainResult<Vec<_>>>()?;

        let mut area = Self {
            key,
            area_code,
            status: input.status,
            delivery_types: Vec::new(),
            localities,
            tiers,
            created_at: now,
            updated_at: now,
        };
        for name in &input.delivery_types {
            area.assign_delivery_type(name, now);
        }
        area.updated_at = now;
        Ok(area)
    }

    pub fn key(&self) -> &AreaKey {
        &self.key
    }

    pub fn area_code(&self) -> &str {
        &self.area_code
    }

    pub fn status(&self) -> AreaStatus {
        self.status
    }

    pub fn delivery_types(&self) -> &[String] {
        &self.delivery_types
    }

    pub fn localities(&self) -> &[Locality] {
        &self.localities
    }

    pub fn tiers(&self) -> &[ChargeTier] {
        &self.tiers
    }

    pub fn tier(&self, id: &str) -> Option<&ChargeTier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the whole tier list with a single new tier. Returns its id.
    pub fn set_charge(&mut self, input: NewChargeTier, now: DateTime<Utc>) -> DomainResult<String> {
        let tier = ChargeTier::new(input, now)?;
        let id = tier.id.clone();
        self.tiers = vec![tier];
        self.updated_at = now;
        Ok(id)
    }

    /// Change a tier's threshold and/or charge. Unset values are kept.
    pub fn update_tier(
        &mut self,
        id: &str,
        minimum_order_value: Option<Decimal>,
        charge: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let tier = self.tier_mut(id)?;
        let minimum_order_value = minimum_order_value.unwrap_or(tier.minimum_order_value);
        let charge = charge.unwrap_or(tier.charge);
        check_tier_amounts(minimum_order_value, charge)?;

        tier.minimum_order_value = minimum_order_value;
        tier.charge = charge;
        tier.updated_at = now;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_tier_active(&mut self, id: &str, active: bool, now: DateTime<Utc>) -> DomainResult<()> {
        let tier = self.tier_mut(id)?;
        tier.active = active;
        tier.updated_at = now;
        self.updated_at = now;
        Ok(())
    }

    pub fn remove_tier(&mut self, id: &str, now: DateTime<Utc>) -> DomainResult<ChargeTier> {
        let idx = self
            .tiers
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| self.missing_tier(id))?;
        self.updated_at = now;
        Ok(self.tiers.remove(idx))
    }

    /// Flip Active/Inactive and return the new status.
    pub fn toggle_status(&mut self, now: DateTime<Utc>) -> AreaStatus {
        self.status = self.status.toggled();
        self.updated_at = now;
        self.status
    }

    /// Assign a delivery type by name. Assigning twice is a no-op.
    pub fn assign_delivery_type(&mut self, name: &str, now: DateTime<Utc>) -> bool {
        let name = name.trim();
        if name.is_empty() || self.delivery_types.iter().any(|n| n == name) {
            return false;
        }
        self.delivery_types.push(name.to_string());
        self.updated_at = now;
        true
    }

    pub fn add_locality(&mut self, name: &str, now: DateTime<Utc>) -> DomainResult<String> {
        let locality = Locality::new(name)?;
        let id = locality.id.clone();
        self.localities.push(locality);
        self.updated_at = now;
        Ok(id)
    }

    fn tier_mut(&mut self, id: &str) -> DomainResult<&mut ChargeTier> {
        let missing = self.missing_tier(id);
        self.tiers.iter_mut().find(|t| t.id == id).ok_or(missing)
    }

    fn missing_tier(&self, id: &str) -> DomainError {
        DomainError::not_found(format!("charge {id} in area {}", self.key))
    }
}
