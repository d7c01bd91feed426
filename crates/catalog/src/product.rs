use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storeledger_core::money::ensure_non_negative;
use storeledger_core::{DomainError, DomainResult, ProductKey, VariantKey};

use crate::pricing::suggest_variant_prices;
use crate::stock::{StockLevel, StockStatus};

/// Where stock is carried for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockMode {
    /// The product itself carries stock; variants only carry price and sell unit.
    Parent,
    /// Every variant carries independent stock; the product is a header.
    Variant,
}

/// Purchase/sale/compare prices (exact decimals).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub compare_price: Decimal,
}

impl Pricing {
    pub fn new(purchase_price: Decimal, sale_price: Decimal, compare_price: Decimal) -> Self {
        Self {
            purchase_price,
            sale_price,
            compare_price,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        ensure_non_negative("purchase price", self.purchase_price)?;
        ensure_non_negative("sale price", self.sale_price)?;
        ensure_non_negative("compare price", self.compare_price)
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    }
}

/// Quantity and unit a buyer purchases per sale (independent of stocking unit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellQuantity {
    pub quantity: Decimal,
    pub unit: String,
}

impl SellQuantity {
    pub fn new(quantity: Decimal, unit: impl Into<String>) -> Self {
        Self {
            quantity,
            unit: unit.into(),
        }
    }

    fn validate(&self) -> DomainResult<()> {
        if self.quantity <= Decimal::ZERO {
            return Err(DomainError::validation("sell quantity must be greater than 0"));
        }
        if self.unit.trim().is_empty() {
            return Err(DomainError::validation("sell unit cannot be empty"));
        }
        Ok(())
    }
}

/// Catalog fields shared by every variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub key: VariantKey,
    pub name: String,
    /// Copied from the parent at creation; not kept in sync afterwards.
    pub category: String,
    pub subcategory: String,
    pub sell: SellQuantity,
    pub pricing: Pricing,
    pub marketplace_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

/// A variant of a variant-mode product: catalog fields plus its own stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockedVariant {
    #[serde(flatten)]
    pub variant: Variant,
    pub unit: String,
    pub stock: StockLevel,
}

/// Stock layout of a product, tagged by stock mode.
///
/// Stock fields exist only on the branch that actually carries stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stock_mode", rename_all = "lowercase")]
pub enum Stocking {
    Parent {
        unit: String,
        stock: StockLevel,
        variants: Vec<Variant>,
    },
    Variant {
        variants: Vec<StockedVariant>,
    },
}

impl Stocking {
    pub fn mode(&self) -> StockMode {
        match self {
            Stocking::Parent { .. } => StockMode::Parent,
            Stocking::Variant { .. } => StockMode::Variant,
        }
    }

    fn variant_count(&self) -> usize {
        match self {
            Stocking::Parent { variants, .. } => variants.len(),
            Stocking::Variant { variants } => variants.len(),
        }
    }
}

/// Stock layout requested when creating a product (or switching its mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewStocking {
    Parent {
        opening_stock: i64,
        unit: String,
        low_stock_threshold: u32,
    },
    Variant,
}

/// Input: create a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub stocking: NewStocking,
    pub sell: SellQuantity,
    pub pricing: Pricing,
    pub marketplace_visible: bool,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub expiry_date: Option<NaiveDate>,
}

/// Opening stock of a variant-mode variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVariantStock {
    pub opening_stock: i64,
    pub unit: String,
    pub low_stock_threshold: u32,
}

/// Input: add a variant. Unset fields default from the parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVariant {
    pub name: Option<String>,
    pub sell: SellQuantity,
    pub purchase_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub compare_price: Option<Decimal>,
    pub stock: Option<NewVariantStock>,
    pub marketplace_visible: Option<bool>,
    pub expiry_date: Option<NaiveDate>,
}

/// One stock-carrying target of a product, as seen when preparing an adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustableItem {
    pub product_key: ProductKey,
    pub variant_key: Option<VariantKey>,
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub on_hand: i64,
    pub reserved: i64,
    pub available: i64,
    pub unit: String,
    pub purchase_price: Decimal,
}

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    key: ProductKey,
    name: String,
    category: String,
    subcategory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    sell: SellQuantity,
    pricing: Pricing,
    marketplace_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry_date: Option<NaiveDate>,
    stocking: Stocking,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Validate the input and build a new product under an allocated key.
    pub fn create(key: ProductKey, input: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        ensure_present("name", &input.name)?;
        ensure_present("category", &input.category)?;
        ensure_present("subcategory", &input.subcategory)?;
        input.sell.validate()?;
        input.pricing.validate()?;

        let stocking = build_stocking(input.stocking)?;

        Ok(Self {
            key,
            name: input.name.trim().to_string(),
            category: input.category,
            subcategory: input.subcategory,
            description: input.description.filter(|d| !d.trim().is_empty()),
            tags: input
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            sell: input.sell,
            pricing: input.pricing,
            marketplace_visible: input.marketplace_visible,
            expiry_date: input.expiry_date,
            stocking,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn key(&self) -> &ProductKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subcategory(&self) -> &str {
        &self.subcategory
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn sell(&self) -> &SellQuantity {
        &self.sell
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    pub fn marketplace_visible(&self) -> bool {
        self.marketplace_visible
    }

    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }

    pub fn stocking(&self) -> &Stocking {
        &self.stocking
    }

    pub fn stock_mode(&self) -> StockMode {
        self.stocking.mode()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Product-level stock (parent mode only).
    pub fn stock(&self) -> Option<&StockLevel> {
        match &self.stocking {
            Stocking::Parent { stock, .. } => Some(stock),
            Stocking::Variant { .. } => None,
        }
    }

    /// Product-level status (parent mode only).
    pub fn status(&self) -> Option<StockStatus> {
        self.stock().map(StockLevel::status)
    }

    /// Catalog view of every variant regardless of mode.
    pub fn variants(&self) -> Vec<&Variant> {
        match &self.stocking {
            Stocking::Parent { variants, .. } => variants.iter().collect(),
            Stocking::Variant { variants } => variants.iter().map(|v| &v.variant).collect(),
        }
    }

    pub fn variant(&self, key: &VariantKey) -> Option<&Variant> {
        self.variants().into_iter().find(|v| &v.key == key)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Add a variant, deriving its key, category and defaults from this product.
    ///
    /// In parent mode the prices default to the suggestion scaled from the
    /// parent's per-sell-unit prices; in variant mode opening stock is required.
    pub fn add_variant(&mut self, input: NewVariant, now: DateTime<Utc>) -> DomainResult<VariantKey> {
        input.sell.validate()?;
        for (field, price) in [
            ("purchase price", input.purchase_price),
            ("sale price", input.sale_price),
            ("compare price", input.compare_price),
        ] {
            if let Some(price) = price {
                ensure_non_negative(field, price)?;
            }
        }

        let key = VariantKey::for_product(&self.key, self.stocking.variant_count() + 1);
        let name = input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.name.clone());

        let (default_purchase, default_sale) = match self.stocking {
            Stocking::Parent { .. } => {
                let parent_unit = if self.sell.unit.trim().is_empty() {
                    "kg"
                } else {
                    self.sell.unit.as_str()
                };
                let suggestion = suggest_variant_prices(
                    self.pricing.purchase_price,
                    self.pricing.sale_price,
                    input.sell.quantity,
                    &input.sell.unit,
                    parent_unit,
                );
                (suggestion.purchase_price, suggestion.sale_price)
            }
            Stocking::Variant { .. } => (Decimal::ZERO, Decimal::ZERO),
        };

        let variant = Variant {
            key: key.clone(),
            name,
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
            sell: input.sell,
            pricing: Pricing::new(
                input.purchase_price.unwrap_or(default_purchase),
                input.sale_price.unwrap_or(default_sale),
                input.compare_price.unwrap_or(Decimal::ZERO),
            ),
            marketplace_visible: input.marketplace_visible.unwrap_or(self.marketplace_visible),
            expiry_date: input.expiry_date,
        };

        match (&mut self.stocking, input.stock) {
            (Stocking::Parent { variants, .. }, None) => variants.push(variant),
            (Stocking::Parent { .. }, Some(_)) => {
                return Err(DomainError::validation(
                    "variants of a parent-stocked product carry no stock",
                ));
            }
            (Stocking::Variant { variants }, Some(stock)) => {
                ensure_present("variant unit", &stock.unit)?;
                variants.push(StockedVariant {
                    variant,
                    unit: stock.unit,
                    stock: StockLevel::opening(stock.opening_stock, stock.low_stock_threshold)?,
                });
            }
            (Stocking::Variant { .. }, None) => {
                return Err(DomainError::validation(
                    "variants of a variant-stocked product need opening stock",
                ));
            }
        }

        self.touch(now);
        Ok(key)
    }

    /// Switch the stock mode. Only allowed while the product has no variants.
    pub fn change_stock_mode(&mut self, stocking: NewStocking, now: DateTime<Utc>) -> DomainResult<()> {
        if self.stocking.variant_count() > 0 {
            return Err(DomainError::invariant(
                "stock mode cannot change once variants exist",
            ));
        }
        self.stocking = build_stocking(stocking)?;
        self.refresh_marketplace_visibility();
        self.touch(now);
        Ok(())
    }

    pub fn set_pricing(&mut self, pricing: Pricing, now: DateTime<Utc>) -> DomainResult<()> {
        pricing.validate()?;
        self.pricing = pricing;
        self.touch(now);
        Ok(())
    }

    pub fn set_variant_pricing(
        &mut self,
        key: &VariantKey,
        pricing: Pricing,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        pricing.validate()?;
        self.variant_mut(key)?.pricing = pricing;
        self.touch(now);
        Ok(())
    }

    pub fn set_marketplace_visible(&mut self, visible: bool, now: DateTime<Utc>) {
        self.marketplace_visible = visible;
        self.touch(now);
    }

    /// Change the low-stock threshold of a stock target and recompute its status.
    pub fn set_low_stock_threshold(
        &mut self,
        target: Option<&VariantKey>,
        threshold: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.stock_level_mut(target)?.set_low_stock_threshold(threshold);
        self.touch(now);
        Ok(())
    }

    /// Manual stock correction outside the adjustment ledger.
    pub fn set_on_hand(
        &mut self,
        target: Option<&VariantKey>,
        on_hand: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.stock_level_mut(target)?.set_on_hand(on_hand)?;
        self.refresh_marketplace_visibility();
        self.touch(now);
        Ok(())
    }

    /// Stock level of a target: the product itself (`None`) in parent mode,
    /// or one variant in variant mode.
    pub fn stock_level(&self, target: Option<&VariantKey>) -> DomainResult<&StockLevel> {
        match (&self.stocking, target) {
            (Stocking::Parent { stock, .. }, None) => Ok(stock),
            (Stocking::Variant { variants }, Some(key)) => variants
                .iter()
                .find(|v| &v.variant.key == key)
                .map(|v| &v.stock)
                .ok_or_else(|| DomainError::not_found(format!("variant {key}"))),
            (stocking, target) => Err(Self::target_mismatch(&self.key, stocking.mode(), target)),
        }
    }

    pub fn stock_level_mut(&mut self, target: Option<&VariantKey>) -> DomainResult<&mut StockLevel> {
        let mode = self.stocking.mode();
        match (&mut self.stocking, target) {
            (Stocking::Parent { stock, .. }, None) => Ok(stock),
            (Stocking::Variant { variants }, Some(key)) => variants
                .iter_mut()
                .find(|v| &v.variant.key == key)
                .map(|v| &mut v.stock)
                .ok_or_else(|| DomainError::not_found(format!("variant {key}"))),
            (_, target) => Err(Self::target_mismatch(&self.key, mode, target)),
        }
    }

    /// Adjustment view of one stock target (name, unit and price snapshots).
    pub fn adjustable_item(&self, target: Option<&VariantKey>) -> DomainResult<AdjustableItem> {
        let stock = self.stock_level(target)?;
        let (name, unit, purchase_price) = match (&self.stocking, target) {
            (Stocking::Parent { unit, .. }, None) => {
                (self.name.clone(), unit.clone(), self.pricing.purchase_price)
            }
            (Stocking::Variant { variants }, Some(key)) => {
                // stock_level already proved the variant exists
                let v = variants
                    .iter()
                    .find(|v| &v.variant.key == key)
                    .ok_or_else(|| DomainError::not_found(format!("variant {key}")))?;
                (
                    v.variant.name.clone(),
                    v.unit.clone(),
                    v.variant.pricing.purchase_price,
                )
            }
            (stocking, target) => {
                return Err(Self::target_mismatch(&self.key, stocking.mode(), target));
            }
        };

        Ok(AdjustableItem {
            product_key: self.key.clone(),
            variant_key: target.cloned(),
            name,
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
            on_hand: stock.on_hand(),
            reserved: stock.reserved(),
            available: stock.available(),
            unit,
            purchase_price,
        })
    }

    /// Every stock-carrying target of this product.
    pub fn adjustable_items(&self) -> Vec<AdjustableItem> {
        let targets: Vec<Option<&VariantKey>> = match &self.stocking {
            Stocking::Parent { .. } => vec![None],
            Stocking::Variant { variants } => {
                variants.iter().map(|v| Some(&v.variant.key)).collect()
            }
        };
        targets
            .into_iter()
            .filter_map(|t| self.adjustable_item(t).ok())
            .collect()
    }

    /// Re-derive marketplace visibility from availability (parent mode only).
    ///
    /// Nothing available forces the product off the marketplace; recovery puts
    /// it back. Low stock alone never hides it.
    pub fn refresh_marketplace_visibility(&mut self) {
        let available = match &self.stocking {
            Stocking::Parent { stock, .. } => stock.available(),
            Stocking::Variant { .. } => return,
        };
        if available <= 0 {
            self.marketplace_visible = false;
        } else if !self.marketplace_visible {
            self.marketplace_visible = true;
        }
    }

    fn variant_mut(&mut self, key: &VariantKey) -> DomainResult<&mut Variant> {
        let found = match &mut self.stocking {
            Stocking::Parent { variants, .. } => variants.iter_mut().find(|v| &v.key == key),
            Stocking::Variant { variants } => variants
                .iter_mut()
                .map(|v| &mut v.variant)
                .find(|v| &v.key == key),
        };
        found.ok_or_else(|| DomainError::not_found(format!("variant {key}")))
    }

    fn target_mismatch(product: &ProductKey, mode: StockMode, target: Option<&VariantKey>) -> DomainError {
        match (mode, target) {
            (StockMode::Parent, Some(key)) => DomainError::validation(format!(
                "variant {key} of parent-stocked product {product} carries no stock"
            )),
            _ => DomainError::validation(format!(
                "product {product} stocks per variant; a variant key is required"
            )),
        }
    }
}

fn ensure_present(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn build_stocking(stocking: NewStocking) -> DomainResult<Stocking> {
    match stocking {
        NewStocking::Parent {
            opening_stock,
            unit,
            low_stock_threshold,
        } => {
            ensure_present("unit", &unit)?;
            Ok(Stocking::Parent {
                unit,
                stock: StockLevel::opening(opening_stock, low_stock_threshold)?,
                variants: Vec::new(),
            })
        }
        NewStocking::Variant => Ok(Stocking::Variant {
            variants: Vec::new(),
        }),
    }
}
