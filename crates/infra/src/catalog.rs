//! Catalog service: products and variants against the record store.
//!
//! Every edit is a read-modify-write at the version that was read, so a
//! concurrent writer surfaces as a retryable conflict instead of a lost update.

use chrono::{DateTime, Utc};
use tracing::info;

use storeledger_catalog::{
    AdjustableItem, NewProduct, NewStocking, NewVariant, Pricing, Product,
};
use storeledger_core::{DomainResult, ExpectedVersion, ProductKey, VariantKey};

use crate::config::LedgerConfig;
use crate::error::ServiceResult;
use crate::record_store::{RecordStore, RecordStoreExt};
use crate::sequence::{IdSpace, SequentialIdAllocator};

#[derive(Debug)]
pub struct CatalogService<S> {
    store: S,
    ids: SequentialIdAllocator,
    page_size: usize,
}

impl<S> CatalogService<S> {
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

impl<S: RecordStore> CatalogService<S> {
    pub fn create_product(&self, input: NewProduct) -> ServiceResult<Product> {
        let key = ProductKey::new(self.ids.next(&self.store, &IdSpace::products()))?;
        let product = Product::create(key, input, Utc::now())?;
        self.store.save(&product, ExpectedVersion::absent())?;
        info!(
            product_key = %product.key(),
            stock_mode = ?product.stock_mode(),
            "product created"
        );
        Ok(product)
    }

    pub fn get_product(&self, key: &ProductKey) -> ServiceResult<Product> {
        Ok(self.store.load_required::<Product>(key.as_str())?.record)
    }

    pub fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self
            .store
            .scan_records::<Product>(None, self.page_size)?
            .into_iter()
            .map(|loaded| loaded.record)
            .collect())
    }

    /// Products whose name, category, subcategory or tags contain `term`
    /// (case-insensitive).
    pub fn search_products(&self, term: &str) -> ServiceResult<Vec<Product>> {
        let term = term.trim().to_lowercase();
        let mut products = self.list_products()?;
        products.retain(|p| {
            [p.name(), p.category(), p.subcategory()]
                .into_iter()
                .chain(p.tags().iter().map(String::as_str))
                .any(|field| field.to_lowercase().contains(&term))
        });
        Ok(products)
    }

    /// Every stock-carrying target in the catalog, for picking adjustment lines.
    pub fn adjustable_items(&self) -> ServiceResult<Vec<AdjustableItem>> {
        Ok(self
            .list_products()?
            .iter()
            .flat_map(Product::adjustable_items)
            .collect())
    }

    pub fn add_variant(&self, key: &ProductKey, input: NewVariant) -> ServiceResult<VariantKey> {
        let (_, variant_key) = self.modify(key, |product, now| product.add_variant(input, now))?;
        info!(product_key = %key, variant_key = %variant_key, "variant added");
        Ok(variant_key)
    }

    pub fn set_pricing(&self, key: &ProductKey, pricing: Pricing) -> ServiceResult<Product> {
        self.edit(key, |p, now| p.set_pricing(pricing, now))
    }

    pub fn set_variant_pricing(
        &self,
        key: &ProductKey,
        variant: &VariantKey,
        pricing: Pricing,
    ) -> ServiceResult<Product> {
        self.edit(key, |p, now| p.set_variant_pricing(variant, pricing, now))
    }

    pub fn set_marketplace_visible(&self, key: &ProductKey, visible: bool) -> ServiceResult<Product> {
        self.edit(key, |p, now| {
            p.set_marketplace_visible(visible, now);
            Ok(())
        })
    }

    pub fn set_low_stock_threshold(
        &self,
        key: &ProductKey,
        target: Option<&VariantKey>,
        threshold: u32,
    ) -> ServiceResult<Product> {
        self.edit(key, |p, now| p.set_low_stock_threshold(target, threshold, now))
    }

    /// Manual stock correction (not recorded in the adjustment ledger).
    pub fn set_on_hand(
        &self,
        key: &ProductKey,
        target: Option<&VariantKey>,
        on_hand: i64,
    ) -> ServiceResult<Product> {
        self.edit(key, |p, now| p.set_on_hand(target, on_hand, now))
    }

    pub fn change_stock_mode(&self, key: &ProductKey, stocking: NewStocking) -> ServiceResult<Product> {
        self.edit(key, |p, now| p.change_stock_mode(stocking, now))
    }

    fn edit<F>(&self, key: &ProductKey, edit: F) -> ServiceResult<Product>
    where
        F: FnOnce(&mut Product, DateTime<Utc>) -> DomainResult<()>,
    {
        self.modify(key, edit).map(|(product, ())| product)
    }

    fn modify<F, R>(&self, key: &ProductKey, edit: F) -> ServiceResult<(Product, R)>
    where
        F: FnOnce(&mut Product, DateTime<Utc>) -> DomainResult<R>,
    {
        let mut loaded = self.store.load_required::<Product>(key.as_str())?;
        let result = edit(&mut loaded.record, Utc::now())?;
        self.store
            .save(&loaded.record, ExpectedVersion::Exact(loaded.version))?;
        Ok((loaded.record, result))
    }
}
