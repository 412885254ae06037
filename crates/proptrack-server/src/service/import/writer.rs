//! Upsert of validated records into the properties table.

use proptrack_postgres::PgConnection;
use proptrack_postgres::model::{NewProperty, Property, UpdateProperty};
use proptrack_postgres::query::PropertyRepository;
use proptrack_postgres::types::ListingStatus;
use uuid::Uuid;

use super::error::ImportResult;
use super::record::{PricePaidRecord, RecordStatus};

const TRACING_TARGET: &str = "proptrack_server::service::import::writer";

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Skipped,
    Deleted,
}

/// Action to take for a record, given the property it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Insert,
    Update(Uuid),
    /// Update the sale and move the property to the corrected address.
    Correct(Uuid),
    Delete(Uuid),
    Skip,
}

impl UpsertAction {
    /// Decides how `record` changes `existing`.
    ///
    /// `existing` is the live property carrying the record's transaction
    /// id, or failing that the live property at its address.
    ///
    /// - no property and a withdrawal: nothing to do;
    /// - no property: insert;
    /// - withdrawal of the sale recorded on the property: soft delete,
    ///   unless an account manages the property;
    /// - the same sale again: duplicate;
    /// - correction of the sale on an unowned property: sale and address
    ///   are rewritten when `update_existing` is set;
    /// - otherwise update only when `update_existing` is set.
    pub fn decide(
        existing: Option<&Property>,
        record: &PricePaidRecord,
        update_existing: bool,
    ) -> Self {
        let Some(property) = existing else {
            return match record.record_status {
                RecordStatus::Delete => Self::Skip,
                _ => Self::Insert,
            };
        };

        let same_sale = property.land_registry_transaction_id.as_deref()
            == Some(record.transaction_id.as_str());

        match record.record_status {
            RecordStatus::Delete if same_sale && property.is_unowned() => Self::Delete(property.id),
            RecordStatus::Delete => Self::Skip,
            RecordStatus::Addition if same_sale => Self::Skip,
            RecordStatus::Change if same_sale && update_existing && property.is_unowned() => {
                Self::Correct(property.id)
            }
            _ if update_existing => Self::Update(property.id),
            _ => Self::Skip,
        }
    }
}

impl PricePaidRecord {
    /// Builds an unowned property carrying the sale.
    pub fn to_new_property(&self, import_id: Uuid) -> NewProperty {
        NewProperty {
            paon: self.paon.clone(),
            saon: self.saon.clone(),
            street: self.street.clone(),
            locality: self.locality.clone(),
            town: self.town.clone(),
            district: self.district.clone(),
            county: self.county.clone(),
            postcode: self.postcode.clone(),
            property_type: self.property_type,
            tenure: self.tenure,
            is_new_build: self.is_new_build,
            listing_status: ListingStatus::OffMarket,
            last_sale_price: Some(self.price.clone()),
            last_sale_date: Some(self.date_of_transfer.into()),
            land_registry_transaction_id: Some(self.transaction_id.clone()),
            ppd_category: Some(self.ppd_category.code().to_owned()),
            import_id: Some(import_id),
            ..NewProperty::default()
        }
    }

    /// Replaces the recorded sale of an existing property.
    pub fn to_sale_update(&self, import_id: Uuid) -> UpdateProperty {
        UpdateProperty {
            property_type: Some(self.property_type),
            tenure: Some(self.tenure),
            is_new_build: Some(self.is_new_build),
            last_sale_price: Some(Some(self.price.clone())),
            last_sale_date: Some(Some(self.date_of_transfer.into())),
            land_registry_transaction_id: Some(Some(self.transaction_id.clone())),
            ppd_category: Some(Some(self.ppd_category.code().to_owned())),
            import_id: Some(Some(import_id)),
            ..UpdateProperty::default()
        }
    }

    /// Replaces the recorded sale and the address of an existing property.
    pub fn to_correction(&self, import_id: Uuid) -> UpdateProperty {
        UpdateProperty {
            paon: Some(self.paon.clone()),
            saon: Some(self.saon.clone()),
            street: Some(self.street.clone()),
            locality: Some(self.locality.clone()),
            town: Some(self.town.clone()),
            district: Some(self.district.clone()),
            county: Some(self.county.clone()),
            postcode: Some(self.postcode.clone()),
            ..self.to_sale_update(import_id)
        }
    }
}

/// Destination of validated records.
///
/// Implemented for [`PgConnection`]; the pipeline runs it inside the
/// transaction of the import.
pub trait ImportWriter: Send {
    fn upsert_record(
        &mut self,
        record: &PricePaidRecord,
        import_id: Uuid,
        update_existing: bool,
    ) -> impl Future<Output = ImportResult<UpsertOutcome>> + Send;
}

impl ImportWriter for PgConnection {
    async fn upsert_record(
        &mut self,
        record: &PricePaidRecord,
        import_id: Uuid,
        update_existing: bool,
    ) -> ImportResult<UpsertOutcome> {
        upsert(self, record, import_id, update_existing).await
    }
}

/// Finds the property a record refers to.
///
/// The transaction id wins over the address, so a corrected address still
/// reaches the property holding the sale.
async fn find_existing<C>(conn: &mut C, record: &PricePaidRecord) -> ImportResult<Option<Property>>
where
    C: PropertyRepository + Send,
{
    if let Some(property) = conn
        .find_property_by_transaction_id(&record.transaction_id)
        .await?
    {
        return Ok(Some(property));
    }

    let property = conn
        .find_property_by_address(
            &record.paon,
            record.saon.as_deref(),
            record.street.as_deref(),
            &record.postcode,
        )
        .await?;

    Ok(property)
}

async fn upsert<C>(
    conn: &mut C,
    record: &PricePaidRecord,
    import_id: Uuid,
    update_existing: bool,
) -> ImportResult<UpsertOutcome>
where
    C: PropertyRepository + Send,
{
    let existing = find_existing(conn, record).await?;
    let action = UpsertAction::decide(existing.as_ref(), record, update_existing);
    tracing::trace!(
        target: TRACING_TARGET,
        transaction_id = %record.transaction_id,
        action = ?action,
        "upserting price paid record"
    );

    let outcome = match action {
        UpsertAction::Insert => {
            conn.create_property(record.to_new_property(import_id)).await?;
            UpsertOutcome::Inserted
        }
        UpsertAction::Update(property_id) => {
            conn.update_property(property_id, record.to_sale_update(import_id))
                .await?;
            UpsertOutcome::Updated
        }
        UpsertAction::Correct(property_id) => {
            conn.update_property(property_id, record.to_correction(import_id))
                .await?;
            UpsertOutcome::Updated
        }
        UpsertAction::Delete(property_id) => {
            if conn.delete_property(property_id).await? {
                UpsertOutcome::Deleted
            } else {
                UpsertOutcome::Skipped
            }
        }
        UpsertAction::Skip => UpsertOutcome::Skipped,
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use proptrack_postgres::query::{PriceStats, PropertyTypePriceStats};
    use proptrack_postgres::types::{
        OffsetPage, OffsetPagination, PropertyFilter, PropertyLocation, PropertyType, TenureType,
    };
    use proptrack_postgres::{PgError, PgResult};

    use super::*;
    use crate::service::import::record::tests::row;

    /// Properties table in memory, with its unique transaction id index.
    #[derive(Default)]
    struct MemoryProperties {
        rows: Vec<Property>,
    }

    impl MemoryProperties {
        fn live(&self) -> impl Iterator<Item = &Property> {
            self.rows.iter().filter(|p| p.deleted_at.is_none())
        }

        fn holder_of(&self, transaction_id: &str) -> Option<&Property> {
            self.live()
                .find(|p| p.land_registry_transaction_id.as_deref() == Some(transaction_id))
        }
    }

    impl PropertyRepository for MemoryProperties {
        async fn create_property(&mut self, new_property: NewProperty) -> PgResult<Property> {
            if let Some(transaction_id) = new_property.land_registry_transaction_id.as_deref() {
                if self.holder_of(transaction_id).is_some() {
                    return Err(PgError::Unexpected("duplicate transaction id".into()));
                }
            }

            let property = Property {
                paon: new_property.paon,
                saon: new_property.saon,
                street: new_property.street,
                postcode: new_property.postcode,
                last_sale_price: new_property.last_sale_price,
                land_registry_transaction_id: new_property.land_registry_transaction_id,
                import_id: new_property.import_id,
                ..property("", new_property.owner_id)
            };
            self.rows.push(property.clone());
            Ok(property)
        }

        async fn find_property_by_id(&mut self, property_id: Uuid) -> PgResult<Option<Property>> {
            Ok(self.live().find(|p| p.id == property_id).cloned())
        }

        async fn find_property_by_address(
            &mut self,
            paon: &str,
            saon: Option<&str>,
            street: Option<&str>,
            postcode: &str,
        ) -> PgResult<Option<Property>> {
            Ok(self
                .live()
                .find(|p| {
                    p.paon.eq_ignore_ascii_case(paon)
                        && p.saon.as_deref() == saon
                        && p.street.as_deref().map(str::to_uppercase)
                            == street.map(str::to_uppercase)
                        && p.postcode == postcode
                })
                .cloned())
        }

        async fn find_property_by_transaction_id(
            &mut self,
            transaction_id: &str,
        ) -> PgResult<Option<Property>> {
            Ok(self.holder_of(transaction_id).cloned())
        }

        async fn list_properties(
            &mut self,
            _filter: &PropertyFilter,
            _pagination: OffsetPagination,
        ) -> PgResult<OffsetPage<Property>> {
            unimplemented!()
        }

        async fn update_property(
            &mut self,
            property_id: Uuid,
            updates: UpdateProperty,
        ) -> PgResult<Property> {
            if let Some(Some(transaction_id)) = updates.land_registry_transaction_id.as_deref() {
                if self
                    .holder_of(transaction_id)
                    .is_some_and(|holder| holder.id != property_id)
                {
                    return Err(PgError::Unexpected("duplicate transaction id".into()));
                }
            }

            let Some(property) = self
                .rows
                .iter_mut()
                .find(|p| p.id == property_id && p.deleted_at.is_none())
            else {
                return Err(PgError::Unexpected("no such property".into()));
            };

            if let Some(paon) = updates.paon {
                property.paon = paon;
            }
            if let Some(postcode) = updates.postcode {
                property.postcode = postcode;
            }
            if let Some(price) = updates.last_sale_price {
                property.last_sale_price = price;
            }
            if let Some(transaction_id) = updates.land_registry_transaction_id {
                property.land_registry_transaction_id = transaction_id;
            }
            Ok(property.clone())
        }

        async fn delete_property(&mut self, property_id: Uuid) -> PgResult<bool> {
            let property = self
                .rows
                .iter_mut()
                .find(|p| p.id == property_id && p.deleted_at.is_none());
            Ok(property
                .map(|p| p.deleted_at = Some(Timestamp::now().into()))
                .is_some())
        }

        async fn property_price_stats(
            &mut self,
            _location: &PropertyLocation,
            _property_type: Option<PropertyType>,
        ) -> PgResult<PriceStats> {
            unimplemented!()
        }

        async fn property_price_stats_by_type(
            &mut self,
            _location: &PropertyLocation,
        ) -> PgResult<Vec<PropertyTypePriceStats>> {
            unimplemented!()
        }
    }

    fn at(transaction_id: &str, paon: &str, status: &str) -> anyhow::Result<PricePaidRecord> {
        let mut row = row(transaction_id, "450000", "RG1 8DU");
        row.paon = paon.into();
        row.record_status = status.into();
        Ok(PricePaidRecord::try_from(row)?)
    }

    fn record(status: &str) -> anyhow::Result<PricePaidRecord> {
        let mut row = row("{SALE-1}", "450000", "RG1 8DU");
        row.record_status = status.into();
        Ok(PricePaidRecord::try_from(row)?)
    }

    fn property(transaction_id: &str, owner_id: Option<Uuid>) -> Property {
        let now = Timestamp::now();
        Property {
            id: Uuid::new_v4(),
            owner_id,
            display_name: None,
            description: None,
            paon: "14".into(),
            saon: None,
            street: Some("Acacia Avenue".into()),
            locality: None,
            town: "Reading".into(),
            district: None,
            county: None,
            postcode: "RG1 8DU".into(),
            property_type: PropertyType::Terraced,
            tenure: TenureType::Freehold,
            is_new_build: false,
            bedrooms: None,
            bathrooms: None,
            floor_area_sqm: None,
            epc_rating: None,
            listing_status: ListingStatus::OffMarket,
            asking_price: None,
            monthly_rent: None,
            last_sale_price: None,
            last_sale_date: None,
            land_registry_transaction_id: Some(transaction_id.into()),
            ppd_category: Some("A".into()),
            import_id: None,
            created_at: now.into(),
            updated_at: now.into(),
            deleted_at: None,
        }
    }

    #[test]
    fn new_addresses_are_inserted() -> anyhow::Result<()> {
        assert_eq!(UpsertAction::decide(None, &record("A")?, false), UpsertAction::Insert);
        assert_eq!(UpsertAction::decide(None, &record("C")?, false), UpsertAction::Insert);
        assert_eq!(UpsertAction::decide(None, &record("D")?, true), UpsertAction::Skip);
        Ok(())
    }

    #[test]
    fn same_sale_is_a_duplicate() -> anyhow::Result<()> {
        let existing = property("{SALE-1}", None);
        let action = UpsertAction::decide(Some(&existing), &record("A")?, true);
        assert_eq!(action, UpsertAction::Skip);
        Ok(())
    }

    #[test]
    fn newer_sale_updates_only_when_requested() -> anyhow::Result<()> {
        let existing = property("{SALE-0}", None);

        let action = UpsertAction::decide(Some(&existing), &record("A")?, true);
        assert_eq!(action, UpsertAction::Update(existing.id));

        let action = UpsertAction::decide(Some(&existing), &record("A")?, false);
        assert_eq!(action, UpsertAction::Skip);
        Ok(())
    }

    #[test]
    fn withdrawals_delete_only_the_matching_unowned_sale() -> anyhow::Result<()> {
        let matching = property("{SALE-1}", None);
        let action = UpsertAction::decide(Some(&matching), &record("D")?, false);
        assert_eq!(action, UpsertAction::Delete(matching.id));

        let other_sale = property("{SALE-0}", None);
        let action = UpsertAction::decide(Some(&other_sale), &record("D")?, true);
        assert_eq!(action, UpsertAction::Skip);

        let managed = property("{SALE-1}", Some(Uuid::new_v4()));
        let action = UpsertAction::decide(Some(&managed), &record("D")?, true);
        assert_eq!(action, UpsertAction::Skip);
        Ok(())
    }

    #[test]
    fn corrections_of_the_same_sale_rewrite_unowned_properties() -> anyhow::Result<()> {
        let existing = property("{SALE-1}", None);
        let action = UpsertAction::decide(Some(&existing), &record("C")?, true);
        assert_eq!(action, UpsertAction::Correct(existing.id));

        let action = UpsertAction::decide(Some(&existing), &record("C")?, false);
        assert_eq!(action, UpsertAction::Skip);

        let managed = property("{SALE-1}", Some(Uuid::new_v4()));
        let action = UpsertAction::decide(Some(&managed), &record("C")?, true);
        assert_eq!(action, UpsertAction::Update(managed.id));
        Ok(())
    }

    #[test]
    fn new_property_carries_the_sale() -> anyhow::Result<()> {
        let import_id = Uuid::new_v4();
        let new_property = record("A")?.to_new_property(import_id);

        assert_eq!(new_property.owner_id, None);
        assert_eq!(new_property.postcode, "RG1 8DU");
        assert_eq!(new_property.land_registry_transaction_id.as_deref(), Some("{SALE-1}"));
        assert_eq!(new_property.import_id, Some(import_id));
        assert_eq!(new_property.listing_status, ListingStatus::OffMarket);
        Ok(())
    }

    #[tokio::test]
    async fn corrected_address_reaches_the_sale_holder() -> anyhow::Result<()> {
        let mut conn = MemoryProperties::default();
        let import_id = Uuid::new_v4();

        let outcome = upsert(&mut conn, &at("{SALE-1}", "1", "A")?, import_id, true).await?;
        assert_eq!(outcome, UpsertOutcome::Inserted);

        let outcome = upsert(&mut conn, &at("{SALE-1}", "1A", "C")?, import_id, true).await?;
        assert_eq!(outcome, UpsertOutcome::Updated);

        let outcome = upsert(&mut conn, &at("{SALE-2}", "2", "A")?, import_id, true).await?;
        assert_eq!(outcome, UpsertOutcome::Inserted);

        assert_eq!(conn.live().count(), 2);
        assert_eq!(conn.holder_of("{SALE-1}").map(|p| p.paon.as_str()), Some("1A"));
        Ok(())
    }

    #[tokio::test]
    async fn known_sales_at_other_addresses_are_not_inserted_again() -> anyhow::Result<()> {
        let mut conn = MemoryProperties::default();
        let import_id = Uuid::new_v4();
        upsert(&mut conn, &at("{SALE-1}", "1", "A")?, import_id, false).await?;

        let outcome = upsert(&mut conn, &at("{SALE-1}", "1A", "A")?, import_id, true).await?;
        assert_eq!(outcome, UpsertOutcome::Skipped);

        let outcome = upsert(&mut conn, &at("{SALE-1}", "1A", "C")?, import_id, false).await?;
        assert_eq!(outcome, UpsertOutcome::Skipped);

        assert_eq!(conn.live().count(), 1);
        assert_eq!(conn.holder_of("{SALE-1}").map(|p| p.paon.as_str()), Some("1"));
        Ok(())
    }

    #[tokio::test]
    async fn new_sales_at_a_known_address_follow_update_existing() -> anyhow::Result<()> {
        let mut conn = MemoryProperties::default();
        let import_id = Uuid::new_v4();
        upsert(&mut conn, &at("{SALE-1}", "1", "A")?, import_id, false).await?;

        let outcome = upsert(&mut conn, &at("{SALE-2}", "1", "A")?, import_id, false).await?;
        assert_eq!(outcome, UpsertOutcome::Skipped);

        let outcome = upsert(&mut conn, &at("{SALE-2}", "1", "A")?, import_id, true).await?;
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert!(conn.holder_of("{SALE-1}").is_none());
        assert!(conn.holder_of("{SALE-2}").is_some());

        let outcome = upsert(&mut conn, &at("{SALE-2}", "1", "D")?, import_id, false).await?;
        assert_eq!(outcome, UpsertOutcome::Deleted);
        assert_eq!(conn.live().count(), 0);
        Ok(())
    }

    #[test]
    fn corrections_carry_the_new_address() -> anyhow::Result<()> {
        let update = at("{SALE-1}", "1A", "C")?.to_correction(Uuid::new_v4());
        assert_eq!(update.paon.as_deref(), Some("1A"));
        assert_eq!(update.postcode.as_deref(), Some("RG1 8DU"));
        assert_eq!(
            update.land_registry_transaction_id,
            Some(Some("{SALE-1}".to_owned()))
        );
        Ok(())
    }
}
