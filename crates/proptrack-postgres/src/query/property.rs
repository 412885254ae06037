use bigdecimal::BigDecimal;
use diesel::dsl::{avg, count_star};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::{numeric_max, numeric_min, upper};
use crate::model::{NewProperty, Property, UpdateProperty};
use crate::schema::properties::{self, dsl};
use crate::types::{OffsetPage, OffsetPagination, PropertyFilter, PropertyLocation, PropertyType};
use crate::{PgConnection, PgResult};

/// Aggregated last-sale prices over an area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceStats {
    /// Number of properties with a recorded sale.
    pub count: i64,
    pub average: Option<BigDecimal>,
    pub min: Option<BigDecimal>,
    pub max: Option<BigDecimal>,
}

/// Last-sale prices of one property type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTypePriceStats {
    pub property_type: PropertyType,
    pub count: i64,
    pub average: Option<BigDecimal>,
}

/// Property persistence and price lookups.
pub trait PropertyRepository {
    fn create_property(
        &mut self,
        new_property: NewProperty,
    ) -> impl Future<Output = PgResult<Property>> + Send;

    fn find_property_by_id(
        &mut self,
        property_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Property>>> + Send;

    /// Finds a live property by its address.
    ///
    /// Address parts are compared case-insensitively and the postcode must
    /// already be normalised. A missing `saon` or `street` only matches rows
    /// where that column is also null.
    fn find_property_by_address(
        &mut self,
        paon: &str,
        saon: Option<&str>,
        street: Option<&str>,
        postcode: &str,
    ) -> impl Future<Output = PgResult<Option<Property>>> + Send;

    /// Finds the live property carrying a Land Registry transaction id.
    fn find_property_by_transaction_id(
        &mut self,
        transaction_id: &str,
    ) -> impl Future<Output = PgResult<Option<Property>>> + Send;

    /// Lists properties matching `filter`, most recently updated first.
    fn list_properties(
        &mut self,
        filter: &PropertyFilter,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<OffsetPage<Property>>> + Send;

    fn update_property(
        &mut self,
        property_id: Uuid,
        updates: UpdateProperty,
    ) -> impl Future<Output = PgResult<Property>> + Send;

    /// Soft-deletes a property. Returns `false` if there was nothing to delete.
    fn delete_property(&mut self, property_id: Uuid)
    -> impl Future<Output = PgResult<bool>> + Send;

    /// Aggregates last-sale prices in `location`, optionally for one property type.
    fn property_price_stats(
        &mut self,
        location: &PropertyLocation,
        property_type: Option<PropertyType>,
    ) -> impl Future<Output = PgResult<PriceStats>> + Send;

    /// Aggregates last-sale prices in `location` per property type.
    fn property_price_stats_by_type(
        &mut self,
        location: &PropertyLocation,
    ) -> impl Future<Output = PgResult<Vec<PropertyTypePriceStats>>> + Send;
}

fn filtered(filter: &PropertyFilter) -> properties::BoxedQuery<'static, Pg> {
    let mut query = properties::table
        .filter(dsl::deleted_at.is_null())
        .into_boxed();

    query = match (filter.owner_id, filter.include_unowned) {
        (Some(owner_id), true) => {
            query.filter(dsl::owner_id.eq(owner_id).or(dsl::owner_id.is_null()))
        }
        (Some(owner_id), false) => query.filter(dsl::owner_id.eq(owner_id)),
        (None, _) => query,
    };
    if let Some(town) = filter.town.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(upper(dsl::town.nullable()).eq(town.to_uppercase()));
    }
    if let Some(prefix) = filter.normalized_postcode_prefix() {
        query = query.filter(dsl::postcode.like(format!("{}%", escape_like(&prefix))));
    }
    if let Some(property_type) = filter.property_type {
        query = query.filter(dsl::property_type.eq(property_type));
    }
    if let Some(listing_status) = filter.listing_status {
        query = query.filter(dsl::listing_status.eq(listing_status));
    }
    if let Some(min_price) = filter.min_price.clone() {
        query = query.filter(dsl::asking_price.ge(min_price));
    }
    if let Some(max_price) = filter.max_price.clone() {
        query = query.filter(dsl::asking_price.le(max_price));
    }
    if let Some(min_bedrooms) = filter.min_bedrooms {
        query = query.filter(dsl::bedrooms.ge(min_bedrooms));
    }

    query
}

fn in_location(location: &PropertyLocation) -> properties::BoxedQuery<'static, Pg> {
    let query = properties::table
        .filter(dsl::deleted_at.is_null())
        .filter(dsl::last_sale_price.is_not_null())
        .into_boxed();

    match location {
        PropertyLocation::PostcodeDistrict(district) => {
            let district = district.trim().to_uppercase();
            query.filter(dsl::postcode.like(format!("{} %", escape_like(&district))))
        }
        PropertyLocation::Town(town) => {
            query.filter(upper(dsl::town.nullable()).eq(town.trim().to_uppercase()))
        }
    }
}

/// Escapes `LIKE` wildcards in user input.
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl PropertyRepository for PgConnection {
    async fn create_property(&mut self, new_property: NewProperty) -> PgResult<Property> {
        let property = diesel::insert_into(properties::table)
            .values(&new_property)
            .returning(Property::as_returning())
            .get_result(self)
            .await?;

        Ok(property)
    }

    async fn find_property_by_id(&mut self, property_id: Uuid) -> PgResult<Option<Property>> {
        let property = properties::table
            .filter(dsl::id.eq(property_id))
            .filter(dsl::deleted_at.is_null())
            .select(Property::as_select())
            .first(self)
            .await
            .optional()?;

        Ok(property)
    }

    async fn find_property_by_address(
        &mut self,
        paon: &str,
        saon: Option<&str>,
        street: Option<&str>,
        postcode: &str,
    ) -> PgResult<Option<Property>> {
        let mut query = properties::table
            .filter(dsl::deleted_at.is_null())
            .filter(dsl::postcode.eq(postcode.to_owned()))
            .filter(upper(dsl::paon.nullable()).eq(paon.trim().to_uppercase()))
            .into_boxed();

        query = match saon.map(str::trim).filter(|s| !s.is_empty()) {
            Some(saon) => query.filter(upper(dsl::saon).eq(saon.to_uppercase())),
            None => query.filter(dsl::saon.is_null()),
        };
        query = match street.map(str::trim).filter(|s| !s.is_empty()) {
            Some(street) => query.filter(upper(dsl::street).eq(street.to_uppercase())),
            None => query.filter(dsl::street.is_null()),
        };

        let property = query
            .order(dsl::created_at.asc())
            .select(Property::as_select())
            .first(self)
            .await
            .optional()?;

        Ok(property)
    }

    async fn find_property_by_transaction_id(
        &mut self,
        transaction_id: &str,
    ) -> PgResult<Option<Property>> {
        let property = properties::table
            .filter(dsl::land_registry_transaction_id.eq(transaction_id.to_owned()))
            .filter(dsl::deleted_at.is_null())
            .select(Property::as_select())
            .first(self)
            .await
            .optional()?;

        Ok(property)
    }

    async fn list_properties(
        &mut self,
        filter: &PropertyFilter,
        pagination: OffsetPagination,
    ) -> PgResult<OffsetPage<Property>> {
        let total = filtered(filter).count().get_result(self).await?;
        let items = filtered(filter)
            .order((dsl::updated_at.desc(), dsl::id.asc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Property::as_select())
            .load(self)
            .await?;

        Ok(OffsetPage::new(items, total))
    }

    async fn update_property(
        &mut self,
        property_id: Uuid,
        updates: UpdateProperty,
    ) -> PgResult<Property> {
        if updates == UpdateProperty::default() {
            return Ok(properties::table
                .filter(dsl::id.eq(property_id))
                .filter(dsl::deleted_at.is_null())
                .select(Property::as_select())
                .first(self)
                .await?);
        }

        let property = diesel::update(properties::table)
            .filter(dsl::id.eq(property_id))
            .filter(dsl::deleted_at.is_null())
            .set(&updates)
            .returning(Property::as_returning())
            .get_result(self)
            .await?;

        Ok(property)
    }

    async fn delete_property(&mut self, property_id: Uuid) -> PgResult<bool> {
        let affected = diesel::update(properties::table)
            .filter(dsl::id.eq(property_id))
            .filter(dsl::deleted_at.is_null())
            .set(dsl::deleted_at.eq(super::now()))
            .execute(self)
            .await?;

        Ok(affected > 0)
    }

    async fn property_price_stats(
        &mut self,
        location: &PropertyLocation,
        property_type: Option<PropertyType>,
    ) -> PgResult<PriceStats> {
        let mut query = in_location(location);
        if let Some(property_type) = property_type {
            query = query.filter(dsl::property_type.eq(property_type));
        }

        let (count, average, min, max) = query
            .select((
                count_star(),
                avg(dsl::last_sale_price),
                numeric_min(dsl::last_sale_price),
                numeric_max(dsl::last_sale_price),
            ))
            .get_result::<(i64, Option<BigDecimal>, Option<BigDecimal>, Option<BigDecimal>)>(self)
            .await?;

        Ok(PriceStats {
            count,
            average,
            min,
            max,
        })
    }

    async fn property_price_stats_by_type(
        &mut self,
        location: &PropertyLocation,
    ) -> PgResult<Vec<PropertyTypePriceStats>> {
        let sold = properties::table
            .filter(dsl::deleted_at.is_null())
            .filter(dsl::last_sale_price.is_not_null());

        let select = (dsl::property_type, count_star(), avg(dsl::last_sale_price));
        let rows: Vec<(PropertyType, i64, Option<BigDecimal>)> = match location {
            PropertyLocation::PostcodeDistrict(district) => {
                let pattern = format!("{} %", escape_like(&district.trim().to_uppercase()));
                sold.filter(dsl::postcode.like(pattern))
                    .group_by(dsl::property_type)
                    .select(select)
                    .order(dsl::property_type.asc())
                    .load(self)
                    .await?
            }
            PropertyLocation::Town(town) => {
                sold.filter(upper(dsl::town.nullable()).eq(town.trim().to_uppercase()))
                    .group_by(dsl::property_type)
                    .select(select)
                    .order(dsl::property_type.asc())
                    .load(self)
                    .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|(property_type, count, average)| PropertyTypePriceStats {
                property_type,
                count,
                average,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("SW1A"), "SW1A");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }

    #[test]
    fn unowned_properties_are_listed_on_request() {
        let owner_id = Uuid::new_v4();
        let own = PropertyFilter {
            owner_id: Some(owner_id),
            ..PropertyFilter::default()
        };
        let sql = diesel::debug_query::<Pg, _>(&filtered(&own)).to_string();
        assert!(!sql.contains(r#""owner_id" IS NULL"#));

        let with_imported = PropertyFilter {
            include_unowned: true,
            ..own
        };
        let sql = diesel::debug_query::<Pg, _>(&filtered(&with_imported)).to_string();
        assert!(sql.contains(r#""properties"."owner_id" IS NULL"#));
    }

    #[test]
    fn price_stats_aggregate_numeric_prices() {
        let location = PropertyLocation::PostcodeDistrict("rg1".into());
        let query = in_location(&location).select((
            count_star(),
            avg(dsl::last_sale_price),
            numeric_min(dsl::last_sale_price),
            numeric_max(dsl::last_sale_price),
        ));

        let sql = diesel::debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains(r#"min("properties"."last_sale_price")"#));
        assert!(sql.contains(r#"max("properties"."last_sale_price")"#));
        assert!(sql.contains("RG1 %"));
    }
}
