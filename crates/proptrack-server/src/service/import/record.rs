//! Price Paid Data rows and their validation.

use std::fmt;

use bigdecimal::BigDecimal;
use jiff::civil::Date;
use proptrack_postgres::types::{PropertyType, TenureType};
use serde::Deserialize;

use crate::service::postcode::normalize_postcode;

/// One raw CSV line of HM Land Registry Price Paid Data.
///
/// Columns are read by position; every value is kept as the trimmed string
/// found in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PricePaidRow {
    pub transaction_id: String,
    pub price: String,
    pub date_of_transfer: String,
    pub postcode: String,
    pub property_type: String,
    pub old_new: String,
    pub duration: String,
    pub paon: String,
    pub saon: String,
    pub street: String,
    pub locality: String,
    pub town: String,
    pub district: String,
    pub county: String,
    pub ppd_category: String,
    pub record_status: String,
}

impl PricePaidRow {
    /// Returns whether this is the optional header line.
    pub fn is_header(&self) -> bool {
        self.transaction_id.eq_ignore_ascii_case("transactionid")
    }
}

/// Price Paid Data category.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PpdCategory {
    /// `A`: standard price paid entry.
    #[default]
    Standard,
    /// `B`: additional entry such as repossessions and buy-to-lets.
    Additional,
}

impl PpdCategory {
    pub fn code(self) -> &'static str {
        match self {
            Self::Standard => "A",
            Self::Additional => "B",
        }
    }
}

/// What the line does to the published record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// `A`: a new transaction.
    #[default]
    Addition,
    /// `C`: a correction of a published transaction.
    Change,
    /// `D`: withdrawal of a published transaction.
    Delete,
}

/// A validated Price Paid Data transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePaidRecord {
    pub transaction_id: String,
    pub price: BigDecimal,
    pub date_of_transfer: Date,
    /// Normalised, e.g. `SW1A 2AA`.
    pub postcode: String,
    pub property_type: PropertyType,
    pub is_new_build: bool,
    pub tenure: TenureType,
    pub paon: String,
    pub saon: Option<String>,
    pub street: Option<String>,
    pub locality: Option<String>,
    pub town: String,
    pub district: Option<String>,
    pub county: Option<String>,
    pub ppd_category: PpdCategory,
    pub record_status: RecordStatus,
}

/// Every problem found in one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowErrors(pub Vec<String>);

impl RowErrors {
    fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }
}

impl fmt::Display for RowErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("; "))
    }
}

impl std::error::Error for RowErrors {}

fn optional(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn required<'a>(value: &'a str, column: &str, errors: &mut RowErrors) -> Option<&'a str> {
    if value.is_empty() {
        errors.push(format!("{column} is required"));
        None
    } else {
        Some(value)
    }
}

fn parse_price(value: &str, errors: &mut RowErrors) -> Option<BigDecimal> {
    match value.parse::<u64>() {
        Ok(price) if price > 0 => Some(BigDecimal::from(price)),
        _ => {
            errors.push(format!("price '{value}' must be a positive whole number"));
            None
        }
    }
}

/// Accepts `YYYY-MM-DD` with an optional ` HH:MM` suffix.
fn parse_date(value: &str, errors: &mut RowErrors) -> Option<Date> {
    let (date, time) = match value.split_once(' ') {
        Some((date, time)) => (date, Some(time)),
        None => (value, None),
    };

    let time_is_valid = time.is_none_or(|time| {
        let bytes = time.as_bytes();
        bytes.len() == 5
            && bytes[2] == b':'
            && bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit)
    });

    match date.parse::<Date>() {
        Ok(parsed) if time_is_valid && date.len() == 10 => Some(parsed),
        _ => {
            errors.push(format!(
                "dateOfTransfer '{value}' must be YYYY-MM-DD or YYYY-MM-DD HH:MM"
            ));
            None
        }
    }
}

impl TryFrom<PricePaidRow> for PricePaidRecord {
    type Error = RowErrors;

    fn try_from(row: PricePaidRow) -> Result<Self, Self::Error> {
        let mut errors = RowErrors::default();

        let transaction_id = required(&row.transaction_id, "transactionId", &mut errors);
        let price = required(&row.price, "price", &mut errors)
            .and_then(|price| parse_price(price, &mut errors));
        let date_of_transfer = required(&row.date_of_transfer, "dateOfTransfer", &mut errors)
            .and_then(|date| parse_date(date, &mut errors));

        let postcode = required(&row.postcode, "postcode", &mut errors).and_then(|postcode| {
            let normalized = normalize_postcode(postcode);
            if normalized.is_none() {
                errors.push(format!("postcode '{postcode}' is not a valid UK postcode"));
            }
            normalized
        });

        let property_type = required(&row.property_type, "propertyType", &mut errors)
            .and_then(|code| {
                let parsed = PropertyType::from_ppd_code(code);
                if parsed.is_none() {
                    errors.push(format!("propertyType '{code}' must be one of D, S, T, F, O"));
                }
                parsed
            });

        let is_new_build = match row.old_new.to_ascii_uppercase().as_str() {
            "" | "N" => false,
            "Y" => true,
            other => {
                errors.push(format!("oldNew '{other}' must be Y or N"));
                false
            }
        };

        let tenure = required(&row.duration, "duration", &mut errors).and_then(|code| {
            let parsed = TenureType::from_ppd_code(code);
            if parsed.is_none() {
                errors.push(format!("duration '{code}' must be one of F, L, U"));
            }
            parsed
        });

        let paon = required(&row.paon, "paon", &mut errors);
        let town = required(&row.town, "town", &mut errors);

        let ppd_category = match row.ppd_category.to_ascii_uppercase().as_str() {
            "" | "A" => PpdCategory::Standard,
            "B" => PpdCategory::Additional,
            other => {
                errors.push(format!("ppd '{other}' must be A or B"));
                PpdCategory::Standard
            }
        };

        let record_status = match row.record_status.to_ascii_uppercase().as_str() {
            "" | "A" => RecordStatus::Addition,
            "C" => RecordStatus::Change,
            "D" => RecordStatus::Delete,
            other => {
                errors.push(format!("recordStatus '{other}' must be one of A, C, D"));
                RecordStatus::Addition
            }
        };

        match (
            transaction_id,
            price,
            date_of_transfer,
            postcode,
            property_type,
            tenure,
            paon,
            town,
        ) {
            (
                Some(transaction_id),
                Some(price),
                Some(date_of_transfer),
                Some(postcode),
                Some(property_type),
                Some(tenure),
                Some(paon),
                Some(town),
            ) if errors.0.is_empty() => Ok(Self {
                transaction_id: transaction_id.to_owned(),
                price,
                date_of_transfer,
                postcode,
                property_type,
                is_new_build,
                tenure,
                paon: paon.to_owned(),
                town: town.to_owned(),
                saon: optional(row.saon),
                street: optional(row.street),
                locality: optional(row.locality),
                district: optional(row.district),
                county: optional(row.county),
                ppd_category,
                record_status,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn row(transaction_id: &str, price: &str, postcode: &str) -> PricePaidRow {
        PricePaidRow {
            transaction_id: transaction_id.into(),
            price: price.into(),
            date_of_transfer: "2023-06-30 00:00".into(),
            postcode: postcode.into(),
            property_type: "T".into(),
            old_new: "N".into(),
            duration: "F".into(),
            paon: "14".into(),
            saon: String::new(),
            street: "Acacia Avenue".into(),
            locality: String::new(),
            town: "Reading".into(),
            district: "Reading".into(),
            county: "Reading".into(),
            ppd_category: "A".into(),
            record_status: "A".into(),
        }
    }

    #[test]
    fn valid_row_becomes_record() -> anyhow::Result<()> {
        let record = PricePaidRecord::try_from(row("{ABC-1}", "325000", "rg1 8du"))?;

        assert_eq!(record.price, BigDecimal::from(325_000));
        assert_eq!(record.date_of_transfer, Date::new(2023, 6, 30)?);
        assert_eq!(record.postcode, "RG1 8DU");
        assert_eq!(record.property_type, PropertyType::Terraced);
        assert_eq!(record.tenure, TenureType::Freehold);
        assert_eq!(record.saon, None);
        assert_eq!(record.street.as_deref(), Some("Acacia Avenue"));
        assert_eq!(record.record_status, RecordStatus::Addition);
        Ok(())
    }

    #[test]
    fn all_problems_of_a_row_are_reported() {
        let mut bad = row("", "-5", "NOT A POSTCODE");
        bad.property_type = "X".into();

        let Err(errors) = PricePaidRecord::try_from(bad) else {
            panic!("row should be invalid");
        };

        assert_eq!(errors.0.len(), 4);
        let message = errors.to_string();
        assert!(message.contains("transactionId is required"));
        assert!(message.contains("price '-5'"));
        assert!(message.contains("postcode 'NOT A POSTCODE'"));
        assert!(message.contains("propertyType 'X'"));
    }

    #[test]
    fn dates_accept_optional_time() {
        let mut errors = RowErrors::default();
        assert!(parse_date("2021-02-03", &mut errors).is_some());
        assert!(parse_date("2021-02-03 00:00", &mut errors).is_some());
        assert!(errors.0.is_empty());

        assert!(parse_date("03/02/2021", &mut errors).is_none());
        assert!(parse_date("2021-02-30", &mut errors).is_none());
        assert!(parse_date("2021-02-03 midnight", &mut errors).is_none());
        assert_eq!(errors.0.len(), 3);
    }

    #[test]
    fn codes_default_when_blank() -> anyhow::Result<()> {
        let mut blank = row("{ABC-2}", "100000", "M1 1AE");
        blank.old_new = String::new();
        blank.ppd_category = String::new();
        blank.record_status = String::new();

        let record = PricePaidRecord::try_from(blank)?;
        assert!(!record.is_new_build);
        assert_eq!(record.ppd_category, PpdCategory::Standard);
        assert_eq!(record.record_status, RecordStatus::Addition);
        Ok(())
    }

    #[test]
    fn header_row_is_detected() {
        let header = row("transactionId", "price", "postcode");
        assert!(header.is_header());
        assert!(!row("{X}", "1", "M1 1AE").is_header());
    }
}
