//! Income, expense and invoice totals of an account.

use std::collections::BTreeMap;

use bigdecimal::{BigDecimal, Zero};
use jiff::civil::Date;
use proptrack_postgres::PgConnection;
use proptrack_postgres::model::{Invoice, Transaction};
use proptrack_postgres::query::{InvoiceRepository, TransactionRepository};
use proptrack_postgres::types::{InvoiceStatus, TransactionCategory, TransactionFilter};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

const TRACING_TARGET: &str = "proptrack_server::service::finance";

/// Totals of one transaction category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: TransactionCategory,
    pub income: BigDecimal,
    pub expenses: BigDecimal,
    pub transaction_count: u64,
}

/// Financial position over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub property_id: Option<Uuid>,
    pub total_income: BigDecimal,
    pub total_expenses: BigDecimal,
    /// Income minus expenses; negative for a loss.
    pub net_income: BigDecimal,
    pub transaction_count: u64,
    pub by_category: Vec<CategoryTotal>,
    /// Issued and overdue invoices, regardless of the period.
    pub outstanding_invoices: u64,
    pub outstanding_amount: BigDecimal,
    /// Outstanding invoices past their due date.
    pub overdue_invoices: u64,
    pub overdue_amount: BigDecimal,
}

/// Aggregates `transactions` and `outstanding` invoices as of `today`.
pub fn summarize(
    filter: &TransactionFilter,
    transactions: &[Transaction],
    outstanding: &[Invoice],
    today: Date,
) -> FinancialSummary {
    let mut total_income = BigDecimal::zero();
    let mut total_expenses = BigDecimal::zero();
    let mut categories: BTreeMap<TransactionCategory, CategoryTotal> = BTreeMap::new();

    for transaction in transactions {
        let entry = categories
            .entry(transaction.category)
            .or_insert_with(|| CategoryTotal {
                category: transaction.category,
                income: BigDecimal::zero(),
                expenses: BigDecimal::zero(),
                transaction_count: 0,
            });

        entry.transaction_count += 1;
        if transaction.is_income() {
            entry.income += &transaction.amount;
            total_income += &transaction.amount;
        } else {
            entry.expenses += &transaction.amount;
            total_expenses += &transaction.amount;
        }
    }

    let mut outstanding_amount = BigDecimal::zero();
    let mut overdue_amount = BigDecimal::zero();
    let mut overdue_invoices = 0;

    let outstanding: Vec<_> = outstanding
        .iter()
        .filter(|invoice| invoice.status.is_outstanding())
        .collect();

    for invoice in &outstanding {
        outstanding_amount += &invoice.total_amount;
        if invoice.status == InvoiceStatus::Overdue || invoice.is_overdue(today) {
            overdue_invoices += 1;
            overdue_amount += &invoice.total_amount;
        }
    }

    FinancialSummary {
        from: filter.from,
        to: filter.to,
        property_id: filter.property_id,
        net_income: &total_income - &total_expenses,
        total_income,
        total_expenses,
        transaction_count: transactions.len() as u64,
        by_category: categories.into_values().collect(),
        outstanding_invoices: outstanding.len() as u64,
        outstanding_amount,
        overdue_invoices,
        overdue_amount,
    }
}

/// Loads and aggregates the financial summary of an account.
pub async fn load_summary(
    conn: &mut PgConnection,
    account_id: Uuid,
    filter: TransactionFilter,
    today: Date,
) -> Result<FinancialSummary> {
    let transactions = conn.list_all_transactions(account_id, filter).await?;
    let outstanding = conn
        .list_outstanding_invoices(account_id, filter.property_id)
        .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        %account_id,
        transactions = transactions.len(),
        outstanding = outstanding.len(),
        "financial summary loaded"
    );

    Ok(summarize(&filter, &transactions, &outstanding, today))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use jiff::civil::date;
    use proptrack_postgres::types::TransactionType;

    use super::*;

    fn transaction(kind: TransactionType, category: TransactionCategory, amount: i64) -> Transaction {
        let now = Timestamp::now();
        Transaction {
            id: Uuid::new_v4(),
            account_id: Uuid::nil(),
            property_id: None,
            invoice_id: None,
            transaction_type: kind,
            category,
            amount: BigDecimal::from(amount),
            description: None,
            reference: None,
            transaction_date: date(2024, 3, 1).into(),
            created_at: now.into(),
            updated_at: now.into(),
            deleted_at: None,
        }
    }

    fn invoice(status: InvoiceStatus, due: Date, total: i64) -> Invoice {
        let now = Timestamp::now();
        Invoice {
            id: Uuid::new_v4(),
            account_id: Uuid::nil(),
            property_id: None,
            tenancy_id: None,
            invoice_number: "INV-000001".into(),
            recipient_name: "A Tenant".into(),
            recipient_email: None,
            description: None,
            net_amount: BigDecimal::from(total),
            tax_amount: BigDecimal::zero(),
            total_amount: BigDecimal::from(total),
            currency: "GBP".into(),
            status,
            issue_date: date(2024, 1, 1).into(),
            due_date: due.into(),
            paid_at: None,
            created_at: now.into(),
            updated_at: now.into(),
            deleted_at: None,
        }
    }

    #[test]
    fn transactions_are_totalled_by_category() {
        let transactions = [
            transaction(TransactionType::Income, TransactionCategory::Rent, 1200),
            transaction(TransactionType::Income, TransactionCategory::Rent, 1200),
            transaction(TransactionType::Expense, TransactionCategory::Maintenance, 350),
            transaction(TransactionType::Expense, TransactionCategory::Insurance, 50),
        ];

        let summary = summarize(&TransactionFilter::default(), &transactions, &[], date(2024, 3, 31));

        assert_eq!(summary.total_income, BigDecimal::from(2400));
        assert_eq!(summary.total_expenses, BigDecimal::from(400));
        assert_eq!(summary.net_income, BigDecimal::from(2000));
        assert_eq!(summary.transaction_count, 4);
        assert_eq!(summary.by_category.len(), 3);

        let rent = summary
            .by_category
            .iter()
            .find(|total| total.category == TransactionCategory::Rent);
        assert_eq!(rent.map(|total| total.transaction_count), Some(2));
    }

    #[test]
    fn outstanding_and_overdue_invoices() {
        let invoices = [
            invoice(InvoiceStatus::Issued, date(2024, 4, 30), 500),
            invoice(InvoiceStatus::Issued, date(2024, 2, 28), 300),
            invoice(InvoiceStatus::Overdue, date(2024, 1, 31), 200),
        ];

        let summary = summarize(&TransactionFilter::default(), &[], &invoices, date(2024, 3, 31));

        assert_eq!(summary.outstanding_invoices, 3);
        assert_eq!(summary.outstanding_amount, BigDecimal::from(1000));
        assert_eq!(summary.overdue_invoices, 2);
        assert_eq!(summary.overdue_amount, BigDecimal::from(500));
        assert!(summary.net_income.is_zero());
    }

    #[test]
    fn losses_are_negative() {
        let transactions = [transaction(TransactionType::Expense, TransactionCategory::Tax, 90)];
        let summary = summarize(&TransactionFilter::default(), &transactions, &[], date(2024, 1, 1));
        assert_eq!(summary.net_income, BigDecimal::from(-90));
    }
}
