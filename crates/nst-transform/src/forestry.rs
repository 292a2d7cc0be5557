//! Forestry account unpivot.
//!
//! Forestry accounts and their funds carry an open set of amount columns
//! next to a few identifying ones. Each numeric, non-zero column becomes one
//! record.

use nst_model::{AccountingEvent, ForestryField, ForestryOrigin, Provenance};
use rust_decimal::Decimal;

/// Snapshot prefix for forestry accounts.
pub const ACCOUNTS_PREFIX: &str = "skogbruk-skog-og-toemmerkonto";
/// Snapshot prefix for forestry funds.
pub const FUNDS_PREFIX: &str = "skogbruk-skogfond";

/// Unpivot every `skogOgToemmerkonto` element.
pub fn flatten_forestry_accounts(events: &[AccountingEvent]) -> Vec<ForestryField> {
    let mut fields = Vec::new();
    for event in events {
        let Some(provenance) = event.provenance() else {
            continue;
        };
        for account in event.specification.skog_og_toemmerkonto() {
            let origin = ForestryOrigin::Account {
                account_id: account.id.clone(),
                operating_unit: account.driftsenhet_label(),
            };
            push_amounts(&mut fields, &provenance, &origin, account.amounts());
        }
    }
    sort_fields(&mut fields);
    fields
}

/// Unpivot every `skogfond` element of every forestry account.
pub fn flatten_forestry_funds(events: &[AccountingEvent]) -> Vec<ForestryField> {
    let mut fields = Vec::new();
    for event in events {
        let Some(provenance) = event.provenance() else {
            continue;
        };
        for account in event.specification.skog_og_toemmerkonto() {
            for fund in &account.skogfond {
                let origin = ForestryOrigin::Fund {
                    account_id: account.id.clone(),
                    fund_id: fund.id.clone(),
                    municipality: fund.kommunenummer.clone(),
                };
                push_amounts(&mut fields, &provenance, &origin, fund.amounts());
            }
        }
    }
    sort_fields(&mut fields);
    fields
}

fn push_amounts(
    fields: &mut Vec<ForestryField>,
    provenance: &Provenance,
    origin: &ForestryOrigin,
    amounts: Vec<(&str, Decimal)>,
) {
    fields.extend(
        amounts
            .into_iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(field_name, amount)| ForestryField {
                entity_id: provenance.entity_id.clone(),
                fiscal_year: provenance.fiscal_year,
                origin: origin.clone(),
                field_name: field_name.to_string(),
                amount,
                registration_timestamp: provenance.registration_timestamp,
                sequence_number: provenance.sequence_number,
            }),
    );
}

fn sort_fields(fields: &mut [ForestryField]) {
    fields.sort_by(|a, b| {
        (&a.entity_id, a.fiscal_year, &a.origin, &a.field_name).cmp(&(
            &b.entity_id,
            b.fiscal_year,
            &b.origin,
            &b.field_name,
        ))
    });
}
