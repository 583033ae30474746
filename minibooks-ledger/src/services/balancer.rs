//! Journal entry balancing and import grouping.

use crate::models::{Direction, JournalLine, JournalLineInput, JournalSet};
use minibooks_core::error::AppError;
use rust_decimal::Decimal;
use tracing::instrument;

/// Accumulation tolerance for the debit/credit difference. Imported data may
/// carry rounded values, so an exact-zero check is too strict.
const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

fn positive(amount: Option<Decimal>) -> Option<Decimal> {
    amount.filter(|a| *a > Decimal::ZERO)
}

/// Validate a multi-line journal entry set before posting. Collects every
/// applicable error rather than stopping at the first.
pub fn validate_journal_lines(lines: &[JournalLineInput]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if lines.len() < 2 {
        errors.push("entry must have at least two lines.".to_string());
    }

    let mut debits = Decimal::ZERO;
    let mut credits = Decimal::ZERO;

    for (idx, line) in lines.iter().enumerate() {
        let row = idx + 1;

        if line.description.trim().is_empty() || line.gl_account.trim().is_empty() {
            errors.push(format!("line {row}: description and GL account are required"));
        }

        match (positive(line.debit), positive(line.credit)) {
            (Some(debit), None) => debits += debit,
            (None, Some(credit)) => credits += credit,
            (Some(_), Some(_)) => {
                errors.push(format!("line {row}: only one of debit or credit may be set"));
            }
            (None, None) => {
                errors.push(format!(
                    "line {row}: a debit or credit amount greater than zero is required"
                ));
            }
        }
    }

    let difference = (debits - credits).abs();
    if difference > BALANCE_TOLERANCE {
        errors.push(format!(
            "debits ({debits}) and credits ({credits}) differ by {difference}"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Group imported rows by their explicit journal set id column. Rows without
/// one fall into a single shared batch group.
pub fn group_imported_lines(
    rows: Vec<JournalLineInput>,
) -> Vec<(String, Vec<JournalLineInput>)> {
    let mut groups: Vec<(String, Vec<JournalLineInput>)> = Vec::new();
    for row in rows {
        let key = row
            .journal_set_id
            .clone()
            .unwrap_or_else(|| "batch".to_string());
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, members)) => members.push(row),
            None => groups.push((key, vec![row])),
        }
    }
    groups
}

/// Validate raw lines and convert them into a postable journal set.
#[instrument(skip(lines), fields(set_id = %set_id, line_count = lines.len()))]
pub fn build_journal_set(
    set_id: impl std::fmt::Display,
    fallback_date: chrono::NaiveDate,
    lines: &[JournalLineInput],
) -> Result<JournalSet, AppError> {
    validate_journal_lines(lines).map_err(|errors| AppError::Validation { errors })?;

    let mut converted = Vec::with_capacity(lines.len());
    for line in lines {
        let (direction, amount) = match (positive(line.debit), positive(line.credit)) {
            (Some(debit), None) => (Direction::Debit, debit),
            (None, Some(credit)) => (Direction::Credit, credit),
            // rejected by validate_journal_lines above
            _ => continue,
        };
        converted.push(JournalLine {
            date: line.date.unwrap_or(fallback_date),
            description: line.description.clone(),
            gl_account: line.gl_account.clone(),
            counterparty: line.counterparty.clone(),
            direction,
            amount,
        });
    }

    Ok(JournalSet {
        set_id: set_id.to_string(),
        lines: converted,
        is_ledger_approved: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(description: &str, gl: &str, debit: Option<&str>, credit: Option<&str>) -> JournalLineInput {
        JournalLineInput {
            description: description.to_string(),
            gl_account: gl.to_string(),
            debit: debit.map(|d| d.parse().unwrap()),
            credit: credit.map(|c| c.parse().unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn balanced_three_line_entry_passes() {
        let lines = vec![
            line("transfer", "Checking", Some("100"), None),
            line("transfer", "Sales Revenue", None, Some("60")),
            line("transfer", "Interest Income", None, Some("40")),
        ];
        assert!(validate_journal_lines(&lines).is_ok());
    }

    #[test]
    fn imbalance_reports_the_difference() {
        let lines = vec![
            line("adjust", "Checking", Some("100"), None),
            line("adjust", "Sales Revenue", None, Some("50")),
        ];
        let errors = validate_journal_lines(&lines).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("differ by 50"), "got: {}", errors[0]);
    }

    #[test]
    fn tolerance_absorbs_rounding_noise() {
        let lines = vec![
            line("rounding", "Checking", Some("33.333"), None),
            line("rounding", "Sales Revenue", None, Some("33.3334")),
        ];
        assert!(validate_journal_lines(&lines).is_ok());
    }
}
