//! Journal entry balancing and import grouping tests.

use chrono::NaiveDate;
use minibooks_core::error::AppError;
use minibooks_ledger::models::{Direction, JournalLineInput};
use minibooks_ledger::services::{
    build_journal_set, group_imported_lines, validate_journal_lines,
};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}

fn date(s: &str) -> NaiveDate {
    s.parse().expect("ISO date literal")
}

fn line(description: &str, gl: &str, debit: &str, credit: &str) -> JournalLineInput {
    JournalLineInput {
        description: description.to_string(),
        gl_account: gl.to_string(),
        debit: if debit.is_empty() { None } else { Some(dec(debit)) },
        credit: if credit.is_empty() { None } else { Some(dec(credit)) },
        ..Default::default()
    }
}

#[test]
fn balanced_entry_with_split_credits_passes() {
    let lines = vec![
        line("transfer", "Business Checking", "100", ""),
        line("transfer", "Sales Revenue", "", "60"),
        line("transfer", "Interest Income", "", "40"),
    ];
    assert!(validate_journal_lines(&lines).is_ok());
}

#[test]
fn imbalanced_entry_reports_the_difference() {
    let lines = vec![
        line("oops", "Business Checking", "100", ""),
        line("oops", "Sales Revenue", "", "50"),
    ];
    let errors = validate_journal_lines(&lines).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("differ by 50"), "got: {}", errors[0]);
}

#[test]
fn single_line_entry_is_rejected() {
    let lines = vec![line("lonely", "Business Checking", "100", "")];
    let errors = validate_journal_lines(&lines).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| e.contains("at least two lines")), "got: {errors:?}");
}

#[test]
fn every_problem_is_collected_not_just_the_first() {
    let lines = vec![
        // missing description
        line("", "Business Checking", "100", ""),
        // both sides set
        line("both", "Sales Revenue", "10", "10"),
        // neither side set
        line("neither", "Rent Expense", "", ""),
    ];
    let errors = validate_journal_lines(&lines).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("line 1")));
    assert!(errors
        .iter()
        .any(|e| e.contains("line 2") && e.contains("only one of debit or credit")));
    assert!(errors
        .iter()
        .any(|e| e.contains("line 3") && e.contains("greater than zero")));
    // plus the imbalance from the lone 100 debit
    assert!(errors.iter().any(|e| e.contains("differ by 100")));
}

#[test]
fn negative_amounts_do_not_count_as_a_side() {
    let lines = vec![
        line("neg", "Business Checking", "-100", ""),
        line("neg", "Sales Revenue", "", "100"),
    ];
    let errors = validate_journal_lines(&lines).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| e.contains("line 1") && e.contains("greater than zero")));
}

#[test]
fn rows_group_by_explicit_set_id_preserving_order() {
    let mut a1 = line("a", "Business Checking", "10", "");
    a1.journal_set_id = Some("set-a".to_string());
    let mut b1 = line("b", "Sales Revenue", "", "10");
    b1.journal_set_id = Some("set-b".to_string());
    let mut a2 = line("a", "Sales Revenue", "", "10");
    a2.journal_set_id = Some("set-a".to_string());

    let groups = group_imported_lines(vec![a1, b1, a2]);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0, "set-a");
    assert_eq!(groups[0].1.len(), 2);
    assert_eq!(groups[1].0, "set-b");
    assert_eq!(groups[1].1.len(), 1);
}

#[test]
fn rows_without_set_ids_form_one_batch_group() {
    let rows = vec![
        line("x", "Business Checking", "10", ""),
        line("x", "Sales Revenue", "", "10"),
    ];
    let groups = group_imported_lines(rows);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].0, "batch");
    assert_eq!(groups[0].1.len(), 2);
}

#[test]
fn build_converts_sides_and_applies_fallback_date() {
    let mut dated = line("wire", "Business Checking", "250", "");
    dated.date = Some(date("2024-06-02"));
    let undated = line("wire", "Sales Revenue", "", "250");

    let set = build_journal_set("je-7", date("2024-06-01"), &[dated, undated])
        .expect("Failed to build journal set");

    assert_eq!(set.set_id, "je-7");
    assert!(!set.is_ledger_approved);
    assert_eq!(set.lines.len(), 2);
    assert_eq!(set.lines[0].direction, Direction::Debit);
    assert_eq!(set.lines[0].amount, dec("250"));
    assert_eq!(set.lines[0].date, date("2024-06-02"));
    assert_eq!(set.lines[1].direction, Direction::Credit);
    assert_eq!(set.lines[1].date, date("2024-06-01"));
}

#[test]
fn build_surfaces_validation_errors() {
    let lines = vec![
        line("bad", "Business Checking", "100", ""),
        line("bad", "Sales Revenue", "", "70"),
    ];
    let err = build_journal_set("je-8", date("2024-06-01"), &lines).unwrap_err();
    match err {
        AppError::Validation { errors } => {
            assert!(errors.iter().any(|e| e.contains("differ by 30")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}
