//! Prompt assembly tests over real matcher output.

use notivet_core::db::Database;
use notivet_core::matcher::DrugMatcher;
use notivet_core::models::{DigestBudgets, Drug, DrugDigest, Species};
use notivet_llm::{format_sources, make_user_prompt, NO_MATCHES_TEXT};
use proptest::prelude::*;

fn catalog() -> Database {
    let db = Database::open_in_memory().unwrap();

    let mut excede = Drug::new("Excede".into(), "Ceftiofur".into(), "Zoetis".into());
    excede.trade_name = Some("Excede for Cattle".into());
    excede.product_code = Some("EX-200".into());
    excede.withdrawal_time = Some("13 days slaughter".into());
    excede.warnings = Some("w".repeat(500));
    excede.set_species(&[Species::Bovine]);
    excede.set_delivery_methods(&["INJECTABLE"]);
    db.upsert_drug(&excede).unwrap();

    db
}

#[test]
fn test_matched_drug_becomes_source_block() {
    let db = catalog();
    let report = DrugMatcher::new(&db).search("excede cattle").unwrap();
    let prompt = make_user_prompt("excede cattle", &report.drugs);

    assert!(prompt.contains("Source 1 - Excede | Trade: Excede for Cattle | Code: EX-200\n"));
    assert!(prompt.contains("Species: BOVINE\n"));
    assert!(prompt.contains("Delivery: INJECTABLE\n"));
    assert!(prompt.contains("Withdrawal: 13 days slaughter\n"));
    // warnings are capped at 300 characters plus the ellipsis
    assert!(prompt.contains(&format!("Warnings: {}…\n", "w".repeat(300))));
    assert!(!prompt.contains(NO_MATCHES_TEXT));
}

#[test]
fn test_excluded_species_falls_back() {
    let db = catalog();
    let report = DrugMatcher::new(&db).search("excede for dogs").unwrap();
    assert!(report.drugs.is_empty());

    let prompt = make_user_prompt("excede for dogs", &report.drugs);
    assert!(prompt.ends_with(NO_MATCHES_TEXT));
}

fn digest(name: &str) -> DrugDigest {
    let drug = Drug::new(name.into(), "ingredient".into(), "Acme".into());
    DrugDigest::from_drug(&drug, &DigestBudgets::default())
}

proptest! {
    #[test]
    fn one_block_per_digest(count in 1usize..8) {
        let digests: Vec<DrugDigest> = (0..count).map(|i| digest(&format!("Drug{i}"))).collect();
        let text = format_sources(&digests);

        prop_assert_eq!(text.matches("\n---\n").count(), count - 1);
        let expected_last = format!("Source {} - Drug{}", count, count - 1);
        prop_assert!(text.contains(&expected_last));
    }

    #[test]
    fn question_leads_the_prompt(query in "[a-zA-Z0-9 ?]{1,40}") {
        let prompt = make_user_prompt(&query, &[]);
        let expected_prefix = format!("User question:\n{}\n\nDrug database excerpts:\n", query);
        prop_assert!(prompt.starts_with(&expected_prefix));
    }
}
