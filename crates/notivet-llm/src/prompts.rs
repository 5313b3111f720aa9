//! Grounding prompts for the drug assistant.

use notivet_core::models::DrugDigest;

/// System prompt for grounded drug answers.
pub const SYSTEM_PROMPT: &str = r#"You are NotiVet, a veterinary drug assistant for licensed HCPs.
Use the provided drug database excerpts to answer the user's question.
- Be concise and clinically helpful.
- Prefer authoritative info from the provided sources.
- If unavailable in sources, clearly say you are uncertain.
- Include species-appropriateness and safety when relevant.
- Do not fabricate data or dosing that isn't in the sources."#;

/// Stands in for the excerpts when nothing matched.
pub const NO_MATCHES_TEXT: &str = "(No directly matching entries found; answer based on general guidance and recommend checking database.)";

const SOURCE_SEPARATOR: &str = "\n---\n";

/// Render digests as numbered source blocks.
pub fn format_sources(digests: &[DrugDigest]) -> String {
    digests
        .iter()
        .enumerate()
        .map(|(i, d)| format_source(i + 1, d))
        .collect::<Vec<_>>()
        .join(SOURCE_SEPARATOR)
}

fn format_source(number: usize, d: &DrugDigest) -> String {
    let mut block = format!("Source {} - {}", number, d.name);
    if let Some(generic) = &d.generic_name {
        block.push_str(&format!(" (Generic: {})", generic));
    }
    if let Some(trade) = &d.trade_name {
        block.push_str(&format!(" | Trade: {}", trade));
    }
    if let Some(code) = &d.product_code {
        block.push_str(&format!(" | Code: {}", code));
    }
    block.push('\n');

    let species: Vec<&str> = d.species.iter().map(|s| s.code()).collect();
    block.push_str(&format!("Manufacturer: {}\n", d.manufacturer));
    block.push_str(&format!("Active Ingredient: {}\n", d.active_ingredient));
    block.push_str(&format!("Species: {}\n", species.join(", ")));
    block.push_str(&format!("Delivery: {}\n", d.delivery_methods.join(", ")));

    let optional = [
        ("Dosage", &d.dosage),
        ("Withdrawal", &d.withdrawal_time),
        ("Contraindications", &d.contraindications),
        ("Warnings", &d.warnings),
        ("Notes", &d.description),
    ];
    for (label, value) in optional {
        if !value.is_empty() {
            block.push_str(&format!("{}: {}\n", label, value));
        }
    }
    block
}

/// User message: the question followed by the excerpts (or the fallback).
pub fn make_user_prompt(query: &str, digests: &[DrugDigest]) -> String {
    let sources = format_sources(digests);
    let excerpts = if sources.is_empty() {
        NO_MATCHES_TEXT
    } else {
        sources.as_str()
    };
    format!("User question:\n{}\n\nDrug database excerpts:\n{}", query, excerpts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notivet_core::models::{DigestBudgets, Drug, Species};

    fn digest(name: &str) -> DrugDigest {
        let mut drug = Drug::new(name.into(), "Carprofen".into(), "Zoetis".into());
        drug.set_species(&[Species::Canine, Species::Feline]);
        drug.set_delivery_methods(&["ORAL"]);
        drug.dosage = Some("2 mg/lb once daily".into());
        drug.description = Some("NSAID".into());
        DrugDigest::from_drug(&drug, &DigestBudgets::default())
    }

    #[test]
    fn test_source_block_layout() {
        let mut d = digest("Rimadyl");
        d.generic_name = Some("carprofen".into());
        d.trade_name = Some("Rimadyl Caplets".into());

        let text = format_sources(&[d]);
        assert_eq!(
            text,
            "Source 1 - Rimadyl (Generic: carprofen) | Trade: Rimadyl Caplets\n\
             Manufacturer: Zoetis\n\
             Active Ingredient: Carprofen\n\
             Species: CANINE, FELINE\n\
             Delivery: ORAL\n\
             Dosage: 2 mg/lb once daily\n\
             Notes: NSAID\n"
        );
    }

    #[test]
    fn test_sources_are_numbered_and_separated() {
        let text = format_sources(&[digest("A"), digest("B")]);
        assert!(text.starts_with("Source 1 - A\n"));
        assert!(text.contains("\n---\nSource 2 - B\n"));
    }

    #[test]
    fn test_user_prompt_with_sources() {
        let prompt = make_user_prompt("rimadyl for dogs", &[digest("Rimadyl")]);
        assert!(prompt.starts_with("User question:\nrimadyl for dogs\n\nDrug database excerpts:\n"));
        assert!(prompt.contains("Source 1 - Rimadyl"));
        assert!(!prompt.contains(NO_MATCHES_TEXT));
    }

    #[test]
    fn test_user_prompt_without_sources() {
        let prompt = make_user_prompt("xyznonexistentdrug123", &[]);
        assert!(prompt.ends_with(NO_MATCHES_TEXT));
    }

    #[test]
    fn test_system_prompt() {
        assert!(SYSTEM_PROMPT.starts_with("You are NotiVet"));
        assert!(SYSTEM_PROMPT.contains("Do not fabricate"));
    }
}
