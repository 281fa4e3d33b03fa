//! Prompt construction for batch translation.

use timeline_shared::{TimelineRecord, TranslationConfig};

/// System prompt: who the translator is and the output contract.
pub fn system_prompt(config: &TranslationConfig) -> String {
    let source = &config.source_language;
    let target = &config.target_language;

    let mut prompt = format!(
        "You are a professional translator specialising in {source}-to-{target} \
         translation of political, legal, and journalistic content."
    );
    if let Some(context) = config.context.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push(' ');
        prompt.push_str(context.trim());
    }

    prompt.push_str(
        "\n\nKey translation guidelines:\n\
         - Preserve all proper names in their commonly used transliteration\n\
         - Keep dates in their original DD/MM/YYYY format\n\
         - Keep URLs unchanged\n\
         - Keep the Sort Number unchanged\n\
         - Maintain the same CSV structure: Date,Event,Link,Sort Number\n\
         - Translate idioms and legal terms accurately\n",
    );

    if !config.glossary.is_empty() {
        prompt.push_str("\nGlossary (use these renderings):\n");
        for term in &config.glossary {
            prompt.push_str("  - ");
            prompt.push_str(term.trim());
            prompt.push('\n');
        }
    }

    prompt.push_str(
        "\nReturn ONLY the translated CSV rows, one per line, \
         with no headers and no additional text.",
    );
    prompt
}

/// User prompt listing one batch of records as indexed blocks.
pub fn batch_prompt(config: &TranslationConfig, batch: &[TimelineRecord]) -> String {
    let items: Vec<String> = batch
        .iter()
        .enumerate()
        .map(|(i, record)| {
            format!(
                "[{i}] Date: {}\nEvent: {}\nLink: {}\nSort: {}",
                record.date,
                record.description,
                record.reference_url.as_deref().unwrap_or(""),
                record.sort_key.as_deref().unwrap_or(""),
            )
        })
        .collect();

    format!(
        "Translate the following {count} {source} timeline events to {target}.\n\
         Return them as CSV rows (Date,Event,Link,Sort Number) - one per event, in the same order.\n\
         Keep dates, URLs, and sort numbers unchanged. Only translate the Event text.\n\
         Wrap event text in double quotes if it contains commas.\n\
         \n\
         {items}",
        count = batch.len(),
        source = config.source_language,
        target = config.target_language,
        items = items.join("\n"),
    )
}
