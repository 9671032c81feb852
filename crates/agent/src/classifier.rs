use medstock_core::domain::intent::Intent;

/// Maps raw utterance text to one intent label. Must not fail: text it cannot
/// place is reported as [`Intent::Unknown`].
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Intent;
}

/// Cue-phrase classifier standing in for a trained sequence classifier.
///
/// Each cue is matched as a word prefix against the normalized utterance, so
/// `expir` covers "expire", "expiring" and "expiry". The intent with the most
/// matching cues wins; ties go to the intent listed first in `CUES`.
#[derive(Clone, Debug, Default)]
pub struct KeywordIntentClassifier;

const CUES: &[(Intent, &[&str])] = &[
    (Intent::SetAlert, &["alert", "notify", "notification", "remind", "warn me"]),
    (Intent::UpdateStock, &["update", "count for", "adjust", "change the stock", "set the stock"]),
    (Intent::CheckExpiry, &["expir", "use by", "out of date"]),
    (
        Intent::ReorderCheck,
        &["reorder", "re order", "running low", "low on", "below threshold", "need to order"],
    ),
    (
        Intent::CheckStock,
        &["how many", "how much", "in stock", "stock for", "stock levels", "do we have", "left"],
    ),
];

impl KeywordIntentClassifier {
    pub fn new() -> Self {
        Self
    }

    fn score(normalized: &str, cues: &[&str]) -> usize {
        cues.iter().filter(|cue| normalized.contains(&format!(" {cue}"))).count()
    }
}

impl IntentClassifier for KeywordIntentClassifier {
    fn classify(&self, text: &str) -> Intent {
        let normalized = format!(" {} ", normalize_text(text));

        let mut best = (Intent::Unknown, 0usize);
        for (intent, cues) in CUES {
            let score = Self::score(&normalized, cues);
            if score > best.1 {
                best = (*intent, score);
            }
        }
        best.0
    }
}

fn normalize_text(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    for character in text.chars() {
        if character.is_alphanumeric() {
            sanitized.extend(character.to_lowercase());
        } else {
            sanitized.push(' ');
        }
    }
    sanitized.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use medstock_core::domain::intent::Intent;

    use super::{IntentClassifier, KeywordIntentClassifier};

    #[test]
    fn classifies_common_inventory_requests() {
        let classifier = KeywordIntentClassifier::new();
        let cases = [
            ("How many gloves do we have?", Intent::CheckStock),
            ("Can you check the stock for scalpels?", Intent::CheckStock),
            ("How much hand sanitizer do we have left?", Intent::CheckStock),
            ("Set an alert when we have less than 20 masks.", Intent::SetAlert),
            ("Notify me about bandages stock if it goes under 15.", Intent::SetAlert),
            ("Set a reminder to reorder IV fluids before 2025-01-01.", Intent::SetAlert),
            ("What items are expiring next month?", Intent::CheckExpiry),
            ("Check the expiration dates for thermometers.", Intent::CheckExpiry),
            ("Update the stock of syringes to 150.", Intent::UpdateStock),
            ("Could you update the count for face masks?", Intent::UpdateStock),
            ("Do we need to reorder anything?", Intent::ReorderCheck),
            ("Are we running low on cotton rolls?", Intent::ReorderCheck),
        ];

        for (text, expected) in cases {
            assert_eq!(classifier.classify(text), expected, "utterance: {text}");
        }
    }

    #[test]
    fn text_without_cues_is_unknown() {
        let classifier = KeywordIntentClassifier::new();
        assert_eq!(classifier.classify("What's the weather like?"), Intent::Unknown);
        assert_eq!(classifier.classify(""), Intent::Unknown);
        assert_eq!(classifier.classify("?!"), Intent::Unknown);
    }

    #[test]
    fn cues_match_word_prefixes_only() {
        let classifier = KeywordIntentClassifier::new();
        // "leftover" starts with "left" but "cleft" does not.
        assert_eq!(classifier.classify("cleft"), Intent::Unknown);
        assert_eq!(classifier.classify("leftover gauze"), Intent::CheckStock);
    }

    #[test]
    fn expiry_word_forms_weigh_the_same() {
        let classifier = KeywordIntentClassifier::new();
        // One expiry cue against one cue of an earlier intent: the tie goes to
        // the earlier intent whichever form of "expire" is used.
        for text in ["Alert me before the gauze expires", "Alert me when the gauze will expire"] {
            assert_eq!(classifier.classify(text), Intent::SetAlert, "utterance: {text}");
        }
        assert_eq!(
            classifier.classify("Update the stock of gloves that expire"),
            Intent::UpdateStock
        );
        assert_eq!(classifier.classify("Which batches expire soon?"), Intent::CheckExpiry);
    }
}
