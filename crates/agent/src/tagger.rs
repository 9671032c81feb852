use chrono::NaiveDate;
use medstock_core::domain::entity::TaggedToken;

pub const ITEM_TAG: &str = "ITEM";
pub const QUANTITY_TAG: &str = "QUANTITY";
pub const DATE_TAG: &str = "DATE";

/// Splits utterance text into whitespace-delimited tokens and labels each one.
pub trait EntityTagger: Send + Sync {
    fn tag(&self, text: &str) -> Vec<TaggedToken>;
}

/// Medical supplies the tagger recognizes out of the box.
pub const DEFAULT_ITEMS: &[&str] = &[
    "surgical gloves",
    "gloves",
    "IV fluids",
    "painkillers",
    "antiseptics",
    "cotton rolls",
    "scalpels",
    "antibiotic ointment",
    "thermometers",
    "stethoscopes",
    "face masks",
    "masks",
    "bandages",
    "disinfectant sprays",
    "hand sanitizer",
    "syringes",
    "needles",
    "gauze",
];

const RELATIVE_DATES: &[&[&str]] = &[
    &["next", "month"],
    &["next", "week"],
    &["this", "month"],
    &["this", "week"],
    &["end", "of", "month"],
    &["today"],
    &["tomorrow"],
];

/// Gazetteer tagger standing in for a trained token classifier.
///
/// Item phrases are matched longest-first against a case-insensitive lexicon;
/// bare integers are quantities; ISO dates and a few relative phrases are
/// dates. Surrounding punctuation is stripped from emitted tokens.
#[derive(Clone, Debug)]
pub struct LexiconEntityTagger {
    items: Vec<Vec<String>>,
}

impl Default for LexiconEntityTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconEntityTagger {
    pub fn new() -> Self {
        Self::with_items(DEFAULT_ITEMS.iter().copied())
    }

    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tagger = Self { items: Vec::new() };
        tagger.extend_items(items);
        tagger
    }

    /// Adds items to the lexicon, skipping blanks and duplicates.
    pub fn extend_items<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for item in items {
            let words = item
                .as_ref()
                .split_whitespace()
                .map(str::to_lowercase)
                .collect::<Vec<_>>();
            if !words.is_empty() && !self.items.contains(&words) {
                self.items.push(words);
            }
        }
        self.items.sort_by(|left, right| right.len().cmp(&left.len()));
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    fn match_len(&self, lowered: &[String], start: usize) -> Option<(usize, &'static str)> {
        let rest = &lowered[start..];

        let item = self
            .items
            .iter()
            .find(|phrase| rest.len() >= phrase.len() && rest[..phrase.len()] == phrase[..]);
        if let Some(phrase) = item {
            return Some((phrase.len(), ITEM_TAG));
        }

        let first = rest.first()?;
        if is_quantity(first) {
            return Some((1, QUANTITY_TAG));
        }
        if is_iso_date(first) {
            return Some((1, DATE_TAG));
        }

        RELATIVE_DATES
            .iter()
            .find(|phrase| {
                rest.len() >= phrase.len()
                    && rest.iter().zip(phrase.iter()).all(|(word, cue)| word == cue)
            })
            .map(|phrase| (phrase.len(), DATE_TAG))
    }
}

impl EntityTagger for LexiconEntityTagger {
    fn tag(&self, text: &str) -> Vec<TaggedToken> {
        let tokens = text
            .split_whitespace()
            .map(trim_punctuation)
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>();
        let lowered = tokens.iter().map(|token| token.to_lowercase()).collect::<Vec<_>>();

        let mut tagged = Vec::with_capacity(tokens.len());
        let mut index = 0;
        while index < tokens.len() {
            match self.match_len(&lowered, index) {
                Some((len, tag)) => {
                    for token in &tokens[index..index + len] {
                        tagged.push(TaggedToken::tagged(*token, tag));
                    }
                    index += len;
                }
                None => {
                    tagged.push(TaggedToken::outside(tokens[index]));
                    index += 1;
                }
            }
        }
        tagged
    }
}

fn trim_punctuation(token: &str) -> &str {
    token.trim_matches(|character: char| !character.is_alphanumeric())
}

fn is_quantity(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|character| character.is_ascii_digit())
}

fn is_iso_date(token: &str) -> bool {
    NaiveDate::parse_from_str(token, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use medstock_core::domain::entity::{RawLabel, TaggedToken};

    use super::{EntityTagger, LexiconEntityTagger};

    fn labels(tokens: &[TaggedToken]) -> Vec<(&str, Option<&str>)> {
        tokens
            .iter()
            .map(|tagged| {
                let label = match &tagged.label {
                    RawLabel::Outside => None,
                    RawLabel::Tag(tag) => Some(tag.as_str()),
                };
                (tagged.token.as_str(), label)
            })
            .collect()
    }

    #[test]
    fn tags_multi_word_items_and_quantities() {
        let tagger = LexiconEntityTagger::new();
        let tokens = tagger.tag("Set alert for surgical gloves stock below 20.");

        assert_eq!(
            labels(&tokens),
            vec![
                ("Set", None),
                ("alert", None),
                ("for", None),
                ("surgical", Some("ITEM")),
                ("gloves", Some("ITEM")),
                ("stock", None),
                ("below", None),
                ("20", Some("QUANTITY")),
            ]
        );
    }

    #[test]
    fn longest_item_phrase_wins() {
        let tagger = LexiconEntityTagger::new();
        let tokens = tagger.tag("how many face masks");
        assert_eq!(tokens[2], TaggedToken::tagged("face", "ITEM"));
        assert_eq!(tokens[3], TaggedToken::tagged("masks", "ITEM"));
    }

    #[test]
    fn tags_iso_and_relative_dates() {
        let tagger = LexiconEntityTagger::new();

        let iso = tagger.tag("What items expire by 2025-03-31?");
        assert_eq!(iso.last(), Some(&TaggedToken::tagged("2025-03-31", "DATE")));

        let relative = tagger.tag("What items are expiring next month?");
        assert_eq!(
            labels(&relative)[3..],
            [("expiring", None), ("next", Some("DATE")), ("month", Some("DATE"))]
        );
    }

    #[test]
    fn invalid_calendar_dates_are_not_dates() {
        let tagger = LexiconEntityTagger::new();
        let tokens = tagger.tag("expiring 2025-02-30");
        assert_eq!(tokens[1].label, RawLabel::Outside);
    }

    #[test]
    fn extra_items_extend_lexicon_case_insensitively() {
        let mut tagger = LexiconEntityTagger::new();
        let before = tagger.item_count();
        tagger.extend_items(["Nitrile Gloves", "gauze", "  "]);
        assert_eq!(tagger.item_count(), before + 1);

        let tokens = tagger.tag("check NITRILE gloves");
        assert_eq!(tokens[1], TaggedToken::tagged("NITRILE", "ITEM"));
        assert_eq!(tokens[2], TaggedToken::tagged("gloves", "ITEM"));
    }

    #[test]
    fn punctuation_only_tokens_are_dropped() {
        let tagger = LexiconEntityTagger::new();
        assert!(tagger.tag(" ?! ... ").is_empty());
    }
}
