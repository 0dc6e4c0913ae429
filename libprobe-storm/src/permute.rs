use std::collections::BTreeSet;

pub const DEFAULT_MUTATION_VOCABULARY: &[&str] = &[
    "dev", "stage", "prod", "test", "uat", "qa", "web", "api", "db", "devops", "admin",
];

pub fn default_vocabulary() -> Vec<String> {
    DEFAULT_MUTATION_VOCABULARY.iter().map(|w| w.to_string()).collect()
}

/// Derives second-order subdomain candidates from confirmed hits.
///
/// For a hit `a.b.<base>` every vocabulary word `w` yields `w.b.<base>`
/// (skipping `w == a`) and `w-a.b.<base>`. Single-label hits only get the
/// hyphen prefix. Hits not under `base` are ignored, and neither the base
/// itself nor any input hit is returned.
pub fn expand<'a, I, V>(hits: I, base: &str, vocabulary: V) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
    V: IntoIterator<Item = &'a String> + Clone,
{
    let base = base.trim_matches('.').to_lowercase();
    let suffix = format!(".{}", base);
    let mut inputs = BTreeSet::new();
    let mut out = BTreeSet::new();

    for hit in hits {
        let hit = hit.trim_matches('.').to_lowercase();
        let Some(sub) = hit.strip_suffix(&suffix).filter(|s| !s.is_empty()) else {
            continue;
        };
        let labels: Vec<&str> = sub.split('.').collect();

        for word in vocabulary.clone() {
            let word = word.trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            if labels.len() > 1 && labels[0] != word {
                out.insert(format!("{}.{}{}", word, labels[1..].join("."), suffix));
            }
            out.insert(format!("{}-{}{}", word, sub, suffix));
        }
        inputs.insert(hit);
    }

    out.retain(|c| *c != base && !inputs.contains(c));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_label_gets_prefixes_only() {
        let hits = strings(&["www.example.test"]);
        let vocab = strings(&["dev", "qa"]);
        let out = expand(&hits, "example.test", &vocab);
        let expected: BTreeSet<String> =
            strings(&["dev-www.example.test", "qa-www.example.test"]).into_iter().collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn multi_label_substitutes_leftmost_label() {
        let hits = strings(&["dev.api.example.test"]);
        let vocab = strings(&["dev", "prod"]);
        let out = expand(&hits, "example.test", &vocab);

        assert!(out.contains("prod.api.example.test"));
        assert!(out.contains("dev-dev.api.example.test"));
        assert!(out.contains("prod-dev.api.example.test"));
        // "dev" is already the leftmost label
        assert!(!out.contains("dev.api.example.test"));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn never_emits_base_or_inputs() {
        let hits = strings(&["example.test", "stage.api.example.test", "dev.api.example.test"]);
        let vocab = strings(&["dev", "stage"]);
        let out = expand(&hits, "example.test", &vocab);

        assert!(!out.contains("example.test"));
        assert!(!out.contains("dev.api.example.test"));
        assert!(!out.contains("stage.api.example.test"));
        assert!(out.contains("dev-stage.api.example.test"));
    }

    #[test]
    fn vocabulary_case_does_not_reintroduce_hits() {
        let hits = strings(&["www.api.example.test"]);
        let vocab = strings(&["WWW", " Dev "]);
        let out = expand(&hits, "example.test", &vocab);

        assert!(!out.contains("www.api.example.test"));
        assert!(!out.iter().any(|c| c.chars().any(|ch| ch.is_ascii_uppercase())));
        let expected: BTreeSet<String> = strings(&[
            "dev.api.example.test",
            "dev-www.api.example.test",
            "www-www.api.example.test",
        ])
        .into_iter()
        .collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn ignores_hits_outside_base() {
        let hits = strings(&["www.other.test"]);
        let out = expand(&hits, "example.test", &default_vocabulary());
        assert!(out.is_empty());
    }

    #[test]
    fn empty_hits_expand_to_nothing() {
        let hits: Vec<String> = Vec::new();
        assert!(expand(&hits, "example.test", &default_vocabulary()).is_empty());
    }

    #[test]
    fn expansion_is_deterministic() {
        let hits = strings(&["www.example.test", "mail.eu.example.test"]);
        let vocab = default_vocabulary();
        let first = expand(&hits, "example.test", &vocab);
        let second = expand(&hits, "example.test", &vocab);
        assert_eq!(first, second);

        // 11 prefixes per hit, plus 11 substitutions for the two-label hit
        assert_eq!(first.len(), 33);
    }
}
