//! Common-name moderation filter
//!
//! Case-insensitive substring match against a fixed denylist. The list is
//! static configuration: injectable from the TOML config for localization,
//! never editable at runtime.

/// Compiled-in denylist (Portuguese), matching the capture UI's list
const DEFAULT_DENYLIST: &[&str] = &[
    "vai tomar no cu",
    "merda",
    "caralho",
    "puta",
    "foda-se",
    "arrombado",
    "desgraçado",
    "filho da puta",
    "cacete",
    "porra",
    "bosta",
    "vagabundo",
    "buceta",
    "piranha",
    "mermão",
    "cu",
    "cuzão",
    "safado",
    "vagabunda",
    "pau no cu",
    "idiota",
    "imbecil",
    "estúpido",
    "burro",
    "otário",
    "cabeça de bagre",
    "pinto",
    "fuleiragem",
    "cagaço",
    "xoxota",
    "filha da puta",
    "boceta",
    "poceta",
    "fdp",
    "pp",
    "pv",
    "bdo",
    "vag",
    "cuz",
    "pvc",
    "nss",
    "saf",
    "merd",
    "xxta",
    "bct",
    "cusao",
    "piri",
    "foda",
    "bocet",
    "bag",
    "arrom",
    "cace",
    "cfc",
    "pqp",
];

/// Rejects disallowed vocabulary in user-entered common names
#[derive(Debug, Clone)]
pub struct ModerationFilter {
    /// Denylisted substrings, lowercased at construction
    denylist: Vec<String>,
}

impl Default for ModerationFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DENYLIST.iter().map(|w| w.to_string()))
    }
}

impl ModerationFilter {
    /// Build a filter from an injected denylist (e.g. from the TOML config)
    pub fn new(denylist: impl IntoIterator<Item = String>) -> Self {
        Self {
            denylist: denylist.into_iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// First denylisted substring found in `text`, if any
    pub fn find_violation(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.denylist
            .iter()
            .find(|word| lowered.contains(word.as_str()))
            .map(|word| word.as_str())
    }

    /// True when `text` contains no denylisted substring
    pub fn is_clean(&self, text: &str) -> bool {
        self.find_violation(text).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_name_passes() {
        let filter = ModerationFilter::default();
        assert!(filter.is_clean("planta linda"));
        assert!(filter.find_violation("Rosa vermelha do jardim").is_none());
    }

    #[test]
    fn denylisted_substring_rejects() {
        let filter = ModerationFilter::default();
        assert!(!filter.is_clean("essa planta é uma merda"));
        assert_eq!(filter.find_violation("que porra é essa"), Some("porra"));
    }

    #[test]
    fn match_is_case_insensitive() {
        let filter = ModerationFilter::default();
        assert!(!filter.is_clean("MERDA"));
        assert!(!filter.is_clean("MeRdA de planta"));
    }

    #[test]
    fn removing_offending_substring_flips_verdict() {
        let filter = ModerationFilter::default();
        assert!(!filter.is_clean("planta idiota bonita"));
        assert!(filter.is_clean("planta bonita"));
    }

    #[test]
    fn injected_denylist_replaces_default() {
        let filter = ModerationFilter::new(vec!["banido".to_string()]);
        assert!(!filter.is_clean("nome banido"));
        // Default entries are no longer active
        assert!(filter.is_clean("merda"));
    }
}
