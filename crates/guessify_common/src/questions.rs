//! Question wording for attribute keys.

use std::collections::HashMap;

/// Built-in wording for the attributes of the bundled celebrity catalog
const BUILTIN_QUESTIONS: &[(&str, &str)] = &[
    ("male", "Is the person male?"),
    ("still_alive", "Is the person still alive?"),
    ("born_in_america", "Was the person born in America?"),
    ("actor", "Is the person an actor?"),
    ("musician", "Is the person a musician?"),
    ("athlete", "Is the person an athlete?"),
    ("entrepreneur", "Is the person an entrepreneur?"),
    ("politician", "Is the person a politician?"),
    ("scientist", "Is the person a scientist?"),
    ("has_oscar", "Does the person have an Oscar?"),
    ("has_grammy", "Does the person have a Grammy?"),
    ("has_tattoos", "Does the person have tattoos?"),
    ("has_children", "Does the person have children?"),
    ("has_major_awards", "Does the person have major awards?"),
    ("blue_eyes", "Does the person have blue eyes?"),
    ("long_hair", "Does the person have long hair?"),
    ("wears_glasses", "Does the person wear glasses?"),
    ("tall", "Is the person tall?"),
    ("bald", "Is the person bald?"),
    ("left_handed", "Is the person left-handed?"),
    ("married", "Is the person married?"),
    ("social_media_active", "Is the person active on social media?"),
    ("considered_a_legend", "Is the person considered a legend?"),
    ("a_rising_star", "Is the person a rising star?"),
    ("famous", "Is the person famous?"),
    ("a_billionaire", "Is the person a billionaire?"),
    ("a_business_owner", "Is the person a business owner?"),
    ("multiple_championships", "Does the person have multiple championships?"),
    ("started_acting_child", "Did the person start acting as a child?"),
    ("a_director", "Is the person a director?"),
    ("a_producer", "Is the person a producer?"),
    ("theater_background", "Does the person have a theater background?"),
    ("primarily_a_rapper", "Is the person primarily a rapper?"),
    ("primarily_a_pop_musician", "Is the person primarily a pop musician?"),
    ("a_multi_instrumentalist", "Is the person a multi-instrumentalist?"),
    ("a_songwriter", "Is the person a songwriter?"),
    ("also_a_dancer", "Is the person also a dancer?"),
    ("owns_company", "Does the person own a company?"),
    ("a_mentor_figure", "Is the person a mentor figure?"),
    ("funny", "Is the person funny?"),
    ("controversial", "Is the person controversial?"),
    ("fashion_icon", "Is the person a fashion icon?"),
    ("educated", "Is the person educated?"),
    ("perfectionist", "Is the person a perfectionist?"),
    ("quirky", "Is the person quirky?"),
    ("vegan", "Is the person vegan?"),
    ("an_activist", "Is the person an activist?"),
    ("humanitarian_work", "Does the person do humanitarian work?"),
    ("an_environmental_activist", "Is the person an environmental activist?"),
    ("a_political_activist", "Is the person a political activist?"),
    ("loves_dogs", "Does the person love dogs?"),
    ("a_gamer", "Is the person a gamer?"),
    ("plays_poker", "Does the person play poker?"),
    ("a_motorcycle_enthusiast", "Is the person a motorcycle enthusiast?"),
    ("comeback_story", "Does the person have a comeback story?"),
    ("troubled_past", "Does the person have a troubled past?"),
    ("multilingual", "Is the person multilingual?"),
    ("speaks_french", "Does the person speak French?"),
    ("speaks_spanish", "Does the person speak Spanish?"),
    ("british_irish", "Is the person British or Irish?"),
    ("canadian", "Is the person Canadian?"),
    ("australian", "Is the person Australian?"),
];

/// Generated wording for keys without an explicit entry
pub fn fallback_question(key: &str) -> String {
    format!("Is the person {}?", key.replace('_', " ").to_lowercase())
}

/// Lookup key: attribute keys match regardless of case
fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Key to question mapping with optional overrides from config
#[derive(Debug, Clone)]
pub struct QuestionBook {
    entries: HashMap<String, String>,
}

impl Default for QuestionBook {
    fn default() -> Self {
        Self {
            entries: BUILTIN_QUESTIONS
                .iter()
                .map(|(k, q)| (normalize_key(k), q.to_string()))
                .collect(),
        }
    }
}

impl QuestionBook {
    /// Built-in wording with `overrides` taking precedence
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut book = Self::default();
        for (key, question) in overrides {
            book.entries.insert(normalize_key(key), question.clone());
        }
        book
    }

    pub fn question(&self, key: &str) -> String {
        self.entries
            .get(&normalize_key(key))
            .cloned()
            .unwrap_or_else(|| fallback_question(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_question() {
        let book = QuestionBook::default();
        assert_eq!(book.question("has_oscar"), "Does the person have an Oscar?");
        assert_eq!(book.question("left_handed"), "Is the person left-handed?");
    }

    #[test]
    fn test_lookup_ignores_case() {
        let book = QuestionBook::default();
        assert_eq!(book.question("Has_Oscar"), "Does the person have an Oscar?");
        assert_eq!(book.question("BLUE_EYES"), "Does the person have blue eyes?");
    }

    #[test]
    fn test_fallback_question() {
        let book = QuestionBook::default();
        assert_eq!(book.question("Plays_Chess"), "Is the person plays chess?");
        assert_eq!(fallback_question("a_chef"), "Is the person a chef?");
    }

    #[test]
    fn test_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert("actor".to_string(), "Do they act?".to_string());
        overrides.insert("A_Chef".to_string(), "Do they cook professionally?".to_string());
        let book = QuestionBook::with_overrides(&overrides);
        assert_eq!(book.question("Actor"), "Do they act?");
        assert_eq!(book.question("a_chef"), "Do they cook professionally?");
        assert_eq!(book.question("musician"), "Is the person a musician?");
    }
}
