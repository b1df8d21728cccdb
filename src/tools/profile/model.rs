//! Profile records, normalization and merge

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::core::{Result, SwitchboardError};

const STUDY_ABBREVIATIONS: &[(&str, &str)] = &[
    ("CS", "Computer Science"),
    ("AI", "Artificial Intelligence"),
    ("IT", "Information Technology"),
];

/// Long-term facts about one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub studies: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    /// Normalized likes; a set so merging is order independent
    #[serde(default)]
    pub likes: BTreeSet<String>,
}

impl UserProfile {
    /// Fold `update` into this profile. Scalars are only replaced by non-empty
    /// values; likes become the union of both sides after normalization.
    pub fn merge(&mut self, update: &ProfileUpdate) {
        for (slot, value) in [
            (&mut self.name, &update.name),
            (&mut self.studies, &update.studies),
            (&mut self.age, &update.age),
            (&mut self.gender, &update.gender),
        ] {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                *slot = value.to_string();
            }
        }

        let existing = std::mem::take(&mut self.likes);
        self.likes = existing
            .iter()
            .chain(update.likes.iter())
            .filter_map(|like| normalize_like(like))
            .collect();
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.studies.is_empty()
            && self.age.is_empty()
            && self.gender.is_empty()
            && self.likes.is_empty()
    }

    /// One sentence stating the known facts, e.g. "User's name is Dennis and
    /// studies Business." `None` when nothing is known.
    pub fn summary(&self) -> Option<String> {
        let mut facts = Vec::new();
        if !self.studies.is_empty() {
            facts.push(format!("studies {}", self.studies));
        }
        if !self.age.is_empty() {
            facts.push(format!("is {} years old", self.age));
        }
        if !self.gender.is_empty() {
            facts.push(format!("is {}", self.gender));
        }
        if !self.likes.is_empty() {
            let likes: Vec<&str> = self.likes.iter().map(String::as_str).collect();
            facts.push(format!("likes {}", likes.join(", ")));
        }

        let subject = if self.name.is_empty() {
            if facts.is_empty() {
                return None;
            }
            "The user".to_string()
        } else {
            facts.insert(0, format!("name is {}", self.name));
            "User's".to_string()
        };

        Some(format!("{} {}.", subject, join_facts(&facts)))
    }
}

fn join_facts(facts: &[String]) -> String {
    match facts {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
    }
}

/// Partial profile produced by one extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub studies: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub likes: Vec<String>,
}

impl ProfileUpdate {
    /// Read the five profile fields from an extractor's JSON object. Unknown
    /// keys are ignored; fields of the wrong type are treated as absent.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| SwitchboardError::Other("expected a JSON object".to_string()))?;

        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        let age = match object.get("age") {
            Some(Value::Number(n)) => Some(number_text(n)),
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        let likes = object
            .get("likes")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            name: text("name"),
            studies: text("studies"),
            age,
            gender: text("gender"),
            likes,
        })
    }

    /// Apply the spelling and casing corrections to every present field
    pub fn normalized(self) -> Self {
        let mut likes: Vec<String> = Vec::new();
        for like in self.likes.iter().filter_map(|l| normalize_like(l)) {
            if !likes.contains(&like) {
                likes.push(like);
            }
        }

        Self {
            name: self.name.map(|n| capitalize(n.trim())).filter(|n| !n.is_empty()),
            studies: self.studies.map(|s| normalize_studies(&s)).filter(|s| !s.is_empty()),
            age: self.age.map(|a| normalize_age(&a)).filter(|a| !a.is_empty()),
            gender: self
                .gender
                .map(|g| g.trim().to_lowercase())
                .filter(|g| !g.is_empty()),
            likes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.studies.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.likes.is_empty()
    }
}

/// First letter upper case, the rest lower case
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn normalize_like(like: &str) -> Option<String> {
    let like = like.trim();
    (!like.is_empty()).then(|| capitalize(like))
}

/// Title case with CS, AI and IT written out
fn normalize_studies(studies: &str) -> String {
    let studies = studies.trim();
    if let Some((_, full)) = STUDY_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(studies))
    {
        return full.to_string();
    }

    studies
        .split_whitespace()
        .map(|word| {
            STUDY_ABBREVIATIONS
                .iter()
                .find(|(abbr, _)| *abbr == word)
                .map(|(_, full)| full.to_string())
                .unwrap_or_else(|| capitalize(word))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_age(age: &str) -> String {
    let age = age.trim();
    match age.parse::<f64>() {
        Ok(n) if n.is_finite() && n.fract() == 0.0 => format!("{}", n as i64),
        _ => age.to_string(),
    }
}

fn number_text(n: &serde_json::Number) -> String {
    n.as_i64()
        .map(|i| i.to_string())
        .unwrap_or_else(|| normalize_age(&n.to_string()))
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => number_text(&n),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(value: Value) -> ProfileUpdate {
        ProfileUpdate::from_value(&value).unwrap().normalized()
    }

    #[test]
    fn test_normalization() {
        let u = update(json!({
            "name": "sARAH",
            "studies": "CS",
            "age": 22,
            "gender": "Female",
            "likes": [" books", "football", "Football", ""],
            "city": "Berlin"
        }));
        assert_eq!(u.name.as_deref(), Some("Sarah"));
        assert_eq!(u.studies.as_deref(), Some("Computer Science"));
        assert_eq!(u.age.as_deref(), Some("22"));
        assert_eq!(u.gender.as_deref(), Some("female"));
        assert_eq!(u.likes, vec!["Books", "Football"]);
    }

    #[test]
    fn test_studies_title_case_and_expansion() {
        assert_eq!(normalize_studies("business administration"), "Business Administration");
        assert_eq!(normalize_studies("applied AI"), "Applied Artificial Intelligence");
        assert_eq!(normalize_studies("it"), "Information Technology");
    }

    #[test]
    fn test_age_as_string() {
        assert_eq!(update(json!({"age": "31"})).age.as_deref(), Some("31"));
        assert_eq!(update(json!({"age": 31.0})).age.as_deref(), Some("31"));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(ProfileUpdate::from_value(&json!(["name"])).is_err());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let u = update(json!({"name": "Alice", "likes": ["chess", "Tea"]}));
        let mut once = UserProfile::default();
        once.merge(&u);
        let mut twice = once.clone();
        twice.merge(&u);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_is_commutative_for_likes() {
        let a = update(json!({"likes": ["chess"]}));
        let b = update(json!({"likes": ["tea", "Chess"]}));

        let mut ab = UserProfile::default();
        ab.merge(&a);
        ab.merge(&b);
        let mut ba = UserProfile::default();
        ba.merge(&b);
        ba.merge(&a);
        assert_eq!(ab.likes, ba.likes);
        assert_eq!(ab.likes.len(), 2);
    }

    #[test]
    fn test_empty_scalar_does_not_clear() {
        let mut profile = UserProfile::default();
        profile.merge(&update(json!({"name": "Dennis", "studies": "Business"})));
        profile.merge(&ProfileUpdate {
            name: Some(String::new()),
            studies: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.name, "Dennis");
        assert_eq!(profile.studies, "Business");
    }

    #[test]
    fn test_summary() {
        let mut profile = UserProfile::default();
        assert_eq!(profile.summary(), None);

        profile.merge(&update(json!({"studies": "business"})));
        assert_eq!(profile.summary().unwrap(), "The user studies Business.");

        profile.merge(&update(json!({"name": "dennis"})));
        assert_eq!(
            profile.summary().unwrap(),
            "User's name is Dennis and studies Business."
        );
    }

    #[test]
    fn test_stored_shape_accepts_numeric_age() {
        let profile: UserProfile = serde_json::from_value(json!({
            "name": "Sarah", "studies": "", "age": 22, "gender": "", "likes": ["Books"]
        }))
        .unwrap();
        assert_eq!(profile.age, "22");
        assert!(profile.likes.contains("Books"));
    }
}
