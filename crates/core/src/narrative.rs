//! Static per-label narrative texts attached to classification results.
//!
//! The table is built once at startup (built-in texts, optionally overridden
//! from a JSON file) and shared read-only afterwards.

use std::collections::HashMap;
use std::path::Path;

use crate::error::CoreError;
use crate::labels::CrimeType;

/// Substituted when a label has no narrative.
pub const NO_DESCRIPTION: &str = "No detailed description available.";

const ABUSE: &str = "\
This video shows potential signs of abuse.
The incident appears to involve harmful behavior directed toward an individual.
The victim appears to be in distress or showing defensive posture.
The aggressor displays controlling or intimidating behavior.
The interaction shows power imbalance typical of abuse situations.
Based on the visible patterns in the footage, authorities should investigate for potential domestic violence.
The timestamp indicates this occurred during evening hours when such incidents are statistically more common.
Facial expressions and body language indicate emotional distress.
Recommend immediate intervention by trained personnel and victim support resources.";

const ASSAULT: &str = "\
The video contains evidence of a physical assault.
There is clear physical aggression between individuals.
The attacker is making forceful physical contact with the victim.
The victim appears to be defending themselves or attempting to escape.
This type of incident typically requires immediate intervention.
The level of force used appears excessive and unprovoked.
The assault took place in what appears to be a public location.
Multiple witnesses were present at the scene.
Recommend immediate police notification and medical assistance for the victim.
Video evidence should be preserved for potential legal proceedings.";

const ARSON: &str = "\
The footage shows evidence of deliberate fire-setting.
Flames or smoke are visible in an uncontrolled or suspicious context.
The fire appears to have been intentionally started.
Property damage is occurring as a result of the fire.
This criminal act poses significant danger to life and property.
The fire was started in a manner consistent with arson techniques.
The suspect appears to have used accelerants to increase fire spread.
Weather conditions at the time increased the danger of the fire.
Recommend fire department investigation for point of origin.
Surrounding structures were placed at significant risk due to this act.";

const ARREST: &str = "\
This video shows what appears to be an arrest in progress.
Law enforcement personnel are visible detaining an individual.
Standard arrest procedures such as handcuffing can be observed.
The detained individual is being placed into custody.
The scene shows typical elements of a police intervention.
Police officers appear to be following standard protocol.
Multiple officers are present to secure the scene.
Bystanders are maintaining appropriate distance from the procedure.
The arrest appears to be conducted in accordance with proper procedure.
Further investigation would be needed to determine the nature of the offense.";

/// Immutable mapping from label to narrative text.
#[derive(Debug, Clone)]
pub struct NarrativeTable {
    entries: HashMap<CrimeType, String>,
}

impl NarrativeTable {
    /// Table with the compiled-in narratives for every label.
    pub fn builtin() -> Self {
        let entries = CrimeType::ALL
            .into_iter()
            .map(|label| {
                let text = match label {
                    CrimeType::Abuse => ABUSE,
                    CrimeType::Assault => ASSAULT,
                    CrimeType::Arson => ARSON,
                    CrimeType::Arrest => ARREST,
                };
                (label, text.to_string())
            })
            .collect();
        Self { entries }
    }

    /// Table with no entries. Every lookup falls back to [`NO_DESCRIPTION`].
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Built-in table with entries replaced from a JSON object file.
    ///
    /// The file maps label names to texts, e.g. `{"arson": "..."}`. Labels not
    /// present keep their built-in text; unknown labels are rejected.
    pub fn builtin_with_overrides(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!(
                "Cannot read narratives file {}: {e}",
                path.display()
            ))
        })?;
        let mut table = Self::builtin();
        table.apply_overrides(&raw)?;
        Ok(table)
    }

    fn apply_overrides(&mut self, raw_json: &str) -> Result<(), CoreError> {
        let overrides: HashMap<String, String> = serde_json::from_str(raw_json)
            .map_err(|e| CoreError::Config(format!("Invalid narratives JSON: {e}")))?;

        for (name, text) in overrides {
            let label = name
                .parse::<CrimeType>()
                .map_err(|e| CoreError::Config(e.to_string()))?;
            self.entries.insert(label, text);
        }
        Ok(())
    }

    pub fn get(&self, label: CrimeType) -> Option<&str> {
        self.entries.get(&label).map(String::as_str)
    }

    /// Narrative for `label`, or [`NO_DESCRIPTION`] when absent.
    pub fn describe(&self, label: CrimeType) -> &str {
        self.get(label).unwrap_or(NO_DESCRIPTION)
    }
}

impl Default for NarrativeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn builtin_covers_every_label() {
        let table = NarrativeTable::builtin();
        for label in CrimeType::ALL {
            let text = table.get(label).expect("missing narrative");
            assert!(text.lines().count() > 1, "{label} narrative should be multi-line");
        }
    }

    #[test]
    fn builtin_texts_open_with_their_finding() {
        let table = NarrativeTable::builtin();
        assert!(table
            .describe(CrimeType::Abuse)
            .starts_with("This video shows potential signs of abuse.\n"));
        assert!(table
            .describe(CrimeType::Arrest)
            .ends_with("determine the nature of the offense."));
        assert_eq!(table.describe(CrimeType::Assault).lines().count(), 10);
    }

    #[test]
    fn empty_table_falls_back_to_placeholder() {
        let table = NarrativeTable::empty();
        assert_eq!(table.describe(CrimeType::Arson), NO_DESCRIPTION);
    }

    #[test]
    fn overrides_replace_only_named_labels() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"arson": "custom arson text"}}"#).unwrap();

        let table = NarrativeTable::builtin_with_overrides(file.path()).unwrap();
        assert_eq!(table.describe(CrimeType::Arson), "custom arson text");
        assert_eq!(table.describe(CrimeType::Abuse), ABUSE);
    }

    #[test]
    fn overrides_reject_unknown_labels() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"vandalism": "nope"}}"#).unwrap();

        let err = NarrativeTable::builtin_with_overrides(file.path()).unwrap_err();
        assert_matches!(err, CoreError::Config(msg) if msg.contains("vandalism"));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = NarrativeTable::builtin_with_overrides(Path::new("/nonexistent/narratives.json"))
            .unwrap_err();
        assert_matches!(err, CoreError::Config(_));
    }
}
