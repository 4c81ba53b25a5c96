/// The SAVE unit models whose register sets are known to differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr)]
pub enum Model {
    #[strum(serialize = "VTR-300")]
    Vtr300,
    #[strum(serialize = "VTR-500")]
    Vtr500,
    #[strum(serialize = "VSR-300")]
    Vsr300,
    #[strum(serialize = "Unknown")]
    Unknown,
}

/// Tokens searched for when the model string is not an exact match, in priority order.
///
/// The hyphenated spelling is matched against the string as reported, the compact one
/// case-insensitively.
const PARTIAL_MATCHES: [(&str, &str, Model); 3] = [
    ("VTR-300", "VTR300", Model::Vtr300),
    ("VTR-500", "VTR500", Model::Vtr500),
    ("VSR-300", "VSR300", Model::Vsr300),
];

impl Model {
    /// The canonical model string, e.g. `VTR-300`.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Classify the free-form `MB Model` string reported by the unit.
    pub fn from_model_string(model: Option<&str>) -> Model {
        let Some(model) = model.filter(|m| !m.is_empty()) else {
            return Model::Unknown;
        };
        let upper = model.to_uppercase();
        for candidate in <Model as strum::IntoEnumIterator>::iter() {
            if candidate.as_str().to_uppercase() == upper {
                return candidate;
            }
        }
        for (hyphenated, compact, candidate) in PARTIAL_MATCHES {
            if model.contains(hyphenated) || upper.contains(compact) {
                return candidate;
            }
        }
        tracing::warn!(model, "unknown SystemAIR model");
        Model::Unknown
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Model {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Model;
    use tracing_test::traced_test;

    #[test]
    fn exact_matches_ignore_case() {
        assert_eq!(Model::from_model_string(Some("VTR-300")), Model::Vtr300);
        assert_eq!(Model::from_model_string(Some("vtr-500")), Model::Vtr500);
        assert_eq!(Model::from_model_string(Some("VSR-300")), Model::Vsr300);
    }

    #[test]
    fn partial_matches() {
        assert_eq!(Model::from_model_string(Some("vtr300-x")), Model::Vtr300);
        assert_eq!(Model::from_model_string(Some("SAVE VTR-500/B")), Model::Vtr500);
        assert_eq!(Model::from_model_string(Some("save vsr300 l")), Model::Vsr300);
    }

    #[test]
    fn empty_is_unknown() {
        assert_eq!(Model::from_model_string(None), Model::Unknown);
        assert_eq!(Model::from_model_string(Some("")), Model::Unknown);
    }

    #[test]
    #[traced_test]
    fn unrecognised_is_unknown_and_warns_once() {
        assert_eq!(Model::from_model_string(Some("totally-unknown-model")), Model::Unknown);
        logs_assert(|lines: &[&str]| {
            let warnings = lines
                .iter()
                .filter(|l| l.contains("unknown SystemAIR model"))
                .filter(|l| l.contains("totally-unknown-model"))
                .count();
            match warnings {
                1 => Ok(()),
                n => Err(format!("expected one warning, got {n}")),
            }
        });
    }

    #[test]
    fn unknown_string_is_an_exact_match() {
        assert_eq!(Model::from_model_string(Some("unknown")), Model::Unknown);
        assert_eq!(Model::Unknown.to_string(), "Unknown");
    }
}
