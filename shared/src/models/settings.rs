use serde::{Deserialize, Serialize};

/// Point of view for the generated story. Each variant maps to a fixed
/// Korean label that is inserted verbatim into the prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pov {
    FirstPerson,
    ThirdPersonLimited,
    ThirdPersonOmniscient,
}

impl Pov {
    pub const ALL: [Pov; 3] = [
        Pov::FirstPerson,
        Pov::ThirdPersonLimited,
        Pov::ThirdPersonOmniscient,
    ];

    /// Prompt label shown in the UI and embedded in the instruction text.
    pub fn label(&self) -> &'static str {
        match self {
            Pov::FirstPerson => "1인칭 주인공 시점 (I did...)",
            Pov::ThirdPersonLimited => "3인칭 관찰자 시점 (He/She did...)",
            Pov::ThirdPersonOmniscient => "3인칭 전지적 작가 시점 (God view)",
        }
    }

    /// Stable identifier used as the `<select>` option value.
    pub fn id(&self) -> &'static str {
        match self {
            Pov::FirstPerson => "first_person",
            Pov::ThirdPersonLimited => "third_person_limited",
            Pov::ThirdPersonOmniscient => "third_person_omniscient",
        }
    }

    pub fn from_id(id: &str) -> Option<Pov> {
        Pov::ALL.into_iter().find(|pov| pov.id() == id)
    }
}

/// Slider bounds for the target length (Korean characters, advisory only).
pub const TARGET_LENGTH_MIN: u32 = 1000;
pub const TARGET_LENGTH_MAX: u32 = 10000;
pub const TARGET_LENGTH_STEP: u32 = 500;

/// Complete set of user-chosen generation parameters. Replaced as a whole on
/// every field edit and read once when a generation starts, so an in-flight
/// request never observes a partial update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NovelSettings {
    pub synopsis: String,
    pub pov: Pov,
    /// Target character count (advisory; the model is not guaranteed to hit it).
    pub target_length: u32,
    /// Optional style exemplar, included verbatim (truncated) in the prompt.
    pub reference_text: String,
    /// Selects the permissive safety-threshold set when true.
    pub is_mature: bool,
}

impl Default for NovelSettings {
    fn default() -> Self {
        Self {
            synopsis: String::new(),
            pov: Pov::ThirdPersonLimited,
            target_length: 3000,
            reference_text: String::new(),
            is_mature: false,
        }
    }
}

impl NovelSettings {
    /// Generation stays disabled while the synopsis is blank.
    pub fn can_generate(&self) -> bool {
        !self.synopsis.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_ui_state() {
        let settings = NovelSettings::default();
        assert_eq!(settings.pov, Pov::ThirdPersonLimited);
        assert_eq!(settings.target_length, 3000);
        assert!(!settings.is_mature);
        assert!(settings.synopsis.is_empty());
        assert!(settings.reference_text.is_empty());
    }

    #[test]
    fn blank_synopsis_disables_generation() {
        let mut settings = NovelSettings::default();
        assert!(!settings.can_generate());
        settings.synopsis = "   \n\t".to_string();
        assert!(!settings.can_generate());
        settings.synopsis = "용사와 마왕".to_string();
        assert!(settings.can_generate());
    }

    #[test]
    fn pov_ids_round_trip() {
        for pov in Pov::ALL {
            assert_eq!(Pov::from_id(pov.id()), Some(pov));
        }
        assert_eq!(Pov::from_id("unknown"), None);
    }
}
