use serde::{Deserialize, Serialize};
use std::fmt;

use crate::i18n::Language;

const NONE_PLACEHOLDER: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Professional,
}

pub const SKILL_LEVELS: [SkillLevel; 4] = [
    SkillLevel::Beginner,
    SkillLevel::Intermediate,
    SkillLevel::Advanced,
    SkillLevel::Professional,
];

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
            SkillLevel::Professional => "Professional",
        };
        f.write_str(name)
    }
}

/// What the user asked for in one form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRequest {
    pub sport: String,
    pub skill_level: SkillLevel,
    pub duration_days: u32,
    pub disability_notes: Option<String>,
    pub equipment: Option<String>,
    pub cultural_preferences: Option<String>,
    pub diet: Option<String>,
}

fn filled(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn or_none(field: Option<&str>) -> &str {
    field.unwrap_or(NONE_PLACEHOLDER)
}

/// Renders the plan request. Empty optional fields show as `None`, except that
/// cultural preferences and diet share one line, which reads `None` only when
/// both are empty.
pub fn build_generation_prompt(request: &UserRequest, language_instruction: &str) -> String {
    let preferences = match (filled(&request.cultural_preferences), filled(&request.diet)) {
        (Some(culture), Some(diet)) => Some(format!("{}; {}", culture, diet)),
        (Some(culture), None) => Some(culture.to_string()),
        (None, Some(diet)) => Some(diet.to_string()),
        (None, None) => None,
    };

    format!(
        "Create a {level} level {days}-day {sport} training plan for:
- Physical needs: {disability}
- Cultural/religious and dietary preferences: {preferences}
- Equipment availability: {equipment}

Include:
1. Warm-up (dynamic exercises)
2. Main workout (3-5 adapted exercises)
3. Cooldown (static stretches)
4. Safety precautions
5. Equipment suggestions
6. Nutrition guidance

Group the plan by day using headings Day 1, Day 2, and so on.
Format in markdown with bullet points.
{instruction}",
        level = request.skill_level,
        days = request.duration_days,
        sport = request.sport.trim(),
        disability = or_none(filled(&request.disability_notes)),
        preferences = or_none(preferences.as_deref()),
        equipment = or_none(filled(&request.equipment)),
        instruction = language_instruction,
    )
}

pub fn build_translation_prompt(plan_text: &str, target: Language) -> String {
    format!(
        "Translate the following fitness training plan into {language}.
Keep the markdown formatting, bullet points and day headings exactly as they are.
Return only the translated plan without any commentary.

{plan}",
        language = target.english_name(),
        plan = plan_text,
    )
}
