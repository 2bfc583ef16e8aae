use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::i18n::Language;
use crate::model::prompt::{SkillLevel, UserRequest};

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub lang: Option<Language>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanRequest {
    pub session_id: Option<Uuid>,
    pub sport: String,
    #[serde(default)]
    pub skill_level: SkillLevel,
    pub duration_days: u32,
    pub disability: Option<String>,
    pub equipment: Option<String>,
    pub culture: Option<String>,
    pub diet: Option<String>,
    #[serde(default)]
    pub language: Language,
}

impl PlanRequest {
    pub fn user_request(&self) -> UserRequest {
        UserRequest {
            sport: self.sport.clone(),
            skill_level: self.skill_level,
            duration_days: self.duration_days,
            disability_notes: self.disability.clone(),
            equipment: self.equipment.clone(),
            cultural_preferences: self.culture.clone(),
            diet: self.diet.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub session_id: Uuid,
    pub language: Language,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResponse {
    pub session_id: Uuid,
    pub sport: String,
    pub skill_level: SkillLevel,
    pub language: Language,
    pub language_label: String,
    pub plan: String,
}

#[derive(Debug, Serialize)]
pub struct LanguageOption {
    pub code: &'static str,
    pub label: &'static str,
}
