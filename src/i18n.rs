use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the page and the generated plans are offered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    #[default]
    English,
    Russian,
    Kazakh,
}

pub const LANGUAGES: [Language; 3] = [Language::English, Language::Russian, Language::Kazakh];

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Russian => "ru",
            Language::Kazakh => "kk",
        }
    }

    /// Name shown in the language selector.
    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Russian => "Русский",
            Language::Kazakh => "Қазақша",
        }
    }

    // Used inside prompts; the model handles English names more reliably.
    pub fn english_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Russian => "Russian",
            Language::Kazakh => "Kazakh",
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Language::English => "Write the entire plan in English.",
            Language::Russian => "Write the entire plan in Russian.",
            Language::Kazakh => "Write the entire plan in Kazakh.",
        }
    }

    pub fn strings(self) -> &'static UiStrings {
        match self {
            Language::English => &ENGLISH,
            Language::Russian => &RUSSIAN,
            Language::Kazakh => &KAZAKH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        LANGUAGES
            .iter()
            .copied()
            .find(|lang| {
                lang.code().eq_ignore_ascii_case(needle)
                    || lang.label() == needle
                    || lang.english_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| format!("Unsupported language: {}", needle))
    }
}

impl TryFrom<String> for Language {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.code().to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct UiStrings {
    pub title: &'static str,
    pub caption: &'static str,
    pub sport: &'static str,
    pub skill_level: &'static str,
    pub duration: &'static str,
    pub disability: &'static str,
    pub equipment: &'static str,
    pub culture: &'static str,
    pub diet: &'static str,
    pub language: &'static str,
    pub generate: &'static str,
    pub translate: &'static str,
    pub download: &'static str,
    pub generating: &'static str,
    pub translating: &'static str,
    pub error_prefix: &'static str,
}

static ENGLISH: UiStrings = UiStrings {
    title: "Sportify",
    caption: "Create your personalized training plan",
    sport: "Sport",
    skill_level: "Skill Level",
    duration: "Duration (days)",
    disability: "Disabilities",
    equipment: "Equipment Availability",
    culture: "Cultural Preferences",
    diet: "Diet Plan",
    language: "Language",
    generate: "Generate Plan",
    translate: "Translate",
    download: "Save Plan",
    generating: "Designing your custom training plan...",
    translating: "Translating your plan...",
    error_prefix: "Error",
};

static RUSSIAN: UiStrings = UiStrings {
    title: "Sportify",
    caption: "Создайте персональный план тренировок",
    sport: "Вид спорта",
    skill_level: "Уровень подготовки",
    duration: "Длительность (дни)",
    disability: "Ограничения здоровья",
    equipment: "Доступное оборудование",
    culture: "Культурные предпочтения",
    diet: "Питание",
    language: "Язык",
    generate: "Создать план",
    translate: "Перевести",
    download: "Сохранить план",
    generating: "Составляем ваш план тренировок...",
    translating: "Переводим план...",
    error_prefix: "Ошибка",
};

static KAZAKH: UiStrings = UiStrings {
    title: "Sportify",
    caption: "Жеке жаттығу жоспарыңызды құрыңыз",
    sport: "Спорт түрі",
    skill_level: "Дайындық деңгейі",
    duration: "Ұзақтығы (күн)",
    disability: "Денсаулық шектеулері",
    equipment: "Қолжетімді жабдық",
    culture: "Мәдени қалаулар",
    diet: "Тамақтану",
    language: "Тіл",
    generate: "Жоспар құру",
    translate: "Аудару",
    download: "Жоспарды сақтау",
    generating: "Жаттығу жоспарыңыз құрылуда...",
    translating: "Жоспар аударылуда...",
    error_prefix: "Қате",
};
