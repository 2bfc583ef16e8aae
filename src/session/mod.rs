use std::sync::Arc;
use log::{info, debug, error};

use crate::error::SessionError;
use crate::i18n::Language;
use crate::model::prompt::{build_generation_prompt, build_translation_prompt, SkillLevel, UserRequest};
use crate::model::{CompletionClient, GENERATION, TRANSLATION};

pub const MAX_DURATION_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Generating,
    Displaying,
    Translating,
}

/// Points along a remote call at which progress is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Preparing,
    Requesting,
    Received,
    Done,
}

impl Milestone {
    pub fn percent(self) -> u8 {
        match self {
            Milestone::Preparing => 10,
            Milestone::Requesting => 30,
            Milestone::Received => 90,
            Milestone::Done => 100,
        }
    }
}

/// Plan state for one interactive user.
#[derive(Debug, Default)]
pub struct PlanSession {
    state: SessionState,
    original_plan: Option<String>,
    current_plan: Option<String>,
    current_language: Language,
    sport: Option<String>,
    skill_level: Option<SkillLevel>,
}

impl PlanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn generation_in_progress(&self) -> bool {
        self.state == SessionState::Generating
    }

    pub fn translation_in_progress(&self) -> bool {
        self.state == SessionState::Translating
    }

    #[cfg(test)]
    pub fn original_plan(&self) -> Option<&str> {
        self.original_plan.as_deref()
    }

    pub fn current_plan(&self) -> Option<&str> {
        self.current_plan.as_deref()
    }

    pub fn current_language(&self) -> Language {
        self.current_language
    }

    pub fn sport(&self) -> Option<&str> {
        self.sport.as_deref()
    }

    pub fn skill_level(&self) -> Option<SkillLevel> {
        self.skill_level
    }

    fn ensure_not_busy(&self) -> Result<(), SessionError> {
        if self.generation_in_progress() || self.translation_in_progress() {
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    /// File name offered for the current plan, e.g. `Wheelchair_Basketball_plan_en.md`.
    pub fn download_name(&self) -> Option<String> {
        let sport = self.sport.as_deref()?;
        self.current_plan.as_ref()?;
        let stem: String = sport
            .trim()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        Some(format!("{}_plan_{}.md", stem, self.current_language.code()))
    }
}

/// Checks the parts of a submission that do not depend on session state.
pub fn validate_request(request: &UserRequest) -> Result<(), SessionError> {
    if request.sport.trim().is_empty() {
        return Err(SessionError::EmptySport);
    }
    if request.duration_days == 0 || request.duration_days > MAX_DURATION_DAYS {
        return Err(SessionError::InvalidDuration(request.duration_days));
    }
    Ok(())
}

/// Sequences prompt building and remote calls against a session.
#[derive(Clone)]
pub struct Orchestrator {
    client: Arc<CompletionClient>,
}

impl Orchestrator {
    pub fn new(client: Arc<CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn generate<F>(
        &self,
        session: &mut PlanSession,
        request: UserRequest,
        language: Language,
        mut progress: F,
    ) -> Result<String, SessionError>
    where
        F: FnMut(Milestone),
    {
        session.ensure_not_busy()?;
        validate_request(&request)?;

        let call = InFlight::begin(session, SessionState::Generating);
        info!(
            "Generating {}-day {} plan ({}) in {}",
            request.duration_days, request.sport, request.skill_level, language.english_name()
        );

        progress(Milestone::Preparing);
        let prompt = build_generation_prompt(&request, language.instruction());
        debug!("Generation prompt: {}", prompt);

        progress(Milestone::Requesting);
        let outcome = self.client.complete(&prompt, GENERATION).await;
        if outcome.is_ok() {
            progress(Milestone::Received);
        }
        progress(Milestone::Done);

        match outcome {
            Ok(plan) => {
                call.finish(SessionState::Displaying, |session| {
                    session.original_plan = Some(plan.clone());
                    session.current_plan = Some(plan.clone());
                    session.current_language = language;
                    session.sport = Some(request.sport.trim().to_string());
                    session.skill_level = Some(request.skill_level);
                });
                Ok(plan)
            }
            Err(e) => {
                error!("Plan generation failed: {}", e);
                drop(call);
                Err(e.into())
            }
        }
    }

    pub async fn translate<F>(
        &self,
        session: &mut PlanSession,
        target: Language,
        mut progress: F,
    ) -> Result<String, SessionError>
    where
        F: FnMut(Milestone),
    {
        session.ensure_not_busy()?;
        let source = match (&session.state, &session.original_plan) {
            (SessionState::Displaying, Some(plan)) => plan.clone(),
            _ => return Err(SessionError::NoPlan),
        };
        if target == session.current_language {
            return Err(SessionError::SameLanguage);
        }

        let call = InFlight::begin(session, SessionState::Translating);
        info!(
            "Translating plan from {} to {}",
            call.session.current_language.english_name(),
            target.english_name()
        );

        progress(Milestone::Preparing);
        let prompt = build_translation_prompt(&source, target);
        debug!("Translation prompt: {}", prompt);

        progress(Milestone::Requesting);
        let outcome = self.client.complete(&prompt, TRANSLATION).await;
        if outcome.is_ok() {
            progress(Milestone::Received);
        }
        progress(Milestone::Done);

        match outcome {
            Ok(plan) => {
                call.finish(SessionState::Displaying, |session| {
                    session.current_plan = Some(plan.clone());
                    session.current_language = target;
                });
                Ok(plan)
            }
            Err(e) => {
                error!("Plan translation failed: {}", e);
                drop(call);
                Err(e.into())
            }
        }
    }
}

/// Marks a session busy for the length of one remote call.
///
/// If the call is abandoned or fails, dropping the guard puts the session
/// back into the state it was in before the call started.
struct InFlight<'a> {
    session: &'a mut PlanSession,
    restore: SessionState,
}

impl<'a> InFlight<'a> {
    fn begin(session: &'a mut PlanSession, busy: SessionState) -> Self {
        let restore = session.state;
        session.state = busy;
        Self { session, restore }
    }

    fn finish<F>(mut self, state: SessionState, apply: F)
    where
        F: FnOnce(&mut PlanSession),
    {
        apply(&mut *self.session);
        self.restore = state;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.session.state = self.restore;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompletionError;
    use crate::model::tests::{reply, test_config};
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn swimming() -> UserRequest {
        UserRequest {
            sport: "Swimming".to_string(),
            skill_level: SkillLevel::Beginner,
            duration_days: 7,
            disability_notes: None,
            equipment: None,
            cultural_preferences: None,
            diet: None,
        }
    }

    fn orchestrator_for(server: &MockServer) -> Orchestrator {
        let config = test_config(format!("{}/v1/chat/completions", server.uri()));
        Orchestrator::new(Arc::new(CompletionClient::new(&config).unwrap()))
    }

    async fn displaying_session(orchestrator: &Orchestrator) -> PlanSession {
        let mut session = PlanSession::new();
        orchestrator
            .generate(&mut session, swimming(), Language::English, |_| {})
            .await
            .unwrap();
        session
    }

    #[test]
    fn new_session_is_idle() {
        let session = PlanSession::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.generation_in_progress());
        assert!(!session.translation_in_progress());
        assert_eq!(session.current_language(), Language::English);
        assert!(session.download_name().is_none());
    }

    #[tokio::test]
    async fn generation_stores_plan_and_reports_milestones() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Beginner level 7-day Swimming training plan"))
            .respond_with(reply("Day 1: ..."))
            .expect(1)
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server);
        let mut session = PlanSession::new();
        let mut seen = Vec::new();
        let plan = orchestrator
            .generate(&mut session, swimming(), Language::English, |m| seen.push(m))
            .await
            .unwrap();

        assert_eq!(plan, "Day 1: ...");
        assert_eq!(session.state(), SessionState::Displaying);
        assert_eq!(session.original_plan(), Some("Day 1: ..."));
        assert_eq!(session.current_plan(), Some("Day 1: ..."));
        assert_eq!(session.sport(), Some("Swimming"));
        assert_eq!(
            seen,
            vec![Milestone::Preparing, Milestone::Requesting, Milestone::Received, Milestone::Done]
        );
        assert_eq!(session.download_name().as_deref(), Some("Swimming_plan_en.md"));
    }

    #[tokio::test]
    async fn failed_generation_leaves_session_without_plan() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server);
        let mut session = PlanSession::new();
        let mut seen = Vec::new();
        let err = orchestrator
            .generate(&mut session, swimming(), Language::English, |m| seen.push(m))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Completion(CompletionError::HttpStatus { status: 401, .. })
        ));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.original_plan().is_none());
        assert!(session.current_plan().is_none());
        assert_eq!(seen.last(), Some(&Milestone::Done));
        assert!(!seen.contains(&Milestone::Received));
    }

    #[tokio::test]
    async fn failed_regeneration_keeps_previous_plan() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("first plan"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server);
        let mut session = displaying_session(&orchestrator).await;
        let result = orchestrator
            .generate(&mut session, swimming(), Language::Russian, |_| {})
            .await;

        assert!(result.is_err());
        assert_eq!(session.state(), SessionState::Displaying);
        assert_eq!(session.original_plan(), Some("first plan"));
        assert_eq!(session.current_plan(), Some("first plan"));
        assert_eq!(session.current_language(), Language::English);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_any_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(reply("x")).expect(0).mount(&server).await;

        let orchestrator = orchestrator_for(&server);
        let mut session = PlanSession::new();

        let mut blank = swimming();
        blank.sport = "  ".to_string();
        let err = orchestrator.generate(&mut session, blank, Language::English, |_| {}).await.unwrap_err();
        assert!(matches!(err, SessionError::EmptySport));

        for days in [0, 31] {
            let mut request = swimming();
            request.duration_days = days;
            let err = orchestrator.generate(&mut session, request, Language::English, |_| {}).await.unwrap_err();
            assert!(matches!(err, SessionError::InvalidDuration(d) if d == days));
        }

        let err = orchestrator.translate(&mut session, Language::Russian, |_| {}).await.unwrap_err();
        assert!(matches!(err, SessionError::NoPlan));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn busy_session_rejects_new_work() {
        let server = MockServer::start().await;
        let orchestrator = orchestrator_for(&server);

        let mut session = PlanSession::new();
        session.state = SessionState::Generating;
        let err = orchestrator.generate(&mut session, swimming(), Language::English, |_| {}).await.unwrap_err();
        assert!(matches!(err, SessionError::Busy));

        session.state = SessionState::Translating;
        let err = orchestrator.translate(&mut session, Language::Russian, |_| {}).await.unwrap_err();
        assert!(matches!(err, SessionError::Busy));
    }

    #[tokio::test]
    async fn abandoned_call_releases_the_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("late").set_delay(std::time::Duration::from_secs(5)))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server);
        let mut session = PlanSession::new();
        let pending = orchestrator.generate(&mut session, swimming(), Language::English, |_| {});
        let outcome = tokio::time::timeout(std::time::Duration::from_millis(200), pending).await;

        assert!(outcome.is_err());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.current_plan().is_none());
    }

    #[tokio::test]
    async fn translation_always_starts_from_original_plan() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("training plan for:"))
            .respond_with(reply("Day 1: swim"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("into Russian"))
            .and(body_string_contains("Day 1: swim"))
            .respond_with(reply("День 1: плавание"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("into English"))
            .and(body_string_contains("Day 1: swim"))
            .respond_with(reply("Day 1: swimming"))
            .expect(1)
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server);
        let mut session = displaying_session(&orchestrator).await;

        let ru = orchestrator.translate(&mut session, Language::Russian, |_| {}).await.unwrap();
        assert_eq!(ru, "День 1: плавание");
        assert_eq!(session.current_language(), Language::Russian);
        assert_eq!(session.download_name().as_deref(), Some("Swimming_plan_ru.md"));

        let en = orchestrator.translate(&mut session, Language::English, |_| {}).await.unwrap();
        assert_eq!(en, "Day 1: swimming");
        assert_eq!(session.current_language(), Language::English);
        assert_eq!(session.original_plan(), Some("Day 1: swim"));
        assert_eq!(session.state(), SessionState::Displaying);
    }

    #[tokio::test]
    async fn same_language_translation_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(reply("Day 1: swim")).expect(1).mount(&server).await;

        let orchestrator = orchestrator_for(&server);
        let mut session = displaying_session(&orchestrator).await;
        let err = orchestrator.translate(&mut session, Language::English, |_| {}).await.unwrap_err();
        assert!(matches!(err, SessionError::SameLanguage));
    }

    #[tokio::test]
    async fn failed_translation_keeps_displayed_plan() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("training plan for:"))
            .respond_with(reply("Day 1: swim"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("Translate the following"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server);
        let mut session = displaying_session(&orchestrator).await;
        let err = orchestrator.translate(&mut session, Language::Kazakh, |_| {}).await.unwrap_err();

        assert!(matches!(err, SessionError::Completion(CompletionError::Parse(_))));
        assert_eq!(session.state(), SessionState::Displaying);
        assert_eq!(session.current_plan(), Some("Day 1: swim"));
        assert_eq!(session.original_plan(), Some("Day 1: swim"));
        assert_eq!(session.current_language(), Language::English);
    }
}
