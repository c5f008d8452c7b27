//! Reducer for composer state transitions
//!
//! `(ComposerState, Action) -> ComposerState`. The reducer performs no I/O:
//! generation requests, uploads and finalization happen in the session and
//! feed their results back as actions.

use super::actions::Action;
use super::state::ComposerState;

/// Apply one action to the draft
pub fn reduce(mut state: ComposerState, action: Action) -> ComposerState {
    match action {
        // === Content ===
        Action::SetContent(value) => state.set_content(value),
        Action::AddMedia(item) => state.add_media(item),
        Action::RemoveMedia(id) => {
            state.remove_media(&id);
        }
        Action::UploadProgress { media_id, percent } => {
            state.apply_upload_progress(&media_id, percent);
        }

        // === Platforms ===
        Action::TogglePlatform(platform) => {
            state.toggle_platform(platform);
        }
        Action::SelectAllConnected(accounts) => state.select_all_connected(&accounts),
        Action::SetPreview(platform) => state.set_preview(platform),

        // === Tuning ===
        Action::EnterTuning => state.enter_tuning(),
        Action::LeaveTuning => state.leave_tuning(),

        // === Schedule ===
        Action::SetScheduleDate(date) => state.set_schedule_date(date),
        Action::SetScheduleTime(time) => state.set_schedule_time(time),

        // === Generator panels ===
        Action::ToggleImageGenerator => state.toggle_image_generator(),
        Action::ToggleVideoGenerator => state.toggle_video_generator(),
        Action::SetImagePrompt(prompt) => state.set_image_prompt(prompt),
        Action::AppendImageStyle(style) => state.append_image_style(&style),
        Action::SetVideoPrompt(prompt) => state.set_video_prompt(prompt),
        Action::VideoProgress(message) => state.set_video_progress(message),
        Action::ShowSuggestions(variants) => state.show_suggestions(variants),
        Action::ApplySuggestion(index) => {
            state.apply_suggestion(index);
        }
        Action::ClosePanels => state.close_panels(),

        // === Errors ===
        Action::ShowError(message) => state.set_error(message),
        Action::DismissError => state.clear_error(),

        Action::Reset => state.reset(),
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Platform;

    #[test]
    fn test_reducer_returns_new_state() {
        let state = ComposerState::new();
        let before = state.clone();

        let next = reduce(state, Action::SetContent("Hello".to_string()));

        assert_eq!(before.content(), "");
        assert_eq!(next.content(), "Hello");
    }

    #[test]
    fn test_tuning_flow() {
        let mut state = ComposerState::new();
        state = reduce(state, Action::SetContent("Launch day".to_string()));
        state = reduce(state, Action::TogglePlatform(Platform::Twitter));
        state = reduce(state, Action::EnterTuning);
        state = reduce(state, Action::SetContent("Launch day 🚀".to_string()));
        state = reduce(state, Action::LeaveTuning);

        assert_eq!(state.content(), "Launch day");
        assert_eq!(state.effective_content(Platform::Twitter), "Launch day 🚀");
        assert!(!state.is_tuning());
    }

    #[test]
    fn test_error_show_and_dismiss() {
        let state = reduce(ComposerState::new(), Action::ShowError("nope".to_string()));
        assert_eq!(state.error(), Some("nope"));

        let state = reduce(state, Action::DismissError);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_reset_action() {
        let mut state = ComposerState::new();
        state = reduce(state, Action::SetContent("draft".to_string()));
        state = reduce(state, Action::TogglePlatform(Platform::Facebook));
        state = reduce(state, Action::Reset);

        assert_eq!(state, ComposerState::new());
    }
}
