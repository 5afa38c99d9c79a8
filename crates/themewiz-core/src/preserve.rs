use crate::state::{WizardAction, WizardState};
use crate::step::WizardFlags;

pub fn snapshot(state: &WizardState) -> WizardFlags {
    state.flags
}

pub fn restore(mut state: WizardState, flags: WizardFlags) -> WizardState {
    state.flags = flags;
    state
}

/// Forces the flags of `candidate` back to those of `before` unless `action`
/// is one of the flag-owning actions.
pub fn preserve_flags(
    before: &WizardState,
    candidate: WizardState,
    action: &WizardAction,
) -> WizardState {
    if action.owns_flags() {
        return candidate;
    }

    let flags = snapshot(before);
    if candidate.flags != flags {
        tracing::warn!(
            action = action.name(),
            "transition attempted to change wizard flags; restoring snapshot"
        );
    }
    restore(candidate, flags)
}
