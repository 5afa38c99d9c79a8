use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::{compute_visible_steps, position_of};
use crate::preserve;
use crate::registry::StepRegistry;
use crate::step::{StepId, WizardFlags, WizardPath};
use crate::theme::{ThemeData, ThemeUpdate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub current_step: StepId,
    pub flags: WizardFlags,
    pub completed_steps: Vec<StepId>,
    pub visited_steps: Vec<StepId>,
    pub step_history: Vec<StepId>,
    /// Derived from `flags`; rewritten by every dispatch.
    pub step_sequence: Vec<StepId>,
    pub theme: ThemeData,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            current_step: StepId::Welcome,
            flags: WizardFlags::default(),
            completed_steps: Vec::new(),
            visited_steps: vec![StepId::Welcome],
            step_history: Vec::new(),
            step_sequence: vec![StepId::Welcome],
            theme: ThemeData::default(),
        }
    }
}

impl WizardState {
    pub fn available_steps(&self) -> &[StepId] {
        &self.step_sequence
    }

    pub fn is_available(&self, step: StepId) -> bool {
        self.step_sequence.contains(&step)
    }

    pub fn is_completed(&self, step: StepId) -> bool {
        self.completed_steps.contains(&step)
    }

    pub fn is_visited(&self, step: StepId) -> bool {
        self.visited_steps.contains(&step)
    }

    pub fn position(&self, step: StepId) -> Option<usize> {
        position_of(&self.step_sequence, step)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAction {
    NextStep,
    PreviousStep,
    JumpToStep(StepId),
    SetPath(Option<WizardPath>),
    SetHasLogo(bool),
    SetHasColours(bool),
    SetHasFonts(bool),
    SetHasBrandGuide(bool),
    CompleteStep(StepId),
    UncompleteStep(StepId),
    UpdateTheme(ThemeUpdate),
    RestoreProgress {
        completed: Vec<StepId>,
        visited: Vec<StepId>,
        history: Vec<StepId>,
    },
    Reset,
}

impl WizardAction {
    /// The only actions allowed to change `WizardState::flags`.
    pub fn owns_flags(&self) -> bool {
        matches!(
            self,
            Self::SetPath(_)
                | Self::SetHasLogo(_)
                | Self::SetHasColours(_)
                | Self::SetHasFonts(_)
                | Self::SetHasBrandGuide(_)
                | Self::Reset
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NextStep => "next_step",
            Self::PreviousStep => "previous_step",
            Self::JumpToStep(_) => "jump_to_step",
            Self::SetPath(_) => "set_path",
            Self::SetHasLogo(_) => "set_has_logo",
            Self::SetHasColours(_) => "set_has_colours",
            Self::SetHasFonts(_) => "set_has_fonts",
            Self::SetHasBrandGuide(_) => "set_has_brand_guide",
            Self::CompleteStep(_) => "complete_step",
            Self::UncompleteStep(_) => "uncomplete_step",
            Self::UpdateTheme(_) => "update_theme",
            Self::RestoreProgress { .. } => "restore_progress",
            Self::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("'{0}' is the last visible step")]
    AtLastStep(StepId),
    #[error("'{0}' is the first visible step")]
    AtFirstStep(StepId),
    #[error("current step '{0}' is not part of the visible sequence")]
    NotInSequence(StepId),
    #[error("step '{0}' is not available under the current choices")]
    InvalidTarget(StepId),
}

/// Applies `action` to `state`: transition, flag preservation, then one
/// derivation pass. Rejected actions leave `state` untouched.
pub fn reduce(
    registry: &StepRegistry,
    state: &WizardState,
    action: WizardAction,
) -> Result<WizardState, TransitionError> {
    let candidate = transition(state, &action)?;
    let preserved = preserve::preserve_flags(state, candidate, &action);
    Ok(derive(registry, state, preserved))
}

fn transition(state: &WizardState, action: &WizardAction) -> Result<WizardState, TransitionError> {
    let mut next = state.clone();

    match action {
        WizardAction::NextStep => {
            let current = state.current_step;
            let index = state
                .position(current)
                .ok_or(TransitionError::NotInSequence(current))?;
            let target = *state
                .step_sequence
                .get(index + 1)
                .ok_or(TransitionError::AtLastStep(current))?;

            next.step_history.push(current);
            push_unique(&mut next.completed_steps, current);
            next.current_step = target;
        }
        WizardAction::PreviousStep => {
            let current = state.current_step;
            let index = state
                .position(current)
                .ok_or(TransitionError::NotInSequence(current))?;
            if index == 0 {
                return Err(TransitionError::AtFirstStep(current));
            }

            next.current_step = state.step_sequence[index - 1];
        }
        WizardAction::JumpToStep(target) => {
            let target = *target;
            let Some(target_index) = state.position(target) else {
                return Err(TransitionError::InvalidTarget(target));
            };
            if target == state.current_step {
                return Ok(next);
            }

            let backward = state
                .position(state.current_step)
                .is_some_and(|current_index| target_index < current_index);

            if backward {
                match position_of(&next.step_history, target) {
                    Some(index) => next.step_history.truncate(index + 1),
                    None => next.step_history.push(target),
                }
            } else {
                next.step_history.push(state.current_step);
            }

            next.current_step = target;
        }
        WizardAction::SetPath(path) => next.flags.path = *path,
        WizardAction::SetHasLogo(value) => next.flags.has_logo = *value,
        WizardAction::SetHasColours(value) => next.flags.has_colours = *value,
        WizardAction::SetHasFonts(value) => next.flags.has_fonts = *value,
        WizardAction::SetHasBrandGuide(value) => next.flags.has_brand_guide = *value,
        WizardAction::CompleteStep(step) => push_unique(&mut next.completed_steps, *step),
        WizardAction::UncompleteStep(step) => next.completed_steps.retain(|done| done != step),
        WizardAction::UpdateTheme(update) => next.theme.merge(update.clone()),
        WizardAction::RestoreProgress {
            completed,
            visited,
            history,
        } => {
            next.completed_steps = dedup(completed);
            next.visited_steps = dedup(visited);
            next.step_history = history.clone();
        }
        WizardAction::Reset => next = WizardState::default(),
    }

    Ok(next)
}

/// Recomputes the visible sequence, re-anchors the current step if it fell
/// out of the sequence and records it as visited.
fn derive(registry: &StepRegistry, previous: &WizardState, mut next: WizardState) -> WizardState {
    next.step_sequence = compute_visible_steps(registry, &next.flags);

    if !next.is_available(next.current_step) {
        let anchored = reanchor(&previous.step_sequence, &next.step_sequence, next.current_step);
        tracing::warn!(
            from = %next.current_step,
            to = %anchored,
            "current step is no longer visible; re-anchoring"
        );
        next.current_step = anchored;
    }

    push_unique(&mut next.visited_steps, next.current_step);
    next
}

/// Nearest step before `lost` in the old sequence that is still visible,
/// falling back to the first visible step.
fn reanchor(old_sequence: &[StepId], new_sequence: &[StepId], lost: StepId) -> StepId {
    let earlier = match position_of(old_sequence, lost) {
        Some(index) => &old_sequence[..index],
        None => &[][..],
    };

    earlier
        .iter()
        .rev()
        .copied()
        .find(|step| new_sequence.contains(step))
        .or_else(|| new_sequence.first().copied())
        .unwrap_or(StepId::Welcome)
}

fn push_unique(steps: &mut Vec<StepId>, step: StepId) {
    if !steps.contains(&step) {
        steps.push(step);
    }
}

fn dedup(steps: &[StepId]) -> Vec<StepId> {
    let mut unique = Vec::with_capacity(steps.len());
    for step in steps {
        push_unique(&mut unique, *step);
    }
    unique
}

/// Owns the registry and the current state; the single place actions are
/// applied.
#[derive(Debug, Clone)]
pub struct WizardStore {
    registry: StepRegistry,
    state: WizardState,
}

impl Default for WizardStore {
    fn default() -> Self {
        Self::new(StepRegistry::standard())
    }
}

impl WizardStore {
    pub fn new(registry: StepRegistry) -> Self {
        let initial = WizardState::default();
        let state = derive(&registry, &initial, initial.clone());
        Self { registry, state }
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn dispatch(&mut self, action: WizardAction) -> Result<&WizardState, TransitionError> {
        let name = action.name();
        match reduce(&self.registry, &self.state, action) {
            Ok(next) => {
                self.state = next;
                tracing::trace!(action = name, current = %self.state.current_step, "dispatched");
                Ok(&self.state)
            }
            Err(error) => {
                tracing::debug!(action = name, %error, "rejected wizard transition");
                Err(error)
            }
        }
    }
}
