use std::time::Instant;

use thiserror::Error;
use themewiz_core::state::{TransitionError, WizardAction};
use themewiz_core::step::{StepId, WizardFlags, WizardPath};

use crate::Wizard;
use crate::persistence::ChangeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("step '{0}' is not finished yet")]
    StepIncomplete(StepId),
    #[error("step '{0}' has not been reached yet; use next to continue")]
    NotVisited(StepId),
}

/// One row of the visible sequence as the UI shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub step: StepId,
    pub title: &'static str,
    pub position: usize,
    pub current: bool,
    pub visited: bool,
    pub completed: bool,
}

impl Wizard<'_> {
    pub(crate) fn apply(
        &mut self,
        action: WizardAction,
        kind: ChangeKind,
    ) -> Result<(), NavigationError> {
        self.store.dispatch(action)?;
        self.saves.schedule(kind, Instant::now());
        Ok(())
    }

    pub fn current_step(&self) -> StepId {
        self.state().current_step
    }

    pub fn flags(&self) -> WizardFlags {
        self.state().flags
    }

    pub fn path(&self) -> Option<WizardPath> {
        self.state().flags.path
    }

    pub fn visible_steps(&self) -> &[StepId] {
        self.state().available_steps()
    }

    pub fn step_history(&self) -> &[StepId] {
        &self.state().step_history
    }

    pub fn step_title(&self, step: StepId) -> &'static str {
        self.registry().title(step)
    }

    /// 1-based position of the current step and the number of visible steps.
    pub fn progress(&self) -> (usize, usize) {
        let state = self.state();
        let position = state.position(state.current_step).map_or(0, |index| index + 1);
        (position, state.step_sequence.len())
    }

    pub fn step_views(&self) -> Vec<StepView> {
        let state = self.state();
        state
            .step_sequence
            .iter()
            .enumerate()
            .map(|(index, step)| StepView {
                step: *step,
                title: self.step_title(*step),
                position: index + 1,
                current: *step == state.current_step,
                visited: state.is_visited(*step),
                completed: state.is_completed(*step),
            })
            .collect()
    }

    pub fn is_step_completed(&self, step: StepId) -> bool {
        self.state().is_completed(step)
    }

    pub fn is_step_visited(&self, step: StepId) -> bool {
        self.state().is_visited(step)
    }

    pub fn is_first_step(&self) -> bool {
        self.state().position(self.current_step()) == Some(0)
    }

    pub fn is_last_step(&self) -> bool {
        let state = self.state();
        state.step_sequence.last() == Some(&state.current_step)
    }

    pub fn can_advance(&self) -> bool {
        self.registry()
            .can_advance(self.current_step(), self.state())
    }

    pub fn can_navigate_next(&self) -> bool {
        !self.is_last_step() && self.can_advance()
    }

    pub fn can_navigate_previous(&self) -> bool {
        self.state()
            .position(self.current_step())
            .is_some_and(|index| index > 0)
    }

    /// Only steps already reached through `next` may be jumped to.
    pub fn can_jump_to(&self, step: StepId) -> bool {
        let state = self.state();
        state.is_available(step) && state.is_visited(step)
    }

    pub fn next(&mut self) -> Result<StepId, NavigationError> {
        let current = self.current_step();
        if current != StepId::Review && !self.can_advance() {
            return Err(NavigationError::StepIncomplete(current));
        }

        self.apply(WizardAction::NextStep, ChangeKind::Navigation)?;
        Ok(self.current_step())
    }

    pub fn previous(&mut self) -> Result<StepId, NavigationError> {
        self.apply(WizardAction::PreviousStep, ChangeKind::Navigation)?;
        Ok(self.current_step())
    }

    pub fn jump_to(&mut self, step: StepId) -> Result<StepId, NavigationError> {
        if !self.state().is_available(step) {
            return Err(TransitionError::InvalidTarget(step).into());
        }
        if !self.state().is_visited(step) {
            return Err(NavigationError::NotVisited(step));
        }

        self.apply(WizardAction::JumpToStep(step), ChangeKind::Navigation)?;
        Ok(self.current_step())
    }

    pub fn set_path(&mut self, path: Option<WizardPath>) -> Result<(), NavigationError> {
        self.apply(WizardAction::SetPath(path), ChangeKind::Navigation)
    }

    pub fn set_has_logo(&mut self, value: bool) -> Result<(), NavigationError> {
        self.apply(WizardAction::SetHasLogo(value), ChangeKind::Navigation)
    }

    pub fn set_has_colours(&mut self, value: bool) -> Result<(), NavigationError> {
        self.apply(WizardAction::SetHasColours(value), ChangeKind::Navigation)
    }

    pub fn set_has_fonts(&mut self, value: bool) -> Result<(), NavigationError> {
        self.apply(WizardAction::SetHasFonts(value), ChangeKind::Navigation)
    }

    pub fn set_has_brand_guide(&mut self, value: bool) -> Result<(), NavigationError> {
        self.apply(WizardAction::SetHasBrandGuide(value), ChangeKind::Navigation)
    }

    pub fn complete_step(&mut self, step: StepId) -> Result<(), NavigationError> {
        self.apply(WizardAction::CompleteStep(step), ChangeKind::Navigation)
    }

    pub fn uncomplete_step(&mut self, step: StepId) -> Result<(), NavigationError> {
        self.apply(WizardAction::UncompleteStep(step), ChangeKind::Navigation)
    }
}
