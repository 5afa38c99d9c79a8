use crate::registry::StepRegistry;
use crate::step::{StepId, WizardFlags};

/// Ordered list of steps the user can see under `flags`.
///
/// `businessQuestion` is the pivot: colours and fonts land before it when the
/// user already owns that asset and after it otherwise.
pub fn compute_visible_steps(registry: &StepRegistry, flags: &WizardFlags) -> Vec<StepId> {
    if flags.path.is_none() {
        return vec![StepId::Welcome];
    }

    let mut sequence = vec![StepId::Welcome];

    if flags.has_brand_guide {
        sequence.push(StepId::BrandGuide);
    }
    if flags.has_logo {
        sequence.push(StepId::Logo);
    }

    let mut before_business = Vec::with_capacity(2);
    let mut after_business = Vec::with_capacity(2);

    for (step, owned) in [
        (StepId::Colours, flags.has_colours),
        (StepId::Fonts, flags.has_fonts),
    ] {
        if owned {
            before_business.push(step);
        } else {
            after_business.push(step);
        }
    }

    sequence.extend(before_business);
    sequence.push(StepId::BusinessQuestion);
    sequence.extend(after_business);
    sequence.push(StepId::Icons);
    sequence.push(StepId::Review);

    sequence
        .into_iter()
        .filter(|step| registry.is_applicable(*step, flags))
        .collect()
}

pub fn position_of(sequence: &[StepId], step: StepId) -> Option<usize> {
    sequence.iter().position(|candidate| *candidate == step)
}

/// Checks the ordering invariants of a computed sequence against the flags
/// that produced it.
pub fn ordering_is_consistent(flags: &WizardFlags, sequence: &[StepId]) -> bool {
    if sequence.first() != Some(&StepId::Welcome) {
        return false;
    }

    if flags.path.is_none() {
        return sequence.len() == 1;
    }

    let len = sequence.len();
    if len < 3 || sequence[len - 1] != StepId::Review || sequence[len - 2] != StepId::Icons {
        return false;
    }

    let Some(pivot) = position_of(sequence, StepId::BusinessQuestion) else {
        return false;
    };

    [
        (StepId::Colours, flags.has_colours),
        (StepId::Fonts, flags.has_fonts),
    ]
    .into_iter()
    .all(|(step, owned)| match position_of(sequence, step) {
        Some(index) => (index < pivot) == owned,
        None => false,
    })
}
