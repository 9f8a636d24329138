use tracing::info;

use crate::{
    ConvertedAction, ConvertedProblem, EffectTiming, GroundAction, GroundProblem, InstantAction,
    SplitAction, Timing,
};

/// Rewrite every durative ground action as a start/end event pair.
///
/// The start event checks start and overall preconditions and applies start
/// effects. The end event re-checks overall and end preconditions, applies end
/// effects and resolves every probabilistic group. Zero-duration actions stay a
/// single event carrying everything, start effects before end effects.
pub fn convert(problem: &GroundProblem) -> ConvertedProblem {
    let actions: Vec<ConvertedAction> = problem.actions.iter().map(convert_action).collect();

    let converted = ConvertedProblem {
        core: problem.core.clone(),
        actions,
    };
    info!(
        domain = %converted.core.name,
        actions = converted.actions.len(),
        events = converted.instantaneous_action_count(),
        "converted durative actions"
    );
    converted
}

fn convert_action(action: &GroundAction) -> ConvertedAction {
    let resources = action.resources.clone();
    let combinable = action.combinable;

    if action.duration == 0 {
        let mut effects = action.effects_at(EffectTiming::Start);
        effects.extend(action.effects_at(EffectTiming::End));
        return ConvertedAction::Instant {
            action: InstantAction {
                name: action.name.clone(),
                preconditions: action.preconditions_at(&[Timing::Start, Timing::Overall, Timing::End]),
                effects,
                groups: action.groups.clone(),
            },
            resources,
            combinable,
        };
    }

    let start = InstantAction {
        name: format!("{}@start", action.name),
        preconditions: action.preconditions_at(&[Timing::Start, Timing::Overall]),
        effects: action.effects_at(EffectTiming::Start),
        groups: Vec::new(),
    };
    let end = InstantAction {
        name: format!("{}@end", action.name),
        preconditions: action.preconditions_at(&[Timing::Overall, Timing::End]),
        effects: action.effects_at(EffectTiming::End),
        groups: action.groups.clone(),
    };

    ConvertedAction::Split {
        action: SplitAction {
            name: action.name.clone(),
            start,
            end,
            duration: action.duration,
        },
        resources,
        combinable,
    }
}
