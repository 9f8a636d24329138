use std::time::Instant;

use tracing::info;

use crate::{
    CombinationBundle, ConvertedProblem, Domain, GroundProblem, MdpError, combine, convert,
    drop_uncombinable, ground,
};

/// Output of the split-action pipeline.
#[derive(Debug, Clone)]
pub struct SplitBundle {
    pub ground: GroundProblem,
    pub converted: ConvertedProblem,
}

/// Ground and convert `domain` into start/end events.
pub fn compile_split(domain: &Domain) -> Result<SplitBundle, MdpError> {
    let started = Instant::now();
    let ground = ground(domain)?;
    let converted = convert(&ground);

    info!(
        domain = domain.name(),
        kind = %domain.kind(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        actions = ground.actions.len(),
        propositions = ground.core.proposition_count(),
        "compiled split problem"
    );
    Ok(SplitBundle { ground, converted })
}

/// Ground, convert and combine `domain`, then drop non-combinable combinations.
pub fn compile_combination(domain: &Domain) -> Result<CombinationBundle, MdpError> {
    let started = Instant::now();
    let SplitBundle { converted, .. } = compile_split(domain)?;
    let combination = drop_uncombinable(combine(&converted));

    info!(
        domain = domain.name(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        singles = combination.singles.len(),
        combinations = combination.combinations.len(),
        "compiled combination problem"
    );
    Ok(CombinationBundle {
        combination,
        split: converted,
    })
}
