use std::time::Instant;

use serde::Serialize;
use tempotree_mdp::{
    CacheKey, CacheStatus, DomainKind, EvaluationSummary, Mdp, RunConfig, compile_combination,
    compile_split, domains, evaluate, load_or_build,
};
use tracing::info;

use crate::output::{print_fields, print_json};

/// Sizes of every compilation stage of one domain.
#[derive(Debug, Serialize)]
pub struct CompileReport {
    pub domain: String,
    pub kind: DomainKind,
    pub deadline: u32,
    pub actions: usize,
    pub events: usize,
    pub combinations: Option<usize>,
    pub propositions: usize,
    pub mdp_actions: usize,
    pub cache: Option<CacheStatus>,
    pub compile_secs: f64,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub compile: CompileReport,
    pub summary: EvaluationSummary,
}

/// Build the configured domain and wrap it as a split or combination MDP.
pub fn compile(config: &RunConfig, use_cache: bool) -> anyhow::Result<(Mdp, CompileReport)> {
    let started = Instant::now();
    let domain = domains::build(
        &config.domain,
        config.domain_type,
        config.deadline,
        config.object_amount,
        config.garbage_amount,
    )?;

    let (mdp, split, combinations, cache) = match config.domain_type {
        DomainKind::Regular | DomainKind::RegularAsBaseline => {
            let bundle = compile_split(&domain)?;
            let mdp = Mdp::build(&bundle.converted, config.discount)?;
            (mdp, bundle.converted, None, None)
        }
        DomainKind::Combination => {
            let (bundle, cache) = if use_cache {
                let key = CacheKey::for_domain(&domain);
                let (bundle, status) =
                    load_or_build(config.cache_dir(), &key, config.deadline, || compile_combination(&domain))?;
                (bundle, Some(status))
            } else {
                (compile_combination(&domain)?, None)
            };
            let mdp = Mdp::build(&bundle.combination, config.discount)?;
            let combinations = bundle.combination.combinations.len();
            (mdp, bundle.split, Some(combinations), cache)
        }
    };

    let report = CompileReport {
        domain: domain.name().to_string(),
        kind: config.domain_type,
        deadline: mdp.deadline(),
        actions: split.actions.len(),
        events: split.instantaneous_action_count(),
        combinations,
        propositions: split.core.proposition_count(),
        mdp_actions: mdp.action_count(),
        cache,
        compile_secs: started.elapsed().as_secs_f64(),
    };
    Ok((mdp, report))
}

pub fn run_compile(config: &RunConfig, use_cache: bool, json: bool) -> anyhow::Result<()> {
    let (_, report) = compile(config, use_cache)?;
    if json {
        return print_json(&report);
    }
    print_compile_report(&report);
    Ok(())
}

pub fn run_plan(config: &RunConfig, use_cache: bool, json: bool) -> anyhow::Result<()> {
    let (mdp, compile) = compile(config, use_cache)?;
    info!(
        domain = %compile.domain,
        kind = %compile.kind,
        runs = config.runs,
        solver = %config.solver,
        search_time_secs = config.search_time_secs,
        search_depth = config.search_depth,
        "starting evaluation"
    );

    let summary = evaluate(config.runs, &mdp, &config.plan_params())?;
    let report = RunReport { compile, summary };
    if json {
        return print_json(&report);
    }

    print_compile_report(&report.compile);
    let summary = &report.summary;
    print_fields(
        "evaluation",
        &[
            ("runs", summary.runs.to_string()),
            ("successes", summary.successes.to_string()),
            ("success rate", format!("{:.3}", summary.success_rate)),
            ("mean elapsed", format!("{:.2}", summary.mean_elapsed)),
            ("mean steps", format!("{:.2}", summary.mean_steps)),
            ("mean wall time", format!("{:.2}s", summary.mean_wall_time_secs)),
            ("deadline exceeded", summary.deadline_exceeded.to_string()),
            ("no applicable action", summary.no_applicable_action.to_string()),
            ("horizon elapsed", summary.horizon_elapsed.to_string()),
        ],
    );
    Ok(())
}

fn print_compile_report(report: &CompileReport) {
    let mut rows = vec![
        ("domain", report.domain.clone()),
        ("kind", report.kind.to_string()),
        ("deadline", report.deadline.to_string()),
        ("actions", report.actions.to_string()),
        ("events", report.events.to_string()),
    ];
    if let Some(combinations) = report.combinations {
        rows.push(("combinations", combinations.to_string()));
    }
    rows.push(("propositions", report.propositions.to_string()));
    rows.push(("mdp actions", report.mdp_actions.to_string()));
    if let Some(cache) = report.cache {
        let status = match cache {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
        };
        rows.push(("cache", status.to_string()));
    }
    rows.push(("compile time", format!("{:.3}s", report.compile_secs)));
    print_fields("compilation", &rows);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_compile_reports_split_sizes() {
        let config = RunConfig::default();
        let (mdp, report) = compile(&config, false).expect("compile");

        assert_eq!(report.domain, "full_conc");
        assert_eq!(report.actions, 15);
        assert_eq!(report.events, 30);
        assert_eq!(report.combinations, None);
        assert_eq!(report.mdp_actions, 16);
        assert_eq!(mdp.deadline(), 20);
    }

    #[test]
    fn combination_compile_uses_cache_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = RunConfig {
            domain: "stuck_car_1o".to_string(),
            domain_type: DomainKind::Combination,
            cache_dir: dir.path().to_path_buf(),
            ..RunConfig::default()
        };

        let (_, first) = compile(&config, true).expect("compile");
        let (_, second) = compile(&config, true).expect("compile");
        assert_eq!(first.cache, Some(CacheStatus::Miss));
        assert_eq!(second.cache, Some(CacheStatus::Hit));
        assert_eq!(second.combinations, Some(2));
        assert_eq!(second.mdp_actions, 9);
        assert!(dir.path().join("stuck_car_1o_comb.yaml").exists());
    }
}
