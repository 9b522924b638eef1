use std::sync::Arc;

use crate::domain::instance::InstanceData;
use crate::domain::schedule::Objective;
use crate::error::{Error, Result};
use crate::fitness::calculator::FitnessCalculator;
use crate::fitness::insertion::InsertionFitness;
use crate::fitness::multi::{EvaluationHistory, MultiFitness};
use crate::fitness::rank::{HeuristicFitness, RankFitness};
use crate::fitness::simple::SimpleFitness;
use crate::scheduling::context::SchedulingContext;
use crate::scheduling::timeline::SchedulingMode;

/// Which ensemble a `multi*` name maps to.
enum Ensemble {
    /// Both pools, objective from the arbiter.
    Both,
    MakespanOnly,
    /// Energy pool with HEFT-energy instead of FVLT, objective from the arbiter.
    EnergyNoFvlt,
    EnergyOnly,
}

/// Maps a fitness name to a calculator built on a fresh `SchedulingContext` for `instance`.
///
/// Name variants that only differ in the optimizer they were used with (`-spea2`, `-ibea`, `-moaco`, ...)
/// map to the same calculator. Unknown names fail with `Error::UnsupportedFitness`.
pub fn get_fitness(name: &str, instance: Arc<InstanceData>, history: Option<EvaluationHistory>) -> Result<Box<dyn FitnessCalculator>> {
    build_fitness(name, Arc::new(SchedulingContext::new(instance)), history, None)
}

/// Like `get_fitness`, reusing an existing context.
///
/// `objective_override`, when set, replaces the override implied by a `multi*` name. It is ignored for
/// single calculators.
pub fn build_fitness(
    name: &str,
    ctx: Arc<SchedulingContext>,
    history: Option<EvaluationHistory>,
    objective_override: Option<Objective>,
) -> Result<Box<dyn FitnessCalculator>> {
    use SchedulingMode::{Active, SemiActive};

    let calculator: Box<dyn FitnessCalculator> = match name {
        "simple" | "simple-mono" | "simple-makespan" | "simple-makespan-mono" | "simple-energy" | "simple-energy-mono" | "simple-ibea"
        | "simple-spea2" | "simple-moheft" | "simple-moaco" | "simple-smpso" => Box::new(SimpleFitness::new(ctx)),

        "heft" | "heft-makespan-mono" | "heft-spea2" | "heft-ibea" | "heft-moaco" | "heft-smpso" => Box::new(InsertionFitness::heft(ctx)),

        "heft-energy-active" | "heft-energy-mono-active" => Box::new(InsertionFitness::heft_energy(ctx, Active)),
        "heft-energy-semi-active" | "heft-energy-mono-semi-active" => Box::new(InsertionFitness::heft_energy(ctx, SemiActive)),

        "min-energy-UM-active"
        | "min-energy-UM-mono-active"
        | "min-energy-UM-active-spea2"
        | "min-energy-UM-active-ibea"
        | "min-energy-UM-active-moaco"
        | "min-energy-UM-active-smpso" => Box::new(InsertionFitness::min_energy_um(ctx, Active)),
        "min-energy-UM-semi-active" | "min-energy-UM-mono-semi-active" => Box::new(InsertionFitness::min_energy_um(ctx, SemiActive)),

        "fvlt-me-active" | "fvlt-me-mono-active" | "fvlt-me-active-spea2" | "fvlt-me-active-ibea" | "fvlt-me-active-moaco"
        | "fvlt-me-active-smpso" => Box::new(InsertionFitness::fast_for_large_tasks(ctx, Active)),
        "fvlt-me-semi-active" | "fvlt-me-mono-semi-active" => Box::new(InsertionFitness::fast_for_large_tasks(ctx, SemiActive)),

        "rank" | "rank-makespan" | "rank-makespan-mono" | "rank-spea2" | "rank-ibea" | "rank-moaco" | "rank-smpso" => {
            Box::new(RankFitness::new(ctx))
        }

        "heuristic" => Box::new(HeuristicFitness::new(ctx)),

        "multi"
        | "multi-double-eval"
        | "multi-spea2"
        | "multi-ibea"
        | "multi-moaco"
        | "multi-smpso"
        | "multi-pop-50-prob-0.7"
        | "multi-pop-50-prob-0.9"
        | "multi-pop-50-prob-1.0"
        | "multi-pop-100-prob-0.7"
        | "multi-pop-100-prob-0.9"
        | "multi-pop-100-prob-1.0"
        | "multi-pop-150-prob-0.7"
        | "multi-pop-150-prob-0.9"
        | "multi-pop-150-prob-1.0" => Box::new(ensemble(Ensemble::Both, ctx, history, objective_override)),

        "multi-makespan" | "multi-makespan-mono" | "multi-makespan-spea2" | "multi-makespan-ibea" | "multi-makespan-moaco"
        | "multi-makespan-smpso" => Box::new(ensemble(Ensemble::MakespanOnly, ctx, history, objective_override)),

        "multi-energy-no-fvlt" | "multi-energy-mono-no-fvlt" => Box::new(ensemble(Ensemble::EnergyNoFvlt, ctx, history, objective_override)),

        "multi-energy" | "multi-energy-mono" | "multi-energy-spea2" | "multi-energy-ibea" | "multi-energy-moaco" | "multi-energy-smpso" => {
            Box::new(ensemble(Ensemble::EnergyOnly, ctx, history, objective_override))
        }

        other => {
            log::error!("Requested unknown fitness function '{}'.", other);
            return Err(Error::UnsupportedFitness(other.to_string()));
        }
    };

    if objective_override.is_some() && !name.starts_with("multi") {
        log::warn!("Objective override ignored for single calculator '{}'.", name);
    }

    log::info!("Fitness '{}' resolved to calculator '{}'.", name, calculator.fitness_name());
    Ok(calculator)
}

fn makespan_pool(ctx: &Arc<SchedulingContext>) -> Vec<Box<dyn FitnessCalculator>> {
    vec![
        Box::new(SimpleFitness::new(Arc::clone(ctx))),
        Box::new(InsertionFitness::heft(Arc::clone(ctx))),
        Box::new(RankFitness::new(Arc::clone(ctx))),
    ]
}

fn energy_pool(ctx: &Arc<SchedulingContext>) -> Vec<Box<dyn FitnessCalculator>> {
    vec![
        Box::new(SimpleFitness::new(Arc::clone(ctx))),
        Box::new(InsertionFitness::min_energy_um(Arc::clone(ctx), SchedulingMode::Active)),
        Box::new(InsertionFitness::fast_for_large_tasks(Arc::clone(ctx), SchedulingMode::Active)),
    ]
}

fn ensemble(kind: Ensemble, ctx: Arc<SchedulingContext>, history: Option<EvaluationHistory>, objective_override: Option<Objective>) -> MultiFitness {
    let (makespan, energy, implied_override) = match kind {
        Ensemble::Both => (makespan_pool(&ctx), energy_pool(&ctx), None),
        Ensemble::MakespanOnly => (makespan_pool(&ctx), Vec::new(), Some(Objective::Makespan)),
        Ensemble::EnergyNoFvlt => {
            let pool: Vec<Box<dyn FitnessCalculator>> = vec![
                Box::new(SimpleFitness::new(Arc::clone(&ctx))),
                Box::new(InsertionFitness::heft_energy(Arc::clone(&ctx), SchedulingMode::Active)),
                Box::new(InsertionFitness::min_energy_um(Arc::clone(&ctx), SchedulingMode::Active)),
            ];
            (Vec::new(), pool, None)
        }
        Ensemble::EnergyOnly => (Vec::new(), energy_pool(&ctx), Some(Objective::Energy)),
    };

    MultiFitness::new(ctx, makespan, energy, objective_override.or(implied_override), history)
}
