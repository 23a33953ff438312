use super::assembly::{self, DumpRequest};
use super::result::{DockModel, DockResult, Provenance, ResidueBounds};
use crate::core::io::traits::StructureDumper;
use crate::core::models::body::{Body, TrimDirection};
use crate::core::models::cage::CageArch;
use crate::core::models::xform::{Xform, to_matrix};
use crate::core::sampling::multi_axis_hier::{AxisComponent, MultiAxisHier};
use crate::core::sampling::{Hierarchy, HierarchyError};
use crate::core::scoring::table::ScoreTable;
use crate::engine::config::SearchConfig;
use crate::engine::error::EngineError;
use crate::engine::evaluators::cage::CageEvaluator;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::redundancy::{filter_redundancy, strided_points};
use crate::engine::search::hier_search;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// One component of a cage: the monomer of a cyclic oligomer built about its local z axis.
pub struct CageComponent<'a, B: Body> {
    pub body: &'a B,
    /// Terminus this component is trimmed from; the configured direction when unset.
    pub trim_direction: Option<TrimDirection>,
}

impl<'a, B: Body> CageComponent<'a, B> {
    pub fn new(body: &'a B) -> Self {
        Self {
            body,
            trim_direction: None,
        }
    }

    pub fn with_trim_direction(mut self, direction: TrimDirection) -> Self {
        self.trim_direction = Some(direction);
        self
    }
}

/// Two or three components to assemble into a closed cage of architecture `arch`.
pub struct CageProblem<'a, B: Body, S: ScoreTable> {
    pub arch: CageArch,
    pub components: Vec<CageComponent<'a, B>>,
    pub score: &'a S,
}

/// Default sampler for a cage: every component slides along its axis from the cage center out
/// to twice the summed body radii, spins through one period of its own symmetry and is tried
/// both ways up.
pub fn cage_sample_hierarchy<B: Body, S: ScoreTable>(
    problem: &CageProblem<'_, B, S>,
) -> Result<MultiAxisHier, HierarchyError> {
    let (cart_resl, ori_resl) = problem.score.base_resolution();
    let reach: f32 = problem.components.iter().map(|c| c.body.radius_max()).sum();
    let ub = (2.0 * reach).max(cart_resl);
    let components: Vec<AxisComponent> = problem
        .arch
        .nfolds()
        .iter()
        .zip(problem.arch.axes())
        .map(|(&nfold, axis)| AxisComponent {
            nfold,
            axis,
            lb: 0.0,
            ub,
            flip: true,
        })
        .collect();
    let hier = MultiAxisHier::new(&components, cart_resl, ori_resl)?;
    info!(
        arch = %problem.arch,
        size = hier.size(0)?,
        nchild = hier.nchild(),
        upper = ub,
        "Cage sampling hierarchy ready."
    );
    Ok(hier)
}

#[instrument(skip_all, name = "cage_workflow")]
pub fn run<B: Body, S: ScoreTable>(
    problem: &CageProblem<'_, B, S>,
    sampler: Option<MultiAxisHier>,
    config: &SearchConfig,
    dumper: Option<&dyn StructureDumper<B>>,
    reporter: &ProgressReporter,
) -> Result<DockResult, EngineError> {
    let started = Instant::now();
    let CageProblem {
        arch,
        components,
        score,
    } = problem;
    let bodies: Vec<&B> = components.iter().map(|c| c.body).collect();
    let directions: Vec<Option<TrimDirection>> =
        components.iter().map(|c| c.trim_direction).collect();

    // === Phase 0: Setup ===
    reporter.report(Progress::PhaseStart {
        name: "Setup".into(),
    });
    config.validate()?;
    let evaluator = CageEvaluator::new(arch, &bodies, &directions, *score, config)?;
    let sampler = match sampler {
        Some(s) => s,
        None => cage_sample_hierarchy(problem)?,
    };
    if sampler.ncomponents() != bodies.len() {
        return Err(EngineError::Internal(format!(
            "sampler moves {} components but {arch} has {}",
            sampler.ncomponents(),
            bodies.len()
        )));
    }
    let nresl = config.resolve_nresl(score.nresl(), sampler.depth())?;
    info!(
        arch = %arch,
        bodies = ?bodies.iter().map(|b| b.label()).collect::<Vec<_>>(),
        trimmable = %config.trimmable_components,
        nresl,
        "Starting cage docking."
    );
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Hierarchical search ===
    let outcome = hier_search(&sampler, &evaluator, config, nresl, reporter)?;
    let batch = &outcome.batch;

    // === Phase 2: Redundancy filter and breakdown ===
    reporter.report(Progress::PhaseStart {
        name: "Assembly".into(),
    });
    let ibest = filter_redundancy(
        batch.placements(),
        batch.scores(),
        |xs: &Vec<Xform>| {
            xs.iter()
                .zip(&bodies)
                .flat_map(|(x, body)| strided_points(*body, x))
                .collect()
        },
        config.max_bb_redundancy,
        config.max_cluster,
    )?;

    let last = nresl - 1;
    let mut models = Vec::with_capacity(ibest.len());
    for (rank, &i) in ibest.iter().enumerate() {
        let placement = &batch.placements()[i];
        let (interfaces, ranges) =
            assembly::breakdown(&evaluator, placement, last, &config.weights)?;
        models.push(DockModel {
            model: rank,
            score: batch.scores()[i],
            xforms: placement.iter().map(to_matrix).collect(),
            interfaces,
            bounds: bodies
                .iter()
                .zip(&ranges)
                .map(|(body, &range)| ResidueBounds::new(body.label(), range))
                .collect(),
        });
    }
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Structure output ===
    let dump_seconds = match dumper {
        Some(dumper) if config.ndump() > 0 => {
            let frames = evaluator.frames().to_vec();
            let requests = models
                .iter()
                .take(config.ndump())
                .filter_map(|model| {
                    let placed = bodies
                        .iter()
                        .zip(model.transforms()?)
                        .map(|(body, x)| {
                            let mut copy = (*body).clone();
                            copy.move_to(&x);
                            copy
                        })
                        .collect();
                    Some(DumpRequest {
                        rank: model.model,
                        score: model.score,
                        bodies: placed,
                        frames: vec![frames.clone(); bodies.len()],
                        bounds: model.bounds.iter().map(ResidueBounds::range).collect(),
                    })
                })
                .collect();
            assembly::dump_models(dumper, &config.output_prefix, requests)
        }
        _ => 0.0,
    };

    let elapsed = started.elapsed().as_secs_f64();
    debug!(
        evaluated = outcome.stats.total_evaluated(),
        dump_seconds,
        "Cage search statistics."
    );
    info!(
        models = models.len(),
        best = models.first().map(|m| m.score),
        elapsed,
        "Cage docking finished."
    );

    Ok(DockResult {
        provenance: Provenance {
            protocol: "cage".into(),
            symmetry: arch.name(),
            bodies: bodies.iter().map(|b| b.label().to_string()).collect(),
            nresl,
            elapsed_seconds: elapsed,
            dump_seconds,
            config: config.clone(),
            stats: outcome.stats,
        },
        models,
    })
}
