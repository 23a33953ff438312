use super::assembly::{self, DumpRequest};
use super::result::{DockModel, DockResult, InterfaceScore, Provenance, ResidueBounds};
use crate::core::io::traits::StructureDumper;
use crate::core::models::body::Body;
use crate::core::models::symmetry::Symmetry;
use crate::core::models::xform::{Xform, to_matrix};
use crate::core::sampling::xform_hier::XformHier;
use crate::core::sampling::{Hierarchy, HierarchyError};
use crate::core::scoring::table::ScoreTable;
use crate::engine::config::SearchConfig;
use crate::engine::error::EngineError;
use crate::engine::evaluators::plug::{FIXED_OLIG_SENTINEL, PLUG_INTERFACES, PlugEvaluator};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::redundancy::{filter_redundancy, strided_points};
use crate::engine::search::hier_search;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// A monomer to dock into the hole of a cyclic oligomer.
///
/// `hole` is the complete oligomer, centered on the z axis, and stays at the identity.
pub struct PlugProblem<'a, B: Body, S: ScoreTable> {
    pub plug: &'a B,
    pub hole: &'a B,
    pub hole_sym: Symmetry,
    pub score: &'a S,
}

/// Default sampling box for a plug: wide enough for the plug to sweep the whole hole, tall
/// enough to cover the hole's extent along z, at the score table's base resolution.
pub fn plug_sample_hierarchy<B: Body, S: ScoreTable>(
    plug: &B,
    hole: &B,
    score: &S,
) -> Result<XformHier, HierarchyError> {
    let (cart_resl, ori_resl) = score.base_resolution();
    let radius = hole.rg_xy().max(2.0 * plug.radius_max());
    let nxy = ((2.0 * radius / cart_resl).ceil() as u64).max(1);
    let half_xy = nxy as f32 * cart_resl / 2.0;
    let nz = ((3.0 * hole.rg_z() / cart_resl).ceil() as u64).max(1);
    let half_z = nz as f32 * cart_resl / 2.0;

    let hier = XformHier::new(
        [-half_xy, -half_xy, -half_z],
        [half_xy, half_xy, half_z],
        [nxy, nxy, nz],
        ori_resl,
    )?;
    info!(
        size = hier.size(0)?,
        cart_bs = ?hier.cart_bs(),
        ori_resl = hier.ori_resolution(0),
        lower = ?hier.lower(),
        upper = ?hier.upper(),
        "Plug sampling hierarchy ready."
    );
    Ok(hier)
}

#[instrument(skip_all, name = "plug_workflow")]
pub fn run<B: Body, S: ScoreTable>(
    problem: &PlugProblem<'_, B, S>,
    sampler: Option<XformHier>,
    config: &SearchConfig,
    dumper: Option<&dyn StructureDumper<B>>,
    reporter: &ProgressReporter,
) -> Result<DockResult, EngineError> {
    let started = Instant::now();
    let PlugProblem {
        plug,
        hole,
        hole_sym,
        score,
    } = *problem;

    // === Phase 0: Setup ===
    reporter.report(Progress::PhaseStart {
        name: "Setup".into(),
    });
    config.validate()?;
    let sampler = match sampler {
        Some(s) => s,
        None => plug_sample_hierarchy(plug, hole, score)?,
    };
    let nresl = config.resolve_nresl(score.nresl(), sampler.depth())?;
    let evaluator = PlugEvaluator::new(plug, hole, &hole_sym, score, config);
    info!(
        plug = plug.label(),
        hole = hole.label(),
        sym = %hole_sym,
        nresl,
        fixed_olig = config.plug_fixed_olig,
        "Starting plug docking."
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
        |x| strided_points(plug, x),
        config.max_bb_redundancy,
        config.max_cluster,
    )?;

    let last = nresl - 1;
    let mut models = Vec::with_capacity(ibest.len());
    for (rank, &i) in ibest.iter().enumerate() {
        let xform = batch.placements()[i];
        let (mut interfaces, ranges) =
            assembly::breakdown(&evaluator, &xform, last, &config.weights)?;
        if config.plug_fixed_olig {
            interfaces[0] = InterfaceScore::sentinel(PLUG_INTERFACES[0], FIXED_OLIG_SENTINEL);
        }
        models.push(DockModel {
            model: rank,
            score: batch.scores()[i],
            xforms: vec![to_matrix(&xform)],
            interfaces,
            bounds: vec![
                ResidueBounds::new(plug.label(), ranges[0]),
                assembly::full_bounds(hole),
            ],
        });
    }
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Debug output ===
    let dump_seconds = match dumper {
        Some(dumper) if config.ndump() > 0 => {
            let requests = models
                .iter()
                .take(config.ndump())
                .filter_map(|model| {
                    let xform = model.transform()?;
                    let mut placed = plug.clone();
                    placed.move_to(&xform);
                    let mut fixed = hole.clone();
                    fixed.move_to(&Xform::identity());
                    Some(DumpRequest {
                        rank: model.model,
                        score: model.score,
                        bodies: vec![placed, fixed],
                        frames: vec![hole_sym.frames(), vec![Xform::identity()]],
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
        rate = outcome.stats.total_evaluated() as f64 / elapsed.max(f64::EPSILON),
        dump_seconds,
        "Plug search statistics."
    );
    info!(
        models = models.len(),
        best = models.first().map(|m| m.score),
        elapsed,
        "Plug docking finished."
    );

    Ok(DockResult {
        provenance: Provenance {
            protocol: "plug".into(),
            symmetry: hole_sym.name(),
            bodies: vec![plug.label().to_string(), hole.label().to_string()],
            nresl,
            elapsed_seconds: elapsed,
            dump_seconds,
            config: config.clone(),
            stats: outcome.stats,
        },
        models,
    })
}
