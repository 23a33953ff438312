use super::assembly::{self, DumpRequest};
use super::result::{DockModel, DockResult, Provenance, ResidueBounds};
use crate::core::io::traits::StructureDumper;
use crate::core::models::body::Body;
use crate::core::models::symmetry::Symmetry;
use crate::core::models::xform::to_matrix;
use crate::core::sampling::ori_cart1_hier::OriCart1Hier;
use crate::core::sampling::{Hierarchy, HierarchyError};
use crate::core::scoring::table::ScoreTable;
use crate::engine::config::SearchConfig;
use crate::engine::error::EngineError;
use crate::engine::evaluators::cyclic::CyclicEvaluator;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::redundancy::{filter_redundancy, strided_points};
use crate::engine::search::hier_search;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Default sampler for a cyclic oligomer: every orientation, at offsets from the symmetry axis
/// along x up to twice the body radius.
pub fn cyclic_sample_hierarchy<B: Body, S: ScoreTable>(
    body: &B,
    score: &S,
) -> Result<OriCart1Hier, HierarchyError> {
    let (cart_resl, ori_resl) = score.base_resolution();
    let nx = ((2.0 * body.radius_max() / cart_resl).ceil() as u64).max(1);
    let hier = OriCart1Hier::new(0.0, nx as f32 * cart_resl, nx, ori_resl)?;
    info!(
        size = hier.size(0)?,
        cart_ncell = hier.cart_ncell(),
        ori_resl = hier.ori_resolution(0),
        upper = hier.upper(),
        "Cyclic sampling hierarchy ready."
    );
    Ok(hier)
}

#[instrument(skip_all, name = "cyclic_workflow")]
pub fn run<B: Body, S: ScoreTable>(
    body: &B,
    sym: &Symmetry,
    score: &S,
    sampler: Option<OriCart1Hier>,
    config: &SearchConfig,
    dumper: Option<&dyn StructureDumper<B>>,
    reporter: &ProgressReporter,
) -> Result<DockResult, EngineError> {
    let started = Instant::now();

    reporter.report(Progress::PhaseStart {
        name: "Setup".into(),
    });
    config.validate()?;
    let sampler = match sampler {
        Some(s) => s,
        None => cyclic_sample_hierarchy(body, score)?,
    };
    let nresl = config.resolve_nresl(score.nresl(), sampler.depth())?;
    let evaluator = CyclicEvaluator::new(body, sym, score, config);
    info!(body = body.label(), sym = %sym, nresl, "Starting cyclic docking.");
    reporter.report(Progress::PhaseFinish);

    let outcome = hier_search(&sampler, &evaluator, config, nresl, reporter)?;
    let batch = &outcome.batch;

    reporter.report(Progress::PhaseStart {
        name: "Assembly".into(),
    });
    let ibest = filter_redundancy(
        batch.placements(),
        batch.scores(),
        |x| strided_points(body, x),
        config.max_bb_redundancy,
        config.max_cluster,
    )?;
    let last = nresl - 1;
    let mut models = Vec::with_capacity(ibest.len());
    for (rank, &i) in ibest.iter().enumerate() {
        let xform = batch.placements()[i];
        let (interfaces, ranges) = assembly::breakdown(&evaluator, &xform, last, &config.weights)?;
        models.push(DockModel {
            model: rank,
            score: batch.scores()[i],
            xforms: vec![to_matrix(&xform)],
            interfaces,
            bounds: vec![ResidueBounds::new(body.label(), ranges[0])],
        });
    }
    reporter.report(Progress::PhaseFinish);

    let dump_seconds = match dumper {
        Some(dumper) if config.ndump() > 0 => {
            let requests = models
                .iter()
                .take(config.ndump())
                .filter_map(|model| {
                    let mut placed = body.clone();
                    placed.move_to(&model.transform()?);
                    Some(DumpRequest {
                        rank: model.model,
                        score: model.score,
                        bodies: vec![placed],
                        frames: vec![sym.frames()],
                        bounds: vec![model.bounds[0].range()],
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
        "Cyclic search statistics."
    );
    info!(
        models = models.len(),
        best = models.first().map(|m| m.score),
        elapsed,
        "Cyclic docking finished."
    );

    Ok(DockResult {
        provenance: Provenance {
            protocol: "cyclic".into(),
            symmetry: sym.name(),
            bodies: vec![body.label().to_string()],
            nresl,
            elapsed_seconds: elapsed,
            dump_seconds,
            config: config.clone(),
            stats: outcome.stats,
        },
        models,
    })
}
