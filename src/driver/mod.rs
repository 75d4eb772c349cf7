//! Verification Driver — partitions the effective requirement list across
//! worker threads, checks each requirement against its own push/pop solver
//! frame, and assembles a [`crate::result::VerificationReport`].
//!
//! Each worker builds its own SMT encoding from scratch (a `z3::Context`
//! is not `Sync`, so one `Context`+`Solver` per rayon thread, never
//! shared) and iterates a contiguous slice of the requirement list,
//! returning its outcomes for the main thread to flatten back into
//! report order.

pub mod options;
pub mod requirement;

pub use options::VerificationOptions;
pub use requirement::{effective_requirements, split_into_slices, Requirement, RequirementBody};

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info_span};
use z3::ast::Datatype;
use z3::{Context, Params, SatResult, Solver};

use crate::domlr::{lower, polarity, DomlrSource, LowerCtx};
use crate::encoding::{self, EncodingOptions, SmtEncoding};
use crate::error::VerificationError;
use crate::im::IntermediateModel;
use crate::metamodel::{DomlVersion, Metamodel, MetamodelRegistry};
use crate::result::{render_template, with_incomplete_model_note, RequirementOutcome, VerificationReport, Verdict};

/// Run the full pipeline's final stage: check every effective requirement
/// against `im` and assemble the report. `registry`, `version` and `im`
/// are shared read-only across workers; each worker rebuilds its own
/// encoding rather than sharing one, since solver contexts are not
/// thread-safe.
pub fn run(
    registry: &MetamodelRegistry,
    version: DomlVersion,
    im: &IntermediateModel,
    domlr_source: &DomlrSource,
    options: &VerificationOptions,
) -> Result<VerificationReport, VerificationError> {
    let metamodel = registry.metamodel(version)?;
    let requirements = effective_requirements(version, domlr_source, options);
    let slices = split_into_slices(requirements, options.threads.get());
    let deadline = options.wall_clock_timeout.map(|d| Instant::now() + d);

    let span = info_span!("driver run", threads = options.threads.get(), requirements = slices.iter().map(Vec::len).sum::<usize>());
    let _enter = span.enter();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads.get())
        .build()
        .expect("a positive thread count always builds a pool");

    let outcomes: Vec<RequirementOutcome> = pool.install(|| {
        slices
            .into_par_iter()
            .flat_map(|slice| check_slice(registry, metamodel, version, im, slice, options, deadline))
            .collect()
    });

    Ok(VerificationReport::new(outcomes))
}

/// One worker's share of the work: a fresh `Context`/`Solver`/encoding,
/// then each requirement in `slice` checked in its own push/pop frame.
fn check_slice(
    registry: &MetamodelRegistry,
    metamodel: &Metamodel,
    version: DomlVersion,
    im: &IntermediateModel,
    slice: Vec<Requirement>,
    options: &VerificationOptions,
    deadline: Option<Instant>,
) -> Vec<RequirementOutcome> {
    let cfg = z3::Config::new();
    let ctx = Context::new(&cfg);
    let solver = Solver::new(&ctx);

    let encoding = match encoding::encode(
        &ctx,
        &solver,
        metamodel,
        registry,
        version,
        im,
        EncodingOptions { check_consistency: options.check_consistency },
    ) {
        Ok(encoding) => encoding,
        Err(err) => {
            return slice
                .into_iter()
                .map(|req| RequirementOutcome {
                    id: req.id,
                    description: req.description,
                    source: req.source,
                    verdict: Verdict::Undetermined,
                    diagnostic: Some(format!("could not build the SMT encoding: {err}")),
                })
                .collect();
        }
    };

    if let Some(timeout_ms) = options.per_query_timeout_ms {
        let mut params = Params::new(&ctx);
        params.set_u32("timeout", timeout_ms);
        solver.set_params(&params);
    }

    let lc = LowerCtx { ctx: &ctx, encoding: &encoding, registry, version };

    slice
        .into_iter()
        .map(|req| check_one(&ctx, &solver, &encoding, im, &lc, req, deadline))
        .collect()
}

fn check_one<'ctx>(
    ctx: &'ctx Context,
    solver: &Solver<'ctx>,
    encoding: &SmtEncoding<'ctx>,
    im: &IntermediateModel,
    lc: &LowerCtx<'_, 'ctx>,
    req: Requirement,
    deadline: Option<Instant>,
) -> RequirementOutcome {
    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
        debug!(id = %req.id, "skipped past wall-clock deadline");
        return RequirementOutcome {
            id: req.id,
            description: req.description,
            source: req.source,
            verdict: Verdict::Undetermined,
            diagnostic: Some("wall-clock timeout elapsed before this requirement was reached".to_string()),
        };
    }

    match req.body {
        RequirementBody::ConsistencyMeta => {
            solver.push();
            let result = solver.check();
            solver.pop(1);
            let verdict = Verdict::from_z3_result_direct(result);
            debug!(id = %req.id, ?verdict, "checked consistency meta-requirement");
            RequirementOutcome {
                id: req.id,
                description: req.description,
                source: req.source,
                verdict,
                diagnostic: (verdict == Verdict::Violated)
                    .then(|| "the model violates its own metamodel's type, multiplicity or inverse-association constraints".to_string()),
            }
        }
        RequirementBody::Builtin(builtin) => {
            let bc = crate::builtins::BuiltinCtx { ctx, encoding, registry: lc.registry, version: lc.version };
            let outcome = (builtin.build)(&bc);
            let verdict_and_diagnostic = check_formula(solver, &outcome.formula, &outcome.witnesses, encoding, im, builtin.error_template);
            debug!(id = %req.id, verdict = ?verdict_and_diagnostic.0, "checked built-in requirement");
            RequirementOutcome {
                id: req.id,
                description: req.description,
                source: req.source,
                verdict: verdict_and_diagnostic.0,
                diagnostic: verdict_and_diagnostic.1,
            }
        }
        RequirementBody::Domlr(decl) => {
            let violation_body = polarity::violation_form(decl.flipped, &decl.body);
            match lower::lower_violation(lc, &decl.name, &violation_body) {
                Ok(lowered) => {
                    let verdict_and_diagnostic =
                        check_formula(solver, &lowered.formula, &lowered.witnesses, encoding, im, &decl.error_template);
                    debug!(id = %req.id, verdict = ?verdict_and_diagnostic.0, "checked user requirement");
                    RequirementOutcome {
                        id: req.id,
                        description: req.description,
                        source: req.source,
                        verdict: verdict_and_diagnostic.0,
                        diagnostic: verdict_and_diagnostic.1,
                    }
                }
                Err(err) => {
                    debug!(id = %req.id, %err, "user requirement failed to lower");
                    RequirementOutcome {
                        id: req.id,
                        description: req.description,
                        source: req.source,
                        verdict: Verdict::Undetermined,
                        diagnostic: Some(err.to_string()),
                    }
                }
            }
        }
    }
}

/// Assert `formula` in its own push/pop frame, check it, and on `sat`
/// resolve every witness back to an element id and render the error
/// template from it.
fn check_formula<'ctx, N: AsRef<str>>(
    solver: &Solver<'ctx>,
    formula: &z3::ast::Bool<'ctx>,
    witnesses: &[(N, Datatype<'ctx>)],
    encoding: &SmtEncoding<'ctx>,
    im: &IntermediateModel,
    error_template: &str,
) -> (Verdict, Option<String>) {
    solver.push();
    solver.assert(formula);
    let result = solver.check();
    let verdict = Verdict::from_z3_result(result);

    let diagnostic = if verdict == Verdict::Violated {
        let bindings = match result {
            SatResult::Sat => solver.get_model().map(|model| resolve_witnesses(&model, encoding, im, witnesses)).unwrap_or_default(),
            _ => Vec::new(),
        };
        let (rendered, complete) = render_template(error_template, &bindings);
        Some(if complete { rendered } else { with_incomplete_model_note(rendered) })
    } else {
        None
    };

    solver.pop(1);
    (verdict, diagnostic)
}

/// Evaluate each witness constant against the model and translate its
/// `Element`-sort value back to the Intermediate Model's element id. A
/// witness the model left unassigned (can happen under an `Unknown`
/// result that still produced a partial model) is simply omitted —
/// [`check_formula`]'s template rendering then flags the diagnostic as
/// incomplete rather than failing outright.
fn resolve_witnesses<'ctx, N: AsRef<str>>(
    model: &z3::Model<'ctx>,
    encoding: &SmtEncoding<'ctx>,
    im: &IntermediateModel,
    witnesses: &[(N, Datatype<'ctx>)],
) -> Vec<(String, String)> {
    witnesses
        .iter()
        .filter_map(|(name, constant)| {
            let value = model.eval(constant, true)?;
            let key = encoding.sorts.element.key_for_value(&value)?;
            Some((name.as_ref().to_string(), im.resolve_id(*key).to_string()))
        })
        .collect()
}
