//! Brute-force search over noun/verb pairs.
//!
//! Every candidate runs on its own clone of the pristine program, so no
//! state leaks between trials.

use std::ops::Range;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::Result;
use crate::exec::{Vm, VmConfig};
use crate::program::Program;
use crate::sink::Discard;

pub const NOUN_VERB_RANGE: Range<i64> = 0..100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NounVerb {
    pub noun: i64,
    pub verb: i64,
}

impl NounVerb {
    /// `100 * noun + verb`
    pub fn answer(&self) -> i64 {
        100 * self.noun + self.verb
    }
}

/// Run a fresh copy of `program` with `noun`/`verb` restored and return
/// the result cell.
pub fn run_restored(program: &Program, noun: i64, verb: i64, cfg: &VmConfig) -> Result<i64> {
    let mut trial = program.clone();
    trial.restore(noun, verb)?;
    let mut vm = Vm::new(*cfg, trial, Discard);
    Ok(vm.run()?.result)
}

/// Every pair in the grid whose run halts with `target` at address 0.
/// Failing runs are skipped.
pub fn solutions<'a>(
    program: &'a Program,
    target: i64,
    cfg: &'a VmConfig,
) -> impl Iterator<Item = NounVerb> + 'a {
    NOUN_VERB_RANGE
        .flat_map(|noun| NOUN_VERB_RANGE.map(move |verb| NounVerb { noun, verb }))
        .filter(move |nv| match run_restored(program, nv.noun, nv.verb, cfg) {
            Ok(result) => result == target,
            Err(err) => {
                trace!(noun = nv.noun, verb = nv.verb, error = %err, "candidate failed");
                false
            }
        })
}

/// First pair, in noun-major order, producing `target`.
pub fn search(program: &Program, target: i64, cfg: &VmConfig) -> Option<NounVerb> {
    let found = solutions(program, target, cfg).next();
    match found {
        Some(nv) => debug!(noun = nv.noun, verb = nv.verb, target, "search hit"),
        None => debug!(target, "search exhausted"),
    }
    found
}

/// Every solution, with candidates run concurrently. Same pairs, same
/// noun-major order as [`solutions`].
#[cfg(feature = "parallel")]
pub fn par_solutions(program: &Program, target: i64, cfg: &VmConfig) -> Vec<NounVerb> {
    use rayon::prelude::*;

    NOUN_VERB_RANGE
        .into_par_iter()
        .flat_map_iter(|noun| NOUN_VERB_RANGE.map(move |verb| NounVerb { noun, verb }))
        .filter(|nv| matches!(run_restored(program, nv.noun, nv.verb, cfg), Ok(r) if r == target))
        .collect()
}

/// Parallel [`search`]: the lowest pair in noun-major order.
#[cfg(feature = "parallel")]
pub fn par_search(program: &Program, target: i64, cfg: &VmConfig) -> Option<NounVerb> {
    use rayon::prelude::*;

    let found = NOUN_VERB_RANGE
        .into_par_iter()
        .flat_map_iter(|noun| NOUN_VERB_RANGE.map(move |verb| NounVerb { noun, verb }))
        .find_first(|nv| matches!(run_restored(program, nv.noun, nv.verb, cfg), Ok(r) if r == target));
    debug!(target, hit = ?found, "parallel search done");
    found
}
