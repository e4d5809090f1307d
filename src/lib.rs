//! Linkrank computes link analytics over the partitioned datasets of a web crawl: per-url link
//! documents and counters, bad links, inlink percentiles, top linked domains, and an out-of-core
//! PageRank whose memory footprint only grows with the number of urls, never with the number of
//! links.

// Enable warnings for all clippy lints. This automatically enables new lints shipped with new rust
// versions.
#![warn(
    clippy::correctness,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::pedantic,
    clippy::cargo,
    clippy::restriction
)]
// Now selectively disable unneeded lints.
#![allow(
    clippy::indexing_slicing,               // Allow `vec[i]` indexing.
    clippy::module_name_repetitions,        // Allow.
    clippy::use_debug,                      // Allow.
    clippy::float_arithmetic,               // Allow.
    clippy::integer_arithmetic,             // Allow.
    clippy::integer_division,               // Allow.
    clippy::implicit_return,                // Allow.
    clippy::too_many_arguments,             // Allow.
    clippy::use_self,                       // Allow.
    clippy::shadow_same,                    // Allow.
    clippy::shadow_unrelated,               // Allow.
    clippy::multiple_crate_versions,        // Disabled.
    clippy::missing_docs_in_private_items,  // Disabled.
    clippy::missing_errors_doc,             // Disabled.
    clippy::missing_inline_in_public_items, // Disabled.
    clippy::unknown_clippy_lints,           // To enable naming new lints added to nightly.
    clippy::result_expect_used,             // Should use `expect` rather than `unwrap`.
    clippy::option_expect_used,             // Should use `expect` rather than `unwrap`.
    clippy::must_use_candidate,             // Allow.
    clippy::as_conversions,                 // Allow but only when absolutely necessary.
    clippy::cast_possible_truncation,       // Ids and counts fit their targets.
    clippy::cast_precision_loss,            // Allow.
    clippy::implicit_hasher                 // Default hasher is fine for now.
)]
// Do not allow print statements. Use `log::info!()` or equivalent instead.
#![deny(clippy::print_stdout)]

pub mod error;
pub mod links;
pub mod pagerank;
pub mod settings;
pub mod streams;
pub mod tasks;
pub mod util;

#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate derive_new;

use crate::error::LrError;
use crate::tasks::{LinkTask, TaskContext, TaskResult};
use crate::util::timer::LrTimer;
use log::info;

/// Executes `task` against `context`, logging its outcome and duration.
pub fn run_task(task: &dyn LinkTask, context: &TaskContext) -> Result<TaskResult, LrError> {
    info!("[Task] {}", task);
    let timer = LrTimer::now();
    let result = task.execute(context);
    match &result {
        Ok(task_result) => {
            info!("[Success][{}] {}", timer.elapsed().to_seconds_string(), task_result);
        }
        Err(e) => info!("[Error][{}] {}", timer.elapsed().to_seconds_string(), e),
    }
    result
}
