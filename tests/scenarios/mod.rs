//! Scenario-based tests for provisor

mod dry_run;
mod fatal_abort;
mod idempotent_rerun;
mod interrupt;
mod timeout;
mod warn_only;
