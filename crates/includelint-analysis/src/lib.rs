//! includelint Analysis Engine
//!
//! Finds include directories a build target passes to the compiler that no
//! inclusion directive of the target actually needs:
//! - Compile command selection against the build description
//! - Per translation unit attribution of directives to include directories
//! - Set difference and diagnostics per target

pub mod engine;
pub mod report;
pub mod resolver;
pub mod walker;

pub use engine::{AnalysisEngine, IncludeUsage};
pub use report::{ExcludeFilter, Report};
pub use resolver::{CompileCommandResolver, RequiredFlags};
pub use walker::{IgnoreReason, Inclusion, TranslationUnitWalker};

use includelint_core::Result;
use includelint_index::TargetDescription;
use tracing::info;

/// Analyze one target and build its report
pub fn check_target(
    engine: &AnalysisEngine<'_>,
    label: &str,
    target: &TargetDescription,
    exclude: &ExcludeFilter,
) -> Result<Report> {
    info!("Analyzing {}", label);
    let usage = engine.analyze(target)?;
    let report = Report::new(label, target.entity(), &usage, exclude);

    if !report.is_clean() {
        info!("{} has {} unused include directories", label, report.unused.len());
    }

    Ok(report)
}
