//! Vendor stage: verbatim copies, relative layout preserved.

use super::{Artifact, StageContext, StageError, read};
use crate::fileset::SourceFile;

pub fn run(files: &[SourceFile], ctx: &StageContext<'_>) -> Result<Vec<Artifact>, StageError> {
    files
        .iter()
        .map(|file| Ok(Artifact::new(ctx.output.join(&file.rel), read(&file.path)?)))
        .collect()
}
