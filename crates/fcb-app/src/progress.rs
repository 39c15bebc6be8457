use std::time::Instant;

/// Pipeline stages of one case build, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    AcquiringLock,
    CreatingCase,
    ConvertingMesh,
    WritingProperties,
    WritingBoundaries,
    WritingControls,
    WritingRunScript,
    Completed,
}

impl BuildStage {
    pub fn label(&self) -> &'static str {
        match self {
            BuildStage::AcquiringLock => "Acquiring lock",
            BuildStage::CreatingCase => "Creating case",
            BuildStage::ConvertingMesh => "Converting mesh",
            BuildStage::WritingProperties => "Writing properties",
            BuildStage::WritingBoundaries => "Writing boundary conditions",
            BuildStage::WritingControls => "Writing controls",
            BuildStage::WritingRunScript => "Writing run script",
            BuildStage::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildProgressEvent {
    pub stage: BuildStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

pub(crate) type ProgressCallback<'a> = Option<&'a mut dyn FnMut(BuildProgressEvent)>;

pub(crate) fn emit_progress(
    progress_cb: &mut ProgressCallback<'_>,
    stage: BuildStage,
    started: Instant,
    message: Option<String>,
) {
    tracing::debug!(?stage, "build stage");
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(BuildProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
        });
    }
}
