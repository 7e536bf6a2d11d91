// ── Source ─▶ Processing ─▶ Settings ─▶ Processing (mold) ─▶ Result ──
// One request in flight at a time; each carries the RunId it was issued under.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::api::{ApiClient, MoldFile, MoldRequest, StageOutput};
use crate::error::ApiError;
use crate::media::ImageUpload;
use crate::mold::MoldParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ExtractSubject,
    GenerateImage,
    CreateDepthMap,
    GenerateMold,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::ExtractSubject => "Extract subject",
            Stage::GenerateImage => "Generate image",
            Stage::CreateDepthMap => "Create depth map",
            Stage::GenerateMold => "Generate mold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Source,
    Processing,
    Settings,
    Result,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::Source => "Choose a subject",
            Step::Processing => "Processing",
            Step::Settings => "Mold settings",
            Step::Result => "Preview & download",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Upload(ImageUpload),
    Prompt(String),
}

impl Source {
    pub fn prompt(text: &str) -> Result<Self, WizardError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WizardError::EmptyPrompt);
        }
        Ok(Source::Prompt(text.to_string()))
    }

    /// AI stages that turn this source into a depth map.
    ///
    /// Generated images are already isolated on a plain background, so the
    /// prompt path skips subject extraction.
    pub fn ai_stages(&self) -> &'static [Stage] {
        match self {
            Source::Upload(_) => &[Stage::ExtractSubject, Stage::CreateDepthMap],
            Source::Prompt(_) => &[Stage::GenerateImage, Stage::CreateDepthMap],
        }
    }

    pub fn user_prompt(&self) -> Option<&str> {
        match self {
            Source::Prompt(p) => Some(p),
            Source::Upload(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageStatus {
    Pending,
    Running,
    Done,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
    pub prompt_used: Option<String>,
    pub model_used: Option<String>,
    /// The backend substituted a local result for the model's.
    pub fallback: bool,
}

impl StageRecord {
    fn pending(stage: Stage) -> Self {
        Self { stage, status: StageStatus::Pending, prompt_used: None, model_used: None, fallback: false }
    }

    fn clear(&mut self) {
        *self = Self::pending(self.stage);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let simple = self.0.simple().to_string();
        f.write_str(&simple[..8])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobKind {
    ExtractSubject { image: String },
    GenerateImage { prompt: String },
    CreateDepthMap { image: String },
    GenerateMold(MoldRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub run: RunId,
    pub kind: JobKind,
}

impl Job {
    pub fn stage(&self) -> Stage {
        match self.kind {
            JobKind::ExtractSubject { .. } => Stage::ExtractSubject,
            JobKind::GenerateImage { .. } => Stage::GenerateImage,
            JobKind::CreateDepthMap { .. } => Stage::CreateDepthMap,
            JobKind::GenerateMold(_) => Stage::GenerateMold,
        }
    }

    pub async fn run(self, client: &ApiClient) -> JobOutcome {
        let stage = self.stage();
        let run = self.run;
        log::info!("[{run}] {} started", stage.label());

        let result = match self.kind {
            JobKind::ExtractSubject { image } => client.extract_subject(image).await.map(JobResult::Image),
            JobKind::GenerateImage { prompt } => client.generate_image(prompt).await.map(JobResult::Image),
            JobKind::CreateDepthMap { image } => client.create_depth_map(image).await.map(JobResult::Image),
            JobKind::GenerateMold(request) => client.generate_mold(&request).await.map(JobResult::Mold),
        };

        match &result {
            Ok(JobResult::Image(out)) if out.is_fallback() => {
                log::warn!("[{run}] {} finished with a fallback ({})", stage.label(), out.model_used)
            }
            Ok(_) => log::info!("[{run}] {} finished", stage.label()),
            Err(e) => log::error!("[{run}] {} failed: {e}", stage.label()),
        }
        JobOutcome { run, stage, result }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobResult {
    Image(StageOutput),
    Mold(MoldFile),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub run: RunId,
    pub stage: Stage,
    pub result: Result<JobResult, ApiError>,
}

/// What [`Wizard::apply`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Ignored,
    Completed(Stage),
    Failed(Stage),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WizardError {
    #[error("describe what the candle should look like first")]
    EmptyPrompt,
    #[error("wait for the current step to finish")]
    Busy,
    #[error("there is no depth map yet")]
    NoDepthMap,
    #[error("{}", .0.join("; "))]
    InvalidParams(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Wizard {
    run: RunId,
    step: Step,
    source: Option<Source>,
    stages: Vec<StageRecord>,
    subject: Option<StageOutput>,
    depth_map: Option<StageOutput>,
    mold_request: Option<MoldRequest>,
    mold: Option<MoldFile>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            run: RunId::new(),
            step: Step::Source,
            source: None,
            stages: Vec::new(),
            subject: None,
            depth_map: None,
            mold_request: None,
            mold: None,
        }
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn stages(&self) -> &[StageRecord] {
        &self.stages
    }

    pub fn record(&self, stage: Stage) -> Option<&StageRecord> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    /// Extracted or generated image.
    pub fn subject(&self) -> Option<&StageOutput> {
        self.subject.as_ref()
    }

    pub fn depth_map(&self) -> Option<&StageOutput> {
        self.depth_map.as_ref()
    }

    pub fn mold(&self) -> Option<&MoldFile> {
        self.mold.as_ref()
    }

    pub fn running(&self) -> Option<Stage> {
        self.stages
            .iter()
            .find(|r| r.status == StageStatus::Running)
            .map(|r| r.stage)
    }

    pub fn is_busy(&self) -> bool {
        self.running().is_some()
    }

    pub fn failure(&self) -> Option<(Stage, &str)> {
        self.stages.iter().find_map(|r| match &r.status {
            StageStatus::Failed(msg) => Some((r.stage, msg.as_str())),
            _ => None,
        })
    }

    /// `(done, total)` over every stage of the current path, mold included.
    pub fn progress(&self) -> (usize, usize) {
        let done = self.stages.iter().filter(|r| r.status == StageStatus::Done).count();
        (done, self.stages.len())
    }

    /// Begins a new run for `source`, abandoning whatever was going on.
    pub fn start(&mut self, source: Source) {
        self.run = RunId::new();
        self.stages = source
            .ai_stages()
            .iter()
            .copied()
            .chain(std::iter::once(Stage::GenerateMold))
            .map(StageRecord::pending)
            .collect();
        self.subject = None;
        self.depth_map = None;
        self.mold_request = None;
        self.mold = None;
        self.step = Step::Processing;
        log::info!("[{}] pipeline started: {}", self.run, self.describe_path());
        self.source = Some(source);
    }

    fn describe_path(&self) -> String {
        self.stages.iter().map(|r| r.stage.label()).collect::<Vec<_>>().join(" -> ")
    }

    /// The next request to send, if one is due. Marks its stage running.
    pub fn next_job(&mut self) -> Option<Job> {
        if self.is_busy() || self.failure().is_some() {
            return None;
        }
        let stage = self.stages.iter().find(|r| r.status == StageStatus::Pending)?.stage;
        let kind = self.job_kind(stage)?;
        self.set_status(stage, StageStatus::Running);
        Some(Job { run: self.run, kind })
    }

    fn job_kind(&self, stage: Stage) -> Option<JobKind> {
        match stage {
            Stage::ExtractSubject => match self.source.as_ref()? {
                Source::Upload(upload) => Some(JobKind::ExtractSubject { image: upload.data_uri() }),
                Source::Prompt(_) => None,
            },
            Stage::GenerateImage => Some(JobKind::GenerateImage {
                prompt: self.source.as_ref()?.user_prompt()?.to_string(),
            }),
            Stage::CreateDepthMap => Some(JobKind::CreateDepthMap {
                image: self.subject.as_ref()?.image_base64.clone(),
            }),
            // waits for the user to confirm the settings
            Stage::GenerateMold => self.mold_request.clone().map(JobKind::GenerateMold),
        }
    }

    fn set_status(&mut self, stage: Stage, status: StageStatus) {
        if let Some(record) = self.stages.iter_mut().find(|r| r.stage == stage) {
            record.status = status;
        }
    }

    pub fn apply(&mut self, outcome: JobOutcome) -> Applied {
        if outcome.run != self.run || self.running() != Some(outcome.stage) {
            log::debug!(
                "[{}] dropping stale {} outcome (current run {})",
                outcome.run,
                outcome.stage.label(),
                self.run
            );
            return Applied::Ignored;
        }
        let stage = outcome.stage;

        let result = match outcome.result {
            Ok(result) => result,
            Err(e) => {
                self.set_status(stage, StageStatus::Failed(e.to_string()));
                return Applied::Failed(stage);
            }
        };

        match (stage, result) {
            (Stage::GenerateMold, JobResult::Mold(file)) => {
                if let Some(record) = self.stages.iter_mut().find(|r| r.stage == stage) {
                    record.status = StageStatus::Done;
                    record.model_used = None;
                }
                log::info!("[{}] mold ready: {} ({} bytes)", self.run, file.filename, file.bytes.len());
                self.mold = Some(file);
                self.step = Step::Result;
            }
            (Stage::GenerateMold, JobResult::Image(_)) | (_, JobResult::Mold(_)) => {
                self.set_status(
                    stage,
                    StageStatus::Failed(format!("{} returned the wrong kind of result", stage.label())),
                );
                return Applied::Failed(stage);
            }
            (_, JobResult::Image(output)) => {
                if let Some(record) = self.stages.iter_mut().find(|r| r.stage == stage) {
                    record.status = StageStatus::Done;
                    record.prompt_used = Some(output.prompt_used.clone());
                    record.model_used = Some(output.model_used.clone());
                    record.fallback = output.is_fallback();
                }
                if stage == Stage::CreateDepthMap {
                    self.depth_map = Some(output);
                    self.step = Step::Settings;
                } else {
                    self.subject = Some(output);
                }
            }
        }
        Applied::Completed(stage)
    }

    /// Queues the failed stage again, keeping earlier results.
    pub fn retry(&mut self) -> bool {
        let Some((stage, _)) = self.failure() else {
            return false;
        };
        log::info!("[{}] retrying {}", self.run, stage.label());
        self.set_status(stage, StageStatus::Pending);
        true
    }

    /// Asks for a (new) mold from the current depth map.
    pub fn generate_mold(&mut self, params: &MoldParams) -> Result<(), WizardError> {
        if self.is_busy() {
            return Err(WizardError::Busy);
        }
        let depth_map = match (self.step, &self.depth_map) {
            (Step::Settings | Step::Result, Some(depth_map)) => depth_map,
            _ => return Err(WizardError::NoDepthMap),
        };
        params.validate().map_err(WizardError::InvalidParams)?;

        self.mold_request = Some(params.request(&depth_map.image_base64));
        self.mold = None;
        if let Some(record) = self.stages.iter_mut().find(|r| r.stage == Stage::GenerateMold) {
            record.clear();
        }
        self.step = Step::Processing;
        Ok(())
    }

    /// One step back. Abandons in-flight work.
    pub fn back(&mut self) {
        match self.step {
            Step::Source => {}
            Step::Result => self.step = Step::Settings,
            Step::Processing if self.depth_map.is_some() => {
                self.run = RunId::new();
                self.mold_request = None;
                self.mold = None;
                if let Some(record) = self.stages.iter_mut().find(|r| r.stage == Stage::GenerateMold) {
                    record.clear();
                }
                self.step = Step::Settings;
            }
            Step::Processing | Step::Settings => {
                let source = self.source.take();
                *self = Self::new();
                self.source = source;
            }
        }
    }

    /// Back to an empty first step.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> Source {
        Source::Upload(ImageUpload {
            name: "fox.png".into(),
            mime: "image/png",
            bytes: vec![1, 2, 3],
            dimensions: (1, 1),
        })
    }

    fn image(b64: &str) -> JobResult {
        JobResult::Image(StageOutput {
            image_base64: b64.into(),
            prompt_used: format!("prompt for {b64}"),
            model_used: "content-model".into(),
        })
    }

    fn ok(job: &Job, result: JobResult) -> JobOutcome {
        JobOutcome { run: job.run, stage: job.stage(), result: Ok(result) }
    }

    fn mold_file() -> JobResult {
        JobResult::Mold(MoldFile { filename: "candle_mold.stl".into(), bytes: b"solid".to_vec() })
    }

    /// Drives a fresh wizard up to the settings step.
    fn at_settings() -> Wizard {
        let mut w = Wizard::new();
        w.start(upload());
        let job = w.next_job().unwrap();
        w.apply(ok(&job, image("subject")));
        let job = w.next_job().unwrap();
        w.apply(ok(&job, image("depth")));
        w
    }

    #[test]
    fn upload_path_runs_extract_then_depth() {
        let mut w = Wizard::new();
        w.start(upload());
        assert_eq!(w.step(), Step::Processing);
        assert_eq!(w.progress(), (0, 3));

        let job = w.next_job().unwrap();
        assert!(matches!(&job.kind, JobKind::ExtractSubject { image } if image.starts_with("data:image/png;base64,")));
        assert_eq!(w.running(), Some(Stage::ExtractSubject));
        assert!(w.next_job().is_none(), "only one request in flight");

        assert_eq!(w.apply(ok(&job, image("subject"))), Applied::Completed(Stage::ExtractSubject));
        let job = w.next_job().unwrap();
        assert_eq!(job.kind, JobKind::CreateDepthMap { image: "subject".into() });

        w.apply(ok(&job, image("depth")));
        assert_eq!(w.step(), Step::Settings);
        assert_eq!(w.depth_map().unwrap().image_base64, "depth");
        assert_eq!(w.progress(), (2, 3));
        assert!(w.next_job().is_none(), "mold waits for the user");
    }

    #[test]
    fn prompt_path_generates_instead_of_extracting() {
        let mut w = Wizard::new();
        w.start(Source::prompt("  a sleeping fox ").unwrap());
        let stages: Vec<_> = w.stages().iter().map(|r| r.stage).collect();
        assert_eq!(stages, [Stage::GenerateImage, Stage::CreateDepthMap, Stage::GenerateMold]);

        let job = w.next_job().unwrap();
        assert_eq!(job.kind, JobKind::GenerateImage { prompt: "a sleeping fox".into() });
    }

    #[test]
    fn blank_prompt_is_rejected() {
        assert_eq!(Source::prompt(" \n\t"), Err(WizardError::EmptyPrompt));
    }

    #[test]
    fn records_keep_prompt_model_and_fallback() {
        let mut w = Wizard::new();
        w.start(upload());
        let job = w.next_job().unwrap();
        w.apply(ok(
            &job,
            JobResult::Image(StageOutput {
                image_base64: "orig".into(),
                prompt_used: "[FALLBACK - Original prompt failed]\n\nExtract".into(),
                model_used: "content-model (fallback to original)".into(),
            }),
        ));
        let record = w.record(Stage::ExtractSubject).unwrap();
        assert_eq!(record.status, StageStatus::Done);
        assert!(record.fallback);
        assert_eq!(record.model_used.as_deref(), Some("content-model (fallback to original)"));
    }

    #[test]
    fn failure_stops_until_retry() {
        let mut w = Wizard::new();
        w.start(upload());
        let job = w.next_job().unwrap();
        w.apply(ok(&job, image("subject")));

        let job = w.next_job().unwrap();
        let outcome = JobOutcome {
            run: job.run,
            stage: job.stage(),
            result: Err(ApiError::Server { status: 500, detail: "model down".into() }),
        };
        assert_eq!(w.apply(outcome), Applied::Failed(Stage::CreateDepthMap));
        assert_eq!(w.failure(), Some((Stage::CreateDepthMap, "server error (500): model down")));
        assert!(w.next_job().is_none());

        assert!(w.retry());
        let again = w.next_job().unwrap();
        assert_eq!(again.kind, JobKind::CreateDepthMap { image: "subject".into() });
        assert_eq!(w.subject().unwrap().image_base64, "subject");
    }

    #[test]
    fn stale_outcomes_are_dropped() {
        let mut w = Wizard::new();
        w.start(upload());
        let old = w.next_job().unwrap();

        w.start(Source::prompt("owl").unwrap());
        let current = w.next_job().unwrap();

        assert_eq!(w.apply(ok(&old, image("old subject"))), Applied::Ignored);
        assert!(w.subject().is_none());
        assert_eq!(w.running(), Some(Stage::GenerateImage));

        assert_eq!(w.apply(ok(&current, image("owl"))), Applied::Completed(Stage::GenerateImage));
    }

    #[test]
    fn outcome_for_a_stage_not_running_is_dropped() {
        let mut w = Wizard::new();
        w.start(upload());
        let job = w.next_job().unwrap();
        let wrong = JobOutcome { run: job.run, stage: Stage::CreateDepthMap, result: Ok(image("x")) };
        assert_eq!(w.apply(wrong), Applied::Ignored);
        assert_eq!(w.running(), Some(Stage::ExtractSubject));
    }

    #[test]
    fn mold_generation_and_regeneration() {
        let mut w = at_settings();
        let params = MoldParams { max_width: 80.0, ..MoldParams::default() };
        w.generate_mold(&params).unwrap();
        assert_eq!(w.step(), Step::Processing);

        let job = w.next_job().unwrap();
        match &job.kind {
            JobKind::GenerateMold(request) => {
                assert_eq!(request.depth_map, "depth");
                assert_eq!(request.max_width, 80.0);
            }
            other => panic!("unexpected job {other:?}"),
        }
        w.apply(ok(&job, mold_file()));
        assert_eq!(w.step(), Step::Result);
        assert_eq!(w.progress(), (3, 3));
        assert_eq!(w.mold().unwrap().filename, "candle_mold.stl");

        // new dimensions without re-running the AI stages
        w.generate_mold(&MoldParams { max_depth: 50.0, ..params }).unwrap();
        assert!(w.mold().is_none());
        let job = w.next_job().unwrap();
        assert!(matches!(job.kind, JobKind::GenerateMold(ref r) if r.max_depth == 50.0));
        assert_eq!(w.record(Stage::CreateDepthMap).unwrap().status, StageStatus::Done);
    }

    #[test]
    fn mold_needs_depth_map_and_valid_params() {
        let mut w = Wizard::new();
        assert_eq!(w.generate_mold(&MoldParams::default()), Err(WizardError::NoDepthMap));

        let mut w = at_settings();
        let bad = MoldParams { wall_thickness: 1.0, ..MoldParams::default() };
        assert!(matches!(w.generate_mold(&bad), Err(WizardError::InvalidParams(e)) if e.len() == 1));
        assert_eq!(w.step(), Step::Settings);

        w.generate_mold(&MoldParams::default()).unwrap();
        let _job = w.next_job().unwrap();
        assert_eq!(w.generate_mold(&MoldParams::default()), Err(WizardError::Busy));
    }

    #[test]
    fn failed_mold_can_be_retried_with_same_request() {
        let mut w = at_settings();
        w.generate_mold(&MoldParams::default()).unwrap();
        let job = w.next_job().unwrap();
        let outcome = JobOutcome {
            run: job.run,
            stage: Stage::GenerateMold,
            result: Err(ApiError::Network("offline".into())),
        };
        w.apply(outcome);
        assert!(w.retry());
        assert_eq!(w.next_job().unwrap().kind, job.kind);
    }

    #[test]
    fn wrong_result_kind_fails_the_stage() {
        let mut w = Wizard::new();
        w.start(upload());
        let job = w.next_job().unwrap();
        assert_eq!(w.apply(ok(&job, mold_file())), Applied::Failed(Stage::ExtractSubject));
        assert!(w.failure().is_some());
    }

    #[test]
    fn back_from_mold_processing_returns_to_settings_and_drops_the_request() {
        let mut w = at_settings();
        w.generate_mold(&MoldParams::default()).unwrap();
        let job = w.next_job().unwrap();

        w.back();
        assert_eq!(w.step(), Step::Settings);
        assert!(!w.is_busy());
        assert!(w.next_job().is_none());
        assert_eq!(w.apply(ok(&job, mold_file())), Applied::Ignored);
        assert!(w.depth_map().is_some());
    }

    #[test]
    fn cancelling_an_ai_stage_returns_to_source_with_the_source_kept() {
        let mut w = Wizard::new();
        w.start(upload());
        let run = w.run();
        let job = w.next_job().unwrap();
        assert_eq!(job.stage(), Stage::ExtractSubject);

        w.back();
        assert_eq!(w.step(), Step::Source);
        assert_ne!(w.run(), run);
        assert_eq!(w.source(), Some(&upload()));
        assert!(!w.is_busy());
        assert!(w.next_job().is_none());

        assert_eq!(w.apply(ok(&job, image("late subject"))), Applied::Ignored);
        assert!(w.subject().is_none());
        assert_eq!(w.step(), Step::Source);
    }

    #[test]
    fn back_after_a_failed_mold_keeps_the_depth_map() {
        let mut w = at_settings();
        w.generate_mold(&MoldParams::default()).unwrap();
        let job = w.next_job().unwrap();
        let failed = JobOutcome {
            run: job.run,
            stage: Stage::GenerateMold,
            result: Err(ApiError::Server { status: 500, detail: "mesh failed".into() }),
        };
        assert_eq!(w.apply(failed), Applied::Failed(Stage::GenerateMold));
        assert_eq!(w.step(), Step::Processing);

        w.back();
        assert_eq!(w.step(), Step::Settings);
        assert_eq!(w.depth_map().unwrap().image_base64, "depth");
        assert!(w.failure().is_none());
        assert_eq!(w.record(Stage::GenerateMold).unwrap().status, StageStatus::Pending);
        assert!(w.next_job().is_none(), "mold waits for the user again");
        assert_eq!(w.apply(ok(&job, mold_file())), Applied::Ignored);
        assert!(w.mold().is_none());

        w.generate_mold(&MoldParams::default()).unwrap();
        assert!(matches!(w.next_job().unwrap().kind, JobKind::GenerateMold(_)));
    }

    #[test]
    fn back_from_settings_keeps_the_source_only() {
        let mut w = at_settings();
        let run = w.run();
        w.back();
        assert_eq!(w.step(), Step::Source);
        assert_ne!(w.run(), run);
        assert!(w.source().is_some());
        assert!(w.depth_map().is_none());
        assert!(w.stages().is_empty());
    }

    #[test]
    fn back_from_result_and_reset() {
        let mut w = at_settings();
        w.generate_mold(&MoldParams::default()).unwrap();
        let job = w.next_job().unwrap();
        w.apply(ok(&job, mold_file()));

        w.back();
        assert_eq!(w.step(), Step::Settings);
        assert!(w.mold().is_some());

        w.reset();
        assert_eq!(w.step(), Step::Source);
        assert!(w.source().is_none());
        assert_eq!(w.progress(), (0, 0));
    }

    #[test]
    fn run_ids_are_short_in_logs() {
        assert_eq!(RunId::new().to_string().len(), 8);
    }
}
