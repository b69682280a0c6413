//! Library import state machine.
//!
//! ```text
//! Idle -> Spawned -> WaitingForManifest -> ManifestReady -> Streaming -> Done
//!            \               \                                 \
//!             +---------------+-------------> Failed <----------+ (cancel)
//! ```
//!
//! [`LibraryImport::step`] advances by one bounded unit of work: one manifest
//! check or one streamed entry. Callers pass the current [`Instant`] so the
//! host's timer, a blocking loop or a tokio task can all drive it.

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::manifest::{Manifest, ManifestBrush, ManifestTexture};
use super::worker::{WorkerHandle, WorkerInvocation, WorkerLauncher};
use super::ImportError;
use crate::core::config::ManagerConfig;
use crate::core::paths::Paths;
use crate::data::addon_data::AddonDataByMode;
use crate::data::events::{self, DataEvent};
use crate::data::icons;
use crate::data::items::{BrushData, NewItem, TextureData};

/// Pinned category uuid used by the default library bootstrap.
pub const DEFAULT_LIBRARY_UUID: &str = "DEFAULT";

const FALLBACK_CATEGORY_NAME: &str = "Imported";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Idle,
    Spawned,
    WaitingForManifest,
    ManifestReady,
    Streaming,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub filepath: PathBuf,
    pub host_binary: PathBuf,
    pub export_script: PathBuf,
    pub exclude_builtin: bool,
    /// Pins the destination categories so repeated imports reuse them.
    pub custom_uuid: Option<String>,
    pub manifest_timeout: Duration,
    pub parse_timeout: Duration,
    pub refresh_interval: Duration,
}

impl ImportOptions {
    pub fn from_config(config: &ManagerConfig, filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
            host_binary: config.host_binary.clone(),
            export_script: config.export_script.clone(),
            exclude_builtin: config.exclude_builtin,
            custom_uuid: None,
            manifest_timeout: config.manifest_timeout(),
            parse_timeout: config.parse_timeout(),
            refresh_interval: config.refresh_interval(),
        }
    }

    /// First-run bootstrap of the bundled library: keeps builtin brushes and
    /// pins the categories to [`DEFAULT_LIBRARY_UUID`].
    pub fn default_library(config: &ManagerConfig, filepath: impl Into<PathBuf>) -> Self {
        Self {
            exclude_builtin: false,
            custom_uuid: Some(DEFAULT_LIBRARY_UUID.to_string()),
            ..Self::from_config(config, filepath)
        }
    }

    pub fn with_custom_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.custom_uuid = Some(uuid.into());
        self
    }

    fn category_name(&self) -> String {
        self.filepath
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| FALLBACK_CATEGORY_NAME.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub brush_cat: Option<String>,
    pub texture_cat: Option<String>,
    pub brushes: usize,
    pub textures: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing changed; poll again later.
    Waiting,
    /// Data changed. `refresh` is set at most once per refresh interval.
    Progress {
        textures_left: usize,
        brushes_left: usize,
        refresh: bool,
    },
    Done(ImportSummary),
}

pub struct LibraryImport {
    paths: Paths,
    options: ImportOptions,
    state: ImportState,
    worker: Option<Box<dyn WorkerHandle>>,
    deadline: Option<Instant>,
    textures: VecDeque<ManifestTexture>,
    brushes: VecDeque<ManifestBrush>,
    last_refresh: Option<Instant>,
    summary: ImportSummary,
}

impl std::fmt::Debug for LibraryImport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryImport")
            .field("filepath", &self.options.filepath)
            .field("state", &self.state)
            .field("textures_left", &self.textures.len())
            .field("brushes_left", &self.brushes.len())
            .finish()
    }
}

impl LibraryImport {
    pub fn new(paths: Paths, options: ImportOptions) -> Self {
        Self {
            paths,
            options,
            state: ImportState::Idle,
            worker: None,
            deadline: None,
            textures: VecDeque::new(),
            brushes: VecDeque::new(),
            last_refresh: None,
            summary: ImportSummary::default(),
        }
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, ImportState::Done | ImportState::Failed)
    }

    pub fn pending(&self) -> (usize, usize) {
        (self.textures.len(), self.brushes.len())
    }

    /// Launch the export worker against the library file.
    pub fn start(
        &mut self,
        data: &mut AddonDataByMode,
        launcher: &mut dyn WorkerLauncher,
        now: Instant,
    ) -> Result<(), ImportError> {
        if self.state != ImportState::Idle {
            return Err(ImportError::AlreadyStarted);
        }
        if self.options.filepath.as_os_str().is_empty() {
            return Err(ImportError::EmptyPath);
        }
        // Imports share one manifest file; a second one would clobber it.
        if data.is_importing() {
            return Err(ImportError::Busy);
        }

        let manifest = self.paths.manifest_file();
        if manifest.exists() {
            tracing::debug!("Removing stale manifest {:?}", manifest);
            std::fs::remove_file(&manifest)?;
        }
        std::fs::create_dir_all(self.paths.scripts_dir())?;

        let invocation = WorkerInvocation {
            host_binary: self.options.host_binary.clone(),
            target: self.options.filepath.clone(),
            script: self.options.export_script.clone(),
            mode: data.mode(),
            exclude_builtin: self.options.exclude_builtin,
        };

        data.set_importing(true);
        match launcher.launch(&invocation) {
            Ok(worker) => self.worker = Some(worker),
            Err(err) => return Err(self.fail(data, ImportError::Spawn(err))),
        }

        self.deadline = Some(now + self.options.manifest_timeout);
        self.state = ImportState::Spawned;
        tracing::info!(
            "Importing {:?} into {}",
            self.options.filepath,
            data.mode()
        );
        Ok(())
    }

    /// Advance by one unit of work.
    pub fn step(
        &mut self,
        data: &mut AddonDataByMode,
        now: Instant,
    ) -> Result<StepOutcome, ImportError> {
        match self.state {
            ImportState::Idle => Err(ImportError::NotStarted),
            ImportState::Failed => Err(ImportError::Cancelled),
            ImportState::Done => Ok(StepOutcome::Done(self.summary.clone())),
            ImportState::Spawned => self.poll_manifest(data, now),
            ImportState::WaitingForManifest => self.read_manifest(data, now),
            ImportState::ManifestReady => Ok(self.create_categories(data, now)),
            ImportState::Streaming => self.stream_one(data, now),
        }
    }

    fn poll_manifest(
        &mut self,
        data: &mut AddonDataByMode,
        now: Instant,
    ) -> Result<StepOutcome, ImportError> {
        if self.paths.manifest_file().is_file() {
            self.state = ImportState::WaitingForManifest;
            self.deadline = Some(now + self.options.parse_timeout);
            return Ok(StepOutcome::Waiting);
        }
        if self.expired(now) {
            let err = ImportError::ManifestTimeout {
                phase: "export worker",
                waited: self.options.manifest_timeout,
            };
            return Err(self.fail(data, err));
        }
        Ok(StepOutcome::Waiting)
    }

    fn read_manifest(
        &mut self,
        data: &mut AddonDataByMode,
        now: Instant,
    ) -> Result<StepOutcome, ImportError> {
        let path = self.paths.manifest_file();
        // The worker may still be flushing: missing, empty or partial text is
        // not final until the deadline passes.
        let parsed = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => None,
            Ok(text) => Some(Manifest::parse(&text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) if err.kind() == io::ErrorKind::InvalidData => Some(Err(
                ImportError::InvalidManifest(format!("not UTF-8: {}", err)),
            )),
            Err(err) => Some(Err(ImportError::Io(err))),
        };

        let manifest = match parsed {
            Some(Ok(manifest)) => manifest,
            Some(Err(err)) if self.expired(now) => return Err(self.fail(data, err)),
            None if self.expired(now) => {
                let err = ImportError::ManifestTimeout {
                    phase: "manifest contents",
                    waited: self.options.parse_timeout,
                };
                return Err(self.fail(data, err));
            }
            _ => return Ok(StepOutcome::Waiting),
        };

        if let Err(err) = std::fs::remove_file(&path) {
            tracing::warn!("Failed to remove manifest {:?}: {}", path, err);
        }
        tracing::debug!(
            "Manifest ready: {} textures, {} brushes",
            manifest.textures.len(),
            manifest.brushes.len()
        );

        self.textures = manifest.textures.into();
        self.brushes = manifest.brushes.into();
        self.deadline = None;
        self.state = ImportState::ManifestReady;
        Ok(self.progress(data, now, false))
    }

    fn create_categories(&mut self, data: &mut AddonDataByMode, now: Instant) -> StepOutcome {
        let name = self.options.category_name();
        let pinned = self.options.custom_uuid.as_deref();

        if !self.textures.is_empty() {
            let cat = data.texture_cats.add(&name, pinned);
            self.summary.texture_cat = Some(cat.uuid().to_string());
        }
        if !self.brushes.is_empty() {
            let cat = data.brush_cats.add(&name, pinned);
            self.summary.brush_cat = Some(cat.uuid().to_string());
        }

        self.state = ImportState::Streaming;
        self.progress(data, now, true)
    }

    fn stream_one(
        &mut self,
        data: &mut AddonDataByMode,
        now: Instant,
    ) -> Result<StepOutcome, ImportError> {
        if let Some(entry) = self.textures.pop_front() {
            self.add_texture(data, entry);
            return Ok(self.progress(data, now, false));
        }
        if let Some(entry) = self.brushes.pop_front() {
            self.add_brush(data, entry);
            return Ok(self.progress(data, now, false));
        }
        self.finish(data)
    }

    fn add_texture(&mut self, data: &mut AddonDataByMode, entry: ManifestTexture) {
        let Some(cat) = self
            .summary
            .texture_cat
            .as_deref()
            .and_then(|uuid| data.texture_cats.get_mut(uuid))
        else {
            tracing::warn!("Texture category gone, dropping {}", entry.uuid);
            return;
        };

        let new = NewItem {
            name: entry.name,
            kind: entry.kind,
            use_custom_icon: false,
            favorite: false,
            data: TextureData {
                format: entry.format,
            },
        };
        if cat.items_mut().add_with_uuid(&entry.uuid, new).is_some() {
            icons::invalidate_icon(&entry.uuid);
            self.summary.textures += 1;
        }
    }

    fn add_brush(&mut self, data: &mut AddonDataByMode, entry: ManifestBrush) {
        let texture_uuid = entry.texture_uuid.filter(|uuid| {
            let found = data.find_texture(uuid).is_some();
            if !found {
                tracing::warn!("Brush {} links unknown texture {}", entry.uuid, uuid);
            }
            found
        });

        let Some(cat) = self
            .summary
            .brush_cat
            .as_deref()
            .and_then(|uuid| data.brush_cats.get_mut(uuid))
        else {
            tracing::warn!("Brush category gone, dropping {}", entry.uuid);
            return;
        };

        let new = NewItem {
            name: entry.name,
            kind: entry.kind,
            use_custom_icon: entry.use_custom_icon,
            favorite: false,
            data: BrushData { texture_uuid },
        };
        if cat.items_mut().add_with_uuid(&entry.uuid, new).is_some() {
            icons::invalidate_icon(&entry.uuid);
            self.summary.brushes += 1;
        }
    }

    fn finish(&mut self, data: &mut AddonDataByMode) -> Result<StepOutcome, ImportError> {
        if let Err(err) = data.save(&self.paths) {
            return Err(self.fail(data, err.into()));
        }

        // The worker may keep writing payload files after the manifest; let it run.
        self.worker = None;
        self.state = ImportState::Done;
        data.set_importing(false);

        tracing::info!(
            "Imported {} textures, {} brushes from {:?}",
            self.summary.textures,
            self.summary.brushes,
            self.options.filepath
        );
        events::emit(&DataEvent::ImportFinished {
            mode: data.mode(),
            library: self.options.filepath.clone(),
            textures: self.summary.textures,
            brushes: self.summary.brushes,
        });
        Ok(StepOutcome::Done(self.summary.clone()))
    }

    fn progress(&mut self, data: &AddonDataByMode, now: Instant, force_refresh: bool) -> StepOutcome {
        let due = match self.last_refresh {
            Some(last) => now.duration_since(last) >= self.options.refresh_interval,
            None => true,
        };
        let refresh = force_refresh || due;
        if refresh {
            self.last_refresh = Some(now);
            events::emit(&DataEvent::ImportProgress {
                mode: data.mode(),
                textures_left: self.textures.len(),
                brushes_left: self.brushes.len(),
            });
        }
        StepOutcome::Progress {
            textures_left: self.textures.len(),
            brushes_left: self.brushes.len(),
            refresh,
        }
    }

    fn expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Abort: already streamed categories and items stay, the worker is
    /// killed and the importing flag is cleared.
    fn fail(&mut self, data: &mut AddonDataByMode, err: ImportError) -> ImportError {
        self.state = ImportState::Failed;
        self.deadline = None;
        self.textures.clear();
        self.brushes.clear();
        data.set_importing(false);
        if let Some(mut worker) = self.worker.take() {
            worker.kill();
        }

        tracing::warn!("Import of {:?} failed: {}", self.options.filepath, err);
        events::emit(&DataEvent::ImportCancelled {
            mode: data.mode(),
            library: self.options.filepath.clone(),
            reason: err.to_string(),
        });
        err
    }

    /// Stop a running import. Returns false when it had already ended.
    pub fn cancel(&mut self, data: &mut AddonDataByMode) -> bool {
        match self.state {
            ImportState::Idle | ImportState::Done | ImportState::Failed => false,
            _ => {
                self.fail(data, ImportError::Cancelled);
                true
            }
        }
    }

    /// Drive the import to completion on the current thread, sleeping `poll`
    /// between manifest checks.
    pub fn run_blocking(
        &mut self,
        data: &mut AddonDataByMode,
        poll: Duration,
    ) -> Result<ImportSummary, ImportError> {
        loop {
            match self.step(data, Instant::now())? {
                StepOutcome::Done(summary) => return Ok(summary),
                StepOutcome::Waiting => std::thread::sleep(poll),
                StepOutcome::Progress { .. } => {}
            }
        }
    }

    /// Drive the import from a tokio task, yielding between steps.
    pub async fn run_async(
        &mut self,
        data: &mut AddonDataByMode,
        poll: Duration,
    ) -> Result<ImportSummary, ImportError> {
        loop {
            match self.step(data, Instant::now())? {
                StepOutcome::Done(summary) => return Ok(summary),
                StepOutcome::Waiting => tokio::time::sleep(poll).await,
                StepOutcome::Progress { .. } => tokio::task::yield_now().await,
            }
        }
    }
}
