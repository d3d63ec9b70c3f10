use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use thiserror::Error;
use tracing::debug;

use crate::spec::form::FormRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed form record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed snapshot: {0}")]
    Cbor(#[source] serde_cbor::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence collaborator. The hosting application loads or creates forms
/// before opening a session; publishing calls `save`.
pub trait FormStore {
    fn save(&self, form: &FormRecord) -> Result<(), StoreError>;

    /// Forms owned by `owner_id`, newest first.
    fn load(&self, owner_id: &str) -> Result<Vec<FormRecord>, StoreError>;

    fn create_form(&self, owner_id: &str, title: &str) -> Result<FormRecord, StoreError>;
}

fn newest_first(forms: &mut [FormRecord]) {
    forms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    forms: Mutex<Vec<FormRecord>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls received, including failed ones.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Makes subsequent saves fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get(&self, form_id: &str) -> Result<Option<FormRecord>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .find(|form| form.id == form_id)
            .cloned())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<FormRecord>>, StoreError> {
        self.forms
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl FormStore for MemoryStore {
    fn save(&self, form: &FormRecord) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("save rejected".into()));
        }
        let mut forms = self.lock()?;
        match forms.iter_mut().find(|existing| existing.id == form.id) {
            Some(existing) => *existing = form.clone(),
            None => forms.push(form.clone()),
        }
        Ok(())
    }

    fn load(&self, owner_id: &str) -> Result<Vec<FormRecord>, StoreError> {
        let mut forms: Vec<_> = self
            .lock()?
            .iter()
            .filter(|form| form.owner_id == owner_id)
            .cloned()
            .collect();
        newest_first(&mut forms);
        Ok(forms)
    }

    fn create_form(&self, owner_id: &str, title: &str) -> Result<FormRecord, StoreError> {
        let form = FormRecord::new(owner_id, title);
        self.lock()?.push(form.clone());
        Ok(form)
    }
}

/// One JSON file per form under `<root>/<owner>/<form-id>.json`.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn owner_dir(&self, owner_id: &str) -> PathBuf {
        self.root.join(&*urlencoding::encode(owner_id))
    }

    fn form_path(&self, form: &FormRecord) -> PathBuf {
        self.owner_dir(&form.owner_id)
            .join(format!("{}.json", urlencoding::encode(&form.id)))
    }
}

impl FormStore for JsonDirStore {
    fn save(&self, form: &FormRecord) -> Result<(), StoreError> {
        let path = self.form_path(form);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(form)?;
        fs::write(&path, json)?;
        debug!(path = %path.display(), "saved form");
        Ok(())
    }

    fn load(&self, owner_id: &str) -> Result<Vec<FormRecord>, StoreError> {
        let dir = self.owner_dir(owner_id);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut forms = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let text = fs::read_to_string(&path)?;
            forms.push(serde_json::from_str::<FormRecord>(&text)?);
        }
        newest_first(&mut forms);
        debug!(dir = %dir.display(), count = forms.len(), "loaded forms");
        Ok(forms)
    }

    fn create_form(&self, owner_id: &str, title: &str) -> Result<FormRecord, StoreError> {
        let form = FormRecord::new(owner_id, title);
        self.save(&form)?;
        Ok(form)
    }
}
