pub mod json_backend;

use std::cell::RefCell;

use crate::{errors::AppError, form::draft::DraftSnapshot};

pub type Result<T> = std::result::Result<T, AppError>;

/// Abstraction over persistence backends holding the in-progress draft.
///
/// The engine is single-threaded and event-driven; stores are used from one
/// thread only. Callers treat every operation as best effort: failures are
/// logged by the orchestrator and never surfaced to the user.
pub trait DraftStore {
    fn save(&self, draft: &DraftSnapshot) -> Result<()>;
    fn load(&self) -> Result<Option<DraftSnapshot>>;
    fn clear(&self) -> Result<()>;
}

impl<T: DraftStore + ?Sized> DraftStore for std::rc::Rc<T> {
    fn save(&self, draft: &DraftSnapshot) -> Result<()> {
        (**self).save(draft)
    }

    fn load(&self) -> Result<Option<DraftSnapshot>> {
        (**self).load()
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// In-process store for tests and embedding hosts without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    slot: RefCell<Option<DraftSnapshot>>,
    poisoned: RefCell<bool>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail, simulating a revoked or full
    /// backing store.
    pub fn poison(&self) {
        *self.poisoned.borrow_mut() = true;
    }

    pub fn snapshot(&self) -> Option<DraftSnapshot> {
        self.slot.borrow().clone()
    }

    fn check(&self) -> Result<()> {
        if *self.poisoned.borrow() {
            Err(AppError::Storage("memory store poisoned".into()))
        } else {
            Ok(())
        }
    }
}

impl DraftStore for MemoryDraftStore {
    fn save(&self, draft: &DraftSnapshot) -> Result<()> {
        self.check()?;
        *self.slot.borrow_mut() = Some(draft.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<DraftSnapshot>> {
        self.check()?;
        Ok(self.slot.borrow().clone())
    }

    fn clear(&self) -> Result<()> {
        self.check()?;
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}

pub use json_backend::JsonDraftStore;
