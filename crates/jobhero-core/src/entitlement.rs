//! One-time unlock entitlement.
//!
//! The unlock state is a single boolean kept by an [`EntitlementStore`].
//! It never expires and is not verifiable: it is trusted local state.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Key under which the unlock flag is stored.
pub const ENTITLEMENT_KEY: &str = "jobHero_isPro";

#[derive(Error, Debug)]
pub enum EntitlementError {
    #[error("Failed to access entitlement file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Entitlement file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Storage for the unlock flag.
pub trait EntitlementStore: Send + Sync {
    fn get(&self) -> Result<bool, EntitlementError>;

    fn set(&self, unlocked: bool) -> Result<(), EntitlementError>;
}

/// In-memory store, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryEntitlementStore {
    unlocked: AtomicBool,
}

impl MemoryEntitlementStore {
    pub fn new(unlocked: bool) -> Self {
        Self {
            unlocked: AtomicBool::new(unlocked),
        }
    }
}

impl EntitlementStore for MemoryEntitlementStore {
    fn get(&self) -> Result<bool, EntitlementError> {
        Ok(self.unlocked.load(Ordering::SeqCst))
    }

    fn set(&self, unlocked: bool) -> Result<(), EntitlementError> {
        self.unlocked.store(unlocked, Ordering::SeqCst);
        Ok(())
    }
}

/// A JSON file of string keys, one of which is [`ENTITLEMENT_KEY`].
///
/// Other keys in the file are preserved on write.
#[derive(Debug, Clone)]
pub struct FileEntitlementStore {
    path: PathBuf,
}

impl FileEntitlementStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, Value>, EntitlementError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl EntitlementStore for FileEntitlementStore {
    fn get(&self) -> Result<bool, EntitlementError> {
        let entries = self.read_all()?;
        Ok(match entries.get(ENTITLEMENT_KEY) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag == "true",
            _ => false,
        })
    }

    fn set(&self, unlocked: bool) -> Result<(), EntitlementError> {
        let mut entries = self.read_all()?;
        entries.insert(ENTITLEMENT_KEY.to_string(), Value::Bool(unlocked));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

/// Resume layout templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResumeTemplate {
    #[default]
    Classic,
    Modern,
    Creative,
    Elegant,
    Executive,
}

impl ResumeTemplate {
    pub const ALL: [ResumeTemplate; 5] = [
        ResumeTemplate::Classic,
        ResumeTemplate::Modern,
        ResumeTemplate::Creative,
        ResumeTemplate::Elegant,
        ResumeTemplate::Executive,
    ];

    /// Premium templates need the unlock.
    pub fn is_premium(self) -> bool {
        matches!(self, ResumeTemplate::Elegant | ResumeTemplate::Executive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResumeTemplate::Classic => "Classic",
            ResumeTemplate::Modern => "Modern",
            ResumeTemplate::Creative => "Creative",
            ResumeTemplate::Elegant => "Elegant",
            ResumeTemplate::Executive => "Executive",
        }
    }
}

impl fmt::Display for ResumeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResumeTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResumeTemplate::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown template '{}'. Available: {}",
                    s,
                    ResumeTemplate::ALL.map(|t| t.as_str()).join(", ")
                )
            })
    }
}

/// Whether a template may be used right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateAccess {
    Granted,
    RequiresUnlock,
}

/// Check a template against the stored entitlement.
pub fn template_access(
    store: &dyn EntitlementStore,
    template: ResumeTemplate,
) -> Result<TemplateAccess, EntitlementError> {
    if !template.is_premium() || store.get()? {
        Ok(TemplateAccess::Granted)
    } else {
        Ok(TemplateAccess::RequiresUnlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("jobhero-entitlement-{}-{}", std::process::id(), name))
            .join("state.json")
    }

    #[test]
    fn test_premium_templates_gated() {
        let store = MemoryEntitlementStore::default();

        assert_eq!(
            template_access(&store, ResumeTemplate::Classic).unwrap(),
            TemplateAccess::Granted
        );
        assert_eq!(
            template_access(&store, ResumeTemplate::Executive).unwrap(),
            TemplateAccess::RequiresUnlock
        );

        store.set(true).unwrap();
        assert_eq!(
            template_access(&store, ResumeTemplate::Executive).unwrap(),
            TemplateAccess::Granted
        );
    }

    #[test]
    fn test_file_store_missing_file_is_locked() {
        let store = FileEntitlementStore::new(temp_path("missing"));
        assert!(!store.get().unwrap());
    }

    #[test]
    fn test_file_store_persists_and_keeps_other_keys() {
        let path = temp_path("persist");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = FileEntitlementStore::new(&path);
        store.set(true).unwrap();

        let reopened = FileEntitlementStore::new(&path);
        assert!(reopened.get().unwrap());

        let raw: BTreeMap<String, Value> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw[ENTITLEMENT_KEY], true);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_file_store_reads_string_flag() {
        let path = temp_path("string-flag");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"jobHero_isPro": "true"}"#).unwrap();

        assert!(FileEntitlementStore::new(&path).get().unwrap());

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_file_store_corrupt() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let store = FileEntitlementStore::new(&path);
        assert!(matches!(store.get(), Err(EntitlementError::Corrupt(_))));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_template_parse() {
        assert_eq!("elegant".parse::<ResumeTemplate>().unwrap(), ResumeTemplate::Elegant);
        assert!("Fancy".parse::<ResumeTemplate>().unwrap_err().contains("Classic"));
    }
}
