use crate::model::Directory;
use crate::repository::{InMemoryAssignments, InMemoryRequests};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Instantané persistant : annuaire, affectations, demandes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub directory: Directory,
    #[serde(default)]
    pub assignments: InMemoryAssignments,
    #[serde(default)]
    pub requests: InMemoryRequests,
}

pub trait Storage {
    /// Charge un ledger depuis un support.
    fn load(&self) -> anyhow::Result<Ledger>;
    /// Sauvegarde de manière atomique.
    fn save(&self, ledger: &Ledger) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self { path: path.as_ref().to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ledger vide si le fichier n'existe pas encore.
    pub fn load_or_default(&self) -> anyhow::Result<Ledger> {
        if !self.path.exists() {
            return Ok(Ledger::default());
        }
        self.load()
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Ledger> {
        let data = fs::read(&self.path)
            .with_context(|| format!("reading ledger {}", self.path.display()))?;
        serde_json::from_slice(&data)
            .with_context(|| format!("parsing ledger {}", self.path.display()))
    }

    fn save(&self, ledger: &Ledger) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(ledger).context("serializing ledger")?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        // écriture atomique : fichier voisin puis renommage
        let mut staged = NamedTempFile::new_in(dir)
            .with_context(|| format!("staging ledger next to {}", self.path.display()))?;
        staged.write_all(&json)?;
        staged.as_file().sync_all()?;
        staged
            .persist(&self.path)
            .with_context(|| format!("saving ledger {}", self.path.display()))?;
        debug!(path = %self.path.display(), bytes = json.len(), "ledger saved");
        Ok(())
    }
}
