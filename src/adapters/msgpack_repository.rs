//! MessagePack implementation of the policy repository.
//!
//! This adapter implements the PolicyRepository port using rmp_serde for
//! compact binary serialization.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{Result, error::Error, ports::PolicyRepository, q_learning::SavedPolicy};

/// MessagePack-based policy repository.
///
/// # Examples
///
/// ```no_run
/// use qtictac::adapters::MsgPackRepository;
/// use qtictac::pipeline::{Trainer, TrainingConfig};
/// use qtictac::ports::PolicyRepository;
/// use std::path::Path;
///
/// let run = Trainer::new(TrainingConfig::default())?.run()?;
/// let repo = MsgPackRepository::new();
///
/// repo.save(&run.to_saved()?, Path::new("policy.msgpack"))?;
/// let loaded = repo.load(Path::new("policy.msgpack"))?;
/// # Ok::<(), qtictac::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

impl PolicyRepository for MsgPackRepository {
    fn save(&self, policy: &SavedPolicy, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, policy).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize policy to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush file {path:?}"),
            source,
        })?;

        log::info!(
            "saved policy to {} ({} X entries, {} O entries)",
            path.display(),
            policy.entries(crate::tictactoe::Player::X).len(),
            policy.entries(crate::tictactoe::Player::O).len()
        );
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedPolicy> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let policy: SavedPolicy = rmp_serde::decode::from_read(BufReader::new(file)).map_err(
            |e| Error::SerializationContext {
                operation: "deserialize policy from MessagePack".to_string(),
                message: e.to_string(),
            },
        )?;

        if policy.version != SavedPolicy::VERSION {
            return Err(Error::UnsupportedVersion {
                found: policy.version,
                expected: SavedPolicy::VERSION,
            });
        }

        log::info!("loaded policy from {}", path.display());
        Ok(policy)
    }
}
