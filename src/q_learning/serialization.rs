//! Serialization support for trained policies.
//!
//! Tables are stored as sorted lists of `(state, action, value)` entries so
//! the format is independent of hash-map ordering and readable by any
//! key/value consumer. Values are kept as `f64` end to end.

use serde::{Deserialize, Serialize};

use super::{policy::TrainedPolicy, value_table::ValueTable};
use crate::{
    Error, Result,
    tictactoe::{Player, StateKey},
};

/// Hyper-parameters and results recorded alongside a saved policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    pub episodes: usize,
    pub learning_rate: f64,
    pub discount: f64,
    pub epsilon_initial: f64,
    pub epsilon_decay: f64,
    pub eval_interval: usize,
    pub seed: Option<u64>,
    /// Draw rate of the last complete evaluation window
    pub final_draw_rate: Option<f64>,
}

/// One stored value table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry {
    /// Nine-character board label, e.g. `X...O....`
    pub state: String,
    pub action: u8,
    pub value: f64,
}

/// Versioned on-disk form of a [`TrainedPolicy`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPolicy {
    pub version: u32,
    pub metadata: TrainingMetadata,
    x_table: Vec<ValueEntry>,
    o_table: Vec<ValueEntry>,
}

fn table_to_entries(table: &ValueTable) -> Result<Vec<ValueEntry>> {
    let mut entries: Vec<(StateKey, usize, f64)> = table.iter().collect();
    entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    entries
        .into_iter()
        .map(|(state, action, value)| {
            let action = u8::try_from(action)
                .ok()
                .filter(|&a| a < 9)
                .ok_or(Error::InvalidPosition { position: action })?;
            Ok(ValueEntry {
                state: state.encode(),
                action,
                value,
            })
        })
        .collect()
}

fn entries_to_table(entries: &[ValueEntry], role: Player) -> Result<ValueTable> {
    let mut table = ValueTable::new();
    for entry in entries {
        let state = StateKey::parse(&entry.state)?;
        let action = usize::from(entry.action);
        if action >= 9 {
            return Err(Error::InvalidPosition { position: action });
        }
        if !entry.value.is_finite() {
            return Err(Error::SerializationContext {
                operation: format!("load {role} table entry {}/{action}", entry.state),
                message: format!("value {} is not finite", entry.value),
            });
        }
        table.set(state, action, entry.value);
    }
    Ok(table)
}

impl SavedPolicy {
    pub const VERSION: u32 = 1;

    /// Snapshot both tables of `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`] if a table holds an action outside
    /// the board.
    pub fn from_policy(policy: &TrainedPolicy, metadata: TrainingMetadata) -> Result<Self> {
        Ok(Self {
            version: Self::VERSION,
            metadata,
            x_table: table_to_entries(policy.table(Player::X))?,
            o_table: table_to_entries(policy.table(Player::O))?,
        })
    }

    /// Entries of one role's table, sorted by state then action
    pub fn entries(&self, role: Player) -> &[ValueEntry] {
        match role {
            Player::X => &self.x_table,
            Player::O => &self.o_table,
        }
    }

    /// Rebuild the policy.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown format version or malformed entries.
    pub fn to_policy(&self) -> Result<TrainedPolicy> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }

        Ok(TrainedPolicy::new(
            entries_to_table(&self.x_table, Player::X)?,
            entries_to_table(&self.o_table, Player::O)?,
        ))
    }

    /// Encode as MessagePack
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec(self).map_err(|e| Error::SerializationContext {
            operation: "serialize policy to MessagePack".to_string(),
            message: e.to_string(),
        })
    }

    /// Decode from MessagePack
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
            operation: "deserialize policy from MessagePack".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_policy() -> TrainedPolicy {
        let mut x = ValueTable::new();
        x.set(StateKey::EMPTY, 4, 0.1 + 0.2);
        x.set(StateKey::EMPTY, 0, -1.0 / 3.0);
        let mut o = ValueTable::new();
        o.set(StateKey::parse("....X....").unwrap(), 0, f64::MIN_POSITIVE);
        TrainedPolicy::new(x, o)
    }

    fn sample_saved() -> SavedPolicy {
        SavedPolicy::from_policy(&sample_policy(), TrainingMetadata::default()).unwrap()
    }

    #[test]
    fn test_msgpack_roundtrip_is_exact() -> Result<()> {
        let policy = sample_policy();
        let saved = SavedPolicy::from_policy(&policy, TrainingMetadata::default())?;

        let bytes = saved.to_msgpack()?;
        let restored = SavedPolicy::from_msgpack(&bytes)?.to_policy()?;

        assert_eq!(restored, policy);
        Ok(())
    }

    #[test]
    fn test_entries_are_sorted() {
        let saved = sample_saved();
        let actions: Vec<u8> = saved.entries(Player::X).iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![0, 4]);
        assert_eq!(saved.entries(Player::O)[0].state, "....X....");
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut saved = sample_saved();
        saved.version = 99;
        assert!(matches!(
            saved.to_policy(),
            Err(Error::UnsupportedVersion {
                found: 99,
                expected: 1
            })
        ));
    }

    #[test]
    fn test_rejects_bad_entries() {
        let mut saved = sample_saved();
        saved.x_table[0].action = 9;
        assert!(matches!(
            saved.to_policy(),
            Err(Error::InvalidPosition { position: 9 })
        ));

        let mut saved = sample_saved();
        saved.o_table[0].state = "XO".to_string();
        assert!(saved.to_policy().is_err());
    }

    #[test]
    fn test_off_board_action_is_not_saved() {
        let mut x = ValueTable::new();
        x.set(StateKey::EMPTY, 4, 0.5);
        x.set(StateKey::EMPTY, 260, -0.75);
        let policy = TrainedPolicy::new(x, ValueTable::new());

        // 260 would wrap to 4 as a u8 and clobber the real entry
        assert!(matches!(
            SavedPolicy::from_policy(&policy, TrainingMetadata::default()),
            Err(Error::InvalidPosition { position: 260 })
        ));

        let mut o = ValueTable::new();
        o.set(StateKey::EMPTY, 9, 1.0);
        let policy = TrainedPolicy::new(ValueTable::new(), o);
        assert!(matches!(
            SavedPolicy::from_policy(&policy, TrainingMetadata::default()),
            Err(Error::InvalidPosition { position: 9 })
        ));
    }
}
