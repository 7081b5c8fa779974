use crate::word::Word;
use crate::zone::Zone;
use serde::{Deserialize, Serialize};

/// Change record emitted by a successful mutating call, for external
/// indexers. Never read back by dmap itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// An entry was written.
    Set {
        zone: Zone,
        key: Word,
        meta: Word,
        data: Word,
    },
    /// Control of a freezone name changed hands. `giver` is `None` on the
    /// initial claim.
    Give {
        giver: Option<Zone>,
        name: Word,
        recipient: Zone,
    },
}

impl Notification {
    /// Indexed fields, in emission order.
    pub fn topics(&self) -> Vec<Word> {
        match self {
            Notification::Set { zone, key, .. } => vec![zone.to_word(), *key],
            Notification::Give {
                giver,
                name,
                recipient,
            } => vec![
                giver.unwrap_or(Zone::ZERO).to_word(),
                *name,
                recipient.to_word(),
            ],
        }
    }

    /// Unindexed body: `meta ‖ data` for writes, empty for transfers.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Notification::Set { meta, data, .. } => {
                let mut body = Vec::with_capacity(64);
                body.extend_from_slice(meta.as_bytes());
                body.extend_from_slice(data.as_bytes());
                body
            }
            Notification::Give { .. } => Vec::new(),
        }
    }
}
