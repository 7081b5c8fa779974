//! Freezone registry implementation
//!
//! A freezone owns one dmap zone and hands out its keys first-come,
//! first-served. Whoever controls a name may write the entry under it
//! (through the freezone's zone) or hand control to someone else.

use crate::errors::*;
use crate::types::*;
use dmap_core::Dmap;
use dmap_storage::{Journal, Storage};
use dmap_types::{Notification, Receipt, Word, Zone};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// First-come name registry over a shared [`Dmap`].
///
/// Controller records live in their own storage; entry writes go through the
/// dmap under the freezone's zone.
pub struct FreeZone<S: Storage> {
    zone: Zone,
    dmap: Arc<Dmap<S>>,
    controllers: S,
    serial: Mutex<()>,
}

impl<S: Storage> FreeZone<S> {
    /// Create a registry writing to `dmap` as `zone`, keeping controller
    /// records in `controllers`.
    pub fn new(zone: Zone, dmap: Arc<Dmap<S>>, controllers: S) -> Self {
        Self {
            zone,
            dmap,
            controllers,
            serial: Mutex::new(()),
        }
    }

    /// Zone this registry writes entries as.
    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn dmap(&self) -> &Arc<Dmap<S>> {
        &self.dmap
    }

    /// Current controller of `name`, `None` if it was never taken.
    pub fn controller(&self, name: &Word) -> Result<Option<Zone>> {
        let word = self.controllers.load(&controller_slot(name))?;
        Ok(ControllerRecord::from_word(&word).controller())
    }

    /// Claim an untaken name for `caller`.
    pub fn take(&self, caller: &Zone, name: &Word) -> Result<Receipt> {
        let _guard = self.serial.lock();
        let slot = controller_slot(name);

        let mut journal = Journal::new(&self.controllers);
        if let ControllerRecord::Claimed(owner) = ControllerRecord::from_word(&journal.load(&slot)?)
        {
            debug!(%name, %owner, "name already taken");
            return Err(FreezoneError::AlreadyTaken { name: *name });
        }
        journal.store(slot, ControllerRecord::Claimed(*caller).to_word())?;
        let cost = journal.commit()?;

        info!(%name, controller = %caller, "name taken");
        Ok(Receipt::new(
            vec![Notification::Give {
                giver: None,
                name: *name,
                recipient: *caller,
            }],
            cost,
        ))
    }

    /// Hand control of `name` from `caller` to `recipient`.
    ///
    /// Giving to the zero zone burns the name: it stays taken but nobody can
    /// write it again.
    pub fn give(&self, caller: &Zone, name: &Word, recipient: &Zone) -> Result<Receipt> {
        let _guard = self.serial.lock();
        let slot = controller_slot(name);

        let mut journal = Journal::new(&self.controllers);
        self.require_controller(&mut journal, caller, name)?;
        journal.store(slot, ControllerRecord::Claimed(*recipient).to_word())?;
        let cost = journal.commit()?;

        info!(%name, from = %caller, to = %recipient, "name given");
        Ok(Receipt::new(
            vec![Notification::Give {
                giver: Some(*caller),
                name: *name,
                recipient: *recipient,
            }],
            cost,
        ))
    }

    /// Write the freezone's entry under `name` on behalf of its controller.
    ///
    /// Lock rules are the dmap's: a locked entry refuses the write even for
    /// the controller.
    pub fn set(&self, caller: &Zone, name: &Word, meta: Word, data: Word) -> Result<Receipt> {
        let _guard = self.serial.lock();

        let mut journal = Journal::new(&self.controllers);
        self.require_controller(&mut journal, caller, name)?;
        let mut receipt = Receipt::new(Vec::new(), journal.cost());

        receipt.absorb(self.dmap.set(&self.zone, name, meta, data)?);
        debug!(%name, controller = %caller, "freezone entry written");
        Ok(receipt)
    }

    fn require_controller(
        &self,
        journal: &mut Journal<'_, S>,
        caller: &Zone,
        name: &Word,
    ) -> Result<()> {
        let record = ControllerRecord::from_word(&journal.load(&controller_slot(name))?);
        match record {
            ControllerRecord::Claimed(owner) if owner == *caller => Ok(()),
            _ => {
                warn!(%name, caller = %caller, "caller does not control name");
                Err(FreezoneError::NotOwner { name: *name })
            }
        }
    }
}
