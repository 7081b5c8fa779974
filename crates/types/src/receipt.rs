use crate::cost::Cost;
use crate::notification::Notification;
use serde::{Deserialize, Serialize};

/// Outcome of a successful mutating call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Change records, in emission order.
    pub notifications: Vec<Notification>,
    /// Metered resource consumption of the call.
    pub cost: Cost,
}

impl Receipt {
    pub fn new(notifications: Vec<Notification>, cost: Cost) -> Self {
        Self {
            notifications,
            cost,
        }
    }

    /// Fold a nested call's receipt into this one.
    pub fn absorb(&mut self, inner: Receipt) {
        self.notifications.extend(inner.notifications);
        self.cost += inner.cost;
    }
}
