// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A numeric identifier that stays stable while the thing it names moves around.
///
/// Panels are addressed by position in the store, but positions shift whenever a panel
/// is opened or closed. Async results carry an `Id` instead so they can be checked for
/// currency once they come back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub const fn get(self) -> u64 {
        self.value
    }

    pub const fn next(self) -> Self {
        Self::new(self.value.wrapping_add(1))
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<u64> for Id<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::new)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelIdTag {}
pub type PanelId = Id<PanelIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestIdTag {}
pub type RequestId = Id<RequestIdTag>;

#[cfg(test)]
mod tests {
    use super::{PanelId, RequestId};

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let id = PanelId::new(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let back: PanelId = serde_json::from_str("7").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn next_is_monotonic() {
        let id = RequestId::new(41);
        assert_eq!(id.next().get(), 42);
        assert!(id.next() > id);
    }
}
