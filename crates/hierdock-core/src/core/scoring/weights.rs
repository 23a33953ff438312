use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WeightsError {
    #[error("unknown weight key: '{0}'")]
    UnknownKey(String),
    #[error("missing required weight key: '{0}'")]
    MissingKey(WeightKey),
    #[error("weight '{key}' must be finite, got {value}")]
    NonFinite { key: WeightKey, value: f32 },
}

/// The fixed set of score components a weight can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightKey {
    Rpx,
    Ncontact,
    Plug,
    Hole,
}

impl WeightKey {
    pub const ALL: [WeightKey; 4] = [Self::Rpx, Self::Ncontact, Self::Plug, Self::Hole];

    pub fn name(self) -> &'static str {
        match self {
            Self::Rpx => "rpx",
            Self::Ncontact => "ncontact",
            Self::Plug => "plug",
            Self::Hole => "hole",
        }
    }
}

impl fmt::Display for WeightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WeightKey {
    type Err = WeightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| WeightsError::UnknownKey(s.to_string()))
    }
}

/// Linear weights of the score components.
///
/// `rpx` and `ncontact` combine the motif score and the raw contact count of one interface;
/// `plug` and `hole` weight the two interfaces of the plug protocol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Weights {
    pub rpx: f32,
    pub ncontact: f32,
    pub plug: f32,
    pub hole: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            rpx: 1.0,
            ncontact: 0.01,
            plug: 1.0,
            hole: 1.0,
        }
    }
}

impl Weights {
    /// Builds weights from named entries on top of the defaults.
    ///
    /// Every key must be known, and every key in `required` must be present among the entries.
    pub fn from_map<'a, I>(entries: I, required: &[WeightKey]) -> Result<Self, WeightsError>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut weights = Self::default();
        let mut seen = Vec::new();
        for (name, value) in entries {
            let key: WeightKey = name.parse()?;
            weights.set(key, value);
            seen.push(key);
        }
        if let Some(&missing) = required.iter().find(|k| !seen.contains(k)) {
            return Err(WeightsError::MissingKey(missing));
        }
        weights.validate()?;
        Ok(weights)
    }

    pub fn get(&self, key: WeightKey) -> f32 {
        match key {
            WeightKey::Rpx => self.rpx,
            WeightKey::Ncontact => self.ncontact,
            WeightKey::Plug => self.plug,
            WeightKey::Hole => self.hole,
        }
    }

    pub fn set(&mut self, key: WeightKey, value: f32) {
        match key {
            WeightKey::Rpx => self.rpx = value,
            WeightKey::Ncontact => self.ncontact = value,
            WeightKey::Plug => self.plug = value,
            WeightKey::Hole => self.hole = value,
        }
    }

    /// A copy with `key` replaced by `value`.
    pub fn with(mut self, key: WeightKey, value: f32) -> Self {
        self.set(key, value);
        self
    }

    pub fn validate(&self) -> Result<(), WeightsError> {
        for key in WeightKey::ALL {
            let value = self.get(key);
            if !value.is_finite() {
                return Err(WeightsError::NonFinite { key, value });
            }
        }
        Ok(())
    }
}
