use serde::{Deserialize, Serialize};

/// Which store actually answered a request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreMode {
    /// The durable primary store.
    #[serde(rename = "primary")]
    Primary,
    /// The process-local fallback store. Nothing here survives a restart,
    /// so voters must be told they are in demo mode.
    #[serde(rename = "demo")]
    Fallback,
}

impl StoreMode {
    pub fn is_degraded(self) -> bool {
        self == Self::Fallback
    }
}

/// A result together with the mode of the store that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Served<T> {
    pub mode: StoreMode,
    pub data: T,
}

impl<T> Served<T> {
    pub fn new(mode: StoreMode, data: T) -> Self {
        Self { mode, data }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Served<U> {
        Served {
            mode: self.mode,
            data: f(self.data),
        }
    }
}
