use serde::{Deserialize, Serialize};

/// On a failed read `data` is the empty fallback and `degraded` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub degraded: bool,
}

impl<T> Fetched<T> {
    pub fn fresh(data: T) -> Self {
        Self {
            data,
            degraded: false,
        }
    }

    pub fn degraded(data: T) -> Self {
        Self {
            data,
            degraded: true,
        }
    }

    pub fn into_inner(self) -> T {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            degraded: self.degraded,
        }
    }
}

impl<T: Default> Fetched<T> {
    pub fn fallback() -> Self {
        Self::degraded(T::default())
    }
}
