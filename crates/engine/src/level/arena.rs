use std::mem;

use super::LevelError;

pub const DEFAULT_LEVEL_ARENA_BYTES: usize = 1024 * 1024;

/// Byte budget for storage that lives exactly as long as one level.
///
/// Allocations are reserved fallibly and counted against the budget; the
/// storage itself is owned by whatever the arena handed it to.
#[derive(Debug, Clone)]
pub struct LevelArena {
    budget_bytes: usize,
    used_bytes: usize,
}

impl Default for LevelArena {
    fn default() -> Self {
        Self::with_budget(DEFAULT_LEVEL_ARENA_BYTES)
    }
}

impl LevelArena {
    pub fn with_budget(budget_bytes: usize) -> Self {
        Self {
            budget_bytes,
            used_bytes: 0,
        }
    }

    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn remaining_bytes(&self) -> usize {
        self.budget_bytes.saturating_sub(self.used_bytes)
    }

    /// Releases every accounted byte, for when the level that owned them is gone.
    pub fn reset(&mut self) {
        self.used_bytes = 0;
    }

    pub fn alloc_filled<T: Clone>(&mut self, len: usize, value: T) -> Result<Vec<T>, LevelError> {
        let available_bytes = self.remaining_bytes();
        let requested_bytes = mem::size_of::<T>().checked_mul(len).ok_or(
            LevelError::AllocationFailure {
                requested_bytes: usize::MAX,
                available_bytes,
            },
        )?;
        if requested_bytes > available_bytes {
            return Err(LevelError::AllocationFailure {
                requested_bytes,
                available_bytes,
            });
        }

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(len)
            .map_err(|_| LevelError::AllocationFailure {
                requested_bytes,
                available_bytes,
            })?;
        storage.resize(len, value);
        self.used_bytes += requested_bytes;
        Ok(storage)
    }
}
