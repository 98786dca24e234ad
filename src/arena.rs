//! Bump arena with nested temporary scopes.
//!
//! All transient and permanent bake memory (font file bytes, glyph coverage
//! bitmaps, the final atlas) comes out of one pre-sized block. Memory is only
//! ever reclaimed by closing a [`TempScope`], which rolls `used` back to the
//! offset recorded when the scope was opened.

use std::error::Error;
use std::fmt;

/// Handle to a region handed out by [`Arena::push`].
///
/// Handles are plain offsets; resolving one through [`Arena::bytes`] fails
/// once a temporary scope that covered it has been closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaBlock {
    offset: usize,
    len: usize,
}

impl ArenaBlock {
    #[cfg(test)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Checkpoint returned by [`Arena::begin_temp`].
///
/// Must be handed back to [`Arena::end_temp`] of the same arena, innermost
/// scope first. Not `Clone`: a scope can be closed only once.
#[derive(Debug)]
#[must_use = "a temporary scope must be closed with Arena::end_temp"]
pub struct TempScope {
    old_used: usize,
    depth: usize,
}

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The backing block could not be acquired.
    BackingAllocation {
        /// Number of bytes requested for the block.
        size: usize,
    },
    /// A push would leave no slack byte at the end of the block.
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes already in use.
        used: usize,
        /// Total size of the block.
        capacity: usize,
    },
    /// A scope was closed out of LIFO order.
    ScopeOrder {
        /// Depth of the scope handed to `end_temp`.
        scope_depth: usize,
        /// Depth of the innermost open scope.
        open_depth: usize,
    },
    /// A block handle points into memory released by a closed scope.
    StaleBlock {
        /// Offset of the block.
        offset: usize,
        /// Length of the block.
        len: usize,
        /// Bytes in use when the handle was resolved.
        used: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackingAllocation { size } => {
                write!(f, "failed to allocate arena block of {size} bytes")
            }
            Self::CapacityExceeded {
                requested,
                used,
                capacity,
            } => {
                write!(
                    f,
                    "arena exhausted: requested {requested} bytes with {used} of {capacity} bytes in use"
                )
            }
            Self::ScopeOrder {
                scope_depth,
                open_depth,
            } => {
                write!(
                    f,
                    "temporary scope closed out of order: scope depth {scope_depth}, innermost open depth {open_depth}"
                )
            }
            Self::StaleBlock { offset, len, used } => {
                write!(
                    f,
                    "stale arena block {offset}..{} (arena uses {used} bytes)",
                    offset + len
                )
            }
        }
    }
}

impl Error for ArenaError {}

/// Bump allocator over a single pre-sized block.
pub struct Arena {
    /// Backing storage. Sized once in `new`, never grows.
    base: Vec<u8>,
    /// Bump offset. Invariant: `used <= base.len()`.
    used: usize,
    /// `used` snapshots of the open temporary scopes, innermost last.
    checkpoints: Vec<usize>,
}

impl Arena {
    /// Acquires a zeroed block of `size` bytes.
    pub fn new(size: usize) -> Result<Self, ArenaError> {
        let mut base = Vec::new();
        base.try_reserve_exact(size)
            .map_err(|_| ArenaError::BackingAllocation { size })?;
        base.resize(size, 0);
        Ok(Self {
            base,
            used: 0,
            checkpoints: Vec::new(),
        })
    }

    /// Hands out `size` fresh bytes at the current offset.
    ///
    /// The check is strict (`used + size < capacity`), so the last byte of the
    /// block is never handed out.
    pub fn push(&mut self, size: usize) -> Result<ArenaBlock, ArenaError> {
        let exceeded = ArenaError::CapacityExceeded {
            requested: size,
            used: self.used,
            capacity: self.base.len(),
        };
        let new_used = self.used.checked_add(size).ok_or(exceeded.clone())?;
        if new_used >= self.base.len() {
            return Err(exceeded);
        }
        let block = ArenaBlock {
            offset: self.used,
            len: size,
        };
        self.used = new_used;
        Ok(block)
    }

    /// Pushes `bytes.len()` bytes and copies `bytes` into them.
    pub fn push_copy(&mut self, bytes: &[u8]) -> Result<ArenaBlock, ArenaError> {
        let block = self.push(bytes.len())?;
        self.base[block.offset..block.end()].copy_from_slice(bytes);
        Ok(block)
    }

    /// Opens a temporary scope at the current offset.
    pub fn begin_temp(&mut self) -> TempScope {
        self.checkpoints.push(self.used);
        TempScope {
            old_used: self.used,
            depth: self.checkpoints.len(),
        }
    }

    /// Closes `scope`, zero-filling everything pushed since it was opened.
    pub fn end_temp(&mut self, scope: TempScope) -> Result<(), ArenaError> {
        let open_depth = self.checkpoints.len();
        if scope.depth != open_depth || self.checkpoints.last() != Some(&scope.old_used) {
            return Err(ArenaError::ScopeOrder {
                scope_depth: scope.depth,
                open_depth,
            });
        }
        self.checkpoints.pop();
        self.base[scope.old_used..self.used].fill(0);
        log::trace!(
            "arena: released {} bytes (depth {open_depth})",
            self.used - scope.old_used
        );
        self.used = scope.old_used;
        Ok(())
    }

    pub fn bytes(&self, block: &ArenaBlock) -> Result<&[u8], ArenaError> {
        self.check_live(block)?;
        Ok(&self.base[block.offset..block.end()])
    }

    pub fn bytes_mut(&mut self, block: &ArenaBlock) -> Result<&mut [u8], ArenaError> {
        self.check_live(block)?;
        Ok(&mut self.base[block.offset..block.end()])
    }

    /// Splits the live region into `block` (mutable) and everything pushed
    /// after it (read-only).
    pub fn split_at_block(
        &mut self,
        block: &ArenaBlock,
    ) -> Result<(&mut [u8], ArenaTail<'_>), ArenaError> {
        self.check_live(block)?;
        let (head, tail) = self.base[..self.used].split_at_mut(block.end());
        let target = &mut head[block.offset..];
        Ok((
            target,
            ArenaTail {
                bytes: tail,
                start: block.end(),
            },
        ))
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn capacity(&self) -> usize {
        self.base.len()
    }

    /// Number of open temporary scopes.
    pub fn depth(&self) -> usize {
        self.checkpoints.len()
    }

    /// Logs the live region as little-endian `i32` words at trace level.
    pub fn trace_dump(&self) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        let words: Vec<String> = self.base[..self.used]
            .chunks_exact(4)
            .map(|w| i32::from_le_bytes([w[0], w[1], w[2], w[3]]).to_string())
            .collect();
        log::trace!("arena dump ({} bytes): {}", self.used, words.join(" "));
    }

    fn check_live(&self, block: &ArenaBlock) -> Result<(), ArenaError> {
        if block.end() > self.used {
            return Err(ArenaError::StaleBlock {
                offset: block.offset,
                len: block.len,
                used: self.used,
            });
        }
        Ok(())
    }
}

/// Read-only view of the arena past a split point.
pub struct ArenaTail<'a> {
    bytes: &'a [u8],
    start: usize,
}

impl ArenaTail<'_> {
    /// Resolves a block that was pushed after the split point.
    pub fn bytes(&self, block: &ArenaBlock) -> Result<&[u8], ArenaError> {
        let stale = ArenaError::StaleBlock {
            offset: block.offset,
            len: block.len,
            used: self.start + self.bytes.len(),
        };
        let begin = block.offset.checked_sub(self.start).ok_or(stale.clone())?;
        self.bytes.get(begin..begin + block.len).ok_or(stale)
    }
}

#[cfg(test)]
#[path = "../tests/unit/arena.rs"]
mod tests;
