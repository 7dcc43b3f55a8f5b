//! Currently published board, swapped atomically by the refresh pipeline

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::common::types::Board;

/// Holder of the current board
///
/// Readers clone the `Arc` under a short read lock and then work on an
/// immutable board; publishing replaces the pointer under the write lock.
#[derive(Debug)]
pub struct BoardState {
    current: RwLock<Arc<Board>>,
}

impl BoardState {
    pub fn new(initial: Board) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The board that is current right now
    pub async fn current(&self) -> Arc<Board> {
        self.current.read().await.clone()
    }

    /// Make `board` current, returning the one it replaced
    pub async fn publish(&self, board: Board) -> Arc<Board> {
        let next = Arc::new(board);
        let mut guard = self.current.write().await;
        std::mem::replace(&mut *guard, next)
    }
}
