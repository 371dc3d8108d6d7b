//! Drag reordering of the admin screen list

use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use thiserror::Error;

use super::screens;

#[derive(Debug, Error)]
pub enum ReorderError {
    #[error("Index {index} is out of range for a list of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Failed to start reorder transaction: {0}")]
    Begin(#[source] sqlx::Error),

    #[error("Failed to commit reorder: {0}")]
    Commit(#[source] sqlx::Error),

    #[error("Failed to persist position {position} for screen {screen_id}: {source}")]
    Persist {
        position: usize,
        screen_id: i64,
        #[source]
        source: sqlx::Error,
    },
}

/// Remove the item at `from` and insert it at `to`
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), ReorderError> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(ReorderError::IndexOutOfRange { index, len });
        }
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

/// Where display positions are written
pub trait DisplayOrderStore {
    fn set_display_order(
        &mut self,
        screen_id: i64,
        position: i32,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

/// An open unit of position writes. Dropping it without `commit_order`
/// discards every write made through it.
pub trait OrderTransaction: DisplayOrderStore + Send {
    fn commit_order(self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

/// Source of reorder transactions
pub trait ReorderBackend: Sync {
    type Tx: OrderTransaction;

    fn begin_reorder(&self) -> impl Future<Output = Result<Self::Tx, sqlx::Error>> + Send;
}

impl DisplayOrderStore for Transaction<'static, Postgres> {
    async fn set_display_order(&mut self, screen_id: i64, position: i32) -> Result<(), sqlx::Error> {
        screens::set_display_order(&mut **self, screen_id, position).await
    }
}

impl OrderTransaction for Transaction<'static, Postgres> {
    async fn commit_order(self) -> Result<(), sqlx::Error> {
        Transaction::commit(self).await
    }
}

impl ReorderBackend for PgPool {
    type Tx = Transaction<'static, Postgres>;

    async fn begin_reorder(&self) -> Result<Self::Tx, sqlx::Error> {
        PgPool::begin(self).await
    }
}

/// Write every row's zero-based position, one awaited update at a time.
/// Stops at the first failure; callers wanting all-or-nothing run this
/// inside a transaction.
pub async fn persist_display_order<S>(store: &mut S, screen_ids: &[i64]) -> Result<usize, ReorderError>
where
    S: DisplayOrderStore + Send,
{
    for (position, &screen_id) in screen_ids.iter().enumerate() {
        store
            .set_display_order(screen_id, position as i32)
            .await
            .map_err(|source| ReorderError::Persist {
                position,
                screen_id,
                source,
            })?;
    }
    Ok(screen_ids.len())
}

/// Move one item and rewrite every position in a single transaction.
/// Out-of-range indices fail before anything is written; a failed row
/// rolls back the rows written before it.
pub async fn reorder<B, T, F>(
    backend: &B,
    items: &mut Vec<T>,
    from: usize,
    to: usize,
    id_of: F,
) -> Result<(), ReorderError>
where
    B: ReorderBackend,
    F: Fn(&T) -> i64,
{
    move_item(items, from, to)?;
    let ids: Vec<i64> = items.iter().map(id_of).collect();

    let mut tx = backend.begin_reorder().await.map_err(ReorderError::Begin)?;
    persist_display_order(&mut tx, &ids).await?;
    tx.commit_order().await.map_err(ReorderError::Commit)
}

#[cfg(test)]
mod tests {
    use super::test_backend::table_of;
    use super::*;

    #[derive(Default)]
    struct RecordingStore {
        calls: Vec<(i64, i32)>,
        fail_at: Option<usize>,
    }

    impl DisplayOrderStore for RecordingStore {
        async fn set_display_order(&mut self, screen_id: i64, position: i32) -> Result<(), sqlx::Error> {
            if self.fail_at == Some(self.calls.len()) {
                return Err(sqlx::Error::RowNotFound);
            }
            self.calls.push((screen_id, position));
            Ok(())
        }
    }

    #[tokio::test]
    async fn drag_index_two_to_front_persists_every_row_in_order() {
        let mut ids = vec![10, 11, 12, 13, 14];
        move_item(&mut ids, 2, 0).expect("valid move");
        assert_eq!(ids, vec![12, 10, 11, 13, 14]);

        let mut store = RecordingStore::default();
        let written = persist_display_order(&mut store, &ids).await.expect("persisted");

        assert_eq!(written, 5);
        assert_eq!(
            store.calls,
            vec![(12, 0), (10, 1), (11, 2), (13, 3), (14, 4)]
        );
    }

    #[test]
    fn move_to_end_and_noop() {
        let mut items = vec!['a', 'b', 'c'];
        move_item(&mut items, 0, 2).expect("valid move");
        assert_eq!(items, vec!['b', 'c', 'a']);

        move_item(&mut items, 1, 1).expect("valid move");
        assert_eq!(items, vec!['b', 'c', 'a']);
    }

    #[test]
    fn out_of_range_leaves_list_untouched() {
        let mut items = vec![1, 2, 3];
        let err = move_item(&mut items, 1, 3).unwrap_err();
        assert!(matches!(err, ReorderError::IndexOutOfRange { index: 3, len: 3 }));
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn persistence_stops_at_first_failure() {
        let mut store = RecordingStore {
            fail_at: Some(2),
            ..Default::default()
        };
        let err = persist_display_order(&mut store, &[1, 2, 3, 4])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReorderError::Persist {
                position: 2,
                screen_id: 3,
                ..
            }
        ));
        assert_eq!(store.calls, vec![(1, 0), (2, 1)]);
    }

    #[tokio::test]
    async fn reorder_commits_every_position() {
        let table = table_of(&[10, 11, 12, 13, 14], None);
        let mut ids = vec![10, 11, 12, 13, 14];

        reorder(&table, &mut ids, 2, 0, |id| *id).await.expect("reordered");

        assert_eq!(ids, vec![12, 10, 11, 13, 14]);
        let committed = table.committed.lock().expect("lock").clone();
        assert_eq!(committed[&12], 0);
        assert_eq!(committed[&10], 1);
        assert_eq!(committed[&14], 4);
    }

    #[tokio::test]
    async fn failed_row_rolls_back_earlier_writes() {
        let table = table_of(&[10, 11, 12, 13, 14], Some(3));
        let before = table.committed.lock().expect("lock").clone();
        let mut ids = vec![10, 11, 12, 13, 14];

        let err = reorder(&table, &mut ids, 4, 0, |id| *id).await.unwrap_err();

        assert!(matches!(err, ReorderError::Persist { position: 3, screen_id: 12, .. }));
        assert_eq!(*table.committed.lock().expect("lock"), before);
    }

    #[tokio::test]
    async fn out_of_range_move_writes_nothing() {
        let table = table_of(&[10, 11, 12, 13, 14], None);
        let before = table.committed.lock().expect("lock").clone();
        let mut ids = vec![10, 11, 12, 13, 14];

        let err = reorder(&table, &mut ids, 5, 0, |id| *id).await.unwrap_err();

        assert!(matches!(err, ReorderError::IndexOutOfRange { index: 5, len: 5 }));
        assert_eq!(*table.begun.lock().expect("lock"), 0);
        assert_eq!(*table.committed.lock().expect("lock"), before);
        assert_eq!(ids, vec![10, 11, 12, 13, 14]);
    }
}

/// In-memory `ReorderBackend` whose writes only land on commit
#[cfg(test)]
pub(crate) mod test_backend {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Positions become visible only when a transaction commits
    #[derive(Clone, Default)]
    pub(crate) struct FakeTable {
        pub committed: Arc<Mutex<HashMap<i64, i32>>>,
        pub begun: Arc<Mutex<usize>>,
        pub fail_at: Option<usize>,
    }

    pub(crate) struct FakeTx {
        table: FakeTable,
        pending: Vec<(i64, i32)>,
    }

    impl DisplayOrderStore for FakeTx {
        async fn set_display_order(&mut self, screen_id: i64, position: i32) -> Result<(), sqlx::Error> {
            if self.table.fail_at == Some(self.pending.len()) {
                return Err(sqlx::Error::RowNotFound);
            }
            self.pending.push((screen_id, position));
            Ok(())
        }
    }

    impl OrderTransaction for FakeTx {
        async fn commit_order(self) -> Result<(), sqlx::Error> {
            self.table.committed.lock().expect("lock").extend(self.pending);
            Ok(())
        }
    }

    impl ReorderBackend for FakeTable {
        type Tx = FakeTx;

        async fn begin_reorder(&self) -> Result<FakeTx, sqlx::Error> {
            *self.begun.lock().expect("lock") += 1;
            Ok(FakeTx {
                table: self.clone(),
                pending: Vec::new(),
            })
        }
    }

    pub(crate) fn table_of(ids: &[i64], fail_at: Option<usize>) -> FakeTable {
        let table = FakeTable {
            fail_at,
            ..Default::default()
        };
        table
            .committed
            .lock()
            .expect("lock")
            .extend(ids.iter().enumerate().map(|(i, &id)| (id, i as i32)));
        table
    }
}
