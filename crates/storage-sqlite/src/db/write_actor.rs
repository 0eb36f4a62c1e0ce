use super::DbPool;
use crate::errors::StorageError;
use diesel::SqliteConnection;
use log::error;
use std::any::Any;
use tokio::sync::{mpsc, oneshot};
use tokenrate_core::errors::{DatabaseError, Result};

// A write job runs against the actor's connection. Results are type-erased
// so a single channel can carry jobs of any return type.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;
type ErasedResult = Result<Box<dyn Any + Send + 'static>>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(Job<Box<dyn Any + Send + 'static>>, oneshot::Sender<ErasedResult>)>,
}

impl WriteHandle {
    /// Runs `job` on the writer's dedicated connection inside an immediate
    /// transaction and returns its outcome.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| DatabaseError::Internal("writer actor has stopped".to_string()))?;

        let boxed = ret_rx.await.map_err(|_| {
            DatabaseError::Internal("writer actor dropped the reply".to_string())
        })??;

        boxed
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| DatabaseError::Internal("unexpected writer result type".to_string()).into())
    }
}

/// Spawns the single database writer.
///
/// The actor holds one pooled connection for its whole lifetime and runs
/// jobs serially. It stops once every [`WriteHandle`] is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) =
        mpsc::channel::<(Job<Box<dyn Any + Send + 'static>>, oneshot::Sender<ErasedResult>)>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Writer actor could not get a database connection: {}", e);
                let reason = e.to_string();
                while let Some((_, reply_tx)) = rx.recv().await {
                    let _ = reply_tx.send(Err(DatabaseError::ConnectionFailed(reason.clone()).into()));
                }
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: ErasedResult = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(|e: StorageError| e.into());

            // The requester may have gone away; nothing to do then.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
