use {
    crate::{
        domain::{
            error::AuditError,
            log_record::LogSubmission,
            task::{AuditTask, QueueClass},
        },
        services::log_writer::LogWriter,
    },
    std::{
        collections::HashMap,
        sync::{
            Arc,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
        time::Duration,
    },
    tokio::{
        sync::{Mutex, mpsc, watch},
        task::JoinHandle,
    },
    uuid::Uuid,
};

/// How often a draining worker checks back while redeliveries are in flight.
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// Producer side of the audit queue: one bounded channel per routing class.
#[derive(Clone)]
pub struct AuditQueue {
    senders: Arc<HashMap<QueueClass, mpsc::Sender<AuditTask>>>,
    closed: Arc<AtomicBool>,
    /// Redeliveries sleeping before they are put back on a channel.
    in_flight: Arc<AtomicUsize>,
}

/// Consumer side, handed to [`spawn_workers`].
pub struct QueueReceivers(HashMap<QueueClass, mpsc::Receiver<AuditTask>>);

impl AuditQueue {
    pub fn new(capacity: usize) -> (Self, QueueReceivers) {
        let mut senders = HashMap::new();
        let mut receivers = HashMap::new();
        for class in QueueClass::ALL {
            let (tx, rx) = mpsc::channel(capacity.max(1));
            senders.insert(class, tx);
            receivers.insert(class, rx);
        }
        (
            Self {
                senders: Arc::new(senders),
                closed: Arc::new(AtomicBool::new(false)),
                in_flight: Arc::new(AtomicUsize::new(0)),
            },
            QueueReceivers(receivers),
        )
    }

    /// Fire-and-forget handoff. Never waits for a worker; returns the task id.
    pub fn submit(&self, queue: QueueClass, submission: LogSubmission) -> Result<Uuid, AuditError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AuditError::QueueClosed(queue.to_string()));
        }
        let task = AuditTask::new(queue, submission);
        let id = task.id;
        self.sender(queue)?.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => AuditError::QueueFull(queue.to_string()),
            mpsc::error::TrySendError::Closed(_) => AuditError::QueueClosed(queue.to_string()),
        })?;
        tracing::debug!(task_id = %id, %queue, "audit task enqueued");
        Ok(id)
    }

    /// Shorthand used by request handlers: audit writes go to the short queue.
    pub fn log(&self, submission: LogSubmission) -> Result<Uuid, AuditError> {
        self.submit(QueueClass::Short, submission)
    }

    fn sender(&self, queue: QueueClass) -> Result<&mpsc::Sender<AuditTask>, AuditError> {
        self.senders
            .get(&queue)
            .ok_or_else(|| AuditError::QueueClosed(queue.to_string()))
    }

    /// Refuse new submissions. Tasks already queued are still processed.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn redeliveries_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Put a failed task back on its queue after `delay`, or as soon as
    /// shutdown is signalled.
    fn redeliver(&self, task: AuditTask, delay: Duration, mut shutdown: watch::Receiver<bool>) {
        let Ok(tx) = self.sender(task.queue).cloned() else {
            tracing::error!(task_id = %task.id, "no queue to redeliver audit task to");
            return;
        };
        let in_flight = self.in_flight.clone();
        in_flight.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = stop_requested(&mut shutdown) => {}
            }
            let task_id = task.id;
            if tx.send(task).await.is_err() {
                tracing::error!(task_id = %task_id, "queue closed, audit task lost");
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    pub workers_per_queue: usize,
    /// Deliveries per task before it is dropped.
    pub max_attempts: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            workers_per_queue: 2,
            max_attempts: 5,
        }
    }
}

/// Exponential redelivery delay: 2^attempt seconds, capped at ~4 minutes.
pub fn redelivery_backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(8))
}

/// Start `workers_per_queue` workers for every routing class.
pub fn spawn_workers(
    writer: LogWriter,
    queue: AuditQueue,
    receivers: QueueReceivers,
    config: WorkerConfig,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();
    for (class, rx) in receivers.0 {
        let rx = Arc::new(Mutex::new(rx));
        for n in 0..config.workers_per_queue.max(1) {
            handles.push(tokio::spawn(run_worker(
                format!("{class}-{n}"),
                writer.clone(),
                queue.clone(),
                rx.clone(),
                config.max_attempts,
                shutdown.clone(),
            )));
        }
    }
    handles
}

async fn run_worker(
    name: String,
    writer: LogWriter,
    queue: AuditQueue,
    rx: Arc<Mutex<mpsc::Receiver<AuditTask>>>,
    max_attempts: u32,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::debug!(worker = %name, "audit worker started");

    loop {
        let task = tokio::select! {
            biased;
            _ = stop_requested(&mut shutdown) => break,
            task = async { rx.lock().await.recv().await } => task,
        };

        let Some(task) = task else {
            tracing::debug!(worker = %name, "audit queue closed");
            return;
        };

        process_task(&writer, &queue, task, max_attempts, &shutdown).await;
    }

    tracing::debug!(worker = %name, "audit worker draining");
    let mut drained = 0usize;
    loop {
        // Read the counter before polling: a redelivery sends before it
        // decrements, so zero here plus an empty channel means nothing is left.
        let in_flight = queue.redeliveries_in_flight();
        let next = rx.lock().await.try_recv();
        match next {
            Ok(task) => {
                drained += 1;
                process_task(&writer, &queue, task, max_attempts, &shutdown).await;
            }
            Err(mpsc::error::TryRecvError::Empty) if in_flight > 0 => {
                tokio::time::sleep(DRAIN_POLL).await;
            }
            Err(_) => break,
        }
    }
    tracing::debug!(worker = %name, drained, "audit worker stopped");
}

/// Resolves once shutdown has been signalled or the sender is gone.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

async fn process_task(
    writer: &LogWriter,
    queue: &AuditQueue,
    task: AuditTask,
    max_attempts: u32,
    shutdown: &watch::Receiver<bool>,
) {
    match writer.write(task.id, task.submission.clone()).await {
        Ok(record) => {
            tracing::info!(task_id = %task.id, queue = %task.queue, record_id = ?record.id, "audit task processed");
        }
        Err(e) => {
            let attempt = task.attempt + 1;
            if attempt >= max_attempts {
                tracing::error!(task_id = %task.id, attempt, error = %e, "audit task failed permanently, dropping");
                return;
            }
            let delay = redelivery_backoff(attempt);
            tracing::warn!(task_id = %task.id, attempt, ?delay, error = %e, "audit task failed, scheduling redelivery");
            queue.redeliver(AuditTask { attempt, ..task }, delay, shutdown.clone());
        }
    }
}
