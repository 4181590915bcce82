//! Classification orchestrator implementation.
//!
//! Producer side persists a PENDING ticket and schedules a task on a bounded
//! queue; a fixed pool of workers drains the queue and drives each ticket
//! through PROCESSING to CLASSIFIED or FAILED.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc, Mutex as AsyncMutex};
use tracing::{debug, info, warn};

use crate::classifier::Classifier;
use crate::config::OrchestratorConfig;
use crate::metrics;
use crate::ticket::{CreateTicketRequest, Ticket, TicketFilter, TicketStatus, TicketStore};

use super::types::{ClassificationTask, OrchestratorError, OrchestratorStatus};

type SharedTaskRx = Arc<AsyncMutex<mpsc::Receiver<ClassificationTask>>>;

/// The triage orchestrator - schedules and runs ticket classification.
pub struct TriageOrchestrator {
    config: OrchestratorConfig,
    ticket_store: Arc<dyn TicketStore>,
    classifier: Arc<dyn Classifier>,

    task_tx: mpsc::Sender<ClassificationTask>,
    // Handed to the worker pool on first start().
    task_rx: StdMutex<Option<mpsc::Receiver<ClassificationTask>>>,

    // Runtime state
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl TriageOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: OrchestratorConfig,
        ticket_store: Arc<dyn TicketStore>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        let (task_tx, task_rx) = mpsc::channel(config.queue_capacity);
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            ticket_store,
            classifier,
            task_tx,
            task_rx: StdMutex::new(Some(task_rx)),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Start the orchestrator (spawns the worker pool).
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Orchestrator already running");
            return;
        }

        let Some(task_rx) = self.task_rx.lock().unwrap().take() else {
            warn!("Orchestrator cannot be restarted after stop");
            self.running.store(false, Ordering::SeqCst);
            return;
        };

        info!(workers = self.config.workers, "Starting triage orchestrator");

        let task_rx: SharedTaskRx = Arc::new(AsyncMutex::new(task_rx));
        for worker_id in 0..self.config.workers {
            self.spawn_worker(worker_id, Arc::clone(&task_rx));
        }

        info!("Triage orchestrator started");
    }

    /// Stop the orchestrator gracefully.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Orchestrator not running");
            return;
        }

        info!("Stopping triage orchestrator");

        // Signal shutdown to all workers
        let _ = self.shutdown_tx.send(());

        // Give workers a moment to finish current work
        tokio::time::sleep(Duration::from_millis(500)).await;

        info!("Triage orchestrator stopped");
    }

    /// Get current orchestrator status.
    pub async fn status(&self) -> OrchestratorStatus {
        let queued_tasks = self.task_tx.max_capacity() - self.task_tx.capacity();

        let pending_count = self
            .ticket_store
            .count(&TicketFilter::new().with_status(TicketStatus::Pending))
            .unwrap_or(0) as usize;

        let processing_count = self
            .ticket_store
            .count(&TicketFilter::new().with_status(TicketStatus::Processing))
            .unwrap_or(0) as usize;

        OrchestratorStatus {
            running: self.running.load(Ordering::Relaxed),
            workers: self.config.workers,
            queued_tasks,
            pending_count,
            processing_count,
        }
    }

    /// Create a ticket and schedule it for classification.
    ///
    /// The ticket is returned immediately in PENDING status; classification
    /// happens in the background. Scheduling is fire-and-forget: a full
    /// queue logs a warning and never fails the creation.
    pub fn create_ticket(
        &self,
        request: CreateTicketRequest,
    ) -> Result<Ticket, OrchestratorError> {
        let ticket = self.ticket_store.create(request)?;
        metrics::TICKETS_CREATED.inc();
        info!(ticket_id = %ticket.id, "ticket created");

        self.schedule(&ticket.id);

        Ok(ticket)
    }

    /// Schedule an existing ticket for classification, non-blocking.
    pub fn schedule(&self, ticket_id: &str) {
        let task = ClassificationTask {
            ticket_id: ticket_id.to_string(),
        };
        match self.task_tx.try_send(task) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(task)) => {
                metrics::TASKS_DROPPED.with_label_values(&["queue_full"]).inc();
                warn!(
                    ticket_id = %task.ticket_id,
                    capacity = self.config.queue_capacity,
                    "task queue full, ticket will stay PENDING"
                );
            }
            Err(mpsc::error::TrySendError::Closed(task)) => {
                metrics::TASKS_DROPPED
                    .with_label_values(&["queue_closed"])
                    .inc();
                warn!(
                    ticket_id = %task.ticket_id,
                    "task queue closed, ticket will stay PENDING"
                );
            }
        }
    }

    fn spawn_worker(&self, worker_id: usize, task_rx: SharedTaskRx) {
        let running = Arc::clone(&self.running);
        let ticket_store = Arc::clone(&self.ticket_store);
        let classifier = Arc::clone(&self.classifier);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            debug!(worker_id, "classification worker started");
            loop {
                let task = tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!(worker_id, "classification worker received shutdown signal");
                        break;
                    }
                    task = Self::next_task(&task_rx) => {
                        match task {
                            Some(task) => task,
                            None => break, // channel closed
                        }
                    }
                };

                if !running.load(Ordering::Relaxed) {
                    break;
                }

                Self::handle_task(&ticket_store, classifier.as_ref(), task).await;
            }
            debug!(worker_id, "classification worker stopped");
        });
    }

    async fn next_task(task_rx: &SharedTaskRx) -> Option<ClassificationTask> {
        task_rx.lock().await.recv().await
    }

    /// Run one classification task end to end.
    async fn handle_task(
        ticket_store: &Arc<dyn TicketStore>,
        classifier: &dyn Classifier,
        task: ClassificationTask,
    ) {
        let started = Instant::now();

        let ticket = match ticket_store.get(&task.ticket_id) {
            Ok(Some(ticket)) => ticket,
            Ok(None) => {
                // The row is gone; nothing to classify and nothing to mark.
                debug!(ticket_id = %task.ticket_id, "ticket vanished before classification");
                metrics::CLASSIFICATIONS_TOTAL
                    .with_label_values(&["missing"])
                    .inc();
                return;
            }
            Err(e) => {
                warn!(ticket_id = %task.ticket_id, error = %e, "could not load ticket");
                metrics::CLASSIFICATIONS_TOTAL
                    .with_label_values(&["failed"])
                    .inc();
                return;
            }
        };

        let outcome = match Self::classify_ticket(ticket_store, classifier, ticket).await {
            Ok(()) => "classified",
            Err(e) => {
                warn!(ticket_id = %task.ticket_id, error = %e, "classification failed");
                Self::fail_ticket(ticket_store, &task.ticket_id, &e.to_string());
                "failed"
            }
        };

        metrics::CLASSIFICATIONS_TOTAL
            .with_label_values(&[outcome])
            .inc();
        metrics::CLASSIFICATION_DURATION
            .with_label_values(&[outcome])
            .observe(started.elapsed().as_secs_f64());
    }

    async fn classify_ticket(
        ticket_store: &Arc<dyn TicketStore>,
        classifier: &dyn Classifier,
        mut ticket: Ticket,
    ) -> Result<(), OrchestratorError> {
        ticket.mark_processing()?;
        ticket_store.update(&ticket)?;

        let result = classifier
            .classify(&ticket.subject, &ticket.description)
            .await?;

        ticket.mark_classified(result.category, result.priority, result.sentiment)?;
        ticket_store.update(&ticket)?;

        info!(
            ticket_id = %ticket.id,
            category = result.category.as_str(),
            priority = result.priority.as_str(),
            sentiment = result.sentiment,
            "ticket classified"
        );

        Ok(())
    }

    /// Record a classification failure on the ticket, tolerating a ticket
    /// that has vanished in the meantime.
    fn fail_ticket(ticket_store: &Arc<dyn TicketStore>, ticket_id: &str, message: &str) {
        match ticket_store.get(ticket_id) {
            Ok(Some(mut ticket)) => {
                if let Err(e) = ticket.mark_failed(message) {
                    warn!(ticket_id, error = %e, "could not mark ticket failed");
                    return;
                }
                if let Err(e) = ticket_store.update(&ticket) {
                    warn!(ticket_id, error = %e, "could not persist failed ticket");
                }
            }
            Ok(None) => {
                debug!(ticket_id, "ticket vanished before failure was recorded");
            }
            Err(e) => {
                warn!(ticket_id, error = %e, "could not load ticket to record failure");
            }
        }
    }
}
