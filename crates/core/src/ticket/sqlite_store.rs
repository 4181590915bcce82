//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{
    Category, CreateTicketRequest, Priority, Ticket, TicketError, TicketFilter, TicketStats,
    TicketStatus, TicketStore,
};

const TICKET_COLUMNS: &str =
    "id, subject, description, status, category, priority, sentiment, error_message, created_at, updated_at";

/// SQLite-backed ticket store.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path).map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id TEXT PRIMARY KEY,
                subject TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL,
                category TEXT,
                priority TEXT,
                sentiment INTEGER,
                error_message TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
            CREATE INDEX IF NOT EXISTS idx_tickets_category ON tickets(category);
            CREATE INDEX IF NOT EXISTS idx_tickets_priority ON tickets(priority);
            CREATE INDEX IF NOT EXISTS idx_tickets_created_at ON tickets(created_at);
            "#,
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(())
    }

    fn build_where_clause(filter: &TicketFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(Box::new(status.as_str()));
        }

        if let Some(category) = filter.category {
            conditions.push("category = ?");
            params.push(Box::new(category.as_str()));
        }

        if let Some(priority) = filter.priority {
            conditions.push("priority = ?");
            params.push(Box::new(priority.as_str()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        let id: String = row.get(0)?;
        let subject: String = row.get(1)?;
        let description: String = row.get(2)?;
        let status_str: String = row.get(3)?;
        let category_str: Option<String> = row.get(4)?;
        let priority_str: Option<String> = row.get(5)?;
        let sentiment: Option<u8> = row.get(6)?;
        let error_message: Option<String> = row.get(7)?;
        let created_at_str: String = row.get(8)?;
        let updated_at_str: String = row.get(9)?;

        // Parse timestamps - use current time if parsing fails (shouldn't happen with valid data)
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let status = TicketStatus::from_str_token(&status_str).unwrap_or(TicketStatus::Pending);
        let category = category_str.as_deref().and_then(Category::from_str_token);
        let priority = priority_str.as_deref().and_then(Priority::from_str_token);

        Ok(Ticket {
            id,
            subject,
            description,
            status,
            category,
            priority,
            sentiment,
            created_at,
            updated_at,
            error_message,
        })
    }
}

impl TicketStore for SqliteTicketStore {
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let status = TicketStatus::Pending;

        conn.execute(
            "INSERT INTO tickets (id, subject, description, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                id,
                request.subject,
                request.description,
                status.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(Ticket {
            id,
            subject: request.subject,
            description: request.description,
            status,
            category: None,
            priority: None,
            sentiment: None,
            created_at: now,
            updated_at: now,
            error_message: None,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            &format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS),
            params![id],
            Self::row_to_ticket,
        );

        match result {
            Ok(ticket) => Ok(Some(ticket)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TicketError::Database(e.to_string())),
        }
    }

    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!(
            "SELECT {} FROM tickets {} ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
            TICKET_COLUMNS, where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_ticket)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let mut tickets = Vec::new();
        for row_result in rows {
            let ticket = row_result.map_err(|e| TicketError::Database(e.to_string()))?;
            tickets.push(ticket);
        }

        Ok(tickets)
    }

    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!("SELECT COUNT(*) FROM tickets {}", where_clause);

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let count: i64 = conn
            .query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(count)
    }

    fn update(&self, ticket: &Ticket) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        let now = Utc::now();

        let changed = conn
            .execute(
                "UPDATE tickets SET subject = ?, description = ?, status = ?, category = ?, priority = ?, sentiment = ?, error_message = ?, updated_at = ? WHERE id = ?",
                params![
                    ticket.subject,
                    ticket.description,
                    ticket.status.as_str(),
                    ticket.category.map(|c| c.as_str()),
                    ticket.priority.map(|p| p.as_str()),
                    ticket.sentiment,
                    ticket.error_message,
                    now.to_rfc3339(),
                    ticket.id,
                ],
            )
            .map_err(|e| TicketError::Database(e.to_string()))?;

        if changed == 0 {
            return Err(TicketError::NotFound(ticket.id.clone()));
        }

        Ok(Ticket {
            updated_at: now,
            ..ticket.clone()
        })
    }

    fn stats(&self) -> Result<TicketStats, TicketError> {
        let conn = self.conn.lock().unwrap();

        let mut stats = TicketStats::empty();

        stats.total_tickets = conn
            .query_row("SELECT COUNT(*) FROM tickets", [], |row| row.get(0))
            .map_err(|e| TicketError::Database(e.to_string()))?;

        for (column, target) in [
            ("status", &mut stats.by_status),
            ("category", &mut stats.by_category),
            ("priority", &mut stats.by_priority),
        ] {
            let sql = format!(
                "SELECT {col}, COUNT(*) FROM tickets WHERE {col} IS NOT NULL GROUP BY {col}",
                col = column
            );
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| TicketError::Database(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })
                .map_err(|e| TicketError::Database(e.to_string()))?;

            for row_result in rows {
                let (key, count) = row_result.map_err(|e| TicketError::Database(e.to_string()))?;
                // Unknown tokens (from future schema versions) are dropped
                // rather than invent variants.
                if let Some(entry) = target.get_mut(&key) {
                    *entry = count;
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteTicketStore {
        SqliteTicketStore::in_memory().unwrap()
    }

    fn create_test_request() -> CreateTicketRequest {
        CreateTicketRequest {
            subject: "Invoice charged twice".to_string(),
            description: "My card was charged twice for the March invoice".to_string(),
        }
    }

    fn classify(store: &SqliteTicketStore, id: &str, category: Category, priority: Priority) {
        let mut ticket = store.get(id).unwrap().unwrap();
        ticket.mark_processing().unwrap();
        store.update(&ticket).unwrap();
        ticket.mark_classified(category, priority, 4).unwrap();
        store.update(&ticket).unwrap();
    }

    #[test]
    fn test_create_ticket() {
        let store = create_test_store();
        let request = create_test_request();

        let ticket = store.create(request.clone()).unwrap();

        assert!(!ticket.id.is_empty());
        assert_eq!(ticket.subject, request.subject);
        assert_eq!(ticket.description, request.description);
        assert_eq!(ticket.status, TicketStatus::Pending);
        assert!(ticket.category.is_none());
        assert!(ticket.priority.is_none());
        assert!(ticket.sentiment.is_none());
        assert!(ticket.error_message.is_none());
    }

    #[test]
    fn test_get_ticket() {
        let store = create_test_store();

        let created = store.create(create_test_request()).unwrap();
        let fetched = store.get(&created.id).unwrap();

        assert!(fetched.is_some());
        let fetched = fetched.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.subject, created.subject);
        assert_eq!(fetched.status, TicketStatus::Pending);
    }

    #[test]
    fn test_get_nonexistent_ticket() {
        let store = create_test_store();
        let result = store.get("nonexistent-id").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_list_tickets() {
        let store = create_test_store();

        for i in 0..3 {
            let mut request = create_test_request();
            request.subject = format!("Ticket {}", i);
            store.create(request).unwrap();
        }

        let tickets = store.list(&TicketFilter::new()).unwrap();
        assert_eq!(tickets.len(), 3);
    }

    #[test]
    fn test_list_with_status_filter() {
        let store = create_test_store();

        store.create(create_test_request()).unwrap();
        let ticket2 = store.create(create_test_request()).unwrap();
        classify(&store, &ticket2.id, Category::Billing, Priority::High);

        let filter = TicketFilter::new().with_status(TicketStatus::Pending);
        let tickets = store.list(&filter).unwrap();
        assert_eq!(tickets.len(), 1);

        let filter = TicketFilter::new().with_status(TicketStatus::Classified);
        let tickets = store.list(&filter).unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, ticket2.id);
    }

    #[test]
    fn test_list_with_category_and_priority_filters() {
        let store = create_test_store();

        let billing = store.create(create_test_request()).unwrap();
        classify(&store, &billing.id, Category::Billing, Priority::High);

        let bug = store.create(create_test_request()).unwrap();
        classify(&store, &bug.id, Category::Bug, Priority::High);

        let filter = TicketFilter::new().with_category(Category::Billing);
        let tickets = store.list(&filter).unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, billing.id);

        // Filters combine with AND.
        let filter = TicketFilter::new()
            .with_category(Category::Bug)
            .with_priority(Priority::High);
        let tickets = store.list(&filter).unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, bug.id);

        let filter = TicketFilter::new()
            .with_category(Category::Bug)
            .with_priority(Priority::Low);
        let tickets = store.list(&filter).unwrap();
        assert!(tickets.is_empty());
    }

    #[test]
    fn test_list_pagination() {
        let store = create_test_store();

        for _ in 0..5 {
            store.create(create_test_request()).unwrap();
        }

        let filter = TicketFilter::new().with_limit(2).with_offset(0);
        let tickets = store.list(&filter).unwrap();
        assert_eq!(tickets.len(), 2);

        let filter = TicketFilter::new().with_limit(2).with_offset(4);
        let tickets = store.list(&filter).unwrap();
        assert_eq!(tickets.len(), 1);
    }

    #[test]
    fn test_count_with_filter() {
        let store = create_test_store();

        store.create(create_test_request()).unwrap();
        let ticket2 = store.create(create_test_request()).unwrap();
        classify(&store, &ticket2.id, Category::General, Priority::Medium);

        assert_eq!(store.count(&TicketFilter::new()).unwrap(), 2);

        let filter = TicketFilter::new().with_status(TicketStatus::Pending);
        assert_eq!(store.count(&filter).unwrap(), 1);
    }

    #[test]
    fn test_update_persists_classification() {
        let store = create_test_store();
        let created = store.create(create_test_request()).unwrap();

        let mut ticket = created.clone();
        ticket.mark_processing().unwrap();
        let updated = store.update(&ticket).unwrap();
        assert_eq!(updated.status, TicketStatus::Processing);
        assert!(updated.updated_at >= created.updated_at);

        ticket.mark_classified(Category::Billing, Priority::Urgent, 2).unwrap();
        store.update(&ticket).unwrap();

        let fetched = store.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched.status, TicketStatus::Classified);
        assert_eq!(fetched.category, Some(Category::Billing));
        assert_eq!(fetched.priority, Some(Priority::Urgent));
        assert_eq!(fetched.sentiment, Some(2));
    }

    #[test]
    fn test_update_persists_failure() {
        let store = create_test_store();
        let created = store.create(create_test_request()).unwrap();

        let mut ticket = created.clone();
        ticket.mark_processing().unwrap();
        store.update(&ticket).unwrap();
        ticket.mark_failed("provider returned 503").unwrap();
        store.update(&ticket).unwrap();

        let fetched = store.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched.status, TicketStatus::Failed);
        assert_eq!(fetched.error_message.as_deref(), Some("provider returned 503"));
        assert!(fetched.category.is_none());
    }

    #[test]
    fn test_update_nonexistent_ticket() {
        let store = create_test_store();
        let mut ticket = store.create(create_test_request()).unwrap();
        ticket.id = "nonexistent-id".to_string();

        let result = store.update(&ticket);
        assert!(matches!(result, Err(TicketError::NotFound(_))));
    }

    #[test]
    fn test_stats_zero_filled_when_empty() {
        let store = create_test_store();
        let stats = store.stats().unwrap();

        assert_eq!(stats.total_tickets, 0);
        assert_eq!(stats.by_status.len(), 4);
        assert_eq!(stats.by_category.len(), 5);
        assert_eq!(stats.by_priority.len(), 4);
        assert!(stats.by_status.values().all(|&v| v == 0));
    }

    #[test]
    fn test_stats_counts_by_breakdown() {
        let store = create_test_store();

        store.create(create_test_request()).unwrap();
        let classified = store.create(create_test_request()).unwrap();
        classify(&store, &classified.id, Category::TechSupport, Priority::High);

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_tickets, 2);
        assert_eq!(stats.by_status["PENDING"], 1);
        assert_eq!(stats.by_status["CLASSIFIED"], 1);
        assert_eq!(stats.by_status["FAILED"], 0);
        assert_eq!(stats.by_category["TECH_SUPPORT"], 1);
        assert_eq!(stats.by_category["BILLING"], 0);
        assert_eq!(stats.by_priority["HIGH"], 1);
    }

    #[test]
    fn test_file_based_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("tickets.db");

        let store = SqliteTicketStore::new(&db_path).unwrap();
        let ticket = store.create(create_test_request()).unwrap();

        assert!(db_path.exists());

        let fetched = store.get(&ticket.id).unwrap();
        assert!(fetched.is_some());
    }
}
