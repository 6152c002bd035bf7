//! Postgres-backed store.
//!
//! Each unit of work is one `READ COMMITTED` transaction. Lifecycle transitions
//! read the application row with `SELECT ... FOR UPDATE`, so two transitions on
//! the same application serialize. Submissions and the transitions that touch
//! `is_default` also lock the customer row, so they serialize per customer.
//! The "one pending application per customer" rule is a partial unique index
//! (see `migrations/0001_init.sql`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use defaultdesk_applications::{ApplicationField, ApplicationStatus, DefaultApplication};
use defaultdesk_auth::{Role, User};
use defaultdesk_core::{ApplicationId, CustomerId, UserId};
use defaultdesk_customers::{Customer, CustomerField};

use super::query::year_bounds;
use super::{
    ApplicationDetail, ApplicationFilter, ApplicationRepository, CustomerRepository, Dimension, DimensionCount,
    Page, Pagination, RepositoryError, StatTarget, UnitOfWork, UnitOfWorkFactory, UserRepository,
};

/// Postgres-backed unit-of-work factory.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn customers(&mut self) -> Box<dyn CustomerRepository + '_> {
        Box::new(PgCustomers { tx: &mut self.tx })
    }

    fn applications(&mut self) -> Box<dyn ApplicationRepository + '_> {
        Box::new(PgApplications { tx: &mut self.tx })
    }

    fn users(&mut self) -> Box<dyn UserRepository + '_> {
        Box::new(PgUsers { tx: &mut self.tx })
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Customers
// ─────────────────────────────────────────────────────────────────────────────

const CUSTOMER_COLUMNS: &str = "id, name, industry, region, is_default, latest_ext_grade, created_at";

struct PgCustomers<'t> {
    tx: &'t mut Transaction<'static, Postgres>,
}

enum CustomerKey<'k> {
    Id(Uuid),
    Name(&'k str),
}

impl PgCustomers<'_> {
    async fn fetch_one(&mut self, key: CustomerKey<'_>, lock: bool) -> Result<Customer, RepositoryError> {
        let sql = customer_select_sql(&key, lock);
        let query = sqlx::query(&sql);
        let query = match key {
            CustomerKey::Id(id) => query.bind(id),
            CustomerKey::Name(name) => query.bind(name),
        };
        let row = query
            .fetch_optional(&mut **self.tx)
            .await
            .map_err(|e| map_sqlx_error("get_customer", e))?
            .ok_or(RepositoryError::NotFound)?;
        customer_from_row(&row)
    }
}

fn customer_select_sql(key: &CustomerKey<'_>, lock: bool) -> String {
    let column = match key {
        CustomerKey::Id(_) => "id",
        CustomerKey::Name(_) => "name",
    };
    format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE {column} = $1{}",
        if lock { " FOR UPDATE" } else { "" }
    )
}

#[async_trait]
impl CustomerRepository for PgCustomers<'_> {
    #[instrument(skip(self, customer), fields(customer_id = %customer.id), err)]
    async fn create(&mut self, customer: &Customer) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, industry, region, is_default, latest_ext_grade, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.name)
        .bind(&customer.industry)
        .bind(&customer.region)
        .bind(customer.is_default)
        .bind(&customer.latest_ext_grade)
        .bind(customer.created_at)
        .execute(&mut **self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_customer", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: CustomerId) -> Result<Customer, RepositoryError> {
        self.fetch_one(CustomerKey::Id(*id.as_uuid()), false).await
    }

    #[instrument(skip(self), err)]
    async fn get_by_name(&mut self, name: &str) -> Result<Customer, RepositoryError> {
        self.fetch_one(CustomerKey::Name(name), false).await
    }

    #[instrument(skip(self), err)]
    async fn get_for_update(&mut self, id: CustomerId) -> Result<Customer, RepositoryError> {
        self.fetch_one(CustomerKey::Id(*id.as_uuid()), true).await
    }

    #[instrument(skip(self), err)]
    async fn get_by_name_for_update(&mut self, name: &str) -> Result<Customer, RepositoryError> {
        self.fetch_one(CustomerKey::Name(name), true).await
    }

    #[instrument(skip(self, customer), fields(customer_id = %customer.id), err)]
    async fn update(&mut self, customer: &Customer, fields: &[CustomerField]) -> Result<(), RepositoryError> {
        if fields.is_empty() {
            return Ok(());
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE customers SET ");
        let mut set = qb.separated(", ");
        for field in fields {
            set.push(field.column());
            set.push_unseparated(" = ");
            match field {
                CustomerField::IsDefault => set.push_bind_unseparated(customer.is_default),
                CustomerField::LatestExtGrade => set.push_bind_unseparated(customer.latest_ext_grade.clone()),
            };
        }
        qb.push(" WHERE id = ").push_bind(*customer.id.as_uuid());

        let result = qb
            .build()
            .execute(&mut **self.tx)
            .await
            .map_err(|e| map_sqlx_error("update_customer", e))?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name ASC"))
            .fetch_all(&mut **self.tx)
            .await
            .map_err(|e| map_sqlx_error("list_customers", e))?;
        rows.iter().map(customer_from_row).collect()
    }
}

fn customer_from_row(row: &PgRow) -> Result<Customer, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::Storage(format!("failed to decode customer row: {e}"));
    Ok(Customer {
        id: CustomerId::from_uuid(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        industry: row.try_get("industry").map_err(decode)?,
        region: row.try_get("region").map_err(decode)?,
        is_default: row.try_get("is_default").map_err(decode)?,
        latest_ext_grade: row.try_get("latest_ext_grade").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Applications
// ─────────────────────────────────────────────────────────────────────────────

const APPLICATION_COLUMNS: &str = "a.id, a.customer_id, a.status, a.severity, a.reason, a.remarks, \
     a.applicant_id, a.application_time, a.approver_id, a.approval_time, a.rejection_reason, \
     a.rebirth_reason, a.rebirth_approver_id, a.rebirth_approval_time";

const DETAIL_JOINS: &str = " FROM default_applications a \
     JOIN customers c ON c.id = a.customer_id \
     LEFT JOIN users applicant ON applicant.id = a.applicant_id \
     LEFT JOIN users approver ON approver.id = a.approver_id \
     LEFT JOIN users rebirth_approver ON rebirth_approver.id = a.rebirth_approver_id";

struct PgApplications<'t> {
    tx: &'t mut Transaction<'static, Postgres>,
}

impl PgApplications<'_> {
    async fn fetch_one(&mut self, id: ApplicationId, lock: bool) -> Result<DefaultApplication, RepositoryError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM default_applications a WHERE a.id = $1{}",
            if lock { " FOR UPDATE" } else { "" }
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut **self.tx)
            .await
            .map_err(|e| map_sqlx_error("get_application", e))?
            .ok_or(RepositoryError::NotFound)?;
        application_from_row(&row)
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ApplicationFilter) {
    qb.push(" WHERE TRUE");
    if let Some(name) = filter.customer_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        qb.push(" AND c.name ILIKE ")
            .push_bind(format!("%{}%", escape_like(name)))
            .push(" ESCAPE '\\'");
    }
    if let Some(status) = filter.status {
        qb.push(" AND a.status = ").push_bind(status.as_str());
    }
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[async_trait]
impl ApplicationRepository for PgApplications<'_> {
    #[instrument(skip(self, application), fields(application_id = %application.id, customer_id = %application.customer_id), err)]
    async fn create(&mut self, application: &DefaultApplication) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO default_applications (
                id, customer_id, status, severity, reason, remarks, applicant_id, application_time,
                approver_id, approval_time, rejection_reason,
                rebirth_reason, rebirth_approver_id, rebirth_approval_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(application.customer_id.as_uuid())
        .bind(application.status.as_str())
        .bind(application.severity.as_str())
        .bind(&application.reason)
        .bind(&application.remarks)
        .bind(application.applicant_id.as_uuid())
        .bind(application.application_time)
        .bind(application.approver_id.map(Uuid::from))
        .bind(application.approval_time)
        .bind(&application.rejection_reason)
        .bind(&application.rebirth_reason)
        .bind(application.rebirth_approver_id.map(Uuid::from))
        .bind(application.rebirth_approval_time)
        .execute(&mut **self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_application", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: ApplicationId) -> Result<DefaultApplication, RepositoryError> {
        self.fetch_one(id, false).await
    }

    #[instrument(skip(self), err)]
    async fn get_for_update(&mut self, id: ApplicationId) -> Result<DefaultApplication, RepositoryError> {
        self.fetch_one(id, true).await
    }

    #[instrument(skip(self, application), fields(application_id = %application.id), err)]
    async fn update(
        &mut self,
        application: &DefaultApplication,
        fields: &[ApplicationField],
    ) -> Result<(), RepositoryError> {
        if fields.is_empty() {
            return Ok(());
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE default_applications SET ");
        let mut set = qb.separated(", ");
        for field in fields {
            set.push(field.column());
            set.push_unseparated(" = ");
            match field {
                ApplicationField::Status => set.push_bind_unseparated(application.status.as_str()),
                ApplicationField::ApproverId => set.push_bind_unseparated(application.approver_id.map(Uuid::from)),
                ApplicationField::ApprovalTime => set.push_bind_unseparated(application.approval_time),
                ApplicationField::RejectionReason => {
                    set.push_bind_unseparated(application.rejection_reason.clone())
                }
                ApplicationField::RebirthReason => set.push_bind_unseparated(application.rebirth_reason.clone()),
                ApplicationField::RebirthApproverId => {
                    set.push_bind_unseparated(application.rebirth_approver_id.map(Uuid::from))
                }
                ApplicationField::RebirthApprovalTime => {
                    set.push_bind_unseparated(application.rebirth_approval_time)
                }
            };
        }
        qb.push(" WHERE id = ").push_bind(*application.id.as_uuid());

        let result = qb
            .build()
            .execute(&mut **self.tx)
            .await
            .map_err(|e| map_sqlx_error("update_application", e))?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn find_all_by_status(
        &mut self,
        status: ApplicationStatus,
    ) -> Result<Vec<DefaultApplication>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM default_applications a \
             WHERE a.status = $1 ORDER BY a.application_time ASC, a.id ASC"
        ))
        .bind(status.as_str())
        .fetch_all(&mut **self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_applications_by_status", e))?;
        rows.iter().map(application_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn exists_for_customer(
        &mut self,
        customer_id: CustomerId,
        status: ApplicationStatus,
    ) -> Result<bool, RepositoryError> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM default_applications WHERE customer_id = $1 AND status = $2) AS found",
        )
        .bind(customer_id.as_uuid())
        .bind(status.as_str())
        .fetch_one(&mut **self.tx)
        .await
        .map_err(|e| map_sqlx_error("exists_application", e))?;
        row.try_get("found")
            .map_err(|e| RepositoryError::Storage(format!("failed to decode exists row: {e}")))
    }

    #[instrument(skip(self, filter), fields(page = pagination.page, page_size = pagination.page_size), err)]
    async fn find_all(
        &mut self,
        filter: &ApplicationFilter,
        pagination: Pagination,
    ) -> Result<Page<ApplicationDetail>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS total");
        count.push(DETAIL_JOINS);
        push_filter(&mut count, filter);
        let total: i64 = count
            .build()
            .fetch_one(&mut **self.tx)
            .await
            .map_err(|e| map_sqlx_error("count_applications", e))?
            .try_get("total")
            .map_err(|e| RepositoryError::Storage(format!("failed to decode count row: {e}")))?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {APPLICATION_COLUMNS}, c.name AS customer_name, c.latest_ext_grade, \
             applicant.username AS applicant_name, approver.username AS approver_name, \
             rebirth_approver.username AS rebirth_approver_name"
        ));
        select.push(DETAIL_JOINS);
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY a.application_time DESC, a.id DESC LIMIT ")
            .push_bind(pagination.limit() as i64)
            .push(" OFFSET ")
            .push_bind(pagination.offset() as i64);

        let rows = select
            .build()
            .fetch_all(&mut **self.tx)
            .await
            .map_err(|e| map_sqlx_error("find_applications", e))?;

        let items = rows
            .iter()
            .map(|row| {
                let decode = |e: sqlx::Error| RepositoryError::Storage(format!("failed to decode detail row: {e}"));
                Ok(ApplicationDetail {
                    application: application_from_row(row)?,
                    customer_name: row.try_get("customer_name").map_err(decode)?,
                    latest_ext_grade: row.try_get("latest_ext_grade").map_err(decode)?,
                    applicant_name: row.try_get("applicant_name").map_err(decode)?,
                    approver_name: row.try_get("approver_name").map_err(decode)?,
                    rebirth_approver_name: row.try_get("rebirth_approver_name").map_err(decode)?,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Page {
            items,
            total: total.max(0) as u64,
            page: pagination.page,
            page_size: pagination.page_size,
        })
    }

    #[instrument(skip(self), err)]
    async fn count_by_dimension(
        &mut self,
        dimension: Dimension,
        target: StatTarget,
        year: i32,
    ) -> Result<Vec<DimensionCount>, RepositoryError> {
        let (start, end) = year_bounds(year)
            .ok_or_else(|| RepositoryError::Storage(format!("year {year} is out of range")))?;
        let key_column = match dimension {
            Dimension::Industry => "c.industry",
            Dimension::Region => "c.region",
        };
        let time_column = match target {
            StatTarget::Approved => "a.approval_time",
            StatTarget::Reborn => "a.rebirth_approval_time",
        };

        let rows = sqlx::query(&format!(
            "SELECT {key_column} AS key, COUNT(*) AS count \
             FROM default_applications a JOIN customers c ON c.id = a.customer_id \
             WHERE a.status = $1 AND {time_column} >= $2 AND {time_column} < $3 \
             GROUP BY {key_column} ORDER BY {key_column} ASC"
        ))
        .bind(target.status().as_str())
        .bind(start)
        .bind(end)
        .fetch_all(&mut **self.tx)
        .await
        .map_err(|e| map_sqlx_error("count_by_dimension", e))?;

        rows.iter()
            .map(|row| {
                let decode = |e: sqlx::Error| RepositoryError::Storage(format!("failed to decode count row: {e}"));
                let count: i64 = row.try_get("count").map_err(decode)?;
                Ok(DimensionCount {
                    key: row.try_get("key").map_err(decode)?,
                    count: count.max(0) as u64,
                })
            })
            .collect()
    }
}

fn application_from_row(row: &PgRow) -> Result<DefaultApplication, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::Storage(format!("failed to decode application row: {e}"));
    let corrupt = |e: defaultdesk_core::DomainError| RepositoryError::Storage(format!("corrupt application row: {e}"));

    let status: String = row.try_get("status").map_err(decode)?;
    let severity: String = row.try_get("severity").map_err(decode)?;
    let approver_id: Option<Uuid> = row.try_get("approver_id").map_err(decode)?;
    let rebirth_approver_id: Option<Uuid> = row.try_get("rebirth_approver_id").map_err(decode)?;
    let approval_time: Option<DateTime<Utc>> = row.try_get("approval_time").map_err(decode)?;
    let rebirth_approval_time: Option<DateTime<Utc>> = row.try_get("rebirth_approval_time").map_err(decode)?;

    Ok(DefaultApplication {
        id: ApplicationId::from_uuid(row.try_get("id").map_err(decode)?),
        customer_id: CustomerId::from_uuid(row.try_get("customer_id").map_err(decode)?),
        status: status.parse().map_err(corrupt)?,
        severity: severity.parse().map_err(corrupt)?,
        reason: row.try_get("reason").map_err(decode)?,
        remarks: row.try_get("remarks").map_err(decode)?,
        applicant_id: UserId::from_uuid(row.try_get("applicant_id").map_err(decode)?),
        application_time: row.try_get("application_time").map_err(decode)?,
        approver_id: approver_id.map(UserId::from_uuid),
        approval_time,
        rejection_reason: row.try_get("rejection_reason").map_err(decode)?,
        rebirth_reason: row.try_get("rebirth_reason").map_err(decode)?,
        rebirth_approver_id: rebirth_approver_id.map(UserId::from_uuid),
        rebirth_approval_time,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

struct PgUsers<'t> {
    tx: &'t mut Transaction<'static, Postgres>,
}

impl PgUsers<'_> {
    async fn fetch_by(&mut self, column: &'static str, value: impl Into<UserKey>) -> Result<User, RepositoryError> {
        let sql = format!("SELECT id, username, password_hash, role, created_at FROM users WHERE {column} = $1");
        let query = sqlx::query(&sql);
        let query = match value.into() {
            UserKey::Id(id) => query.bind(id),
            UserKey::Username(name) => query.bind(name),
        };
        let row = query
            .fetch_optional(&mut **self.tx)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?
            .ok_or(RepositoryError::NotFound)?;

        let decode = |e: sqlx::Error| RepositoryError::Storage(format!("failed to decode user row: {e}"));
        let role: String = row.try_get("role").map_err(decode)?;
        Ok(User {
            id: UserId::from_uuid(row.try_get("id").map_err(decode)?),
            username: row.try_get("username").map_err(decode)?,
            password_hash: row.try_get("password_hash").map_err(decode)?,
            role: Role::new(role),
            created_at: row.try_get("created_at").map_err(decode)?,
        })
    }
}

enum UserKey {
    Id(Uuid),
    Username(String),
}

impl From<UserId> for UserKey {
    fn from(value: UserId) -> Self {
        UserKey::Id(value.into())
    }
}

impl From<&str> for UserKey {
    fn from(value: &str) -> Self {
        UserKey::Username(value.to_string())
    }
}

#[async_trait]
impl UserRepository for PgUsers<'_> {
    #[instrument(skip(self, user), fields(user_id = %user.id, role = %user.role), err)]
    async fn create(&mut self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&mut **self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: UserId) -> Result<User, RepositoryError> {
        self.fetch_by("id", id).await
    }

    #[instrument(skip(self), err)]
    async fn get_by_username(&mut self, username: &str) -> Result<User, RepositoryError> {
        self.fetch_by("username", username).await
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                return RepositoryError::UniqueViolation(db_err.constraint().unwrap_or("unknown").to_string());
            }
            RepositoryError::Storage(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::PoolClosed => {
            RepositoryError::Storage(format!("connection pool closed in {}", operation))
        }
        other => RepositoryError::Storage(format!("sqlx error in {}: {}", operation, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_locking_reads_use_for_update() {
        assert_eq!(
            customer_select_sql(&CustomerKey::Name("Acme"), true),
            format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE name = $1 FOR UPDATE")
        );
        assert_eq!(
            customer_select_sql(&CustomerKey::Id(Uuid::nil()), false),
            format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1")
        );
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("Acme"), "Acme");
    }

    #[test]
    fn filter_sql_only_mentions_present_criteria() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1");
        push_filter(&mut qb, &ApplicationFilter::default());
        assert_eq!(qb.sql(), "SELECT 1 WHERE TRUE");

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1");
        push_filter(
            &mut qb,
            &ApplicationFilter {
                customer_name: Some("acme".to_string()),
                status: Some(ApplicationStatus::Pending),
            },
        );
        assert_eq!(
            qb.sql(),
            "SELECT 1 WHERE TRUE AND c.name ILIKE $1 ESCAPE '\\' AND a.status = $2"
        );
    }
}
