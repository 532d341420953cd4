//! PostgreSQL-backed `OpportunityRepository` implementation using Diesel.
//!
//! Visibility filtering (published for everyone, drafts for their author
//! and admins) happens in SQL; addenda load with a second query per
//! record read.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::opportunity::{
    Addendum, Opportunity, OpportunitySlim, OpportunityStatus, ValidatedOpportunityBody,
};
use crate::domain::permissions;
use crate::domain::ports::{OpportunityRepository, OpportunityUpdate, RepositoryError};
use crate::domain::session::Session;
use crate::domain::user::User;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    AddendumRow, NewAddendumRow, NewOpportunityRow, OpportunityChanges, OpportunityDeactivation,
    OpportunityRow,
};
use super::pool::DbPool;
use super::schema::{opportunities, opportunity_addenda};

/// Statuses visible without a stake in the record.
const PUBLIC_STATUSES: [&str; 4] = ["PUBLISHED", "EVALUATION", "AWARDED", "CANCELED"];

/// Diesel-backed implementation of the `OpportunityRepository` port.
#[derive(Clone)]
pub struct DieselOpportunityRepository {
    pool: DbPool,
}

impl DieselOpportunityRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn status_to_str(status: OpportunityStatus) -> &'static str {
    match status {
        OpportunityStatus::Draft => "DRAFT",
        OpportunityStatus::Published => "PUBLISHED",
        OpportunityStatus::Evaluation => "EVALUATION",
        OpportunityStatus::Awarded => "AWARDED",
        OpportunityStatus::Suspended => "SUSPENDED",
        OpportunityStatus::Canceled => "CANCELED",
    }
}

pub(crate) fn status_from_str(raw: &str, id: Uuid) -> OpportunityStatus {
    match raw {
        "DRAFT" => OpportunityStatus::Draft,
        "PUBLISHED" => OpportunityStatus::Published,
        "EVALUATION" => OpportunityStatus::Evaluation,
        "AWARDED" => OpportunityStatus::Awarded,
        "SUSPENDED" => OpportunityStatus::Suspended,
        "CANCELED" => OpportunityStatus::Canceled,
        other => {
            tracing::warn!(value = other, opportunity = %id, "unrecognised status, defaulting to DRAFT");
            OpportunityStatus::Draft
        }
    }
}

fn row_to_opportunity(row: OpportunityRow, addenda: Vec<AddendumRow>) -> Opportunity {
    let status = status_from_str(row.status.as_str(), row.id);
    Opportunity {
        id: row.id,
        title: row.title,
        teaser: row.teaser,
        description: row.description,
        location: row.location,
        reward: row.reward,
        skills: row.skills,
        remote_ok: row.remote_ok,
        remote_desc: row.remote_desc,
        proposal_deadline: row.proposal_deadline,
        assignment_date: row.assignment_date,
        start_date: row.start_date,
        completion_date: row.completion_date,
        submission_info: row.submission_info,
        acceptance_criteria: row.acceptance_criteria,
        evaluation_criteria: row.evaluation_criteria,
        status,
        addenda: addenda
            .into_iter()
            .map(|addendum| Addendum {
                id: addendum.id,
                description: addendum.description,
                created_at: addendum.created_at,
                created_by: addendum.created_by,
            })
            .collect(),
        author: row.author_id,
        active: row.active,
        deactivated_on: row.deactivated_on,
        deactivated_by: row.deactivated_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn row_to_slim(row: OpportunityRow) -> OpportunitySlim {
    let status = status_from_str(row.status.as_str(), row.id);
    OpportunitySlim {
        id: row.id,
        title: row.title,
        teaser: row.teaser,
        location: row.location,
        reward: row.reward,
        remote_ok: row.remote_ok,
        proposal_deadline: row.proposal_deadline,
        status,
    }
}

async fn load_addenda<C>(conn: &mut C, opportunity_id: Uuid) -> Result<Vec<AddendumRow>, RepositoryError>
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    opportunity_addenda::table
        .filter(opportunity_addenda::opportunity_id.eq(opportunity_id))
        .order(opportunity_addenda::created_at.asc())
        .select(AddendumRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)
}

#[async_trait]
impl OpportunityRepository for DieselOpportunityRepository {
    async fn read_many(&self, session: &Session) -> Result<Vec<OpportunitySlim>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = opportunities::table
            .select(OpportunityRow::as_select())
            .filter(opportunities::active.eq(true))
            .order(opportunities::proposal_deadline.asc())
            .into_boxed();
        if !permissions::is_admin(session) {
            query = match session.user_id() {
                Some(viewer) => query.filter(
                    opportunities::status
                        .eq_any(PUBLIC_STATUSES)
                        .or(opportunities::author_id.eq(viewer)),
                ),
                None => query.filter(opportunities::status.eq_any(PUBLIC_STATUSES)),
            };
        }

        let rows: Vec<OpportunityRow> = query
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_slim).collect())
    }

    async fn read_one(&self, id: Uuid) -> Result<Option<Opportunity>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<OpportunityRow> = opportunities::table
            .filter(opportunities::id.eq(id))
            .select(OpportunityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let addenda = load_addenda(&mut conn, row.id).await?;
                Ok(Some(row_to_opportunity(row, addenda)))
            }
        }
    }

    async fn create(
        &self,
        author: &User,
        body: ValidatedOpportunityBody,
    ) -> Result<Opportunity, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewOpportunityRow {
            id: Uuid::new_v4(),
            title: &body.title,
            teaser: body.teaser.as_deref(),
            description: &body.description,
            location: &body.location,
            reward: body.reward,
            skills: &body.skills,
            remote_ok: body.remote_ok,
            remote_desc: body.remote_desc.as_deref(),
            proposal_deadline: body.proposal_deadline,
            assignment_date: body.assignment_date,
            start_date: body.start_date,
            completion_date: body.completion_date,
            submission_info: body.submission_info.as_deref(),
            acceptance_criteria: &body.acceptance_criteria,
            evaluation_criteria: &body.evaluation_criteria,
            status: status_to_str(body.status),
            author_id: author.id,
        };

        let row: OpportunityRow = diesel::insert_into(opportunities::table)
            .values(&new_row)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        tracing::info!(opportunity = %row.id, author = %author.id, "opportunity created");
        Ok(row_to_opportunity(row, Vec::new()))
    }

    async fn update(&self, update: OpportunityUpdate) -> Result<Opportunity, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        if let Some(fields) = &update.fields {
            let changes = OpportunityChanges {
                title: &fields.title,
                teaser: fields.teaser.as_deref(),
                description: &fields.description,
                location: &fields.location,
                reward: fields.reward,
                skills: &fields.skills,
                remote_ok: fields.remote_ok,
                remote_desc: fields.remote_desc.as_deref(),
                proposal_deadline: fields.proposal_deadline,
                assignment_date: fields.assignment_date,
                start_date: fields.start_date,
                completion_date: fields.completion_date,
                submission_info: fields.submission_info.as_deref(),
                acceptance_criteria: &fields.acceptance_criteria,
                evaluation_criteria: &fields.evaluation_criteria,
                status: status_to_str(fields.status),
                updated_at: Utc::now(),
            };
            diesel::update(opportunities::table.filter(opportunities::id.eq(update.id)))
                .set(&changes)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            tracing::info!(opportunity = %update.id, "opportunity updated");
        }

        if let Some(addendum) = &update.addendum {
            let new_addendum = NewAddendumRow {
                id: Uuid::new_v4(),
                opportunity_id: update.id,
                description: &addendum.description,
                created_by: addendum.created_by,
            };
            diesel::insert_into(opportunity_addenda::table)
                .values(&new_addendum)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            tracing::info!(opportunity = %update.id, "opportunity addendum added");
        }

        if let Some(deactivation) = update.deactivation {
            // Only the first deactivation writes a stamp.
            diesel::update(
                opportunities::table
                    .filter(opportunities::id.eq(update.id).and(opportunities::active.eq(true))),
            )
            .set(&OpportunityDeactivation {
                active: false,
                deactivated_on: deactivation.on,
                deactivated_by: deactivation.by,
                updated_at: Utc::now(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        }

        let row: OpportunityRow = opportunities::table
            .filter(opportunities::id.eq(update.id))
            .select(OpportunityRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let addenda = load_addenda(&mut conn, row.id).await?;

        Ok(row_to_opportunity(row, addenda))
    }
}
