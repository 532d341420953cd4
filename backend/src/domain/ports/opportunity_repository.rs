//! Driven port for opportunity persistence, with an in-memory
//! implementation.
//!
//! Mutations emit audit events (`opportunity created` / `updated` /
//! `addendum added`) so the operational log doubles as a changelog.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{Deactivation, RepositoryError};
use crate::domain::opportunity::{
    Addendum, Opportunity, OpportunitySlim, OpportunityStatus, ValidatedOpportunityBody,
};
use crate::domain::permissions;
use crate::domain::session::Session;
use crate::domain::user::User;

/// An addendum to append during an update.
#[derive(Debug, Clone)]
pub struct NewAddendum {
    pub description: String,
    pub created_by: Uuid,
}

/// Partial update applied to a stored opportunity.
#[derive(Debug, Clone)]
pub struct OpportunityUpdate {
    pub id: Uuid,
    /// Replacement field values, when the update edits the record.
    pub fields: Option<ValidatedOpportunityBody>,
    /// Appended addendum, when the update clarifies the posting.
    pub addendum: Option<NewAddendum>,
    /// Soft-deactivation stamp, when the update retires the record.
    pub deactivation: Option<Deactivation>,
}

/// Persistence operations for opportunities.
///
/// `read_many` lists active opportunities visible to the session: published
/// ones for everyone, drafts only for their author, everything for admins.
#[async_trait]
pub trait OpportunityRepository: Send + Sync {
    async fn read_many(&self, session: &Session) -> Result<Vec<OpportunitySlim>, RepositoryError>;
    async fn read_one(&self, id: Uuid) -> Result<Option<Opportunity>, RepositoryError>;
    async fn create(
        &self,
        author: &User,
        body: ValidatedOpportunityBody,
    ) -> Result<Opportunity, RepositoryError>;
    async fn update(&self, update: OpportunityUpdate) -> Result<Opportunity, RepositoryError>;
}

/// In-memory opportunity store used by tests and the database-less dev
/// server.
#[derive(Debug, Default)]
pub struct InMemoryOpportunityRepository {
    rows: Mutex<HashMap<Uuid, Opportunity>>,
}

impl InMemoryOpportunityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Opportunity>>, RepositoryError> {
        self.rows
            .lock()
            .map_err(|_| RepositoryError::connection("opportunity store lock poisoned"))
    }
}

fn visible_to(opportunity: &Opportunity, session: &Session) -> bool {
    if permissions::is_admin(session) {
        return true;
    }
    match opportunity.status {
        OpportunityStatus::Draft | OpportunityStatus::Suspended => {
            session.user_id() == Some(opportunity.author)
        }
        _ => true,
    }
}

fn apply_fields(opportunity: &mut Opportunity, fields: ValidatedOpportunityBody) {
    opportunity.title = fields.title;
    opportunity.teaser = fields.teaser;
    opportunity.description = fields.description;
    opportunity.location = fields.location;
    opportunity.reward = fields.reward;
    opportunity.skills = fields.skills;
    opportunity.remote_ok = fields.remote_ok;
    opportunity.remote_desc = fields.remote_desc;
    opportunity.proposal_deadline = fields.proposal_deadline;
    opportunity.assignment_date = fields.assignment_date;
    opportunity.start_date = fields.start_date;
    opportunity.completion_date = fields.completion_date;
    opportunity.submission_info = fields.submission_info;
    opportunity.acceptance_criteria = fields.acceptance_criteria;
    opportunity.evaluation_criteria = fields.evaluation_criteria;
    opportunity.status = fields.status;
}

#[async_trait]
impl OpportunityRepository for InMemoryOpportunityRepository {
    async fn read_many(&self, session: &Session) -> Result<Vec<OpportunitySlim>, RepositoryError> {
        let rows = self.lock()?;
        let mut listed: Vec<OpportunitySlim> = rows
            .values()
            .filter(|opportunity| opportunity.active && visible_to(opportunity, session))
            .map(|opportunity| OpportunitySlim {
                id: opportunity.id,
                title: opportunity.title.clone(),
                teaser: opportunity.teaser.clone(),
                location: opportunity.location.clone(),
                reward: opportunity.reward,
                remote_ok: opportunity.remote_ok,
                proposal_deadline: opportunity.proposal_deadline,
                status: opportunity.status,
            })
            .collect();
        listed.sort_by_key(|opportunity| opportunity.proposal_deadline);
        Ok(listed)
    }

    async fn read_one(&self, id: Uuid) -> Result<Option<Opportunity>, RepositoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn create(
        &self,
        author: &User,
        body: ValidatedOpportunityBody,
    ) -> Result<Opportunity, RepositoryError> {
        let now = Utc::now();
        let opportunity = Opportunity {
            id: Uuid::new_v4(),
            title: body.title,
            teaser: body.teaser,
            description: body.description,
            location: body.location,
            reward: body.reward,
            skills: body.skills,
            remote_ok: body.remote_ok,
            remote_desc: body.remote_desc,
            proposal_deadline: body.proposal_deadline,
            assignment_date: body.assignment_date,
            start_date: body.start_date,
            completion_date: body.completion_date,
            submission_info: body.submission_info,
            acceptance_criteria: body.acceptance_criteria,
            evaluation_criteria: body.evaluation_criteria,
            status: body.status,
            addenda: Vec::new(),
            author: author.id,
            active: true,
            deactivated_on: None,
            deactivated_by: None,
            created_at: now,
            updated_at: now,
        };
        tracing::info!(opportunity = %opportunity.id, author = %author.id, "opportunity created");
        self.lock()?.insert(opportunity.id, opportunity.clone());
        Ok(opportunity)
    }

    async fn update(&self, update: OpportunityUpdate) -> Result<Opportunity, RepositoryError> {
        let mut rows = self.lock()?;
        let opportunity = rows
            .get_mut(&update.id)
            .ok_or_else(|| RepositoryError::query("opportunity not found"))?;
        if let Some(fields) = update.fields {
            apply_fields(opportunity, fields);
            tracing::info!(opportunity = %opportunity.id, "opportunity updated");
        }
        if let Some(addendum) = update.addendum {
            opportunity.addenda.push(Addendum {
                id: Uuid::new_v4(),
                description: addendum.description,
                created_at: Utc::now(),
                created_by: addendum.created_by,
            });
            tracing::info!(opportunity = %opportunity.id, "opportunity addendum added");
        }
        if let Some(deactivation) = update.deactivation {
            // Repeat deactivations keep the original audit stamp.
            if opportunity.active {
                opportunity.active = false;
                opportunity.deactivated_on = Some(deactivation.on);
                opportunity.deactivated_by = Some(deactivation.by);
            }
        }
        opportunity.updated_at = Utc::now();
        Ok(opportunity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserType;
    use rstest::rstest;

    fn author(user_type: UserType) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            user_type,
            name: "Casey Procurement".to_owned(),
            email: "casey@example.gov".to_owned(),
            job_title: None,
            active: true,
            deactivated_on: None,
            deactivated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn body(title: &str, status: OpportunityStatus) -> ValidatedOpportunityBody {
        let deadline = Utc::now();
        ValidatedOpportunityBody {
            title: title.to_owned(),
            teaser: None,
            description: "Build the thing.".to_owned(),
            location: "Victoria".to_owned(),
            reward: 50_000,
            skills: vec!["Rust".to_owned()],
            remote_ok: false,
            remote_desc: None,
            proposal_deadline: deadline,
            assignment_date: deadline,
            start_date: deadline,
            completion_date: None,
            submission_info: None,
            acceptance_criteria: "Tests pass.".to_owned(),
            evaluation_criteria: "Score by price.".to_owned(),
            status,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn drafts_are_visible_only_to_author_and_admin() {
        let repo = InMemoryOpportunityRepository::new();
        let gov = author(UserType::Gov);
        repo.create(&gov, body("Draft one", OpportunityStatus::Draft))
            .await
            .expect("create draft");
        repo.create(&gov, body("Published one", OpportunityStatus::Published))
            .await
            .expect("create published");

        let public = repo
            .read_many(&Session::anonymous())
            .await
            .expect("public listing");
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].title, "Published one");

        let own = repo
            .read_many(&Session::authenticated(gov))
            .await
            .expect("author listing");
        assert_eq!(own.len(), 2);

        let admin = repo
            .read_many(&Session::authenticated(author(UserType::Admin)))
            .await
            .expect("admin listing");
        assert_eq!(admin.len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn addenda_append_in_order() {
        let repo = InMemoryOpportunityRepository::new();
        let gov = author(UserType::Gov);
        let created = repo
            .create(&gov, body("Posting", OpportunityStatus::Published))
            .await
            .expect("create");

        for text in ["First clarification", "Second clarification"] {
            repo.update(OpportunityUpdate {
                id: created.id,
                fields: None,
                addendum: Some(NewAddendum {
                    description: text.to_owned(),
                    created_by: gov.id,
                }),
                deactivation: None,
            })
            .await
            .expect("append addendum");
        }

        let fetched = repo
            .read_one(created.id)
            .await
            .expect("read one")
            .expect("exists");
        let descriptions: Vec<&str> = fetched
            .addenda
            .iter()
            .map(|addendum| addendum.description.as_str())
            .collect();
        assert_eq!(
            descriptions,
            vec!["First clarification", "Second clarification"]
        );
    }
}
