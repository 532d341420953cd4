//! Code-With-Us opportunities resource.
//!
//! ```text
//! GET    /api/v1/opportunities
//! POST   /api/v1/opportunities
//! GET    /api/v1/opportunities/{id}
//! PUT    /api/v1/opportunities/{id}
//! DELETE /api/v1/opportunities/{id}
//! ```
//!
//! Updates may carry an `addendum` field; the text is appended to the
//! posting's addenda list alongside the regular field edits.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::crud::{self, CrudResource, ReadOneError};
use crate::domain::opportunity::{
    CreateOpportunityErrors, DeleteOpportunityErrors, Opportunity, OpportunityBody,
    OpportunityFieldErrors, OpportunitySlim, UpdateOpportunityErrors, ValidatedOpportunityBody,
    validate_addendum, validate_opportunity_body, validate_opportunity_id,
};
use crate::domain::ports::{
    Deactivation, NewAddendum, OpportunityRepository, OpportunityUpdate, RepositoryError,
};
use crate::domain::validation::{Validation, invalid, valid};
use crate::domain::validators::validate_uuid;
use crate::domain::{Session, User, permissions};

/// Create payload plus the author taken from the authorized session.
#[derive(Debug, Clone)]
pub struct ValidatedOpportunityCreate {
    pub author: User,
    pub fields: ValidatedOpportunityBody,
}

/// Update payload pinned to the resolved target id.
#[derive(Debug, Clone)]
pub struct ValidatedOpportunityUpdate {
    pub id: Uuid,
    pub fields: ValidatedOpportunityBody,
    pub addendum: Option<NewAddendum>,
}

/// Raw update payload: the shared field set plus the optional addendum.
#[derive(Debug, Default, Clone)]
pub struct OpportunityUpdateBody {
    pub fields: OpportunityBody,
    pub addendum: Option<String>,
}

/// The opportunities CRUD resource.
pub struct Opportunities {
    opportunities: Arc<dyn OpportunityRepository>,
    reward_max: i64,
}

impl Opportunities {
    pub fn new(opportunities: Arc<dyn OpportunityRepository>, reward_max: i64) -> Self {
        Self {
            opportunities,
            reward_max,
        }
    }
}

fn parse_body(body: &Value) -> OpportunityBody {
    OpportunityBody {
        title: crud::get_string(body, "title"),
        teaser: crud::get_string(body, "teaser"),
        description: crud::get_string(body, "description"),
        location: crud::get_string(body, "location"),
        reward: crud::get_i64(body, "reward"),
        skills: crud::get_string_array(body, "skills"),
        remote_ok: crud::get_bool(body, "remoteOk"),
        remote_desc: crud::get_string(body, "remoteDesc"),
        proposal_deadline: crud::get_string(body, "proposalDeadline"),
        assignment_date: crud::get_string(body, "assignmentDate"),
        start_date: crud::get_string(body, "startDate"),
        completion_date: crud::get_string(body, "completionDate"),
        submission_info: crud::get_string(body, "submissionInfo"),
        acceptance_criteria: crud::get_string(body, "acceptanceCriteria"),
        evaluation_criteria: crud::get_string(body, "evaluationCriteria"),
        status: crud::get_string(body, "status"),
    }
}

fn permission_messages() -> Vec<String> {
    vec![permissions::ERROR_MESSAGE.to_owned()]
}

#[async_trait]
impl CrudResource for Opportunities {
    const NAMESPACE: &'static str = "opportunities";

    type Summary = OpportunitySlim;
    type Entity = Opportunity;
    type CreateBody = OpportunityBody;
    type ValidatedCreateBody = ValidatedOpportunityCreate;
    type CreateErrors = CreateOpportunityErrors;
    type UpdateBody = OpportunityUpdateBody;
    type ValidatedUpdateBody = ValidatedOpportunityUpdate;
    type UpdateErrors = UpdateOpportunityErrors;
    type ValidatedDeleteBody = Opportunity;
    type DeleteErrors = DeleteOpportunityErrors;

    async fn read_many(&self, session: &Session) -> Result<Vec<OpportunitySlim>, RepositoryError> {
        // Published postings for everyone; drafts only for their author and
        // admins.
        self.opportunities.read_many(session).await
    }

    async fn read_one(&self, session: &Session, id: &str) -> Result<Opportunity, ReadOneError> {
        let target = match validate_uuid(id) {
            Validation::Valid(target) => target,
            Validation::Invalid(messages) => return Err(ReadOneError::InvalidId(messages)),
        };
        if !permissions::read_one_opportunity(self.opportunities.as_ref(), session, target).await {
            return Err(ReadOneError::Unauthorized);
        }
        match self.opportunities.read_one(target).await {
            Ok(Some(opportunity)) => Ok(opportunity),
            Ok(None) => Err(ReadOneError::NotFound(vec![
                "Opportunity not found.".to_owned(),
            ])),
            Err(error) => {
                tracing::error!(error = %error, "opportunity lookup failed");
                Err(ReadOneError::Database)
            }
        }
    }

    fn parse_create_body(&self, body: &Value) -> OpportunityBody {
        parse_body(body)
    }

    async fn validate_create(
        &self,
        session: &Session,
        body: OpportunityBody,
    ) -> Validation<ValidatedOpportunityCreate, CreateOpportunityErrors> {
        let author = match session.user.clone() {
            Some(author) if permissions::create_opportunity(session) => author,
            _ => {
                return invalid(CreateOpportunityErrors {
                    permissions: Some(permission_messages()),
                    ..Default::default()
                });
            }
        };
        match validate_opportunity_body(&body, self.reward_max) {
            Validation::Valid(fields) => valid(ValidatedOpportunityCreate { author, fields }),
            Validation::Invalid(fields) => invalid(CreateOpportunityErrors {
                permissions: None,
                fields,
            }),
        }
    }

    async fn create(
        &self,
        _session: &Session,
        body: ValidatedOpportunityCreate,
    ) -> Result<Opportunity, RepositoryError> {
        self.opportunities.create(&body.author, body.fields).await
    }

    fn parse_update_body(&self, body: &Value) -> OpportunityUpdateBody {
        OpportunityUpdateBody {
            fields: parse_body(body),
            addendum: crud::get_optional_string(body, "addendum"),
        }
    }

    async fn validate_update(
        &self,
        session: &Session,
        id: &str,
        body: OpportunityUpdateBody,
    ) -> Validation<ValidatedOpportunityUpdate, UpdateOpportunityErrors> {
        let authorized = match validate_uuid(id) {
            Validation::Valid(target) => {
                permissions::update_opportunity(self.opportunities.as_ref(), session, target).await
            }
            Validation::Invalid(_) => permissions::is_admin(session),
        };
        if !authorized {
            return invalid(UpdateOpportunityErrors {
                permissions: Some(permission_messages()),
                ..Default::default()
            });
        }
        let Some(actor) = session.user_id() else {
            return invalid(UpdateOpportunityErrors {
                permissions: Some(permission_messages()),
                ..Default::default()
            });
        };

        let opportunity = validate_opportunity_id(self.opportunities.as_ref(), id).await;
        let fields = validate_opportunity_body(&body.fields, self.reward_max);
        let addendum = match body.addendum.as_deref() {
            None => valid(None),
            Some(raw) => validate_addendum(raw).map(Some),
        };
        match (opportunity, fields, addendum) {
            (
                Validation::Valid(opportunity),
                Validation::Valid(fields),
                Validation::Valid(addendum),
            ) => valid(ValidatedOpportunityUpdate {
                id: opportunity.id,
                fields,
                addendum: addendum.map(|description| NewAddendum {
                    description,
                    created_by: actor,
                }),
            }),
            (opportunity, fields, addendum) => invalid(UpdateOpportunityErrors {
                permissions: None,
                id: opportunity.err(),
                addendum: addendum.err(),
                fields: fields.err_or(OpportunityFieldErrors::default()),
            }),
        }
    }

    async fn update(
        &self,
        _session: &Session,
        body: ValidatedOpportunityUpdate,
    ) -> Result<Opportunity, RepositoryError> {
        self.opportunities
            .update(OpportunityUpdate {
                id: body.id,
                fields: Some(body.fields),
                addendum: body.addendum,
                deactivation: None,
            })
            .await
    }

    async fn validate_delete(
        &self,
        session: &Session,
        id: &str,
    ) -> Validation<Opportunity, DeleteOpportunityErrors> {
        let authorized = match validate_uuid(id) {
            Validation::Valid(target) => {
                permissions::delete_opportunity(self.opportunities.as_ref(), session, target).await
            }
            Validation::Invalid(_) => permissions::is_admin(session),
        };
        if !authorized {
            return invalid(DeleteOpportunityErrors {
                permissions: Some(permission_messages()),
                not_found: None,
            });
        }
        match validate_opportunity_id(self.opportunities.as_ref(), id).await {
            Validation::Valid(opportunity) => valid(opportunity),
            Validation::Invalid(_) => invalid(DeleteOpportunityErrors {
                permissions: None,
                not_found: Some(vec!["Opportunity not found.".to_owned()]),
            }),
        }
    }

    async fn delete(
        &self,
        session: &Session,
        opportunity: Opportunity,
    ) -> Result<Opportunity, RepositoryError> {
        let actor = session
            .user_id()
            .ok_or_else(|| RepositoryError::query("delete without authenticated session"))?;
        self.opportunities
            .update(OpportunityUpdate {
                id: opportunity.id,
                fields: None,
                addendum: None,
                deactivation: Some(Deactivation {
                    on: Utc::now(),
                    by: actor,
                }),
            })
            .await
    }
}

#[cfg(test)]
#[path = "opportunities_tests.rs"]
mod tests;
