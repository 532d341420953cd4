//! Code-With-Us opportunity data model and field validation.
//!
//! Opportunities are posted by public-sector users, carry a reward bounded
//! by configuration, and accumulate append-only addenda once live. Like
//! organizations they soft-deactivate rather than delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ports::{OpportunityRepository, RepositoryError};
use super::validation::{Validation, Validity, all_valid, invalid, valid};
use super::validators::{
    validate_date, validate_generic_string, validate_integer, validate_optional_date,
    validate_optional_string, validate_uuid,
};

/// Maximum length of an opportunity title.
pub const TITLE_MAX: usize = 200;
/// Maximum length of the teaser shown in listings.
pub const TEASER_MAX: usize = 500;
/// Maximum length of the full description.
pub const DESCRIPTION_MAX: usize = 10_000;
/// Maximum length of the location field.
pub const LOCATION_MAX: usize = 100;
/// Maximum number of skills attached to one opportunity.
pub const SKILLS_MAX: usize = 10;
/// Maximum length of a single skill label.
pub const SKILL_MAX: usize = 100;
/// Maximum length of the remote-work description.
pub const REMOTE_DESC_MAX: usize = 500;
/// Maximum length of submission, acceptance and evaluation notes.
pub const CRITERIA_MAX: usize = 5_000;
/// Maximum length of an addendum.
pub const ADDENDUM_MAX: usize = 5_000;

/// Lifecycle status of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpportunityStatus {
    Draft,
    Published,
    Evaluation,
    Awarded,
    Suspended,
    Canceled,
}

/// An appended clarification note on a published opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Addendum {
    pub id: Uuid,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

/// A persisted Code-With-Us opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teaser: Option<String>,
    pub description: String,
    pub location: String,
    pub reward: i64,
    pub skills: Vec<String>,
    pub remote_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_desc: Option<String>,
    pub proposal_deadline: DateTime<Utc>,
    pub assignment_date: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_info: Option<String>,
    pub acceptance_criteria: String,
    pub evaluation_criteria: String,
    pub status: OpportunityStatus,
    pub addenda: Vec<Addendum>,
    pub author: Uuid,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing view of an opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpportunitySlim {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teaser: Option<String>,
    pub location: String,
    pub reward: i64,
    pub remote_ok: bool,
    pub proposal_deadline: DateTime<Utc>,
    pub status: OpportunityStatus,
}

/// Raw opportunity payload lifted tolerantly from a request body.
#[derive(Debug, Default, Clone)]
pub struct OpportunityBody {
    pub title: String,
    pub teaser: String,
    pub description: String,
    pub location: String,
    pub reward: Option<i64>,
    pub skills: Vec<String>,
    pub remote_ok: bool,
    pub remote_desc: String,
    pub proposal_deadline: String,
    pub assignment_date: String,
    pub start_date: String,
    pub completion_date: String,
    pub submission_info: String,
    pub acceptance_criteria: String,
    pub evaluation_criteria: String,
    pub status: String,
}

/// Entity-shaped opportunity payload produced once every field validates.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOpportunityBody {
    pub title: String,
    pub teaser: Option<String>,
    pub description: String,
    pub location: String,
    pub reward: i64,
    pub skills: Vec<String>,
    pub remote_ok: bool,
    pub remote_desc: Option<String>,
    pub proposal_deadline: DateTime<Utc>,
    pub assignment_date: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,
    pub submission_info: Option<String>,
    pub acceptance_criteria: String,
    pub evaluation_criteria: String,
    pub status: OpportunityStatus,
}

/// Field-level error map for opportunity payloads.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityFieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teaser: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_desc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_deadline: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_date: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_info: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_criteria: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<String>>,
}

/// Error body for `POST /opportunities`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpportunityErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(flatten)]
    pub fields: OpportunityFieldErrors,
}

/// Error body for `PUT /opportunities/{id}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOpportunityErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addendum: Option<Vec<String>>,
    #[serde(flatten)]
    pub fields: OpportunityFieldErrors,
}

/// Error body for `DELETE /opportunities/{id}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOpportunityErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_found: Option<Vec<String>>,
}

/// Validate the opportunity title.
pub fn validate_title(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Title", 1, TITLE_MAX)
}

/// Validate the optional teaser.
pub fn validate_teaser(raw: &str) -> Validation<Option<String>> {
    validate_optional_string(raw, "Teaser", TEASER_MAX)
}

/// Validate the full description.
pub fn validate_description(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Description", 1, DESCRIPTION_MAX)
}

/// Validate the location field.
pub fn validate_location(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Location", 1, LOCATION_MAX)
}

/// Validate the reward amount against the configured ceiling.
pub fn validate_reward(raw: Option<i64>, max: i64) -> Validation<i64> {
    match raw {
        None => invalid(vec!["Reward is required.".to_owned()]),
        Some(amount) => validate_integer(amount, "Reward", 1, max),
    }
}

/// Validate the skill list: bounded in size, every entry validated.
///
/// Individual entries are validated independently and gated with
/// [`all_valid`], so one bad entry reports alongside the others.
pub fn validate_skills(raw: &[String]) -> Validation<Vec<String>> {
    if raw.is_empty() {
        return invalid(vec!["Please select at least one skill.".to_owned()]);
    }
    if raw.len() > SKILLS_MAX {
        return invalid(vec![format!(
            "Please select at most {SKILLS_MAX} skills."
        )]);
    }
    let results: Vec<Validation<String>> = raw
        .iter()
        .map(|skill| validate_generic_string(skill, "Skill", 1, SKILL_MAX))
        .collect();
    let refs: Vec<&dyn Validity> = results.iter().map(|r| r as &dyn Validity).collect();
    if all_valid(&refs) {
        valid(results.into_iter().filter_map(Validation::ok).collect())
    } else {
        invalid(
            results
                .into_iter()
                .filter_map(Validation::err)
                .flatten()
                .collect(),
        )
    }
}

/// Validate the remote-work description against the remote flag.
///
/// A remote-friendly opportunity must describe its remote arrangement; a
/// strictly on-site one discards whatever was submitted.
pub fn validate_remote_desc(remote_ok: bool, raw: &str) -> Validation<Option<String>> {
    if !remote_ok {
        return valid(None);
    }
    validate_generic_string(raw, "Remote description", 1, REMOTE_DESC_MAX).map(Some)
}

/// Validate the optional submission instructions.
pub fn validate_submission_info(raw: &str) -> Validation<Option<String>> {
    validate_optional_string(raw, "Submission info", CRITERIA_MAX)
}

/// Validate the acceptance criteria.
pub fn validate_acceptance_criteria(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Acceptance criteria", 1, CRITERIA_MAX)
}

/// Validate the evaluation criteria.
pub fn validate_evaluation_criteria(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Evaluation criteria", 1, CRITERIA_MAX)
}

/// Validate the status submitted with a create or update payload.
///
/// Only `DRAFT` and `PUBLISHED` may be set directly; the remaining statuses
/// are driven by the evaluation lifecycle, not by edits.
pub fn validate_submitted_status(raw: &str) -> Validation<OpportunityStatus> {
    match raw.trim() {
        "DRAFT" => valid(OpportunityStatus::Draft),
        "PUBLISHED" => valid(OpportunityStatus::Published),
        _ => invalid(vec![
            "Status must be one of DRAFT or PUBLISHED.".to_owned(),
        ]),
    }
}

/// Validate an addendum submitted with an update payload.
pub fn validate_addendum(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Addendum", 1, ADDENDUM_MAX)
}

fn validate_on_or_after(
    result: Validation<DateTime<Utc>>,
    earlier: Option<&DateTime<Utc>>,
    message: &str,
) -> Validation<DateTime<Utc>> {
    result.and_then(|date| match earlier {
        Some(bound) if date < *bound => invalid(vec![message.to_owned()]),
        _ => valid(date),
    })
}

/// Run every opportunity field validator and combine the outcomes.
///
/// Date ordering is enforced pairwise: assignment on or after the proposal
/// deadline, start on or after assignment, completion (when given) on or
/// after start. Ordering checks only fire when both ends parsed.
pub fn validate_opportunity_body(
    body: &OpportunityBody,
    reward_max: i64,
) -> Validation<ValidatedOpportunityBody, OpportunityFieldErrors> {
    use Validation::Valid;

    let title = validate_title(&body.title);
    let teaser = validate_teaser(&body.teaser);
    let description = validate_description(&body.description);
    let location = validate_location(&body.location);
    let reward = validate_reward(body.reward, reward_max);
    let skills = validate_skills(&body.skills);
    let remote_desc = validate_remote_desc(body.remote_ok, &body.remote_desc);

    let proposal_deadline = validate_date(&body.proposal_deadline, "Proposal deadline");
    let deadline_hint = proposal_deadline.clone().ok();
    let assignment_date = validate_on_or_after(
        validate_date(&body.assignment_date, "Assignment date"),
        deadline_hint.as_ref(),
        "Assignment date must be on or after the proposal deadline.",
    );
    let assignment_hint = assignment_date.clone().ok();
    let start_date = validate_on_or_after(
        validate_date(&body.start_date, "Start date"),
        assignment_hint.as_ref(),
        "Start date must be on or after the assignment date.",
    );
    let start_hint = start_date.clone().ok();
    let completion_date =
        validate_optional_date(&body.completion_date, "Completion date").and_then(|parsed| {
            match (parsed, start_hint.as_ref()) {
                (Some(date), Some(start)) if date < *start => invalid(vec![
                    "Completion date must be on or after the start date.".to_owned(),
                ]),
                (other, _) => valid(other),
            }
        });

    let submission_info = validate_submission_info(&body.submission_info);
    let acceptance_criteria = validate_acceptance_criteria(&body.acceptance_criteria);
    let evaluation_criteria = validate_evaluation_criteria(&body.evaluation_criteria);
    let status = validate_submitted_status(&body.status);

    match (
        title,
        teaser,
        description,
        location,
        reward,
        skills,
        remote_desc,
        proposal_deadline,
        assignment_date,
        start_date,
        completion_date,
        submission_info,
        acceptance_criteria,
        evaluation_criteria,
        status,
    ) {
        (
            Valid(title),
            Valid(teaser),
            Valid(description),
            Valid(location),
            Valid(reward),
            Valid(skills),
            Valid(remote_desc),
            Valid(proposal_deadline),
            Valid(assignment_date),
            Valid(start_date),
            Valid(completion_date),
            Valid(submission_info),
            Valid(acceptance_criteria),
            Valid(evaluation_criteria),
            Valid(status),
        ) => valid(ValidatedOpportunityBody {
            title,
            teaser,
            description,
            location,
            reward,
            skills,
            remote_ok: body.remote_ok,
            remote_desc,
            proposal_deadline,
            assignment_date,
            start_date,
            completion_date,
            submission_info,
            acceptance_criteria,
            evaluation_criteria,
            status,
        }),
        (
            title,
            teaser,
            description,
            location,
            reward,
            skills,
            remote_desc,
            proposal_deadline,
            assignment_date,
            start_date,
            completion_date,
            submission_info,
            acceptance_criteria,
            evaluation_criteria,
            status,
        ) => invalid(OpportunityFieldErrors {
            title: title.err(),
            teaser: teaser.err(),
            description: description.err(),
            location: location.err(),
            reward: reward.err(),
            skills: skills.err(),
            remote_desc: remote_desc.err(),
            proposal_deadline: proposal_deadline.err(),
            assignment_date: assignment_date.err(),
            start_date: start_date.err(),
            completion_date: completion_date.err(),
            submission_info: submission_info.err(),
            acceptance_criteria: acceptance_criteria.err(),
            evaluation_criteria: evaluation_criteria.err(),
            status: status.err(),
        }),
    }
}

/// Resolve a raw opportunity id to its stored record.
pub async fn validate_opportunity_id(
    opportunities: &dyn OpportunityRepository,
    raw: &str,
) -> Validation<Opportunity> {
    let id = match validate_uuid(raw) {
        Validation::Valid(id) => id,
        Validation::Invalid(errors) => return invalid(errors),
    };
    match opportunities.read_one(id).await {
        Ok(Some(opportunity)) => valid(opportunity),
        Ok(None) => invalid(vec!["Opportunity not found.".to_owned()]),
        Err(RepositoryError::Connection { .. } | RepositoryError::Query { .. }) => invalid(vec![
            "Unable to verify the specified opportunity. Please try again later.".to_owned(),
        ]),
    }
}
