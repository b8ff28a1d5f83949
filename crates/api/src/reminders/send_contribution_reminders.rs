use crate::error::PitchinError;
use crate::reminders::engine::{self, RunKind, RunSummary};
use crate::shared::auth::protect_admin_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use pitchin_api_structs::trigger_contribution_reminders::{APIResponse, RequestBody};
use pitchin_infra::PitchinContext;

pub async fn trigger_contribution_reminders_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<PitchinContext>,
) -> Result<HttpResponse, PitchinError> {
    protect_admin_route(&http_req, &ctx)?;

    let usecase = SendContributionRemindersUseCase { as_of: body.0.as_of };

    execute(usecase, &ctx)
        .await
        .map(|summary| {
            HttpResponse::Ok().json(APIResponse {
                users_processed: summary.users_processed,
                notifications_sent: summary.notifications_sent,
                emails_sent: summary.emails_sent,
                duplicates_skipped: summary.duplicates_skipped,
                errors: summary.errors,
            })
        })
        .map_err(PitchinError::from)
}

/// Runs the forward reminder pass over every eligible user
#[derive(Debug)]
pub struct SendContributionRemindersUseCase {
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug)]
pub enum UseCaseError {}

impl From<UseCaseError> for PitchinError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendContributionRemindersUseCase {
    type Response = RunSummary;
    type Error = UseCaseError;

    const NAME: &'static str = "SendContributionReminders";

    async fn execute(&mut self, ctx: &PitchinContext) -> Result<Self::Response, Self::Error> {
        Ok(engine::run(ctx, self.as_of, RunKind::Forward).await)
    }
}
