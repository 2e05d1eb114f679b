use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::interface_adapters::protocol::BasicResponse;
use crate::interface_adapters::state::AppState;
use crate::use_cases::support::SupportService;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailParams {
    pub user_email: String,
    pub subject: String,
    pub body: String,
}

pub async fn send_email(
    State(state): State<AppState>,
    Query(params): Query<SendEmailParams>,
) -> Json<BasicResponse> {
    let service = SupportService {
        mailer: state.mailer.clone(),
        inbox: state.support_inbox.clone(),
    };

    Json(
        service
            .send_email(&params.user_email, &params.subject, &params.body)
            .await,
    )
}
