use crate::error::PitchinError;
use actix_web::HttpRequest;
use pitchin_infra::PitchinContext;

pub const ADMIN_API_KEY_HEADER: &str = "pitchin-admin-api-key";

/// The trigger routes are operational surfaces, they require the admin
/// api key from the `Config`
pub fn protect_admin_route(http_req: &HttpRequest, ctx: &PitchinContext) -> Result<(), PitchinError> {
    let api_key = http_req
        .headers()
        .get(ADMIN_API_KEY_HEADER)
        .and_then(|header| header.to_str().ok());

    match api_key {
        Some(api_key) if api_key == ctx.config.admin_api_key => Ok(()),
        Some(_) => Err(PitchinError::Unauthorized(
            "Invalid admin api key provided".into(),
        )),
        None => Err(PitchinError::Unauthorized(format!(
            "Missing the `{}` header",
            ADMIN_API_KEY_HEADER
        ))),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use actix_web::test::TestRequest;
    use pitchin_infra::setup_context_inmemory;

    #[test]
    fn only_the_configured_admin_key_passes() {
        let ctx = setup_context_inmemory();

        let req = TestRequest::default().to_http_request();
        assert!(protect_admin_route(&req, &ctx).is_err());

        let req = TestRequest::default()
            .insert_header((ADMIN_API_KEY_HEADER, "not-the-key"))
            .to_http_request();
        assert!(protect_admin_route(&req, &ctx).is_err());

        let req = TestRequest::default()
            .insert_header((ADMIN_API_KEY_HEADER, ctx.config.admin_api_key.as_str()))
            .to_http_request();
        assert!(protect_admin_route(&req, &ctx).is_ok());
    }
}
