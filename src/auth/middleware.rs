use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;

use crate::{auth::{Claims, JwtService}, errors::AppError};

/// Attaches `Claims` to the request when a bearer token is sent. Requests
/// without an `Authorization` header continue anonymously; a header that is
/// present but invalid is rejected.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let auth_header = req
                .headers()
                .get(AUTHORIZATION)
                .map(|h| h.to_str().map(str::to_owned));

            if let Some(header) = auth_header {
                let header =
                    header.map_err(|_| ErrorUnauthorized("Invalid authorization header"))?;
                let token = header
                    .strip_prefix("Bearer ")
                    .ok_or_else(|| ErrorUnauthorized("Invalid authorization header format"))?;

                let jwt_service = req
                    .app_data::<web::Data<JwtService>>()
                    .ok_or_else(|| ErrorUnauthorized("JWT service not configured"))?;

                let claims = jwt_service
                    .validate_token(token)
                    .map_err(|_| ErrorUnauthorized("Invalid or expired token"))?;

                req.extensions_mut().insert(claims);
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

// Extractor for handlers that require a signed-in user
pub struct AuthenticatedUser(pub Claims);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let claims = req
            .extensions()
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()));

        ready(claims.map(AuthenticatedUser))
    }
}

// Extractor for handlers that also serve anonymous callers
pub struct MaybeUser(pub Option<Claims>);

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(MaybeUser(req.extensions().get::<Claims>().cloned())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, models::domain::UserProfile};
    use actix_web::{get, http::StatusCode, test, App, HttpResponse};

    #[get("/whoami")]
    async fn whoami(user: MaybeUser) -> HttpResponse {
        match user.0 {
            Some(claims) => HttpResponse::Ok().body(claims.sub),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[get("/private")]
    async fn private(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.0.sub)
    }

    fn jwt_service() -> JwtService {
        let config = Config::test_config();
        JwtService::new(&config.jwt_secret, 1, &config.admin_email)
    }

    #[actix_web::test]
    async fn anonymous_requests_pass_through() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jwt_service()))
                .wrap(AuthMiddleware)
                .service(whoami)
                .service(private),
        )
        .await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "anonymous");

        let req = test::TestRequest::get().uri("/private").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn valid_token_attaches_claims() {
        let jwt = jwt_service();
        let token = jwt
            .create_token(&UserProfile::new("uid-7", "seven@example.com"))
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jwt))
                .wrap(AuthMiddleware)
                .service(whoami),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, "uid-7");
    }

    #[actix_web::test]
    async fn invalid_token_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jwt_service()))
                .wrap(AuthMiddleware)
                .service(whoami),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((AUTHORIZATION, "Bearer not-a-jwt"))
            .to_request();
        let result = test::try_call_service(&app, req).await;

        match result {
            Ok(resp) => assert_eq!(resp.status(), StatusCode::UNAUTHORIZED),
            Err(err) => assert_eq!(
                err.as_response_error().status_code(),
                StatusCode::UNAUTHORIZED
            ),
        }
    }
}
