use actix_web::{get, post, web, HttpMessage, HttpRequest, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::{auth::Claims, graphql::Schema};

/// Runs a GraphQL request, passing the caller's claims (if any) to resolvers.
#[post("/graphql")]
async fn graphql(
    schema: web::Data<Schema>,
    req: HttpRequest,
    gql_request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = gql_request.into_inner();
    if let Some(claims) = req.extensions().get::<Claims>().cloned() {
        request = request.data(claims);
    }
    schema.execute(request).await.into()
}

#[get("/graphiql")]
async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}
