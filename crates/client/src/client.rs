//! Query submission and response decoding.

use std::sync::LazyLock;

use query::Expr;
use tracing::{debug, instrument};
use types::{record, Field, Value};

use crate::{ClientError, HttpTransport};

static RESOURCE: LazyLock<Field<Value>> = LazyLock::new(|| Field::keys(["resource"]));

static ERRORS: LazyLock<Field<Vec<ApiError>>> =
    LazyLock::new(|| Field::keys(["errors"]).collect(&Field::root().to_type::<ApiError>()));

/// One entry of the `errors` array returned with a failed query.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub code: String,
    pub description: String,
    /// Location of the failing sub-expression, as keys and indexes.
    pub position: Option<Vec<Value>>,
}

record! { ApiError { code, description, position } }

/// Submits query expressions over an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct Client<T> {
    transport: T,
}

impl<T: HttpTransport> Client<T> {
    pub fn new(transport: T) -> Self {
        Client { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Evaluates `expr` and returns the `resource` member of the response.
    ///
    /// A non-2xx status becomes [`ClientError::Request`] carrying every error
    /// the service reported.
    #[instrument(skip_all)]
    pub async fn query(&self, expr: impl Into<Expr>) -> Result<Value, ClientError> {
        let body = serde_json::to_string(&expr.into()).map_err(ClientError::Encode)?;
        let response = self.transport.post("/", body).await?;
        let tree = Value::parse(&response.body)?;

        if response.is_success() {
            return Ok(RESOURCE.get(&tree)?);
        }

        let errors = ERRORS.get(&tree)?;
        debug!(status = response.status, count = errors.len(), "Query rejected");
        Err(ClientError::Request { status: response.status, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Method, RawResponse, TransportError};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use query::{add, create, get, match_index, obj, paginate};
    use std::sync::Mutex;
    use types::response::Page;
    use types::{FromValue, Ref};

    /// Replays one canned response and records what was sent.
    struct Canned {
        status: u16,
        body: &'static str,
        sent: Mutex<Vec<(Method, String, Option<String>)>>,
    }

    impl Canned {
        fn new(status: u16, body: &'static str) -> Self {
            Canned { status, body, sent: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl HttpTransport for Canned {
        async fn send(
            &self,
            method: Method,
            path: &str,
            _query: &[(String, String)],
            body: Option<String>,
        ) -> Result<RawResponse, TransportError> {
            self.sent.lock().unwrap().push((method, path.to_string(), body));
            Ok(RawResponse { status: self.status, body: self.body.to_string(), ..Default::default() })
        }
    }

    #[tokio::test]
    async fn test_query_posts_expression_and_returns_resource() {
        let client = Client::new(Canned::new(
            200,
            r#"{"resource": {"ref": {"@ref": "classes/spells/1"}, "data": {"name": "Fire"}}}"#,
        ));

        let resource = client.query(get(Ref::class("spells").child("1"))).await.unwrap();
        assert_eq!(
            resource.get(&Field::keys(["ref"]).to(types::codec::REF)),
            Ok(Ref::class("spells").child("1"))
        );

        let sent = client.transport().sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![(Method::Post, "/".to_string(), Some(r#"{"get":{"@ref":"classes/spells/1"}}"#.to_string()))]
        );
    }

    #[tokio::test]
    async fn test_rejected_query_collects_service_errors() {
        let client = Client::new(Canned::new(
            400,
            r#"{"errors": [
                {"position": ["create"], "code": "invalid ref", "description": "Ref refers to undefined class"},
                {"code": "validation failed", "description": "Instance data is not valid."}
            ]}"#,
        ));

        let err = client
            .query(create(Ref::class("missing"), obj([("data", obj([("name", "Fire".into())]))])))
            .await
            .unwrap_err();
        let ClientError::Request { status, errors } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(*status, 400);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].position, Some(vec![Value::from("create")]));
        assert_eq!(errors[1].position, None);
        assert!(err.to_string().contains("invalid ref: Ref refers to undefined class"));
    }

    #[tokio::test]
    async fn test_error_response_without_errors_array_is_a_shape_error() {
        let client = Client::new(Canned::new(500, r#"{"message": "oops"}"#));
        let err = client.query(Expr::null()).await.unwrap_err();
        assert!(matches!(err, ClientError::Shape(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_reported() {
        let client = Client::new(Canned::new(502, "<html>Bad gateway</html>"));
        let err = client.query(Expr::null()).await.unwrap_err();
        assert!(matches!(err, ClientError::Body(_)));
    }

    #[tokio::test]
    async fn test_paginated_resource_decodes_as_page() {
        let client = Client::new(Canned::new(
            200,
            r#"{"resource": {"data": [{"@ref": "classes/spells/1"}], "after": [{"@ref": "classes/spells/2"}]}}"#,
        ));

        let resource = client.query(paginate(match_index(Ref::index("all_spells"))).size(1)).await.unwrap();
        let page = Page::from_value(&resource).unwrap();
        assert_eq!(page.data, vec![Value::Ref(Ref::class("spells").child("1"))]);
        assert!(page.before.is_none());
        assert!(page.after.is_some());
    }

    #[tokio::test]
    async fn test_non_finite_double_is_not_sent() {
        let client = Client::new(Canned::new(200, r#"{"resource": 0}"#));
        let err = client.query(add([1.0, f64::NAN])).await.unwrap_err();
        assert!(matches!(err, ClientError::Encode(_)));
        assert!(client.transport().sent.lock().unwrap().is_empty());
    }
}
