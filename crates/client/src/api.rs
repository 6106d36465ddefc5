use std::time::Duration;

use api_types::{
    ApiResponse,
    auth::{AuthResponse, SignIn},
    category::Category,
    expense::{Expense, ExpensePayload},
    list::ListResult,
    query::QueryOptions,
    recurrent_expense::{RecurrentExpense, RecurrentExpensePayload},
};
use engine::{normalize_category, normalize_expense, normalize_list, normalize_recurrent_expense};
use reqwest::{Client, Method, RequestBuilder, Url, header};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use crate::ClientError;

type Result<T> = std::result::Result<T, ClientError>;

const QUERY_OPTIONS_PARAM: &str = "query_options";

/// Client for the expense tracker API.
///
/// Every call takes the bearer token explicitly; the client itself holds no
/// session beyond the cookie jar `/auth/refresh` relies on.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|err| ClientError::InvalidBaseUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        // `join` drops the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::InvalidBaseUrl(err.to_string()))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> Result<RequestBuilder> {
        let mut req = self
            .http
            .request(method, self.url(path)?)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    /// Sends the request and returns the response envelope as JSON.
    ///
    /// Non-2xx statuses become [`ClientError::Server`] with the envelope's
    /// `error` message; a 2xx envelope carrying `error` becomes
    /// [`ClientError::Api`].
    async fn send(&self, method: Method, path: &str, req: RequestBuilder) -> Result<Value> {
        debug!(%method, path, "api request");
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse<Value>>(&text)
                .ok()
                .and_then(|envelope| envelope.error)
                .unwrap_or_else(|| "server error".to_string());
            warn!(%method, path, %status, %message, "api request failed");
            return Err(ClientError::Server { status, message });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let envelope: Value = serde_json::from_str(&text)?;
        if let Some(message) = envelope.get("error").and_then(Value::as_str) {
            warn!(%method, path, %message, "api returned an error");
            return Err(ClientError::Api(message.to_string()));
        }
        Ok(envelope)
    }

    async fn call(&self, method: Method, path: &str, token: Option<&str>) -> Result<Value> {
        let req = self.request(method.clone(), path, token)?;
        self.send(method, path, req).await
    }

    async fn call_json<TReq: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: &TReq,
    ) -> Result<Value> {
        let req = self.request(method.clone(), path, token)?.json(body);
        self.send(method, path, req).await
    }

    async fn list(&self, path: &str, token: Option<&str>, options: &QueryOptions) -> Result<Value> {
        let encoded = serde_json::to_string(options)?;
        let req = self
            .request(Method::GET, path, token)?
            .query(&[(QUERY_OPTIONS_PARAM, encoded)]);
        self.send(Method::GET, path, req).await
    }

    pub async fn sign_in(&self, credentials: &SignIn) -> Result<AuthResponse> {
        let envelope = self
            .call_json(Method::POST, "/auth/sign-in", None, credentials)
            .await?;
        decode_data(envelope)
    }

    /// Exchanges the session cookie set at sign-in for a fresh access token.
    pub async fn refresh(&self, token: Option<&str>) -> Result<AuthResponse> {
        let envelope = self.call(Method::POST, "/auth/refresh", token).await?;
        decode_data(envelope)
    }

    pub async fn list_categories(&self, token: Option<&str>) -> Result<Vec<Category>> {
        let envelope = self.call(Method::GET, "/categories", token).await?;
        Ok(envelope
            .get("data")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(normalize_category).collect())
            .unwrap_or_default())
    }

    pub async fn list_expenses(
        &self,
        token: Option<&str>,
        options: &QueryOptions,
    ) -> Result<ListResult<Expense>> {
        let envelope = self.list("/expenses", token, options).await?;
        Ok(normalize_list(
            &envelope,
            Some(&options.pagination),
            normalize_expense,
        ))
    }

    pub async fn get_expense(&self, token: Option<&str>, id: i64) -> Result<Expense> {
        let envelope = self
            .call(Method::GET, &format!("/expenses/{id}"), token)
            .await?;
        normalize_data(&envelope, normalize_expense)
    }

    pub async fn create_expense(
        &self,
        token: Option<&str>,
        payload: &ExpensePayload,
    ) -> Result<Expense> {
        let envelope = self
            .call_json(Method::POST, "/expenses", token, payload)
            .await?;
        normalize_data(&envelope, normalize_expense)
    }

    pub async fn update_expense(
        &self,
        token: Option<&str>,
        id: i64,
        payload: &ExpensePayload,
    ) -> Result<Expense> {
        let envelope = self
            .call_json(Method::PUT, &format!("/expenses/{id}"), token, payload)
            .await?;
        normalize_data(&envelope, normalize_expense)
    }

    pub async fn delete_expense(&self, token: Option<&str>, id: i64) -> Result<()> {
        self.call(Method::DELETE, &format!("/expenses/{id}"), token)
            .await?;
        Ok(())
    }

    pub async fn list_recurrent_expenses(
        &self,
        token: Option<&str>,
        options: &QueryOptions,
    ) -> Result<ListResult<RecurrentExpense>> {
        let envelope = self.list("/recurrent-expenses", token, options).await?;
        Ok(normalize_list(
            &envelope,
            Some(&options.pagination),
            normalize_recurrent_expense,
        ))
    }

    pub async fn get_recurrent_expense(
        &self,
        token: Option<&str>,
        id: i64,
    ) -> Result<RecurrentExpense> {
        let envelope = self
            .call(Method::GET, &format!("/recurrent-expenses/{id}"), token)
            .await?;
        normalize_data(&envelope, normalize_recurrent_expense)
    }

    pub async fn create_recurrent_expense(
        &self,
        token: Option<&str>,
        payload: &RecurrentExpensePayload,
    ) -> Result<RecurrentExpense> {
        let envelope = self
            .call_json(Method::POST, "/recurrent-expenses", token, payload)
            .await?;
        normalize_data(&envelope, normalize_recurrent_expense)
    }

    pub async fn update_recurrent_expense(
        &self,
        token: Option<&str>,
        id: i64,
        payload: &RecurrentExpensePayload,
    ) -> Result<RecurrentExpense> {
        let path = format!("/recurrent-expenses/{id}");
        let envelope = self.call_json(Method::PUT, &path, token, payload).await?;
        normalize_data(&envelope, normalize_recurrent_expense)
    }

    pub async fn patch_recurrent_expense(
        &self,
        token: Option<&str>,
        id: i64,
        payload: &RecurrentExpensePayload,
    ) -> Result<RecurrentExpense> {
        let path = format!("/recurrent-expenses/{id}");
        let envelope = self.call_json(Method::PATCH, &path, token, payload).await?;
        normalize_data(&envelope, normalize_recurrent_expense)
    }

    pub async fn delete_recurrent_expense(&self, token: Option<&str>, id: i64) -> Result<()> {
        self.call(Method::DELETE, &format!("/recurrent-expenses/{id}"), token)
            .await?;
        Ok(())
    }
}

fn data(envelope: &Value) -> Result<&Value> {
    envelope
        .get("data")
        .filter(|data| !data.is_null())
        .ok_or(ClientError::MissingData)
}

fn normalize_data<T>(envelope: &Value, normalize: impl Fn(&Value) -> T) -> Result<T> {
    data(envelope).map(normalize)
}

fn decode_data<T: DeserializeOwned>(envelope: Value) -> Result<T> {
    let data = data(&envelope)?.clone();
    Ok(serde_json::from_value(data)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(Client::new(), base).unwrap()
    }

    #[test]
    fn paths_are_joined_under_the_base_path() {
        let api = client("http://localhost:8080/api");
        assert_eq!(
            api.url("/expenses/3").unwrap().as_str(),
            "http://localhost:8080/api/expenses/3"
        );

        let api = client("http://localhost:8080/");
        assert_eq!(
            api.url("categories").unwrap().as_str(),
            "http://localhost:8080/categories"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            ApiClient::with_client(Client::new(), "not a url"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ApiClient::with_client(Client::new(), "mailto:someone@example.com"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn null_data_is_missing() {
        assert!(matches!(
            data(&json!({"data": null, "error": null})),
            Err(ClientError::MissingData)
        ));
        assert!(matches!(data(&Value::Null), Err(ClientError::MissingData)));
        assert_eq!(data(&json!({"data": 1})).unwrap(), &json!(1));
    }
}
