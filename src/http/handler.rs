//! HTTP handlers for the `people` resource

use super::error::{ApiError, ApiResult};
use super::hal::{self, Hal};
use crate::entity::Person;
use crate::graph::NodeId;
use crate::repository::{PageRequest, PersonRepository, Sort};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::str::FromStr;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub people: PersonRepository,
    /// Used for links when a request carries no `Host` header
    pub base_url: String,
}

impl AppState {
    pub fn new(people: PersonRepository, base_url: impl Into<String>) -> Self {
        Self {
            people,
            base_url: base_url.into(),
        }
    }

    /// Absolute URL prefix for links in a response to this request
    fn base_url(&self, headers: &HeaderMap) -> String {
        headers
            .get(header::HOST)
            .and_then(|host| host.to_str().ok())
            .map(|host| format!("http://{}", host))
            .unwrap_or_else(|| self.base_url.trim_end_matches('/').to_string())
    }
}

/// Create or replace payload. Missing fields are null.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonBody {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl PersonBody {
    fn into_person(self, id: Option<NodeId>) -> Person {
        Person {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

/// Merge payload: an absent field is left alone, an explicit null clears it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPatch {
    #[serde(default, deserialize_with = "present")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub last_name: Option<Option<String>>,
}

impl PersonPatch {
    fn apply(self, person: &mut Person) {
        if let Some(first_name) = self.first_name {
            person.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            person.last_name = last_name;
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

impl PageParams {
    fn to_request(&self) -> ApiResult<PageRequest> {
        let page = parse_param("page", self.page.as_deref())?.unwrap_or(0);
        let size = parse_param("size", self.size.as_deref())?.unwrap_or(PageRequest::DEFAULT_SIZE);

        let mut request = PageRequest::new(page, size)?;
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            request = request.with_sort(sort.parse::<Sort>()?);
        }
        Ok(request)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
}

fn parse_param<T: FromStr>(name: &str, value: Option<&str>) -> ApiResult<Option<T>> {
    match value {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Invalid value for '{}': '{}'", name, raw))),
    }
}

/// Ids that are not numbers name no resource
fn parse_id(raw: &str) -> ApiResult<NodeId> {
    raw.parse::<u64>()
        .map(NodeId::new)
        .map_err(|_| ApiError::NotFound(format!("No person with id '{}'", raw)))
}

fn not_found(id: NodeId) -> ApiError {
    ApiError::NotFound(format!("No person with id {}", id.as_u64()))
}

/// `GET /`
pub async fn root_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    Hal(hal::root(&state.base_url(&headers)))
}

/// `GET /people`
pub async fn list_people(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Hal<Value>> {
    let Query(params) = params?;
    let request = params.to_request()?;
    let page = state.people.find_page(&request).await?;
    Ok(Hal(hal::people_page(&state.base_url(&headers), &request, &page)))
}

/// `GET /people/{id}`
pub async fn get_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Hal<Value>> {
    let id = parse_id(&id)?;
    let person = state.people.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Hal(hal::person(&state.base_url(&headers), &person)))
}

/// `POST /people`
pub async fn create_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PersonBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload?;
    let saved = state.people.save(body.into_person(None)).await?;
    let id = saved
        .id
        .ok_or_else(|| ApiError::Internal("Saved person has no id".to_string()))?;

    let base = state.base_url(&headers);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, hal::person_href(&base, id))],
        Hal(hal::person(&base, &saved)),
    ))
}

/// `PUT /people/{id}`
pub async fn replace_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<PersonBody>, JsonRejection>,
) -> ApiResult<Hal<Value>> {
    let id = parse_id(&id)?;
    let Json(body) = payload?;
    if !state.people.exists_by_id(id).await {
        return Err(not_found(id));
    }

    let saved = state.people.save(body.into_person(Some(id))).await?;
    Ok(Hal(hal::person(&state.base_url(&headers), &saved)))
}

/// `PATCH /people/{id}`
pub async fn patch_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<PersonPatch>, JsonRejection>,
) -> ApiResult<Hal<Value>> {
    let id = parse_id(&id)?;
    let Json(patch) = payload?;
    let mut person = state.people.find_by_id(id).await?.ok_or_else(|| not_found(id))?;

    patch.apply(&mut person);
    let saved = state.people.save(person).await?;
    Ok(Hal(hal::person(&state.base_url(&headers), &saved)))
}

/// `DELETE /people/{id}`
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state.people.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /people/search`
pub async fn search_links(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    Hal(hal::search(&state.base_url(&headers)))
}

/// `GET /people/search/findByLastName?name=`
pub async fn find_by_last_name(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Hal<Value>> {
    let Query(params) = params?;
    let name = params
        .name
        .ok_or_else(|| ApiError::BadRequest("Missing required parameter 'name'".to_string()))?;

    let people = state.people.find_by_last_name(&name).await?;
    Ok(Hal(hal::search_results(&state.base_url(&headers), &name, &people)))
}

/// `GET /status`
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let nodes = state.people.store().read().await.node_count();
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "storage": {
            "nodes": nodes,
            "persistent": state.people.is_persistent(),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_distinguishes_absent_from_null() {
        let patch: PersonPatch = serde_json::from_str(r#"{"lastName": null}"#).unwrap();
        assert_eq!(patch.first_name, None);
        assert_eq!(patch.last_name, Some(None));

        let mut person = Person::new("Frodo", "Baggins");
        patch.apply(&mut person);
        assert_eq!(person.first_name.as_deref(), Some("Frodo"));
        assert_eq!(person.last_name, None);
    }

    #[test]
    fn test_body_ignores_unknown_fields() {
        let body: PersonBody =
            serde_json::from_str(r#"{"firstName": "Sam", "age": 38}"#).unwrap();
        assert_eq!(body.first_name.as_deref(), Some("Sam"));
        assert_eq!(body.last_name, None);
    }

    #[test]
    fn test_page_params() {
        let params = PageParams {
            page: Some("2".to_string()),
            size: Some("5".to_string()),
            sort: Some("lastName,desc".to_string()),
        };
        let request = params.to_request().unwrap();
        assert_eq!(request.page(), 2);
        assert_eq!(request.size(), 5);
        assert_eq!(request.sort(), Some(&Sort::desc("lastName")));

        let params = PageParams {
            size: Some("ten".to_string()),
            ..PageParams::default()
        };
        assert!(matches!(params.to_request(), Err(ApiError::BadRequest(_))));

        let params = PageParams {
            size: Some("0".to_string()),
            ..PageParams::default()
        };
        assert!(matches!(params.to_request(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("7").unwrap(), NodeId::new(7));
        assert!(matches!(parse_id("seven"), Err(ApiError::NotFound(_))));
        assert!(matches!(parse_id("-1"), Err(ApiError::NotFound(_))));
    }
}
