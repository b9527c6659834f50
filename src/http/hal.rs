//! HAL documents for the `people` resource

use crate::entity::Person;
use crate::graph::NodeId;
use crate::repository::{Page, PageRequest};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::{json, Map, Value};

pub const HAL_JSON: &str = "application/hal+json";

/// Collection path and relation name
pub const PEOPLE: &str = "people";
/// Item relation name
pub const PERSON: &str = "person";

/// JSON body served as `application/hal+json`
pub struct Hal<T>(pub T);

impl<T: Serialize> IntoResponse for Hal<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => (
                [(header::CONTENT_TYPE, HeaderValue::from_static(HAL_JSON))],
                body,
            )
                .into_response(),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }
}

fn link(href: String) -> Value {
    json!({ "href": href })
}

fn templated(href: String) -> Value {
    json!({ "href": href, "templated": true })
}

pub fn person_href(base: &str, id: NodeId) -> String {
    format!("{}/{}/{}", base, PEOPLE, id.as_u64())
}

/// Item representation: mapped attributes plus `self` and `person` links
pub fn person(base: &str, person: &Person) -> Value {
    let mut links = Map::new();
    if let Some(id) = person.id {
        links.insert("self".to_string(), link(person_href(base, id)));
        links.insert(PERSON.to_string(), link(person_href(base, id)));
    }

    json!({
        "firstName": person.first_name,
        "lastName": person.last_name,
        "_links": links,
    })
}

/// Entry point listing the exported collections
pub fn root(base: &str) -> Value {
    json!({
        "_links": {
            PEOPLE: templated(format!("{}/{}{{?page,size,sort}}", base, PEOPLE)),
            "self": link(format!("{}/", base)),
        }
    })
}

fn page_href(base: &str, request: &PageRequest, number: usize) -> String {
    let mut href = format!(
        "{}/{}?page={}&size={}",
        base,
        PEOPLE,
        number,
        request.size()
    );
    if let Some(sort) = request.sort() {
        href.push_str("&sort=");
        href.push_str(&sort.to_string());
    }
    href
}

/// One page of the collection with navigation links and page metadata
pub fn people_page(base: &str, request: &PageRequest, page: &Page<Person>) -> Value {
    let people: Vec<Value> = page.content.iter().map(|p| person(base, p)).collect();

    let mut links = Map::new();
    if page.total_pages > 1 {
        links.insert("first".to_string(), link(page_href(base, request, 0)));
    }
    if page.has_previous() {
        links.insert(
            "prev".to_string(),
            link(page_href(base, request, page.number - 1)),
        );
    }
    links.insert("self".to_string(), link(page_href(base, request, page.number)));
    if let Some(next) = page.number.checked_add(1).filter(|_| page.has_next()) {
        links.insert("next".to_string(), link(page_href(base, request, next)));
    }
    if page.total_pages > 1 {
        links.insert(
            "last".to_string(),
            link(page_href(base, request, page.total_pages - 1)),
        );
    }
    links.insert("search".to_string(), link(format!("{}/{}/search", base, PEOPLE)));

    json!({
        "_embedded": { PEOPLE: people },
        "_links": links,
        "page": {
            "size": page.size,
            "totalElements": page.total_elements,
            "totalPages": page.total_pages,
            "number": page.number,
        }
    })
}

/// Search resource listing the derived queries
pub fn search(base: &str) -> Value {
    json!({
        "_links": {
            "findByLastName": templated(format!("{}/{}/search/findByLastName{{?name}}", base, PEOPLE)),
            "self": link(format!("{}/{}/search", base, PEOPLE)),
        }
    })
}

/// Result of `findByLastName`
pub fn search_results(base: &str, name: &str, people: &[Person]) -> Value {
    let people: Vec<Value> = people.iter().map(|p| person(base, p)).collect();

    json!({
        "_embedded": { PEOPLE: people },
        "_links": {
            "self": link(format!(
                "{}/{}/search/findByLastName?name={}",
                base,
                PEOPLE,
                utf8_percent_encode(name, NON_ALPHANUMERIC)
            )),
        }
    })
}
