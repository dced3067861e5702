//! Endpoint extraction from the REST API reference page.
//!
//! This crate provides:
//! - [`dom`] — read-only [`DocNode`] tree queries over `scraper` documents
//! - [`extract`] — one [`RawEndpoint`] per documented operation, in document order
//!
//! The extractor is tied to the reference page's layout. Every operation lives in
//! a container whose `h3` carries an `id` starting with `api-rest-api`; the rest of
//! the operation is found relative to that heading. Sections that do not fit the
//! layout are skipped or lose optional fields, they never fail the run.

pub mod dom;

use std::sync::LazyLock;

use jirest_shared::{HttpMethod, Param, RawDocument, RawEndpoint};
use scraper::{Html, Selector};
use tracing::{debug, info};

pub use dom::{DocNode, Sibling};

/// `id` prefix of headings that document a REST operation.
pub const ENDPOINT_ID_PREFIX: &str = "api-rest-api";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h3"));
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static PARAMS_HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h5"));
static PARAM_SECTION: LazyLock<Selector> = LazyLock::new(|| selector("section"));
static PARAM_NAME: LazyLock<Selector> = LazyLock::new(|| selector("strong"));
static PARAM_TYPE: LazyLock<Selector> = LazyLock::new(|| selector("p > span"));
static PARAM_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| selector("div > p"));
static PARAM_DEFAULT: LazyLock<Selector> =
    LazyLock::new(|| selector("div > span > span > span > code"));
static EXAMPLE_HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h4"));
static CODE: LazyLock<Selector> = LazyLock::new(|| selector("code"));

/// Decode and parse the reference document, then extract its endpoints.
pub fn extract(document: &RawDocument) -> Vec<RawEndpoint> {
    extract_html(&document.decode())
}

/// Extract endpoints from already decoded markup.
pub fn extract_html(html: &str) -> Vec<RawEndpoint> {
    let doc = Html::parse_document(html);

    let endpoints: Vec<RawEndpoint> = doc
        .select(&HEADING)
        .map(DocNode::new)
        .filter(is_endpoint_heading)
        .filter_map(endpoint_from_heading)
        .collect();

    info!(endpoints = endpoints.len(), "extracted endpoints from reference");
    endpoints
}

/// Only headings whose `id` follows the REST-operation convention start an endpoint.
fn is_endpoint_heading(heading: &DocNode<'_>) -> bool {
    heading
        .attr("id")
        .is_some_and(|id| id.starts_with(ENDPOINT_ID_PREFIX))
}

fn endpoint_from_heading(heading: DocNode<'_>) -> Option<RawEndpoint> {
    let name = heading.text().trim().to_string();
    let Some(scope) = heading.parent() else {
        debug!(%name, "endpoint heading has no container, skipping");
        return None;
    };

    let Some((http_method, path)) = method_and_path(&scope) else {
        debug!(%name, "no method/path paragraph, skipping");
        return None;
    };

    let Some(command) = example_command(&scope) else {
        debug!(%name, "no example command, skipping");
        return None;
    };

    Some(RawEndpoint {
        description: description_after_method_path(&heading),
        params: parameters(&scope),
        name,
        http_method,
        path,
        command,
    })
}

/// The first paragraph of an operation reads `METHOD /path`.
fn method_and_path(scope: &DocNode<'_>) -> Option<(HttpMethod, String)> {
    let text = scope.select_first(&PARAGRAPH)?.text();
    let mut tokens = text.split_whitespace();
    let (method, path) = (tokens.next()?, tokens.next()?);
    if tokens.next().is_some() {
        return None;
    }
    let method = method
        .parse::<HttpMethod>()
        .map_err(|e: String| debug!(error = %e, "unrecognized method"))
        .ok()?;
    Some((method, path.to_string()))
}

/// The description follows the method/path paragraph, two hops after the heading.
fn description_after_method_path(heading: &DocNode<'_>) -> String {
    heading
        .following_siblings()
        .nth(1)
        .map(|sibling| sibling.text().trim().to_string())
        .unwrap_or_default()
}

/// Parameters live in `section`s grouped under a sub-heading ending in "parameters".
fn parameters(scope: &DocNode<'_>) -> Vec<Param> {
    let Some(group) = scope
        .select_all(&PARAMS_HEADING)
        .find(|h| h.text().trim_end().ends_with("parameters"))
        .and_then(|h| h.parent())
    else {
        return Vec::new();
    };

    group
        .select_all(&PARAM_SECTION)
        .filter_map(|section| param_from_section(&section))
        .collect()
}

/// A parameter section: name in `strong`, type in a labelled span, description and
/// default value in the body `div`. Sections without a name are dropped.
fn param_from_section(section: &DocNode<'_>) -> Option<Param> {
    let field = |sel: &'static Selector| section.select_first(sel).map(|n| chomp(n.text()));

    Some(Param {
        name: field(&*PARAM_NAME)?,
        param_type: field(&*PARAM_TYPE),
        description: field(&*PARAM_DESCRIPTION),
        default: field(&*PARAM_DEFAULT),
    })
}

/// The example invocation is the last code block after an "Example" sub-heading.
fn example_command(scope: &DocNode<'_>) -> Option<String> {
    scope
        .select_all(&EXAMPLE_HEADING)
        .filter(|h| h.text().trim() == "Example")
        .filter_map(|h| h.next_element())
        .filter_map(|container| container.select_all(&CODE).last())
        .map(|code| code.text())
        .last()
}

/// Drop a single trailing space.
fn chomp(mut text: String) -> String {
    if text.ends_with(' ') {
        text.pop();
    }
    text
}
