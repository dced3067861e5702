//! Turns documented example commands into reusable templates.
//!
//! Literal parameter values in an example `curl` invocation are replaced by
//! `{name}` placeholders. Query-string verbs (GET, DELETE) are rewritten inside the
//! `--url '...'` literal, body verbs (POST, PUT, PATCH) inside the `--data '{...}'`
//! JSON literal. Anything that does not fit those shapes is returned untouched.

use std::ops::Range;
use std::sync::LazyLock;

use indexmap::IndexMap;
use jirest_shared::{HttpMethod, Param};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

/// `--url '/path?query'`; group 2 is the query string, up to the closing quote.
static URL_QUERY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--url '(/[^'?]+)\?([^']*)'").expect("valid regex"));

/// `--data '{...}'`, possibly spanning lines; group 1 is the JSON body, up to the
/// closing quote.
static DATA_BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--data '(\{[^']*\})'").expect("valid regex"));

/// Template `command` for `method`, substituting any of `params` found as literals.
///
/// Parameters already present as `{name}` anywhere in the command are left alone, so
/// normalizing a normalized command is a no-op.
pub fn normalize(command: &str, method: HttpMethod, params: &[Param]) -> String {
    // A pass can overwrite a value holding another parameter's placeholder, freeing that
    // parameter for the next pass. Values only ever become their own placeholder, so
    // this settles after one reformatting pass plus one pass per parameter.
    let mut current = normalize_pass(command, method, params);
    for _ in 0..=params.len() {
        let next = normalize_pass(&current, method, params);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn normalize_pass(command: &str, method: HttpMethod, params: &[Param]) -> String {
    if method.uses_query_string() {
        normalize_query(command, params)
    } else {
        normalize_body(command, params)
    }
}

fn normalize_query(command: &str, params: &[Param]) -> String {
    let Some(query) = URL_QUERY_RE.captures(command).and_then(|c| c.get(2)) else {
        return command.to_string();
    };

    let mut pairs = parse_query(query.as_str());
    for param in unreferenced(command, params) {
        if let Some(value) = pairs.get_mut(param.name.as_str()) {
            *value = param.placeholder();
        }
    }

    splice(command, query.range(), &join_query(&pairs))
}

fn normalize_body(command: &str, params: &[Param]) -> String {
    let Some(body) = DATA_BODY_RE.captures(command).and_then(|c| c.get(1)) else {
        return command.to_string();
    };

    let mut fields: Map<String, Value> = match serde_json::from_str(body.as_str()) {
        Ok(fields) => fields,
        Err(e) => {
            debug!(error = %e, "example body is not a JSON object, leaving command as is");
            return command.to_string();
        }
    };

    for param in unreferenced(command, params) {
        if let Some(value) = fields.get_mut(&param.name) {
            *value = Value::String(param.placeholder());
        }
    }

    match serde_json::to_string_pretty(&fields) {
        Ok(pretty) => splice(command, body.range(), &pretty),
        Err(_) => command.to_string(),
    }
}

/// Declared parameters that the command does not reference as a placeholder yet.
fn unreferenced<'p>(command: &str, params: &'p [Param]) -> impl Iterator<Item = &'p Param> {
    params
        .iter()
        .filter(move |p| !command.contains(&p.placeholder()))
}

/// Split `a=1&b=2` into ordered pairs. Later duplicates overwrite the value but keep
/// the first position; a segment without `=` gets an empty value.
fn parse_query(query: &str) -> IndexMap<&str, String> {
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            (key, value.to_string())
        })
        .collect()
}

fn join_query(pairs: &IndexMap<&str, String>) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn splice(command: &str, range: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(command.len() + replacement.len());
    out.push_str(&command[..range.start]);
    out.push_str(replacement);
    out.push_str(&command[range.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(names: &[&str]) -> Vec<Param> {
        names.iter().map(|n| Param::named(*n)).collect()
    }

    fn url_literal(command: &str) -> &str {
        let start = command.find("--url '").expect("url literal") + "--url '".len();
        let end = command[start..].find('\'').expect("closing quote") + start;
        &command[start..end]
    }

    fn data_body(command: &str) -> Value {
        let start = command.find("--data '").expect("data literal") + "--data '".len();
        let end = command.rfind('\'').expect("closing quote");
        serde_json::from_str(&command[start..end]).expect("body stays valid JSON")
    }

    // -----------------------------------------------------------------------
    // Query-string style
    // -----------------------------------------------------------------------

    #[test]
    fn query_param_becomes_placeholder() {
        let cmd = "curl --request GET --url '/issue?fields=summary&key=ABC-1'";
        let out = normalize(cmd, HttpMethod::Get, &params(&["key"]));
        assert_eq!(url_literal(&out), "/issue?fields=summary&key={key}");
    }

    #[test]
    fn query_keeps_surrounding_lines() {
        let cmd = "curl --request DELETE \\\n  --url '/rest/api/3/issue/{issueIdOrKey}?deleteSubtasks=true' \\\n  --header 'Accept: application/json'";
        let out = normalize(cmd, HttpMethod::Delete, &params(&["issueIdOrKey", "deleteSubtasks"]));
        assert_eq!(
            out,
            "curl --request DELETE \\\n  --url '/rest/api/3/issue/{issueIdOrKey}?deleteSubtasks={deleteSubtasks}' \\\n  --header 'Accept: application/json'"
        );
    }

    #[test]
    fn query_literal_ends_at_closing_quote() {
        let cmd = "curl --url '/issue?fields=summary&key=ABC-1' --header 'Accept: */*'";
        let out = normalize(cmd, HttpMethod::Get, &params(&["key"]));
        assert_eq!(
            out,
            "curl --url '/issue?fields=summary&key={key}' --header 'Accept: */*'"
        );
    }

    #[test]
    fn placeholder_inside_another_value_does_not_block_substitution() {
        let cmd = "curl --url '/x?a=1&b={a}'";
        let out = normalize(cmd, HttpMethod::Get, &params(&["a", "b"]));
        assert_eq!(out, "curl --url '/x?a={a}&b={b}'");
    }

    #[test]
    fn query_without_declared_params_is_stable() {
        let cmd = "curl --url '/search?jql=project%3DEX&maxResults=50'";
        assert_eq!(normalize(cmd, HttpMethod::Get, &[]), cmd);
    }

    #[test]
    fn query_ignores_params_not_in_literal() {
        let cmd = "curl --url '/search?jql=x'";
        let out = normalize(cmd, HttpMethod::Get, &params(&["startAt", "maxResults"]));
        assert_eq!(out, cmd);
    }

    #[test]
    fn query_trailing_ampersand_and_bare_keys() {
        let cmd = "curl --url '/x?a=1&flag&'";
        let out = normalize(cmd, HttpMethod::Get, &params(&["a"]));
        assert_eq!(url_literal(&out), "/x?a={a}&flag=");
    }

    #[test]
    fn query_value_containing_equals_is_kept_whole() {
        let cmd = "curl --url '/search?jql=project=EX&expand=names'";
        let out = normalize(cmd, HttpMethod::Get, &params(&["expand"]));
        assert_eq!(url_literal(&out), "/search?jql=project=EX&expand={expand}");
    }

    #[test]
    fn get_without_query_string_is_unchanged() {
        let cmd = "curl --request GET --url '/rest/api/3/serverInfo'";
        assert_eq!(normalize(cmd, HttpMethod::Get, &params(&["x"])), cmd);
    }

    // -----------------------------------------------------------------------
    // Body style
    // -----------------------------------------------------------------------

    #[test]
    fn body_param_becomes_placeholder() {
        let cmd = r#"curl --request POST --data '{"summary":"hi","projectId":10}'"#;
        let out = normalize(cmd, HttpMethod::Post, &params(&["projectId"]));

        let body = data_body(&out);
        assert_eq!(body["projectId"], "{projectId}");
        assert_eq!(body["summary"], "hi");
        assert!(out.contains(r#""projectId": "{projectId}""#));
    }

    #[test]
    fn body_is_pretty_printed_in_original_key_order() {
        let cmd = r#"curl --data '{"zeta":1,"alpha":{"nested":true}}'"#;
        let out = normalize(cmd, HttpMethod::Put, &params(&["zeta"]));
        assert_eq!(
            out,
            "curl --data '{\n  \"zeta\": \"{zeta}\",\n  \"alpha\": {\n    \"nested\": true\n  }\n}'"
        );
    }

    #[test]
    fn body_spanning_lines() {
        let cmd = "curl --request PATCH \\\n  --data '{\n  \"name\": \"Example\",\n  \"key\": \"EX\"\n}'";
        let out = normalize(cmd, HttpMethod::Patch, &params(&["key"]));
        assert_eq!(data_body(&out), serde_json::json!({"name": "Example", "key": "{key}"}));
        assert!(out.starts_with("curl --request PATCH \\\n  --data '{"));
    }

    #[test]
    fn body_literal_ends_at_closing_quote() {
        let cmd = r#"curl --data '{"a":1}' --header 'X: {"b":2}'"#;
        let out = normalize(cmd, HttpMethod::Post, &params(&["a"]));
        assert_eq!(
            out,
            "curl --data '{\n  \"a\": \"{a}\"\n}' --header 'X: {\"b\":2}'"
        );
    }

    #[test]
    fn invalid_json_body_is_unchanged() {
        let cmd = "curl --data '{not json}'";
        assert_eq!(normalize(cmd, HttpMethod::Post, &params(&["not"])), cmd);
    }

    #[test]
    fn post_without_body_is_unchanged() {
        let cmd = "curl --request POST --url '/rest/api/3/issue/{issueIdOrKey}/notify?x=1'";
        assert_eq!(normalize(cmd, HttpMethod::Post, &params(&["x"])), cmd);
    }

    // -----------------------------------------------------------------------
    // Cross-cutting properties
    // -----------------------------------------------------------------------

    #[test]
    fn no_literal_fallback_is_byte_identical() {
        let cmd = "fetch('/rest/api/3/myself', { method: 'GET' })";
        for method in [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
        ] {
            assert_eq!(normalize(cmd, method, &params(&["myself"])), cmd);
        }
    }

    #[test]
    fn already_templated_param_is_untouched() {
        let cmd = "curl --url '/issue/{key}?key=ABC-1'";
        let out = normalize(cmd, HttpMethod::Get, &params(&["key"]));
        assert_eq!(out, cmd);
    }

    #[test]
    fn normalization_is_idempotent() {
        let cases = [
            (
                "curl --url '/issue?fields=summary&key=ABC-1&flag' --header 'Accept: */*'",
                HttpMethod::Get,
            ),
            ("curl --url '/issue/1?deleteSubtasks=true'", HttpMethod::Delete),
            (
                r#"curl --data '{"summary":"hi","projectId":10,"labels":["a"]}'"#,
                HttpMethod::Post,
            ),
            (r#"curl --data '{"name":"x"}'"#, HttpMethod::Put),
            ("curl --data '{broken'", HttpMethod::Patch),
            ("curl --url '/x?a=1&b={a}'", HttpMethod::Get),
            (r#"curl --data '{"a":1,"b":"{a}"}'"#, HttpMethod::Post),
        ];
        let declared = params(&["key", "deleteSubtasks", "projectId", "name", "absent", "a", "b"]);

        for (cmd, method) in cases {
            let once = normalize(cmd, method, &declared);
            let twice = normalize(&once, method, &declared);
            assert_eq!(once, twice, "not idempotent for {cmd:?}");
        }
    }
}
