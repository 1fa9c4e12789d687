//! Structured Metadata Resolver — job title and company name for a page.
//!
//! Title chain:   JSON-LD JobPosting `title` → `og:title` → `<title>`.
//! Company chain: JSON-LD `hiringOrganization` → `og:site_name` → URL host.
//!
//! Resolution is total: any field no source can fill comes back empty.

use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::fallback::{first_non_empty, Strategy};
use crate::html::{clean_text, Page};

const JSON_LD_TYPE: &str = "application/ld+json";
const JOB_POSTING_TYPE: &str = "jobposting";
const GRAPH_KEY: &str = "@graph";
const HIRING_ORG_KEYS: &[&str] = &["hiringOrganization", "hiringOrganisation", "hiringorganisation"];

/// Upper bound on JSON-LD nodes visited per script.
const MAX_GRAPH_NODES: usize = 10_000;

/// Everything the title/company chains read from, parsed once.
struct MetadataSources<'a> {
    page: &'a Page,
    source_url: &'a str,
    postings: Vec<Map<String, Value>>,
}

type MetadataStrategy<'a> = Strategy<MetadataSources<'a>, String>;

/// Resolves `(job_title, company_name)` from a page and the URL it came from.
pub fn resolve_metadata(html: &str, source_url: &str) -> (String, String) {
    let page = Page::parse(html);
    resolve_from_page(&page, source_url)
}

/// Same as [`resolve_metadata`] for an already-parsed page.
pub fn resolve_from_page(page: &Page, source_url: &str) -> (String, String) {
    let sources = MetadataSources {
        page,
        source_url,
        postings: job_posting_nodes(page),
    };

    let title_chain: [MetadataStrategy<'_>; 3] = [
        Strategy::new("json_ld", title_from_json_ld),
        Strategy::new("og:title", title_from_open_graph),
        Strategy::new("document_title", title_from_document),
    ];
    let company_chain: [MetadataStrategy<'_>; 3] = [
        Strategy::new("json_ld", company_from_json_ld),
        Strategy::new("og:site_name", company_from_open_graph),
        Strategy::new("url_host", company_from_host),
    ];

    let job_title = resolve_field("job_title", &sources, &title_chain);
    let company_name = resolve_field("company_name", &sources, &company_chain);
    (job_title, company_name)
}

fn resolve_field<'a>(
    field: &str,
    sources: &MetadataSources<'a>,
    chain: &[MetadataStrategy<'a>],
) -> String {
    match first_non_empty(sources, chain) {
        Some((source, value)) => {
            debug!("Resolved {} from {}", field, source);
            value
        }
        None => {
            debug!("No source resolved {}", field);
            String::new()
        }
    }
}

fn cleaned(value: Option<String>) -> Option<String> {
    value.map(|v| clean_text(&v))
}

fn title_from_open_graph(sources: &MetadataSources<'_>) -> Option<String> {
    cleaned(sources.page.meta_property("og:title"))
}

fn title_from_document(sources: &MetadataSources<'_>) -> Option<String> {
    cleaned(sources.page.title())
}

fn company_from_open_graph(sources: &MetadataSources<'_>) -> Option<String> {
    cleaned(sources.page.meta_property("og:site_name"))
}

fn company_from_host(sources: &MetadataSources<'_>) -> Option<String> {
    Some(company_from_url(sources.source_url))
}

fn title_from_json_ld(sources: &MetadataSources<'_>) -> Option<String> {
    sources
        .postings
        .iter()
        .map(|node| clean_text(&scalar_text(node.get("title"))))
        .find(|title| !title.is_empty())
}

fn company_from_json_ld(sources: &MetadataSources<'_>) -> Option<String> {
    sources
        .postings
        .iter()
        .map(|node| clean_text(&organization_name(node)))
        .find(|name| !name.is_empty())
}

/// The hiring organization is either a plain string or an object with `name`.
fn organization_name(node: &Map<String, Value>) -> String {
    let org = HIRING_ORG_KEYS
        .iter()
        .filter_map(|key| node.get(*key))
        .find(|value| is_present(value));

    match org {
        Some(Value::Object(org)) => scalar_text(org.get("name")),
        Some(Value::String(name)) => name.clone(),
        _ => String::new(),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Every JobPosting-typed node across all JSON-LD scripts, in document order.
/// Scripts that fail to decode are skipped.
fn job_posting_nodes(page: &Page) -> Vec<Map<String, Value>> {
    page.scripts_of_type(JSON_LD_TYPE)
        .iter()
        .map(|payload| payload.trim())
        .filter(|payload| !payload.is_empty())
        .filter_map(|payload| match serde_json::from_str::<Value>(payload) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Skipping undecodable JSON-LD block: {}", e);
                None
            }
        })
        .flat_map(flatten_graph)
        .filter(|node| node.get("@type").is_some_and(is_job_posting_type))
        .collect()
}

/// Pre-order walk over objects, arrays and `@graph` containers using an
/// explicit stack. Objects are yielded before their graph members.
fn flatten_graph(root: Value) -> Vec<Map<String, Value>> {
    let mut nodes = Vec::new();
    let mut stack = vec![root];
    let mut visited = 0usize;

    while let Some(value) = stack.pop() {
        visited += 1;
        if visited > MAX_GRAPH_NODES {
            warn!("JSON-LD graph exceeds {} nodes, truncating", MAX_GRAPH_NODES);
            break;
        }
        match value {
            Value::Object(mut map) => {
                let graph = match map.get_mut(GRAPH_KEY) {
                    Some(Value::Array(items)) => std::mem::take(items),
                    _ => Vec::new(),
                };
                nodes.push(map);
                stack.extend(graph.into_iter().rev());
            }
            Value::Array(items) => stack.extend(items.into_iter().rev()),
            _ => {}
        }
    }

    nodes
}

/// `@type` is a string or a list of strings. Prefixed forms such as
/// `schema:JobPosting` or `https://schema.org/JobPosting` also match.
fn is_job_posting_type(value: &Value) -> bool {
    match value {
        Value::String(s) => {
            let local = s.trim().rsplit(['/', ':', '#']).next().unwrap_or_default();
            local.eq_ignore_ascii_case(JOB_POSTING_TYPE)
        }
        Value::Array(items) => items.iter().any(is_job_posting_type),
        _ => false,
    }
}

/// Company name guessed from the URL host: `www.acme-labs.io` → `Acme Labs`.
/// Internationalised hosts are decoded from punycode first.
/// Unparseable URLs and host-less URLs yield an empty string.
pub fn company_from_url(source_url: &str) -> String {
    let host = Url::parse(source_url.trim())
        .ok()
        .and_then(|url| url.host_str().map(unicode_host))
        .unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let label = host.split('.').next().unwrap_or_default();
    title_case(&label.replace('-', " "))
}

/// `xn--` labels back to Unicode, lowercased. Labels that fail to decode
/// are kept as-is.
fn unicode_host(host: &str) -> String {
    let (decoded, result) = idna::domain_to_unicode(host);
    if let Err(e) = result {
        debug!("Host '{}' did not decode cleanly: {:?}", host, e);
    }
    decoded.to_lowercase()
}

/// Uppercases the first letter of every alphabetic run, lowercases the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}
