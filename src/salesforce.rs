//! Salesforce org client: lists Apex classes through the Metadata API and
//! reads per-class line coverage through the Tooling API.
//!
//! Authentication is not handled here; callers supply an access token
//! (e.g. from `sf org display`).

use std::sync::LazyLock;
use std::time::Duration;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApexcovError, Result};
use crate::model::{ClassDescriptor, CoverageCounts};
use crate::source::{ClassSource, CoverageSource};

pub const DEFAULT_API_VERSION: &str = "60.0";

/// 15- or 18-character Salesforce record id.
static CLASS_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{15}(?:[a-zA-Z0-9]{3})?$").unwrap());

/// Connection settings for an org.
#[derive(Debug, Clone)]
pub struct OrgConfig {
    pub instance_url: Option<String>,
    pub access_token: Option<String>,
    pub api_version: String,
    pub timeout: Duration,
}

impl Default for OrgConfig {
    fn default() -> Self {
        Self {
            instance_url: None,
            access_token: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// An authenticated handle on a Salesforce org.
pub struct Org {
    agent: ureq::Agent,
    instance_url: String,
    access_token: String,
    api_version: String,
}

impl Org {
    pub fn connect(config: OrgConfig) -> Result<Self> {
        let instance_url = config
            .instance_url
            .filter(|s| !s.trim().is_empty())
            .ok_or(ApexcovError::MissingConfig(
                "instance URL (--instance-url or SF_INSTANCE_URL)",
            ))?;
        let access_token = config
            .access_token
            .filter(|s| !s.trim().is_empty())
            .ok_or(ApexcovError::MissingConfig(
                "access token (--access-token or SF_ACCESS_TOKEN)",
            ))?;
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent("apexcov")
            .build();
        Ok(Self {
            agent,
            instance_url: instance_url.trim_end_matches('/').to_string(),
            access_token,
            api_version: config.api_version.trim_start_matches('v').to_string(),
        })
    }

    fn metadata_url(&self) -> String {
        format!("{}/services/Soap/m/{}", self.instance_url, self.api_version)
    }

    fn tooling_query_url(&self) -> String {
        format!(
            "{}/services/data/v{}/tooling/query",
            self.instance_url, self.api_version
        )
    }
}

impl ClassSource for Org {
    fn list_classes(&self) -> Result<Vec<ClassDescriptor>> {
        let body = list_metadata_envelope(&self.access_token, &self.api_version);
        debug!(url = %self.metadata_url(), "listing ApexClass metadata");
        let resp = self
            .agent
            .post(&self.metadata_url())
            .set("Content-Type", "text/xml; charset=UTF-8")
            .set("SOAPAction", "\"\"")
            .send_string(&body);

        let text = match resp {
            Ok(r) => r.into_string()?,
            Err(ureq::Error::Status(status, r)) => {
                let body = r.into_string().unwrap_or_default();
                return Err(match parse_soap_fault(body.as_bytes()) {
                    Some(fault) => ApexcovError::Soap(fault),
                    None => ApexcovError::Http { status, body },
                });
            }
            Err(e) => return Err(e.into()),
        };

        let classes = parse_list_metadata(text.as_bytes())?;
        debug!(count = classes.len(), "listed classes");
        Ok(classes)
    }
}

impl CoverageSource for Org {
    fn lookup(&self, class_id: &str) -> Result<Option<CoverageCounts>> {
        let soql = coverage_query(class_id)?;
        let resp: QueryResponse = self
            .agent
            .get(&self.tooling_query_url())
            .query("q", &soql)
            .set("Authorization", &format!("Bearer {}", self.access_token))
            .set("Accept", "application/json")
            .call()?
            .into_json()?;
        first_counts(resp)
    }
}

/// Reject anything that isn't shaped like a record id before it goes into SOQL.
pub fn validate_class_id(class_id: &str) -> Result<()> {
    if CLASS_ID_RE.is_match(class_id) {
        Ok(())
    } else {
        Err(ApexcovError::InvalidClassId(class_id.to_string()))
    }
}

/// Tooling API query for the line counts of one class.
pub fn coverage_query(class_id: &str) -> Result<String> {
    validate_class_id(class_id)?;
    Ok(format!(
        "SELECT NumLinesCovered, NumLinesUncovered FROM ApexCodeCoverage \
         WHERE ApexClassOrTriggerId = '{}'",
        class_id
    ))
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub records: Vec<CoverageRow>,
}

#[derive(Debug, Deserialize)]
pub struct CoverageRow {
    #[serde(rename = "NumLinesCovered")]
    pub num_lines_covered: Option<i64>,
    #[serde(rename = "NumLinesUncovered")]
    pub num_lines_uncovered: Option<i64>,
}

/// Take the first row of a coverage query. Rows with null counts count as absent.
pub fn first_counts(resp: QueryResponse) -> Result<Option<CoverageCounts>> {
    match resp.records.into_iter().next() {
        Some(CoverageRow {
            num_lines_covered: Some(covered),
            num_lines_uncovered: Some(uncovered),
        }) => CoverageCounts::try_new(covered, uncovered).map(Some),
        _ => Ok(None),
    }
}

/// SOAP request body for `listMetadata` on `ApexClass`.
pub fn list_metadata_envelope(session_id: &str, api_version: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:met="http://soap.sforce.com/2006/04/metadata">
  <soapenv:Header>
    <met:SessionHeader>
      <met:sessionId>{}</met:sessionId>
    </met:SessionHeader>
  </soapenv:Header>
  <soapenv:Body>
    <met:listMetadata>
      <met:queries>
        <met:type>ApexClass</met:type>
      </met:queries>
      <met:asOfVersion>{}</met:asOfVersion>
    </met:listMetadata>
  </soapenv:Body>
</soapenv:Envelope>
"#,
        escape(session_id),
        escape(api_version)
    )
}

/// Which child of a `<result>` element we are reading text for.
#[derive(Clone, Copy)]
enum ResultField {
    Id,
    FullName,
}

/// Parse a `listMetadataResponse`, keeping document order.
pub fn parse_list_metadata(input: &[u8]) -> Result<Vec<ClassDescriptor>> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);

    let mut classes = Vec::new();
    let mut buf = Vec::new();

    let mut in_result = false;
    let mut field: Option<ResultField> = None;
    let mut id: Option<String> = None;
    let mut full_name: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"result" => {
                    in_result = true;
                    id = None;
                    full_name = None;
                }
                b"id" if in_result => field = Some(ResultField::Id),
                b"fullName" if in_result => field = Some(ResultField::FullName),
                _ => field = None,
            },
            Event::Text(ref e) => {
                if let Some(f) = field {
                    let text = e.unescape()?.into_owned();
                    match f {
                        ResultField::Id => id = Some(text),
                        ResultField::FullName => full_name = Some(text),
                    }
                }
            }
            Event::End(ref e) => {
                if e.local_name().as_ref() == b"result" {
                    if let (Some(i), Some(n)) = (id.take(), full_name.take()) {
                        classes.push(ClassDescriptor::new(i, n));
                    }
                    in_result = false;
                }
                field = None;
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(classes)
}

/// Extract `<faultstring>` from a SOAP fault body, if there is one.
pub fn parse_soap_fault(input: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut in_faultstring = false;

    loop {
        match reader.read_event_into(&mut buf).ok()? {
            Event::Eof => return None,
            Event::Start(ref e) => {
                in_faultstring = e.local_name().as_ref() == b"faultstring";
            }
            Event::Text(ref e) if in_faultstring => {
                return e.unescape().ok().map(|s| s.into_owned());
            }
            Event::End(_) => in_faultstring = false,
            _ => {}
        }
        buf.clear();
    }
}
