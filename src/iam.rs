//! [`Transport`] over the HTTP API of the SAVE connect (IAM) module.
//!
//! Registers are read with `GET {url}/mread?{"<key>":<count>}` and written with
//! `GET {url}/mwrite?{"<key>":<value>}`, where keys are zero-based register indices. Both return
//! a JSON object. Informational endpoints live at `GET {url}/<name>`.

use crate::polling::RegisterBitmask;
use crate::registers::RegisterIndex;
use crate::snapshot::Snapshot;
use crate::transport::{Endpoint, Transport};
use tracing::{debug, trace, warn};

/// Most registers the module will return from a single `mread` request.
const MAX_READ_COUNT: u16 = 123;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not construct the HTTP client")]
    CreateReqwest(#[source] reqwest::Error),
    #[error("{0} cannot be used as a base URL")]
    Url(reqwest::Url),
    #[error("could not encode the query")]
    EncodeQuery(#[source] serde_json::Error),
    #[error("request to `{1}` failed")]
    Request(#[source] reqwest::Error, String),
    #[error("`{1}` returned malformed JSON")]
    JsonDecode(#[source] reqwest::Error, String),
    #[error("`{0}` response is not an object")]
    ResponseIsntObject(String),
}

#[derive(clap::Parser, Clone, Debug)]
#[group(id = "iam::Args")]
pub struct Args {
    /// Base URL of the SAVE connect module's HTTP API (e.g. `http://192.168.1.20/`).
    #[arg(long)]
    pub url: reqwest::Url,

    /// How long to wait for the module to respond to a request.
    #[arg(long, default_value = "5s")]
    pub read_timeout: humantime::Duration,
}

pub struct Iam2Client {
    base: reqwest::Url,
    http_client: reqwest::Client,
}

impl Iam2Client {
    pub fn new(args: &Args) -> Result<Self, Error> {
        let mut base = args.url.clone();
        if base.cannot_be_a_base() {
            return Err(Error::Url(base));
        }
        // Endpoint names are pushed as segments, an empty trailing one would end up in between.
        if let Ok(mut segments) = base.path_segments_mut() {
            segments.pop_if_empty();
        }
        let http_client = reqwest::Client::builder()
            .read_timeout(*args.read_timeout)
            .timeout(*args.read_timeout)
            .build()
            .map_err(Error::CreateReqwest)?;
        Ok(Self { base, http_client })
    }

    fn url(&self, endpoint: &str, query: Option<&serde_json::Value>) -> Result<reqwest::Url, Error> {
        let mut url = self.base.clone();
        url.path_segments_mut().map_err(|()| Error::Url(self.base.clone()))?.push(endpoint);
        if let Some(query) = query {
            url.set_query(Some(&serde_json::to_string(query).map_err(Error::EncodeQuery)?));
        }
        Ok(url)
    }

    async fn get_object(&self, url: reqwest::Url) -> Result<Endpoint, Error> {
        trace!(%url, "requesting");
        let url_string = url.to_string();
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Request(e, url_string.clone()))?;
        let response = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| Error::JsonDecode(e, url_string.clone()))?;
        match response {
            serde_json::Value::Object(obj) => Ok(obj),
            _ => Err(Error::ResponseIsntObject(url_string)),
        }
    }

    async fn read_range(&self, keys: std::ops::RangeInclusive<u16>) -> Result<Snapshot, Error> {
        let count = keys.end() - keys.start() + 1;
        let query = serde_json::json!({ keys.start().to_string(): count });
        let obj = self.get_object(self.url("mread", Some(&query))?).await?;
        let mut snapshot = Snapshot::new();
        for (k, v) in &obj {
            let Ok(key) = k.parse::<u16>() else {
                debug!(key = k, "ignoring a non-numeric key in the response");
                continue;
            };
            let Some(value) = v.as_i64() else {
                warn!(key = k, unexpected_val = ?v, "register value isn't an integer");
                continue;
            };
            snapshot.insert(key, value as i16 as u16);
        }
        if snapshot.len() < usize::from(count) {
            debug!(
                start = keys.start(),
                requested = count,
                received = snapshot.len(),
                "the unit did not return some of the registers"
            );
        }
        Ok(snapshot)
    }
}

impl Transport for Iam2Client {
    type Error = Error;

    async fn fetch_endpoint(&self, name: &str) -> Result<Endpoint, Error> {
        self.get_object(self.url(name, None)?).await
    }

    async fn fetch_registers(&self, registers: &[RegisterIndex]) -> Result<Snapshot, Error> {
        let mut keys = RegisterBitmask::new();
        for register in registers {
            keys.set(register.snapshot_key());
        }
        let ranges = keys.find_optimal_ranges(MAX_READ_COUNT);
        debug!(registers = registers.len(), requests = ranges.len(), "reading registers");
        let parts = futures::future::try_join_all(ranges.into_iter().map(|r| self.read_range(r)));
        let mut snapshot = Snapshot::new();
        for part in parts.await? {
            snapshot.extend(part.iter());
        }
        Ok(snapshot)
    }

    async fn write_register(&self, register: RegisterIndex, value: i32) -> Result<(), Error> {
        let query = serde_json::json!({ register.snapshot_key().to_string(): value });
        self.get_object(self.url("mwrite", Some(&query))?).await?;
        Ok(())
    }
}
