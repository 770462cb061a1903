//! Photon geocoding backend for address completion
//!
//! Queries the public Photon API (OpenStreetMap data) and maps GeoJSON
//! features to suggestions. Only address-type layers are requested; that is
//! a fixed property of this client, not user-configurable.

use async_trait::async_trait;
use serde::Deserialize;

use crate::suggest::{CompletionService, Suggestion};

const PHOTON_URL: &str = "https://photon.komoot.io/api/";
const RESULT_LIMIT: usize = 8;
const ADDRESS_LAYERS: [&str; 4] = ["house", "street", "district", "city"];

pub struct PhotonClient {
    client: reqwest::Client,
    base_url: String,
}

impl PhotonClient {
    pub fn new() -> Self {
        Self::with_base_url(PHOTON_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for PhotonClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionService for PhotonClient {
    async fn complete(&self, query: &str) -> anyhow::Result<Vec<Suggestion>> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("limit", RESULT_LIMIT.to_string()),
        ];
        for layer in ADDRESS_LAYERS {
            params.push(("layer", layer.to_string()));
        }

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "completion request failed with status {}",
                response.status()
            ));
        }

        let collection: FeatureCollection = response.json().await?;
        Ok(to_suggestions(collection))
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Properties {
    name: Option<String>,
    housenumber: Option<String>,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl Properties {
    fn title(&self) -> Option<String> {
        if let Some(name) = &self.name {
            return Some(name.clone());
        }
        match (&self.housenumber, &self.street) {
            (Some(number), Some(street)) => Some(format!("{} {}", number, street)),
            (None, Some(street)) => Some(street.clone()),
            _ => None,
        }
    }

    fn subtitle(&self, title: &str) -> String {
        [&self.city, &self.state, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty() && *part != title)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn to_suggestions(collection: FeatureCollection) -> Vec<Suggestion> {
    collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let title = feature.properties.title()?;
            let subtitle = feature.properties.subtitle(&title);
            Some(Suggestion { title, subtitle })
        })
        .collect()
}
