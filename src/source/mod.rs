use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::cli::MultiRecordPolicy;
use crate::model::{ErrorReason, RawRecord, SourceError};

mod http;

pub use http::HttpAnnotationSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationPage {
    #[serde(rename = "Annotations")]
    pub annotations: AnnotationEnvelope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationEnvelope {
    #[serde(rename = "Annotation", default)]
    pub records: Vec<AnnotationRecord>,

    #[serde(rename = "Page")]
    pub page: u32,

    #[serde(rename = "TotalPages")]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Data", default)]
    pub data: Vec<AnnotationDatum>,

    #[serde(rename = "LinkedRecords", default)]
    pub linked_records: Option<LinkedRecords>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationDatum {
    #[serde(rename = "Value", default)]
    pub value: Option<DatumValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatumValue {
    #[serde(rename = "StringWithMarkup", default)]
    pub string_with_markup: Option<Vec<MarkupString>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkupString {
    #[serde(rename = "String")]
    pub string: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedRecords {
    #[serde(rename = "CID", default)]
    pub cid: Vec<i64>,
}

pub trait AnnotationSource {
    fn total_pages(&self) -> Result<u32>;
    fn page(&self, page_no: u32) -> Result<AnnotationPage>;
}

#[derive(Debug, Default)]
pub struct Aggregation {
    pub records: BTreeMap<String, RawRecord>,
    pub errors: Vec<SourceError>,
}

pub fn aggregate_pages(pages: &[AnnotationPage], policy: MultiRecordPolicy) -> Aggregation {
    let mut aggregation = Aggregation::default();

    for page in pages {
        let page_no = page.annotations.page;

        for (record_index, record) in page.annotations.records.iter().enumerate() {
            let name = record.name.trim().to_lowercase();

            let mut reports = Vec::new();
            for datum in &record.data {
                match datum
                    .value
                    .as_ref()
                    .and_then(|value| value.string_with_markup.as_ref())
                {
                    Some(markups) => {
                        reports.extend(markups.iter().map(|markup| markup.string.clone()));
                    }
                    None => aggregation.errors.push(SourceError {
                        entity_name: name.clone(),
                        page: page_no,
                        record_index,
                        reason: ErrorReason::MissingValueField,
                    }),
                }
            }

            let identifiers = record
                .linked_records
                .as_ref()
                .map(|linked| linked.cid.clone())
                .unwrap_or_default();
            if identifiers.is_empty() {
                aggregation.errors.push(SourceError {
                    entity_name: name.clone(),
                    page: page_no,
                    record_index,
                    reason: ErrorReason::MissingIdentifier,
                });
            }

            if reports.is_empty() || identifiers.is_empty() {
                continue;
            }

            match aggregation.records.get_mut(&name) {
                Some(existing) => {
                    aggregation.errors.push(SourceError {
                        entity_name: name.clone(),
                        page: page_no,
                        record_index,
                        reason: ErrorReason::DuplicateName,
                    });

                    if policy == MultiRecordPolicy::Merge {
                        existing.reports.extend(reports);
                        for identifier in identifiers {
                            if !existing.identifiers.contains(&identifier) {
                                existing.identifiers.push(identifier);
                            }
                        }
                    }
                }
                None => {
                    aggregation.records.insert(
                        name,
                        RawRecord {
                            reports,
                            identifiers,
                        },
                    );
                }
            }
        }
    }

    aggregation
}
