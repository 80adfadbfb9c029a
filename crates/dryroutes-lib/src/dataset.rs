//! Decoding of the compressed node and edge datasets.
//!
//! Both payloads are gzip-compressed UTF-8 JSON arrays of objects. Plain
//! (uncompressed) JSON is accepted as well so local fixtures can be edited by
//! hand.

use std::io::Read;

use flate2::bufread::GzDecoder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{DatasetKind, Error, Result};
use crate::graph::{build_graph, Graph, NodeId};
use crate::source::{DatasetFetcher, DatasetSources};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Raw node record as stored in the nodes dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altura: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peligrosidad: Option<f64>,
}

/// Raw edge record as stored in the edges dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub origen: NodeId,
    pub destino: NodeId,
    pub costo_total: f64,
    pub tiempo: f64,
    pub distancia: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub altura_media: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    /// Integer or string identifier.
    Id,
    /// Any finite number.
    Number,
    /// Finite number greater than or equal to zero.
    NonNegative,
}

struct RecordSchema {
    dataset: DatasetKind,
    required: &'static [(&'static str, FieldKind)],
    optional: &'static [(&'static str, FieldKind)],
}

const NODE_SCHEMA: RecordSchema = RecordSchema {
    dataset: DatasetKind::Nodes,
    required: &[
        ("id", FieldKind::Id),
        ("x", FieldKind::Number),
        ("y", FieldKind::Number),
    ],
    optional: &[
        ("altura", FieldKind::Number),
        ("peligrosidad", FieldKind::Number),
    ],
};

const EDGE_SCHEMA: RecordSchema = RecordSchema {
    dataset: DatasetKind::Edges,
    required: &[
        ("origen", FieldKind::Id),
        ("destino", FieldKind::Id),
        ("costo_total", FieldKind::NonNegative),
        ("tiempo", FieldKind::NonNegative),
        ("distancia", FieldKind::NonNegative),
    ],
    optional: &[("altura_media", FieldKind::Number)],
};

/// Decode a nodes payload into records, preserving dataset order.
pub fn decode_nodes(bytes: &[u8]) -> Result<Vec<NodeRecord>> {
    decode_records(bytes, &NODE_SCHEMA)
}

/// Decode an edges payload into records, preserving dataset order.
pub fn decode_edges(bytes: &[u8]) -> Result<Vec<EdgeRecord>> {
    decode_records(bytes, &EDGE_SCHEMA)
}

/// Decode both payloads and build the routing graph.
pub fn load_graph_from_bytes(nodes: &[u8], edges: &[u8]) -> Result<Graph> {
    let nodes = decode_nodes(nodes)?;
    let edges = decode_edges(edges)?;
    build_graph(nodes, edges)
}

/// Fetch both payloads through `fetcher`, then decode and build the graph.
///
/// The nodes payload is fetched and decoded before the edges payload is
/// requested, so a broken nodes dataset fails without a second download.
pub fn load_graph(sources: &DatasetSources, fetcher: &dyn DatasetFetcher) -> Result<Graph> {
    info!(nodes = %sources.nodes, edges = %sources.edges, "loading road graph");
    let nodes = decode_nodes(&fetcher.fetch(&sources.nodes)?)?;
    let edges = decode_edges(&fetcher.fetch(&sources.edges)?)?;
    build_graph(nodes, edges)
}

fn decode_records<T: DeserializeOwned>(bytes: &[u8], schema: &RecordSchema) -> Result<Vec<T>> {
    let dataset = schema.dataset;
    let text = decompress(bytes, dataset)?;

    let document: Value = serde_json::from_str(&text).map_err(|e| Error::Decode {
        dataset,
        message: format!("invalid JSON: {e}"),
    })?;
    let Value::Array(items) = document else {
        return Err(Error::Decode {
            dataset,
            message: "expected a JSON array of records".to_string(),
        });
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let schema_error = |message: String| Error::Schema {
            dataset,
            index,
            message,
        };

        let Value::Object(object) = item else {
            return Err(schema_error("record is not a JSON object".to_string()));
        };
        validate_record(&object, schema).map_err(schema_error)?;

        let record = serde_json::from_value(Value::Object(object))
            .map_err(|e| schema_error(e.to_string()))?;
        records.push(record);
    }

    debug!(%dataset, records = records.len(), "decoded dataset");
    Ok(records)
}

fn decompress(bytes: &[u8], dataset: DatasetKind) -> Result<String> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return String::from_utf8(bytes.to_vec()).map_err(|e| Error::Decode {
            dataset,
            message: format!("payload is neither gzip nor UTF-8 text: {e}"),
        });
    }

    let mut decoded = Vec::new();
    let mut rest = bytes;
    let mut members = 0usize;
    while !rest.is_empty() {
        if !rest.starts_with(&GZIP_MAGIC) {
            let trailing = rest.len();
            return Err(Error::Decode {
                dataset,
                message: format!("{trailing} trailing bytes after {members} gzip members"),
            });
        }

        let mut decoder = GzDecoder::new(rest);
        decoder
            .read_to_end(&mut decoded)
            .map_err(|e| Error::Decode {
                dataset,
                message: format!("gzip member #{members} is corrupt: {e}"),
            })?;
        members += 1;

        // Zero padding between members is skipped.
        rest = decoder.into_inner();
        let padding = rest.iter().take_while(|&&byte| byte == 0).count();
        rest = &rest[padding..];
    }
    debug!(%dataset, members, "decompressed payload");

    String::from_utf8(decoded).map_err(|e| Error::Decode {
        dataset,
        message: format!("decompressed payload is not UTF-8: {e}"),
    })
}

fn validate_record(
    object: &Map<String, Value>,
    schema: &RecordSchema,
) -> std::result::Result<(), String> {
    for &(key, kind) in schema.required {
        match object.get(key) {
            None | Some(Value::Null) => return Err(format!("missing required key '{key}'")),
            Some(value) => check_field(key, kind, value)?,
        }
    }

    for &(key, kind) in schema.optional {
        match object.get(key) {
            None | Some(Value::Null) => {}
            Some(value) => check_field(key, kind, value)?,
        }
    }

    Ok(())
}

fn check_field(key: &str, kind: FieldKind, value: &Value) -> std::result::Result<(), String> {
    match kind {
        FieldKind::Id => {
            if value.is_string() || value.as_i64().is_some() {
                Ok(())
            } else {
                Err(format!(
                    "key '{key}' must be an integer or a string, got {value}"
                ))
            }
        }
        FieldKind::Number | FieldKind::NonNegative => {
            let Some(number) = value.as_f64() else {
                return Err(format!("key '{key}' must be a number, got {value}"));
            };
            if !number.is_finite() {
                return Err(format!("key '{key}' must be finite, got {number}"));
            }
            if kind == FieldKind::NonNegative && number < 0.0 {
                return Err(format!("key '{key}' must not be negative, got {number}"));
            }
            Ok(())
        }
    }
}

fn zero_if_null<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}
