//! JSON snapshot of the annotation collection.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;

use super::ExportError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSnapshot {
    pub annotations: Vec<Annotation>,
    /// RFC 3339 timestamp
    pub export_date: String,
    pub file_name: String,
    pub total_annotations: usize,
}

impl AnnotationSnapshot {
    pub fn new(annotations: Vec<Annotation>, file_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            total_annotations: annotations.len(),
            annotations,
            export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            file_name: file_name.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of reading a snapshot file
#[derive(Debug, Default)]
pub struct ImportedAnnotations {
    pub annotations: Vec<Annotation>,
    /// Why each rejected record was rejected
    pub rejected: Vec<String>,
}

/// Parse a snapshot, or a bare array of annotation records.
///
/// Invalid JSON fails the whole import; malformed records are dropped and
/// reported individually.
pub fn parse_snapshot(json: &str) -> Result<ImportedAnnotations, ExportError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let records = match value {
        serde_json::Value::Array(records) => records,
        serde_json::Value::Object(mut object) => match object.remove("annotations") {
            Some(serde_json::Value::Array(records)) => records,
            _ => return Err(ExportError::NotASnapshot),
        },
        _ => return Err(ExportError::NotASnapshot),
    };

    let mut imported = ImportedAnnotations::default();
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Annotation>(record) {
            Ok(annotation) => imported.annotations.push(annotation),
            Err(e) => imported.rejected.push(format!("record {}: {}", index, e)),
        }
    }
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Point, Shape, Stamp};
    use chrono::TimeZone;

    fn sample() -> Vec<Annotation> {
        let stamp = Stamp {
            color: "#FF0000".to_string(),
            stroke_width: 2.0,
            page: 1,
            timestamp_ms: 1_700_000_000_000,
        };
        vec![
            Annotation::create(Shape::rectangle(Point::new(10.0, 10.0), Point::new(50.0, 80.0)), &stamp),
            Annotation::create(Shape::circle_through(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), &stamp),
        ]
    }

    #[test]
    fn test_snapshot_field_names_are_camel_case() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let json = AnnotationSnapshot::new(sample(), "plan.pdf", now)
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["fileName"], "plan.pdf");
        assert_eq!(value["totalAnnotations"], 2);
        assert_eq!(value["exportDate"], "2024-03-01T12:00:00.000Z");
        assert_eq!(value["annotations"][0]["type"], "rectangle");
        assert_eq!(value["annotations"][0]["strokeWidth"], 2.0);
        assert_eq!(value["annotations"][1]["radius"], 5.0);
    }

    #[test]
    fn test_snapshot_imports_back() {
        let original = sample();
        let json = AnnotationSnapshot::new(original.clone(), "plan.pdf", Utc::now())
            .to_json()
            .unwrap();
        let imported = parse_snapshot(&json).unwrap();
        assert_eq!(imported.annotations, original);
        assert!(imported.rejected.is_empty());
    }

    #[test]
    fn test_malformed_records_are_rejected_individually() {
        let json = r##"[
            { "id": "a", "type": "line", "points": [{"x":0,"y":0},{"x":1,"y":1}], "color": "#000" },
            { "id": "b", "type": "line", "points": [{"x":0,"y":0}] },
            { "id": "c", "type": "hexagon", "points": [] }
        ]"##;
        let imported = parse_snapshot(json).unwrap();
        assert_eq!(imported.annotations.len(), 1);
        assert_eq!(imported.rejected.len(), 2);
        assert!(imported.rejected[0].starts_with("record 1"));
    }

    #[test]
    fn test_invalid_json_fails() {
        assert!(matches!(parse_snapshot("{"), Err(ExportError::Json(_))));
        assert!(matches!(
            parse_snapshot(r#"{ "fileName": "x" }"#),
            Err(ExportError::NotASnapshot)
        ));
        assert!(matches!(parse_snapshot("42"), Err(ExportError::NotASnapshot)));
    }
}
