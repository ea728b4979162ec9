//! The persisted draft snapshot.
//!
//! This is the wire format a host's store holds between sessions. Every key
//! carries `#[serde(default)]` so snapshots written by older builds (or an
//! empty `{}`) decode into an empty draft instead of failing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::roster::PharmacistRecord;

/// Complete serializable representation of in-progress form state.
///
/// Restoring a snapshot into a fresh orchestrator reproduces the exact
/// visible state that produced it: selected type, field values, code list,
/// and roster content in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    #[serde(rename = "businessType", default)]
    pub business_type: String,
    #[serde(default)]
    pub business: BTreeMap<String, String>,
    #[serde(default)]
    pub contact: BTreeMap<String, String>,
    #[serde(default)]
    pub ods: Vec<String>,
    #[serde(default)]
    pub pharmacists: Vec<PharmacistRecord>,
}

impl DraftSnapshot {
    pub fn is_empty(&self) -> bool {
        self.business_type.is_empty()
            && self.business.is_empty()
            && self.contact.is_empty()
            && self.ods.is_empty()
            && self.pharmacists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_decodes_to_default() {
        let snapshot: DraftSnapshot = serde_json::from_str("{}").expect("decode");
        assert!(snapshot.is_empty());
    }

    #[test]
    fn partial_object_fills_missing_keys() {
        let snapshot: DraftSnapshot =
            serde_json::from_str(r#"{"businessType":"soleTrader","ods":["AB123"]}"#)
                .expect("decode");
        assert_eq!(snapshot.business_type, "soleTrader");
        assert_eq!(snapshot.ods, vec!["AB123".to_string()]);
        assert!(snapshot.business.is_empty());
        assert!(snapshot.pharmacists.is_empty());
    }

    #[test]
    fn wire_keys_match_the_persisted_format() {
        let mut snapshot = DraftSnapshot::default();
        snapshot.business_type = "partnership".into();
        snapshot
            .contact
            .insert("email".into(), "jane@example.org".into());
        snapshot.pharmacists.push(PharmacistRecord {
            gphc: "1234567".into(),
            name: "Jane Doe".into(),
        });
        let json = serde_json::to_value(&snapshot).expect("encode");
        assert_eq!(json["businessType"], "partnership");
        assert_eq!(json["contact"]["email"], "jane@example.org");
        assert_eq!(json["pharmacists"][0]["gphc"], "1234567");
        assert_eq!(json["pharmacists"][0]["name"], "Jane Doe");
    }
}
