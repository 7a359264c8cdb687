//! Work item data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One unit of schedulable content.
///
/// Field names match the on-disk store format. Unknown fields are ignored on
/// read so older and newer store files stay loadable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkItem {
    /// Correlation identifier assigned when generation was requested.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub unique_id: Option<String>,

    /// Local artifact name, unique within the store.
    pub file_name: String,

    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    pub category_id: String,
    pub privacy: String,

    /// Terminal once true.
    pub uploaded: bool,

    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "publish_at_format::deserialize"
    )]
    pub publish_at: Option<DateTime<Utc>>,

    /// Publish time was set by an operator.
    #[serde(skip_serializing_if = "is_false")]
    pub is_manual: bool,

    /// Keep this item's `publish_at` out of baseline computation.
    #[serde(skip_serializing_if = "is_false")]
    pub ignore_calc: bool,

    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub download_url: Option<String>,
}

/// Lifecycle stage derived from an item's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStage {
    /// No publish slot yet.
    Pending,
    /// Publish slot committed, not uploaded.
    Scheduled,
    /// Uploaded to the hosting service.
    Uploaded,
}

impl ItemStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStage::Pending => "pending",
            ItemStage::Scheduled => "scheduled",
            ItemStage::Uploaded => "uploaded",
        }
    }
}

impl WorkItem {
    /// Create a pending item with default publication metadata.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            category_id: "24".to_string(),
            privacy: "private".to_string(),
            ..Default::default()
        }
    }

    pub fn with_unique_id(mut self, id: impl Into<String>) -> Self {
        self.unique_id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    pub fn with_publish_at(mut self, publish_at: DateTime<Utc>) -> Self {
        self.publish_at = Some(publish_at);
        self
    }

    pub fn stage(&self) -> ItemStage {
        if self.uploaded {
            ItemStage::Uploaded
        } else if self.publish_at.is_some() {
            ItemStage::Scheduled
        } else {
            ItemStage::Pending
        }
    }

    /// The publish instant this item contributes to the schedule baseline.
    pub fn baseline_instant(&self) -> Option<DateTime<Utc>> {
        if self.ignore_calc {
            None
        } else {
            self.publish_at
        }
    }

    pub fn has_unique_id(&self, id: &str) -> bool {
        !id.is_empty() && self.unique_id.as_deref() == Some(id)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

mod publish_at_format {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer};

    /// RFC 3339 with any offset; an empty string means unset.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| D::Error::custom(format!("invalid publish_at '{}': {}", s, e))),
        }
    }
}
