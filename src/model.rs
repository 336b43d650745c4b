// Wire types for the ninja feed: the name index and per-ninja detail records.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::jsonp::unwrap_jsonp;

// ── Name index ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct NameIndex {
    #[serde(default)]
    list: Vec<NameIndexEntry>,
}

/// One row of the name index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NameIndexEntry {
    #[serde(rename = "rzwyID", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "rzzmc", default, deserialize_with = "lenient_string")]
    pub primary_name: String,
    #[serde(rename = "rzfmc", default, deserialize_with = "lenient_string")]
    pub secondary_name: String,
}

impl NameIndexEntry {
    pub fn new(id: &str, primary_name: &str, secondary_name: &str) -> Self {
        Self {
            id: id.to_string(),
            primary_name: primary_name.to_string(),
            secondary_name: secondary_name.to_string(),
        }
    }

    pub fn display_name(&self) -> String {
        display_name(&self.primary_name, &self.secondary_name)
    }
}

/// `primary` alone, or `primary secondary` when a title is present.
pub fn display_name(primary: &str, secondary: &str) -> String {
    if secondary.is_empty() {
        primary.to_string()
    } else {
        format!("{primary} {secondary}")
    }
}

/// Parse a (possibly JSONP-wrapped) name index body.
pub fn parse_index(body: &str) -> Result<Vec<NameIndexEntry>> {
    let index: NameIndex = serde_json::from_str(unwrap_jsonp(body)?)?;
    Ok(index.list)
}

// ── Detail record ─────────────────────────────────────────────────────

/// Skill groups in the order they are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillKind {
    BasicAttack,
    SkillOne,
    SkillTwo,
    Ultimate,
    SpecialMechanic,
}

impl SkillKind {
    pub const ALL: [SkillKind; 5] = [
        SkillKind::BasicAttack,
        SkillKind::SkillOne,
        SkillKind::SkillTwo,
        SkillKind::Ultimate,
        SkillKind::SpecialMechanic,
    ];

    /// Key of the group under `jnzs`, also the prefix of its entry fields.
    pub fn key(&self) -> &'static str {
        match self {
            SkillKind::BasicAttack => "pg",
            SkillKind::SkillOne => "yjn",
            SkillKind::SkillTwo => "ejn",
            SkillKind::Ultimate => "ay",
            SkillKind::SpecialMechanic => "tsjz",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkillKind::BasicAttack => "普攻",
            SkillKind::SkillOne => "一技能",
            SkillKind::SkillTwo => "二技能",
            SkillKind::Ultimate => "奥义",
            SkillKind::SpecialMechanic => "特殊机制",
        }
    }
}

/// Maximum numbered entries per skill group.
pub const MAX_SKILL_ENTRIES: usize = 5;
/// Maximum recommended items per category.
pub const MAX_RECOMMENDED: usize = 2;

/// A populated entry of a skill group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillEntry<'a> {
    pub index: usize,
    pub name: &'a str,
    pub description: &'a str,
}

/// A loosely-typed JSON object section. Absent or non-object values read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section(Map<String, Value>);

impl Section {
    /// String at a nested path, or `""` when any step is missing or not a string.
    pub fn text(&self, path: &[&str]) -> &str {
        let Some((first, rest)) = path.split_first() else {
            return "";
        };
        let mut value = self.0.get(*first);
        for key in rest {
            value = value.and_then(|v| v.get(*key));
        }
        value.and_then(Value::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Showcase {
    #[serde(rename = "rzzs")]
    pub identity: Identity,
}

/// Display identity. Name, title and skill description are required.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    #[serde(rename = "rzzmc", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "rzfmc", deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(rename = "rztc", deserialize_with = "lenient_string")]
    pub skill_summary: String,
    #[serde(rename = "lbtx", default, deserialize_with = "lenient_string")]
    pub avatar: String,
}

/// Per-ninja detail record.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityDetail {
    #[serde(rename = "zhanshi")]
    pub showcase: Showcase,
    #[serde(rename = "jnzs", default, deserialize_with = "lenient_object")]
    pub skills: Section,
    #[serde(rename = "tjtlmj", default, deserialize_with = "lenient_object")]
    pub recommended: Section,
    #[serde(rename = "lztj-ay", default, deserialize_with = "lenient_object")]
    pub ultimate_media: Section,
}

impl EntityDetail {
    pub fn name(&self) -> &str {
        &self.showcase.identity.name
    }

    pub fn title(&self) -> &str {
        &self.showcase.identity.title
    }

    pub fn skill_summary(&self) -> &str {
        &self.showcase.identity.skill_summary
    }

    pub fn display_name(&self) -> String {
        display_name(self.name(), self.title())
    }

    /// Raw avatar field, possibly protocol- or root-relative.
    pub fn avatar_field(&self) -> &str {
        &self.showcase.identity.avatar
    }

    /// Entries 1..=5 of a skill group that carry a name, in numeric order.
    pub fn skill_entries(&self, kind: SkillKind) -> Vec<SkillEntry<'_>> {
        let key = kind.key();
        (1..=MAX_SKILL_ENTRIES)
            .filter_map(|i| {
                let name_key = format!("{key}{i}mc");
                let name = self.skills.text(&[key, name_key.as_str()]);
                if name.is_empty() {
                    return None;
                }
                let desc_key = format!("{key}{i}ms");
                Some(SkillEntry {
                    index: i,
                    name,
                    description: self.skills.text(&[key, desc_key.as_str()]),
                })
            })
            .collect()
    }

    /// Recommended summons (`tjtls{n}.tjtlsmc{n}`).
    pub fn summons(&self) -> Vec<&str> {
        self.recommended_items("tjtls", "tjtlsmc")
    }

    /// Recommended scrolls (`tjmj{n}.tjmjmc{n}`).
    pub fn scrolls(&self) -> Vec<&str> {
        self.recommended_items("tjmj", "tjmjmc")
    }

    fn recommended_items(&self, slot: &str, field: &str) -> Vec<&str> {
        (1..=MAX_RECOMMENDED)
            .map(|n| {
                let (slot_key, field_key) = (format!("{slot}{n}"), format!("{field}{n}"));
                self.recommended.text(&[slot_key.as_str(), field_key.as_str()])
            })
            .filter(|name| !name.is_empty())
            .collect()
    }

    pub fn ultimate_video_url(&self) -> Option<&str> {
        Some(self.ultimate_media.text(&["ayjs", "aytsp"])).filter(|s| !s.is_empty())
    }
}

/// Parse a (possibly JSONP-wrapped) detail body.
pub fn parse_detail(body: &str) -> Result<EntityDetail> {
    Ok(serde_json::from_str(unwrap_jsonp(body)?)?)
}

// ── Lenient field decoding ────────────────────────────────────────────

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_object<'de, D>(deserializer: D) -> std::result::Result<Section, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => Section(map),
        _ => Section::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use serde_json::json;

    fn detail_from(value: Value) -> EntityDetail {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_index_numeric_and_string_ids() {
        let body = r#"getNinjaList({"list":[
            {"rzwyID": 1001, "rzzmc": "漩涡鸣人", "rzfmc": "九尾查克拉"},
            {"rzwyID": "1002", "rzzmc": "宇智波佐助"}
        ]})"#;
        let entries = parse_index(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], NameIndexEntry::new("1001", "漩涡鸣人", "九尾查克拉"));
        assert_eq!(entries[1].id, "1002");
        assert_eq!(entries[1].secondary_name, "");
    }

    #[test]
    fn test_parse_index_missing_list_is_empty() {
        assert!(parse_index("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_index_malformed() {
        assert!(matches!(
            parse_index("getNinjaList({\"list\": [").unwrap_err(),
            LookupError::Malformed(_)
        ));
        assert!(matches!(
            parse_index("<html>oops</html>").unwrap_err(),
            LookupError::Json(_)
        ));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(NameIndexEntry::new("1", "鸣人", "").display_name(), "鸣人");
        assert_eq!(
            NameIndexEntry::new("1", "鸣人", "仙人模式").display_name(),
            "鸣人 仙人模式"
        );
    }

    #[test]
    fn test_detail_optional_sections_default_empty() {
        let detail = detail_from(json!({
            "zhanshi": {"rzzs": {"rzzmc": "鸣人", "rzfmc": "少年篇", "rztc": "近战"}}
        }));
        assert_eq!(detail.name(), "鸣人");
        assert_eq!(detail.avatar_field(), "");
        assert!(detail.summons().is_empty());
        assert!(detail.scrolls().is_empty());
        assert!(detail.ultimate_video_url().is_none());
        for kind in SkillKind::ALL {
            assert!(detail.skill_entries(kind).is_empty());
        }
    }

    #[test]
    fn test_detail_missing_identity_fails() {
        let body = r#"{"zhanshi": {"rzzs": {"rzzmc": "鸣人"}}}"#;
        assert!(parse_detail(body).is_err());
        assert!(parse_detail(r#"{"jnzs": {}}"#).is_err());
    }

    #[test]
    fn test_detail_tolerates_wrong_section_shapes() {
        let detail = detail_from(json!({
            "zhanshi": {"rzzs": {"rzzmc": "鸣人", "rzfmc": "", "rztc": ""}},
            "jnzs": [],
            "tjtlmj": null,
            "lztj-ay": {"ayjs": {"aytsp": 7}}
        }));
        assert!(detail.skill_entries(SkillKind::Ultimate).is_empty());
        assert!(detail.summons().is_empty());
        assert!(detail.ultimate_video_url().is_none());
    }

    #[test]
    fn test_skill_entries_skip_empty_names() {
        let detail = detail_from(json!({
            "zhanshi": {"rzzs": {"rzzmc": "鸣人", "rzfmc": "", "rztc": ""}},
            "jnzs": {"pg": {
                "pg1mc": "拳击", "pg1ms": "连打",
                "pg2mc": "", "pg2ms": "unused",
                "pg3mc": "踢", "pg3ms": ""
            }}
        }));
        let entries = detail.skill_entries(SkillKind::BasicAttack);
        assert_eq!(
            entries,
            vec![
                SkillEntry { index: 1, name: "拳击", description: "连打" },
                SkillEntry { index: 3, name: "踢", description: "" },
            ]
        );
    }

    #[test]
    fn test_recommended_and_video() {
        let detail = detail_from(json!({
            "zhanshi": {"rzzs": {"rzzmc": "鸣人", "rzfmc": "", "rztc": "", "lbtx": "//x/a.png"}},
            "tjtlmj": {
                "tjtls1": {"tjtlsmc1": "蛤蟆文太"},
                "tjtls2": {"tjtlsmc2": ""},
                "tjmj1": {"tjmjmc1": "通灵·蛤蟆"},
                "tjmj2": {"tjmjmc2": "风遁"}
            },
            "lztj-ay": {"ayjs": {"aytsp": "//v/ay.mp4"}}
        }));
        assert_eq!(detail.summons(), vec!["蛤蟆文太"]);
        assert_eq!(detail.scrolls(), vec!["通灵·蛤蟆", "风遁"]);
        assert_eq!(detail.avatar_field(), "//x/a.png");
        assert_eq!(detail.ultimate_video_url(), Some("//v/ay.mp4"));
    }
}
