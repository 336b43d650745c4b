// Text projection of detail records and user-facing reply strings.

use crate::model::{EntityDetail, SkillKind};

/// Marker shown when a recommendation category is empty.
pub const NONE_MARKER: &str = "无";
/// Separator between recommended item names.
pub const ITEM_SEPARATOR: &str = "、";

pub const USAGE_HINT: &str = "请在指令后输入忍者名字，例如：/忍者信息 鸣人";
pub const DETAIL_ERROR: &str = "查询忍者信息时发生错误，请稍后再试。";

pub fn not_found_message(query: &str) -> String {
    format!("未找到忍者：{query}")
}

/// Render a detail record. The output is byte-stable for identical input.
///
/// Layout: a `忍者：name「title` header, one `【label】` section per skill group that has
/// at least one named entry, then the skill description and the two recommendation
/// lines.
pub fn format_detail(detail: &EntityDetail) -> String {
    let mut out = format!("忍者：{}「{}", detail.name(), detail.title());

    for kind in SkillKind::ALL {
        let entries = detail.skill_entries(kind);
        if entries.is_empty() {
            continue;
        }
        out.push_str(&format!("\n【{}】", kind.label()));
        for entry in entries {
            out.push_str(&format!("\n{}: {}", entry.name, entry.description));
        }
    }

    out.push_str(&format!("\n技能说明：{}", detail.skill_summary()));
    out.push_str(&format!("\n推荐通灵：{}", join_or_none(&detail.summons())));
    out.push_str(&format!("\n推荐秘卷：{}", join_or_none(&detail.scrolls())));
    out
}

fn join_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        NONE_MARKER.to_string()
    } else {
        items.join(ITEM_SEPARATOR)
    }
}

/// Turn a protocol-relative (`//host/p`) or root-relative (`/p`) URL into an
/// absolute `https` URL. Empty input yields `None`.
pub fn resolve_avatar_url(raw: &str, origin: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("//") {
        Some(format!("https:{raw}"))
    } else if raw.starts_with('/') {
        Some(format!("{}{raw}", origin.trim_end_matches('/')))
    } else {
        Some(raw.to_string())
    }
}
