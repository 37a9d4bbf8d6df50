//! Managed-block upserter for adapter files (e.g. `AGENTS.md`,
//! `CLAUDE.md`). Updates the content between `<!-- skelly:begin -->`
//! and `<!-- skelly:end -->` markers without touching anything else in
//! the file; appends the block if absent.

const BEGIN: &str = "<!-- skelly:begin -->";
const END: &str = "<!-- skelly:end -->";

/// True if `existing` already carries a managed block (regardless of
/// its current body).
pub fn has_managed_block(existing: &str) -> bool {
    match (existing.find(BEGIN), existing.find(END)) {
        (Some(start), Some(end)) => end > start,
        _ => false,
    }
}

pub fn upsert_block(existing: &str, body: &str) -> String {
    let block = format!("{BEGIN}\n{body}\n{END}");

    if let (Some(start), Some(end)) = (existing.find(BEGIN), existing.find(END)) {
        if end > start {
            let mut out = String::new();
            out.push_str(&existing[..start]);
            out.push_str(&block);
            out.push_str(&existing[end + END.len()..]);
            return out;
        }
    }

    if existing.is_empty() {
        return format!("{block}\n");
    }
    if existing.ends_with('\n') {
        format!("{existing}\n{block}\n")
    } else {
        format!("{existing}\n\n{block}\n")
    }
}
