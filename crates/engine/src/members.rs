use api_types::{
    MemberId,
    user::{MemberRef, User},
};

/// Number of id characters shown in a synthesized member name.
const SHORT_ID_LEN: usize = 5;

/// Turns a member reference into a displayable user record.
///
/// Expanded records pass through unchanged. Bare identifiers get a
/// placeholder name built from the start of the id, so downstream code only
/// ever deals with [`User`].
pub fn normalize(member: &MemberRef) -> User {
    match member {
        MemberRef::Expanded(user) => user.clone(),
        MemberRef::Bare(id) => User {
            id: id.clone(),
            name: placeholder_name(id),
        },
    }
}

/// Normalizes a whole member list, keeping its order.
pub fn normalize_all(members: &[MemberRef]) -> Vec<User> {
    members.iter().map(normalize).collect()
}

/// Extracts bare identifiers from a member list, whatever shape each entry
/// came in. Duplicates are dropped, first occurrence wins.
pub fn member_ids(members: &[MemberRef]) -> Vec<MemberId> {
    unique_ids(members.iter().map(MemberRef::id))
}

/// Collects ids in order of first appearance, skipping repeats.
pub fn unique_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<MemberId> {
    let mut unique: Vec<MemberId> = Vec::new();
    for id in ids {
        if !unique.iter().any(|known| known == id) {
            unique.push(id.to_string());
        }
    }
    unique
}

fn placeholder_name(id: &str) -> String {
    let short: String = id.chars().take(SHORT_ID_LEN).collect();
    format!("Member {short}...")
}
