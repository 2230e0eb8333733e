use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::types::OrganizationId;

const TOKEN_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 8;

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`, one `_` per
/// UTF-16 code unit so paths stay identical to those produced by browser clients
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
            out.push(c);
        } else {
            for _ in 0..c.len_utf16() {
                out.push('_');
            }
        }
    }
    out
}

/// Eight lowercase base-36 characters
pub fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// `org_<org>/ass_<assessment>/q_<question>/<unixMillis>-<token>-<sanitized filename>`
pub fn evidence_path(
    organization: &OrganizationId,
    assessment_id: Uuid,
    question_id: i64,
    filename: &str,
    unix_millis: i64,
    token: &str,
) -> String {
    format!(
        "org_{}/ass_{}/q_{}/{}-{}-{}",
        organization,
        assessment_id,
        question_id,
        unix_millis,
        token,
        sanitize_filename(filename)
    )
}

/// Evidence path stamped with the current time and a fresh random token
pub fn new_evidence_path(
    organization: &OrganizationId,
    assessment_id: Uuid,
    question_id: i64,
    filename: &str,
) -> String {
    evidence_path(
        organization,
        assessment_id,
        question_id,
        filename,
        Utc::now().timestamp_millis(),
        &random_token(),
    )
}
