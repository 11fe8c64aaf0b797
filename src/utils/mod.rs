pub mod ip;

/// 生成指定长度的随机小写字母数字后缀（用于 slug 去重）
pub fn generate_random_suffix(length: usize) -> String {
    use std::iter;

    let chars = b"abcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// 生成安全随机 token（用于未配置时的 JWT secret）
pub fn generate_secure_token(length: usize) -> String {
    use std::iter;

    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// Lowercase and strip everything outside `[a-z0-9]`, the way default page
/// slugs are derived from an email local part.
pub fn slugify(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Valid user-chosen slugs: non-empty, lowercase alphanumeric and hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Parse an analytics date bound: RFC3339 first, then bare `YYYY-MM-DD`
/// (midnight UTC).
pub fn parse_date_bound(input: &str) -> crate::errors::Result<chrono::DateTime<chrono::Utc>> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&chrono::Utc));
    }
    let date = chrono::NaiveDate::parse_from_str(input, "%Y-%m-%d")?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| crate::errors::LinkleafError::date_parse(format!("Invalid date: {}", input)))?;
    Ok(chrono::DateTime::from_naive_utc_and_offset(
        midnight,
        chrono::Utc,
    ))
}
