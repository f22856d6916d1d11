//! Alias folding.
//!
//! Every alias comparison in the crate goes through [`fold`]: lowercase plus
//! Vietnamese diacritic stripping, so that "Đà Nẵng", "da nang" and "DA NANG"
//! all compare equal. Exposed as a single pure helper so the matching rule is
//! testable in isolation.

/// Fold a string for alias comparison: lowercase, strip Vietnamese
/// diacritics, map đ→d, and drop whitespace.
pub fn fold(s: &str) -> String {
    s.chars()
        .flat_map(|c| c.to_lowercase())
        .filter(|c| !c.is_whitespace())
        .map(fold_char)
        .collect()
}

/// Map one lowercase character to its undecorated base form.
fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ' | 'ấ'
        | 'ẩ' | 'ẫ' | 'ậ' => 'a',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ' | 'ớ'
        | 'ở' | 'ỡ' | 'ợ' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        'đ' => 'd',
        other => other,
    }
}

/// Whether `candidate` matches `name` or any of `aliases`, after folding.
pub fn matches(candidate: &str, name: &str, aliases: &[String]) -> bool {
    let folded = fold(candidate);
    if folded == fold(name) {
        return true;
    }
    aliases.iter().any(|a| fold(a) == folded)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
