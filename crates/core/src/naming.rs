//! Name conversions shared by the registry and the scaffold generator.

/// Convert `BackfillUserNames`, `backfill-user-names` or `backfill_user_names`
/// to `backfill_user_names`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.trim().chars().collect();
    let mut result = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' || c == '_' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower);
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result.trim_end_matches('_').to_string()
}

/// Convert `backfill_user_names` to `BackfillUserNames`.
pub fn to_pascal_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}
