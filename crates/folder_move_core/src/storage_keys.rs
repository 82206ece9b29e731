/// Listing prefix of a game folder. The trailing separator keeps sibling
/// folders such as `mygame2/` out of a move of `mygame`.
pub fn folder_prefix(game_name: &str) -> String {
    format!("{game_name}/")
}

/// Destination key for a moved object. Keys are preserved verbatim so the
/// folder layout is identical in both buckets.
pub fn destination_key(source_key: &str) -> String {
    source_key.to_string()
}
