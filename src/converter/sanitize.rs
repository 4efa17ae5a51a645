/// Replaces file-system-unsafe characters in a title with underscores.
///
/// Each character is replaced independently; no replacement introduces
/// another target character, so the order of the calls does not matter
/// for the result but is kept fixed anyway.
pub fn sanitize_name(title: &str) -> String {
    title
        .replace('/', "_")
        .replace('\\', "_")
        .replace(' ', "_")
        .replace('?', "_")
        .replace('*', "_")
        .replace('<', "_")
        .replace('>', "_")
        .replace('|', "_")
        .replace('"', "_")
        .replace(':', "_")
}
