//! store::query
//!
//! Folder addressing and file searches.
//!
//! # Folders
//!
//! Users paste whatever Drive gives them: a share link, an "open" link, or
//! the bare id. [`extract_folder_id`] reduces all of them to the id.
//!
//! # Queries
//!
//! A [`SearchQuery`] renders to Drive's query language for the REST adapter
//! and can also be evaluated directly against a [`RemoteFile`], which is how
//! the in-memory store answers searches.

use std::fmt;

use super::traits::RemoteFile;

/// Extensions accepted as images when the MIME type is not an image type.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp"];

/// Maximum number of files returned by one listing.
pub const LISTING_PAGE_SIZE: u32 = 1000;

/// Folder a search or upload is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FolderRef {
    /// The user's top-level folder
    #[default]
    Root,
    /// A specific folder
    Id(String),
}

impl FolderRef {
    /// Folder for an optional configured id.
    pub fn from_id(id: Option<String>) -> Self {
        match id {
            Some(id) if !id.trim().is_empty() => FolderRef::Id(id.trim().to_string()),
            _ => FolderRef::Root,
        }
    }

    /// The folder id, `None` for the root.
    pub fn id(&self) -> Option<&str> {
        match self {
            FolderRef::Root => None,
            FolderRef::Id(id) => Some(id),
        }
    }

    /// Human-readable description of the folder.
    pub fn describe(&self) -> String {
        match self {
            FolderRef::Root => "Root Folder (My Drive)".to_string(),
            FolderRef::Id(id) => {
                let short: String = id.chars().take(8).collect();
                format!("Custom Folder ({}...)", short)
            }
        }
    }

    /// The id Drive uses for this folder in `parents`.
    pub fn parent_id(&self) -> &str {
        self.id().unwrap_or("root")
    }
}

impl fmt::Display for FolderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Extract a folder id from a Drive URL or return the trimmed input.
///
/// Recognized forms, tried in order:
/// - `.../folders/<id>`
/// - `...?id=<id>` or `...&id=<id>`
/// - `.../drive/<id>`
///
/// # Example
///
/// ```
/// use gallerist::store::query::extract_folder_id;
///
/// assert_eq!(
///     extract_folder_id("https://drive.google.com/drive/folders/1AbC-d_E?usp=sharing"),
///     "1AbC-d_E"
/// );
/// assert_eq!(extract_folder_id("https://drive.google.com/open?id=XyZ"), "XyZ");
/// assert_eq!(extract_folder_id("  1AbC  "), "1AbC");
/// ```
pub fn extract_folder_id(url: &str) -> String {
    let markers: [&[&str]; 3] = [&["/folders/"], &["?id=", "&id="], &["/drive/"]];
    for alternatives in markers {
        let found = alternatives
            .iter()
            .filter_map(|marker| url.find(marker).map(|at| &url[at + marker.len()..]))
            .filter_map(leading_id)
            .next();
        if let Some(id) = found {
            return id.to_string();
        }
    }
    url.trim().to_string()
}

/// The longest non-empty prefix of id characters.
fn leading_id(rest: &str) -> Option<&str> {
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// Quote a value for Drive's query language.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// A file search within one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// A file with an exact name (the manifest lookup)
    ByName { name: String, folder: FolderRef },
    /// Every image file, ordered by name
    Images { folder: FolderRef },
}

impl SearchQuery {
    /// Search for a file by exact name.
    pub fn by_name(name: impl Into<String>, folder: FolderRef) -> Self {
        SearchQuery::ByName {
            name: name.into(),
            folder,
        }
    }

    /// Search for image files.
    pub fn images(folder: FolderRef) -> Self {
        SearchQuery::Images { folder }
    }

    /// The folder the search is scoped to.
    pub fn folder(&self) -> &FolderRef {
        match self {
            SearchQuery::ByName { folder, .. } | SearchQuery::Images { folder } => folder,
        }
    }

    /// Render the `q` parameter of a Drive files listing.
    pub fn to_drive_query(&self) -> String {
        let parent = format!("{} in parents", quote(self.folder().parent_id()));
        match self {
            SearchQuery::ByName { name, .. } => {
                format!("name={} and trashed=false and {}", quote(name), parent)
            }
            SearchQuery::Images { .. } => {
                let mut kinds = vec!["mimeType contains 'image/'".to_string()];
                kinds.extend(
                    IMAGE_EXTENSIONS
                        .iter()
                        .map(|ext| format!("name contains {}", quote(ext))),
                );
                format!(
                    "({}) and trashed=false and not name contains '.json' and {}",
                    kinds.join(" or "),
                    parent
                )
            }
        }
    }

    /// The `orderBy` parameter, if the search is ordered.
    pub fn order_by(&self) -> Option<&'static str> {
        match self {
            SearchQuery::ByName { .. } => None,
            SearchQuery::Images { .. } => Some("name"),
        }
    }

    /// Check whether a file (already known to live in the query's folder)
    /// matches.
    pub fn matches(&self, file: &RemoteFile) -> bool {
        match self {
            SearchQuery::ByName { name, .. } => &file.name == name,
            SearchQuery::Images { .. } => {
                let lower = file.name.to_lowercase();
                if lower.contains(".json") {
                    return false;
                }
                file.mime_type.contains("image/")
                    || IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: &str) -> RemoteFile {
        RemoteFile {
            id: name.to_string(),
            name: name.to_string(),
            size: 0,
            mime_type: mime.to_string(),
            created_time: None,
            display_link: None,
        }
    }

    mod folders {
        use super::*;

        #[test]
        fn extract_from_folder_link() {
            assert_eq!(
                extract_folder_id("https://drive.google.com/drive/folders/1AbCdEfGh"),
                "1AbCdEfGh"
            );
            assert_eq!(
                extract_folder_id("https://drive.google.com/drive/u/0/folders/1AbC?usp=sharing"),
                "1AbC"
            );
        }

        #[test]
        fn extract_from_id_parameter() {
            assert_eq!(
                extract_folder_id("https://drive.google.com/open?id=1XyZ"),
                "1XyZ"
            );
            assert_eq!(
                extract_folder_id("https://drive.google.com/open?usp=x&id=1XyZ"),
                "1XyZ"
            );
        }

        #[test]
        fn extract_from_drive_path() {
            assert_eq!(
                extract_folder_id("https://drive.google.com/drive/abc123"),
                "abc123"
            );
        }

        #[test]
        fn bare_id_is_trimmed() {
            assert_eq!(extract_folder_id("  1AbC \n"), "1AbC");
        }

        #[test]
        fn marker_without_id_falls_through() {
            assert_eq!(
                extract_folder_id("https://drive.google.com/folders/?id=Q1"),
                "Q1"
            );
        }

        #[test]
        fn describe() {
            assert_eq!(FolderRef::Root.describe(), "Root Folder (My Drive)");
            assert_eq!(
                FolderRef::Id("1234567890abc".into()).describe(),
                "Custom Folder (12345678...)"
            );
            assert_eq!(FolderRef::Id("abc".into()).describe(), "Custom Folder (abc...)");
        }

        #[test]
        fn from_id() {
            assert_eq!(FolderRef::from_id(None), FolderRef::Root);
            assert_eq!(FolderRef::from_id(Some(" ".into())), FolderRef::Root);
            assert_eq!(
                FolderRef::from_id(Some("x".into())),
                FolderRef::Id("x".into())
            );
            assert_eq!(FolderRef::Root.parent_id(), "root");
        }
    }

    mod queries {
        use super::*;

        #[test]
        fn manifest_lookup_in_root() {
            let q = SearchQuery::by_name("image-data.json", FolderRef::Root);
            assert_eq!(
                q.to_drive_query(),
                "name='image-data.json' and trashed=false and 'root' in parents"
            );
            assert_eq!(q.order_by(), None);
        }

        #[test]
        fn manifest_lookup_in_folder_escapes_quotes() {
            let q = SearchQuery::by_name("it's.json", FolderRef::Id("F1".into()));
            assert_eq!(
                q.to_drive_query(),
                "name='it\\'s.json' and trashed=false and 'F1' in parents"
            );
        }

        #[test]
        fn image_listing() {
            let q = SearchQuery::images(FolderRef::Id("F1".into()));
            let rendered = q.to_drive_query();
            assert!(rendered.starts_with("(mimeType contains 'image/' or name contains '.jpg'"));
            assert!(rendered.contains("trashed=false"));
            assert!(rendered.contains("not name contains '.json'"));
            assert!(rendered.ends_with("'F1' in parents"));
            assert_eq!(q.order_by(), Some("name"));
        }

        #[test]
        fn image_matching() {
            let q = SearchQuery::images(FolderRef::Root);
            assert!(q.matches(&file("a.JPG", "application/octet-stream")));
            assert!(q.matches(&file("scan", "image/tiff")));
            assert!(!q.matches(&file("image-data.json", "application/json")));
            assert!(!q.matches(&file("notes.txt", "text/plain")));
        }

        #[test]
        fn name_matching_is_exact() {
            let q = SearchQuery::by_name("image-data.json", FolderRef::Root);
            assert!(q.matches(&file("image-data.json", "application/json")));
            assert!(!q.matches(&file("image-data.json.bak", "application/json")));
        }
    }
}
