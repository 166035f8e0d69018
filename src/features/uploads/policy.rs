//! Upload rules per site section
//!
//! Each section owns a MIME allow-list, a size limit and a fixed set of
//! subfolders. The table is built once at startup and never changes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

const MB: u64 = 1024 * 1024;

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];
const VIDEO_TYPES: &[&str] = &["video/mp4", "video/webm"];

/// Site section a file is uploaded for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum UploadSection {
    Hero,
    About,
    Services,
    Certifications,
    Gallery,
    Media,
}

impl UploadSection {
    pub const ALL: [UploadSection; 6] = [
        UploadSection::Hero,
        UploadSection::About,
        UploadSection::Services,
        UploadSection::Certifications,
        UploadSection::Gallery,
        UploadSection::Media,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadSection::Hero => "hero",
            UploadSection::About => "about",
            UploadSection::Services => "services",
            UploadSection::Certifications => "certifications",
            UploadSection::Gallery => "gallery",
            UploadSection::Media => "media",
        }
    }
}

impl fmt::Display for UploadSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadSection {
    type Err = UploadRejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        UploadSection::ALL
            .into_iter()
            .find(|section| section.as_str() == wanted)
            .ok_or_else(|| UploadRejection::UnknownSection {
                section: s.to_string(),
                allowed: UploadSection::ALL.map(|s| s.as_str()).join(", "),
            })
    }
}

/// Why a candidate file was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("Unknown section '{section}'. Allowed sections: {allowed}")]
    UnknownSection { section: String, allowed: String },

    #[error("File type '{mime_type}' is not allowed for section '{section}'. Allowed extensions: {allowed}")]
    MimeType {
        section: UploadSection,
        mime_type: String,
        allowed: String,
    },

    #[error("File extension '{extension}' does not match type '{mime_type}'. Expected: {expected}")]
    Extension {
        mime_type: String,
        extension: String,
        expected: String,
    },

    #[error("File is too large for section '{section}'. Maximum size is {max_mb}MB")]
    TooLarge { section: UploadSection, max_mb: u64 },

    #[error("Invalid subfolder '{subfolder}' for section '{section}'. Allowed subfolders: {allowed}")]
    Subfolder {
        section: UploadSection,
        subfolder: String,
        allowed: String,
    },
}

/// Startup errors for a malformed policy table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("section '{0}' has an empty MIME allow-list")]
    EmptyAllowList(UploadSection),

    #[error("section '{0}' must have a positive size limit")]
    ZeroLimit(UploadSection),

    #[error("section '{0}' has no folders")]
    EmptyFolders(UploadSection),

    #[error("section '{0}' has no policy")]
    Missing(UploadSection),

    #[error("size override for unknown section '{0}'")]
    UnknownOverride(String),
}

/// Rules for one section
#[derive(Debug, Clone)]
pub struct SectionPolicy {
    pub section: UploadSection,
    pub allowed_mime_types: Vec<&'static str>,
    pub max_size_bytes: u64,
    pub folders: Vec<&'static str>,
}

impl SectionPolicy {
    /// Built-in rules for a section
    pub fn default_for(section: UploadSection) -> Self {
        let images = IMAGE_TYPES.to_vec();
        let media = [IMAGE_TYPES, VIDEO_TYPES].concat();

        let (allowed_mime_types, max_mb, folders) = match section {
            UploadSection::Hero => (media, 50, vec!["images", "videos", "backgrounds"]),
            UploadSection::About => (
                vec!["image/jpeg", "image/png", "image/webp"],
                5,
                vec!["images"],
            ),
            UploadSection::Services => (
                vec!["image/jpeg", "image/png", "image/webp", "image/svg+xml"],
                5,
                vec!["images", "icons"],
            ),
            UploadSection::Certifications => (
                vec![
                    "image/jpeg",
                    "image/png",
                    "image/webp",
                    "image/svg+xml",
                    "application/pdf",
                ],
                10,
                vec!["logos", "documents"],
            ),
            UploadSection::Gallery => (media, 10, vec!["images", "videos", "thumbnails"]),
            UploadSection::Media => (
                [images, VIDEO_TYPES.to_vec(), vec!["image/svg+xml", "application/pdf"]].concat(),
                20,
                vec!["images", "videos", "documents"],
            ),
        };

        Self {
            section,
            allowed_mime_types,
            max_size_bytes: max_mb * MB,
            folders,
        }
    }

    pub fn max_size_mb(&self) -> u64 {
        self.max_size_bytes / MB
    }

    /// File extensions matching the allow-list, e.g. `.jpg, .png`
    pub fn allowed_extensions(&self) -> Vec<&'static str> {
        self.allowed_mime_types
            .iter()
            .flat_map(|mime| extensions_for(mime).iter().copied())
            .collect()
    }

    fn check(&self) -> Result<(), PolicyError> {
        if self.allowed_mime_types.is_empty() {
            return Err(PolicyError::EmptyAllowList(self.section));
        }
        if self.max_size_bytes == 0 {
            return Err(PolicyError::ZeroLimit(self.section));
        }
        if self.folders.is_empty() {
            return Err(PolicyError::EmptyFolders(self.section));
        }
        Ok(())
    }
}

fn extensions_for(mime: &str) -> &'static [&'static str] {
    match mime {
        "image/jpeg" => &[".jpg", ".jpeg"],
        "image/png" => &[".png"],
        "image/webp" => &[".webp"],
        "image/gif" => &[".gif"],
        "image/svg+xml" => &[".svg"],
        "video/mp4" => &[".mp4"],
        "video/webm" => &[".webm"],
        "application/pdf" => &[".pdf"],
        _ => &[],
    }
}

/// Name, size and type of an incoming file
#[derive(Debug, Clone, Copy)]
pub struct FileCandidate<'a> {
    pub original_name: &'a str,
    pub mime_type: &'a str,
    pub size: u64,
}

impl FileCandidate<'_> {
    /// Lowercased extension with its dot, e.g. `.jpg`
    fn extension(&self) -> Option<String> {
        Path::new(self.original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
    }
}

/// The complete, validated upload rule table
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    sections: BTreeMap<UploadSection, SectionPolicy>,
}

impl UploadPolicy {
    /// Build a table, requiring exactly one well-formed policy per section
    pub fn new(policies: Vec<SectionPolicy>) -> Result<Self, PolicyError> {
        let mut sections = BTreeMap::new();
        for policy in policies {
            policy.check()?;
            sections.insert(policy.section, policy);
        }

        if let Some(missing) = UploadSection::ALL
            .into_iter()
            .find(|s| !sections.contains_key(s))
        {
            return Err(PolicyError::Missing(missing));
        }

        Ok(Self { sections })
    }

    /// Built-in table with per-section size overrides (in MB) applied
    pub fn with_overrides(overrides_mb: &[(String, u64)]) -> Result<Self, PolicyError> {
        let mut policies: Vec<SectionPolicy> = UploadSection::ALL
            .into_iter()
            .map(SectionPolicy::default_for)
            .collect();

        for (name, mb) in overrides_mb {
            let section = name
                .parse::<UploadSection>()
                .map_err(|_| PolicyError::UnknownOverride(name.clone()))?;
            if let Some(policy) = policies.iter_mut().find(|p| p.section == section) {
                policy.max_size_bytes = mb * MB;
            }
        }

        Self::new(policies)
    }

    pub fn section(&self, section: UploadSection) -> Option<&SectionPolicy> {
        self.sections.get(&section)
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionPolicy> {
        self.sections.values()
    }

    /// Every `(section, subfolder)` pair in the table
    pub fn layout(&self) -> Vec<(&'static str, &'static str)> {
        self.sections
            .values()
            .flat_map(|p| p.folders.iter().map(move |f| (p.section.as_str(), *f)))
            .collect()
    }

    /// Largest limit across sections, used to size the request body limit
    pub fn max_upload_size(&self) -> u64 {
        self.sections
            .values()
            .map(|p| p.max_size_bytes)
            .max()
            .unwrap_or(0)
    }

    /// Check a candidate file against a section's rules. Pure: no I/O.
    pub fn validate(
        &self,
        file: &FileCandidate<'_>,
        section: UploadSection,
        subfolder: Option<&str>,
    ) -> Result<(), UploadRejection> {
        let policy = self.policy_for(section)?;

        if !policy.allowed_mime_types.contains(&file.mime_type) {
            return Err(UploadRejection::MimeType {
                section,
                mime_type: file.mime_type.to_string(),
                allowed: policy.allowed_extensions().join(", "),
            });
        }

        // The stored name keeps this extension and `/upload` serves by it
        let expected = extensions_for(file.mime_type);
        let extension = file.extension();
        if !extension
            .as_deref()
            .is_some_and(|ext| expected.iter().any(|e| *e == ext))
        {
            return Err(UploadRejection::Extension {
                mime_type: file.mime_type.to_string(),
                extension: extension.unwrap_or_default(),
                expected: expected.join(", "),
            });
        }

        if file.size > policy.max_size_bytes {
            return Err(UploadRejection::TooLarge {
                section,
                max_mb: policy.max_size_mb(),
            });
        }

        if let Some(subfolder) = subfolder {
            self.resolve_subfolder(section, Some(subfolder))?;
        }

        Ok(())
    }

    /// The requested subfolder if it belongs to the section, otherwise the
    /// section's first folder when none was requested.
    pub fn resolve_subfolder(
        &self,
        section: UploadSection,
        subfolder: Option<&str>,
    ) -> Result<&'static str, UploadRejection> {
        let policy = self.policy_for(section)?;

        match subfolder {
            None => Ok(policy.folders[0]),
            Some(wanted) => policy
                .folders
                .iter()
                .copied()
                .find(|f| *f == wanted)
                .ok_or_else(|| UploadRejection::Subfolder {
                    section,
                    subfolder: wanted.to_string(),
                    allowed: policy.folders.join(", "),
                }),
        }
    }

    /// Folder for a file uploaded without a subfolder: the section folder
    /// named after the file's kind, else the section's first folder.
    pub fn default_subfolder(
        &self,
        section: UploadSection,
        mime_type: &str,
    ) -> Result<&'static str, UploadRejection> {
        let policy = self.policy_for(section)?;
        let preferred = if mime_type.starts_with("video/") {
            "videos"
        } else if mime_type == "application/pdf" {
            "documents"
        } else {
            "images"
        };

        Ok(policy
            .folders
            .iter()
            .copied()
            .find(|f| *f == preferred)
            .unwrap_or(policy.folders[0]))
    }

    fn policy_for(&self, section: UploadSection) -> Result<&SectionPolicy, UploadRejection> {
        self.sections
            .get(&section)
            .ok_or_else(|| UploadRejection::UnknownSection {
                section: section.to_string(),
                allowed: self
                    .sections
                    .keys()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> UploadPolicy {
        UploadPolicy::with_overrides(&[]).unwrap()
    }

    #[test]
    fn test_default_table_is_valid() {
        let policy = policy();
        assert_eq!(policy.sections().count(), UploadSection::ALL.len());
        assert_eq!(policy.max_upload_size(), 50 * MB);
        assert!(policy.layout().contains(&("gallery", "thumbnails")));
    }

    #[test]
    fn test_accepts_allowed_file() {
        let file = FileCandidate {
            original_name: "plan.png",
            mime_type: "image/png",
            size: 2 * MB,
        };
        assert!(policy()
            .validate(&file, UploadSection::Gallery, Some("images"))
            .is_ok());
    }

    #[test]
    fn test_rejects_mime_type_with_allowed_extensions() {
        let file = FileCandidate {
            original_name: "notes.zip",
            mime_type: "application/zip",
            size: 10,
        };
        let err = policy()
            .validate(&file, UploadSection::About, None)
            .unwrap_err();

        assert!(matches!(err, UploadRejection::MimeType { .. }));
        let message = err.to_string();
        assert!(message.contains(".jpg"));
        assert!(message.contains(".png"));
        assert!(message.contains(".webp"));
        assert!(!message.contains(".mp4"));
    }

    #[test]
    fn test_rejects_oversized_file_reporting_mb() {
        let file = FileCandidate {
            original_name: "photo.jpg",
            mime_type: "image/jpeg",
            size: 15 * MB,
        };
        let err = policy()
            .validate(&file, UploadSection::Gallery, Some("images"))
            .unwrap_err();

        assert_eq!(
            err,
            UploadRejection::TooLarge {
                section: UploadSection::Gallery,
                max_mb: 10
            }
        );
        assert!(err.to_string().contains("10MB"));
    }

    #[test]
    fn test_size_exactly_at_limit_is_accepted() {
        let file = FileCandidate {
            original_name: "photo.jpg",
            mime_type: "image/jpeg",
            size: 10 * MB,
        };
        assert!(policy()
            .validate(&file, UploadSection::Gallery, None)
            .is_ok());
    }

    #[test]
    fn test_rejects_unknown_subfolder() {
        let file = FileCandidate {
            original_name: "photo.jpg",
            mime_type: "image/jpeg",
            size: 1,
        };
        let err = policy()
            .validate(&file, UploadSection::Hero, Some("secret"))
            .unwrap_err();

        assert!(matches!(err, UploadRejection::Subfolder { .. }));
        assert!(err.to_string().contains("images, videos, backgrounds"));
    }

    #[test]
    fn test_resolve_subfolder_defaults_to_first_folder() {
        let policy = policy();
        assert_eq!(
            policy.resolve_subfolder(UploadSection::Certifications, None),
            Ok("logos")
        );
        assert_eq!(
            policy.resolve_subfolder(UploadSection::Gallery, Some("videos")),
            Ok("videos")
        );
    }

    #[test]
    fn test_parse_section() {
        assert_eq!("gallery".parse::<UploadSection>(), Ok(UploadSection::Gallery));
        assert_eq!(" HERO ".parse::<UploadSection>(), Ok(UploadSection::Hero));
        let err = "blog".parse::<UploadSection>().unwrap_err();
        assert!(err.to_string().contains("hero, about"));
    }

    #[test]
    fn test_overrides_change_limit() {
        let policy = UploadPolicy::with_overrides(&[("gallery".to_string(), 25)]).unwrap();
        let file = FileCandidate {
            original_name: "tour.mp4",
            mime_type: "video/mp4",
            size: 15 * MB,
        };
        assert!(policy
            .validate(&file, UploadSection::Gallery, Some("videos"))
            .is_ok());
    }

    #[test]
    fn test_zero_override_is_rejected_at_startup() {
        let err = UploadPolicy::with_overrides(&[("about".to_string(), 0)]).unwrap_err();
        assert_eq!(err, PolicyError::ZeroLimit(UploadSection::About));
    }

    #[test]
    fn test_malformed_tables_are_rejected() {
        let mut empty_types = SectionPolicy::default_for(UploadSection::Hero);
        empty_types.allowed_mime_types.clear();
        let mut policies: Vec<SectionPolicy> = UploadSection::ALL[1..]
            .iter()
            .map(|s| SectionPolicy::default_for(*s))
            .collect();
        policies.push(empty_types);
        assert_eq!(
            UploadPolicy::new(policies).unwrap_err(),
            PolicyError::EmptyAllowList(UploadSection::Hero)
        );

        let mut no_folders = SectionPolicy::default_for(UploadSection::Media);
        no_folders.folders.clear();
        assert_eq!(
            UploadPolicy::new(vec![no_folders]).unwrap_err(),
            PolicyError::EmptyFolders(UploadSection::Media)
        );

        let only_hero = vec![SectionPolicy::default_for(UploadSection::Hero)];
        assert_eq!(
            UploadPolicy::new(only_hero).unwrap_err(),
            PolicyError::Missing(UploadSection::About)
        );
    }

    #[test]
    fn test_rejects_extension_not_matching_mime_type() {
        let file = FileCandidate {
            original_name: "evil.html",
            mime_type: "image/png",
            size: 10,
        };
        let err = policy()
            .validate(&file, UploadSection::Gallery, None)
            .unwrap_err();

        assert!(matches!(err, UploadRejection::Extension { .. }));
        assert!(err.to_string().contains(".png"));

        let no_extension = FileCandidate {
            original_name: "photo",
            mime_type: "image/jpeg",
            size: 10,
        };
        assert!(policy()
            .validate(&no_extension, UploadSection::Gallery, None)
            .is_err());

        let upper_case = FileCandidate {
            original_name: "Foto.JPEG",
            mime_type: "image/jpeg",
            size: 10,
        };
        assert!(policy()
            .validate(&upper_case, UploadSection::Gallery, None)
            .is_ok());
    }

    #[test]
    fn test_default_subfolder_follows_file_kind() {
        let policy = policy();
        assert_eq!(
            policy.default_subfolder(UploadSection::Hero, "video/mp4"),
            Ok("videos")
        );
        assert_eq!(
            policy.default_subfolder(UploadSection::Gallery, "image/webp"),
            Ok("images")
        );
        assert_eq!(
            policy.default_subfolder(UploadSection::Media, "application/pdf"),
            Ok("documents")
        );
        // No folder named for the kind: first folder
        assert_eq!(
            policy.default_subfolder(UploadSection::Certifications, "image/png"),
            Ok("logos")
        );
        assert_eq!(
            policy.default_subfolder(UploadSection::About, "image/png"),
            Ok("images")
        );
    }
}
